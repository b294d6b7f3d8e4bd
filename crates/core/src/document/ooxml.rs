//! Shared helpers for zip-packaged document containers.

use std::io::{Cursor, Read, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::error::DocumentError;

/// Reads one named entry of a zip container as a UTF-8 string.
pub(crate) fn read_zip_entry(
    bytes: &[u8],
    name: &str,
    format: &str,
) -> Result<String, DocumentError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| DocumentError::malformed(format, e))?;
    let mut entry = archive
        .by_name(name)
        .map_err(|e| DocumentError::malformed(format, format!("missing {name}: {e}")))?;
    let mut content = String::new();
    entry
        .read_to_string(&mut content)
        .map_err(|e| DocumentError::malformed(format, e))?;
    Ok(content)
}

/// Lists the entry names of a zip container.
pub(crate) fn zip_entry_names(bytes: &[u8], format: &str) -> Result<Vec<String>, DocumentError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| DocumentError::malformed(format, e))?;
    let mut names = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let entry = archive
            .by_index(i)
            .map_err(|e| DocumentError::malformed(format, e))?;
        names.push(entry.name().to_string());
    }
    Ok(names)
}

/// Builds a zip container from (name, content) entries, deflate-compressed.
pub(crate) fn build_zip(
    entries: &[(&str, &[u8])],
    format: &str,
) -> Result<Vec<u8>, DocumentError> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, content) in entries {
        writer
            .start_file(*name, options)
            .map_err(|e| DocumentError::render(format, e))?;
        writer
            .write_all(content)
            .map_err(|e| DocumentError::render(format, e))?;
    }
    let cursor = writer
        .finish()
        .map_err(|e| DocumentError::render(format, e))?;
    Ok(cursor.into_inner())
}

/// Escapes text for embedding in XML content.
pub(crate) fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
