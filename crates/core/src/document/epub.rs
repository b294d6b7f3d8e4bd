//! Minimal EPUB container writer.

use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::error::DocumentError;
use super::ooxml::escape_xml;

/// Builds a single-chapter EPUB book from extracted text.
pub fn text_to_epub(title: &str, text: &str) -> Result<Vec<u8>, DocumentError> {
    let mut paragraphs = String::new();
    for line in text.split('\n') {
        paragraphs.push_str(&format!("<p>{}</p>", escape_xml(line)));
    }

    let chapter = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <html xmlns=\"http://www.w3.org/1999/xhtml\"><head><title>{title}</title></head>\
         <body><h1>{title}</h1>{paragraphs}</body></html>",
        title = escape_xml(title),
    );

    let container = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
        <container version=\"1.0\" xmlns=\"urn:oasis:names:tc:opendocument:xmlns:container\">\
        <rootfiles><rootfile full-path=\"OEBPS/content.opf\" media-type=\"application/oebps-package+xml\"/></rootfiles>\
        </container>";

    let opf = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <package xmlns=\"http://www.idpf.org/2007/opf\" version=\"3.0\" unique-identifier=\"bookid\">\
         <metadata xmlns:dc=\"http://purl.org/dc/elements/1.1/\">\
         <dc:identifier id=\"bookid\">frantoio-epub</dc:identifier>\
         <dc:title>{title}</dc:title><dc:language>en</dc:language>\
         </metadata>\
         <manifest><item id=\"chapter\" href=\"chapter.xhtml\" media-type=\"application/xhtml+xml\"/></manifest>\
         <spine><itemref idref=\"chapter\"/></spine></package>",
        title = escape_xml(title),
    );

    // The mimetype entry must come first and must be stored uncompressed.
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let stored = FileOptions::default().compression_method(CompressionMethod::Stored);
    let deflated = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let entries: [(&str, &str, FileOptions); 4] = [
        ("mimetype", "application/epub+zip", stored),
        ("META-INF/container.xml", container, deflated),
        ("OEBPS/content.opf", &opf, deflated),
        ("OEBPS/chapter.xhtml", &chapter, deflated),
    ];
    for (name, content, options) in entries {
        writer
            .start_file(name, options)
            .map_err(|e| DocumentError::render("epub", e))?;
        writer
            .write_all(content.as_bytes())
            .map_err(|e| DocumentError::render("epub", e))?;
    }

    let cursor = writer
        .finish()
        .map_err(|e| DocumentError::render("epub", e))?;
    Ok(cursor.into_inner())
}
