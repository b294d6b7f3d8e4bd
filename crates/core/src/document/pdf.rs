//! PDF engineering via lopdf: text recreation, merge, split, page text
//! extraction and text watermark overlay.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use std::collections::{BTreeMap, BTreeSet};

use crate::transform::WatermarkAnchor;

use super::error::DocumentError;

const PAGE_WIDTH: f32 = 612.0;
const PAGE_HEIGHT: f32 = 792.0;
const BODY_FONT_SIZE: i64 = 11;
const BODY_LEADING: i64 = 14;
const LINES_PER_PAGE: usize = 48;
const WRAP_COLUMNS: usize = 90;
const WATERMARK_FONT_SIZE: f32 = 60.0;

/// Recreates plain text as a paginated PDF document.
pub fn text_to_pdf(text: &str) -> Result<Vec<u8>, DocumentError> {
    let lines = wrap_lines(text, WRAP_COLUMNS);
    let chunks: Vec<&[String]> = if lines.is_empty() {
        vec![&[]]
    } else {
        lines.chunks(LINES_PER_PAGE).collect()
    };

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for chunk in chunks {
        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), BODY_FONT_SIZE.into()]),
            Operation::new("TL", vec![BODY_LEADING.into()]),
            Operation::new("Td", vec![72.into(), 742.into()]),
        ];
        for line in chunk {
            operations.push(Operation::new(
                "Tj",
                vec![Object::string_literal(line.as_str())],
            ));
            operations.push(Operation::new("T*", vec![]));
        }
        operations.push(Operation::new("ET", vec![]));

        let encoded = Content { operations }
            .encode()
            .map_err(|e| DocumentError::render("pdf", e))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    save_document(&mut doc)
}

/// Extracts the text of every page.
pub fn pdf_to_text(bytes: &[u8]) -> Result<String, DocumentError> {
    let doc = Document::load_mem(bytes).map_err(|e| DocumentError::malformed("pdf", e))?;
    let pages: Vec<u32> = doc.get_pages().keys().copied().collect();
    if pages.is_empty() {
        return Ok(String::new());
    }
    doc.extract_text(&pages)
        .map_err(|e| DocumentError::malformed("pdf", e))
}

/// Number of pages in a PDF document.
pub fn page_count(bytes: &[u8]) -> Result<usize, DocumentError> {
    let doc = Document::load_mem(bytes).map_err(|e| DocumentError::malformed("pdf", e))?;
    Ok(doc.get_pages().len())
}

/// Concatenates the page trees of several PDF documents in order.
pub fn merge_pdfs(inputs: &[Vec<u8>]) -> Result<Vec<u8>, DocumentError> {
    if inputs.is_empty() {
        return Err(DocumentError::render("pdf", "nothing to merge"));
    }

    let mut max_id = 1u32;
    let mut page_ids: Vec<ObjectId> = Vec::new();
    let mut all_objects: BTreeMap<ObjectId, Object> = BTreeMap::new();

    for bytes in inputs {
        let mut doc = Document::load_mem(bytes).map_err(|e| DocumentError::malformed("pdf", e))?;
        doc.renumber_objects_with(max_id);
        max_id = doc.max_id + 1;
        page_ids.extend(doc.get_pages().into_values());
        all_objects.extend(doc.objects);
    }

    // Old page-tree nodes are dropped, so inheritable attributes have to be
    // pulled down onto the pages first.
    let parent_dicts: BTreeMap<ObjectId, Dictionary> = all_objects
        .iter()
        .filter_map(|(id, object)| {
            let dict = object.as_dict().ok()?;
            if is_type(dict, b"Pages") {
                Some((*id, dict.clone()))
            } else {
                None
            }
        })
        .collect();

    let mut merged = Document::with_version("1.5");
    let pages_id = merged.new_object_id();
    let page_id_set: BTreeSet<ObjectId> = page_ids.iter().copied().collect();

    for (id, object) in all_objects {
        if let Ok(dict) = object.as_dict() {
            if page_id_set.contains(&id) {
                let mut page = dict.clone();
                if let Ok(parent_ref) = dict.get(b"Parent").and_then(|o| o.as_reference()) {
                    if let Some(parent) = parent_dicts.get(&parent_ref) {
                        for key in [b"Resources".as_slice(), b"MediaBox", b"Rotate"] {
                            if page.get(key).is_err() {
                                if let Ok(value) = parent.get(key) {
                                    page.set(key, value.clone());
                                }
                            }
                        }
                    }
                }
                page.set("Parent", pages_id);
                merged.objects.insert(id, Object::Dictionary(page));
                continue;
            }
            if is_type(dict, b"Catalog") || is_type(dict, b"Pages") || is_type(dict, b"Outlines") {
                continue;
            }
        }
        merged.objects.insert(id, object);
    }

    let kids: Vec<Object> = page_ids.iter().map(|id| Object::Reference(*id)).collect();
    let count = kids.len() as i64;
    merged.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = merged.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
    merged.trailer.set("Root", catalog_id);
    merged.max_id = max_id;
    merged.renumber_objects();
    merged.compress();

    save_document(&mut merged)
}

/// Splits a PDF into chunks of at most `pages_per_chunk` pages, in page
/// order.
pub fn split_pdf(bytes: &[u8], pages_per_chunk: usize) -> Result<Vec<Vec<u8>>, DocumentError> {
    let doc = Document::load_mem(bytes).map_err(|e| DocumentError::malformed("pdf", e))?;
    let total = doc.get_pages().len() as u32;
    if total == 0 {
        return Err(DocumentError::malformed("pdf", "document has no pages"));
    }
    let per_chunk = pages_per_chunk.max(1) as u32;

    let mut parts = Vec::new();
    let mut start = 1u32;
    while start <= total {
        let end = (start + per_chunk - 1).min(total);
        let mut part = doc.clone();
        let outside: Vec<u32> = (1..=total).filter(|p| *p < start || *p > end).collect();
        if !outside.is_empty() {
            part.delete_pages(&outside);
        }
        part.prune_objects();
        part.renumber_objects();
        parts.push(save_document(&mut part)?);
        start = end + 1;
    }
    Ok(parts)
}

/// Draws a text watermark onto every page of a PDF document.
///
/// Opacity is applied through an ExtGState; the page count and existing
/// content are preserved.
pub fn watermark_pdf(
    bytes: &[u8],
    text: &str,
    anchor: WatermarkAnchor,
    opacity: f32,
) -> Result<Vec<u8>, DocumentError> {
    let mut doc = Document::load_mem(bytes).map_err(|e| DocumentError::malformed("pdf", e))?;
    let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();
    if page_ids.is_empty() {
        return Err(DocumentError::malformed("pdf", "document has no pages"));
    }

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let gs_id = doc.add_object(dictionary! {
        "Type" => "ExtGState",
        "ca" => opacity.clamp(0.0, 1.0),
        "CA" => opacity.clamp(0.0, 1.0),
    });

    let encoded = watermark_content(text, anchor)
        .encode()
        .map_err(|e| DocumentError::render("pdf", e))?;

    for page_id in page_ids {
        let stream_id = doc.add_object(Stream::new(dictionary! {}, encoded.clone()));
        upsert_page_resources(&mut doc, page_id, font_id, gs_id)?;
        append_page_content(&mut doc, page_id, stream_id)?;
    }

    save_document(&mut doc)
}

fn watermark_content(text: &str, anchor: WatermarkAnchor) -> Content {
    // Approximate Helvetica advance width for centering.
    let text_width = text.chars().count() as f32 * WATERMARK_FONT_SIZE * 0.5;
    let (w, h) = (PAGE_WIDTH, PAGE_HEIGHT);
    let margin = 50.0;

    let matrix: [f32; 6] = match anchor {
        WatermarkAnchor::Center => [1.0, 0.0, 0.0, 1.0, (w - text_width) / 2.0, h / 2.0],
        WatermarkAnchor::Diagonal => {
            let cos = std::f32::consts::FRAC_1_SQRT_2;
            let sin = std::f32::consts::FRAC_1_SQRT_2;
            [
                cos,
                sin,
                -sin,
                cos,
                w / 2.0 - text_width / 2.0 * cos,
                h / 2.0 - text_width / 2.0 * sin,
            ]
        }
        WatermarkAnchor::TopLeft => [1.0, 0.0, 0.0, 1.0, margin, h - 100.0],
        WatermarkAnchor::TopRight => [1.0, 0.0, 0.0, 1.0, w - margin - text_width, h - 100.0],
        WatermarkAnchor::BottomLeft => [1.0, 0.0, 0.0, 1.0, margin, 100.0],
        WatermarkAnchor::BottomRight => [1.0, 0.0, 0.0, 1.0, w - margin - text_width, 100.0],
    };

    let operations = vec![
        Operation::new("q", vec![]),
        Operation::new("gs", vec!["WMgs".into()]),
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["FWM".into(), WATERMARK_FONT_SIZE.into()]),
        Operation::new(
            "Tm",
            matrix.iter().map(|v| Object::Real(*v)).collect::<Vec<_>>(),
        ),
        Operation::new("Tj", vec![Object::string_literal(text)]),
        Operation::new("ET", vec![]),
        Operation::new("Q", vec![]),
    ];
    Content { operations }
}

/// Registers the watermark font and graphics state in a page's resources,
/// handling inline, referenced and missing resource dictionaries.
fn upsert_page_resources(
    doc: &mut Document,
    page_id: ObjectId,
    font_id: ObjectId,
    gs_id: ObjectId,
) -> Result<(), DocumentError> {
    enum Location {
        Inline(Dictionary),
        Referenced(ObjectId),
        Missing,
    }

    let location = {
        let page = doc
            .get_dictionary(page_id)
            .map_err(|e| DocumentError::malformed("pdf", e))?;
        match page.get(b"Resources") {
            Ok(Object::Dictionary(dict)) => Location::Inline(dict.clone()),
            Ok(Object::Reference(id)) => Location::Referenced(*id),
            _ => Location::Missing,
        }
    };

    match location {
        Location::Inline(mut resources) => {
            add_resource_entries(doc, &mut resources, font_id, gs_id);
            let page = doc
                .get_dictionary_mut(page_id)
                .map_err(|e| DocumentError::malformed("pdf", e))?;
            page.set("Resources", Object::Dictionary(resources));
        }
        Location::Referenced(resources_id) => {
            let mut resources = doc
                .get_dictionary(resources_id)
                .map_err(|e| DocumentError::malformed("pdf", e))?
                .clone();
            add_resource_entries(doc, &mut resources, font_id, gs_id);
            doc.objects
                .insert(resources_id, Object::Dictionary(resources));
        }
        Location::Missing => {
            let mut resources = Dictionary::new();
            add_resource_entries(doc, &mut resources, font_id, gs_id);
            let page = doc
                .get_dictionary_mut(page_id)
                .map_err(|e| DocumentError::malformed("pdf", e))?;
            page.set("Resources", Object::Dictionary(resources));
        }
    }
    Ok(())
}

fn add_resource_entries(
    doc: &mut Document,
    resources: &mut Dictionary,
    font_id: ObjectId,
    gs_id: ObjectId,
) {
    set_in_sub_dictionary(doc, resources, b"Font", "FWM", font_id);
    set_in_sub_dictionary(doc, resources, b"ExtGState", "WMgs", gs_id);
}

fn set_in_sub_dictionary(
    doc: &mut Document,
    resources: &mut Dictionary,
    sub: &[u8],
    key: &str,
    value: ObjectId,
) {
    match resources.get(sub).cloned() {
        Ok(Object::Dictionary(mut dict)) => {
            dict.set(key, value);
            resources.set(sub, Object::Dictionary(dict));
        }
        Ok(Object::Reference(id)) => {
            if let Ok(dict) = doc.get_dictionary(id) {
                let mut dict = dict.clone();
                dict.set(key, value);
                doc.objects.insert(id, Object::Dictionary(dict));
            }
        }
        _ => {
            let mut dict = Dictionary::new();
            dict.set(key, value);
            resources.set(sub, Object::Dictionary(dict));
        }
    }
}

fn append_page_content(
    doc: &mut Document,
    page_id: ObjectId,
    stream_id: ObjectId,
) -> Result<(), DocumentError> {
    let page = doc
        .get_dictionary_mut(page_id)
        .map_err(|e| DocumentError::malformed("pdf", e))?;
    let contents = match page.get(b"Contents") {
        Ok(Object::Reference(id)) => {
            Object::Array(vec![Object::Reference(*id), Object::Reference(stream_id)])
        }
        Ok(Object::Array(existing)) => {
            let mut array = existing.clone();
            array.push(Object::Reference(stream_id));
            Object::Array(array)
        }
        _ => Object::Reference(stream_id),
    };
    page.set("Contents", contents);
    Ok(())
}

fn save_document(doc: &mut Document) -> Result<Vec<u8>, DocumentError> {
    let mut buf = Vec::new();
    doc.save_to(&mut buf)
        .map_err(|e| DocumentError::render("pdf", e))?;
    Ok(buf)
}

/// Word-wraps text to the given column width, preserving explicit line
/// breaks.
fn wrap_lines(text: &str, columns: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for raw_line in text.lines() {
        if raw_line.len() <= columns {
            lines.push(raw_line.to_string());
            continue;
        }
        let mut current = String::new();
        for word in raw_line.split_whitespace() {
            if !current.is_empty() && current.len() + word.len() + 1 > columns {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }
    lines
}

fn is_type(dict: &Dictionary, name: &[u8]) -> bool {
    dict.get(b"Type")
        .and_then(|o| o.as_name())
        .map(|n| n == name)
        .unwrap_or(false)
}
