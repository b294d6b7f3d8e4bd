//! Presentation OOXML (pptx) reading and writing.

use quick_xml::events::Event;
use quick_xml::Reader;

use super::error::DocumentError;
use super::ooxml::{build_zip, escape_xml, read_zip_entry, zip_entry_names};

/// Default character budget for one generated slide.
pub const CHARS_PER_SLIDE: usize = 500;

/// An empty zip container, used as the last-resort artifact when even the
/// error deck cannot be rendered.
const EMPTY_ZIP: [u8; 22] = [
    0x50, 0x4B, 0x05, 0x06, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
];

/// Extracts slide text, one `Slide N:` section per slide.
pub fn pptx_to_text(bytes: &[u8]) -> Result<String, DocumentError> {
    let mut slide_names: Vec<String> = zip_entry_names(bytes, "pptx")?
        .into_iter()
        .filter(|name| name.starts_with("ppt/slides/slide") && name.ends_with(".xml"))
        .collect();
    slide_names.sort_by_key(|name| slide_number(name));

    if slide_names.is_empty() {
        return Err(DocumentError::malformed("pptx", "no slides found"));
    }

    let mut text = String::new();
    for (i, name) in slide_names.iter().enumerate() {
        let xml = read_zip_entry(bytes, name, "pptx")?;
        text.push_str(&format!("Slide {}:\n", i + 1));
        for run in slide_text_runs(&xml)? {
            text.push_str(&run);
            text.push('\n');
        }
        text.push('\n');
    }
    Ok(text.trim_end().to_string())
}

fn slide_number(name: &str) -> u32 {
    name.trim_start_matches("ppt/slides/slide")
        .trim_end_matches(".xml")
        .parse()
        .unwrap_or(u32::MAX)
}

fn slide_text_runs(xml: &str) -> Result<Vec<String>, DocumentError> {
    let mut reader = Reader::from_str(xml);
    let mut runs = Vec::new();
    let mut in_text = false;
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"a:t" => in_text = true,
            Ok(Event::Text(e)) if in_text => {
                runs.push(e.unescape().unwrap_or_default().to_string());
            }
            Ok(Event::End(e)) if e.name().as_ref() == b"a:t" => in_text = false,
            Ok(Event::Eof) => break,
            Err(e) => return Err(DocumentError::malformed("pptx", e)),
            _ => {}
        }
    }
    Ok(runs)
}

/// Builds a minimal presentation: a title slide carrying the first body as
/// its subtitle, then one content slide per remaining body.
pub fn slides_to_pptx(title: &str, bodies: &[String]) -> Result<Vec<u8>, DocumentError> {
    let mut slides = Vec::new();
    match bodies.split_first() {
        Some((first, rest)) => {
            slides.push(slide_xml(&[title, first]));
            for body in rest {
                slides.push(slide_xml(&[body]));
            }
        }
        None => slides.push(slide_xml(&[title])),
    }

    let mut content_types = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
         <Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">\
         <Default Extension=\"rels\" ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/>\
         <Default Extension=\"xml\" ContentType=\"application/xml\"/>\
         <Override PartName=\"/ppt/presentation.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml\"/>",
    );
    for i in 1..=slides.len() {
        content_types.push_str(&format!(
            "<Override PartName=\"/ppt/slides/slide{i}.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.presentationml.slide+xml\"/>"
        ));
    }
    content_types.push_str("</Types>");

    let rels = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
        <Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\
        <Relationship Id=\"rId1\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument\" Target=\"ppt/presentation.xml\"/>\
        </Relationships>";

    let mut slide_ids = String::new();
    let mut slide_rels = String::new();
    for i in 1..=slides.len() {
        slide_ids.push_str(&format!("<p:sldId id=\"{}\" r:id=\"rId{i}\"/>", 255 + i));
        slide_rels.push_str(&format!(
            "<Relationship Id=\"rId{i}\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide\" Target=\"slides/slide{i}.xml\"/>"
        ));
    }

    let presentation = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
         <p:presentation xmlns:p=\"http://schemas.openxmlformats.org/presentationml/2006/main\" \
         xmlns:r=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships\">\
         <p:sldIdLst>{slide_ids}</p:sldIdLst>\
         <p:sldSz cx=\"9144000\" cy=\"6858000\"/></p:presentation>"
    );

    let presentation_rels = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
         <Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">{slide_rels}</Relationships>"
    );

    let mut entries: Vec<(String, Vec<u8>)> = vec![
        ("[Content_Types].xml".to_string(), content_types.into_bytes()),
        ("_rels/.rels".to_string(), rels.as_bytes().to_vec()),
        ("ppt/presentation.xml".to_string(), presentation.into_bytes()),
        (
            "ppt/_rels/presentation.xml.rels".to_string(),
            presentation_rels.into_bytes(),
        ),
    ];
    for (i, slide) in slides.into_iter().enumerate() {
        entries.push((format!("ppt/slides/slide{}.xml", i + 1), slide.into_bytes()));
    }

    let borrowed: Vec<(&str, &[u8])> = entries
        .iter()
        .map(|(name, content)| (name.as_str(), content.as_slice()))
        .collect();
    build_zip(&borrowed, "pptx")
}

fn slide_xml(paragraphs: &[&str]) -> String {
    let mut shapes = String::new();
    for (i, paragraph) in paragraphs.iter().enumerate() {
        let mut runs = String::new();
        for line in paragraph.split('\n') {
            runs.push_str(&format!(
                "<a:p><a:r><a:t>{}</a:t></a:r></a:p>",
                escape_xml(line)
            ));
        }
        shapes.push_str(&format!(
            "<p:sp><p:nvSpPr><p:cNvPr id=\"{}\" name=\"Text\"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr>\
             <p:spPr/><p:txBody><a:bodyPr/>{runs}</p:txBody></p:sp>",
            i + 2
        ));
    }

    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
         <p:sld xmlns:a=\"http://schemas.openxmlformats.org/drawingml/2006/main\" \
         xmlns:p=\"http://schemas.openxmlformats.org/presentationml/2006/main\">\
         <p:cSld><p:spTree>\
         <p:nvGrpSpPr><p:cNvPr id=\"1\" name=\"\"/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>\
         <p:grpSpPr/>{shapes}</p:spTree></p:cSld></p:sld>"
    )
}

/// Builds the terminal single-slide error artifact.
///
/// This is the authoritative end of the presentation fallback chain and
/// must not fail: if even the deck cannot be rendered it degrades to a
/// static empty container.
pub fn error_deck(message: &str) -> Vec<u8> {
    let body = format!("An error occurred during conversion:\n\n{message}");
    match slides_to_pptx("Conversion Error", &[body]) {
        Ok(bytes) => bytes,
        Err(_) => EMPTY_ZIP.to_vec(),
    }
}

/// Splits text into word-boundary chunks of at most `max_chars` characters.
/// Words are never split across chunks.
pub fn split_into_slides(text: &str, max_chars: usize) -> Vec<String> {
    if text.len() <= max_chars {
        return vec![text.to_string()];
    }

    let mut slides = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.len() + word.len() + 1 > max_chars {
            slides.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        slides.push(current);
    }

    if slides.is_empty() {
        vec![text.to_string()]
    } else {
        slides
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pptx_round_trip() {
        let bodies = vec!["intro text".to_string(), "second slide".to_string()];
        let bytes = slides_to_pptx("My Deck", &bodies).unwrap();
        let text = pptx_to_text(&bytes).unwrap();
        assert!(text.contains("Slide 1:"));
        assert!(text.contains("My Deck"));
        assert!(text.contains("intro text"));
        assert!(text.contains("Slide 2:"));
        assert!(text.contains("second slide"));
    }

    #[test]
    fn test_error_deck_never_fails() {
        let bytes = error_deck("primary encoder exploded");
        let text = pptx_to_text(&bytes).unwrap();
        assert!(text.contains("Conversion Error"));
        assert!(text.contains("primary encoder exploded"));
    }

    #[test]
    fn test_error_deck_escapes_markup() {
        let bytes = error_deck("<oops> & </oops>");
        let text = pptx_to_text(&bytes).unwrap();
        assert!(text.contains("<oops> & </oops>"));
    }

    #[test]
    fn test_split_never_breaks_words() {
        let text = "alpha beta gamma delta epsilon".repeat(40);
        let slides = split_into_slides(&text, 100);
        assert!(slides.len() > 1);
        for slide in &slides {
            assert!(slide.len() <= 100);
            for word in slide.split_whitespace() {
                assert!(["alpha", "beta", "gamma", "delta", "epsilonalpha", "epsilon"]
                    .contains(&word));
            }
        }
    }

    #[test]
    fn test_split_short_text_single_slide() {
        assert_eq!(split_into_slides("short", 500), vec!["short"]);
    }
}
