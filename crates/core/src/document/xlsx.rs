//! Spreadsheet OOXML (xlsx) reading and CSV bridging.

use quick_xml::events::Event;
use quick_xml::Reader;

use super::error::DocumentError;
use super::ooxml::{build_zip, escape_xml, read_zip_entry};

/// Parses the cell text of the first worksheet, row by row.
///
/// Shared-string and inline-string cells are resolved; cells appear in
/// document order.
fn read_rows(bytes: &[u8]) -> Result<Vec<Vec<String>>, DocumentError> {
    let shared = read_shared_strings(bytes)?;
    let sheet = read_zip_entry(bytes, "xl/worksheets/sheet1.xml", "xlsx")?;

    let mut reader = Reader::from_str(&sheet);
    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut current_row: Vec<String> = Vec::new();
    let mut cell_type = CellType::Number;
    let mut in_value = false;
    let mut pending = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"row" => current_row = Vec::new(),
                b"c" => {
                    cell_type = CellType::Number;
                    for attr in e.attributes().flatten() {
                        if attr.key.as_ref() == b"t" {
                            cell_type = match attr.value.as_ref() {
                                b"s" => CellType::Shared,
                                b"inlineStr" => CellType::Inline,
                                _ => CellType::Number,
                            };
                        }
                    }
                }
                b"v" | b"t" => {
                    in_value = true;
                    pending.clear();
                }
                _ => {}
            },
            Ok(Event::Text(e)) if in_value => {
                pending.push_str(&e.unescape().unwrap_or_default());
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"v" | b"t" => {
                    in_value = false;
                    let value = match cell_type {
                        CellType::Shared => pending
                            .trim()
                            .parse::<usize>()
                            .ok()
                            .and_then(|i| shared.get(i).cloned())
                            .unwrap_or_else(|| pending.clone()),
                        _ => pending.clone(),
                    };
                    current_row.push(value);
                }
                b"row" => rows.push(std::mem::take(&mut current_row)),
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(DocumentError::malformed("xlsx", e)),
            _ => {}
        }
    }

    Ok(rows)
}

enum CellType {
    Number,
    Shared,
    Inline,
}

fn read_shared_strings(bytes: &[u8]) -> Result<Vec<String>, DocumentError> {
    let xml = match read_zip_entry(bytes, "xl/sharedStrings.xml", "xlsx") {
        Ok(xml) => xml,
        // Workbooks without shared strings are valid.
        Err(_) => return Ok(Vec::new()),
    };

    let mut reader = Reader::from_str(&xml);
    let mut strings = Vec::new();
    let mut current = String::new();
    let mut in_item = false;
    let mut in_text = false;
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"si" => {
                    in_item = true;
                    current.clear();
                }
                b"t" if in_item => in_text = true,
                _ => {}
            },
            Ok(Event::Text(e)) if in_text => {
                current.push_str(&e.unescape().unwrap_or_default());
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"t" => in_text = false,
                b"si" => {
                    in_item = false;
                    strings.push(current.clone());
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(DocumentError::malformed("xlsx", e)),
            _ => {}
        }
    }
    Ok(strings)
}

/// Converts the first worksheet of an xlsx workbook to CSV text.
pub fn xlsx_to_csv(bytes: &[u8]) -> Result<Vec<u8>, DocumentError> {
    let rows = read_rows(bytes)?;
    let mut csv = String::new();
    for row in rows {
        let line: Vec<String> = row.iter().map(|cell| csv_field(cell)).collect();
        csv.push_str(&line.join(","));
        csv.push('\n');
    }
    Ok(csv.into_bytes())
}

/// Renders worksheet content as readable text, one line per row.
pub fn xlsx_to_text(bytes: &[u8]) -> Result<String, DocumentError> {
    let rows = read_rows(bytes)?;
    let mut text = String::from("Data from spreadsheet:\n");
    for (i, row) in rows.iter().enumerate() {
        text.push_str(&format!("Row {}: {}\n", i + 1, row.join(" | ")));
    }
    Ok(text.trim_end().to_string())
}

fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Builds a minimal single-sheet xlsx workbook from CSV text using
/// inline-string cells.
pub fn csv_to_xlsx(csv_text: &str) -> Result<Vec<u8>, DocumentError> {
    let mut sheet = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
         <worksheet xmlns=\"http://schemas.openxmlformats.org/spreadsheetml/2006/main\">\
         <sheetData>",
    );
    for (i, line) in csv_text.lines().enumerate() {
        sheet.push_str(&format!("<row r=\"{}\">", i + 1));
        for field in parse_csv_line(line) {
            sheet.push_str(&format!(
                "<c t=\"inlineStr\"><is><t xml:space=\"preserve\">{}</t></is></c>",
                escape_xml(&field)
            ));
        }
        sheet.push_str("</row>");
    }
    sheet.push_str("</sheetData></worksheet>");

    let content_types = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
        <Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">\
        <Default Extension=\"rels\" ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/>\
        <Default Extension=\"xml\" ContentType=\"application/xml\"/>\
        <Override PartName=\"/xl/workbook.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml\"/>\
        <Override PartName=\"/xl/worksheets/sheet1.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml\"/>\
        </Types>";

    let rels = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
        <Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\
        <Relationship Id=\"rId1\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument\" Target=\"xl/workbook.xml\"/>\
        </Relationships>";

    let workbook = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
        <workbook xmlns=\"http://schemas.openxmlformats.org/spreadsheetml/2006/main\" \
        xmlns:r=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships\">\
        <sheets><sheet name=\"Sheet1\" sheetId=\"1\" r:id=\"rId1\"/></sheets></workbook>";

    let workbook_rels = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
        <Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\
        <Relationship Id=\"rId1\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet\" Target=\"worksheets/sheet1.xml\"/>\
        </Relationships>";

    build_zip(
        &[
            ("[Content_Types].xml", content_types.as_bytes()),
            ("_rels/.rels", rels.as_bytes()),
            ("xl/workbook.xml", workbook.as_bytes()),
            ("xl/_rels/workbook.xml.rels", workbook_rels.as_bytes()),
            ("xl/worksheets/sheet1.xml", sheet.as_bytes()),
        ],
        "xlsx",
    )
}

/// Minimal CSV field splitting with double-quote handling.
fn parse_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_xlsx_round_trip() {
        let csv = "name,value\nalpha,1\n\"with,comma\",2\n";
        let xlsx = csv_to_xlsx(csv).unwrap();
        let back = String::from_utf8(xlsx_to_csv(&xlsx).unwrap()).unwrap();
        assert_eq!(back, csv);
    }

    #[test]
    fn test_xlsx_to_text_numbers_rows() {
        let xlsx = csv_to_xlsx("a,b\nc,d\n").unwrap();
        let text = xlsx_to_text(&xlsx).unwrap();
        assert!(text.contains("Row 1: a | b"));
        assert!(text.contains("Row 2: c | d"));
    }

    #[test]
    fn test_parse_csv_line_quotes() {
        assert_eq!(
            parse_csv_line("a,\"b,c\",\"d\"\"e\""),
            vec!["a", "b,c", "d\"e"]
        );
    }

    #[test]
    fn test_garbage_is_malformed() {
        assert!(matches!(
            xlsx_to_csv(b"not a workbook"),
            Err(DocumentError::Malformed { .. })
        ));
    }
}
