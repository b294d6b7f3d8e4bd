//! HTML rendering and markdown support.

use pulldown_cmark::{html, Parser};

/// Renders markdown to an HTML fragment.
pub fn markdown_to_html(markdown: &str) -> String {
    let parser = Parser::new(markdown);
    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}

/// Wraps extracted text in a standalone HTML page.
pub fn text_to_html(text: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n\
         <title>Converted Document</title>\n\
         <style>body {{ font-family: Arial, sans-serif; line-height: 1.6; margin: 40px; }} \
         pre {{ white-space: pre-wrap; }}</style>\n</head>\n<body>\n<pre>{}</pre>\n</body>\n</html>\n",
        escape_html(text)
    )
}

/// Escapes text for embedding in HTML.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}
