//! Document engines.
//!
//! Native fast paths for the formats the gateway understands directly:
//! OOXML containers (docx/xlsx/pptx), PDF via lopdf, minimal EPUB, HTML and
//! markdown. Everything here is consumed by the conversion strategy chain;
//! formats outside these engines go through the universal converter.

mod docx;
mod epub;
mod error;
mod extract;
mod html;
mod ooxml;
mod pdf;
mod pptx;
mod xlsx;

pub use docx::{docx_to_text, text_to_docx};
pub use epub::text_to_epub;
pub use error::DocumentError;
pub use extract::extract_text;
pub use html::{escape_html, markdown_to_html, text_to_html};
pub use pdf::{merge_pdfs, page_count, pdf_to_text, split_pdf, text_to_pdf, watermark_pdf};
pub use pptx::{error_deck, pptx_to_text, slides_to_pptx, split_into_slides};
pub use xlsx::{csv_to_xlsx, xlsx_to_csv, xlsx_to_text};
