//! Merge and split engine integration tests.

mod common;

use common::TestHarness;
use frantoio_core::document::{extract_text, page_count};
use frantoio_core::{ComposeError, MergeEngine, SplitEngine, SplitSpec};

#[tokio::test]
async fn test_merge_to_pdf_replaces_failed_input_with_placeholder() -> anyhow::Result<()> {
    let harness = TestHarness::new();
    harness.universal.set_always_fail(true).await;
    let engine = MergeEngine::new(&harness.executor);

    // Document two is a corrupt docx: its conversion exhausts the chain
    // and must contribute an error placeholder page, not disappear.
    let documents = vec![
        ("one.txt".to_string(), b"first document".to_vec()),
        ("two.docx".to_string(), b"not really a docx".to_vec()),
        ("three.txt".to_string(), b"third document".to_vec()),
    ];

    let merged = engine.merge(&documents, "pdf").await?;
    assert_eq!(page_count(&merged)?, 3);

    let text = harness.executor.pdf_text(&merged);
    assert!(text.contains("first document"));
    assert!(text.contains("Failed to convert two.docx"));
    assert!(text.contains("third document"));
    Ok(())
}

#[tokio::test]
async fn test_merge_keeps_submission_order() {
    let harness = TestHarness::new();
    let engine = MergeEngine::new(&harness.executor);

    let documents = vec![
        ("b.txt".to_string(), b"bravo".to_vec()),
        ("a.txt".to_string(), b"alpha".to_vec()),
    ];

    let merged = engine.merge(&documents, "pdf").await.unwrap();
    let text = harness.executor.pdf_text(&merged);
    let bravo = text.find("bravo").unwrap();
    let alpha = text.find("alpha").unwrap();
    assert!(bravo < alpha);
}

#[tokio::test]
async fn test_merge_requires_two_documents() {
    let harness = TestHarness::new();
    let engine = MergeEngine::new(&harness.executor);

    let documents = vec![("only.txt".to_string(), b"alone".to_vec())];
    let result = engine.merge(&documents, "pdf").await;
    assert!(matches!(
        result,
        Err(ComposeError::NotEnoughInputs { count: 1 })
    ));
}

#[tokio::test]
async fn test_merge_to_text_adds_document_headers() {
    let harness = TestHarness::new();
    let engine = MergeEngine::new(&harness.executor);

    let documents = vec![
        ("one.txt".to_string(), b"first body".to_vec()),
        ("two.txt".to_string(), b"second body".to_vec()),
    ];

    let merged = engine.merge(&documents, "txt").await.unwrap();
    let text = String::from_utf8(merged).unwrap();
    assert!(text.contains("=== Document 1: one.txt ==="));
    assert!(text.contains("first body"));
    assert!(text.contains("=== Document 2: two.txt ==="));
    assert!(text.contains("second body"));
}

#[tokio::test]
async fn test_merge_rejects_unsupported_target() {
    let harness = TestHarness::new();
    let engine = MergeEngine::new(&harness.executor);

    let documents = vec![
        ("one.txt".to_string(), b"a".to_vec()),
        ("two.txt".to_string(), b"b".to_vec()),
    ];
    let result = engine.merge(&documents, "mp3").await;
    assert!(matches!(result, Err(ComposeError::Format(_))));
}

#[test]
fn test_split_text_by_content_length() {
    let text = "alpha beta gamma ".repeat(100);
    let parts = SplitEngine
        .split(
            text.as_bytes(),
            "input.txt",
            SplitSpec::Content { max_chars: 400 },
        )
        .unwrap();

    assert!(parts.len() > 1);
    for (i, (name, bytes)) in parts.iter().enumerate() {
        assert_eq!(name, &format!("split_{}.txt", i + 1));
        let chunk = String::from_utf8(bytes.clone()).unwrap();
        assert!(chunk.len() <= 400);
        // Words are never split across chunk boundaries.
        assert!(chunk
            .split_whitespace()
            .all(|w| ["alpha", "beta", "gamma"].contains(&w)));
    }
}

#[test]
fn test_split_pdf_by_page_count() -> anyhow::Result<()> {
    let pdf = frantoio_core::document::text_to_pdf(&"content line\n".repeat(150))?;
    let total = page_count(&pdf)?;
    assert!(total >= 3);

    let parts = SplitEngine.split(&pdf, "doc.pdf", SplitSpec::Pages { per_chunk: 2 })?;

    assert_eq!(parts.len(), total.div_ceil(2));
    let mut pages_across = 0;
    for (_, bytes) in &parts {
        pages_across += page_count(bytes)?;
    }
    assert_eq!(pages_across, total);
    Ok(())
}

#[test]
fn test_split_docx_chunks_stay_readable() {
    let docx = frantoio_core::document::text_to_docx(&"sentence ".repeat(500)).unwrap();
    let parts = SplitEngine
        .split(&docx, "report.docx", SplitSpec::Content { max_chars: 800 })
        .unwrap();

    assert!(parts.len() > 1);
    for (name, bytes) in &parts {
        assert!(name.ends_with(".docx"));
        assert!(extract_text(bytes, "docx").contains("sentence"));
    }
}
