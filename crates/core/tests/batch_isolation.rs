//! Batch processor integration tests.
//!
//! Verify per-entry failure isolation, silent skipping of unsupported
//! extensions, enumeration-order output, and the total-failure distinction.

mod common;

use common::{png_image, zip_archive, TestHarness};
use frantoio_core::{build_archive, BatchError, BatchProcessor, ConversionRequest};

#[tokio::test]
async fn test_partial_failure_isolation() {
    let harness = TestHarness::new();
    let processor = BatchProcessor::new(&harness.executor);

    // Five entries: two good images, one corrupt image, one text file and
    // one unknown extension. The last two are not image inputs and must be
    // skipped silently.
    let archive = zip_archive(&[
        ("a.png", png_image(16, 16).as_slice()),
        ("b.jpg", png_image(8, 8).as_slice()),
        ("c.png", b"this is not an image"),
        ("d.txt", b"readme"),
        ("e.xyz", b"mystery"),
    ]);

    let request = ConversionRequest::new("png");
    let outcome = processor.process_archive(&archive, &request).await.unwrap();

    assert_eq!(outcome.successes.len(), 2);
    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(outcome.successes[0].0, "a_processed.png");
    assert_eq!(outcome.successes[1].0, "b_processed.png");
    assert_eq!(outcome.errors[0].entry_name, "c.png");
    assert!(outcome.is_partial());

    let warnings = outcome.warnings();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("c.png"));
}

#[tokio::test]
async fn test_batch_output_archive_preserves_order() {
    let harness = TestHarness::new();
    let processor = BatchProcessor::new(&harness.executor);

    let archive = zip_archive(&[
        ("third.png", png_image(4, 4).as_slice()),
        ("first.png", png_image(4, 4).as_slice()),
        ("second.png", png_image(4, 4).as_slice()),
    ]);

    let outcome = processor
        .process_archive(&archive, &ConversionRequest::new("bmp"))
        .await
        .unwrap();

    // Enumeration order of the input archive, not name order.
    let names: Vec<&str> = outcome.successes.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "third_processed.bmp",
            "first_processed.bmp",
            "second_processed.bmp"
        ]
    );

    let rebuilt = build_archive(&outcome.successes).unwrap();
    assert!(!rebuilt.is_empty());
}

#[tokio::test]
async fn test_zero_successes_is_batch_failure() {
    let harness = TestHarness::new();
    let processor = BatchProcessor::new(&harness.executor);

    let archive = zip_archive(&[("broken.png", b"garbage".as_slice())]);
    let result = processor
        .process_archive(&archive, &ConversionRequest::new("png"))
        .await;

    match result {
        Err(BatchError::TotalFailure { errors }) => {
            assert_eq!(errors.len(), 1);
            assert_eq!(errors[0].entry_name, "broken.png");
        }
        other => panic!("expected total failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_archive_with_no_matching_entries_fails() {
    let harness = TestHarness::new();
    let processor = BatchProcessor::new(&harness.executor);

    let archive = zip_archive(&[("readme.txt", b"text".as_slice())]);
    let result = processor
        .process_archive(&archive, &ConversionRequest::new("png"))
        .await;
    assert!(matches!(result, Err(BatchError::TotalFailure { errors }) if errors.is_empty()));
}

#[tokio::test]
async fn test_invalid_archive_rejected() {
    let harness = TestHarness::new();
    let processor = BatchProcessor::new(&harness.executor);

    let result = processor
        .process_archive(b"not a zip file", &ConversionRequest::new("png"))
        .await;
    assert!(matches!(result, Err(BatchError::InvalidArchive { .. })));
}

#[tokio::test]
async fn test_document_batch_uses_document_extension_set() {
    let harness = TestHarness::new();
    let processor = BatchProcessor::new(&harness.executor);

    let archive = zip_archive(&[
        ("notes.txt", b"some notes".as_slice()),
        ("image.png", png_image(4, 4).as_slice()),
    ]);

    let outcome = processor
        .process_archive(&archive, &ConversionRequest::new("pdf"))
        .await
        .unwrap();

    // Only the document entry matches a pdf batch; the image is skipped.
    assert_eq!(outcome.successes.len(), 1);
    assert_eq!(outcome.successes[0].0, "notes_processed.pdf");
    assert!(outcome.errors.is_empty());
}
