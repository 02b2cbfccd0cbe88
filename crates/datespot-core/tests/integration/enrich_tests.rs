//! Integration tests for EnrichService.
//!
//! These tests run the full read → enrich → write stage against temporary
//! files with a mock generation provider.

use datespot_core::enrich::{FALLBACK_SUMMARY, SYSTEM_PROMPT};
use datespot_core::{
    AppError, EnrichConfig, EnrichService, PlaceDocument, SilentReporter, read_collection,
};
use tempfile::TempDir;

use crate::integration::common::{
    MockSummaryGenerator, place, read_text, write_fixture, write_text_fixture,
};

/// A record without a summary gets one from the provider.
#[tokio::test]
async fn test_enrich_fills_missing_summary() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("final_data.json");
    std::fs::write(
        &input,
        r#"[{"name": "Cafe A", "category": "cafe", "address": "Seoul", "reviewSummary": "", "kakao_id": "100"}]"#,
    )
    .unwrap();
    let output = dir.path().join("out/final_data_with_reviews.json");

    let generator = MockSummaryGenerator::new();
    let service = EnrichService::new(generator.clone(), EnrichConfig::new(&input, &output));

    let stats = service.process_enrichment(&SilentReporter).await.unwrap();

    assert_eq!(stats.total, 1);
    assert_eq!(stats.updated, 1);
    assert_eq!(stats.skipped, 0);
    assert_eq!(stats.fallbacks, 0);

    let records: Vec<serde_json::Value> = read_collection(&output).unwrap();
    assert_eq!(
        records[0]["reviewSummary"],
        MockSummaryGenerator::expected_summary("Cafe A")
    );
    assert_eq!(generator.calls(), 1);
}

/// The request carries the fixed instruction and sampling settings.
#[tokio::test]
async fn test_enrich_request_shape() {
    let dir = TempDir::new().unwrap();
    let input = write_fixture(&dir, "in.json", &[place("1", "한강공원", None)]);
    let output = dir.path().join("out.json");

    let generator = MockSummaryGenerator::new();
    let service = EnrichService::new(generator.clone(), EnrichConfig::new(&input, &output));
    service.process_enrichment(&SilentReporter).await.unwrap();

    let requests = generator.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].system, SYSTEM_PROMPT);
    assert_eq!(requests[0].temperature, 0.7);
    assert_eq!(requests[0].max_tokens, 100);
    assert!(requests[0].user.contains("- 이름: 한강공원"));
    assert!(requests[0].user.contains("- 카테고리: cafe"));
    assert!(requests[0].user.contains("- 주소: Seoul"));
}

/// Records with a summary are skipped and written back byte-for-byte.
#[tokio::test]
async fn test_enrich_skips_existing_summary() {
    let dir = TempDir::new().unwrap();
    // Two-space pretty layout, keys out of alphabetical order, an integer
    // rating, a null and an unknown key.
    let original = r#"[
  {
    "name": "Cafe B",
    "reviewSummary": "이미 있음",
    "rating": 4,
    "kakao_id": "200",
    "image_url": null,
    "description": "kept as-is",
    "category": "cafe"
  }
]"#;
    let input = write_text_fixture(&dir, "in.json", original);
    let output = dir.path().join("out.json");

    let generator = MockSummaryGenerator::new();
    let service = EnrichService::new(generator.clone(), EnrichConfig::new(&input, &output));
    let stats = service.process_enrichment(&SilentReporter).await.unwrap();

    assert_eq!(stats.updated, 0);
    assert_eq!(stats.skipped, 1);
    assert_eq!(generator.calls(), 0);
    assert_eq!(read_text(&output), original);
}

/// Only `reviewSummary` changes on an enriched record; every other key keeps
/// its position and value.
#[tokio::test]
async fn test_enrich_changes_only_review_summary() {
    let dir = TempDir::new().unwrap();
    let input = write_text_fixture(
        &dir,
        "in.json",
        r#"[
  {
    "name": "Cafe A",
    "reviewSummary": "",
    "rating": 4,
    "image_url": null,
    "kakao_id": "100"
  }
]"#,
    );
    let output = dir.path().join("out.json");

    EnrichService::new(MockSummaryGenerator::new(), EnrichConfig::new(&input, &output))
        .process_enrichment(&SilentReporter)
        .await
        .unwrap();

    let expected = format!(
        r#"[
  {{
    "name": "Cafe A",
    "reviewSummary": "{}",
    "rating": 4,
    "image_url": null,
    "kakao_id": "100"
  }}
]"#,
        MockSummaryGenerator::expected_summary("Cafe A")
    );
    assert_eq!(read_text(&output), expected);
}

/// Field types the prompt does not use are passed through untouched.
#[tokio::test]
async fn test_enrich_tolerates_unexpected_field_types() {
    let dir = TempDir::new().unwrap();
    let input = write_text_fixture(
        &dir,
        "in.json",
        r#"[
  {"name": "Cafe A", "kakao_id": 12345, "rating": "4.5", "imageUrls": "none"},
  {"name": "Cafe B", "kakao_id": 67890, "reviewSummary": "이미 있음", "serial_number": [1, 2]}
]"#,
    );
    let output = dir.path().join("out.json");

    let generator = MockSummaryGenerator::new();
    let stats = EnrichService::new(generator.clone(), EnrichConfig::new(&input, &output))
        .process_enrichment(&SilentReporter)
        .await
        .unwrap();

    assert_eq!(stats.updated, 1);
    assert_eq!(stats.skipped, 1);
    assert_eq!(generator.calls(), 1);

    let written: serde_json::Value = serde_json::from_str(&read_text(&output)).unwrap();
    assert_eq!(written[0]["kakao_id"], 12345);
    assert_eq!(written[0]["rating"], "4.5");
    assert_eq!(written[0]["imageUrls"], "none");
    assert_eq!(
        written[0]["reviewSummary"],
        MockSummaryGenerator::expected_summary("Cafe A")
    );
    assert_eq!(written[1]["serial_number"], serde_json::json!([1, 2]));
}

/// A failing call yields the fallback text and later records still get processed.
#[tokio::test]
async fn test_enrich_fallback_on_failure() {
    let dir = TempDir::new().unwrap();
    let input = write_fixture(
        &dir,
        "in.json",
        &[
            place("1", "First", None),
            place("2", "Broken", None),
            place("3", "Third", Some("")),
        ],
    );
    let output = dir.path().join("out.json");

    let generator = MockSummaryGenerator::failing_for(&["Broken"]);
    let service = EnrichService::new(generator.clone(), EnrichConfig::new(&input, &output));
    let stats = service.process_enrichment(&SilentReporter).await.unwrap();

    assert_eq!(stats.updated, 3);
    assert_eq!(stats.fallbacks, 1);
    assert_eq!(generator.calls(), 3);

    let records: Vec<PlaceDocument> = read_collection(&output).unwrap();
    let values: Vec<serde_json::Value> = read_collection(&output).unwrap();
    assert_eq!(values[1]["reviewSummary"], FALLBACK_SUMMARY);
    assert_eq!(
        values[2]["reviewSummary"],
        MockSummaryGenerator::expected_summary("Third")
    );
    assert!(records.iter().all(|r| !r.needs_summary()));
}

/// Feeding the output back in changes nothing.
#[tokio::test]
async fn test_enrich_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let input = write_fixture(
        &dir,
        "in.json",
        &[
            place("1", "A", None),
            place("2", "B", Some("수제 맥주 한잔하기 좋은 곳")),
            place("3", "C", None),
        ],
    );
    let first_out = dir.path().join("first.json");
    let second_out = dir.path().join("second.json");

    let generator = MockSummaryGenerator::new();
    EnrichService::new(generator.clone(), EnrichConfig::new(&input, &first_out))
        .process_enrichment(&SilentReporter)
        .await
        .unwrap();
    let calls_after_first = generator.calls();

    let stats = EnrichService::new(generator.clone(), EnrichConfig::new(&first_out, &second_out))
        .process_enrichment(&SilentReporter)
        .await
        .unwrap();

    assert_eq!(calls_after_first, 2);
    assert_eq!(generator.calls(), 2, "second pass must not call the provider");
    assert_eq!(stats.updated, 0);
    assert_eq!(stats.skipped, 3);
    assert_eq!(read_text(&first_out), read_text(&second_out));
}

/// Output keeps the input order.
#[tokio::test]
async fn test_enrich_preserves_order() {
    let dir = TempDir::new().unwrap();
    let names = ["Z", "A", "M", "B"];
    let records: Vec<_> = names
        .iter()
        .enumerate()
        .map(|(i, n)| place(&i.to_string(), n, None))
        .collect();
    let input = write_fixture(&dir, "in.json", &records);
    let output = dir.path().join("out.json");

    EnrichService::new(MockSummaryGenerator::new(), EnrichConfig::new(&input, &output))
        .process_enrichment(&SilentReporter)
        .await
        .unwrap();

    let written: Vec<PlaceDocument> = read_collection(&output).unwrap();
    let written_names: Vec<_> = written.iter().map(|r| r.name().into_owned()).collect();
    assert_eq!(written_names, names);
}

/// A missing input is reported and no output is produced.
#[tokio::test]
async fn test_enrich_missing_input() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("does-not-exist.json");
    let output = dir.path().join("out.json");

    let generator = MockSummaryGenerator::new();
    let service = EnrichService::new(generator.clone(), EnrichConfig::new(&input, &output));
    let err = service.process_enrichment(&SilentReporter).await.unwrap_err();

    assert!(matches!(err, AppError::InputNotFound(_)));
    assert!(!output.exists());
    assert_eq!(generator.calls(), 0);
}

/// An empty collection is written back as an empty array.
#[tokio::test]
async fn test_enrich_empty_collection() {
    let dir = TempDir::new().unwrap();
    let input = write_fixture(&dir, "in.json", &[]);
    let output = dir.path().join("out.json");

    let stats = EnrichService::new(MockSummaryGenerator::new(), EnrichConfig::new(&input, &output))
        .process_enrichment(&SilentReporter)
        .await
        .unwrap();

    assert_eq!(stats.total, 0);
    assert_eq!(read_text(&output), "[]");
}

/// Checkpoints are written every N new summaries.
#[tokio::test]
async fn test_enrich_checkpoints() {
    let dir = TempDir::new().unwrap();
    let input = write_fixture(
        &dir,
        "in.json",
        &[
            place("1", "A", None),
            place("2", "B", None),
            place("3", "C", Some("이미 있음")),
            place("4", "D", None),
        ],
    );
    let output = dir.path().join("out.json");
    let service = EnrichService::new(
        MockSummaryGenerator::new(),
        EnrichConfig::new(&input, &output).with_checkpoint_every(2),
    );

    let mut records: Vec<PlaceDocument> = read_collection(&input).unwrap();
    let mut snapshots = Vec::new();
    let stats = service
        .enrich(&mut records, &SilentReporter, |snapshot| {
            snapshots.push(snapshot.iter().filter(|r| !r.needs_summary()).count());
            Ok(())
        })
        .await
        .unwrap();

    assert_eq!(stats.updated, 3);
    // One checkpoint after the second new summary (A, B done, C pre-filled).
    assert_eq!(snapshots, vec![3]);
}

/// A checkpoint that cannot be written aborts the pass.
#[tokio::test]
async fn test_enrich_checkpoint_error_propagates() {
    let dir = TempDir::new().unwrap();
    let input = write_fixture(&dir, "in.json", &[place("1", "A", None)]);
    let service = EnrichService::new(
        MockSummaryGenerator::new(),
        EnrichConfig::new(&input, dir.path().join("out.json")).with_checkpoint_every(1),
    );

    let mut records: Vec<PlaceDocument> = read_collection(&input).unwrap();
    let result = service
        .enrich(&mut records, &SilentReporter, |_| {
            Err(AppError::io(
                dir.path().join("out.json"),
                std::io::Error::other("disk full"),
            ))
        })
        .await;

    assert!(matches!(result, Err(AppError::Io { .. })));
}

/// `generate_summary` returns the fallback for a failing place.
#[tokio::test]
async fn test_generate_summary_fallback() {
    let service = EnrichService::new(
        MockSummaryGenerator::failing_for(&["Nowhere"]),
        EnrichConfig::default(),
    );

    assert_eq!(
        service.generate_summary("Nowhere", "", "").await,
        FALLBACK_SUMMARY
    );
    assert_eq!(
        service.generate_summary("Cafe A", "cafe", "Seoul").await,
        MockSummaryGenerator::expected_summary("Cafe A")
    );
}
