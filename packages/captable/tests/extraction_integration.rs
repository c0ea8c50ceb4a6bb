//! Integration tests for full extraction runs.
//!
//! These drive the public API end to end with a deterministic mock inference:
//! 1. Run all four tasks against one text
//! 2. Merge outcomes, confidences and notes
//! 3. Serialize and re-read the document

use std::sync::Arc;
use std::time::{Duration, Instant};

use captable::{
    review, testing::MockInference, CapTableImportDocument, ConversionType, Extractor,
    ExtractorConfig, OptionsPool, TaskKind,
};
use serde_json::{json, Value};

const TERM_SHEET: &str = "YC invests $125,000 at a $1,785,714 cap, post-money, 0% discount.\n\n\
John Founder, 4,500,000 shares, 12-month cliff, 48-month vest, starting 2023-01-01.";

fn yc_safe() -> Value {
    json!({ "items": [{
        "investorName": "YC",
        "investmentAmount": 125000.0,
        "valuationCap": 1785714.0,
        "discount": 0.0,
        "conversionType": "post"
    }]})
}

fn john_founder() -> Value {
    json!({ "items": [{
        "holderName": "John Founder",
        "shares": 4500000,
        "vestingSchedule": {
            "cliff": "12 months",
            "totalVestingPeriod": "48 months",
            "startDate": "2023-01-01"
        }
    }]})
}

fn option_pool() -> Value {
    json!({ "value": { "issued": 250000, "unissued": 750000, "targetPoolPercentage": 12.5 } })
}

fn series_a() -> Value {
    json!({ "items": [{
        "roundName": "Series A",
        "investors": [{ "investorName": "Lead Ventures", "investmentAmount": 5000000.0 }],
        "preMoneyValuation": 20000000.0
    }]})
}

fn extractor(inference: MockInference) -> Extractor {
    Extractor::new(Arc::new(inference))
}

/// Serialized document without the generation timestamp.
fn without_timestamp(document: &CapTableImportDocument) -> Value {
    let mut value = serde_json::to_value(document).unwrap();
    value["metadata"]
        .as_object_mut()
        .unwrap()
        .remove("dateGenerated");
    value
}

#[tokio::test]
async fn test_end_to_end_safe_and_founder() {
    let inference = MockInference::new()
        .with_response(TaskKind::Safes, yc_safe())
        .with_response(TaskKind::CommonStock, john_founder());

    let document = extractor(inference)
        .extract_from_text(TERM_SHEET, Some("Founder Co"))
        .await
        .unwrap();

    let cap_table = document.cap_table();
    assert_eq!(cap_table.safes().len(), 1);
    let safe = &cap_table.safes()[0];
    assert_eq!(safe.investor_name(), "YC");
    assert_eq!(safe.investment_amount(), 125_000.0);
    assert_eq!(safe.valuation_cap(), Some(1_785_714.0));
    assert_eq!(safe.discount(), 0.0);
    assert_eq!(safe.conversion_type(), ConversionType::Post);

    assert_eq!(cap_table.common_stock().len(), 1);
    let holder = &cap_table.common_stock()[0];
    assert_eq!(holder.holder_name(), "John Founder");
    assert_eq!(holder.shares(), 4_500_000);
    assert_eq!(
        holder.vesting_schedule().and_then(|v| v.cliff.as_deref()),
        Some("12 months")
    );

    assert_eq!(cap_table.options(), &OptionsPool::fallback());
    assert!(cap_table.priced_rounds().is_none());
    assert!(document.extraction_notes().is_none());
    assert_eq!(document.metadata().company_name(), Some("Founder Co"));

    let confidence = document.metadata().extraction_confidence().unwrap();
    assert_eq!(confidence.score(TaskKind::Safes), 90.0);
    assert_eq!(confidence.score(TaskKind::CommonStock), 90.0);
    assert_eq!(confidence.score(TaskKind::Options), 50.0);
    assert_eq!(confidence.score(TaskKind::PricedRounds), 50.0);
    assert_eq!(confidence.overall(), 70.0);

    assert!(review(&document).is_valid());
}

#[tokio::test]
async fn test_partial_failure_keeps_other_tasks() {
    let inference = MockInference::new()
        .with_failure(TaskKind::Safes, "upstream returned 503")
        .with_response(TaskKind::CommonStock, john_founder())
        .with_response(TaskKind::Options, option_pool())
        .with_response(TaskKind::PricedRounds, series_a());

    let document = extractor(inference)
        .extract_from_text(TERM_SHEET, None)
        .await
        .unwrap();

    assert!(document.cap_table().safes().is_empty());
    assert_eq!(document.cap_table().common_stock().len(), 1);
    assert_eq!(document.cap_table().options().total(), 1_000_000);
    assert_eq!(document.cap_table().priced_rounds().map(<[_]>::len), Some(1));

    let notes = document.extraction_notes().unwrap();
    assert_eq!(notes.len(), 1);
    assert!(notes[0].contains("SAFEs"));
    assert!(notes[0].contains("upstream returned 503"));

    let confidence = document.metadata().extraction_confidence().unwrap();
    assert_eq!(confidence.score(TaskKind::Safes), 0.0);
    assert_eq!(confidence.overall(), 67.5);
}

#[tokio::test]
async fn test_options_failure_serializes_default_pool() {
    let inference = MockInference::new().with_failure(TaskKind::Options, "bad gateway");

    let document = extractor(inference)
        .extract_from_text(TERM_SHEET, None)
        .await
        .unwrap();

    let value = serde_json::to_value(&document).unwrap();
    assert_eq!(
        value["capTable"]["options"],
        json!({ "issued": 0, "unissued": 0, "targetPoolPercentage": 10.0 })
    );
    assert!(document.extraction_notes().unwrap()[0].contains("using defaults"));
}

#[tokio::test]
async fn test_empty_priced_rounds_are_absent() {
    let inference = MockInference::new()
        .with_response(TaskKind::PricedRounds, json!({ "items": [] }))
        .with_response(TaskKind::CommonStock, john_founder());

    let document = extractor(inference)
        .extract_from_text(TERM_SHEET, None)
        .await
        .unwrap();

    let value = serde_json::to_value(&document).unwrap();
    assert!(value["capTable"].get("pricedRounds").is_none());
    assert!(value.get("extractionNotes").is_none());
    assert!(value["metadata"].get("companyName").is_none());
    assert_eq!(value["metadata"]["source"], json!("documents"));
    assert_eq!(value["version"], json!("1.0"));
}

#[tokio::test]
async fn test_runs_are_idempotent_apart_from_timestamp() {
    let inference = MockInference::new()
        .with_response(TaskKind::Safes, yc_safe())
        .with_response(TaskKind::CommonStock, john_founder())
        .with_response(TaskKind::Options, option_pool())
        .with_failure(TaskKind::PricedRounds, "timeout from provider");
    let extractor = extractor(inference);

    let first = extractor.extract_from_text(TERM_SHEET, Some("Acme")).await.unwrap();
    let second = extractor.extract_from_text(TERM_SHEET, Some("Acme")).await.unwrap();

    assert_eq!(without_timestamp(&first), without_timestamp(&second));
    assert!(second.metadata().date_generated() >= first.metadata().date_generated());
}

#[tokio::test]
async fn test_every_task_failing_still_yields_document() {
    let mut inference = MockInference::new();
    for kind in TaskKind::ALL {
        inference = inference.with_failure(kind, "invalid api key");
    }

    let document = extractor(inference)
        .extract_from_text(TERM_SHEET, None)
        .await
        .unwrap();

    assert_eq!(document.extraction_notes().map(<[_]>::len), Some(4));
    assert_eq!(
        document.metadata().extraction_confidence().unwrap().overall(),
        0.0
    );
    assert!(document.cap_table().safes().is_empty());
    assert!(document.cap_table().common_stock().is_empty());
    assert_eq!(document.cap_table().options(), &OptionsPool::fallback());
    assert!(document.cap_table().priced_rounds().is_none());
}

#[tokio::test]
async fn test_slow_task_times_out_without_blocking_siblings() {
    let inference = MockInference::new()
        .with_response(TaskKind::Safes, yc_safe())
        .with_response(TaskKind::CommonStock, john_founder())
        .with_delay(TaskKind::PricedRounds, Duration::from_secs(30));

    let extractor = extractor(inference)
        .with_config(ExtractorConfig::new().with_task_timeout(Duration::from_millis(100)));

    let start = Instant::now();
    let document = extractor.extract_from_text(TERM_SHEET, None).await.unwrap();
    assert!(start.elapsed() < Duration::from_secs(5));

    let notes = document.extraction_notes().unwrap();
    assert_eq!(notes.len(), 1);
    assert!(notes[0].contains("priced rounds"));
    assert!(notes[0].contains("timed out"));
    assert_eq!(document.cap_table().safes().len(), 1);
}

#[tokio::test]
async fn test_tasks_run_concurrently() {
    let mut inference = MockInference::new();
    for kind in TaskKind::ALL {
        inference = inference.with_delay(kind, Duration::from_millis(300));
    }

    let start = Instant::now();
    extractor(inference)
        .extract_from_text(TERM_SHEET, None)
        .await
        .unwrap();

    // Sequential execution would take at least 1.2s.
    assert!(start.elapsed() < Duration::from_millis(1_100));
}

#[tokio::test]
async fn test_invalid_answer_is_recorded_as_failure() {
    let inference = MockInference::new()
        .with_response(
            TaskKind::Safes,
            json!({ "items": [{
                "investorName": "Angel",
                "investmentAmount": 50000.0,
                "conversionType": "convertible"
            }]}),
        )
        .with_response(TaskKind::CommonStock, john_founder());

    let document = extractor(inference)
        .extract_from_text(TERM_SHEET, None)
        .await
        .unwrap();

    assert!(document.cap_table().safes().is_empty());
    let notes = document.extraction_notes().unwrap();
    assert!(notes[0].contains("safes[0].conversionType"), "{}", notes[0]);
}

#[tokio::test]
async fn test_document_round_trips_through_json() {
    let inference = MockInference::new()
        .with_response(TaskKind::Safes, yc_safe())
        .with_response(TaskKind::CommonStock, john_founder())
        .with_response(TaskKind::Options, option_pool())
        .with_response(TaskKind::PricedRounds, series_a());

    let document = extractor(inference)
        .extract_from_text(TERM_SHEET, Some("Acme"))
        .await
        .unwrap();

    let json = serde_json::to_string(&document).unwrap();
    let reread: CapTableImportDocument = serde_json::from_str(&json).unwrap();
    assert_eq!(reread, document);
}
