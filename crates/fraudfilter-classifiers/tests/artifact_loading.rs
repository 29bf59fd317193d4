//! Registry loading and end-to-end classification with real artifact files

use fraudfilter_classifiers::source::{FieldValue, Table};
use fraudfilter_classifiers::{
    IngestConfig, LogisticArtifact, ModelConfig, ModelRegistry, ReviewPipeline, ReviewSource,
    VectorizerArtifact,
};
use fraudfilter_core::{DetectionStatus, Error, Label, ReviewId};
use std::collections::HashMap;
use std::path::Path;
use tempfile::TempDir;

const TERMS: &[&str] = &[
    "amazing", "best", "ever", "perfect", "broke", "returned", "week", "fine",
];

/// Weights push superlatives towards CG (computer generated) and concrete
/// complaints towards OR (original)
const WEIGHTS: &[f32] = &[3.0, 3.0, 1.5, 2.5, -3.0, -2.5, -1.0, -0.5];

fn vectorizer_artifact() -> VectorizerArtifact {
    let vocabulary: HashMap<String, usize> = TERMS
        .iter()
        .enumerate()
        .map(|(i, t)| (t.to_string(), i))
        .collect();
    let mut artifact = VectorizerArtifact::new(vocabulary, vec![1.2; TERMS.len()]);
    artifact.max_input_chars = 200;
    artifact
}

fn classifier_artifact() -> LogisticArtifact {
    LogisticArtifact {
        classes: vec!["OR".to_string(), "CG".to_string()],
        coef: WEIGHTS.to_vec(),
        intercept: -0.2,
        fake_class: "CG".to_string(),
    }
}

fn write_artifacts(dir: &Path, vectorizer: &VectorizerArtifact, classifier: &LogisticArtifact) {
    std::fs::write(
        dir.join("vectorizer.json"),
        serde_json::to_string(vectorizer).unwrap(),
    )
    .unwrap();
    std::fs::write(
        dir.join("classifier.json"),
        serde_json::to_string(classifier).unwrap(),
    )
    .unwrap();
}

fn model_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    write_artifacts(dir.path(), &vectorizer_artifact(), &classifier_artifact());
    dir
}

#[test]
fn test_registry_loads_artifacts() {
    let dir = model_dir();
    let registry = ModelRegistry::initialize(&ModelConfig::from_local(dir.path()));

    assert!(registry.is_ready());
    let metadata = registry.metadata().unwrap();
    assert_eq!(metadata.dimension, TERMS.len());
    assert_eq!(metadata.transformer, "vectorizer");
    assert_eq!(metadata.classifier, "classifier");
}

#[test]
fn test_corrupt_artifact_leaves_registry_unavailable() {
    let dir = model_dir();
    std::fs::write(dir.path().join("classifier.json"), "{ not json").unwrap();

    let registry = ModelRegistry::initialize(&ModelConfig::from_local(dir.path()));
    assert!(!registry.is_ready());
    assert!(registry
        .unavailable_reason()
        .unwrap()
        .contains("Failed to load classifier"));
}

#[test]
fn test_dimension_mismatch_leaves_registry_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let mut classifier = classifier_artifact();
    classifier.coef.push(0.1);
    write_artifacts(dir.path(), &vectorizer_artifact(), &classifier);

    let registry = ModelRegistry::initialize(&ModelConfig::from_local(dir.path()));
    assert!(!registry.is_ready());
}

#[test]
fn test_end_to_end_classification() {
    let dir = model_dir();
    let registry = ModelRegistry::initialize(&ModelConfig::from_local(dir.path())).shared();
    let pipeline = ReviewPipeline::new(registry, IngestConfig::default());

    let mut table = Table::new(vec!["customer_review".to_string()]);
    for text in [
        "Amazing! Best purchase ever, PERFECT!",
        "It broke after a week and I returned it",
        "",
        "fine",
        "best best best amazing perfect",
    ] {
        table.push_row(vec![FieldValue::from(text)]);
    }

    let report = pipeline.analyze(ReviewSource::Tabular(table)).unwrap();

    assert_eq!(report.total_input, 5);
    assert_eq!(report.skipped_count, 1);
    assert_eq!(report.failed_count, 0);
    assert_eq!(report.status, DetectionStatus::Complete);
    assert_eq!(report.summary.total_reviews, 4);
    assert_eq!(report.summary.flagged_reviews, vec![ReviewId(0), ReviewId(4)]);
    assert_eq!(report.summary.fake_count, 2);
    assert!((report.summary.fake_rate - 0.5).abs() < 1e-12);
}

#[test]
fn test_oversized_review_fails_alone() {
    let dir = model_dir();
    let registry = ModelRegistry::initialize(&ModelConfig::from_local(dir.path())).shared();
    let pipeline = ReviewPipeline::new(registry, IngestConfig::default());

    let mut table = Table::new(vec!["customer_review".to_string()]);
    table.push_row(vec![FieldValue::from("amazing")]);
    table.push_row(vec![FieldValue::Text("word ".repeat(100))]);

    let report = pipeline.analyze(ReviewSource::Tabular(table)).unwrap();
    assert_eq!(report.failed_count, 1);
    assert_eq!(report.failed_reviews[0].review_id, ReviewId(1));
    assert_eq!(report.summary.total_reviews, 1);
    assert_eq!(report.status, DetectionStatus::Partial);
}

#[test]
fn test_same_text_same_verdict() {
    let dir = model_dir();
    let registry = ModelRegistry::initialize(&ModelConfig::from_local(dir.path())).shared();
    let engine = fraudfilter_classifiers::DetectionEngine::new(registry);

    let review = fraudfilter_core::Review::new(ReviewId(0), "best ever").unwrap();
    let first = engine.classify(std::slice::from_ref(&review)).unwrap();
    let second = engine.classify(std::slice::from_ref(&review)).unwrap();

    assert_eq!(first.verdicts, second.verdicts);
    assert_eq!(first.verdicts[0].label, Label::Fake);
}

#[test]
fn test_unavailable_pipeline() {
    let config = ModelConfig::from_local("/definitely/missing");
    let registry = ModelRegistry::initialize(&config).shared();
    let pipeline = ReviewPipeline::new(registry, IngestConfig::default());

    let mut table = Table::new(vec!["customer_review".to_string()]);
    table.push_row(vec![FieldValue::from("amazing")]);

    let err = pipeline.analyze(ReviewSource::Tabular(table)).unwrap_err();
    assert!(matches!(err, Error::ModelUnavailable(_)));
}
