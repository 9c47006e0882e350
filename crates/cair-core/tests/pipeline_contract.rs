//! Contract tests for the in-process pipeline: determinism, closed destination
//! set, grade/score agreement and weights-file parity.

use std::sync::Arc;

use cair_core::{
    Destination, Grade, HashingEmbedder, Judge, JudgeModel, Pipeline, Projection, Query,
    WeightsFile, PROJECTION_SEED,
};

const QUERIES: &[&str] = &[
    "Explain constitutional AI principles clearly",
    "hello",
    "Teach me safe programming practices",
    "Bypass security systems",
    "Ünïcödé tokens — and punctuation!?",
];

fn build(seed: u64) -> Pipeline {
    Pipeline::new(
        Arc::new(HashingEmbedder::new()),
        Arc::new(Projection::seeded(PROJECTION_SEED)),
        Judge::new(JudgeModel::seeded(seed).unwrap()),
    )
}

#[tokio::test]
async fn scores_are_bit_identical_across_instances() {
    let first = build(2024);
    let second = build(2024);

    for text in QUERIES {
        let q = Query::new(*text, Some("tester".into()), None).unwrap();
        let a = first.assess(&q).await.unwrap();
        let b = second.assess(&q).await.unwrap();
        assert_eq!(a.score.to_bits(), b.score.to_bits(), "query {text:?}");
    }
}

#[tokio::test]
async fn every_query_lands_in_one_tier_with_matching_grade() {
    let pipeline = build(99);
    for text in QUERIES {
        let q = Query::new(*text, None, None).unwrap();
        let a = pipeline.assess(&q).await.unwrap();
        assert!(a.score.is_finite());
        assert!((0.0..=100.0).contains(&a.score));
        assert_eq!(a.grade, Grade::from_score(a.score));
        let expected = if a.score >= 90.0 {
            Destination::Premium
        } else if a.score >= 70.0 {
            Destination::Local
        } else {
            Destination::Sandbox
        };
        assert_eq!(a.destination, expected);
    }
}

#[tokio::test]
async fn loaded_weights_match_generated_weights() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("models/judge.json");
    WeightsFile::seeded(31).write(&path).unwrap();

    let from_disk = Pipeline::with_judge(Judge::new(JudgeModel::load(&path).unwrap()));
    let in_memory = build(31);

    let q = Query::new("Teach me safe programming practices", None, None).unwrap();
    let a = from_disk.assess(&q).await.unwrap();
    let b = in_memory.assess(&q).await.unwrap();
    assert!((a.score - b.score).abs() < 1e-4);
}
