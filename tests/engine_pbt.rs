//! Property-Based Tests for the Recommendation Engine
//!
//! Tests the following invariants over randomized datasets:
//! - Every returned score lies in [0, 1]
//! - Hybrid score is the documented convex combination of its parts
//! - A quiz the learner already attempted never reappears in any method's
//!   output
//! - Output length never exceeds the requested n
//! - Recommendations are deterministic for identical inputs

use proptest::prelude::*;
use std::collections::HashSet;

use quizrec_algo::{
    Difficulty, HybridEngine, LearnerProfile, PerformanceRecord, QuizMeta, RecommendationEntry,
};

const TOPICS: [&str; 3] = ["math", "physics", "chemistry"];

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_proficiency() -> impl Strategy<Value = f64> {
    (0u64..=1000u64).prop_map(|v| v as f64 / 1000.0)
}

fn arb_difficulty() -> impl Strategy<Value = Difficulty> {
    prop_oneof![
        Just(Difficulty::Easy),
        Just(Difficulty::Medium),
        Just(Difficulty::Hard),
    ]
}

fn arb_learners(count: usize) -> impl Strategy<Value = Vec<LearnerProfile>> {
    proptest::collection::vec(
        (arb_proficiency(), arb_proficiency(), arb_proficiency()),
        count,
    )
    .prop_map(|profiles| {
        profiles
            .into_iter()
            .enumerate()
            .map(|(i, (math, physics, chemistry))| {
                LearnerProfile::new(format!("l{i}"), format!("Learner {i}"))
                    .with_topic(TOPICS[0], math)
                    .with_topic(TOPICS[1], physics)
                    .with_topic(TOPICS[2], chemistry)
            })
            .collect()
    })
}

fn arb_quizzes(count: usize) -> impl Strategy<Value = Vec<QuizMeta>> {
    proptest::collection::vec((0usize..TOPICS.len(), arb_difficulty()), count).prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(j, (topic_idx, difficulty))| {
                QuizMeta::new(format!("q{j}"), format!("Quiz {j}"), TOPICS[topic_idx], difficulty)
            })
            .collect()
    })
}

type Dataset = (Vec<LearnerProfile>, Vec<QuizMeta>, Vec<PerformanceRecord>);

fn arb_dataset() -> impl Strategy<Value = Dataset> {
    (1usize..=4, 1usize..=6).prop_flat_map(|(n_learners, n_quizzes)| {
        let records = proptest::collection::vec(
            (0..n_learners, 0..n_quizzes, 0u32..=100u32),
            0..=n_learners * n_quizzes,
        )
        .prop_map(|triples| {
            triples
                .into_iter()
                .map(|(i, j, score)| {
                    PerformanceRecord::new(format!("l{i}"), format!("q{j}"), f64::from(score))
                })
                .collect::<Vec<_>>()
        });
        (arb_learners(n_learners), arb_quizzes(n_quizzes), records)
    })
}

fn attempted_pairs(records: &[PerformanceRecord]) -> HashSet<(String, String)> {
    records
        .iter()
        .map(|r| (r.learner_id.clone(), r.quiz_id.clone()))
        .collect()
}

fn all_scores(entry: &RecommendationEntry) -> Vec<f64> {
    [entry.content_score, entry.collaborative_score, entry.hybrid_score]
        .into_iter()
        .flatten()
        .collect()
}

// ============================================================================
// Invariants
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_scores_bounded_and_attempted_excluded(
        (learners, quizzes, records) in arb_dataset(),
        n in 1usize..=6,
    ) {
        let attempted = attempted_pairs(&records);
        let learner_ids: Vec<String> = learners.iter().map(|l| l.id.clone()).collect();
        let mut engine = HybridEngine::new(learners, quizzes, records);

        for method in ["content", "collaborative", "hybrid"] {
            for learner_id in &learner_ids {
                let recs = engine.get_recommendations(learner_id, n, method).unwrap();
                prop_assert!(recs.len() <= n);
                for rec in &recs {
                    for score in all_scores(rec) {
                        prop_assert!(
                            (0.0..=1.0).contains(&score),
                            "{method} score {score} out of range"
                        );
                    }
                    prop_assert!(
                        !attempted.contains(&(learner_id.clone(), rec.quiz.id.clone())),
                        "{method} recommended attempted quiz {}",
                        rec.quiz.id
                    );
                }
            }
        }
    }

    #[test]
    fn prop_hybrid_is_weighted_blend(
        (learners, quizzes, records) in arb_dataset(),
        n in 1usize..=6,
    ) {
        let learner_ids: Vec<String> = learners.iter().map(|l| l.id.clone()).collect();
        let mut engine = HybridEngine::new(learners, quizzes, records);

        for learner_id in &learner_ids {
            for rec in engine.get_recommendations(learner_id, n, "hybrid").unwrap() {
                let content = rec.content_score.unwrap();
                let collaborative = rec.collaborative_score.unwrap();
                let expected = 0.6 * content + 0.4 * collaborative;
                prop_assert!((rec.hybrid_score.unwrap() - expected).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn prop_rankings_are_deterministic(
        (learners, quizzes, records) in arb_dataset(),
        n in 1usize..=6,
    ) {
        let learner_ids: Vec<String> = learners.iter().map(|l| l.id.clone()).collect();
        let mut first = HybridEngine::new(learners.clone(), quizzes.clone(), records.clone());
        let mut second = HybridEngine::new(learners, quizzes, records);

        for learner_id in &learner_ids {
            for method in ["content", "collaborative", "hybrid"] {
                let a = first.get_recommendations(learner_id, n, method).unwrap();
                let b = second.get_recommendations(learner_id, n, method).unwrap();
                let ids_a: Vec<&str> = a.iter().map(|r| r.quiz.id.as_str()).collect();
                let ids_b: Vec<&str> = b.iter().map(|r| r.quiz.id.as_str()).collect();
                prop_assert_eq!(ids_a, ids_b);
            }
        }
    }

    #[test]
    fn prop_rankings_descend(
        (learners, quizzes, records) in arb_dataset(),
    ) {
        let learner_ids: Vec<String> = learners.iter().map(|l| l.id.clone()).collect();
        let mut engine = HybridEngine::new(learners, quizzes, records);

        for learner_id in &learner_ids {
            let recs = engine.get_recommendations(learner_id, 10, "hybrid").unwrap();
            for pair in recs.windows(2) {
                prop_assert!(pair[0].hybrid_score >= pair[1].hybrid_score);
            }
        }
    }

    #[test]
    fn prop_evaluate_never_panics_and_stays_finite(
        (learners, quizzes, records) in arb_dataset(),
        fraction in 0.0f64..=1.0,
    ) {
        let mut engine = HybridEngine::new(learners, quizzes, records);
        let metrics = engine.evaluate(fraction);
        prop_assert!(metrics.rmse.is_finite() && metrics.rmse >= 0.0);
        prop_assert!(metrics.mae.is_finite() && metrics.mae >= 0.0);
    }
}
