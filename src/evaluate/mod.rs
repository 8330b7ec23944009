//! Offline Evaluator
//!
//! Holds out a fraction of the performance records, refits a fresh
//! collaborative model on the remainder, and reports prediction error over
//! the test records whose learner and quiz both appear in the train-fitted
//! index. Unpredictable test records are silently skipped.
//!
//! The split is a seeded shuffle, so identical inputs always produce
//! identical partitions and metrics.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::collaborative::CollaborativeModel;
use crate::prepare::{PreparedData, ScoreMatrix};
use crate::types::{EngineOptions, EvaluationMetrics};

/// Train/test split, refit, and error metrics over predictable pairs
///
/// `test_fraction` is clamped to [0, 1]; the test partition takes
/// `ceil(n * fraction)` records. Degenerate inputs (no records, an
/// untrainable train partition, or no predictable test record) yield
/// zero-valued metrics instead of an error.
pub fn evaluate(
    data: &PreparedData,
    test_fraction: f64,
    options: &EngineOptions,
) -> EvaluationMetrics {
    if !data.has_records() {
        return EvaluationMetrics::default();
    }

    let mut records = data.records.clone();
    let mut rng = ChaCha8Rng::seed_from_u64(options.seed);
    records.shuffle(&mut rng);

    let fraction = test_fraction.clamp(0.0, 1.0);
    let test_len = ((records.len() as f64) * fraction).ceil() as usize;
    let (test, train) = records.split_at(test_len.min(records.len()));
    let train_size = train.len();

    let model = CollaborativeModel::fit(ScoreMatrix::from_records(train), options);
    let Some(model) = model else {
        return EvaluationMetrics {
            train_size,
            ..EvaluationMetrics::default()
        };
    };

    let mut squared_sum = 0.0;
    let mut absolute_sum = 0.0;
    let mut predicted = 0usize;
    for record in test {
        if !model.contains_learner(&record.learner_id) || !model.contains_quiz(&record.quiz_id) {
            continue;
        }
        let error = model.predict(&record.learner_id, &record.quiz_id) - record.normalized_score();
        squared_sum += error * error;
        absolute_sum += error.abs();
        predicted += 1;
    }

    if predicted == 0 {
        return EvaluationMetrics {
            train_size,
            ..EvaluationMetrics::default()
        };
    }

    debug!(
        predicted,
        held_out = test.len(),
        "evaluation complete over predictable test pairs"
    );

    EvaluationMetrics {
        rmse: (squared_sum / predicted as f64).sqrt(),
        mae: absolute_sum / predicted as f64,
        train_size,
        test_size: test.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Difficulty, LearnerProfile, PerformanceRecord, QuizMeta};

    fn dense_dataset(learners: usize, quizzes: usize) -> PreparedData {
        let learner_list: Vec<LearnerProfile> = (1..=learners)
            .map(|i| LearnerProfile::new(format!("l{i}"), format!("Learner {i}")))
            .collect();
        let quiz_list: Vec<QuizMeta> = (1..=quizzes)
            .map(|j| QuizMeta::new(format!("q{j}"), format!("Quiz {j}"), "math", Difficulty::Medium))
            .collect();
        let mut records = Vec::new();
        for i in 1..=learners {
            for j in 1..=quizzes {
                // deterministic synthetic scores in [40, 95]
                let score = 40.0 + ((i * 17 + j * 29) % 56) as f64;
                records.push(PerformanceRecord::new(format!("l{i}"), format!("q{j}"), score));
            }
        }
        PreparedData::new(&learner_list, &quiz_list, &records)
    }

    #[test]
    fn test_empty_records_return_zero_metrics() {
        let data = PreparedData::new(&[], &[], &[]);
        let metrics = evaluate(&data, 0.2, &EngineOptions::default());
        assert_eq!(metrics, EvaluationMetrics::default());
        assert_eq!(metrics.test_size, 0);
    }

    #[test]
    fn test_split_sizes_and_metrics_are_finite() {
        let data = dense_dataset(6, 5);
        let metrics = evaluate(&data, 0.2, &EngineOptions::default());
        // 30 records, ceil(30 * 0.2) = 6 held out
        assert_eq!(metrics.train_size, 24);
        assert_eq!(metrics.test_size, 6);
        assert!(metrics.rmse.is_finite() && metrics.rmse >= 0.0);
        assert!(metrics.mae.is_finite() && metrics.mae >= 0.0);
        assert!(metrics.mae <= metrics.rmse + 1e-12);
    }

    #[test]
    fn test_evaluation_is_reproducible() {
        let data = dense_dataset(5, 4);
        let opts = EngineOptions::default();
        assert_eq!(evaluate(&data, 0.25, &opts), evaluate(&data, 0.25, &opts));
    }

    #[test]
    fn test_untrainable_train_partition_reports_zeros() {
        // Two records, fraction 0.5: one train record cannot support rank 1
        let learners = vec![
            LearnerProfile::new("l1", "Ana"),
            LearnerProfile::new("l2", "Ben"),
        ];
        let quizzes = vec![
            QuizMeta::new("q1", "Quiz 1", "math", Difficulty::Easy),
            QuizMeta::new("q2", "Quiz 2", "math", Difficulty::Easy),
        ];
        let records = vec![
            PerformanceRecord::new("l1", "q1", 80.0),
            PerformanceRecord::new("l2", "q2", 60.0),
        ];
        let data = PreparedData::new(&learners, &quizzes, &records);
        let metrics = evaluate(&data, 0.5, &EngineOptions::default());
        assert_eq!(metrics.rmse, 0.0);
        assert_eq!(metrics.mae, 0.0);
        assert_eq!(metrics.test_size, 0);
        assert_eq!(metrics.train_size, 1);
    }

    #[test]
    fn test_rmse_reasonable_on_dense_data() {
        // Dense matrix with plenty of structure: held-out error should be
        // well under the trivial 1.0 bound
        let data = dense_dataset(8, 6);
        let metrics = evaluate(&data, 0.15, &EngineOptions::default());
        assert!(metrics.test_size > 0);
        assert!(metrics.rmse < 1.0);
    }
}
