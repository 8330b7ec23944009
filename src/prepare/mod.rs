//! Data Preparation
//!
//! Converts raw snapshots (performance records, learner profiles, quiz
//! metadata) into the matrix-friendly structures the scorers consume:
//!
//! - a learner×quiz score matrix with explicit id → row/column index maps
//! - a proficiency table (learner id → topic → score)
//! - a quiz attribute table (quiz id → topic, difficulty score)
//! - an attempted-pairs index for candidate exclusion
//!
//! Absent (learner, quiz) pairs are stored as score 0 in the matrix. This is
//! a deliberate approximation, not a missing-value model: an unattempted
//! quiz and a zero score are indistinguishable to the factorization.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::matrix::Matrix;
use crate::types::{LearnerProfile, PerformanceRecord, QuizMeta};

/// Scoring-relevant quiz attributes
#[derive(Clone, Debug)]
pub struct QuizAttributes {
    pub topic: String,
    pub difficulty_score: u8,
}

/// Learner×quiz score matrix with its id index maps
///
/// Rows and columns cover only learners and quizzes that appear in the
/// records, in sorted id order so the layout is stable across runs.
#[derive(Clone, Debug)]
pub struct ScoreMatrix {
    pub learner_index: HashMap<String, usize>,
    pub quiz_index: HashMap<String, usize>,
    pub matrix: Matrix,
}

impl ScoreMatrix {
    /// Pivot records into a zero-filled dense matrix of normalized scores
    ///
    /// Duplicate (learner, quiz) records overwrite the same cell; the last
    /// record processed wins.
    pub fn from_records(records: &[PerformanceRecord]) -> Self {
        let learner_ids: BTreeSet<&str> = records.iter().map(|r| r.learner_id.as_str()).collect();
        let quiz_ids: BTreeSet<&str> = records.iter().map(|r| r.quiz_id.as_str()).collect();

        let learner_index: HashMap<String, usize> = learner_ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.to_string(), i))
            .collect();
        let quiz_index: HashMap<String, usize> = quiz_ids
            .iter()
            .enumerate()
            .map(|(j, id)| (id.to_string(), j))
            .collect();

        let mut matrix = Matrix::zeros(learner_index.len(), quiz_index.len());
        for record in records {
            let i = learner_index[&record.learner_id];
            let j = quiz_index[&record.quiz_id];
            matrix.set(i, j, record.normalized_score());
        }

        Self {
            learner_index,
            quiz_index,
            matrix,
        }
    }
}

/// Cached, matrix-friendly view of the input snapshots
#[derive(Clone, Debug, Default)]
pub struct PreparedData {
    /// Learner id -> topic -> proficiency in [0, 1]
    pub proficiency: HashMap<String, HashMap<String, f64>>,
    /// Candidate pool in original enumeration order
    pub quizzes: Vec<QuizMeta>,
    /// Quiz id -> scoring attributes
    pub quiz_attributes: HashMap<String, QuizAttributes>,
    /// Normalized performance records
    pub records: Vec<PerformanceRecord>,
    /// Learner id -> quiz ids already attempted
    pub attempted: HashMap<String, HashSet<String>>,
}

impl PreparedData {
    pub fn new(
        learners: &[LearnerProfile],
        quizzes: &[QuizMeta],
        records: &[PerformanceRecord],
    ) -> Self {
        let proficiency = learners
            .iter()
            .map(|l| (l.id.clone(), l.topic_scores.clone()))
            .collect();

        let quiz_attributes = quizzes
            .iter()
            .map(|q| {
                (
                    q.id.clone(),
                    QuizAttributes {
                        topic: q.topic.clone(),
                        difficulty_score: q.difficulty.score(),
                    },
                )
            })
            .collect();

        let mut attempted: HashMap<String, HashSet<String>> = HashMap::new();
        for record in records {
            attempted
                .entry(record.learner_id.clone())
                .or_default()
                .insert(record.quiz_id.clone());
        }

        Self {
            proficiency,
            quizzes: quizzes.to_vec(),
            quiz_attributes,
            records: records.to_vec(),
            attempted,
        }
    }

    /// Whether any performance data exists at all
    pub fn has_records(&self) -> bool {
        !self.records.is_empty()
    }

    pub fn has_learner(&self, learner_id: &str) -> bool {
        self.proficiency.contains_key(learner_id)
    }

    pub fn has_attempted(&self, learner_id: &str, quiz_id: &str) -> bool {
        self.attempted
            .get(learner_id)
            .is_some_and(|quizzes| quizzes.contains(quiz_id))
    }

    /// Score matrix over the full record set
    pub fn score_matrix(&self) -> ScoreMatrix {
        ScoreMatrix::from_records(&self.records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Difficulty;

    fn sample() -> PreparedData {
        let learners = vec![
            LearnerProfile::new("l1", "Ana").with_topic("math", 0.8),
            LearnerProfile::new("l2", "Ben").with_topic("math", 0.3),
        ];
        let quizzes = vec![
            QuizMeta::new("q1", "Math Basics", "math", Difficulty::Easy),
            QuizMeta::new("q2", "Advanced Math", "math", Difficulty::Hard),
        ];
        let records = vec![
            PerformanceRecord::new("l1", "q1", 85.0),
            PerformanceRecord::new("l2", "q2", 40.0),
        ];
        PreparedData::new(&learners, &quizzes, &records)
    }

    #[test]
    fn test_tables_are_populated() {
        let data = sample();
        assert_eq!(data.proficiency["l1"]["math"], 0.8);
        assert_eq!(data.quiz_attributes["q2"].difficulty_score, 3);
        assert!(data.has_attempted("l1", "q1"));
        assert!(!data.has_attempted("l1", "q2"));
    }

    #[test]
    fn test_matrix_indexed_by_sorted_ids_and_zero_filled() {
        let data = sample();
        let sm = data.score_matrix();
        assert_eq!(sm.learner_index["l1"], 0);
        assert_eq!(sm.learner_index["l2"], 1);
        assert!((sm.matrix.get(0, 0) - 0.85).abs() < 1e-12);
        assert!((sm.matrix.get(1, 1) - 0.40).abs() < 1e-12);
        // unattempted pairs read as zero
        assert_eq!(sm.matrix.get(0, 1), 0.0);
        assert_eq!(sm.matrix.get(1, 0), 0.0);
    }

    #[test]
    fn test_duplicate_record_last_one_wins() {
        let learners = vec![LearnerProfile::new("l1", "Ana")];
        let quizzes = vec![QuizMeta::new("q1", "Quiz", "math", Difficulty::Easy)];
        let records = vec![
            PerformanceRecord::new("l1", "q1", 50.0),
            PerformanceRecord::new("l1", "q1", 90.0),
        ];
        let sm = PreparedData::new(&learners, &quizzes, &records).score_matrix();
        assert!((sm.matrix.get(0, 0) - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_empty_records_yield_empty_matrix() {
        let data = PreparedData::new(&[], &[], &[]);
        assert!(!data.has_records());
        let sm = data.score_matrix();
        assert_eq!(sm.matrix.rows, 0);
        assert_eq!(sm.matrix.cols, 0);
    }
}
