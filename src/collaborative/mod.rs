//! Collaborative Model
//!
//! Low-rank factorization of the learner×quiz score matrix, predicting the
//! entries the population has not observed yet.
//!
//! Core principles:
//! - Rank `k = min(cap, min(rows, cols) - 1)`; with fewer than 2 learners or
//!   2 quizzes on record the rank would drop below 1, so training is skipped
//!   and the model stays untrained.
//! - Prediction is the dot product of a learner factor row and a quiz factor
//!   row, clamped (not rescaled) to [0, 1].
//! - Any pair outside the fitted index predicts the neutral default 0.5.
//!
//! The model is immutable once fitted: a retrain replaces it wholesale,
//! never patches it in place.

use std::cmp::Ordering;
use std::collections::HashMap;

use tracing::{info, warn};

use crate::matrix::{dot_product, truncated_svd, Matrix};
use crate::prepare::{PreparedData, ScoreMatrix};
use crate::types::{EngineOptions, QuizMeta, DEFAULT_COLLABORATIVE_SCORE};

/// One collaboratively scored candidate
#[derive(Clone, Debug)]
pub struct CollaborativeScore {
    pub quiz: QuizMeta,
    pub score: f64,
}

/// Fitted low-rank factors plus the id index maps frozen at fit time
#[derive(Clone, Debug)]
pub struct CollaborativeModel {
    learner_factors: Matrix,
    quiz_factors: Matrix,
    learner_index: HashMap<String, usize>,
    quiz_index: HashMap<String, usize>,
    rank: usize,
}

impl CollaborativeModel {
    /// Fit the factorization over a prepared score matrix
    ///
    /// Returns `None` when the matrix is too small to support rank >= 1;
    /// callers treat that as "model untrained", not as an error.
    pub fn fit(score_matrix: ScoreMatrix, options: &EngineOptions) -> Option<Self> {
        let rows = score_matrix.matrix.rows;
        let cols = score_matrix.matrix.cols;
        if rows.min(cols) < 2 {
            warn!(
                learners = rows,
                quizzes = cols,
                "insufficient data for collaborative filtering, skipping training"
            );
            return None;
        }

        let rank = options.max_rank.min(rows.min(cols) - 1);
        let (learner_factors, quiz_factors) =
            truncated_svd(&score_matrix.matrix, rank, options.seed);

        info!(components = rank, learners = rows, quizzes = cols, "collaborative model trained");

        Some(Self {
            learner_factors,
            quiz_factors,
            learner_index: score_matrix.learner_index,
            quiz_index: score_matrix.quiz_index,
            rank,
        })
    }

    /// Fit over the full prepared record set
    pub fn train(data: &PreparedData, options: &EngineOptions) -> Option<Self> {
        if !data.has_records() {
            warn!("no performance data available for collaborative filtering");
            return None;
        }
        Self::fit(data.score_matrix(), options)
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Whether a learner was part of the fitted index
    pub fn contains_learner(&self, learner_id: &str) -> bool {
        self.learner_index.contains_key(learner_id)
    }

    /// Whether a quiz was part of the fitted index
    pub fn contains_quiz(&self, quiz_id: &str) -> bool {
        self.quiz_index.contains_key(quiz_id)
    }

    /// Predicted normalized score for a (learner, quiz) pair
    ///
    /// The raw factor product is unbounded; it is clipped to [0, 1] so
    /// relative ordering near the boundaries survives. Pairs outside the
    /// fitted index fall back to the neutral default.
    pub fn predict(&self, learner_id: &str, quiz_id: &str) -> f64 {
        let (Some(&i), Some(&j)) = (
            self.learner_index.get(learner_id),
            self.quiz_index.get(quiz_id),
        ) else {
            return DEFAULT_COLLABORATIVE_SCORE;
        };

        let raw = dot_product(self.learner_factors.row(i), self.quiz_factors.row(j));
        raw.clamp(0.0, 1.0)
    }

    /// Rank unattempted candidates for a learner, best first
    pub fn recommend(
        &self,
        data: &PreparedData,
        learner_id: &str,
        n: usize,
    ) -> Vec<CollaborativeScore> {
        let mut scored: Vec<CollaborativeScore> = data
            .quizzes
            .iter()
            .filter(|quiz| !data.has_attempted(learner_id, &quiz.id))
            .map(|quiz| CollaborativeScore {
                score: self.predict(learner_id, &quiz.id),
                quiz: quiz.clone(),
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        scored.truncate(n);
        scored
    }
}
