//! Common Types and Constants
//!
//! Shared data structures and tuning constants used across the engine.
//! All thresholds and weights are named here with their documented defaults
//! so behavior stays reproducible while remaining tunable via
//! [`EngineOptions`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ==================== Constants ====================

/// Weight of the content-based score in the hybrid blend
pub const DEFAULT_CONTENT_WEIGHT: f64 = 0.6;

/// Weight of the collaborative score in the hybrid blend
pub const DEFAULT_COLLABORATIVE_WEIGHT: f64 = 0.4;

/// Proficiency below this marks a topic as weak
pub const WEAK_TOPIC_THRESHOLD: f64 = 0.6;

/// Neutral prior for a topic the learner has never touched
pub const NEUTRAL_TOPIC_SCORE: f64 = 0.5;

/// Difficulty bonus for a weak topic at easy/medium difficulty
pub const WEAK_MATCH_BONUS: f64 = 1.0;

/// Difficulty bonus for a weak topic at hard difficulty
pub const WEAK_MISMATCH_BONUS: f64 = 0.5;

/// Difficulty bonus for a strong topic at medium/hard difficulty
pub const STRONG_MATCH_BONUS: f64 = 1.0;

/// Difficulty bonus for a strong topic at easy difficulty
pub const STRONG_MISMATCH_BONUS: f64 = 0.7;

/// Neutral prediction when the collaborative model carries no signal
pub const DEFAULT_COLLABORATIVE_SCORE: f64 = 0.5;

/// Upper bound on the factorization rank
pub const MAX_FACTOR_RANK: usize = 50;

/// Seed for the SVD projection and the evaluation split
pub const DEFAULT_SEED: u64 = 42;

/// Raw performance scores arrive in [0, 100] and are normalized to [0, 1]
pub const RAW_SCORE_SCALE: f64 = 100.0;

/// Numerical stability epsilon
pub const EPSILON: f64 = 1e-10;

// ==================== Input Types ====================

/// Quiz difficulty level
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }

    /// Ordinal difficulty score: easy=1, medium=2, hard=3
    pub fn score(&self) -> u8 {
        match self {
            Self::Easy => 1,
            Self::Medium => 2,
            Self::Hard => 3,
        }
    }
}

/// Learner snapshot: identity plus per-topic proficiency in [0, 1]
///
/// The engine treats profiles as read-only input; proficiency updates happen
/// upstream as new performance is recorded.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnerProfile {
    pub id: String,
    pub name: String,
    /// Topic name -> proficiency score in [0, 1]
    pub topic_scores: HashMap<String, f64>,
}

impl LearnerProfile {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            topic_scores: HashMap::new(),
        }
    }

    pub fn with_topic(mut self, topic: impl Into<String>, score: f64) -> Self {
        self.topic_scores.insert(topic.into(), score);
        self
    }
}

/// Quiz metadata
///
/// Only `topic` and `difficulty` influence scoring; the rest is passed
/// through to the output untouched.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizMeta {
    pub id: String,
    pub title: String,
    pub topic: String,
    pub difficulty: Difficulty,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub questions_count: u32,
    /// Time limit in minutes
    pub time_limit: u32,
}

impl QuizMeta {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        topic: impl Into<String>,
        difficulty: Difficulty,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            topic: topic.into(),
            difficulty,
            description: None,
            questions_count: 10,
            time_limit: 30,
        }
    }
}

/// One graded attempt: (learner, quiz, raw score in [0, 100])
///
/// At most one record is expected per (learner, quiz) pair; duplicates land
/// in the same matrix cell and the last one processed wins.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceRecord {
    pub learner_id: String,
    pub quiz_id: String,
    /// Raw score in [0, 100]
    pub score: f64,
}

impl PerformanceRecord {
    pub fn new(learner_id: impl Into<String>, quiz_id: impl Into<String>, score: f64) -> Self {
        Self {
            learner_id: learner_id.into(),
            quiz_id: quiz_id.into(),
            score,
        }
    }

    /// Score normalized to [0, 1]
    pub fn normalized_score(&self) -> f64 {
        self.score / RAW_SCORE_SCALE
    }
}

// ==================== Output Types ====================

/// One ranked recommendation
///
/// Score fields are present only for the methods that produced them: content
/// requests carry `content_score` plus the topic/difficulty diagnostics,
/// collaborative requests carry `collaborative_score`, hybrid requests carry
/// all three. Every score lies in [0, 1].
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationEntry {
    pub quiz: QuizMeta,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collaborative_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hybrid_score: Option<f64>,
    /// Learner proficiency for the quiz topic (content method only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic_score: Option<f64>,
    /// Ordinal quiz difficulty (content method only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty_score: Option<u8>,
}

/// Offline evaluation result over the predictable test pairs
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationMetrics {
    pub rmse: f64,
    pub mae: f64,
    pub train_size: usize,
    pub test_size: usize,
}

// ==================== Options ====================

/// Engine tuning knobs with the documented defaults
#[derive(Clone, Debug)]
pub struct EngineOptions {
    /// Hybrid weight on the content score (default 0.6)
    pub content_weight: f64,
    /// Hybrid weight on the collaborative score (default 0.4)
    pub collaborative_weight: f64,
    /// Weak/strong topic cutoff (default 0.6)
    pub weak_topic_threshold: f64,
    /// Rank cap for the factorization (default 50)
    pub max_rank: usize,
    /// Seed for the SVD projection and evaluation split (default 42)
    pub seed: u64,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            content_weight: DEFAULT_CONTENT_WEIGHT,
            collaborative_weight: DEFAULT_COLLABORATIVE_WEIGHT,
            weak_topic_threshold: WEAK_TOPIC_THRESHOLD,
            max_rank: MAX_FACTOR_RANK,
            seed: DEFAULT_SEED,
        }
    }
}
