//! # quizrec-algo - Hybrid Quiz Recommendation Engine
//!
//! Pure-Rust recommendation algorithms for adaptive quiz learning:
//!
//! - **Content-Based Scorer** - topic proficiency × difficulty-fit bonus,
//!   no training step
//! - **Collaborative Model** - truncated-SVD low-rank factorization of the
//!   learner×quiz score matrix
//! - **Hybrid Blender** - fixed-weight convex combination of both scores
//! - **Offline Evaluator** - seeded hold-out split with RMSE / MAE
//!
//! ## Design goals
//!
//! - **Pure computation** - no I/O, no async; invoked in-process by a
//!   request layer that owns storage and transport
//! - **Reproducible** - every stochastic step (SVD projection, evaluation
//!   split) draws from a seeded ChaCha8 stream
//! - **Graceful degradation** - thin data falls back to neutral scores or
//!   empty lists; only an unknown method name is a hard error
//!
//! ## Module structure
//!
//! - [`engine`] - [`HybridEngine`] lifecycle, method dispatch, blending
//! - [`content`] - content-based scoring
//! - [`collaborative`] - SVD model: train / predict / recommend
//! - [`evaluate`] - hold-out evaluation
//! - [`prepare`] - snapshots → matrices and side tables
//! - [`matrix`] - dense linear algebra and the truncated SVD
//! - [`types`] - shared types and tuning constants
//! - [`error`] - error taxonomy
//!
//! ## Usage example
//!
//! ```rust
//! use quizrec_algo::{Difficulty, HybridEngine, LearnerProfile, PerformanceRecord, QuizMeta};
//!
//! let learners = vec![
//!     LearnerProfile::new("l1", "Ana").with_topic("python", 0.3).with_topic("sql", 0.9),
//! ];
//! let quizzes = vec![
//!     QuizMeta::new("q1", "Python Basics", "python", Difficulty::Easy),
//!     QuizMeta::new("q2", "SQL Joins", "sql", Difficulty::Medium),
//! ];
//! let mut engine = HybridEngine::new(learners, quizzes, Vec::<PerformanceRecord>::new());
//!
//! let recs = engine.get_recommendations("l1", 5, "content").expect("known method");
//! assert_eq!(recs[0].quiz.id, "q2");
//! ```

pub mod collaborative;
pub mod content;
pub mod engine;
pub mod error;
pub mod evaluate;
pub mod matrix;
pub mod prepare;
pub mod types;

pub use collaborative::{CollaborativeModel, CollaborativeScore};
pub use content::{score_content, ContentScore};
pub use engine::{HybridEngine, RecommendMethod};
pub use error::EngineError;
pub use evaluate::evaluate;
pub use prepare::{PreparedData, ScoreMatrix};
pub use types::{
    Difficulty, EngineOptions, EvaluationMetrics, LearnerProfile, PerformanceRecord, QuizMeta,
    RecommendationEntry,
};
