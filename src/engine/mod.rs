//! Hybrid Recommendation Engine
//!
//! The engine object owns the cached prepared data and the lazily trained
//! collaborative model, with an explicit lifecycle instead of hidden
//! module-level state:
//!
//! - Data preparation runs once on first use and is cached.
//! - The collaborative model trains on the first collaborative or hybrid
//!   request, then is reused until [`HybridEngine::retrain`] or
//!   [`HybridEngine::replace_data`].
//! - All operations are synchronous and side-effect-free with respect to
//!   the input snapshots; a concurrent host must serialize the mutating
//!   calls itself.
//!
//! The hybrid blender oversamples 2n candidates from each scorer, unions
//! the result sets, and treats a score missing from one side as 0 rather
//! than re-querying it. A quiz strongly preferred by only one method is
//! therefore penalized, never backfilled.

use std::collections::HashMap;
use std::str::FromStr;

use tracing::{info, warn};

use crate::collaborative::{CollaborativeModel, CollaborativeScore};
use crate::content::{score_content, ContentScore};
use crate::error::EngineError;
use crate::evaluate::evaluate as evaluate_model;
use crate::prepare::PreparedData;
use crate::types::{
    EngineOptions, EvaluationMetrics, LearnerProfile, PerformanceRecord, QuizMeta,
    RecommendationEntry, DEFAULT_COLLABORATIVE_SCORE,
};

// ==================== Method Dispatch ====================

/// Scoring method requested by the caller
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecommendMethod {
    Content,
    Collaborative,
    Hybrid,
}

impl FromStr for RecommendMethod {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "content" => Ok(Self::Content),
            "collaborative" => Ok(Self::Collaborative),
            "hybrid" => Ok(Self::Hybrid),
            other => Err(EngineError::UnknownMethod(other.to_string())),
        }
    }
}

// ==================== Engine State ====================

/// Collaborative model lifecycle
#[derive(Clone, Debug, Default)]
enum ModelState {
    /// No training attempt yet (lazy)
    #[default]
    Pending,
    /// Trained and cached
    Ready(CollaborativeModel),
    /// Training was attempted and skipped for lack of data
    Unavailable,
}

/// Hybrid recommendation engine over immutable input snapshots
#[derive(Clone, Debug)]
pub struct HybridEngine {
    options: EngineOptions,
    learners: Vec<LearnerProfile>,
    quizzes: Vec<QuizMeta>,
    records: Vec<PerformanceRecord>,
    prepared: Option<PreparedData>,
    model: ModelState,
}

impl HybridEngine {
    pub fn new(
        learners: Vec<LearnerProfile>,
        quizzes: Vec<QuizMeta>,
        records: Vec<PerformanceRecord>,
    ) -> Self {
        Self::with_options(learners, quizzes, records, EngineOptions::default())
    }

    pub fn with_options(
        learners: Vec<LearnerProfile>,
        quizzes: Vec<QuizMeta>,
        records: Vec<PerformanceRecord>,
        options: EngineOptions,
    ) -> Self {
        Self {
            options,
            learners,
            quizzes,
            records,
            prepared: None,
            model: ModelState::Pending,
        }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Swap in fresh snapshots and drop all cached state
    ///
    /// Preparation and training run lazily again on the next request.
    pub fn replace_data(
        &mut self,
        learners: Vec<LearnerProfile>,
        quizzes: Vec<QuizMeta>,
        records: Vec<PerformanceRecord>,
    ) {
        self.learners = learners;
        self.quizzes = quizzes;
        self.records = records;
        self.prepared = None;
        self.model = ModelState::Pending;
    }

    /// Force re-preparation and an immediate refit from the current data
    pub fn retrain(&mut self) {
        info!("retraining recommendation engine");
        self.prepared = None;
        self.model = ModelState::Pending;
        self.ensure_model();
    }

    fn ensure_prepared(&mut self) {
        if self.prepared.is_none() {
            self.prepared = Some(PreparedData::new(
                &self.learners,
                &self.quizzes,
                &self.records,
            ));
        }
    }

    fn ensure_model(&mut self) {
        self.ensure_prepared();
        if matches!(self.model, ModelState::Pending) {
            let Some(data) = self.prepared.as_ref() else {
                return;
            };
            self.model = match CollaborativeModel::train(data, &self.options) {
                Some(model) => ModelState::Ready(model),
                None => ModelState::Unavailable,
            };
        }
    }

    // ==================== Recommendation Methods ====================

    /// Dispatch on a caller-supplied method string
    ///
    /// `method` must be one of `content`, `collaborative`, `hybrid`;
    /// anything else is the one hard error the engine produces.
    pub fn get_recommendations(
        &mut self,
        learner_id: &str,
        n: usize,
        method: &str,
    ) -> Result<Vec<RecommendationEntry>, EngineError> {
        Ok(match method.parse::<RecommendMethod>()? {
            RecommendMethod::Content => self.recommend_content(learner_id, n),
            RecommendMethod::Collaborative => self.recommend_collaborative(learner_id, n),
            RecommendMethod::Hybrid => self.recommend_hybrid(learner_id, n),
        })
    }

    /// Content-based ranking; an unknown learner yields an empty list
    pub fn recommend_content(&mut self, learner_id: &str, n: usize) -> Vec<RecommendationEntry> {
        self.ensure_prepared();
        let Some(data) = self.prepared.as_ref() else {
            return Vec::new();
        };
        score_content(data, &self.options, learner_id, n)
            .into_iter()
            .map(content_entry)
            .collect()
    }

    /// Collaborative ranking; empty when the model is untrained
    pub fn recommend_collaborative(
        &mut self,
        learner_id: &str,
        n: usize,
    ) -> Vec<RecommendationEntry> {
        self.ensure_model();
        let (Some(data), ModelState::Ready(model)) = (self.prepared.as_ref(), &self.model) else {
            warn!("collaborative model not trained, returning no recommendations");
            return Vec::new();
        };
        model
            .recommend(data, learner_id, n)
            .into_iter()
            .map(collaborative_entry)
            .collect()
    }

    /// Hybrid ranking over the union of both scorers' top-2n candidates
    pub fn recommend_hybrid(&mut self, learner_id: &str, n: usize) -> Vec<RecommendationEntry> {
        self.ensure_model();
        let Some(data) = self.prepared.as_ref() else {
            return Vec::new();
        };

        let content = score_content(data, &self.options, learner_id, n * 2);
        let collaborative = match &self.model {
            ModelState::Ready(model) => model.recommend(data, learner_id, n * 2),
            _ => Vec::new(),
        };

        blend_scores(content, collaborative, &self.options, n)
    }

    /// Predicted collaborative score for one (learner, quiz) pair
    ///
    /// Returns the neutral default 0.5 when the model is untrained or
    /// either id lies outside the fitted index.
    pub fn predict_collaborative(&mut self, learner_id: &str, quiz_id: &str) -> f64 {
        self.ensure_model();
        match &self.model {
            ModelState::Ready(model) => model.predict(learner_id, quiz_id),
            _ => DEFAULT_COLLABORATIVE_SCORE,
        }
    }

    /// Offline hold-out evaluation of the collaborative model
    pub fn evaluate(&mut self, test_fraction: f64) -> EvaluationMetrics {
        self.ensure_prepared();
        let Some(data) = self.prepared.as_ref() else {
            return EvaluationMetrics::default();
        };
        evaluate_model(data, test_fraction, &self.options)
    }
}

// ==================== Blending ====================

/// Blend content and collaborative rankings into hybrid entries
///
/// The union is keyed by quiz id; a quiz absent from one side keeps 0 for
/// that side's score. Output order is descending hybrid score, ties keeping
/// content-first insertion order.
fn blend_scores(
    content: Vec<ContentScore>,
    collaborative: Vec<CollaborativeScore>,
    options: &EngineOptions,
    n: usize,
) -> Vec<RecommendationEntry> {
    struct Blend {
        quiz: QuizMeta,
        content_score: f64,
        collaborative_score: f64,
    }

    let mut order: Vec<String> = Vec::new();
    let mut by_quiz: HashMap<String, Blend> = HashMap::new();

    for rec in content {
        order.push(rec.quiz.id.clone());
        by_quiz.insert(
            rec.quiz.id.clone(),
            Blend {
                quiz: rec.quiz,
                content_score: rec.score,
                collaborative_score: 0.0,
            },
        );
    }

    for rec in collaborative {
        match by_quiz.get_mut(&rec.quiz.id) {
            Some(blend) => blend.collaborative_score = rec.score,
            None => {
                order.push(rec.quiz.id.clone());
                by_quiz.insert(
                    rec.quiz.id.clone(),
                    Blend {
                        quiz: rec.quiz,
                        content_score: 0.0,
                        collaborative_score: rec.score,
                    },
                );
            }
        }
    }

    let mut entries: Vec<RecommendationEntry> = order
        .into_iter()
        .filter_map(|id| by_quiz.remove(&id))
        .map(|blend| {
            let hybrid = options.content_weight * blend.content_score
                + options.collaborative_weight * blend.collaborative_score;
            RecommendationEntry {
                quiz: blend.quiz,
                content_score: Some(blend.content_score),
                collaborative_score: Some(blend.collaborative_score),
                hybrid_score: Some(hybrid),
                topic_score: None,
                difficulty_score: None,
            }
        })
        .collect();

    entries.sort_by(|a, b| {
        b.hybrid_score
            .partial_cmp(&a.hybrid_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    entries.truncate(n);
    entries
}

fn content_entry(rec: ContentScore) -> RecommendationEntry {
    RecommendationEntry {
        quiz: rec.quiz,
        content_score: Some(rec.score),
        collaborative_score: None,
        hybrid_score: None,
        topic_score: Some(rec.topic_score),
        difficulty_score: Some(rec.difficulty_score),
    }
}

fn collaborative_entry(rec: CollaborativeScore) -> RecommendationEntry {
    RecommendationEntry {
        quiz: rec.quiz,
        content_score: None,
        collaborative_score: Some(rec.score),
        hybrid_score: None,
        topic_score: None,
        difficulty_score: None,
    }
}
