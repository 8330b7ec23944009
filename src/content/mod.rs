//! Content-Based Scorer
//!
//! Pure function of a learner's topic proficiency and quiz metadata; no
//! training step and no side effects.
//!
//! Core principles:
//! - Weak topics (proficiency below the cutoff) steer toward easy/medium
//!   remediation; strong topics toward medium/hard stretch challenges.
//! - A topic the learner has never touched gets the neutral prior 0.5,
//!   which is distinct from a proficiency of zero.
//! - Already-attempted quizzes never appear in the output.

use std::cmp::Ordering;

use crate::prepare::PreparedData;
use crate::types::{
    EngineOptions, QuizMeta, NEUTRAL_TOPIC_SCORE, STRONG_MATCH_BONUS, STRONG_MISMATCH_BONUS,
    WEAK_MATCH_BONUS, WEAK_MISMATCH_BONUS,
};

/// One content-scored candidate
#[derive(Clone, Debug)]
pub struct ContentScore {
    pub quiz: QuizMeta,
    /// `topic_score * difficulty_bonus`, in [0, 1]
    pub score: f64,
    /// Learner proficiency for the quiz topic
    pub topic_score: f64,
    /// Ordinal quiz difficulty (1..=3)
    pub difficulty_score: u8,
}

/// Multiplicative difficulty bonus for a topic score at a given difficulty
pub fn difficulty_bonus(topic_score: f64, difficulty_score: u8, weak_threshold: f64) -> f64 {
    if topic_score < weak_threshold {
        // Weak topic: remediate at easy/medium
        if difficulty_score <= 2 {
            WEAK_MATCH_BONUS
        } else {
            WEAK_MISMATCH_BONUS
        }
    } else {
        // Strong topic: stretch at medium/hard
        if difficulty_score >= 2 {
            STRONG_MATCH_BONUS
        } else {
            STRONG_MISMATCH_BONUS
        }
    }
}

/// Rank unattempted candidates for a learner, best first
///
/// Returns at most `n` entries. An unknown learner id yields an empty list;
/// ties keep the candidate pool's enumeration order (stable sort).
pub fn score_content(
    data: &PreparedData,
    options: &EngineOptions,
    learner_id: &str,
    n: usize,
) -> Vec<ContentScore> {
    let Some(topic_scores) = data.proficiency.get(learner_id) else {
        return Vec::new();
    };

    let mut scored: Vec<ContentScore> = data
        .quizzes
        .iter()
        .filter(|quiz| !data.has_attempted(learner_id, &quiz.id))
        .map(|quiz| {
            let topic_score = topic_scores
                .get(&quiz.topic)
                .copied()
                .unwrap_or(NEUTRAL_TOPIC_SCORE);
            let difficulty_score = quiz.difficulty.score();
            let bonus = difficulty_bonus(topic_score, difficulty_score, options.weak_topic_threshold);
            ContentScore {
                quiz: quiz.clone(),
                score: topic_score * bonus,
                topic_score,
                difficulty_score,
            }
        })
        .collect();

    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    scored.truncate(n);
    scored
}
