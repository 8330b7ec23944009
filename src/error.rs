//! Engine Errors
//!
//! Only an unknown method name is a hard contract violation. Every other
//! degraded condition (unknown learner, insufficient data for the
//! collaborative model) falls back to empty lists or neutral scores instead
//! of surfacing an error.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Caller asked for a method outside {content, collaborative, hybrid}
    #[error("unknown recommendation method: {0}")]
    UnknownMethod(String),
}
