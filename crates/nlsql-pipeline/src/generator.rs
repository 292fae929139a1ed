//! Candidate generation boundary
//!
//! The model that turns a prompt into SQL lives behind this trait. The
//! orchestrator only relies on the relative order of the returned
//! candidates, never on the absolute value of their scores.

use async_trait::async_trait;
use nlsql_prompt::PreprocessedQuestion;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Generation backend error: {0}")]
    Backend(String),

    #[error("Malformed generation response: {0}")]
    MalformedResponse(String),
}

/// Raw generator output: SQL text and a confidence score (higher is better)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredSql {
    pub sql: String,
    pub score: f64,
}

impl ScoredSql {
    pub fn new(sql: impl Into<String>, score: f64) -> Self {
        Self {
            sql: sql.into(),
            score,
        }
    }
}

/// One generated SQL string with its score and the prompt that produced it
#[derive(Debug, Clone)]
pub struct SqlCandidate {
    pub sql: String,
    pub score: f64,
    pub metadata: Arc<PreprocessedQuestion>,
}

#[async_trait]
pub trait CandidateGenerator: Send + Sync {
    /// Produce at most `top_k` candidates, best first. `top_k == 0` yields none.
    async fn generate(
        &self,
        input: &PreprocessedQuestion,
        top_k: usize,
    ) -> Result<Vec<ScoredSql>, GenerationError>;
}

/// Generator used when no model is available; only the heuristic fallback can answer
#[derive(Debug, Clone, Copy, Default)]
pub struct NullGenerator;

#[async_trait]
impl CandidateGenerator for NullGenerator {
    async fn generate(
        &self,
        _input: &PreprocessedQuestion,
        _top_k: usize,
    ) -> Result<Vec<ScoredSql>, GenerationError> {
        Ok(Vec::new())
    }
}
