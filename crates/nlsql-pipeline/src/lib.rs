//! NLSQL pipeline - from a natural-language question to an executed query
//!
//! ```text
//! question ─► Preprocessor ─► CandidateGenerator ─► validate ─► ExecutionSink
//!                                                      │
//!                                                      └─► HeuristicTranslator
//! ```

pub mod config;
pub mod generator;
pub mod pipeline;
pub mod sink;

pub use config::PipelineConfig;
pub use generator::{CandidateGenerator, GenerationError, NullGenerator, ScoredSql, SqlCandidate};
pub use pipeline::{
    AnswerSource, AttemptReport, CandidateOutcome, Pipeline, PipelineError, PipelineOutput,
    TERMINAL_FAILURE_MESSAGE,
};
pub use sink::{ExecutionSink, SqliteSink};
