//! Question-to-answer orchestration
//!
//! A run walks the generated candidates best-first. Each candidate is
//! sanitized, validated against the selected schema and, when accepted,
//! executed. The first candidate that executes wins and later ones are never
//! run. If none does, the heuristic translator gets exactly one execution
//! attempt before the run ends with a terminal failure.

use nlsql_prompt::{LinkedColumn, PreprocessedQuestion, Preprocessor};
use nlsql_schema::{DatabaseSchema, SchemaCollection, SchemaError};
use nlsql_sql::{pretty_format, sanitize, validate, HeuristicTranslator, ValidationError};
use nlsql_sqlite::{ExecutionBudget, QueryResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::PipelineConfig;
use crate::generator::{CandidateGenerator, SqlCandidate};
use crate::sink::{ExecutionSink, SqliteSink};

/// Error message reported when no candidate and no heuristic produced a result
pub const TERMINAL_FAILURE_MESSAGE: &str = "all candidates failed validation or execution";

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl PipelineError {
    pub fn is_schema_not_found(&self) -> bool {
        matches!(self, PipelineError::Schema(SchemaError::NotFound(_)))
    }
}

/// Where a candidate stands after validation and execution
#[derive(Debug, Clone, PartialEq)]
pub enum CandidateOutcome {
    Validated,
    Rejected(ValidationError),
    Executed(QueryResult),
    ExecutionFailed(String),
}

impl CandidateOutcome {
    fn describe(&self) -> String {
        match self {
            CandidateOutcome::Validated => "validated".to_string(),
            CandidateOutcome::Rejected(reason) => format!("rejected: {reason}"),
            CandidateOutcome::Executed(result) => format!("executed: {} rows", result.row_count),
            CandidateOutcome::ExecutionFailed(reason) => format!("execution failed: {reason}"),
        }
    }
}

/// What produced the returned SQL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnswerSource {
    Model { rank: usize, score: f64 },
    Heuristic,
    None,
}

/// One line of the run's diagnostic trail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptReport {
    pub sql: String,
    pub source: AnswerSource,
    pub outcome: String,
    /// Columns the question was linked to when the candidate was generated
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub linked_columns: Vec<LinkedColumn>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineOutput {
    pub request_id: Uuid,
    pub schema: String,
    pub sql: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<QueryResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub source: AnswerSource,
    pub attempts: Vec<AttemptReport>,
}

impl PipelineOutput {
    pub fn is_success(&self) -> bool {
        self.result.is_some()
    }
}

pub struct Pipeline {
    schemas: SchemaCollection,
    preprocessor: Preprocessor,
    generator: Box<dyn CandidateGenerator>,
    sink: Box<dyn ExecutionSink>,
    heuristic: HeuristicTranslator,
    config: PipelineConfig,
}

impl Pipeline {
    /// Build a pipeline executing against each schema's SQLite file
    pub fn new(
        schemas: SchemaCollection,
        generator: Box<dyn CandidateGenerator>,
        config: PipelineConfig,
    ) -> Self {
        let sink = SqliteSink::new(ExecutionBudget {
            max_rows: config.max_rows,
        });
        Self {
            schemas,
            preprocessor: Preprocessor::new(config.prompt.clone()),
            generator,
            sink: Box::new(sink),
            heuristic: HeuristicTranslator::new(),
            config,
        }
    }

    /// Replace the execution sink
    pub fn with_sink(mut self, sink: Box<dyn ExecutionSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn schemas(&self) -> &SchemaCollection {
        &self.schemas
    }

    /// Answer `question` against the named schema, or the first one loaded
    pub async fn run(
        &self,
        question: &str,
        schema_name: Option<&str>,
    ) -> Result<PipelineOutput, PipelineError> {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "nlsql_run",
            %request_id,
            schema = schema_name.unwrap_or("<default>"),
            question,
        );

        async move {
            let schema = self.schemas.select(schema_name)?;
            tracing::info!(schema = schema.name(), "Processing question");

            let prepared = Arc::new(self.preprocessor.build(question, schema));
            tracing::trace!(prompt = %prepared.prompt, "Prompt text");

            let candidates = self.generate(&prepared).await;
            let mut attempts = Vec::with_capacity(candidates.len() + 1);

            for (rank, candidate) in candidates.iter().enumerate() {
                let cleaned = sanitize(&candidate.sql);
                let outcome = self.attempt(&cleaned, schema);
                let source = AnswerSource::Model {
                    rank,
                    score: candidate.score,
                };
                attempts.push(AttemptReport {
                    sql: candidate.sql.clone(),
                    source: source.clone(),
                    outcome: outcome.describe(),
                    linked_columns: candidate.metadata.linked_columns.clone(),
                });

                match outcome {
                    CandidateOutcome::Executed(result) => {
                        tracing::info!(rank, rows = result.row_count, "Candidate executed");
                        return Ok(PipelineOutput {
                            request_id,
                            schema: schema.name().to_string(),
                            sql: pretty_format(&cleaned),
                            result: Some(result),
                            error: None,
                            source,
                            attempts,
                        });
                    }
                    CandidateOutcome::ExecutionFailed(reason) => {
                        tracing::warn!(rank, error = %reason, "Candidate failed to execute");
                    }
                    other => {
                        tracing::debug!(rank, outcome = %other.describe(), "Candidate skipped");
                    }
                }
            }

            if let Some(sql) = self.heuristic.translate(question, schema) {
                tracing::info!(sql = %sql, "Trying heuristic translation");
                let outcome = self.execute(&sql, schema);
                attempts.push(AttemptReport {
                    sql: sql.clone(),
                    source: AnswerSource::Heuristic,
                    outcome: outcome.describe(),
                    linked_columns: Vec::new(),
                });

                match outcome {
                    CandidateOutcome::Executed(result) => {
                        return Ok(PipelineOutput {
                            request_id,
                            schema: schema.name().to_string(),
                            sql: pretty_format(&sql),
                            result: Some(result),
                            error: None,
                            source: AnswerSource::Heuristic,
                            attempts,
                        });
                    }
                    other => {
                        tracing::warn!(outcome = %other.describe(), "Heuristic translation failed");
                    }
                }
            }

            tracing::warn!(candidates = candidates.len(), "No executable SQL produced");
            Ok(PipelineOutput {
                request_id,
                schema: schema.name().to_string(),
                sql: candidates
                    .first()
                    .map(|c| c.sql.clone())
                    .unwrap_or_default(),
                result: None,
                error: Some(TERMINAL_FAILURE_MESSAGE.to_string()),
                source: AnswerSource::None,
                attempts,
            })
        }
        .instrument(span)
        .await
    }

    /// Ask the generator for candidates; a failing generator yields none
    async fn generate(&self, prepared: &Arc<PreprocessedQuestion>) -> Vec<SqlCandidate> {
        let top_k = self.config.top_k;
        match self.generator.generate(prepared, top_k).await {
            Ok(scored) => scored
                .into_iter()
                .take(top_k)
                .map(|s| SqlCandidate {
                    sql: s.sql,
                    score: s.score,
                    metadata: Arc::clone(prepared),
                })
                .collect(),
            Err(e) => {
                tracing::warn!(error = %e, "Candidate generation failed");
                Vec::new()
            }
        }
    }

    fn attempt(&self, sql: &str, schema: &DatabaseSchema) -> CandidateOutcome {
        match self.check(sql, schema) {
            CandidateOutcome::Validated => self.execute(sql, schema),
            rejected => rejected,
        }
    }

    fn check(&self, sql: &str, schema: &DatabaseSchema) -> CandidateOutcome {
        match validate(sql, schema) {
            Ok(_) => CandidateOutcome::Validated,
            Err(reason) => CandidateOutcome::Rejected(reason),
        }
    }

    fn execute(&self, sql: &str, schema: &DatabaseSchema) -> CandidateOutcome {
        match self.sink.execute(schema.path(), sql) {
            Ok(result) => CandidateOutcome::Executed(result),
            Err(e) => CandidateOutcome::ExecutionFailed(e.to_string()),
        }
    }
}
