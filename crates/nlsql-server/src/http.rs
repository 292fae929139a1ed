//! JSON HTTP API
//!
//! - `POST /query` answers a question
//! - `GET /schemas` lists loaded schemas
//! - `GET /health` liveness probe

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use nlsql_pipeline::{Pipeline, PipelineError, PipelineOutput};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pipeline: Arc<Pipeline>,
}

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    question: String,
    #[serde(default)]
    schema: Option<String>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct SchemaSummary {
    name: String,
    tables: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

pub fn router(pipeline: Arc<Pipeline>) -> Router {
    Router::new()
        .route("/query", post(answer_question))
        .route("/schemas", get(list_schemas))
        .route("/health", get(health_check))
        .with_state(AppState { pipeline })
}

pub async fn serve(addr: &str, pipeline: Arc<Pipeline>) -> anyhow::Result<()> {
    let app = router(pipeline);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("nlsql server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn answer_question(
    State(state): State<AppState>,
    Json(req): Json<QueryRequest>,
) -> Result<Json<PipelineOutput>, ApiError> {
    let question = req.question.trim();
    if question.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "question must not be empty"));
    }

    let output = state
        .pipeline
        .run(question, req.schema.as_deref())
        .await
        .map_err(|e: PipelineError| {
            let status = if e.is_schema_not_found() {
                StatusCode::NOT_FOUND
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            api_error(status, e.to_string())
        })?;

    crate::log_event!(
        level: tracing::Level::INFO,
        event: "question_answered",
        request_id: output.request_id,
        schema: output.schema,
        source: output.source,
        attempts: output.attempts.len(),
        success: output.is_success()
    );

    Ok(Json(output))
}

async fn list_schemas(State(state): State<AppState>) -> Json<Vec<SchemaSummary>> {
    let summaries = state
        .pipeline
        .schemas()
        .databases()
        .iter()
        .map(|db| SchemaSummary {
            name: db.name().to_string(),
            tables: db.tables().iter().map(|t| t.name.clone()).collect(),
        })
        .collect();
    Json(summaries)
}

async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use nlsql_pipeline::{AnswerSource, NullGenerator, PipelineConfig};
    use nlsql_schema::{Column, DatabaseSchema, SchemaCollection, Table};
    use tempfile::TempDir;

    fn state(dir: &TempDir) -> AppState {
        let path = dir.path().join("sample.db");
        nlsql_sqlite::bootstrap_demo(&path).unwrap();

        let employees = Table::new(
            "employees",
            vec![
                Column::new("id", "INTEGER"),
                Column::new("name", "TEXT"),
                Column::new("age", "INTEGER"),
                Column::new("department", "TEXT"),
            ],
        );
        let schema = DatabaseSchema::new("company", path, vec![employees], vec![]).unwrap();
        let pipeline = Pipeline::new(
            SchemaCollection::new(vec![schema]),
            Box::new(NullGenerator),
            PipelineConfig::default(),
        );
        AppState {
            pipeline: Arc::new(pipeline),
        }
    }

    fn request(question: &str, schema: Option<&str>) -> Json<QueryRequest> {
        Json(QueryRequest {
            question: question.to_string(),
            schema: schema.map(String::from),
        })
    }

    #[tokio::test]
    async fn test_query_answers_with_heuristic() {
        let dir = tempfile::tempdir().unwrap();
        let Json(output) = answer_question(
            State(state(&dir)),
            request("Show employees older than 40 in the sales department", None),
        )
        .await
        .unwrap();

        assert_eq!(output.source, AnswerSource::Heuristic);
        let result = output.result.unwrap();
        assert_eq!(result.rows, vec![vec![serde_json::json!("Sophia Nguyen")]]);
    }

    #[tokio::test]
    async fn test_empty_question_is_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let (status, Json(body)) = answer_question(State(state(&dir)), request("   ", None))
            .await
            .unwrap_err();

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error, "question must not be empty");
    }

    #[tokio::test]
    async fn test_unknown_schema_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let (status, Json(body)) = answer_question(
            State(state(&dir)),
            request("List employees", Some("warehouse")),
        )
        .await
        .unwrap_err();

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.error, "Schema warehouse not found.");
    }

    #[tokio::test]
    async fn test_list_schemas() {
        let dir = tempfile::tempdir().unwrap();
        let Json(schemas) = list_schemas(State(state(&dir))).await;

        assert_eq!(
            schemas,
            vec![SchemaSummary {
                name: "company".into(),
                tables: vec!["employees".into()],
            }]
        );
    }

    #[tokio::test]
    async fn test_health_check() {
        assert_eq!(health_check().await, "OK");
    }
}
