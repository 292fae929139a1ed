//! OpenAI-backed SQL candidate generation

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
        CreateChatCompletionResponse,
    },
    Client,
};
use async_trait::async_trait;
use nlsql_pipeline::{CandidateGenerator, GenerationError, ScoredSql};
use nlsql_prompt::PreprocessedQuestion;

use crate::config::ModelConfig;

/// System prompt describing the prompt layout built by the preprocessor
const SYSTEM_PROMPT: &str = r#"You translate questions about a SQLite database into SQL.

Return only one SQLite SELECT statement. No markdown, no explanations, no trailing text.

The user message looks like:
translate to SQL: <question> || schema: employees(id INTEGER, name TEXT) | departments(...) || relations: employees.department_id -> departments.id || agg_hints: COUNT

- Each table is written as table(column TYPE, ...), optionally followed by [samples: column≈value1/value2].
- relations lists foreign keys; use them for JOIN conditions.
- agg_hints names aggregate functions the question probably needs.
- Only use tables and columns that appear in the schema."#;

pub struct OpenAiGenerator {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: f32,
    max_output_tokens: u32,
}

impl OpenAiGenerator {
    pub fn new(client: Client<OpenAIConfig>, config: &ModelConfig) -> Self {
        Self {
            client,
            model: config.name.clone(),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        }
    }

    pub fn from_api_key(api_key: String, config: &ModelConfig) -> Self {
        let openai_config = OpenAIConfig::new().with_api_key(api_key);
        Self::new(Client::with_config(openai_config), config)
    }

    async fn complete(
        &self,
        prompt: &str,
        n: u8,
    ) -> Result<CreateChatCompletionResponse, OpenAIError> {
        let messages = vec![
            ChatCompletionRequestMessage::System(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(SYSTEM_PROMPT)
                    .build()?,
            ),
            ChatCompletionRequestMessage::User(
                ChatCompletionRequestUserMessageArgs::default()
                    .content(prompt)
                    .build()?,
            ),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .n(n)
            .logprobs(true)
            .temperature(self.temperature)
            .max_completion_tokens(self.max_output_tokens)
            .build()?;

        self.client.chat().create(request).await
    }
}

#[async_trait]
impl CandidateGenerator for OpenAiGenerator {
    async fn generate(
        &self,
        input: &PreprocessedQuestion,
        top_k: usize,
    ) -> Result<Vec<ScoredSql>, GenerationError> {
        if top_k == 0 {
            return Ok(Vec::new());
        }

        let n = u8::try_from(top_k).unwrap_or(u8::MAX);
        let response = self
            .complete(&input.prompt, n)
            .await
            .map_err(|e| GenerationError::Backend(e.to_string()))?;

        let choices = response
            .choices
            .into_iter()
            .map(|choice| {
                let text = choice.message.content.unwrap_or_default();
                let logprobs = choice
                    .logprobs
                    .and_then(|lp| lp.content)
                    .map(|tokens| tokens.iter().map(|t| t.logprob).collect());
                (text, logprobs)
            })
            .collect();

        let candidates = rank_choices(choices, top_k);
        if candidates.is_empty() {
            return Err(GenerationError::MalformedResponse(
                "no completion contained SQL".to_string(),
            ));
        }

        tracing::info!(
            model = %self.model,
            candidates = candidates.len(),
            best_score = candidates[0].score,
            "Generated SQL candidates"
        );
        Ok(candidates)
    }
}

/// Clean, score and order completion choices best-first, dropping empty and duplicate SQL
fn rank_choices(choices: Vec<(String, Option<Vec<f32>>)>, top_k: usize) -> Vec<ScoredSql> {
    let mut candidates: Vec<ScoredSql> = Vec::with_capacity(choices.len());
    for (index, (text, logprobs)) in choices.into_iter().enumerate() {
        let sql = strip_code_fence(&text);
        if sql.is_empty() || candidates.iter().any(|c| c.sql == sql) {
            continue;
        }
        let score = logprobs
            .as_deref()
            .and_then(mean_logprob)
            .unwrap_or(-(index as f64));
        candidates.push(ScoredSql::new(sql, score));
    }

    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
    candidates.truncate(top_k);
    candidates
}

fn mean_logprob(logprobs: &[f32]) -> Option<f64> {
    if logprobs.is_empty() {
        return None;
    }
    let total: f64 = logprobs.iter().map(|&lp| f64::from(lp)).sum();
    Some(total / logprobs.len() as f64)
}

/// Remove surrounding markdown fences and a leading `sql` language tag
fn strip_code_fence(text: &str) -> String {
    let trimmed = text.trim();
    let Some(body) = trimmed.strip_prefix("```") else {
        return trimmed.to_string();
    };

    let body = body.strip_suffix("```").unwrap_or(body);
    let body = match body.split_once('\n') {
        Some((tag, rest)) if is_sql_tag(tag.trim()) => rest,
        _ => body,
    };
    body.trim().to_string()
}

fn is_sql_tag(tag: &str) -> bool {
    tag.is_empty() || tag.eq_ignore_ascii_case("sql") || tag.eq_ignore_ascii_case("sqlite")
}
