//! Prompt construction: question + serialized schema + aggregation hints

use nlsql_schema::DatabaseSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::linker::{self, LinkedColumn};
use crate::serializer::{SchemaSerializer, SerializerConfig};

/// SQL aggregate suggested by the question wording
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AggregateHint {
    Count,
    Sum,
    Avg,
    Max,
    Min,
}

impl AggregateHint {
    pub fn as_sql(&self) -> &'static str {
        match self {
            AggregateHint::Count => "COUNT",
            AggregateHint::Sum => "SUM",
            AggregateHint::Avg => "AVG",
            AggregateHint::Max => "MAX",
            AggregateHint::Min => "MIN",
        }
    }
}

impl fmt::Display for AggregateHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Keyword -> aggregate, scanned in this order
const AGG_KEYWORDS: &[(&str, AggregateHint)] = &[
    ("count", AggregateHint::Count),
    ("total", AggregateHint::Sum),
    ("sum", AggregateHint::Sum),
    ("average", AggregateHint::Avg),
    ("avg", AggregateHint::Avg),
    ("maximum", AggregateHint::Max),
    ("highest", AggregateHint::Max),
    ("minimum", AggregateHint::Min),
    ("lowest", AggregateHint::Min),
];

/// Aggregates hinted by `question`; case-insensitive substring match, each at most once
pub fn aggregation_hints(question: &str) -> Vec<AggregateHint> {
    let lowered = question.to_lowercase();
    let mut hints = Vec::new();
    for (keyword, hint) in AGG_KEYWORDS {
        if lowered.contains(keyword) && !hints.contains(hint) {
            hints.push(*hint);
        }
    }
    hints
}

/// Everything the generator needs, plus the metadata that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreprocessedQuestion {
    pub question: String,
    pub prompt: String,
    pub schema_prompt: String,
    pub linked_columns: Vec<LinkedColumn>,
    pub aggregations: Vec<AggregateHint>,
}

#[derive(Debug, Clone, Default)]
pub struct Preprocessor {
    serializer: SchemaSerializer,
}

impl Preprocessor {
    pub fn new(config: SerializerConfig) -> Self {
        Self {
            serializer: SchemaSerializer::new(config),
        }
    }

    /// Compose `translate to SQL: <q> || schema: <s>[ || agg_hints: <h>]`
    pub fn build(&self, question: &str, schema: &DatabaseSchema) -> PreprocessedQuestion {
        let linked_columns = linker::link(question, schema.tables());
        let linked_tables = linker::linked_tables(&linked_columns);
        let schema_prompt = self.serializer.serialize(schema, &linked_tables);

        let aggregations = aggregation_hints(question);
        let agg_fragment = if aggregations.is_empty() {
            String::new()
        } else {
            let hints = aggregations
                .iter()
                .map(AggregateHint::as_sql)
                .collect::<Vec<_>>()
                .join(", ");
            format!(" || agg_hints: {}", hints)
        };

        let prompt = format!(
            "translate to SQL: {} || schema: {}{}",
            question, schema_prompt, agg_fragment
        );

        tracing::debug!(
            linked = linked_columns.len(),
            hints = aggregations.len(),
            "Built model prompt"
        );

        PreprocessedQuestion {
            question: question.to_string(),
            prompt,
            schema_prompt,
            linked_columns,
            aggregations,
        }
    }
}
