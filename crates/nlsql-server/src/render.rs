//! Terminal rendering for `nlsql ask`

use nlsql_pipeline::{AnswerSource, PipelineOutput};
use nlsql_sqlite::QueryResult;

/// GitHub-style markdown table of a result set
pub fn result_to_markdown(result: &QueryResult) -> String {
    if result.columns.is_empty() {
        return "_(no columns)_\n".to_string();
    }

    let mut md = String::new();
    md.push_str(&format!("| {} |\n", result.columns.join(" | ")));
    md.push_str(&format!(
        "|{}|\n",
        vec!["---"; result.columns.len()].join("|")
    ));

    for row in &result.rows {
        let cells: Vec<String> = row.iter().map(cell).collect();
        md.push_str(&format!("| {} |\n", cells.join(" | ")));
    }

    md
}

fn cell(value: &serde_json::Value) -> String {
    let text = match value {
        serde_json::Value::Null => "NULL".to_string(),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    text.replace('|', "\\|").replace('\n', " ")
}

/// Full answer: SQL, error (if any), then the result table
pub fn render_output(output: &PipelineOutput) -> String {
    let mut text = String::new();

    let origin = match &output.source {
        AnswerSource::Model { rank, .. } => format!("model candidate #{}", rank + 1),
        AnswerSource::Heuristic => "heuristic fallback".to_string(),
        AnswerSource::None => "no answer".to_string(),
    };
    text.push_str(&format!("Schema: {} ({origin})\n\n", output.schema));

    if !output.sql.is_empty() {
        text.push_str(&format!("```sql\n{}\n```\n\n", output.sql));
    }

    if let Some(error) = &output.error {
        text.push_str(&format!("Error: {error}\n"));
    }

    if let Some(result) = &output.result {
        text.push_str(&result_to_markdown(result));
        text.push_str(&format!("\n{} row(s)", result.row_count));
        if result.truncated {
            text.push_str(" (truncated)");
        }
        text.push('\n');
    }

    text
}
