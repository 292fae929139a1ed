//! Display formatting for accepted SQL
//!
//! Re-indents top-level clauses onto their own lines and uppercases clause
//! keywords. Only whitespace and keyword case change, so the statement
//! means the same thing before and after.

use sqlparser::keywords::Keyword;
use sqlparser::tokenizer::{Location, Token, Whitespace};

use crate::shape::{is_comment, is_structural_keyword, tokenize_with_spans};

/// Words that may modify a following JOIN (and so own the line break)
const JOIN_MODIFIERS: &[Keyword] = &[
    Keyword::INNER,
    Keyword::LEFT,
    Keyword::RIGHT,
    Keyword::FULL,
    Keyword::OUTER,
    Keyword::CROSS,
    Keyword::NATURAL,
];

/// Pretty-print `sql`; input that cannot be tokenized is returned unchanged
pub fn pretty_format(sql: &str) -> String {
    format_tokens(sql).unwrap_or_else(|| sql.to_string())
}

fn format_tokens(sql: &str) -> Option<String> {
    let tokens = tokenize_with_spans(sql).ok()?;
    let lines = LineIndex::new(sql);
    let mut cursor = 0usize;

    let mut out = String::with_capacity(sql.len() + 16);
    let mut depth = 0usize;
    let mut pending_space = false;
    let mut prev_keyword: Option<Keyword> = None;
    let mut in_condition = false;
    let mut in_between = false;

    for spanned in &tokens {
        let token = &spanned.token;
        if matches!(token, Token::EOF) {
            continue;
        }
        // Tokens must tile the input exactly
        let start = lines.offset(sql, spanned.span.start)?;
        let end = lines.offset(sql, spanned.span.end)?;
        if start != cursor {
            return None;
        }
        let text = sql.get(start..end)?;
        cursor = end;

        match token {
            Token::Whitespace(_) if is_comment(token) => {
                if !out.is_empty() {
                    out.push(' ');
                }
                out.push_str(text);
                pending_space = !matches!(token, Token::Whitespace(Whitespace::SingleLineComment { .. }));
                continue;
            }
            Token::Whitespace(_) => {
                pending_space = true;
                continue;
            }
            _ => {}
        }

        let keyword = bare_keyword(token);
        let mut separator = if pending_space { " " } else { "" };

        if let (0, Some(kw)) = (depth, keyword) {
            if starts_clause(kw, prev_keyword) {
                separator = "\n";
                in_condition = matches!(kw, Keyword::WHERE | Keyword::HAVING);
                in_between = false;
            } else if kw == Keyword::BETWEEN {
                in_between = true;
            } else if kw == Keyword::AND && in_between {
                in_between = false;
            } else if in_condition && matches!(kw, Keyword::AND | Keyword::OR) {
                separator = "\n  ";
            }
        }

        if !out.is_empty() && !out.ends_with('\n') {
            out.push_str(separator);
        }

        match token {
            Token::LParen => depth += 1,
            Token::RParen => depth = depth.saturating_sub(1),
            _ => {}
        }

        match keyword {
            Some(kw) if is_structural_keyword(kw) => out.push_str(&text.to_uppercase()),
            _ => out.push_str(text),
        }
        prev_keyword = keyword;
        pending_space = false;
    }

    (cursor == sql.len()).then_some(out)
}

/// Keyword of an unquoted word token
fn bare_keyword(token: &Token) -> Option<Keyword> {
    match token {
        Token::Word(word) if word.quote_style.is_none() => Some(word.keyword),
        _ => None,
    }
}

fn starts_clause(kw: Keyword, prev: Option<Keyword>) -> bool {
    let after_modifier = prev.is_some_and(|p| JOIN_MODIFIERS.contains(&p));
    match kw {
        Keyword::FROM
        | Keyword::WHERE
        | Keyword::GROUP
        | Keyword::ORDER
        | Keyword::HAVING
        | Keyword::LIMIT
        | Keyword::UNION
        | Keyword::EXCEPT
        | Keyword::INTERSECT => true,
        Keyword::JOIN
        | Keyword::INNER
        | Keyword::LEFT
        | Keyword::RIGHT
        | Keyword::FULL
        | Keyword::CROSS
        | Keyword::NATURAL => !after_modifier,
        _ => false,
    }
}

/// Byte offset of every line start, for mapping tokenizer locations back
/// onto the source text
struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(sql: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(sql.match_indices('\n').map(|(i, _)| i + 1));
        Self { starts }
    }

    fn offset(&self, sql: &str, location: Location) -> Option<usize> {
        let line = usize::try_from(location.line).ok()?.checked_sub(1)?;
        let column = usize::try_from(location.column).ok()?.checked_sub(1)?;
        let start = *self.starts.get(line)?;
        sql[start..]
            .char_indices()
            .map(|(i, _)| start + i)
            .chain(std::iter::once(sql.len()))
            .nth(column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reindent_and_uppercase() {
        assert_eq!(
            pretty_format("select name from employees where age > 30 and department = 'Sales'"),
            "SELECT name\nFROM employees\nWHERE age > 30\n  AND department = 'Sales'"
        );
    }

    #[test]
    fn test_join_modifiers_keep_their_join() {
        assert_eq!(
            pretty_format("select e.name from employees as e left outer join departments as d on e.department_id = d.id"),
            "SELECT e.name\nFROM employees AS e\nLEFT OUTER JOIN departments AS d ON e.department_id = d.id"
        );
    }

    #[test]
    fn test_multiline_input_is_normalized() {
        let sql = "SELECT s.client,\n       d.division\nFROM sales AS s\nJOIN employees   AS e ON s.employee_id = e.id\nWHERE s.quarter = '2024-Q3'";
        assert_eq!(
            pretty_format(sql),
            "SELECT s.client, d.division\nFROM sales AS s\nJOIN employees AS e ON s.employee_id = e.id\nWHERE s.quarter = '2024-Q3'"
        );
    }

    #[test]
    fn test_subquery_clauses_stay_inline() {
        assert_eq!(
            pretty_format("select name from employees where age = (select max(age) from employees)"),
            "SELECT name\nFROM employees\nWHERE age = (SELECT max(age) FROM employees)"
        );
    }

    #[test]
    fn test_between_and_group_order() {
        assert_eq!(
            pretty_format("select department, count(*) from employees where age between 20 and 40 group by department order by 2 desc limit 3"),
            "SELECT department, count(*)\nFROM employees\nWHERE age BETWEEN 20 AND 40\nGROUP BY department\nORDER BY 2 DESC\nLIMIT 3"
        );
    }

    #[test]
    fn test_literals_and_quoted_identifiers_preserved() {
        assert_eq!(
            pretty_format("select \"first name\" from people where note = 'it''s from here'"),
            "SELECT \"first name\"\nFROM people\nWHERE note = 'it''s from here'"
        );
    }

    #[test]
    fn test_numeric_literals_keep_their_spelling() {
        assert_eq!(
            pretty_format("select 1e3, 0x10, -5, 1.50 from employees"),
            "SELECT 1e3, 0x10, -5, 1.50\nFROM employees"
        );
    }

    #[test]
    fn test_bracket_identifiers_and_multibyte_text() {
        assert_eq!(
            pretty_format("select [full name] from people\nwhere city = 'Zürich' and note <> 'é'"),
            "SELECT [full name]\nFROM people\nWHERE city = 'Zürich'\n  AND note <> 'é'"
        );
    }

    #[test]
    fn test_line_comment_keeps_following_clause_on_new_line() {
        assert_eq!(
            pretty_format("select name -- who\nfrom employees"),
            "SELECT name -- who\nFROM employees"
        );
    }

    #[test]
    fn test_untokenizable_input_unchanged() {
        assert_eq!(pretty_format("select 'broken"), "select 'broken");
    }
}
