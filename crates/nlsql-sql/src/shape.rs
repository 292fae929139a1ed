//! Minimal statement shape computed from the SQL token stream
//!
//! Validation only needs three facts about a statement: its leading
//! keyword, whether it has a FROM, and which identifiers it mentions.
//! Those are read off the `sqlparser` tokenizer rather than a full parse,
//! so slightly malformed model output still gets a specific rejection
//! reason instead of a generic parse error.

use sqlparser::dialect::SQLiteDialect;
use sqlparser::keywords::Keyword;
use sqlparser::tokenizer::{Token, TokenWithSpan, Tokenizer, Whitespace};
use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    #[error("empty statement")]
    Empty,

    #[error("{0}")]
    Tokenize(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementShape {
    /// First word of the statement, uppercased
    pub leading_keyword: Option<String>,
    pub has_from: bool,
    /// Lowercased words that are not SQL clause/operator keywords
    pub referenced_identifiers: BTreeSet<String>,
}

impl StatementShape {
    pub fn parse(sql: &str) -> Result<Self, ShapeError> {
        let tokens = tokenize(sql)?;

        let mut significant = tokens.iter().filter(|t| !is_trivia(t)).peekable();
        if significant.peek().is_none() {
            return Err(ShapeError::Empty);
        }

        let mut shape = StatementShape {
            leading_keyword: None,
            has_from: false,
            referenced_identifiers: BTreeSet::new(),
        };

        for (idx, token) in significant.enumerate() {
            let Token::Word(word) = token else {
                continue;
            };

            if idx == 0 && word.quote_style.is_none() {
                shape.leading_keyword = Some(word.value.to_uppercase());
            }

            if word.quote_style.is_none() && word.keyword == Keyword::FROM {
                shape.has_from = true;
            } else if word.quote_style.is_some() || !is_structural_keyword(word.keyword) {
                shape.referenced_identifiers.insert(word.value.to_lowercase());
            }
        }

        Ok(shape)
    }

    pub fn is_select(&self) -> bool {
        matches!(self.leading_keyword.as_deref(), Some("SELECT") | Some("WITH"))
    }
}

pub(crate) fn tokenize(sql: &str) -> Result<Vec<Token>, ShapeError> {
    let dialect = SQLiteDialect {};
    Tokenizer::new(&dialect, sql)
        .tokenize()
        .map_err(|e| ShapeError::Tokenize(e.to_string()))
}

/// Tokens with their 1-based line/column spans in `sql`
pub(crate) fn tokenize_with_spans(sql: &str) -> Result<Vec<TokenWithSpan>, ShapeError> {
    let dialect = SQLiteDialect {};
    Tokenizer::new(&dialect, sql)
        .tokenize_with_location()
        .map_err(|e| ShapeError::Tokenize(e.to_string()))
}

pub(crate) fn is_trivia(token: &Token) -> bool {
    matches!(token, Token::Whitespace(_) | Token::EOF)
}

pub(crate) fn is_comment(token: &Token) -> bool {
    matches!(
        token,
        Token::Whitespace(Whitespace::SingleLineComment { .. } | Whitespace::MultiLineComment(_))
    )
}

/// Keywords that shape a query rather than name something in it
pub(crate) fn is_structural_keyword(keyword: Keyword) -> bool {
    matches!(
        keyword,
        Keyword::SELECT
            | Keyword::FROM
            | Keyword::WHERE
            | Keyword::GROUP
            | Keyword::ORDER
            | Keyword::BY
            | Keyword::HAVING
            | Keyword::LIMIT
            | Keyword::OFFSET
            | Keyword::JOIN
            | Keyword::INNER
            | Keyword::LEFT
            | Keyword::RIGHT
            | Keyword::FULL
            | Keyword::OUTER
            | Keyword::CROSS
            | Keyword::NATURAL
            | Keyword::ON
            | Keyword::USING
            | Keyword::AS
            | Keyword::AND
            | Keyword::OR
            | Keyword::NOT
            | Keyword::IN
            | Keyword::IS
            | Keyword::NULL
            | Keyword::LIKE
            | Keyword::BETWEEN
            | Keyword::ASC
            | Keyword::DESC
            | Keyword::DISTINCT
            | Keyword::UNION
            | Keyword::ALL
            | Keyword::EXCEPT
            | Keyword::INTERSECT
            | Keyword::CASE
            | Keyword::WHEN
            | Keyword::THEN
            | Keyword::ELSE
            | Keyword::END
            | Keyword::EXISTS
            | Keyword::WITH
    )
}
