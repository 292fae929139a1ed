//! NLSQL prompt construction
//!
//! Turns a natural-language question and a [`DatabaseSchema`] into the
//! single text prompt handed to a SQL generator:
//!
//! ```text
//! translate to SQL: <question> || schema: <tables> || relations: ... || agg_hints: COUNT
//! ```

pub mod linker;
pub mod preprocess;
pub mod serializer;

pub use linker::{link, LinkedColumn};
pub use preprocess::{aggregation_hints, AggregateHint, PreprocessedQuestion, Preprocessor};
pub use serializer::{SchemaSerializer, SerializerConfig};

#[doc(no_inline)]
pub use nlsql_schema::DatabaseSchema;
