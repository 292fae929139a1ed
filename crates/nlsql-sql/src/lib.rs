//! NLSQL SQL handling - post-processing of generated SQL and the heuristic fallback

pub mod fallback;
mod format;
mod postprocess;
pub mod shape;

pub use fallback::HeuristicTranslator;
pub use format::pretty_format;
pub use postprocess::{sanitize, validate, ValidationError};
pub use shape::{ShapeError, StatementShape};
