pub mod executor;
pub mod grader;
pub mod guard;
pub mod rows;
pub mod split;

pub use executor::{QueryExecutor, QueryLimits, SqliteExecutor};
pub use grader::Grader;
pub use rows::{Cell, CompareMode, RowSet};
pub use split::split_queries;
