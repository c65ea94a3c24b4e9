//! In-memory columnar dataset the pipeline operates on.

mod column;
pub mod stats;
mod table;
mod types;
mod value;

pub use column::Column;
pub use stats::NumericSummary;
pub use table::Dataset;
pub use types::ColumnType;
pub use value::{Value, parse_bool, parse_datetime};
