//! Input parsing and output writing for tabular files.

mod parser;
mod source;
mod writer;

pub use parser::{Parser, ParserConfig};
pub use source::{SourceMetadata, format_for_delimiter, is_null_value};
pub use writer::{to_records, write_delimited, write_delimited_to, write_json};
