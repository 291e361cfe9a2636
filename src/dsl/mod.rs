pub mod parser;
pub mod schema;

pub use parser::{parse_workflow, DslFormat};
pub use schema::*;
