//! Transcoding module.
//!
//! - Rules: read the transcoding table
//! - Compiler: raw rules to a mapping keyed by destination field
//! - Resolver: source field name to column index
//! - Extractor: one source row to an extracted record
//! - Writer: extracted record to the destination
//! - Pipeline: all of the above as one invocation

pub mod compiler;
pub mod extractor;
pub mod pipeline;
pub mod resolver;
pub mod rules;
pub mod writer;

pub use compiler::{compile, log_mapping};
pub use extractor::extract_row;
pub use pipeline::*;
pub use resolver::{resolve_field_index, FieldResolver};
pub use rules::load_rules;
pub use writer::{
    join_values, resolve_target, write_field, write_record, TargetStrategy, WriteReport, WrittenField,
    DEFAULT_JOIN_SEPARATOR, RESOLUTION_ORDER,
};
