//! Serialization helpers for user-editable buffers.

pub mod yaml;

pub use yaml::{from_yaml, to_yaml, to_yaml_with_header};
