//! YAML helpers

pub mod diagnostics;

pub use diagnostics::{parse_yaml, YamlError, YamlSyntaxError};
