//! YAML error diagnostics for inspection documents and tables

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// YAML error with source location
#[derive(Debug, Error, Diagnostic)]
#[error("Cannot read {kind} file: {message}")]
#[diagnostic(code(aql::yaml::syntax))]
pub struct YamlSyntaxError {
    #[source_code]
    src: NamedSource<String>,

    #[label("error here")]
    span: SourceSpan,

    #[help]
    help: Option<String>,

    /// What kind of document was being read
    kind: &'static str,

    /// The underlying error message
    message: String,
}

impl YamlSyntaxError {
    /// Create a syntax error from a serde_yml error
    pub fn from_serde_error(
        err: &serde_yml::Error,
        source: &str,
        filename: &str,
        kind: &'static str,
    ) -> Self {
        let (line, column) = err
            .location()
            .map(|loc| (loc.line(), loc.column()))
            .unwrap_or((1, 1));

        let offset = line_col_to_offset(source, line, column);
        let message = err.to_string();
        let help = generate_help(&message);

        Self {
            src: NamedSource::new(filename, source.to_string()),
            span: SourceSpan::from(offset..offset.saturating_add(1)),
            help,
            kind,
            message,
        }
    }
}

/// Errors reading a YAML document from disk
#[derive(Debug, Error, Diagnostic)]
pub enum YamlError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Syntax(#[from] YamlSyntaxError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Parse YAML text, turning failures into a located diagnostic
pub fn parse_yaml<T: serde::de::DeserializeOwned>(
    source: &str,
    filename: &str,
    kind: &'static str,
) -> Result<T, YamlSyntaxError> {
    serde_yml::from_str(source)
        .map_err(|e| YamlSyntaxError::from_serde_error(&e, source, filename, kind))
}

/// Convert line/column to byte offset
fn line_col_to_offset(source: &str, line: usize, column: usize) -> usize {
    let mut offset = 0;
    let mut current_line = 1;

    for (i, ch) in source.char_indices() {
        if current_line == line {
            let line_start = i;
            let mut col = 1;
            for (j, c) in source[line_start..].char_indices() {
                if col == column {
                    return line_start + j;
                }
                if c == '\n' {
                    break;
                }
                col += 1;
            }
            return line_start + column.saturating_sub(1);
        }
        if ch == '\n' {
            current_line += 1;
        }
        offset = i;
    }

    offset
}

/// Generate helpful suggestions based on error message
fn generate_help(message: &str) -> Option<String> {
    let msg_lower = message.to_lowercase();

    if msg_lower.contains("tab") {
        return Some(
            "YAML requires spaces for indentation, not tabs. Replace tabs with spaces.".to_string(),
        );
    }

    if msg_lower.contains("duplicate key") {
        return Some("Each key can only appear once. Remove or rename the duplicate key.".to_string());
    }

    if msg_lower.contains("missing field") {
        return Some(
            "A required field is missing. Compare with a file created by `aql insp new`.".to_string(),
        );
    }

    if msg_lower.contains("unknown variant") {
        return Some(
            "Check enum values: steps are first..fifth, statuses in_progress/pass/reject, letters A-H, J-N, P, Q."
                .to_string(),
        );
    }

    if msg_lower.contains("acceptance number") {
        return Some("Use a whole number or \"#\" for the acceptance number.".to_string());
    }

    if msg_lower.contains("mapping values are not allowed") {
        return Some("You may be missing a space after ':' or have incorrect indentation.".to_string());
    }

    None
}
