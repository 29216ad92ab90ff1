//! paramset error handling.
//!
//! Every failure in the crate is a [`ParamError`]. Errors are plain data plus
//! a `miette` diagnostic view (stable code, help text and, for matrix files,
//! the offending source location).

use miette::{Diagnostic, LabeledSpan, NamedSource, SourceSpan};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Shared, named source text attached to matrix-file diagnostics.
pub type SourceArc = Arc<NamedSource<String>>;

#[derive(Debug, Error)]
pub enum ParamError {
    /// Two records merged by a combine share a parameter name.
    #[error("duplicate parameter key '{key}'")]
    DuplicateKey { key: String },

    /// A parameter name that cannot appear in a case id.
    #[error("invalid parameter name '{name}'")]
    InvalidName { name: String },

    /// A case query string could not be decoded.
    #[error("malformed parameter query '{query}': {reason}")]
    MalformedQuery { query: String, reason: String },

    /// A matrix file failed to parse or validate.
    #[error("invalid matrix file {path}: {message}")]
    Matrix {
        path: String,
        message: String,
        src: Option<SourceArc>,
        span: Option<SourceSpan>,
    },

    /// Two expanded cases of the same test have the same name.
    #[error("duplicate test case '{case}'")]
    DuplicateCase { case: String },

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl ParamError {
    /// Errors that mean the matrix itself is mis-declared, as opposed to an
    /// environmental failure. Test frameworks report these as a failure to
    /// build the case list, not as a failing test.
    pub fn is_matrix_construction(&self) -> bool {
        matches!(
            self,
            ParamError::DuplicateKey { .. }
                | ParamError::InvalidName { .. }
                | ParamError::DuplicateCase { .. }
        )
    }

    /// The part of the `paramset::` diagnostic code after the prefix.
    pub const fn code_suffix(&self) -> &'static str {
        match self {
            Self::DuplicateKey { .. } => "duplicate_key",
            Self::InvalidName { .. } => "invalid_name",
            Self::MalformedQuery { .. } => "malformed_query",
            Self::Matrix { .. } => "matrix",
            Self::DuplicateCase { .. } => "duplicate_case",
            Self::Io { .. } => "io",
        }
    }

    /// Builds a matrix-file error pointing at a byte offset of `text`.
    pub fn matrix_at(
        path: &str,
        text: &str,
        message: impl Into<String>,
        offset: Option<usize>,
    ) -> ParamError {
        let span = offset.map(|at| {
            let at = at.min(text.len());
            let len = if at < text.len() { 1 } else { 0 };
            SourceSpan::from(at..at + len)
        });
        ParamError::Matrix {
            path: path.to_string(),
            message: message.into(),
            src: Some(Arc::new(NamedSource::new(path, text.to_string()))),
            span,
        }
    }

    fn help_text(&self) -> Option<String> {
        match self {
            Self::DuplicateKey { key } => Some(format!(
                "two combined axes both define '{}'; rename one of them",
                key
            )),
            Self::InvalidName { .. } => Some(
                "parameter names must be non-empty and may not contain '=', ';' or ':'"
                    .to_string(),
            ),
            Self::MalformedQuery { .. } => Some(
                "queries look like suite:test:name=<json>;name=<json>, optionally ending in ;*"
                    .to_string(),
            ),
            Self::DuplicateCase { .. } => Some(
                "an axis lists the same value twice, or literal records repeat".to_string(),
            ),
            Self::Matrix { .. } | Self::Io { .. } => None,
        }
    }
}

impl Diagnostic for ParamError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(format!("paramset::{}", self.code_suffix())))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.help_text()
            .map(|h| Box::new(h) as Box<dyn fmt::Display + 'a>)
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match self {
            Self::Matrix { src: Some(src), .. } => Some(src.as_ref() as &dyn miette::SourceCode),
            _ => None,
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let Self::Matrix {
            message,
            src: Some(_),
            span: Some(span),
            ..
        } = self
        else {
            return None;
        };
        let labels = vec![LabeledSpan::new_with_span(Some(message.clone()), *span)];
        Some(Box::new(labels.into_iter()))
    }
}

// ============================================================================
// ERROR FORMATTING UTILITIES
// ============================================================================

/// Prints a ParamError with full miette diagnostics to stderr.
pub fn print_error(error: ParamError) {
    let report = miette::Report::new(error);
    eprintln!("{report:?}");
}
