//! Declarative matrix files.
//!
//! A matrix file names a suite and lists its tests, each with a parameter
//! set definition. YAML (`.yaml`, `.yml`) and JSON (`.json`) are accepted:
//!
//! ```yaml
//! suite: webgpu:buffers
//! tests:
//!   - name: copy
//!     params:
//!       combine:
//!         - options: { name: size, values: [4, 16] }
//!         - bools: { name: mapped }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::ParamError;
use crate::params::{self, ParamSet};
use crate::record::ParamRecord;
use crate::value::Value;

// ============================================================================
// FILE MODEL
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MatrixFile {
    pub suite: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub tests: Vec<TestDef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TestDef {
    pub name: String,
    #[serde(default)]
    pub params: SetDef,
}

/// Serializable form of a [`ParamSet`]. Predicates cannot be written in a
/// file, so filtering is expressed with `only` patterns instead.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub enum SetDef {
    #[default]
    Unit,
    Options {
        name: String,
        values: Vec<Value>,
    },
    Bools {
        name: String,
    },
    Records(Vec<ParamRecord>),
    Combine(Vec<SetDef>),
    Exclude {
        set: Box<SetDef>,
        patterns: Vec<ParamRecord>,
    },
    Only {
        set: Box<SetDef>,
        patterns: Vec<ParamRecord>,
    },
}

impl SetDef {
    pub fn build(&self) -> ParamSet {
        match self {
            SetDef::Unit => params::unit(),
            SetDef::Options { name, values } => params::options(name.as_str(), values.clone()),
            SetDef::Bools { name } => params::bools(name.as_str()),
            SetDef::Records(records) => params::records(records.iter().cloned()),
            SetDef::Combine(defs) => params::combine(defs.iter().map(SetDef::build)),
            SetDef::Exclude { set, patterns } => {
                params::exclude(set.build(), patterns.iter().cloned())
            }
            SetDef::Only { set, patterns } => params::only(set.build(), patterns.iter().cloned()),
        }
    }
}

// ============================================================================
// LOADING
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixFormat {
    Yaml,
    Json,
}

impl MatrixFormat {
    /// Picks the format from a file extension.
    pub fn from_path(path: &Path) -> Option<MatrixFormat> {
        match path.extension()?.to_str()? {
            "yaml" | "yml" => Some(MatrixFormat::Yaml),
            "json" => Some(MatrixFormat::Json),
            _ => None,
        }
    }
}

impl MatrixFile {
    /// Reads, parses and validates a matrix file.
    pub fn load(path: impl AsRef<Path>) -> Result<MatrixFile, ParamError> {
        let path = path.as_ref();
        let label = path.display().to_string();
        let format = MatrixFormat::from_path(path).ok_or_else(|| ParamError::Matrix {
            path: label.clone(),
            message: "unsupported extension; expected .yaml, .yml or .json".to_string(),
            src: None,
            span: None,
        })?;
        let text = std::fs::read_to_string(path).map_err(|source| ParamError::Io {
            path: label.clone(),
            source,
        })?;
        let file = MatrixFile::parse(&label, &text, format)?;
        tracing::debug!(
            path = %label,
            suite = %file.suite,
            tests = file.tests.len(),
            "loaded matrix file"
        );
        Ok(file)
    }

    /// Parses and validates matrix text. `label` names the source in errors.
    pub fn parse(label: &str, text: &str, format: MatrixFormat) -> Result<MatrixFile, ParamError> {
        let file: MatrixFile = match format {
            MatrixFormat::Yaml => serde_yaml::from_str(text).map_err(|e| {
                let offset = e.location().map(|loc| loc.index());
                ParamError::matrix_at(label, text, e.to_string(), offset)
            })?,
            MatrixFormat::Json => serde_json::from_str(text).map_err(|e| {
                let offset = offset_of(text, e.line(), e.column());
                ParamError::matrix_at(label, text, e.to_string(), offset)
            })?,
        };
        file.validate(label, text)?;
        Ok(file)
    }

    fn validate(&self, label: &str, text: &str) -> Result<(), ParamError> {
        if self.suite.trim().is_empty() {
            return Err(ParamError::matrix_at(label, text, "suite name is empty", None));
        }
        if self.suite.split(':').any(str::is_empty) {
            return Err(ParamError::matrix_at(
                label,
                text,
                format!("suite name '{}' has an empty segment", self.suite),
                token_offsets(text, &self.suite).next(),
            ));
        }
        for (i, test) in self.tests.iter().enumerate() {
            if test.name.trim().is_empty() {
                return Err(ParamError::matrix_at(label, text, "test name is empty", None));
            }
            if test.name.contains(':') {
                return Err(ParamError::matrix_at(
                    label,
                    text,
                    format!("test name '{}' contains ':'", test.name),
                    token_offsets(text, &test.name).next(),
                ));
            }
            if self.tests[..i].iter().any(|t| t.name == test.name) {
                return Err(ParamError::matrix_at(
                    label,
                    text,
                    format!("test '{}' is declared twice", test.name),
                    token_offsets(text, &test.name).last(),
                ));
            }
        }
        Ok(())
    }
}

/// Offsets where `token` appears delimited by non-word characters.
fn token_offsets<'a>(text: &'a str, token: &'a str) -> impl Iterator<Item = usize> + 'a {
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    text.match_indices(token).filter_map(move |(at, _)| {
        let before = text[..at].chars().next_back();
        let after = text[at + token.len()..].chars().next();
        let delimited = !before.is_some_and(is_word) && !after.is_some_and(is_word);
        delimited.then_some(at)
    })
}

/// Byte offset of a 1-based line/column position.
fn offset_of(text: &str, line: usize, column: usize) -> Option<usize> {
    if line == 0 {
        return None;
    }
    let line_start: usize = text
        .split_inclusive('\n')
        .take(line - 1)
        .map(str::len)
        .sum();
    Some(line_start + column.saturating_sub(1))
}
