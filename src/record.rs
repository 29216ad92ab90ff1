//! Parameter records: one fully specified set of named values.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::errors::ParamError;
use crate::value::Value;

/// An ordered mapping from parameter name to [`Value`] with unique names.
///
/// Entry order is the order in which parameters were added. It only affects
/// rendering ([`ParamRecord::to_query`]); equality ignores it.
///
/// Names are non-empty and free of `=`, `;` and `:`, the separators of a
/// case id. [`ParamRecord::insert`] and deserialization enforce this; records
/// built with `collect` or [`params!`](crate::params) are checked when a set
/// yields them.
#[derive(Debug, Clone, Default)]
pub struct ParamRecord {
    entries: Vec<(String, Value)>,
}

impl ParamRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// A record with a single entry.
    pub fn single(name: impl Into<String>, value: impl Into<Value>) -> Result<Self, ParamError> {
        let name = name.into();
        check_name(&name)?;
        Ok(Self {
            entries: vec![(name, value.into())],
        })
    }

    /// Adds a parameter, failing if the name is invalid or already present.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<(), ParamError> {
        let name = name.into();
        check_name(&name)?;
        if self.contains_key(&name) {
            return Err(ParamError::DuplicateKey { key: name });
        }
        self.entries.push((name, value.into()));
        Ok(())
    }

    /// Fails on the first name that could not be written in a case id.
    pub fn check_names(&self) -> Result<(), ParamError> {
        self.keys().try_for_each(check_name)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.entries.iter().any(|(key, _)| key == name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Disjoint union of two records: `self`'s entries, then `other`'s.
    ///
    /// Fails with [`ParamError::DuplicateKey`] on the first name of `other`
    /// already present in `self`. Nothing is ever overwritten.
    pub fn merge(&self, other: &ParamRecord) -> Result<ParamRecord, ParamError> {
        if let Some(key) = other.keys().find(|key| self.contains_key(key)) {
            tracing::debug!(key, "parameter key collision while merging records");
            return Err(ParamError::DuplicateKey {
                key: key.to_string(),
            });
        }
        let mut entries = Vec::with_capacity(self.len() + other.len());
        entries.extend(self.entries.iter().cloned());
        entries.extend(other.entries.iter().cloned());
        Ok(ParamRecord { entries })
    }

    /// True when every entry of `pattern` is present here with an equal value.
    /// Keys absent from the pattern are not checked, so `{}` matches anything.
    pub fn matches(&self, pattern: &ParamRecord) -> bool {
        pattern
            .iter()
            .all(|(key, expected)| self.get(key) == Some(expected))
    }

    // ------------------------------------------------------------------------
    // Query strings
    // ------------------------------------------------------------------------

    /// Renders `name=<json>;name=<json>` in entry order.
    ///
    /// ```rust
    /// use paramset::params;
    /// let r = params! { "x" => 1, "format" => "r8unorm" };
    /// assert_eq!(r.to_query(), "x=1;format=\"r8unorm\"");
    /// ```
    pub fn to_query(&self) -> String {
        self.entries
            .iter()
            .map(|(key, value)| format!("{}={}", key, value.to_json()))
            .collect::<Vec<_>>()
            .join(";")
    }

    /// Decodes the output of [`ParamRecord::to_query`].
    pub fn parse_query(query: &str) -> Result<ParamRecord, ParamError> {
        let malformed = |reason: String| ParamError::MalformedQuery {
            query: query.to_string(),
            reason,
        };

        let mut record = ParamRecord::new();
        for part in split_top_level(query).map_err(|reason| malformed(reason.to_string()))? {
            let (key, text) = part
                .split_once('=')
                .ok_or_else(|| malformed(format!("'{}' has no '='", part)))?;
            if key.is_empty() {
                return Err(malformed("empty parameter name".to_string()));
            }
            if record.contains_key(key) {
                return Err(malformed(format!("'{}' appears twice", key)));
            }
            let value = Value::from_json(text)
                .map_err(|e| malformed(format!("value of '{}': {}", key, e)))?;
            record.insert(key, value).map_err(|e| malformed(e.to_string()))?;
        }
        Ok(record)
    }
}

fn check_name(name: &str) -> Result<(), ParamError> {
    if name.is_empty() || name.contains(['=', ';', ':']) {
        return Err(ParamError::InvalidName {
            name: name.to_string(),
        });
    }
    Ok(())
}

/// Splits on `;` outside JSON strings, arrays and objects.
fn split_top_level(query: &str) -> Result<Vec<&str>, &'static str> {
    let mut parts = Vec::new();
    if query.is_empty() {
        return Ok(parts);
    }

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    let mut start = 0;
    for (at, ch) in query.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '[' | '{' => depth += 1,
            ']' | '}' => depth = depth.checked_sub(1).ok_or("unbalanced brackets")?,
            ';' if depth == 0 => {
                parts.push(&query[start..at]);
                start = at + 1;
            }
            _ => {}
        }
    }
    if in_string {
        return Err("unterminated string");
    }
    if depth != 0 {
        return Err("unbalanced brackets");
    }
    parts.push(&query[start..]);
    Ok(parts)
}

impl PartialEq for ParamRecord {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.matches(other)
    }
}

impl fmt::Display for ParamRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (key, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", key, value)?;
        }
        write!(f, "}}")
    }
}

/// Later entries replace earlier ones with the same name, like a map.
impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ParamRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = ParamRecord::new();
        for (key, value) in iter {
            let key = key.into();
            let value = value.into();
            match record.entries.iter_mut().find(|(k, _)| *k == key) {
                Some(slot) => slot.1 = value,
                None => record.entries.push((key, value)),
            }
        }
        record
    }
}

impl Serialize for ParamRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ParamRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RecordVisitor;

        impl<'de> Visitor<'de> for RecordVisitor {
            type Value = ParamRecord;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of parameter names to values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<ParamRecord, A::Error> {
                let mut record = ParamRecord::new();
                while let Some((key, value)) = access.next_entry::<String, Value>()? {
                    record.insert(key, value).map_err(serde::de::Error::custom)?;
                }
                Ok(record)
            }
        }

        deserializer.deserialize_map(RecordVisitor)
    }
}

/// Builds a [`ParamRecord`] from literal `name => value` pairs.
///
/// ```rust
/// use paramset::params;
/// let r = params! { "x" => 1, "y" => "a" };
/// assert_eq!(r.len(), 2);
/// ```
#[macro_export]
macro_rules! params {
    () => {
        $crate::ParamRecord::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {
        <$crate::ParamRecord as ::std::iter::FromIterator<(::std::string::String, $crate::Value)>>::from_iter([
            $((::std::string::String::from($key), $crate::Value::from($value))),+
        ])
    };
}
