use im::{OrdMap, Vector};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

const NAN_TAG: &str = "_nan_";
const POS_INF_TAG: &str = "_posinf_";
const NEG_INF_TAG: &str = "_neginf_";

/// A single parameter value.
///
/// Values are a closed set of JSON-like kinds. They serialize untagged, so a
/// matrix file can write `4`, `1.5`, `true`, `"rgba8unorm"`, `[1, 2]` or
/// `{ w: 4, h: 4 }` directly.
///
/// JSON has no spelling for NaN or the infinities, so non-finite floats are
/// written as the strings `"_nan_"`, `"_posinf_"` and `"_neginf_"`, and those
/// strings read back as floats. NaN equals NaN here, so records holding it
/// still compare equal to themselves. Integers must fit in an `i64`; larger
/// ones are rejected rather than rounded to a float.
///
/// # Examples
///
/// ```rust
/// use paramset::Value;
/// let n = Value::from(3);
/// assert_eq!(n.type_name(), "Int");
/// let s = Value::from("hello");
/// assert_eq!(s.to_string(), "\"hello\"");
/// ```
#[derive(Debug, Clone)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vector<Value>),
    Map(OrdMap<String, Value>),
}

impl Value {
    /// Returns the type name of the value as a string.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use paramset::Value;
    /// assert_eq!(Value::Bool(true).type_name(), "Bool");
    /// ```
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "Bool",
            Value::Int(_) => "Int",
            Value::Float(_) => "Float",
            Value::String(_) => "String",
            Value::List(_) => "List",
            Value::Map(_) => "Map",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the value as a float. Integers widen.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Canonical JSON text for this value, as used in case names.
    pub fn to_json(&self) -> String {
        // Map keys are strings and non-finite floats are tagged, so this
        // never fails.
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Parses canonical JSON text back into a value.
    pub fn from_json(text: &str) -> Result<Value, serde_json::Error> {
        serde_json::from_str(text)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            _ => false,
        }
    }
}

fn non_finite_tag(n: f64) -> Option<&'static str> {
    if n.is_nan() {
        Some(NAN_TAG)
    } else if n == f64::INFINITY {
        Some(POS_INF_TAG)
    } else if n == f64::NEG_INFINITY {
        Some(NEG_INF_TAG)
    } else {
        None
    }
}

fn non_finite_from_tag(tag: &str) -> Option<f64> {
    match tag {
        NAN_TAG => Some(f64::NAN),
        POS_INF_TAG => Some(f64::INFINITY),
        NEG_INF_TAG => Some(f64::NEG_INFINITY),
        _ => None,
    }
}

// ============================================================================
// SERDE
// ============================================================================

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(n) => serializer.serialize_i64(*n),
            Value::Float(n) => match non_finite_tag(*n) {
                Some(tag) => serializer.serialize_str(tag),
                None => serializer.serialize_f64(*n),
            },
            Value::String(s) => serializer.serialize_str(s),
            Value::List(items) => items.serialize(serializer),
            Value::Map(map) => map.serialize(serializer),
        }
    }
}

/// Wire shape of a value before tags and integer range are checked.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawValue {
    Bool(bool),
    Int(i64),
    Wide(u64),
    Float(f64),
    String(String),
    List(Vector<Value>),
    Map(OrdMap<String, Value>),
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = match RawValue::deserialize(deserializer)? {
            RawValue::Bool(b) => Value::Bool(b),
            RawValue::Int(n) => Value::Int(n),
            RawValue::Wide(n) => {
                return Err(D::Error::custom(format!(
                    "integer {} does not fit in a 64-bit signed parameter",
                    n
                )))
            }
            RawValue::Float(n) => Value::Float(n),
            RawValue::String(s) => match non_finite_from_tag(&s) {
                Some(n) => Value::Float(n),
                None => Value::String(s),
            },
            RawValue::List(items) => Value::List(items),
            RawValue::Map(map) => Value::Map(map),
        };
        Ok(value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_json())
    }
}

// ============================================================================
// CONVERSIONS
// ============================================================================

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n.into())
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Int(n.into())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl From<OrdMap<String, Value>> for Value {
    fn from(map: OrdMap<String, Value>) -> Self {
        Value::Map(map)
    }
}
