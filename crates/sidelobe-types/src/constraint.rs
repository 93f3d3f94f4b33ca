//! Generator constraints.
//!
//! A [`ConstraintSet`] maps parameter names to typed values. Generators hold
//! a default set and merge each per-call set over it functionally; nothing
//! is mutated in place during production.

use std::collections::BTreeMap;
use std::fmt::{self, Display};
use std::str::FromStr;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Errors raised while resolving constraints.
///
/// These are reported by the generator before any case is produced.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConstraintError {
    /// The value under `name` has the wrong type.
    #[error("constraint '{name}' must be {expected}, got {found}")]
    Type {
        name: String,
        expected: &'static str,
        found: &'static str,
    },

    /// A required constraint has no value and no default anywhere.
    #[error("constraint '{name}' is required and has no default")]
    Missing { name: String },

    /// The value is well-typed but outside the generator's bounds.
    #[error("constraint '{name}' = {value} is outside {min}..={max}")]
    OutOfRange {
        name: String,
        value: i64,
        min: i64,
        max: i64,
    },

    /// A `key=value` assignment could not be parsed.
    #[error("cannot parse constraint '{input}': {reason}")]
    Parse { input: String, reason: String },
}

// ============================================================================
// Values
// ============================================================================

/// A typed constraint value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawConstraint", into = "RawConstraint")]
pub enum ConstraintValue {
    Int(i64),
    Byte(u8),
    Bool(bool),
    Bytes(Bytes),
    Text(String),
}

impl ConstraintValue {
    /// Human-readable type name, used in [`ConstraintError::Type`].
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Int(_) => "an integer",
            Self::Byte(_) => "a single byte",
            Self::Bool(_) => "a boolean",
            Self::Bytes(_) => "a byte string",
            Self::Text(_) => "text",
        }
    }
}

impl Display for ConstraintValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Byte(b) => write!(f, "0x{b:02x}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Bytes(b) => write!(f, "0x{}", hex::encode(b)),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

/// Parses the textual form used on the command line and in config files.
///
/// `true`/`false` are booleans, `0xNN` is a single byte, longer even-length
/// `0x…` strings are byte strings, decimal integers are integers, and
/// anything else is text.
impl FromStr for ConstraintValue {
    type Err = ConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed {
            "true" => return Ok(Self::Bool(true)),
            "false" => return Ok(Self::Bool(false)),
            _ => {}
        }

        if let Some(digits) = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
        {
            let bytes = hex::decode(digits).map_err(|e| ConstraintError::Parse {
                input: s.to_string(),
                reason: e.to_string(),
            })?;
            return Ok(match bytes.as_slice() {
                [single] => Self::Byte(*single),
                _ => Self::Bytes(Bytes::from(bytes)),
            });
        }

        if let Ok(v) = trimmed.parse::<i64>() {
            return Ok(Self::Int(v));
        }

        Ok(Self::Text(trimmed.to_string()))
    }
}

impl From<i64> for ConstraintValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u8> for ConstraintValue {
    fn from(value: u8) -> Self {
        Self::Byte(value)
    }
}

impl From<bool> for ConstraintValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for ConstraintValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ConstraintValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Bytes> for ConstraintValue {
    fn from(value: Bytes) -> Self {
        Self::Bytes(value)
    }
}

/// Wire form: TOML and JSON have no byte type, so bytes travel as `0x…` text.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawConstraint {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl TryFrom<RawConstraint> for ConstraintValue {
    type Error = ConstraintError;

    fn try_from(raw: RawConstraint) -> Result<Self, Self::Error> {
        match raw {
            RawConstraint::Bool(b) => Ok(Self::Bool(b)),
            RawConstraint::Int(v) => Ok(Self::Int(v)),
            RawConstraint::Text(s) => s.parse(),
        }
    }
}

impl From<ConstraintValue> for RawConstraint {
    fn from(value: ConstraintValue) -> Self {
        match value {
            ConstraintValue::Int(v) => Self::Int(v),
            ConstraintValue::Bool(b) => Self::Bool(b),
            ConstraintValue::Text(s) => Self::Text(s),
            other @ (ConstraintValue::Byte(_) | ConstraintValue::Bytes(_)) => {
                Self::Text(other.to_string())
            }
        }
    }
}

// ============================================================================
// Sets
// ============================================================================

/// An immutable-by-convention snapshot of named constraints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConstraintSet {
    values: BTreeMap<String, ConstraintValue>,
}

impl ConstraintSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ConstraintValue>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ConstraintValue>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&ConstraintValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConstraintValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns a new set where `self` overrides `defaults` key by key.
    pub fn merged_over(&self, defaults: &ConstraintSet) -> ConstraintSet {
        let mut values = defaults.values.clone();
        values.extend(self.values.iter().map(|(k, v)| (k.clone(), v.clone())));
        Self { values }
    }

    /// Parses a `key=value` assignment.
    pub fn parse_assignment(input: &str) -> Result<(String, ConstraintValue), ConstraintError> {
        let (key, value) = input.split_once('=').ok_or_else(|| ConstraintError::Parse {
            input: input.to_string(),
            reason: "expected key=value".to_string(),
        })?;
        let key = key.trim();
        if key.is_empty() {
            return Err(ConstraintError::Parse {
                input: input.to_string(),
                reason: "empty constraint name".to_string(),
            });
        }
        Ok((key.to_string(), value.parse()?))
    }

    /// Reads an integer constraint. A single `0xNN` byte reads as its value.
    pub fn int(&self, name: &str) -> Result<Option<i64>, ConstraintError> {
        match self.values.get(name) {
            None => Ok(None),
            Some(ConstraintValue::Int(v)) => Ok(Some(*v)),
            Some(ConstraintValue::Byte(b)) => Ok(Some(i64::from(*b))),
            Some(ConstraintValue::Bytes(b)) if b.len() == 1 => Ok(Some(i64::from(b[0]))),
            Some(other) => Err(type_error(name, "an integer", other)),
        }
    }

    /// Reads an integer constraint that must lie in `min..=max`.
    pub fn int_in(&self, name: &str, min: i64, max: i64) -> Result<Option<i64>, ConstraintError> {
        match self.int(name)? {
            Some(value) if !(min..=max).contains(&value) => Err(ConstraintError::OutOfRange {
                name: name.to_string(),
                value,
                min,
                max,
            }),
            other => Ok(other),
        }
    }

    /// Reads an integer constraint that has no default anywhere.
    pub fn require_int(&self, name: &str) -> Result<i64, ConstraintError> {
        self.int(name)?.ok_or_else(|| ConstraintError::Missing {
            name: name.to_string(),
        })
    }

    /// Reads a single-byte constraint.
    pub fn byte(&self, name: &str) -> Result<Option<u8>, ConstraintError> {
        match self.values.get(name) {
            None => Ok(None),
            Some(ConstraintValue::Byte(b)) => Ok(Some(*b)),
            Some(ConstraintValue::Bytes(b)) if b.len() == 1 => Ok(Some(b[0])),
            Some(ConstraintValue::Int(v)) => {
                u8::try_from(*v)
                    .map(Some)
                    .map_err(|_| ConstraintError::OutOfRange {
                        name: name.to_string(),
                        value: *v,
                        min: 0,
                        max: 255,
                    })
            }
            Some(other) => Err(type_error(name, "a single byte", other)),
        }
    }

    /// Reads a boolean constraint.
    pub fn flag(&self, name: &str) -> Result<Option<bool>, ConstraintError> {
        match self.values.get(name) {
            None => Ok(None),
            Some(ConstraintValue::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(type_error(name, "a boolean", other)),
        }
    }
}

impl<K: Into<String>, V: Into<ConstraintValue>> FromIterator<(K, V)> for ConstraintSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

fn type_error(name: &str, expected: &'static str, found: &ConstraintValue) -> ConstraintError {
    ConstraintError::Type {
        name: name.to_string(),
        expected,
        found: found.type_name(),
    }
}
