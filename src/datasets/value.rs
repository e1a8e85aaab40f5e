use std::fmt;

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};

use crate::strings::conversion::render_float;

/// A single cell of a [`Table`](crate::datasets::table::Table) or of a TAP query result.
///
/// Floats are serialized through their string form, so `NaN` and infinities
/// survive a save/open cycle of the table file.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Value {
    Missing,
    Bool(bool),
    Int(i64),
    Float(#[serde_as(as = "DisplayFromStr")] f64),
    Text(String),
}

impl Value {
    /// Parse a raw CSV cell coming from a TAP service.
    ///
    /// Empty cells are [`Value::Missing`]; integers, floats and booleans are
    /// recognized, anything else is kept as text.
    pub fn from_csv_cell(cell: &str) -> Self {
        let trimmed = cell.trim();
        if trimmed.is_empty() {
            return Value::Missing;
        }
        if let Ok(int) = trimmed.parse::<i64>() {
            return Value::Int(int);
        }
        if let Ok(float) = trimmed.parse::<f64>() {
            return Value::Float(float);
        }
        match trimmed {
            "true" | "True" => Value::Bool(true),
            "false" | "False" => Value::Bool(false),
            _ => Value::Text(cell.to_string()),
        }
    }

    /// `true` for [`Value::Missing`] and for a `NaN` float.
    pub fn is_missing(&self) -> bool {
        match self {
            Value::Missing => true,
            Value::Float(f) => f.is_nan(),
            _ => false,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Value::Text(_))
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Float(f) if f.fract() == 0.0 && f.is_finite() => Some(*f as i64),
            Value::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Plain scalar comparison: a missing value or a `NaN` float never equals
    /// anything, itself included. Everything else compares like `==`.
    pub fn scalar_eq(&self, other: &Value) -> bool {
        !self.is_missing() && !other.is_missing() && self == other
    }

    /// Render the value as an ADQL literal: text is single-quoted, numbers
    /// are written as-is and a missing value becomes `NULL`.
    pub fn to_adql_literal(&self) -> String {
        match self {
            Value::Text(s) => format!("'{s}'"),
            Value::Missing => "NULL".into(),
            Value::Bool(b) => if *b { "1" } else { "0" }.into(),
            other => other.to_string(),
        }
    }
}

impl PartialEq for Value {
    /// Cells compare the way table rows are compared when looking for
    /// duplicates: two `NaN` are equal, and so are two missing values.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Missing, Value::Missing) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Value::Text(a), Value::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Missing => write!(f, ""),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{}", render_float(*x)),
            Value::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value as i64)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Missing, Into::into)
    }
}
