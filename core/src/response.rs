//! Envelope around a parsed Pushover reply.
//!
//! # Design
//! The API always answers with a JSON object, on success and on failure.
//! `Response` keeps that object untouched and interprets a single field,
//! `status`, which is `1` on success. Everything else (`errors`,
//! `devices`, `receipt`, `acknowledged_at`, ...) is reached through `get`.

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ParseError;

/// Immutable view of one API reply.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Response {
    data: Map<String, Value>,
}

impl Response {
    /// Wrap an already-parsed JSON object.
    pub fn new(data: Map<String, Value>) -> Self {
        Self { data }
    }

    /// Wrap a JSON value, rejecting anything that is not an object.
    pub fn from_value(value: Value) -> Result<Self, ParseError> {
        match value {
            Value::Object(data) => Ok(Self { data }),
            other => Err(ParseError::NotAnObject(kind_of(&other))),
        }
    }

    /// Parse a raw response body.
    pub fn parse(body: &str) -> Result<Self, ParseError> {
        let value: Value = serde_json::from_str(body)?;
        Self::from_value(value)
    }

    /// Look up a top-level field. Missing keys are `None`, never an error.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// `status` coerced to an integer the way a loose `to_i` would.
    ///
    /// Integers pass through, floats truncate, strings yield their leading
    /// integer (`" 1"` and `"1abc"` give 1, `"abc"` gives 0). Anything else,
    /// including a missing field, is 0.
    pub fn status(&self) -> i64 {
        self.get("status").map(coerce_int).unwrap_or(0)
    }

    /// True iff `status` coerces to exactly 1.
    pub fn ok(&self) -> bool {
        self.status() == 1
    }

    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    /// Independent copy of the underlying object.
    pub fn to_map(&self) -> Map<String, Value> {
        self.data.clone()
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.data
    }
}

impl TryFrom<Value> for Response {
    type Error = ParseError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

impl From<Map<String, Value>> for Response {
    fn from(data: Map<String, Value>) -> Self {
        Self::new(data)
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Map<String, Value> always serializes.
        match serde_json::to_string(&self.data) {
            Ok(s) => f.write_str(&s),
            Err(_) => write!(f, "{:?}", self.data),
        }
    }
}

fn coerce_int(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        Value::String(s) => leading_int(s),
        _ => 0,
    }
}

fn leading_int(s: &str) -> i64 {
    let s = s.trim_start();
    let (sign, rest) = match s.as_bytes().first() {
        Some(b'-') => (-1, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    rest[..end].parse::<i64>().map(|n| sign * n).unwrap_or(0)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
