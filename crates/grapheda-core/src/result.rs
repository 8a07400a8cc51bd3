//! Canonical result records produced by an analysis run.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::params::Params;

/// A single cell of a result row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Integer(i64),
    Float(f64),
    Text(String),
    TextList(Vec<String>),
}

impl Value {
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_text_list(&self) -> Option<&[String]> {
        match self {
            Self::TextList(list) => Some(list),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Float(x) => write!(f, "{}", x),
            Self::Text(s) => write!(f, "{}", s),
            Self::TextList(list) => write!(f, "[{}]", list.join(", ")),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Option<String>> for Value {
    fn from(value: Option<String>) -> Self {
        value.map(Self::Text).unwrap_or(Self::Null)
    }
}

impl From<Vec<String>> for Value {
    fn from(value: Vec<String>) -> Self {
        Self::TextList(value)
    }
}

/// One row of a query result. Columns keep the order the database
/// returned them in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultRecord {
    fields: Vec<(String, Value)>,
}

impl ResultRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style append.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(column, value);
        self
    }

    pub fn push(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.fields.push((column.into(), value.into()));
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields.iter().find(|(name, _)| name == column).map(|(_, v)| v)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for ResultRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// The materialized output of one analysis. Immutable once built; rows are
/// kept in exactly the order the query produced them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub analysis_name: String,
    pub params: Params,
    pub rows: Vec<ResultRecord>,
    pub computed_at: DateTime<Utc>,
}

impl AnalysisResult {
    pub fn new(analysis_name: impl Into<String>, params: Params, rows: Vec<ResultRecord>) -> Self {
        Self {
            analysis_name: analysis_name.into(),
            params,
            rows,
            computed_at: Utc::now(),
        }
    }

    /// Value of `column` in the first row; the shape of scalar analyses.
    pub fn scalar(&self, column: &str) -> Option<&Value> {
        self.rows.first().and_then(|row| row.get(column))
    }

    /// Integer in `column` of the first row, 0 if the result is empty.
    pub fn scalar_count(&self, column: &str) -> i64 {
        self.scalar(column).and_then(Value::as_integer).unwrap_or(0)
    }

    /// Every integer found in `column`, in row order.
    pub fn column_integers<'a>(&'a self, column: &'a str) -> impl Iterator<Item = i64> + 'a {
        self.rows
            .iter()
            .filter_map(move |row| row.get(column).and_then(Value::as_integer))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
