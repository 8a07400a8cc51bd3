//! Analysis definition models.

use serde::Serialize;

use crate::error::{GraphEdaError, GraphEdaResult};
use crate::params::{ParamValue, Params};
use crate::result::{ResultRecord, Value};

/// How a result column is decoded from the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Integer,
    Float,
    /// Nullable string.
    Text,
    TextList,
}

/// One column of an analysis' result-row schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
}

/// The order an analysis' query promises for its rows.
///
/// The engine never re-sorts; the policy documents what the query does
/// and lets the engine flag a query that breaks its promise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "policy")]
pub enum OrderPolicy {
    CountDescending { column: String },
    Unordered,
}

impl OrderPolicy {
    /// Whether `rows` honour the policy.
    pub fn holds_for(&self, rows: &[ResultRecord]) -> bool {
        match self {
            Self::Unordered => true,
            Self::CountDescending { column } => {
                let counts: Vec<i64> = rows
                    .iter()
                    .map(|row| row.get(column).and_then(Value::as_integer).unwrap_or(0))
                    .collect();
                counts.windows(2).all(|pair| pair[0] >= pair[1])
            }
        }
    }
}

/// A named, read-only analysis: a parameterized Cypher template plus the
/// shape of the rows it returns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisDefinition {
    pub name: String,
    pub description: String,
    pub query: String,
    pub columns: Vec<Column>,
    pub order: OrderPolicy,
    /// Declared parameters with their default values. Callers may only pass
    /// keys listed here.
    pub defaults: Params,
}

impl AnalysisDefinition {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        query: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            query: query.into(),
            columns: Vec::new(),
            order: OrderPolicy::Unordered,
            defaults: Params::new(),
        }
    }

    pub fn column(mut self, name: impl Into<String>, kind: ColumnKind) -> Self {
        self.columns.push(Column {
            name: name.into(),
            kind,
        });
        self
    }

    pub fn count_descending(mut self, column: impl Into<String>) -> Self {
        self.order = OrderPolicy::CountDescending {
            column: column.into(),
        };
        self
    }

    pub fn default_param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.defaults.insert(key.into(), value.into());
        self
    }

    /// Merge caller params over the declared defaults.
    ///
    /// Unknown keys and values whose type differs from the default are
    /// rejected, so every accepted call maps to one canonical parameter set.
    pub fn resolve_params(&self, given: &Params) -> GraphEdaResult<Params> {
        let mut resolved = self.defaults.clone();

        for (key, value) in given {
            let default = self.defaults.get(key).ok_or_else(|| {
                GraphEdaError::invalid_params(&self.name, format!("unknown parameter '{}'", key))
            })?;

            let value = match (default, value) {
                (ParamValue::Float(_), ParamValue::Integer(i)) => ParamValue::Float(*i as f64),
                (d, v) if std::mem::discriminant(d) == std::mem::discriminant(v) => v.clone(),
                _ => {
                    return Err(GraphEdaError::invalid_params(
                        &self.name,
                        format!("parameter '{}' expects a value like {}, got {}", key, default, value),
                    ))
                }
            };

            match value {
                ParamValue::Integer(i) if i < 0 => {
                    return Err(GraphEdaError::invalid_params(
                        &self.name,
                        format!("parameter '{}' must not be negative", key),
                    ));
                }
                ParamValue::Float(f) if !f.is_finite() => {
                    return Err(GraphEdaError::invalid_params(
                        &self.name,
                        format!("parameter '{}' must be a finite number", key),
                    ));
                }
                _ => {}
            }

            resolved.insert(key.clone(), value);
        }

        Ok(resolved)
    }
}
