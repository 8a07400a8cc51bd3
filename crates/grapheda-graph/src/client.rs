//! Neo4j connection client.

use std::sync::Arc;

use async_trait::async_trait;
use grapheda_core::{
    Column, ColumnKind, ConnectionConfig, EngineConfig, GraphEdaError, GraphEdaResult, ParamValue,
    ResultRecord, Value,
};
use neo4rs::{ConfigBuilder, Graph, Query, Row};
use tracing::{debug, info};

use crate::transport::{GraphConnector, GraphTransport, Statement};

/// Opens [`Neo4jTransport`]s over the bolt protocol.
#[derive(Debug, Clone)]
pub struct Neo4jConnector {
    max_connections: usize,
    fetch_size: usize,
}

impl Neo4jConnector {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            max_connections: config.max_connections.max(1),
            fetch_size: config.fetch_size.max(1),
        }
    }
}

impl Default for Neo4jConnector {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

#[async_trait]
impl GraphConnector for Neo4jConnector {
    /// Note: neo4rs uses a lazy deadpool. `Graph::connect` only creates the
    /// pool object and does NOT establish a real bolt connection yet, so a
    /// `RETURN 1` ping forces the handshake and an unreachable server fails
    /// here instead of on the first analysis.
    async fn open(&self, config: &ConnectionConfig) -> GraphEdaResult<Arc<dyn GraphTransport>> {
        let mut builder = ConfigBuilder::default()
            .uri(config.uri.as_str())
            .user(config.username.as_str())
            .password(config.password.as_str())
            .max_connections(self.max_connections)
            .fetch_size(self.fetch_size);
        if let Some(db) = &config.database {
            builder = builder.db(db.as_str());
        }

        let neo4j_config = builder
            .build()
            .map_err(|e| GraphEdaError::Config(format!("invalid Neo4j config: {}", e)))?;

        let refused = |e: neo4rs::Error| GraphEdaError::ConnectionRefused {
            uri: config.uri.clone(),
            message: e.to_string(),
        };

        let graph = Graph::connect(neo4j_config).await.map_err(refused)?;
        graph
            .run(Query::new("RETURN 1".to_string()))
            .await
            .map_err(refused)?;

        info!(uri = %config.uri, database = ?config.database, "Connected to Neo4j");
        Ok(Arc::new(Neo4jTransport { graph }))
    }
}

/// A pooled Neo4j driver. Each [`GraphTransport::run`] checks a connection
/// out of the pool; it goes back when the row stream is dropped.
pub struct Neo4jTransport {
    graph: Graph,
}

#[async_trait]
impl GraphTransport for Neo4jTransport {
    async fn run(&self, statement: &Statement<'_>) -> GraphEdaResult<Vec<ResultRecord>> {
        let mut query = Query::new(statement.cypher.to_string());
        for (key, value) in statement.params {
            query = bind(query, key, value);
        }

        let mut stream = self
            .graph
            .execute(query)
            .await
            .map_err(|e| classify(statement.analysis, e))?;

        let mut records = Vec::new();
        while let Some(row) = stream
            .next()
            .await
            .map_err(|e| classify(statement.analysis, e))?
        {
            records.push(decode_row(&row, statement.columns)?);
        }
        Ok(records)
    }

    async fn close(&self) {
        // Pooled connections are dropped together with the last `Graph` clone.
        debug!("Releasing Neo4j connection pool");
    }
}

/// Bind a parameter as a bolt value; values never reach the query text.
fn bind(query: Query, key: &str, value: &ParamValue) -> Query {
    match value {
        ParamValue::Boolean(b) => query.param(key, *b),
        ParamValue::Integer(i) => query.param(key, *i),
        ParamValue::Float(f) => query.param(key, *f),
        ParamValue::Text(s) => query.param(key, s.as_str()),
    }
}

/// Transport trouble is a connection error; anything else the server or
/// driver reports is charged to the query.
fn classify(analysis: &str, err: neo4rs::Error) -> GraphEdaError {
    match &err {
        neo4rs::Error::IOError { .. } | neo4rs::Error::ConnectionError => {
            GraphEdaError::Connection(err.to_string())
        }
        _ => GraphEdaError::query(analysis, err),
    }
}

/// Decode a row column by column in schema order.
fn decode_row(row: &Row, columns: &[Column]) -> GraphEdaResult<ResultRecord> {
    let mut record = ResultRecord::new();

    for column in columns {
        let name = column.name.as_str();
        let value = match column.kind {
            ColumnKind::Integer => Value::Integer(row.get::<i64>(name).map_err(|e| decode_err(name, e))?),
            ColumnKind::Float => Value::Float(row.get::<f64>(name).map_err(|e| decode_err(name, e))?),
            ColumnKind::Text => {
                Value::from(row.get::<Option<String>>(name).map_err(|e| decode_err(name, e))?)
            }
            ColumnKind::TextList => {
                Value::TextList(row.get::<Vec<String>>(name).map_err(|e| decode_err(name, e))?)
            }
        };
        record.push(name, value);
    }

    Ok(record)
}

fn decode_err(column: &str, err: impl std::fmt::Debug) -> GraphEdaError {
    GraphEdaError::Decode {
        column: column.to_string(),
        message: format!("{:?}", err),
    }
}
