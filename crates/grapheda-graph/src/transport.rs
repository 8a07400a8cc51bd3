//! The seam between the engine and the database protocol.
//!
//! The engine only needs three things from a graph database: open a
//! connection, run a parameterized query returning rows, close. Anything
//! implementing these traits can stand in for Neo4j.

use std::sync::Arc;

use async_trait::async_trait;
use grapheda_core::{Column, ConnectionConfig, GraphEdaResult, Params, ResultRecord};

/// A query ready to run: template, bound parameters and expected columns.
#[derive(Debug, Clone, Copy)]
pub struct Statement<'a> {
    /// Analysis the statement belongs to, for error reporting.
    pub analysis: &'a str,
    pub cypher: &'a str,
    pub params: &'a Params,
    pub columns: &'a [Column],
}

/// Opens transports for a connection config.
#[async_trait]
pub trait GraphConnector: Send + Sync {
    /// Establish a live connection. Implementations should fail fast with
    /// `ConnectionRefused` when the server cannot be reached.
    async fn open(&self, config: &ConnectionConfig) -> GraphEdaResult<Arc<dyn GraphTransport>>;
}

/// A live, shareable connection to a graph database.
#[async_trait]
pub trait GraphTransport: Send + Sync {
    /// Run one statement and drain every row, in the order returned.
    async fn run(&self, statement: &Statement<'_>) -> GraphEdaResult<Vec<ResultRecord>>;

    /// Release pooled network resources.
    async fn close(&self);
}
