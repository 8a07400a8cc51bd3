//! # GraphEDA Graph
//!
//! Exploratory analysis of a Neo4j property graph.
//!
//! Runs the named analyses of the catalog over a managed connection,
//! memoizes their results per parameter set, and exposes everything
//! through [`GraphEda`].

pub mod cache;
pub mod client;
pub mod executor;
pub mod facade;
pub mod handle;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use cache::{CacheKey, ResultCache};
pub use client::{Neo4jConnector, Neo4jTransport};
pub use executor::Executor;
pub use facade::{AnalysisOutput, GraphEda, GraphSummary, RunOptions};
pub use handle::{ConnectionHandle, ConnectionState, Session};
pub use transport::{GraphConnector, GraphTransport, Statement};
