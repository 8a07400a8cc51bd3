//! The public entry point: catalog lookup, cache, execution, rendering.

use std::sync::Arc;
use std::time::Duration;

use grapheda_core::catalog::{
    DISCONNECTED_NODE_COUNT, NODE_COUNT, RELATIONSHIP_COUNT, UNLABELED_NODE_COUNT,
};
use grapheda_core::{
    AnalysisResult, Catalog, CatalogEntry, ConnectionConfig, EngineConfig, GraphEdaResult,
    ParamValue, Params, Table,
};
use serde::Serialize;
use tracing::info;

use crate::cache::{CacheKey, ResultCache};
use crate::client::Neo4jConnector;
use crate::executor::Executor;
use crate::handle::{ConnectionHandle, ConnectionState};
use crate::transport::GraphConnector;

/// Per-call options for [`GraphEda::run`].
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub params: Params,
    /// Skip the cache lookup and recompute.
    pub force_refresh: bool,
    /// Attach a [`Table`] rendering to the output.
    pub as_table: bool,
    /// Overrides the engine's default query timeout.
    pub timeout: Option<Duration>,
}

impl RunOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn params(mut self, params: Params) -> Self {
        self.params.extend(params);
        self
    }

    pub fn refresh(mut self, force_refresh: bool) -> Self {
        self.force_refresh = force_refresh;
        self
    }

    pub fn table(mut self, as_table: bool) -> Self {
        self.as_table = as_table;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// What [`GraphEda::run`] hands back. `result` is shared with the cache and
/// cannot be mutated through it.
#[derive(Debug, Clone)]
pub struct AnalysisOutput {
    pub result: Arc<AnalysisResult>,
    pub table: Option<Table>,
}

/// Headline counts of a graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphSummary {
    pub nodes: i64,
    pub relationships: i64,
    pub disconnected_nodes: i64,
    pub unlabeled_nodes: i64,
}

/// Exploratory analysis of one graph database.
///
/// Safe to share across tasks; concurrent `run`s use independent sessions
/// and a miss on one key never blocks another key.
pub struct GraphEda {
    catalog: Arc<Catalog>,
    handle: Arc<ConnectionHandle>,
    executor: Executor,
    cache: ResultCache,
    config: EngineConfig,
}

impl GraphEda {
    /// Engine over Neo4j with the built-in catalog.
    pub fn neo4j(config: EngineConfig) -> Self {
        let connector = Arc::new(Neo4jConnector::new(&config));
        Self::new(connector, config)
    }

    pub fn new(connector: Arc<dyn GraphConnector>, config: EngineConfig) -> Self {
        Self::with_catalog(connector, Arc::new(Catalog::builtin()), config)
    }

    pub fn with_catalog(
        connector: Arc<dyn GraphConnector>,
        catalog: Arc<Catalog>,
        config: EngineConfig,
    ) -> Self {
        let handle = Arc::new(ConnectionHandle::new(connector));
        Self {
            executor: Executor::new(Arc::clone(&handle), config.query_timeout()),
            cache: ResultCache::from_config(&config),
            catalog,
            handle,
            config,
        }
    }

    pub async fn connect(&self, config: &ConnectionConfig) -> GraphEdaResult<()> {
        self.handle.connect(config).await
    }

    /// Release the connection. Idempotent; the engine cannot reconnect.
    pub async fn close(&self) {
        self.handle.close().await;
    }

    pub async fn state(&self) -> ConnectionState {
        self.handle.state().await
    }

    pub async fn is_connected(&self) -> bool {
        self.state().await == ConnectionState::Connected
    }

    /// Names and descriptions of every available analysis.
    pub fn catalog(&self) -> Vec<CatalogEntry> {
        self.catalog.entries()
    }

    pub fn engine_config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run an analysis by name, serving it from the cache when possible.
    ///
    /// Unknown names and bad params fail before anything reaches the
    /// database.
    pub async fn run(&self, name: &str, options: &RunOptions) -> GraphEdaResult<AnalysisOutput> {
        let definition = self.catalog.get(name)?;
        let params = definition.resolve_params(&options.params)?;
        let key = CacheKey::new(&definition.name, &params);

        let result = self
            .cache
            .get_or_compute(key, options.force_refresh, || {
                self.executor.execute(definition, params, options.timeout)
            })
            .await?;

        let table = options.as_table.then(|| Table::from_result(&result));
        Ok(AnalysisOutput { result, table })
    }

    /// Confirm the database answers queries.
    pub async fn ping(&self) -> GraphEdaResult<()> {
        self.executor.ping(None).await?;
        info!("Connection confirmed");
        Ok(())
    }

    /// Drop cached results of one analysis, for every parameter set.
    pub async fn invalidate(&self, name: &str) -> GraphEdaResult<()> {
        self.catalog.get(name)?;
        self.cache.invalidate_analysis(name).await;
        Ok(())
    }

    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    /// Headline counts, each served through the cache.
    pub async fn summary(&self) -> GraphEdaResult<GraphSummary> {
        let options = RunOptions::new();
        let (nodes, relationships, disconnected, unlabeled) = futures::try_join!(
            self.run(NODE_COUNT, &options),
            self.run(RELATIONSHIP_COUNT, &options),
            self.run(DISCONNECTED_NODE_COUNT, &options),
            self.run(UNLABELED_NODE_COUNT, &options),
        )?;

        Ok(GraphSummary {
            nodes: nodes.result.scalar_count("count"),
            relationships: relationships.result.scalar_count("count"),
            disconnected_nodes: disconnected.result.scalar_count("count"),
            unlabeled_nodes: unlabeled.result.scalar_count("count"),
        })
    }
}
