//! Process-local memo of the latest result per analysis and parameter set.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use grapheda_core::params::canonicalize;
use grapheda_core::{AnalysisResult, EngineConfig, GraphEdaError, GraphEdaResult, Params};
use moka::future::Cache;
use moka::ops::compute::{CompResult, Op};
use tracing::debug;

/// `(analysis name, canonical params)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub analysis: String,
    pub params: String,
}

impl CacheKey {
    pub fn new(analysis: &str, params: &Params) -> Self {
        Self {
            analysis: analysis.to_string(),
            params: canonicalize(params),
        }
    }
}

/// At most one result per key.
///
/// Computations for one key run one at a time, in call order: concurrent
/// misses wait for the first to finish and then share its result, and a
/// refresh issued while a miss is in flight lands after it, so the newest
/// snapshot is the one kept. A failed computation leaves the entry alone.
#[derive(Clone)]
pub struct ResultCache {
    inner: Cache<CacheKey, Arc<AnalysisResult>>,
}

impl ResultCache {
    /// `max_entries` below 1 is raised to 1.
    pub fn new(max_entries: u64, ttl: Option<Duration>) -> Self {
        let mut builder = Cache::builder().max_capacity(max_entries.max(1));
        if let Some(ttl) = ttl {
            builder = builder.time_to_live(ttl);
        }
        Self {
            inner: builder.build(),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.cache_max_entries, config.cache_ttl())
    }

    pub async fn get(&self, key: &CacheKey) -> Option<Arc<AnalysisResult>> {
        self.inner.get(key).await
    }

    /// Return the cached result for `key`, or run `compute` and store it.
    ///
    /// With `force_refresh` the computation always runs and only a success
    /// replaces what is cached.
    pub async fn get_or_compute<F, Fut>(
        &self,
        key: CacheKey,
        force_refresh: bool,
        compute: F,
    ) -> GraphEdaResult<Arc<AnalysisResult>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = GraphEdaResult<AnalysisResult>>,
    {
        if !force_refresh {
            if let Some(hit) = self.inner.get(&key).await {
                debug!(analysis = %key.analysis, params = %key.params, "Cache hit");
                return Ok(hit);
            }
        }

        let analysis = key.analysis.clone();
        let outcome = self
            .inner
            .entry(key)
            .and_try_compute_with(|existing| async move {
                match existing {
                    Some(entry) if !force_refresh => {
                        debug!(analysis = %entry.key().analysis, "Cache filled while waiting");
                        Ok(Op::Nop)
                    }
                    _ => {
                        debug!(analysis = %analysis, force_refresh, "Computing");
                        compute().await.map(|fresh| Op::Put(Arc::new(fresh)))
                    }
                }
            })
            .await?;

        match outcome {
            CompResult::Inserted(entry)
            | CompResult::ReplacedWith(entry)
            | CompResult::Unchanged(entry) => Ok(entry.into_value()),
            CompResult::Removed(entry) => Err(GraphEdaError::query(
                entry.key().analysis.clone(),
                "cached result removed during computation",
            )),
            CompResult::StillNone(key) => Err(GraphEdaError::query(
                key.analysis.clone(),
                "no result was computed",
            )),
        }
    }

    /// Drop every entry of one analysis, whatever its params.
    pub async fn invalidate_analysis(&self, analysis: &str) {
        let keys: Vec<Arc<CacheKey>> = self
            .inner
            .iter()
            .filter(|(key, _)| key.analysis == analysis)
            .map(|(key, _)| key)
            .collect();
        for key in keys {
            self.inner.invalidate(key.as_ref()).await;
        }
    }

    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }

    /// Number of live entries, after pending maintenance has run.
    pub async fn len(&self) -> u64 {
        self.inner.run_pending_tasks().await;
        self.inner.entry_count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
