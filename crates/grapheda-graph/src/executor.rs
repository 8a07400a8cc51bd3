//! Runs one analysis against the live connection.

use std::sync::Arc;
use std::time::{Duration, Instant};

use grapheda_core::{
    AnalysisDefinition, AnalysisResult, Column, ColumnKind, GraphEdaError, GraphEdaResult, Params,
    ResultRecord,
};
use tracing::{debug, warn};

use crate::handle::ConnectionHandle;
use crate::transport::Statement;

/// Turns an [`AnalysisDefinition`] plus resolved params into an
/// [`AnalysisResult`].
///
/// Each call takes its own session and gives it back on every exit path.
/// Failures are reported to the caller and never touch the connection.
pub struct Executor {
    handle: Arc<ConnectionHandle>,
    default_timeout: Duration,
}

impl Executor {
    pub fn new(handle: Arc<ConnectionHandle>, default_timeout: Duration) -> Self {
        Self {
            handle,
            default_timeout,
        }
    }

    /// Execute `definition` with already-resolved `params`.
    pub async fn execute(
        &self,
        definition: &AnalysisDefinition,
        params: Params,
        timeout: Option<Duration>,
    ) -> GraphEdaResult<AnalysisResult> {
        let statement = Statement {
            analysis: &definition.name,
            cypher: &definition.query,
            params: &params,
            columns: &definition.columns,
        };

        let started = Instant::now();
        let rows = self.run_statement(&statement, timeout).await?;

        if !definition.order.holds_for(&rows) {
            warn!(analysis = %definition.name, "Rows do not follow the declared order");
        }
        debug!(
            analysis = %definition.name,
            rows = rows.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Analysis executed"
        );

        Ok(AnalysisResult::new(definition.name.clone(), params, rows))
    }

    /// Run a trivial statement to confirm the connection answers queries.
    pub async fn ping(&self, timeout: Option<Duration>) -> GraphEdaResult<()> {
        let params = Params::new();
        let columns = [Column {
            name: "ok".to_string(),
            kind: ColumnKind::Integer,
        }];
        let statement = Statement {
            analysis: "ping",
            cypher: "RETURN 1 AS ok",
            params: &params,
            columns: &columns,
        };
        self.run_statement(&statement, timeout).await.map(|_| ())
    }

    async fn run_statement(
        &self,
        statement: &Statement<'_>,
        timeout: Option<Duration>,
    ) -> GraphEdaResult<Vec<ResultRecord>> {
        let budget = timeout.unwrap_or(self.default_timeout);
        let session = self.handle.session().await?;

        // Timing out drops the run future, and the session with it.
        match tokio::time::timeout(budget, session.run(statement)).await {
            Ok(Ok(rows)) => Ok(rows),
            Ok(Err(err)) => {
                warn!(analysis = %statement.analysis, error = %err, "Query failed");
                Err(err)
            }
            Err(_) => {
                warn!(analysis = %statement.analysis, timeout = ?budget, "Query timed out");
                Err(GraphEdaError::QueryTimeout {
                    analysis: statement.analysis.to_string(),
                    timeout: budget,
                })
            }
        }
    }
}
