//! In-memory stand-in for Neo4j used by the unit tests.
//!
//! `StubGraph` evaluates the built-in analyses natively over a small node
//! and relationship list, mirroring what their Cypher does. `StubConnector`
//! counts opens, runs and in-flight sessions and can inject refusals,
//! failures and latency.

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use grapheda_core::catalog::{
    DISCONNECTED_NODES, DISCONNECTED_NODES_BY_LABEL, DISCONNECTED_NODE_COUNT, MULTI_LABEL_NODES,
    NODE_COUNT, NODE_LABEL_COUNTS, NODE_PROPERTY_COUNTS, RELATIONSHIP_COUNT,
    RELATIONSHIP_PROPERTY_COUNTS, RELATIONSHIP_TYPE_COUNTS, UNLABELED_NODE_COUNT,
};
use grapheda_core::{ConnectionConfig, GraphEdaError, GraphEdaResult, Params, ResultRecord, Value};

use crate::transport::{GraphConnector, GraphTransport, Statement};

#[derive(Debug, Clone, Default)]
pub struct StubGraph {
    nodes: Vec<StubNode>,
    relationships: Vec<StubRelationship>,
}

#[derive(Debug, Clone)]
struct StubNode {
    id: String,
    labels: Vec<String>,
    properties: Vec<String>,
}

#[derive(Debug, Clone)]
struct StubRelationship {
    from: usize,
    to: usize,
    rel_type: String,
    properties: Vec<String>,
}

impl StubGraph {
    pub fn node(self, labels: &[&str]) -> Self {
        self.node_with_properties(labels, &[])
    }

    pub fn node_with_properties(mut self, labels: &[&str], properties: &[&str]) -> Self {
        let id = format!("4:stub:{}", self.nodes.len());
        self.nodes.push(StubNode {
            id,
            labels: labels.iter().map(|l| l.to_string()).collect(),
            properties: properties.iter().map(|p| p.to_string()).collect(),
        });
        self
    }

    /// Relationship between nodes by insertion index.
    pub fn relationship(self, from: usize, to: usize, rel_type: &str) -> Self {
        self.relationship_with_properties(from, to, rel_type, &[])
    }

    pub fn relationship_with_properties(
        mut self,
        from: usize,
        to: usize,
        rel_type: &str,
        properties: &[&str],
    ) -> Self {
        self.relationships.push(StubRelationship {
            from,
            to,
            rel_type: rel_type.to_string(),
            properties: properties.iter().map(|p| p.to_string()).collect(),
        });
        self
    }

    fn is_disconnected(&self, index: usize) -> bool {
        !self
            .relationships
            .iter()
            .any(|r| r.from == index || r.to == index)
    }

    fn disconnected(&self) -> impl Iterator<Item = &StubNode> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(i, _)| self.is_disconnected(*i))
            .map(|(_, n)| n)
    }

    fn evaluate(&self, statement: &Statement<'_>) -> GraphEdaResult<Vec<ResultRecord>> {
        let rows = match statement.analysis {
            NODE_LABEL_COUNTS => {
                label_counts("label", self.nodes.iter().map(|n| n.labels.first().cloned()))
            }
            MULTI_LABEL_NODES => {
                let mut groups: BTreeMap<Vec<String>, i64> = BTreeMap::new();
                for node in self.nodes.iter().filter(|n| n.labels.len() > 1) {
                    let mut labels = node.labels.clone();
                    labels.sort();
                    *groups.entry(labels).or_default() += 1;
                }
                let mut groups: Vec<_> = groups.into_iter().collect();
                groups.sort_by_key(|(labels, count)| (Reverse(*count), labels.clone()));
                groups
                    .into_iter()
                    .map(|(labels, count)| ResultRecord::new().with("labels", labels).with("count", count))
                    .collect()
            }
            RELATIONSHIP_TYPE_COUNTS => label_counts(
                "type",
                self.relationships.iter().map(|r| Some(r.rel_type.clone())),
            ),
            DISCONNECTED_NODE_COUNT => count_row(self.disconnected().count()),
            DISCONNECTED_NODES_BY_LABEL => {
                label_counts("label", self.disconnected().map(|n| n.labels.first().cloned()))
            }
            UNLABELED_NODE_COUNT => count_row(self.nodes.iter().filter(|n| n.labels.is_empty()).count()),
            DISCONNECTED_NODES => {
                let limit = statement
                    .params
                    .get("limit")
                    .and_then(|v| v.as_integer())
                    .unwrap_or(i64::MAX);
                let mut nodes: Vec<&StubNode> = self.disconnected().collect();
                nodes.sort_by(|a, b| a.id.cmp(&b.id));
                nodes
                    .into_iter()
                    .take(limit as usize)
                    .map(|n| {
                        ResultRecord::new()
                            .with("node_id", n.id.clone())
                            .with("labels", n.labels.clone())
                    })
                    .collect()
            }
            NODE_COUNT => count_row(self.nodes.len()),
            RELATIONSHIP_COUNT => count_row(self.relationships.len()),
            NODE_PROPERTY_COUNTS => label_counts(
                "property",
                self.nodes.iter().flat_map(|n| n.properties.iter().cloned().map(Some)),
            ),
            RELATIONSHIP_PROPERTY_COUNTS => label_counts(
                "property",
                self.relationships
                    .iter()
                    .flat_map(|r| r.properties.iter().cloned().map(Some)),
            ),
            "ping" => vec![ResultRecord::new().with("ok", 1)],
            other => {
                return Err(GraphEdaError::query(other, "stub cannot evaluate this statement"));
            }
        };
        Ok(rows)
    }
}

/// Group, count, order by count descending then key ascending (nulls last).
fn label_counts(column: &str, keys: impl Iterator<Item = Option<String>>) -> Vec<ResultRecord> {
    let mut groups: HashMap<Option<String>, i64> = HashMap::new();
    for key in keys {
        *groups.entry(key).or_default() += 1;
    }
    let mut groups: Vec<_> = groups.into_iter().collect();
    groups.sort_by_key(|(key, count)| (Reverse(*count), key.is_none(), key.clone()));
    groups
        .into_iter()
        .map(|(key, count)| ResultRecord::new().with(column, Value::from(key)).with("count", count))
        .collect()
}

fn count_row(count: usize) -> Vec<ResultRecord> {
    vec![ResultRecord::new().with("count", count as i64)]
}

#[derive(Default)]
struct StubState {
    graph: StubGraph,
    opens: AtomicUsize,
    closes: AtomicUsize,
    refuse: AtomicBool,
    in_flight: AtomicUsize,
    runs: Mutex<Vec<String>>,
    last_params: Mutex<Option<Params>>,
    failing: Mutex<HashSet<String>>,
    canned: Mutex<HashMap<String, Vec<ResultRecord>>>,
    delay: Mutex<Option<Duration>>,
    open_delay: Mutex<Option<Duration>>,
}

pub struct StubConnector {
    state: Arc<StubState>,
}

impl StubConnector {
    pub fn new(graph: StubGraph) -> Self {
        Self {
            state: Arc::new(StubState {
                graph,
                ..Default::default()
            }),
        }
    }

    pub fn opens(&self) -> usize {
        self.state.opens.load(Ordering::SeqCst)
    }

    pub fn transport_closes(&self) -> usize {
        self.state.closes.load(Ordering::SeqCst)
    }

    pub fn refuse_connections(&self, refuse: bool) {
        self.state.refuse.store(refuse, Ordering::SeqCst);
    }

    /// Total statements run.
    pub fn runs(&self) -> usize {
        self.state.runs.lock().unwrap().len()
    }

    pub fn runs_for(&self, analysis: &str) -> usize {
        self.state.runs.lock().unwrap().iter().filter(|a| *a == analysis).count()
    }

    pub fn in_flight(&self) -> usize {
        self.state.in_flight.load(Ordering::SeqCst)
    }

    pub fn last_params(&self) -> Option<Params> {
        self.state.last_params.lock().unwrap().clone()
    }

    /// Make every run of `analysis` fail with a transport error.
    pub fn fail_analysis(&self, analysis: &str) {
        self.state.failing.lock().unwrap().insert(analysis.to_string());
    }

    pub fn recover_analysis(&self, analysis: &str) {
        self.state.failing.lock().unwrap().remove(analysis);
    }

    /// Answer `analysis` with fixed rows instead of evaluating the graph.
    pub fn canned(&self, analysis: &str, rows: Vec<ResultRecord>) {
        self.state.canned.lock().unwrap().insert(analysis.to_string(), rows);
    }

    pub fn set_delay(&self, delay: Option<Duration>) {
        *self.state.delay.lock().unwrap() = delay;
    }

    /// Latency of the connection handshake.
    pub fn set_open_delay(&self, delay: Option<Duration>) {
        *self.state.open_delay.lock().unwrap() = delay;
    }
}

#[async_trait]
impl GraphConnector for StubConnector {
    async fn open(&self, config: &ConnectionConfig) -> GraphEdaResult<Arc<dyn GraphTransport>> {
        let delay = *self.state.open_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.state.refuse.load(Ordering::SeqCst) {
            return Err(GraphEdaError::ConnectionRefused {
                uri: config.uri.clone(),
                message: "stub refused".to_string(),
            });
        }
        self.state.opens.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(StubTransport {
            state: Arc::clone(&self.state),
        }))
    }
}

struct StubTransport {
    state: Arc<StubState>,
}

/// Counts a session as in flight until dropped, cancellation included.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl GraphTransport for StubTransport {
    async fn run(&self, statement: &Statement<'_>) -> GraphEdaResult<Vec<ResultRecord>> {
        let _guard = InFlight::enter(&self.state.in_flight);
        self.state.runs.lock().unwrap().push(statement.analysis.to_string());
        *self.state.last_params.lock().unwrap() = Some(statement.params.clone());

        let delay = *self.state.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.state.failing.lock().unwrap().contains(statement.analysis) {
            return Err(GraphEdaError::Connection("simulated transport error".to_string()));
        }
        let canned = self.state.canned.lock().unwrap().get(statement.analysis).cloned();
        if let Some(rows) = canned {
            return Ok(rows);
        }
        self.state.graph.evaluate(statement)
    }

    async fn close(&self) {
        self.state.closes.fetch_add(1, Ordering::SeqCst);
    }
}
