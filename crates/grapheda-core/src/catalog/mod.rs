//! The catalog of named analyses.
//!
//! Built once at startup and shared read-only. Adding an analysis means
//! adding an entry here, not a new method on the engine.

pub mod model;

use serde::Serialize;

use crate::error::{GraphEdaError, GraphEdaResult};
pub use model::{AnalysisDefinition, Column, ColumnKind, OrderPolicy};

pub const NODE_LABEL_COUNTS: &str = "node_label_counts";
pub const MULTI_LABEL_NODES: &str = "multi_label_nodes";
pub const RELATIONSHIP_TYPE_COUNTS: &str = "relationship_type_counts";
pub const DISCONNECTED_NODE_COUNT: &str = "disconnected_node_count";
pub const DISCONNECTED_NODES_BY_LABEL: &str = "disconnected_nodes_by_label";
pub const UNLABELED_NODE_COUNT: &str = "unlabeled_node_count";
pub const DISCONNECTED_NODES: &str = "disconnected_nodes";
pub const NODE_COUNT: &str = "node_count";
pub const RELATIONSHIP_COUNT: &str = "relationship_count";
pub const NODE_PROPERTY_COUNTS: &str = "node_property_counts";
pub const RELATIONSHIP_PROPERTY_COUNTS: &str = "relationship_property_counts";

/// Name and description of one analysis, for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub name: String,
    pub description: String,
}

/// An immutable registry of analyses, keyed by unique name.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    definitions: Vec<AnalysisDefinition>,
}

impl Catalog {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Register a definition. Names must be unique.
    pub fn with(mut self, definition: AnalysisDefinition) -> GraphEdaResult<Self> {
        if self.contains(&definition.name) {
            return Err(GraphEdaError::Config(format!(
                "analysis '{}' registered twice",
                definition.name
            )));
        }
        self.definitions.push(definition);
        Ok(self)
    }

    pub fn get(&self, name: &str) -> GraphEdaResult<&AnalysisDefinition> {
        self.definitions
            .iter()
            .find(|def| def.name == name)
            .ok_or_else(|| GraphEdaError::UnknownAnalysis(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.definitions.iter().any(|def| def.name == name)
    }

    /// Names and descriptions in registration order.
    pub fn entries(&self) -> Vec<CatalogEntry> {
        self.definitions
            .iter()
            .map(|def| CatalogEntry {
                name: def.name.clone(),
                description: def.description.clone(),
            })
            .collect()
    }

    pub fn definitions(&self) -> &[AnalysisDefinition] {
        &self.definitions
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// The built-in analyses.
    pub fn builtin() -> Self {
        Self {
            definitions: builtin_definitions(),
        }
    }
}

fn builtin_definitions() -> Vec<AnalysisDefinition> {
    vec![
        // Each node counts once, under its first label, so the counts sum to
        // the total node count. Unlabeled nodes appear under a null label.
        // Nodes with several labels show up in multi_label_nodes.
        AnalysisDefinition::new(
            NODE_LABEL_COUNTS,
            "Number of nodes per label (each node attributed to its first label only)",
            "MATCH (n)
             WITH labels(n)[0] AS label, count(*) AS count
             RETURN label, count
             ORDER BY count DESC, label ASC",
        )
        .column("label", ColumnKind::Text)
        .column("count", ColumnKind::Integer)
        .count_descending("count"),
        AnalysisDefinition::new(
            MULTI_LABEL_NODES,
            "Label combinations that co-occur on a single node, and how often",
            "MATCH (n)
             WHERE size(labels(n)) > 1
             UNWIND labels(n) AS label
             WITH n, label
             ORDER BY label
             WITH n, collect(label) AS labels
             RETURN labels, count(n) AS count
             ORDER BY count DESC, labels ASC",
        )
        .column("labels", ColumnKind::TextList)
        .column("count", ColumnKind::Integer)
        .count_descending("count"),
        AnalysisDefinition::new(
            RELATIONSHIP_TYPE_COUNTS,
            "Number of relationships per type",
            "MATCH ()-[r]->()
             RETURN type(r) AS type, count(r) AS count
             ORDER BY count DESC, type ASC",
        )
        .column("type", ColumnKind::Text)
        .column("count", ColumnKind::Integer)
        .count_descending("count"),
        AnalysisDefinition::new(
            DISCONNECTED_NODE_COUNT,
            "Number of nodes with no relationships in either direction",
            "MATCH (n)
             WHERE NOT (n)--()
             RETURN count(n) AS count",
        )
        .column("count", ColumnKind::Integer),
        AnalysisDefinition::new(
            DISCONNECTED_NODES_BY_LABEL,
            "Disconnected nodes per label (first label only)",
            "MATCH (n)
             WHERE NOT (n)--()
             WITH labels(n)[0] AS label, count(n) AS count
             RETURN label, count
             ORDER BY count DESC, label ASC",
        )
        .column("label", ColumnKind::Text)
        .column("count", ColumnKind::Integer)
        .count_descending("count"),
        AnalysisDefinition::new(
            UNLABELED_NODE_COUNT,
            "Number of nodes carrying no label at all",
            "MATCH (n)
             WHERE size(labels(n)) = 0
             RETURN count(n) AS count",
        )
        .column("count", ColumnKind::Integer),
        AnalysisDefinition::new(
            DISCONNECTED_NODES,
            "Identity and labels of disconnected nodes",
            "MATCH (n)
             WHERE NOT (n)--()
             RETURN elementId(n) AS node_id, labels(n) AS labels
             ORDER BY node_id
             LIMIT $limit",
        )
        .column("node_id", ColumnKind::Text)
        .column("labels", ColumnKind::TextList)
        .default_param("limit", 100),
        AnalysisDefinition::new(
            NODE_COUNT,
            "Total number of nodes",
            "MATCH (n) RETURN count(n) AS count",
        )
        .column("count", ColumnKind::Integer),
        AnalysisDefinition::new(
            RELATIONSHIP_COUNT,
            "Total number of relationships",
            "MATCH ()-[r]->() RETURN count(r) AS count",
        )
        .column("count", ColumnKind::Integer),
        AnalysisDefinition::new(
            NODE_PROPERTY_COUNTS,
            "Number of nodes carrying each property key",
            "MATCH (n)
             UNWIND keys(n) AS property
             RETURN property, count(*) AS count
             ORDER BY count DESC, property ASC",
        )
        .column("property", ColumnKind::Text)
        .column("count", ColumnKind::Integer)
        .count_descending("count"),
        AnalysisDefinition::new(
            RELATIONSHIP_PROPERTY_COUNTS,
            "Number of relationships carrying each property key",
            "MATCH ()-[r]->()
             UNWIND keys(r) AS property
             RETURN property, count(*) AS count
             ORDER BY count DESC, property ASC",
        )
        .column("property", ColumnKind::Text)
        .column("count", ColumnKind::Integer)
        .count_descending("count"),
    ]
}
