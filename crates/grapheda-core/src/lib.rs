//! GraphEDA Core Library
//!
//! Pure data for exploratory analysis of a property graph: the catalog of
//! named analyses, parameters and their canonical form, result records,
//! tabular rendering, configuration and the error taxonomy.

pub mod catalog;
pub mod config;
pub mod error;
pub mod params;
pub mod result;
pub mod table;

pub use catalog::{AnalysisDefinition, Catalog, CatalogEntry, Column, ColumnKind, OrderPolicy};
pub use config::{ConnectionConfig, EngineConfig};
pub use error::{GraphEdaError, GraphEdaResult};
pub use params::{ParamValue, Params};
pub use result::{AnalysisResult, ResultRecord, Value};
pub use table::Table;
