//! Graphlink Interfaces
//!
//! This crate provides the types shared between the graph proxy client and
//! the visualization layer that consumes its `{nodes, links}` output.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Error types
pub mod error;

/// Node/link graph model
pub mod graph;

/// The graph source trait
pub mod source;

/// Re-export key types for convenient usage
pub use error::{EmptyResultKind, GraphError, GraphResult};
pub use graph::{
    Attributes, GraphConnection, GraphData, Link, Node, QueryOutput, QueryParams, VertexEdgeTypes,
    VertexRef,
};
pub use source::{add_edge_count, GraphSource};
