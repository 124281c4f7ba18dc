//! Operations a graph source offers to the visualization layer

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::{GraphError, GraphResult};
use crate::graph::{GraphConnection, GraphData, QueryOutput, QueryParams, VertexEdgeTypes};

/// A graph database reachable through the local proxy
///
/// Every call is independent; implementations hold no state besides the
/// connection descriptor.
#[async_trait]
pub trait GraphSource: Send + Sync {
    /// The descriptor this source was created with
    fn connection(&self) -> &GraphConnection;

    /// Tells the proxy which graph database and credentials to use
    async fn create_connection(&self) -> GraphResult<Value>;

    /// Vertex and edge type catalog
    async fn vertex_edge_types(&self) -> GraphResult<VertexEdgeTypes>;

    /// Vertex count payload for `filter`
    async fn vertex_count(&self, filter: &Value) -> GraphResult<Value>;

    /// Edge count for `filter`, e.g. `{"EdgeType": "Knows"}`
    async fn edge_count(&self, filter: &Value) -> GraphResult<u64>;

    /// Sum of the edge counts of every type in `edge_types`
    ///
    /// Types are counted one after another; the first failure aborts the
    /// remaining requests and no partial sum is returned.
    async fn all_edge_count(&self, edge_types: &[String]) -> GraphResult<u64> {
        let mut total: u64 = 0;
        for edge_type in edge_types {
            let count = self.edge_count(&json!({ "EdgeType": edge_type })).await?;
            total = add_edge_count(total, count)?;
        }
        Ok(total)
    }

    /// Seeded vertices and edges of the given types
    async fn graph_data(&self, vertex_types: &[String], edge_types: &[String]) -> GraphResult<GraphData>;

    /// Runs an ad-hoc query body; both vertices and edges are required
    async fn run_interpreted_query(&self, query_body: &str) -> GraphResult<GraphData>;

    /// Runs an installed query by name
    async fn run_query(&self, name: &str, params: Option<&QueryParams>) -> GraphResult<QueryOutput>;

    /// Catalog of installed queries
    async fn queries(&self) -> GraphResult<Value>;
}

/// Adds one per-type edge count to a running total
pub fn add_edge_count(total: u64, count: u64) -> GraphResult<u64> {
    total
        .checked_add(count)
        .ok_or_else(|| GraphError::UnexpectedResponse("Edge count total overflows u64".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_edge_count_rejects_overflow() {
        assert_eq!(add_edge_count(3, 4).unwrap(), 7);
        assert!(matches!(
            add_edge_count(u64::MAX, 1),
            Err(GraphError::UnexpectedResponse(_))
        ));
    }
}
