//! Node/link graph model handed to the visualization layer
//!
//! Nodes and links carry a fixed envelope of required fields plus an open
//! attribute map holding whatever the graph database returned for the record.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Arbitrary server-supplied attributes of a vertex or edge
pub type Attributes = serde_json::Map<String, Value>;

/// Ordered parameters for an installed query
pub type QueryParams = Vec<(String, String)>;

/// Type and raw identifier of a vertex
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VertexRef {
    /// Vertex type name
    pub v_type: String,
    /// Identifier, unique only within its type
    pub v_id: String,
}

impl VertexRef {
    /// Creates a reference from a type name and raw identifier
    pub fn new(v_type: impl Into<String>, v_id: impl Into<String>) -> Self {
        Self {
            v_type: v_type.into(),
            v_id: v_id.into(),
        }
    }

    /// Graph-wide identifier `"{v_type}_{v_id}"`
    ///
    /// Raw ids may repeat across vertex types, the type prefix keeps them apart.
    pub fn node_id(&self) -> String {
        format!("{}_{}", self.v_type, self.v_id)
    }
}

/// A vertex ready for rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Synthesized identifier, see [`VertexRef::node_id`]
    pub id: String,
    /// Raw vertex identifier
    pub v_id: String,
    /// Vertex type name
    pub v_type: String,
    /// Remaining attributes of the vertex
    #[serde(flatten)]
    pub attributes: Attributes,
}

impl Node {
    /// Builds a node for `vertex`. Envelope fields take precedence over
    /// attributes of the same name.
    pub fn new(vertex: &VertexRef, mut attributes: Attributes) -> Self {
        for reserved in ["id", "v_id", "v_type"] {
            attributes.shift_remove(reserved);
        }
        Self {
            id: vertex.node_id(),
            v_id: vertex.v_id.clone(),
            v_type: vertex.v_type.clone(),
            attributes,
        }
    }

    /// Builds an attribute-less node standing in for a link endpoint
    pub fn endpoint(vertex: &VertexRef) -> Self {
        Self::new(vertex, Attributes::new())
    }

    /// Type and raw id of this node
    pub fn vertex_ref(&self) -> VertexRef {
        VertexRef::new(self.v_type.clone(), self.v_id.clone())
    }
}

/// A directed edge ready for rendering
///
/// `source` and `target` use the same format as [`Node::id`], so links join
/// against the node list without a lookup table. Links are output only: they
/// serialize but do not deserialize, since the endpoint vertices are not part
/// of the wire form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Link {
    /// Node id of the edge's origin
    pub source: String,
    /// Node id of the edge's destination
    pub target: String,
    /// Origin vertex, kept for endpoint synthesis
    #[serde(skip)]
    pub from: VertexRef,
    /// Destination vertex, kept for endpoint synthesis
    #[serde(skip)]
    pub to: VertexRef,
    /// Remaining attributes of the edge
    #[serde(flatten)]
    pub attributes: Attributes,
}

impl Link {
    /// Builds a link between two vertices
    pub fn new(from: VertexRef, to: VertexRef, mut attributes: Attributes) -> Self {
        attributes.shift_remove("source");
        attributes.shift_remove("target");
        Self {
            source: from.node_id(),
            target: to.node_id(),
            from,
            to,
            attributes,
        }
    }

    /// Nodes for both endpoints, origin first
    pub fn endpoint_nodes(&self) -> [Node; 2] {
        [Node::endpoint(&self.from), Node::endpoint(&self.to)]
    }
}

/// Normalized `{nodes, links}` graph
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GraphData {
    /// Vertices; duplicate ids are possible when a vertex occurs in several result groups
    pub nodes: Vec<Node>,
    /// Edges
    pub links: Vec<Link>,
}

impl GraphData {
    /// Whether the graph holds neither nodes nor links
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.links.is_empty()
    }
}

/// Result of an installed query: a graph, or the raw payload when the
/// response did not describe one
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QueryOutput {
    /// Graph-shaped result
    Graph(GraphData),
    /// Non-graph (scalar/table) result, passed through unchanged
    Data {
        /// The raw decoded response
        data: Value,
    },
}

impl QueryOutput {
    /// The graph, if the output is graph-shaped
    pub fn into_graph(self) -> Option<GraphData> {
        match self {
            QueryOutput::Graph(graph) => Some(graph),
            QueryOutput::Data { .. } => None,
        }
    }

    /// Whether the output is graph-shaped
    pub fn is_graph(&self) -> bool {
        matches!(self, QueryOutput::Graph(_))
    }
}

/// Vertex and edge type catalog of the connected graph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VertexEdgeTypes {
    /// Vertex type names
    #[serde(default)]
    pub vertices: Vec<String>,
    /// Edge type information exactly as the proxy reported it
    #[serde(default)]
    pub edges: Value,
}

impl VertexEdgeTypes {
    /// Edge type names found in [`VertexEdgeTypes::edges`]
    ///
    /// Understands a list of names, a list of objects with a `name` member
    /// and an object keyed by type name.
    pub fn edge_type_names(&self) -> Vec<String> {
        match &self.edges {
            Value::Array(items) => items
                .iter()
                .filter_map(|item| match item {
                    Value::String(name) => Some(name.clone()),
                    Value::Object(obj) => obj.get("name").and_then(Value::as_str).map(str::to_string),
                    _ => None,
                })
                .collect(),
            Value::Object(obj) => obj.keys().cloned().collect(),
            _ => Vec::new(),
        }
    }
}

/// Which external graph database the proxy should talk to
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphConnection {
    /// Graph database host
    pub host: String,
    /// Graph name
    pub graphname: String,
    /// Secret used by the proxy to authenticate
    #[serde(default)]
    pub secret: String,
    /// Access token; carried but never transmitted
    #[serde(default)]
    pub token: String,
}

impl GraphConnection {
    /// Creates a descriptor with an empty token
    pub fn new(host: impl Into<String>, graphname: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            graphname: graphname.into(),
            secret: secret.into(),
            token: String::new(),
        }
    }

    /// Sets the access token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = token.into();
        self
    }
}

impl fmt::Debug for GraphConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphConnection")
            .field("host", &self.host)
            .field("graphname", &self.graphname)
            .field("secret", &"<redacted>")
            .field("token", &if self.token.is_empty() { "" } else { "<redacted>" })
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn attrs(value: Value) -> Attributes {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn test_node_id_is_type_prefixed() {
        let person = VertexRef::new("Person", "1");
        let company = VertexRef::new("Company", "1");
        assert_eq!(person.node_id(), "Person_1");
        assert_ne!(person.node_id(), company.node_id());
    }

    #[test]
    fn test_node_serializes_attributes_flat() {
        let node = Node::new(&VertexRef::new("Person", "1"), attrs(json!({"name": "Alice"})));
        assert_eq!(
            serde_json::to_value(&node).unwrap(),
            json!({"name": "Alice", "id": "Person_1", "v_id": "1", "v_type": "Person"})
        );
    }

    #[test]
    fn test_envelope_wins_over_attributes() {
        let node = Node::new(
            &VertexRef::new("Person", "1"),
            attrs(json!({"id": "bogus", "v_type": "Other", "age": 3})),
        );
        assert_eq!(node.id, "Person_1");
        assert_eq!(node.v_type, "Person");
        assert_eq!(node.attributes.len(), 1);

        let link = Link::new(
            VertexRef::new("Person", "1"),
            VertexRef::new("Person", "2"),
            attrs(json!({"source": "x", "since": 2020})),
        );
        assert_eq!(
            serde_json::to_value(&link).unwrap(),
            json!({"source": "Person_1", "target": "Person_2", "since": 2020})
        );
    }

    #[test]
    fn test_endpoint_nodes_match_link_ids() {
        let link = Link::new(VertexRef::new("Person", "1"), VertexRef::new("Company", "9"), Attributes::new());
        let [origin, destination] = link.endpoint_nodes();
        assert_eq!(origin.id, link.source);
        assert_eq!(destination.id, link.target);
        assert_eq!(destination.v_type, "Company");
        assert_eq!(destination.v_id, "9");
    }

    #[test]
    fn test_query_output_shapes() {
        let graph = QueryOutput::Graph(GraphData::default());
        assert_eq!(serde_json::to_value(&graph).unwrap(), json!({"nodes": [], "links": []}));
        assert!(graph.is_graph());

        let data = QueryOutput::Data { data: json!([{"count": 4}]) };
        assert_eq!(serde_json::to_value(&data).unwrap(), json!({"data": [{"count": 4}]}));
        assert!(data.into_graph().is_none());
    }

    #[test]
    fn test_edge_type_names() {
        let listed = VertexEdgeTypes { vertices: vec![], edges: json!(["Knows", {"name": "Owns"}, 7]) };
        assert_eq!(listed.edge_type_names(), vec!["Knows", "Owns"]);

        let keyed = VertexEdgeTypes { vertices: vec![], edges: json!({"Knows": {}, "Owns": {}}) };
        let mut names = keyed.edge_type_names();
        names.sort();
        assert_eq!(names, vec!["Knows", "Owns"]);
    }

    #[test]
    fn test_connection_debug_hides_secret() {
        let conn = GraphConnection::new("db.local", "social", "s3cr3t").with_token("tok");
        let printed = format!("{:?}", conn);
        assert!(printed.contains("social"));
        assert!(!printed.contains("s3cr3t"));
        assert!(!printed.contains("\"tok\""));
    }
}
