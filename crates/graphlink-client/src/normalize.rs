//! Reshaping of proxy query results into `{nodes, links}` graphs
//!
//! Query results arrive as nested groups of collections whose shape is not
//! known in advance. A record is a vertex when it carries both `v_type` and
//! `v_id`, and an edge when it carries both `from_type` and `to_type`. Every
//! collection is scanned twice, once for each kind.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{trace, warn};

use graphlink_interfaces::{
    Attributes, EmptyResultKind, GraphData, GraphError, GraphResult, Link, Node, QueryOutput,
    VertexRef,
};

/// What a scan does when it meets a record of the wrong shape
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanMode {
    /// Skip the record and keep scanning the collection
    #[default]
    SkipMalformed,
    /// Stop scanning the collection at the first such record
    StopAtFirstMalformed,
}

/// When a normalized result counts as a success
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuccessPolicy {
    /// Both vertices and edges must be present
    RequireBoth,
    /// Any result succeeds; non-graph results are passed through raw
    Lenient,
}

impl SuccessPolicy {
    /// Turns a normalized graph into the caller-facing output
    ///
    /// `raw` is the decoded response the graph was extracted from, returned
    /// as `{data}` when the lenient policy decides the result is not a graph.
    pub fn resolve(self, mut graph: GraphData, raw: Value) -> GraphResult<QueryOutput> {
        match self {
            SuccessPolicy::RequireBoth => {
                if graph.nodes.is_empty() {
                    return Err(GraphError::EmptyResult(EmptyResultKind::Vertices));
                }
                if graph.links.is_empty() {
                    return Err(GraphError::EmptyResult(EmptyResultKind::Edges));
                }
                Ok(QueryOutput::Graph(graph))
            }
            SuccessPolicy::Lenient => match (graph.nodes.is_empty(), graph.links.is_empty()) {
                (false, true) => Ok(QueryOutput::Data { data: raw }),
                (true, false) => {
                    // Endpoints are pushed per link, repeated vertices stay repeated.
                    let endpoints: Vec<Node> = graph
                        .links
                        .iter()
                        .flat_map(|link| link.endpoint_nodes())
                        .collect();
                    graph.nodes = endpoints;
                    Ok(QueryOutput::Graph(graph))
                }
                (true, true) => {
                    let data = if raw.is_null() { Value::String(String::new()) } else { raw };
                    Ok(QueryOutput::Data { data })
                }
                (false, false) => Ok(QueryOutput::Graph(graph)),
            },
        }
    }
}

/// Renders a type or id field the way string interpolation would
///
/// Whole-number floats render without a fractional part, so `1.0` and `1`
/// give the same id.
pub fn field_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) if n.is_f64() => match n.as_f64() {
            Some(f) => f.to_string(),
            None => n.to_string(),
        },
        other => other.to_string(),
    }
}

fn attributes_of(record: &serde_json::Map<String, Value>) -> Attributes {
    match record.get("attributes") {
        Some(Value::Object(attributes)) => attributes.clone(),
        _ => Attributes::new(),
    }
}

/// Builds a node from a vertex-shaped record
pub fn vertex_from_record(record: &Value) -> Option<Node> {
    let record = record.as_object()?;
    let v_type = record.get("v_type")?;
    let v_id = record.get("v_id")?;
    let vertex = VertexRef::new(field_text(v_type), field_text(v_id));
    Some(Node::new(&vertex, attributes_of(record)))
}

/// Builds a link from an edge-shaped record
///
/// Only the endpoint types are required; a missing endpoint id renders empty.
pub fn edge_from_record(record: &Value) -> Option<Link> {
    let record = record.as_object()?;
    let from_type = record.get("from_type")?;
    let to_type = record.get("to_type")?;
    let id_of = |key: &str| record.get(key).map(field_text).unwrap_or_default();

    let from = VertexRef::new(field_text(from_type), id_of("from_id"));
    let to = VertexRef::new(field_text(to_type), id_of("to_id"));
    Some(Link::new(from, to, attributes_of(record)))
}

/// Members of a collection: array elements or object values
fn members(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(items) => items.iter().collect(),
        Value::Object(map) => map.values().collect(),
        _ => Vec::new(),
    }
}

fn scan_into<T>(
    collection: &Value,
    mode: ScanMode,
    classify: fn(&Value) -> Option<T>,
    out: &mut Vec<T>,
) -> usize {
    let mut skipped = 0;
    for record in members(collection) {
        match classify(record) {
            Some(item) => out.push(item),
            None if mode == ScanMode::StopAtFirstMalformed => {
                skipped += 1;
                break;
            }
            None => skipped += 1,
        }
    }
    skipped
}

/// Extracts nodes and links from nested result groups
///
/// `groups` holds result entries, each mapping arbitrary keys to
/// collections of records.
pub fn normalize_groups(groups: &Value, mode: ScanMode) -> GraphData {
    let mut graph = GraphData::default();
    for group in members(groups) {
        for collection in members(group) {
            let not_vertices = scan_into(collection, mode, vertex_from_record, &mut graph.nodes);
            let not_edges = scan_into(collection, mode, edge_from_record, &mut graph.links);
            trace!(not_vertices, not_edges, "Scanned result collection");
        }
    }
    graph
}

/// Builds a graph from explicit vertex and edge lists
///
/// Entries of the wrong shape are skipped with a warning.
pub fn normalize_seed(vertices: &Value, edges: &Value) -> GraphData {
    let mut graph = GraphData::default();
    let skipped = scan_into(vertices, ScanMode::SkipMalformed, vertex_from_record, &mut graph.nodes);
    if skipped > 0 {
        warn!("Skipped {} seed records without v_type/v_id", skipped);
    }
    let skipped = scan_into(edges, ScanMode::SkipMalformed, edge_from_record, &mut graph.links);
    if skipped > 0 {
        warn!("Skipped {} edge records without from_type/to_type", skipped);
    }
    graph
}
