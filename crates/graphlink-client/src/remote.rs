use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use futures::future::try_join_all;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, error, instrument};

use graphlink_interfaces::{
    add_edge_count, GraphConnection, GraphData, GraphError, GraphResult, GraphSource, QueryOutput, QueryParams,
    VertexEdgeTypes,
};

use crate::config::ClientConfig;
use crate::normalize::{field_text, normalize_groups, normalize_seed, SuccessPolicy};

/// Type catalog as the proxy sends it
#[derive(Debug, Deserialize)]
struct TypeCatalog {
    #[serde(default)]
    v: Vec<String>,
    #[serde(default)]
    e: Value,
}

/// Client for a graph database reached through the local HTTP proxy
#[derive(Debug, Clone)]
pub struct RemoteGraphClient {
    config: ClientConfig,
    client: Client,
}

impl RemoteGraphClient {
    /// Creates a new RemoteGraphClient with the provided configuration
    pub fn new(config: ClientConfig) -> GraphResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GraphError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Creates a new RemoteGraphClient for `connection` behind the proxy at `proxy_url`
    pub fn with_url(proxy_url: impl Into<String>, connection: GraphConnection) -> GraphResult<Self> {
        Self::new(ClientConfig::new(proxy_url, connection))
    }

    /// The configuration this client was created with
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.proxy_url.trim_end_matches('/'), path)
    }

    /// Maps an HTTP error to a GraphError
    fn map_http_error(&self, error: reqwest::Error) -> GraphError {
        if error.is_timeout() {
            GraphError::Communication(format!("Request timeout: {}", error))
        } else if error.is_connect() {
            GraphError::Communication(format!("Connection error: {}", error))
        } else {
            GraphError::Communication(format!("HTTP error: {}", error))
        }
    }

    /// Sends a request and decodes its JSON body, failing on non-success statuses
    async fn send(&self, request: RequestBuilder) -> GraphResult<Value> {
        let response = request.send().await.map_err(|e| self.map_http_error(e))?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Graph proxy returned status {}: {}", status, body);
            return Err(GraphError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text().await.map_err(|e| self.map_http_error(e))?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Counts edges of every type concurrently
    ///
    /// Same result as [`GraphSource::all_edge_count`]; the first failing
    /// request fails the whole call and no partial sum is returned.
    #[instrument(skip(self, edge_types), fields(edge_types = edge_types.len()))]
    pub async fn all_edge_count_concurrent(&self, edge_types: &[String]) -> GraphResult<u64> {
        let filters: Vec<Value> = edge_types
            .iter()
            .map(|edge_type| json!({ "EdgeType": edge_type }))
            .collect();
        let counts = try_join_all(filters.iter().map(|filter| self.edge_count(filter))).await?;
        counts.into_iter().try_fold(0, add_edge_count)
    }
}

/// Fails with the server message when the body's `error` flag is truthy
fn check_application_error(body: &Value) -> GraphResult<()> {
    let flagged = match body.get("error") {
        None | Some(Value::Null) => false,
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Number(n)) => n.as_f64().map_or(true, |n| n != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    };

    if flagged {
        let message = body
            .get("message")
            .map(field_text)
            .unwrap_or_else(|| "Unknown error".to_string());
        error!("Graph database reported an error: {}", message);
        return Err(GraphError::Application(message));
    }
    Ok(())
}

#[async_trait]
impl GraphSource for RemoteGraphClient {
    fn connection(&self) -> &GraphConnection {
        &self.config.connection
    }

    #[instrument(skip(self))]
    async fn create_connection(&self) -> GraphResult<Value> {
        let connection = &self.config.connection;
        debug!("Connecting proxy to host {} graph {}", connection.host, connection.graphname);

        let request = self
            .client
            .get(self.endpoint("createConnection"))
            .header("Content-Type", "application/json")
            .query(&[
                ("host", connection.host.as_str()),
                ("graphname", connection.graphname.as_str()),
                ("secret", connection.secret.as_str()),
            ]);

        let ack = self.send(request).await?;
        debug!("Connection acknowledged: {}", ack);
        Ok(ack)
    }

    #[instrument(skip(self))]
    async fn vertex_edge_types(&self) -> GraphResult<VertexEdgeTypes> {
        let body = self.send(self.client.get(self.endpoint("getVertexEdgeTypes"))).await?;
        debug!("Type catalog: {}", body);

        let catalog: TypeCatalog = serde_json::from_value(body)?;
        Ok(VertexEdgeTypes {
            vertices: catalog.v,
            edges: catalog.e,
        })
    }

    #[instrument(skip(self))]
    async fn vertex_count(&self, filter: &Value) -> GraphResult<Value> {
        let request = self.client.post(self.endpoint("getVertexCount")).json(filter);
        let counts = self.send(request).await?;
        debug!("Vertex counts: {}", counts);
        Ok(counts)
    }

    #[instrument(skip(self))]
    async fn edge_count(&self, filter: &Value) -> GraphResult<u64> {
        let request = self.client.post(self.endpoint("getEdgeCount")).json(filter);
        let body = self.send(request).await?;

        body.as_u64().ok_or_else(|| {
            GraphError::UnexpectedResponse(format!("Edge count is not a non-negative integer: {}", body))
        })
    }

    #[instrument(skip(self, vertex_types, edge_types), fields(vertex_types = vertex_types.len(), edge_types = edge_types.len()))]
    async fn graph_data(&self, vertex_types: &[String], edge_types: &[String]) -> GraphResult<GraphData> {
        let selection: Vec<(&str, &str)> = vertex_types
            .iter()
            .map(|t| ("v", t.as_str()))
            .chain(edge_types.iter().map(|t| ("e", t.as_str())))
            .collect();

        let request = self
            .client
            .get(self.endpoint("getVertexEdgeData"))
            .query(&selection);
        let body = self.send(request).await?;
        check_application_error(&body)?;

        let res = body
            .get("Res")
            .and_then(Value::as_array)
            .ok_or_else(|| GraphError::UnexpectedResponse("Missing Res list".to_string()))?;
        let seed = res
            .first()
            .ok_or_else(|| GraphError::UnexpectedResponse("Missing vertex entry Res[0]".to_string()))?;
        let edges = res
            .get(1)
            .ok_or_else(|| GraphError::UnexpectedResponse("Missing edge entry Res[1]".to_string()))?;

        let graph = normalize_seed(
            seed.get("Seed").unwrap_or(&Value::Null),
            edges.get("edges").unwrap_or(&Value::Null),
        );
        debug!("Seeded graph has {} nodes and {} links", graph.nodes.len(), graph.links.len());
        Ok(graph)
    }

    #[instrument(skip(self, query_body), fields(query_length = query_body.len()))]
    async fn run_interpreted_query(&self, query_body: &str) -> GraphResult<GraphData> {
        let query = format!(
            "INTERPRET QUERY () FOR GRAPH {} {{ {} }}",
            self.config.connection.graphname, query_body
        );
        let request = self
            .client
            .post(self.endpoint("interpretedQuery"))
            .json(&json!({ "query": query }));
        let body = self.send(request).await?;
        check_application_error(&body)?;

        let graph = normalize_groups(body.get("results").unwrap_or(&Value::Null), self.config.scan_mode);
        SuccessPolicy::RequireBoth
            .resolve(graph, body)?
            .into_graph()
            .ok_or_else(|| GraphError::UnexpectedResponse("Interpreted query result is not a graph".to_string()))
    }

    #[instrument(skip(self, params), fields(query = %name))]
    async fn run_query(&self, name: &str, params: Option<&QueryParams>) -> GraphResult<QueryOutput> {
        let mut request = self.client.get(self.endpoint(&format!("installedQuery/{}", name)));
        if let Some(params) = params {
            debug!("Passing {} parameters to installed query", params.len());
            request = request.query(params);
        }

        let body = self.send(request).await?;
        check_application_error(&body)?;

        let graph = normalize_groups(&body, self.config.scan_mode);
        SuccessPolicy::Lenient.resolve(graph, body)
    }

    #[instrument(skip(self))]
    async fn queries(&self) -> GraphResult<Value> {
        let catalog = self.send(self.client.get(self.endpoint("getQueries"))).await?;
        debug!("Installed queries: {}", catalog);
        Ok(catalog)
    }
}

/// Creates a GraphSource implementation from a configuration
pub fn create_remote_graph_client(config: ClientConfig) -> GraphResult<Arc<dyn GraphSource + Send + Sync>> {
    let client = RemoteGraphClient::new(config)?;
    Ok(Arc::new(client))
}
