use anyhow::Context;
use tracing::info;

use graphlink_client::{create_remote_graph_client, init_tracing, ClientConfig};
use graphlink_interfaces::GraphSource;

/// Connects the proxy to the configured graph and prints every seeded vertex
/// and edge as `{nodes, links}` JSON.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let config = ClientConfig::load().context("Failed to load client configuration")?;
    let client = create_remote_graph_client(config)?;

    client
        .create_connection()
        .await
        .context("Proxy rejected the connection")?;

    let types = client.vertex_edge_types().await?;
    let edge_types = types.edge_type_names();
    info!(
        "Fetching {} vertex types and {} edge types",
        types.vertices.len(),
        edge_types.len()
    );

    let graph = client.graph_data(&types.vertices, &edge_types).await?;
    println!("{}", serde_json::to_string_pretty(&graph)?);
    Ok(())
}
