//! Graphlink client
//!
//! Talks to a local graph database proxy over HTTP and reshapes its replies
//! into the `{nodes, links}` graphs the visualization layer renders.
//!
//! ```no_run
//! use graphlink_client::{ClientConfig, RemoteGraphClient};
//! use graphlink_interfaces::{GraphConnection, GraphSource};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let connection = GraphConnection::new("https://tg.example.com", "social", "s3cr3t");
//! let client = RemoteGraphClient::new(ClientConfig::new("http://127.0.0.1:8010", connection))?;
//!
//! client.create_connection().await?;
//! let graph = client
//!     .graph_data(&["Person".to_string()], &["Knows".to_string()])
//!     .await?;
//! println!("{} nodes, {} links", graph.nodes.len(), graph.links.len());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod normalize;
pub mod remote;

// Re-export key types for convenient usage
pub use config::ClientConfig;
pub use normalize::{ScanMode, SuccessPolicy};
pub use remote::{create_remote_graph_client, RemoteGraphClient};

/// Initialize tracing for the client
pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();
}
