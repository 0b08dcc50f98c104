//! Meshgate SDK - Rust Client Library
//!
//! Typed access to the node, mesh and smesher services of a meshgate
//! gateway, including the PoST progress stream.
//!
//! # Example
//!
//! ```no_run
//! use meshgate_sdk::{MeshgateClient, PostOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = MeshgateClient::connect("ws://127.0.0.1:9091").await?;
//!
//!     client
//!         .create_post_data(PostOptions {
//!             data_dir: "/tmp/post".to_string(),
//!             data_size: 64 * 1024 * 1024,
//!             append: false,
//!             throttle: false,
//!             compute_provider_id: 0,
//!         })
//!         .await?;
//!
//!     let mut progress = client.subscribe_post_progress().await?;
//!     while let Some(event) = progress.next().await {
//!         println!("written: {}", event?.bytes_written);
//!     }
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod types;

pub use client::MeshgateClient;
pub use error::{Result, SdkError};
pub use jsonrpsee::core::client::Subscription;
pub use types::{
    AckResponse, ComputeProvider, MeshInfo, NodeStatus, PostOptions, PostProgress, PostStatus,
};
