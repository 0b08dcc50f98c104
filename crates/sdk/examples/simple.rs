//! Simple SDK Example
//!
//! Creates a small PoST data area and prints its progress.
//!
//! # Usage
//!
//! 1. Start the daemon with the smesher service on the RPC transport:
//!    ```bash
//!    MESHGATE_API__RPC_SERVER=true MESHGATE_API__SERVICES=node,smesher \
//!        cargo run --package meshgate-daemon
//!    ```
//!
//! 2. Run this example:
//!    ```bash
//!    cargo run --package meshgate-sdk --example simple
//!    ```

use meshgate_sdk::{MeshgateClient, PostOptions};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Meshgate SDK - Simple Example");
    println!("=============================\n");

    // 1. Connect to daemon
    println!("1. Connecting to daemon...");
    let client = MeshgateClient::connect("ws://127.0.0.1:9091").await?;
    println!("   ✓ Connected to {}\n", client.version().await?);

    // 2. Node status
    let status = client.status().await?;
    println!("2. Node status:");
    println!("     - Peers: {}", status.connected_peers);
    println!("     - Synced: {}", status.is_synced);
    println!("     - Top layer: {}\n", status.top_layer);

    // 3. Providers
    println!("3. Benchmarking compute providers...");
    let providers = client.post_compute_providers().await?;
    for p in &providers {
        println!("     - #{} {} ({}): {} B/s", p.id, p.model, p.compute_api, p.performance);
    }
    let Some(provider) = providers.first() else {
        println!("   ⚠ No compute provider available");
        return Ok(());
    };
    println!();

    // 4. Create PoST data and follow progress
    println!("4. Creating 16 MiB of PoST data...");
    client
        .create_post_data(PostOptions {
            data_dir: std::env::temp_dir()
                .join("meshgate-example")
                .to_string_lossy()
                .into_owned(),
            data_size: 16 * 1024 * 1024,
            append: false,
            throttle: false,
            compute_provider_id: provider.id,
        })
        .await?;
    let mut progress = client.subscribe_post_progress().await?;

    while let Some(event) = progress.next().await {
        let event = event?;
        if let Some(message) = &event.error_message {
            println!("   ✗ Failed: {}", message);
            break;
        }
        println!("     - {} bytes written", event.bytes_written);
    }

    let status = client.post_status().await?;
    println!("\n   ✓ Session ended in state {}", status.state);

    Ok(())
}
