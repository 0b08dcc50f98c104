//! meshgate CLI - Command-line interface for the meshgate node API gateway

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use meshgate_sdk::{MeshgateClient, PostOptions};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tabled::{Table, Tabled};

const DEFAULT_RPC_URL: &str = "http://127.0.0.1:9091";

#[derive(Parser)]
#[command(name = "meshgate")]
#[command(about = "meshgate node API gateway CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// RPC server URL
    #[arg(long, env = "MESHGATE_RPC_URL", default_value = DEFAULT_RPC_URL)]
    rpc_url: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Show node status
    Status,

    /// Show version and build
    Version,

    /// Round-trip a message through the gateway
    Echo {
        /// Message to send back
        msg: String,
    },

    /// Show layer clock parameters
    Mesh,

    /// Ask the node to start syncing
    SyncStart,

    /// Shut the gateway down
    Shutdown,

    /// Control smeshing
    Smeshing {
        #[command(subcommand)]
        action: SmeshingAction,
    },

    /// Read or change the reward address
    Coinbase {
        #[command(subcommand)]
        action: CoinbaseAction,
    },

    /// PoST data creation
    Post {
        #[command(subcommand)]
        action: PostAction,
    },
}

#[derive(Subcommand)]
enum SmeshingAction {
    /// Start smeshing
    Start {
        /// Reward address (hex)
        #[arg(short, long)]
        coinbase: String,
    },
    /// Stop smeshing
    Stop,
    /// Show whether smeshing is on, with the smesher id
    Status,
}

#[derive(Subcommand)]
enum CoinbaseAction {
    /// Show the current reward address
    Get,
    /// Set the reward address used by the next start
    Set {
        /// Reward address (hex)
        address: String,
    },
}

#[derive(Subcommand)]
enum PostAction {
    /// Show the state of the data creation session
    Status,

    /// List compute providers with their benchmarked throughput
    Providers,

    /// Start creating PoST data
    Create {
        /// Directory receiving the data files
        #[arg(short, long)]
        data_dir: String,

        /// Target size (bytes, or with a KiB/MiB/GiB suffix)
        #[arg(short, long, value_parser = parse_size)]
        size: u64,

        /// Compute provider id
        #[arg(short, long, default_value = "0")]
        provider: u32,

        /// Resume from data already on disk
        #[arg(long)]
        append: bool,

        /// Write slowly to leave resources to the node
        #[arg(long)]
        throttle: bool,

        /// Follow progress until the session ends
        #[arg(short, long)]
        watch: bool,
    },

    /// Stop the running session
    Stop {
        /// Also remove the data files
        #[arg(long)]
        delete_files: bool,
    },

    /// Follow progress of the running session
    Watch,
}

#[derive(Serialize)]
struct JsonRpcRequest {
    jsonrpc: String,
    method: String,
    params: serde_json::Value,
    id: u64,
}

#[derive(Deserialize)]
struct JsonRpcResponse {
    #[allow(dead_code)]
    jsonrpc: String,
    #[allow(dead_code)]
    id: u64,
    result: Option<serde_json::Value>,
    error: Option<JsonRpcError>,
}

#[derive(Deserialize)]
struct JsonRpcError {
    code: i32,
    message: String,
    data: Option<serde_json::Value>,
}

#[derive(Deserialize, Tabled)]
struct ProviderRow {
    id: u32,
    model: String,
    compute_api: String,
    #[tabled(display_with = "display_rate")]
    performance: u64,
}

async fn call_rpc(url: &str, method: &str, params: serde_json::Value) -> Result<serde_json::Value> {
    let request = JsonRpcRequest {
        jsonrpc: "2.0".to_string(),
        method: method.to_string(),
        params,
        id: 1,
    };

    let client = reqwest::Client::new();
    let response: JsonRpcResponse = client
        .post(url)
        .json(&request)
        .send()
        .await
        .context("Failed to connect to gateway")?
        .json()
        .await
        .context("Failed to parse response")?;

    if let Some(error) = response.error {
        let kind = error
            .data
            .as_ref()
            .and_then(|d| d.get("kind"))
            .and_then(|k| k.as_str())
            .unwrap_or("UNKNOWN");
        anyhow::bail!("RPC error ({} {}): {}", error.code, kind, error.message);
    }

    response
        .result
        .ok_or_else(|| anyhow::anyhow!("No result in response"))
}

/// Parse "1048576", "512KiB", "64MiB" or "2GiB"
fn parse_size(raw: &str) -> Result<u64, String> {
    let raw = raw.trim();
    let (digits, unit) = match raw.find(|c: char| !c.is_ascii_digit()) {
        Some(idx) => raw.split_at(idx),
        None => (raw, ""),
    };
    let value: u64 = digits
        .parse()
        .map_err(|_| format!("invalid size: {}", raw))?;
    let multiplier: u64 = match unit.trim().to_ascii_lowercase().as_str() {
        "" | "b" => 1,
        "kib" | "k" => 1 << 10,
        "mib" | "m" => 1 << 20,
        "gib" | "g" => 1 << 30,
        other => return Err(format!("unknown size unit: {}", other)),
    };
    value
        .checked_mul(multiplier)
        .ok_or_else(|| format!("size too large: {}", raw))
}

/// WebSocket URL of the same RPC transport
fn ws_url(rpc_url: &str) -> String {
    if let Some(rest) = rpc_url.strip_prefix("https://") {
        format!("wss://{}", rest)
    } else if let Some(rest) = rpc_url.strip_prefix("http://") {
        format!("ws://{}", rest)
    } else {
        rpc_url.to_string()
    }
}

fn format_bytes(bytes: u64) -> String {
    const MIB: f64 = 1024.0 * 1024.0;
    format!("{:.2} MiB", bytes as f64 / MIB)
}

fn display_rate(bytes_per_sec: &u64) -> String {
    format!("{}/s", format_bytes(*bytes_per_sec))
}

async fn watch_progress(rpc_url: &str, data_size: Option<u64>) -> Result<()> {
    let client = MeshgateClient::connect(ws_url(rpc_url)).await?;
    let mut progress = client.subscribe_post_progress().await?;

    while let Some(event) = progress.next().await {
        let event = event.context("Malformed progress notification")?;
        if let Some(message) = &event.error_message {
            println!(
                "  {} {} ({})",
                "✗".red(),
                message,
                event.error_kind.as_deref().unwrap_or("UNKNOWN")
            );
            break;
        }
        match data_size {
            Some(total) if total > 0 => println!(
                "  {} / {} ({:.1}%)",
                format_bytes(event.bytes_written),
                format_bytes(total),
                event.bytes_written as f64 * 100.0 / total as f64
            ),
            _ => println!("  {}", format_bytes(event.bytes_written)),
        }
        if !event.in_progress {
            println!("{}", "✓ PoST data complete".green().bold());
            break;
        }
    }

    let status = client.post_status().await?;
    println!("  {} {}", "State:".bold(), status.state);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let url = cli.rpc_url.as_str();

    match cli.command {
        Commands::Status => {
            println!("{}", "Node Status".cyan().bold());
            println!();

            match call_rpc(url, "node.status.v1", json!({})).await {
                Ok(result) => {
                    let status = &result["status"];
                    println!("  {} {}", "RPC URL:".bold(), url);
                    println!("  {} {}", "Gateway:".bold(), "ONLINE".green());
                    println!();
                    println!("  {} {}", "Peers:".bold(), status["connected_peers"]);
                    let synced = if status["is_synced"].as_bool().unwrap_or(false) {
                        "yes".green()
                    } else {
                        "no".yellow()
                    };
                    println!("  {} {}", "Synced:".bold(), synced);
                    println!("  {} {}", "Synced layer:".bold(), status["synced_layer"]);
                    println!("  {} {}", "Top layer:".bold(), status["top_layer"]);
                    println!("  {} {}", "Verified layer:".bold(), status["verified_layer"]);
                }
                Err(e) => {
                    println!("  {} {}", "Gateway:".bold(), "ERROR".red());
                    println!("  {} {}", "Error:".bold(), e);
                }
            }
        }

        Commands::Version => {
            let version = call_rpc(url, "node.version.v1", json!({})).await?;
            let build = call_rpc(url, "node.build.v1", json!({})).await?;
            println!(
                "  {} {}",
                "Version:".bold(),
                version["version_string"].as_str().unwrap_or("-")
            );
            println!(
                "  {} {}",
                "Build:".bold(),
                build["build_string"].as_str().unwrap_or("-")
            );
        }

        Commands::Echo { msg } => {
            let result = call_rpc(url, "node.echo.v1", json!({ "msg": msg })).await?;
            println!("{}", result["msg"].as_str().unwrap_or_default());
        }

        Commands::Mesh => {
            println!("{}", "Mesh Clock".cyan().bold());
            println!();

            let genesis = call_rpc(url, "mesh.genesis_time.v1", json!({})).await?;
            let layer = call_rpc(url, "mesh.current_layer.v1", json!({})).await?;
            let epoch = call_rpc(url, "mesh.current_epoch.v1", json!({})).await?;
            let duration = call_rpc(url, "mesh.layer_duration.v1", json!({})).await?;
            let per_epoch = call_rpc(url, "mesh.epoch_num_layers.v1", json!({})).await?;

            println!("  {} {}", "Genesis (unix):".bold(), genesis["unixtime"]);
            println!("  {} {}", "Current layer:".bold(), layer["layernum"]);
            println!("  {} {}", "Current epoch:".bold(), epoch["epochnum"]);
            println!("  {} {}s", "Layer duration:".bold(), duration["duration_secs"]);
            println!("  {} {}", "Layers per epoch:".bold(), per_epoch["numlayers"]);
        }

        Commands::SyncStart => {
            call_rpc(url, "node.sync_start.v1", json!({})).await?;
            println!("{}", "✓ Sync requested".green().bold());
        }

        Commands::Shutdown => {
            call_rpc(url, "node.shutdown.v1", json!({})).await?;
            println!("{}", "✓ Shutdown requested".green().bold());
        }

        Commands::Smeshing { action } => match action {
            SmeshingAction::Start { coinbase } => {
                call_rpc(
                    url,
                    "smesher.start_smeshing.v1",
                    json!({ "coinbase": coinbase }),
                )
                .await?;
                println!("{}", "✓ Smeshing started".green().bold());
            }
            SmeshingAction::Stop => {
                call_rpc(url, "smesher.stop_smeshing.v1", json!({})).await?;
                println!("{}", "✓ Smeshing stopped".green().bold());
            }
            SmeshingAction::Status => {
                let on = call_rpc(url, "smesher.is_smeshing.v1", json!({})).await?;
                let id = call_rpc(url, "smesher.smesher_id.v1", json!({})).await?;
                let state = if on["is_smeshing"].as_bool().unwrap_or(false) {
                    "ON".green()
                } else {
                    "OFF".yellow()
                };
                println!("  {} {}", "Smeshing:".bold(), state);
                println!(
                    "  {} {}",
                    "Smesher id:".bold(),
                    id["account_id"].as_str().unwrap_or("-")
                );
            }
        },

        Commands::Coinbase { action } => match action {
            CoinbaseAction::Get => {
                let result = call_rpc(url, "smesher.coinbase.v1", json!({})).await?;
                println!("{}", result["account_id"].as_str().unwrap_or("-"));
            }
            CoinbaseAction::Set { address } => {
                call_rpc(url, "smesher.set_coinbase.v1", json!({ "id": address })).await?;
                println!("{}", "✓ Coinbase updated".green().bold());
            }
        },

        Commands::Post { action } => match action {
            PostAction::Status => {
                println!("{}", "PoST Data".cyan().bold());
                println!();

                let status = call_rpc(url, "smesher.post_status.v1", json!({})).await?;
                println!("  {} {}", "State:".bold(), status["state"]);
                println!(
                    "  {} {}",
                    "Written:".bold(),
                    format_bytes(status["bytes_written"].as_u64().unwrap_or(0))
                );
                if let Some(opts) = status["opts"].as_object() {
                    println!("  {} {}", "Directory:".bold(), opts["data_dir"]);
                    println!(
                        "  {} {}",
                        "Target:".bold(),
                        format_bytes(opts["data_size"].as_u64().unwrap_or(0))
                    );
                }
                if let Some(message) = status["error_message"].as_str() {
                    println!("  {} {} ({})", "Error:".bold(), message, status["error_kind"]);
                }
            }

            PostAction::Providers => {
                let result = call_rpc(url, "smesher.post_compute_providers.v1", json!({})).await?;
                let providers: Vec<ProviderRow> = serde_json::from_value(result["providers"].clone())
                    .context("Invalid provider list")?;

                let table = Table::new(providers).to_string();
                println!("{}", table);
            }

            PostAction::Create {
                data_dir,
                size,
                provider,
                append,
                throttle,
                watch,
            } => {
                let options = PostOptions {
                    data_dir,
                    data_size: size,
                    append,
                    throttle,
                    compute_provider_id: provider,
                };
                call_rpc(url, "smesher.create_post_data.v1", json!({ "data": options })).await?;
                println!("{}", "✓ PoST data creation started".green().bold());

                if watch {
                    println!();
                    watch_progress(url, Some(size)).await?;
                }
            }

            PostAction::Stop { delete_files } => {
                call_rpc(
                    url,
                    "smesher.stop_post_data_creation_session.v1",
                    json!({ "delete_files": delete_files }),
                )
                .await?;
                if delete_files {
                    println!("{}", "✓ Session stopped, data deleted".green().bold());
                } else {
                    println!("{}", "✓ Session stopped".green().bold());
                }
            }

            PostAction::Watch => {
                let status = call_rpc(url, "smesher.post_status.v1", json!({})).await?;
                if !status["in_progress"].as_bool().unwrap_or(false) {
                    println!("{}", "No PoST session is running".yellow());
                    return Ok(());
                }
                let total = status["opts"]["data_size"].as_u64();
                watch_progress(url, total).await?;
            }
        },
    }

    Ok(())
}
