//! SDK Request/Response Types
//!
//! Mirrors the JSON-RPC types of the gateway.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct AckResponse {
    pub ok: bool,
}

/// Node status snapshot (node.status.v1)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NodeStatus {
    pub connected_peers: u64,
    pub is_synced: bool,
    pub synced_layer: u64,
    pub top_layer: u64,
    pub verified_layer: u64,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct EchoRequest {
    pub msg: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct EchoResponse {
    pub msg: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct VersionResponse {
    pub version_string: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct BuildResponse {
    pub build_string: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct StatusResponse {
    pub status: NodeStatus,
}

/// Clock parameters collected from the mesh service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeshInfo {
    /// Seconds since the Unix epoch
    pub genesis_time: i64,
    pub current_layer: u64,
    pub current_epoch: u64,
    pub layer_duration_secs: u64,
    pub layers_per_epoch: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct GenesisTimeResponse {
    pub unixtime: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CurrentLayerResponse {
    pub layernum: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CurrentEpochResponse {
    pub epochnum: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct LayerDurationResponse {
    pub duration_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct EpochNumLayersResponse {
    pub numlayers: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct IsSmeshingResponse {
    pub is_smeshing: bool,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct StartSmeshingRequest {
    pub coinbase: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct AccountIdResponse {
    pub account_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct SetCoinbaseRequest {
    pub id: String,
}

/// Options of a PoST data creation session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostOptions {
    pub data_dir: String,
    /// Target size in bytes
    pub data_size: u64,
    #[serde(default)]
    pub append: bool,
    #[serde(default)]
    pub throttle: bool,
    #[serde(default)]
    pub compute_provider_id: u32,
}

/// smesher.post_status.v1
#[derive(Debug, Clone, Deserialize)]
pub struct PostStatus {
    /// IDLE, RUNNING, COMPLETED, FAILED or STOPPED
    pub state: String,
    pub bytes_written: u64,
    pub error_kind: Option<String>,
    pub error_message: Option<String>,
    pub in_progress: bool,
    pub opts: Option<PostOptions>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ComputeProvider {
    pub id: u32,
    pub model: String,
    /// UNSPECIFIED, CPU, CUDA or VULKAN
    pub compute_api: String,
    /// Bytes of labels per second
    pub performance: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PostComputeProvidersResponse {
    pub providers: Vec<ComputeProvider>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct CreatePostDataRequest {
    pub data: PostOptions,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct StopPostDataCreationSessionRequest {
    pub delete_files: bool,
}

/// One notification of smesher.post_progress.v1
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PostProgress {
    pub bytes_written: u64,
    pub error_kind: Option<String>,
    pub error_message: Option<String>,
    pub in_progress: bool,
}
