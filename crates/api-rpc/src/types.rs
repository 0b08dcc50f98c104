//! RPC Request/Response Types
//!
//! Defines the JSON-RPC method parameters and results. Every request field a
//! handler requires is an `Option` so its absence surfaces as
//! `InvalidArgument` from the handler rather than a generic parse error.

use meshgate_core::domain::{
    JobState, LayerId, NodeStatus, PostErrorKind, PostOptions, PostSetupStatus, ProgressEvent,
    ProviderBenchmark,
};
use serde::{Deserialize, Serialize};

/// Result of operations that only acknowledge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AckResponse {
    pub ok: bool,
}

impl AckResponse {
    pub fn ok() -> Self {
        Self { ok: true }
    }
}

/// Parameters of methods that take none
#[derive(Debug, Default, Deserialize)]
pub struct EmptyRequest {}

// ============================================================================
// node
// ============================================================================

/// node.echo.v1
#[derive(Debug, Default, Deserialize)]
pub struct EchoRequest {
    pub msg: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EchoResponse {
    pub msg: String,
}

/// node.version.v1
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionResponse {
    pub version_string: String,
}

/// node.build.v1
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildResponse {
    pub build_string: String,
}

/// node.status.v1
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: NodeStatus,
}

// ============================================================================
// mesh
// ============================================================================

/// mesh.genesis_time.v1
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisTimeResponse {
    /// Seconds since the Unix epoch
    pub unixtime: i64,
}

/// mesh.current_layer.v1
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentLayerResponse {
    pub layernum: LayerId,
}

/// mesh.current_epoch.v1
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentEpochResponse {
    pub epochnum: u64,
}

/// mesh.layer_duration.v1
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerDurationResponse {
    pub duration_secs: u64,
}

/// mesh.epoch_num_layers.v1
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpochNumLayersResponse {
    pub numlayers: u64,
}

// ============================================================================
// smesher
// ============================================================================

/// smesher.is_smeshing.v1
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IsSmeshingResponse {
    pub is_smeshing: bool,
}

/// smesher.start_smeshing.v1
#[derive(Debug, Default, Deserialize)]
pub struct StartSmeshingRequest {
    /// Hex encoded reward address
    pub coinbase: Option<String>,
}

/// smesher.smesher_id.v1
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmesherIdResponse {
    pub account_id: String,
}

/// smesher.coinbase.v1
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinbaseResponse {
    pub account_id: String,
}

/// smesher.set_coinbase.v1
#[derive(Debug, Default, Deserialize)]
pub struct SetCoinbaseRequest {
    /// Hex encoded reward address
    pub id: Option<String>,
}

/// smesher.post_status.v1
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostStatusResponse {
    pub state: JobState,
    pub bytes_written: u64,
    pub error_kind: Option<PostErrorKind>,
    pub error_message: Option<String>,
    pub in_progress: bool,
    pub opts: Option<PostOptions>,
}

impl From<PostSetupStatus> for PostStatusResponse {
    fn from(status: PostSetupStatus) -> Self {
        Self {
            state: status.state,
            bytes_written: status.bytes_written,
            error_kind: status.error_kind,
            error_message: status.error_message,
            in_progress: status.in_progress,
            opts: status.last_options,
        }
    }
}

/// smesher.post_compute_providers.v1
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostComputeProvidersResponse {
    pub providers: Vec<ProviderBenchmark>,
}

/// smesher.create_post_data.v1
#[derive(Debug, Default, Deserialize)]
pub struct CreatePostDataRequest {
    pub data: Option<PostOptions>,
}

/// smesher.stop_post_data_creation_session.v1
#[derive(Debug, Default, Deserialize)]
pub struct StopPostDataCreationSessionRequest {
    #[serde(default)]
    pub delete_files: bool,
}

/// Notification payload of smesher.post_progress.v1
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostProgressNotification {
    pub bytes_written: u64,
    pub error_kind: Option<PostErrorKind>,
    pub error_message: Option<String>,
    pub in_progress: bool,
}

impl From<ProgressEvent> for PostProgressNotification {
    fn from(event: ProgressEvent) -> Self {
        Self {
            bytes_written: event.bytes_written,
            error_kind: event.error_kind,
            error_message: event.error_message,
            in_progress: event.in_progress,
        }
    }
}
