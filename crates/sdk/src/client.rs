//! Meshgate Client Implementation

use crate::error::{Result, SdkError};
use crate::types::{
    AccountIdResponse, AckResponse, BuildResponse, ComputeProvider, CreatePostDataRequest,
    CurrentEpochResponse, CurrentLayerResponse, EchoRequest, EchoResponse,
    EpochNumLayersResponse, GenesisTimeResponse, IsSmeshingResponse, LayerDurationResponse,
    MeshInfo, NodeStatus, PostComputeProvidersResponse, PostOptions, PostProgress, PostStatus,
    SetCoinbaseRequest, StartSmeshingRequest, StatusResponse, StopPostDataCreationSessionRequest,
    VersionResponse,
};
use jsonrpsee::core::client::{ClientT, Subscription, SubscriptionClientT};
use jsonrpsee::core::params::ObjectParams;
use jsonrpsee::ws_client::{WsClient, WsClientBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// Meshgate Client
///
/// Talks to the gateway over WebSocket, so it can both call methods and
/// follow progress streams.
///
/// # Example
///
/// ```no_run
/// use meshgate_sdk::MeshgateClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = MeshgateClient::connect("ws://127.0.0.1:9091").await?;
/// let status = client.status().await?;
/// println!("peers: {}", status.connected_peers);
/// # Ok(())
/// # }
/// ```
pub struct MeshgateClient {
    client: WsClient,
}

/// Named params from a serializable request
fn named<T: Serialize>(request: &T) -> Result<ObjectParams> {
    let mut params = ObjectParams::new();
    match serde_json::to_value(request)? {
        serde_json::Value::Object(fields) => {
            for (key, value) in fields {
                params.insert(&key, value)?;
            }
            Ok(params)
        }
        other => Err(SdkError::Other(format!(
            "request must serialize to an object, got {}",
            other
        ))),
    }
}

impl MeshgateClient {
    /// Connect to a gateway RPC transport
    ///
    /// # Arguments
    ///
    /// * `url` - WebSocket endpoint (e.g., `ws://127.0.0.1:9091`)
    pub async fn connect(url: impl AsRef<str>) -> Result<Self> {
        let url = url.as_ref();

        let client = WsClientBuilder::default()
            .request_timeout(Duration::from_secs(30))
            .build(url)
            .await
            .map_err(|e| SdkError::Connection(format!("Failed to connect to {}: {}", url, e)))?;

        Ok(Self { client })
    }

    pub fn is_connected(&self) -> bool {
        self.client.is_connected()
    }

    async fn call<R: DeserializeOwned>(&self, method: &str) -> Result<R> {
        Ok(self.client.request(method, ObjectParams::new()).await?)
    }

    async fn call_with<T: Serialize, R: DeserializeOwned>(
        &self,
        method: &str,
        request: &T,
    ) -> Result<R> {
        Ok(self.client.request(method, named(request)?).await?)
    }

    // ------------------------------------------------------------------
    // node
    // ------------------------------------------------------------------

    pub async fn echo(&self, msg: impl Into<String>) -> Result<String> {
        let request = EchoRequest { msg: msg.into() };
        let response: EchoResponse = self.call_with("node.echo.v1", &request).await?;
        Ok(response.msg)
    }

    pub async fn version(&self) -> Result<String> {
        let response: VersionResponse = self.call("node.version.v1").await?;
        Ok(response.version_string)
    }

    pub async fn build(&self) -> Result<String> {
        let response: BuildResponse = self.call("node.build.v1").await?;
        Ok(response.build_string)
    }

    pub async fn status(&self) -> Result<NodeStatus> {
        let response: StatusResponse = self.call("node.status.v1").await?;
        Ok(response.status)
    }

    pub async fn sync_start(&self) -> Result<()> {
        let _: AckResponse = self.call("node.sync_start.v1").await?;
        Ok(())
    }

    /// Ask the gateway process to shut down
    pub async fn shutdown(&self) -> Result<()> {
        let _: AckResponse = self.call("node.shutdown.v1").await?;
        Ok(())
    }

    /// Open node.status_stream.v1 (currently ends without notifications)
    ///
    /// The gateway closes the stream with an error-close frame whose reason
    /// is `"no events"`. The client treats that frame as the end of the
    /// subscription, so `next()` yields `None` rather than an error.
    pub async fn subscribe_status(&self) -> Result<Subscription<serde_json::Value>> {
        Ok(self
            .client
            .subscribe(
                "node.subscribe_status.v1",
                ObjectParams::new(),
                "node.unsubscribe_status.v1",
            )
            .await?)
    }

    /// Open node.error_stream.v1 (currently ends without notifications)
    ///
    /// Ends the same way as [`MeshgateClient::subscribe_status`].
    pub async fn subscribe_errors(&self) -> Result<Subscription<serde_json::Value>> {
        Ok(self
            .client
            .subscribe(
                "node.subscribe_errors.v1",
                ObjectParams::new(),
                "node.unsubscribe_errors.v1",
            )
            .await?)
    }

    // ------------------------------------------------------------------
    // mesh
    // ------------------------------------------------------------------

    /// All clock parameters in one go
    pub async fn mesh_info(&self) -> Result<MeshInfo> {
        let genesis: GenesisTimeResponse = self.call("mesh.genesis_time.v1").await?;
        let layer: CurrentLayerResponse = self.call("mesh.current_layer.v1").await?;
        let epoch: CurrentEpochResponse = self.call("mesh.current_epoch.v1").await?;
        let duration: LayerDurationResponse = self.call("mesh.layer_duration.v1").await?;
        let per_epoch: EpochNumLayersResponse = self.call("mesh.epoch_num_layers.v1").await?;

        Ok(MeshInfo {
            genesis_time: genesis.unixtime,
            current_layer: layer.layernum,
            current_epoch: epoch.epochnum,
            layer_duration_secs: duration.duration_secs,
            layers_per_epoch: per_epoch.numlayers,
        })
    }

    // ------------------------------------------------------------------
    // smesher
    // ------------------------------------------------------------------

    pub async fn is_smeshing(&self) -> Result<bool> {
        let response: IsSmeshingResponse = self.call("smesher.is_smeshing.v1").await?;
        Ok(response.is_smeshing)
    }

    /// Start smeshing, rewarding `coinbase` (hex address)
    pub async fn start_smeshing(&self, coinbase: impl Into<String>) -> Result<()> {
        let request = StartSmeshingRequest {
            coinbase: coinbase.into(),
        };
        let _: AckResponse = self
            .call_with("smesher.start_smeshing.v1", &request)
            .await?;
        Ok(())
    }

    pub async fn stop_smeshing(&self) -> Result<()> {
        let _: AckResponse = self.call("smesher.stop_smeshing.v1").await?;
        Ok(())
    }

    pub async fn smesher_id(&self) -> Result<String> {
        let response: AccountIdResponse = self.call("smesher.smesher_id.v1").await?;
        Ok(response.account_id)
    }

    pub async fn coinbase(&self) -> Result<String> {
        let response: AccountIdResponse = self.call("smesher.coinbase.v1").await?;
        Ok(response.account_id)
    }

    /// Set the coinbase used by the next smeshing start
    pub async fn set_coinbase(&self, coinbase: impl Into<String>) -> Result<()> {
        let request = SetCoinbaseRequest {
            id: coinbase.into(),
        };
        let _: AckResponse = self.call_with("smesher.set_coinbase.v1", &request).await?;
        Ok(())
    }

    /// Always fails: the gateway does not implement min gas
    pub async fn min_gas(&self) -> Result<u64> {
        self.call("smesher.min_gas.v1").await
    }

    /// Always fails: the gateway does not implement min gas
    pub async fn set_min_gas(&self, _min_gas: u64) -> Result<()> {
        let _: AckResponse = self.call("smesher.set_min_gas.v1").await?;
        Ok(())
    }

    pub async fn post_status(&self) -> Result<PostStatus> {
        self.call("smesher.post_status.v1").await
    }

    /// Providers with their benchmarked throughput
    pub async fn post_compute_providers(&self) -> Result<Vec<ComputeProvider>> {
        let response: PostComputeProvidersResponse =
            self.call("smesher.post_compute_providers.v1").await?;
        Ok(response.providers)
    }

    pub async fn create_post_data(&self, options: PostOptions) -> Result<()> {
        let request = CreatePostDataRequest { data: options };
        let _: AckResponse = self
            .call_with("smesher.create_post_data.v1", &request)
            .await?;
        Ok(())
    }

    pub async fn stop_post_data_creation_session(&self, delete_files: bool) -> Result<()> {
        let request = StopPostDataCreationSessionRequest { delete_files };
        let _: AckResponse = self
            .call_with("smesher.stop_post_data_creation_session.v1", &request)
            .await?;
        Ok(())
    }

    /// Follow the progress of the current PoST session
    ///
    /// The stream only carries events produced after it was opened and ends
    /// when the session stops or finishes. Opened while no session is
    /// running, it ends right away.
    ///
    /// Every server-side end (`"session ended"`, `"server shutting down"`)
    /// arrives as an error-close frame carrying that reason. `next()` then
    /// yields `None`; an `Err` item only means a notification failed to decode.
    pub async fn subscribe_post_progress(&self) -> Result<Subscription<PostProgress>> {
        Ok(self
            .client
            .subscribe(
                "smesher.subscribe_post_progress.v1",
                ObjectParams::new(),
                "smesher.unsubscribe_post_progress.v1",
            )
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonrpsee::core::traits::ToRpcParams;

    #[test]
    fn test_requests_become_named_params() {
        let params = named(&StopPostDataCreationSessionRequest { delete_files: true }).unwrap();
        let raw = params.to_rpc_params().unwrap().unwrap();
        assert_eq!(raw.get(), r#"{"delete_files":true}"#);
    }

    #[test]
    fn test_non_object_request_is_rejected() {
        assert!(named(&42u32).is_err());
    }
}
