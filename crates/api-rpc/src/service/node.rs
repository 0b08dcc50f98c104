//! node service: liveness, build metadata, status and process control

use super::{end_of_stream, route, Registrable};
use crate::error::invalid_argument;
use crate::types::{
    AckResponse, BuildResponse, EchoRequest, EchoResponse, EmptyRequest, StatusResponse,
    VersionResponse,
};
use jsonrpsee::core::RegisterMethodError;
use jsonrpsee::types::ErrorObjectOwned;
use jsonrpsee::{PendingSubscriptionSink, RpcModule, SubscriptionCloseResponse};
use meshgate_core::application::NodeStatusReader;
use meshgate_core::domain::ServiceName;
use meshgate_core::port::{ProcessControl, SyncControl};
use std::sync::Arc;
use tracing::info;

pub mod method {
    pub const ECHO: &str = "node.echo.v1";
    pub const VERSION: &str = "node.version.v1";
    pub const BUILD: &str = "node.build.v1";
    pub const STATUS: &str = "node.status.v1";
    pub const SYNC_START: &str = "node.sync_start.v1";
    pub const SHUTDOWN: &str = "node.shutdown.v1";

    pub const SUBSCRIBE_STATUS: &str = "node.subscribe_status.v1";
    pub const STATUS_NOTIFICATION: &str = "node.status_stream.v1";
    pub const UNSUBSCRIBE_STATUS: &str = "node.unsubscribe_status.v1";

    pub const SUBSCRIBE_ERRORS: &str = "node.subscribe_errors.v1";
    pub const ERROR_NOTIFICATION: &str = "node.error_stream.v1";
    pub const UNSUBSCRIBE_ERRORS: &str = "node.unsubscribe_errors.v1";
}

/// Version and commit reported by node.version.v1 / node.build.v1
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildInfo {
    pub version: String,
    pub commit: String,
}

impl Default for BuildInfo {
    fn default() -> Self {
        Self {
            version: meshgate_core::VERSION.to_string(),
            commit: meshgate_core::BUILD_COMMIT.to_string(),
        }
    }
}

pub struct NodeService {
    status: NodeStatusReader,
    syncer: Arc<dyn SyncControl>,
    process: Arc<dyn ProcessControl>,
    build: BuildInfo,
}

impl NodeService {
    pub fn new(
        status: NodeStatusReader,
        syncer: Arc<dyn SyncControl>,
        process: Arc<dyn ProcessControl>,
        build: BuildInfo,
    ) -> Self {
        Self {
            status,
            syncer,
            process,
            build,
        }
    }

    /// node.echo.v1
    pub async fn echo(&self, req: EchoRequest) -> Result<EchoResponse, ErrorObjectOwned> {
        info!(method = method::ECHO, "RPC call");
        let msg = req
            .msg
            .ok_or_else(|| invalid_argument("`msg` must be provided"))?;
        Ok(EchoResponse { msg })
    }

    /// node.version.v1
    pub async fn version(&self, _req: EmptyRequest) -> Result<VersionResponse, ErrorObjectOwned> {
        info!(method = method::VERSION, "RPC call");
        Ok(VersionResponse {
            version_string: self.build.version.clone(),
        })
    }

    /// node.build.v1
    pub async fn build(&self, _req: EmptyRequest) -> Result<BuildResponse, ErrorObjectOwned> {
        info!(method = method::BUILD, "RPC call");
        Ok(BuildResponse {
            build_string: self.build.commit.clone(),
        })
    }

    /// node.status.v1
    pub async fn status(&self, _req: EmptyRequest) -> Result<StatusResponse, ErrorObjectOwned> {
        info!(method = method::STATUS, "RPC call");
        Ok(StatusResponse {
            status: self.status.snapshot(),
        })
    }

    /// node.sync_start.v1
    pub async fn sync_start(&self, _req: EmptyRequest) -> Result<AckResponse, ErrorObjectOwned> {
        info!(method = method::SYNC_START, "RPC call");
        self.syncer.start_sync();
        Ok(AckResponse::ok())
    }

    /// node.shutdown.v1
    pub async fn shutdown(&self, _req: EmptyRequest) -> Result<AckResponse, ErrorObjectOwned> {
        info!(method = method::SHUTDOWN, "RPC call");
        self.process.request_shutdown();
        Ok(AckResponse::ok())
    }
}

/// Accept the subscription and end it without sending any event
///
/// node.status_stream.v1 and node.error_stream.v1 carry no events yet.
async fn empty_stream(
    pending: PendingSubscriptionSink,
    name: &'static str,
) -> SubscriptionCloseResponse {
    info!(method = name, "RPC subscription");
    match pending.accept().await {
        Ok(_sink) => end_of_stream("no events"),
        Err(_) => SubscriptionCloseResponse::None,
    }
}

impl Registrable for NodeService {
    fn name(&self) -> ServiceName {
        ServiceName::Node
    }

    fn register_with(
        self: Arc<Self>,
        module: &mut RpcModule<()>,
    ) -> Result<(), RegisterMethodError> {
        route!(module, self, method::ECHO, echo);
        route!(module, self, method::VERSION, version);
        route!(module, self, method::BUILD, build);
        route!(module, self, method::STATUS, status);
        route!(module, self, method::SYNC_START, sync_start);
        route!(module, self, method::SHUTDOWN, shutdown);

        module.register_subscription(
            method::SUBSCRIBE_STATUS,
            method::STATUS_NOTIFICATION,
            method::UNSUBSCRIBE_STATUS,
            |_, pending, _, _| empty_stream(pending, method::SUBSCRIBE_STATUS),
        )?;
        module.register_subscription(
            method::SUBSCRIBE_ERRORS,
            method::ERROR_NOTIFICATION,
            method::UNSUBSCRIBE_ERRORS,
            |_, pending, _, _| empty_stream(pending, method::SUBSCRIBE_ERRORS),
        )?;
        Ok(())
    }
}
