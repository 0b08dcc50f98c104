//! smesher service: smeshing control, coinbase and PoST data creation

use super::{end_of_stream, route, Registrable};
use crate::error::{invalid_argument, to_rpc_error, unimplemented};
use crate::types::{
    AckResponse, CoinbaseResponse, CreatePostDataRequest, EmptyRequest, IsSmeshingResponse,
    PostComputeProvidersResponse, PostProgressNotification, PostStatusResponse,
    SetCoinbaseRequest, SmesherIdResponse, StartSmeshingRequest,
    StopPostDataCreationSessionRequest,
};
use jsonrpsee::core::RegisterMethodError;
use jsonrpsee::types::ErrorObjectOwned;
use jsonrpsee::{
    PendingSubscriptionSink, RpcModule, SubscriptionCloseResponse, SubscriptionMessage,
};
use meshgate_core::application::{PostSetupController, ShutdownToken};
use meshgate_core::domain::{Address, ServiceName};
use meshgate_core::port::SmeshingControl;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub mod method {
    pub const IS_SMESHING: &str = "smesher.is_smeshing.v1";
    pub const START_SMESHING: &str = "smesher.start_smeshing.v1";
    pub const STOP_SMESHING: &str = "smesher.stop_smeshing.v1";
    pub const SMESHER_ID: &str = "smesher.smesher_id.v1";
    pub const COINBASE: &str = "smesher.coinbase.v1";
    pub const SET_COINBASE: &str = "smesher.set_coinbase.v1";
    pub const MIN_GAS: &str = "smesher.min_gas.v1";
    pub const SET_MIN_GAS: &str = "smesher.set_min_gas.v1";
    pub const POST_STATUS: &str = "smesher.post_status.v1";
    pub const POST_COMPUTE_PROVIDERS: &str = "smesher.post_compute_providers.v1";
    pub const CREATE_POST_DATA: &str = "smesher.create_post_data.v1";
    pub const STOP_POST_DATA_CREATION_SESSION: &str =
        "smesher.stop_post_data_creation_session.v1";

    pub const SUBSCRIBE_POST_PROGRESS: &str = "smesher.subscribe_post_progress.v1";
    pub const POST_PROGRESS_NOTIFICATION: &str = "smesher.post_progress.v1";
    pub const UNSUBSCRIBE_POST_PROGRESS: &str = "smesher.unsubscribe_post_progress.v1";
}

pub struct SmesherService {
    smeshing: Arc<dyn SmeshingControl>,
    post: Arc<PostSetupController>,
    shutdown: ShutdownToken,
}

impl SmesherService {
    pub fn new(
        smeshing: Arc<dyn SmeshingControl>,
        post: Arc<PostSetupController>,
        shutdown: ShutdownToken,
    ) -> Self {
        Self {
            smeshing,
            post,
            shutdown,
        }
    }

    /// smesher.is_smeshing.v1
    pub async fn is_smeshing(
        &self,
        _req: EmptyRequest,
    ) -> Result<IsSmeshingResponse, ErrorObjectOwned> {
        info!(method = method::IS_SMESHING, "RPC call");
        Ok(IsSmeshingResponse {
            is_smeshing: self.smeshing.is_smeshing(),
        })
    }

    /// smesher.start_smeshing.v1
    pub async fn start_smeshing(
        &self,
        req: StartSmeshingRequest,
    ) -> Result<AckResponse, ErrorObjectOwned> {
        info!(method = method::START_SMESHING, "RPC call");
        let coinbase = req
            .coinbase
            .ok_or_else(|| invalid_argument("`coinbase` must be provided"))?;
        let coinbase: Address = coinbase.parse().map_err(to_rpc_error)?;

        self.smeshing
            .start_smeshing(coinbase)
            .await
            .map_err(to_rpc_error)?;
        Ok(AckResponse::ok())
    }

    /// smesher.stop_smeshing.v1
    pub async fn stop_smeshing(&self, _req: EmptyRequest) -> Result<AckResponse, ErrorObjectOwned> {
        info!(method = method::STOP_SMESHING, "RPC call");
        self.smeshing.stop_smeshing().await.map_err(to_rpc_error)?;
        Ok(AckResponse::ok())
    }

    /// smesher.smesher_id.v1
    pub async fn smesher_id(
        &self,
        _req: EmptyRequest,
    ) -> Result<SmesherIdResponse, ErrorObjectOwned> {
        info!(method = method::SMESHER_ID, "RPC call");
        Ok(SmesherIdResponse {
            account_id: self.smeshing.smesher_id().to_hex(),
        })
    }

    /// smesher.coinbase.v1
    pub async fn coinbase(&self, _req: EmptyRequest) -> Result<CoinbaseResponse, ErrorObjectOwned> {
        info!(method = method::COINBASE, "RPC call");
        Ok(CoinbaseResponse {
            account_id: self.smeshing.coinbase().to_hex(),
        })
    }

    /// smesher.set_coinbase.v1
    ///
    /// Takes effect on the next smeshing start; a running session keeps the
    /// coinbase it was started with.
    pub async fn set_coinbase(
        &self,
        req: SetCoinbaseRequest,
    ) -> Result<AckResponse, ErrorObjectOwned> {
        info!(method = method::SET_COINBASE, "RPC call");
        let id = req
            .id
            .ok_or_else(|| invalid_argument("`id` must be provided"))?;
        let coinbase: Address = id.parse().map_err(to_rpc_error)?;
        self.smeshing.set_coinbase(coinbase);
        Ok(AckResponse::ok())
    }

    /// smesher.min_gas.v1
    pub async fn min_gas(&self) -> Result<AckResponse, ErrorObjectOwned> {
        info!(method = method::MIN_GAS, "RPC call");
        Err(unimplemented(method::MIN_GAS))
    }

    /// smesher.set_min_gas.v1
    pub async fn set_min_gas(&self) -> Result<AckResponse, ErrorObjectOwned> {
        info!(method = method::SET_MIN_GAS, "RPC call");
        Err(unimplemented(method::SET_MIN_GAS))
    }

    /// smesher.post_status.v1
    pub async fn post_status(
        &self,
        _req: EmptyRequest,
    ) -> Result<PostStatusResponse, ErrorObjectOwned> {
        info!(method = method::POST_STATUS, "RPC call");
        Ok(self.post.status().into())
    }

    /// smesher.post_compute_providers.v1
    pub async fn post_compute_providers(
        &self,
        _req: EmptyRequest,
    ) -> Result<PostComputeProvidersResponse, ErrorObjectOwned> {
        info!(method = method::POST_COMPUTE_PROVIDERS, "RPC call");
        let providers = self.post.providers().await.map_err(to_rpc_error)?;
        Ok(PostComputeProvidersResponse { providers })
    }

    /// smesher.create_post_data.v1
    pub async fn create_post_data(
        &self,
        req: CreatePostDataRequest,
    ) -> Result<AckResponse, ErrorObjectOwned> {
        info!(method = method::CREATE_POST_DATA, "RPC call");
        let options = req
            .data
            .ok_or_else(|| invalid_argument("`data` must be provided"))?;
        self.post.start(options).await.map_err(to_rpc_error)?;
        Ok(AckResponse::ok())
    }

    /// smesher.stop_post_data_creation_session.v1
    pub async fn stop_post_data_creation_session(
        &self,
        req: StopPostDataCreationSessionRequest,
    ) -> Result<AckResponse, ErrorObjectOwned> {
        info!(
            method = method::STOP_POST_DATA_CREATION_SESSION,
            delete_files = req.delete_files,
            "RPC call"
        );
        self.post
            .stop(req.delete_files)
            .await
            .map_err(to_rpc_error)?;
        Ok(AckResponse::ok())
    }

    /// smesher.subscribe_post_progress.v1
    ///
    /// Forwards progress events in order until the session ends or the
    /// server shuts down; a client going away ends it too. The hub
    /// subscription is taken before the sink is accepted, so nothing
    /// published after the subscribe call is missed.
    pub async fn post_progress_stream(
        self: Arc<Self>,
        pending: PendingSubscriptionSink,
    ) -> SubscriptionCloseResponse {
        info!(method = method::SUBSCRIBE_POST_PROGRESS, "RPC subscription");
        let mut subscription = self.post.subscribe_progress();
        let mut shutdown = self.shutdown.clone();
        let Ok(sink) = pending.accept().await else {
            subscription.unsubscribe();
            return SubscriptionCloseResponse::None;
        };

        let close = loop {
            if shutdown.is_shutdown() {
                break end_of_stream("server shutting down");
            }
            tokio::select! {
                event = subscription.next() => {
                    let Some(event) = event else {
                        break end_of_stream("session ended");
                    };
                    let msg = match SubscriptionMessage::from_json(
                        &PostProgressNotification::from(event),
                    ) {
                        Ok(msg) => msg,
                        Err(e) => {
                            warn!(error = %e, "Failed to encode progress event");
                            break end_of_stream("internal error");
                        }
                    };
                    if sink.send(msg).await.is_err() {
                        break SubscriptionCloseResponse::None;
                    }
                }
                _ = sink.closed() => break SubscriptionCloseResponse::None,
                _ = shutdown.wait() => break end_of_stream("server shutting down"),
            }
        };

        debug!(
            subscriber = subscription.id(),
            dropped = subscription.dropped(),
            "Progress stream finished"
        );
        subscription.unsubscribe();
        close
    }
}

impl Registrable for SmesherService {
    fn name(&self) -> ServiceName {
        ServiceName::Smesher
    }

    fn register_with(
        self: Arc<Self>,
        module: &mut RpcModule<()>,
    ) -> Result<(), RegisterMethodError> {
        route!(module, self, method::IS_SMESHING, is_smeshing);
        route!(module, self, method::START_SMESHING, start_smeshing);
        route!(module, self, method::STOP_SMESHING, stop_smeshing);
        route!(module, self, method::SMESHER_ID, smesher_id);
        route!(module, self, method::COINBASE, coinbase);
        route!(module, self, method::SET_COINBASE, set_coinbase);
        route!(module, self, method::POST_STATUS, post_status);
        route!(module, self, method::POST_COMPUTE_PROVIDERS, post_compute_providers);
        route!(module, self, method::CREATE_POST_DATA, create_post_data);
        route!(
            module,
            self,
            method::STOP_POST_DATA_CREATION_SESSION,
            stop_post_data_creation_session
        );

        // Unimplemented regardless of params, so they are never decoded
        let svc = self.clone();
        module.register_async_method(method::MIN_GAS, move |_, _, _| {
            let svc = svc.clone();
            async move { svc.min_gas().await }
        })?;
        let svc = self.clone();
        module.register_async_method(method::SET_MIN_GAS, move |_, _, _| {
            let svc = svc.clone();
            async move { svc.set_min_gas().await }
        })?;

        let svc = self;
        module.register_subscription(
            method::SUBSCRIBE_POST_PROGRESS,
            method::POST_PROGRESS_NOTIFICATION,
            method::UNSUBSCRIBE_POST_PROGRESS,
            move |_, pending, _, _| svc.clone().post_progress_stream(pending),
        )?;
        Ok(())
    }
}
