//! mesh service: layer clock parameters

use super::{route, Registrable};
use crate::types::{
    CurrentEpochResponse, CurrentLayerResponse, EmptyRequest, EpochNumLayersResponse,
    GenesisTimeResponse, LayerDurationResponse,
};
use jsonrpsee::core::RegisterMethodError;
use jsonrpsee::types::ErrorObjectOwned;
use jsonrpsee::RpcModule;
use meshgate_core::domain::ServiceName;
use meshgate_core::port::ClockInfo;
use std::sync::Arc;
use tracing::info;

pub mod method {
    pub const GENESIS_TIME: &str = "mesh.genesis_time.v1";
    pub const CURRENT_LAYER: &str = "mesh.current_layer.v1";
    pub const CURRENT_EPOCH: &str = "mesh.current_epoch.v1";
    pub const LAYER_DURATION: &str = "mesh.layer_duration.v1";
    pub const EPOCH_NUM_LAYERS: &str = "mesh.epoch_num_layers.v1";
}

pub struct MeshService {
    clock: Arc<dyn ClockInfo>,
}

impl MeshService {
    pub fn new(clock: Arc<dyn ClockInfo>) -> Self {
        Self { clock }
    }

    /// mesh.genesis_time.v1
    pub async fn genesis_time(
        &self,
        _req: EmptyRequest,
    ) -> Result<GenesisTimeResponse, ErrorObjectOwned> {
        info!(method = method::GENESIS_TIME, "RPC call");
        Ok(GenesisTimeResponse {
            unixtime: self.clock.genesis_time().timestamp(),
        })
    }

    /// mesh.current_layer.v1
    pub async fn current_layer(
        &self,
        _req: EmptyRequest,
    ) -> Result<CurrentLayerResponse, ErrorObjectOwned> {
        info!(method = method::CURRENT_LAYER, "RPC call");
        Ok(CurrentLayerResponse {
            layernum: self.clock.current_layer(),
        })
    }

    /// mesh.current_epoch.v1
    pub async fn current_epoch(
        &self,
        _req: EmptyRequest,
    ) -> Result<CurrentEpochResponse, ErrorObjectOwned> {
        info!(method = method::CURRENT_EPOCH, "RPC call");
        Ok(CurrentEpochResponse {
            epochnum: self.clock.current_epoch(),
        })
    }

    /// mesh.layer_duration.v1
    pub async fn layer_duration(
        &self,
        _req: EmptyRequest,
    ) -> Result<LayerDurationResponse, ErrorObjectOwned> {
        info!(method = method::LAYER_DURATION, "RPC call");
        Ok(LayerDurationResponse {
            duration_secs: self.clock.layer_duration().as_secs(),
        })
    }

    /// mesh.epoch_num_layers.v1
    pub async fn epoch_num_layers(
        &self,
        _req: EmptyRequest,
    ) -> Result<EpochNumLayersResponse, ErrorObjectOwned> {
        info!(method = method::EPOCH_NUM_LAYERS, "RPC call");
        Ok(EpochNumLayersResponse {
            numlayers: self.clock.layers_per_epoch(),
        })
    }
}

impl Registrable for MeshService {
    fn name(&self) -> ServiceName {
        ServiceName::Mesh
    }

    fn register_with(
        self: Arc<Self>,
        module: &mut RpcModule<()>,
    ) -> Result<(), RegisterMethodError> {
        route!(module, self, method::GENESIS_TIME, genesis_time);
        route!(module, self, method::CURRENT_LAYER, current_layer);
        route!(module, self, method::CURRENT_EPOCH, current_epoch);
        route!(module, self, method::LAYER_DURATION, layer_duration);
        route!(module, self, method::EPOCH_NUM_LAYERS, epoch_num_layers);
        Ok(())
    }
}
