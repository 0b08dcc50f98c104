//! Service Registry
//!
//! Builds one handler per activated service and merges their methods into
//! the single module every enabled transport serves.

use crate::service::{BuildInfo, MeshService, NodeService, Registrable, SmesherService};
use jsonrpsee::RpcModule;
use meshgate_core::application::{NodeStatusReader, PostSetupController, ShutdownToken};
use meshgate_core::domain::{ActivationConfig, ServiceName};
use meshgate_core::error::{AppError, Result};
use meshgate_core::port::{
    ClockInfo, LedgerInfo, NetworkInfo, ProcessControl, SmeshingControl, SyncControl,
};
use std::sync::Arc;
use tracing::info;

/// References to the subsystems handlers may front
///
/// Only the subsystems needed by the activated services have to be present.
#[derive(Default, Clone)]
pub struct Subsystems {
    pub network: Option<Arc<dyn NetworkInfo>>,
    pub syncer: Option<Arc<dyn SyncControl>>,
    pub ledger: Option<Arc<dyn LedgerInfo>>,
    pub clock: Option<Arc<dyn ClockInfo>>,
    pub process: Option<Arc<dyn ProcessControl>>,
    pub smeshing: Option<Arc<dyn SmeshingControl>>,
    pub post: Option<Arc<PostSetupController>>,
}

fn require<T: ?Sized>(
    subsystem: &Option<Arc<T>>,
    service: ServiceName,
    what: &str,
) -> Result<Arc<T>> {
    subsystem.clone().ok_or_else(|| {
        AppError::MissingDependency(format!(
            "{} service requires the {} subsystem",
            service, what
        ))
    })
}

pub struct ServiceRegistry {
    services: Vec<Arc<dyn Registrable>>,
}

impl ServiceRegistry {
    /// Construct a handler for every activated service
    ///
    /// # Errors
    /// - AppError::MissingDependency if an activated service lacks a subsystem
    pub fn build(
        activation: &ActivationConfig,
        subsystems: &Subsystems,
        build: BuildInfo,
        shutdown: ShutdownToken,
    ) -> Result<Self> {
        let mut services: Vec<Arc<dyn Registrable>> = Vec::new();

        for name in activation.services() {
            let service: Arc<dyn Registrable> = match name {
                ServiceName::Node => {
                    let syncer = require(&subsystems.syncer, name, "sync")?;
                    let status = NodeStatusReader::new(
                        require(&subsystems.network, name, "network")?,
                        syncer.clone(),
                        require(&subsystems.ledger, name, "ledger")?,
                        require(&subsystems.clock, name, "clock")?,
                    );
                    Arc::new(NodeService::new(
                        status,
                        syncer,
                        require(&subsystems.process, name, "process control")?,
                        build.clone(),
                    ))
                }
                ServiceName::Mesh => {
                    Arc::new(MeshService::new(require(&subsystems.clock, name, "clock")?))
                }
                ServiceName::Smesher => Arc::new(SmesherService::new(
                    require(&subsystems.smeshing, name, "smeshing")?,
                    require(&subsystems.post, name, "PoST")?,
                    shutdown.clone(),
                )),
            };
            services.push(service);
        }

        Ok(Self { services })
    }

    pub fn service_names(&self) -> Vec<ServiceName> {
        self.services.iter().map(|s| s.name()).collect()
    }

    /// Merge every handler into one module
    ///
    /// # Errors
    /// - AppError::Internal if two handlers claim the same method name
    pub fn into_module(self) -> Result<RpcModule<()>> {
        let mut module = RpcModule::new(());
        for service in self.services {
            let name = service.name();
            service.register_with(&mut module).map_err(|e| {
                AppError::Internal(format!("failed to register {} service: {}", name, e))
            })?;
            info!(service = %name, "Service registered");
        }
        Ok(module)
    }
}
