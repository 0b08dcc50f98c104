//! Service Handlers
//!
//! One handler per logical service. A handler only knows how to register
//! its methods on a module; it holds references to the subsystems it fronts
//! and no mutable state of its own.

pub mod mesh;
pub mod node;
pub mod smesher;

pub use mesh::MeshService;
pub use node::{BuildInfo, NodeService};
pub use smesher::SmesherService;

use crate::error::invalid_argument;
use jsonrpsee::core::RegisterMethodError;
use jsonrpsee::types::{ErrorObjectOwned, Params};
use jsonrpsee::{RpcModule, SubscriptionCloseResponse};
use meshgate_core::domain::ServiceName;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// The single capability of a service handler
pub trait Registrable: Send + Sync {
    fn name(&self) -> ServiceName;

    /// Register every method of this service on `module`
    ///
    /// # Errors
    /// Fails if a method name is already taken in `module`.
    fn register_with(self: Arc<Self>, module: &mut RpcModule<()>)
        -> Result<(), RegisterMethodError>;
}

/// Decode named params, treating absent params as an empty request
pub(crate) fn parse_params<T>(params: &Params<'_>) -> Result<T, ErrorObjectOwned>
where
    T: DeserializeOwned + Default,
{
    match params.as_str() {
        None => Ok(T::default()),
        Some(raw) => serde_json::from_str(raw)
            .map_err(|e| invalid_argument(format!("malformed params: {}", e))),
    }
}

/// Final frame of a stream the server ends
///
/// Clients only learn that a subscription is over from a close
/// notification; a plain return leaves them waiting. jsonrpsee clients drop
/// a subscription only on the error variant of that notification, so every
/// end, normal ones included, is sent as `NotifErr` with a short reason
/// (`"no events"`, `"session ended"`, `"server shutting down"`).
pub(crate) fn end_of_stream(reason: &str) -> SubscriptionCloseResponse {
    SubscriptionCloseResponse::NotifErr(reason.into())
}

/// Register `$handler` of `$svc` as an async method named `$name`
macro_rules! route {
    ($module:expr, $svc:expr, $name:expr, $handler:ident) => {{
        let svc = ::std::sync::Arc::clone(&$svc);
        $module.register_async_method($name, move |params, _, _| {
            let svc = svc.clone();
            async move {
                let req = $crate::service::parse_params(&params)?;
                svc.$handler(req).await
            }
        })?;
    }};
}

pub(crate) use route;
