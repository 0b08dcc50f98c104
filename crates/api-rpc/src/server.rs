//! JSON-RPC Server
//!
//! Starts one jsonrpsee server per enabled transport, all serving the same
//! module. RPC transports accept HTTP and WebSocket; gateway transports
//! accept plain HTTP only.

use jsonrpsee::server::{Server, ServerHandle};
use jsonrpsee::RpcModule;
use meshgate_core::domain::{ActivationConfig, Transport, TransportBinding};
use std::net::SocketAddr;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("failed to bind {transport} server on {addr}: {source}")]
    Bind {
        transport: Transport,
        addr: String,
        #[source]
        source: std::io::Error,
    },
}

/// A transport that is up and serving
pub struct TransportHandle {
    pub transport: Transport,
    pub local_addr: SocketAddr,
    handle: ServerHandle,
}

/// RPC Server
pub struct RpcServer {
    host: String,
    bindings: Vec<TransportBinding>,
}

impl RpcServer {
    pub fn new(activation: &ActivationConfig) -> Self {
        Self {
            host: activation.host().to_string(),
            bindings: activation.transports().to_vec(),
        }
    }

    /// Bind every enabled transport and start serving `module`
    ///
    /// Transports already started are stopped again if a later one fails
    /// to bind.
    pub async fn start(self, module: RpcModule<()>) -> Result<RunningServer, ServerError> {
        let mut started: Vec<TransportHandle> = Vec::with_capacity(self.bindings.len());

        for binding in &self.bindings {
            match start_transport(&self.host, *binding, module.clone()).await {
                Ok(handle) => started.push(handle),
                Err(e) => {
                    RunningServer {
                        transports: started,
                    }
                    .stop()
                    .await;
                    return Err(e);
                }
            }
        }

        if started.is_empty() {
            warn!("No transport enabled; the API is not reachable");
        }
        Ok(RunningServer {
            transports: started,
        })
    }
}

async fn start_transport(
    host: &str,
    binding: TransportBinding,
    module: RpcModule<()>,
) -> Result<TransportHandle, ServerError> {
    let addr = format!("{}:{}", host, binding.port);
    let bind_error = |source| ServerError::Bind {
        transport: binding.transport,
        addr: addr.clone(),
        source,
    };

    let builder = Server::builder();
    let server = if binding.transport.is_gateway() {
        builder.http_only().build(&addr).await
    } else {
        builder.build(&addr).await
    }
    .map_err(bind_error)?;

    let local_addr = server.local_addr().map_err(bind_error)?;
    info!(
        transport = %binding.transport,
        addr = %local_addr,
        http_only = binding.transport.is_gateway(),
        "JSON-RPC transport listening"
    );

    Ok(TransportHandle {
        transport: binding.transport,
        local_addr,
        handle: server.start(module),
    })
}

/// Every transport started by [`RpcServer::start`]
pub struct RunningServer {
    transports: Vec<TransportHandle>,
}

impl RunningServer {
    pub fn transports(&self) -> &[TransportHandle] {
        &self.transports
    }

    /// Bound address of `transport`, if it is enabled
    pub fn local_addr(&self, transport: Transport) -> Option<SocketAddr> {
        self.transports
            .iter()
            .find(|t| t.transport == transport)
            .map(|t| t.local_addr)
    }

    /// Stop all transports and wait until they have shut down
    pub async fn stop(self) {
        for t in self.transports {
            if t.handle.stop().is_ok() {
                t.handle.stopped().await;
            }
            info!(transport = %t.transport, "JSON-RPC transport stopped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshgate_core::application::resolve;
    use meshgate_core::config::ApiConfig;

    fn ephemeral(json_server: bool) -> ActivationConfig {
        resolve(&ApiConfig {
            services: vec!["mesh".into()],
            rpc_server: true,
            rpc_port: 0,
            json_server,
            json_port: 0,
            ..Default::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_starts_every_enabled_transport() {
        let server = RpcServer::new(&ephemeral(true))
            .start(RpcModule::new(()))
            .await
            .unwrap();

        assert_eq!(server.transports().len(), 2);
        let rpc = server.local_addr(Transport::Rpc).unwrap();
        let json = server.local_addr(Transport::Json).unwrap();
        assert_ne!(rpc.port(), 0);
        assert_ne!(rpc, json);
        assert!(server.local_addr(Transport::RpcNew).is_none());

        server.stop().await;
    }

    #[tokio::test]
    async fn test_bind_failure_is_reported() {
        let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = taken.local_addr().unwrap().port();

        let activation = resolve(&ApiConfig {
            services: vec!["mesh".into()],
            rpc_server: true,
            rpc_port: port,
            ..Default::default()
        })
        .unwrap();

        let err = RpcServer::new(&activation)
            .start(RpcModule::new(()))
            .await
            .err()
            .unwrap();
        assert!(matches!(
            err,
            ServerError::Bind {
                transport: Transport::Rpc,
                ..
            }
        ));
    }
}
