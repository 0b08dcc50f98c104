// Resolved Service Activation

use crate::domain::ServiceName;
use std::collections::BTreeSet;

/// Transports the gateway can serve on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transport {
    /// Primary RPC (HTTP + WebSocket)
    Rpc,
    /// Secondary RPC (HTTP + WebSocket)
    RpcNew,
    /// Primary JSON gateway (HTTP only)
    Json,
    /// Secondary JSON gateway (HTTP only)
    JsonNew,
}

impl Transport {
    pub fn as_str(&self) -> &'static str {
        match self {
            Transport::Rpc => "rpc",
            Transport::RpcNew => "rpc-new",
            Transport::Json => "json",
            Transport::JsonNew => "json-new",
        }
    }

    /// Gateways only speak plain HTTP.
    pub fn is_gateway(&self) -> bool {
        matches!(self, Transport::Json | Transport::JsonNew)
    }
}

impl std::fmt::Display for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportBinding {
    pub transport: Transport,
    pub port: u16,
}

/// Activation decision produced by the config resolver.
///
/// Immutable once built. Invariant: the secondary gateway is enabled only
/// when at least one service is enabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationConfig {
    services: BTreeSet<ServiceName>,
    host: String,
    transports: Vec<TransportBinding>,
}

impl ActivationConfig {
    pub(crate) fn new(
        services: BTreeSet<ServiceName>,
        host: String,
        transports: Vec<TransportBinding>,
    ) -> Self {
        Self {
            services,
            host,
            transports,
        }
    }

    pub fn services(&self) -> impl Iterator<Item = ServiceName> + '_ {
        self.services.iter().copied()
    }

    pub fn is_enabled(&self, service: ServiceName) -> bool {
        self.services.contains(&service)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Enabled transports in a stable order.
    pub fn transports(&self) -> &[TransportBinding] {
        &self.transports
    }

    pub fn transport_enabled(&self, transport: Transport) -> bool {
        self.transports.iter().any(|b| b.transport == transport)
    }
}
