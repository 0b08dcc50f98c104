// API Configuration Surface

use serde::{Deserialize, Serialize};

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_RPC_PORT: u16 = 9091;
const DEFAULT_RPC_PORT_NEW: u16 = 9092;
const DEFAULT_JSON_PORT: u16 = 9090;
const DEFAULT_JSON_PORT_NEW: u16 = 9093;

/// Raw API settings as loaded from file/environment.
///
/// Not validated; run it through
/// [`resolve`](crate::application::activation::resolve) before starting any
/// transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub host: String,
    /// Services to expose, by name ("node", "mesh", "smesher")
    pub services: Vec<String>,
    pub rpc_server: bool,
    pub rpc_port: u16,
    pub rpc_server_new: bool,
    pub rpc_port_new: u16,
    pub json_server: bool,
    pub json_port: u16,
    pub json_server_new: bool,
    pub json_port_new: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        // All transports are opt-in
        Self {
            host: DEFAULT_HOST.to_string(),
            services: Vec::new(),
            rpc_server: false,
            rpc_port: DEFAULT_RPC_PORT,
            rpc_server_new: false,
            rpc_port_new: DEFAULT_RPC_PORT_NEW,
            json_server: false,
            json_port: DEFAULT_JSON_PORT,
            json_server_new: false,
            json_port_new: DEFAULT_JSON_PORT_NEW,
        }
    }
}
