//! JSON-RPC API Layer
//!
//! Exposes the node, mesh and smesher services over JSON-RPC 2.0. Methods
//! are named `<service>.<method>.v1`.

pub mod error;
pub mod registry;
pub mod server;
pub mod service;
pub mod types;

pub use registry::{ServiceRegistry, Subsystems};
pub use server::{RpcServer, RunningServer, ServerError, TransportHandle};
pub use service::{BuildInfo, Registrable};
