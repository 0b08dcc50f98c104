// Domain Layer - Pure types shared by every service

pub mod activation;
pub mod node;
pub mod post;
pub mod service;
pub mod smesher;

// Re-exports
pub use activation::{ActivationConfig, Transport, TransportBinding};
pub use node::{LayerId, NodeStatus};
pub use post::{
    ComputeApiClass, ComputeProvider, JobState, PostErrorKind, PostOptions, PostSetupStatus,
    ProgressEvent, ProviderBenchmark,
};
pub use service::ServiceName;
pub use smesher::{Address, SmesherId};
