// Port Layer - Interfaces to the subsystems the gateway fronts

pub mod mesh;
pub mod network;
pub mod post;
pub mod process;
pub mod smeshing;
pub mod sync;
pub mod time_provider; // For deterministic testing

// Re-exports
pub use mesh::{ClockInfo, LedgerInfo};
pub use network::NetworkInfo;
pub use post::PostBackend;
pub use process::ProcessControl;
pub use smeshing::SmeshingControl;
pub use sync::SyncControl;
pub use time_provider::TimeProvider;
