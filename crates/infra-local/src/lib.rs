// Meshgate Infrastructure - Local Subsystem Adapters
// Implements: ClockInfo, NetworkInfo, LedgerInfo, SyncControl, SmeshingControl, PostBackend

pub mod clock;
mod disk;
pub mod post_backend;
pub mod smeshing;
pub mod standalone;

pub use clock::LayerClock;
pub use post_backend::{LocalPostBackend, LocalPostConfig, PostMetadata};
pub use smeshing::LocalSmeshing;
pub use standalone::StandaloneNode;
