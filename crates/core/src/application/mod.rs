// Application Layer - Gateway use cases

pub mod activation;
pub mod node_status;
pub mod post_setup;
pub mod shutdown;

// Re-exports
pub use activation::resolve;
pub use node_status::NodeStatusReader;
pub use post_setup::{PostSetupController, ProgressHub, ProgressSubscription};
pub use shutdown::{shutdown_channel, ShutdownSender, ShutdownToken};
