// Meshgate Core - Domain Logic & Ports
// NO infrastructure dependencies (Hexagonal Architecture)

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod port;

pub use error::{AppError, ErrorKind, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Commit the binaries were built from, injected by the release pipeline.
pub const BUILD_COMMIT: &str = match option_env!("MESHGATE_BUILD_COMMIT") {
    Some(commit) => commit,
    None => "unknown",
};
