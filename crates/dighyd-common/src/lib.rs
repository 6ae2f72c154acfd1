//! dighyd-common: Shared errors, configuration, and logging setup used across all DigHyd crates.

pub mod config;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use config::Config;
pub use error::{ApiError, DighydError, Result};
