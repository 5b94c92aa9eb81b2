pub mod commands;
pub mod data;
pub mod engine;
pub mod errors;
pub mod models;
pub mod utils;

use tracing_subscriber::EnvFilter;

pub use commands::Dashboard;
pub use data::dataset::Dataset;
pub use data::loader::load_dashboard;
pub use errors::{AppError, DecodeError};

/// Install the global `tracing` subscriber. `RUST_LOG` overrides the default
/// `info` level. Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}
