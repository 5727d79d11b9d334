//! # Duplicate Image Comparer
//!
//! Finds visually equivalent images, keeps one original per group and moves
//! or deletes the rest.
//!
//! ## Guarantees
//! - **One run at a time** - a second run on the same engine fails instead of waiting
//! - **Explicit results** - duplicate sets are returned values, never global state
//! - **Best-effort reconciliation** - every file is attempted, failures are reported together
//!
//! ## Architecture
//! - `core` - Discovery, signatures, grouping, reconciliation and orchestration
//! - `events` - Progress and property-change notifications
//! - `error` - Error types
//!
//! The `image-compare` binary wraps the library in a command-line interface.

pub mod core;
pub mod error;
pub mod events;

pub use error::{ComparerError, Result};

/// Initialize tracing for the library, filtered by `RUST_LOG` (default `warn`)
///
/// This should be called by the application entry point.
pub fn init_tracing() {
    init_tracing_with("warn");
}

/// Initialize tracing with a fallback filter used when `RUST_LOG` is unset.
///
/// Does nothing if a global subscriber is already installed.
pub fn init_tracing_with(default_filter: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
