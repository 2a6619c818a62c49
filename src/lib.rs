//! # imagedupe
//!
//! Finds duplicate images in a directory tree and lists, moves, or
//! deletes them.
//!
//! ## Behavior
//! - **One canonical copy always survives** - a group of N duplicates
//!   has exactly N-1 files acted on
//! - **Move preserves structure** - relocated files keep their
//!   base-relative path under the destination
//! - **Bad files are warnings** - unreadable or corrupt images are
//!   skipped, never abort the run
//!
//! ## Architecture
//! The library is split into a core engine and presentation layers:
//! - `core` - scanning, fingerprinting, grouping, actions
//! - `events` - channel-based progress reporting
//! - `error` - error types

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{ImageDupeError, Result};

/// Initialize tracing for the library
///
/// This should be called by the application entry point.
pub fn init_tracing() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set global default tracing subscriber");
}
