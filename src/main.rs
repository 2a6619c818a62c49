//! # imagedupe CLI
//!
//! Command-line interface for the duplicate image resolver.
//!
//! ## Usage
//! ```bash
//! imagedupe ~/Photos --action list
//! imagedupe ~/Photos --action move --destination ~/Duplicates
//! imagedupe ~/Photos --action delete --fingerprint perceptual
//! ```

mod cli;

use imagedupe::Result;

fn main() -> Result<()> {
    imagedupe::init_tracing();
    cli::run()
}
