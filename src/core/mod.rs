//! # Core Module
//!
//! The duplicate detection and resolution engine, frontend-agnostic.
//!
//! ## Pipeline Flow
//! 1. **Scanner** walks the base directory and finds image files
//! 2. **Fingerprint** computes a comparable value per file (exact
//!    content hash or perceptual image hash, decoding through the
//!    **Decoder** capability interface)
//! 3. **Resolver** groups files by fingerprint, picks a canonical
//!    copy per group, and applies the list/move/delete action to the
//!    remaining duplicates

pub mod decoder;
pub mod fingerprint;
pub mod pipeline;
pub mod resolver;
pub mod scanner;
