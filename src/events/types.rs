//! Event type definitions for progress reporting.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted by the duplicate resolver pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Scanning phase events
    Scan(ScanEvent),
    /// Fingerprinting phase events
    Fingerprint(FingerprintEvent),
    /// Action phase events
    Resolve(ResolveEvent),
    /// Pipeline-level events
    Pipeline(PipelineEvent),
}

/// Events during the scanning phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScanEvent {
    /// Scanning has started
    Started { base: PathBuf },
    /// An image file was found
    FileFound { path: PathBuf },
    /// An error occurred but scanning continues
    Error { path: PathBuf, message: String },
    /// Scanning completed
    Completed { total_files: usize },
}

/// Events during the fingerprinting phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FingerprintEvent {
    /// Fingerprinting has started
    Started { total_files: usize },
    /// Progress update
    Progress(FingerprintProgress),
    /// A file was skipped (unreadable, corrupt, unsupported)
    Skipped { path: PathBuf, message: String },
    /// Fingerprinting completed
    Completed {
        total_fingerprinted: usize,
        skipped: usize,
    },
}

/// Progress information during fingerprinting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FingerprintProgress {
    /// Number of files fingerprinted so far
    pub completed: usize,
    /// Total number of files to fingerprint
    pub total: usize,
    /// Current file being fingerprinted
    pub current_path: PathBuf,
}

/// Events during the action phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ResolveEvent {
    /// The action phase has started
    Started {
        groups: usize,
        duplicates: usize,
    },
    /// A duplicate was reported (list action)
    Listed { path: PathBuf },
    /// A duplicate was relocated (move action)
    Moved { from: PathBuf, to: PathBuf },
    /// A duplicate was removed (delete action)
    Deleted { path: PathBuf },
    /// A duplicate was skipped with a warning
    Skipped { path: PathBuf, message: String },
    /// The action phase completed
    Completed { acted: usize, skipped: usize },
}

/// Pipeline-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineEvent {
    /// Pipeline has started
    Started,
    /// Moving to a new phase
    PhaseChanged { phase: PipelinePhase },
    /// Pipeline completed successfully
    Completed { summary: RunSummary },
}

/// Phases of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelinePhase {
    Scanning,
    Fingerprinting,
    Grouping,
    Resolving,
}

impl std::fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelinePhase::Scanning => write!(f, "Scanning"),
            PipelinePhase::Fingerprinting => write!(f, "Fingerprinting"),
            PipelinePhase::Grouping => write!(f, "Grouping"),
            PipelinePhase::Resolving => write!(f, "Resolving"),
        }
    }
}

/// Summary of a pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Total image files scanned
    pub total_files: usize,
    /// Number of duplicate groups found
    pub duplicate_groups: usize,
    /// Total number of duplicates (excluding canonical copies)
    pub duplicate_count: usize,
    /// Total size of the duplicates in bytes
    pub duplicate_size_bytes: u64,
    /// Duration in milliseconds
    pub duration_ms: u64,
}
