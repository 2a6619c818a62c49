//! # Pipeline Module
//!
//! Wires the detection phases together: scan the base directory,
//! prefilter (exact mode), fingerprint in parallel, group by
//! fingerprint, select canonicals.
//!
//! The pipeline only detects; applying an action to the resulting
//! groups is the [`ActionExecutor`]'s job, which the CLI runs after
//! detection so the mutation phase stays sequential.
//!
//! [`ActionExecutor`]: crate::core::resolver::ActionExecutor

mod prefilter;

pub use prefilter::{prefilter, PrefilterResult};

use crate::core::fingerprint::{build_fingerprinter, Fingerprint, FingerprintKind};
use crate::core::resolver::{group_by_fingerprint, select_canonicals, DuplicateGroup, KeepPolicy};
use crate::core::scanner::{DirectoryScanner, FileEntry, ScanConfig, WalkDirScanner};
use crate::error::ImageDupeError;
use crate::events::{
    null_sender, Event, EventSender, FingerprintEvent, FingerprintProgress, PipelineEvent,
    PipelinePhase, RunSummary,
};
use rayon::prelude::*;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

/// Result of a detection run
#[derive(Debug)]
pub struct PipelineResult {
    /// All duplicate groups found, canonical already selected
    pub groups: Vec<DuplicateGroup>,
    /// Total image files scanned
    pub total_files: usize,
    /// Files skipped during fingerprinting (path, reason)
    pub skipped: Vec<(PathBuf, String)>,
    /// Non-fatal scan warnings
    pub scan_warnings: Vec<String>,
    /// Files dropped by the exact-mode prefilters
    pub prefiltered: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl PipelineResult {
    /// Total duplicates across all groups (excluding canonicals)
    pub fn duplicate_count(&self) -> usize {
        self.groups.iter().map(|g| g.duplicate_count()).sum()
    }

    /// Total size of all duplicates in bytes
    pub fn duplicate_size_bytes(&self) -> u64 {
        self.groups.iter().map(|g| g.duplicate_size_bytes()).sum()
    }
}

/// Configuration for the pipeline
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Base directory to scan
    pub base: PathBuf,
    /// Fingerprinting method
    pub fingerprint: FingerprintKind,
    /// Canonical selection policy
    pub keep: KeepPolicy,
    /// Scanner configuration
    pub scan_config: ScanConfig,
}

/// Builder for pipeline configuration
pub struct PipelineBuilder {
    config: PipelineConfig,
}

impl PipelineBuilder {
    fn new(base: PathBuf) -> Self {
        Self {
            config: PipelineConfig {
                base,
                fingerprint: FingerprintKind::Exact,
                keep: KeepPolicy::PathOrder,
                scan_config: ScanConfig::default(),
            },
        }
    }

    /// Set the fingerprinting method
    pub fn fingerprint(mut self, kind: FingerprintKind) -> Self {
        self.config.fingerprint = kind;
        self
    }

    /// Set the canonical selection policy
    pub fn keep(mut self, policy: KeepPolicy) -> Self {
        self.config.keep = policy;
        self
    }

    /// Include hidden files
    pub fn include_hidden(mut self, include: bool) -> Self {
        self.config.scan_config.include_hidden = include;
        self
    }

    /// Follow symbolic links
    pub fn follow_symlinks(mut self, follow: bool) -> Self {
        self.config.scan_config.follow_symlinks = follow;
        self
    }

    /// Build the pipeline
    pub fn build(self) -> Pipeline {
        Pipeline {
            config: self.config,
        }
    }
}

/// The duplicate detection pipeline
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a pipeline builder for the given base directory
    pub fn builder(base: impl Into<PathBuf>) -> PipelineBuilder {
        PipelineBuilder::new(base.into())
    }

    /// Run the pipeline without events
    pub fn run(&self) -> Result<PipelineResult, ImageDupeError> {
        self.run_with_events(&null_sender())
    }

    /// Run the pipeline with event reporting
    pub fn run_with_events(
        &self,
        events: &EventSender,
    ) -> Result<PipelineResult, ImageDupeError> {
        let start_time = Instant::now();

        events.send(Event::Pipeline(PipelineEvent::Started));

        // Phase 1: Scanning
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Scanning,
        }));

        let scanner = WalkDirScanner::new(self.config.scan_config.clone());
        let scan_result = scanner.scan_with_events(&self.config.base, events)?;

        let scan_warnings: Vec<String> =
            scan_result.errors.iter().map(|e| e.to_string()).collect();
        for warning in &scan_warnings {
            tracing::warn!("{}", warning);
        }

        let entries = scan_result.entries;
        let total_files = entries.len();

        // Phase 2: Prefilter (exact mode only - perceptual duplicates
        // can differ in size and bytes)
        let (candidates, prefiltered) = if self.config.fingerprint == FingerprintKind::Exact {
            let result = prefilter(entries);
            let dropped = result.skipped_unique_size + result.skipped_unique_prefix;
            if dropped > 0 {
                tracing::debug!(
                    unique_size = result.skipped_unique_size,
                    unique_prefix = result.skipped_unique_prefix,
                    "prefilter dropped files without possible duplicates"
                );
            }
            (result.candidates, dropped)
        } else {
            (entries, 0)
        };

        // Phase 3: Fingerprinting (parallel)
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Fingerprinting,
        }));
        events.send(Event::Fingerprint(FingerprintEvent::Started {
            total_files: candidates.len(),
        }));

        let fingerprinter = build_fingerprinter(self.config.fingerprint);
        let completed = AtomicUsize::new(0);
        let total_candidates = candidates.len();

        let outcomes: Vec<(FileEntry, Result<Fingerprint, String>)> = candidates
            .into_par_iter()
            .map(|entry| {
                let result = fingerprinter
                    .fingerprint(&entry)
                    .map_err(|e| e.to_string());

                let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                events.send(Event::Fingerprint(FingerprintEvent::Progress(
                    FingerprintProgress {
                        completed: done,
                        total: total_candidates,
                        current_path: entry.path.clone(),
                    },
                )));

                (entry, result)
            })
            .collect();

        let mut fingerprinted = Vec::with_capacity(outcomes.len());
        let mut skipped = Vec::new();
        for (entry, outcome) in outcomes {
            match outcome {
                Ok(fingerprint) => fingerprinted.push((entry, fingerprint)),
                Err(message) => {
                    tracing::warn!(path = %entry.path.display(), "{}", message);
                    events.send(Event::Fingerprint(FingerprintEvent::Skipped {
                        path: entry.path.clone(),
                        message: message.clone(),
                    }));
                    skipped.push((entry.path, message));
                }
            }
        }

        events.send(Event::Fingerprint(FingerprintEvent::Completed {
            total_fingerprinted: fingerprinted.len(),
            skipped: skipped.len(),
        }));

        // Phase 4: Grouping + canonical selection
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Grouping,
        }));

        let mut groups = group_by_fingerprint(fingerprinted);
        select_canonicals(&mut groups, self.config.keep);

        let duration_ms = start_time.elapsed().as_millis() as u64;
        let result = PipelineResult {
            total_files,
            skipped,
            scan_warnings,
            prefiltered,
            duration_ms,
            groups,
        };

        events.send(Event::Pipeline(PipelineEvent::Completed {
            summary: RunSummary {
                total_files: result.total_files,
                duplicate_groups: result.groups.len(),
                duplicate_count: result.duplicate_count(),
                duplicate_size_bytes: result.duplicate_size_bytes(),
                duration_ms: result.duration_ms,
            },
        }));

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn pipeline_handles_empty_directory() {
        let temp_dir = TempDir::new().unwrap();

        let pipeline = Pipeline::builder(temp_dir.path()).build();
        let result = pipeline.run().unwrap();

        assert_eq!(result.total_files, 0);
        assert!(result.groups.is_empty());
    }

    #[test]
    fn pipeline_rejects_nonexistent_base() {
        let pipeline = Pipeline::builder("/nonexistent/path/12345").build();
        assert!(pipeline.run().is_err());
    }

    #[test]
    fn exact_mode_groups_identical_files() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.jpg"), b"same bytes").unwrap();
        fs::write(temp_dir.path().join("b.jpg"), b"same bytes").unwrap();
        fs::write(temp_dir.path().join("c.jpg"), b"different!").unwrap();

        let pipeline = Pipeline::builder(temp_dir.path()).build();
        let result = pipeline.run().unwrap();

        assert_eq!(result.total_files, 3);
        assert_eq!(result.groups.len(), 1);
        assert_eq!(result.groups[0].duplicate_count(), 1);
        assert!(result.groups[0].canonical.ends_with("a.jpg"));
    }

    #[test]
    fn unique_files_produce_no_groups() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.jpg"), b"aaaa").unwrap();
        fs::write(temp_dir.path().join("b.jpg"), b"bbbbbb").unwrap();

        let pipeline = Pipeline::builder(temp_dir.path()).build();
        let result = pipeline.run().unwrap();

        assert!(result.groups.is_empty());
        // Different sizes: both dropped before hashing
        assert_eq!(result.prefiltered, 2);
    }

    #[test]
    fn perceptual_mode_skips_corrupt_files() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("broken.jpg"), b"not an image").unwrap();

        let pipeline = Pipeline::builder(temp_dir.path())
            .fingerprint(FingerprintKind::Perceptual)
            .build();
        let result = pipeline.run().unwrap();

        assert_eq!(result.total_files, 1);
        assert_eq!(result.skipped.len(), 1);
        assert!(result.groups.is_empty());
    }
}
