//! Action execution for duplicate groups.
//!
//! The action phase is deliberately sequential: two duplicates can map
//! to the same destination directory, and the canonical copy of one
//! group can be the duplicate of none - ordering must be stable for
//! the run to be reproducible.

use super::DuplicateGroup;
use crate::error::ResolveError;
use crate::events::{Event, EventSender, ResolveEvent};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// The action to apply to every duplicate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DuplicateAction {
    /// Report duplicates; no filesystem mutation
    List,
    /// Relocate duplicates under the destination root, recreating
    /// their base-relative directory structure
    Move { destination: PathBuf },
    /// Remove duplicates from disk
    Delete,
}

/// Outcome of the action phase
#[derive(Debug, Default)]
pub struct ResolveReport {
    /// Duplicates reported by the list action
    pub listed: Vec<PathBuf>,
    /// Duplicates relocated by the move action (source, destination)
    pub moved: Vec<(PathBuf, PathBuf)>,
    /// Duplicates removed by the delete action
    pub deleted: Vec<PathBuf>,
    /// Duplicates skipped with a warning (path, reason)
    pub skipped: Vec<(PathBuf, String)>,
    /// Total size of the acted-on duplicates in bytes
    pub bytes_affected: u64,
}

impl ResolveReport {
    /// Number of duplicates acted on (listed, moved, or deleted)
    pub fn acted(&self) -> usize {
        self.listed.len() + self.moved.len() + self.deleted.len()
    }
}

/// Applies the action to every duplicate of every group.
pub struct ActionExecutor;

impl ActionExecutor {
    /// Execute the action phase.
    ///
    /// Each file's action is independent: an I/O failure is recorded
    /// as a warning and processing continues. The canonical copy of a
    /// group is never touched.
    pub fn execute(
        groups: &[DuplicateGroup],
        action: &DuplicateAction,
        events: &EventSender,
    ) -> ResolveReport {
        let duplicate_count: usize = groups.iter().map(|g| g.duplicate_count()).sum();
        events.send(Event::Resolve(ResolveEvent::Started {
            groups: groups.len(),
            duplicates: duplicate_count,
        }));

        let mut report = ResolveReport::default();
        let mut created_dirs: HashSet<PathBuf> = HashSet::new();

        for group in groups {
            for entry in group.duplicates() {
                let outcome = match action {
                    DuplicateAction::List => {
                        events.send(Event::Resolve(ResolveEvent::Listed {
                            path: entry.path.clone(),
                        }));
                        report.listed.push(entry.path.clone());
                        Ok(())
                    }
                    DuplicateAction::Move { destination } => Self::move_duplicate(
                        &entry.path,
                        &entry.relative_path,
                        destination,
                        &mut created_dirs,
                    )
                    .map(|target| {
                        events.send(Event::Resolve(ResolveEvent::Moved {
                            from: entry.path.clone(),
                            to: target.clone(),
                        }));
                        report.moved.push((entry.path.clone(), target));
                    }),
                    DuplicateAction::Delete => {
                        fs::remove_file(&entry.path).map_err(|e| ResolveError::Delete {
                            path: entry.path.clone(),
                            source: e,
                        })
                        .map(|()| {
                            events.send(Event::Resolve(ResolveEvent::Deleted {
                                path: entry.path.clone(),
                            }));
                            report.deleted.push(entry.path.clone());
                        })
                    }
                };

                match outcome {
                    Ok(()) => report.bytes_affected += entry.size,
                    Err(error) => {
                        let message = error.to_string();
                        tracing::warn!(path = %entry.path.display(), "{}", message);
                        events.send(Event::Resolve(ResolveEvent::Skipped {
                            path: entry.path.clone(),
                            message: message.clone(),
                        }));
                        report.skipped.push((entry.path.clone(), message));
                    }
                }
            }
        }

        events.send(Event::Resolve(ResolveEvent::Completed {
            acted: report.acted(),
            skipped: report.skipped.len(),
        }));

        report
    }

    /// Relocate one duplicate under the destination root.
    ///
    /// The file's base-relative parent directories are recreated under
    /// the destination. An existing file at the computed target is a
    /// conflict and the duplicate is skipped - never overwritten.
    fn move_duplicate(
        source: &Path,
        relative_path: &Path,
        destination: &Path,
        created_dirs: &mut HashSet<PathBuf>,
    ) -> Result<PathBuf, ResolveError> {
        let target = destination.join(relative_path);

        if target.exists() {
            return Err(ResolveError::DestinationExists { path: target });
        }

        if let Some(parent) = target.parent() {
            if !created_dirs.contains(parent) {
                fs::create_dir_all(parent).map_err(|e| ResolveError::CreateDirectory {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
                created_dirs.insert(parent.to_path_buf());
            }
        }

        Self::relocate(source, &target)?;
        Ok(target)
    }

    /// Rename, falling back to copy + verify + delete across filesystems.
    fn relocate(source: &Path, target: &Path) -> Result<(), ResolveError> {
        if fs::rename(source, target).is_ok() {
            return Ok(());
        }

        // rename fails across filesystems; copy and verify the size
        // before deleting the source
        let map_io = |e: std::io::Error| ResolveError::Move {
            from: source.to_path_buf(),
            to: target.to_path_buf(),
            source: e,
        };

        let source_size = fs::metadata(source).map_err(map_io)?.len();
        fs::copy(source, target).map_err(map_io)?;

        let target_size = fs::metadata(target).map_err(map_io)?.len();
        if target_size != source_size {
            let _ = fs::remove_file(target);
            return Err(ResolveError::IncompleteCopy {
                to: target.to_path_buf(),
                expected: source_size,
                actual: target_size,
            });
        }

        fs::remove_file(source).map_err(map_io)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fingerprint::{Fingerprint, FingerprintKind};
    use crate::core::scanner::{FileEntry, ImageFormat};
    use crate::events::null_sender;
    use tempfile::TempDir;

    fn write_entry(base: &Path, relative: &str, content: &[u8]) -> FileEntry {
        let path = base.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();

        FileEntry {
            path,
            relative_path: PathBuf::from(relative),
            size: content.len() as u64,
            format: ImageFormat::Jpeg,
        }
    }

    fn group_of(entries: Vec<FileEntry>) -> DuplicateGroup {
        let canonical = entries[0].path.clone();
        DuplicateGroup {
            fingerprint: Fingerprint::new(vec![1; 8], FingerprintKind::Exact),
            entries,
            canonical,
        }
    }

    #[test]
    fn list_action_mutates_nothing() {
        let base = TempDir::new().unwrap();
        let a = write_entry(base.path(), "a.jpg", b"same");
        let b = write_entry(base.path(), "b.jpg", b"same");
        let (a_path, b_path) = (a.path.clone(), b.path.clone());

        let groups = vec![group_of(vec![a, b])];
        let report = ActionExecutor::execute(&groups, &DuplicateAction::List, &null_sender());

        assert_eq!(report.listed, vec![b_path.clone()]);
        assert!(a_path.exists());
        assert!(b_path.exists());
    }

    #[test]
    fn move_preserves_relative_path() {
        let base = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();

        let a = write_entry(base.path(), "a.jpg", b"same");
        let nested = write_entry(base.path(), "c/d.jpg", b"same");
        let nested_source = nested.path.clone();

        let groups = vec![group_of(vec![a, nested])];
        let action = DuplicateAction::Move {
            destination: dest.path().to_path_buf(),
        };
        let report = ActionExecutor::execute(&groups, &action, &null_sender());

        assert_eq!(report.moved.len(), 1);
        assert!(!nested_source.exists());
        assert!(dest.path().join("c").join("d.jpg").exists());
    }

    #[test]
    fn move_skips_existing_destination() {
        let base = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();

        let a = write_entry(base.path(), "a.jpg", b"same");
        let b = write_entry(base.path(), "b.jpg", b"same");
        let b_source = b.path.clone();

        // Conflict: something is already at the computed target
        fs::write(dest.path().join("b.jpg"), b"already here").unwrap();

        let groups = vec![group_of(vec![a, b])];
        let action = DuplicateAction::Move {
            destination: dest.path().to_path_buf(),
        };
        let report = ActionExecutor::execute(&groups, &action, &null_sender());

        assert!(report.moved.is_empty());
        assert_eq!(report.skipped.len(), 1);
        assert!(b_source.exists(), "skipped duplicate must stay in place");
        assert_eq!(fs::read(dest.path().join("b.jpg")).unwrap(), b"already here");
    }

    #[test]
    fn delete_removes_only_duplicates() {
        let base = TempDir::new().unwrap();
        let a = write_entry(base.path(), "a.jpg", b"same");
        let b = write_entry(base.path(), "b.jpg", b"same");
        let c = write_entry(base.path(), "c.jpg", b"same");
        let (a_path, b_path, c_path) = (a.path.clone(), b.path.clone(), c.path.clone());

        let groups = vec![group_of(vec![a, b, c])];
        let report = ActionExecutor::execute(&groups, &DuplicateAction::Delete, &null_sender());

        assert_eq!(report.deleted.len(), 2);
        assert!(a_path.exists(), "canonical copy must remain");
        assert!(!b_path.exists());
        assert!(!c_path.exists());
    }

    #[test]
    fn delete_failure_is_a_warning_not_fatal() {
        let base = TempDir::new().unwrap();
        let a = write_entry(base.path(), "a.jpg", b"same");
        let b = write_entry(base.path(), "b.jpg", b"same");
        let c = write_entry(base.path(), "c.jpg", b"same");
        let c_path = c.path.clone();

        // Remove b before the executor sees it
        fs::remove_file(&b.path).unwrap();

        let groups = vec![group_of(vec![a, b, c])];
        let report = ActionExecutor::execute(&groups, &DuplicateAction::Delete, &null_sender());

        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.deleted.len(), 1);
        assert!(!c_path.exists(), "later duplicates still processed");
    }

    #[test]
    fn bytes_affected_counts_acted_files() {
        let base = TempDir::new().unwrap();
        let a = write_entry(base.path(), "a.jpg", b"12345678");
        let b = write_entry(base.path(), "b.jpg", b"12345678");

        let groups = vec![group_of(vec![a, b])];
        let report = ActionExecutor::execute(&groups, &DuplicateAction::Delete, &null_sender());

        assert_eq!(report.bytes_affected, 8);
    }
}
