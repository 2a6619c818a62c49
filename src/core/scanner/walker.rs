//! Directory walking implementation using walkdir.

use super::{filter::ImageFilter, DirectoryScanner, FileEntry, ScanResult};
use crate::error::ScanError;
use crate::events::{Event, EventSender, ScanEvent};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Configuration for the directory scanner
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Whether to follow symbolic links
    pub follow_symlinks: bool,
    /// Whether to include hidden files and directories
    pub include_hidden: bool,
    /// Maximum directory depth (None = unlimited)
    pub max_depth: Option<usize>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            follow_symlinks: false,
            include_hidden: false,
            max_depth: None,
        }
    }
}

/// Scanner implementation using the walkdir crate
pub struct WalkDirScanner {
    config: ScanConfig,
    filter: ImageFilter,
}

impl WalkDirScanner {
    /// Create a new scanner with the given configuration
    pub fn new(config: ScanConfig) -> Self {
        let filter = ImageFilter::new().with_hidden(config.include_hidden);
        Self { config, filter }
    }

    fn walk(
        &self,
        base: &Path,
        events: Option<&EventSender>,
    ) -> Result<(Vec<FileEntry>, Vec<ScanError>), ScanError> {
        // An invalid base directory is an invocation error, not a warning
        if !base.exists() {
            return Err(ScanError::DirectoryNotFound {
                path: base.to_path_buf(),
            });
        }
        if !base.is_dir() {
            return Err(ScanError::NotADirectory {
                path: base.to_path_buf(),
            });
        }

        let mut entries = Vec::new();
        let mut errors = Vec::new();

        let mut walker = WalkDir::new(base).follow_links(self.config.follow_symlinks);
        if let Some(depth) = self.config.max_depth {
            walker = walker.max_depth(depth);
        }

        for entry_result in walker {
            match entry_result {
                Ok(entry) => {
                    let path = entry.path();

                    if path.is_dir() {
                        // Skip hidden directories unless configured otherwise
                        if !self.config.include_hidden {
                            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                                if name.starts_with('.') && path != base {
                                    continue;
                                }
                            }
                        }
                        continue;
                    }

                    if !self.filter.should_include(path) {
                        continue;
                    }

                    // The relative path is what the move action recreates
                    // under the destination
                    let relative_path = match path.strip_prefix(base) {
                        Ok(rel) => rel.to_path_buf(),
                        Err(_) => path.to_path_buf(),
                    };

                    match fs::metadata(path) {
                        Ok(metadata) => {
                            let file = FileEntry {
                                path: path.to_path_buf(),
                                relative_path,
                                size: metadata.len(),
                                format: self.filter.get_format(path),
                            };

                            if let Some(sender) = events {
                                sender.send(Event::Scan(ScanEvent::FileFound {
                                    path: file.path.clone(),
                                }));
                            }

                            entries.push(file);
                        }
                        Err(e) => {
                            let error = ScanError::ReadEntry {
                                path: path.to_path_buf(),
                                source: e,
                            };

                            if let Some(sender) = events {
                                sender.send(Event::Scan(ScanEvent::Error {
                                    path: path.to_path_buf(),
                                    message: error.to_string(),
                                }));
                            }

                            errors.push(error);
                        }
                    }
                }
                Err(e) => {
                    let path = e.path().map(|p| p.to_path_buf()).unwrap_or_default();

                    let error = if e.io_error().map(|e| e.kind())
                        == Some(std::io::ErrorKind::PermissionDenied)
                    {
                        ScanError::PermissionDenied { path: path.clone() }
                    } else {
                        ScanError::ReadEntry {
                            path: path.clone(),
                            source: std::io::Error::other(e.to_string()),
                        }
                    };

                    if let Some(sender) = events {
                        sender.send(Event::Scan(ScanEvent::Error {
                            path,
                            message: error.to_string(),
                        }));
                    }

                    errors.push(error);
                }
            }
        }

        Ok((entries, errors))
    }
}

impl DirectoryScanner for WalkDirScanner {
    fn scan(&self, base: &Path) -> Result<ScanResult, ScanError> {
        self.scan_with_events(base, &crate::events::null_sender())
    }

    fn scan_with_events(
        &self,
        base: &Path,
        events: &EventSender,
    ) -> Result<ScanResult, ScanError> {
        events.send(Event::Scan(ScanEvent::Started {
            base: base.to_path_buf(),
        }));

        let (entries, errors) = self.walk(base, Some(events))?;

        events.send(Event::Scan(ScanEvent::Completed {
            total_files: entries.len(),
        }));

        Ok(ScanResult { entries, errors })
    }
}

#[cfg(test)]
mod tests {
    use super::super::ImageFormat;
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn create_test_image(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(&[0xFF, 0xD8, 0xFF, 0xE0]).unwrap();
        path
    }

    #[test]
    fn scan_empty_directory_returns_empty_vec() {
        let temp_dir = TempDir::new().unwrap();
        let scanner = WalkDirScanner::new(ScanConfig::default());

        let result = scanner.scan(temp_dir.path()).unwrap();

        assert!(result.entries.is_empty());
        assert!(result.errors.is_empty());
    }

    #[test]
    fn scan_finds_single_image() {
        let temp_dir = TempDir::new().unwrap();
        create_test_image(temp_dir.path(), "photo.jpg");

        let scanner = WalkDirScanner::new(ScanConfig::default());
        let result = scanner.scan(temp_dir.path()).unwrap();

        assert_eq!(result.entries.len(), 1);
        assert!(result.entries[0].path.ends_with("photo.jpg"));
        assert_eq!(result.entries[0].relative_path, PathBuf::from("photo.jpg"));
    }

    #[test]
    fn scan_detects_multiple_formats() {
        let temp_dir = TempDir::new().unwrap();
        create_test_image(temp_dir.path(), "photo.jpg");
        create_test_image(temp_dir.path(), "photo.png");
        create_test_image(temp_dir.path(), "photo.heic");
        create_test_image(temp_dir.path(), "photo.webp");

        let scanner = WalkDirScanner::new(ScanConfig::default());
        let result = scanner.scan(temp_dir.path()).unwrap();

        assert_eq!(result.entries.len(), 4);

        let formats: Vec<_> = result.entries.iter().map(|e| e.format).collect();
        assert!(formats.contains(&ImageFormat::Jpeg));
        assert!(formats.contains(&ImageFormat::Png));
        assert!(formats.contains(&ImageFormat::Heic));
        assert!(formats.contains(&ImageFormat::WebP));
    }

    #[test]
    fn scan_excludes_non_image_files() {
        let temp_dir = TempDir::new().unwrap();
        create_test_image(temp_dir.path(), "photo.jpg");
        File::create(temp_dir.path().join("document.txt")).unwrap();
        File::create(temp_dir.path().join("document.pdf")).unwrap();

        let scanner = WalkDirScanner::new(ScanConfig::default());
        let result = scanner.scan(temp_dir.path()).unwrap();

        assert_eq!(result.entries.len(), 1);
        assert!(result.entries[0].path.ends_with("photo.jpg"));
    }

    #[test]
    fn scan_computes_nested_relative_paths() {
        let temp_dir = TempDir::new().unwrap();
        let subdir = temp_dir.path().join("vacation").join("day1");
        fs::create_dir_all(&subdir).unwrap();

        create_test_image(temp_dir.path(), "root.jpg");
        create_test_image(&subdir, "nested.jpg");

        let scanner = WalkDirScanner::new(ScanConfig::default());
        let result = scanner.scan(temp_dir.path()).unwrap();

        assert_eq!(result.entries.len(), 2);

        let nested = result
            .entries
            .iter()
            .find(|e| e.path.ends_with("nested.jpg"))
            .unwrap();
        assert_eq!(
            nested.relative_path,
            PathBuf::from("vacation").join("day1").join("nested.jpg")
        );
    }

    #[test]
    fn scan_excludes_hidden_files_by_default() {
        let temp_dir = TempDir::new().unwrap();
        create_test_image(temp_dir.path(), "visible.jpg");
        create_test_image(temp_dir.path(), ".hidden.jpg");

        let scanner = WalkDirScanner::new(ScanConfig::default());
        let result = scanner.scan(temp_dir.path()).unwrap();

        assert_eq!(result.entries.len(), 1);
        assert!(result.entries[0].path.ends_with("visible.jpg"));
    }

    #[test]
    fn scan_can_include_hidden_files() {
        let temp_dir = TempDir::new().unwrap();
        create_test_image(temp_dir.path(), "visible.jpg");
        create_test_image(temp_dir.path(), ".hidden.jpg");

        let config = ScanConfig {
            include_hidden: true,
            ..Default::default()
        };
        let scanner = WalkDirScanner::new(config);
        let result = scanner.scan(temp_dir.path()).unwrap();

        assert_eq!(result.entries.len(), 2);
    }

    #[test]
    fn scan_nonexistent_directory_is_an_error() {
        let scanner = WalkDirScanner::new(ScanConfig::default());
        let result = scanner.scan(Path::new("/nonexistent/path/12345"));

        assert!(matches!(result, Err(ScanError::DirectoryNotFound { .. })));
    }

    #[test]
    fn scan_file_as_base_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let file = create_test_image(temp_dir.path(), "photo.jpg");

        let scanner = WalkDirScanner::new(ScanConfig::default());
        let result = scanner.scan(&file);

        assert!(matches!(result, Err(ScanError::NotADirectory { .. })));
    }
}
