//! # Resolver Module
//!
//! Groups files by fingerprint and applies the chosen action to the
//! duplicates.
//!
//! A duplicate group holds every file sharing one fingerprint; one
//! member is the canonical copy and is never touched, the rest are the
//! duplicates the action applies to. Groups of size 1 are not
//! duplicates and are dropped during grouping.

mod actions;

pub use actions::{ActionExecutor, DuplicateAction, ResolveReport};

use crate::core::decoder::DecoderRegistry;
use crate::core::fingerprint::Fingerprint;
use crate::core::scanner::FileEntry;
use std::collections::HashMap;
use std::path::PathBuf;

/// Policy for choosing which member of a group to keep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeepPolicy {
    /// Keep the lexicographically first relative path (default)
    PathOrder,
    /// Keep the member with the most pixels; ties and undecodable
    /// members fall back to path order
    HighestResolution,
}

/// A group of files sharing one fingerprint
#[derive(Debug, Clone)]
pub struct DuplicateGroup {
    /// The shared fingerprint; doubles as the group identifier
    pub fingerprint: Fingerprint,
    /// All members, sorted by relative path
    pub entries: Vec<FileEntry>,
    /// Absolute path of the member to keep
    pub canonical: PathBuf,
}

impl DuplicateGroup {
    /// Number of duplicates (excluding the canonical copy)
    pub fn duplicate_count(&self) -> usize {
        self.entries.len().saturating_sub(1)
    }

    /// Iterate over the members the action applies to
    pub fn duplicates(&self) -> impl Iterator<Item = &FileEntry> {
        self.entries.iter().filter(move |e| e.path != self.canonical)
    }

    /// Total size of the duplicates in bytes
    pub fn duplicate_size_bytes(&self) -> u64 {
        self.duplicates().map(|e| e.size).sum()
    }
}

/// Group fingerprinted files into duplicate groups.
///
/// Members are sorted by relative path and groups by their first
/// member, so output order and canonical selection are deterministic
/// regardless of scan or hashing order. The canonical copy starts as
/// the first member; [`select_canonicals`] can revise it for other
/// keep policies.
pub fn group_by_fingerprint(fingerprinted: Vec<(FileEntry, Fingerprint)>) -> Vec<DuplicateGroup> {
    let mut by_fingerprint: HashMap<Fingerprint, Vec<FileEntry>> = HashMap::new();
    for (entry, fingerprint) in fingerprinted {
        by_fingerprint.entry(fingerprint).or_default().push(entry);
    }

    // A group of size 1 is not a duplicate
    by_fingerprint.retain(|_, entries| entries.len() >= 2);

    let mut groups: Vec<DuplicateGroup> = by_fingerprint
        .into_iter()
        .map(|(fingerprint, mut entries)| {
            entries.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
            let canonical = entries[0].path.clone();
            DuplicateGroup {
                fingerprint,
                entries,
                canonical,
            }
        })
        .collect();

    groups.sort_by(|a, b| a.entries[0].relative_path.cmp(&b.entries[0].relative_path));
    groups
}

/// Apply the keep policy to every group.
///
/// `PathOrder` is what [`group_by_fingerprint`] already chose.
/// `HighestResolution` decodes each member to read its dimensions, the
/// behavior users of the original tool expect: among byte-different
/// copies of one picture, keep the biggest one.
pub fn select_canonicals(groups: &mut [DuplicateGroup], policy: KeepPolicy) {
    if policy == KeepPolicy::PathOrder {
        return;
    }

    let decoders = DecoderRegistry::with_default_decoders();

    for group in groups.iter_mut() {
        // Entries are path-sorted, so the first member with the
        // maximum pixel count wins - deterministic on ties.
        // Undecodable members count zero pixels and are only kept if
        // nothing in the group decodes.
        let mut best_index = 0;
        let mut best_pixels = 0u64;

        for (index, entry) in group.entries.iter().enumerate() {
            let pixels = decoders
                .decode(&entry.path, entry.format)
                .map(|image| u64::from(image.width()) * u64::from(image.height()))
                .unwrap_or(0);

            if pixels > best_pixels {
                best_pixels = pixels;
                best_index = index;
            }
        }

        group.canonical = group.entries[best_index].path.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fingerprint::FingerprintKind;
    use crate::core::scanner::ImageFormat;

    fn entry(relative: &str) -> FileEntry {
        FileEntry {
            path: PathBuf::from("/base").join(relative),
            relative_path: PathBuf::from(relative),
            size: 100,
            format: ImageFormat::Jpeg,
        }
    }

    fn fp(byte: u8) -> Fingerprint {
        Fingerprint::new(vec![byte; 8], FingerprintKind::Exact)
    }

    #[test]
    fn empty_input_produces_no_groups() {
        assert!(group_by_fingerprint(Vec::new()).is_empty());
    }

    #[test]
    fn singletons_are_not_groups() {
        let fingerprinted = vec![(entry("a.jpg"), fp(1)), (entry("b.jpg"), fp(2))];
        assert!(group_by_fingerprint(fingerprinted).is_empty());
    }

    #[test]
    fn shared_fingerprint_forms_a_group() {
        let fingerprinted = vec![
            (entry("a.jpg"), fp(1)),
            (entry("b.jpg"), fp(1)),
            (entry("c.jpg"), fp(2)),
        ];

        let groups = group_by_fingerprint(fingerprinted);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].entries.len(), 2);
        assert_eq!(groups[0].duplicate_count(), 1);
    }

    #[test]
    fn canonical_is_lexicographically_first() {
        // Insertion order deliberately reversed
        let fingerprinted = vec![
            (entry("z/photo.jpg"), fp(1)),
            (entry("a/photo.jpg"), fp(1)),
            (entry("m/photo.jpg"), fp(1)),
        ];

        let groups = group_by_fingerprint(fingerprinted);

        assert_eq!(groups[0].canonical, PathBuf::from("/base/a/photo.jpg"));
        assert_eq!(groups[0].duplicate_count(), 2);
    }

    #[test]
    fn groups_are_ordered_by_first_member() {
        let fingerprinted = vec![
            (entry("later/x.jpg"), fp(1)),
            (entry("later/y.jpg"), fp(1)),
            (entry("early/x.jpg"), fp(2)),
            (entry("early/y.jpg"), fp(2)),
        ];

        let groups = group_by_fingerprint(fingerprinted);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].entries[0].relative_path, PathBuf::from("early/x.jpg"));
        assert_eq!(groups[1].entries[0].relative_path, PathBuf::from("later/x.jpg"));
    }

    #[test]
    fn duplicates_excludes_canonical() {
        let fingerprinted = vec![
            (entry("a.jpg"), fp(1)),
            (entry("b.jpg"), fp(1)),
            (entry("c.jpg"), fp(1)),
        ];

        let groups = group_by_fingerprint(fingerprinted);
        let duplicates: Vec<_> = groups[0].duplicates().collect();

        assert_eq!(duplicates.len(), 2);
        assert!(duplicates.iter().all(|e| e.path != groups[0].canonical));
    }

    #[test]
    fn duplicate_size_sums_non_canonical_members() {
        let fingerprinted = vec![
            (entry("a.jpg"), fp(1)),
            (entry("b.jpg"), fp(1)),
            (entry("c.jpg"), fp(1)),
        ];

        let groups = group_by_fingerprint(fingerprinted);
        assert_eq!(groups[0].duplicate_size_bytes(), 200);
    }

    #[test]
    fn path_order_policy_keeps_grouping_choice() {
        let fingerprinted = vec![(entry("b.jpg"), fp(1)), (entry("a.jpg"), fp(1))];

        let mut groups = group_by_fingerprint(fingerprinted);
        select_canonicals(&mut groups, KeepPolicy::PathOrder);

        assert_eq!(groups[0].canonical, PathBuf::from("/base/a.jpg"));
    }

    #[test]
    fn highest_resolution_policy_prefers_bigger_image() {
        use image::{DynamicImage, ImageBuffer, Rgb};
        let dir = tempfile::tempdir().unwrap();

        let write = |name: &str, edge: u32| -> FileEntry {
            let img = ImageBuffer::from_fn(edge, edge, |_, _| Rgb([128u8, 128, 128]));
            let path = dir.path().join(name);
            DynamicImage::ImageRgb8(img).save(&path).unwrap();
            FileEntry {
                relative_path: PathBuf::from(name),
                size: std::fs::metadata(&path).unwrap().len(),
                path,
                format: ImageFormat::Png,
            }
        };

        // "a" sorts first but "b" has more pixels
        let small = write("a.png", 8);
        let large = write("b.png", 32);
        let large_path = large.path.clone();

        let mut groups = vec![DuplicateGroup {
            fingerprint: fp(1),
            canonical: small.path.clone(),
            entries: vec![small, large],
        }];

        select_canonicals(&mut groups, KeepPolicy::HighestResolution);

        assert_eq!(groups[0].canonical, large_path);
    }
}
