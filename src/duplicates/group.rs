use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Snapshot of one image file taken at scan time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    /// Absolute path; identifies the record
    pub path: PathBuf,
    pub size_bytes: u64,
    pub width: u32,
    pub height: u32,
    /// Encoded format, e.g. "PNG"
    pub format: String,
    /// Pixel layout, e.g. "Rgb8"
    pub color_mode: String,
    pub modified: DateTime<Utc>,
}

/// How the members of a group were matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKind {
    /// Byte-identical files
    Exact,
    /// Perceptual fingerprints within the threshold
    Similar,
}

impl std::fmt::Display for GroupKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GroupKind::Exact => write!(f, "exact"),
            GroupKind::Similar => write!(f, "similar"),
        }
    }
}

/// Two or more images believed to show the same content.
///
/// Members are kept sorted by size, largest first; the first member is the
/// one to keep and the rest are deletion candidates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    kind: GroupKind,
    members: Vec<ImageRecord>,
    space_saved: u64,
}

impl DuplicateGroup {
    /// Build a group, or `None` when fewer than two members are given
    pub(crate) fn new(kind: GroupKind, members: Vec<ImageRecord>) -> Option<Self> {
        if members.len() < 2 {
            return None;
        }
        let mut group = Self {
            kind,
            members,
            space_saved: 0,
        };
        group.resolve();
        Some(group)
    }

    /// Re-sort members and re-derive keep/delete/space_saved.
    /// `sort_by` is stable, so equal sizes keep discovery order.
    fn resolve(&mut self) {
        self.members.sort_by(|a, b| b.size_bytes.cmp(&a.size_bytes));
        self.space_saved = self.members.iter().skip(1).map(|m| m.size_bytes).sum();
    }

    pub fn kind(&self) -> GroupKind {
        self.kind
    }

    pub fn members(&self) -> &[ImageRecord] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn keep(&self) -> &ImageRecord {
        &self.members[0]
    }

    pub fn delete(&self) -> &[ImageRecord] {
        &self.members[1..]
    }

    pub fn space_saved(&self) -> u64 {
        self.space_saved
    }

    /// Number of files this group would remove
    pub fn files_to_delete(&self) -> usize {
        self.members.len().saturating_sub(1)
    }

    /// Drop members for which `remove` returns true and re-resolve.
    ///
    /// Returns false when the group fell below two members and must be
    /// dissolved by the caller.
    pub(crate) fn remove_members(&mut self, mut remove: impl FnMut(usize, &ImageRecord) -> bool) -> bool {
        let mut index = 0;
        self.members.retain(|m| {
            let drop = remove(index, m);
            index += 1;
            !drop
        });
        self.resolve();
        self.members.len() >= 2
    }
}

/// Aggregate counters for one scan session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanStatistics {
    /// Images found by the enumerator
    pub total_files: usize,
    /// Images that went through fingerprinting (including unavailable ones)
    pub processed_files: usize,
    pub duplicate_groups: usize,
    pub files_to_delete: usize,
    /// Bytes reclaimable by deleting every non-keep member
    pub space_saved: u64,
}

/// What a single group adds to the aggregate counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Contribution {
    files: usize,
    bytes: u64,
}

impl DuplicateGroup {
    pub(crate) fn contribution(&self) -> Contribution {
        Contribution {
            files: self.files_to_delete(),
            bytes: self.space_saved,
        }
    }
}

impl ScanStatistics {
    pub(crate) fn add_group(&mut self, c: Contribution) {
        self.duplicate_groups += 1;
        self.files_to_delete += c.files;
        self.space_saved += c.bytes;
    }

    /// Swap a group's old contribution for its new one; `None` means the
    /// group was dissolved.
    pub(crate) fn patch_group(&mut self, before: Contribution, after: Option<Contribution>) {
        self.files_to_delete -= before.files;
        self.space_saved -= before.bytes;
        match after {
            Some(c) => {
                self.files_to_delete += c.files;
                self.space_saved += c.bytes;
            }
            None => self.duplicate_groups -= 1,
        }
    }
}

/// Turn a candidate cluster into a group and add it to the running totals.
///
/// This is the only place a fresh group is counted, so each group contributes
/// to `stats` exactly once.
pub fn finalize_group(
    records: Vec<ImageRecord>,
    kind: GroupKind,
    stats: &mut ScanStatistics,
) -> Option<DuplicateGroup> {
    let group = DuplicateGroup::new(kind, records)?;
    stats.add_group(group.contribution());
    Some(group)
}

/// Derive statistics from the current group set
pub fn recompute_statistics(
    groups: &[DuplicateGroup],
    total_files: usize,
    processed_files: usize,
) -> ScanStatistics {
    ScanStatistics {
        total_files,
        processed_files,
        duplicate_groups: groups.len(),
        files_to_delete: groups.iter().map(|g| g.files_to_delete()).sum(),
        space_saved: groups.iter().map(|g| g.space_saved()).sum(),
    }
}
