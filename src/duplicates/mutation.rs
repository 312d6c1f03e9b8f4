use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::group::{recompute_statistics, DuplicateGroup, ScanStatistics};
use super::report::Snapshot;
use super::scanner::{self, EngineConfig, ScanReport};
use crate::common::errors::{DedupError, DeletionError};

const DRY_RUN_MESSAGE: &str = "Dry run mode - no files deleted";

/// Outcome of a delete operation
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeletionResult {
    pub deleted_count: usize,
    pub error_count: usize,
    pub errors: Vec<DeletionError>,
    /// Bytes actually removed from disk
    pub bytes_freed: u64,
    pub dry_run: bool,
    /// Files a dry run would have removed
    pub would_delete: usize,
    /// Bytes a dry run would have freed
    pub would_free: u64,
    pub message: Option<String>,
}

impl DeletionResult {
    fn dry_run(would_delete: usize, would_free: u64) -> Self {
        Self {
            dry_run: true,
            would_delete,
            would_free,
            message: Some(DRY_RUN_MESSAGE.to_string()),
            ..Self::default()
        }
    }

    fn record_error(&mut self, error: DeletionError) {
        self.error_count += 1;
        self.errors.push(error);
    }
}

/// Remove the non-keep members of the selected groups.
///
/// An empty selection means every group. Each file is removed independently;
/// a failure is recorded and the rest of the batch continues. A file that is
/// the keep of any group is never removed. Every group holding a removed path
/// is repaired, and groups left with a single member are dissolved.
pub fn delete_groups(
    groups: &mut Vec<DuplicateGroup>,
    stats: &mut ScanStatistics,
    selected: &[usize],
    dry_run: bool,
) -> DeletionResult {
    let selection: BTreeSet<usize> = if selected.is_empty() {
        (0..groups.len()).collect()
    } else {
        selected.iter().copied().collect()
    };

    if dry_run {
        let chosen = selection.iter().filter_map(|&i| groups.get(i));
        let (files, bytes) = chosen.fold((0, 0), |(f, b), g| (f + g.files_to_delete(), b + g.space_saved()));
        return DeletionResult::dry_run(files, bytes);
    }

    let keepers: HashSet<&Path> = groups.iter().map(|g| g.keep().path.as_path()).collect();
    let mut result = DeletionResult::default();
    let mut removed: HashSet<PathBuf> = HashSet::new();

    for &group_index in &selection {
        let Some(group) = groups.get(group_index) else {
            tracing::warn!("Skipping unknown duplicate group #{}", group_index);
            continue;
        };

        for member in group.delete() {
            if removed.contains(&member.path) {
                continue;
            }
            if keepers.contains(member.path.as_path()) {
                result.record_error(kept_elsewhere(&member.path));
                continue;
            }
            match remove_file(&member.path) {
                Ok(()) => {
                    result.deleted_count += 1;
                    result.bytes_freed += member.size_bytes;
                    removed.insert(member.path.clone());
                }
                Err(e) => result.record_error(e),
            }
        }
    }

    repair_groups(groups, stats, &removed);
    result
}

/// Remove one member of one group and repair every group that listed it.
///
/// Groups are re-sorted and their keep/delete split re-derived, or dissolved
/// when one member is left. A failed removal leaves the groups untouched, and
/// a file kept by a different group is refused.
pub fn delete_member(
    groups: &mut Vec<DuplicateGroup>,
    stats: &mut ScanStatistics,
    group_index: usize,
    member_index: usize,
    dry_run: bool,
) -> Result<DeletionResult, DedupError> {
    let group = groups.get(group_index).ok_or(DedupError::InvalidSelection {
        group_index,
        member_index: None,
    })?;
    let member = group
        .members()
        .get(member_index)
        .ok_or(DedupError::InvalidSelection {
            group_index,
            member_index: Some(member_index),
        })?;

    if dry_run {
        return Ok(DeletionResult::dry_run(1, member.size_bytes));
    }

    let mut result = DeletionResult::default();
    let kept_by_other = groups
        .iter()
        .enumerate()
        .any(|(i, g)| i != group_index && g.keep().path == member.path);
    if kept_by_other {
        result.record_error(kept_elsewhere(&member.path));
        return Ok(result);
    }

    let path = member.path.clone();
    let size = member.size_bytes;
    if let Err(e) = remove_file(&path) {
        result.record_error(e);
        return Ok(result);
    }
    result.deleted_count = 1;
    result.bytes_freed = size;

    repair_groups(groups, stats, &HashSet::from([path]));
    Ok(result)
}

/// Drop removed paths from every group, patching statistics per group and
/// dissolving groups that fall below two members
fn repair_groups(groups: &mut Vec<DuplicateGroup>, stats: &mut ScanStatistics, removed: &HashSet<PathBuf>) {
    if removed.is_empty() {
        return;
    }

    let mut index = 0;
    groups.retain_mut(|group| {
        let group_index = index;
        index += 1;
        if !group.members().iter().any(|m| removed.contains(&m.path)) {
            return true;
        }
        let before = group.contribution();
        if group.remove_members(|_, m| removed.contains(&m.path)) {
            stats.patch_group(before, Some(group.contribution()));
            true
        } else {
            tracing::debug!("Duplicate group #{} dissolved", group_index);
            stats.patch_group(before, None);
            false
        }
    });

    check_no_drift(groups, stats);
}

fn kept_elsewhere(path: &Path) -> DeletionError {
    tracing::warn!("Refusing to remove {}: it is kept by another group", path.display());
    DeletionError::new(path, "file is the keep of another duplicate group")
}

/// Delete a single file permanently
fn remove_file(path: &Path) -> Result<(), DeletionError> {
    std::fs::remove_file(path).map_err(|e| {
        tracing::warn!("Failed to remove {}: {}", path.display(), e);
        DeletionError::new(path, e)
    })
}

fn check_no_drift(groups: &[DuplicateGroup], stats: &ScanStatistics) {
    debug_assert_eq!(
        recompute_statistics(groups, stats.total_files, stats.processed_files),
        *stats,
        "incrementally patched statistics drifted from the group set"
    );
}

/// Owner of one scan's groups and statistics.
///
/// All mutation goes through `&mut self`, so a session is changed by at most
/// one delete at a time. Readers get slices or a serializable snapshot.
#[derive(Debug, Clone)]
pub struct Session {
    root: PathBuf,
    config: EngineConfig,
    groups: Vec<DuplicateGroup>,
    stats: ScanStatistics,
}

/// A session shared between threads; the mutex serializes deletions
pub type SharedSession = Arc<Mutex<Session>>;

impl Session {
    /// Scan `root` and take ownership of the result
    pub fn scan(root: &Path, config: EngineConfig) -> Result<Self, DedupError> {
        let report = scanner::scan(root, &config)?;
        Ok(Self::from_report(report, config))
    }

    pub fn from_report(report: ScanReport, config: EngineConfig) -> Self {
        Self {
            root: report.root,
            config,
            groups: report.groups,
            stats: report.stats,
        }
    }

    /// Replace all groups and statistics with a fresh scan of the same root.
    /// On error the current state is kept.
    pub fn rescan(&mut self) -> Result<(), DedupError> {
        let report = scanner::scan(&self.root, &self.config)?;
        self.groups = report.groups;
        self.stats = report.stats;
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn set_dry_run(&mut self, dry_run: bool) {
        self.config.dry_run = dry_run;
    }

    pub fn groups(&self) -> &[DuplicateGroup] {
        &self.groups
    }

    pub fn stats(&self) -> &ScanStatistics {
        &self.stats
    }

    pub fn delete_groups(&mut self, selected: &[usize]) -> DeletionResult {
        delete_groups(&mut self.groups, &mut self.stats, selected, self.config.dry_run)
    }

    pub fn delete_member(
        &mut self,
        group_index: usize,
        member_index: usize,
    ) -> Result<DeletionResult, DedupError> {
        delete_member(
            &mut self.groups,
            &mut self.stats,
            group_index,
            member_index,
            self.config.dry_run,
        )
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(&self.root, &self.config, &self.groups, &self.stats)
    }

    pub fn into_shared(self) -> SharedSession {
        Arc::new(Mutex::new(self))
    }
}
