use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::group::{DuplicateGroup, GroupKind, ImageRecord, ScanStatistics};
use super::scanner::EngineConfig;

/// Serializable view of a session, consumed by exporters and `--output`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Snapshot {
    /// When the snapshot was taken
    pub generated_at: DateTime<Utc>,

    /// Settings the scan ran with
    pub settings: SnapshotSettings,

    pub stats: ScanStatistics,

    pub groups: Vec<GroupSnapshot>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SnapshotSettings {
    pub directory: PathBuf,
    pub threshold: u32,
    pub dry_run: bool,
}

/// One duplicate group with its keep/delete split spelled out
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GroupSnapshot {
    #[serde(rename = "type")]
    pub kind: GroupKind,
    pub count: usize,
    /// All members, largest first
    pub files: Vec<ImageRecord>,
    pub keep: ImageRecord,
    pub delete: Vec<ImageRecord>,
    pub space_saved: u64,
}

impl From<&DuplicateGroup> for GroupSnapshot {
    fn from(group: &DuplicateGroup) -> Self {
        Self {
            kind: group.kind(),
            count: group.len(),
            files: group.members().to_vec(),
            keep: group.keep().clone(),
            delete: group.delete().to_vec(),
            space_saved: group.space_saved(),
        }
    }
}

impl Snapshot {
    pub fn new(
        root: &Path,
        config: &EngineConfig,
        groups: &[DuplicateGroup],
        stats: &ScanStatistics,
    ) -> Self {
        Self {
            generated_at: Utc::now(),
            settings: SnapshotSettings {
                directory: root.to_path_buf(),
                threshold: config.threshold,
                dry_run: config.dry_run,
            },
            stats: *stats,
            groups: groups.iter().map(GroupSnapshot::from).collect(),
        }
    }

    /// Write the snapshot as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        }
        let json = serde_json::to_string_pretty(self).context("Failed to serialize results")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write results: {}", path.display()))?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read results: {}", path.display()))?;
        let snapshot = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse results: {}", path.display()))?;
        Ok(snapshot)
    }
}
