use rayon::prelude::*;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use super::cluster;
use super::group::{finalize_group, DuplicateGroup, GroupKind, ImageRecord, ScanStatistics};
use super::hasher::{self, Digest};
use super::metadata;
use super::perceptual::{self, AverageHasher, Fingerprint, PerceptualHasher};
use super::walker;
use crate::common::errors::{DedupError, Unavailable};

/// Known image extensions
pub const DEFAULT_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "gif", "tiff", "webp"];

/// Default perceptual distance (out of 64 bits) that still counts as similar
pub const DEFAULT_THRESHOLD: u32 = 5;

/// Configuration for duplicate scanning and deletion
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Inclusive upper bound on perceptual distance for a `similar` match
    pub threshold: u32,
    /// When set, deletions only report what they would do
    pub dry_run: bool,
    /// Recognized extensions, lower-case without the dot
    pub extensions: BTreeSet<String>,
    /// Hashing threads (0 = one per core)
    pub workers: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            dry_run: true,
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            workers: 0,
        }
    }
}

/// Cooperative cancellation flag shared between the caller and the scan
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Receives `(processed, total)` after each file; called from worker threads
pub type ProgressSink<'a> = dyn Fn(usize, usize) + Sync + 'a;

/// Complete results from a duplicate scan
#[derive(Debug, Clone)]
pub struct ScanReport {
    /// Directory that was scanned
    pub root: PathBuf,
    /// Exact groups first, then similar groups, each in discovery order
    pub groups: Vec<DuplicateGroup>,
    pub stats: ScanStatistics,
    /// Files that could not be hashed or decoded
    pub unavailable: Vec<Unavailable>,
    /// The scan was stopped early; `groups` is empty
    pub cancelled: bool,
    /// Scan duration in seconds
    pub duration_secs: f64,
}

/// Everything learned about one file
#[derive(Default)]
struct FileHashes {
    record: Option<ImageRecord>,
    digest: Option<Digest>,
    fingerprint: Option<Fingerprint>,
    failure: Option<Unavailable>,
}

/// Scan a directory with the default perceptual hasher
pub fn scan(root: &Path, config: &EngineConfig) -> Result<ScanReport, DedupError> {
    scan_with_progress(root, config, &|_, _| {}, &CancelToken::new())
}

/// Scan a directory, reporting progress and honoring cancellation
pub fn scan_with_progress(
    root: &Path,
    config: &EngineConfig,
    progress: &ProgressSink<'_>,
    cancel: &CancelToken,
) -> Result<ScanReport, DedupError> {
    scan_with_hasher(root, config, &AverageHasher::new(), progress, cancel)
}

/// Run the full duplicate detection pipeline with a custom perceptual hasher
pub fn scan_with_hasher(
    root: &Path,
    config: &EngineConfig,
    hasher: &dyn PerceptualHasher,
    progress: &ProgressSink<'_>,
    cancel: &CancelToken,
) -> Result<ScanReport, DedupError> {
    let start = Instant::now();
    tracing::info!(root = %root.display(), threshold = config.threshold, "Starting duplicate scan");

    // ── Step 0: Collect image files ──────────────────────────────────────
    let files = walker::enumerate_images(root, &config.extensions)?;
    let total = files.len();
    let mut report = ScanReport {
        root: root.to_path_buf(),
        groups: Vec::new(),
        stats: ScanStatistics {
            total_files: total,
            ..ScanStatistics::default()
        },
        unavailable: Vec::new(),
        cancelled: false,
        duration_secs: 0.0,
    };

    if files.is_empty() {
        report.duration_secs = start.elapsed().as_secs_f64();
        return Ok(report);
    }

    // ── Pass 1: Fingerprint and describe every file in parallel ──────────
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.workers)
        .build()
        .map_err(|e| DedupError::ThreadPool(e.to_string()))?;

    let processed = AtomicUsize::new(0);
    let hashed: Vec<Option<FileHashes>> = pool.install(|| {
        files
            .par_iter()
            .map(|path| {
                if cancel.is_cancelled() {
                    return None;
                }
                let entry = hash_file(path, hasher);
                let done = processed.fetch_add(1, Ordering::Relaxed) + 1;
                progress(done, total);
                Some(entry)
            })
            .collect()
    });

    report.stats.processed_files = processed.load(Ordering::Relaxed);

    if cancel.is_cancelled() {
        tracing::info!(
            processed = report.stats.processed_files,
            total,
            "Scan cancelled"
        );
        report.cancelled = true;
        report.duration_secs = start.elapsed().as_secs_f64();
        return Ok(report);
    }

    // Results are indexed by enumeration order, never by completion order
    let mut records = Vec::with_capacity(total);
    let mut digests = Vec::with_capacity(total);
    let mut fingerprints = Vec::with_capacity(total);
    for entry in hashed.into_iter().flatten() {
        if let Some(failure) = entry.failure {
            report.unavailable.push(failure);
        }
        records.push(entry.record);
        digests.push(entry.digest);
        fingerprints.push(entry.fingerprint);
    }

    // ── Pass 2: Exact duplicates ─────────────────────────────────────────
    let exact = cluster::cluster_exact(&digests);
    for indices in &exact {
        let members = collect_records(&records, indices);
        report
            .groups
            .extend(finalize_group(members, GroupKind::Exact, &mut report.stats));
    }

    // ── Pass 3: Perceptually similar images ──────────────────────────────
    cluster::withhold_exact_members(&mut fingerprints, &exact);
    for indices in cluster::cluster_similar(&fingerprints, config.threshold) {
        let members = collect_records(&records, &indices);
        report
            .groups
            .extend(finalize_group(members, GroupKind::Similar, &mut report.stats));
    }

    report.duration_secs = start.elapsed().as_secs_f64();
    tracing::info!(
        groups = report.stats.duplicate_groups,
        removable = report.stats.files_to_delete,
        bytes = report.stats.space_saved,
        unavailable = report.unavailable.len(),
        "Scan finished in {:.2}s",
        report.duration_secs
    );

    Ok(report)
}

/// Hash, decode, and describe a single file. Never fails; gaps are `None`.
fn hash_file(path: &Path, hasher: &dyn PerceptualHasher) -> FileHashes {
    let mut entry = FileHashes::default();

    match hasher::exact_fingerprint(path) {
        Ok(digest) => entry.digest = Some(digest),
        Err(u) => {
            tracing::debug!("{}", u);
            entry.failure = Some(u);
        }
    }

    match metadata::decode(path) {
        Ok(decoded) => {
            let fingerprint = perceptual::fingerprint_image(&decoded.image, hasher);
            tracing::debug!(path = %path.display(), fingerprint = %fingerprint.to_hex(), "Hashed image");
            entry.fingerprint = Some(fingerprint);
            match metadata::describe_decoded(path, &decoded) {
                Ok(record) => entry.record = Some(record),
                Err(u) => {
                    tracing::debug!("{}", u);
                    entry.failure.get_or_insert(u);
                }
            }
        }
        Err(u) => {
            tracing::debug!("{}", u);
            entry.failure.get_or_insert(u);
        }
    }

    entry
}

/// Records for the given indices, skipping files without metadata
fn collect_records(records: &[Option<ImageRecord>], indices: &[usize]) -> Vec<ImageRecord> {
    indices.iter().filter_map(|&i| records[i].clone()).collect()
}
