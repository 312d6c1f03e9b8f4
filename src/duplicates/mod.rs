pub mod cluster;
pub mod group;
pub mod hasher;
pub mod metadata;
pub mod mutation;
pub mod perceptual;
pub mod report;
pub mod scanner;
pub mod walker;

pub use group::{finalize_group, recompute_statistics, DuplicateGroup, GroupKind, ImageRecord, ScanStatistics};
pub use mutation::{delete_groups, delete_member, DeletionResult, Session, SharedSession};
pub use perceptual::{AverageHasher, Fingerprint, PerceptualHasher};
pub use report::Snapshot;
pub use scanner::{scan, scan_with_progress, CancelToken, EngineConfig, ScanReport};
