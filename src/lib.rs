//! # imgdedup
//!
//! Finds duplicate and near-duplicate images in a directory tree and removes
//! them safely. It features:
//!
//! - **Exact matching**: SHA-256 over file contents
//! - **Perceptual matching**: average-hash fingerprints compared by Hamming
//!   distance, with a pluggable hasher
//! - **Keep the best copy**: the largest file of every group is kept
//! - **Safety-first**: dry run by default, per-file error reporting
//! - **Incremental repair**: groups and statistics stay consistent as files
//!   are deleted one by one or in bulk

pub mod cli;
pub mod common;
pub mod duplicates;
