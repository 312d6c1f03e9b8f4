use image::{Rgb, RgbImage};
use std::path::Path;
use tempfile::TempDir;

use imgdedup::common::errors::DedupError;
use imgdedup::duplicates::{scan, scan_with_progress, CancelToken, EngineConfig, GroupKind};

// ─── Fixtures ────────────────────────────────────────────────────────────────

/// Brightness rises left to right
fn horizontal_gradient() -> RgbImage {
    RgbImage::from_fn(64, 64, |x, _| {
        let v = (x * 4) as u8;
        Rgb([v, v, v])
    })
}

/// Brightness rises top to bottom
fn vertical_gradient() -> RgbImage {
    RgbImage::from_fn(64, 64, |_, y| {
        let v = (y * 4) as u8;
        Rgb([v, v, v])
    })
}

fn save(img: &RgbImage, path: &Path) {
    img.save(path).unwrap();
}

fn file_name(path: &Path) -> String {
    path.file_name().unwrap().to_string_lossy().into_owned()
}

// ─── Scenarios ───────────────────────────────────────────────────────────────

#[test]
fn test_identical_files_form_one_exact_group() {
    let dir = TempDir::new().unwrap();
    save(&horizontal_gradient(), &dir.path().join("a.png"));
    std::fs::copy(dir.path().join("a.png"), dir.path().join("b.png")).unwrap();
    save(&vertical_gradient(), &dir.path().join("c.png"));

    let report = scan(dir.path(), &EngineConfig::default()).unwrap();

    assert_eq!(report.groups.len(), 1, "exact copies must not also form a similar group");
    let group = &report.groups[0];
    assert_eq!(group.kind(), GroupKind::Exact);
    assert_eq!(group.len(), 2);

    let size = std::fs::metadata(dir.path().join("a.png")).unwrap().len();
    assert_eq!(report.stats.total_files, 3);
    assert_eq!(report.stats.processed_files, 3);
    assert_eq!(report.stats.duplicate_groups, 1);
    assert_eq!(report.stats.files_to_delete, 1);
    assert_eq!(report.stats.space_saved, size);
    assert!(report.unavailable.is_empty());
}

#[test]
fn test_exact_members_never_join_a_similar_group() {
    let dir = TempDir::new().unwrap();
    save(&horizontal_gradient(), &dir.path().join("a.png"));
    std::fs::copy(dir.path().join("a.png"), dir.path().join("b.png")).unwrap();
    let mut near = horizontal_gradient();
    near.put_pixel(0, 0, Rgb([9, 9, 9]));
    save(&near, &dir.path().join("c.bmp"));

    let report = scan(dir.path(), &EngineConfig::default()).unwrap();

    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.groups[0].kind(), GroupKind::Exact);
    let names: Vec<String> = report.groups[0].members().iter().map(|m| file_name(&m.path)).collect();
    assert_eq!(names, vec!["a.png", "b.png"]);
    assert_eq!(report.stats.total_files, 3);
}

#[test]
fn test_near_identical_images_form_similar_group() {
    let dir = TempDir::new().unwrap();
    let original = horizontal_gradient();
    let mut touched = original.clone();
    touched.put_pixel(0, 0, Rgb([255, 255, 255]));

    save(&original, &dir.path().join("photo.png"));
    save(&touched, &dir.path().join("photo_edit.png"));
    save(&vertical_gradient(), &dir.path().join("other.png"));

    let report = scan(dir.path(), &EngineConfig::default()).unwrap();

    assert_eq!(report.groups.len(), 1);
    let group = &report.groups[0];
    assert_eq!(group.kind(), GroupKind::Similar);

    let mut names: Vec<_> = group.members().iter().map(|m| file_name(&m.path)).collect();
    names.sort();
    assert_eq!(names, vec!["photo.png", "photo_edit.png"]);

    // Largest file is kept
    assert!(group.delete().iter().all(|m| m.size_bytes <= group.keep().size_bytes));
    assert_eq!(report.stats.space_saved, group.delete()[0].size_bytes);
}

#[test]
fn test_empty_directory() {
    let dir = TempDir::new().unwrap();

    let report = scan(dir.path(), &EngineConfig::default()).unwrap();

    assert!(report.groups.is_empty());
    assert_eq!(report.stats.total_files, 0);
    assert_eq!(report.stats.processed_files, 0);
    assert_eq!(report.stats.duplicate_groups, 0);
    assert_eq!(report.stats.files_to_delete, 0);
    assert_eq!(report.stats.space_saved, 0);
    assert!(!report.cancelled);
}

#[test]
fn test_missing_directory_is_rejected() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope");

    let err = scan(&missing, &EngineConfig::default()).unwrap_err();
    assert!(matches!(err, DedupError::InvalidDirectory { .. }));
    assert!(err.to_string().contains("does not exist"));
}

#[test]
fn test_corrupt_image_is_reported_not_fatal() {
    let dir = TempDir::new().unwrap();
    save(&horizontal_gradient(), &dir.path().join("good.png"));
    std::fs::write(dir.path().join("broken.png"), b"definitely not a png").unwrap();

    let report = scan(dir.path(), &EngineConfig::default()).unwrap();

    assert_eq!(report.stats.total_files, 2);
    assert_eq!(report.unavailable.len(), 1);
    assert!(report.unavailable[0].path.ends_with("broken.png"));
    assert!(report.groups.is_empty());
}

#[test]
fn test_non_image_files_are_ignored() {
    let dir = TempDir::new().unwrap();
    save(&horizontal_gradient(), &dir.path().join("a.png"));
    std::fs::write(dir.path().join("notes.txt"), b"hello").unwrap();
    std::fs::write(dir.path().join("notes_copy.txt"), b"hello").unwrap();

    let report = scan(dir.path(), &EngineConfig::default()).unwrap();

    assert_eq!(report.stats.total_files, 1);
    assert!(report.groups.is_empty());
}

#[test]
fn test_nested_directories_are_scanned() {
    let dir = TempDir::new().unwrap();
    let nested = dir.path().join("2024").join("trip");
    std::fs::create_dir_all(&nested).unwrap();
    save(&horizontal_gradient(), &dir.path().join("a.png"));
    std::fs::copy(dir.path().join("a.png"), nested.join("a.png")).unwrap();

    let report = scan(dir.path(), &EngineConfig::default()).unwrap();

    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.groups[0].kind(), GroupKind::Exact);
}

#[test]
fn test_cancelled_scan_reports_no_groups() {
    let dir = TempDir::new().unwrap();
    save(&horizontal_gradient(), &dir.path().join("a.png"));
    std::fs::copy(dir.path().join("a.png"), dir.path().join("b.png")).unwrap();

    let cancel = CancelToken::new();
    cancel.cancel();
    let report =
        scan_with_progress(dir.path(), &EngineConfig::default(), &|_, _| {}, &cancel).unwrap();

    assert!(report.cancelled);
    assert!(report.groups.is_empty());
    assert_eq!(report.stats.duplicate_groups, 0);
}

#[test]
fn test_progress_reaches_total() {
    let dir = TempDir::new().unwrap();
    for name in ["a.png", "b.png", "c.png"] {
        save(&horizontal_gradient(), &dir.path().join(name));
    }

    let seen = std::sync::Mutex::new(Vec::new());
    let progress = |done: usize, total: usize| seen.lock().unwrap().push((done, total));
    scan_with_progress(dir.path(), &EngineConfig::default(), &progress, &CancelToken::new()).unwrap();

    let seen = seen.into_inner().unwrap();
    assert_eq!(seen.len(), 3);
    assert!(seen.iter().all(|&(_, total)| total == 3));
    assert_eq!(seen.iter().map(|&(done, _)| done).max(), Some(3));
}

#[test]
fn test_repeated_scans_agree() {
    let dir = TempDir::new().unwrap();
    save(&horizontal_gradient(), &dir.path().join("a.png"));
    std::fs::copy(dir.path().join("a.png"), dir.path().join("b.png")).unwrap();
    let mut touched = vertical_gradient();
    touched.put_pixel(1, 1, Rgb([200, 0, 0]));
    save(&vertical_gradient(), &dir.path().join("v1.png"));
    save(&touched, &dir.path().join("v2.png"));

    let config = EngineConfig::default();
    let first = scan(dir.path(), &config).unwrap();
    let second = scan(dir.path(), &config).unwrap();

    assert_eq!(first.groups, second.groups);
    assert_eq!(first.stats, second.stats);
    assert_eq!(first.groups[0].kind(), GroupKind::Exact);
    assert_eq!(first.groups[1].kind(), GroupKind::Similar);
}

#[test]
fn test_single_worker_matches_default_pool() {
    let dir = TempDir::new().unwrap();
    save(&horizontal_gradient(), &dir.path().join("a.png"));
    std::fs::copy(dir.path().join("a.png"), dir.path().join("b.png")).unwrap();
    save(&vertical_gradient(), &dir.path().join("c.png"));

    let single = EngineConfig {
        workers: 1,
        ..EngineConfig::default()
    };
    let a = scan(dir.path(), &single).unwrap();
    let b = scan(dir.path(), &EngineConfig::default()).unwrap();

    assert_eq!(a.groups, b.groups);
}
