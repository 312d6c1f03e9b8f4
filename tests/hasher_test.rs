use image::{Rgb, RgbImage};
use std::collections::BTreeSet;
use tempfile::TempDir;

use imgdedup::duplicates::hasher;
use imgdedup::duplicates::perceptual::{perceptual_fingerprint, AverageHasher};
use imgdedup::duplicates::walker;

fn extensions() -> BTreeSet<String> {
    ["png", "jpg", "jpeg"].iter().map(|e| e.to_string()).collect()
}

#[test]
fn test_exact_fingerprint_identical_files() {
    let dir = TempDir::new().unwrap();
    let content = b"Hello, imgdedup! This is test content for hashing.";

    let file1 = dir.path().join("file1.png");
    let file2 = dir.path().join("file2.png");
    std::fs::write(&file1, content).unwrap();
    std::fs::write(&file2, content).unwrap();

    let hash1 = hasher::exact_fingerprint(&file1).unwrap();
    let hash2 = hasher::exact_fingerprint(&file2).unwrap();

    assert_eq!(hash1, hash2, "Identical files should produce identical digests");
}

#[test]
fn test_exact_fingerprint_differs_past_first_chunk() {
    let dir = TempDir::new().unwrap();

    // Same first 64KB, different after
    let mut content1 = vec![0u8; 100_000];
    let content2 = vec![0u8; 100_000];
    content1[90_000] = 0xFF;

    let file1 = dir.path().join("file1.bin");
    let file2 = dir.path().join("file2.bin");
    std::fs::write(&file1, &content1).unwrap();
    std::fs::write(&file2, &content2).unwrap();

    let h1 = hasher::exact_fingerprint(&file1).unwrap();
    let h2 = hasher::exact_fingerprint(&file2).unwrap();
    assert_ne!(h1, h2);
}

#[test]
fn test_exact_fingerprint_of_empty_file() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("empty.png");
    std::fs::write(&file, b"").unwrap();

    let digest = hasher::exact_fingerprint(&file).unwrap();
    // SHA-256 of the empty string
    assert_eq!(
        digest.as_str(),
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );
}

#[test]
fn test_exact_fingerprint_nonexistent_file() {
    let result = hasher::exact_fingerprint(std::path::Path::new("/nonexistent/file.png"));
    let err = result.unwrap_err();
    assert!(err.path.ends_with("file.png"));
}

#[test]
fn test_perceptual_fingerprint_ignores_encoding() {
    let dir = TempDir::new().unwrap();
    let img = RgbImage::from_fn(48, 48, |x, y| {
        let v = ((x + y) * 2) as u8;
        Rgb([v, v / 2, 255 - v])
    });
    let png = dir.path().join("shot.png");
    let bmp = dir.path().join("shot.bmp");
    img.save(&png).unwrap();
    img.save(&bmp).unwrap();

    let hasher = AverageHasher::new();
    let a = perceptual_fingerprint(&png, &hasher).unwrap();
    let b = perceptual_fingerprint(&bmp, &hasher).unwrap();

    assert_eq!(a.distance(&b), 0);
    assert_ne!(
        hasher::exact_fingerprint(&png).unwrap(),
        hasher::exact_fingerprint(&bmp).unwrap()
    );
}

#[test]
fn test_perceptual_fingerprint_rejects_garbage() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("broken.jpg");
    std::fs::write(&file, b"\xFF\xD8 truncated").unwrap();

    assert!(perceptual_fingerprint(&file, &AverageHasher::new()).is_err());
}

#[test]
fn test_enumerate_images_filters_and_sorts() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir(dir.path().join("sub")).unwrap();
    std::fs::write(dir.path().join("b.PNG"), b"x").unwrap();
    std::fs::write(dir.path().join("a.jpg"), b"x").unwrap();
    std::fs::write(dir.path().join("sub").join("c.jpeg"), b"x").unwrap();
    std::fs::write(dir.path().join("readme.md"), b"x").unwrap();

    let files = walker::enumerate_images(dir.path(), &extensions()).unwrap();
    let names: Vec<_> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();

    assert_eq!(names, vec!["a.jpg", "b.PNG", "c.jpeg"]);
}

#[test]
fn test_enumerate_images_rejects_file_root() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("a.png");
    std::fs::write(&file, b"x").unwrap();

    assert!(walker::enumerate_images(&file, &extensions()).is_err());
}
