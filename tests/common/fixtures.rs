//! Manifest fixtures on disk

use super::constants::*;
use anyhow::Result;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Creates a temporary manifest directory with two valid manifests, one
/// malformed manifest and a non-manifest file.
/// Returns (temp_dir, manifests_dir)
pub fn create_test_manifests() -> Result<(TempDir, PathBuf)> {
    let dir = TempDir::new()?;
    let manifests_dir = dir.path().join("manifests");
    fs::create_dir_all(&manifests_dir)?;

    fs::write(manifests_dir.join("01-scifi.yml"), SCIFI_MANIFEST)?;
    fs::write(manifests_dir.join("02-directors.yaml"), DIRECTORS_MANIFEST)?;
    fs::write(manifests_dir.join("03-broken.yml"), BROKEN_MANIFEST)?;
    fs::write(manifests_dir.join("notes.txt"), "not a manifest")?;

    Ok((dir, manifests_dir))
}
