//! Filesystem primitives for the extraction engine.
//!
//! All placements go through `resolve_free_name` so two assets with the
//! same filename never overwrite each other.

use std::fs::{self, File, FileTimes};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, UNIX_EPOCH};

use chrono::{DateTime, NaiveDateTime};

use crate::model::Asset;

/// Idempotent mkdir -p.
pub fn ensure_folder_exists(path: &Path) -> io::Result<()> {
    fs::create_dir_all(path)
}

/// If `name` is taken in `folder`, append `_1`, `_2`, ... before the
/// extension until the name is free.
pub fn resolve_free_name(folder: &Path, name: &str) -> String {
    if !folder.join(name).exists() {
        return name.to_string();
    }

    let path = Path::new(name);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut counter = 1;
    loop {
        let candidate = format!("{stem}_{counter}{ext}");
        if !folder.join(&candidate).exists() {
            return candidate;
        }
        counter += 1;
    }
}

/// Copy a file into a folder under a collision-free name and restore its
/// modification time from the asset.
pub fn copy_file(
    src: &Path,
    dest_folder: &Path,
    dest_name: &str,
    asset: &Asset,
) -> io::Result<PathBuf> {
    ensure_folder_exists(dest_folder)?;
    let free_name = resolve_free_name(dest_folder, dest_name);
    let dest_path = dest_folder.join(free_name);
    fs::copy(src, &dest_path)?;
    set_file_times(&dest_path, &asset.modification_date)?;
    Ok(dest_path)
}

/// Move a folder under `dest_parent`, keeping its name (collision-suffixed
/// if taken). Returns the folder's new path.
pub fn move_folder(src_folder: &Path, dest_parent: &Path) -> io::Result<PathBuf> {
    ensure_folder_exists(dest_parent)?;
    let dest_folder = dest_parent.join(free_folder_name(src_folder, dest_parent)?);

    if fs::rename(src_folder, &dest_folder).is_err() {
        // Cross-filesystem move: copy the tree, then delete the original
        copy_dir_recursive(src_folder, &dest_folder)?;
        fs::remove_dir_all(src_folder)?;
    }

    Ok(dest_folder)
}

/// Copy a folder under `dest_parent`, keeping its name (collision-suffixed
/// if taken). Returns the copy's path.
pub fn copy_folder(src_folder: &Path, dest_parent: &Path) -> io::Result<PathBuf> {
    ensure_folder_exists(dest_parent)?;
    let dest_folder = dest_parent.join(free_folder_name(src_folder, dest_parent)?);
    copy_dir_recursive(src_folder, &dest_folder)?;
    Ok(dest_folder)
}

/// Place a symbolic link to `src` inside `dest_folder`.
pub fn place_symlink(src: &Path, dest_folder: &Path) -> io::Result<()> {
    ensure_folder_exists(dest_folder)?;
    let name = file_name_of(src)?;
    let dest_path = dest_folder.join(resolve_free_name(dest_folder, &name));
    symlink_file(src, &dest_path)
}

/// Place a symbolic link to `src_folder` inside `dest_folder`.
pub fn place_folder_symlink(src_folder: &Path, dest_folder: &Path) -> io::Result<()> {
    ensure_folder_exists(dest_folder)?;
    let name = file_name_of(src_folder)?;
    let dest_path = dest_folder.join(resolve_free_name(dest_folder, &name));
    symlink_dir(src_folder, &dest_path)
}

fn file_name_of(path: &Path) -> io::Result<String> {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))
}

fn free_folder_name(src: &Path, dest_parent: &Path) -> io::Result<String> {
    Ok(resolve_free_name(dest_parent, &file_name_of(src)?))
}

fn copy_dir_recursive(src: &Path, dest: &Path) -> io::Result<()> {
    fs::create_dir_all(dest)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let target = dest.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_recursive(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

#[cfg(unix)]
fn symlink_file(src: &Path, dest: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(src, dest)
}

#[cfg(unix)]
fn symlink_dir(src: &Path, dest: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(src, dest)
}

#[cfg(windows)]
fn symlink_file(src: &Path, dest: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(src, dest)
}

#[cfg(windows)]
fn symlink_dir(src: &Path, dest: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_dir(src, dest)
}

/// Parse the asset's modification date; unparseable dates fall back to the
/// Unix epoch.
fn modification_epoch(value: &str) -> i64 {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return dt.timestamp();
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return naive.and_utc().timestamp();
    }
    0
}

fn set_file_times(path: &Path, modification_date: &str) -> io::Result<()> {
    let epoch = modification_epoch(modification_date).max(0) as u64;
    let time = UNIX_EPOCH + Duration::from_secs(epoch);

    let file = File::options().write(true).open(path)?;
    file.set_times(FileTimes::new().set_accessed(time).set_modified(time))
}
