//! Temporary storage for converted files.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Move a converted file into a freshly-created temp directory and return
/// the stored path. Each conversion gets its own directory; none is reused.
pub fn store_temp_file(source: &Path) -> io::Result<PathBuf> {
    let temp_dir = tempfile::Builder::new()
        .prefix("photopull-convert-")
        .tempdir()?
        .keep();

    let file_name = source.file_name().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "converted file has no name")
    })?;

    let destination = temp_dir.join(file_name);
    move_file(source, &destination)?;
    Ok(destination)
}

/// Rename, falling back to copy-and-delete when the temp directory lives on
/// a different filesystem.
fn move_file(source: &Path, destination: &Path) -> io::Result<()> {
    if fs::rename(source, destination).is_err() {
        fs::copy(source, destination)?;
        fs::remove_file(source)?;
    }
    Ok(())
}
