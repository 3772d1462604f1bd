//! Resolves logical backup paths to content-addressed files via Manifest.db.

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension};

use super::{open_read_only, DbError};

const PHOTOS_SQLITE_RELATIVE_PATH: &str = "Media/PhotoData/Photos.sqlite";

/// Look up the 40-hex fileID for a logical backup-relative path.
pub fn file_id_for_path(conn: &Connection, relative_path: &str) -> Result<String, DbError> {
    let sql = "SELECT fileID FROM Files WHERE relativePath = ?1";

    let file_id: Option<String> = conn
        .query_row(sql, params![relative_path], |row| row.get(0))
        .optional()
        .map_err(|e| DbError::query(sql, e))?;

    file_id.ok_or_else(|| DbError::ManifestMiss(relative_path.to_string()))
}

/// On-disk location of a content-addressed payload:
/// `<backup_root>/<fileID[0:2]>/<fileID>`.
pub fn hashed_path(backup_root: &Path, file_id: &str) -> PathBuf {
    backup_root.join(&file_id[..2]).join(file_id)
}

/// Locate Photos.sqlite inside the backup.
///
/// Opens Manifest.db in its own scope and closes it before returning, so
/// the model build can reopen the manifest without a lingering connection.
pub fn photos_sqlite_path(backup_root: &Path) -> Result<PathBuf, DbError> {
    let conn = open_read_only(&backup_root.join("Manifest.db"))?;
    let file_id = file_id_for_path(&conn, PHOTOS_SQLITE_RELATIVE_PATH)?;
    Ok(hashed_path(backup_root, &file_id))
}
