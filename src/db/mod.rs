//! Read-only SQLite access for the two databases inside a backup.
//!
//! `Manifest.db` maps logical paths to content-addressed files and
//! `Photos.sqlite` is the Photos catalog. Both are opened read-only; the
//! backup is never written to.

mod albums;
mod assets;
mod manifest;
mod schema;

pub use albums::read_user_albums;
pub use assets::{build_assets, read_album_memberships, read_asset_rows, AssetRow};
pub use manifest::{file_id_for_path, hashed_path, photos_sqlite_path};
pub use schema::{discover_join_table, JoinTableInfo};

use std::path::{Path, PathBuf};

use rusqlite::{Connection, OpenFlags};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur when querying the backup databases
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Database file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to open database {path}: {source}")]
    Open {
        path: PathBuf,
        source: rusqlite::Error,
    },

    #[error("Query failed: {cause}\nQuery was: {sql}")]
    QueryFailed { sql: String, cause: rusqlite::Error },

    #[error("No file found in Manifest.db for path: {0}")]
    ManifestMiss(String),

    #[error("Unsupported Photos.sqlite schema: {0}")]
    UnsupportedSchema(String),
}

impl DbError {
    pub(crate) fn query(sql: &str, cause: rusqlite::Error) -> Self {
        DbError::QueryFailed {
            sql: sql.to_string(),
            cause,
        }
    }
}

/// Open a database read-only. The connection is scope-owned by the caller
/// and closed on drop.
pub fn open_read_only(path: &Path) -> Result<Connection, DbError> {
    if !path.exists() {
        return Err(DbError::NotFound(path.to_path_buf()));
    }

    debug!("Opening database read-only: {}", path.display());

    Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(|e| DbError::Open {
        path: path.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_missing_database() {
        let err = open_read_only(Path::new("/nonexistent/photos.sqlite")).unwrap_err();
        assert!(matches!(err, DbError::NotFound(_)));
    }

    #[test]
    fn test_open_read_only_rejects_writes() {
        let tmp = TempDir::new().unwrap();
        let db_path = tmp.path().join("test.sqlite");
        {
            let conn = Connection::open(&db_path).unwrap();
            conn.execute_batch("CREATE TABLE t (x INTEGER);").unwrap();
        }

        let conn = open_read_only(&db_path).unwrap();
        let result = conn.execute("INSERT INTO t (x) VALUES (1)", []);
        assert!(result.is_err());
    }
}
