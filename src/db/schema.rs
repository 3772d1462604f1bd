//! Discovers the iOS-version-dependent pieces of the Photos.sqlite schema.
//!
//! The album-to-asset join table is named `Z_<n>ASSETS` (e.g. `Z_26ASSETS`,
//! `Z_33ASSETS`) and both the table number and its column numbers change
//! across iOS releases, so they must be discovered at runtime.

use rusqlite::Connection;
use tracing::debug;

use super::DbError;

/// The discovered join table and its foreign-key columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinTableInfo {
    pub table: String,
    pub album_fk: String,
    pub asset_fk: String,
    pub sort_col: String,
}

fn list_tables(conn: &Connection) -> Result<Vec<String>, DbError> {
    let sql = "SELECT name FROM sqlite_master WHERE type='table'";

    let mut stmt = conn.prepare(sql).map_err(|e| DbError::query(sql, e))?;
    let tables = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .map_err(|e| DbError::query(sql, e))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| DbError::query(sql, e))?;

    Ok(tables)
}

fn table_columns(conn: &Connection, table: &str) -> Result<Vec<String>, DbError> {
    let sql = format!("PRAGMA table_info({table})");

    let mut stmt = conn.prepare(&sql).map_err(|e| DbError::query(&sql, e))?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))
        .map_err(|e| DbError::query(&sql, e))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| DbError::query(&sql, e))?;

    Ok(columns)
}

/// Find the album-to-asset join table and identify its columns.
pub fn discover_join_table(conn: &Connection) -> Result<JoinTableInfo, DbError> {
    let tables = list_tables(conn)?;

    let table = tables
        .iter()
        .find(|t| t.starts_with("Z_") && t.contains("ASSET") && t.as_str() != "ZASSET")
        .cloned()
        .ok_or_else(|| {
            DbError::UnsupportedSchema(
                "could not find the album-to-asset join table; the backup may be \
                 from an unsupported iOS version"
                    .to_string(),
            )
        })?;

    let cols = table_columns(conn, &table)?;
    let unsupported = || {
        DbError::UnsupportedSchema(format!(
            "could not identify expected columns in {table}; found columns: {cols:?}"
        ))
    };

    let album_fk = cols
        .iter()
        .find(|c| c.ends_with("ALBUMS"))
        .cloned()
        .ok_or_else(unsupported)?;
    let asset_fk = cols
        .iter()
        .find(|c| c.ends_with("ASSETS") && !c.starts_with("Z_FOK"))
        .cloned()
        .ok_or_else(unsupported)?;
    let sort_col = cols
        .iter()
        .find(|c| c.starts_with("Z_FOK"))
        .cloned()
        .ok_or_else(unsupported)?;

    debug!(
        "Discovered join table {} ({}, {}, {})",
        table, album_fk, asset_fk, sort_col
    );

    Ok(JoinTableInfo {
        table,
        album_fk,
        asset_fk,
        sort_col,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discovers_ios17_join_table() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE ZASSET (Z_PK INTEGER);
             CREATE TABLE Z_33ASSETS (
                 Z_33ALBUMS INTEGER,
                 Z_3ASSETS INTEGER,
                 Z_FOK_3ASSETS INTEGER
             );",
        )
        .unwrap();

        let info = discover_join_table(&conn).unwrap();
        assert_eq!(info.table, "Z_33ASSETS");
        assert_eq!(info.album_fk, "Z_33ALBUMS");
        assert_eq!(info.asset_fk, "Z_3ASSETS");
        assert_eq!(info.sort_col, "Z_FOK_3ASSETS");
    }

    #[test]
    fn test_zasset_itself_is_not_a_join_table() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE ZASSET (Z_PK INTEGER);").unwrap();

        let err = discover_join_table(&conn).unwrap_err();
        assert!(matches!(err, DbError::UnsupportedSchema(_)));
    }

    #[test]
    fn test_missing_sort_column_is_unsupported() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE Z_26ASSETS (Z_26ALBUMS INTEGER, Z_34ASSETS INTEGER);",
        )
        .unwrap();

        let err = discover_join_table(&conn).unwrap_err();
        match err {
            DbError::UnsupportedSchema(msg) => assert!(msg.contains("Z_26ASSETS")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
