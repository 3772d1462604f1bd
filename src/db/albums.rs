//! Reads user albums from ZGENERICALBUM.

use rusqlite::Connection;

use super::DbError;
use crate::model::{Album, AlbumType, SortOrder};

struct AlbumRow {
    uuid: String,
    title: Option<String>,
    custom_sort_key: Option<i64>,
    custom_sort_ascending: Option<i64>,
    cached_count: Option<i64>,
}

/// Sort-order rule: a non-zero ZCUSTOMSORTKEY means the user dragged the
/// album into a manual order; otherwise a non-null ZCUSTOMSORTASCENDING
/// means date order.
fn sort_order(row: &AlbumRow) -> SortOrder {
    if matches!(row.custom_sort_key, Some(key) if key != 0) {
        SortOrder::Manual
    } else if row.custom_sort_ascending.is_some() {
        SortOrder::Date
    } else {
        SortOrder::None
    }
}

/// Return all user albums (ZKIND = 2), ordered by title.
pub fn read_user_albums(conn: &Connection) -> Result<Vec<Album>, DbError> {
    let sql = "SELECT
            ZUUID,
            ZTITLE,
            ZCUSTOMSORTKEY,
            ZCUSTOMSORTASCENDING,
            ZCACHEDCOUNT
        FROM ZGENERICALBUM
        WHERE ZKIND = 2
        ORDER BY ZTITLE";

    let mut stmt = conn.prepare(sql).map_err(|e| DbError::query(sql, e))?;
    let rows = stmt
        .query_map([], |row| {
            Ok(AlbumRow {
                uuid: row.get(0)?,
                title: row.get(1)?,
                custom_sort_key: row.get(2)?,
                custom_sort_ascending: row.get(3)?,
                cached_count: row.get(4)?,
            })
        })
        .map_err(|e| DbError::query(sql, e))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| DbError::query(sql, e))?;

    let albums = rows
        .into_iter()
        .map(|row| Album {
            sort_order: sort_order(&row),
            album_uuid: row.uuid,
            title: row.title.unwrap_or_default(),
            album_type: AlbumType::User,
            asset_count: row.cached_count.unwrap_or(0),
        })
        .collect();

    Ok(albums)
}
