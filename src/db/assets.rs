//! Reads assets from ZASSET and maps rows into the domain model.

use std::collections::HashMap;
use std::path::Path;

use chrono::DateTime;
use rusqlite::Connection;
use tracing::{debug, info};

use super::manifest::{file_id_for_path, hashed_path};
use super::schema::JoinTableInfo;
use super::DbError;
use crate::model::{Asset, AssetSubtype, Flags, MediaType, Relationships};

/// Seconds between Unix epoch (1970-01-01) and Apple epoch (2001-01-01).
const APPLE_EPOCH_OFFSET: i64 = 978_307_200;

/// One row of the ZASSET / ZADDITIONALASSETATTRIBUTES join, typed per the
/// catalog DDL (nullable where the DDL allows NULL).
pub struct AssetRow {
    pub pk: i64,
    pub uuid: String,
    pub filename: Option<String>,
    pub directory: Option<String>,
    pub uti: Option<String>,
    pub date_created: Option<f64>,
    pub modification_date: Option<f64>,
    pub kind: Option<i64>,
    pub kind_subtype: Option<i64>,
    pub favorite: Option<i64>,
    pub hidden: Option<i64>,
    pub trashed_state: Option<i64>,
    pub avalanche_uuid: Option<String>,
    pub avalanche_pick_type: Option<i64>,
    pub media_group_uuid: Option<String>,
    pub original_filename: Option<String>,
}

/// Convert an Apple-epoch timestamp to an ISO 8601 UTC string.
fn apple_epoch_to_iso(apple_time: Option<f64>) -> String {
    let Some(apple_time) = apple_time else {
        return String::new();
    };
    let unix_time = apple_time as i64 + APPLE_EPOCH_OFFSET;
    DateTime::from_timestamp(unix_time, 0)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_default()
}

fn media_type(kind: Option<i64>) -> MediaType {
    match kind {
        Some(1) => MediaType::Video,
        _ => MediaType::Photo,
    }
}

fn subtype(kind_subtype: Option<i64>) -> AssetSubtype {
    match kind_subtype {
        Some(2) => AssetSubtype::LivePhotoStill,
        Some(4) => AssetSubtype::LivePhotoVideo,
        Some(8) => AssetSubtype::Screenshot,
        Some(16) => AssetSubtype::Portrait,
        Some(32) => AssetSubtype::Panorama,
        Some(64) => AssetSubtype::SloMo,
        Some(128) => AssetSubtype::TimeLapse,
        Some(768) => AssetSubtype::BurstFrame,
        _ => AssetSubtype::Standard,
    }
}

fn file_extension(original_filename: &str) -> String {
    Path::new(original_filename)
        .extension()
        .map(|ext| ext.to_string_lossy().to_uppercase())
        .unwrap_or_default()
}

/// Return every asset row, joined with its additional attributes.
pub fn read_asset_rows(conn: &Connection) -> Result<Vec<AssetRow>, DbError> {
    let sql = "SELECT
            ZASSET.Z_PK,
            ZASSET.ZUUID,
            ZASSET.ZFILENAME,
            ZASSET.ZDIRECTORY,
            ZASSET.ZUNIFORMTYPEIDENTIFIER,
            ZASSET.ZDATECREATED,
            ZASSET.ZMODIFICATIONDATE,
            ZASSET.ZKIND,
            ZASSET.ZKINDSUBTYPE,
            ZASSET.ZFAVORITE,
            ZASSET.ZHIDDEN,
            ZASSET.ZTRASHEDSTATE,
            ZASSET.ZAVALANCHEUUID,
            ZASSET.ZAVALANCHEPICKTYPE,
            ZASSET.ZMEDIAGROUPUUID,
            ZADDITIONALASSETATTRIBUTES.ZORIGINALFILENAME
        FROM ZASSET
        LEFT JOIN ZADDITIONALASSETATTRIBUTES
            ON ZADDITIONALASSETATTRIBUTES.ZASSET = ZASSET.Z_PK";

    let mut stmt = conn.prepare(sql).map_err(|e| DbError::query(sql, e))?;
    let rows = stmt
        .query_map([], |row| {
            Ok(AssetRow {
                pk: row.get(0)?,
                uuid: row.get(1)?,
                filename: row.get(2)?,
                directory: row.get(3)?,
                uti: row.get(4)?,
                date_created: row.get(5)?,
                modification_date: row.get(6)?,
                kind: row.get(7)?,
                kind_subtype: row.get(8)?,
                favorite: row.get(9)?,
                hidden: row.get(10)?,
                trashed_state: row.get(11)?,
                avalanche_uuid: row.get(12)?,
                avalanche_pick_type: row.get(13)?,
                media_group_uuid: row.get(14)?,
                original_filename: row.get(15)?,
            })
        })
        .map_err(|e| DbError::query(sql, e))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| DbError::query(sql, e))?;

    Ok(rows)
}

/// Build the asset-pk-to-album-uuids lookup from the discovered join table.
///
/// Precomputed once so asset construction never queries per asset.
pub fn read_album_memberships(
    conn: &Connection,
    join: &JoinTableInfo,
) -> Result<HashMap<i64, Vec<String>>, DbError> {
    let sql = format!(
        "SELECT
            {table}.{asset_fk} AS asset_pk,
            ZGENERICALBUM.ZUUID AS album_uuid
        FROM {table}
        JOIN ZGENERICALBUM
            ON ZGENERICALBUM.Z_PK = {table}.{album_fk}
        WHERE ZGENERICALBUM.ZKIND = 2
        ORDER BY {table}.{asset_fk}, {table}.{sort_col}",
        table = join.table,
        asset_fk = join.asset_fk,
        album_fk = join.album_fk,
        sort_col = join.sort_col,
    );

    let mut stmt = conn.prepare(&sql).map_err(|e| DbError::query(&sql, e))?;
    let pairs = stmt
        .query_map([], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
        })
        .map_err(|e| DbError::query(&sql, e))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| DbError::query(&sql, e))?;

    let mut lookup: HashMap<i64, Vec<String>> = HashMap::new();
    for (asset_pk, album_uuid) in pairs {
        lookup.entry(asset_pk).or_default().push(album_uuid);
    }

    Ok(lookup)
}

/// Convert raw rows into domain assets, resolving each file through
/// Manifest.db. Rows whose payload was purged from the backup are skipped
/// rather than failing the build.
pub fn build_assets(
    rows: Vec<AssetRow>,
    membership: &HashMap<i64, Vec<String>>,
    backup_root: &Path,
    manifest_conn: &Connection,
) -> Result<Vec<Asset>, DbError> {
    let total = rows.len();
    let mut assets = Vec::with_capacity(total);
    let mut skipped = 0usize;

    for row in rows {
        let original_filename = row
            .original_filename
            .or(row.filename)
            .unwrap_or_default();
        let directory = row.directory.unwrap_or_default();
        let relative_path = format!("Media/{directory}/{original_filename}");

        let file_id = match file_id_for_path(manifest_conn, &relative_path) {
            Ok(file_id) => file_id,
            Err(DbError::ManifestMiss(path)) => {
                debug!("Skipping asset not present in Manifest.db: {}", path);
                skipped += 1;
                continue;
            }
            Err(e) => return Err(e),
        };

        let flags = Flags {
            is_favorite: row.favorite.unwrap_or(0) != 0,
            is_hidden: row.hidden.unwrap_or(0) != 0,
            is_recently_deleted: row.trashed_state.unwrap_or(0) != 0,
            // Derived from smart-album membership, which the core never
            // queries; stays false.
            is_selfie: false,
        };

        let relationships = Relationships {
            user_albums: membership.get(&row.pk).cloned().unwrap_or_default(),
            burst_album: None,
            smart_folders: flags.smart_folders(),
        };

        assets.push(Asset {
            asset_uuid: row.uuid.clone(),
            local_identifier: row.uuid,
            file_extension: file_extension(&original_filename),
            original_filename,
            uti_type: row.uti.unwrap_or_default(),
            creation_date: apple_epoch_to_iso(row.date_created),
            modification_date: apple_epoch_to_iso(row.modification_date),
            timezone_offset: String::new(),
            backup_relative_path: hashed_path(backup_root, &file_id)
                .to_string_lossy()
                .into_owned(),
            backup_hashed_filename: file_id,
            media_type: media_type(row.kind),
            subtype: subtype(row.kind_subtype),
            live_photo_group_uuid: row.media_group_uuid,
            burst_uuid: row.avalanche_uuid,
            is_primary_burst_frame: row.avalanche_pick_type == Some(2),
            flags,
            relationships,
        });
    }

    info!(
        "Built {} assets ({} skipped, unresolvable in Manifest.db)",
        assets.len(),
        skipped
    );

    Ok(assets)
}
