//! Orchestrates the full backup-model build.
//!
//! Every failure is converted into a `BackupModelResult` carrying a message
//! for the host UI; no error kind escapes this entry point.

use std::path::Path;

use thiserror::Error;
use tracing::{info, warn};

use crate::db::{self, DbError};
use crate::model::{BackupMetadata, BackupModel, BackupModelResult, SourceDevice};
use crate::plists::{self, PlistError};

#[derive(Debug, Error)]
enum BuildError {
    #[error("Failed loading device info: {0}")]
    DeviceInfo(PlistError),

    #[error("Failed reading backup manifest: {0}")]
    Manifest(PlistError),

    #[error("Backup is encrypted; encrypted backups are not supported")]
    Encrypted,

    #[error(transparent)]
    Db(#[from] DbError),
}

/// Build the consolidated model of the backup rooted at `backup_root`.
pub fn build_backup_model(backup_root: &Path) -> BackupModelResult {
    match build_model(backup_root) {
        Ok(model) => BackupModelResult::ok(model),
        Err(e) => {
            warn!("Backup model build failed: {}", e);
            BackupModelResult::err(e.to_string())
        }
    }
}

fn build_model(backup_root: &Path) -> Result<BackupModel, BuildError> {
    let info = plists::read_device_info(backup_root).map_err(BuildError::DeviceInfo)?;

    let is_encrypted =
        plists::read_encryption_status(backup_root).map_err(BuildError::Manifest)?;
    if is_encrypted {
        return Err(BuildError::Encrypted);
    }

    let source_device = SourceDevice {
        name: info.device_name,
        model: info.product_type,
        ios_version: info.product_version,
    };

    // Phase one: resolve the catalog location. The manifest connection
    // opened inside is closed before phase two begins.
    let photos_db_path = db::photos_sqlite_path(backup_root)?;

    // Phase two: both databases open together for the duration of the build.
    let photos_conn = db::open_read_only(&photos_db_path)?;
    let manifest_conn = db::open_read_only(&backup_root.join("Manifest.db"))?;

    let join = db::discover_join_table(&photos_conn)?;
    let albums = db::read_user_albums(&photos_conn)?;
    let rows = db::read_asset_rows(&photos_conn)?;
    let membership = db::read_album_memberships(&photos_conn, &join)?;
    let assets = db::build_assets(rows, &membership, backup_root, &manifest_conn)?;

    info!(
        "Backup model built: {} assets, {} albums (device {})",
        assets.len(),
        albums.len(),
        source_device.model
    );

    Ok(BackupModel {
        backup_metadata: BackupMetadata {
            backup_uuid: info.guid,
            backup_date: info.last_backup_date,
            is_encrypted: false,
            source_device,
        },
        assets,
        albums,
    })
}
