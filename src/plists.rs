//! Readers for the two property lists at the root of an iPhone backup.
//!
//! `Info.plist` carries the device portions of the model, `Manifest.plist`
//! carries the encryption status. Both may be binary or XML; the plist
//! crate detects the encoding.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use plist::{Dictionary, Value};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while reading backup property lists
#[derive(Debug, Error)]
pub enum PlistError {
    #[error("Property list not found: {0}")]
    NotFound(PathBuf),

    #[error("Malformed property list {path}: {reason}")]
    Malformed { path: PathBuf, reason: String },

    #[error("Missing key '{key}' in {path}")]
    KeyMissing { key: String, path: PathBuf },
}

/// Device fields read from Info.plist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub device_name: String,
    pub product_type: String,
    pub product_version: String,
    pub guid: String,
    /// "Last Backup Date", rendered as ISO-8601 without offset.
    pub last_backup_date: String,
}

fn load_dictionary(path: &Path) -> Result<Dictionary, PlistError> {
    if !path.exists() {
        return Err(PlistError::NotFound(path.to_path_buf()));
    }

    debug!("Reading property list: {}", path.display());

    let value = Value::from_file(path).map_err(|e| PlistError::Malformed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    value
        .into_dictionary()
        .ok_or_else(|| PlistError::Malformed {
            path: path.to_path_buf(),
            reason: "root element is not a dictionary".to_string(),
        })
}

fn get_string(dict: &Dictionary, key: &str, path: &Path) -> Result<String, PlistError> {
    dict.get(key)
        .and_then(Value::as_string)
        .map(str::to_string)
        .ok_or_else(|| PlistError::KeyMissing {
            key: key.to_string(),
            path: path.to_path_buf(),
        })
}

/// Read a plist date and render it ISO-8601 (no offset, second precision),
/// e.g. "2026-01-21T11:38:37". String values pass through untouched.
fn get_date(dict: &Dictionary, key: &str, path: &Path) -> Result<String, PlistError> {
    let value = dict.get(key).ok_or_else(|| PlistError::KeyMissing {
        key: key.to_string(),
        path: path.to_path_buf(),
    })?;

    match value {
        Value::Date(date) => {
            let system_time = SystemTime::from(*date);
            let dt: DateTime<Utc> = system_time.into();
            Ok(dt.format("%Y-%m-%dT%H:%M:%S").to_string())
        }
        Value::String(s) => Ok(s.clone()),
        _ => Err(PlistError::KeyMissing {
            key: key.to_string(),
            path: path.to_path_buf(),
        }),
    }
}

/// Read the device fields of the model from `<backup_root>/Info.plist`.
pub fn read_device_info(backup_root: &Path) -> Result<DeviceInfo, PlistError> {
    let path = backup_root.join("Info.plist");
    let dict = load_dictionary(&path)?;

    Ok(DeviceInfo {
        device_name: get_string(&dict, "Device Name", &path)?,
        product_type: get_string(&dict, "Product Type", &path)?,
        product_version: get_string(&dict, "Product Version", &path)?,
        guid: get_string(&dict, "GUID", &path)?,
        last_backup_date: get_date(&dict, "Last Backup Date", &path)?,
    })
}

/// Read the encryption status from `<backup_root>/Manifest.plist`.
pub fn read_encryption_status(backup_root: &Path) -> Result<bool, PlistError> {
    let path = backup_root.join("Manifest.plist");
    let dict = load_dictionary(&path)?;

    dict.get("IsEncrypted")
        .and_then(Value::as_boolean)
        .ok_or_else(|| PlistError::KeyMissing {
            key: "IsEncrypted".to_string(),
            path,
        })
}
