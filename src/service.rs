//! Host-facing backup service.
//!
//! Holds the currently-loaded model in memory and formats device metadata
//! for display, bridging the host menu and the model builder.

use std::path::Path;

use tracing::info;

use crate::builder::build_backup_model;
use crate::model::{AlbumType, BackupModel};

/// Manages the state of the loaded backup in memory.
#[derive(Debug, Default)]
pub struct BackupService {
    current_model: Option<BackupModel>,
}

impl BackupService {
    pub fn new() -> Self {
        Self::default()
    }

    /// The fully-constructed model, once a backup has loaded successfully.
    pub fn model(&self) -> Option<&BackupModel> {
        self.current_model.as_ref()
    }

    /// Attempt to load the backup at `path`, replacing any previous model.
    /// Returns a success flag and a message for the host UI.
    pub fn load_backup(&mut self, path: &Path) -> (bool, String) {
        if path.as_os_str().is_empty() {
            return (false, "No folder selected. Please try again.".to_string());
        }

        let result = build_backup_model(path);
        if result.success {
            self.current_model = result.backup_model;
            info!("Backup loaded from {}", path.display());
            (true, "Backup loaded successfully!".to_string())
        } else {
            (
                false,
                format!(
                    "Error loading backup: {}",
                    result.error.unwrap_or_default()
                ),
            )
        }
    }

    /// Device and backup metadata formatted for display, or a placeholder
    /// when nothing is loaded.
    pub fn formatted_device_metadata(&self) -> String {
        let Some(model) = &self.current_model else {
            return "No backup loaded.".to_string();
        };

        let device = &model.backup_metadata.source_device;

        // "iPhone15,2" -> model "iPhone 15", submodel "2"
        let mut parts = device.model.splitn(2, ',');
        let raw_model = parts.next().unwrap_or_default();
        let formatted_model = raw_model.replace('e', "e ");
        let submodel = parts.next().unwrap_or_default();

        let metadata = &model.backup_metadata;
        let formatted_backup_date = metadata.backup_date.replace('T', " at (24H Time): ");

        format!(
            "Device:\n\
             - Device Name: ............ {}\n\
             - Device Model: ........... {}\n\
             - Device Submodel: ........ {}\n\
             - iOS Version: ............ {}\n\
             Backup:\n\
             - Backup Encryption Status: {}\n\
             - Backup UUID/GUID: ....... {}\n\
             - Backup Date: ............ {}",
            device.name,
            formatted_model,
            submodel,
            device.ios_version,
            metadata.is_encrypted,
            metadata.backup_uuid,
            formatted_backup_date,
        )
    }

    /// Titles of the user albums in the loaded backup, for building the
    /// whitelist. Empty when no backup is loaded.
    pub fn album_titles(&self) -> Vec<String> {
        self.current_model
            .as_ref()
            .map(|model| {
                model
                    .albums
                    .iter()
                    .filter(|album| album.album_type == AlbumType::User)
                    .map(|album| album.title.clone())
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Album, BackupMetadata, SortOrder, SourceDevice};

    fn loaded_service() -> BackupService {
        let model = BackupModel {
            backup_metadata: BackupMetadata {
                backup_uuid: "D7A5EB27206B918EB006E38E4B84C87F".to_string(),
                backup_date: "2026-01-21T11:38:37".to_string(),
                is_encrypted: false,
                source_device: SourceDevice {
                    name: "Test iPhone".to_string(),
                    model: "iPhone15,2".to_string(),
                    ios_version: "17.3.1".to_string(),
                },
            },
            assets: vec![],
            albums: vec![Album {
                album_uuid: "uuid-1".to_string(),
                title: "Vacation".to_string(),
                album_type: AlbumType::User,
                sort_order: SortOrder::None,
                asset_count: 3,
            }],
        };
        BackupService {
            current_model: Some(model),
        }
    }

    #[test]
    fn test_no_backup_loaded_message() {
        let service = BackupService::new();
        assert_eq!(service.formatted_device_metadata(), "No backup loaded.");
        assert!(service.album_titles().is_empty());
    }

    #[test]
    fn test_empty_path_rejected() {
        let mut service = BackupService::new();
        let (ok, message) = service.load_backup(Path::new(""));
        assert!(!ok);
        assert_eq!(message, "No folder selected. Please try again.");
    }

    #[test]
    fn test_load_failure_reports_error() {
        let mut service = BackupService::new();
        let tmp = tempfile::TempDir::new().unwrap();
        let (ok, message) = service.load_backup(tmp.path());
        assert!(!ok);
        assert!(message.starts_with("Error loading backup:"));
    }

    #[test]
    fn test_formatted_metadata() {
        let service = loaded_service();
        let text = service.formatted_device_metadata();
        assert!(text.contains("- Device Name: ............ Test iPhone"));
        assert!(text.contains("- Device Model: ........... iPhone 15"));
        assert!(text.contains("- Device Submodel: ........ 2"));
        assert!(text.contains("- iOS Version: ............ 17.3.1"));
        assert!(text.contains("2026-01-21 at (24H Time): 11:38:37"));
    }

    #[test]
    fn test_album_titles_from_model() {
        let service = loaded_service();
        assert_eq!(service.album_titles(), vec!["Vacation".to_string()]);
    }
}
