//! Domain model for a parsed iPhone backup's Photos-app contents.

use serde::{Deserialize, Serialize};

/// Device information recorded alongside the backup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDevice {
    pub name: String,
    /// Raw product type, e.g. "iPhone15,2".
    pub model: String,
    pub ios_version: String,
}

/// Metadata of the backup itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupMetadata {
    pub backup_uuid: String,
    /// ISO-8601, as read from Info.plist's "Last Backup Date".
    pub backup_date: String,
    pub is_encrypted: bool,
    pub source_device: SourceDevice,
}

/// Per-asset flags that drive smart-folder membership.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flags {
    pub is_favorite: bool,
    pub is_hidden: bool,
    pub is_recently_deleted: bool,
    pub is_selfie: bool,
}

impl Flags {
    /// Smart folders are derived strictly from the flags.
    pub fn smart_folders(&self) -> Vec<SmartFolder> {
        let mut folders = Vec::new();
        if self.is_favorite {
            folders.push(SmartFolder::Favorites);
        }
        if self.is_hidden {
            folders.push(SmartFolder::Hidden);
        }
        if self.is_recently_deleted {
            folders.push(SmartFolder::RecentlyDeleted);
        }
        if self.is_selfie {
            folders.push(SmartFolder::Selfies);
        }
        folders
    }
}

/// A virtual collection derived from flags rather than explicit membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmartFolder {
    Favorites,
    Hidden,
    Selfies,
    RecentlyDeleted,
}

impl SmartFolder {
    /// Stable lowercase identifier, used to build `nua_<slug>` folder names.
    pub fn slug(&self) -> &'static str {
        match self {
            SmartFolder::Favorites => "favorites",
            SmartFolder::Hidden => "hidden",
            SmartFolder::Selfies => "selfies",
            SmartFolder::RecentlyDeleted => "recently_deleted",
        }
    }
}

/// Album and smart-folder membership of an asset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationships {
    /// UUIDs of the user albums this asset belongs to, in backup order.
    pub user_albums: Vec<String>,
    pub burst_album: Option<String>,
    pub smart_folders: Vec<SmartFolder>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    Photo,
    Video,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetSubtype {
    Standard,
    LivePhotoStill,
    LivePhotoVideo,
    BurstFrame,
    Panorama,
    Screenshot,
    Portrait,
    SloMo,
    TimeLapse,
}

/// A single photo or video in the backup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub asset_uuid: String,
    pub local_identifier: String,

    pub original_filename: String,
    /// Uppercase suffix of the original filename, without the dot.
    pub file_extension: String,
    pub uti_type: String,

    pub creation_date: String,
    pub modification_date: String,
    pub timezone_offset: String,

    /// Absolute path to the content-addressed payload file on disk.
    pub backup_relative_path: String,
    /// The 40-hex fileID under which the payload is stored.
    pub backup_hashed_filename: String,

    pub media_type: MediaType,
    pub subtype: AssetSubtype,

    pub live_photo_group_uuid: Option<String>,
    pub burst_uuid: Option<String>,
    pub is_primary_burst_frame: bool,

    pub flags: Flags,
    pub relationships: Relationships,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlbumType {
    User,
    Burst,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Manual,
    Date,
    None,
}

/// An album in the Photos catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    pub album_uuid: String,
    pub title: String,
    #[serde(rename = "type")]
    pub album_type: AlbumType,
    pub sort_order: SortOrder,
    pub asset_count: i64,
}

/// The consolidated, immutable view of one backup's Photos contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupModel {
    pub backup_metadata: BackupMetadata,
    pub assets: Vec<Asset>,
    pub albums: Vec<Album>,
}

/// Outcome of a backup-load attempt. The builder never panics or returns
/// a raw error; every failure lands here as a message for the host UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupModelResult {
    pub success: bool,
    pub backup_model: Option<BackupModel>,
    pub error: Option<String>,
}

impl BackupModelResult {
    pub fn ok(backup_model: BackupModel) -> Self {
        Self {
            success: true,
            backup_model: Some(backup_model),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            backup_model: None,
            error: Some(message.into()),
        }
    }
}
