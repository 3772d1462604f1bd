//! End-to-end tests for the backup model builder against a synthetic
//! on-disk backup fixture: real plists, a real Manifest.db, and a real
//! Photos.sqlite with the catalog schema.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::DateTime;
use plist::{Date, Dictionary, Value};
use rusqlite::{params, Connection};
use tempfile::TempDir;

use photopull::build_backup_model;

const PHOTOS_DB_FILE_ID: &str = "ab12cd34ab12cd34ab12cd34ab12cd34ab12cd34";

/// Route builder logs through RUST_LOG when debugging a failing fixture.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn write_info_plist(root: &Path) {
    let mut dict = Dictionary::new();
    dict.insert(
        "Device Name".to_string(),
        Value::String("Test iPhone".to_string()),
    );
    dict.insert(
        "Product Type".to_string(),
        Value::String("iPhone15,2".to_string()),
    );
    dict.insert(
        "Product Version".to_string(),
        Value::String("17.3.1".to_string()),
    );
    dict.insert(
        "GUID".to_string(),
        Value::String("D7A5EB27206B918EB006E38E4B84C87F".to_string()),
    );
    let backup_time: SystemTime = DateTime::parse_from_rfc3339("2026-01-21T11:38:37Z")
        .unwrap()
        .into();
    dict.insert(
        "Last Backup Date".to_string(),
        Value::Date(Date::from(backup_time)),
    );
    Value::Dictionary(dict)
        .to_file_xml(root.join("Info.plist"))
        .unwrap();
}

fn write_manifest_plist(root: &Path, encrypted: bool) {
    let mut dict = Dictionary::new();
    dict.insert("IsEncrypted".to_string(), Value::Boolean(encrypted));
    Value::Dictionary(dict)
        .to_file_xml(root.join("Manifest.plist"))
        .unwrap();
}

struct Fixture {
    root: TempDir,
    manifest: Connection,
    photos: Connection,
}

impl Fixture {
    fn new(encrypted: bool) -> Self {
        init_tracing();
        let root = TempDir::new().unwrap();
        write_info_plist(root.path());
        write_manifest_plist(root.path(), encrypted);

        let manifest = Connection::open(root.path().join("Manifest.db")).unwrap();
        manifest
            .execute_batch("CREATE TABLE Files (fileID TEXT PRIMARY KEY, relativePath TEXT);")
            .unwrap();
        manifest
            .execute(
                "INSERT INTO Files (fileID, relativePath) VALUES (?1, ?2)",
                params![PHOTOS_DB_FILE_ID, "Media/PhotoData/Photos.sqlite"],
            )
            .unwrap();

        let photos_path = root
            .path()
            .join(&PHOTOS_DB_FILE_ID[..2])
            .join(PHOTOS_DB_FILE_ID);
        fs::create_dir_all(photos_path.parent().unwrap()).unwrap();
        let photos = Connection::open(&photos_path).unwrap();
        photos
            .execute_batch(
                "CREATE TABLE ZGENERICALBUM (
                    Z_PK INTEGER PRIMARY KEY,
                    ZUUID TEXT,
                    ZTITLE TEXT,
                    ZKIND INTEGER,
                    ZCUSTOMSORTKEY INTEGER,
                    ZCUSTOMSORTASCENDING INTEGER,
                    ZCACHEDCOUNT INTEGER
                );
                CREATE TABLE ZASSET (
                    Z_PK INTEGER PRIMARY KEY,
                    ZUUID TEXT,
                    ZFILENAME TEXT,
                    ZDIRECTORY TEXT,
                    ZUNIFORMTYPEIDENTIFIER TEXT,
                    ZDATECREATED REAL,
                    ZMODIFICATIONDATE REAL,
                    ZKIND INTEGER,
                    ZKINDSUBTYPE INTEGER,
                    ZFAVORITE INTEGER,
                    ZHIDDEN INTEGER,
                    ZTRASHEDSTATE INTEGER,
                    ZAVALANCHEUUID TEXT,
                    ZAVALANCHEPICKTYPE INTEGER,
                    ZMEDIAGROUPUUID TEXT
                );
                CREATE TABLE ZADDITIONALASSETATTRIBUTES (
                    Z_PK INTEGER PRIMARY KEY,
                    ZASSET INTEGER,
                    ZORIGINALFILENAME TEXT
                );
                CREATE TABLE Z_28ASSETS (
                    Z_28ALBUMS INTEGER,
                    Z_3ASSETS INTEGER,
                    Z_FOK_3ASSETS INTEGER
                );",
            )
            .unwrap();

        Self {
            root,
            manifest,
            photos,
        }
    }

    /// Register a payload file in Manifest.db and write its bytes under the
    /// content-addressed location.
    fn register_payload(&self, file_id: &str, relative_path: &str) {
        self.manifest
            .execute(
                "INSERT INTO Files (fileID, relativePath) VALUES (?1, ?2)",
                params![file_id, relative_path],
            )
            .unwrap();
        let dir = self.root.path().join(&file_id[..2]);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(file_id), b"payload").unwrap();
    }

    fn insert_album(&self, pk: i64, uuid: &str, title: &str) {
        self.photos
            .execute(
                "INSERT INTO ZGENERICALBUM (Z_PK, ZUUID, ZTITLE, ZKIND, ZCACHEDCOUNT)
                 VALUES (?1, ?2, ?3, 2, 0)",
                params![pk, uuid, title],
            )
            .unwrap();
    }

    fn insert_asset(&self, pk: i64, uuid: &str, filename: &str, directory: &str) {
        self.photos
            .execute(
                "INSERT INTO ZASSET
                    (Z_PK, ZUUID, ZFILENAME, ZDIRECTORY, ZUNIFORMTYPEIDENTIFIER,
                     ZDATECREATED, ZMODIFICATIONDATE, ZKIND, ZKINDSUBTYPE,
                     ZFAVORITE, ZHIDDEN, ZTRASHEDSTATE)
                 VALUES (?1, ?2, ?3, ?4, 'public.jpeg', 790000000.0, 790000100.0, 0, NULL, 0, 0, 0)",
                params![pk, uuid, filename, directory],
            )
            .unwrap();
        self.photos
            .execute(
                "INSERT INTO ZADDITIONALASSETATTRIBUTES (ZASSET, ZORIGINALFILENAME)
                 VALUES (?1, ?2)",
                params![pk, filename],
            )
            .unwrap();
    }

    fn insert_membership(&self, album_pk: i64, asset_pk: i64, sort: i64) {
        self.photos
            .execute(
                "INSERT INTO Z_28ASSETS (Z_28ALBUMS, Z_3ASSETS, Z_FOK_3ASSETS)
                 VALUES (?1, ?2, ?3)",
                params![album_pk, asset_pk, sort],
            )
            .unwrap();
    }

    /// Close the fixture's connections and hand back the backup root.
    fn finish(self) -> TempDir {
        drop(self.manifest);
        drop(self.photos);
        self.root
    }
}

#[test]
fn test_happy_path_build_on_empty_catalog() {
    let root = Fixture::new(false).finish();

    let result = build_backup_model(root.path());
    assert!(result.success, "error: {:?}", result.error);

    let model = result.backup_model.unwrap();
    let metadata = &model.backup_metadata;
    assert_eq!(metadata.backup_uuid, "D7A5EB27206B918EB006E38E4B84C87F");
    assert_eq!(metadata.backup_date, "2026-01-21T11:38:37");
    assert!(!metadata.is_encrypted);
    assert_eq!(metadata.source_device.name, "Test iPhone");
    assert_eq!(metadata.source_device.model, "iPhone15,2");
    assert_eq!(metadata.source_device.ios_version, "17.3.1");
    assert!(model.assets.is_empty());
    assert!(model.albums.is_empty());
}

#[test]
fn test_encrypted_backup_is_refused() {
    let root = Fixture::new(true).finish();

    let result = build_backup_model(root.path());
    assert!(!result.success);
    assert!(result.backup_model.is_none());
    assert!(result.error.unwrap().to_lowercase().contains("encrypted"));
}

#[test]
fn test_missing_info_plist_fails() {
    let fixture = Fixture::new(false);
    fs::remove_file(fixture.root.path().join("Info.plist")).unwrap();
    let root = fixture.finish();

    let result = build_backup_model(root.path());
    assert!(!result.success);
    assert!(result.backup_model.is_none());
}

#[test]
fn test_full_build_with_albums_and_assets() {
    let fixture = Fixture::new(false);
    fixture.insert_album(10, "album-uuid-1", "Vacation");
    fixture.insert_asset(1, "asset-uuid-1", "IMG_0001.JPG", "DCIM/100APPLE");
    fixture.insert_asset(2, "asset-uuid-2", "IMG_0002.JPG", "DCIM/100APPLE");
    fixture.insert_membership(10, 1, 0);
    fixture.register_payload(
        "11a0000000000000000000000000000000000000",
        "Media/DCIM/100APPLE/IMG_0001.JPG",
    );
    fixture.register_payload(
        "22b0000000000000000000000000000000000000",
        "Media/DCIM/100APPLE/IMG_0002.JPG",
    );
    let root = fixture.finish();

    let result = build_backup_model(root.path());
    assert!(result.success, "error: {:?}", result.error);
    let model = result.backup_model.unwrap();

    assert_eq!(model.albums.len(), 1);
    assert_eq!(model.albums[0].title, "Vacation");

    assert_eq!(model.assets.len(), 2);
    let first = model
        .assets
        .iter()
        .find(|a| a.asset_uuid == "asset-uuid-1")
        .unwrap();
    assert_eq!(first.original_filename, "IMG_0001.JPG");
    assert_eq!(first.file_extension, "JPG");
    assert_eq!(
        first.relationships.user_albums,
        vec!["album-uuid-1".to_string()]
    );
    assert!(first.creation_date.starts_with("2026-"));

    // Every built asset resolves to an existing regular file on disk
    for asset in &model.assets {
        let path = PathBuf::from(&asset.backup_relative_path);
        assert!(path.is_file(), "missing payload: {}", path.display());
        assert_eq!(
            path.file_name().unwrap().to_string_lossy(),
            asset.backup_hashed_filename
        );
    }

    let second = model
        .assets
        .iter()
        .find(|a| a.asset_uuid == "asset-uuid-2")
        .unwrap();
    assert!(second.relationships.user_albums.is_empty());
}

#[test]
fn test_asset_missing_from_manifest_is_skipped() {
    let fixture = Fixture::new(false);
    fixture.insert_asset(1, "asset-uuid-1", "IMG_0001.JPG", "DCIM/100APPLE");
    fixture.insert_asset(2, "asset-uuid-2", "IMG_0002.JPG", "DCIM/100APPLE");
    // Only the second asset's payload survives in the backup
    fixture.register_payload(
        "22b0000000000000000000000000000000000000",
        "Media/DCIM/100APPLE/IMG_0002.JPG",
    );
    let root = fixture.finish();

    let result = build_backup_model(root.path());
    assert!(result.success, "error: {:?}", result.error);
    let model = result.backup_model.unwrap();

    assert_eq!(model.assets.len(), 1);
    assert_eq!(model.assets[0].asset_uuid, "asset-uuid-2");
}

#[test]
fn test_rebuild_yields_identical_model() {
    let fixture = Fixture::new(false);
    fixture.insert_album(10, "album-uuid-1", "Vacation");
    fixture.insert_asset(1, "asset-uuid-1", "IMG_0001.JPG", "DCIM/100APPLE");
    fixture.insert_membership(10, 1, 0);
    fixture.register_payload(
        "11a0000000000000000000000000000000000000",
        "Media/DCIM/100APPLE/IMG_0001.JPG",
    );
    let root = fixture.finish();

    let first = build_backup_model(root.path());
    let second = build_backup_model(root.path());
    assert!(first.success);
    assert_eq!(first, second);
}
