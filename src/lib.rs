//! PhotoPull - Rebuild the Photos-app collections from a local iPhone
//! backup and extract them to disk.
//!
//! The crate has two halves: the backup model builder, which turns the
//! opaque, hash-addressed backup into a consolidated in-memory model, and
//! the extraction engine, which materialises that model as a folder per
//! collection without duplicating bytes when symlinks are available.
//! External media tooling sits behind traits for testability.

pub mod convert;
pub mod extract;
pub mod mocks;
pub mod model;
pub mod policy;
pub mod production;
pub mod traits;

mod builder;
mod db;
mod plists;
mod progress;
mod service;

pub use builder::build_backup_model;
pub use db::{discover_join_table, open_read_only, DbError, JoinTableInfo};
pub use extract::{run_extraction, ExtractError, NON_EXCLUSIVE_DIR};
pub use model::{BackupModel, BackupModelResult};
pub use plists::{read_device_info, read_encryption_status, DeviceInfo, PlistError};
pub use policy::{CollectionFilter, CollectionPolicy, ListEntry};
pub use progress::{CancellationToken, ExtractionProgress};
pub use service::BackupService;
