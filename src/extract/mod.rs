//! Extraction engine: plans and writes the destination tree.
//!
//! Assets are deduplicated, burst groups are segregated, and each unit is
//! placed according to its active collections. With symlinks enabled an
//! asset that belongs to zero or several collections is materialised once
//! under `non_exclusive_assets/` and linked everywhere else.

mod collections;
mod fs_ops;

pub use collections::{
    active_collections, album_title_map, deduplicate_assets, dest_name, separate_burst_frames,
    CollectionRef,
};
pub use fs_ops::{
    copy_file, copy_folder, ensure_folder_exists, move_folder, place_folder_symlink,
    place_symlink, resolve_free_name,
};

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use crate::convert::{convert_asset, ConvertMap};
use crate::model::{Asset, BackupModel};
use crate::policy::{CollectionFilter, CollectionPolicy};
use crate::progress::{CancellationToken, ExtractionProgress};
use crate::traits::MediaTranscoder;

/// Folder for assets belonging to zero or (in symlink mode) several
/// collections.
pub const NON_EXCLUSIVE_DIR: &str = "non_exclusive_assets";

/// Transient folder where burst groups are assembled before placement.
const STAGING_DIR: &str = "staging";

/// Errors that can occur during extraction
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Extraction cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Perform the full extraction of `model` into `output_root`.
///
/// Symbolic links are used only when the OS supports them *and* the user
/// asked for them. Conversion failures fall back to placing the original
/// file; IO failures abort the run, leaving already-written files in place.
#[allow(clippy::too_many_arguments)]
pub fn run_extraction(
    model: &BackupModel,
    policy: &CollectionPolicy,
    output_root: &Path,
    os_supports_symlinks: bool,
    user_set_symlinks: bool,
    convert_map: &ConvertMap,
    transcoder: &dyn MediaTranscoder,
    progress: &ExtractionProgress,
    cancel: &CancellationToken,
) -> Result<(), ExtractError> {
    let unique = deduplicate_assets(&model.assets);
    let (burst_groups, asset_list) = separate_burst_frames(unique);

    let total_units = asset_list.len() + burst_groups.len();
    let mut units_done = 0usize;

    info!(
        "Extracting {} assets and {} burst groups to {}",
        asset_list.len(),
        burst_groups.len(),
        output_root.display()
    );

    let mut engine = Engine {
        filter: policy.to_filter(),
        titles: album_title_map(&model.albums),
        output_root,
        use_symlinks: os_supports_symlinks && user_set_symlinks,
        convert_map,
        transcoder,
        non_excl_assets: HashMap::new(),
    };

    let tick = |done: usize| {
        if total_units > 0 {
            progress.advance_to(((done * 100) / total_units) as u8);
        }
    };

    for asset in asset_list {
        if cancel.is_cancelled() {
            return Err(ExtractError::Cancelled);
        }
        engine.place_asset(asset)?;
        units_done += 1;
        tick(units_done);
    }

    for (burst_uuid, frames) in &burst_groups {
        if cancel.is_cancelled() {
            return Err(ExtractError::Cancelled);
        }
        engine.place_burst_group(burst_uuid, frames)?;
        units_done += 1;
        tick(units_done);
    }

    // Staging is transient; drop it once the last burst has been placed
    let staging_root = output_root.join(STAGING_DIR);
    if staging_root.exists() && fs::read_dir(&staging_root)?.next().is_none() {
        fs::remove_dir(&staging_root)?;
    }

    progress.advance_to(100);
    Ok(())
}

/// State for one extraction run. `non_excl_assets` records where an asset
/// or burst folder was physically placed under `non_exclusive_assets/` so
/// later collections can link to it instead of copying.
struct Engine<'a> {
    filter: CollectionFilter,
    titles: HashMap<&'a str, &'a str>,
    output_root: &'a Path,
    use_symlinks: bool,
    convert_map: &'a ConvertMap,
    transcoder: &'a dyn MediaTranscoder,
    non_excl_assets: HashMap<String, PathBuf>,
}

impl Engine<'_> {
    /// Convert the asset when a rule matches; on failure log and fall back
    /// to the original.
    fn maybe_convert(&self, asset: &Asset) -> Asset {
        if self
            .convert_map
            .contains_key(&asset.file_extension.to_uppercase())
        {
            match convert_asset(asset, self.convert_map, self.transcoder) {
                Ok(converted) => return converted,
                Err(e) => {
                    warn!("Conversion failed for {}: {}", asset.original_filename, e);
                }
            }
        }
        asset.clone()
    }

    fn collection_dir(&self, collection: &CollectionRef) -> PathBuf {
        self.output_root.join(&collection.title)
    }

    fn non_exclusive_dir(&self) -> PathBuf {
        self.output_root.join(NON_EXCLUSIVE_DIR)
    }

    fn place_asset(&mut self, asset: &Asset) -> Result<(), ExtractError> {
        let collections = active_collections(asset, &self.filter, &self.titles);

        // Already materialised under non_exclusive_assets/: just link
        if self.use_symlinks {
            if let Some(src_path) = self.non_excl_assets.get(&asset.asset_uuid) {
                for collection in &collections {
                    place_symlink(src_path, &self.collection_dir(collection))?;
                }
                return Ok(());
            }
        }

        let resolved = self.maybe_convert(asset);
        let src_path = PathBuf::from(&resolved.backup_relative_path);
        let name = dest_name(asset, &resolved);

        match collections.len() {
            1 => {
                copy_file(&src_path, &self.collection_dir(&collections[0]), &name, asset)?;
            }
            _ if self.use_symlinks => {
                let dest = copy_file(&src_path, &self.non_exclusive_dir(), &name, asset)?;
                for collection in &collections {
                    place_symlink(&dest, &self.collection_dir(collection))?;
                }
                self.non_excl_assets.insert(asset.asset_uuid.clone(), dest);
            }
            0 => {
                copy_file(&src_path, &self.non_exclusive_dir(), &name, asset)?;
            }
            _ => {
                for collection in &collections {
                    copy_file(&src_path, &self.collection_dir(collection), &name, asset)?;
                }
            }
        }

        Ok(())
    }

    fn place_burst_group(
        &mut self,
        burst_uuid: &str,
        frames: &[&Asset],
    ) -> Result<(), ExtractError> {
        // The key frame decides the group's collection membership
        let key_frame = frames
            .iter()
            .find(|frame| frame.is_primary_burst_frame)
            .copied()
            .unwrap_or(frames[0]);
        let collections = active_collections(key_frame, &self.filter, &self.titles);

        // Assemble the whole group in staging before deciding where it lands
        let staging_folder = self.output_root.join(STAGING_DIR).join(burst_uuid);
        ensure_folder_exists(&staging_folder)?;
        for frame in frames {
            let resolved = self.maybe_convert(frame);
            let name = dest_name(frame, &resolved);
            copy_file(
                Path::new(&resolved.backup_relative_path),
                &staging_folder,
                &name,
                frame,
            )?;
        }

        // Already materialised: discard the staging copy and link
        if self.use_symlinks {
            if let Some(src_folder) = self.non_excl_assets.get(burst_uuid) {
                fs::remove_dir_all(&staging_folder)?;
                for collection in &collections {
                    place_folder_symlink(src_folder, &self.collection_dir(collection))?;
                }
                return Ok(());
            }
        }

        match collections.len() {
            1 => {
                move_folder(&staging_folder, &self.collection_dir(&collections[0]))?;
            }
            _ if self.use_symlinks => {
                let dest_folder = move_folder(&staging_folder, &self.non_exclusive_dir())?;
                for collection in &collections {
                    place_folder_symlink(&dest_folder, &self.collection_dir(collection))?;
                }
                self.non_excl_assets
                    .insert(burst_uuid.to_string(), dest_folder);
            }
            0 => {
                move_folder(&staging_folder, &self.non_exclusive_dir())?;
            }
            _ => {
                // Move into the first collection, copy the tree into the rest
                let moved = move_folder(&staging_folder, &self.collection_dir(&collections[0]))?;
                for collection in &collections[1..] {
                    copy_folder(&moved, &self.collection_dir(collection))?;
                }
            }
        }

        Ok(())
    }
}
