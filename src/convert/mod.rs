//! Conversion engine for transforming proprietary media formats into
//! standard ones.
//!
//! The entry point is `convert_asset`, which looks up the asset's extension
//! in the conversion map, runs the matching transcoder, moves the result
//! into a per-conversion temp directory, and returns a copy of the asset
//! pointing at the converted file.

mod temp_store;

pub use temp_store::store_temp_file;

use std::collections::HashMap;
use std::path::Path;

use thiserror::Error;
use tracing::debug;

use crate::model::Asset;
use crate::traits::{MediaTranscoder, TranscodeError};

/// Maps source extensions (uppercase) to target formats,
/// e.g. `{"HEIC": "PNG", "MOV": "MP4"}`.
pub type ConvertMap = HashMap<String, String>;

/// Errors that can occur when converting an asset
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("No conversion rule for extension: {0}")]
    NoRule(String),

    #[error("Unsupported conversion type: {0}")]
    Unsupported(String),

    #[error("Conversion failed: {0}")]
    Transcode(#[from] TranscodeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convert an asset according to the rules in the conversion map.
///
/// On success the returned asset is a structural copy of the input whose
/// only change is `backup_relative_path`, now pointing at the converted
/// file in a fresh temp directory. Every other field, including
/// `file_extension`, is preserved verbatim.
pub fn convert_asset(
    asset: &Asset,
    convert_map: &ConvertMap,
    transcoder: &dyn MediaTranscoder,
) -> Result<Asset, ConvertError> {
    let ext = asset.file_extension.to_uppercase();

    let target_format = convert_map
        .get(&ext)
        .ok_or_else(|| ConvertError::NoRule(ext.clone()))?;

    let source = Path::new(&asset.backup_relative_path);
    let output = match ext.as_str() {
        "HEIC" | "HEIF" => transcoder.transcode_image(source, target_format)?,
        "MOV" => transcoder.transcode_video(source, target_format)?,
        _ => return Err(ConvertError::Unsupported(ext)),
    };

    let temp_path = store_temp_file(&output)?;

    debug!(
        "Converted {} -> {}",
        asset.original_filename,
        temp_path.display()
    );

    let mut converted = asset.clone();
    converted.backup_relative_path = temp_path.to_string_lossy().into_owned();
    Ok(converted)
}
