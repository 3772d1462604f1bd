use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that can occur while transcoding media
#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error("Transcoder tool '{0}' is not installed or not on PATH")]
    ToolMissing(String),

    #[error("Transcoder '{tool}' exited with {status}: {stderr}")]
    CommandFailed {
        tool: String,
        status: String,
        stderr: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Output convention shared by all transcoders: the converted file is
/// written next to the source as `<stem>.<target_lowercase>`.
pub fn transcode_output_path(source: &Path, target_format: &str) -> PathBuf {
    source.with_extension(target_format.to_lowercase())
}

/// Converts media files between formats.
///
/// Implementations write the output next to the source file and return its
/// path; the conversion engine is responsible for moving the result into a
/// temp directory.
pub trait MediaTranscoder: Send + Sync {
    /// Convert an image (HEIC/HEIF source) into the target format.
    fn transcode_image(
        &self,
        source: &Path,
        target_format: &str,
    ) -> Result<PathBuf, TranscodeError>;

    /// Transcode a video (MOV source) into the target format.
    fn transcode_video(
        &self,
        source: &Path,
        target_format: &str,
    ) -> Result<PathBuf, TranscodeError>;
}
