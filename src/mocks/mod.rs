//! Test doubles for dependency injection
//!
//! Provides transcoder implementations that need no external tooling, for
//! isolated testing of the conversion and extraction engines.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::traits::{transcode_output_path, MediaTranscoder, TranscodeError};

/// "Transcodes" by copying the source bytes to the target-extension path.
///
/// The output is not a real format conversion, but it exercises the full
/// conversion pipeline: output naming, temp-store move, and placement.
#[derive(Default)]
pub struct CopyTranscoder {
    calls: AtomicUsize,
}

impl CopyTranscoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of transcode invocations so far (for assertions)
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    fn copy_to_target(&self, source: &Path, target_format: &str) -> Result<PathBuf, TranscodeError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        let output = transcode_output_path(source, target_format);
        fs::copy(source, &output)?;
        Ok(output)
    }
}

impl MediaTranscoder for CopyTranscoder {
    fn transcode_image(
        &self,
        source: &Path,
        target_format: &str,
    ) -> Result<PathBuf, TranscodeError> {
        self.copy_to_target(source, target_format)
    }

    fn transcode_video(
        &self,
        source: &Path,
        target_format: &str,
    ) -> Result<PathBuf, TranscodeError> {
        self.copy_to_target(source, target_format)
    }
}

/// Always fails, for exercising the conversion-failure fallback.
#[derive(Default)]
pub struct FailingTranscoder;

impl FailingTranscoder {
    pub fn new() -> Self {
        Self
    }

    fn fail(&self) -> TranscodeError {
        TranscodeError::CommandFailed {
            tool: "mock".to_string(),
            status: "exit status: 1".to_string(),
            stderr: "simulated transcode failure".to_string(),
        }
    }
}

impl MediaTranscoder for FailingTranscoder {
    fn transcode_image(
        &self,
        _source: &Path,
        _target_format: &str,
    ) -> Result<PathBuf, TranscodeError> {
        Err(self.fail())
    }

    fn transcode_video(
        &self,
        _source: &Path,
        _target_format: &str,
    ) -> Result<PathBuf, TranscodeError> {
        Err(self.fail())
    }
}
