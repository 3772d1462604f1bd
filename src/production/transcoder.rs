//! Media transcoding backed by installed converter binaries.
//!
//! Images go through ImageMagick (`magick`) and videos through `ffmpeg`.
//! Both tools infer the output format from the output file's extension.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::traits::{transcode_output_path, MediaTranscoder, TranscodeError};

pub struct CommandTranscoder {
    image_tool: String,
    video_tool: String,
}

impl CommandTranscoder {
    pub fn new() -> Self {
        Self {
            image_tool: "magick".to_string(),
            video_tool: "ffmpeg".to_string(),
        }
    }

    /// Constructor with custom tool names (for hosts that ship their own
    /// converter builds).
    pub fn with_tools(image_tool: impl Into<String>, video_tool: impl Into<String>) -> Self {
        Self {
            image_tool: image_tool.into(),
            video_tool: video_tool.into(),
        }
    }

    fn run(mut command: Command, tool: &str) -> Result<(), TranscodeError> {
        debug!("Running transcoder: {:?}", command);

        match command.output() {
            Ok(output) if output.status.success() => Ok(()),
            Ok(output) => Err(TranscodeError::CommandFailed {
                tool: tool.to_string(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(TranscodeError::ToolMissing(tool.to_string()))
            }
            Err(e) => Err(TranscodeError::Io(e)),
        }
    }
}

impl Default for CommandTranscoder {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaTranscoder for CommandTranscoder {
    fn transcode_image(
        &self,
        source: &Path,
        target_format: &str,
    ) -> Result<PathBuf, TranscodeError> {
        let output = transcode_output_path(source, target_format);

        let mut command = Command::new(&self.image_tool);
        command.arg(source).arg(&output);
        Self::run(command, &self.image_tool)?;

        Ok(output)
    }

    fn transcode_video(
        &self,
        source: &Path,
        target_format: &str,
    ) -> Result<PathBuf, TranscodeError> {
        let output = transcode_output_path(source, target_format);

        let mut command = Command::new(&self.video_tool);
        command
            .arg("-y")
            .arg("-i")
            .arg(source)
            .args(["-c:v", "libx264"])
            .arg(&output);
        Self::run(command, &self.video_tool)?;

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_tool_is_reported() {
        let transcoder =
            CommandTranscoder::with_tools("definitely-not-a-real-tool", "also-not-real");
        let err = transcoder
            .transcode_image(Path::new("/tmp/a.heic"), "PNG")
            .unwrap_err();
        assert!(matches!(err, TranscodeError::ToolMissing(_)));
    }
}
