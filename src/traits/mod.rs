//! Trait definitions for dependency injection
//!
//! External media tooling is abstracted behind traits to enable testing.

mod transcoder;

pub use transcoder::{transcode_output_path, MediaTranscoder, TranscodeError};
