//! Production implementations of traits

mod transcoder;

pub use transcoder::CommandTranscoder;
