use std::path::PathBuf;

/// Errors raised by the drawing core and its profile registry.
///
/// Detection misses are not errors: `detect` reports them as `None`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unknown color profile `{0}`")]
    UnknownProfile(String),

    #[error("color profile `{0}` is already registered")]
    DuplicateProfile(String),

    #[error("invalid color profile `{input}`: {reason}")]
    InvalidProfile { input: String, reason: String },

    #[error("frame size {actual:?} does not match canvas size {expected:?}")]
    FrameSize {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("failed to read profile file {}", .path.display())]
    ProfileFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse profile file {}", .path.display())]
    ProfileJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
