//! Stitcher error types.

use std::path::PathBuf;
use thiserror::Error;

use camstitch_media::MediaError;
use camstitch_models::TagRuleError;

pub type StitchResult<T> = Result<T, StitchError>;

#[derive(Debug, Error)]
pub enum StitchError {
    #[error("Invalid tag rule: {0}")]
    TagRule(#[from] TagRuleError),

    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    #[error("Input directory not found: {0}")]
    InputDirNotFound(PathBuf),

    #[error("Rendering '{title}' failed: {source}")]
    GroupFailed {
        title: String,
        #[source]
        source: MediaError,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StitchError {
    pub fn group_failed(title: impl Into<String>, source: MediaError) -> Self {
        Self::GroupFailed {
            title: title.into(),
            source,
        }
    }

    /// Detailed report, including the failing command and its streams.
    pub fn report(&self) -> String {
        match self {
            Self::GroupFailed { title, source } => {
                format!("Rendering '{}' failed\n{}", title, source.report())
            }
            Self::Media(source) => source.report(),
            other => other.to_string(),
        }
    }
}
