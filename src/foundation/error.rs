use std::path::PathBuf;

pub type FxResult<T> = Result<T, FxError>;

#[derive(thiserror::Error, Debug)]
pub enum FxError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("io error on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("image error on '{}': {source}", .path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FxError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn image(path: impl Into<PathBuf>, source: image::ImageError) -> Self {
        Self::Image {
            path: path.into(),
            source,
        }
    }
}
