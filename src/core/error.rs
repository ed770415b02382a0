use thiserror::Error;

use crate::tower::TowerError;

#[derive(Error, Debug)]
pub enum PopologyError {
    #[error("Tower not found: {0}")]
    TowerNotFound(String),

    #[error("Duplicate tower name: {0}")]
    DuplicateTower(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Unsupported definition file: {0}")]
    UnsupportedFile(String),

    #[error("{path}: {source}")]
    InFile {
        path: String,
        #[source]
        source: Box<PopologyError>,
    },

    #[error(transparent)]
    Tower(#[from] TowerError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl PopologyError {
    /// Attach the file a failure came from
    pub fn in_file(self, path: &std::path::Path) -> Self {
        PopologyError::InFile {
            path: path.display().to_string(),
            source: Box::new(self),
        }
    }

    /// The innermost error, skipping file context
    pub fn root(&self) -> &PopologyError {
        match self {
            PopologyError::InFile { source, .. } => source.root(),
            other => other,
        }
    }
}

impl From<crate::tower::ValidationError> for PopologyError {
    fn from(e: crate::tower::ValidationError) -> Self {
        PopologyError::Tower(e.into())
    }
}

pub type Result<T> = std::result::Result<T, PopologyError>;
