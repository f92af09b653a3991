use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TypeGraphError {
    #[error("Hierarchy root does not exist or is not a directory: {}", .0.display())]
    RootNotFound(PathBuf),

    #[error("Cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid path: '{0}'")]
    InvalidPath(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Unknown node: {0}")]
    UnknownNode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl TypeGraphError {
    pub(crate) fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TypeGraphError::Read {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TypeGraphError::Write {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, TypeGraphError>;
