use thiserror::Error;

#[derive(Error, Debug)]
pub enum DriftError {
    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    #[error("Corrupt save: {0}")]
    CorruptSave(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DriftError>;
