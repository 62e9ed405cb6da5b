use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("file watch error: {0}")]
    Watch(#[from] notify::Error),

    #[error("config error: {0}")]
    Config(#[from] confy::ConfyError),

    #[error("state serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("state file {}: {reason}", path.display())]
    Persist { path: PathBuf, reason: String },
}
