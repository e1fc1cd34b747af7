use thiserror::Error;

use crate::core::CoreError;

/// Crate-level convenience error.
///
/// Not a "god error": a thin wrapper over the canonical core families plus
/// the config boundary.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("config file could not be read or written: {0}")]
    ConfigIo(#[from] std::io::Error),

    #[error("config file is not valid JSON: {0}")]
    ConfigFormat(#[from] serde_json::Error),
}
