use thiserror::Error;

use crate::data::loader::DataError;
use crate::registry::RegistryError;

/// Fatal failures of a cleaning run. Temp-file cleanup is not represented
/// here: it is logged and swallowed once the artifact is published.
#[derive(Debug, Error)]
pub enum CleanError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("cannot resolve input artifact '{reference}': {source}")]
    InputResolution {
        reference: String,
        #[source]
        source: InputSource,
    },

    #[error("cannot transform dataset: {0}")]
    Transform(#[source] DataError),

    #[error("cannot write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("cannot publish '{name}': {source}")]
    Publish {
        name: String,
        #[source]
        source: RegistryError,
    },
}

/// Underlying cause of an input resolution failure.
#[derive(Debug, Error)]
pub enum InputSource {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Read(#[from] DataError),
}

pub type Result<T> = std::result::Result<T, CleanError>;
