use std::path::PathBuf;

use crate::dates::DateCode;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("cannot read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed dataset {path:?}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("duplicate place id '{0}'")]
    DuplicatePlace(String),

    #[error("config: {0}")]
    Config(String),

    #[error("{0} is not a calendar date")]
    InvalidDate(DateCode),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
