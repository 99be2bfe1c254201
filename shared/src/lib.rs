// shared/src/lib.rs

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Cache miss or expired entry. A control-flow signal, not a failure.
    #[error("not found")]
    NotFound,
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("storage: {0}")]
    Storage(String),
    #[error("translation: {0}")]
    Translation(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl Error {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Storage(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

pub mod config;
