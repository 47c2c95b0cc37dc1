use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid value for {key}: {value:?}")]
    InvalidConfig { key: String, value: String },

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn invalid_config<K: Into<String>, V: Into<String>>(key: K, value: V) -> Self {
        Error::InvalidConfig {
            key: key.into(),
            value: value.into(),
        }
    }
}
