use thiserror::Error;

#[derive(Error, Debug)]
pub enum ForgeError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid initial state: {0}")]
    InvalidInitialState(String),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("Timeline has no snapshots")]
    EmptyTimeline,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    TomlError(#[from] toml::de::Error),
}

impl ForgeError {
    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        ForgeError::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ForgeError>;
