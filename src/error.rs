use thiserror::Error;

#[derive(Error, Debug)]
pub enum CleanerError {
    #[error("Database connection failed: {message}")]
    Connection { message: String },

    #[error("Database query failed: {message}")]
    Query { message: String },

    #[error("Database transaction failed: {message}")]
    Transaction { message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CleanerError {
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection { message: message.into() }
    }

    pub fn query(message: impl Into<String>) -> Self {
        Self::Query { message: message.into() }
    }

    pub fn transaction(message: impl Into<String>) -> Self {
        Self::Transaction { message: message.into() }
    }

    /// True for failures raised by the relational data source.
    pub fn is_data_source(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. } | Self::Query { .. } | Self::Transaction { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, CleanerError>;
