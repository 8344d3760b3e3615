use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Discord API error: {0}")]
    Serenity(#[from] serenity::Error),

    #[error("Storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed guild record: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Download failed: {0}")]
    Download(#[from] reqwest::Error),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Guild not found: {0}")]
    GuildNotFound(u64),

    #[error("User not found: {0}")]
    UserNotFound(u64),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("{0}")]
    Custom(String),
}

impl Error {
    pub fn custom<S: Into<String>>(msg: S) -> Self {
        Error::Custom(msg.into())
    }
}
