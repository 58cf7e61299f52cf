use thiserror::Error;

#[derive(Debug, Error)]
pub enum LyricsError {
    // Configuration errors
    #[error("Invalid timing config: {message}")]
    ConfigInvalid { message: String },

    #[error("Failed to parse timing config: {0}")]
    ConfigParseError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, LyricsError>;
