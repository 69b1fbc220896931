use thiserror::Error;

/// Main error type for the vibe-bpm library
///
/// The analysis core itself never fails; these errors come from the
/// collaborators around it (decoding, configuration, file I/O).
#[derive(Error, Debug)]
pub enum VibeError {
    #[error("Audio processing error: {0}")]
    Audio(#[from] AudioError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Generic error: {0}")]
    Generic(String),
}

/// Audio loading and decoding errors
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Failed to load audio file: {path}")]
    LoadFailed { path: String },

    #[error("Unsupported audio format: {format}")]
    UnsupportedFormat { format: String },

    #[error("Failed to decode audio from {source_name}: {reason}")]
    DecodeFailed { source_name: String, reason: String },

    #[error("Invalid audio parameters: {details}")]
    InvalidParameters { details: String },
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration file: {path}")]
    ParseFailed { path: String },

    #[error("Invalid configuration value: {key} = {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },
}

/// Convenience type alias for Results using VibeError
pub type Result<T> = std::result::Result<T, VibeError>;

impl VibeError {
    /// Create a generic error with a custom message
    pub fn generic<S: Into<String>>(message: S) -> Self {
        Self::Generic(message.into())
    }

    /// Check if this error is recoverable (can be retried)
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Io(_) => true,
            Self::Audio(AudioError::LoadFailed { .. }) => true,
            _ => false,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Audio(AudioError::LoadFailed { path }) => {
                format!(
                    "Could not load audio file '{}'. Please check the file exists and is readable.",
                    path
                )
            }
            Self::Audio(AudioError::UnsupportedFormat { format }) => {
                format!(
                    "Audio format '{}' is not supported. Use wav, mp3, flac, ogg, m4a or aac.",
                    format
                )
            }
            Self::Config(ConfigError::FileNotFound { path }) => {
                format!("Configuration file '{}' not found.", path)
            }
            _ => self.to_string(),
        }
    }
}
