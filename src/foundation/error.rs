/// Result alias used throughout the crate.
pub type KinemojiResult<T> = Result<T, KinemojiError>;

/// Crate-wide error type.
///
/// Variants follow the job-level taxonomy: input validation is reported before any rendering
/// starts, font and encoder failures abort the in-flight job, shaping failures are recoverable
/// per actor.
#[derive(thiserror::Error, Debug)]
pub enum KinemojiError {
    /// Malformed or incomplete render input.
    #[error("validation error: {0}")]
    Validation(String),

    /// A font family could not be resolved, or its file could not be read or parsed.
    #[error("font error: {0}")]
    Font(String),

    /// A string could not be shaped with the resolved font.
    #[error("shaping error: {0}")]
    Shaping(String),

    /// Drawing surface misuse or rasterization failure.
    #[error("render error: {0}")]
    Render(String),

    /// The encoding sink failed or exited unsuccessfully.
    #[error("encode error: {0}")]
    Encode(String),

    /// JSON (de)serialization failure.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Anything else, usually an I/O error with context attached.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl KinemojiError {
    /// Build a [`KinemojiError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`KinemojiError::Font`].
    pub fn font(msg: impl Into<String>) -> Self {
        Self::Font(msg.into())
    }

    /// Build a [`KinemojiError::Shaping`].
    pub fn shaping(msg: impl Into<String>) -> Self {
        Self::Shaping(msg.into())
    }

    /// Build a [`KinemojiError::Render`].
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`KinemojiError::Encode`].
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`KinemojiError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// HTTP-equivalent status for surfacing this error at a request boundary.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) | Self::Serde(_) => 400,
            _ => 500,
        }
    }

    /// Whether the failure is local to one actor and rendering may continue.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Shaping(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
