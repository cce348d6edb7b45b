/// Result alias used by every fallible API in the crate.
pub type ReelResult<T> = Result<T, ReelError>;

#[derive(thiserror::Error, Debug)]
/// Error type shared by the amount generators' callers, the engine and the explainer.
pub enum ReelError {
    /// Bad scenario, configuration or composition data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Malformed keyframe tracks or an impossible stage sequence.
    #[error("animation error: {0}")]
    Animation(String),

    /// Failures while sampling, compiling or rasterizing a frame.
    #[error("evaluation error: {0}")]
    Evaluation(String),

    /// JSON encoding or decoding failed.
    #[error("serialization error: {0}")]
    Serde(String),

    /// IO and other lower-level failures, with their context chain.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReelError {
    /// Build a [`ReelError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ReelError::Animation`].
    pub fn animation(msg: impl Into<String>) -> Self {
        Self::Animation(msg.into())
    }

    /// Build a [`ReelError::Evaluation`].
    pub fn evaluation(msg: impl Into<String>) -> Self {
        Self::Evaluation(msg.into())
    }

    /// Build a [`ReelError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for ReelError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serde(e.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
