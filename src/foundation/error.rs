/// Convenience result type used across slidefig.
pub type SlidefigResult<T> = Result<T, SlidefigError>;

/// Top-level error taxonomy used by library APIs.
#[derive(thiserror::Error, Debug)]
pub enum SlidefigError {
    /// Invalid or incomplete export configuration; raised before rendering starts.
    #[error("configuration error: {0}")]
    Config(String),

    /// An external collaborator (image, overlay or object source) could not deliver data.
    #[error("source error: {0}")]
    Source(String),

    /// Pixel, geometry or document construction failed for a single item.
    #[error("render error: {0}")]
    Render(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Filesystem errors at the output boundary.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapped lower-level error from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SlidefigError {
    /// Build a [`SlidefigError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`SlidefigError::Source`] value.
    pub fn source(msg: impl Into<String>) -> Self {
        Self::Source(msg.into())
    }

    /// Build a [`SlidefigError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`SlidefigError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
