//! Error types for mathfield

use miette::Diagnostic;

/// Main error type for mathfield operations
#[derive(thiserror::Error, Debug, Diagnostic)]
pub enum MathFieldError {
    /// The renderer executable could not be found or started
    #[error("math renderer `{program}` is not on your system path or could not be started")]
    #[diagnostic(
        code(mathfield::renderer::unavailable),
        help("install the renderer (Node.js by default) or point `program` at it in the config")
    )]
    ExternalToolUnavailable {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The renderer ran but wrote to its error stream
    #[error("math renderer failed: {message}")]
    #[diagnostic(code(mathfield::renderer::failed))]
    ExternalRenderError { message: String },

    /// The renderer returned a different number of fragments than it was given
    #[error("math renderer returned {actual} fragment(s), expected {expected}")]
    #[diagnostic(code(mathfield::renderer::mismatch))]
    RenderOutputMismatch { expected: usize, actual: usize },

    /// A stored value is not exactly a `raw`/`html` pair
    #[error(r#"could not resolve "{value}" to a dictionary with only keys "raw" and "html""#)]
    #[diagnostic(code(mathfield::field::malformed))]
    MalformedStoredValue { value: String },

    /// Serialization/deserialization error
    #[error(transparent)]
    #[diagnostic_source]
    Serde(#[from] SerDeError),

    /// IO error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Configuration could not be loaded or saved
    #[error("configuration error: {0}")]
    #[diagnostic(code(mathfield::config))]
    Config(String),
}

impl MathFieldError {
    pub(crate) fn malformed(value: impl ToString) -> Self {
        Self::MalformedStoredValue {
            value: value.to_string(),
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, MathFieldError::MalformedStoredValue { .. })
    }
}

/// Serialization/deserialization errors
#[derive(thiserror::Error, Debug, Diagnostic)]
#[non_exhaustive]
pub enum SerDeError {
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),
    #[error(transparent)]
    TomlSer(#[from] toml::ser::Error),
}

impl From<serde_json::Error> for MathFieldError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(SerDeError::Json(err))
    }
}

pub type Result<T, E = MathFieldError> = std::result::Result<T, E>;
