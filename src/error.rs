use std::path::PathBuf;

/// Result type alias for the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Error types raised during document generation and encoding
#[derive(Debug)]
pub enum Error {
    /// An input shape cannot be represented in the requested Swagger context.
    /// Always fatal to the current generation pass.
    Generation(String),
    /// The assembled document failed a structural validator.
    Validation {
        validator: &'static str,
        message: String,
        /// Snapshot of the document that failed validation
        spec: serde_json::Value,
    },
    Serialization(String),
    Manifest { file: PathBuf, message: String },
    IoError(std::io::Error),
}

impl Error {
    pub fn generation(msg: impl Into<String>) -> Self {
        Error::Generation(msg.into())
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::Generation(msg) => write!(f, "generation error: {}", msg),
            Error::Validation {
                validator, message, ..
            } => write!(f, "spec validation failed ({}): {}", validator, message),
            Error::Serialization(msg) => write!(f, "serialization error: {}", msg),
            Error::Manifest { file, message } => {
                write!(f, "invalid manifest {}: {}", file.display(), message)
            }
            Error::IoError(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(format!("JSON serialization error: {}", err))
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Serialization(format!("YAML serialization error: {}", err))
    }
}
