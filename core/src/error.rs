use thiserror::Error;

/// Errors surfaced by the retrieval and evaluation engine.
///
/// Malformed individual run/judgment lines are not errors: they are
/// skipped where they are read. `Parse` is reserved for files that
/// cannot be understood at all (e.g. a corpus line that is not JSON).
#[derive(Debug, Error)]
pub enum RanklabError {
    /// Invalid model parameters or an unusable collection.
    #[error("configuration error: {0}")]
    Config(String),
    /// A source file could not be decoded.
    #[error("parse error in {path}: {message}")]
    Parse { path: String, message: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
