//! Error types shared by the reader, the lowering pass, and the binary.

use thiserror::Error;

/// Fatal errors. Every variant aborts the whole compilation run.
#[derive(Debug, Error)]
pub enum Error {
    /// A line of bracket-dialect input is not valid JSON after rewriting.
    #[error("line {line}: invalid AST record: {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    /// A node's argument count or element shape breaks its construct's contract.
    #[error("malformed {construct} node: {detail}")]
    Shape { construct: String, detail: String },

    /// A construct tag outside the supported set.
    #[error("unsupported construct: {0}")]
    UnsupportedConstruct(String),

    /// The pass produced IR that breaks one of its own invariants.
    #[error("internal invariant violated: {0}")]
    InternalInvariant(String),

    /// A configuration file could not be parsed.
    #[error("{path}: invalid configuration: {source}")]
    Config {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize IR: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn shape(construct: impl Into<String>, detail: impl Into<String>) -> Self {
        Error::Shape {
            construct: construct.into(),
            detail: detail.into(),
        }
    }

    pub(crate) fn invariant(detail: impl Into<String>) -> Self {
        Error::InternalInvariant(detail.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
