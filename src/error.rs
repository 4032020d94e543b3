//! Compilation errors.
//!
//! Everything that can abort a single file's compilation is a `CompileError`.
//! Conversion gaps (unknown syntax kinds) and generation gaps (no strategy
//! for a node) are deliberately NOT errors: they erase to placeholder nodes
//! or empty output and are logged instead.

use std::path::PathBuf;
use thiserror::Error;

pub type CompileResult<T> = Result<T, CompileError>;

#[derive(Debug, Error)]
pub enum CompileError {
    /// The external parse boundary rejected the source text.
    #[error("parse error in {file}: {message}")]
    Parse { file: String, message: String },

    /// The JSON tree from the parse boundary is structurally unusable
    /// (missing discriminator, wrong field shape).
    #[error("malformed syntax tree: {message}")]
    MalformedTree { message: String },

    /// A pipeline stage claimed a node but could not complete it.
    #[error("transformation failed on {node_kind}: {message}")]
    Transform { node_kind: String, message: String },

    /// Persisting generated output failed.
    #[error("failed to write {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CompileError {
    pub fn transform(node_kind: impl Into<String>, message: impl Into<String>) -> Self {
        CompileError::Transform {
            node_kind: node_kind.into(),
            message: message.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        CompileError::MalformedTree {
            message: message.into(),
        }
    }
}
