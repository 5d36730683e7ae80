//! Error type shared by every bundling stage

use crate::artifacts::ArtifactKey;
use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, BundleError>;

/// Every way a bundle run can fail. None of these are recovered from.
#[derive(Debug, Error)]
pub enum BundleError {
    /// Network error, non-success status, or unreadable local artifact
    #[error("Failed to retrieve {key} from {url}: {reason}")]
    Retrieval {
        key: ArtifactKey,
        url: String,
        reason: String,
    },

    #[error("Anchor '{anchor}' not found in source")]
    AnchorNotFound { anchor: String },

    #[error("No function body opens after anchor '{anchor}'")]
    MissingOpeningBrace { anchor: String },

    /// The body opened after the anchor never closed; `depth` is the open count at end of input
    #[error("Function body after anchor '{anchor}' is never closed ({depth} unclosed brace(s))")]
    UnbalancedBraces { anchor: String, depth: usize },

    #[error("Failed to parse {what}: {source}")]
    ParseFailure {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Placeholder `type ProfileName = ...;` not found in declaration template")]
    PlaceholderNotFound,

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A retrieval task was cancelled before it produced a result
    #[error("Retrieval interrupted: {0}")]
    Interrupted(String),

    /// Invalid requirement set, source URL, or paths
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Artifact {key} is missing or is not {expected}")]
    ArtifactMismatch {
        key: ArtifactKey,
        expected: &'static str,
    },
}
