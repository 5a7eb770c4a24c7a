//! Failure taxonomy for container loading.
//!
//! Two tiers: `LoadError` kills the population of a single node,
//! `DecodeError` kills a single object inside it. Neither escapes the node;
//! both end up as error markers in the tree.

use thiserror::Error;

/// Container-level failure. The node shows one error marker and stays empty.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("can't read container: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed container header: {0}")]
    Header(String),

    #[error("unsupported container format revision {0}")]
    UnsupportedRevision(u32),
}

impl LoadError {
    pub fn header(msg: impl Into<String>) -> Self {
        Self::Header(msg.into())
    }
}

/// Per-object type-resolution failure, isolated to one record.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("can't resolve type of object #{path_id}: {reason}")]
pub struct DecodeError {
    pub path_id: i64,
    pub reason: String,
}

impl DecodeError {
    pub fn new(path_id: i64, reason: impl Into<String>) -> Self {
        Self {
            path_id,
            reason: reason.into(),
        }
    }
}
