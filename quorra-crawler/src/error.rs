use crate::expander::NodeId;
use thiserror::Error;

/// Why a single node could not be expanded.
///
/// These are per-node conditions: the crawler records them and keeps going.
/// They never abort a traversal.
#[derive(Error, Debug)]
pub enum ExpandError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP status {status} for {id}")]
    BadStatus { id: NodeId, status: u16 },

    #[error("invalid node id: {0}")]
    InvalidId(String),

    #[error("node not found: {0}")]
    NotFound(NodeId),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ExpandError>;
