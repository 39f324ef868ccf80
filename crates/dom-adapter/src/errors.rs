//! Error types for the document model

use thiserror::Error;

use crate::node::NodeId;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomError {
    /// Selector text could not be parsed
    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    /// Markup could not be parsed
    #[error("HTML parse error: {0}")]
    HtmlParse(String),

    /// Node id does not belong to this document
    #[error("Unknown node: {0}")]
    UnknownNode(NodeId),

    /// Operation needs an element but got another node kind
    #[error("Node {0} is not an element")]
    NotAnElement(NodeId),

    /// Tree mutation would produce an invalid hierarchy
    #[error("Hierarchy request error: {0}")]
    Hierarchy(String),

    /// Text offsets do not fall inside the node
    #[error("Offset out of range: {0}")]
    OffsetOutOfRange(String),

    /// Location could not be parsed or resolved
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl DomError {
    /// Get error severity level (0=low, 1=medium, 2=high, 3=critical)
    pub fn severity(&self) -> u8 {
        match self {
            DomError::UnknownNode(_) | DomError::Hierarchy(_) => 2,
            DomError::HtmlParse(_) | DomError::NotAnElement(_) => 1,
            _ => 0,
        }
    }
}

pub type DomResult<T> = Result<T, DomError>;
