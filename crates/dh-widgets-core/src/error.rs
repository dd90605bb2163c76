//! Error types for the document tree.

use crate::dom::NodeId;

/// Result type for document operations.
pub type DomResult<T> = std::result::Result<T, DomError>;

/// Errors that can occur while manipulating a [`Document`](crate::Document).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    /// The node ID is invalid or the node has been removed.
    #[error("Invalid or removed node {0:?}")]
    InvalidNode(NodeId),

    /// Attempted to insert a node into itself or one of its descendants.
    #[error("Cannot insert node {child:?} into its own subtree at {parent:?}")]
    CircularParentage {
        /// The node that would have become the parent.
        parent: NodeId,
        /// The node being inserted.
        child: NodeId,
    },

    /// Attempted to give children to a node that cannot hold them.
    #[error("Node {0:?} cannot have children")]
    NotAContainer(NodeId),

    /// The document structure nodes (`<html>`, `<head>`, `<body>`) cannot be removed.
    #[error("Node {0:?} is a document structure node and cannot be removed")]
    StructuralNode(NodeId),
}
