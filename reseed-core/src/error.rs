//! Error types for bracket mutation

use crate::node::NodeId;

/// Rejected swap between two bracket nodes.
///
/// The pair is invalid by construction; retrying the same swap fails again.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StructuralError {
    #[error("cannot swap node {outer:?} with {inner:?}, which lies inside it")]
    Nested { outer: NodeId, inner: NodeId },

    #[error("cannot swap leaf {leaf:?} with branch {branch:?}")]
    KindMismatch { leaf: NodeId, branch: NodeId },
}
