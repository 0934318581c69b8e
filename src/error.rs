use thiserror::Error;

use crate::graph::Role;

pub type Result<T> = std::result::Result<T, NetworkError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum NetworkError {
    /// A node identity that is not part of the network.
    #[error("unknown node `{0}`")]
    UnknownNode(String),

    /// A vector whose length disagrees with the size of a node group.
    #[error("expected {expected} {role} values, got {actual}")]
    DimensionMismatch {
        role: Role,
        expected: usize,
        actual: usize,
    },

    /// No training example is stored at the requested index.
    #[error("no training example at index {index}")]
    MissingExample { index: usize },

    /// The target example exists but says nothing about one of the outputs.
    #[error("training example {index} has no target for `{node}`")]
    MissingTarget { index: usize, node: String },

    /// An edge that would break the input/bias -> hidden -> output layering.
    #[error("connection `{from}` -> `{to}` does not fit the layered topology")]
    InvalidTopology { from: String, to: String },

    #[error("node `{node}` is a {actual} node, expected {expected}")]
    RoleMismatch {
        node: String,
        expected: Role,
        actual: Role,
    },

    #[error("the bias node's value is fixed at 1")]
    FixedBias,

    #[error("unknown node role `{0}`")]
    UnknownRole(String),
}
