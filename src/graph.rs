use std::{fmt, str::FromStr};

use crate::error::NetworkError;

/// Identity of the single bias node.
pub const BIAS_ID: &str = "BIAS";

/// The group a node belongs to. Every node carries its role explicitly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    Bias,
    Input,
    Hidden,
    Output,
}

impl Role {
    fn prefix(self) -> &'static str {
        match self {
            Role::Bias => BIAS_ID,
            Role::Input => "INPUT",
            Role::Hidden => "HIDDEN",
            Role::Output => "OUTPUT",
        }
    }

    /// Identity of the `index`-th node of this role, e.g. `HIDDEN:2`.
    pub(crate) fn node_id(self, index: usize) -> String {
        match self {
            Role::Bias => BIAS_ID.to_string(),
            _ => format!("{}:{}", self.prefix(), index),
        }
    }

    /// Whether an edge from a node of role `self` into a node of role `to` keeps
    /// the graph a layered DAG (inputs/bias -> hidden -> output).
    pub(crate) fn may_feed(self, to: Role) -> bool {
        match to {
            Role::Hidden => matches!(self, Role::Input | Role::Bias),
            Role::Output => matches!(self, Role::Input | Role::Bias | Role::Hidden),
            Role::Input | Role::Bias => false,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Bias => "bias",
            Role::Input => "input",
            Role::Hidden => "hidden",
            Role::Output => "output",
        };
        f.write_str(name)
    }
}

impl FromStr for Role {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bias" => Ok(Role::Bias),
            "input" => Ok(Role::Input),
            "hidden" => Ok(Role::Hidden),
            "output" => Ok(Role::Output),
            _ => Err(NetworkError::UnknownRole(s.to_string())),
        }
    }
}

/// Handle of a node inside its network's arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

/// Handle of a connection inside its network's arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(pub(crate) usize);

#[derive(Clone, Debug)]
pub struct Node {
    id: String,
    role: Role,
    /// Position inside the node's role group.
    index: usize,
    pub(crate) value: f64,
    /// Carried as part of the node's state; evaluation and training never read it.
    bias: f64,
    // Adjacency caches, rebuilt from the connection set on every evaluation.
    pub(crate) incoming: Vec<ConnectionId>,
    pub(crate) outgoing: Vec<ConnectionId>,
}

impl Node {
    pub(crate) fn new(role: Role, index: usize, value: f64) -> Self {
        Self {
            id: role.node_id(index),
            role,
            index,
            value,
            bias: 0.0,
            incoming: Vec::new(),
            outgoing: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    /// Connections entering this node, as of the last evaluation.
    pub fn incoming(&self) -> &[ConnectionId] {
        &self.incoming
    }

    /// Connections leaving this node, as of the last evaluation.
    pub fn outgoing(&self) -> &[ConnectionId] {
        &self.outgoing
    }
}

/// Weighted directed edge. Endpoints are handles into the owning network.
#[derive(Clone, Debug, PartialEq)]
pub struct Connection {
    pub(crate) from: NodeId,
    pub(crate) to: NodeId,
    pub(crate) weight: f64,
}

impl Connection {
    pub fn source(&self) -> NodeId {
        self.from
    }

    pub fn destination(&self) -> NodeId {
        self.to
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }
}
