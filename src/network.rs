use std::{collections::HashMap, ops::Index};

use ndarray::Array1;
use ndarray_rand::rand::{rngs::StdRng, thread_rng, Rng, SeedableRng};
use ndarray_rand::rand_distr::{Distribution, Uniform};
use tracing::{debug, trace};

use crate::activation::sigmoid;
use crate::config::NetworkConfig;
use crate::error::{NetworkError, Result};
use crate::graph::{Connection, ConnectionId, Node, NodeId, Role};

/// Bound of the interval random weights are drawn from.
const RANDOM_WEIGHT_BOUND: f64 = 2.0;

/// Directed graph of bias, input, hidden and output nodes joined by weighted
/// connections.
///
/// Nodes and connections live in arenas and are addressed by [`NodeId`] and
/// [`ConnectionId`]; the textual identities (`INPUT:0`, `HIDDEN:1:OUTPUT:0`, ...)
/// resolve through lookup tables. The graph only grows: nothing is ever removed.
///
/// Every edge is checked when it is added, so the graph is always layered
/// (inputs/bias -> hidden -> output) and evaluation cannot fail. A network has
/// no interior mutability; share it between threads behind a single lock held
/// for the whole of each evaluation or training step.
#[derive(Clone, Debug)]
pub struct Network {
    nodes: Vec<Node>,
    connections: Vec<Connection>,
    node_ids: HashMap<String, NodeId>,
    connection_ids: HashMap<(NodeId, NodeId), ConnectionId>,
    bias: NodeId,
    inputs: Vec<NodeId>,
    hidden: Vec<NodeId>,
    outputs: Vec<NodeId>,
}

impl Network {
    /// Create a network holding only the bias node.
    pub fn new() -> Self {
        let mut network = Self {
            nodes: Vec::new(),
            connections: Vec::new(),
            node_ids: HashMap::new(),
            connection_ids: HashMap::new(),
            bias: NodeId(0),
            inputs: Vec::new(),
            hidden: Vec::new(),
            outputs: Vec::new(),
        };
        network.bias = network.push_node(Role::Bias, 0, 1.0);
        network
    }

    /// Create the nodes described by `config` and, if asked for, connect every
    /// layer with random weights.
    pub fn from_config(config: &NetworkConfig) -> Self {
        let mut network = Self::new();
        network.create_nodes(config.input_nodes, config.hidden_nodes, config.output_nodes);
        if config.create_all_connections {
            match config.seed {
                Some(seed) => {
                    network.create_all_connections_random(&mut StdRng::seed_from_u64(seed))
                }
                None => network.create_all_connections_random(&mut thread_rng()),
            }
        }
        network
    }

    /// Append `inputs` input nodes, `hidden` hidden nodes and `outputs` output nodes.
    pub fn create_nodes(&mut self, inputs: usize, hidden: usize, outputs: usize) {
        for _ in 0..inputs {
            self.add_input(0.0);
        }
        for _ in 0..hidden {
            self.add_hidden();
        }
        for _ in 0..outputs {
            self.add_output();
        }
        debug!(inputs, hidden, outputs, "created nodes");
    }

    pub fn add_input(&mut self, value: f64) -> NodeId {
        let id = self.push_node(Role::Input, self.inputs.len(), value);
        self.inputs.push(id);
        id
    }

    pub fn add_hidden(&mut self) -> NodeId {
        let id = self.push_node(Role::Hidden, self.hidden.len(), 0.0);
        self.hidden.push(id);
        id
    }

    pub fn add_output(&mut self) -> NodeId {
        let id = self.push_node(Role::Output, self.outputs.len(), 0.0);
        self.outputs.push(id);
        id
    }

    fn push_node(&mut self, role: Role, index: usize, value: f64) -> NodeId {
        let id = NodeId(self.nodes.len());
        let node = Node::new(role, index, value);
        self.node_ids.insert(node.id().to_string(), id);
        self.nodes.push(node);
        id
    }

    /// Connect the nodes with identities `from` and `to`, replacing the weight
    /// of an existing connection between the same ordered pair.
    pub fn add_connection(&mut self, from: &str, to: &str, weight: f64) -> Result<ConnectionId> {
        let from = self.resolve(from)?;
        let to = self.resolve(to)?;
        self.connect(from, to, weight)
    }

    /// Same as [`Network::add_connection`], addressing the endpoints by handle.
    pub fn connect(&mut self, from: NodeId, to: NodeId, weight: f64) -> Result<ConnectionId> {
        let source = self.checked_node(from)?;
        let destination = self.checked_node(to)?;
        if !source.role().may_feed(destination.role()) {
            return Err(NetworkError::InvalidTopology {
                from: source.id().to_string(),
                to: destination.id().to_string(),
            });
        }
        Ok(self.insert_connection(from, to, weight))
    }

    fn insert_connection(&mut self, from: NodeId, to: NodeId, weight: f64) -> ConnectionId {
        if let Some(&id) = self.connection_ids.get(&(from, to)) {
            trace!(
                from = self.nodes[from.0].id(),
                to = self.nodes[to.0].id(),
                weight,
                "overwriting connection"
            );
            self.connections[id.0].weight = weight;
            return id;
        }
        let id = ConnectionId(self.connections.len());
        self.connections.push(Connection { from, to, weight });
        self.connection_ids.insert((from, to), id);
        id
    }

    /// Fully connect the layers with weight 1: every input to every hidden node,
    /// every hidden node to every output, and the bias to every hidden and output node.
    pub fn create_all_connections(&mut self) {
        self.connect_layers(|| 1.0);
    }

    /// Like [`Network::create_all_connections`], with every weight drawn
    /// independently and uniformly from `[-2, 2]`.
    pub fn create_all_connections_random<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let between = Uniform::new_inclusive(-RANDOM_WEIGHT_BOUND, RANDOM_WEIGHT_BOUND);
        self.connect_layers(|| between.sample(rng));
    }

    fn connect_layers(&mut self, mut weight: impl FnMut() -> f64) {
        for i in 0..self.inputs.len() {
            for j in 0..self.hidden.len() {
                self.insert_connection(self.inputs[i], self.hidden[j], weight());
            }
        }
        for k in 0..self.hidden.len() {
            for l in 0..self.outputs.len() {
                self.insert_connection(self.hidden[k], self.outputs[l], weight());
            }
            self.insert_connection(self.bias, self.hidden[k], weight());
        }
        for m in 0..self.outputs.len() {
            self.insert_connection(self.bias, self.outputs[m], weight());
        }
        debug!(connections = self.connections.len(), "connected all layers");
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn node_by_id(&self, id: &str) -> Option<&Node> {
        self.node_ids.get(id).map(|&id| &self.nodes[id.0])
    }

    /// Handle of the node with the given identity.
    pub fn node_id(&self, id: &str) -> Option<NodeId> {
        self.node_ids.get(id).copied()
    }

    /// The `index`-th node of an input, hidden or output group.
    /// Returns `None` for the bias role and for indices out of range.
    pub fn node_at(&self, role: Role, index: usize) -> Option<&Node> {
        let group = match role {
            Role::Input => &self.inputs,
            Role::Hidden => &self.hidden,
            Role::Output => &self.outputs,
            Role::Bias => return None,
        };
        group.get(index).map(|id| &self.nodes[id.0])
    }

    pub fn bias(&self) -> NodeId {
        self.bias
    }

    pub fn inputs(&self) -> &[NodeId] {
        &self.inputs
    }

    pub fn hidden(&self) -> &[NodeId] {
        &self.hidden
    }

    pub fn outputs(&self) -> &[NodeId] {
        &self.outputs
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn connection(&self, id: ConnectionId) -> Option<&Connection> {
        self.connections.get(id.0)
    }

    pub fn connection_between(&self, from: &str, to: &str) -> Option<&Connection> {
        let key = (self.node_id(from)?, self.node_id(to)?);
        self.connection_ids.get(&key).map(|id| &self.connections[id.0])
    }

    /// All connections in insertion order.
    pub fn connections(&self) -> impl Iterator<Item = (ConnectionId, &Connection)> + '_ {
        self.connections
            .iter()
            .enumerate()
            .map(|(i, connection)| (ConnectionId(i), connection))
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Textual identity of a connection, `"<from>:<to>"`.
    pub fn connection_label(&self, connection: &Connection) -> String {
        format!(
            "{}:{}",
            self.nodes[connection.from.0].id(),
            self.nodes[connection.to.0].id()
        )
    }

    pub(crate) fn set_weight(&mut self, id: ConnectionId, weight: f64) {
        self.connections[id.0].weight = weight;
    }

    /// Set the value of a single node. The bias node is fixed at 1.
    pub fn set_node_value(&mut self, id: &str, value: f64) -> Result<()> {
        let id = self.resolve(id)?;
        if id == self.bias {
            return Err(NetworkError::FixedBias);
        }
        self.nodes[id.0].value = value;
        Ok(())
    }

    /// Assign `values` to the input nodes, in order.
    pub fn set_inputs(&mut self, values: &[f64]) -> Result<()> {
        if values.len() != self.inputs.len() {
            return Err(NetworkError::DimensionMismatch {
                role: Role::Input,
                expected: self.inputs.len(),
                actual: values.len(),
            });
        }
        for (&id, &value) in self.inputs.iter().zip(values) {
            self.nodes[id.0].value = value;
        }
        Ok(())
    }

    /// Set several node values at once. Nothing is written unless every
    /// identity resolves to a settable node.
    pub fn set_multiple_node_values<'a, I>(&mut self, values: I) -> Result<()>
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        let mut resolved = Vec::new();
        for (id, value) in values {
            let id = self.resolve(id)?;
            if id == self.bias {
                return Err(NetworkError::FixedBias);
            }
            resolved.push((id, value));
        }
        for (id, value) in resolved {
            self.nodes[id.0].value = value;
        }
        Ok(())
    }

    pub(crate) fn set_value(&mut self, id: NodeId, value: f64) {
        self.nodes[id.0].value = value;
    }

    /// Current values of the output nodes, in order.
    pub fn output_values(&self) -> Array1<f64> {
        self.outputs.iter().map(|id| self.nodes[id.0].value).collect()
    }

    /// Propagate the current input values through the network: every hidden
    /// node, then every output node, takes the sigmoid of its weighted input sum.
    pub fn calculate(&mut self) {
        self.update_node_connections();
        for i in 0..self.hidden.len() {
            self.calculate_node_value(self.hidden[i]);
        }
        for j in 0..self.outputs.len() {
            self.calculate_node_value(self.outputs[j]);
        }
        trace!(outputs = ?self.output_values().to_vec(), "calculated network");
    }

    // Recomputed from scratch on every evaluation. Cheap next to the forward
    // pass for small graphs; cache it against connection-set mutations if that changes.
    fn update_node_connections(&mut self) {
        for node in &mut self.nodes {
            node.incoming.clear();
            node.outgoing.clear();
        }
        for (i, connection) in self.connections.iter().enumerate() {
            self.nodes[connection.from.0].outgoing.push(ConnectionId(i));
            self.nodes[connection.to.0].incoming.push(ConnectionId(i));
        }
    }

    fn calculate_node_value(&mut self, id: NodeId) {
        let sum = self.nodes[id.0]
            .incoming
            .iter()
            .map(|c| {
                let connection = &self.connections[c.0];
                self.nodes[connection.from.0].value * connection.weight
            })
            .sum::<f64>();
        self.nodes[id.0].value = sigmoid(sum);
    }

    fn resolve(&self, id: &str) -> Result<NodeId> {
        self.node_id(id)
            .ok_or_else(|| NetworkError::UnknownNode(id.to_string()))
    }

    fn checked_node(&self, id: NodeId) -> Result<&Node> {
        self.nodes
            .get(id.0)
            .ok_or_else(|| NetworkError::UnknownNode(format!("#{}", id.0)))
    }
}

impl Default for Network {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<NodeId> for Network {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }
}

impl Index<ConnectionId> for Network {
    type Output = Connection;

    fn index(&self, id: ConnectionId) -> &Connection {
        &self.connections[id.0]
    }
}

#[cfg(test)]
mod tests {
    use crate::assert_rel_eq_arr1;

    use super::*;

    use crate::graph::BIAS_ID;
    use approx::assert_relative_eq;
    use ndarray::arr1;

    fn fully_connected(inputs: usize, hidden: usize, outputs: usize) -> Network {
        let mut network = Network::new();
        network.create_nodes(inputs, hidden, outputs);
        network.create_all_connections();
        network
    }

    #[test]
    fn new_network_has_only_bias() {
        let network = Network::new();
        assert_eq!(1, network.node_count());
        let bias = network.node_by_id("BIAS").unwrap();
        assert_eq!(Role::Bias, bias.role());
        assert_eq!(1.0, bias.value());
        assert_eq!(network.bias(), network.node_id("BIAS").unwrap());
    }

    #[test]
    fn nodes_get_sequential_ids() {
        let mut network = Network::new();
        network.add_input(0.25);
        network.add_input(0.0);
        network.add_hidden();
        network.add_output();

        assert_eq!(0.25, network.node_by_id("INPUT:0").unwrap().value());
        assert!(network.node_by_id("INPUT:1").is_some());
        assert_eq!(0.0, network.node_by_id("HIDDEN:0").unwrap().value());
        assert!(network.node_by_id("OUTPUT:0").is_some());
        assert!(network.node_by_id("OUTPUT:1").is_none());
    }

    #[test]
    fn lookup_by_role_and_index() {
        let network = fully_connected(2, 3, 1);
        assert_eq!("INPUT:1", network.node_at(Role::Input, 1).unwrap().id());
        assert_eq!("HIDDEN:2", network.node_at(Role::Hidden, 2).unwrap().id());
        assert_eq!("OUTPUT:0", network.node_at(Role::Output, 0).unwrap().id());
        assert!(network.node_at(Role::Hidden, 3).is_none());
        assert!(network.node_at(Role::Bias, 0).is_none());
    }

    #[test]
    fn add_connection_overwrites_same_pair() {
        let mut network = Network::new();
        network.create_nodes(1, 1, 0);
        let first = network.add_connection("INPUT:0", "HIDDEN:0", 1.0).unwrap();
        let second = network.add_connection("INPUT:0", "HIDDEN:0", -0.5).unwrap();

        assert_eq!(first, second);
        assert_eq!(1, network.connection_count());
        let connection = network.connection_between("INPUT:0", "HIDDEN:0").unwrap();
        assert_eq!(-0.5, connection.weight());
        assert_eq!("INPUT:0:HIDDEN:0", network.connection_label(connection));
    }

    #[test]
    fn add_connection_rejects_unknown_nodes() {
        let mut network = Network::new();
        network.create_nodes(1, 1, 0);
        assert_eq!(
            Err(NetworkError::UnknownNode("HIDDEN:5".to_string())),
            network.add_connection("INPUT:0", "HIDDEN:5", 1.0)
        );
        assert_eq!(0, network.connection_count());
    }

    #[test]
    fn add_connection_rejects_non_layered_edges() {
        let mut network = Network::new();
        network.create_nodes(1, 2, 1);
        for (from, to) in [
            ("HIDDEN:0", "HIDDEN:1"),
            ("OUTPUT:0", "HIDDEN:0"),
            ("HIDDEN:0", "INPUT:0"),
            ("INPUT:0", "BIAS"),
            ("OUTPUT:0", "OUTPUT:0"),
        ] {
            assert_eq!(
                Err(NetworkError::InvalidTopology {
                    from: from.to_string(),
                    to: to.to_string(),
                }),
                network.add_connection(from, to, 1.0)
            );
        }
        assert!(network.add_connection("INPUT:0", "OUTPUT:0", 1.0).is_ok());
    }

    #[test]
    fn create_all_connections_counts() {
        let network = fully_connected(2, 3, 1);
        assert_eq!(2 * 3 + 3 * 1 + 3 + 1, network.connection_count());
        assert!(network.connections().all(|(_, c)| c.weight() == 1.0));
        assert!(network.connection_between("BIAS", "HIDDEN:2").is_some());
        assert!(network.connection_between("BIAS", "OUTPUT:0").is_some());
        assert!(network.connection_between("INPUT:0", "OUTPUT:0").is_none());
    }

    #[test]
    fn random_connections_are_bounded_and_reproducible() {
        let build = |seed| {
            let mut network = Network::new();
            network.create_nodes(2, 3, 1);
            network.create_all_connections_random(&mut StdRng::seed_from_u64(seed));
            network
                .connections()
                .map(|(_, c)| c.weight())
                .collect::<Vec<_>>()
        };

        let weights = build(42);
        assert_eq!(13, weights.len());
        assert!(weights.iter().all(|w| (-2.0..=2.0).contains(w)));
        assert_eq!(weights, build(42));
        assert_ne!(weights, build(43));
    }

    #[test]
    fn from_config_with_seed() {
        let config = NetworkConfig::new(2, 2, 1)
            .with_all_connections(true)
            .with_seed(3);
        let a = Network::from_config(&config);
        let b = Network::from_config(&config);
        assert_eq!(3, a.inputs().len() + a.outputs().len());
        assert_eq!(9, a.connection_count());
        assert!(a.connections().zip(b.connections()).all(|(x, y)| x == y));
    }

    #[test]
    fn from_config_without_connections() {
        let network = Network::from_config(&NetworkConfig::new(3, 2, 2));
        assert_eq!(1 + 3 + 2 + 2, network.node_count());
        assert_eq!(0, network.connection_count());
    }

    #[test]
    fn no_connections_gives_one_half() {
        let mut network = Network::new();
        network.create_nodes(2, 3, 2);
        network.set_inputs(&[0.7, -3.0]).unwrap();
        network.calculate();

        for &id in network.hidden().iter().chain(network.outputs()) {
            assert_eq!(0.5, network.node(id).unwrap().value());
        }
    }

    #[test]
    fn calculate_fully_connected() {
        let mut network = fully_connected(2, 2, 1);
        network.set_inputs(&[1.0, 0.0]).unwrap();
        network.calculate();

        assert_relative_eq!(
            0.8807970779778823,
            network.node_by_id("HIDDEN:0").unwrap().value()
        );
        assert_relative_eq!(
            0.8807970779778823,
            network.node_by_id("HIDDEN:1").unwrap().value()
        );
        assert_rel_eq_arr1!(network.output_values(), arr1(&[0.9405648141721128]));
    }

    #[test]
    fn calculate_partial_topology() {
        let mut network = Network::new();
        network.create_nodes(1, 1, 1);
        network.add_connection("INPUT:0", "HIDDEN:0", 0.5).unwrap();
        network.add_connection(BIAS_ID, "HIDDEN:0", -1.0).unwrap();
        network.add_connection("HIDDEN:0", "OUTPUT:0", 2.0).unwrap();
        network.set_node_value("INPUT:0", 3.0).unwrap();
        network.calculate();

        assert_relative_eq!(
            0.6224593312018546,
            network.node_by_id("HIDDEN:0").unwrap().value()
        );
        assert_rel_eq_arr1!(network.output_values(), arr1(&[0.7764190180520172]));
    }

    #[test]
    fn calculate_is_deterministic() {
        let mut network = fully_connected(3, 4, 2);
        network.create_all_connections_random(&mut StdRng::seed_from_u64(11));
        network.set_inputs(&[0.1, 0.9, -0.4]).unwrap();

        network.calculate();
        let first = network.output_values();
        let first_cache = network
            .node_by_id("HIDDEN:1")
            .map(|n| (n.incoming().to_vec(), n.outgoing().to_vec()))
            .unwrap();

        network.calculate();
        assert_eq!(first, network.output_values());
        let second_cache = network
            .node_by_id("HIDDEN:1")
            .map(|n| (n.incoming().to_vec(), n.outgoing().to_vec()))
            .unwrap();
        assert_eq!(first_cache, second_cache);
        assert_eq!(3 + 1, first_cache.0.len());
        assert_eq!(2, first_cache.1.len());
    }

    #[test]
    fn inputs_and_bias_are_not_recomputed() {
        let mut network = fully_connected(2, 1, 1);
        network.set_inputs(&[4.0, -2.0]).unwrap();
        network.calculate();

        assert_eq!(4.0, network.node_by_id("INPUT:0").unwrap().value());
        assert_eq!(-2.0, network.node_by_id("INPUT:1").unwrap().value());
        assert_eq!(1.0, network.node_by_id("BIAS").unwrap().value());
    }

    #[test]
    fn set_inputs_checks_length() {
        let mut network = fully_connected(2, 1, 1);
        assert_eq!(
            Err(NetworkError::DimensionMismatch {
                role: Role::Input,
                expected: 2,
                actual: 3,
            }),
            network.set_inputs(&[1.0, 2.0, 3.0])
        );
    }

    #[test]
    fn set_node_values() {
        let mut network = fully_connected(2, 1, 1);
        network
            .set_multiple_node_values([("INPUT:0", 0.3), ("INPUT:1", 0.6)])
            .unwrap();
        assert_eq!(0.3, network.node_by_id("INPUT:0").unwrap().value());
        assert_eq!(0.6, network.node_by_id("INPUT:1").unwrap().value());

        assert_eq!(
            Err(NetworkError::UnknownNode("INPUT:9".to_string())),
            network.set_multiple_node_values([("INPUT:0", 1.0), ("INPUT:9", 1.0)])
        );
        assert_eq!(0.3, network.node_by_id("INPUT:0").unwrap().value());

        assert_eq!(Err(NetworkError::FixedBias), network.set_node_value("BIAS", 0.0));
    }
}
