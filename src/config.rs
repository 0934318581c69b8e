use crate::optimizer::DEFAULT_LEARNING_RATE;

/// Shape and training settings used to build a [`Network`](crate::network::Network)
/// or [`BackpropNetwork`](crate::backprop::BackpropNetwork) in one call.
#[derive(Clone, Debug, PartialEq)]
pub struct NetworkConfig {
    pub input_nodes: usize,
    pub hidden_nodes: usize,
    pub output_nodes: usize,
    /// Fully connect the layers with random weights drawn from `[-2, 2]`.
    pub create_all_connections: bool,
    pub learning_rate: f64,
    /// Seed for the weight initialisation. Without one the thread-local generator is used.
    pub seed: Option<u64>,
}

impl NetworkConfig {
    pub fn new(input_nodes: usize, hidden_nodes: usize, output_nodes: usize) -> Self {
        Self {
            input_nodes,
            hidden_nodes,
            output_nodes,
            ..Self::default()
        }
    }

    pub fn with_all_connections(self, create_all_connections: bool) -> Self {
        Self {
            create_all_connections,
            ..self
        }
    }

    pub fn with_learning_rate(self, learning_rate: f64) -> Self {
        Self {
            learning_rate,
            ..self
        }
    }

    pub fn with_seed(self, seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..self
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            input_nodes: 0,
            hidden_nodes: 0,
            output_nodes: 0,
            create_all_connections: false,
            learning_rate: DEFAULT_LEARNING_RATE,
            seed: None,
        }
    }
}
