use ndarray::{Array1, ArrayView2};
use tracing::{debug, trace};

use crate::activation::sigmoid_derivative;
use crate::config::NetworkConfig;
use crate::data::ExampleTable;
use crate::error::{NetworkError, Result};
use crate::graph::{ConnectionId, Role};
use crate::loss::HalfSquaredError;
use crate::network::Network;
use crate::optimizer::{GradientDescent, Optimizer};

/// A [`Network`] trained by online backpropagation against indexed examples.
///
/// Each call to [`BackpropNetwork::backpropagate`] advances a cursor over the
/// examples and trains on the one it lands on. The cursor is advanced *before*
/// training, so the first step after construction uses example 1. When the
/// cursor runs past the last example the epoch is closed: the accumulated error
/// divided by the cursor position is appended to [`average_error`], the
/// accumulator is cleared and the same step trains on example 0.
///
/// [`average_error`]: BackpropNetwork::average_error
#[derive(Clone, Debug)]
pub struct BackpropNetwork {
    network: Network,
    input_data: ExampleTable,
    target_data: ExampleTable,
    optimizer: GradientDescent,
    iteration: usize,
    total_error_sum: f64,
    average_error: Vec<f64>,
}

impl BackpropNetwork {
    pub fn new(network: Network) -> Self {
        Self {
            network,
            input_data: ExampleTable::new(),
            target_data: ExampleTable::new(),
            optimizer: GradientDescent::default(),
            iteration: 0,
            total_error_sum: 0.0,
            average_error: Vec::new(),
        }
    }

    pub fn from_config(config: &NetworkConfig) -> Self {
        let mut trainer = Self::new(Network::from_config(config));
        trainer.set_learning_rate(config.learning_rate);
        trainer
    }

    /// Build from `config` and load the training examples in one go.
    /// Rows of `inputs` and `targets` are examples, in order.
    pub fn with_data(
        config: &NetworkConfig,
        inputs: ArrayView2<f64>,
        targets: ArrayView2<f64>,
    ) -> Result<Self> {
        let mut trainer = Self::from_config(config);
        trainer.set_input_data(inputs)?;
        trainer.set_target_data(targets)?;
        Ok(trainer)
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn network_mut(&mut self) -> &mut Network {
        &mut self.network
    }

    pub fn into_network(self) -> Network {
        self.network
    }

    pub fn learning_rate(&self) -> f64 {
        self.optimizer.learning_rate()
    }

    pub fn set_learning_rate(&mut self, learning_rate: f64) {
        self.optimizer = GradientDescent::new(learning_rate);
    }

    /// Index of the example used by the last training step.
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    /// Error accumulated over the current epoch so far.
    pub fn total_error_sum(&self) -> f64 {
        self.total_error_sum
    }

    /// Mean error of every completed epoch, oldest first.
    pub fn average_error(&self) -> &[f64] {
        &self.average_error
    }

    pub fn input_data(&self) -> &ExampleTable {
        &self.input_data
    }

    pub fn target_data(&self) -> &ExampleTable {
        &self.target_data
    }

    /// Replace the input examples. Column `j` feeds input node `j`.
    pub fn set_input_data(&mut self, inputs: ArrayView2<f64>) -> Result<()> {
        self.input_data = ExampleTable::from_rows(inputs, self.network.inputs(), Role::Input)?;
        Ok(())
    }

    /// Replace the target examples. Column `j` is the target of output node `j`.
    pub fn set_target_data(&mut self, targets: ArrayView2<f64>) -> Result<()> {
        self.target_data = ExampleTable::from_rows(targets, self.network.outputs(), Role::Output)?;
        Ok(())
    }

    /// Set the target of one output node in the current example.
    pub fn add_target(&mut self, output: &str, target: f64) -> Result<()> {
        let id = self
            .network
            .node_id(output)
            .ok_or_else(|| NetworkError::UnknownNode(output.to_string()))?;
        let role = self.network[id].role();
        if role != Role::Output {
            return Err(NetworkError::RoleMismatch {
                node: output.to_string(),
                expected: Role::Output,
                actual: role,
            });
        }
        self.target_data.set(self.iteration, id, target);
        Ok(())
    }

    /// Split sum-of-squares error of the current output values against the
    /// current example's targets.
    pub fn total_error(&self) -> Result<f64> {
        let targets = self.targets(self.iteration)?;
        let loss = HalfSquaredError::compute(self.network.output_values().view(), targets.view())?;
        Ok(loss.value())
    }

    fn targets(&self, index: usize) -> Result<Array1<f64>> {
        let example = self
            .target_data
            .get(index)
            .ok_or(NetworkError::MissingExample { index })?;
        self.network
            .outputs()
            .iter()
            .map(|&id| {
                example
                    .get(&id)
                    .copied()
                    .ok_or_else(|| NetworkError::MissingTarget {
                        index,
                        node: self.network[id].id().to_string(),
                    })
            })
            .collect()
    }

    // Inputs and targets must pair up index for index and cover the node
    // groups as they are now.
    fn check_data(&self) -> Result<()> {
        let unpaired = self
            .input_data
            .indices()
            .filter(|&index| !self.target_data.contains(index))
            .chain(
                self.target_data
                    .indices()
                    .filter(|&index| !self.input_data.contains(index)),
            )
            .min();
        if let Some(index) = unpaired {
            return Err(NetworkError::MissingExample { index });
        }
        if self.input_data.is_empty() {
            return Err(NetworkError::MissingExample { index: 0 });
        }
        self.input_data.check_width(self.network.inputs(), Role::Input)?;
        self.target_data.check_width(self.network.outputs(), Role::Output)
    }

    /// Run one training step. Every check happens before anything is touched,
    /// so a failed step leaves the cursor, the error history and all weights as
    /// they were.
    pub fn backpropagate(&mut self) -> Result<()> {
        self.check_data()?;

        let next = self.iteration + 1;
        let wraps = !self.input_data.contains(next);
        let index = if wraps { 0 } else { next };

        let inputs = self
            .input_data
            .get(index)
            .ok_or(NetworkError::MissingExample { index })?
            .iter()
            .map(|(&id, &value)| (id, value))
            .collect::<Vec<_>>();
        let targets = self.targets(index)?;

        if wraps {
            let mean_error = self.total_error_sum / next as f64;
            self.average_error.push(mean_error);
            self.total_error_sum = 0.0;
            debug!(epoch = self.average_error.len(), mean_error, "completed epoch");
        }
        self.iteration = index;

        for (id, value) in inputs {
            self.network.set_value(id, value);
        }
        self.network.calculate();

        let loss = HalfSquaredError::compute(self.network.output_values().view(), targets.view())?;
        self.total_error_sum += loss.value();
        trace!(iteration = index, error = loss.value(), "training step");

        let weights = self.new_weights(&loss.deltas());
        for (id, weight) in weights {
            self.network.set_weight(id, weight);
        }
        Ok(())
    }

    // Computes every updated weight from the current (pre-update) weights.
    // `output_deltas[j]` is the error signal at output node `j`'s net input.
    fn new_weights(&self, output_deltas: &Array1<f64>) -> Vec<(ConnectionId, f64)> {
        let network = &self.network;
        let mut weights = Vec::new();

        for (&output, &delta) in network.outputs().iter().zip(output_deltas) {
            for &id in network[output].incoming() {
                let connection = &network[id];
                let gradient = delta * network[connection.source()].value();
                weights.push((id, self.optimizer.update(connection.weight(), gradient)));
            }
        }

        for &hidden in network.hidden() {
            let node = &network[hidden];
            // Hidden nodes only feed output nodes.
            let total = node
                .outgoing()
                .iter()
                .map(|&id| {
                    let connection = &network[id];
                    output_deltas[network[connection.destination()].index()] * connection.weight()
                })
                .sum::<f64>();
            let delta = total * sigmoid_derivative(node.value());

            for &id in node.incoming() {
                let connection = &network[id];
                let gradient = delta * network[connection.source()].value();
                weights.push((id, self.optimizer.update(connection.weight(), gradient)));
            }
        }

        weights
    }
}
