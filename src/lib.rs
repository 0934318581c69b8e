//! Small feedforward neural networks built node by node and trained with
//! online backpropagation.
//!
//! A [`Network`] is a graph of input, hidden and output nodes plus a bias
//! node, joined by weighted connections. [`Network::calculate`] runs the
//! sigmoid forward pass; [`BackpropNetwork`] wraps a network with indexed
//! training examples and adjusts its weights one example at a time.
//!
//! ```
//! use ndarray::arr2;
//! use synapse::{BackpropNetwork, NetworkConfig};
//!
//! let config = NetworkConfig::new(2, 3, 1).with_all_connections(true).with_seed(1);
//! let mut trainer = BackpropNetwork::with_data(
//!     &config,
//!     arr2(&[[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]]).view(),
//!     arr2(&[[0.0], [1.0], [1.0], [0.0]]).view(),
//! )?;
//! for _ in 0..40 {
//!     trainer.backpropagate()?;
//! }
//! assert_eq!(10, trainer.average_error().len());
//! # Ok::<(), synapse::NetworkError>(())
//! ```

pub mod activation;
pub mod backprop;
pub mod config;
pub mod data;
pub mod error;
pub mod graph;
pub mod loss;
pub mod network;
pub mod optimizer;

pub use backprop::BackpropNetwork;
pub use config::NetworkConfig;
pub use error::{NetworkError, Result};
pub use graph::{Connection, ConnectionId, Node, NodeId, Role, BIAS_ID};
pub use network::Network;

#[macro_export]
macro_rules! assert_rel_eq_arr1 {
    ($actual:expr, $expected:expr) => {
        assert_eq!($actual.shape(), $expected.shape());
        ndarray::Zip::from(&$actual)
            .and(&$expected)
            .for_each(|v, w| {
                assert_relative_eq!(v, w);
            });
    };
}
