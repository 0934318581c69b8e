use std::collections::BTreeMap;

use ndarray::{ArrayView2, Axis};

use crate::error::{NetworkError, Result};
use crate::graph::{NodeId, Role};

/// One training example: a value for each node it mentions.
pub type Example = BTreeMap<NodeId, f64>;

/// Training examples addressed by a zero-based index.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExampleTable {
    examples: BTreeMap<usize, Example>,
}

impl ExampleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from a matrix whose shape is (n_examples, nodes.len()).
    /// Column `j` of each row is the value of `nodes[j]`.
    pub fn from_rows(rows: ArrayView2<f64>, nodes: &[NodeId], role: Role) -> Result<Self> {
        if rows.ncols() != nodes.len() {
            return Err(NetworkError::DimensionMismatch {
                role,
                expected: nodes.len(),
                actual: rows.ncols(),
            });
        }

        let examples = rows
            .axis_iter(Axis(0))
            .enumerate()
            .map(|(index, row)| {
                let example: Example = nodes.iter().copied().zip(row.iter().copied()).collect();
                (index, example)
            })
            .collect();
        Ok(Self { examples })
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.examples.contains_key(&index)
    }

    pub fn get(&self, index: usize) -> Option<&Example> {
        self.examples.get(&index)
    }

    /// Set one value of the example at `index`, creating the example if needed.
    pub fn set(&mut self, index: usize, node: NodeId, value: f64) {
        self.examples.entry(index).or_default().insert(node, value);
    }

    /// Examples in index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Example)> + '_ {
        self.examples.iter().map(|(&index, example)| (index, example))
    }

    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.examples.keys().copied()
    }

    /// Check that every example holds a value for exactly the given nodes.
    pub fn check_width(&self, nodes: &[NodeId], role: Role) -> Result<()> {
        for example in self.examples.values() {
            let covered = nodes.iter().all(|id| example.contains_key(id));
            if !covered || example.len() != nodes.len() {
                return Err(NetworkError::DimensionMismatch {
                    role,
                    expected: nodes.len(),
                    actual: example.len(),
                });
            }
        }
        Ok(())
    }
}
