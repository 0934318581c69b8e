use ndarray::{Array1, ArrayView1, Zip};

use crate::activation::sigmoid_derivative;
use crate::error::{NetworkError, Result};
use crate::graph::Role;

/// Split sum-of-squares error `Σ ½ (target - output)²` of one training example,
/// together with the error signal it sends back through sigmoid output units.
pub struct HalfSquaredError {
    output: Array1<f64>,
    target: Array1<f64>,
    value: f64,
}

impl HalfSquaredError {
    /// Fails with [`NetworkError::DimensionMismatch`] unless there is one target per output.
    pub fn compute(output: ArrayView1<f64>, target: ArrayView1<f64>) -> Result<Self> {
        if output.len() != target.len() {
            return Err(NetworkError::DimensionMismatch {
                role: Role::Output,
                expected: output.len(),
                actual: target.len(),
            });
        }

        let value = Zip::from(&output)
            .and(&target)
            .fold(0.0, |loss, &output, &target| {
                loss + (target - output).powi(2) / 2.0
            });

        Ok(Self {
            output: output.to_owned(),
            target: target.to_owned(),
            value,
        })
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Derivative of the error with respect to each output's weighted input sum:
    /// `-(target - out) * out * (1 - out)`.
    pub fn deltas(&self) -> Array1<f64> {
        Zip::from(&self.output)
            .and(&self.target)
            .map_collect(|&output, &target| -(target - output) * sigmoid_derivative(output))
    }
}
