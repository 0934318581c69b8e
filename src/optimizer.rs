mod gradient_descent;

pub use gradient_descent::{GradientDescent, DEFAULT_LEARNING_RATE};

/// Trait to abstract weight update rules.
pub trait Optimizer {
    /// Return the new value of `weight` given the gradient of the error with respect to it.
    fn update(&self, weight: f64, gradient: f64) -> f64;
}
