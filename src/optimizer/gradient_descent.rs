use crate::optimizer::Optimizer;

pub const DEFAULT_LEARNING_RATE: f64 = 0.5;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradientDescent {
    learning_rate: f64,
}

impl GradientDescent {
    pub fn new(learning_rate: f64) -> Self {
        Self { learning_rate }
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }
}

impl Default for GradientDescent {
    fn default() -> Self {
        Self::new(DEFAULT_LEARNING_RATE)
    }
}

impl Optimizer for GradientDescent {
    fn update(&self, weight: f64, gradient: f64) -> f64 {
        weight - self.learning_rate * gradient
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn update_gradient_descent() {
        let opt = GradientDescent::new(0.5);
        assert_relative_eq!(0.5, opt.update(1.0, 1.0));
        assert_relative_eq!(2.25, opt.update(2.0, -0.5));
        assert_relative_eq!(2.9, opt.update(3.0, 0.2));
    }

    #[test]
    fn default_learning_rate() {
        assert_eq!(0.5, GradientDescent::default().learning_rate());
    }
}
