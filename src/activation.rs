/// Logistic function `1 / (1 + e^-t)`.
pub fn sigmoid(t: f64) -> f64 {
    1.0 / (1.0 + (-t).exp())
}

/// Derivative of the sigmoid, written in terms of its output `y = sigmoid(t)`.
pub fn sigmoid_derivative(y: f64) -> f64 {
    y * (1.0 - y)
}
