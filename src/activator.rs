// Activation functions for a single neural-network unit.
//
// The selector is a closed enum; `activator_for` is the only way to turn a
// selector into a concrete activator. Anything that isn't explicitly the
// hyperbolic tangent gets the sigmoid.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which activation function a caller is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivationFunction {
    HyperbolicTangent,
    Sigmoid,
}

impl ActivationFunction {
    /// Parse a selector name. Unrecognised names fall back to `Sigmoid`.
    ///
    /// Accepts `tanh`, `hyperbolic-tangent` and `hyperbolictangent` in any case.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "tanh" | "hyperbolic-tangent" | "hyperbolictangent" | "hyperbolic_tangent" => {
                Self::HyperbolicTangent
            }
            _ => Self::Sigmoid,
        }
    }
}

/// A concrete activation strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activator {
    HyperbolicTangent,
    Sigmoid,
}

impl Activator {
    /// Apply the activation to a weighted input sum.
    pub fn activate(&self, x: f64) -> f64 {
        match self {
            Self::HyperbolicTangent => x.tanh(),
            Self::Sigmoid => 1.0 / (1.0 + (-x).exp()),
        }
    }

    /// Derivative in terms of the already-activated output `y`.
    ///
    /// Backprop has `y` on hand, so both forms avoid recomputing the
    /// activation: `1 - y^2` for tanh and `y * (1 - y)` for the sigmoid.
    pub fn derivative(&self, output: f64) -> f64 {
        match self {
            Self::HyperbolicTangent => 1.0 - output * output,
            Self::Sigmoid => output * (1.0 - output),
        }
    }

    /// The open interval the activation maps into.
    pub fn range(&self) -> (f64, f64) {
        match self {
            Self::HyperbolicTangent => (-1.0, 1.0),
            Self::Sigmoid => (0.0, 1.0),
        }
    }
}

impl fmt::Display for Activator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HyperbolicTangent => write!(f, "tanh"),
            Self::Sigmoid => write!(f, "sigmoid"),
        }
    }
}

/// Return the activator for a selector.
pub fn activator_for(function: ActivationFunction) -> Activator {
    match function {
        ActivationFunction::HyperbolicTangent => Activator::HyperbolicTangent,
        _ => Activator::Sigmoid,
    }
}
