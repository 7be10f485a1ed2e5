//! Feed-forward scorer for the learned policy
//!
//! Weights are fitted elsewhere and handed over as JSON:
//!
//! ```json
//! { "layers": [
//!     { "weights": [[0.1, -0.4], ...], "bias": [0.0, ...], "activation": "relu" },
//!     { "weights": [[...]], "bias": [0.2], "activation": "sigmoid" }
//! ] }
//! ```
//!
//! `weights` is row-major, one row per output unit. The first layer takes the
//! normalized `[y, gap_bottom]` pair and the last layer emits one value.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, PolicyError, Result};
use crate::sim::policy::Scorer;

/// Input width the simulation feeds the scorer
pub const INPUT_DIM: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    Relu,
    #[default]
    Linear,
    Sigmoid,
}

impl Activation {
    #[inline]
    fn apply(self, x: f32) -> f32 {
        match self {
            Activation::Relu => x.max(0.0),
            Activation::Linear => x,
            Activation::Sigmoid => 1.0 / (1.0 + (-x).exp()),
        }
    }
}

/// One fully connected layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dense {
    pub weights: Vec<Vec<f32>>,
    pub bias: Vec<f32>,
    #[serde(default)]
    pub activation: Activation,
}

impl Dense {
    pub fn inputs(&self) -> usize {
        self.weights.first().map_or(0, Vec::len)
    }

    pub fn outputs(&self) -> usize {
        self.weights.len()
    }

    fn forward(&self, input: &[f32]) -> Vec<f32> {
        self.weights
            .iter()
            .zip(&self.bias)
            .map(|(row, b)| {
                let sum: f32 = row.iter().zip(input).map(|(w, x)| w * x).sum();
                self.activation.apply(sum + b)
            })
            .collect()
    }
}

/// A small multi-layer perceptron
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseNet {
    pub layers: Vec<Dense>,
}

impl DenseNet {
    /// Build a network, checking that layer shapes chain from 2 inputs to 1 output
    pub fn new(layers: Vec<Dense>) -> Result<Self> {
        let net = Self { layers };
        net.validate()?;
        Ok(net)
    }

    /// Load weights from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let net: DenseNet = serde_json::from_str(&json)?;
        net.validate()?;
        log::info!(
            "Loaded model from {} ({} layers)",
            path.display(),
            net.layers.len()
        );
        Ok(net)
    }

    pub fn validate(&self) -> Result<()> {
        if self.layers.is_empty() {
            return Err(Error::Model("network has no layers".into()));
        }
        let mut width = INPUT_DIM;
        for (i, layer) in self.layers.iter().enumerate() {
            if layer.outputs() == 0 {
                return Err(Error::Model(format!("layer {i} has no units")));
            }
            if layer.bias.len() != layer.outputs() {
                return Err(Error::Model(format!(
                    "layer {i} has {} biases for {} units",
                    layer.bias.len(),
                    layer.outputs()
                )));
            }
            if let Some(row) = layer.weights.iter().position(|r| r.len() != width) {
                return Err(Error::Model(format!(
                    "layer {i} row {row} expects {} inputs, previous layer gives {width}",
                    layer.weights[row].len()
                )));
            }
            width = layer.outputs();
        }
        if width != 1 {
            return Err(Error::Model(format!("network emits {width} values, expected 1")));
        }
        Ok(())
    }
}

impl Scorer for DenseNet {
    fn score(&self, input: [f32; 2]) -> std::result::Result<f32, PolicyError> {
        let mut activations = input.to_vec();
        for (i, layer) in self.layers.iter().enumerate() {
            if layer.inputs() != activations.len() {
                return Err(PolicyError::Shape(format!(
                    "layer {i} expects {} inputs, got {}",
                    layer.inputs(),
                    activations.len()
                )));
            }
            activations = layer.forward(&activations);
        }
        match activations.as_slice() {
            [score] => Ok(*score),
            other => Err(PolicyError::Shape(format!(
                "network emitted {} values",
                other.len()
            ))),
        }
    }
}
