pub mod backend;
pub mod config;
pub mod preprocess;

use ndarray::Array4;
use shared::{ClassLabel, ProbabilitySet};

/// Normalized pixel data, shape (1, H, W, 3), values in [0, 1].
/// Built per request and discarded after inference.
#[derive(Debug)]
pub struct ImageTensor(pub Array4<f32>);

/// Per-class percentages in `ClassLabel::ALL` order. Values are
/// non-negative and sum to ~100.
#[derive(Debug, Clone, PartialEq)]
pub struct Distribution([f32; ClassLabel::ALL.len()]);

impl Distribution {
    pub fn new(percents: [f32; ClassLabel::ALL.len()]) -> Self {
        Self(percents)
    }

    pub fn percent(&self, label: ClassLabel) -> f32 {
        self.0[label as usize]
    }

    /// Winning class and its confidence. Ties resolve to the first class
    /// in `ClassLabel::ALL` order.
    pub fn argmax(&self) -> (ClassLabel, f32) {
        let mut best = ClassLabel::ALL[0];
        let mut best_value = self.0[0];
        for (&label, &value) in ClassLabel::ALL.iter().zip(self.0.iter()).skip(1) {
            if value > best_value {
                best = label;
                best_value = value;
            }
        }
        (best, best_value)
    }

    pub fn to_probability_set(&self) -> ProbabilitySet {
        ProbabilitySet {
            bacterial: round_percent(self.percent(ClassLabel::Bacterial)),
            fungal: round_percent(self.percent(ClassLabel::Fungal)),
            healthy: round_percent(self.percent(ClassLabel::Healthy)),
        }
    }
}

/// One decimal place, the display precision of the API.
pub fn round_percent(value: f32) -> f32 {
    (value * 10.0).round() / 10.0
}
