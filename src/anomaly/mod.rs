//! Isolation-forest fire-risk scorer.
//!
//! An isolation tree splits feature space at fixed points; readings that
//! are unlike the calibration data are separated from it in fewer splits.
//! [`Forest::predict`] walks every tree, averages the path lengths and
//! calls the reading an anomaly when that mean is strictly below the
//! calibration threshold.
//!
//! Pure and deterministic.  No allocation, no error paths.

pub mod model;
pub mod tree;

use tree::{DecisionTree, Features};

pub use model::FIRE_FOREST;

/// Binary outcome of one inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Anomaly,
    Inlier,
}

/// Result of [`Forest::predict`].  Built per call, never stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnomalyVerdict {
    /// Mean root-to-leaf edge count across the ensemble.
    pub mean_path: f32,
    pub classification: Classification,
}

impl AnomalyVerdict {
    pub fn is_anomaly(&self) -> bool {
        self.classification == Classification::Anomaly
    }
}

/// Fixed ensemble of `N` trees plus its decision threshold.
pub struct Forest<'a, const N: usize> {
    trees: [DecisionTree<'a>; N],
    threshold: f32,
}

impl<'a, const N: usize> Forest<'a, N> {
    pub const fn new(trees: [DecisionTree<'a>; N], threshold: f32) -> Self {
        const { assert!(N > 0, "a forest needs at least one tree") };
        Self { trees, threshold }
    }

    /// Score one feature vector.
    pub fn predict(&self, x: &Features) -> AnomalyVerdict {
        let total: u32 = self.trees.iter().map(|t| u32::from(t.path_length(x))).sum();
        let mean_path = total as f32 / N as f32;
        let classification = if mean_path < self.threshold {
            Classification::Anomaly
        } else {
            Classification::Inlier
        };
        AnomalyVerdict {
            mean_path,
            classification,
        }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }
}
