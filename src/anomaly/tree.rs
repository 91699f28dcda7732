//! Array-backed binary decision tree.
//!
//! Nodes live in a flat slice with the root at index 0; children are
//! referenced by index.  Tree data is static calibration, so traversal
//! never trusts it: a child index past the end, a feature index past the
//! feature vector, or a walk deeper than [`MAX_DEPTH`] all end the walk
//! at the current path length.

/// Number of features in one input vector.
pub const N_FEATURES: usize = 4;

/// Hard cap on edges walked per tree.
pub const MAX_DEPTH: u8 = 10;

/// One input vector: `[temperature °C, humidity %RH, particles >0.3 µm, particles >2.5 µm]`.
pub type Features = [f32; N_FEATURES];

/// Tree node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Node {
    /// Internal node.  `value < threshold` goes left, anything else right.
    Split {
        feature: u8,
        threshold: f32,
        left: u16,
        right: u16,
    },
    /// External node; the walk ends here.
    Leaf,
}

impl Node {
    pub const fn split(feature: u8, threshold: f32, left: u16, right: u16) -> Self {
        Self::Split {
            feature,
            threshold,
            left,
            right,
        }
    }
}

/// A single isolation tree over static node storage.
#[derive(Debug, Clone, Copy)]
pub struct DecisionTree<'a> {
    nodes: &'a [Node],
}

impl<'a> DecisionTree<'a> {
    pub const fn new(nodes: &'a [Node]) -> Self {
        Self { nodes }
    }

    /// Number of edges from the root to where `x` lands.
    pub fn path_length(&self, x: &Features) -> u8 {
        let mut index = 0usize;
        let mut depth = 0u8;

        while depth < MAX_DEPTH {
            let Some(node) = self.nodes.get(index) else {
                break;
            };
            let Node::Split {
                feature,
                threshold,
                left,
                right,
            } = *node
            else {
                break;
            };
            let Some(&value) = x.get(usize::from(feature)) else {
                break;
            };

            index = usize::from(if value < threshold { left } else { right });
            depth += 1;
        }
        depth
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
