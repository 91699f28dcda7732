//! Shipped fire-risk calibration.
//!
//! Three shallow isolation trees over `[temp, humi, p0.3, p2.5]`.
//! Readings inside the normal warehouse envelope reach depth 3 in every
//! tree; smoke-laden or hot-and-dry readings are isolated within one or
//! two splits.  Replace the tables and [`THRESHOLD`] together when
//! recalibrating.

use super::Forest;
use super::tree::{DecisionTree, Node};

const TEMP: u8 = 0;
const HUMI: u8 = 1;
const P0_3: u8 = 2;
const P2_5: u8 = 3;

/// Mean path length below which a reading counts as a fire-risk anomaly.
pub const THRESHOLD: f32 = 2.0;

// Fine-particle surge, then heat, then coarse smoke.
static TREE_A: [Node; 7] = [
    Node::split(P0_3, 3000.0, 1, 2),
    Node::split(TEMP, 45.0, 3, 4),
    Node::Leaf,
    Node::split(P2_5, 150.0, 5, 6),
    Node::Leaf,
    Node::Leaf,
    Node::Leaf,
];

// Coarse smoke, then very dry air, then fine particles.
static TREE_B: [Node; 7] = [
    Node::split(P2_5, 200.0, 1, 2),
    Node::split(HUMI, 15.0, 3, 4),
    Node::Leaf,
    Node::Leaf,
    Node::split(P0_3, 2500.0, 5, 6),
    Node::Leaf,
    Node::Leaf,
];

// Heat, then fine particles, then saturated air.
static TREE_C: [Node; 7] = [
    Node::split(TEMP, 50.0, 1, 2),
    Node::split(P0_3, 3500.0, 3, 4),
    Node::Leaf,
    Node::split(HUMI, 95.0, 5, 6),
    Node::Leaf,
    Node::Leaf,
    Node::Leaf,
];

/// The forest the firmware runs.
pub static FIRE_FOREST: Forest<'static, 3> = Forest::new(
    [
        DecisionTree::new(&TREE_A),
        DecisionTree::new(&TREE_B),
        DecisionTree::new(&TREE_C),
    ],
    THRESHOLD,
);
