//! Non-fatal findings reported alongside a written model.

use std::fmt;

use crate::patch::Direction;

/// A lenient path taken while replicating patches.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// A rational patch has fewer non-zero weights than control points;
    /// only the available weights were written.
    ShortWeightBlock {
        /// Output patch id.
        patch_id: u64,
        /// Control points in the patch.
        expected: usize,
        /// Non-zero weights available.
        found: usize,
    },
    /// A patch's connectivity range runs past the node ids of its copy.
    NodeRangeOverflow {
        /// Output patch id.
        patch_id: u64,
        /// Copy index (0 is the original).
        copy: usize,
        /// Last node id referenced.
        range_end: u64,
        /// Last node id of the copy, if the copy has any nodes.
        block_end: Option<u64>,
    },
    /// A decoded knot vector decreases somewhere.
    NonMonotonicKnots {
        /// Input patch position (0-based).
        patch: usize,
        /// Offending direction.
        direction: Direction,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::ShortWeightBlock {
                patch_id,
                expected,
                found,
            } => write!(
                f,
                "patch {patch_id}: {found} non-zero weights for {expected} control points"
            ),
            Diagnostic::NodeRangeOverflow {
                patch_id,
                copy,
                range_end,
                block_end,
            } => match block_end {
                Some(end) => write!(
                    f,
                    "patch {patch_id}: node {range_end} is past the last node {end} of copy {copy}"
                ),
                None => write!(f, "patch {patch_id}: copy {copy} has no nodes"),
            },
            Diagnostic::NonMonotonicKnots { patch, direction } => write!(
                f,
                "input patch {patch}: knot vector {direction} is not non-decreasing"
            ),
        }
    }
}
