//! Node renumbering and merging across rotated copies.
//!
//! Copy 0 keeps the original ids. Copy `c` (one per angle, in angle order)
//! gets the ids directly above everything merged before it, so the copies
//! form contiguous ascending blocks.

use std::ops::Range;

use patchspin_keyword::{Node, NodeTable};
use patchspin_math::Axis;
use tracing::debug;

use crate::rotate::rotate_nodes;

/// Ids assigned to one copy: `start..start + len`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdBlock {
    /// First id of the copy.
    pub start: u64,
    /// Number of nodes in the copy.
    pub len: usize,
}

impl IdBlock {
    /// The ids as a half-open range.
    pub fn range(&self) -> Range<u64> {
        self.start..self.start + self.len as u64
    }

    /// Last id of the block, if it holds any.
    pub fn last(&self) -> Option<u64> {
        (self.len > 0).then(|| self.start + self.len as u64 - 1)
    }
}

/// Give the nodes of `table` the ids `max_id + 1, max_id + 2, ...` in their
/// current order.
pub fn renumber(table: &NodeTable, max_id: u64) -> NodeTable {
    let nodes = table
        .iter()
        .zip(max_id + 1..)
        .map(|(n, id)| Node {
            id,
            position: n.position,
        })
        .collect();
    NodeTable::from_nodes(nodes)
}

/// Union of two tables, sorted by id.
pub fn merge(accumulated: &NodeTable, new: &NodeTable) -> NodeTable {
    let nodes = accumulated.iter().chain(new.iter()).copied().collect();
    NodeTable::from_nodes(nodes)
}

/// The merged table of all copies and the id block of each copy.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplicatedNodes {
    /// Original and rotated nodes, sorted by id.
    pub table: NodeTable,
    /// Id block per copy; index 0 is the original.
    pub blocks: Vec<IdBlock>,
}

/// Rotate `original` by each of `angles` about `axis`, renumber every copy
/// above the ids merged so far and merge it in.
pub fn replicate_nodes(original: &NodeTable, angles: &[f64], axis: Axis) -> ReplicatedNodes {
    let first = IdBlock {
        start: original.min_id().unwrap_or(1),
        len: original.len(),
    };
    let seed = ReplicatedNodes {
        table: original.clone(),
        blocks: vec![first],
    };

    angles.iter().fold(seed, |mut acc, &angle| {
        let max_id = acc.table.max_id().unwrap_or(0);
        let copy = renumber(&rotate_nodes(original, angle, axis), max_id);
        debug!(angle, %axis, first_id = max_id + 1, nodes = copy.len(), "rotated copy");
        acc.blocks.push(IdBlock {
            start: max_id + 1,
            len: copy.len(),
        });
        acc.table = merge(&acc.table, &copy);
        acc
    })
}
