//! Patch replication across rotated copies.
//!
//! Every copy re-emits all input patches in input order. Patch ids run
//! from 1 across all copies; each patch's connectivity is the next run of
//! node ids inside its copy's id block.

use std::ops::Range;

use patchspin_keyword::{Diagnostic, Direction, Patch, PatchWriter};
use tracing::{debug, warn};

use crate::renumber::IdBlock;

/// Connectivity of patch `index` in a copy whose ids start at
/// `block_start`: the ids after those taken by patches `0..index`.
///
/// `None` if `index` is out of range.
pub fn connectivity_range(block_start: u64, patches: &[Patch], index: usize) -> Option<Range<u64>> {
    let patch = patches.get(index)?;
    let offset: u64 = patches[..index]
        .iter()
        .map(|p| p.control_point_count() as u64)
        .sum();
    let start = block_start + offset;
    Some(start..start + patch.control_point_count() as u64)
}

/// One emitted patch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchInstance {
    /// Output patch id (1-based, global).
    pub patch_id: u64,
    /// Copy index; 0 is the original.
    pub copy: usize,
    /// Input patch position.
    pub source: usize,
    /// Node ids of the control points.
    pub nodes: Range<u64>,
}

/// Lay out every patch of every copy, copies in block order.
pub fn plan_copies(patches: &[Patch], blocks: &[IdBlock]) -> Vec<PatchInstance> {
    blocks
        .iter()
        .enumerate()
        .flat_map(move |(copy, block)| {
            (0..patches.len()).filter_map(move |source| {
                connectivity_range(block.start, patches, source).map(|nodes| (copy, source, nodes))
            })
        })
        .zip(1u64..)
        .map(|((copy, source, nodes), patch_id)| PatchInstance {
            patch_id,
            copy,
            source,
            nodes,
        })
        .collect()
}

/// Replicated patch block and what was noticed while writing it.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplicatedPatches {
    /// `*ELEMENT_SOLID_NURBS_PATCH` block text.
    pub text: String,
    /// Patches written.
    pub count: usize,
    /// Non-fatal findings.
    pub diagnostics: Vec<Diagnostic>,
}

fn knot_diagnostics(patches: &[Patch]) -> Vec<Diagnostic> {
    patches
        .iter()
        .enumerate()
        .flat_map(|(patch, p)| {
            Direction::ALL
                .into_iter()
                .filter(move |&d| !p.knots(d).is_non_decreasing())
                .map(move |direction| Diagnostic::NonMonotonicKnots { patch, direction })
        })
        .inspect(|d| warn!("{d}"))
        .collect()
}

/// Write one copy of every patch per id block.
pub fn replicate_patches(patches: &[Patch], blocks: &[IdBlock], part_id: u64) -> ReplicatedPatches {
    let mut diagnostics = knot_diagnostics(patches);
    let mut writer = PatchWriter::new(part_id);

    for instance in plan_copies(patches, blocks) {
        let block = &blocks[instance.copy];
        if !instance.nodes.is_empty() && instance.nodes.end > block.range().end {
            let d = Diagnostic::NodeRangeOverflow {
                patch_id: instance.patch_id,
                copy: instance.copy,
                range_end: instance.nodes.end - 1,
                block_end: block.last(),
            };
            warn!("{d}");
            diagnostics.push(d);
        }

        debug!(
            patch_id = instance.patch_id,
            copy = instance.copy,
            source = instance.source,
            first_node = instance.nodes.start,
            "writing patch"
        );
        if let Some(d) = writer.write_patch(
            instance.patch_id,
            &patches[instance.source],
            instance.nodes.clone(),
        ) {
            diagnostics.push(d);
        }
    }

    let count = writer.patch_count();
    ReplicatedPatches {
        text: writer.finish(),
        count,
        diagnostics,
    }
}
