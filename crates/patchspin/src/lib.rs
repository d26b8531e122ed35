#![warn(missing_docs)]

//! Replicate solid NURBS patch models by rigid rotation.
//!
//! Reads a keyword deck holding one or more `*ELEMENT_SOLID_NURBS_PATCH`
//! patches and their `*NODE` control points, rotates the nodes about a
//! coordinate axis through a list of angles, and writes one deck holding the
//! original plus every rotated copy with disjoint node and patch ids.
//!
//! # Example
//!
//! ```no_run
//! use patchspin::{revolve, AngleSpec, Axis, RevolveConfig};
//!
//! let text = std::fs::read_to_string("specimen_tension.k").unwrap();
//! let config = RevolveConfig {
//!     axis: Axis::Y,
//!     angles: AngleSpec::List(vec![90.0, 180.0, 270.0]),
//!     initial_patches: 2,
//!     ..Default::default()
//! };
//! let model = revolve(&text, &config).unwrap();
//! std::fs::write("full_specimen.k", &model.text).unwrap();
//! ```

use std::fs;
use std::path::Path;

use patchspin_keyword::{
    assemble_model, decode_patch_section, extract_nodes, write_node_block, Diagnostic, NodeTable,
    PartHeader,
};
use tracing::{info, warn};

mod config;
mod error;
mod renumber;
mod replicate;
mod rotate;

pub use config::{AngleSpec, JobConfig, PartConfig, RevolveConfig};
pub use error::{PatchspinError, Result};
pub use patchspin_math::Axis;
pub use renumber::{merge, renumber, replicate_nodes, IdBlock, ReplicatedNodes};
pub use replicate::{
    connectivity_range, plan_copies, replicate_patches, PatchInstance, ReplicatedPatches,
};
pub use rotate::rotate_nodes;

/// A replicated deck and what went into it.
#[derive(Debug, Clone, PartialEq)]
pub struct RevolvedModel {
    /// Complete deck text, `*PART` through `*END`.
    pub text: String,
    /// Merged node table.
    pub nodes: NodeTable,
    /// Copies written, original included.
    pub copies: usize,
    /// Patches written.
    pub patch_count: usize,
    /// Non-fatal findings.
    pub diagnostics: Vec<Diagnostic>,
}

fn has_contiguous_ids(table: &NodeTable) -> bool {
    table.nodes().windows(2).all(|w| w[1].id == w[0].id + 1)
}

/// Replicate the deck `text` according to `config`.
///
/// Fails if the configuration is invalid or the patch section cannot be
/// decoded; nothing is returned for a partially built model.
pub fn revolve(text: &str, config: &RevolveConfig) -> Result<RevolvedModel> {
    config.validate()?;
    let angles = config.angles.resolve();

    let original = extract_nodes(text);
    let patches = decode_patch_section(text, config.initial_patches)?;
    if !has_contiguous_ids(&original) {
        warn!("original node ids are not contiguous; connectivity assumes they are");
    }

    let replicated = replicate_nodes(&original, &angles, config.axis);
    let patch_block = replicate_patches(&patches, &replicated.blocks, config.part.id);
    let node_block = write_node_block(&replicated.table);
    let text = assemble_model(&PartHeader::from(&config.part), &patch_block.text, &node_block);

    info!(
        axis = %config.axis,
        copies = replicated.blocks.len(),
        patches = patch_block.count,
        nodes = replicated.table.len(),
        diagnostics = patch_block.diagnostics.len(),
        "replicated model"
    );

    Ok(RevolvedModel {
        text,
        nodes: replicated.table,
        copies: replicated.blocks.len(),
        patch_count: patch_block.count,
        diagnostics: patch_block.diagnostics,
    })
}

/// Write `text` to `path` through a sibling temporary file, so `path` holds
/// either its old contents or the complete new deck.
pub fn write_model(path: impl AsRef<Path>, text: &str) -> Result<()> {
    let path = path.as_ref();
    let mut tmp_name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    tmp_name.push(".partial");
    let tmp = path.with_file_name(tmp_name);
    fs::write(&tmp, text)?;
    if let Err(e) = fs::rename(&tmp, path) {
        // Best effort; the rename error is the one worth reporting.
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}

/// Read `input`, replicate it and write the result to `output`.
pub fn revolve_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    config: &RevolveConfig,
) -> Result<RevolvedModel> {
    let text = fs::read_to_string(input)?;
    let model = revolve(&text, config)?;
    write_model(output, &model.text)?;
    Ok(model)
}
