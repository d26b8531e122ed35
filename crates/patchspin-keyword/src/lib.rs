#![warn(missing_docs)]

//! Keyword deck reading and writing for solid NURBS patch models.
//!
//! Reads the `*NODE` and `*ELEMENT_SOLID_NURBS_PATCH` sections of a
//! fixed-column keyword deck and writes them back out, together with a
//! `*PART` header and the `*END` terminator.
//!
//! # Example
//!
//! ```no_run
//! use patchspin_keyword::{decode_patch_section, extract_nodes};
//!
//! let text = std::fs::read_to_string("specimen.k").unwrap();
//! let nodes = extract_nodes(&text);
//! let patches = decode_patch_section(&text, 2).unwrap();
//! println!("{} nodes, {} patches", nodes.len(), patches.len());
//! ```

pub mod card;
pub mod deck;
mod diagnostic;
mod error;
mod node;
mod patch;
mod writer;

pub use diagnostic::Diagnostic;
pub use error::{KeywordError, Result};
pub use node::{extract_nodes, parse_node_card, write_node_block, Node, NodeTable, NODE_KEYWORD};
pub use patch::{
    decode_patch, decode_patch_section, decode_patches, Direction, KnotVector, Patch,
    PatchCursor, PatchHeader, PATCH_KEYWORD,
};
pub use writer::{
    assemble_model, write_part_header, PartHeader, PatchWriter, END_KEYWORD, PART_KEYWORD,
};
