//! Keyword deck writer: part header, patch block and model assembly.

use std::fmt::Display;
use std::ops::Range;

use tracing::warn;

use crate::card::{format_real, push_field, round_decimals, DECIMALS, FIELDS_PER_CARD, FIELD_WIDTH};
use crate::diagnostic::Diagnostic;
use crate::patch::{Direction, Patch, PATCH_KEYWORD};

/// Keyword of the part section.
pub const PART_KEYWORD: &str = "*PART";

/// Keyword closing a deck.
pub const END_KEYWORD: &str = "*END";

/// Value written into the last field of header card 2.
const HEADER_SENTINEL: i64 = 1;

/// The `*PART` card written ahead of the patches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartHeader {
    /// Part id, also written as `pid` of every patch.
    pub id: u64,
    /// Title card (may be empty).
    pub title: String,
}

impl Default for PartHeader {
    fn default() -> Self {
        Self {
            id: 1,
            title: String::new(),
        }
    }
}

/// Write the `*PART` section: keyword, title card, then `pid` and seven
/// zero fields.
pub fn write_part_header(part: &PartHeader) -> String {
    let mut out = format!("{PART_KEYWORD}\n{}\n", part.title);
    push_field(&mut out, part.id, FIELD_WIDTH);
    for _ in 1..FIELDS_PER_CARD {
        push_field(&mut out, 0, FIELD_WIDTH);
    }
    out.push('\n');
    out
}

/// Writes fields at least ten columns wide, ending a card after eight fields or after
/// every `fiber`-th field, whichever comes first.
struct FieldRows<'o> {
    out: &'o mut String,
    fiber: usize,
    on_card: usize,
    written: usize,
}

impl<'o> FieldRows<'o> {
    fn new(out: &'o mut String, fiber: usize) -> Self {
        Self {
            out,
            fiber,
            on_card: 0,
            written: 0,
        }
    }

    fn push(&mut self, field: impl Display) {
        push_field(self.out, field, FIELD_WIDTH);
        self.on_card += 1;
        self.written += 1;
        let fiber_end = self.fiber > 0 && self.written % self.fiber == 0;
        if self.on_card == FIELDS_PER_CARD || fiber_end {
            self.out.push('\n');
            self.on_card = 0;
        }
    }

    /// End a ragged last card.
    fn close(self) {
        if self.on_card > 0 {
            self.out.push('\n');
        }
    }
}

/// Accumulates an `*ELEMENT_SOLID_NURBS_PATCH` block.
#[derive(Debug)]
pub struct PatchWriter {
    out: String,
    part_id: u64,
    patches: usize,
}

impl PatchWriter {
    /// Start a patch block whose patches belong to `part_id`.
    pub fn new(part_id: u64) -> Self {
        Self {
            out: format!("{PATCH_KEYWORD}\n"),
            part_id,
            patches: 0,
        }
    }

    /// Number of patches written so far.
    pub fn patch_count(&self) -> usize {
        self.patches
    }

    /// Write one patch with id `patch_id` whose control points are the
    /// nodes `nodes`, in order.
    ///
    /// Knots are rounded to six decimals, weights are written as read.
    /// Returns a diagnostic when a rational patch has fewer weights than
    /// control points.
    pub fn write_patch(
        &mut self,
        patch_id: u64,
        patch: &Patch,
        nodes: Range<u64>,
    ) -> Option<Diagnostic> {
        let h = &patch.header;
        let out = &mut self.out;

        push_field(out, patch_id, FIELD_WIDTH);
        push_field(out, self.part_id, FIELD_WIDTH);
        for v in [h.npr, h.pr, h.nps, h.ps, h.npt, h.pt] {
            push_field(out, v, FIELD_WIDTH);
        }
        out.push('\n');

        for v in [
            h.wf1,
            h.nisr,
            h.niss,
            h.nist,
            h.imass,
            h.aux[0],
            h.aux[1],
            HEADER_SENTINEL,
        ] {
            push_field(out, v, FIELD_WIDTH);
        }
        out.push('\n');

        for dir in Direction::ALL {
            let mut rows = FieldRows::new(out, 0);
            for &knot in patch.knots(dir).values() {
                rows.push(format_real(round_decimals(knot, DECIMALS)));
            }
            rows.close();
        }

        let mut rows = FieldRows::new(out, h.npr);
        for id in nodes {
            rows.push(id);
        }
        rows.close();

        let expected = h.control_point_count();
        let mut diagnostic = None;
        if h.is_rational() && patch.weights.len() < expected {
            warn!(
                patch_id,
                expected,
                found = patch.weights.len(),
                "rational patch is short of weights"
            );
            diagnostic = Some(Diagnostic::ShortWeightBlock {
                patch_id,
                expected,
                found: patch.weights.len(),
            });
        }

        if !patch.weights.is_empty() {
            let mut rows = FieldRows::new(out, h.npr);
            for &w in patch.weights.iter().take(expected) {
                rows.push(format_real(w));
            }
            rows.close();
        }

        self.patches += 1;
        diagnostic
    }

    /// The finished block text.
    pub fn finish(self) -> String {
        self.out
    }
}

/// Concatenate part header, patch block, node block and the terminator.
pub fn assemble_model(part: &PartHeader, patch_block: &str, node_block: &str) -> String {
    let part_block = write_part_header(part);
    let mut out =
        String::with_capacity(part_block.len() + patch_block.len() + node_block.len() + 8);
    out.push_str(&part_block);
    out.push_str(patch_block);
    out.push_str(node_block);
    out.push_str(END_KEYWORD);
    out.push('\n');
    out
}
