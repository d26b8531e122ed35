//! Solid NURBS patch decoding.
//!
//! The patch section is a flat run of cards with no overall length field.
//! Each patch occupies:
//!
//! 1. header card 1: `npeid pid npr pr nps ps npt pt`
//! 2. header card 2: `wf1 nisr niss nist imass ...`
//! 3. knot vectors r, s, t: `ceil(n + p + 1 / 8)` cards each, ragged last card
//! 4. connectivity: `ceil(npr / 8)` cards per r-fiber, `nps * npt` fibers
//! 5. weights, only when `wf1 == 1`: same card count as connectivity
//!
//! so a patch's extent is known only after its header is decoded, and the
//! scanner has to walk the patches in order.

use std::fmt;

use tracing::debug;

use crate::card::{parse_patch_card, FIELDS_PER_CARD};
use crate::deck::{find_section, Card};
use crate::error::{KeywordError, Result};

/// Keyword of the patch section.
pub const PATCH_KEYWORD: &str = "*ELEMENT_SOLID_NURBS_PATCH";

/// Parametric direction of a patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// First parametric direction.
    R,
    /// Second parametric direction.
    S,
    /// Third parametric direction.
    T,
}

impl Direction {
    /// All directions in card order.
    pub const ALL: [Direction; 3] = [Direction::R, Direction::S, Direction::T];
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::R => "r",
            Direction::S => "s",
            Direction::T => "t",
        })
    }
}

/// The two header cards of a patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchHeader {
    /// Patch id as read (replaced on output).
    pub source_id: i64,
    /// Part id as read (replaced on output).
    pub pid: i64,
    /// Control points in r.
    pub npr: usize,
    /// Degree in r.
    pub pr: usize,
    /// Control points in s.
    pub nps: usize,
    /// Degree in s.
    pub ps: usize,
    /// Control points in t.
    pub npt: usize,
    /// Degree in t.
    pub pt: usize,
    /// Rationality flag; `1` means a weight block follows the connectivity.
    pub wf1: i64,
    /// Integration points in r.
    pub nisr: i64,
    /// Integration points in s.
    pub niss: i64,
    /// Integration points in t.
    pub nist: i64,
    /// Mass matrix flag.
    pub imass: i64,
    /// Fields 6 and 7 of header card 2 (0 when absent).
    pub aux: [i64; 2],
}

impl PatchHeader {
    /// True if the patch carries a weight block.
    pub fn is_rational(&self) -> bool {
        self.wf1 == 1
    }

    /// Control points along `dir`.
    pub fn control_points(&self, dir: Direction) -> usize {
        match dir {
            Direction::R => self.npr,
            Direction::S => self.nps,
            Direction::T => self.npt,
        }
    }

    /// Polynomial degree along `dir`.
    pub fn degree(&self, dir: Direction) -> usize {
        match dir {
            Direction::R => self.pr,
            Direction::S => self.ps,
            Direction::T => self.pt,
        }
    }

    /// Knot vector length along `dir`: `n + p + 1`.
    pub fn knot_count(&self, dir: Direction) -> usize {
        self.control_points(dir) + self.degree(dir) + 1
    }

    /// Cards holding the knot vector along `dir`.
    pub fn knot_cards(&self, dir: Direction) -> usize {
        self.knot_count(dir).div_ceil(FIELDS_PER_CARD)
    }

    /// Total control points, `npr * nps * npt`.
    pub fn control_point_count(&self) -> usize {
        self.npr * self.nps * self.npt
    }

    /// Cards per r-fiber of connectivity or weights.
    pub fn fiber_cards(&self) -> usize {
        self.npr.div_ceil(FIELDS_PER_CARD)
    }

    /// Cards in the connectivity block.
    pub fn connectivity_cards(&self) -> usize {
        self.fiber_cards() * self.nps * self.npt
    }

    /// Cards in the weight block (0 for non-rational patches).
    pub fn weight_cards(&self) -> usize {
        if self.is_rational() {
            self.connectivity_cards()
        } else {
            0
        }
    }

    /// Cards occupied by the whole patch.
    pub fn card_extent(&self) -> usize {
        2 + Direction::ALL
            .iter()
            .map(|&d| self.knot_cards(d))
            .sum::<usize>()
            + self.connectivity_cards()
            + self.weight_cards()
    }
}

/// A knot vector in one parametric direction.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct KnotVector(pub Vec<f64>);

impl KnotVector {
    /// Knot values.
    pub fn values(&self) -> &[f64] {
        &self.0
    }

    /// Number of knots.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if the vector holds no knots.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True if no knot is smaller than its predecessor.
    pub fn is_non_decreasing(&self) -> bool {
        self.0.windows(2).all(|w| w[0] <= w[1])
    }
}

/// A decoded solid NURBS patch.
///
/// Connectivity is not stored: the k-th control point is the k-th node of
/// whatever id range the patch is assigned on output.
#[derive(Debug, Clone, PartialEq)]
pub struct Patch {
    /// Header cards.
    pub header: PatchHeader,
    /// Knot vector in r.
    pub knots_r: KnotVector,
    /// Knot vector in s.
    pub knots_s: KnotVector,
    /// Knot vector in t.
    pub knots_t: KnotVector,
    /// Non-zero weights in card order; empty for non-rational patches.
    pub weights: Vec<f64>,
}

impl Patch {
    /// Knot vector along `dir`.
    pub fn knots(&self, dir: Direction) -> &KnotVector {
        match dir {
            Direction::R => &self.knots_r,
            Direction::S => &self.knots_s,
            Direction::T => &self.knots_t,
        }
    }

    /// Total control points.
    pub fn control_point_count(&self) -> usize {
        self.header.control_point_count()
    }
}

/// Position of the scanner within the section's data cards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatchCursor {
    /// Index of the next unread data card.
    pub card: usize,
}

impl PatchCursor {
    /// Cursor `n` cards further on.
    pub fn advance(self, n: usize) -> Self {
        Self { card: self.card + n }
    }
}

/// Line to blame when a card at `idx` is missing: the last card present.
fn last_line(cards: &[Card<'_>]) -> Option<usize> {
    cards.last().map(|c| c.line)
}

fn card_at<'c, 'a>(
    cards: &'c [Card<'a>],
    idx: usize,
    what: impl FnOnce() -> String,
) -> Result<&'c Card<'a>> {
    cards
        .get(idx)
        .ok_or_else(|| KeywordError::malformed(last_line(cards), format!("missing {}", what())))
}

fn parse_ints(card: &Card<'_>, min: usize, what: &str) -> Result<Vec<i64>> {
    let values: Vec<i64> = parse_patch_card(card.text).ok_or_else(|| {
        KeywordError::malformed(Some(card.line), format!("{what} is not a row of integers"))
    })?;
    if values.len() < min {
        return Err(KeywordError::malformed(
            Some(card.line),
            format!("{what} has {} fields, expected {min}", values.len()),
        ));
    }
    Ok(values)
}

fn parse_reals(card: &Card<'_>, what: &str) -> Result<Vec<f64>> {
    parse_patch_card(card.text).ok_or_else(|| {
        KeywordError::malformed(Some(card.line), format!("{what} is not a row of reals"))
    })
}

fn count(card: &Card<'_>, value: i64, name: &str) -> Result<usize> {
    usize::try_from(value).map_err(|_| {
        KeywordError::malformed(Some(card.line), format!("{name} is negative ({value})"))
    })
}

fn decode_header(cards: &[Card<'_>], cursor: PatchCursor, index: usize) -> Result<PatchHeader> {
    let card1 = card_at(cards, cursor.card, || format!("header card 1 of patch {index}"))?;
    let card2 = card_at(cards, cursor.card + 1, || {
        format!("header card 2 of patch {index}")
    })?;

    let h1 = parse_ints(card1, FIELDS_PER_CARD, "header card 1")?;
    let h2 = parse_ints(card2, 5, "header card 2")?;

    Ok(PatchHeader {
        source_id: h1[0],
        pid: h1[1],
        npr: count(card1, h1[2], "npr")?,
        pr: count(card1, h1[3], "pr")?,
        nps: count(card1, h1[4], "nps")?,
        ps: count(card1, h1[5], "ps")?,
        npt: count(card1, h1[6], "npt")?,
        pt: count(card1, h1[7], "pt")?,
        wf1: h2[0],
        nisr: h2[1],
        niss: h2[2],
        nist: h2[3],
        imass: h2[4],
        aux: [
            h2.get(5).copied().unwrap_or(0),
            h2.get(6).copied().unwrap_or(0),
        ],
    })
}

fn decode_knots(
    cards: &[Card<'_>],
    cursor: PatchCursor,
    header: &PatchHeader,
    dir: Direction,
    index: usize,
) -> Result<(KnotVector, PatchCursor)> {
    let n = header.knot_count(dir);
    let what = format!("knot vector {dir} of patch {index}");

    let mut values = Vec::with_capacity(n);
    for i in 0..header.knot_cards(dir) {
        let card = card_at(cards, cursor.card + i, || what.clone())?;
        values.extend(parse_reals(card, &what)?);
    }
    if values.len() < n {
        let line = cards.get(cursor.card).map(|c| c.line);
        return Err(KeywordError::malformed(
            line,
            format!("{what} has {} values, expected {n}", values.len()),
        ));
    }
    values.truncate(n);

    Ok((KnotVector(values), cursor.advance(header.knot_cards(dir))))
}

/// Decode one patch starting at `cursor`; returns the patch and the cursor
/// just past its last card.
///
/// `index` is the 0-based patch position, used in error messages.
pub fn decode_patch(
    cards: &[Card<'_>],
    cursor: PatchCursor,
    index: usize,
) -> Result<(Patch, PatchCursor)> {
    let header = decode_header(cards, cursor, index)?;
    let cursor = cursor.advance(2);

    let (knots_r, cursor) = decode_knots(cards, cursor, &header, Direction::R, index)?;
    let (knots_s, cursor) = decode_knots(cards, cursor, &header, Direction::S, index)?;
    let (knots_t, cursor) = decode_knots(cards, cursor, &header, Direction::T, index)?;

    // Connectivity is regenerated on output; only its extent matters here.
    let connectivity_cards = header.connectivity_cards();
    if cursor.card + connectivity_cards > cards.len() {
        return Err(KeywordError::malformed(
            last_line(cards),
            format!(
                "connectivity of patch {index} needs {connectivity_cards} cards, {} left",
                cards.len().saturating_sub(cursor.card)
            ),
        ));
    }
    let cursor = cursor.advance(connectivity_cards);

    let mut weights = Vec::new();
    if header.is_rational() {
        let end = (cursor.card + header.weight_cards()).min(cards.len());
        let block = cards.get(cursor.card..end).unwrap_or_default();
        if block.len() < header.weight_cards() {
            debug!(
                patch = index,
                expected = header.weight_cards(),
                found = block.len(),
                "weight block ends early"
            );
        }
        for card in block {
            weights.extend(
                parse_reals(card, "weight card")?
                    .into_iter()
                    .filter(|&w| w != 0.0),
            );
        }
    }
    let cursor = cursor.advance(header.weight_cards());

    debug!(
        patch = index,
        npr = header.npr,
        nps = header.nps,
        npt = header.npt,
        rational = header.is_rational(),
        weights = weights.len(),
        next_card = cursor.card,
        "decoded patch"
    );

    let patch = Patch {
        header,
        knots_r,
        knots_s,
        knots_t,
        weights,
    };
    Ok((patch, cursor))
}

/// Decode the first `count` patches of the data cards of a patch section.
pub fn decode_patches(cards: &[Card<'_>], count: usize) -> Result<Vec<Patch>> {
    let (patches, _) = (0..count).try_fold(
        (Vec::with_capacity(count), PatchCursor::default()),
        |(mut patches, cursor), index| {
            let (patch, next) = decode_patch(cards, cursor, index)?;
            patches.push(patch);
            Ok::<_, KeywordError>((patches, next))
        },
    )?;
    Ok(patches)
}

/// Locate the `*ELEMENT_SOLID_NURBS_PATCH` section of `text` and decode its
/// first `count` patches. Comment and blank lines are ignored.
pub fn decode_patch_section(text: &str, count: usize) -> Result<Vec<Patch>> {
    let section =
        find_section(text, PATCH_KEYWORD).ok_or(KeywordError::MissingSection(PATCH_KEYWORD))?;
    decode_patches(&section.data_cards(), count)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A 2x2x2 trilinear patch, non-rational, with a comment card.
    const LINEAR: &str = "\
*ELEMENT_SOLID_NURBS_PATCH
$#   npeid       pid       npr        pr       nps        ps       npt        pt
         1         1         2         1         2         1         2         1
         0         2         2         2         0         0         0         1
       0.0       0.0       1.0       1.0
       0.0       0.0       1.0       1.0
       0.0       0.0       1.0       1.0
         1         2
         3         4
         5         6
         7         8
*NODE
";

    /// A 3x2x1 rational patch, quadratic in r, followed by a second patch.
    const RATIONAL_PAIR: &str = "\
*ELEMENT_SOLID_NURBS_PATCH
         7         3         3         2         2         1         1         0
         1         3         2         1         0
       0.0       0.0       0.0       1.0       1.0       1.0
       0.0       0.0       1.0       1.0
       0.0       1.0
         1         2         3
         4         5         6
       1.0 0.7071068       1.0
       1.0       0.0       1.0
         8         1         1         0         1         0         1         0
         0         1         1         1         0
       0.0       1.0
       0.0       1.0
       0.0       1.0
         7
";

    /// A 9x2x1 rational patch whose fibers and r-knots span two cards,
    /// followed by a single-point patch.
    const WIDE_PAIR: &str = "\
*ELEMENT_SOLID_NURBS_PATCH
$#   npeid       pid       npr        pr       nps        ps       npt        pt
         1         1         9         2         2         1         1         0
         1         2         2         1         0
       0.0       0.0       0.0  0.142857  0.285714  0.428571  0.571429  0.714286
  0.857143       1.0       1.0       1.0
       0.0       0.0       1.0       1.0
       0.0       1.0
         1         2         3         4         5         6         7         8
         9
        10        11        12        13        14        15        16        17
        18
       1.0       0.9       0.8       0.7       0.6       0.5       0.4       0.3
       0.2
 0.70710678118       1.0       1.0       1.0       1.0       1.0       1.0       1.0
       1.0
         2         1         1         0         1         0         1         0
         0         1         1         1         0
       0.0       1.0
       0.0       1.0
       0.0       1.0
        19
";

    #[test]
    fn test_header_extents() {
        let header = PatchHeader {
            source_id: 1,
            pid: 1,
            npr: 9,
            pr: 3,
            nps: 2,
            ps: 1,
            npt: 3,
            pt: 2,
            wf1: 1,
            nisr: 0,
            niss: 0,
            nist: 0,
            imass: 0,
            aux: [0, 0],
        };
        assert_eq!(header.knot_count(Direction::R), 13);
        assert_eq!(header.knot_cards(Direction::R), 2);
        assert_eq!(header.knot_cards(Direction::S), 1);
        assert_eq!(header.knot_cards(Direction::T), 1);
        assert_eq!(header.fiber_cards(), 2);
        assert_eq!(header.connectivity_cards(), 12);
        assert_eq!(header.weight_cards(), 12);
        assert_eq!(header.card_extent(), 2 + 4 + 12 + 12);
        assert_eq!(header.control_point_count(), 54);
    }

    #[test]
    fn test_decode_non_rational_patch() {
        let patches = decode_patch_section(LINEAR, 1).unwrap();
        assert_eq!(patches.len(), 1);
        let p = &patches[0];
        assert_eq!(p.header.npr, 2);
        assert_eq!(p.header.wf1, 0);
        assert_eq!(p.header.nisr, 2);
        assert_eq!(p.header.aux, [0, 0]);
        assert!(!p.header.is_rational());
        assert_eq!(p.knots_r.values(), &[0.0, 0.0, 1.0, 1.0]);
        assert_eq!(p.knots(Direction::T).len(), 4);
        assert!(p.weights.is_empty());
        assert_eq!(p.control_point_count(), 8);
    }

    #[test]
    fn test_decode_rational_then_plain() {
        let patches = decode_patch_section(RATIONAL_PAIR, 2).unwrap();
        let first = &patches[0];
        assert_eq!(first.header.source_id, 7);
        assert_eq!(first.header.pid, 3);
        assert!(first.header.is_rational());
        assert_eq!(first.knots_r.len(), 6);
        assert_eq!(first.knots_s.values(), &[0.0, 0.0, 1.0, 1.0]);
        assert_eq!(first.knots_t.values(), &[0.0, 1.0]);
        // The zero is padding and is dropped.
        assert_eq!(first.weights, vec![1.0, 0.7071068, 1.0, 1.0, 1.0]);

        let second = &patches[1];
        assert_eq!(second.header.source_id, 8);
        assert_eq!(second.control_point_count(), 1);
        assert!(second.weights.is_empty());
    }

    #[test]
    fn test_cursor_threads_through_patches() {
        let section = find_section(RATIONAL_PAIR, PATCH_KEYWORD).unwrap();
        let cards = section.data_cards();
        let (first, cursor) = decode_patch(&cards, PatchCursor::default(), 0).unwrap();
        assert_eq!(cursor.card, first.header.card_extent());
        assert_eq!(cursor.card, 9);
        let (_, end) = decode_patch(&cards, cursor, 1).unwrap();
        assert_eq!(end.card, cards.len());
    }

    #[test]
    fn test_decode_multi_card_fibers() {
        let section = find_section(WIDE_PAIR, PATCH_KEYWORD).unwrap();
        let cards = section.data_cards();
        let (wide, cursor) = decode_patch(&cards, PatchCursor::default(), 0).unwrap();
        assert_eq!(wide.header.fiber_cards(), 2);
        assert_eq!(cursor.card, 14);

        assert_eq!(wide.knots_r.len(), 12);
        assert_eq!(wide.knots_r.values()[7], 0.714286);
        assert_eq!(&wide.knots_r.values()[8..], &[0.857143, 1.0, 1.0, 1.0]);
        assert_eq!(wide.knots_s.values(), &[0.0, 0.0, 1.0, 1.0]);

        assert_eq!(wide.weights.len(), 18);
        assert_eq!(wide.weights[8], 0.2);
        assert_eq!(wide.weights[9], 0.70710678118);
        assert_eq!(wide.weights[17], 1.0);

        let (single, end) = decode_patch(&cards, cursor, 1).unwrap();
        assert_eq!(single.header.source_id, 2);
        assert_eq!(single.control_point_count(), 1);
        assert_eq!(end.card, cards.len());
    }

    #[test]
    fn test_knot_values_are_truncated_to_length() {
        let text = "\
*ELEMENT_SOLID_NURBS_PATCH
         1         1         1         0         1         0         1         0
         0         1         1         1         0
       0.0       1.0       9.0
       0.0       1.0
       0.0       1.0
         1
";
        let patches = decode_patch_section(text, 1).unwrap();
        assert_eq!(patches[0].knots_r.values(), &[0.0, 1.0]);
    }

    #[test]
    fn test_missing_section() {
        let err = decode_patch_section("*NODE\n1 0 0 0\n", 1).unwrap_err();
        assert!(matches!(err, KeywordError::MissingSection(_)));
        assert!(err.is_malformed_patch_section());
    }

    #[test]
    fn test_too_few_patches() {
        let err = decode_patch_section(LINEAR, 2).unwrap_err();
        assert!(err.is_malformed_patch_section());
        assert!(err.to_string().contains("header card 1 of patch 1"));
    }

    #[test]
    fn test_truncated_knots() {
        let text = "\
*ELEMENT_SOLID_NURBS_PATCH
         1         1         2         1         2         1         2         1
         0         2         2         2         0
       0.0       0.0       1.0       1.0
";
        let err = decode_patch_section(text, 1).unwrap_err();
        assert!(matches!(
            err,
            KeywordError::MalformedPatchSection { line: Some(4), .. }
        ));
    }

    #[test]
    fn test_unparsable_header() {
        let text = "\
*ELEMENT_SOLID_NURBS_PATCH
         1         1       two         1         2         1         2         1
";
        let err = decode_patch_section(text, 1).unwrap_err();
        assert!(matches!(
            err,
            KeywordError::MalformedPatchSection { line: Some(2), .. }
        ));
    }

    #[test]
    fn test_knot_monotonicity() {
        assert!(KnotVector(vec![0.0, 0.0, 0.5, 1.0]).is_non_decreasing());
        assert!(!KnotVector(vec![0.0, 1.0, 0.5]).is_non_decreasing());
    }
}
