//! Keyword deck scanning.
//!
//! A deck is a sequence of sections. Each section starts with a keyword line
//! (`*NODE`, `*ELEMENT_SOLID_NURBS_PATCH`, ...) beginning in column 1 and runs
//! until the next keyword line or the end of the text. Lines inside a section
//! are cards; cards starting with the comment marker carry no data.

/// Prefix of comment cards.
pub const COMMENT_MARKER: &str = "$#";

/// One line of a section body together with its position in the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Card<'a> {
    /// Line number in the input text (1-indexed).
    pub line: usize,
    /// Raw line text without the line terminator.
    pub text: &'a str,
}

impl<'a> Card<'a> {
    /// True if this card is a comment.
    pub fn is_comment(&self) -> bool {
        self.text.trim_start().starts_with(COMMENT_MARKER)
    }

    /// True if this card has no visible content.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// A keyword section located in a deck.
#[derive(Debug, Clone)]
pub struct Section<'a> {
    /// Keyword name as written, including the leading `*`.
    pub keyword: &'a str,
    /// Line number of the keyword line (1-indexed).
    pub line: usize,
    /// Every body line up to the next keyword, comments and blanks included.
    pub cards: Vec<Card<'a>>,
}

impl<'a> Section<'a> {
    /// Body cards with comments and blank lines removed.
    pub fn data_cards(&self) -> Vec<Card<'a>> {
        self.cards
            .iter()
            .filter(|c| !c.is_comment() && !c.is_blank())
            .copied()
            .collect()
    }
}

/// Keyword name of a line, if the line is a keyword line.
fn keyword_name(line: &str) -> Option<&str> {
    if !line.starts_with('*') {
        return None;
    }
    line.split_whitespace().next()
}

/// Locate the first section named `keyword` (case-insensitive, `*` included).
pub fn find_section<'a>(text: &'a str, keyword: &str) -> Option<Section<'a>> {
    let mut lines = text.lines().enumerate();

    let (header_idx, name) = lines.find_map(|(idx, line)| {
        keyword_name(line)
            .filter(|name| name.eq_ignore_ascii_case(keyword))
            .map(|name| (idx, name))
    })?;

    let cards = lines
        .take_while(|(_, line)| keyword_name(line).is_none())
        .map(|(idx, text)| Card {
            line: idx + 1,
            text,
        })
        .collect();

    Some(Section {
        keyword: name,
        line: header_idx + 1,
        cards,
    })
}
