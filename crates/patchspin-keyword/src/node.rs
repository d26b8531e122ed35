//! Node table extraction and the node block writer.

use patchspin_math::Point3;
use tracing::{debug, trace};

use crate::card::{
    fixed_columns, format_real, push_field, round_decimals, DECIMALS, NODE_COORD_WIDTH,
    NODE_ID_WIDTH, NODE_INPUT_COLUMNS,
};
use crate::deck::find_section;

/// Keyword of the node section.
pub const NODE_KEYWORD: &str = "*NODE";

/// A node: identifier plus position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    /// Node identifier (>= 1).
    pub id: u64,
    /// Node position.
    pub position: Point3,
}

impl Node {
    /// Create a node.
    pub fn new(id: u64, x: f64, y: f64, z: f64) -> Self {
        Self {
            id,
            position: Point3::new(x, y, z),
        }
    }
}

/// Nodes ordered by ascending, unique id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeTable {
    nodes: Vec<Node>,
}

impl NodeTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from nodes in any order.
    ///
    /// Nodes are sorted by id; for a repeated id the first occurrence wins.
    pub fn from_nodes(mut nodes: Vec<Node>) -> Self {
        nodes.sort_by_key(|n| n.id);
        let before = nodes.len();
        nodes.dedup_by_key(|n| n.id);
        if nodes.len() != before {
            debug!(dropped = before - nodes.len(), "duplicate node ids dropped");
        }
        Self { nodes }
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if the table holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in id order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Iterate nodes in id order.
    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.nodes.iter()
    }

    /// Smallest id, if any.
    pub fn min_id(&self) -> Option<u64> {
        self.nodes.first().map(|n| n.id)
    }

    /// Largest id, if any.
    pub fn max_id(&self) -> Option<u64> {
        self.nodes.last().map(|n| n.id)
    }

    /// Look up a node by id.
    pub fn get(&self, id: u64) -> Option<&Node> {
        self.nodes
            .binary_search_by_key(&id, |n| n.id)
            .ok()
            .map(|i| &self.nodes[i])
    }
}

impl<'a> IntoIterator for &'a NodeTable {
    type Item = &'a Node;
    type IntoIter = std::slice::Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

fn node_from_fields(fields: &[&str]) -> Option<Node> {
    let [id, x, y, z, ..] = fields else {
        return None;
    };
    let id: u64 = id.parse().ok().filter(|&id| id >= 1)?;
    Some(Node::new(id, x.parse().ok()?, y.parse().ok()?, z.parse().ok()?))
}

/// Parse one node card, or `None` if it does not hold `id x y z`.
pub fn parse_node_card(text: &str) -> Option<Node> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    node_from_fields(&tokens)
        .or_else(|| node_from_fields(&fixed_columns(text, &NODE_INPUT_COLUMNS)?))
}

/// Extract the node table from the first `*NODE` section of `text`.
///
/// Cards that do not parse as `id x y z` (comments, annotations) are
/// skipped. A missing or empty section yields an empty table.
pub fn extract_nodes(text: &str) -> NodeTable {
    let Some(section) = find_section(text, NODE_KEYWORD) else {
        debug!("no {} section", NODE_KEYWORD);
        return NodeTable::new();
    };

    let mut nodes = Vec::with_capacity(section.cards.len());
    let mut skipped = 0usize;
    for card in &section.cards {
        match parse_node_card(card.text) {
            Some(node) => nodes.push(node),
            None => {
                skipped += 1;
                trace!(line = card.line, "skipped node card");
            }
        }
    }

    debug!(nodes = nodes.len(), skipped, "extracted node table");
    NodeTable::from_nodes(nodes)
}

/// Write a `*NODE` block: id in 8 columns, coordinates rounded to six
/// decimals in 15 columns each.
pub fn write_node_block(table: &NodeTable) -> String {
    let mut out = String::with_capacity(16 + table.len() * 54);
    out.push_str(NODE_KEYWORD);
    out.push('\n');
    for node in table {
        push_field(&mut out, node.id, NODE_ID_WIDTH);
        for c in [node.position.x, node.position.y, node.position.z] {
            push_field(
                &mut out,
                format_real(round_decimals(c, DECIMALS)),
                NODE_COORD_WIDTH,
            );
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_extract_well_formed_nodes() {
        let text = "*NODE\n 1 0.0 0.0 0.0\n 2 1.5 -2.0 3.25\n 3 1e-3 0 7\n*END\n";
        let table = extract_nodes(text);
        assert_eq!(table.len(), 3);
        let n2 = table.get(2).unwrap();
        assert_relative_eq!(n2.position.x, 1.5);
        assert_relative_eq!(n2.position.y, -2.0);
        assert_relative_eq!(n2.position.z, 3.25);
        assert_relative_eq!(table.get(3).unwrap().position.x, 0.001);
    }

    #[test]
    fn test_extract_skips_annotations() {
        let text = "\
*NODE
$#   nid               x               y               z
       1            0.0            0.0            0.0
  node two follows
       2            1.0            2.0
       3            1.0            2.0            3.0       0       0
";
        let table = extract_nodes(text);
        let ids: Vec<u64> = table.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_extract_sorts_by_id() {
        let text = "*NODE\n5 0 0 0\n2 0 0 0\n9 0 0 0\n";
        let table = extract_nodes(text);
        assert_eq!(table.min_id(), Some(2));
        assert_eq!(table.max_id(), Some(9));
        let ids: Vec<u64> = table.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![2, 5, 9]);
    }

    #[test]
    fn test_extract_fixed_column_nodes() {
        let text = format!(
            "*NODE\n{:>8}{:>16}{:>16}{:>16}\n",
            4, "-1.0000000000000", "0.50000000000000", "-2.2500000000000"
        );
        let table = extract_nodes(&text);
        assert_eq!(table.len(), 1);
        assert_relative_eq!(table.get(4).unwrap().position.z, -2.25);
    }

    #[test]
    fn test_empty_and_missing_sections() {
        assert!(extract_nodes("*NODE\n*END\n").is_empty());
        assert!(extract_nodes("*KEYWORD\n*END\n").is_empty());
    }

    #[test]
    fn test_duplicate_ids_keep_first() {
        let table = NodeTable::from_nodes(vec![
            Node::new(1, 1.0, 0.0, 0.0),
            Node::new(1, 2.0, 0.0, 0.0),
        ]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(1).unwrap().position.x, 1.0);
    }

    #[test]
    fn test_write_node_block() {
        let table = NodeTable::from_nodes(vec![
            Node::new(2, 6.123e-17, 0.0, -1.0),
            Node::new(1, 1.0, 0.0, 1.0 / 3.0),
        ]);
        let text = write_node_block(&table);
        let expected = concat!(
            "*NODE\n",
            "       1            1.0            0.0       0.333333\n",
            "       2            0.0            0.0           -1.0\n",
        );
        assert_eq!(text, expected);
    }

    #[test]
    fn test_wide_values_read_back() {
        let table = NodeTable::from_nodes(vec![
            Node::new(123_456_789, -12_345_678.123456, 0.5, 2.0),
            Node::new(123_456_790, 1.0, -98_765_432.5, 0.0),
        ]);
        let text = write_node_block(&table);
        assert!(text.contains("\n 123456789 -12345678.123456"));
        assert_eq!(extract_nodes(&text), table);
    }
}
