//! Rigid rotation of node tables.

use patchspin_keyword::{Node, NodeTable};
use patchspin_math::{Axis, Rotation};

/// Rotate every node of `table` by `degrees` about `axis`.
///
/// Ids are kept; the coordinate along `axis` is unchanged. A zero angle
/// returns the coordinates exactly.
pub fn rotate_nodes(table: &NodeTable, degrees: f64, axis: Axis) -> NodeTable {
    let rotation = Rotation::about(axis, degrees);
    let nodes = table
        .iter()
        .map(|n| Node {
            id: n.id,
            position: rotation.apply_point(&n.position),
        })
        .collect();
    NodeTable::from_nodes(nodes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn table() -> NodeTable {
        NodeTable::from_nodes(vec![
            Node::new(1, 1.0, 0.0, 0.0),
            Node::new(2, 0.5, 2.0, -1.5),
        ])
    }

    #[test]
    fn test_zero_angle_is_identity() {
        for axis in [Axis::X, Axis::Y, Axis::Z] {
            assert_eq!(rotate_nodes(&table(), 0.0, axis), table());
        }
    }

    #[test]
    fn test_axis_coordinate_unchanged() {
        let rotated = rotate_nodes(&table(), 33.0, Axis::Y);
        for (a, b) in table().iter().zip(rotated.iter()) {
            assert_eq!(a.id, b.id);
            assert_eq!(a.position.y, b.position.y);
        }
    }

    #[test]
    fn test_y_90_maps_x_to_minus_z() {
        let rotated = rotate_nodes(&table(), 90.0, Axis::Y);
        let n = rotated.get(1).unwrap();
        assert_abs_diff_eq!(n.position.x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(n.position.z, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rotate_back_restores() {
        let there = rotate_nodes(&table(), 71.0, Axis::Z);
        let back = rotate_nodes(&there, -71.0, Axis::Z);
        for (a, b) in table().iter().zip(back.iter()) {
            assert_abs_diff_eq!(a.position, b.position, epsilon = 1e-12);
        }
    }
}
