//! The 16-case marching squares table.
//!
//! Each square (one grid cell, between four control nodes) has eight points
//! it can draw with: the four corners and the midpoints of its four sides.
//!
//! ```text
//!   TL ---- CT ---- TR
//!   |                |
//!   CL              CR
//!   |                |
//!   BL ---- CB ---- BR
//! ```
//!
//! The config of a square is a bitmask of its active corners (bottom left 1,
//! bottom right 2, top right 4, top left 8). For each config the table
//! gives an ordered polygon, triangulated as a fan from its first point,
//! plus the boundary edges that polygon contributes to the region outline.

use crate::mesh::node::NodeKey;

/// One of the eight drawable points of a square
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SquarePoint {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
    CenterTop,
    CenterRight,
    CenterBottom,
    CenterLeft,
}

impl SquarePoint {
    /// The arena node this point refers to, for the square whose bottom left
    /// corner is `(x, y)`. Side midpoints are shared with the neighboring
    /// square, so each side maps onto the midpoint owned by one of the
    /// corners.
    pub fn node(self, x: usize, y: usize) -> NodeKey {
        match self {
            Self::TopLeft => NodeKey::control(x, y + 1),
            Self::TopRight => NodeKey::control(x + 1, y + 1),
            Self::BottomRight => NodeKey::control(x + 1, y),
            Self::BottomLeft => NodeKey::control(x, y),
            Self::CenterTop => NodeKey::right(x, y + 1),
            Self::CenterRight => NodeKey::above(x + 1, y),
            Self::CenterBottom => NodeKey::right(x, y),
            Self::CenterLeft => NodeKey::above(x, y),
        }
    }
}

/// Triangulation for a single square config
#[derive(Copy, Clone, Debug)]
pub struct Case {
    /// Polygon points, fanned from the first. Empty for config 0.
    pub fan: &'static [SquarePoint],
    /// Boundary edges between the active and inactive parts of the square
    pub edges: &'static [(SquarePoint, SquarePoint)],
}

impl Case {
    /// Number of triangles this case emits
    pub fn triangle_count(&self) -> usize {
        self.fan.len().saturating_sub(2)
    }
}

use SquarePoint::{
    BottomLeft as BL, BottomRight as BR, CenterBottom as CB,
    CenterLeft as CL, CenterRight as CR, CenterTop as CT, TopLeft as TL,
    TopRight as TR,
};

/// Indexed by square config
pub static CASES: [Case; 16] = [
    // 0: nothing
    Case {
        fan: &[],
        edges: &[],
    },
    // 1: bottom left
    Case {
        fan: &[CL, CB, BL],
        edges: &[(CL, CB)],
    },
    // 2: bottom right
    Case {
        fan: &[CB, CR, BR],
        edges: &[(CB, CR)],
    },
    // 3: bottom half
    Case {
        fan: &[CL, CR, BR, BL],
        edges: &[(CL, CR)],
    },
    // 4: top right
    Case {
        fan: &[CR, CT, TR],
        edges: &[(CR, CT)],
    },
    // 5: bottom left + top right saddle, joined through the middle
    Case {
        fan: &[BL, CL, CT, TR, CR, CB],
        edges: &[(CR, CB), (CL, CT)],
    },
    // 6: right half
    Case {
        fan: &[CT, TR, BR, CB],
        edges: &[(CB, CT)],
    },
    // 7: all but top left
    Case {
        fan: &[CT, TR, BR, BL, CL],
        edges: &[(CL, CT)],
    },
    // 8: top left
    Case {
        fan: &[CT, CL, TL],
        edges: &[(CT, CL)],
    },
    // 9: left half
    Case {
        fan: &[TL, CT, CB, BL],
        edges: &[(CT, CB)],
    },
    // 10: top left + bottom right saddle, joined through the middle
    Case {
        fan: &[TL, CT, CR, BR, CB, CL],
        edges: &[(CT, CR), (CB, CL)],
    },
    // 11: all but top right
    Case {
        fan: &[TL, CT, CR, BR, BL],
        edges: &[(CT, CR)],
    },
    // 12: top half
    Case {
        fan: &[CL, TL, TR, CR],
        edges: &[(CR, CL)],
    },
    // 13: all but bottom right
    Case {
        fan: &[TL, TR, CR, CB, BL],
        edges: &[(CB, CR)],
    },
    // 14: all but bottom left
    Case {
        fan: &[TL, TR, BR, CB, CL],
        edges: &[(CL, CB)],
    },
    // 15: full
    Case {
        fan: &[TL, TR, BR, BL],
        edges: &[],
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    fn is_corner(point: SquarePoint) -> bool {
        matches!(point, TL | TR | BR | BL)
    }

    fn corner_bit(point: SquarePoint) -> u8 {
        match point {
            BL => 1,
            BR => 2,
            TR => 4,
            TL => 8,
            _ => 0,
        }
    }

    #[test]
    fn test_fan_corners_match_config() {
        // Every case draws exactly its active corners
        for (config, case) in CASES.iter().enumerate() {
            let mask = case
                .fan
                .iter()
                .filter(|p| is_corner(**p))
                .fold(0, |mask, p| mask | corner_bit(*p));
            assert_eq!(mask as usize, config, "case {}", config);
        }
    }

    #[test]
    fn test_edges_are_midpoints_in_fan() {
        for (config, case) in CASES.iter().enumerate() {
            for (a, b) in case.edges {
                assert!(!is_corner(*a) && !is_corner(*b), "case {}", config);
                assert!(case.fan.contains(a), "case {}", config);
                assert!(case.fan.contains(b), "case {}", config);
            }
        }
    }

    #[test]
    fn test_edge_and_triangle_counts() {
        let edge_counts: Vec<usize> =
            CASES.iter().map(|case| case.edges.len()).collect();
        assert_eq!(
            edge_counts,
            vec![0, 1, 1, 1, 1, 2, 1, 1, 1, 1, 2, 1, 1, 1, 1, 0]
        );
        assert_eq!(CASES[0].triangle_count(), 0);
        assert_eq!(CASES[1].triangle_count(), 1);
        assert_eq!(CASES[5].triangle_count(), 4);
        assert_eq!(CASES[15].triangle_count(), 2);
    }

    #[test]
    fn test_shared_midpoints() {
        // The top of one square is the bottom of the square above it, and
        // the right of one is the left of the square to its right
        assert_eq!(CT.node(3, 4), CB.node(3, 5));
        assert_eq!(CR.node(3, 4), CL.node(4, 4));
        assert_eq!(TR.node(3, 4), BL.node(4, 5));
    }
}
