use crate::{
    cave::{grid::CellPoint, region::Region},
    config::MeshConfig,
    height::HeightField,
};
use nalgebra::Point3;

/// Height multiplier (on top of wall height) for the height field's
/// contribution to each control node
const HEIGHT_FIELD_SCALE: f64 = 2.2;

/// The three kinds of node that each grid position owns. Every control node
/// has a midpoint "above" it (+Z) and one to its "right" (+X), which get
/// shared between the squares on either side.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Control,
    Above,
    Right,
}

/// Address of a single node in the arena
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct NodeKey {
    pub kind: NodeKind,
    pub x: usize,
    pub y: usize,
}

impl NodeKey {
    pub const fn control(x: usize, y: usize) -> Self {
        Self {
            kind: NodeKind::Control,
            x,
            y,
        }
    }

    pub const fn above(x: usize, y: usize) -> Self {
        Self {
            kind: NodeKind::Above,
            x,
            y,
        }
    }

    pub const fn right(x: usize, y: usize) -> Self {
        Self {
            kind: NodeKind::Right,
            x,
            y,
        }
    }
}

/// Everything we know about the grid of control nodes for one region: where
/// each node sits in 3D, which ones are active (inside the region), and
/// which vertex (if any) each node has been assigned.
///
/// Vertex ids live in a flat arena indexed by `(kind, x, y)`. A node gets
/// its vertex the first time a triangle references it, and keeps it for
/// the rest of the build, which is how neighboring squares end up sharing
/// vertices.
#[derive(Clone, Debug)]
pub struct ControlGrid {
    width: usize,
    height: usize,
    cell_size: f64,
    /// Y coordinate of each control node, column-major
    node_heights: Vec<f64>,
    active: Vec<bool>,
    vertex_ids: Vec<Option<u32>>,
}

impl ControlGrid {
    /// Lay out control nodes for the given region. A node is active iff its
    /// cell belongs to the region.
    pub fn new(
        width: usize,
        height: usize,
        config: &MeshConfig,
        region: &Region,
        height_field: &(impl HeightField + ?Sized),
    ) -> Self {
        let base = region.elevation() as f64 * config.wall_height;
        let mut node_heights = Vec::with_capacity(width * height);
        let mut active = Vec::with_capacity(width * height);
        for x in 0..width {
            for y in 0..height {
                let sample = height_field.sample(x, y);
                node_heights.push(
                    base + sample * config.wall_height * HEIGHT_FIELD_SCALE,
                );
                active.push(region.contains(CellPoint::new(x, y)));
            }
        }

        Self {
            width,
            height,
            cell_size: config.cell_size,
            node_heights,
            active,
            vertex_ids: vec![None; width * height * 3],
        }
    }

    fn index(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.width && y < self.height);
        x * self.height + y
    }

    fn arena_index(&self, key: NodeKey) -> usize {
        let kind = match key.kind {
            NodeKind::Control => 0,
            NodeKind::Above => 1,
            NodeKind::Right => 2,
        };
        self.index(key.x, key.y) * 3 + kind
    }

    pub fn is_active(&self, x: usize, y: usize) -> bool {
        self.active[self.index(x, y)]
    }

    /// World-space position of a node. Midpoints share their owning control
    /// node's height.
    pub fn position(&self, key: NodeKey) -> Point3<f64> {
        let x = key.x as f64 * self.cell_size;
        let y = self.node_heights[self.index(key.x, key.y)];
        let z = key.y as f64 * self.cell_size;
        let half = self.cell_size / 2.0;
        match key.kind {
            NodeKind::Control => Point3::new(x, y, z),
            NodeKind::Above => Point3::new(x, y, z + half),
            NodeKind::Right => Point3::new(x + half, y, z),
        }
    }

    /// The 4-bit marching squares configuration of the square whose bottom
    /// left corner is `(x, y)`. Bits: bottom left 1, bottom right 2, top
    /// right 4, top left 8.
    pub fn square_config(&self, x: usize, y: usize) -> u8 {
        let mut config = 0;
        if self.is_active(x, y) {
            config |= 1;
        }
        if self.is_active(x + 1, y) {
            config |= 2;
        }
        if self.is_active(x + 1, y + 1) {
            config |= 4;
        }
        if self.is_active(x, y + 1) {
            config |= 8;
        }
        config
    }

    pub fn vertex_id(&self, key: NodeKey) -> Option<u32> {
        self.vertex_ids[self.arena_index(key)]
    }

    /// Give a node its vertex id. A node can only be assigned once.
    pub fn assign_vertex(&mut self, key: NodeKey, id: u32) {
        let index = self.arena_index(key);
        debug_assert!(
            self.vertex_ids[index].is_none(),
            "node {:?} already has a vertex",
            key
        );
        self.vertex_ids[index] = Some(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        cave::{region::CellSet, tier::Tier},
        height::FlatHeightField,
    };
    use assert_approx_eq::assert_approx_eq;

    fn grid() -> ControlGrid {
        let cells: CellSet = vec![CellPoint::new(1, 1), CellPoint::new(2, 1)]
            .into_iter()
            .collect();
        let region = Region::new(Tier::Mid, cells);
        let config = MeshConfig {
            cell_size: 2.0,
            wall_height: 1.5,
        };
        ControlGrid::new(4, 3, &config, &region, &FlatHeightField(0.5))
    }

    #[test]
    fn test_positions() {
        let grid = grid();
        // 2 * 1.5 + 0.5 * 1.5 * 2.2
        let y = 4.65;

        let control = grid.position(NodeKey::control(1, 2));
        assert_approx_eq!(control.x, 2.0);
        assert_approx_eq!(control.y, y);
        assert_approx_eq!(control.z, 4.0);

        let above = grid.position(NodeKey::above(1, 2));
        assert_approx_eq!(above.x, 2.0);
        assert_approx_eq!(above.y, y);
        assert_approx_eq!(above.z, 5.0);

        let right = grid.position(NodeKey::right(1, 2));
        assert_approx_eq!(right.x, 3.0);
        assert_approx_eq!(right.y, y);
        assert_approx_eq!(right.z, 4.0);
    }

    #[test]
    fn test_square_config() {
        let grid = grid();
        assert!(grid.is_active(1, 1));
        assert!(!grid.is_active(0, 0));
        // Only the top right corner (1, 1)
        assert_eq!(grid.square_config(0, 0), 4);
        // Top left (1, 1) and top right (2, 1)
        assert_eq!(grid.square_config(1, 0), 12);
        // Bottom left (1, 1) and bottom right (2, 1)
        assert_eq!(grid.square_config(1, 1), 3);
        // Only bottom left (2, 1)
        assert_eq!(grid.square_config(2, 1), 1);
    }

    #[test]
    fn test_vertex_assignment() {
        let mut grid = grid();
        let key = NodeKey::above(3, 2);
        assert_eq!(grid.vertex_id(key), None);
        grid.assign_vertex(key, 7);
        assert_eq!(grid.vertex_id(key), Some(7));
        // Other kinds at the same position are separate nodes
        assert_eq!(grid.vertex_id(NodeKey::right(3, 2)), None);
        assert_eq!(grid.vertex_id(NodeKey::control(3, 2)), None);
    }
}
