//! Turning regions into geometry. Each region with an elevation above the
//! floor gets its own mesh: a ground surface built with marching squares,
//! plus walls dropped from its outline down to the floor.
//!
//! Coordinates are Y-up. The grid's X axis maps to X, and its Y axis maps
//! to Z.

pub mod cases;
pub mod node;
pub mod outline;

use crate::{
    cave::region::{Region, RegionSet},
    config::MeshConfig,
    height::HeightField,
    mesh::{
        cases::CASES,
        node::{ControlGrid, NodeKey},
        outline::{EdgeGraph, Outline},
    },
    util,
};
use log::{trace, warn};
use nalgebra::{Point2, Point3};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Y coordinate of the bottom of every wall
const WALL_BOTTOM_Y: f32 = -1.0;

/// Horizontal distance (in outline vertices) covered by one unit of wall
/// texture
const WALL_UV_STEP: f32 = 100.0;

/// A region mesh that couldn't be built
#[derive(Clone, Debug, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum MeshError {
    /// The region produced no boundary edges, so there's no outline to
    /// trace. This happens when the region covers every cell in the grid.
    #[error("region at elevation {elevation} has no boundary edges")]
    NoBoundary { elevation: u8 },

    /// A vertex picked up more than two boundary edges, which means the
    /// outline isn't a simple curve
    #[error("boundary vertex {vertex} has more than two incident edges")]
    NonManifold { vertex: u32 },
}

/// Vertex, triangle and UV buffers for a single region. Triangles are
/// index triples into `vertices`, and `uvs` runs parallel to `vertices`.
///
/// The ground surface uses the first chunk of the vertex buffer. Walls get
/// their own copies of the outline vertices appended after that, so ground
/// and wall UVs don't have to agree.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshBuildResult {
    pub vertices: Vec<Point3<f32>>,
    pub ground_triangles: Vec<u32>,
    pub wall_triangles: Vec<u32>,
    pub uvs: Vec<Point2<f32>>,
    pub outlines: Vec<Outline>,
    /// Number of tiers the walls climb, i.e. the region's elevation. Also
    /// stretches the wall texture vertically.
    pub wall_height: f32,
}

impl MeshBuildResult {
    /// A mesh with no geometry at all
    pub fn empty(wall_height: f32) -> Self {
        Self {
            wall_height,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn ground_triangle_count(&self) -> usize {
        self.ground_triangles.len() / 3
    }

    pub fn wall_triangle_count(&self) -> usize {
        self.wall_triangles.len() / 3
    }

    /// Every triangle, ground then walls, as vertex positions
    pub fn triangles(&self) -> impl Iterator<Item = [Point3<f32>; 3]> + '_ {
        self.ground_triangles
            .chunks_exact(3)
            .chain(self.wall_triangles.chunks_exact(3))
            .map(move |tri| {
                [
                    self.vertices[tri[0] as usize],
                    self.vertices[tri[1] as usize],
                    self.vertices[tri[2] as usize],
                ]
            })
    }
}

/// The mesh for one region, or the reason there isn't one
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegionMesh {
    /// Position of the region in its [RegionSet]
    pub region_index: usize,
    pub elevation: u8,
    /// Empty if the build failed
    pub mesh: MeshBuildResult,
    pub error: Option<MeshError>,
}

/// Converts regions into meshes. The extractor itself is stateless: every
/// call to [Self::build] starts from scratch, so regions can be built in
/// any order (or in parallel).
pub struct MeshExtractor<'a, H: HeightField + ?Sized> {
    width: usize,
    height: usize,
    config: MeshConfig,
    height_field: &'a H,
}

impl<'a, H: HeightField + ?Sized> MeshExtractor<'a, H> {
    pub fn new(
        width: usize,
        height: usize,
        config: MeshConfig,
        height_field: &'a H,
    ) -> Self {
        Self {
            width,
            height,
            config,
            height_field,
        }
    }

    /// The control node layout for a region. [Self::build] starts from this,
    /// it's exposed mostly for inspection.
    pub fn control_grid(&self, region: &Region) -> ControlGrid {
        ControlGrid::new(
            self.width,
            self.height,
            &self.config,
            region,
            self.height_field,
        )
    }

    /// Build the ground and walls for a single region.
    pub fn build(
        &self,
        region: &Region,
    ) -> Result<MeshBuildResult, MeshError> {
        let wall_height = region.elevation() as f32;
        let mut builder = RegionMeshBuilder {
            controls: self.control_grid(region),
            mesh: MeshBuildResult::empty(wall_height),
            edges: EdgeGraph::new(),
            uv_extent: (
                self.width as f64 * self.config.cell_size,
                self.height as f64 * self.config.cell_size,
            ),
        };

        for x in 0..self.width.saturating_sub(1) {
            for y in 0..self.height.saturating_sub(1) {
                builder.triangulate(x, y)?;
            }
        }

        if builder.edges.is_empty() {
            return Err(MeshError::NoBoundary {
                elevation: region.elevation(),
            });
        }

        let mut mesh = builder.mesh;
        mesh.outlines = builder.edges.into_outlines();
        for i in 0..mesh.outlines.len() {
            extrude_wall(&mut mesh, i);
        }

        trace!(
            "Region at {} (elevation {}) produced {} vertices, {} outlines",
            region.cells()[0],
            region.elevation(),
            mesh.vertices.len(),
            mesh.outlines.len()
        );
        Ok(mesh)
    }

    /// Build a mesh for every region above the floor, in region order. A
    /// region that fails to build gets an empty mesh and its error; the
    /// others are unaffected.
    pub fn build_all(&self, regions: &RegionSet) -> Vec<RegionMesh> {
        let raised: Vec<(usize, &Region)> = regions
            .iter()
            .enumerate()
            .filter(|(_, region)| region.elevation() > 0)
            .collect();

        #[cfg(feature = "parallel")]
        let iter = raised.into_par_iter();
        #[cfg(not(feature = "parallel"))]
        let iter = raised.into_iter();

        iter.map(|(region_index, region)| {
            self.build_region_mesh(region_index, region)
        })
        .collect()
    }

    fn build_region_mesh(
        &self,
        region_index: usize,
        region: &Region,
    ) -> RegionMesh {
        let elevation = region.elevation();
        match self.build(region) {
            Ok(mesh) => RegionMesh {
                region_index,
                elevation,
                mesh,
                error: None,
            },
            Err(error) => {
                warn!(
                    "Skipping mesh for region {} ({} cells): {}",
                    region_index,
                    region.len(),
                    error
                );
                RegionMesh {
                    region_index,
                    elevation,
                    mesh: MeshBuildResult::empty(elevation as f32),
                    error: Some(error),
                }
            }
        }
    }
}

/// Mutable state for a single region build
struct RegionMeshBuilder {
    controls: ControlGrid,
    mesh: MeshBuildResult,
    edges: EdgeGraph,
    /// World-space size of the whole grid, for ground UVs
    uv_extent: (f64, f64),
}

impl RegionMeshBuilder {
    /// Emit the fan and boundary edges for the square at `(x, y)`
    fn triangulate(&mut self, x: usize, y: usize) -> Result<(), MeshError> {
        let case = &CASES[self.controls.square_config(x, y) as usize];
        if case.fan.is_empty() {
            return Ok(());
        }

        // Every point gets its vertex before any triangles go out, so edges
        // (which only use fan points) can always find theirs
        let ids: Vec<u32> = case
            .fan
            .iter()
            .map(|point| self.vertex(point.node(x, y)))
            .collect();

        for i in 1..ids.len() - 1 {
            self.mesh
                .ground_triangles
                .extend_from_slice(&[ids[0], ids[i], ids[i + 1]]);
        }

        for (a, b) in case.edges {
            let a = self.vertex(a.node(x, y));
            let b = self.vertex(b.node(x, y));
            self.edges.add_edge(a, b)?;
        }

        Ok(())
    }

    /// Get the vertex for a node, creating it on first reference
    fn vertex(&mut self, key: NodeKey) -> u32 {
        if let Some(id) = self.controls.vertex_id(key) {
            return id;
        }

        let position = self.controls.position(key);
        let id = self.mesh.vertices.len() as u32;
        self.mesh.vertices.push(Point3::new(
            position.x as f32,
            position.y as f32,
            position.z as f32,
        ));
        self.mesh.uvs.push(Point2::new(
            util::inverse_lerp(0.0, self.uv_extent.0, position.x) as f32,
            util::inverse_lerp(0.0, self.uv_extent.1, position.z) as f32,
        ));
        self.controls.assign_vertex(key, id);
        id
    }
}

/// Drop a wall from one outline down to [WALL_BOTTOM_Y]. Each outline
/// vertex gets a fresh top copy and a bottom vertex, and each pair of
/// consecutive vertices gets a quad (wrapping around for closed outlines).
fn extrude_wall(mesh: &mut MeshBuildResult, outline_index: usize) {
    let outline = &mesh.outlines[outline_index];
    let base = mesh.vertices.len() as u32;
    let uv_bottom = mesh.wall_height / 3.0;

    for (i, vertex) in outline.vertices.iter().enumerate() {
        let top = mesh.vertices[*vertex as usize];
        let u = i as f32 / WALL_UV_STEP;
        mesh.vertices.push(top);
        mesh.vertices.push(Point3::new(top.x, WALL_BOTTOM_Y, top.z));
        mesh.uvs.push(Point2::new(u, 0.0));
        mesh.uvs.push(Point2::new(u, uv_bottom));
    }

    let n = outline.len() as u32;
    for i in 0..outline.edge_count() as u32 {
        let j = (i + 1) % n;
        let top_left = base + i * 2;
        let bottom_left = top_left + 1;
        let top_right = base + j * 2;
        let bottom_right = top_right + 1;
        mesh.wall_triangles.extend_from_slice(&[
            top_left,
            bottom_left,
            bottom_right,
            top_left,
            bottom_right,
            top_right,
        ]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        cave::{
            automaton::GridAutomaton,
            grid::{CellPoint, TierGrid},
            tier::Tier,
        },
        height::FlatHeightField,
    };
    use std::collections::HashSet;

    const CONFIG: MeshConfig = MeshConfig {
        cell_size: 1.0,
        wall_height: 1.0,
    };
    const FLAT: FlatHeightField = FlatHeightField(0.0);

    /// Regions for a hand-drawn grid of tiers, as `rows[y][x]`
    fn regions(rows: &[Vec<u8>]) -> (TierGrid, RegionSet) {
        let grid = TierGrid::from_levels(rows).unwrap();
        let regions = GridAutomaton::from_grid(grid.clone()).regions();
        (grid, regions)
    }

    /// Build the first region of the given tier
    fn build(
        rows: &[Vec<u8>],
        tier: Tier,
    ) -> Result<MeshBuildResult, MeshError> {
        let (grid, regions) = regions(rows);
        let extractor = MeshExtractor::new(
            grid.width(),
            grid.height(),
            CONFIG,
            &FLAT,
        );
        let region = regions.of_tier(tier).next().unwrap();
        extractor.build(region)
    }

    /// Ground vertices, i.e. everything referenced by a ground triangle
    fn ground_positions(mesh: &MeshBuildResult) -> Vec<Point3<f32>> {
        let ids: HashSet<u32> =
            mesh.ground_triangles.iter().copied().collect();
        let mut ids: Vec<u32> = ids.into_iter().collect();
        ids.sort_unstable();
        ids.into_iter()
            .map(|id| mesh.vertices[id as usize])
            .collect()
    }

    fn assert_no_duplicate_positions(positions: &[Point3<f32>]) {
        for (i, a) in positions.iter().enumerate() {
            for b in &positions[i + 1..] {
                assert_ne!(a, b, "duplicate vertex position");
            }
        }
    }

    #[test]
    fn test_single_cell() {
        let mesh = build(
            &[
                vec![0, 0, 0, 0, 0],
                vec![0, 0, 0, 0, 0],
                vec![0, 0, 1, 0, 0],
                vec![0, 0, 0, 0, 0],
                vec![0, 0, 0, 0, 0],
            ],
            Tier::Low,
        )
        .unwrap();

        // One corner triangle in each of the 4 squares around the cell
        assert_eq!(mesh.ground_triangle_count(), 4);
        assert_eq!(mesh.outlines.len(), 1);
        let outline = &mesh.outlines[0];
        assert!(outline.closed);
        assert_eq!(outline.edge_count(), 4);
        assert_eq!(mesh.wall_triangle_count(), 8);
        assert_eq!(mesh.wall_height, 1.0);
        assert_eq!(mesh.vertices.len(), mesh.uvs.len());
    }

    #[test]
    fn test_block() {
        let mesh = build(
            &[
                vec![0, 0, 0, 0, 0],
                vec![0, 1, 1, 1, 0],
                vec![0, 1, 1, 1, 0],
                vec![0, 1, 1, 1, 0],
                vec![0, 0, 0, 0, 0],
            ],
            Tier::Low,
        )
        .unwrap();

        // 4 corner squares (case 1/2/4/8) and 8 side squares with one edge
        // each. The 4 inner squares are full and emit no edges.
        assert_eq!(mesh.outlines.len(), 1);
        assert!(mesh.outlines[0].closed);
        assert_eq!(mesh.outlines[0].edge_count(), 12);
        assert_eq!(mesh.wall_triangle_count(), 24);
        assert_no_duplicate_positions(&ground_positions(&mesh));
    }

    #[test]
    fn test_hole() {
        let rows = vec![
            vec![1, 1, 1, 1, 1],
            vec![1, 1, 1, 1, 1],
            vec![1, 1, 0, 1, 1],
            vec![1, 1, 1, 1, 1],
            vec![1, 1, 1, 1, 1],
        ];
        let (grid, regions) = regions(&rows);
        let extractor = MeshExtractor::new(
            grid.width(),
            grid.height(),
            CONFIG,
            &FLAT,
        );
        let region = regions.of_tier(Tier::Low).next().unwrap();
        assert_eq!(region.len(), 24);

        let controls = extractor.control_grid(region);
        assert_eq!(controls.square_config(1, 1), 11);
        assert_eq!(controls.square_config(2, 1), 7);
        assert_eq!(controls.square_config(1, 2), 13);
        assert_eq!(controls.square_config(2, 2), 14);

        let mesh = extractor.build(region).unwrap();
        // The hole's corner never gets drawn
        let hole = Point3::new(2.0, 1.0, 2.0);
        assert!(!ground_positions(&mesh).contains(&hole));
        assert!(!mesh.vertices.contains(&hole));

        // The only boundary is around the hole
        assert_eq!(mesh.outlines.len(), 1);
        assert!(mesh.outlines[0].closed);
        assert_eq!(mesh.outlines[0].edge_count(), 4);
        assert_no_duplicate_positions(&ground_positions(&mesh));
    }

    #[test]
    fn test_ring_has_two_loops() {
        // A ring with a hole in the middle: one outline around the outside,
        // one around the hole
        let mesh = build(
            &[
                vec![0, 0, 0, 0, 0, 0, 0],
                vec![0, 1, 1, 1, 1, 1, 0],
                vec![0, 1, 1, 1, 1, 1, 0],
                vec![0, 1, 1, 0, 1, 1, 0],
                vec![0, 1, 1, 1, 1, 1, 0],
                vec![0, 1, 1, 1, 1, 1, 0],
                vec![0, 0, 0, 0, 0, 0, 0],
            ],
            Tier::Low,
        )
        .unwrap();

        assert_eq!(mesh.outlines.len(), 2);
        assert!(mesh.outlines.iter().all(|outline| outline.closed));
        let mut edge_counts: Vec<usize> =
            mesh.outlines.iter().map(Outline::edge_count).collect();
        edge_counts.sort_unstable();
        assert_eq!(edge_counts, vec![4, 20]);
        assert_eq!(mesh.wall_triangle_count(), 48);
    }

    #[test]
    fn test_saddle() {
        // Two diagonal cells touch at a corner, forming a case 5 square
        // (bottom left + top right) between them. The saddle joins them into
        // one outline.
        let rows = vec![
            vec![0, 0, 0, 0, 0],
            vec![0, 1, 0, 0, 0],
            vec![0, 0, 1, 0, 0],
            vec![0, 0, 0, 0, 0],
            vec![0, 0, 0, 0, 0],
        ];
        // (1, 1) and (2, 2) are separate regions by 4-connectivity, so build
        // a region containing both by hand
        let grid = TierGrid::from_levels(&rows).unwrap();
        let cells = vec![CellPoint::new(1, 1), CellPoint::new(2, 2)]
            .into_iter()
            .collect();
        let region = Region::new(Tier::Low, cells);
        let extractor = MeshExtractor::new(
            grid.width(),
            grid.height(),
            CONFIG,
            &FLAT,
        );
        assert_eq!(extractor.control_grid(&region).square_config(1, 1), 5);

        let mesh = extractor.build(&region).unwrap();
        assert_eq!(mesh.outlines.len(), 1);
        assert!(mesh.outlines[0].closed);
        // 3 corner squares per cell, plus 2 edges from the saddle
        assert_eq!(mesh.outlines[0].edge_count(), 8);
    }

    #[test]
    fn test_region_touching_border() {
        // Nothing borders the region along the left edge of the grid, so its
        // outline is an open chain and the wall doesn't wrap around
        let mesh = build(
            &[
                vec![1, 0, 0, 0],
                vec![1, 0, 0, 0],
                vec![1, 1, 0, 0],
                vec![0, 0, 0, 0],
            ],
            Tier::Low,
        )
        .unwrap();

        assert_eq!(mesh.outlines.len(), 1);
        let outline = &mesh.outlines[0];
        assert!(!outline.closed);
        assert_eq!(outline.edge_count(), 5);
        assert_eq!(outline.len(), 6);
        assert_eq!(mesh.wall_triangle_count(), 2 * outline.edge_count());
    }

    #[test]
    fn test_positions_and_uvs() {
        let mesh = build(
            &[
                vec![0, 0, 0, 0],
                vec![0, 2, 0, 0],
                vec![0, 0, 0, 0],
                vec![0, 0, 0, 0],
            ],
            Tier::Mid,
        )
        .unwrap();

        let top = mesh.wall_height;
        assert_eq!(top, 2.0);
        for (vertex, uv) in mesh.vertices.iter().zip(&mesh.uvs) {
            assert!(vertex.y == 2.0 || vertex.y == WALL_BOTTOM_Y);
            assert!((0.0..=1.0).contains(&uv.x));
        }

        // Ground UVs are the planar position over the grid extent
        let first = mesh.ground_triangles[0] as usize;
        assert_eq!(mesh.uvs[first].x, mesh.vertices[first].x / 4.0);
        assert_eq!(mesh.uvs[first].y, mesh.vertices[first].z / 4.0);

        // Walls: bottom UVs stretch by wall height / 3
        let bottom_uvs: Vec<f32> = mesh
            .vertices
            .iter()
            .zip(&mesh.uvs)
            .filter(|(vertex, _)| vertex.y == WALL_BOTTOM_Y)
            .map(|(_, uv)| uv.y)
            .collect();
        assert_eq!(bottom_uvs.len(), 4);
        assert!(bottom_uvs.iter().all(|v| *v == 2.0 / 3.0));
    }

    #[test]
    fn test_no_boundary() {
        // A region that covers the whole grid has nothing to border
        let rows = vec![vec![1, 1, 1], vec![1, 1, 1], vec![1, 1, 1]];
        assert_eq!(
            build(&rows, Tier::Low),
            Err(MeshError::NoBoundary { elevation: 1 })
        );
    }

    #[test]
    fn test_build_all() {
        let rows = vec![
            vec![0, 0, 0, 0, 0, 0],
            vec![0, 1, 0, 0, 0, 0],
            vec![0, 0, 0, 3, 3, 0],
            vec![0, 0, 0, 0, 0, 0],
        ];
        let (grid, regions) = regions(&rows);
        let extractor = MeshExtractor::new(
            grid.width(),
            grid.height(),
            CONFIG,
            &FLAT,
        );
        let meshes = extractor.build_all(&regions);

        // The floor region is skipped, everything else is in region order
        let indices: Vec<usize> =
            meshes.iter().map(|mesh| mesh.region_index).collect();
        assert_eq!(indices, vec![1, 2]);
        let elevations: Vec<u8> =
            meshes.iter().map(|mesh| mesh.elevation).collect();
        assert_eq!(elevations, vec![1, 3]);
        assert!(meshes.iter().all(|mesh| mesh.error.is_none()));
        assert_eq!(meshes[1].mesh.wall_height, 3.0);
    }

    #[test]
    fn test_build_all_keeps_going() {
        // Region sets don't have to partition the grid, so we can put a
        // region that covers everything next to a normal one
        let all_cells = TierGrid::new(4, 4).points().collect();
        let regions = RegionSet::new(vec![
            Region::new(Tier::Low, all_cells),
            Region::new(
                Tier::High,
                vec![CellPoint::new(1, 1)].into_iter().collect(),
            ),
        ]);
        let extractor = MeshExtractor::new(4, 4, CONFIG, &FLAT);
        let meshes = extractor.build_all(&regions);

        assert_eq!(meshes.len(), 2);
        assert_eq!(
            meshes[0].error,
            Some(MeshError::NoBoundary { elevation: 1 })
        );
        assert!(meshes[0].mesh.is_empty());
        assert_eq!(meshes[0].mesh.wall_height, 1.0);
        assert!(meshes[1].error.is_none());
        assert_eq!(meshes[1].mesh.outlines.len(), 1);
    }
}
