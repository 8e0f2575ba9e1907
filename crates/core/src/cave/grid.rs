use crate::cave::tier::Tier;
use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Position of a single cell in the tier grid. `x` runs along the width,
/// `y` along the height.
#[derive(
    Copy,
    Clone,
    Debug,
    Display,
    Hash,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
)]
#[display(fmt = "({}, {})", x, y)]
pub struct CellPoint {
    pub x: usize,
    pub y: usize,
}

impl CellPoint {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// A fixed-size rectangle of tiers. The shape never changes after creation.
///
/// Iteration via [Self::points] is in "scan order": x outer, y inner. Every
/// order-dependent step of generation (PRNG draws, region discovery) follows
/// this order, so don't change it without expecting different caves.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierGrid {
    width: usize,
    height: usize,
    /// Column-major, so scan order is also memory order
    cells: Vec<Tier>,
}

impl TierGrid {
    /// A grid where every cell is [Tier::Floor]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Tier::Floor; width * height],
        }
    }

    /// Build a grid from rows of tier levels. `rows[y][x]` is the level of
    /// cell `(x, y)`. Levels outside 0-3 and ragged rows are rejected.
    /// Mostly useful for building small grids by hand.
    pub fn from_levels(rows: &[Vec<u8>]) -> anyhow::Result<Self> {
        use anyhow::{bail, Context};
        use std::convert::TryFrom;

        let height = rows.len();
        let width = rows.first().map(Vec::len).unwrap_or(0);
        let mut grid = Self::new(width, height);
        for (y, row) in rows.iter().enumerate() {
            if row.len() != width {
                bail!(
                    "row {} has {} cells, expected {}",
                    y,
                    row.len(),
                    width
                );
            }
            for (x, level) in row.iter().enumerate() {
                let tier = Tier::try_from(*level)
                    .with_context(|| format!("invalid cell ({}, {})", x, y))?;
                grid.set(CellPoint::new(x, y), tier);
            }
        }
        Ok(grid)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Total number of cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, point: CellPoint) -> bool {
        point.x < self.width && point.y < self.height
    }

    /// Is this cell in the outermost ring of the grid?
    pub fn is_edge(&self, point: CellPoint) -> bool {
        point.x == 0
            || point.y == 0
            || point.x == self.width - 1
            || point.y == self.height - 1
    }

    /// Get the tier of a cell. Panics if the point is out of bounds.
    pub fn get(&self, point: CellPoint) -> Tier {
        self.cells[self.index(point)]
    }

    /// Set the tier of a cell. Panics if the point is out of bounds.
    pub fn set(&mut self, point: CellPoint, tier: Tier) {
        let index = self.index(point);
        self.cells[index] = tier;
    }

    /// Every point in the grid, in scan order (x outer, y inner)
    pub fn points(&self) -> impl Iterator<Item = CellPoint> {
        let height = self.height;
        (0..self.width)
            .flat_map(move |x| (0..height).map(move |y| CellPoint::new(x, y)))
    }

    /// The in-bounds 4-connected neighbors of a cell, in the order up (+y),
    /// down (-y), right (+x), left (-x)
    pub fn adjacents(
        &self,
        point: CellPoint,
    ) -> impl Iterator<Item = CellPoint> {
        let CellPoint { x, y } = point;
        let (width, height) = (self.width, self.height);
        [
            (y + 1 < height).then(|| CellPoint::new(x, y + 1)),
            y.checked_sub(1).map(|y| CellPoint::new(x, y)),
            (x + 1 < width).then(|| CellPoint::new(x + 1, y)),
            x.checked_sub(1).map(|x| CellPoint::new(x, y)),
        ]
        .into_iter()
        .flatten()
    }

    /// Count the tiers of all in-bounds 8-connected neighbors of a cell. The
    /// result is indexed by [Tier::index].
    pub fn neighbor_counts(&self, point: CellPoint) -> [u8; 4] {
        let mut counts = [0; 4];
        let x_range = point.x.saturating_sub(1)..=(point.x + 1);
        for nx in x_range {
            let y_range = point.y.saturating_sub(1)..=(point.y + 1);
            for ny in y_range {
                let neighbor = CellPoint::new(nx, ny);
                if neighbor != point && self.contains(neighbor) {
                    counts[self.get(neighbor).index()] += 1;
                }
            }
        }
        counts
    }

    fn index(&self, point: CellPoint) -> usize {
        debug_assert!(
            self.contains(point),
            "point {} out of bounds for {}x{} grid",
            point,
            self.width,
            self.height
        );
        point.x * self.height + point.y
    }
}
