use crate::cave::{grid::CellPoint, tier::Tier};
use fnv::FnvBuildHasher;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::ops::Index;

/// An ORDERED set of cell points. Iteration order is the order cells were
/// discovered during flood fill.
pub type CellSet = IndexSet<CellPoint, FnvBuildHasher>;

/// A maximal 4-connected group of cells that all share the same tier. A
/// region is never empty.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    tier: Tier,
    cells: CellSet,
}

impl Region {
    /// Create a region from a tier and a set of cells. This does **not**
    /// verify that the cells are connected; flood fill guarantees that for
    /// every region it produces.
    pub fn new(tier: Tier, cells: CellSet) -> Self {
        debug_assert!(!cells.is_empty(), "regions cannot be empty");
        Self { tier, cells }
    }

    /// The tier shared by every cell in this region
    pub fn tier(&self) -> Tier {
        self.tier
    }

    /// Shorthand for the numeric level of [Self::tier]
    pub fn elevation(&self) -> u8 {
        self.tier.level()
    }

    pub fn cells(&self) -> &CellSet {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, point: CellPoint) -> bool {
        self.cells.contains(&point)
    }
}

/// Every region of a cave, grouped by tier from lowest to highest. Within a
/// tier, regions appear in discovery (scan) order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionSet {
    regions: Vec<Region>,
}

impl RegionSet {
    pub fn new(regions: Vec<Region>) -> Self {
        Self { regions }
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Region> {
        self.regions.iter()
    }

    /// All regions of one tier
    pub fn of_tier(&self, tier: Tier) -> impl Iterator<Item = &Region> {
        self.regions.iter().filter(move |region| region.tier() == tier)
    }

    /// Total number of cells across all regions. For a complete set this
    /// equals the grid's cell count.
    pub fn cell_count(&self) -> usize {
        self.regions.iter().map(Region::len).sum()
    }
}

impl Index<usize> for RegionSet {
    type Output = Region;

    fn index(&self, index: usize) -> &Self::Output {
        &self.regions[index]
    }
}

impl<'a> IntoIterator for &'a RegionSet {
    type Item = &'a Region;
    type IntoIter = std::slice::Iter<'a, Region>;

    fn into_iter(self) -> Self::IntoIter {
        self.regions.iter()
    }
}

impl FromIterator<Region> for RegionSet {
    fn from_iter<I: IntoIterator<Item = Region>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
