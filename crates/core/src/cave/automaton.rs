use crate::{
    cave::{
        grid::{CellPoint, TierGrid},
        region::{CellSet, Region, RegionSet},
        tier::Tier,
    },
    config::AutomatonConfig,
    timed,
};
use log::{debug, trace};
use rand::Rng;
use std::collections::VecDeque;

/// Percent chance that a cell in the border band gets forced to tier 0
const BORDER_FLOOR_CHANCE: u32 = 65;

/// Number of same-tier neighbors (out of 8) that pins a cell to its tier
/// during smoothing
const SMOOTH_SAME_THRESHOLD: u8 = 3;

/// The cleanup sweep. Each pass moves every undersized region of the first
/// tier into the second tier, and every pass re-floods the grid as left by
/// the pass before it. The order matters: demote from the top down, then
/// promote back up from the floor. Reordering these gives different caves.
const CLEANUP_PASSES: [(Tier, Tier); 6] = [
    (Tier::High, Tier::Mid),
    (Tier::Mid, Tier::Low),
    (Tier::Low, Tier::Floor),
    (Tier::Floor, Tier::Low),
    (Tier::Low, Tier::Mid),
    (Tier::Mid, Tier::High),
];

/// The cellular automaton that lays out a cave's tiers. It owns a
/// [TierGrid] and knows how to seed it randomly, relax it into smooth
/// blobs, and clean up regions that are too small to matter.
///
/// Typical usage is just [GridAutomaton::generate], which runs the full
/// sequence. The individual steps are public so they can be driven by hand.
#[derive(Clone, Debug)]
pub struct GridAutomaton {
    grid: TierGrid,
}

impl GridAutomaton {
    /// Wrap an existing grid, e.g. one built by hand
    pub fn from_grid(grid: TierGrid) -> Self {
        Self { grid }
    }

    /// Seed, smooth and clean up a brand new grid.
    pub fn generate(
        width: usize,
        height: usize,
        rng: &mut impl Rng,
        config: &AutomatonConfig,
    ) -> Self {
        let mut automaton = timed!(
            "Grid seeding",
            Self::initialize(width, height, rng, config)
        );

        timed!("Grid smoothing", {
            for i in 0..config.smooth_iterations {
                let changed = automaton.smooth();
                trace!("Smoothing pass {} changed {} cells", i, changed);
            }
        });

        let changed = timed!(
            "Region cleanup",
            automaton.cleanup_regions(config.min_region_size)
        );
        debug!("Region cleanup reassigned {} cells", changed);

        automaton
    }

    /// Allocate a grid and fill it with random tiers.
    ///
    /// Cells inside the border band (`border_percent` of each dimension, on
    /// every side) draw one number and are forced to tier 0 with a 65%
    /// chance, otherwise they're left as they are, which in a fresh grid is
    /// also tier 0. Every other cell draws a number in `[0, 100)` and
    /// compares it against the thresholds, highest first. The outer ring of
    /// the grid always ends up at tier 0.
    ///
    /// Exactly one number is drawn per cell, in scan order, so the same RNG
    /// state always gives the same grid.
    pub fn initialize(
        width: usize,
        height: usize,
        rng: &mut impl Rng,
        config: &AutomatonConfig,
    ) -> Self {
        let mut grid = TierGrid::new(width, height);

        let border_min = config.border_percent / 100.0;
        let border_max = 1.0 - border_min;
        let (w, h) = (width as f64, height as f64);
        let in_border = |point: CellPoint| {
            let (x, y) = (point.x as f64, point.y as f64);
            x < w * border_min
                || x > w * border_max
                || y < h * border_min
                || y > h * border_max
        };

        for point in grid.points() {
            if in_border(point) {
                if rng.gen_range(0..100) < BORDER_FLOOR_CHANCE {
                    grid.set(point, Tier::Floor);
                }
                continue;
            }

            let roll: u32 = rng.gen_range(0..100);
            let tier = if grid.is_edge(point) {
                Tier::Floor
            } else if roll > config.high_threshold {
                Tier::High
            } else if roll > config.mid_threshold {
                Tier::Mid
            } else if roll > config.low_threshold {
                Tier::Low
            } else {
                Tier::Floor
            };
            grid.set(point, tier);
        }

        Self { grid }
    }

    pub fn grid(&self) -> &TierGrid {
        &self.grid
    }

    pub fn into_grid(self) -> TierGrid {
        self.grid
    }

    /// Run one smoothing pass over every interior cell.
    ///
    /// For each cell we count how many of its 8 neighbors share its tier,
    /// how many sit on any lower tier, and how many on any higher tier. A
    /// cell with at least 3 same-tier neighbors, or with a tie between
    /// lower and higher support, stays put. Anything else steps one tier
    /// towards whichever side outnumbers the other.
    ///
    /// All reads come from the grid as it was before the pass. The outer
    /// ring is copied over untouched. Returns the number of cells that
    /// changed tier.
    pub fn smooth(&mut self) -> usize {
        let mut next = self.grid.clone();
        let mut changed = 0;

        for point in self.grid.points() {
            if self.grid.is_edge(point) {
                continue;
            }

            let tier = self.grid.get(point);
            let new_tier =
                smoothed_tier(tier, self.grid.neighbor_counts(point));
            if new_tier != tier {
                next.set(point, new_tier);
                changed += 1;
            }
        }

        self.grid = next;
        changed
    }

    /// Merge away every region smaller than `min_region_size`, following
    /// the fixed pass order in [CLEANUP_PASSES]. Returns the number of
    /// cell reassignments made (a cell moved in two passes counts twice).
    ///
    /// Afterwards, no region of tiers 0-2 is undersized. Tier 3 has nowhere
    /// higher to go, so small tier 3 regions can survive.
    pub fn cleanup_regions(&mut self, min_region_size: usize) -> usize {
        let mut changed = 0;
        for (from, to) in CLEANUP_PASSES.iter().copied() {
            for region in self.flood_regions(from) {
                if region.len() < min_region_size {
                    trace!(
                        "Moving {}-cell {} region at {} to {}",
                        region.len(),
                        from,
                        region.cells()[0],
                        to
                    );
                    for cell in region.cells() {
                        self.grid.set(*cell, to);
                    }
                    changed += region.len();
                }
            }
        }
        changed
    }

    /// Find every region of the given tier. Regions are discovered by
    /// scanning the grid in scan order and flood filling (BFS) from each
    /// matching cell that isn't already part of a region.
    pub fn flood_regions(&self, tier: Tier) -> Vec<Region> {
        let grid = &self.grid;
        let mut visited = vec![false; grid.len()];
        let visited_index =
            |point: CellPoint| point.x * grid.height() + point.y;
        let mut regions = Vec::new();

        for start in grid.points() {
            if visited[visited_index(start)] || grid.get(start) != tier {
                continue;
            }

            let mut cells = CellSet::default();
            let mut bfs_queue = VecDeque::new();
            visited[visited_index(start)] = true;
            bfs_queue.push_back(start);

            while let Some(point) = bfs_queue.pop_front() {
                cells.insert(point);
                for adj in grid.adjacents(point) {
                    let index = visited_index(adj);
                    if !visited[index] && grid.get(adj) == tier {
                        visited[index] = true;
                        bfs_queue.push_back(adj);
                    }
                }
            }

            regions.push(Region::new(tier, cells));
        }

        regions
    }

    /// Every region of every tier, lowest tier first. Each cell in the grid
    /// lands in exactly one region.
    pub fn regions(&self) -> RegionSet {
        Tier::ALL
            .iter()
            .flat_map(|tier| self.flood_regions(*tier))
            .collect()
    }
}

/// The smoothing rule for a single cell. `counts` holds the number of
/// neighbors on each tier, indexed by [Tier::index].
fn smoothed_tier(tier: Tier, counts: [u8; 4]) -> Tier {
    let i = tier.index();
    let same = counts[i];
    let below: u8 = counts[..i].iter().sum();
    let above: u8 = counts[i + 1..].iter().sum();

    if same >= SMOOTH_SAME_THRESHOLD || above == below {
        tier
    } else if above > below {
        // above > 0 means there is a higher tier
        tier.raised().unwrap_or(tier)
    } else {
        tier.lowered().unwrap_or(tier)
    }
}
