mod seed;

pub use seed::Seed;

use log::warn;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Configuration that defines a cave generation process. Two caves generated
/// from the same config will always be identical.
#[derive(Clone, Debug, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct CaveConfig {
    /// RNG seed for every randomized step of generation. See [Seed] for the
    /// accepted formats.
    pub seed: Seed,

    /// Number of cells along the X axis
    #[validate(range(min = 3, max = 4096))]
    pub width: usize,

    /// Number of cells along the Y axis (which becomes Z in mesh space)
    #[validate(range(min = 3, max = 4096))]
    pub height: usize,

    /// Config for seeding, smoothing and cleaning up the tier grid
    #[validate]
    pub automaton: AutomatonConfig,

    /// Config for turning regions into geometry
    #[validate]
    pub mesh: MeshConfig,

    /// Config for the noise function that bumps up the ground surface
    #[validate]
    pub height_field: NoiseFnConfig,
}

/// Parameters for the cellular automaton that produces the tier grid.
///
/// Each interior cell draws a number in `[0, 100)`. If it's above
/// `high_threshold` the cell starts at tier 3, otherwise above
/// `mid_threshold` tier 2, above `low_threshold` tier 1, else tier 0. The
/// thresholds are meant to be ordered `high >= mid >= low`; that isn't
/// enforced, but an unordered set makes some tiers unreachable.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct AutomatonConfig {
    #[validate(range(min = 0, max = 100))]
    pub high_threshold: u32,
    #[validate(range(min = 0, max = 100))]
    pub mid_threshold: u32,
    #[validate(range(min = 0, max = 100))]
    pub low_threshold: u32,

    /// Number of smoothing passes to run after seeding
    #[validate(range(min = 0, max = 1000))]
    pub smooth_iterations: u32,

    /// Regions with fewer cells than this get merged into a neighboring tier
    /// during cleanup. 0 disables cleanup entirely.
    pub min_region_size: usize,

    /// Thickness of the border band, as a percentage of each dimension.
    /// Cells in the band are biased heavily towards tier 0 so that the cave
    /// is walled in.
    #[validate(range(min = 0.0, max = 100.0))]
    pub border_percent: f64,
}

/// Parameters for converting regions into meshes.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_mesh_config"))]
#[serde(default)]
pub struct MeshConfig {
    /// World-space distance between two adjacent control nodes. Must be
    /// positive.
    pub cell_size: f64,

    /// Vertical distance between two consecutive tiers. The height field
    /// adds up to `2.2 * wall_height` on top of that.
    pub wall_height: f64,
}

/// Config for the noise function that drives the height field. We use
/// https://crates.io/crates/noise for noise generation.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct NoiseFnConfig {
    pub noise_type: NoiseFnType,

    /// Number of different frequencies to add together
    #[validate(range(min = 1, max = 32))]
    pub octaves: usize,

    /// The frequency of the first (lowest) octave, in cycles per cell
    #[validate(range(min = 0.0))]
    pub frequency: f64,

    /// Frequency multiplier between successive octaves
    pub lacunarity: f64,

    /// Amplitude multiplier between successive octaves
    pub persistence: f64,

    /// Exponent applied to normalized `[0, 1]` samples. Values below 1 push
    /// the ground up, above 1 flatten it out.
    #[validate(range(min = 0.0))]
    pub exponent: f64,
}

/// The supported fractal noise functions. All of them are seedable and built
/// on Perlin noise.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseFnType {
    BasicMulti,
    Billow,
    Fbm,
    HybridMulti,
    RidgedMulti,
}

impl CaveConfig {
    /// Run validation on this config, plus some softer checks that only log.
    /// Generation calls this before allocating anything.
    pub(crate) fn check(&self) -> Result<(), validator::ValidationErrors> {
        self.validate()?;

        let automaton = &self.automaton;
        if !(automaton.high_threshold >= automaton.mid_threshold
            && automaton.mid_threshold >= automaton.low_threshold)
        {
            warn!(
                "Tier thresholds are not ordered high >= mid >= low \
                ({} / {} / {}), some tiers may never be seeded",
                automaton.high_threshold,
                automaton.mid_threshold,
                automaton.low_threshold
            );
        }
        Ok(())
    }
}

fn validate_mesh_config(config: &MeshConfig) -> Result<(), ValidationError> {
    // NaN fails this too
    if config.cell_size > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::new("cell_size must be positive"))
    }
}

impl Default for CaveConfig {
    fn default() -> Self {
        Self {
            // Danger! This means the default will vary between calls!
            seed: Seed::random(),
            width: 96,
            height: 96,
            automaton: AutomatonConfig::default(),
            mesh: MeshConfig::default(),
            height_field: NoiseFnConfig::default(),
        }
    }
}

impl Default for AutomatonConfig {
    fn default() -> Self {
        Self {
            high_threshold: 75,
            mid_threshold: 55,
            low_threshold: 45,
            smooth_iterations: 5,
            min_region_size: 12,
            border_percent: 8.0,
        }
    }
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            cell_size: 1.0,
            wall_height: 2.0,
        }
    }
}

impl Default for NoiseFnConfig {
    fn default() -> Self {
        Self {
            noise_type: NoiseFnType::Fbm,
            octaves: 4,
            frequency: 0.05,
            lacunarity: 2.0,
            persistence: 0.5,
            exponent: 1.0,
        }
    }
}
