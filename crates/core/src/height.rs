//! Continuous height sources that bump up the ground surface of each region.
//! The mesher only ever sees the [HeightField] trait, so anything that can
//! produce a `[0, 1]` value per cell works.

use crate::config::{NoiseFnConfig, NoiseFnType};
use noise::{
    BasicMulti, Billow, Fbm, HybridMulti, MultiFractal, NoiseFn, Perlin,
    RidgedMulti,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};

/// A scalar field over the grid. Implementations should return values in
/// `[0, 1]`, and must return the same value every time for the same cell.
pub trait HeightField: Sync {
    fn sample(&self, x: usize, y: usize) -> f64;
}

/// Any `Fn(x, y) -> f64` is a height field. Handy for tests.
impl<F: Fn(usize, usize) -> f64 + Sync> HeightField for F {
    fn sample(&self, x: usize, y: usize) -> f64 {
        self(x, y)
    }
}

/// The same height everywhere
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct FlatHeightField(pub f64);

impl HeightField for FlatHeightField {
    fn sample(&self, _: usize, _: usize) -> f64 {
        self.0
    }
}

/// A height field that's been sampled once for every cell and stored. This
/// is what a [crate::Cave] keeps, so that meshes and renderers all read the
/// exact same values without re-running noise.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HeightMap {
    width: usize,
    height: usize,
    /// Column-major, same as [crate::TierGrid]
    values: Vec<f64>,
}

impl HeightMap {
    /// Sample every cell of a `width`×`height` grid from another field
    pub fn from_field(
        width: usize,
        height: usize,
        field: &(impl HeightField + ?Sized),
    ) -> Self {
        let mut values = Vec::with_capacity(width * height);
        for x in 0..width {
            for y in 0..height {
                values.push(field.sample(x, y));
            }
        }
        Self {
            width,
            height,
            values,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }
}

impl HeightField for HeightMap {
    /// Cells outside the map sample as 0
    fn sample(&self, x: usize, y: usize) -> f64 {
        if x < self.width && y < self.height {
            self.values[x * self.height + y]
        } else {
            0.0
        }
    }
}

/// A height field backed by a seeded fractal noise function. Noise output
/// is mapped from `[-1, 1]` to `[0, 1]`, clamped, then raised to the
/// configured exponent.
pub struct NoiseHeightField {
    noise_fn: Box<dyn NoiseFn<f64, 2> + Send + Sync>,
    config: NoiseFnConfig,
}

impl NoiseHeightField {
    /// Build the configured noise function. Consumes exactly one value from
    /// the RNG, for the noise seed.
    pub fn new(rng: &mut impl Rng, config: NoiseFnConfig) -> Self {
        let seed: u32 = rng.gen();
        let noise_fn: Box<dyn NoiseFn<f64, 2> + Send + Sync> =
            match config.noise_type {
                NoiseFnType::BasicMulti => {
                    configure(BasicMulti::<Perlin>::new(seed), &config)
                }
                NoiseFnType::Billow => {
                    configure(Billow::<Perlin>::new(seed), &config)
                }
                NoiseFnType::Fbm => {
                    configure(Fbm::<Perlin>::new(seed), &config)
                }
                NoiseFnType::HybridMulti => {
                    configure(HybridMulti::<Perlin>::new(seed), &config)
                }
                NoiseFnType::RidgedMulti => {
                    configure(RidgedMulti::<Perlin>::new(seed), &config)
                }
            };
        Self { noise_fn, config }
    }

    pub fn config(&self) -> &NoiseFnConfig {
        &self.config
    }
}

/// Apply the shared fractal parameters and box the function up
fn configure<F>(
    noise_fn: F,
    config: &NoiseFnConfig,
) -> Box<dyn NoiseFn<f64, 2> + Send + Sync>
where
    F: MultiFractal + NoiseFn<f64, 2> + Send + Sync + 'static,
{
    Box::new(
        noise_fn
            .set_octaves(config.octaves)
            .set_frequency(config.frequency)
            .set_lacunarity(config.lacunarity)
            .set_persistence(config.persistence),
    )
}

impl HeightField for NoiseHeightField {
    fn sample(&self, x: usize, y: usize) -> f64 {
        let raw = self.noise_fn.get([x as f64, y as f64]);
        let normalized = ((raw + 1.0) / 2.0).clamp(0.0, 1.0);
        normalized.powf(self.config.exponent)
    }
}

// The boxed noise fn isn't Debug
impl Debug for NoiseHeightField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NoiseHeightField")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
