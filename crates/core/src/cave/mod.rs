pub mod automaton;
pub mod grid;
pub mod region;
pub mod tier;

use crate::{
    cave::{automaton::GridAutomaton, grid::TierGrid, region::RegionSet},
    config::CaveConfig,
    height::{HeightMap, NoiseHeightField},
    mesh::{MeshExtractor, RegionMesh},
    timed,
};
use anyhow::Context;
use log::{info, warn};
use rand::SeedableRng;
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};

/// A fully generated cave: the tier grid, its regions, the height map that
/// shaped the ground, and a mesh for every raised region. Also holds the
/// config that was used to generate all of it.
///
/// ## Serialization
/// Caves can be serialized and deserialized as JSON (feature `json`) or
/// binary (feature `bin`).
///
/// ### Binary Format
/// Currently the binary format is [CBOR](https://cbor.io/), but that is
/// subject to change so beware of that if you write other programs that load
/// the format.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Cave {
    /// Generation is deterministic based on config, and once the cave has
    /// been generated, the config can never change.
    config: CaveConfig,
    grid: TierGrid,
    regions: RegionSet,
    height_map: HeightMap,
    /// One entry per region above the floor, in region order
    meshes: Vec<RegionMesh>,
}

impl Cave {
    /// Generate a new cave with the given config. Returns an error if the
    /// config is invalid. A region that can't be meshed does **not** fail
    /// generation, see [RegionMesh::error].
    pub fn generate(config: CaveConfig) -> anyhow::Result<Self> {
        info!("Generating cave with config {:#?}", config);

        config.check().context("invalid config")?;

        timed!("Cave generation", log::Level::Info, {
            let mut rng = Pcg64::seed_from_u64(config.seed.to_u64());

            let automaton = GridAutomaton::generate(
                config.width,
                config.height,
                &mut rng,
                &config.automaton,
            );
            let regions = timed!("Region extraction", automaton.regions());
            info!("Found {} regions", regions.len());

            // Drawn after the grid, so height field settings never change
            // the layout
            let height_map = timed!("Height field sampling", {
                let noise =
                    NoiseHeightField::new(&mut rng, config.height_field);
                HeightMap::from_field(config.width, config.height, &noise)
            });

            let extractor = MeshExtractor::new(
                config.width,
                config.height,
                config.mesh,
                &height_map,
            );
            let meshes =
                timed!("Mesh extraction", extractor.build_all(&regions));
            let failed = meshes.iter().filter(|m| m.error.is_some()).count();
            if failed > 0 {
                warn!("{} of {} region meshes failed", failed, meshes.len());
            }

            Ok(Self {
                grid: automaton.into_grid(),
                config,
                regions,
                height_map,
                meshes,
            })
        })
    }

    pub fn config(&self) -> &CaveConfig {
        &self.config
    }

    pub fn grid(&self) -> &TierGrid {
        &self.grid
    }

    pub fn regions(&self) -> &RegionSet {
        &self.regions
    }

    pub fn height_map(&self) -> &HeightMap {
        &self.height_map
    }

    pub fn meshes(&self) -> &[RegionMesh] {
        &self.meshes
    }

    /// Deserialize a cave from JSON. A cave can be serialized into JSON with
    /// [Cave::to_json]. Will fail if the input is malformed.
    #[cfg(feature = "json")]
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("error deserializing cave")
    }

    /// Serializes this cave into JSON. This is a recoverable format, which can
    /// be loaded back into a [Cave] with [Cave::from_json].
    #[cfg(feature = "json")]
    pub fn to_json(&self) -> String {
        // Panic here indicates an internal bug in the data format
        serde_json::to_string(self).expect("error serializing cave")
    }

    /// Deserialize a cave from binary format. A cave can be serialized into
    /// binary with [Cave::to_bin]. Will fail if the input is malformed.
    #[cfg(feature = "bin")]
    pub fn from_bin(read: impl std::io::Read) -> anyhow::Result<Self> {
        serde_cbor::from_reader(read).context("error deserializing cave")
    }

    /// Serializes this cave into a binary format, which can be loaded back
    /// with [Cave::from_bin]. See the struct-level [Cave] documentation for
    /// a description of the binary format.
    #[cfg(feature = "bin")]
    pub fn to_bin(&self) -> Vec<u8> {
        let mut buffer = Vec::new();
        // Panic here indicates an internal bug in the data format
        serde_cbor::to_writer(&mut buffer, self)
            .expect("error serializing cave");
        buffer
    }
}
