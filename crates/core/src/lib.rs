//! Grotto generates tiered cave maps. A cellular automaton lays out a grid
//! of four elevation tiers, small regions get merged away, and every raised
//! region is turned into a 3D mesh (ground plus walls) with marching
//! squares. This crate contains all the core generation logic. Presentation
//! layers are implemented elsewhere.
//!
//! ```
//! use grotto::{Cave, CaveConfig};
//!
//! let config = CaveConfig {
//!     seed: "damp".into(),
//!     width: 32,
//!     height: 32,
//!     ..CaveConfig::default()
//! };
//! let cave = Cave::generate(config).unwrap();
//! println!("{} regions", cave.regions().len());
//! // From here you can display/use the cave however you like.
//! ```
//!
//! See [CaveConfig] for details on how generation can be customized.

mod cave;
mod config;
mod height;
mod mesh;
mod render;
mod util;

pub use crate::{
    cave::{
        automaton::GridAutomaton,
        grid::{CellPoint, TierGrid},
        region::{CellSet, Region, RegionSet},
        tier::{InvalidTier, Tier},
        Cave,
    },
    config::{
        AutomatonConfig, CaveConfig, MeshConfig, NoiseFnConfig, NoiseFnType,
        Seed,
    },
    height::{FlatHeightField, HeightField, HeightMap, NoiseHeightField},
    mesh::{
        cases::{Case, SquarePoint, CASES},
        node::{ControlGrid, NodeKey, NodeKind},
        outline::{EdgeGraph, Outline},
        MeshBuildResult, MeshError, MeshExtractor, RegionMesh,
    },
    render::{color::Color3, config::RenderConfig, CaveRenderer},
};
