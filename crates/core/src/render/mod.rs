pub mod color;
pub mod config;
#[cfg(feature = "stl")]
pub mod stl;
#[cfg(feature = "svg")]
pub mod svg;

#[cfg(any(feature = "stl", feature = "svg"))]
use crate::cave::Cave;
use crate::{
    cave::tier::Tier,
    render::{color::Color3, config::RenderConfig},
};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A cave renderer is used to convert caves into various visual output
/// formats. A renderer is created using a particular [RenderConfig], and from
/// there can be used to render any number of caves any number of times.
///
/// Config options cannot be changed after creating a renderer, but renderers
/// are very cheap to create so if you need to change the config, just create
/// a new renderer.
///
/// ## Supported Formats
/// - STL (3D, no colors or textures)
/// - SVG (2D top-down tier map)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CaveRenderer {
    /// **This is different from the cave config.** The cave config controls
    /// how the cave is generated, the render config just controls how it's
    /// visually presented _after_ generation.
    render_config: RenderConfig,
}

impl CaveRenderer {
    /// Initialize a new renderer with the given options. Returns an error if
    /// the render config is invalid.
    pub fn new(render_config: RenderConfig) -> anyhow::Result<Self> {
        render_config.validate()?;
        Ok(Self { render_config })
    }

    pub fn render_config(&self) -> &RenderConfig {
        &self.render_config
    }

    /// Map a tier to its preset color. Higher tiers are brighter.
    pub fn tier_color(&self, tier: Tier) -> Color3 {
        match tier {
            Tier::Floor => Color3::new_int(0, 0, 0),
            Tier::Low => Color3::new_int(0, 0, 255),
            Tier::Mid => Color3::new_int(0, 255, 255),
            Tier::High => Color3::new_int(255, 255, 255),
        }
    }

    /// Apply the vertical scale to a mesh-space point
    pub fn scale_point(&self, point: Point3<f32>) -> Point3<f32> {
        Point3::new(
            point.x,
            point.y * self.render_config.vertical_scale as f32,
            point.z,
        )
    }

    /// Render this cave as a 2D SVG, from a top-down perspective. Returns
    /// the SVG in a string.
    #[cfg(feature = "svg")]
    pub fn render_as_svg(&self, cave: &Cave) -> String {
        svg::cave_to_svg(cave, self).to_string()
    }

    /// Render this cave into an STL model. Return value is the STL binary
    /// data.
    #[cfg(feature = "stl")]
    pub fn render_as_stl(&self, cave: &Cave) -> Vec<u8> {
        let mesh = stl::cave_to_stl(cave, self);
        let mut buffer = Vec::<u8>::new();
        // Panic here indicates a bug in our STL mesh format
        stl_io::write_stl(&mut buffer, mesh.iter())
            .expect("error serializing STL");
        buffer
    }
}
