use serde::{Deserialize, Serialize};
use validator::Validate;

/// Configuration specific to visually rendering a cave. These options have
/// no bearing on cave _generation_, only on the visual presentation. If you
/// generate a cave and then output to a non-visual format (e.g. JSON or
/// binary), these options will **never** affect that output.
///
/// Not all render options apply to all formats. The documentation for each
/// field lists which formats it applies to.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct RenderConfig {
    /// Multiplier applied to every Y coordinate. This changes how tall the
    /// cave _looks_, not the underlying mesh data.
    ///
    /// ## Relevant Formats
    /// - STL
    #[validate(range(min = 0.001))]
    pub vertical_scale: f64,

    /// Add a flat floor under the whole cave, at Y = 0. Without it, the
    /// floor tier has no geometry at all.
    ///
    /// ## Relevant Formats
    /// - STL
    pub show_floor: bool,

    /// Draw every region outline on top of the tier map
    ///
    /// ## Relevant Formats
    /// - SVG
    pub show_outlines: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            vertical_scale: 1.0,
            show_floor: true,
            show_outlines: true,
        }
    }
}
