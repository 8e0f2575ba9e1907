use grotto::{
    AutomatonConfig, Cave, CaveConfig, CaveRenderer, MeshConfig,
    NoiseFnConfig, NoiseFnType, RenderConfig, Seed,
};
use validator::ValidationErrors;

/// Sorted top-level field names from a validation failure
fn error_fields(errors: &ValidationErrors) -> Vec<&'static str> {
    let mut fields = errors.errors().keys().copied().collect::<Vec<_>>();
    fields.sort_unstable();
    fields
}

#[test]
fn test_cave_config_validation() {
    let config = CaveConfig {
        seed: Seed::Int(0),
        width: 2,     // invalid (too small)
        height: 4096, // valid
        automaton: AutomatonConfig {
            high_threshold: 150, // invalid
            mid_threshold: 55,
            low_threshold: 45,
            smooth_iterations: 0, // valid
            min_region_size: 0,   // valid, disables cleanup
            border_percent: 10.0,
        },
        mesh: MeshConfig {
            cell_size: 0.0,    // invalid
            wall_height: -1.0, // valid (but weird)
        },
        height_field: NoiseFnConfig {
            noise_type: NoiseFnType::Fbm,
            octaves: 0,        // invalid
            frequency: 0.1,    // valid
            lacunarity: -1.0,  // valid (but weird)
            persistence: -1.0, // valid (but weird)
            exponent: 1.0,     // valid
        },
    };

    // This is a bit of a lazy check but it works well enough
    let err = Cave::generate(config).unwrap_err();
    let validation_errors = err.downcast::<ValidationErrors>().unwrap();
    assert_eq!(
        error_fields(&validation_errors),
        vec!["automaton", "height_field", "mesh", "width"],
        "incorrect validation errors in {:#?}",
        validation_errors
    );
}

#[test]
fn test_unordered_thresholds_allowed() {
    // Thresholds out of order only log a warning
    let config = CaveConfig {
        seed: Seed::Int(12),
        width: 20,
        height: 20,
        automaton: AutomatonConfig {
            high_threshold: 20,
            mid_threshold: 50,
            low_threshold: 80,
            ..AutomatonConfig::default()
        },
        ..CaveConfig::default()
    };
    Cave::generate(config).unwrap();
}

#[test]
fn test_render_config_validation() {
    let render_config = RenderConfig {
        vertical_scale: 0.0, // invalid
        show_floor: false,   // valid
        show_outlines: true, // valid
    };

    let err = CaveRenderer::new(render_config).unwrap_err();
    let validation_errors = err.downcast::<ValidationErrors>().unwrap();
    assert_eq!(
        error_fields(&validation_errors),
        vec!["vertical_scale"],
        "incorrect validation errors in {:#?}",
        validation_errors
    );
}
