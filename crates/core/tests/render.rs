#![cfg(any(feature = "stl", feature = "svg"))]

use grotto::{Cave, CaveConfig, CaveRenderer, RenderConfig};

fn cave() -> Cave {
    Cave::generate(CaveConfig {
        seed: "render".into(),
        width: 32,
        height: 24,
        ..CaveConfig::default()
    })
    .unwrap()
}

#[cfg(feature = "stl")]
#[test]
fn test_render_stl() {
    let cave = cave();
    let triangles: usize = cave
        .meshes()
        .iter()
        .map(|region_mesh| {
            region_mesh.mesh.ground_triangle_count()
                + region_mesh.mesh.wall_triangle_count()
        })
        .sum();

    // Binary STL: 80 byte header, 4 byte count, 50 bytes per triangle
    let renderer = CaveRenderer::new(RenderConfig {
        show_floor: false,
        ..RenderConfig::default()
    })
    .unwrap();
    let stl = renderer.render_as_stl(&cave);
    assert_eq!(stl.len(), 84 + 50 * triangles);

    let with_floor = CaveRenderer::new(RenderConfig::default())
        .unwrap()
        .render_as_stl(&cave);
    assert_eq!(with_floor.len(), 84 + 50 * (triangles + 2));
}

#[cfg(feature = "svg")]
#[test]
fn test_render_svg() {
    let cave = cave();
    let renderer = CaveRenderer::new(RenderConfig::default()).unwrap();
    let svg = renderer.render_as_svg(&cave);
    assert!(svg.contains("<svg"));
    assert_eq!(svg.matches("<rect").count(), 32 * 24);
    let outlines: usize = cave
        .meshes()
        .iter()
        .map(|region_mesh| region_mesh.mesh.outlines.len())
        .sum();
    assert_eq!(svg.matches("<polygon").count(), outlines);

    let no_outlines = CaveRenderer::new(RenderConfig {
        show_outlines: false,
        ..RenderConfig::default()
    })
    .unwrap()
    .render_as_svg(&cave);
    assert!(!no_outlines.contains("<polygon"));
}
