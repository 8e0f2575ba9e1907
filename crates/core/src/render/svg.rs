//! Rendering a cave as a top-down SVG tier map. Only available with the
//! "svg" feature enabled.

use crate::{
    cave::{grid::CellPoint, Cave},
    render::{color::Color3, CaveRenderer},
};
use nalgebra::Point3;
use svg::{
    node::{
        element::{Group, Polygon, Polyline, Rectangle},
        Comment,
    },
    Document,
};

fn outline_color() -> Color3 {
    Color3::new_int(230, 57, 70)
}

/// Render a cave as an SVG. Each cell is a 1×1 square, colored by tier.
/// SVG's Y axis points down, so the grid is flipped to keep `y = 0` at the
/// bottom.
pub fn cave_to_svg(cave: &Cave, renderer: &CaveRenderer) -> Document {
    let grid = cave.grid();
    let height = grid.height();

    let mut document = Document::new()
        .set("viewBox", (0, 0, grid.width(), height))
        .set("shape-rendering", "crispEdges")
        .add(Comment::new(format!("\n{:#?}\n", cave.config())));

    let mut cells = Group::new();
    for point in grid.points() {
        let CellPoint { x, y } = point;
        cells = cells.add(
            Rectangle::new()
                .set("x", x)
                .set("y", height - 1 - y)
                .set("width", 1)
                .set("height", 1)
                .set("fill", renderer.tier_color(grid.get(point)).to_html()),
        );
    }
    document = document.add(cells);

    if renderer.render_config().show_outlines {
        let cell_size = cave.config().mesh.cell_size as f32;
        // Control nodes sit at cell centers
        let to_svg = |point: Point3<f32>| {
            (
                point.x / cell_size + 0.5,
                height as f32 - (point.z / cell_size + 0.5),
            )
        };

        let mut outlines = Group::new()
            .set("fill", "none")
            .set("stroke", outline_color().to_html())
            .set("stroke-width", 0.15);
        for region_mesh in cave.meshes() {
            let mesh = &region_mesh.mesh;
            for outline in &mesh.outlines {
                let points: Vec<(f32, f32)> = outline
                    .vertices
                    .iter()
                    .map(|id| to_svg(mesh.vertices[*id as usize]))
                    .collect();
                outlines = if outline.closed {
                    outlines.add(Polygon::new().set("points", points))
                } else {
                    outlines.add(Polyline::new().set("points", points))
                };
            }
        }
        document = document.add(outlines);
    }

    document
}
