//! Rendering a cave as an STL. Only available with the "stl" feature
//! enabled.

use crate::{cave::Cave, render::CaveRenderer};
use nalgebra::Point3;
use stl_io::{Normal, Triangle, Vertex};

/// Render the given cave as an STL model: every region mesh's ground and
/// walls, plus an optional floor. STL only carries geometric data, so no
/// colors/textures. The **Y axis is up**, same as the meshes.
pub fn cave_to_stl(cave: &Cave, renderer: &CaveRenderer) -> Vec<Triangle> {
    // Normals are bullshit anyway, most programs don't respect them
    let normal = Normal::new([0.0, 0.0, 0.0]);
    let to_vertex = |point: Point3<f32>| {
        let point = renderer.scale_point(point);
        Vertex::new([point.x, point.y, point.z])
    };

    let mut mesh: Vec<Triangle> = cave
        .meshes()
        .iter()
        .flat_map(|region_mesh| region_mesh.mesh.triangles())
        .map(|[a, b, c]| Triangle {
            normal,
            vertices: [to_vertex(a), to_vertex(b), to_vertex(c)],
        })
        .collect();

    if renderer.render_config().show_floor {
        // The floor spans the same area as the control nodes
        let config = cave.config();
        let max_x = (config.width - 1) as f32 * config.mesh.cell_size as f32;
        let max_z = (config.height - 1) as f32 * config.mesh.cell_size as f32;
        let corners = [
            to_vertex(Point3::new(0.0, 0.0, 0.0)),
            to_vertex(Point3::new(max_x, 0.0, 0.0)),
            to_vertex(Point3::new(max_x, 0.0, max_z)),
            to_vertex(Point3::new(0.0, 0.0, max_z)),
        ];
        // Wound so the floor faces up
        mesh.push(Triangle {
            normal,
            vertices: [corners[0], corners[2], corners[1]],
        });
        mesh.push(Triangle {
            normal,
            vertices: [corners[0], corners[3], corners[2]],
        });
    }

    mesh
}
