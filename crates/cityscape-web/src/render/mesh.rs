//! Procedural geometry for every scene mesh. All builders are pure so the
//! shapes can be checked on the host without a GPU.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use std::collections::{HashMap, HashSet};

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

/// Positions in pairs, one line segment each.
pub struct LineData {
    pub positions: Vec<[f32; 3]>,
}

/// Latitude-longitude sphere with equirectangular UVs. The x term is negated
/// so a 360 photo wraps the right way round when viewed from inside.
pub fn uv_sphere(radius: f32, segments: u32, rings: u32) -> MeshData {
    let mut vertices = Vec::with_capacity(((rings + 1) * (segments + 1)) as usize);
    for r in 0..=rings {
        let v = r as f32 / rings as f32;
        let phi = v * std::f32::consts::PI;
        for s in 0..=segments {
            let u = s as f32 / segments as f32;
            let theta = u * std::f32::consts::TAU;
            let position = [
                -radius * theta.cos() * phi.sin(),
                radius * phi.cos(),
                radius * theta.sin() * phi.sin(),
            ];
            let normal = Vec3::from(position).normalize_or_zero();
            vertices.push(Vertex {
                position,
                normal: normal.to_array(),
                uv: [u, v],
            });
        }
    }
    let mut indices = Vec::with_capacity((rings * segments * 6) as usize);
    let stride = segments + 1;
    for r in 0..rings {
        for s in 0..segments {
            let a = r * stride + s;
            let b = a + stride;
            indices.extend_from_slice(&[a, b, a + 1, b, b + 1, a + 1]);
        }
    }
    MeshData { vertices, indices }
}

/// Unit quad in the XY plane facing +Z, with v running top to bottom so
/// decoded images land upright.
pub fn quad() -> MeshData {
    let n = [0.0, 0.0, 1.0];
    let vertices = vec![
        Vertex { position: [-0.5, 0.5, 0.0], normal: n, uv: [0.0, 0.0] },
        Vertex { position: [0.5, 0.5, 0.0], normal: n, uv: [1.0, 0.0] },
        Vertex { position: [0.5, -0.5, 0.0], normal: n, uv: [1.0, 1.0] },
        Vertex { position: [-0.5, -0.5, 0.0], normal: n, uv: [0.0, 1.0] },
    ];
    MeshData {
        vertices,
        indices: vec![0, 3, 2, 0, 2, 1],
    }
}

/// Unit cube centred on the origin, 24 vertices for hard-edged normals.
pub fn cube() -> MeshData {
    // (normal, u axis, v axis) per face
    let faces: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
        ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
        ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
        ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    ];
    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (normal, u_axis, v_axis) in faces {
        let n = Vec3::from(normal);
        let ua = Vec3::from(u_axis);
        let va = Vec3::from(v_axis);
        let base = vertices.len() as u32;
        for (du, dv, uv) in [
            (-0.5, 0.5, [0.0, 0.0]),
            (0.5, 0.5, [1.0, 0.0]),
            (0.5, -0.5, [1.0, 1.0]),
            (-0.5, -0.5, [0.0, 1.0]),
        ] {
            let p = n * 0.5 + ua * du + va * dv;
            vertices.push(Vertex {
                position: p.to_array(),
                normal,
                uv,
            });
        }
        indices.extend_from_slice(&[base, base + 3, base + 2, base, base + 2, base + 1]);
    }
    MeshData { vertices, indices }
}

/// Four-sided roof: square base, apex on +Y, flat-shaded sides plus a base.
pub fn pyramid(base_half: f32, height: f32) -> MeshData {
    let h = height / 2.0;
    let corners = [
        Vec3::new(-base_half, -h, -base_half),
        Vec3::new(base_half, -h, -base_half),
        Vec3::new(base_half, -h, base_half),
        Vec3::new(-base_half, -h, base_half),
    ];
    let apex = Vec3::new(0.0, h, 0.0);
    let mut vertices = Vec::with_capacity(4 * 3 + 4);
    let mut indices = Vec::with_capacity(4 * 3 + 6);
    for i in 0..4 {
        let a = corners[i];
        let b = corners[(i + 1) % 4];
        let n = (apex - a).cross(b - a).normalize().to_array();
        let base = vertices.len() as u32;
        vertices.push(Vertex { position: a.to_array(), normal: n, uv: [0.0, 1.0] });
        vertices.push(Vertex { position: b.to_array(), normal: n, uv: [1.0, 1.0] });
        vertices.push(Vertex { position: apex.to_array(), normal: n, uv: [0.5, 0.0] });
        indices.extend_from_slice(&[base, base + 2, base + 1]);
    }
    let base = vertices.len() as u32;
    for (i, c) in corners.iter().enumerate() {
        let uv = [(i == 1 || i == 2) as u32 as f32, (i >= 2) as u32 as f32];
        vertices.push(Vertex { position: c.to_array(), normal: [0.0, -1.0, 0.0], uv });
    }
    indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    MeshData { vertices, indices }
}

/// Subdivided octahedron projected onto a sphere; the faceted look of the
/// low-detail version is the crystal body.
pub fn octahedron(radius: f32, detail: u32) -> MeshData {
    let mut points: Vec<Vec3> = vec![
        Vec3::X,
        Vec3::NEG_X,
        Vec3::Y,
        Vec3::NEG_Y,
        Vec3::Z,
        Vec3::NEG_Z,
    ];
    let mut faces: Vec<[u32; 3]> = vec![
        [0, 2, 4],
        [0, 4, 3],
        [0, 3, 5],
        [0, 5, 2],
        [1, 2, 5],
        [1, 5, 3],
        [1, 3, 4],
        [1, 4, 2],
    ];
    for _ in 0..detail {
        let mut midpoints: HashMap<(u32, u32), u32> = HashMap::new();
        let mut next = Vec::with_capacity(faces.len() * 4);
        let mut midpoint = |a: u32, b: u32, points: &mut Vec<Vec3>| -> u32 {
            let key = (a.min(b), a.max(b));
            *midpoints.entry(key).or_insert_with(|| {
                let m = (points[a as usize] + points[b as usize]).normalize();
                points.push(m);
                points.len() as u32 - 1
            })
        };
        for [a, b, c] in faces {
            let ab = midpoint(a, b, &mut points);
            let bc = midpoint(b, c, &mut points);
            let ca = midpoint(c, a, &mut points);
            next.push([a, ab, ca]);
            next.push([ab, b, bc]);
            next.push([ca, bc, c]);
            next.push([ab, bc, ca]);
        }
        faces = next;
    }
    // Flat-shaded: duplicate vertices per face so each facet keeps its plane.
    let mut vertices = Vec::with_capacity(faces.len() * 3);
    let mut indices = Vec::with_capacity(faces.len() * 3);
    for [a, b, c] in &faces {
        let pa = points[*a as usize].normalize() * radius;
        let pb = points[*b as usize].normalize() * radius;
        let pc = points[*c as usize].normalize() * radius;
        let n = (pb - pa).cross(pc - pa).normalize().to_array();
        for p in [pa, pb, pc] {
            let u = 0.5 + p.z.atan2(p.x) / std::f32::consts::TAU;
            let v = 0.5 - (p.y / radius).clamp(-1.0, 1.0).asin() / std::f32::consts::PI;
            indices.push(vertices.len() as u32);
            vertices.push(Vertex {
                position: p.to_array(),
                normal: n,
                uv: [u, v],
            });
        }
    }
    MeshData { vertices, indices }
}

/// Ring in the XY plane, matching the spinner's spin axes.
pub fn torus(radius: f32, tube: f32, radial_segments: u32, tubular_segments: u32) -> MeshData {
    let mut vertices =
        Vec::with_capacity(((radial_segments + 1) * (tubular_segments + 1)) as usize);
    for j in 0..=radial_segments {
        let v = j as f32 / radial_segments as f32 * std::f32::consts::TAU;
        for i in 0..=tubular_segments {
            let u = i as f32 / tubular_segments as f32 * std::f32::consts::TAU;
            let center = Vec3::new(radius * u.cos(), radius * u.sin(), 0.0);
            let position = Vec3::new(
                (radius + tube * v.cos()) * u.cos(),
                (radius + tube * v.cos()) * u.sin(),
                tube * v.sin(),
            );
            let normal = (position - center).normalize().to_array();
            vertices.push(Vertex {
                position: position.to_array(),
                normal,
                uv: [
                    i as f32 / tubular_segments as f32,
                    j as f32 / radial_segments as f32,
                ],
            });
        }
    }
    let stride = tubular_segments + 1;
    let mut indices = Vec::with_capacity((radial_segments * tubular_segments * 6) as usize);
    for j in 0..radial_segments {
        for i in 0..tubular_segments {
            let a = j * stride + i;
            let b = a + stride;
            indices.extend_from_slice(&[a, b, a + 1, b, b + 1, a + 1]);
        }
    }
    MeshData { vertices, indices }
}

/// Unique edges of a mesh as a line list. Edges are deduplicated by vertex
/// position, not index, so flat-shaded meshes with split vertices still give
/// one segment per geometric edge.
pub fn wireframe(mesh: &MeshData) -> LineData {
    let bits = |p: [f32; 3]| (p[0].to_bits(), p[1].to_bits(), p[2].to_bits());
    let mut seen: HashSet<((u32, u32, u32), (u32, u32, u32))> = HashSet::new();
    let mut positions = Vec::new();
    for tri in mesh.indices.chunks_exact(3) {
        for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
            let pa = mesh.vertices[a as usize].position;
            let pb = mesh.vertices[b as usize].position;
            let (ka, kb) = (bits(pa), bits(pb));
            let key = if ka <= kb { (ka, kb) } else { (kb, ka) };
            if seen.insert(key) {
                positions.push(pa);
                positions.push(pb);
            }
        }
    }
    LineData { positions }
}

/// Square line grid in the XY plane, centred on the origin.
pub fn grid_lines(half_lines: i32, spacing: f32, extent: f32) -> LineData {
    let mut positions = Vec::with_capacity(((half_lines * 2 + 1) * 4) as usize);
    for i in -half_lines..=half_lines {
        let offset = i as f32 * spacing;
        positions.push([offset, -extent, 0.0]);
        positions.push([offset, extent, 0.0]);
        positions.push([-extent, offset, 0.0]);
        positions.push([extent, offset, 0.0]);
    }
    LineData { positions }
}
