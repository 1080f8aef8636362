//! Shape generation for flat-shaded 3D primitives
//!
//! Every generator appends triangle-list vertices with per-face normals.

use glam::Vec3;
use std::f32::consts::PI;

use super::Shape;
use super::vertex::{Vertex, colors};

/// Base color for parts that take the instance color entirely
const TINTED: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

fn fixed(rgb: [f32; 3]) -> [f32; 4] {
    [rgb[0], rgb[1], rgb[2], 0.0]
}

/// Push one triangle whose normal points away from `inside`
fn tri(out: &mut Vec<Vertex>, a: Vec3, b: Vec3, c: Vec3, inside: Vec3, color: [f32; 4]) {
    let mut n = (b - a).cross(c - a).normalize_or_zero();
    let (b, c) = if n.dot((a + b + c) / 3.0 - inside) < 0.0 {
        n = -n;
        (c, b)
    } else {
        (b, c)
    };
    for p in [a, b, c] {
        out.push(Vertex::new(p.to_array(), n.to_array(), color));
    }
}

/// Cone standing on its base
pub fn cone(out: &mut Vec<Vertex>, base: Vec3, radius: f32, height: f32, segments: u32, color: [f32; 4]) {
    let apex = base + Vec3::Y * height;
    let inside = base + Vec3::Y * (height * 0.25);
    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;
        let p1 = base + Vec3::new(radius * theta1.cos(), 0.0, radius * theta1.sin());
        let p2 = base + Vec3::new(radius * theta2.cos(), 0.0, radius * theta2.sin());

        tri(out, p1, p2, apex, inside, color);
        // Base cap
        tri(out, base, p1, p2, inside, color);
    }
}

/// Axis-aligned box
pub fn cuboid(out: &mut Vec<Vertex>, center: Vec3, half: Vec3, color: [f32; 4]) {
    let corner = |sx: f32, sy: f32, sz: f32| center + half * Vec3::new(sx, sy, sz);
    // Each face as two triangles, listed by its four corners
    let faces = [
        [(1., -1., -1.), (1., 1., -1.), (1., 1., 1.), (1., -1., 1.)],
        [(-1., -1., -1.), (-1., -1., 1.), (-1., 1., 1.), (-1., 1., -1.)],
        [(-1., 1., -1.), (-1., 1., 1.), (1., 1., 1.), (1., 1., -1.)],
        [(-1., -1., -1.), (1., -1., -1.), (1., -1., 1.), (-1., -1., 1.)],
        [(-1., -1., 1.), (1., -1., 1.), (1., 1., 1.), (-1., 1., 1.)],
        [(-1., -1., -1.), (-1., 1., -1.), (1., 1., -1.), (1., -1., -1.)],
    ];
    for face in faces {
        let [a, b, c, d] = face.map(|(x, y, z)| corner(x, y, z));
        tri(out, a, b, c, center, color);
        tri(out, a, c, d, center, color);
    }
}

/// Regular icosahedron (low-poly sphere)
pub fn icosahedron(out: &mut Vec<Vertex>, center: Vec3, radius: f32, color: [f32; 4]) {
    let t = (1.0 + 5f32.sqrt()) / 2.0;
    let verts = [
        Vec3::new(-1.0, t, 0.0),
        Vec3::new(1.0, t, 0.0),
        Vec3::new(-1.0, -t, 0.0),
        Vec3::new(1.0, -t, 0.0),
        Vec3::new(0.0, -1.0, t),
        Vec3::new(0.0, 1.0, t),
        Vec3::new(0.0, -1.0, -t),
        Vec3::new(0.0, 1.0, -t),
        Vec3::new(t, 0.0, -1.0),
        Vec3::new(t, 0.0, 1.0),
        Vec3::new(-t, 0.0, -1.0),
        Vec3::new(-t, 0.0, 1.0),
    ]
    .map(|v| center + v.normalize() * radius);

    #[rustfmt::skip]
    const FACES: [[usize; 3]; 20] = [
        [0, 11, 5], [0, 5, 1], [0, 1, 7], [0, 7, 10], [0, 10, 11],
        [1, 5, 9], [5, 11, 4], [11, 10, 2], [10, 7, 6], [7, 1, 8],
        [3, 9, 4], [3, 4, 2], [3, 2, 6], [3, 6, 8], [3, 8, 9],
        [4, 9, 5], [2, 4, 11], [6, 2, 10], [8, 6, 7], [9, 8, 1],
    ];
    for [a, b, c] in FACES {
        tri(out, verts[a], verts[b], verts[c], center, color);
    }
}

pub fn octahedron(out: &mut Vec<Vertex>, center: Vec3, radius: f32, color: [f32; 4]) {
    let axes = [Vec3::X, Vec3::Z, Vec3::NEG_X, Vec3::NEG_Z];
    for i in 0..4 {
        let a = center + axes[i] * radius;
        let b = center + axes[(i + 1) % 4] * radius;
        tri(out, a, b, center + Vec3::Y * radius, center, color);
        tri(out, a, b, center - Vec3::Y * radius, center, color);
    }
}

/// Flat ring facing +Z
pub fn ring(out: &mut Vec<Vertex>, center: Vec3, inner: f32, outer: f32, segments: u32, color: [f32; 4]) {
    let behind = center - Vec3::Z;
    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;
        let at = |r: f32, th: f32| center + Vec3::new(r * th.cos(), r * th.sin(), 0.0);

        tri(out, at(inner, theta1), at(outer, theta1), at(inner, theta2), behind, color);
        tri(out, at(inner, theta2), at(outer, theta1), at(outer, theta2), behind, color);
    }
}

/// Ground plane with grid lines
pub fn floor(out: &mut Vec<Vertex>, half: f32, divisions: u32, color: [f32; 4], grid: [f32; 4]) {
    let y = -0.1;
    let below = Vec3::new(0.0, y - 1.0, 0.0);
    let c = |x: f32, z: f32| Vec3::new(x, y, z);
    tri(out, c(-half, -half), c(half, -half), c(half, half), below, color);
    tri(out, c(-half, -half), c(half, half), c(-half, half), below, color);

    // Lines sit on y=0 like a grid helper, drawn as thin quads
    let w = 0.03;
    let step = 2.0 * half / divisions as f32;
    let g = |x: f32, z: f32| Vec3::new(x, 0.0, z);
    let below = Vec3::NEG_Y;
    for i in 0..=divisions {
        let p = -half + i as f32 * step;
        tri(out, g(p - w, -half), g(p + w, -half), g(p + w, half), below, grid);
        tri(out, g(p - w, -half), g(p + w, half), g(p - w, half), below, grid);
        tri(out, g(-half, p - w), g(half, p - w), g(half, p + w), below, grid);
        tri(out, g(-half, p - w), g(half, p + w), g(-half, p + w), below, grid);
    }
}

/// Build the local-space mesh for a shape
pub fn mesh(shape: Shape) -> Vec<Vertex> {
    let mut out = Vec::new();
    match shape {
        Shape::Monster => {
            cone(&mut out, Vec3::ZERO, 0.5, 1.5, 5, TINTED);
            icosahedron(&mut out, Vec3::new(0.0, 1.2, 0.0), 0.3, fixed(colors::MONSTER_HEAD));
            for side in [-1.0, 1.0] {
                let eye = Vec3::new(0.15 * side, 1.2, -0.28);
                cuboid(&mut out, eye, Vec3::splat(0.06), fixed(colors::MONSTER_EYE));
                let hand = Vec3::new(0.6 * side, 0.8, -0.2);
                cuboid(&mut out, hand, Vec3::splat(0.1), TINTED);
            }
        }
        Shape::Bolt => icosahedron(&mut out, Vec3::ZERO, 0.12, TINTED),
        Shape::Spark => cuboid(&mut out, Vec3::ZERO, Vec3::splat(0.05), TINTED),
        Shape::Staff => {
            // Shaft runs back toward the camera from the ring
            cuboid(
                &mut out,
                Vec3::new(0.0, 0.0, 0.5),
                Vec3::new(0.03, 0.03, 0.5),
                fixed(colors::STAFF),
            );
            ring(&mut out, Vec3::ZERO, 0.13, 0.17, 20, fixed(colors::STAFF_RING));
        }
        Shape::Crystal => octahedron(&mut out, Vec3::ZERO, 0.08, TINTED),
        Shape::Floor => floor(&mut out, 100.0, 80, TINTED, fixed(colors::GRID)),
    }
    out
}
