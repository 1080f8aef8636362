//! Vertex and instance types for 3D rendering

use bytemuck::{Pod, Zeroable};

/// Mesh vertex with face normal and base color.
///
/// `color[3]` is the tint weight: 0 keeps the base color, 1 takes the
/// per-instance color entirely.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(position: [f32; 3], normal: [f32; 3], color: [f32; 4]) -> Self {
        Self {
            position,
            normal,
            color,
        }
    }

    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x4];

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Per-drawable data: model matrix columns plus tint color.
///
/// `color[3]` is the emissive amount (1 = unlit glow).
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct InstanceRaw {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
}

impl InstanceRaw {
    const ATTRIBUTES: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
        3 => Float32x4,
        4 => Float32x4,
        5 => Float32x4,
        6 => Float32x4,
        7 => Float32x4,
    ];

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<InstanceRaw>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Colors for scene elements
pub mod colors {
    /// Clear color and fog (0x050505)
    pub const BACKGROUND: [f64; 3] = [0.02, 0.02, 0.02];
    pub const FOG_NEAR: f32 = 5.0;
    pub const FOG_FAR: f32 = 45.0;

    pub const FLOOR: u32 = 0x0A0A0A;
    pub const GRID: [f32; 3] = [0.2, 0.2, 0.2];
    pub const STAFF: [f32; 3] = [0.13, 0.13, 0.13];
    pub const STAFF_RING: [f32; 3] = [0.33, 0.33, 0.33];
    pub const MONSTER_HEAD: [f32; 3] = [0.0, 0.0, 0.0];
    pub const MONSTER_EYE: [f32; 3] = [1.0, 1.0, 1.0];
}
