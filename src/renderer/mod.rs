//! Rendering module
//!
//! The controller drives a [`RenderBackend`] through opaque drawable handles.
//! [`HeadlessRenderer`] records calls for native runs and tests;
//! [`SceneRenderer`] draws instanced meshes with WebGPU.

pub mod headless;
pub mod pipeline;
pub mod shapes;
pub mod vertex;

pub use headless::HeadlessRenderer;
pub use pipeline::SceneRenderer;

use glam::{Mat4, Quat, Vec3};

pub use crate::sim::DrawableHandle;

/// Mesh kinds the scene knows how to draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    /// Cone body with head, eyes and hands; faces -Z
    Monster,
    /// Glowing bolt
    Bolt,
    /// Explosion spark cube
    Spark,
    /// Weapon shaft and head ring
    Staff,
    /// Weapon crystal showing the rune color
    Crystal,
    /// Arena ground
    Floor,
}

impl Shape {
    pub const ALL: [Shape; 6] = [
        Shape::Monster,
        Shape::Bolt,
        Shape::Spark,
        Shape::Staff,
        Shape::Crystal,
        Shape::Floor,
    ];
}

/// Placement of a drawable in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: 1.0,
        }
    }
}

impl Transform {
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(Vec3::splat(self.scale), self.rotation, self.position)
    }
}

/// What to create
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawableDesc {
    pub shape: Shape,
    /// 0xRRGGBB tint
    pub color: u32,
    pub transform: Transform,
}

/// First-person camera
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub orientation: Quat,
    /// Vertical field of view (radians)
    pub fov_y: f32,
}

impl Camera {
    pub const NEAR: f32 = 0.1;
    pub const FAR: f32 = 100.0;

    pub fn view(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation, self.eye).inverse()
    }

    pub fn view_proj(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, aspect.max(1e-3), Self::NEAR, Self::FAR) * self.view()
    }
}

/// Render-side half of the game; everything it draws is reached by handle
pub trait RenderBackend {
    fn create(&mut self, desc: &DrawableDesc) -> DrawableHandle;

    /// Move/recolor a drawable. Unknown handles are ignored.
    fn update(&mut self, handle: DrawableHandle, transform: &Transform, color: u32);

    /// Release a drawable. Releasing twice is a no-op.
    fn destroy(&mut self, handle: DrawableHandle);

    /// Present one frame from the camera's point of view
    fn draw(&mut self, camera: &Camera);

    fn resize(&mut self, width: u32, height: u32);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_ahead_projects_to_center() {
        let camera = Camera {
            eye: Vec3::new(3.0, 1.7, -2.0),
            orientation: Quat::from_rotation_y(0.7),
            fov_y: 75f32.to_radians(),
        };
        let ahead = camera.eye + camera.orientation * Vec3::NEG_Z * 10.0;
        let clip = camera.view_proj(16.0 / 9.0) * ahead.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-4 && ndc.y.abs() < 1e-4);
        assert!((0.0..1.0).contains(&ndc.z));
    }

    #[test]
    fn test_point_behind_is_clipped() {
        let camera = Camera {
            eye: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            fov_y: 1.2,
        };
        let clip = camera.view_proj(1.0) * Vec3::new(0.0, 0.0, 5.0).extend(1.0);
        assert!(clip.w < 0.0);
    }

    #[test]
    fn test_transform_matrix() {
        let t = Transform {
            position: Vec3::new(1.0, 2.0, 3.0),
            rotation: Quat::IDENTITY,
            scale: 2.0,
        };
        let p = t.matrix().transform_point3(Vec3::X);
        assert!((p - Vec3::new(3.0, 2.0, 3.0)).length() < 1e-6);
    }
}
