//! Renderer that draws nothing
//!
//! Keeps the same drawable bookkeeping as the GPU path so native runs and
//! tests can inspect what would be on screen.

use slotmap::SlotMap;

use super::{Camera, DrawableDesc, DrawableHandle, RenderBackend, Shape, Transform};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Drawn {
    pub shape: Shape,
    pub transform: Transform,
    pub color: u32,
}

#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    drawables: SlotMap<DrawableHandle, Drawn>,
    pub frames: u64,
    pub created: u64,
    pub destroyed: u64,
    pub size: (u32, u32),
    pub last_camera: Option<Camera>,
}

impl HeadlessRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live(&self) -> usize {
        self.drawables.len()
    }

    pub fn get(&self, handle: DrawableHandle) -> Option<&Drawn> {
        self.drawables.get(handle)
    }

    pub fn count(&self, shape: Shape) -> usize {
        self.drawables.values().filter(|d| d.shape == shape).count()
    }
}

impl RenderBackend for HeadlessRenderer {
    fn create(&mut self, desc: &DrawableDesc) -> DrawableHandle {
        self.created += 1;
        self.drawables.insert(Drawn {
            shape: desc.shape,
            transform: desc.transform,
            color: desc.color,
        })
    }

    fn update(&mut self, handle: DrawableHandle, transform: &Transform, color: u32) {
        if let Some(d) = self.drawables.get_mut(handle) {
            d.transform = *transform;
            d.color = color;
        }
    }

    fn destroy(&mut self, handle: DrawableHandle) {
        if self.drawables.remove(handle).is_some() {
            self.destroyed += 1;
        }
    }

    fn draw(&mut self, camera: &Camera) {
        self.frames += 1;
        self.last_camera = Some(*camera);
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.size = (width, height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn desc(shape: Shape) -> DrawableDesc {
        DrawableDesc {
            shape,
            color: 0xFFFFFF,
            transform: Transform::default(),
        }
    }

    #[test]
    fn test_double_destroy_is_noop() {
        let mut r = HeadlessRenderer::new();
        let a = r.create(&desc(Shape::Bolt));
        r.destroy(a);
        r.destroy(a);
        assert_eq!(r.live(), 0);
        assert_eq!((r.created, r.destroyed), (1, 1));
    }

    #[test]
    fn test_stale_handle_leaves_reused_slot_alone() {
        let mut r = HeadlessRenderer::new();
        let bolt = r.create(&desc(Shape::Bolt));
        r.destroy(bolt);

        // The freed slot is reused by the next drawable
        let monster = r.create(&desc(Shape::Monster));
        assert_ne!(bolt, monster);

        r.destroy(bolt);
        r.update(bolt, &Transform::default(), 0x000000);
        assert!(r.get(bolt).is_none());
        assert_eq!(r.count(Shape::Monster), 1);
        assert_eq!(r.get(monster).map(|d| d.color), Some(0xFFFFFF));
        assert_eq!(r.destroyed, 1);
    }

    #[test]
    fn test_release_in_any_order() {
        let mut r = HeadlessRenderer::new();
        let handles: Vec<_> = (0..5).map(|_| r.create(&desc(Shape::Spark))).collect();
        for &h in handles.iter().rev().step_by(2) {
            r.destroy(h);
        }
        assert_eq!(r.live(), 2);
        assert!(r.get(handles[1]).is_some());
        assert!(r.get(handles[3]).is_some());
        assert!(r.get(handles[0]).is_none());
    }
}
