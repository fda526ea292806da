//! Body Instances - per-body transform records for GPU upload
//!
//! After each tick the host collects one [`BodyInstance`] per body and uploads
//! the slice as an instance buffer. The struct is `Pod`, so
//! `bytemuck::cast_slice` turns it into bytes without copying.

use bytemuck::{Pod, Zeroable};

use crate::physics::{PhysicsWorld, RigidBody, Shape};

/// Values of [`BodyInstance::shape_kind`].
pub mod shape_kind {
    pub const CUBOID: u32 = 0;
    pub const SPHERE: u32 = 1;
}

/// Bit of [`BodyInstance::color_packed`] set while the body sleeps.
pub const SLEEPING_FLAG: u32 = 1 << 24;

/// Color used when the caller has none.
pub const DEFAULT_COLOR: u32 = 0xCCCCCC;

/// Per-body instance record.
///
/// Layout:
///   offset 0:  position (vec3<f32>)  = 12 bytes
///   offset 12: shape_kind (u32)      = 4 bytes
///   offset 16: rotation (vec4<f32>)  = 16 bytes, quaternion xyzw
///   offset 32: scale (vec3<f32>)     = 12 bytes, half extents or radius
///   offset 44: color_packed (u32)    = 4 bytes, RGB in the low 24 bits
///   Total: 48 bytes
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct BodyInstance {
    pub position: [f32; 3],
    pub shape_kind: u32,
    pub rotation: [f32; 4],
    pub scale: [f32; 3],
    pub color_packed: u32,
}

impl BodyInstance {
    /// Instance for `body` drawn in `color` (0xRRGGBB).
    pub fn from_body(body: &RigidBody, color: u32) -> Self {
        let (shape_kind, scale) = match body.shape() {
            Shape::Cuboid { half_extents } => (shape_kind::CUBOID, half_extents.to_array()),
            Shape::Sphere { radius } => (shape_kind::SPHERE, [radius; 3]),
        };
        let mut color_packed = color & 0x00FF_FFFF;
        if body.is_sleeping() {
            color_packed |= SLEEPING_FLAG;
        }

        Self {
            position: body.position().to_array(),
            shape_kind,
            rotation: body.orientation().to_array(),
            scale,
            color_packed,
        }
    }

    pub fn is_sleeping(&self) -> bool {
        self.color_packed & SLEEPING_FLAG != 0
    }

    pub fn color(&self) -> u32 {
        self.color_packed & 0x00FF_FFFF
    }
}

/// Pack an RGB color as u32: (R << 16) | (G << 8) | B
#[inline]
pub fn pack_color(r: u8, g: u8, b: u8) -> u32 {
    ((r as u32) << 16) | ((g as u32) << 8) | (b as u32)
}

/// Pack a linear `[0, 1]` RGB triple.
pub fn pack_color_f32(rgb: [f32; 3]) -> u32 {
    let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    pack_color(channel(rgb[0]), channel(rgb[1]), channel(rgb[2]))
}

/// One instance per body in registry order, all in [`DEFAULT_COLOR`].
pub fn collect_instances(world: &PhysicsWorld) -> Vec<BodyInstance> {
    world
        .bodies()
        .iter()
        .map(|(_, body)| BodyInstance::from_body(body, DEFAULT_COLOR))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{BodyDesc, Vec3};
    use glam::Quat;

    #[test]
    fn test_body_instance_size() {
        assert_eq!(std::mem::size_of::<BodyInstance>(), 48);
    }

    #[test]
    fn test_cast_to_bytes() {
        let instances = [BodyInstance::zeroed(); 3];
        let bytes: &[u8] = bytemuck::cast_slice(&instances);
        assert_eq!(bytes.len(), 144);
    }

    #[test]
    fn test_pack_color() {
        assert_eq!(pack_color(255, 128, 64), 0xFF8040);
        assert_eq!(pack_color_f32([1.0, 0.0, 2.0]), 0xFF00FF);
    }

    #[test]
    fn test_collect_instances() {
        let mut world = PhysicsWorld::default();
        let rotation = Quat::from_rotation_y(0.5);
        world
            .create_with(
                BodyDesc::fixed(Shape::cuboid(Vec3::new(5.0, 0.25, 5.0)))
                    .at(Vec3::new(0.0, -2.0, 0.0))
                    .with_orientation(rotation),
            )
            .unwrap();
        world
            .create_with(BodyDesc::dynamic(Shape::sphere(0.5)).at(Vec3::new(2.0, 8.0, 0.0)))
            .unwrap();

        let instances = collect_instances(&world);
        assert_eq!(instances.len(), 2);

        let ground = instances.iter().find(|i| i.shape_kind == shape_kind::CUBOID).unwrap();
        assert_eq!(ground.position, [0.0, -2.0, 0.0]);
        assert_eq!(ground.scale, [5.0, 0.25, 5.0]);
        assert_eq!(ground.rotation, rotation.normalize().to_array());
        assert_eq!(ground.color(), DEFAULT_COLOR);

        let ball = instances.iter().find(|i| i.shape_kind == shape_kind::SPHERE).unwrap();
        assert_eq!(ball.scale, [0.5; 3]);
        assert!(!ball.is_sleeping());
    }
}
