use glam::{Mat4, Quat, Vec3};

use super::{Camera, Geometry, Light};

/// Local transform of a node relative to its parent.
///
/// `euler` holds pitch (x), yaw (y) and roll (z) in radians. The rotation is
/// `Rx * Ry * Rz`: roll is applied first, pitch last.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub euler: Vec3,
    pub scale: f32,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        euler: Vec3::ZERO,
        scale: 1.0,
    };

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    pub fn with_euler_degrees(self, pitch: f32, yaw: f32, roll: f32) -> Self {
        Self {
            euler: Vec3::new(pitch.to_radians(), yaw.to_radians(), roll.to_radians()),
            ..self
        }
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_x(self.euler.x)
            * Quat::from_rotation_y(self.euler.y)
            * Quat::from_rotation_z(self.euler.z)
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(Vec3::splat(self.scale), self.rotation(), self.position)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// A scene graph node. Attachments are optional and independent: a node can
/// carry a camera, a light and a geometry at once.
#[derive(Clone, Default)]
pub struct Node {
    pub name: String,
    pub transform: Transform,
    pub camera: Option<Camera>,
    pub light: Option<Light>,
    pub geometry: Option<Geometry>,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.transform.position = position;
        self
    }

    pub fn with_euler_degrees(mut self, pitch: f32, yaw: f32, roll: f32) -> Self {
        self.transform = self.transform.with_euler_degrees(pitch, yaw, roll);
        self
    }

    pub fn with_camera(mut self, camera: Camera) -> Self {
        self.camera = Some(camera);
        self
    }

    pub fn with_light(mut self, light: Light) -> Self {
        self.light = Some(light);
        self
    }

    pub fn with_geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = Some(geometry);
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.name)
            .field("transform", &self.transform)
            .field("camera", &self.camera.is_some())
            .field("light", &self.light.map(|l| l.kind))
            .field("geometry", &self.geometry.as_ref().map(|g| g.id()))
            .field("children", &self.children.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn pitch_down_tilts_forward_axis() {
        let t = Transform::IDENTITY.with_euler_degrees(-10.0, 0.0, 0.0);
        let forward = t.rotation() * Vec3::NEG_Z;
        let expected = Vec3::new(0.0, -(10f32.to_radians().sin()), -(10f32.to_radians().cos()));
        assert!(approx(forward, expected), "{forward:?}");
    }

    #[test]
    fn roll_applies_before_pitch() {
        let t = Transform::IDENTITY.with_euler_degrees(90.0, 0.0, 90.0);
        // Roll takes +X to +Y, then pitch takes +Y to +Z.
        assert!(approx(t.rotation() * Vec3::X, Vec3::Z));
    }

    #[test]
    fn matrix_applies_scale_rotation_translation() {
        let t = Transform {
            position: Vec3::new(1.0, 2.0, 3.0),
            euler: Vec3::new(0.0, std::f32::consts::FRAC_PI_2, 0.0),
            scale: 2.0,
        };
        let p = t.matrix().transform_point3(Vec3::X);
        // Yaw +90° takes +X to -Z.
        assert!(approx(p, Vec3::new(1.0, 2.0, 1.0)), "{p:?}");
    }
}
