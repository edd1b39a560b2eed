use glam::{Mat4, Vec3};

/// Perspective camera attached to a node. It looks down the node's local -Z
/// axis with +Y up.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera {
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            fov_y_degrees: 60.0,
            z_near: 1.0,
            z_far: 100.0,
        }
    }
}

impl Camera {
    /// Right-handed projection with `[0, 1]` depth (wgpu convention).
    pub fn projection(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(
            self.fov_y_degrees.to_radians(),
            aspect.max(f32::EPSILON),
            self.z_near,
            self.z_far,
        )
    }
}

/// A camera together with the world transform of the node that holds it.
///
/// Renderers never look up cameras themselves: the caller decides which
/// viewpoint a scene is drawn from.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointOfView {
    pub camera: Camera,
    pub world: Mat4,
}

impl PointOfView {
    pub fn new(camera: Camera, world: Mat4) -> Self {
        Self { camera, world }
    }

    pub fn eye(&self) -> Vec3 {
        self.world.transform_point3(Vec3::ZERO)
    }

    pub fn forward(&self) -> Vec3 {
        self.world.transform_vector3(Vec3::NEG_Z).normalize_or(Vec3::NEG_Z)
    }

    pub fn view(&self) -> Mat4 {
        self.world.inverse()
    }

    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.camera.projection(aspect) * self.view()
    }
}
