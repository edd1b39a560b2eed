use glam::{Mat4, Quat, Vec2, Vec3};

use crate::scene::{Camera, PointOfView};

/// Orbit camera: rotates around a focus point, pans it, zooms toward it.
///
/// The camera sits at `focus + orientation * +Z * distance`, looking at the
/// focus point.
#[derive(Debug, Clone)]
pub struct OrbitController {
    orientation: Quat,
    distance: f32,
    focus: Vec3,
    camera: Camera,

    home: (Quat, f32, Vec3),

    /// Radians per pixel of drag.
    pub rotate_speed: f32,
    /// Fraction of the focus distance per pixel of drag.
    pub pan_speed: f32,
    /// Fraction of the focus distance per wheel line.
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl OrbitController {
    /// Starts from `pov`, focusing on the point of its view ray closest to
    /// `focus_hint`.
    pub fn from_point_of_view(pov: &PointOfView, focus_hint: Vec3) -> Self {
        let eye = pov.eye();
        let forward = pov.forward();
        let distance = (focus_hint - eye).dot(forward).max(1.0);
        let focus = eye + forward * distance;
        let (_, orientation, _) = pov.world.to_scale_rotation_translation();
        let orientation = orientation.normalize();

        Self {
            orientation,
            distance,
            focus,
            camera: pov.camera,
            home: (orientation, distance, focus),
            rotate_speed: 0.01,
            pan_speed: 0.0015,
            zoom_speed: 0.1,
            min_distance: 0.5,
            max_distance: 5_000.0,
        }
    }

    pub fn focus(&self) -> Vec3 {
        self.focus
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn eye(&self) -> Vec3 {
        self.focus + self.orientation * Vec3::Z * self.distance
    }

    pub fn point_of_view(&self) -> PointOfView {
        PointOfView::new(self.camera, Mat4::from_rotation_translation(self.orientation, self.eye()))
    }

    /// Turntable rotation: horizontal drag yaws around world +Y, vertical drag
    /// pitches around the camera's right axis.
    pub fn rotate(&mut self, delta: Vec2) {
        let yaw = Quat::from_rotation_y(-delta.x * self.rotate_speed);
        self.orientation = yaw * self.orientation;

        let right = self.orientation * Vec3::X;
        let pitch = Quat::from_axis_angle(right, -delta.y * self.rotate_speed);
        self.orientation = (pitch * self.orientation).normalize();
    }

    /// Moves the focus point in the view plane, following the pointer.
    pub fn pan(&mut self, delta: Vec2) {
        let right = self.orientation * Vec3::X;
        let up = self.orientation * Vec3::Y;
        let scale = self.pan_speed * self.distance;
        self.focus += right * (-delta.x * scale) + up * (delta.y * scale);
    }

    /// Positive `lines` move toward the focus point.
    pub fn zoom(&mut self, lines: f32) {
        let factor = (1.0 - lines * self.zoom_speed).max(0.1);
        self.distance = (self.distance * factor).clamp(self.min_distance, self.max_distance);
    }

    /// Returns to the pose the controller was created with.
    pub fn reset(&mut self) {
        (self.orientation, self.distance, self.focus) = self.home;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Transform;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-3
    }

    fn controller() -> OrbitController {
        let t = Transform::from_position(Vec3::new(0.0, 30.0, 100.0)).with_euler_degrees(-10.0, 0.0, 0.0);
        OrbitController::from_point_of_view(&PointOfView::new(Camera::default(), t.matrix()), Vec3::ZERO)
    }

    #[test]
    fn starts_at_the_original_eye() {
        let c = controller();
        assert!(approx(c.eye(), Vec3::new(0.0, 30.0, 100.0)), "{:?}", c.eye());
        let pov = c.point_of_view();
        assert!(approx(pov.eye(), c.eye()));
        assert!(approx(pov.eye() + pov.forward() * c.distance(), c.focus()));
    }

    #[test]
    fn rotation_keeps_distance_to_focus() {
        let mut c = controller();
        let focus = c.focus();
        c.rotate(Vec2::new(120.0, -40.0));
        assert!(((c.eye() - focus).length() - c.distance()).abs() < 1e-3);
        assert!(approx(c.focus(), focus));
        let pov = c.point_of_view();
        assert!(approx(pov.eye() + pov.forward() * c.distance(), focus));
    }

    #[test]
    fn zoom_is_clamped() {
        let mut c = controller();
        let d = c.distance();
        c.zoom(1.0);
        assert!(c.distance() < d);
        for _ in 0..200 {
            c.zoom(5.0);
        }
        assert_eq!(c.distance(), c.min_distance);
    }

    #[test]
    fn pan_moves_focus_across_view() {
        let mut c = controller();
        let before = c.focus();
        c.pan(Vec2::new(10.0, 0.0));
        let moved = c.focus() - before;
        assert!(moved.length() > 0.0);
        assert!(moved.dot(c.point_of_view().forward()).abs() < 1e-3);
    }

    #[test]
    fn reset_restores_home_pose() {
        let mut c = controller();
        let eye = c.eye();
        c.rotate(Vec2::new(50.0, 20.0));
        c.pan(Vec2::new(3.0, 3.0));
        c.zoom(2.0);
        c.reset();
        assert!(approx(c.eye(), eye));
    }
}
