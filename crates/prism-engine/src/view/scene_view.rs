use anyhow::{anyhow, Result};
use glam::{Vec2, Vec3};

use crate::coords::Viewport;
use crate::input::{InputFrame, InputState, MouseButton};
use crate::paint::Color;
use crate::render::{RenderCtx, RenderPassConfig, RenderTarget, SceneRenderer};
use crate::scene::{PointOfView, Scene};

use super::{FrameHook, OrbitController};

/// An on-screen view of one scene.
///
/// Owns the scene, its point of view, a background color and a renderer.
/// Optionally carries an orbit camera controller and a `FrameHook` delegate
/// that runs once per frame before the view draws.
pub struct SceneView {
    scene: Scene,
    point_of_view: PointOfView,
    controller: Option<OrbitController>,
    /// True while a drag that started inside this view is in progress.
    dragging: bool,
    background: Color,
    renderer: SceneRenderer,
    delegate: Option<Box<dyn FrameHook>>,
}

impl SceneView {
    /// Views `scene` through its first camera, or through a default camera
    /// framing the scene when it has none.
    pub fn new(scene: Scene) -> Self {
        let point_of_view = scene
            .first_point_of_view()
            .unwrap_or_else(|| scene.default_point_of_view());

        Self {
            scene,
            point_of_view,
            controller: None,
            dragging: false,
            background: Color::BLACK,
            renderer: SceneRenderer::new(),
            delegate: None,
        }
    }

    /// Switches to the camera on the node called `name`.
    pub fn set_point_of_view(&mut self, name: &str) -> Result<()> {
        self.point_of_view = self
            .scene
            .point_of_view(name)
            .ok_or_else(|| anyhow!("scene has no camera node named '{name}'"))?;
        if self.controller.is_some() {
            self.controller = Some(self.make_controller());
        }
        Ok(())
    }

    pub fn set_allows_camera_control(&mut self, allow: bool) {
        self.controller = allow.then(|| self.make_controller());
        self.dragging = false;
    }

    pub fn allows_camera_control(&self) -> bool {
        self.controller.is_some()
    }

    pub fn set_background(&mut self, color: Color) {
        self.background = color;
    }

    pub fn set_auto_enables_default_lighting(&mut self, enabled: bool) {
        self.renderer.auto_enables_default_lighting = enabled;
    }

    /// Registers the per-frame hook, replacing any previous one.
    pub fn set_delegate(&mut self, delegate: Box<dyn FrameHook>) {
        self.delegate = Some(delegate);
    }

    /// Current viewpoint, including interactive camera changes.
    pub fn point_of_view(&self) -> PointOfView {
        match &self.controller {
            Some(c) => c.point_of_view(),
            None => self.point_of_view,
        }
    }

    /// Runs the delegate for the frame about to be drawn.
    pub fn will_render(&mut self, time: f64) {
        let pov = self.point_of_view();
        if let Some(delegate) = self.delegate.as_mut() {
            delegate.will_render_scene(&self.scene, &pov, time);
        }
    }

    /// Applies pointer input to the camera controller.
    ///
    /// Left drag orbits, right drag (or shift + left drag) pans, the wheel
    /// zooms. Drags must start inside `viewport`; the wheel only acts while
    /// the pointer is over it. Returns true when the camera moved.
    pub fn handle_input(&mut self, input: &InputState, frame: &InputFrame, viewport: Viewport) -> bool {
        let Some(controller) = self.controller.as_mut() else {
            return false;
        };

        let hovered = input
            .pointer_pos
            .is_some_and(|(x, y)| viewport.contains(x, y));

        let pressed = frame.buttons_pressed.contains(&MouseButton::Left)
            || frame.buttons_pressed.contains(&MouseButton::Right);
        if pressed && hovered {
            self.dragging = true;
        }
        let left = input.button_down(MouseButton::Left);
        let right = input.button_down(MouseButton::Right);
        if !left && !right {
            self.dragging = false;
        }

        let mut moved = false;
        let delta = Vec2::new(frame.pointer_delta.0, frame.pointer_delta.1);
        if self.dragging && delta != Vec2::ZERO {
            if right || input.modifiers.shift {
                controller.pan(delta);
            } else {
                controller.rotate(delta);
            }
            moved = true;
        }

        if hovered && frame.wheel_lines != 0.0 {
            controller.zoom(frame.wheel_lines);
            moved = true;
        }
        moved
    }

    /// Returns the interactive camera to its starting pose.
    pub fn reset_camera(&mut self) {
        if let Some(c) = self.controller.as_mut() {
            c.reset();
        }
    }

    /// Clears `viewport` to the background color and draws the scene into it.
    pub fn draw(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>, viewport: Viewport, time: f64) {
        let pov = self.point_of_view();
        self.renderer.render(
            ctx,
            target,
            &self.scene,
            &pov,
            viewport,
            time,
            &RenderPassConfig::clear(self.background),
        );
    }

    fn make_controller(&self) -> OrbitController {
        let hint = self.scene.bounds().map_or(Vec3::ZERO, |b| b.center());
        OrbitController::from_point_of_view(&self.point_of_view, hint)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::input::{InputEvent, MouseButtonState, PointerButtonEvent, PointerMoveEvent};
    use crate::scene::{Camera, Geometry, Material, Mesh, Node};

    fn scene_with_camera() -> Scene {
        let mut scene = Scene::new();
        scene
            .add_node(
                Node::new("camera")
                    .with_position(Vec3::new(0.0, 30.0, 100.0))
                    .with_euler_degrees(-10.0, 0.0, 0.0)
                    .with_camera(Camera::default()),
            )
            .add_node(
                Node::new("box")
                    .with_position(Vec3::new(0.0, 5.0, 0.0))
                    .with_geometry(Geometry::new(Mesh::cube(10.0, 10.0, 10.0), Material::color(Color::RED))),
            );
        scene
    }

    #[test]
    fn delegate_runs_once_per_frame_with_view_state() {
        let calls: Rc<RefCell<Vec<(f64, PointOfView)>>> = Rc::default();
        let log = Rc::clone(&calls);

        let mut view = SceneView::new(scene_with_camera());
        view.set_delegate(Box::new(move |_: &Scene, pov: &PointOfView, time: f64| {
            log.borrow_mut().push((time, *pov));
        }));

        for i in 0..3 {
            view.will_render(i as f64);
        }

        let calls = calls.borrow();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[2].0, 2.0);
        assert_eq!(calls[0].1, view.point_of_view());
    }

    #[test]
    fn without_delegate_will_render_is_a_no_op() {
        let mut view = SceneView::new(scene_with_camera());
        view.will_render(0.0);
    }

    #[test]
    fn unknown_point_of_view_is_an_error() {
        let mut view = SceneView::new(scene_with_camera());
        assert!(view.set_point_of_view("missing").is_err());
        assert!(view.set_point_of_view("camera").is_ok());
    }

    #[test]
    fn cameraless_scene_gets_default_view() {
        let mut scene = Scene::new();
        scene.add_node(Node::new("plane").with_geometry(Geometry::new(Mesh::plane(10.0, 10.0), Material::default())));
        let view = SceneView::new(scene);
        assert!(view.point_of_view().eye().z > 0.0);
    }

    fn drag(state: &mut InputState, frame: &mut InputFrame, from: (f32, f32), to: (f32, f32)) {
        state.apply_event(frame, InputEvent::PointerMoved(PointerMoveEvent { x: from.0, y: from.1 }));
        state.apply_event(
            frame,
            InputEvent::PointerButton(PointerButtonEvent {
                button: MouseButton::Left,
                state: MouseButtonState::Pressed,
                x: from.0,
                y: from.1,
                modifiers: Default::default(),
            }),
        );
        state.apply_event(frame, InputEvent::PointerMoved(PointerMoveEvent { x: to.0, y: to.1 }));
    }

    #[test]
    fn drag_inside_viewport_orbits() {
        let mut view = SceneView::new(scene_with_camera());
        view.set_allows_camera_control(true);
        let before = view.point_of_view();

        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        drag(&mut state, &mut frame, (100.0, 100.0), (160.0, 100.0));

        assert!(view.handle_input(&state, &frame, Viewport::new(0.0, 0.0, 640.0, 640.0)));
        assert_ne!(view.point_of_view(), before);

        view.reset_camera();
        assert!((view.point_of_view().eye() - before.eye()).length() < 1e-3);
    }

    #[test]
    fn drag_outside_viewport_is_ignored() {
        let mut view = SceneView::new(scene_with_camera());
        view.set_allows_camera_control(true);
        let before = view.point_of_view();

        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        drag(&mut state, &mut frame, (700.0, 100.0), (760.0, 100.0));

        assert!(!view.handle_input(&state, &frame, Viewport::new(0.0, 0.0, 640.0, 640.0)));
        assert_eq!(view.point_of_view(), before);
    }

    #[test]
    fn input_is_ignored_without_camera_control() {
        let mut view = SceneView::new(scene_with_camera());
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        drag(&mut state, &mut frame, (100.0, 100.0), (160.0, 100.0));
        assert!(!view.handle_input(&state, &frame, Viewport::new(0.0, 0.0, 640.0, 640.0)));
    }
}
