//! The two scenes of the demo.

use glam::Vec3;

use prism_engine::paint::Color;
use prism_engine::render::SharedTexture;
use prism_engine::scene::{Camera, Geometry, Light, Material, Mesh, Node, Scene};

pub const CAMERA_NODE: &str = "camera";

/// Black at 80% strength.
const SHADOW_COLOR: Color = Color::new(0.0, 0.0, 0.0, 0.8);

/// Scene rendered offscreen: a red box on a white floor.
pub fn source_scene() -> Scene {
    let mut scene = Scene::new();
    scene
        .add_node(
            Node::new(CAMERA_NODE)
                .with_position(Vec3::new(0.0, 30.0, 100.0))
                .with_euler_degrees(-10.0, 0.0, 0.0)
                .with_camera(Camera {
                    fov_y_degrees: 60.0,
                    z_near: 0.01,
                    z_far: 10_000.0,
                }),
        )
        .add_node(Node::new("ambient light").with_light(Light {
            intensity: 0.4,
            ..Light::ambient(Color::WHITE)
        }))
        .add_node(
            Node::new("directional light")
                .with_euler_degrees(-90.0, 60.0, 60.0)
                .with_light(Light::directional(Color::WHITE).with_shadow(SHADOW_COLOR)),
        )
        .add_node(Node::new("floor").with_geometry(Geometry::new(
            Mesh::floor(1_000.0),
            Material::color(Color::WHITE),
        )))
        .add_node(
            Node::new("box")
                .with_position(Vec3::new(0.0, 5.0, 0.0))
                .with_geometry(Geometry::new(
                    Mesh::cube(10.0, 10.0, 10.0),
                    Material::color(Color::RED),
                )),
        );
    scene
}

/// Scene shown on the right: one plane textured with `texture`.
pub fn display_scene(texture: SharedTexture) -> Scene {
    let mut scene = Scene::new();
    scene.add_node(
        Node::new("plane").with_geometry(Geometry::new(
            Mesh::plane(10.0, 10.0),
            Material::texture(texture),
        )),
    );
    scene
}

#[cfg(test)]
mod tests {
    use super::*;
    use prism_engine::scene::LightKind;

    #[test]
    fn source_scene_has_named_camera_and_lights() {
        let scene = source_scene();
        let pov = scene.point_of_view(CAMERA_NODE).unwrap();
        assert!((pov.eye() - Vec3::new(0.0, 30.0, 100.0)).length() < 1e-4);
        assert_eq!(pov.camera.z_far, 10_000.0);
        assert_eq!(scene.lights().len(), 2);
    }

    #[test]
    fn directional_light_casts_the_box_shadow() {
        let lights = source_scene().lights();
        let sun = lights
            .iter()
            .find(|l| l.light.kind == LightKind::Directional)
            .unwrap();
        assert!(sun.light.shadows_enabled());
        assert_eq!(sun.light.shadow_color, SHADOW_COLOR);
        // Slanted so the shadow lands beside the box.
        assert!(sun.direction.y < 0.0 && sun.direction.x.abs() > 0.5);
    }

    #[test]
    fn box_sits_on_the_floor() {
        let scene = source_scene();
        let (node, world) = scene.find_node("box").unwrap();
        let bounds = node.geometry.as_ref().unwrap().mesh().bounds().unwrap().transformed(world);
        assert!(bounds.min.y.abs() < 1e-5);
        assert!((bounds.max.y - 10.0).abs() < 1e-5);
    }
}
