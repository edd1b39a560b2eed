//! Scene graph.
//!
//! A `Scene` is a forest of `Node`s. Nodes carry a local transform and
//! optional camera, light and geometry attachments. The graph is plain data:
//! renderers walk it each frame and keep their GPU resources elsewhere.

mod camera;
mod geometry;
mod light;
mod node;

use glam::{Mat4, Vec3};

pub use camera::{Camera, PointOfView};
pub use geometry::{Bounds, Geometry, GeometryId, Material, MaterialProperty, Mesh, MeshVertex};
pub use light::{Light, LightKind, SceneLight};
pub use node::{Node, Transform};

#[derive(Debug, Clone, Default)]
pub struct Scene {
    roots: Vec<Node>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, node: Node) -> &mut Self {
        self.roots.push(node);
        self
    }

    /// Visits every node depth-first with its world transform.
    pub fn walk<'s>(&'s self, mut f: impl FnMut(&'s Node, Mat4)) {
        fn visit<'s>(node: &'s Node, parent: Mat4, f: &mut impl FnMut(&'s Node, Mat4)) {
            let world = parent * node.transform.matrix();
            f(node, world);
            for child in &node.children {
                visit(child, world, f);
            }
        }

        for root in &self.roots {
            visit(root, Mat4::IDENTITY, &mut f);
        }
    }

    /// First node with the given name, with its world transform.
    pub fn find_node(&self, name: &str) -> Option<(&Node, Mat4)> {
        let mut found = None;
        self.walk(|node, world| {
            if found.is_none() && node.name == name {
                found = Some((node, world));
            }
        });
        found
    }

    /// Point of view of the named camera node.
    pub fn point_of_view(&self, name: &str) -> Option<PointOfView> {
        let (node, world) = self.find_node(name)?;
        Some(PointOfView::new(node.camera?, world))
    }

    /// Point of view of the first camera in traversal order.
    pub fn first_point_of_view(&self) -> Option<PointOfView> {
        let mut found = None;
        self.walk(|node, world| {
            if found.is_none() {
                if let Some(camera) = node.camera {
                    found = Some(PointOfView::new(camera, world));
                }
            }
        });
        found
    }

    pub fn lights(&self) -> Vec<SceneLight> {
        let mut out = Vec::new();
        self.walk(|node, world| {
            if let Some(light) = node.light {
                out.push(SceneLight::resolve(light, world));
            }
        });
        out
    }

    /// World-space bounds of all geometry.
    pub fn bounds(&self) -> Option<Bounds> {
        let mut out: Option<Bounds> = None;
        self.walk(|node, world| {
            let Some(b) = node.geometry.as_ref().and_then(|g| g.mesh().bounds()) else {
                return;
            };
            let b = b.transformed(world);
            out = Some(out.map_or(b, |o| o.union(b)));
        });
        out
    }

    /// Camera on +Z looking at the scene centre, far enough back to fit the
    /// bounding sphere. Used by views whose scene has no camera.
    pub fn default_point_of_view(&self) -> PointOfView {
        let camera = Camera::default();
        let Some(bounds) = self.bounds() else {
            return PointOfView::new(camera, Mat4::from_translation(Vec3::new(0.0, 0.0, 10.0)));
        };

        let radius = bounds.radius().max(0.01);
        let half_fov = (camera.fov_y_degrees * 0.5).to_radians();
        let distance = radius / half_fov.sin();
        let eye = bounds.center() + Vec3::Z * distance;

        PointOfView::new(
            Camera {
                z_near: (distance - radius).max(0.01) * 0.5,
                z_far: (distance + radius) * 2.0,
                ..camera
            },
            Mat4::from_translation(eye),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paint::Color;

    fn sample_scene() -> Scene {
        let mut scene = Scene::new();
        scene
            .add_node(
                Node::new("camera")
                    .with_position(Vec3::new(0.0, 30.0, 100.0))
                    .with_camera(Camera::default()),
            )
            .add_node(
                Node::new("group").with_position(Vec3::new(0.0, 5.0, 0.0)).with_child(
                    Node::new("box")
                        .with_position(Vec3::new(1.0, 0.0, 0.0))
                        .with_geometry(Geometry::new(Mesh::cube(2.0, 2.0, 2.0), Material::default())),
                ),
            );
        scene
    }

    #[test]
    fn world_transform_composes_parents() {
        let scene = sample_scene();
        let (_, world) = scene.find_node("box").unwrap();
        assert_eq!(world.transform_point3(Vec3::ZERO), Vec3::new(1.0, 5.0, 0.0));
    }

    #[test]
    fn point_of_view_requires_a_camera() {
        let scene = sample_scene();
        assert!(scene.point_of_view("camera").is_some());
        assert!(scene.point_of_view("box").is_none());
        assert!(scene.point_of_view("missing").is_none());
        assert_eq!(scene.first_point_of_view(), scene.point_of_view("camera"));
    }

    #[test]
    fn bounds_are_in_world_space() {
        let b = sample_scene().bounds().unwrap();
        assert_eq!(b.min, Vec3::new(0.0, 4.0, -1.0));
        assert_eq!(b.max, Vec3::new(2.0, 6.0, 1.0));
    }

    #[test]
    fn lights_are_collected_from_children() {
        let mut scene = Scene::new();
        assert!(scene.lights().is_empty());
        scene.add_node(Node::new("rig").with_child(Node::new("sun").with_light(Light::directional(Color::WHITE))));
        assert_eq!(scene.lights().len(), 1);
    }

    #[test]
    fn default_point_of_view_frames_a_plane() {
        let mut scene = Scene::new();
        scene.add_node(
            Node::new("plane").with_geometry(Geometry::new(Mesh::plane(10.0, 10.0), Material::default())),
        );
        let pov = scene.default_point_of_view();
        let vp = pov.view_projection(1.0);
        for corner in [Vec3::new(-5.0, -5.0, 0.0), Vec3::new(5.0, 5.0, 0.0)] {
            let clip = vp * corner.extend(1.0);
            let ndc = clip.truncate() / clip.w;
            assert!(ndc.x.abs() < 1.0 && ndc.y.abs() < 1.0, "{ndc:?}");
            assert!(ndc.z > 0.0 && ndc.z < 1.0);
        }
    }
}
