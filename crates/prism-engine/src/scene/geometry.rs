use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::paint::Color;
use crate::render::SharedTexture;

// ── mesh data ─────────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl MeshVertex {
    const ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x3, // position
        1 => Float32x3, // normal
        2 => Float32x2  // uv
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Radius of the sphere through the corners.
    pub fn radius(&self) -> f32 {
        (self.max - self.min).length() * 0.5
    }

    pub fn union(self, other: Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Bounds of the eight transformed corners.
    pub fn transformed(&self, m: Mat4) -> Self {
        let corners = (0..8).map(|i| {
            Vec3::new(
                if i & 1 == 0 { self.min.x } else { self.max.x },
                if i & 2 == 0 { self.min.y } else { self.max.y },
                if i & 4 == 0 { self.min.z } else { self.max.z },
            )
        });
        let mut out = Self {
            min: Vec3::splat(f32::INFINITY),
            max: Vec3::splat(f32::NEG_INFINITY),
        };
        for c in corners {
            let p = m.transform_point3(c);
            out.min = out.min.min(p);
            out.max = out.max.max(p);
        }
        out
    }
}

/// Indexed triangle mesh, counter-clockwise front faces.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u16>,
}

impl Mesh {
    /// Box centred on the origin.
    pub fn cube(width: f32, height: f32, length: f32) -> Self {
        let half = Vec3::new(width, height, length) * 0.5;
        // (normal, u axis, v axis) with u x v == normal.
        let faces = [
            (Vec3::X, Vec3::NEG_Z, Vec3::Y),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
            (Vec3::Y, Vec3::X, Vec3::NEG_Z),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
        ];

        let mut mesh = Self {
            vertices: Vec::with_capacity(24),
            indices: Vec::with_capacity(36),
        };
        for (n, u, v) in faces {
            let center = n * n.abs().dot(half);
            mesh.push_quad(center, n, u * u.abs().dot(half), v * v.abs().dot(half));
        }
        mesh
    }

    /// Plane in the XY plane facing +Z, centred on the origin.
    pub fn plane(width: f32, height: f32) -> Self {
        let mut mesh = Self {
            vertices: Vec::with_capacity(4),
            indices: Vec::with_capacity(6),
        };
        mesh.push_quad(Vec3::ZERO, Vec3::Z, Vec3::X * width * 0.5, Vec3::Y * height * 0.5);
        mesh
    }

    /// Square floor in the XZ plane facing +Y, `extent` units per side.
    pub fn floor(extent: f32) -> Self {
        let mut mesh = Self {
            vertices: Vec::with_capacity(4),
            indices: Vec::with_capacity(6),
        };
        let h = extent * 0.5;
        mesh.push_quad(Vec3::ZERO, Vec3::Y, Vec3::X * h, Vec3::NEG_Z * h);
        mesh
    }

    /// Appends a quad spanning `center ± u ± v`. UV (0, 0) is the `-u, +v`
    /// corner so textures appear upright when `v` points up.
    fn push_quad(&mut self, center: Vec3, normal: Vec3, u: Vec3, v: Vec3) {
        let base = self.vertices.len() as u16;
        let corners = [
            (center - u - v, [0.0, 1.0]),
            (center + u - v, [1.0, 1.0]),
            (center + u + v, [1.0, 0.0]),
            (center - u + v, [0.0, 0.0]),
        ];
        for (p, uv) in corners {
            self.vertices.push(MeshVertex {
                position: p.to_array(),
                normal: normal.to_array(),
                uv,
            });
        }
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    pub fn bounds(&self) -> Option<Bounds> {
        let mut it = self.vertices.iter().map(|v| Vec3::from_array(v.position));
        let first = it.next()?;
        Some(it.fold(Bounds { min: first, max: first }, |b, p| Bounds {
            min: b.min.min(p),
            max: b.max.max(p),
        }))
    }
}

// ── materials ─────────────────────────────────────────────────────────────

/// Source of a material's diffuse color.
#[derive(Debug, Clone)]
pub enum MaterialProperty {
    Color(Color),
    /// Sampled texture. Holds the texture handle itself, so contents written
    /// to the texture later are picked up without touching the material.
    Texture(SharedTexture),
}

#[derive(Debug, Clone)]
pub struct Material {
    pub diffuse: MaterialProperty,
    /// Disables back-face culling.
    pub double_sided: bool,
}

impl Material {
    pub fn color(color: Color) -> Self {
        Self {
            diffuse: MaterialProperty::Color(color),
            double_sided: false,
        }
    }

    pub fn texture(texture: SharedTexture) -> Self {
        Self {
            diffuse: MaterialProperty::Texture(texture),
            double_sided: false,
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::color(Color::WHITE)
    }
}

// ── geometry ──────────────────────────────────────────────────────────────

/// Identity of a geometry's mesh data; renderers cache GPU buffers by it.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct GeometryId(u64);

static NEXT_GEOMETRY_ID: AtomicU64 = AtomicU64::new(1);

/// Mesh + material. Clones share the mesh (and its id).
#[derive(Debug, Clone)]
pub struct Geometry {
    id: GeometryId,
    mesh: Arc<Mesh>,
    pub material: Material,
}

impl Geometry {
    pub fn new(mesh: Mesh, material: Material) -> Self {
        Self {
            id: GeometryId(NEXT_GEOMETRY_ID.fetch_add(1, Ordering::Relaxed)),
            mesh: Arc::new(mesh),
            material,
        }
    }

    pub fn id(&self) -> GeometryId {
        self.id
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }
}
