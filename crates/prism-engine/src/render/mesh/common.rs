//! GPU-side types shared by the scene pipelines.

use bytemuck::{Pod, Zeroable};
use glam::Mat4;

use crate::paint::Color;

use super::lighting::{LightSet, MAX_LIGHTS};

pub(super) const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Side of the square shadow map, in texels.
pub(super) const SHADOW_MAP_SIZE: u32 = 2048;

// ── blend ─────────────────────────────────────────────────────────────────

/// Straight-alpha blending; materials and textures are not premultiplied.
pub(super) fn alpha_blend() -> wgpu::BlendState {
    wgpu::BlendState::ALPHA_BLENDING
}

// ── frame uniform (group 0) ───────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct FrameUniform {
    pub view_proj: [[f32; 4]; 4],
    /// xyz: eye position, w: scene time in seconds.
    pub eye: [f32; 4],
    /// rgb: summed ambient radiance.
    pub ambient: [f32; 4],
    /// xyz: unit travel direction of each directional light.
    pub light_dirs: [[f32; 4]; MAX_LIGHTS],
    pub light_colors: [[f32; 4]; MAX_LIGHTS],
    /// x: number of valid directional lights.
    pub light_count: [u32; 4],
    /// World to shadow-map clip space of the shadow caster.
    pub light_view_proj: [[f32; 4]; 4],
    pub shadow_color: [f32; 4],
    /// x: 1 when a shadow map is bound, y: index of the shadowed light.
    pub shadow_params: [u32; 4],
}

impl FrameUniform {
    /// `light_view_proj` is ignored unless `lights.shadow` is set.
    pub(super) fn new(
        view_proj: Mat4,
        eye: glam::Vec3,
        time: f64,
        lights: &LightSet,
        light_view_proj: Mat4,
    ) -> Self {
        let mut light_dirs = [[0.0; 4]; MAX_LIGHTS];
        let mut light_colors = [[0.0; 4]; MAX_LIGHTS];
        for (i, (dir, radiance)) in lights.directional.iter().enumerate() {
            light_dirs[i] = dir.extend(0.0).to_array();
            light_colors[i] = radiance.extend(1.0).to_array();
        }

        Self {
            view_proj: view_proj.to_cols_array_2d(),
            eye: eye.extend(time as f32).to_array(),
            ambient: lights.ambient.extend(1.0).to_array(),
            light_dirs,
            light_colors,
            light_count: [lights.directional.len() as u32, 0, 0, 0],
            light_view_proj: light_view_proj.to_cols_array_2d(),
            shadow_color: lights.shadow.map_or([0.0; 4], |s| s.color.to_array()),
            shadow_params: match lights.shadow {
                Some(s) => [1, s.light_index as u32, 0, 0],
                None => [0; 4],
            },
        }
    }
}

// ── object uniform (group 1, dynamic offset) ──────────────────────────────

pub(super) const FLAG_TEXTURED: u32 = 1;

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct ObjectUniform {
    pub model: [[f32; 4]; 4],
    /// Inverse-transpose of `model`, for normals.
    pub normal: [[f32; 4]; 4],
    pub color: [f32; 4],
    /// x: `FLAG_*` bits.
    pub flags: [u32; 4],
}

impl ObjectUniform {
    pub(super) fn new(model: Mat4, color: Color, textured: bool) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            normal: model.inverse().transpose().to_cols_array_2d(),
            color: color.to_array(),
            flags: [if textured { FLAG_TEXTURED } else { 0 }, 0, 0, 0],
        }
    }
}

/// Byte distance between consecutive objects in the dynamic uniform buffer.
pub(super) fn object_stride(min_alignment: u32) -> u64 {
    let size = std::mem::size_of::<ObjectUniform>() as u64;
    let align = u64::from(min_alignment.max(1));
    size.div_ceil(align) * align
}

// ── background uniform ────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct FillUniform {
    pub color: [f32; 4],
}
