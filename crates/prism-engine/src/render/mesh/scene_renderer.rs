use std::collections::{HashMap, HashSet};

use glam::Mat4;
use wgpu::util::DeviceExt;

use crate::coords::Viewport;
use crate::paint::Color;
use crate::render::{RenderCtx, RenderPassConfig, RenderTarget, SharedTexture};
use crate::scene::{Geometry, GeometryId, MaterialProperty, PointOfView, Scene};

use super::common::{object_stride, FillUniform, FrameUniform, ObjectUniform, DEPTH_FORMAT, SHADOW_MAP_SIZE};
use super::lighting::{collect_lights, shadow_view_projection};
use super::pipeline::{Layouts, Pipelines};

/// `SharedTexture::id` of a sampled texture.
type TextureKey = u64;

struct GpuMesh {
    vbo: wgpu::Buffer,
    ibo: wgpu::Buffer,
    index_count: u32,
}

struct DepthTarget {
    size: (u32, u32),
    view: wgpu::TextureView,
}

/// Shadow map plus its group 3 bind group. A 1x1 map is bound while no
/// light casts shadows.
struct ShadowTarget {
    size: u32,
    view: wgpu::TextureView,
    bind_group: wgpu::BindGroup,
}

/// One geometry instance resolved for this frame.
struct Draw {
    geometry: GeometryId,
    texture: TextureKey,
    double_sided: bool,
}

/// Draws a `Scene` from a `PointOfView` into a viewport of a color target.
///
/// GPU resources are created lazily on first use:
/// - pipelines are rebuilt when the target format changes
/// - the depth buffer is recreated when the target size changes
/// - vertex/index buffers are uploaded once per geometry
/// - texture bind groups are cached per texture identity
/// - the shadow map is allocated once a shadow-casting light appears
///
/// Each call records one color pass into the caller's encoder, preceded by a
/// depth-only shadow pass when the scene has a shadow-casting light.
/// Uniforms are written through the queue, so one renderer must not be used
/// twice in the same submission.
#[derive(Default)]
pub struct SceneRenderer {
    /// Light the scene with a headlight when it has no lights of its own.
    pub auto_enables_default_lighting: bool,

    layouts: Option<Layouts>,
    pipelines: Option<Pipelines>,
    depth: Option<DepthTarget>,
    shadow: Option<ShadowTarget>,
    shadow_sampler: Option<wgpu::Sampler>,

    frame_ubo: Option<wgpu::Buffer>,
    frame_bind_group: Option<wgpu::BindGroup>,

    fill_ubo: Option<wgpu::Buffer>,
    fill_bind_group: Option<wgpu::BindGroup>,

    object_ubo: Option<wgpu::Buffer>,
    object_bind_group: Option<wgpu::BindGroup>,
    object_capacity: usize,
    object_stride: u64,

    sampler: Option<wgpu::Sampler>,
    white: Option<SharedTexture>,
    material_bind_groups: HashMap<TextureKey, wgpu::BindGroup>,

    meshes: HashMap<GeometryId, GpuMesh>,
}

impl SceneRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_lighting(mut self, enabled: bool) -> Self {
        self.auto_enables_default_lighting = enabled;
        self
    }

    /// Renders `scene` as seen from `pov` into `viewport` of `target`.
    ///
    /// A viewport covering the whole target clears the attachment; a smaller
    /// viewport is filled with the clear color instead so the rest of the
    /// target is preserved.
    ///
    /// `time` is the scene time in seconds; it is forwarded to shaders but
    /// does not animate anything by itself.
    #[allow(clippy::too_many_arguments)]
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        scene: &Scene,
        pov: &PointOfView,
        viewport: Viewport,
        time: f64,
        pass: &RenderPassConfig,
    ) {
        let Some((sx, sy, sw, sh)) = viewport.scissor(target.size.0, target.size.1) else {
            return;
        };
        let full_target = (sx, sy, sw, sh) == (0, 0, target.size.0, target.size.1);
        // wgpu rejects viewports reaching outside the attachment.
        let viewport = Viewport::new(sx as f32, sy as f32, sw as f32, sh as f32);

        self.ensure_layouts(ctx);
        self.ensure_pipelines(ctx, target.format);
        self.ensure_depth(ctx, target.size);
        self.ensure_uniform_bindings(ctx);
        self.ensure_fallback_texture(ctx);

        // Resolve geometry in traversal order.
        let mut geometries: Vec<(&Geometry, Mat4)> = Vec::new();
        scene.walk(|node, world| {
            if let Some(g) = node.geometry.as_ref() {
                geometries.push((g, world));
            }
        });

        let mut lights = collect_lights(&scene.lights(), pov, self.auto_enables_default_lighting);
        let light_view_proj = match (lights.shadow, scene.bounds()) {
            (Some(caster), Some(bounds)) => shadow_view_projection(caster.direction, &bounds),
            _ => {
                lights.shadow = None;
                Mat4::IDENTITY
            }
        };
        let shadowed = lights.shadow.is_some();

        self.ensure_shadow_map(ctx, if shadowed { SHADOW_MAP_SIZE } else { 1 });
        self.ensure_meshes(ctx, &geometries);
        self.ensure_object_capacity(ctx, geometries.len());

        let white_key = self.white.as_ref().map(|t| t.id()).unwrap_or_default();
        let mut draws = Vec::with_capacity(geometries.len());
        let mut objects = Vec::with_capacity(geometries.len());
        for (geometry, world) in &geometries {
            let material = &geometry.material;
            let (color, texture) = match &material.diffuse {
                MaterialProperty::Color(c) => (*c, None),
                MaterialProperty::Texture(t) => (Color::WHITE, Some(t)),
            };
            let key = match texture {
                Some(t) => {
                    self.ensure_material_bind_group(ctx, t);
                    t.id()
                }
                None => white_key,
            };
            objects.push(ObjectUniform::new(*world, color, texture.is_some()));
            draws.push(Draw {
                geometry: geometry.id(),
                texture: key,
                double_sided: material.double_sided,
            });
        }

        self.prune_material_bind_groups(&draws, white_key);
        let frame = FrameUniform::new(
            pov.view_projection(viewport.aspect()),
            pov.eye(),
            time,
            &lights,
            light_view_proj,
        );
        self.write_uniforms(ctx, &frame, pass, &objects);

        // Now take immutable borrows.
        let Some(pipelines) = self.pipelines.as_ref() else { return };
        let Some(depth) = self.depth.as_ref() else { return };
        let Some(shadow) = self.shadow.as_ref() else { return };
        let Some(frame_bg) = self.frame_bind_group.as_ref() else { return };
        let Some(fill_bg) = self.fill_bind_group.as_ref() else { return };
        let Some(object_bg) = self.object_bind_group.as_ref() else { return };

        if shadowed {
            let mut spass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("prism shadow pass"),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &shadow.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            spass.set_pipeline(&pipelines.shadow);
            spass.set_bind_group(0, frame_bg, &[]);
            for (i, draw) in draws.iter().enumerate() {
                let Some(mesh) = self.meshes.get(&draw.geometry) else { continue };
                let offset = (i as u64 * self.object_stride) as u32;
                spass.set_bind_group(1, object_bg, &[offset]);
                spass.set_vertex_buffer(0, mesh.vbo.slice(..));
                spass.set_index_buffer(mesh.ibo.slice(..), wgpu::IndexFormat::Uint16);
                spass.draw_indexed(0..mesh.index_count, 0, 0..1);
            }
        }

        let load = if full_target {
            wgpu::LoadOp::Clear(pass.clear_color.to_wgpu())
        } else {
            wgpu::LoadOp::Load
        };

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("prism scene pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &depth.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Discard,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_viewport(viewport.x, viewport.y, viewport.width, viewport.height, 0.0, 1.0);
        rpass.set_scissor_rect(sx, sy, sw, sh);

        if !full_target {
            rpass.set_pipeline(&pipelines.fill);
            rpass.set_bind_group(0, fill_bg, &[]);
            rpass.draw(0..3, 0..1);
        }

        rpass.set_bind_group(0, frame_bg, &[]);
        rpass.set_bind_group(3, &shadow.bind_group, &[]);
        for (i, draw) in draws.iter().enumerate() {
            let Some(mesh) = self.meshes.get(&draw.geometry) else { continue };
            let Some(material_bg) = self.material_bind_groups.get(&draw.texture) else { continue };

            let pipeline = if draw.double_sided {
                &pipelines.double_sided
            } else {
                &pipelines.single_sided
            };
            let offset = (i as u64 * self.object_stride) as u32;

            rpass.set_pipeline(pipeline);
            rpass.set_bind_group(1, object_bg, &[offset]);
            rpass.set_bind_group(2, material_bg, &[]);
            rpass.set_vertex_buffer(0, mesh.vbo.slice(..));
            rpass.set_index_buffer(mesh.ibo.slice(..), wgpu::IndexFormat::Uint16);
            rpass.draw_indexed(0..mesh.index_count, 0, 0..1);
        }
    }

    fn write_uniforms(&self, ctx: &RenderCtx<'_>, frame: &FrameUniform, pass: &RenderPassConfig, objects: &[ObjectUniform]) {
        if let Some(ubo) = self.frame_ubo.as_ref() {
            ctx.queue.write_buffer(ubo, 0, bytemuck::bytes_of(frame));
        }

        if let Some(ubo) = self.fill_ubo.as_ref() {
            let fill = FillUniform {
                color: pass.clear_color.to_array(),
            };
            ctx.queue.write_buffer(ubo, 0, bytemuck::bytes_of(&fill));
        }

        if objects.is_empty() {
            return;
        }
        let Some(ubo) = self.object_ubo.as_ref() else { return };
        let stride = self.object_stride as usize;
        let mut bytes = vec![0u8; stride * objects.len()];
        for (i, obj) in objects.iter().enumerate() {
            let raw = bytemuck::bytes_of(obj);
            bytes[i * stride..i * stride + raw.len()].copy_from_slice(raw);
        }
        ctx.queue.write_buffer(ubo, 0, &bytes);
    }

    fn ensure_layouts(&mut self, ctx: &RenderCtx<'_>) {
        if self.layouts.is_none() {
            self.layouts = Some(Layouts::new(ctx.device));
        }
    }

    fn ensure_pipelines(&mut self, ctx: &RenderCtx<'_>, format: wgpu::TextureFormat) {
        if self.pipelines.as_ref().is_some_and(|p| p.format == format) {
            return;
        }
        let Some(layouts) = self.layouts.as_ref() else { return };
        self.pipelines = Some(Pipelines::new(ctx.device, layouts, format));
    }

    fn ensure_depth(&mut self, ctx: &RenderCtx<'_>, size: (u32, u32)) {
        if self.depth.as_ref().is_some_and(|d| d.size == size) {
            return;
        }

        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("prism scene depth"),
            size: wgpu::Extent3d {
                width: size.0.max(1),
                height: size.1.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        self.depth = Some(DepthTarget { size, view });
    }

    fn ensure_shadow_map(&mut self, ctx: &RenderCtx<'_>, size: u32) {
        if self.shadow.as_ref().is_some_and(|s| s.size == size) {
            return;
        }
        let Some(layouts) = self.layouts.as_ref() else { return };

        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("prism shadow map"),
            size: wgpu::Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = self.shadow_sampler.get_or_insert_with(|| {
            ctx.device.create_sampler(&wgpu::SamplerDescriptor {
                label: Some("prism shadow sampler"),
                address_mode_u: wgpu::AddressMode::ClampToEdge,
                address_mode_v: wgpu::AddressMode::ClampToEdge,
                address_mode_w: wgpu::AddressMode::ClampToEdge,
                mag_filter: wgpu::FilterMode::Linear,
                min_filter: wgpu::FilterMode::Linear,
                compare: Some(wgpu::CompareFunction::LessEqual),
                ..Default::default()
            })
        });

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("prism shadow bind group"),
            layout: &layouts.shadow,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });

        log::debug!("shadow map allocated: {size}x{size}");
        self.shadow = Some(ShadowTarget { size, view, bind_group });
    }

    fn ensure_uniform_bindings(&mut self, ctx: &RenderCtx<'_>) {
        if self.frame_bind_group.is_some() && self.fill_bind_group.is_some() {
            return;
        }
        let Some(layouts) = self.layouts.as_ref() else { return };

        let frame_ubo = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("prism scene frame ubo"),
            size: std::mem::size_of::<FrameUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let frame_bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("prism scene frame bind group"),
            layout: &layouts.frame,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_ubo.as_entire_binding(),
            }],
        });

        let fill_ubo = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("prism scene fill ubo"),
            size: std::mem::size_of::<FillUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let fill_bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("prism scene fill bind group"),
            layout: &layouts.fill,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: fill_ubo.as_entire_binding(),
            }],
        });

        self.frame_ubo = Some(frame_ubo);
        self.frame_bind_group = Some(frame_bind_group);
        self.fill_ubo = Some(fill_ubo);
        self.fill_bind_group = Some(fill_bind_group);
    }

    fn ensure_object_capacity(&mut self, ctx: &RenderCtx<'_>, required: usize) {
        if required <= self.object_capacity && self.object_bind_group.is_some() {
            return;
        }
        let Some(layouts) = self.layouts.as_ref() else { return };

        let stride = object_stride(ctx.device.limits().min_uniform_buffer_offset_alignment);
        let new_cap = required.next_power_of_two().max(16);

        let ubo = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("prism scene object ubo"),
            size: stride * new_cap as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("prism scene object bind group"),
            layout: &layouts.object,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &ubo,
                    offset: 0,
                    size: wgpu::BufferSize::new(std::mem::size_of::<ObjectUniform>() as u64),
                }),
            }],
        });

        self.object_ubo = Some(ubo);
        self.object_bind_group = Some(bind_group);
        self.object_capacity = new_cap;
        self.object_stride = stride;
    }

    fn ensure_fallback_texture(&mut self, ctx: &RenderCtx<'_>) {
        if self.white.is_some() {
            return;
        }
        let white = SharedTexture::new(
            ctx.device,
            "prism white texture",
            (1, 1),
            wgpu::TextureFormat::Rgba8Unorm,
            wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        );
        ctx.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: white.texture(),
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &[255, 255, 255, 255],
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4),
                rows_per_image: Some(1),
            },
            wgpu::Extent3d {
                width: 1,
                height: 1,
                depth_or_array_layers: 1,
            },
        );
        self.ensure_material_bind_group(ctx, &white);
        self.white = Some(white);
    }

    fn ensure_material_bind_group(&mut self, ctx: &RenderCtx<'_>, texture: &SharedTexture) {
        if self.material_bind_groups.contains_key(&texture.id()) {
            return;
        }
        let Some(layouts) = self.layouts.as_ref() else { return };

        let sampler = self.sampler.get_or_insert_with(|| {
            ctx.device.create_sampler(&wgpu::SamplerDescriptor {
                label: Some("prism scene sampler"),
                address_mode_u: wgpu::AddressMode::ClampToEdge,
                address_mode_v: wgpu::AddressMode::ClampToEdge,
                address_mode_w: wgpu::AddressMode::ClampToEdge,
                mag_filter: wgpu::FilterMode::Linear,
                min_filter: wgpu::FilterMode::Linear,
                ..Default::default()
            })
        });

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("prism scene material bind group"),
            layout: &layouts.material,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(texture.view()),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });

        log::debug!("material bind group created for texture #{}", texture.id());
        self.material_bind_groups.insert(texture.id(), bind_group);
    }

    /// Drops bind groups of textures no material references anymore. The
    /// white fallback is kept.
    fn prune_material_bind_groups(&mut self, draws: &[Draw], white_key: TextureKey) {
        let live: HashSet<TextureKey> = draws
            .iter()
            .map(|d| d.texture)
            .chain(std::iter::once(white_key))
            .collect();
        self.material_bind_groups.retain(|key, _| live.contains(key));
    }

    /// Uploads buffers for new geometry and drops buffers for geometry no
    /// longer in the scene.
    fn ensure_meshes(&mut self, ctx: &RenderCtx<'_>, geometries: &[(&Geometry, Mat4)]) {
        let live: HashSet<GeometryId> = geometries.iter().map(|(g, _)| g.id()).collect();
        self.meshes.retain(|id, _| live.contains(id));

        for (geometry, _) in geometries {
            if self.meshes.contains_key(&geometry.id()) {
                continue;
            }
            let mesh = geometry.mesh();
            if mesh.indices.is_empty() {
                continue;
            }

            let vbo = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("prism mesh vbo"),
                contents: bytemuck::cast_slice(&mesh.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });

            // Index buffers must be a multiple of 4 bytes.
            let mut indices = mesh.indices.clone();
            if indices.len() % 2 == 1 {
                indices.push(0);
            }
            let ibo = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("prism mesh ibo"),
                contents: bytemuck::cast_slice(&indices),
                usage: wgpu::BufferUsages::INDEX,
            });

            self.meshes.insert(
                geometry.id(),
                GpuMesh {
                    vbo,
                    ibo,
                    index_count: mesh.indices.len() as u32,
                },
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::device::HeadlessGpu;
    use crate::offscreen::read_rgba8;
    use crate::scene::{Camera, Light, Material, Mesh, Node};

    const SIZE: u32 = 128;

    fn render_to_pixels(gpu: &HeadlessGpu, renderer: &mut SceneRenderer, scene: &Scene, pov: &PointOfView) -> Vec<u8> {
        let out = SharedTexture::new(
            gpu.device(),
            "scene renderer test target",
            (SIZE, SIZE),
            wgpu::TextureFormat::Rgba8Unorm,
            wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        );
        let mut encoder = gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });
        {
            let ctx = RenderCtx::new(gpu.device(), gpu.queue());
            let mut target = RenderTarget::new(&mut encoder, out.view(), out.format(), out.size());
            renderer.render(
                &ctx,
                &mut target,
                scene,
                pov,
                Viewport::full(SIZE, SIZE),
                0.0,
                &RenderPassConfig::clear(Color::BLACK),
            );
        }
        gpu.queue().submit(std::iter::once(encoder.finish()));
        read_rgba8(gpu.device(), gpu.queue(), &out).unwrap()
    }

    fn pixel(px: &[u8], x: u32, y: u32) -> [u8; 4] {
        let i = ((y * SIZE + x) * 4) as usize;
        [px[i], px[i + 1], px[i + 2], px[i + 3]]
    }

    /// Top-down view of a box on a floor, lit at 45 degrees towards -Z so the
    /// box shadow falls on the floor between z = -15 and z = -5.
    fn shadow_scene(casts_shadow: bool) -> (Scene, PointOfView) {
        let mut sun = Light::directional(Color::WHITE);
        if casts_shadow {
            sun = sun.with_shadow(Color::new(0.0, 0.0, 0.0, 0.8));
        }

        let mut scene = Scene::new();
        scene
            .add_node(
                Node::new("camera")
                    .with_position(Vec3::new(0.0, 100.0, 0.0))
                    .with_euler_degrees(-90.0, 0.0, 0.0)
                    .with_camera(Camera {
                        fov_y_degrees: 60.0,
                        z_near: 1.0,
                        z_far: 500.0,
                    }),
            )
            .add_node(Node::new("ambient").with_light(Light {
                intensity: 0.3,
                ..Light::ambient(Color::WHITE)
            }))
            .add_node(Node::new("sun").with_euler_degrees(-45.0, 0.0, 0.0).with_light(sun))
            .add_node(Node::new("floor").with_geometry(Geometry::new(Mesh::floor(100.0), Material::color(Color::WHITE))))
            .add_node(
                Node::new("box")
                    .with_position(Vec3::new(0.0, 5.0, 0.0))
                    .with_geometry(Geometry::new(Mesh::cube(10.0, 10.0, 10.0), Material::color(Color::RED))),
            );
        let pov = scene.point_of_view("camera").unwrap();
        (scene, pov)
    }

    // Image up is world -Z: row 52 sees the floor at z ~ -10, row 86 at z ~ +20.
    const SHADOWED_FLOOR: (u32, u32) = (64, 52);
    const OPEN_FLOOR: (u32, u32) = (64, 86);

    #[test]
    fn shadow_darkens_floor_behind_box() {
        let Some(gpu) = HeadlessGpu::for_tests() else { return };
        let (scene, pov) = shadow_scene(true);
        let px = render_to_pixels(&gpu, &mut SceneRenderer::new(), &scene, &pov);

        let shadowed = pixel(&px, SHADOWED_FLOOR.0, SHADOWED_FLOOR.1);
        let open = pixel(&px, OPEN_FLOOR.0, OPEN_FLOOR.1);
        assert!(open[0] > 240, "open floor {open:?}");
        assert!(
            u16::from(shadowed[0]) + 60 < u16::from(open[0]),
            "shadowed {shadowed:?} vs open {open:?}"
        );
        // Black tint keeps the floor grey, not colored.
        assert_eq!(shadowed[0], shadowed[1]);
    }

    #[test]
    fn no_shadow_without_casting_light() {
        let Some(gpu) = HeadlessGpu::for_tests() else { return };
        let (scene, pov) = shadow_scene(false);
        let px = render_to_pixels(&gpu, &mut SceneRenderer::new(), &scene, &pov);

        let floor = pixel(&px, SHADOWED_FLOOR.0, SHADOWED_FLOOR.1);
        assert!(floor[0] > 240, "{floor:?}");
    }

    #[test]
    fn bind_groups_of_unused_textures_are_dropped() {
        let Some(gpu) = HeadlessGpu::for_tests() else { return };
        let texture = |label: &str| {
            SharedTexture::new(
                gpu.device(),
                label,
                (4, 4),
                wgpu::TextureFormat::Rgba8Unorm,
                wgpu::TextureUsages::TEXTURE_BINDING,
            )
        };
        let plane = |t: SharedTexture| {
            let mut scene = Scene::new();
            scene.add_node(Node::new("plane").with_geometry(Geometry::new(Mesh::plane(10.0, 10.0), Material::texture(t))));
            scene
        };

        let first = texture("first");
        let second = texture("second");
        let mut renderer = SceneRenderer::new().with_default_lighting(true);

        let scene = plane(first.clone());
        render_to_pixels(&gpu, &mut renderer, &scene, &scene.default_point_of_view());
        assert!(renderer.material_bind_groups.contains_key(&first.id()));

        let scene = plane(second.clone());
        render_to_pixels(&gpu, &mut renderer, &scene, &scene.default_point_of_view());
        assert!(!renderer.material_bind_groups.contains_key(&first.id()));
        assert!(renderer.material_bind_groups.contains_key(&second.id()));

        let white = renderer.white.as_ref().unwrap().id();
        assert!(renderer.material_bind_groups.contains_key(&white));
        assert_eq!(renderer.material_bind_groups.len(), 2);
    }

    #[test]
    fn shadow_map_is_only_allocated_for_casting_lights() {
        let Some(gpu) = HeadlessGpu::for_tests() else { return };
        let mut renderer = SceneRenderer::new();

        let (scene, pov) = shadow_scene(false);
        render_to_pixels(&gpu, &mut renderer, &scene, &pov);
        assert_eq!(renderer.shadow.as_ref().map(|s| s.size), Some(1));

        let (scene, pov) = shadow_scene(true);
        render_to_pixels(&gpu, &mut renderer, &scene, &pov);
        assert_eq!(renderer.shadow.as_ref().map(|s| s.size), Some(SHADOW_MAP_SIZE));
    }
}
