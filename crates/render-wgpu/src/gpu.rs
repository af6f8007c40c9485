use crate::shaders;
use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use warpfield_render::{Blending, GlowTexture, Scene};
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
    tint: [f32; 4],
    params: [f32; 4],
}

impl Uniforms {
    fn from_scene(scene: &Scene, viewport_height: u32) -> Self {
        let material = &scene.stars.material;
        let [r, g, b] = material.color;
        // Zero selects depth-attenuated sizing in the shader.
        let fixed_height = if material.size_attenuation {
            0.0
        } else {
            viewport_height.max(1) as f32
        };
        Self {
            view_proj: scene.view_projection().to_cols_array_2d(),
            tint: [r, g, b, material.opacity],
            params: [
                material.size,
                1.0 / scene.projection.aspect.max(f32::EPSILON),
                material.alpha_test,
                fixed_height,
            ],
        }
    }
}

fn blend_state(blending: Blending) -> wgpu::BlendState {
    match blending {
        Blending::Additive => {
            let add = wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::SrcAlpha,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            };
            wgpu::BlendState {
                color: add,
                alpha: add,
            }
        }
        Blending::Normal => wgpu::BlendState::ALPHA_BLENDING,
    }
}

/// Instances to draw for `len` stars. Counts past `u32::MAX` are capped.
fn instance_count(len: usize) -> u32 {
    u32::try_from(len).unwrap_or_else(|_| {
        tracing::error!("{len} stars exceed the instance limit, drawing {}", u32::MAX);
        u32::MAX
    })
}

fn clear_color(background: [f32; 3]) -> wgpu::Color {
    wgpu::Color {
        r: background[0] as f64,
        g: background[1] as f64,
        b: background[2] as f64,
        a: 1.0,
    }
}

/// wgpu-based starfield renderer.
pub struct WgpuRenderer {
    star_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    star_buffer: wgpu::Buffer,
    star_count: u32,
    viewport_height: u32,
    // Kept alive for the bind group.
    _glow_texture: wgpu::Texture,
    surface_format: wgpu::TextureFormat,
}

impl WgpuRenderer {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        scene: &Scene,
        viewport_height: u32,
    ) -> Self {
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("star_uniform_buffer"),
            contents: bytemuck::bytes_of(&Uniforms::from_scene(scene, viewport_height)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let glow = scene.stars.material.glow().get();
        let glow_texture = Self::upload_glow(device, queue, glow);
        let glow_view = glow_texture.create_view(&wgpu::TextureViewDescriptor::default());
        let glow_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("glow_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("star_bind_group_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("star_bind_group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&glow_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&glow_sampler),
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("star_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let star_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("star_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::STAR_SHADER.into()),
        });

        let star_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("star_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &star_shader,
                entry_point: Some("vs_star"),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<Vec3>() as u64,
                    step_mode: wgpu::VertexStepMode::Instance,
                    attributes: &wgpu::vertex_attr_array![0 => Float32x3],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &star_shader,
                entry_point: Some("fs_star"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(blend_state(scene.stars.material.blending)),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            // Stars neither write nor test depth.
            depth_stencil: None,
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        let positions = scene.stars.field.positions();
        let star_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("star_position_buffer"),
            contents: bytemuck::cast_slice(positions),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        let star_count = instance_count(positions.len());

        tracing::info!(
            "star pipeline ready: {star_count} stars, {0}x{0} glow sprite",
            glow.size()
        );

        Self {
            star_pipeline,
            uniform_buffer,
            bind_group,
            star_buffer,
            star_count,
            viewport_height,
            _glow_texture: glow_texture,
            surface_format,
        }
    }

    /// Track the surface height; only fixed-size sprites depend on it.
    pub fn resize(&mut self, viewport_height: u32) {
        self.viewport_height = viewport_height;
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    pub fn star_count(&self) -> u32 {
        self.star_count
    }

    /// Render one frame: clear to the background, then the star sprites.
    ///
    /// Copies the star buffer to the GPU only if it changed since the last
    /// frame, then clears the scene's upload flag.
    pub fn render(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        scene: &mut Scene,
    ) {
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&Uniforms::from_scene(scene, self.viewport_height)),
        );

        let field = &mut scene.stars.field;
        if field.needs_upload() {
            queue.write_buffer(&self.star_buffer, 0, bytemuck::cast_slice(field.positions()));
            field.mark_uploaded();
            tracing::trace!("uploaded {} star positions", self.star_count);
        }

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("star_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("star_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear_color(scene.background)),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                ..Default::default()
            });

            pass.set_pipeline(&self.star_pipeline);
            pass.set_bind_group(0, &self.bind_group, &[]);
            pass.set_vertex_buffer(0, self.star_buffer.slice(..));
            pass.draw(0..6, 0..self.star_count);
        }

        queue.submit(std::iter::once(encoder.finish()));
    }

    fn upload_glow(device: &wgpu::Device, queue: &wgpu::Queue, glow: &GlowTexture) -> wgpu::Texture {
        let size = wgpu::Extent3d {
            width: glow.size(),
            height: glow.size(),
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("glow_texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            glow.pixels(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * glow.size()),
                rows_per_image: Some(glow.size()),
            },
            size,
        );
        texture
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warpfield_common::{StarConfig, WarpConfig};

    fn scene() -> Scene {
        let config = WarpConfig {
            stars: StarConfig {
                count: 8,
                ..StarConfig::default()
            },
            ..WarpConfig::default()
        };
        Scene::new(&config, 1)
    }

    #[test]
    fn uniforms_carry_material() {
        let mut s = scene();
        s.projection.set_viewport(1600, 800);
        let u = Uniforms::from_scene(&s, 800);
        assert_eq!(u.tint, [1.0, 1.0, 1.0, 0.9]);
        assert_eq!(u.params, [1.5, 0.5, 0.01, 0.0]);
        assert_eq!(u.view_proj, s.view_projection().to_cols_array_2d());
    }

    #[test]
    fn fixed_size_sprites_pass_viewport_height() {
        let mut s = scene();
        s.stars.material.size_attenuation = false;
        let u = Uniforms::from_scene(&s, 720);
        assert_eq!(u.params[3], 720.0);
    }

    #[test]
    fn uniform_layout_is_std140_sized() {
        assert_eq!(std::mem::size_of::<Uniforms>(), 96);
        assert_eq!(std::mem::size_of::<Vec3>(), 12);
    }

    #[test]
    fn additive_blend_sums_onto_target() {
        let b = blend_state(Blending::Additive);
        assert_eq!(b.color.dst_factor, wgpu::BlendFactor::One);
        assert_eq!(b.color.src_factor, wgpu::BlendFactor::SrcAlpha);
        assert_eq!(b.color.operation, wgpu::BlendOperation::Add);
    }

    #[test]
    fn instance_count_is_capped() {
        assert_eq!(instance_count(8), 8);
        assert_eq!(instance_count(u32::MAX as usize), u32::MAX);
        #[cfg(target_pointer_width = "64")]
        assert_eq!(instance_count(u32::MAX as usize + 1), u32::MAX);
    }

    #[test]
    fn background_clear_is_opaque_black() {
        let c = clear_color(scene().background);
        assert_eq!((c.r, c.g, c.b, c.a), (0.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn star_positions_cast_without_copy() {
        let s = scene();
        let bytes: &[u8] = bytemuck::cast_slice(s.stars.field.positions());
        assert_eq!(bytes.len(), 8 * 12);
        assert_eq!(bytes.as_ptr(), s.stars.field.positions().as_ptr() as *const u8);
    }
}
