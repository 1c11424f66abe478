//! Post-processing chain: base render pass, then bloom.
//!
//! The particle pass renders into an offscreen HDR texture. The bloom stage
//! extracts bright pixels into a half-resolution target, blurs them
//! horizontally then vertically, and composites the glow over the scene onto
//! the surface.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use super::shaders::BLOOM_SHADER;
use crate::bloom::BloomSettings;

/// Format of the offscreen scene and bloom targets.
pub const HDR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

/// Uniforms shared by every fullscreen pass.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct PassParams {
    /// Size of one texel of the pass input, in UV units.
    pub texel: [f32; 2],
    /// Blur axis; zero outside the blur passes.
    pub direction: [f32; 2],
    pub threshold: f32,
    pub radius: f32,
    pub strength: f32,
    _padding: f32,
}

/// Parameters for the bright, horizontal blur, vertical blur and composite
/// passes, in that order.
pub fn bloom_pass_params(bloom: &BloomSettings, width: u32, height: u32) -> [PassParams; 4] {
    let (bloom_w, bloom_h) = bloom_size(width, height);
    let full_texel = [1.0 / width.max(1) as f32, 1.0 / height.max(1) as f32];
    let bloom_texel = [1.0 / bloom_w as f32, 1.0 / bloom_h as f32];

    let base = PassParams {
        texel: full_texel,
        direction: [0.0, 0.0],
        threshold: bloom.threshold,
        radius: bloom.radius,
        strength: bloom.strength,
        _padding: 0.0,
    };

    [
        base,
        PassParams {
            texel: bloom_texel,
            direction: [1.0, 0.0],
            ..base
        },
        PassParams {
            texel: bloom_texel,
            direction: [0.0, 1.0],
            ..base
        },
        base,
    ]
}

/// Bloom targets are half the surface size, never zero.
pub fn bloom_size(width: u32, height: u32) -> (u32, u32) {
    ((width / 2).max(1), (height / 2).max(1))
}

struct RenderTarget {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl RenderTarget {
    fn new(device: &wgpu::Device, label: &str, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: HDR_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            _texture: texture,
            view,
        }
    }
}

struct Targets {
    scene: RenderTarget,
    bloom_a: RenderTarget,
    bloom_b: RenderTarget,
}

impl Targets {
    fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let (bloom_w, bloom_h) = bloom_size(width, height);
        Self {
            scene: RenderTarget::new(device, "Scene Target", width, height),
            bloom_a: RenderTarget::new(device, "Bloom A", bloom_w, bloom_h),
            bloom_b: RenderTarget::new(device, "Bloom B", bloom_w, bloom_h),
        }
    }
}

struct PassBindGroups {
    bright: wgpu::BindGroup,
    blur_h: wgpu::BindGroup,
    blur_v: wgpu::BindGroup,
    composite: wgpu::BindGroup,
}

/// Two-stage composer: the scene target plus the bloom pass chain.
pub struct Composer {
    targets: Targets,
    bind_groups: PassBindGroups,
    layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    bright_pipeline: wgpu::RenderPipeline,
    blur_pipeline: wgpu::RenderPipeline,
    composite_pipeline: wgpu::RenderPipeline,
    /// One buffer per pass, same order as [`bloom_pass_params`].
    params: [wgpu::Buffer; 4],
    width: u32,
    height: u32,
}

impl Composer {
    /// Create the offscreen targets and bloom pipelines.
    pub fn new(
        device: &wgpu::Device,
        width: u32,
        height: u32,
        surface_format: wgpu::TextureFormat,
        bloom: &BloomSettings,
    ) -> Self {
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Bloom Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let texture_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Bloom Bind Group Layout"),
            entries: &[
                texture_entry(0),
                texture_entry(1),
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Bloom Shader"),
            source: wgpu::ShaderSource::Wgsl(BLOOM_SHADER.into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Bloom Pipeline Layout"),
            bind_group_layouts: &[&layout],
            push_constant_ranges: &[],
        });

        let bright_pipeline =
            create_fullscreen_pipeline(device, &pipeline_layout, &shader, "fs_bright", HDR_FORMAT);
        let blur_pipeline =
            create_fullscreen_pipeline(device, &pipeline_layout, &shader, "fs_blur", HDR_FORMAT);
        let composite_pipeline = create_fullscreen_pipeline(
            device,
            &pipeline_layout,
            &shader,
            "fs_composite",
            surface_format,
        );

        let initial = bloom_pass_params(bloom, width, height);
        let labels = [
            "Bright Params",
            "Blur H Params",
            "Blur V Params",
            "Composite Params",
        ];
        let params = std::array::from_fn(|i| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(labels[i]),
                contents: bytemuck::bytes_of(&initial[i]),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            })
        });

        let targets = Targets::new(device, width, height);
        let bind_groups = create_bind_groups(device, &layout, &sampler, &targets, &params);

        Self {
            targets,
            bind_groups,
            layout,
            sampler,
            bright_pipeline,
            blur_pipeline,
            composite_pipeline,
            params,
            width,
            height,
        }
    }

    /// Recreate targets and bind groups after a window resize.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.targets = Targets::new(device, width, height);
        self.bind_groups =
            create_bind_groups(device, &self.layout, &self.sampler, &self.targets, &self.params);
    }

    /// Render target of the base render pass.
    pub fn scene_view(&self) -> &wgpu::TextureView {
        &self.targets.scene.view
    }

    /// Upload this frame's bloom parameters.
    pub fn write_params(&self, queue: &wgpu::Queue, bloom: &BloomSettings) {
        let params = bloom_pass_params(bloom, self.width, self.height);
        for (buffer, value) in self.params.iter().zip(params.iter()) {
            queue.write_buffer(buffer, 0, bytemuck::bytes_of(value));
        }
    }

    /// Record the bloom stage: bright, blur H, blur V, composite onto `output`.
    pub fn encode_bloom(&self, encoder: &mut wgpu::CommandEncoder, output: &wgpu::TextureView) {
        let groups = &self.bind_groups;
        let targets = &self.targets;
        let passes = [
            ("Bright Pass", &self.bright_pipeline, &groups.bright, &targets.bloom_a.view),
            ("Blur H Pass", &self.blur_pipeline, &groups.blur_h, &targets.bloom_b.view),
            ("Blur V Pass", &self.blur_pipeline, &groups.blur_v, &targets.bloom_a.view),
            ("Composite Pass", &self.composite_pipeline, &groups.composite, output),
        ];

        for (label, pipeline, bind_group, target) in passes {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some(label),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_pipeline(pipeline);
            pass.set_bind_group(0, bind_group, &[]);
            pass.draw(0..3, 0..1);
        }
    }
}

fn create_fullscreen_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    fragment_entry: &str,
    format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(fragment_entry),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some(fragment_entry),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

fn create_bind_groups(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    targets: &Targets,
    params: &[wgpu::Buffer; 4],
) -> PassBindGroups {
    let bind = |label: &str,
                source: &wgpu::TextureView,
                glow: &wgpu::TextureView,
                uniforms: &wgpu::Buffer| {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(source),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(glow),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: uniforms.as_entire_binding(),
                },
            ],
        })
    };

    let scene = &targets.scene.view;
    let bloom_a = &targets.bloom_a.view;
    let bloom_b = &targets.bloom_b.view;

    PassBindGroups {
        bright: bind("Bright Bind Group", scene, scene, &params[0]),
        blur_h: bind("Blur H Bind Group", bloom_a, bloom_a, &params[1]),
        blur_v: bind("Blur V Bind Group", bloom_b, bloom_b, &params[2]),
        composite: bind("Composite Bind Group", scene, bloom_a, &params[3]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> BloomSettings {
        BloomSettings {
            strength: 2.0,
            radius: 0.4,
            threshold: 0.1,
        }
    }

    #[test]
    fn test_params_match_std140_layout() {
        // vec2 + vec2 + 4 x f32
        assert_eq!(std::mem::size_of::<PassParams>(), 32);
    }

    #[test]
    fn test_bloom_size_never_zero() {
        assert_eq!(bloom_size(1280, 720), (640, 360));
        assert_eq!(bloom_size(1, 1), (1, 1));
        assert_eq!(bloom_size(0, 0), (1, 1));
    }

    #[test]
    fn test_pass_params_directions() {
        let [bright, blur_h, blur_v, composite] = bloom_pass_params(&settings(), 800, 600);

        assert_eq!(bright.direction, [0.0, 0.0]);
        assert_eq!(blur_h.direction, [1.0, 0.0]);
        assert_eq!(blur_v.direction, [0.0, 1.0]);
        assert_eq!(composite.direction, [0.0, 0.0]);
    }

    #[test]
    fn test_pass_params_texels() {
        let [bright, blur_h, _, _] = bloom_pass_params(&settings(), 800, 600);
        assert_eq!(bright.texel, [1.0 / 800.0, 1.0 / 600.0]);
        assert_eq!(blur_h.texel, [1.0 / 400.0, 1.0 / 300.0]);
    }

    #[test]
    fn test_pass_params_carry_settings() {
        for params in bloom_pass_params(&settings(), 800, 600) {
            assert_eq!(params.strength, 2.0);
            assert_eq!(params.radius, 0.4);
            assert_eq!(params.threshold, 0.1);
        }
    }
}
