//! WGSL sources for the particle pass and the bloom chain.

/// Camera-facing particle sprites with additive glow falloff.
///
/// Vertex inputs are two instance-stepped buffers: position at location 0
/// and colour at location 1. Each instance draws a 6-vertex quad.
pub const PARTICLE_SHADER: &str = r#"
struct SceneUniforms {
    view_proj: mat4x4<f32>,
    proj_scale: vec2<f32>,
    point_size: f32,
    _padding: f32,
};

@group(0) @binding(0)
var<uniform> uniforms: SceneUniforms;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec3<f32>,
    @location(1) uv: vec2<f32>,
};

@vertex
fn vs_main(
    @builtin(vertex_index) vertex_index: u32,
    @location(0) particle_pos: vec3<f32>,
    @location(1) particle_color: vec3<f32>,
) -> VertexOutput {
    var quad_vertices = array<vec2<f32>, 6>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>( 1.0, -1.0),
        vec2<f32>(-1.0,  1.0),
        vec2<f32>(-1.0,  1.0),
        vec2<f32>( 1.0, -1.0),
        vec2<f32>( 1.0,  1.0),
    );

    let quad_pos = quad_vertices[vertex_index];
    var clip_pos = uniforms.view_proj * vec4<f32>(particle_pos, 1.0);

    // Offset before the perspective divide so sprites shrink with distance.
    let half_size = uniforms.point_size * 0.5;
    clip_pos.x += quad_pos.x * half_size * uniforms.proj_scale.x;
    clip_pos.y += quad_pos.y * half_size * uniforms.proj_scale.y;

    var out: VertexOutput;
    out.clip_position = clip_pos;
    out.color = particle_color;
    out.uv = quad_pos;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let dist = length(in.uv);
    if dist > 1.0 {
        discard;
    }
    let alpha = 1.0 - smoothstep(0.0, 1.0, dist);
    return vec4<f32>(in.color * alpha, alpha);
}
"#;

/// Fullscreen passes of the bloom chain.
///
/// All entry points share one bind group layout: `source` is the pass input,
/// `glow` is only read by the composite pass.
pub const BLOOM_SHADER: &str = r#"
struct PassParams {
    texel: vec2<f32>,
    direction: vec2<f32>,
    threshold: f32,
    radius: f32,
    strength: f32,
    _padding: f32,
};

@group(0) @binding(0)
var source: texture_2d<f32>;
@group(0) @binding(1)
var glow: texture_2d<f32>;
@group(0) @binding(2)
var linear_sampler: sampler;
@group(0) @binding(3)
var<uniform> params: PassParams;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_main(@builtin(vertex_index) vertex_index: u32) -> VertexOutput {
    var positions = array<vec2<f32>, 3>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(3.0, -1.0),
        vec2<f32>(-1.0, 3.0),
    );
    var uvs = array<vec2<f32>, 3>(
        vec2<f32>(0.0, 1.0),
        vec2<f32>(2.0, 1.0),
        vec2<f32>(0.0, -1.0),
    );

    var out: VertexOutput;
    out.clip_position = vec4<f32>(positions[vertex_index], 0.0, 1.0);
    out.uv = uvs[vertex_index];
    return out;
}

@fragment
fn fs_bright(in: VertexOutput) -> @location(0) vec4<f32> {
    let color = textureSample(source, linear_sampler, in.uv).rgb;
    let luma = dot(color, vec3<f32>(0.2126, 0.7152, 0.0722));
    let keep = smoothstep(params.threshold, params.threshold + 0.05, luma);
    return vec4<f32>(color * keep, 1.0);
}

@fragment
fn fs_blur(in: VertexOutput) -> @location(0) vec4<f32> {
    var weights = array<f32, 5>(0.227027, 0.1945946, 0.1216216, 0.054054, 0.016216);
    let stride = params.direction * params.texel * (1.0 + params.radius * 4.0);

    var color = textureSampleLevel(source, linear_sampler, in.uv, 0.0).rgb * weights[0];
    for (var i = 1; i < 5; i = i + 1) {
        let offset = stride * f32(i);
        color += textureSampleLevel(source, linear_sampler, in.uv + offset, 0.0).rgb * weights[i];
        color += textureSampleLevel(source, linear_sampler, in.uv - offset, 0.0).rgb * weights[i];
    }
    return vec4<f32>(color, 1.0);
}

@fragment
fn fs_composite(in: VertexOutput) -> @location(0) vec4<f32> {
    let scene = textureSample(source, linear_sampler, in.uv).rgb;
    let bloom = textureSample(glow, linear_sampler, in.uv).rgb;
    return vec4<f32>(scene + bloom * params.strength, 1.0);
}
"#;
