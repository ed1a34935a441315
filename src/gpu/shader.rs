//! WGSL for point sprites.
//!
//! Each point is expanded into a screen-aligned quad from six instance
//! vertices. Sprite size shrinks with view depth so that a point of size `s`
//! covers `s` pixels at a distance of half the viewport height.

use bytemuck::{Pod, Zeroable};

/// Per-frame camera data, bind group 0.
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub(crate) struct CameraUniforms {
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    /// Render target size in physical pixels.
    pub viewport: [f32; 2],
    pub _padding: [f32; 2],
}

/// Per-group material and transform, bind group 1.
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub(crate) struct GroupUniforms {
    pub model: [[f32; 4]; 4],
    /// Linear RGB plus alpha.
    pub color: [f32; 4],
    pub size: f32,
    pub has_map: u32,
    pub _padding: [f32; 2],
}

pub(crate) const POINTS_SHADER: &str = r#"struct Camera {
    view: mat4x4<f32>,
    proj: mat4x4<f32>,
    viewport: vec2<f32>,
    _padding: vec2<f32>,
};

struct Group {
    model: mat4x4<f32>,
    color: vec4<f32>,
    size: f32,
    has_map: u32,
    _padding: vec2<f32>,
};

@group(0) @binding(0)
var<uniform> camera: Camera;

@group(1) @binding(0)
var<uniform> group_data: Group;

@group(1) @binding(1)
var sprite: texture_2d<f32>;

@group(1) @binding(2)
var sprite_sampler: sampler;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_main(
    @builtin(vertex_index) vertex_index: u32,
    @location(0) particle_pos: vec3<f32>,
) -> VertexOutput {
    var quad_vertices = array<vec2<f32>, 6>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>( 1.0, -1.0),
        vec2<f32>(-1.0,  1.0),
        vec2<f32>(-1.0,  1.0),
        vec2<f32>( 1.0, -1.0),
        vec2<f32>( 1.0,  1.0),
    );
    let corner = quad_vertices[vertex_index];

    let view_pos = camera.view * group_data.model * vec4<f32>(particle_pos, 1.0);
    var clip_pos = camera.proj * view_pos;

    let depth = max(-view_pos.z, 0.0001);
    let pixels = group_data.size * camera.viewport.y * 0.5 / depth;

    clip_pos.x += corner.x * pixels / camera.viewport.x * clip_pos.w;
    clip_pos.y += corner.y * pixels / camera.viewport.y * clip_pos.w;

    var out: VertexOutput;
    out.clip_position = clip_pos;
    out.uv = vec2<f32>(corner.x * 0.5 + 0.5, 0.5 - corner.y * 0.5);
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let texel = textureSample(sprite, sprite_sampler, in.uv);
    let sprite_color = select(vec4<f32>(1.0), texel, group_data.has_map != 0u);
    return group_data.color * sprite_color;
}
"#;
