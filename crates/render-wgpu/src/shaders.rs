/// WGSL shader for the star sprites.
///
/// Each instance is one star; six vertices expand it into a quad. With size
/// attenuation (`size * (height / 2) / depth` pixels) the on-screen size
/// shrinks exactly as clip-space `w` grows, so the corner offset is a constant
/// `size` in clip space, scaled by the inverse aspect on x. Fixed-size sprites
/// pass the viewport height in `params.w` and are `size` pixels tall.
pub const STAR_SHADER: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
    // rgb = star color, a = opacity
    tint: vec4<f32>,
    // x = point size, y = height / width, z = alpha test,
    // w = viewport height for fixed-size sprites, 0 when attenuated
    params: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;
@group(0) @binding(1)
var glow_texture: texture_2d<f32>;
@group(0) @binding(2)
var glow_sampler: sampler;

struct StarInput {
    @location(0) position: vec3<f32>,
};

struct StarOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_star(@builtin(vertex_index) vertex_index: u32, star: StarInput) -> StarOutput {
    var corners = array<vec2<f32>, 6>(
        vec2<f32>(-0.5, -0.5),
        vec2<f32>( 0.5, -0.5),
        vec2<f32>( 0.5,  0.5),
        vec2<f32>(-0.5, -0.5),
        vec2<f32>( 0.5,  0.5),
        vec2<f32>(-0.5,  0.5),
    );
    let corner = corners[vertex_index];

    var clip = uniforms.view_proj * vec4<f32>(star.position, 1.0);
    var scale = uniforms.params.x;
    if (uniforms.params.w > 0.0) {
        scale = 2.0 * scale * clip.w / uniforms.params.w;
    }
    clip.x += corner.x * scale * uniforms.params.y;
    clip.y += corner.y * scale;

    var out: StarOutput;
    out.clip_position = clip;
    out.uv = vec2<f32>(corner.x + 0.5, 0.5 - corner.y);
    return out;
}

@fragment
fn fs_star(in: StarOutput) -> @location(0) vec4<f32> {
    let texel = textureSample(glow_texture, glow_sampler, in.uv);
    let alpha = texel.a * uniforms.tint.a;
    if (alpha < uniforms.params.z) {
        discard;
    }
    return vec4<f32>(uniforms.tint.rgb * texel.rgb, alpha);
}
"#;
