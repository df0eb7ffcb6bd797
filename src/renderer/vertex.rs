//! GPU-facing vertex, instance and uniform layouts

use bytemuck::{Pod, Zeroable};

use crate::sim::TileInstance;

/// Mesh vertex with position and normal
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex {
    pub const fn new(position: [f32; 3], normal: [f32; 3]) -> Self {
        Self { position, normal }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

/// Per-instance attributes for the tile pass, one record per grid tile
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct TileInstanceRaw {
    pub position: [f32; 3],
    pub seed: f32,
    pub speed: f32,
}

impl From<&TileInstance> for TileInstanceRaw {
    fn from(tile: &TileInstance) -> Self {
        Self {
            position: tile.position.to_array(),
            seed: tile.seed,
            speed: tile.speed,
        }
    }
}

impl TileInstanceRaw {
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<TileInstanceRaw>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: 12,
                    shader_location: 3,
                    format: wgpu::VertexFormat::Float32,
                },
                wgpu::VertexAttribute {
                    offset: 16,
                    shader_location: 4,
                    format: wgpu::VertexFormat::Float32,
                },
            ],
        }
    }
}

/// Tile pass uniforms (layout must match `tile_shader.wgsl`)
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub struct TileUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub contact_point: [f32; 3],
    pub time: f32,
    pub radius: f32,
    pub height: f32,
    pub jitter_amplitude: f32,
    pub shininess: f32,
    pub tile_color: [f32; 3],
    pub fog_near: f32,
    pub specular_color: [f32; 3],
    pub fog_far: f32,
    pub light_dir: [f32; 3],
    pub _pad0: f32,
    pub fog_color: [f32; 3],
    pub _pad1: f32,
    pub camera_pos: [f32; 3],
    pub _pad2: f32,
}

/// Floor pass uniforms (layout must match `floor_shader.wgsl`)
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub struct FloorUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub contact_point: [f32; 3],
    pub highlight_radius: f32,
    pub size: [f32; 2],
    pub floor_y: f32,
    pub _pad0: f32,
    pub color: [f32; 3],
    pub fog_near: f32,
    pub highlight_color: [f32; 3],
    pub fog_far: f32,
    pub fog_color: [f32; 3],
    pub _pad1: f32,
    pub camera_pos: [f32; 3],
    pub _pad2: f32,
}

/// Scene lighting and fog constants
pub mod scene {
    /// Directional light, normalized in the shader
    pub const LIGHT_DIR: [f32; 3] = [1.0, 3.0, -1.0];
    /// Black fog closing in just past the camera's far interest range
    pub const FOG_COLOR: [f32; 3] = [0.0, 0.0, 0.0];
    pub const FOG_NEAR: f32 = 1.0;
    pub const FOG_FAR: f32 = 12.0;
    pub const CLEAR_COLOR: wgpu::Color = wgpu::Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_raw_matches_tile() {
        let tile = TileInstance {
            index: 7,
            position: glam::Vec3::new(1.0, -0.03, 2.0),
            seed: -0.25,
            speed: 0.4,
        };
        let raw = TileInstanceRaw::from(&tile);
        assert_eq!(raw.position, [1.0, -0.03, 2.0]);
        assert_eq!(raw.seed, -0.25);
        assert_eq!(raw.speed, 0.4);
    }

    #[test]
    fn test_uniform_sizes_are_wgsl_aligned() {
        // mat4 + vec4-packed rows
        assert_eq!(std::mem::size_of::<TileUniforms>(), 64 + 7 * 16);
        assert_eq!(std::mem::size_of::<FloorUniforms>(), 64 + 6 * 16);
        // Instance stride matches the attribute offsets
        assert_eq!(std::mem::size_of::<TileInstanceRaw>(), 20);
    }
}
