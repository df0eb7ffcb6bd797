//! Procedural meshes: hexagonal prism tile and floor quad
//!
//! The tile is a pointy-top hexagon extruded along Y, sized so its footprint
//! matches the grid config (width across the flats on X, point to point on
//! Z). All tiles share this one mesh; placement comes from the instance
//! buffer.

use std::f32::consts::TAU;

use glam::Vec3;

use super::vertex::Vertex;

/// Indexed mesh data ready for upload
#[derive(Debug, Clone)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u16>,
}

impl Mesh {
    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }
}

/// Corner positions of a pointy-top hexagon with the given circumradius
fn hex_corners(circumradius: f32) -> [Vec3; 6] {
    std::array::from_fn(|i| {
        let angle = i as f32 / 6.0 * TAU;
        Vec3::new(
            circumradius * angle.sin(),
            0.0,
            circumradius * angle.cos(),
        )
    })
}

/// Hexagonal prism centered at the origin: `width` across the flats on X,
/// extruded `thickness` on Y.
pub fn hex_prism(width: f32, thickness: f32) -> Mesh {
    // Width across flats = sqrt(3) * circumradius
    let circumradius = width / 3.0_f32.sqrt();
    let half_y = thickness / 2.0;
    let corners = hex_corners(circumradius);

    let mut vertices = Vec::with_capacity(38);
    let mut indices = Vec::with_capacity(72);

    // Top cap: center fan, normal +Y
    let top_center = vertices.len() as u16;
    vertices.push(Vertex::new([0.0, half_y, 0.0], [0.0, 1.0, 0.0]));
    let top_ring = vertices.len() as u16;
    for corner in &corners {
        vertices.push(Vertex::new([corner.x, half_y, corner.z], [0.0, 1.0, 0.0]));
    }
    for i in 0..6u16 {
        let next = (i + 1) % 6;
        indices.extend([top_center, top_ring + i, top_ring + next]);
    }

    // Bottom cap: reversed winding, normal -Y
    let bottom_center = vertices.len() as u16;
    vertices.push(Vertex::new([0.0, -half_y, 0.0], [0.0, -1.0, 0.0]));
    let bottom_ring = vertices.len() as u16;
    for corner in &corners {
        vertices.push(Vertex::new(
            [corner.x, -half_y, corner.z],
            [0.0, -1.0, 0.0],
        ));
    }
    for i in 0..6u16 {
        let next = (i + 1) % 6;
        indices.extend([bottom_center, bottom_ring + next, bottom_ring + i]);
    }

    // Side quads, one flat normal each
    for i in 0..6 {
        let next = (i + 1) % 6;
        let a = corners[i];
        let b = corners[next];
        let normal = (a + b).normalize().to_array();

        let base = vertices.len() as u16;
        vertices.push(Vertex::new([a.x, half_y, a.z], normal));
        vertices.push(Vertex::new([b.x, half_y, b.z], normal));
        vertices.push(Vertex::new([b.x, -half_y, b.z], normal));
        vertices.push(Vertex::new([a.x, -half_y, a.z], normal));
        indices.extend([base, base + 2, base + 1, base, base + 3, base + 2]);
    }

    Mesh { vertices, indices }
}

/// Horizontal quad centered on the Y axis at the given height
pub fn floor_quad(width: f32, depth: f32, y: f32) -> Mesh {
    let hw = width / 2.0;
    let hd = depth / 2.0;
    let up = [0.0, 1.0, 0.0];

    let vertices = vec![
        Vertex::new([-hw, y, -hd], up),
        Vertex::new([hw, y, -hd], up),
        Vertex::new([hw, y, hd], up),
        Vertex::new([-hw, y, hd], up),
    ];
    let indices = vec![0, 2, 1, 0, 3, 2];

    Mesh { vertices, indices }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_prism_footprint() {
        let mesh = hex_prism(0.1, 0.02);

        // Width across flats on X is the requested width
        let max_x = mesh
            .vertices
            .iter()
            .map(|v| v.position[0])
            .fold(f32::NEG_INFINITY, f32::max);
        assert!((max_x - 0.05).abs() < 1e-4);

        // Point to point on Z is width * 2/sqrt(3)
        let max_z = mesh
            .vertices
            .iter()
            .map(|v| v.position[2])
            .fold(f32::NEG_INFINITY, f32::max);
        assert!((max_z - 0.1 / 3.0_f32.sqrt()).abs() < 1e-4);

        // Extruded symmetrically
        let max_y = mesh
            .vertices
            .iter()
            .map(|v| v.position[1])
            .fold(f32::NEG_INFINITY, f32::max);
        assert!((max_y - 0.01).abs() < 1e-6);
    }

    #[test]
    fn test_hex_prism_index_bounds() {
        let mesh = hex_prism(1.0, 0.2);
        let count = mesh.vertices.len() as u16;
        assert!(mesh.indices.iter().all(|i| *i < count));
        // Caps (2 * 18) plus sides (6 * 6)
        assert_eq!(mesh.indices.len(), 72);
    }

    #[test]
    fn test_floor_quad() {
        let mesh = floor_quad(16.0, 12.0, -0.1);
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.index_count(), 6);
        assert!(mesh.vertices.iter().all(|v| v.position[1] == -0.1));
    }
}
