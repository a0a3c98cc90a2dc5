//! Vertex types and geometry for the 3D scene

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

/// Textured mesh vertex
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

impl MeshVertex {
    const ATTRIBS: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x2];

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// Per-instance transform and material
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct InstanceRaw {
    pub model: [[f32; 4]; 4],
    /// Multiplied with the sampled texture
    pub base_color: [f32; 4],
    /// Added after lighting
    pub emissive: [f32; 4],
}

impl InstanceRaw {
    const ATTRIBS: [wgpu::VertexAttribute; 6] = wgpu::vertex_attr_array![
        2 => Float32x4,
        3 => Float32x4,
        4 => Float32x4,
        5 => Float32x4,
        6 => Float32x4,
        7 => Float32x4
    ];

    /// Cube of edge `size` centered at `pos`
    pub fn cube(pos: Vec3, size: f32, base_color: [f32; 4], emissive: [f32; 4]) -> Self {
        let model = Mat4::from_translation(pos) * Mat4::from_scale(Vec3::splat(size));
        Self {
            model: model.to_cols_array_2d(),
            base_color,
            emissive,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<InstanceRaw>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// Colored line vertex (ground grid)
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl LineVertex {
    const ATTRIBS: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x4];

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<LineVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// Material colors (linear RGB)
pub mod colors {
    pub const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
    pub const PLAYER: [f32; 4] = [0.0, 1.0, 0.0, 1.0];
    /// Full-intensity green glow
    pub const PLAYER_EMISSIVE: [f32; 4] = [0.0, 1.0, 0.0, 1.0];
    /// #222222 at intensity 0.8
    pub const OBSTACLE_EMISSIVE: [f32; 4] = [0.0127, 0.0127, 0.0127, 1.0];
    pub const GRID: [f32; 4] = [0.0, 1.0, 0.0, 1.0];
}

/// Unit cube centered at the origin: 24 vertices (4 per face) and 36 indices
pub fn unit_cube() -> (Vec<MeshVertex>, Vec<u16>) {
    // (normal, up) per face; right = up x normal
    let faces: [(Vec3, Vec3); 6] = [
        (Vec3::Z, Vec3::Y),
        (Vec3::NEG_Z, Vec3::Y),
        (Vec3::X, Vec3::Y),
        (Vec3::NEG_X, Vec3::Y),
        (Vec3::Y, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::Z),
    ];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);

    for (normal, up) in faces {
        let right = up.cross(normal);
        let center = normal * 0.5;
        let base = vertices.len() as u16;

        // Counter-clockwise seen from outside
        let corners = [
            (center - right * 0.5 - up * 0.5, [0.0, 1.0]),
            (center + right * 0.5 - up * 0.5, [1.0, 1.0]),
            (center + right * 0.5 + up * 0.5, [1.0, 0.0]),
            (center - right * 0.5 + up * 0.5, [0.0, 0.0]),
        ];
        for (p, uv) in corners {
            vertices.push(MeshVertex {
                position: p.to_array(),
                uv,
            });
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    (vertices, indices)
}

/// Square grid on the ground plane (`y = 0`), `divisions` cells per side
pub fn ground_grid(size: f32, divisions: u32, color: [f32; 4]) -> Vec<LineVertex> {
    let half = size / 2.0;
    let step = size / divisions as f32;
    let mut vertices = Vec::with_capacity(((divisions + 1) * 4) as usize);

    for i in 0..=divisions {
        let k = -half + i as f32 * step;
        // Line along z
        vertices.push(LineVertex { position: [k, 0.0, -half], color });
        vertices.push(LineVertex { position: [k, 0.0, half], color });
        // Line along x
        vertices.push(LineVertex { position: [-half, 0.0, k], color });
        vertices.push(LineVertex { position: [half, 0.0, k], color });
    }

    vertices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_cube_counts_and_bounds() {
        let (vertices, indices) = unit_cube();
        assert_eq!(vertices.len(), 24);
        assert_eq!(indices.len(), 36);
        assert!(indices.iter().all(|&i| (i as usize) < vertices.len()));
        for v in &vertices {
            assert!(v.position.iter().all(|c| c.abs() <= 0.5 + 1e-6));
        }
    }

    #[test]
    fn test_unit_cube_faces_wind_outward() {
        let (vertices, indices) = unit_cube();
        for tri in indices.chunks(3) {
            let a = Vec3::from(vertices[tri[0] as usize].position);
            let b = Vec3::from(vertices[tri[1] as usize].position);
            let c = Vec3::from(vertices[tri[2] as usize].position);
            let normal = (b - a).cross(c - a);
            let centroid = (a + b + c) / 3.0;
            assert!(normal.dot(centroid) > 0.0, "inward triangle {:?}", tri);
        }
    }

    #[test]
    fn test_ground_grid_lines() {
        let grid = ground_grid(100.0, 20, colors::GRID);
        // 21 lines each way, 2 vertices per line
        assert_eq!(grid.len(), 84);
        assert_eq!(grid[0].position, [-50.0, 0.0, -50.0]);
        assert!(grid.iter().all(|v| v.position[1] == 0.0));
        assert!(grid.iter().all(|v| v.position[0].abs() <= 50.0 && v.position[2].abs() <= 50.0));
    }

    #[test]
    fn test_cube_instance_transform() {
        let instance = InstanceRaw::cube(
            Vec3::new(2.0, 0.75, -50.0),
            1.5,
            colors::WHITE,
            colors::OBSTACLE_EMISSIVE,
        );
        let model = Mat4::from_cols_array_2d(&instance.model);
        let corner = model.transform_point3(Vec3::splat(0.5));
        assert!((corner - Vec3::new(2.75, 1.5, -49.25)).length() < 1e-5);
    }
}
