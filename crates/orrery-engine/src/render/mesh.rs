//! Static geometry shared by the passes.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Lit, textured cube vertex.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct CubeVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tangent: [f32; 3],
    pub uv: [f32; 2],
}

impl CubeVertex {
    const ATTRS: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
        0 => Float32x3, // position
        1 => Float32x3, // normal
        2 => Float32x3, // tangent
        3 => Float32x2  // uv
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<CubeVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Position-only vertex (skybox, quads).
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct PositionVertex {
    pub position: [f32; 3],
}

impl PositionVertex {
    const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<PositionVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

// ── cube ──────────────────────────────────────────────────────────────────

/// Per face: outward normal, then four corners. Corner 0 → 1 runs along +u
/// at v = 1; corner 3 is at uv (0, 0).
const CUBE_FACES: [([f32; 3], [[f32; 3]; 4]); 6] = [
    ([0.0, -1.0, 0.0], [[-1.0, -1.0, 1.0], [1.0, -1.0, 1.0], [1.0, -1.0, -1.0], [-1.0, -1.0, -1.0]]),
    ([0.0, 1.0, 0.0], [[-1.0, 1.0, -1.0], [1.0, 1.0, -1.0], [1.0, 1.0, 1.0], [-1.0, 1.0, 1.0]]),
    ([1.0, 0.0, 0.0], [[1.0, -1.0, -1.0], [1.0, -1.0, 1.0], [1.0, 1.0, 1.0], [1.0, 1.0, -1.0]]),
    ([-1.0, 0.0, 0.0], [[-1.0, -1.0, 1.0], [-1.0, -1.0, -1.0], [-1.0, 1.0, -1.0], [-1.0, 1.0, 1.0]]),
    ([0.0, 0.0, 1.0], [[1.0, -1.0, 1.0], [-1.0, -1.0, 1.0], [-1.0, 1.0, 1.0], [1.0, 1.0, 1.0]]),
    ([0.0, 0.0, -1.0], [[-1.0, -1.0, -1.0], [1.0, -1.0, -1.0], [1.0, 1.0, -1.0], [-1.0, 1.0, -1.0]]),
];

const FACE_UVS: [[f32; 2]; 4] = [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]];

/// Index count of the cube mesh.
pub const CUBE_INDEX_COUNT: u32 = 36;

/// Builds the 24-vertex unit cube (half-extent 1).
pub fn cube_vertices() -> Vec<CubeVertex> {
    let mut out = Vec::with_capacity(24);
    for (normal, corners) in CUBE_FACES {
        let tangent = (Vec3::from(corners[1]) - Vec3::from(corners[0]))
            .normalize()
            .to_array();
        for (corner, uv) in corners.iter().zip(FACE_UVS) {
            out.push(CubeVertex {
                position: *corner,
                normal,
                tangent,
                uv,
            });
        }
    }
    out
}

/// Clockwise (front-facing) from outside.
pub fn cube_indices() -> [u16; 36] {
    let mut out = [0u16; 36];
    for face in 0..6u16 {
        let base = face * 4;
        let i = face as usize * 6;
        out[i..i + 6].copy_from_slice(&[base, base + 2, base + 1, base, base + 3, base + 2]);
    }
    out
}

/// Non-indexed cube positions for the skybox, same winding as the lit cube.
pub fn skybox_vertices() -> Vec<PositionVertex> {
    let verts = cube_vertices();
    cube_indices()
        .iter()
        .map(|&i| PositionVertex {
            position: verts[i as usize].position,
        })
        .collect()
}

// ── quad ──────────────────────────────────────────────────────────────────

/// Unit quad in the XY plane; scaled per draw.
pub const QUAD_VERTICES: [PositionVertex; 4] = [
    PositionVertex { position: [-1.0, -1.0, 0.0] },
    PositionVertex { position: [-1.0, 1.0, 0.0] },
    PositionVertex { position: [1.0, 1.0, 0.0] },
    PositionVertex { position: [1.0, -1.0, 0.0] },
];

pub const QUAD_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_has_24_vertices_and_36_indices() {
        assert_eq!(cube_vertices().len(), 24);
        assert_eq!(cube_indices().len(), CUBE_INDEX_COUNT as usize);
        assert!(cube_indices().iter().all(|&i| i < 24));
    }

    #[test]
    fn triangles_face_outward() {
        // With the standard cross product on left-handed coordinates, a
        // clockwise-from-outside triangle yields an outward vector.
        let verts = cube_vertices();
        for tri in cube_indices().chunks(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| Vec3::from(verts[i as usize].position));
            let n = Vec3::from(verts[tri[0] as usize].normal);
            assert!((b - a).cross(c - a).dot(n) > 0.0, "triangle {tri:?}");
        }
    }

    #[test]
    fn tangents_are_unit_and_perpendicular() {
        for v in cube_vertices() {
            let t = Vec3::from(v.tangent);
            let n = Vec3::from(v.normal);
            assert!((t.length() - 1.0).abs() < 1e-6);
            assert!(t.dot(n).abs() < 1e-6);
        }
    }

    #[test]
    fn tangent_follows_increasing_u() {
        let verts = cube_vertices();
        for face in verts.chunks(4) {
            let edge = Vec3::from(face[1].position) - Vec3::from(face[0].position);
            assert!(face[1].uv[0] > face[0].uv[0]);
            assert!(Vec3::from(face[0].tangent).dot(edge) > 0.0);
        }
    }

    #[test]
    fn skybox_expands_the_cube() {
        assert_eq!(skybox_vertices().len(), 36);
    }
}
