//! Mesh representation for 3D geometry
//!
//! Pure geometry containers with no backend dependencies. Drawing surfaces
//! consume these directly; leaf nodes own them.

/// 3D vertex with position and normal data
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    /// Position in 3D space
    pub position: [f32; 3],

    /// Normal vector
    pub normal: [f32; 3],
}

impl Vertex {
    /// Create a new vertex
    pub fn new(position: [f32; 3], normal: [f32; 3]) -> Self {
        Self { position, normal }
    }
}

/// 3D mesh containing vertices and triangle indices
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    /// Vertex data
    pub vertices: Vec<Vertex>,

    /// Index data for triangles
    pub indices: Vec<u32>,
}

impl Mesh {
    /// Create a new mesh
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    /// Number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of indices
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// Number of triangles
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Check whether the mesh holds any geometry
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.indices.is_empty()
    }

    /// Create a unit cube centered at the origin
    ///
    /// Uses a right-handed coordinate system with Y-up orientation. Each
    /// face carries outward-facing normals. Intended for demos and tests.
    pub fn cube() -> Self {
        let vertices = vec![
            // Front face
            Vertex::new([-1.0, -1.0, 1.0], [0.0, 0.0, 1.0]),
            Vertex::new([1.0, -1.0, 1.0], [0.0, 0.0, 1.0]),
            Vertex::new([1.0, 1.0, 1.0], [0.0, 0.0, 1.0]),
            Vertex::new([-1.0, 1.0, 1.0], [0.0, 0.0, 1.0]),
            // Back face
            Vertex::new([-1.0, -1.0, -1.0], [0.0, 0.0, -1.0]),
            Vertex::new([-1.0, 1.0, -1.0], [0.0, 0.0, -1.0]),
            Vertex::new([1.0, 1.0, -1.0], [0.0, 0.0, -1.0]),
            Vertex::new([1.0, -1.0, -1.0], [0.0, 0.0, -1.0]),
        ];

        let indices = vec![
            // Front
            0, 1, 2, 2, 3, 0,
            // Back
            4, 5, 6, 6, 7, 4,
            // Left
            4, 0, 3, 3, 5, 4,
            // Right
            1, 7, 6, 6, 2, 1,
            // Top
            3, 2, 6, 6, 5, 3,
            // Bottom
            4, 7, 1, 1, 0, 4,
        ];

        Self::new(vertices, indices)
    }
}
