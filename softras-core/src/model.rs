/// Polygon mesh data consumed by the rasterizer
use crate::math::{Mat4f, Vec3f};
use crate::transform::Transform;

/// Which per-vertex list an index refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    Vertex,
    Texture,
    Normal,
}

impl std::fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttributeKind::Vertex => write!(f, "vertex"),
            AttributeKind::Texture => write!(f, "texture coordinate"),
            AttributeKind::Normal => write!(f, "normal"),
        }
    }
}

/// One corner of a face: 0-based indices into the model's lists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceVertex {
    pub vertex: usize,
    pub uv: Option<usize>,
    pub normal: Option<usize>,
}

impl FaceVertex {
    pub fn new(vertex: usize, uv: Option<usize>, normal: Option<usize>) -> Self {
        Self { vertex, uv, normal }
    }

    /// Corner with a position only
    pub fn position(vertex: usize) -> Self {
        Self::new(vertex, None, None)
    }
}

/// An ordered polygon; the rasterizer accepts triangles and quads
pub type Face = Vec<FaceVertex>;

/// A mesh with positions, texture coordinates, normals and faces.
///
/// The axis-aligned bounding box follows every [`Model::push_vertex`], so the
/// normalizing model matrix is always available without a separate pass.
#[derive(Debug, Clone)]
pub struct Model {
    vertices: Vec<Vec3f>,
    textures: Vec<Vec3f>,
    normals: Vec<Vec3f>,
    faces: Vec<Face>,
    min_bound: Vec3f,
    max_bound: Vec3f,
}

impl Model {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            textures: Vec::new(),
            normals: Vec::new(),
            faces: Vec::new(),
            min_bound: Vec3f::repeat(f32::MAX),
            max_bound: Vec3f::repeat(-f32::MAX),
        }
    }

    pub fn push_vertex(&mut self, vertex: Vec3f) {
        self.min_bound = self.min_bound.inf(&vertex);
        self.max_bound = self.max_bound.sup(&vertex);
        self.vertices.push(vertex);
    }

    pub fn push_texture(&mut self, uv: Vec3f) {
        self.textures.push(uv);
    }

    pub fn push_normal(&mut self, normal: Vec3f) {
        self.normals.push(normal);
    }

    pub fn push_face(&mut self, face: Face) {
        self.faces.push(face);
    }

    pub fn vertices(&self) -> &[Vec3f] {
        &self.vertices
    }

    pub fn textures(&self) -> &[Vec3f] {
        &self.textures
    }

    pub fn normals(&self) -> &[Vec3f] {
        &self.normals
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// Number of entries in the list `kind` indexes into
    pub fn attribute_len(&self, kind: AttributeKind) -> usize {
        match kind {
            AttributeKind::Vertex => self.vertices.len(),
            AttributeKind::Texture => self.textures.len(),
            AttributeKind::Normal => self.normals.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Bounding box as `(min, max)`, or `None` before the first vertex
    pub fn bounds(&self) -> Option<(Vec3f, Vec3f)> {
        if self.vertices.is_empty() {
            None
        } else {
            Some((self.min_bound, self.max_bound))
        }
    }

    /// Uniform scale and translation fitting the mesh into `[-1, 1]^3`.
    ///
    /// The box centre moves to the origin and the longest extent is scaled to
    /// 2. Empty or single-point meshes get the identity.
    pub fn model_matrix(&self) -> Mat4f {
        let Some((min, max)) = self.bounds() else {
            return Mat4f::identity();
        };
        let extent = (max - min).max();
        if extent <= 0.0 {
            return Mat4f::identity();
        }

        let scale = 2.0 / extent;
        let center = (max + min) / 2.0;
        Transform::scale_matrix(scale, scale, scale)
            * Transform::translation_matrix(-center.x, -center.y, -center.z)
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Axis-aligned cube centred at the origin, built from six quads wound
    /// counter-clockwise when seen from outside.
    pub fn cube(size: f32) -> Self {
        let h = size / 2.0;
        let mut model = Self::new();

        for (x, y, z) in [
            (-h, -h, -h),
            (h, -h, -h),
            (h, h, -h),
            (-h, h, -h),
            (-h, -h, h),
            (h, -h, h),
            (h, h, h),
            (-h, h, h),
        ] {
            model.push_vertex(Vec3f::new(x, y, z));
        }

        for (u, v) in [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)] {
            model.push_texture(Vec3f::new(u, v, 0.0));
        }

        let sides: [([usize; 4], Vec3f); 6] = [
            ([4, 5, 6, 7], Vec3f::new(0.0, 0.0, 1.0)),
            ([1, 0, 3, 2], Vec3f::new(0.0, 0.0, -1.0)),
            ([5, 1, 2, 6], Vec3f::new(1.0, 0.0, 0.0)),
            ([0, 4, 7, 3], Vec3f::new(-1.0, 0.0, 0.0)),
            ([7, 6, 2, 3], Vec3f::new(0.0, 1.0, 0.0)),
            ([0, 1, 5, 4], Vec3f::new(0.0, -1.0, 0.0)),
        ];
        for (normal_idx, (corners, normal)) in sides.into_iter().enumerate() {
            model.push_normal(normal);
            let face = corners
                .iter()
                .enumerate()
                .map(|(uv, &vertex)| FaceVertex::new(vertex, Some(uv), Some(normal_idx)))
                .collect();
            model.push_face(face);
        }

        model
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}
