/// Triangle rasterizer: face triangulation, frustum rejection, barycentric
/// coverage, depth testing and fragment dispatch
use std::fmt;

use tracing::{debug, trace};

use crate::frame_buffer::{FrameBuffer, FrameColor};
use crate::line::draw_line;
use crate::math::{clip2, clip3, Vec2f, Vec2i, Vec3f, EPSILON};
use crate::model::{AttributeKind, Face, FaceVertex, Model};
use crate::shader::{FragmentContext, Shader, VertexContext};

/// Corner indices of the triangles a face is split into
const TRIANGLE: &[[usize; 3]] = &[[0, 1, 2]];
const QUAD_FAN: &[[usize; 3]] = &[[0, 1, 2], [2, 3, 0]];

/// Structural problem that aborts a render pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// Only triangles and quads can be rasterized
    UnsupportedPolygon { face: usize, vertices: usize },
    IndexOutOfRange {
        face: usize,
        kind: AttributeKind,
        index: usize,
        len: usize,
    },
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::UnsupportedPolygon { face, vertices } => write!(
                f,
                "face {face} has {vertices} vertices; only triangles and quads are supported"
            ),
            RenderError::IndexOutOfRange { face, kind, index, len } => write!(
                f,
                "face {face} references {kind} {index} but the model has {len}"
            ),
        }
    }
}

impl std::error::Error for RenderError {}

/// Counters for one render pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub faces: usize,
    pub triangles: usize,
    /// Triangles dropped by the frustum test or for a zero-area face
    pub culled: usize,
    /// Pixels written after depth test and fragment stage
    pub fragments: usize,
}

/// How triangles reach the frame buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillMode {
    #[default]
    Solid,
    /// Triangle edges only, without depth testing or the fragment stage
    Wireframe(FrameColor),
}

/// Split a face into triangles: a triangle stays whole, a quad becomes the
/// fan `(0, 1, 2)`, `(2, 3, 0)`.
pub fn triangulate(face: &Face, face_idx: usize) -> Result<&'static [[usize; 3]], RenderError> {
    match face.len() {
        3 => Ok(TRIANGLE),
        4 => Ok(QUAD_FAN),
        n => Err(RenderError::UnsupportedPolygon {
            face: face_idx,
            vertices: n,
        }),
    }
}

/// Barycentric weights of `p` with respect to triangle `abc`.
///
/// Near-zero-area triangles yield `(-1, 1, 1)`, which fails the inside test.
pub fn barycentric(a: Vec2f, b: Vec2f, c: Vec2f, p: Vec2f) -> Vec3f {
    let pa = a - p;
    let ab = b - a;
    let ac = c - a;

    let u = Vec3f::new(ac.x, ab.x, pa.x).cross(&Vec3f::new(ac.y, ab.y, pa.y));
    if u.z.abs() <= EPSILON {
        return Vec3f::new(-1.0, 1.0, 1.0);
    }
    Vec3f::new(1.0 - (u.x + u.y) / u.z, u.y / u.z, u.x / u.z)
}

/// Pixel-space bounding box of a screen triangle, clamped to the buffer.
///
/// An empty buffer yields an inverted box (`min > max`) that covers nothing.
pub fn bounding_box(screen: &[Vec2f; 3], width: usize, height: usize) -> (Vec2i, Vec2i) {
    if width == 0 || height == 0 {
        return (Vec2i::zeros(), Vec2i::new(-1, -1));
    }
    let lo = screen[0].inf(&screen[1]).inf(&screen[2]);
    let hi = screen[0].sup(&screen[1]).sup(&screen[2]);
    let max_x = width as i32 - 1;
    let max_y = height as i32 - 1;
    (
        Vec2i::new(
            (lo.x.floor() as i32).clamp(0, max_x),
            (lo.y.floor() as i32).clamp(0, max_y),
        ),
        Vec2i::new(
            (hi.x.floor() as i32).clamp(0, max_x),
            (hi.y.floor() as i32).clamp(0, max_y),
        ),
    )
}

/// `(ndc + 1) * dimension / 2`
fn ndc_to_screen(ndc: &Vec3f, width: usize, height: usize) -> Vec2f {
    Vec2f::new(
        (ndc.x + 1.0) * width as f32 / 2.0,
        (ndc.y + 1.0) * height as f32 / 2.0,
    )
}

/// Perspective-divide all three corners; `None` when any corner leaves the
/// `[-1, 1]` x/y range (or the divide is not finite).
fn project_triangle(fctxs: &[FragmentContext; 3]) -> Option<[Vec3f; 3]> {
    let mut ndc = [Vec3f::zeros(); 3];
    for (out, fctx) in ndc.iter_mut().zip(fctxs) {
        let p = clip3(&(fctx.clip_pos / fctx.clip_pos.w));
        // Written so that NaN also rejects
        if !(p.x.abs() <= 1.0 && p.y.abs() <= 1.0) {
            return None;
        }
        *out = p;
    }
    Some(ndc)
}

/// Drives a [`Shader`] over models and fills a [`FrameBuffer`]
#[derive(Debug, Clone, Copy, Default)]
pub struct Rasterizer {
    pub fill: FillMode,
}

impl Rasterizer {
    pub fn new(fill: FillMode) -> Self {
        Self { fill }
    }

    /// Render a whole frame: validate every face, clear both buffers, then
    /// draw each model.
    ///
    /// A structural error is reported before anything is written, so the
    /// buffer keeps the previous frame.
    pub fn render<S: Shader + ?Sized>(
        &self,
        models: &[Model],
        shader: &S,
        frame: &mut FrameBuffer,
    ) -> Result<RenderStats, RenderError> {
        for model in models {
            validate(model)?;
        }

        frame.clear_all_pixel();
        frame.clear_depth();

        let mut stats = RenderStats::default();
        for model in models {
            self.draw_model(model, shader, frame, &mut stats)?;
        }

        debug!(
            faces = stats.faces,
            triangles = stats.triangles,
            culled = stats.culled,
            fragments = stats.fragments,
            "frame rasterized"
        );
        Ok(stats)
    }

    /// One-off wireframe frame in `color`, whatever fill mode is configured
    /// elsewhere.
    pub fn render_wireframe<S: Shader + ?Sized>(
        models: &[Model],
        shader: &S,
        frame: &mut FrameBuffer,
        color: FrameColor,
    ) -> Result<RenderStats, RenderError> {
        Rasterizer::new(FillMode::Wireframe(color)).render(models, shader, frame)
    }

    /// Draw one model on top of the current buffer contents.
    pub fn draw_model<S: Shader + ?Sized>(
        &self,
        model: &Model,
        shader: &S,
        frame: &mut FrameBuffer,
        stats: &mut RenderStats,
    ) -> Result<(), RenderError> {
        for (face_idx, face) in model.faces().iter().enumerate() {
            let triangles = triangulate(face, face_idx)?;
            stats.faces += 1;

            for corners in triangles {
                let mut fctxs = [FragmentContext::default(); 3];
                for (fctx, &corner) in fctxs.iter_mut().zip(corners) {
                    let vctx = vertex_context(model, &face[corner], face_idx)?;
                    *fctx = shader.vertex(&vctx);
                }

                stats.triangles += 1;
                let written = match self.fill {
                    FillMode::Solid => draw_triangle(&fctxs, shader, frame),
                    FillMode::Wireframe(color) => draw_triangle_edges(&fctxs, color, frame),
                };
                match written {
                    Some(n) => stats.fragments += n,
                    None => stats.culled += 1,
                }
            }
        }
        Ok(())
    }
}

/// Check that every face of `model` can be rasterized
pub fn validate(model: &Model) -> Result<(), RenderError> {
    for (face_idx, face) in model.faces().iter().enumerate() {
        triangulate(face, face_idx)?;
        for corner in face {
            vertex_context(model, corner, face_idx)?;
        }
    }
    Ok(())
}

fn lookup(model: &Model, kind: AttributeKind, index: usize, face: usize) -> Result<Vec3f, RenderError> {
    let list = match kind {
        AttributeKind::Vertex => model.vertices(),
        AttributeKind::Texture => model.textures(),
        AttributeKind::Normal => model.normals(),
    };
    list.get(index).copied().ok_or(RenderError::IndexOutOfRange {
        face,
        kind,
        index,
        len: list.len(),
    })
}

/// Gather a corner's attributes; absent UVs and normals read as zero
fn vertex_context(model: &Model, corner: &FaceVertex, face: usize) -> Result<VertexContext, RenderError> {
    let pos = lookup(model, AttributeKind::Vertex, corner.vertex, face)?;
    let normal = match corner.normal {
        Some(i) => lookup(model, AttributeKind::Normal, i, face)?,
        None => Vec3f::zeros(),
    };
    let uv = match corner.uv {
        Some(i) => clip2(&lookup(model, AttributeKind::Texture, i, face)?),
        None => Vec2f::zeros(),
    };
    Ok(VertexContext { pos, normal, uv })
}

/// Fill one triangle given the vertex-stage outputs of its corners.
///
/// Returns the number of pixels written, or `None` when the whole triangle
/// was rejected (a corner outside the frustum, or a zero-area face).
pub fn draw_triangle<S: Shader + ?Sized>(
    fctxs: &[FragmentContext; 3],
    shader: &S,
    frame: &mut FrameBuffer,
) -> Option<usize> {
    let ndc = project_triangle(fctxs)?;
    trace!(?ndc, "triangle in NDC");

    let (width, height) = (frame.width(), frame.height());
    if width == 0 || height == 0 {
        return Some(0);
    }

    let screen = [
        ndc_to_screen(&ndc[0], width, height),
        ndc_to_screen(&ndc[1], width, height),
        ndc_to_screen(&ndc[2], width, height),
    ];
    let depth = Vec3f::new(ndc[0].z, ndc[1].z, ndc[2].z);

    // One normal for the whole triangle
    let world = [fctxs[0].world_pos, fctxs[1].world_pos, fctxs[2].world_pos];
    let face_normal = (world[1] - world[0]).cross(&(world[2] - world[0])).try_normalize(0.0)?;
    let intensity = face_normal.dot(&shader.uniforms().light_dir);

    let (bbmin, bbmax) = bounding_box(&screen, width, height);
    let mut written = 0;

    for y in bbmin.y..=bbmax.y {
        for x in bbmin.x..=bbmax.x {
            let bc = barycentric(screen[0], screen[1], screen[2], Vec2f::new(x as f32, y as f32));
            if bc.x < 0.0 || bc.y < 0.0 || bc.z < 0.0 {
                continue;
            }

            let z = bc.dot(&depth);
            if z <= frame.get_depth(x, y) {
                continue;
            }

            let fctx = FragmentContext {
                clip_pos: fctxs[0].clip_pos * bc.x + fctxs[1].clip_pos * bc.y + fctxs[2].clip_pos * bc.z,
                world_pos: world[0] * bc.x + world[1] * bc.y + world[2] * bc.z,
                world_normal: face_normal,
                uv: fctxs[0].uv * bc.x + fctxs[1].uv * bc.y + fctxs[2].uv * bc.z,
                intensity,
            };

            if let Some(color) = shader.fragment(&fctx) {
                frame.update_depth(x, y, z);
                frame.set_pixel(x, y, color);
                written += 1;
            }
        }
    }

    Some(written)
}

/// Outline one triangle; same frustum rejection as [`draw_triangle`].
fn draw_triangle_edges(fctxs: &[FragmentContext; 3], color: FrameColor, frame: &mut FrameBuffer) -> Option<usize> {
    let ndc = project_triangle(fctxs)?;
    let (width, height) = (frame.width(), frame.height());
    let points: [Vec2i; 3] = ndc.map(|p| ndc_to_screen(&p, width, height).map(|c| c.floor() as i32));

    let mut written = 0;
    for i in 0..3 {
        written += draw_line(points[i], points[(i + 1) % 3], color, frame);
    }
    Some(written)
}
