/// Wavefront OBJ reader for positions, texture coordinates, normals and faces
use std::fmt;
use std::path::Path;

use nom::{
    bytes::complete::tag,
    character::complete::{char, i64, space0, space1},
    combinator::{all_consuming, opt},
    multi::separated_list1,
    number::complete::float,
    sequence::{pair, preceded, terminated},
    IResult,
};
use tracing::debug;

use crate::math::Vec3f;
use crate::model::{AttributeKind, Face, FaceVertex, Model};

/// Failure while reading an OBJ document
#[derive(Debug)]
pub enum ObjError {
    /// A `v`, `vt`, `vn` or `f` statement that does not parse
    Syntax { line: usize, text: String },
    /// Zero, or an index pointing outside the list defined so far
    BadIndex {
        line: usize,
        kind: AttributeKind,
        index: i64,
        len: usize,
    },
    Io(std::io::Error),
}

impl fmt::Display for ObjError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjError::Syntax { line, text } => write!(f, "line {line}: malformed statement `{text}`"),
            ObjError::BadIndex { line, kind, index, len } => write!(
                f,
                "line {line}: {kind} index {index} does not resolve against {len} entries"
            ),
            ObjError::Io(err) => write!(f, "failed to read OBJ file: {err}"),
        }
    }
}

impl std::error::Error for ObjError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ObjError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ObjError {
    fn from(err: std::io::Error) -> Self {
        ObjError::Io(err)
    }
}

/// Face corner exactly as written: 1-based, negative means relative to the end
#[derive(Debug, Clone, Copy, PartialEq)]
struct RawCorner {
    vertex: i64,
    uv: Option<i64>,
    normal: Option<i64>,
}

/// Read and parse an OBJ file
pub fn load_obj(path: impl AsRef<Path>) -> Result<Model, ObjError> {
    let text = std::fs::read_to_string(path.as_ref())?;
    let model = parse_obj(&text)?;
    debug!(
        path = %path.as_ref().display(),
        vertices = model.vertices().len(),
        faces = model.faces().len(),
        "loaded OBJ model"
    );
    Ok(model)
}

/// Parse OBJ text into a [`Model`] with resolved 0-based indices.
///
/// Statements other than `v`, `vt`, `vn` and `f` are ignored, as is anything
/// after a `#`.
pub fn parse_obj(input: &str) -> Result<Model, ObjError> {
    let mut model = Model::new();

    for (idx, raw_line) in input.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw_line.split('#').next().unwrap_or("").trim();
        let keyword = line.split_whitespace().next().unwrap_or("");

        let syntax = || ObjError::Syntax {
            line: line_no,
            text: line.to_string(),
        };

        match keyword {
            "v" => {
                let (_, v) = all_consuming(vertex_statement)(line).map_err(|_| syntax())?;
                model.push_vertex(v);
            }
            "vt" => {
                let (_, uv) = all_consuming(texture_statement)(line).map_err(|_| syntax())?;
                model.push_texture(uv);
            }
            "vn" => {
                let (_, n) = all_consuming(normal_statement)(line).map_err(|_| syntax())?;
                model.push_normal(n);
            }
            "f" => {
                let (_, corners) = all_consuming(face_statement)(line).map_err(|_| syntax())?;
                let face = resolve_face(&model, &corners, line_no)?;
                model.push_face(face);
            }
            _ => {}
        }
    }

    Ok(model)
}

fn resolve_face(model: &Model, corners: &[RawCorner], line: usize) -> Result<Face, ObjError> {
    corners
        .iter()
        .map(|c| {
            Ok(FaceVertex {
                vertex: resolve_index(model, AttributeKind::Vertex, c.vertex, line)?,
                uv: c
                    .uv
                    .map(|i| resolve_index(model, AttributeKind::Texture, i, line))
                    .transpose()?,
                normal: c
                    .normal
                    .map(|i| resolve_index(model, AttributeKind::Normal, i, line))
                    .transpose()?,
            })
        })
        .collect()
}

fn resolve_index(model: &Model, kind: AttributeKind, index: i64, line: usize) -> Result<usize, ObjError> {
    let len = model.attribute_len(kind);
    let resolved = match index {
        i if i > 0 => i - 1,
        i if i < 0 => len as i64 + i,
        _ => -1,
    };
    if resolved < 0 || resolved >= len as i64 {
        return Err(ObjError::BadIndex { line, kind, index, len });
    }
    Ok(resolved as usize)
}

fn vertex_statement(input: &str) -> IResult<&str, Vec3f> {
    // Optional weight is accepted and dropped
    let (input, _) = tag("v")(input)?;
    let (input, v) = vector3(input)?;
    let (input, _) = opt(preceded(space1, float))(input)?;
    Ok((input, v))
}

fn texture_statement(input: &str) -> IResult<&str, Vec3f> {
    let (input, _) = tag("vt")(input)?;
    let (input, u) = preceded(space1, float)(input)?;
    let (input, v) = opt(preceded(space1, float))(input)?;
    let (input, w) = opt(preceded(space1, float))(input)?;
    Ok((input, Vec3f::new(u, v.unwrap_or(0.0), w.unwrap_or(0.0))))
}

fn normal_statement(input: &str) -> IResult<&str, Vec3f> {
    let (input, _) = tag("vn")(input)?;
    vector3(input)
}

fn face_statement(input: &str) -> IResult<&str, Vec<RawCorner>> {
    let (input, _) = tag("f")(input)?;
    let (input, _) = space1(input)?;
    terminated(separated_list1(space1, face_corner), space0)(input)
}

/// `v`, `v/vt`, `v//vn` or `v/vt/vn`
fn face_corner(input: &str) -> IResult<&str, RawCorner> {
    let (input, vertex) = i64(input)?;
    let (input, rest) = opt(preceded(
        char('/'),
        pair(opt(i64), opt(preceded(char('/'), i64))),
    ))(input)?;
    let (uv, normal) = rest.unwrap_or((None, None));
    Ok((input, RawCorner { vertex, uv, normal }))
}

fn vector3(input: &str) -> IResult<&str, Vec3f> {
    let (input, x) = preceded(space1, float)(input)?;
    let (input, y) = preceded(space1, float)(input)?;
    let (input, z) = preceded(space1, float)(input)?;
    Ok((input, Vec3f::new(x, y, z)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD: &str = "\
# a unit quad
o quad
v -1.0 -1.0 0.0
v 1.0 -1.0 0.0
v 1.0 1.0 0.0
v -1.0 1.0 0.0
vt 0 0
vt 1 0
vt 1 1
vt 0 1 0.5
vn 0 0 1
s off
f 1/1/1 2/2/1 3/3/1 4/4/1
";

    #[test]
    fn test_parse_quad() {
        let model = parse_obj(QUAD).unwrap();
        assert_eq!(model.vertices().len(), 4);
        assert_eq!(model.textures().len(), 4);
        assert_eq!(model.normals().len(), 1);
        assert_eq!(model.textures()[0], Vec3f::new(0.0, 0.0, 0.0));
        assert_eq!(model.textures()[3], Vec3f::new(0.0, 1.0, 0.5));

        let face = &model.faces()[0];
        assert_eq!(face.len(), 4);
        assert_eq!(face[0], FaceVertex::new(0, Some(0), Some(0)));
        assert_eq!(face[3], FaceVertex::new(3, Some(3), Some(0)));
    }

    #[test]
    fn test_corner_forms() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nvt 0.5 0.5\n\
                    f 1 2 3\nf 1//1 2//1 3//1\nf 1/1 2/1 3/1\n";
        let model = parse_obj(text).unwrap();
        let faces = model.faces();
        assert_eq!(faces[0][1], FaceVertex::position(1));
        assert_eq!(faces[1][2], FaceVertex::new(2, None, Some(0)));
        assert_eq!(faces[2][0], FaceVertex::new(0, Some(0), None));
    }

    #[test]
    fn test_negative_indices_are_relative() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nvn 0 0 -1\nf -3//-1 -2//-1 -1//-2\nv 5 5 5\nf -4 -3 -1\n";
        let model = parse_obj(text).unwrap();
        let faces = model.faces();
        assert_eq!(faces[0][0], FaceVertex::new(0, None, Some(1)));
        assert_eq!(faces[0][2], FaceVertex::new(2, None, Some(0)));
        // Relative to the list as it stood when the face was read
        assert_eq!(faces[1][0].vertex, 0);
        assert_eq!(faces[1][2].vertex, 3);
    }

    #[test]
    fn test_bounds_tracked_while_parsing() {
        let text = "v -2 -1 -1\nv 2 3 1\nv 0 0 0\n";
        let model = parse_obj(text).unwrap();
        let (min, max) = model.bounds().unwrap();
        assert_eq!(min, Vec3f::new(-2.0, -1.0, -1.0));
        assert_eq!(max, Vec3f::new(2.0, 3.0, 1.0));
    }

    #[test]
    fn test_malformed_vertex_is_rejected() {
        let err = parse_obj("v 0 0 0\nv 1.0 oops 2\n").unwrap_err();
        match err {
            ObjError::Syntax { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error {other}"),
        }
        assert!(matches!(parse_obj("vn 1 2\n"), Err(ObjError::Syntax { line: 1, .. })));
        assert!(matches!(parse_obj("f\n"), Err(ObjError::Syntax { line: 1, .. })));
    }

    #[test]
    fn test_bad_indices_are_rejected() {
        let err = parse_obj("v 0 0 0\nf 1 2 0\n").unwrap_err();
        assert!(matches!(
            err,
            ObjError::BadIndex { line: 2, kind: AttributeKind::Vertex, index: 2, len: 1 }
        ));
        let err = parse_obj("v 0 0 0\nf 1//1 1 1\n").unwrap_err();
        assert!(matches!(err, ObjError::BadIndex { kind: AttributeKind::Normal, .. }));
        let err = parse_obj("v 0 0 0\nf 0 1 1\n").unwrap_err();
        assert!(matches!(err, ObjError::BadIndex { index: 0, .. }));
        let err = parse_obj("v 0 0 0\nf -2 1 1\n").unwrap_err();
        assert!(matches!(err, ObjError::BadIndex { index: -2, .. }));
    }

    #[test]
    fn test_comments_and_unknown_statements_are_skipped() {
        let text = "mtllib a.mtl\n\n   \nusemtl red\ng group # trailing\nv 1 2 3 # comment\n";
        let model = parse_obj(text).unwrap();
        assert_eq!(model.vertices(), &[Vec3f::new(1.0, 2.0, 3.0)]);
        assert!(model.faces().is_empty());
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_obj("/nonexistent/softras/model.obj").unwrap_err();
        assert!(matches!(err, ObjError::Io(_)));
    }
}
