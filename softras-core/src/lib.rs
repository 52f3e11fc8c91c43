/// softras core library - software rasterization pipeline
///
/// Linear algebra, the orbit camera, view/projection transforms, the
/// two-stage shading contract, the triangle rasterizer and its frame buffer,
/// plus the OBJ reader and TGA writer that feed and drain it.

pub mod camera;
pub mod frame_buffer;
pub mod line;
pub mod math;
pub mod model;
pub mod obj;
pub mod raster;
pub mod shader;
pub mod tga;
pub mod transform;

// Re-export commonly used types
pub use camera::{Camera, CameraContext};
pub use frame_buffer::{FrameBuffer, FrameColor, PixelFormat};
pub use model::{Face, FaceVertex, Model};
pub use obj::{load_obj, parse_obj, ObjError};
pub use raster::{FillMode, Rasterizer, RenderError, RenderStats};
pub use shader::{FlatShader, FragmentContext, Shader, Uniforms, VertexContext};
pub use tga::{save_tga, write_tga, TgaError};
pub use transform::Transform;
