/// Uncompressed TGA export of a frame buffer
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::frame_buffer::FrameBuffer;

const HEADER_LEN: usize = 18;
/// Uncompressed true-color image
const IMAGE_TYPE_TRUE_COLOR: u8 = 2;
/// 8 alpha bits, bottom-left origin
const DESCRIPTOR_BOTTOM_LEFT_ALPHA8: u8 = 0x08;
const FOOTER_SIGNATURE: &[u8; 18] = b"TRUEVISION-XFILE.\0";

#[derive(Debug)]
pub enum TgaError {
    /// TGA stores dimensions in 16 bits
    TooLarge { width: usize, height: usize },
    Io(std::io::Error),
}

impl fmt::Display for TgaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TgaError::TooLarge { width, height } => {
                write!(f, "{width}x{height} image exceeds the TGA size limit")
            }
            TgaError::Io(err) => write!(f, "failed to write TGA image: {err}"),
        }
    }
}

impl std::error::Error for TgaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TgaError::Io(err) => Some(err),
            TgaError::TooLarge { .. } => None,
        }
    }
}

impl From<std::io::Error> for TgaError {
    fn from(err: std::io::Error) -> Self {
        TgaError::Io(err)
    }
}

/// Write `frame` as a 32-bit BGRA TGA with the TGA 2.0 footer.
///
/// Both the frame buffer and TGA put row 0 at the bottom, so scanlines are
/// written in buffer order.
pub fn write_tga<W: Write>(frame: &FrameBuffer, mut out: W) -> Result<(), TgaError> {
    let too_large = || TgaError::TooLarge {
        width: frame.width(),
        height: frame.height(),
    };
    let width = u16::try_from(frame.width()).map_err(|_| too_large())?;
    let height = u16::try_from(frame.height()).map_err(|_| too_large())?;

    let mut header = [0u8; HEADER_LEN];
    header[2] = IMAGE_TYPE_TRUE_COLOR;
    header[12..14].copy_from_slice(&width.to_le_bytes());
    header[14..16].copy_from_slice(&height.to_le_bytes());
    header[16] = 32;
    header[17] = DESCRIPTOR_BOTTOM_LEFT_ALPHA8;
    out.write_all(&header)?;

    let mut body = Vec::with_capacity(frame.raw_data().len());
    for px in frame.raw_data().chunks_exact(4) {
        body.extend_from_slice(&[px[2], px[1], px[0], px[3]]);
    }
    out.write_all(&body)?;

    // Extension and developer area offsets, both absent
    out.write_all(&[0u8; 8])?;
    out.write_all(FOOTER_SIGNATURE)?;
    out.flush()?;
    Ok(())
}

/// Write `frame` to a TGA file at `path`
pub fn save_tga(frame: &FrameBuffer, path: impl AsRef<Path>) -> Result<(), TgaError> {
    let path = path.as_ref();
    let file = File::create(path)?;
    write_tga(frame, BufWriter::new(file))?;
    info!(path = %path.display(), width = frame.width(), height = frame.height(), "saved TGA snapshot");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame_buffer::FrameColor;

    #[test]
    fn test_layout() {
        let mut frame = FrameBuffer::new(3, 2);
        frame.set_pixel(0, 0, FrameColor::rgba(10, 20, 30, 40));
        frame.set_pixel(2, 1, FrameColor::RED);

        let mut bytes = Vec::new();
        write_tga(&frame, &mut bytes).unwrap();

        assert_eq!(bytes.len(), HEADER_LEN + 3 * 2 * 4 + 26);
        assert_eq!(bytes[2], 2);
        assert_eq!(u16::from_le_bytes([bytes[12], bytes[13]]), 3);
        assert_eq!(u16::from_le_bytes([bytes[14], bytes[15]]), 2);
        assert_eq!(bytes[16], 32);

        let body = &bytes[HEADER_LEN..HEADER_LEN + 24];
        assert_eq!(&body[..4], &[30, 20, 10, 40]);
        assert_eq!(&body[20..24], &[0, 0, 0xff, 0xff]);
        assert!(bytes.ends_with(b"TRUEVISION-XFILE.\0"));
    }

    #[test]
    fn test_oversized_frame_is_rejected() {
        let frame = FrameBuffer::new(70_000, 1);
        let err = write_tga(&frame, std::io::sink()).unwrap_err();
        assert!(matches!(err, TgaError::TooLarge { width: 70_000, height: 1 }));
    }
}
