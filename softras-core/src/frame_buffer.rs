/// Color and depth storage for one rendered frame

/// An 8-bit RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl FrameColor {
    pub const RED: FrameColor = FrameColor::rgb(0xff, 0, 0);
    pub const GREEN: FrameColor = FrameColor::rgb(0, 0xff, 0);
    pub const BLUE: FrameColor = FrameColor::rgb(0, 0, 0xff);
    pub const WHITE: FrameColor = FrameColor::rgb(0xff, 0xff, 0xff);
    pub const BLACK: FrameColor = FrameColor::rgb(0, 0, 0);

    /// Opaque color
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xff }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_bytes(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Perceived brightness in `[0, 1]`
    pub fn luminance(self) -> f32 {
        (0.299 * self.r as f32 + 0.587 * self.g as f32 + 0.114 * self.b as f32) / 255.0
    }
}

impl Default for FrameColor {
    fn default() -> Self {
        Self::BLACK
    }
}

/// Pixel layout tag handed to display sinks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// RGB packed into 4 bytes per pixel, `r g b a` in memory
    Rgb32,
}

impl PixelFormat {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Rgb32 => 4,
        }
    }
}

/// Frame buffer with a parallel depth buffer.
///
/// Row 0 is the bottom scanline. Larger depth values are nearer to the
/// viewer; a cleared cell holds negative infinity so any fragment wins it.
pub struct FrameBuffer {
    width: usize,
    height: usize,
    format: PixelFormat,
    pixels: Vec<u8>,
    depth: Vec<f32>,
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        let format = PixelFormat::Rgb32;
        let size = width * height;
        let mut buffer = Self {
            width,
            height,
            format,
            pixels: vec![0; size * format.bytes_per_pixel()],
            depth: vec![f32::NEG_INFINITY; size],
        };
        buffer.clear_all_pixel();
        buffer
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn bytes_per_pixel(&self) -> usize {
        self.format.bytes_per_pixel()
    }

    /// Packed pixel bytes, `width * height * bytes_per_pixel` long
    pub fn raw_data(&self) -> &[u8] {
        &self.pixels
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    fn index(&self, x: i32, y: i32) -> usize {
        assert!(
            self.contains(x, y),
            "pixel ({x}, {y}) outside {}x{} frame buffer",
            self.width,
            self.height
        );
        x as usize + y as usize * self.width
    }

    pub fn set_pixel(&mut self, x: i32, y: i32, color: FrameColor) {
        let offset = self.index(x, y) * self.bytes_per_pixel();
        self.pixels[offset..offset + 4].copy_from_slice(&color.to_bytes());
    }

    pub fn get_pixel(&self, x: i32, y: i32) -> FrameColor {
        let offset = self.index(x, y) * self.bytes_per_pixel();
        let p = &self.pixels[offset..offset + 4];
        FrameColor::rgba(p[0], p[1], p[2], p[3])
    }

    /// Reset every pixel to opaque black.
    pub fn clear_all_pixel(&mut self) {
        for chunk in self.pixels.chunks_exact_mut(4) {
            chunk.copy_from_slice(&FrameColor::BLACK.to_bytes());
        }
    }

    /// Reset every depth cell to negative infinity.
    pub fn clear_depth(&mut self) {
        self.depth.fill(f32::NEG_INFINITY);
    }

    pub fn get_depth(&self, x: i32, y: i32) -> f32 {
        self.depth[self.index(x, y)]
    }

    pub fn update_depth(&mut self, x: i32, y: i32, depth: f32) {
        let idx = self.index(x, y);
        self.depth[idx] = depth;
    }
}
