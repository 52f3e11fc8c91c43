/// Presents a rendered frame buffer as terminal cells
use crossterm::{
    cursor,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    QueueableCommand,
};
use softras_core::{FrameBuffer, FrameColor};
use std::io::Write;

use crate::config::Palette;

/// Character luminosity ramp for shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Upper half block: foreground paints the top pixel, background the bottom one
const HALF_BLOCK: char = '\u{2580}';

/// Writes frame buffers to a terminal in the configured [`Palette`].
///
/// The frame buffer keeps row 0 at the bottom while terminals count rows from
/// the top, so rows are emitted in reverse.
#[derive(Debug, Clone, Copy)]
pub struct TerminalPresenter {
    palette: Palette,
}

impl TerminalPresenter {
    pub fn new(palette: Palette) -> Self {
        Self { palette }
    }

    pub fn palette(&self) -> Palette {
        self.palette
    }

    /// Frame buffer size that fills `cols` x `rows` cells
    pub fn frame_size(&self, cols: u16, rows: u16) -> (usize, usize) {
        let cols = cols.max(1) as usize;
        let rows = rows.max(1) as usize;
        match self.palette {
            Palette::TrueColor => (cols, rows * 2),
            Palette::Ascii => (cols, rows),
        }
    }

    /// Queue the whole frame starting at the top-left cell. The caller flushes.
    pub fn draw<W: Write>(&self, frame: &FrameBuffer, writer: &mut W) -> std::io::Result<()> {
        match self.palette {
            Palette::TrueColor => draw_half_blocks(frame, writer)?,
            Palette::Ascii => draw_ramp(frame, writer)?,
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

fn draw_half_blocks<W: Write>(frame: &FrameBuffer, writer: &mut W) -> std::io::Result<()> {
    let height = frame.height() as i32;
    let rows = (frame.height() + 1) / 2;

    for row in 0..rows {
        writer.queue(cursor::MoveTo(0, row as u16))?;
        let upper_y = height - 1 - 2 * row as i32;
        let lower_y = upper_y - 1;

        let mut current = None;
        for x in 0..frame.width() as i32 {
            let upper = frame.get_pixel(x, upper_y);
            // Odd heights leave the last cell without a lower pixel
            let lower = if lower_y >= 0 {
                frame.get_pixel(x, lower_y)
            } else {
                FrameColor::BLACK
            };
            if current != Some((upper, lower)) {
                writer.queue(SetForegroundColor(rgb(upper)))?;
                writer.queue(SetBackgroundColor(rgb(lower)))?;
                current = Some((upper, lower));
            }
            writer.queue(Print(HALF_BLOCK))?;
        }
    }
    Ok(())
}

fn draw_ramp<W: Write>(frame: &FrameBuffer, writer: &mut W) -> std::io::Result<()> {
    let height = frame.height() as i32;

    for row in 0..height {
        writer.queue(cursor::MoveTo(0, row as u16))?;
        let y = height - 1 - row;

        let mut current = None;
        for x in 0..frame.width() as i32 {
            let c = ramp_char(frame.get_pixel(x, y).luminance());

            // Color based on character intensity
            let color = match c {
                ' ' | '.' | ':' => Color::DarkGrey,
                '-' | '=' => Color::Grey,
                '+' | '*' => Color::White,
                '#' | '%' | '@' => Color::Cyan,
                _ => Color::White,
            };
            if current != Some(color) {
                writer.queue(SetForegroundColor(color))?;
                current = Some(color);
            }
            writer.queue(Print(c))?;
        }
    }
    Ok(())
}

fn rgb(color: FrameColor) -> Color {
    Color::Rgb {
        r: color.r,
        g: color.g,
        b: color.b,
    }
}

/// Map a luminance in `[0, 1]` onto the ramp
fn ramp_char(luminance: f32) -> char {
    let last = LUMINOSITY_RAMP.len() - 1;
    let index = (luminance.clamp(0.0, 1.0) * last as f32).round() as usize;
    LUMINOSITY_RAMP[index.min(last)]
}
