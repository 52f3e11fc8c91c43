/// Bresenham line drawing into a frame buffer
use crate::frame_buffer::{FrameBuffer, FrameColor};
use crate::math::Vec2i;

/// Draw the segment `p0..=p1` and return how many pixels were written.
/// Points falling outside the buffer are skipped.
pub fn draw_line(p0: Vec2i, p1: Vec2i, color: FrameColor, frame: &mut FrameBuffer) -> usize {
    let (mut x0, mut y0, mut x1, mut y1) = (p0.x, p0.y, p1.x, p1.y);

    // Walk along the major axis so every step advances exactly one pixel
    let steep = (y1 - y0).abs() > (x1 - x0).abs();
    if steep {
        std::mem::swap(&mut x0, &mut y0);
        std::mem::swap(&mut x1, &mut y1);
    }
    if x0 > x1 {
        std::mem::swap(&mut x0, &mut x1);
        std::mem::swap(&mut y0, &mut y1);
    }

    let dx = x1 - x0;
    let dy = (y1 - y0).abs();
    let y_step = if y1 > y0 { 1 } else { -1 };
    let mut error = 2 * dy - dx;
    let mut y = y0;
    let mut written = 0;

    for x in x0..=x1 {
        let (px, py) = if steep { (y, x) } else { (x, y) };
        if frame.contains(px, py) {
            frame.set_pixel(px, py, color);
            written += 1;
        }
        if error > 0 {
            y += y_step;
            error -= 2 * dx;
        }
        error += 2 * dy;
    }
    written
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(frame: &FrameBuffer) -> Vec<(i32, i32)> {
        let mut points = Vec::new();
        for y in 0..frame.height() as i32 {
            for x in 0..frame.width() as i32 {
                if frame.get_pixel(x, y) != FrameColor::BLACK {
                    points.push((x, y));
                }
            }
        }
        points
    }

    #[test]
    fn test_horizontal_and_vertical() {
        let mut frame = FrameBuffer::new(8, 8);
        draw_line(Vec2i::new(1, 2), Vec2i::new(5, 2), FrameColor::WHITE, &mut frame);
        assert_eq!(lit(&frame), vec![(1, 2), (2, 2), (3, 2), (4, 2), (5, 2)]);

        let mut frame = FrameBuffer::new(8, 8);
        draw_line(Vec2i::new(3, 6), Vec2i::new(3, 4), FrameColor::WHITE, &mut frame);
        assert_eq!(lit(&frame), vec![(3, 4), (3, 5), (3, 6)]);
    }

    #[test]
    fn test_diagonal_is_direction_independent() {
        let mut a = FrameBuffer::new(10, 10);
        let mut b = FrameBuffer::new(10, 10);
        draw_line(Vec2i::new(1, 1), Vec2i::new(8, 4), FrameColor::RED, &mut a);
        draw_line(Vec2i::new(8, 4), Vec2i::new(1, 1), FrameColor::RED, &mut b);
        let pa = lit(&a);
        assert_eq!(pa, lit(&b));
        // One pixel per column along the major axis
        assert_eq!(pa.len(), 8);
        assert!(pa.contains(&(1, 1)) && pa.contains(&(8, 4)));
    }

    #[test]
    fn test_steep_line_has_one_pixel_per_row() {
        let mut frame = FrameBuffer::new(10, 10);
        draw_line(Vec2i::new(2, 0), Vec2i::new(5, 9), FrameColor::GREEN, &mut frame);
        let points = lit(&frame);
        assert_eq!(points.len(), 10);
        for y in 0..10 {
            assert_eq!(points.iter().filter(|p| p.1 == y).count(), 1);
        }
    }

    #[test]
    fn test_line_is_clipped_to_buffer() {
        let mut frame = FrameBuffer::new(4, 4);
        let written = draw_line(Vec2i::new(-3, 1), Vec2i::new(10, 1), FrameColor::WHITE, &mut frame);
        assert_eq!(written, 4);
        assert_eq!(lit(&frame), vec![(0, 1), (1, 1), (2, 1), (3, 1)]);
    }
}
