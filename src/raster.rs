//! PNG backend: paints a figure's scene into an RGB image.

use image::{Rgb as Pixel, RgbImage};

use crate::colormap::Rgb;
use crate::figure::Figure;
use crate::scene::{Anchor, Shape};

/// 5x8 bitmap font, ASCII only
const FONT_5X8: [[u8; 8]; 128] = {
    let mut font = [[0u8; 8]; 128];
    font[b' ' as usize] = [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
    font[b'!' as usize] = [0x20, 0x20, 0x20, 0x20, 0x20, 0x00, 0x20, 0x00];
    font[b'"' as usize] = [0x50, 0x50, 0x50, 0x00, 0x00, 0x00, 0x00, 0x00];
    font[b'#' as usize] = [0x50, 0x50, 0xF8, 0x50, 0xF8, 0x50, 0x50, 0x00];
    font[b'$' as usize] = [0x20, 0x78, 0xA0, 0x70, 0x28, 0xF0, 0x20, 0x00];
    font[b'%' as usize] = [0xC0, 0xC8, 0x10, 0x20, 0x40, 0x98, 0x18, 0x00];
    font[b'&' as usize] = [0x40, 0xA0, 0xA0, 0x40, 0xA8, 0x90, 0x68, 0x00];
    font[b'\'' as usize] = [0x20, 0x20, 0x40, 0x00, 0x00, 0x00, 0x00, 0x00];
    font[b'(' as usize] = [0x10, 0x20, 0x40, 0x40, 0x40, 0x20, 0x10, 0x00];
    font[b')' as usize] = [0x40, 0x20, 0x10, 0x10, 0x10, 0x20, 0x40, 0x00];
    font[b'*' as usize] = [0x00, 0x20, 0xA8, 0x70, 0xA8, 0x20, 0x00, 0x00];
    font[b'+' as usize] = [0x00, 0x20, 0x20, 0xF8, 0x20, 0x20, 0x00, 0x00];
    font[b',' as usize] = [0x00, 0x00, 0x00, 0x00, 0x00, 0x20, 0x20, 0x40];
    font[b'-' as usize] = [0x00, 0x00, 0x00, 0xF8, 0x00, 0x00, 0x00, 0x00];
    font[b'.' as usize] = [0x00, 0x00, 0x00, 0x00, 0x00, 0x20, 0x20, 0x00];
    font[b'/' as usize] = [0x00, 0x08, 0x10, 0x20, 0x40, 0x80, 0x00, 0x00];
    font[b'0' as usize] = [0x70, 0x88, 0x98, 0xA8, 0xC8, 0x88, 0x70, 0x00];
    font[b'1' as usize] = [0x20, 0x60, 0x20, 0x20, 0x20, 0x20, 0x70, 0x00];
    font[b'2' as usize] = [0x70, 0x88, 0x08, 0x30, 0x40, 0x80, 0xF8, 0x00];
    font[b'3' as usize] = [0xF8, 0x10, 0x20, 0x10, 0x08, 0x88, 0x70, 0x00];
    font[b'4' as usize] = [0x10, 0x30, 0x50, 0x90, 0xF8, 0x10, 0x10, 0x00];
    font[b'5' as usize] = [0xF8, 0x80, 0xF0, 0x08, 0x08, 0x88, 0x70, 0x00];
    font[b'6' as usize] = [0x30, 0x40, 0x80, 0xF0, 0x88, 0x88, 0x70, 0x00];
    font[b'7' as usize] = [0xF8, 0x08, 0x10, 0x20, 0x40, 0x40, 0x40, 0x00];
    font[b'8' as usize] = [0x70, 0x88, 0x88, 0x70, 0x88, 0x88, 0x70, 0x00];
    font[b'9' as usize] = [0x70, 0x88, 0x88, 0x78, 0x08, 0x10, 0x60, 0x00];
    font[b':' as usize] = [0x00, 0x00, 0x20, 0x00, 0x00, 0x20, 0x00, 0x00];
    font[b';' as usize] = [0x00, 0x00, 0x20, 0x00, 0x00, 0x20, 0x20, 0x40];
    font[b'<' as usize] = [0x08, 0x10, 0x20, 0x40, 0x20, 0x10, 0x08, 0x00];
    font[b'=' as usize] = [0x00, 0x00, 0xF8, 0x00, 0xF8, 0x00, 0x00, 0x00];
    font[b'>' as usize] = [0x80, 0x40, 0x20, 0x10, 0x20, 0x40, 0x80, 0x00];
    font[b'?' as usize] = [0x70, 0x88, 0x08, 0x10, 0x20, 0x00, 0x20, 0x00];
    font[b'@' as usize] = [0x70, 0x88, 0xB8, 0xA8, 0xB8, 0x80, 0x70, 0x00];
    font[b'A' as usize] = [0x70, 0x88, 0x88, 0xF8, 0x88, 0x88, 0x88, 0x00];
    font[b'B' as usize] = [0xF0, 0x88, 0x88, 0xF0, 0x88, 0x88, 0xF0, 0x00];
    font[b'C' as usize] = [0x70, 0x88, 0x80, 0x80, 0x80, 0x88, 0x70, 0x00];
    font[b'D' as usize] = [0xE0, 0x90, 0x88, 0x88, 0x88, 0x90, 0xE0, 0x00];
    font[b'E' as usize] = [0xF8, 0x80, 0x80, 0xF0, 0x80, 0x80, 0xF8, 0x00];
    font[b'F' as usize] = [0xF8, 0x80, 0x80, 0xF0, 0x80, 0x80, 0x80, 0x00];
    font[b'G' as usize] = [0x70, 0x88, 0x80, 0xB8, 0x88, 0x88, 0x70, 0x00];
    font[b'H' as usize] = [0x88, 0x88, 0x88, 0xF8, 0x88, 0x88, 0x88, 0x00];
    font[b'I' as usize] = [0x70, 0x20, 0x20, 0x20, 0x20, 0x20, 0x70, 0x00];
    font[b'J' as usize] = [0x38, 0x10, 0x10, 0x10, 0x10, 0x90, 0x60, 0x00];
    font[b'K' as usize] = [0x88, 0x90, 0xA0, 0xC0, 0xA0, 0x90, 0x88, 0x00];
    font[b'L' as usize] = [0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0xF8, 0x00];
    font[b'M' as usize] = [0x88, 0xD8, 0xA8, 0xA8, 0x88, 0x88, 0x88, 0x00];
    font[b'N' as usize] = [0x88, 0xC8, 0xA8, 0x98, 0x88, 0x88, 0x88, 0x00];
    font[b'O' as usize] = [0x70, 0x88, 0x88, 0x88, 0x88, 0x88, 0x70, 0x00];
    font[b'P' as usize] = [0xF0, 0x88, 0x88, 0xF0, 0x80, 0x80, 0x80, 0x00];
    font[b'Q' as usize] = [0x70, 0x88, 0x88, 0x88, 0xA8, 0x90, 0x68, 0x00];
    font[b'R' as usize] = [0xF0, 0x88, 0x88, 0xF0, 0xA0, 0x90, 0x88, 0x00];
    font[b'S' as usize] = [0x70, 0x88, 0x80, 0x70, 0x08, 0x88, 0x70, 0x00];
    font[b'T' as usize] = [0xF8, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x00];
    font[b'U' as usize] = [0x88, 0x88, 0x88, 0x88, 0x88, 0x88, 0x70, 0x00];
    font[b'V' as usize] = [0x88, 0x88, 0x88, 0x88, 0x88, 0x50, 0x20, 0x00];
    font[b'W' as usize] = [0x88, 0x88, 0x88, 0xA8, 0xA8, 0xD8, 0x88, 0x00];
    font[b'X' as usize] = [0x88, 0x88, 0x50, 0x20, 0x50, 0x88, 0x88, 0x00];
    font[b'Y' as usize] = [0x88, 0x88, 0x50, 0x20, 0x20, 0x20, 0x20, 0x00];
    font[b'Z' as usize] = [0xF8, 0x08, 0x10, 0x20, 0x40, 0x80, 0xF8, 0x00];
    font[b'[' as usize] = [0x70, 0x40, 0x40, 0x40, 0x40, 0x40, 0x70, 0x00];
    font[b'\\' as usize] = [0x00, 0x80, 0x40, 0x20, 0x10, 0x08, 0x00, 0x00];
    font[b']' as usize] = [0x70, 0x10, 0x10, 0x10, 0x10, 0x10, 0x70, 0x00];
    font[b'^' as usize] = [0x20, 0x50, 0x88, 0x00, 0x00, 0x00, 0x00, 0x00];
    font[b'_' as usize] = [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xF8, 0x00];
    font[b'`' as usize] = [0x40, 0x20, 0x10, 0x00, 0x00, 0x00, 0x00, 0x00];
    font[b'a' as usize] = [0x00, 0x00, 0x70, 0x08, 0x78, 0x88, 0x78, 0x00];
    font[b'b' as usize] = [0x80, 0x80, 0xB0, 0xC8, 0x88, 0x88, 0xF0, 0x00];
    font[b'c' as usize] = [0x00, 0x00, 0x70, 0x80, 0x80, 0x88, 0x70, 0x00];
    font[b'd' as usize] = [0x08, 0x08, 0x68, 0x98, 0x88, 0x88, 0x78, 0x00];
    font[b'e' as usize] = [0x00, 0x00, 0x70, 0x88, 0xF8, 0x80, 0x70, 0x00];
    font[b'f' as usize] = [0x30, 0x48, 0x40, 0xE0, 0x40, 0x40, 0x40, 0x00];
    font[b'g' as usize] = [0x00, 0x00, 0x78, 0x88, 0x78, 0x08, 0x70, 0x00];
    font[b'h' as usize] = [0x80, 0x80, 0xB0, 0xC8, 0x88, 0x88, 0x88, 0x00];
    font[b'i' as usize] = [0x20, 0x00, 0x60, 0x20, 0x20, 0x20, 0x70, 0x00];
    font[b'j' as usize] = [0x10, 0x00, 0x30, 0x10, 0x10, 0x90, 0x60, 0x00];
    font[b'k' as usize] = [0x80, 0x80, 0x90, 0xA0, 0xC0, 0xA0, 0x90, 0x00];
    font[b'l' as usize] = [0x60, 0x20, 0x20, 0x20, 0x20, 0x20, 0x70, 0x00];
    font[b'm' as usize] = [0x00, 0x00, 0xD0, 0xA8, 0xA8, 0xA8, 0xA8, 0x00];
    font[b'n' as usize] = [0x00, 0x00, 0xB0, 0xC8, 0x88, 0x88, 0x88, 0x00];
    font[b'o' as usize] = [0x00, 0x00, 0x70, 0x88, 0x88, 0x88, 0x70, 0x00];
    font[b'p' as usize] = [0x00, 0x00, 0xF0, 0x88, 0xF0, 0x80, 0x80, 0x00];
    font[b'q' as usize] = [0x00, 0x00, 0x78, 0x88, 0x78, 0x08, 0x08, 0x00];
    font[b'r' as usize] = [0x00, 0x00, 0xB0, 0xC8, 0x80, 0x80, 0x80, 0x00];
    font[b's' as usize] = [0x00, 0x00, 0x70, 0x80, 0x70, 0x08, 0xF0, 0x00];
    font[b't' as usize] = [0x40, 0x40, 0xE0, 0x40, 0x40, 0x48, 0x30, 0x00];
    font[b'u' as usize] = [0x00, 0x00, 0x88, 0x88, 0x88, 0x98, 0x68, 0x00];
    font[b'v' as usize] = [0x00, 0x00, 0x88, 0x88, 0x88, 0x50, 0x20, 0x00];
    font[b'w' as usize] = [0x00, 0x00, 0x88, 0x88, 0xA8, 0xA8, 0x50, 0x00];
    font[b'x' as usize] = [0x00, 0x00, 0x88, 0x50, 0x20, 0x50, 0x88, 0x00];
    font[b'y' as usize] = [0x00, 0x00, 0x88, 0x88, 0x78, 0x08, 0x70, 0x00];
    font[b'z' as usize] = [0x00, 0x00, 0xF8, 0x10, 0x20, 0x40, 0xF8, 0x00];
    font[b'{' as usize] = [0x10, 0x20, 0x20, 0x40, 0x20, 0x20, 0x10, 0x00];
    font[b'|' as usize] = [0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x00];
    font[b'}' as usize] = [0x40, 0x20, 0x20, 0x10, 0x20, 0x20, 0x40, 0x00];
    font[b'~' as usize] = [0x00, 0x00, 0x40, 0xA8, 0x10, 0x00, 0x00, 0x00];
    font
};

/// Horizontal advance of one glyph, in font pixels.
const GLYPH_ADVANCE: u32 = 6;

/// Integer glyph magnification for a text size in pixels.
fn glyph_scale(size_px: f64) -> u32 {
    ((size_px / 8.0).round() as u32).max(1)
}

fn glyph(c: char) -> &'static [u8; 8] {
    let code = c as usize;
    if code < 128 {
        &FONT_5X8[code]
    } else {
        &FONT_5X8[b'?' as usize]
    }
}

/// Pixel width of `text` at `size_px` as painted by the bitmap font.
pub fn text_width(text: &str, size_px: f64) -> u32 {
    text.chars().count() as u32 * GLYPH_ADVANCE * glyph_scale(size_px)
}

/// Part of the segment inside `(xmin, ymin, xmax, ymax)`, or `None` if it misses.
fn clip_segment(
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
    (xmin, ymin, xmax, ymax): (f64, f64, f64, f64),
) -> Option<(f64, f64, f64, f64)> {
    let (dx, dy) = (x2 - x1, y2 - y1);
    let (mut t0, mut t1) = (0.0f64, 1.0f64);
    for (p, q) in [(-dx, x1 - xmin), (dx, xmax - x1), (-dy, y1 - ymin), (dy, ymax - y1)] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            t0 = t0.max(r);
        } else {
            t1 = t1.min(r);
        }
        if t0 > t1 {
            return None;
        }
    }
    Some((x1 + t0 * dx, y1 + t0 * dy, x1 + t1 * dx, y1 + t1 * dy))
}

struct Canvas {
    image: RgbImage,
    clip: (i64, i64, i64, i64),
}

impl Canvas {
    fn new(width: u32, height: u32) -> Self {
        Canvas {
            image: RgbImage::from_pixel(width, height, Pixel([255, 255, 255])),
            clip: (0, 0, width as i64, height as i64),
        }
    }

    fn set_clip(&mut self, x: f64, y: f64, w: f64, h: f64) {
        let (iw, ih) = (self.image.width() as i64, self.image.height() as i64);
        self.clip = (
            (x.floor() as i64).clamp(0, iw),
            (y.floor() as i64).clamp(0, ih),
            ((x + w).ceil() as i64 + 1).clamp(0, iw),
            ((y + h).ceil() as i64 + 1).clamp(0, ih),
        );
    }

    fn reset_clip(&mut self) {
        self.clip = (0, 0, self.image.width() as i64, self.image.height() as i64);
    }

    fn blend(&mut self, x: i64, y: i64, (r, g, b): Rgb, alpha: f64) {
        let (cx0, cy0, cx1, cy1) = self.clip;
        if x < cx0 || y < cy0 || x >= cx1 || y >= cy1 {
            return;
        }
        let px = self.image.get_pixel_mut(x as u32, y as u32);
        if alpha >= 1.0 {
            px.0 = [r, g, b];
            return;
        }
        let a = alpha.max(0.0);
        let mix = |dst: u8, src: u8| (dst as f64 * (1.0 - a) + src as f64 * a).round() as u8;
        px.0 = [mix(px.0[0], r), mix(px.0[1], g), mix(px.0[2], b)];
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Rgb, alpha: f64) {
        let (cx0, cy0, cx1, cy1) = self.clip;
        let x0 = x.round() as i64;
        let y0 = y.round() as i64;
        let x1 = ((x + w).round() as i64).max(x0.saturating_add(1));
        let y1 = ((y + h).round() as i64).max(y0.saturating_add(1));
        for py in y0.max(cy0)..y1.min(cy1) {
            for px in x0.max(cx0)..x1.min(cx1) {
                self.blend(px, py, color, alpha);
            }
        }
    }

    fn fill_circle(&mut self, cx: f64, cy: f64, r: f64, color: Rgb, alpha: f64) {
        let (clip_x0, clip_y0, clip_x1, clip_y1) = self.clip;
        let r2 = r * r;
        let (x0, x1) = ((cx - r).floor() as i64, (cx + r).ceil() as i64);
        let (y0, y1) = ((cy - r).floor() as i64, (cy + r).ceil() as i64);
        for py in y0.max(clip_y0)..y1.saturating_add(1).min(clip_y1) {
            for px in x0.max(clip_x0)..x1.saturating_add(1).min(clip_x1) {
                let dx = px as f64 + 0.5 - cx;
                let dy = py as f64 + 0.5 - cy;
                if dx * dx + dy * dy <= r2 {
                    self.blend(px, py, color, alpha);
                }
            }
        }
    }

    /// Thick line drawn by stamping squares along its length.
    fn draw_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, color: Rgb, width: f64, alpha: f64) {
        let half = ((width - 1.0) / 2.0).max(0.0).round() as i64;
        let (cx0, cy0, cx1, cy1) = self.clip;
        let pad = (half + 1) as f64;
        let bounds = (cx0 as f64 - pad, cy0 as f64 - pad, cx1 as f64 + pad, cy1 as f64 + pad);
        let Some((x1, y1, x2, y2)) = clip_segment(x1, y1, x2, y2, bounds) else {
            return;
        };
        let len = ((x2 - x1).powi(2) + (y2 - y1).powi(2)).sqrt();
        let steps = (len * 2.0).ceil().max(1.0) as i64;
        let mut last: Option<(i64, i64)> = None;
        for i in 0..=steps {
            let t = i as f64 / steps as f64;
            let x = (x1 + (x2 - x1) * t).round() as i64;
            let y = (y1 + (y2 - y1) * t).round() as i64;
            if last == Some((x, y)) {
                continue;
            }
            last = Some((x, y));
            for oy in -half..=half {
                for ox in -half..=half {
                    self.blend(x + ox, y + oy, color, alpha);
                }
            }
        }
    }

    /// Even-odd scanline fill.
    fn fill_polygon(&mut self, points: &[(f64, f64)], color: Rgb, alpha: f64) {
        if points.len() < 3 {
            return;
        }
        let (cx0, cy0, cx1, cy1) = self.clip;
        let ymin = points.iter().map(|p| p.1).fold(f64::INFINITY, f64::min).floor() as i64;
        let ymax = points.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max).ceil() as i64;
        for py in ymin.max(cy0)..ymax.saturating_add(1).min(cy1) {
            let sy = py as f64 + 0.5;
            let mut crossings = Vec::new();
            for i in 0..points.len() {
                let (ax, ay) = points[i];
                let (bx, by) = points[(i + 1) % points.len()];
                if (ay <= sy && by > sy) || (by <= sy && ay > sy) {
                    crossings.push(ax + (sy - ay) / (by - ay) * (bx - ax));
                }
            }
            crossings.sort_by(|a, b| a.total_cmp(b));
            for pair in crossings.chunks(2) {
                if let [a, b] = pair {
                    for px in (a.round() as i64).max(cx0)..(b.round() as i64).min(cx1) {
                        self.blend(px, py, color, alpha);
                    }
                }
            }
        }
    }

    /// One glyph, optionally rotated a quarter turn counter-clockwise.
    fn write_char(&mut self, base_x: i64, base_y: i64, c: char, scale: u32, color: Rgb, vertical: bool) {
        let data = glyph(c);
        let s = scale as i64;
        for j in 0..8i64 {
            let row = data[j as usize];
            for z in 0..8i64 {
                if (row >> (7 - z)) & 1 == 0 {
                    continue;
                }
                let (gx, gy) = if vertical { (j, 7 - z) } else { (z, j) };
                for ry in 0..s {
                    for rx in 0..s {
                        self.blend(base_x + gx * s + rx, base_y + gy * s + ry, color, 1.0);
                    }
                }
            }
        }
    }

    fn draw_text(&mut self, x: f64, y: f64, text: &str, size: f64, color: Rgb, anchor: Anchor, vertical: bool) {
        let scale = glyph_scale(size);
        let extent = text_width(text, size) as f64;
        let offset = match anchor {
            Anchor::Start => 0.0,
            Anchor::Middle => extent / 2.0,
            Anchor::End => extent,
        };
        let advance = (GLYPH_ADVANCE * scale) as i64;
        let glyph_h = (8 * scale) as f64;

        if vertical {
            // reads bottom to top, centered on x
            let left = (x - glyph_h / 2.0).round() as i64;
            let start = (y + offset).round() as i64;
            for (i, c) in text.chars().enumerate() {
                let top = start - (i as i64 + 1) * advance;
                self.write_char(left, top, c, scale, color, true);
            }
        } else {
            let left = (x - offset).round() as i64;
            let top = (y - glyph_h / 2.0).round() as i64;
            for (i, c) in text.chars().enumerate() {
                self.write_char(left + i as i64 * advance, top, c, scale, color, false);
            }
        }
    }

    fn paint(&mut self, shape: &Shape) {
        match shape {
            Shape::Rect {
                x,
                y,
                w,
                h,
                fill,
                alpha,
            } => self.fill_rect(*x, *y, *w, *h, *fill, *alpha),
            Shape::Line {
                x1,
                y1,
                x2,
                y2,
                color,
                width,
                alpha,
            } => self.draw_line(*x1, *y1, *x2, *y2, *color, *width, *alpha),
            Shape::Circle {
                cx,
                cy,
                r,
                fill,
                alpha,
            } => self.fill_circle(*cx, *cy, *r, *fill, *alpha),
            Shape::Polygon {
                points,
                fill,
                alpha,
            } => self.fill_polygon(points, *fill, *alpha),
            Shape::Text {
                x,
                y,
                text,
                size,
                color,
                anchor,
                vertical,
            } => self.draw_text(*x, *y, text, *size, *color, *anchor, *vertical),
        }
    }
}

impl Figure {
    /// Rasterize the figure.
    pub fn render_rgb(&self) -> RgbImage {
        let scene = self.scene();
        let mut canvas = Canvas::new(scene.width, scene.height);

        // background first, then clipped data, then axes decorations on top
        let (background, decorations) = scene.chrome.split_at(1.min(scene.chrome.len()));
        for shape in background {
            canvas.paint(shape);
        }
        let f = scene.frame;
        canvas.set_clip(f.x0, f.y0, f.w, f.h);
        for shape in &scene.data {
            canvas.paint(shape);
        }
        canvas.reset_clip();
        for shape in decorations {
            canvas.paint(shape);
        }
        canvas.image
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::figure::Artist;
    use crate::layout::Point;
    use std::time::{Duration, Instant};

    #[test]
    fn glyphs_fall_back_for_non_ascii() {
        assert_eq!(glyph('é'), &FONT_5X8[b'?' as usize]);
        assert_eq!(text_width("abc", 8.0), 18);
        assert_eq!(text_width("abc", 16.0), 36);
    }

    #[test]
    fn image_has_figure_size() {
        let fig = Figure::new((3.0, 2.0));
        let img = fig.render_rgb();
        assert_eq!(img.dimensions(), (300, 200));
    }

    #[test]
    fn bar_pixels_take_bar_color() {
        let mut fig = Figure::new((4.0, 3.0));
        fig.axes_mut().bar(&[1.0], (255, 165, 0));
        let frame = fig.frame();
        let (x, y) = frame.px(Point::new(0.0, 0.5));
        let img = fig.render_rgb();
        assert_eq!(img.get_pixel(x as u32, y as u32).0, [255, 165, 0]);
    }

    #[test]
    fn markers_are_clipped_to_the_frame() {
        let mut fig = Figure::new((4.0, 3.0));
        let ax = fig.axes_mut();
        ax.set_xlim(0.0, 1.0);
        ax.set_ylim(0.0, 1.0);
        ax.spines_mut().set_all(false);
        ax.add_artist(Artist::Marker {
            at: Point::new(-0.02, 0.5),
            radius: 10.0,
            color: (255, 0, 0),
            alpha: 1.0,
        });
        let frame = fig.frame();
        let (_, cy) = frame.px(Point::new(0.0, 0.5));
        let img = fig.render_rgb();
        let left = frame.x0 as u32;
        assert_eq!(img.get_pixel(left + 2, cy as u32).0, [255, 0, 0]);
        assert_eq!(img.get_pixel(left - 2, cy as u32).0, [255, 255, 255]);
    }

    #[test]
    fn off_screen_extent_does_not_cost_time() {
        let mut fig = Figure::new((4.0, 3.0));
        let ax = fig.axes_mut();
        ax.bar(&[1.0e6], (255, 165, 0));
        ax.add_artist(Artist::Line {
            from: Point::new(0.0, -1.0e7),
            to: Point::new(0.0, 1.0e7),
            color: (0, 0, 255),
            width: 3.0,
            alpha: 1.0,
            arrow: false,
            shrink: 0.0,
        });
        ax.set_ylim(0.0, 1.0);

        let start = Instant::now();
        let img = fig.render_rgb();
        assert!(start.elapsed() < Duration::from_secs(2));

        let frame = fig.frame();
        let (x, y) = frame.px(Point::new(0.3, 0.5));
        assert_eq!(img.get_pixel(x as u32, y as u32).0, [255, 165, 0]);
        let (x, y) = frame.px(Point::new(0.0, 0.5));
        assert_eq!(img.get_pixel(x as u32, y as u32).0, [0, 0, 255]);
    }

    #[test]
    fn segments_are_cut_to_the_box() {
        let bounds = (0.0, 0.0, 10.0, 10.0);
        assert_eq!(
            clip_segment(5.0, -10.0, 5.0, 30.0, bounds),
            Some((5.0, 0.0, 5.0, 10.0))
        );
        assert_eq!(
            clip_segment(2.0, 3.0, 4.0, 5.0, bounds),
            Some((2.0, 3.0, 4.0, 5.0))
        );
        assert_eq!(clip_segment(-5.0, -1.0, 20.0, -1.0, bounds), None);
        assert_eq!(clip_segment(20.0, 0.0, 30.0, 10.0, bounds), None);
    }

    #[test]
    fn half_alpha_blends_with_white() {
        let mut canvas = Canvas::new(2, 2);
        canvas.blend(0, 0, (0, 0, 0), 0.5);
        assert_eq!(canvas.image.get_pixel(0, 0).0, [128, 128, 128]);
        canvas.blend(5, 5, (0, 0, 0), 1.0);
    }
}
