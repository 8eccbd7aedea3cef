//! Resolve a figure into pixel-space shapes shared by the PNG and SVG backends.

use crate::colormap::Rgb;
use crate::figure::{pt_to_px, Artist, Axes, Figure};
use crate::layout::Point;

const MARGIN_LEFT: f64 = 80.0;
const MARGIN_RIGHT: f64 = 30.0;
const MARGIN_TOP: f64 = 50.0;
const MARGIN_BOTTOM: f64 = 70.0;
const COLORBAR_SPACE: f64 = 110.0;
const COLORBAR_WIDTH: f64 = 20.0;
const COLORBAR_SLICES: usize = 128;
const TICK_LEN: f64 = 5.0;
const TICK_FONT_PT: f64 = 10.0;

const BLACK: Rgb = (0, 0, 0);
const WHITE: Rgb = (255, 255, 255);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Start,
    Middle,
    End,
}

/// A primitive in pixel coordinates (origin top-left, y down).
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Rect {
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        fill: Rgb,
        alpha: f64,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        color: Rgb,
        width: f64,
        alpha: f64,
    },
    Circle {
        cx: f64,
        cy: f64,
        r: f64,
        fill: Rgb,
        alpha: f64,
    },
    Polygon {
        points: Vec<(f64, f64)>,
        fill: Rgb,
        alpha: f64,
    },
    /// Text vertically centered on `y`; `vertical` text reads bottom to top.
    Text {
        x: f64,
        y: f64,
        text: String,
        size: f64,
        color: Rgb,
        anchor: Anchor,
        vertical: bool,
    },
}

/// Plot area in pixels and the data range it shows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub x0: f64,
    pub y0: f64,
    pub w: f64,
    pub h: f64,
    pub xlim: (f64, f64),
    pub ylim: (f64, f64),
}

impl Frame {
    /// Data point to pixel position.
    pub fn px(&self, p: Point) -> (f64, f64) {
        let fx = (p.x - self.xlim.0) / (self.xlim.1 - self.xlim.0);
        let fy = (p.y - self.ylim.0) / (self.ylim.1 - self.ylim.0);
        (self.x0 + fx * self.w, self.y0 + (1.0 - fy) * self.h)
    }
}

/// Everything needed to paint a figure. `data` is clipped to `frame`, `chrome` is not.
#[derive(Debug, Clone)]
pub struct Scene {
    pub width: u32,
    pub height: u32,
    pub frame: Frame,
    pub data: Vec<Shape>,
    pub chrome: Vec<Shape>,
}

/// Roughly five ticks at 1, 2 or 5 times a power of ten.
fn nice_ticks(lo: f64, hi: f64) -> Vec<f64> {
    let span = hi - lo;
    if !(span > 0.0) || !span.is_finite() {
        return Vec::new();
    }
    let raw = span / 5.0;
    let mag = 10f64.powf(raw.log10().floor());
    let step = [1.0, 2.0, 5.0, 10.0]
        .iter()
        .map(|m| m * mag)
        .find(|s| *s >= raw * (1.0 - 1e-9))
        .unwrap_or(10.0 * mag);
    let first = (lo / step - 1e-9).ceil() as i64;
    let last = (hi / step + 1e-9).floor() as i64;
    (first..=last).map(|i| i as f64 * step).collect()
}

/// Fewest decimals that show `step` exactly (up to 6).
fn tick_decimals(ticks: &[f64]) -> usize {
    let step = ticks
        .windows(2)
        .map(|w| (w[1] - w[0]).abs())
        .filter(|d| *d > 0.0)
        .fold(f64::INFINITY, f64::min);
    if !step.is_finite() {
        return 1;
    }
    (0..6)
        .find(|&d| {
            let scaled = step * 10f64.powi(d as i32);
            (scaled - scaled.round()).abs() < 1e-6
        })
        .unwrap_or(6)
}

pub fn format_tick(value: f64, decimals: usize) -> String {
    let s = format!("{:.*}", decimals, value);
    // avoid "-0.0"
    if s.starts_with('-') && s[1..].chars().all(|c| c == '0' || c == '.') {
        s[1..].to_string()
    } else {
        s
    }
}

fn within(v: f64, range: (f64, f64)) -> bool {
    let (lo, hi) = if range.0 <= range.1 { range } else { (range.1, range.0) };
    let eps = (hi - lo) * 1e-9;
    v >= lo - eps && v <= hi + eps
}

fn data_shapes(axes: &Axes, frame: &Frame) -> Vec<Shape> {
    let mut shapes = Vec::with_capacity(axes.artists().len());
    for artist in axes.artists() {
        match artist {
            Artist::Bar {
                x,
                width,
                height,
                color,
            } => {
                if !height.is_finite() || !x.is_finite() {
                    continue;
                }
                let (ax, ay) = frame.px(Point::new(x - width / 2.0, 0.0));
                let (bx, by) = frame.px(Point::new(x + width / 2.0, *height));
                shapes.push(Shape::Rect {
                    x: ax.min(bx),
                    y: ay.min(by),
                    w: (bx - ax).abs(),
                    h: (by - ay).abs(),
                    fill: *color,
                    alpha: 1.0,
                });
            }
            Artist::Line {
                from,
                to,
                color,
                width,
                alpha,
                arrow,
                shrink,
            } => {
                let (x1, y1) = frame.px(*from);
                let (x2, y2) = frame.px(*to);
                if ![x1, y1, x2, y2].iter().all(|v| v.is_finite()) {
                    continue;
                }
                if !arrow {
                    shapes.push(Shape::Line {
                        x1,
                        y1,
                        x2,
                        y2,
                        color: *color,
                        width: *width,
                        alpha: *alpha,
                    });
                    continue;
                }
                let (dx, dy) = (x2 - x1, y2 - y1);
                let len = (dx * dx + dy * dy).sqrt();
                if len <= *shrink {
                    continue;
                }
                let (ux, uy) = (dx / len, dy / len);
                let head = 6.0 + 3.0 * width;
                let (tx, ty) = (x2 - ux * shrink, y2 - uy * shrink);
                let (bx, by) = (tx - ux * head, ty - uy * head);
                let (px, py) = (-uy * head * 0.5, ux * head * 0.5);
                shapes.push(Shape::Line {
                    x1,
                    y1,
                    x2: bx,
                    y2: by,
                    color: *color,
                    width: *width,
                    alpha: *alpha,
                });
                shapes.push(Shape::Polygon {
                    points: vec![(tx, ty), (bx + px, by + py), (bx - px, by - py)],
                    fill: *color,
                    alpha: *alpha,
                });
            }
            Artist::Marker {
                at,
                radius,
                color,
                alpha,
            } => {
                let (cx, cy) = frame.px(*at);
                if cx.is_finite() && cy.is_finite() {
                    shapes.push(Shape::Circle {
                        cx,
                        cy,
                        r: *radius,
                        fill: *color,
                        alpha: *alpha,
                    });
                }
            }
            Artist::Text {
                at,
                text,
                size,
                color,
            } => {
                let (x, y) = frame.px(*at);
                if x.is_finite() && y.is_finite() {
                    shapes.push(Shape::Text {
                        x,
                        y,
                        text: text.clone(),
                        size: pt_to_px(*size),
                        color: *color,
                        anchor: Anchor::Middle,
                        vertical: false,
                    });
                }
            }
        }
    }
    shapes
}

fn text(x: f64, y: f64, s: &str, size_pt: f64, anchor: Anchor, vertical: bool) -> Shape {
    Shape::Text {
        x,
        y,
        text: s.to_string(),
        size: pt_to_px(size_pt),
        color: BLACK,
        anchor,
        vertical,
    }
}

fn line(x1: f64, y1: f64, x2: f64, y2: f64) -> Shape {
    Shape::Line {
        x1,
        y1,
        x2,
        y2,
        color: BLACK,
        width: 1.0,
        alpha: 1.0,
    }
}

fn axis_chrome(axes: &Axes, f: &Frame) -> Vec<Shape> {
    let mut shapes = Vec::new();
    let (left, top, right, bottom) = (f.x0, f.y0, f.x0 + f.w, f.y0 + f.h);
    let spines = axes.spines();

    if spines.left {
        shapes.push(line(left, top, left, bottom));
    }
    if spines.right {
        shapes.push(line(right, top, right, bottom));
    }
    if spines.top {
        shapes.push(line(left, top, right, top));
    }
    if spines.bottom {
        shapes.push(line(left, bottom, right, bottom));
    }

    if spines.bottom {
        let ticks = match axes.xticks() {
            Some(t) => t.to_vec(),
            None => nice_ticks(f.xlim.0, f.xlim.1),
        };
        let decimals = tick_decimals(&ticks);
        for t in ticks.into_iter().filter(|t| within(*t, f.xlim)) {
            let (x, _) = f.px(Point::new(t, f.ylim.0));
            shapes.push(line(x, bottom, x, bottom + TICK_LEN));
            shapes.push(text(
                x,
                bottom + TICK_LEN + 10.0,
                &format_tick(t, decimals),
                TICK_FONT_PT,
                Anchor::Middle,
                false,
            ));
        }
    }

    if spines.left {
        let ticks = match axes.yticks() {
            Some(t) => t.to_vec(),
            None => nice_ticks(f.ylim.0, f.ylim.1),
        };
        let decimals = tick_decimals(&ticks);
        for t in ticks.into_iter().filter(|t| within(*t, f.ylim)) {
            let (_, y) = f.px(Point::new(f.xlim.0, t));
            shapes.push(line(left - TICK_LEN, y, left, y));
            shapes.push(text(
                left - TICK_LEN - 3.0,
                y,
                &format_tick(t, decimals),
                TICK_FONT_PT,
                Anchor::End,
                false,
            ));
        }
    }

    if let Some(title) = axes.title() {
        shapes.push(text(left + f.w / 2.0, top - 20.0, &title.text, title.size, Anchor::Middle, false));
    }
    if let Some(label) = axes.xlabel() {
        shapes.push(text(left + f.w / 2.0, bottom + 45.0, &label.text, label.size, Anchor::Middle, false));
    }
    if let Some(label) = axes.ylabel() {
        shapes.push(text(left - 60.0, top + f.h / 2.0, &label.text, label.size, Anchor::Middle, true));
    }
    shapes
}

impl Figure {
    /// Plot area and visible data range.
    pub fn frame(&self) -> Frame {
        let right = if self.colorbar().is_some() {
            MARGIN_RIGHT + COLORBAR_SPACE
        } else {
            MARGIN_RIGHT
        };
        let w = (self.width() as f64 - MARGIN_LEFT - right).max(1.0);
        let h = (self.height() as f64 - MARGIN_TOP - MARGIN_BOTTOM).max(1.0);
        let (xlim, ylim) = self.axes().view_limits(w, h);
        Frame {
            x0: MARGIN_LEFT,
            y0: MARGIN_TOP,
            w,
            h,
            xlim,
            ylim,
        }
    }

    pub fn scene(&self) -> Scene {
        let frame = self.frame();
        let data = data_shapes(self.axes(), &frame);

        let mut chrome = vec![Shape::Rect {
            x: 0.0,
            y: 0.0,
            w: self.width() as f64,
            h: self.height() as f64,
            fill: WHITE,
            alpha: 1.0,
        }];
        chrome.extend(axis_chrome(self.axes(), &frame));

        if let Some(cb) = self.colorbar() {
            let x = frame.x0 + frame.w + 30.0;
            let slice_h = frame.h / COLORBAR_SLICES as f64;
            for i in 0..COLORBAR_SLICES {
                let t = (i as f64 + 0.5) / COLORBAR_SLICES as f64;
                chrome.push(Shape::Rect {
                    x,
                    y: frame.y0 + frame.h - (i + 1) as f64 * slice_h,
                    w: COLORBAR_WIDTH,
                    h: slice_h,
                    fill: cb.cmap.at(t),
                    alpha: 1.0,
                });
            }
            let (right, bottom) = (x + COLORBAR_WIDTH, frame.y0 + frame.h);
            chrome.push(line(x, frame.y0, right, frame.y0));
            chrome.push(line(x, bottom, right, bottom));
            chrome.push(line(x, frame.y0, x, bottom));
            chrome.push(line(right, frame.y0, right, bottom));

            let ticks: Vec<f64> = (0..5)
                .map(|i| cb.norm.vmin + (cb.norm.vmax - cb.norm.vmin) * i as f64 / 4.0)
                .collect();
            let decimals = tick_decimals(&ticks).min(3);
            for (i, t) in ticks.iter().enumerate() {
                let y = bottom - frame.h * i as f64 / 4.0;
                chrome.push(line(right, y, right + TICK_LEN, y));
                chrome.push(text(
                    right + TICK_LEN + 3.0,
                    y,
                    &format_tick(*t, decimals),
                    TICK_FONT_PT,
                    Anchor::Start,
                    false,
                ));
            }
        }

        Scene {
            width: self.width(),
            height: self.height(),
            frame,
            data,
            chrome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colormap::{Colormap, Normalize};

    #[test]
    fn nice_ticks_cover_unit_range() {
        let ticks = nice_ticks(0.0, 1.0);
        assert_eq!(ticks.len(), 6);
        assert_eq!(ticks[0], 0.0);
        assert!((ticks[5] - 1.0).abs() < 1e-12);
        assert!(nice_ticks(1.0, 1.0).is_empty());
    }

    #[test]
    fn tick_labels_use_step_precision() {
        let fine: Vec<f64> = (0..=20).map(|i| i as f64 * 0.05).collect();
        assert_eq!(tick_decimals(&fine), 2);
        let coarse: Vec<f64> = (0..=10).map(|i| i as f64 * 0.1).collect();
        assert_eq!(tick_decimals(&coarse), 1);
        assert_eq!(format_tick(0.30000000000000004, 1), "0.3");
        assert_eq!(format_tick(-0.0001, 2), "0.00");
    }

    #[test]
    fn frame_maps_corners() {
        let mut fig = Figure::new((4.0, 3.0));
        fig.axes_mut().set_xlim(0.0, 1.0);
        fig.axes_mut().set_ylim(0.0, 1.0);
        let f = fig.frame();
        assert_eq!(f.px(Point::new(0.0, 0.0)), (f.x0, f.y0 + f.h));
        assert_eq!(f.px(Point::new(1.0, 1.0)), (f.x0 + f.w, f.y0));
    }

    #[test]
    fn bars_become_rects() {
        let mut fig = Figure::new((4.0, 3.0));
        fig.axes_mut().bar(&[1.0, 2.0, 3.0], (255, 165, 0));
        let scene = fig.scene();
        let rects = scene
            .data
            .iter()
            .filter(|s| matches!(s, Shape::Rect { .. }))
            .count();
        assert_eq!(rects, 3);
    }

    #[test]
    fn colorbar_narrows_plot_area() {
        let mut fig = Figure::new((4.0, 3.0));
        let plain = fig.frame().w;
        fig.add_colorbar(Colormap::by_name("YlOrRd").unwrap(), Normalize::new(0.0, 1.0));
        assert_eq!(fig.frame().w, plain - COLORBAR_SPACE);
    }

    #[test]
    fn hidden_spines_draw_no_ticks() {
        let mut fig = Figure::new((4.0, 3.0));
        fig.axes_mut().spines_mut().set_all(false);
        let scene = fig.scene();
        // only the background remains
        assert_eq!(scene.chrome.len(), 1);
    }
}
