//! Figure / axes model. Renderers record artists in data coordinates; the
//! pixel mapping is resolved only when a figure is rendered or saved.

use log::info;
use std::path::Path;

use crate::colormap::{Colormap, Normalize, Rgb};
use crate::error::Result;
use crate::layout::Point;

/// Pixels per inch of figure size.
pub const DPI: f64 = 100.0;

/// Default figure size in inches.
pub const DEFAULT_FIGSIZE: (f64, f64) = (6.4, 4.8);

/// Points to pixels
pub fn pt_to_px(pt: f64) -> f64 {
    pt * DPI / 72.0
}

/// Something drawn inside the axes, in data coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum Artist {
    Bar {
        x: f64,
        width: f64,
        height: f64,
        color: Rgb,
    },
    Line {
        from: Point,
        to: Point,
        color: Rgb,
        width: f64,
        alpha: f64,
        /// Draw an arrowhead at `to`, pulled back by `shrink` pixels.
        arrow: bool,
        shrink: f64,
    },
    /// Filled circle with a pixel radius.
    Marker {
        at: Point,
        radius: f64,
        color: Rgb,
        alpha: f64,
    },
    Text {
        at: Point,
        text: String,
        size: f64,
        color: Rgb,
    },
}

impl Artist {
    /// Data-space extent as (xmin, xmax, ymin, ymax).
    fn extent(&self) -> (f64, f64, f64, f64) {
        match self {
            Artist::Bar {
                x, width, height, ..
            } => (
                x - width / 2.0,
                x + width / 2.0,
                height.min(0.0),
                height.max(0.0),
            ),
            Artist::Line { from, to, .. } => (
                from.x.min(to.x),
                from.x.max(to.x),
                from.y.min(to.y),
                from.y.max(to.y),
            ),
            Artist::Marker { at, .. } | Artist::Text { at, .. } => (at.x, at.x, at.y, at.y),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Spines {
    pub left: bool,
    pub bottom: bool,
    pub top: bool,
    pub right: bool,
}

impl Spines {
    pub fn set_all(&mut self, visible: bool) {
        self.left = visible;
        self.bottom = visible;
        self.top = visible;
        self.right = visible;
    }
}

impl Default for Spines {
    fn default() -> Self {
        Spines {
            left: true,
            bottom: true,
            top: true,
            right: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub text: String,
    /// Font size in points
    pub size: f64,
}

/// A single plotting area.
#[derive(Debug, Clone)]
pub struct Axes {
    artists: Vec<Artist>,
    title: Option<Label>,
    xlabel: Option<Label>,
    ylabel: Option<Label>,
    xticks: Option<Vec<f64>>,
    yticks: Option<Vec<f64>>,
    xlim: Option<(f64, f64)>,
    ylim: Option<(f64, f64)>,
    autoscale: bool,
    aspect_equal: bool,
    spines: Spines,
}

impl Default for Axes {
    fn default() -> Self {
        Axes {
            artists: Vec::new(),
            title: None,
            xlabel: None,
            ylabel: None,
            xticks: None,
            yticks: None,
            xlim: None,
            ylim: None,
            autoscale: true,
            aspect_equal: false,
            spines: Spines::default(),
        }
    }
}

/// Pad a data range by 5% on each side; a zero-width range becomes one unit wide.
fn with_margin(lo: f64, hi: f64) -> (f64, f64) {
    let span = hi - lo;
    if span <= 0.0 {
        (lo - 0.5, hi + 0.5)
    } else {
        (lo - 0.05 * span, hi + 0.05 * span)
    }
}

fn cover_ticks(range: (f64, f64), ticks: Option<&Vec<f64>>) -> (f64, f64) {
    let mut range = range;
    for &t in ticks.into_iter().flatten() {
        range.0 = range.0.min(t);
        range.1 = range.1.max(t);
    }
    range
}

impl Axes {
    /// One bar per value at x = 0, 1, 2, ...
    pub fn bar(&mut self, heights: &[f64], color: Rgb) {
        for (i, &h) in heights.iter().enumerate() {
            self.artists.push(Artist::Bar {
                x: i as f64,
                width: 0.8,
                height: h,
                color,
            });
        }
    }

    pub fn add_artist(&mut self, artist: Artist) {
        self.artists.push(artist);
    }

    pub fn artists(&self) -> &[Artist] {
        &self.artists
    }

    /// Heights of all bars, in drawing order.
    pub fn bars(&self) -> Vec<f64> {
        self.artists
            .iter()
            .filter_map(|a| match a {
                Artist::Bar { height, .. } => Some(*height),
                _ => None,
            })
            .collect()
    }

    /// Marker positions and colors, in drawing order.
    pub fn markers(&self) -> Vec<(Point, Rgb)> {
        self.artists
            .iter()
            .filter_map(|a| match a {
                Artist::Marker { at, color, .. } => Some((*at, *color)),
                _ => None,
            })
            .collect()
    }

    pub fn lines(&self) -> usize {
        self.artists
            .iter()
            .filter(|a| matches!(a, Artist::Line { .. }))
            .count()
    }

    pub fn set_title(&mut self, text: &str) {
        self.title = Some(Label {
            text: text.to_string(),
            size: 12.0,
        });
    }

    pub fn title(&self) -> Option<&Label> {
        self.title.as_ref()
    }

    pub fn set_xlabel(&mut self, text: &str, size: f64) {
        self.xlabel = Some(Label {
            text: text.to_string(),
            size,
        });
    }

    pub fn xlabel(&self) -> Option<&Label> {
        self.xlabel.as_ref()
    }

    pub fn set_ylabel(&mut self, text: &str, size: f64) {
        self.ylabel = Some(Label {
            text: text.to_string(),
            size,
        });
    }

    pub fn ylabel(&self) -> Option<&Label> {
        self.ylabel.as_ref()
    }

    pub fn set_xticks(&mut self, ticks: Vec<f64>) {
        self.xticks = Some(ticks);
    }

    pub fn xticks(&self) -> Option<&[f64]> {
        self.xticks.as_deref()
    }

    pub fn set_yticks(&mut self, ticks: Vec<f64>) {
        self.yticks = Some(ticks);
    }

    pub fn yticks(&self) -> Option<&[f64]> {
        self.yticks.as_deref()
    }

    pub fn set_xlim(&mut self, lo: f64, hi: f64) {
        self.xlim = Some((lo, hi));
    }

    pub fn set_ylim(&mut self, lo: f64, hi: f64) {
        self.ylim = Some((lo, hi));
    }

    pub fn autoscale(&mut self, enable: bool) {
        self.autoscale = enable;
    }

    pub fn is_autoscale(&self) -> bool {
        self.autoscale
    }

    pub fn set_aspect_equal(&mut self, equal: bool) {
        self.aspect_equal = equal;
    }

    pub fn is_aspect_equal(&self) -> bool {
        self.aspect_equal
    }

    pub fn spines(&self) -> &Spines {
        &self.spines
    }

    pub fn spines_mut(&mut self) -> &mut Spines {
        &mut self.spines
    }

    /// Bounding box of all finite artist extents as (xmin, xmax, ymin, ymax).
    pub fn data_bounds(&self) -> Option<(f64, f64, f64, f64)> {
        let mut bounds: Option<(f64, f64, f64, f64)> = None;
        for artist in &self.artists {
            let (x0, x1, y0, y1) = artist.extent();
            if ![x0, x1, y0, y1].iter().all(|v| v.is_finite()) {
                continue;
            }
            bounds = Some(match bounds {
                None => (x0, x1, y0, y1),
                Some((a, b, c, d)) => (a.min(x0), b.max(x1), c.min(y0), d.max(y1)),
            });
        }
        bounds
    }

    /// Visible data range on each axis for a plot area of `w` x `h` pixels.
    pub fn view_limits(&self, w: f64, h: f64) -> ((f64, f64), (f64, f64)) {
        let bounds = self.data_bounds();
        let resolve = |lim: Option<(f64, f64)>, ticks: Option<&Vec<f64>>, data: Option<(f64, f64)>| {
            if let Some(lim) = lim {
                return lim;
            }
            match (self.autoscale, data) {
                (true, Some((lo, hi))) => cover_ticks(with_margin(lo, hi), ticks),
                _ => match ticks {
                    Some(t) if !t.is_empty() => cover_ticks((f64::INFINITY, f64::NEG_INFINITY), Some(t)),
                    _ => (0.0, 1.0),
                },
            }
        };
        let mut xr = resolve(self.xlim, self.xticks.as_ref(), bounds.map(|b| (b.0, b.1)));
        let mut yr = resolve(self.ylim, self.yticks.as_ref(), bounds.map(|b| (b.2, b.3)));
        if xr.1 <= xr.0 {
            xr = with_margin(xr.0, xr.0);
        }
        if yr.1 <= yr.0 {
            yr = with_margin(yr.0, yr.0);
        }

        if self.aspect_equal && w > 0.0 && h > 0.0 {
            let ux = (xr.1 - xr.0) / w;
            let uy = (yr.1 - yr.0) / h;
            if ux > uy {
                let half = ux * h / 2.0;
                let mid = (yr.0 + yr.1) / 2.0;
                yr = (mid - half, mid + half);
            } else {
                let half = uy * w / 2.0;
                let mid = (xr.0 + xr.1) / 2.0;
                xr = (mid - half, mid + half);
            }
        }
        (xr, yr)
    }
}

/// Color scale legend drawn to the right of the axes.
#[derive(Debug, Clone, PartialEq)]
pub struct Colorbar {
    pub cmap: Colormap,
    pub norm: Normalize,
}

/// A figure with one axes and an optional colorbar, owned by the caller.
#[derive(Debug, Clone)]
pub struct Figure {
    width: u32,
    height: u32,
    axes: Axes,
    colorbar: Option<Colorbar>,
}

impl Figure {
    /// New figure of `figsize` inches.
    pub fn new(figsize: (f64, f64)) -> Self {
        let width = (figsize.0 * DPI).round().max(1.0) as u32;
        let height = (figsize.1 * DPI).round().max(1.0) as u32;
        Figure {
            width,
            height,
            axes: Axes::default(),
            colorbar: None,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn axes(&self) -> &Axes {
        &self.axes
    }

    pub fn axes_mut(&mut self) -> &mut Axes {
        &mut self.axes
    }

    pub fn add_colorbar(&mut self, cmap: Colormap, norm: Normalize) {
        self.colorbar = Some(Colorbar { cmap, norm });
    }

    pub fn colorbar(&self) -> Option<&Colorbar> {
        self.colorbar.as_ref()
    }

    /// Write the figure: `.svg` as SVG, any other extension through `image`.
    pub fn save(&self, path: &Path) -> Result<()> {
        let is_svg = path
            .extension()
            .map(|ext| ext.to_ascii_lowercase() == "svg")
            .unwrap_or(false);

        info!("Saving {}x{} figure to {:?}...", self.width, self.height, path);
        if is_svg {
            std::fs::write(path, self.render_svg())?;
        } else {
            self.render_rgb().save(path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn figure_size_in_pixels() {
        let fig = Figure::new((10.0, 10.0));
        assert_eq!((fig.width(), fig.height()), (1000, 1000));
        let fig = Figure::new(DEFAULT_FIGSIZE);
        assert_eq!((fig.width(), fig.height()), (640, 480));
    }

    #[test]
    fn bars_are_indexed_from_zero() {
        let mut ax = Axes::default();
        ax.bar(&[5.0, 3.0], (0, 0, 0));
        assert_eq!(ax.bars(), vec![5.0, 3.0]);
        let (x0, x1, y0, y1) = ax.data_bounds().unwrap();
        assert!((x0 + 0.4).abs() < 1e-12);
        assert!((x1 - 1.4).abs() < 1e-12);
        assert_eq!((y0, y1), (0.0, 5.0));
    }

    #[test]
    fn ticks_widen_autoscaled_view() {
        let mut ax = Axes::default();
        ax.add_artist(Artist::Marker {
            at: Point::new(0.25, 0.5),
            radius: 3.0,
            color: (0, 0, 0),
            alpha: 1.0,
        });
        ax.set_xticks(vec![0.0, 0.5, 1.0]);
        let ((x0, x1), (y0, y1)) = ax.view_limits(100.0, 100.0);
        assert_eq!((x0, x1), (-0.25, 1.0));
        assert_eq!((y0, y1), (0.0, 1.0));
    }

    #[test]
    fn empty_axes_default_to_unit_square() {
        let ax = Axes::default();
        assert_eq!(ax.view_limits(10.0, 10.0), ((0.0, 1.0), (0.0, 1.0)));
    }

    #[test]
    fn equal_aspect_matches_units_per_pixel() {
        let mut ax = Axes::default();
        ax.set_xlim(0.0, 2.0);
        ax.set_ylim(0.0, 1.0);
        ax.set_aspect_equal(true);
        let ((x0, x1), (y0, y1)) = ax.view_limits(100.0, 100.0);
        assert_eq!((x0, x1), (0.0, 2.0));
        assert!(((y1 - y0) - 2.0).abs() < 1e-12);
        assert!(((y0 + y1) / 2.0 - 0.5).abs() < 1e-12);
    }

    #[test]
    fn non_finite_artists_do_not_set_bounds() {
        let mut ax = Axes::default();
        ax.bar(&[f64::NAN, 2.0], (0, 0, 0));
        let (_, _, y0, y1) = ax.data_bounds().unwrap();
        assert_eq!((y0, y1), (0.0, 2.0));
    }
}
