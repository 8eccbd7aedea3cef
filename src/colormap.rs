//! Named colormaps, value normalization, and color parsing.

use crate::error::{Result, VizError};

pub type Rgb = (u8, u8, u8);

/// ColorBrewer YlOrRd 9-class sequential palette
const YLORRD_9: [Rgb; 9] = [
    (255, 255, 204),
    (255, 237, 160),
    (254, 217, 118),
    (254, 178, 76),
    (253, 141, 60),
    (252, 78, 42),
    (227, 26, 28),
    (189, 0, 38),
    (128, 0, 38),
];

const REDS_9: [Rgb; 9] = [
    (255, 245, 240),
    (254, 224, 210),
    (252, 187, 161),
    (252, 146, 114),
    (251, 106, 74),
    (239, 59, 44),
    (203, 24, 29),
    (165, 15, 21),
    (103, 0, 13),
];

const BLUES_9: [Rgb; 9] = [
    (247, 251, 255),
    (222, 235, 247),
    (198, 219, 239),
    (158, 202, 225),
    (107, 174, 214),
    (66, 146, 198),
    (33, 113, 181),
    (8, 81, 156),
    (8, 48, 107),
];

const GREYS_9: [Rgb; 9] = [
    (255, 255, 255),
    (240, 240, 240),
    (217, 217, 217),
    (189, 189, 189),
    (150, 150, 150),
    (115, 115, 115),
    (82, 82, 82),
    (37, 37, 37),
    (0, 0, 0),
];

/// ColorBrewer Spectral 11-class diverging palette
const SPECTRAL_11: [Rgb; 11] = [
    (158, 1, 66),
    (213, 62, 79),
    (244, 109, 67),
    (253, 174, 97),
    (254, 224, 139),
    (255, 255, 191),
    (230, 245, 152),
    (171, 221, 164),
    (102, 194, 165),
    (50, 136, 189),
    (94, 79, 162),
];

/// viridis sampled at 9 evenly spaced points
const VIRIDIS_9: [Rgb; 9] = [
    (68, 1, 84),
    (71, 45, 123),
    (59, 82, 139),
    (44, 114, 142),
    (33, 145, 140),
    (40, 174, 128),
    (94, 201, 98),
    (173, 220, 48),
    (253, 231, 37),
];

/// plasma sampled at 10 evenly spaced points
const PLASMA_10: [Rgb; 10] = [
    (13, 8, 135),
    (70, 3, 159),
    (114, 1, 168),
    (156, 23, 158),
    (189, 55, 134),
    (216, 87, 107),
    (237, 121, 83),
    (251, 159, 58),
    (253, 202, 38),
    (240, 249, 33),
];

/// A continuous colormap over [0, 1], defined by evenly spaced color stops.
#[derive(Debug, Clone, PartialEq)]
pub struct Colormap {
    name: String,
    stops: Vec<Rgb>,
    lo: f64,
    hi: f64,
}

impl Colormap {
    pub fn from_stops(name: &str, stops: Vec<Rgb>) -> Self {
        Colormap {
            name: name.to_string(),
            stops,
            lo: 0.0,
            hi: 1.0,
        }
    }

    /// Look up a colormap by name. A `_r` suffix reverses it.
    pub fn by_name(name: &str) -> Result<Self> {
        let (base, reversed) = match name.strip_suffix("_r") {
            Some(base) => (base, true),
            None => (name, false),
        };
        let stops: &[Rgb] = match base {
            "YlOrRd" => &YLORRD_9,
            "Reds" => &REDS_9,
            "Blues" => &BLUES_9,
            "Greys" => &GREYS_9,
            "Spectral" => &SPECTRAL_11,
            "viridis" => &VIRIDIS_9,
            "plasma" => &PLASMA_10,
            _ => return Err(VizError::UnknownColormap(name.to_string())),
        };
        let mut stops = stops.to_vec();
        if reversed {
            stops.reverse();
        }
        Ok(Colormap::from_stops(name, stops))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Color at position `t` in [0, 1]; values outside are clamped.
    /// A map without stops is black everywhere.
    pub fn at(&self, t: f64) -> Rgb {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let u = self.lo + t * (self.hi - self.lo);

        let last = match self.stops.len() {
            0 => return (0, 0, 0),
            1 => return self.stops[0],
            n => n - 1,
        };
        let pos = u * last as f64;
        let i = (pos.floor() as usize).min(last - 1);
        let frac = pos - i as f64;
        let (r0, g0, b0) = self.stops[i];
        let (r1, g1, b1) = self.stops[i + 1];
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;
        (mix(r0, r1), mix(g0, g1), mix(b0, b1))
    }

    /// Restrict the map to the sub-range [minval, maxval] of its domain.
    pub fn truncate(&self, minval: f64, maxval: f64) -> Self {
        let span = self.hi - self.lo;
        Colormap {
            name: format!("trunc({},{:.2},{:.2})", self.name, minval, maxval),
            stops: self.stops.clone(),
            lo: self.lo + minval * span,
            hi: self.lo + maxval * span,
        }
    }
}

impl Default for Colormap {
    fn default() -> Self {
        Colormap::from_stops("viridis", VIRIDIS_9.to_vec())
    }
}

/// Linear mapping of data values onto [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalize {
    pub vmin: f64,
    pub vmax: f64,
}

impl Normalize {
    pub fn new(vmin: f64, vmax: f64) -> Self {
        Normalize { vmin, vmax }
    }

    /// Degenerate ranges map everything to 0.
    pub fn apply(&self, value: f64) -> f64 {
        if self.vmax == self.vmin {
            0.0
        } else {
            (value - self.vmin) / (self.vmax - self.vmin)
        }
    }
}

/// Parse `#rrggbb`, `#rgb`, or a basic color name.
pub fn parse_color(s: &str) -> Result<Rgb> {
    let unknown = || VizError::UnknownColor(s.to_string());
    if let Some(hex) = s.strip_prefix('#') {
        let digits: Vec<u8> = hex
            .chars()
            .map(|c| c.to_digit(16).map(|d| d as u8))
            .collect::<Option<_>>()
            .ok_or_else(unknown)?;
        return match digits.len() {
            6 => Ok((
                digits[0] * 16 + digits[1],
                digits[2] * 16 + digits[3],
                digits[4] * 16 + digits[5],
            )),
            3 => Ok((digits[0] * 17, digits[1] * 17, digits[2] * 17)),
            _ => Err(unknown()),
        };
    }

    let rgb = match s.to_ascii_lowercase().as_str() {
        "black" | "k" => (0, 0, 0),
        "white" | "w" => (255, 255, 255),
        "gray" | "grey" => (128, 128, 128),
        "lightgray" | "lightgrey" => (211, 211, 211),
        "red" | "r" => (255, 0, 0),
        "green" | "g" => (0, 128, 0),
        "blue" | "b" => (0, 0, 255),
        "orange" => (255, 165, 0),
        "yellow" | "y" => (255, 255, 0),
        "purple" => (128, 0, 128),
        "cyan" | "c" => (0, 255, 255),
        "magenta" | "m" => (255, 0, 255),
        _ => return Err(unknown()),
    };
    Ok(rgb)
}

/// `rgb(r,g,b)` form used in SVG attributes
pub fn css(rgb: Rgb) -> String {
    format!("rgb({},{},{})", rgb.0, rgb.1, rgb.2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_match_stops() {
        let cmap = Colormap::by_name("YlOrRd").unwrap();
        assert_eq!(cmap.at(0.0), YLORRD_9[0]);
        assert_eq!(cmap.at(1.0), YLORRD_9[8]);
        assert_eq!(cmap.at(-3.0), YLORRD_9[0]);
        assert_eq!(cmap.at(7.0), YLORRD_9[8]);
        assert_eq!(cmap.at(0.5), YLORRD_9[4]);
    }

    #[test]
    fn stopless_and_single_stop_maps() {
        let empty = Colormap::from_stops("empty", Vec::new());
        assert_eq!(empty.at(0.5), (0, 0, 0));
        assert_eq!(empty.truncate(0.05, 0.95).at(1.0), (0, 0, 0));
        let flat = Colormap::from_stops("flat", vec![(10, 20, 30)]);
        assert_eq!(flat.at(0.0), (10, 20, 30));
        assert_eq!(flat.at(1.0), (10, 20, 30));
    }

    #[test]
    fn reversed_names() {
        let cmap = Colormap::by_name("Greys_r").unwrap();
        assert_eq!(cmap.at(0.0), (0, 0, 0));
        assert_eq!(cmap.at(1.0), (255, 255, 255));
        assert_eq!(cmap.name(), "Greys_r");
    }

    #[test]
    fn unknown_colormap() {
        assert!(matches!(
            Colormap::by_name("jet"),
            Err(VizError::UnknownColormap(_))
        ));
    }

    #[test]
    fn truncation_maps_into_subrange() {
        let base = Colormap::by_name("viridis").unwrap();
        let trunc = base.truncate(0.05, 0.95);
        assert_eq!(trunc.at(0.0), base.at(0.05));
        assert_eq!(trunc.at(1.0), base.at(0.95));
        assert_eq!(trunc.at(0.5), base.at(0.5));
        assert!(trunc.name().starts_with("trunc(viridis"));
    }

    #[test]
    fn normalize_handles_degenerate_range() {
        assert_eq!(Normalize::new(1.0, 3.0).apply(2.0), 0.5);
        assert_eq!(Normalize::new(2.0, 2.0).apply(5.0), 0.0);
    }

    #[test]
    fn parse_colors() {
        assert_eq!(parse_color("orange").unwrap(), (255, 165, 0));
        assert_eq!(parse_color("#ff8000").unwrap(), (255, 128, 0));
        assert_eq!(parse_color("#fff").unwrap(), (255, 255, 255));
        assert_eq!(parse_color("K").unwrap(), (0, 0, 0));
        assert!(matches!(parse_color("#12"), Err(VizError::UnknownColor(_))));
        assert!(matches!(parse_color("chartreuse"), Err(VizError::UnknownColor(_))));
    }
}
