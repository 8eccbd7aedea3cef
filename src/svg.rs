//! SVG backend.

use crate::colormap::css;
use crate::figure::Figure;
use crate::scene::{Anchor, Shape};

/// Escape special XML characters
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

fn opacity(alpha: f64) -> String {
    if alpha >= 1.0 {
        String::new()
    } else {
        format!(r#" opacity="{:.3}""#, alpha.max(0.0))
    }
}

fn write_shape(svg: &mut String, shape: &Shape) {
    match shape {
        Shape::Rect {
            x,
            y,
            w,
            h,
            fill,
            alpha,
        } => svg.push_str(&format!(
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\"{}/>\n",
            x,
            y,
            w,
            h,
            css(*fill),
            opacity(*alpha)
        )),
        Shape::Line {
            x1,
            y1,
            x2,
            y2,
            color,
            width,
            alpha,
        } => svg.push_str(&format!(
            "<line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" stroke=\"{}\" stroke-width=\"{}\"{}/>\n",
            x1,
            y1,
            x2,
            y2,
            css(*color),
            width,
            opacity(*alpha)
        )),
        Shape::Circle {
            cx,
            cy,
            r,
            fill,
            alpha,
        } => svg.push_str(&format!(
            "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{:.2}\" fill=\"{}\"{}/>\n",
            cx,
            cy,
            r,
            css(*fill),
            opacity(*alpha)
        )),
        Shape::Polygon {
            points,
            fill,
            alpha,
        } => {
            let pts: Vec<String> = points
                .iter()
                .map(|(x, y)| format!("{:.2},{:.2}", x, y))
                .collect();
            svg.push_str(&format!(
                "<polygon points=\"{}\" fill=\"{}\"{}/>\n",
                pts.join(" "),
                css(*fill),
                opacity(*alpha)
            ));
        }
        Shape::Text {
            x,
            y,
            text,
            size,
            color,
            anchor,
            vertical,
        } => {
            let anchor = match anchor {
                Anchor::Start => "start",
                Anchor::Middle => "middle",
                Anchor::End => "end",
            };
            let rotate = if *vertical {
                format!(" transform=\"rotate(-90 {:.2} {:.2})\"", x, y)
            } else {
                String::new()
            };
            svg.push_str(&format!(
                "<text x=\"{:.2}\" y=\"{:.2}\" font-size=\"{:.1}\" fill=\"{}\" text-anchor=\"{}\" dominant-baseline=\"central\"{}>{}</text>\n",
                x,
                y,
                size,
                css(*color),
                anchor,
                rotate,
                escape_xml(text)
            ));
        }
    }
}

impl Figure {
    /// Serialize the figure as a standalone SVG document.
    pub fn render_svg(&self) -> String {
        let scene = self.scene();
        let f = scene.frame;
        let mut svg = String::new();

        svg.push_str(&format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">
<style>
  text {{ font-family: 'DejaVu Sans', Arial, sans-serif; }}
</style>
<defs><clipPath id="plot-area"><rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}"/></clipPath></defs>
"#,
            scene.width, scene.height, scene.width, scene.height, f.x0, f.y0, f.w, f.h
        ));

        let (background, decorations) = scene.chrome.split_at(1.min(scene.chrome.len()));
        for shape in background {
            write_shape(&mut svg, shape);
        }
        svg.push_str("<g clip-path=\"url(#plot-area)\">\n");
        for shape in &scene.data {
            write_shape(&mut svg, shape);
        }
        svg.push_str("</g>\n");
        for shape in decorations {
            write_shape(&mut svg, shape);
        }

        svg.push_str("</svg>\n");
        svg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_xml("a<b & 'c'"), "a&lt;b &amp; &apos;c&apos;");
    }

    #[test]
    fn document_contains_bars_and_title() {
        let mut fig = Figure::new((4.0, 3.0));
        fig.axes_mut().bar(&[2.0, 1.0], (255, 165, 0));
        fig.axes_mut().set_title("Timescales");
        let svg = fig.render_svg();
        assert!(svg.starts_with("<?xml"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert_eq!(svg.matches("fill=\"rgb(255,165,0)\"").count(), 2);
        assert!(svg.contains(">Timescales</text>"));
    }

    #[test]
    fn every_shape_kind_is_written() {
        let mut svg = String::new();
        write_shape(
            &mut svg,
            &Shape::Circle {
                cx: 1.0,
                cy: 2.0,
                r: 3.0,
                fill: (0, 0, 0),
                alpha: 0.5,
            },
        );
        write_shape(
            &mut svg,
            &Shape::Polygon {
                points: vec![(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)],
                fill: (255, 0, 0),
                alpha: 1.0,
            },
        );
        write_shape(
            &mut svg,
            &Shape::Line {
                x1: 0.0,
                y1: 0.0,
                x2: 4.0,
                y2: 4.0,
                color: (0, 0, 255),
                width: 2.0,
                alpha: 1.0,
            },
        );
        let lines: Vec<&str> = svg.lines().collect();
        assert_eq!(
            lines,
            vec![
                r#"<circle cx="1.00" cy="2.00" r="3.00" fill="rgb(0,0,0)" opacity="0.500"/>"#,
                r#"<polygon points="0.00,0.00 1.00,0.00 0.00,1.00" fill="rgb(255,0,0)"/>"#,
                r#"<line x1="0.00" y1="0.00" x2="4.00" y2="4.00" stroke="rgb(0,0,255)" stroke-width="2"/>"#,
            ]
        );
    }

    #[test]
    fn vertical_labels_are_rotated() {
        let mut fig = Figure::new((4.0, 3.0));
        fig.axes_mut().set_ylabel("Fitness", 15.0);
        let svg = fig.render_svg();
        assert!(svg.contains("rotate(-90"));
        assert!(svg.contains(">Fitness</text>"));
    }
}
