//! Generic network drawing onto an [`Axes`].

use log::debug;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::colormap::{Colormap, Normalize, Rgb};
use crate::error::{Result, VizError};
use crate::figure::{pt_to_px, Artist, Axes, Figure};
use crate::layout::Positions;
use crate::network::Network;

/// How nodes are colored
#[derive(Debug, Clone, PartialEq)]
pub enum NodeColor {
    Uniform(Rgb),
    /// One value per listed node, mapped through the colormap.
    Values(Vec<f64>),
}

/// Everything [`draw_network`] needs to know.
#[derive(Debug, Clone)]
pub struct DrawOptions {
    pub pos: Positions,
    /// Nodes to draw; `None` draws every node.
    pub nodelist: Option<Vec<String>>,
    /// Edges to draw; `None` draws every edge.
    pub edgelist: Option<Vec<(String, String)>>,
    /// Arrowheads; `None` follows the network's directedness.
    pub arrows: Option<bool>,
    /// Marker area in points squared.
    pub node_size: f64,
    pub node_color: NodeColor,
    pub cmap: Colormap,
    pub vmin: Option<f64>,
    pub vmax: Option<f64>,
    pub edge_color: Rgb,
    /// Edge line width in pixels.
    pub width: f64,
    pub alpha: f64,
    /// Node id -> label text; nodes without an entry are labeled by id.
    pub labels: Option<FxHashMap<String, String>>,
    pub with_labels: bool,
    pub font_size: f64,
    pub font_color: Rgb,
}

impl DrawOptions {
    pub fn new(pos: Positions) -> Self {
        DrawOptions {
            pos,
            nodelist: None,
            edgelist: None,
            arrows: None,
            node_size: 300.0,
            node_color: NodeColor::Uniform((31, 120, 180)),
            cmap: Colormap::default(),
            vmin: None,
            vmax: None,
            edge_color: (0, 0, 0),
            width: 1.0,
            alpha: 1.0,
            labels: None,
            with_labels: true,
            font_size: 12.0,
            font_color: (0, 0, 0),
        }
    }

    /// Replace every option the overrides set.
    pub fn apply(&mut self, overrides: DrawOverrides) {
        let o = overrides;
        if let Some(v) = o.pos {
            self.pos = v;
        }
        if let Some(v) = o.nodelist {
            self.nodelist = Some(v);
        }
        if let Some(v) = o.edgelist {
            self.edgelist = Some(v);
        }
        if let Some(v) = o.arrows {
            self.arrows = Some(v);
        }
        if let Some(v) = o.node_size {
            self.node_size = v;
        }
        if let Some(v) = o.node_color {
            self.node_color = v;
        }
        if let Some(v) = o.cmap {
            self.cmap = v;
        }
        if let Some(v) = o.vmin {
            self.vmin = Some(v);
        }
        if let Some(v) = o.vmax {
            self.vmax = Some(v);
        }
        if let Some(v) = o.edge_color {
            self.edge_color = v;
        }
        if let Some(v) = o.width {
            self.width = v;
        }
        if let Some(v) = o.alpha {
            self.alpha = v;
        }
        if let Some(v) = o.labels {
            self.labels = Some(v);
        }
        if let Some(v) = o.with_labels {
            self.with_labels = v;
        }
        if let Some(v) = o.font_size {
            self.font_size = v;
        }
        if let Some(v) = o.font_color {
            self.font_color = v;
        }
    }
}

/// Caller overrides layered over a renderer's defaults; unset fields keep the default.
#[derive(Debug, Clone, Default)]
pub struct DrawOverrides {
    pub pos: Option<Positions>,
    pub nodelist: Option<Vec<String>>,
    pub edgelist: Option<Vec<(String, String)>>,
    pub arrows: Option<bool>,
    pub node_size: Option<f64>,
    pub node_color: Option<NodeColor>,
    pub cmap: Option<Colormap>,
    pub vmin: Option<f64>,
    pub vmax: Option<f64>,
    pub edge_color: Option<Rgb>,
    pub width: Option<f64>,
    pub alpha: Option<f64>,
    pub labels: Option<FxHashMap<String, String>>,
    pub with_labels: Option<bool>,
    pub font_size: Option<f64>,
    pub font_color: Option<Rgb>,
}

fn finite_range(values: &[f64]) -> Option<(f64, f64)> {
    values
        .iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

fn node_colors(options: &DrawOptions, count: usize) -> Result<Vec<Rgb>> {
    match &options.node_color {
        NodeColor::Uniform(c) => Ok(vec![*c; count]),
        NodeColor::Values(values) => {
            if values.len() != count {
                return Err(VizError::ShapeMismatch {
                    expected: count,
                    found: values.len(),
                });
            }
            let (lo, hi) = finite_range(values).unwrap_or((0.0, 1.0));
            let norm = Normalize::new(options.vmin.unwrap_or(lo), options.vmax.unwrap_or(hi));
            debug!("Node colors scaled over [{}, {}]", norm.vmin, norm.vmax);
            Ok(values.iter().map(|&v| options.cmap.at(norm.apply(v))).collect())
        }
    }
}

/// Draw `network` into `axes`: edges first, then nodes, then labels.
pub fn draw_network(axes: &mut Axes, network: &Network, options: &DrawOptions) -> Result<()> {
    let nodelist = match &options.nodelist {
        Some(list) => list.clone(),
        None => network.node_ids(),
    };
    for id in &nodelist {
        if !network.contains(id) {
            return Err(VizError::UnknownNode(id.clone()));
        }
    }
    let positions = nodelist
        .iter()
        .map(|id| {
            options
                .pos
                .get(id)
                .copied()
                .ok_or_else(|| VizError::MissingPosition(id.clone()))
        })
        .collect::<Result<Vec<_>>>()?;
    let colors = node_colors(options, nodelist.len())?;

    let radius = pt_to_px(options.node_size.max(0.0).sqrt() / 2.0);
    let arrows = options.arrows.unwrap_or(network.is_directed());
    let drawn: FxHashSet<&str> = nodelist.iter().map(String::as_str).collect();

    let edges: Vec<(String, String)> = match &options.edgelist {
        Some(list) => {
            for (a, b) in list {
                for id in [a, b] {
                    if !network.contains(id) {
                        return Err(VizError::UnknownNode(id.clone()));
                    }
                }
            }
            list.clone()
        }
        None => {
            let nodes = network.nodes();
            network
                .edges()
                .iter()
                .map(|&(a, b)| (nodes[a].id.clone(), nodes[b].id.clone()))
                .collect()
        }
    };

    let mut edge_count = 0;
    for (a, b) in &edges {
        if !drawn.contains(a.as_str()) || !drawn.contains(b.as_str()) {
            continue;
        }
        let (Some(&from), Some(&to)) = (options.pos.get(a), options.pos.get(b)) else {
            continue;
        };
        axes.add_artist(Artist::Line {
            from,
            to,
            color: options.edge_color,
            width: options.width,
            alpha: options.alpha,
            arrow: arrows,
            shrink: radius,
        });
        edge_count += 1;
    }

    for (at, color) in positions.iter().zip(&colors) {
        axes.add_artist(Artist::Marker {
            at: *at,
            radius,
            color: *color,
            alpha: options.alpha,
        });
    }

    if options.with_labels {
        for (id, at) in nodelist.iter().zip(&positions) {
            let text = options
                .labels
                .as_ref()
                .and_then(|labels| labels.get(id))
                .cloned()
                .unwrap_or_else(|| id.clone());
            axes.add_artist(Artist::Text {
                at: *at,
                text,
                size: options.font_size,
                color: options.font_color,
            });
        }
    }

    debug!("Drew {} nodes and {} edges", nodelist.len(), edge_count);
    Ok(())
}

/// New figure with `network` drawn at `pos`, axes spines hidden.
pub fn draw_flattened(network: &Network, pos: Positions, figsize: (f64, f64)) -> Result<Figure> {
    let mut fig = Figure::new(figsize);
    let ax = fig.axes_mut();
    ax.spines_mut().set_all(false);
    draw_network(ax, network, &DrawOptions::new(pos))?;
    Ok(fig)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Point;

    fn square() -> (Network, Positions) {
        let mut net = Network::new(true);
        let mut pos = Positions::default();
        for (i, id) in ["a", "b", "c", "d"].iter().enumerate() {
            net.add_node(id, [("phenotypes", i as f64)]);
            pos.insert(id.to_string(), Point::new(i as f64, i as f64));
        }
        net.add_edge("a", "b").unwrap();
        net.add_edge("b", "c").unwrap();
        net.add_edge("c", "d").unwrap();
        (net, pos)
    }

    #[test]
    fn draws_every_node_and_edge_by_default() {
        let (net, pos) = square();
        let mut ax = Axes::default();
        draw_network(&mut ax, &net, &DrawOptions::new(pos)).unwrap();
        assert_eq!(ax.markers().len(), 4);
        assert_eq!(ax.lines(), 3);
        let labels = ax
            .artists()
            .iter()
            .filter(|a| matches!(a, Artist::Text { .. }))
            .count();
        assert_eq!(labels, 4);
    }

    #[test]
    fn subset_drops_edges_to_hidden_nodes() {
        let (net, pos) = square();
        let mut options = DrawOptions::new(pos);
        options.nodelist = Some(vec!["a".into(), "b".into(), "d".into()]);
        options.with_labels = false;
        let mut ax = Axes::default();
        draw_network(&mut ax, &net, &options).unwrap();
        assert_eq!(ax.markers().len(), 3);
        assert_eq!(ax.lines(), 1);
    }

    #[test]
    fn value_colors_span_the_colormap() {
        let (net, pos) = square();
        let mut options = DrawOptions::new(pos);
        options.node_color = NodeColor::Values(vec![0.0, 1.0, 2.0, 3.0]);
        let cmap = Colormap::by_name("Greys").unwrap();
        options.cmap = cmap.clone();
        let mut ax = Axes::default();
        draw_network(&mut ax, &net, &options).unwrap();
        let markers = ax.markers();
        assert_eq!(markers[0].1, cmap.at(0.0));
        assert_eq!(markers[3].1, cmap.at(1.0));
    }

    #[test]
    fn stopless_colormap_override_draws_black() {
        let (net, pos) = square();
        let mut options = DrawOptions::new(pos);
        options.node_color = NodeColor::Values(vec![0.0, 1.0, 2.0, 3.0]);
        options.apply(DrawOverrides {
            cmap: Some(Colormap::from_stops("empty", Vec::new())),
            ..DrawOverrides::default()
        });
        let mut ax = Axes::default();
        draw_network(&mut ax, &net, &options).unwrap();
        assert!(ax.markers().iter().all(|m| m.1 == (0, 0, 0)));
    }

    #[test]
    fn mismatched_colors_fail() {
        let (net, pos) = square();
        let mut options = DrawOptions::new(pos);
        options.node_color = NodeColor::Values(vec![0.0]);
        let err = draw_network(&mut Axes::default(), &net, &options).unwrap_err();
        assert!(matches!(err, VizError::ShapeMismatch { expected: 4, found: 1 }));
    }

    #[test]
    fn unknown_and_unplaced_nodes_fail() {
        let (net, mut pos) = square();
        let mut options = DrawOptions::new(pos.clone());
        options.nodelist = Some(vec!["zz".into()]);
        assert!(matches!(
            draw_network(&mut Axes::default(), &net, &options),
            Err(VizError::UnknownNode(_))
        ));

        pos.remove("c");
        assert!(matches!(
            draw_network(&mut Axes::default(), &net, &DrawOptions::new(pos)),
            Err(VizError::MissingPosition(id)) if id == "c"
        ));
    }

    #[test]
    fn overrides_take_precedence() {
        let (_, pos) = square();
        let mut options = DrawOptions::new(pos);
        options.apply(DrawOverrides {
            edge_color: Some((255, 0, 0)),
            with_labels: Some(false),
            vmax: Some(9.0),
            ..DrawOverrides::default()
        });
        assert_eq!(options.edge_color, (255, 0, 0));
        assert!(!options.with_labels);
        assert_eq!(options.vmax, Some(9.0));
        assert_eq!(options.node_size, 300.0);
    }

    #[test]
    fn flattened_drawing_hides_spines() {
        let (net, pos) = square();
        let fig = draw_flattened(&net, pos, (5.0, 5.0)).unwrap();
        let spines = fig.axes().spines();
        assert!(!spines.left && !spines.bottom && !spines.top && !spines.right);
        assert_eq!(fig.axes().markers().len(), 4);
    }
}
