//! Spectrum bar charts and cluster drawings over a genotype-phenotype network.

use log::{debug, info};
use rustc_hash::FxHashMap;

use crate::colormap::{parse_color, Colormap, Normalize};
use crate::draw::{draw_flattened, draw_network, DrawOptions, DrawOverrides, NodeColor};
use crate::error::{Result, VizError};
use crate::figure::{Figure, DEFAULT_FIGSIZE};
use crate::layout::{cluster_positions, ClusterLayout};
use crate::network::{Clusters, Network};
use crate::paths::shortest_path_matrix;

const AXIS_LABEL_SIZE: f64 = 15.0;

/// Options for [`plot_timescales`] and [`plot_eigenvalues`]
#[derive(Debug, Clone)]
pub struct SpectrumOptions {
    pub figsize: (f64, f64),
    /// Keep only a prefix; negative values drop from the end.
    pub n: Option<i64>,
    pub color: String,
}

impl Default for SpectrumOptions {
    fn default() -> Self {
        SpectrumOptions {
            figsize: DEFAULT_FIGSIZE,
            n: None,
            color: "orange".to_string(),
        }
    }
}

/// Prefix of `values` selected by `n`, with slice-style negative counts.
fn truncate(values: &[f64], n: Option<i64>) -> &[f64] {
    let len = values.len();
    let keep = match n {
        None => len,
        Some(n) if n >= 0 => (n as usize).min(len),
        Some(n) => len.saturating_sub(n.unsigned_abs() as usize),
    };
    &values[..keep]
}

fn plot_spectrum(values: &[f64], options: &SpectrumOptions) -> Result<Figure> {
    let color = parse_color(&options.color)?;
    let kept = truncate(values, options.n);
    debug!("Plotting {} of {} spectrum values", kept.len(), values.len());

    let mut fig = Figure::new(options.figsize);
    let ax = fig.axes_mut();
    ax.bar(kept, color);
    ax.set_title("Timescales");
    Ok(fig)
}

/// Bar chart of the leading timescales.
pub fn plot_timescales(timescales: &[f64], options: &SpectrumOptions) -> Result<Figure> {
    plot_spectrum(timescales, options)
}

/// Bar chart of the leading eigenvalues. The chart is titled "Timescales",
/// same as [`plot_timescales`].
pub fn plot_eigenvalues(eigenvalues: &[f64], options: &SpectrumOptions) -> Result<Figure> {
    plot_spectrum(eigenvalues, options)
}

/// 0, step, 2 * step, ..., 1
fn unit_ticks(step: f64) -> Vec<f64> {
    let count = (1.0 / step).round() as usize;
    (0..=count).map(|i| i as f64 * step).collect()
}

/// Options for [`plot_clusters`]
#[derive(Debug, Clone)]
pub struct ClusterPlotOptions {
    pub scale: f64,
    pub figsize: (f64, f64),
    /// Node attribute plotted as fitness.
    pub attribute: String,
}

impl Default for ClusterPlotOptions {
    fn default() -> Self {
        ClusterPlotOptions {
            scale: 1.0,
            figsize: (10.0, 10.0),
            attribute: "phenotypes".to_string(),
        }
    }
}

/// Draw the network on committor/fitness axes, clusters spread by their hop
/// distance from the first cluster.
pub fn plot_clusters(
    network: &Network,
    clusters: &Clusters,
    options: &ClusterPlotOptions,
) -> Result<Figure> {
    let spm = shortest_path_matrix(network);
    let layout = ClusterLayout {
        scale: options.scale,
        y_attribute: options.attribute.clone(),
    };
    let pos = cluster_positions(network, clusters, Some(&spm), &layout)?;

    let mut fig = draw_flattened(network, pos, options.figsize)?;
    let ax = fig.axes_mut();
    ax.spines_mut().left = true;
    ax.spines_mut().bottom = true;
    ax.set_xticks(unit_ticks(0.1));
    ax.set_yticks(unit_ticks(0.05));
    ax.autoscale(true);
    ax.set_xlabel("Forward Committor", AXIS_LABEL_SIZE);
    ax.set_ylabel("Fitness", AXIS_LABEL_SIZE);
    Ok(fig)
}

/// Options for [`draw_clusters`] and [`draw_clusters_into`]
#[derive(Debug, Clone)]
pub struct DrawClustersOptions {
    /// Size of the figure created by [`draw_clusters`].
    pub figsize: (f64, f64),
    pub cluster_scale: f64,
    /// Nodes to draw; empty means all.
    pub nodelist: Vec<String>,
    /// Numeric node attribute mapped to color (and used as fitness).
    pub attribute: String,
    pub vmin: Option<f64>,
    pub vmax: Option<f64>,
    pub cmap: String,
    /// Restrict the colormap to [0.05, 0.95].
    pub cmap_truncate: bool,
    pub colorbar: bool,
    /// Node attribute used as label text.
    pub labels: String,
    pub overrides: DrawOverrides,
}

impl Default for DrawClustersOptions {
    fn default() -> Self {
        DrawClustersOptions {
            figsize: (10.0, 10.0),
            cluster_scale: 1.0,
            nodelist: Vec::new(),
            attribute: "phenotypes".to_string(),
            vmin: None,
            vmax: None,
            cmap: "YlOrRd".to_string(),
            cmap_truncate: false,
            colorbar: false,
            labels: "binary".to_string(),
            overrides: DrawOverrides::default(),
        }
    }
}

/// Color scale bounds: given values win, missing ones come from the
/// observed range of `attribute` over `nodelist`.
pub fn color_bounds(
    network: &Network,
    nodelist: &[String],
    attribute: &str,
    vmin: Option<f64>,
    vmax: Option<f64>,
) -> Result<(f64, f64)> {
    if let (Some(lo), Some(hi)) = (vmin, vmax) {
        return Ok((lo, hi));
    }
    let mut range: Option<(f64, f64)> = None;
    for id in nodelist {
        let v = network.numeric_attribute(id, attribute)?;
        range = Some(match range {
            None => (v, v),
            Some((lo, hi)) => (lo.min(v), hi.max(v)),
        });
    }
    let (lo, hi) = range.ok_or_else(|| VizError::EmptyAttribute(attribute.to_string()))?;
    Ok((vmin.unwrap_or(lo), vmax.unwrap_or(hi)))
}

/// Draw clusters into a new figure of `options.figsize`.
pub fn draw_clusters(
    network: &Network,
    clusters: &Clusters,
    options: &DrawClustersOptions,
) -> Result<Figure> {
    let mut fig = Figure::new(options.figsize);
    draw_clusters_into(&mut fig, network, clusters, options)?;
    Ok(fig)
}

/// Draw clusters into a caller-owned figure, nodes colored by `options.attribute`.
pub fn draw_clusters_into(
    fig: &mut Figure,
    network: &Network,
    clusters: &Clusters,
    options: &DrawClustersOptions,
) -> Result<()> {
    let layout = ClusterLayout {
        scale: options.cluster_scale,
        y_attribute: options.attribute.clone(),
    };
    let pos = cluster_positions(network, clusters, None, &layout)?;

    let nodelist = if options.nodelist.is_empty() {
        network.node_ids()
    } else {
        options.nodelist.clone()
    };

    let (vmin, vmax) = color_bounds(network, &nodelist, &options.attribute, options.vmin, options.vmax)?;
    info!("Color scale {:?} over [{}, {}]", options.attribute, vmin, vmax);

    let mut cmap = Colormap::by_name(&options.cmap)?;
    if options.cmap_truncate {
        cmap = cmap.truncate(0.05, 0.95);
    }

    let values = nodelist
        .iter()
        .map(|id| network.numeric_attribute(id, &options.attribute))
        .collect::<Result<Vec<_>>>()?;
    let labels = nodelist
        .iter()
        .map(|id| Ok((id.clone(), network.attribute(id, &options.labels)?.to_string())))
        .collect::<Result<FxHashMap<_, _>>>()?;

    let mut draw_options = DrawOptions::new(pos);
    draw_options.nodelist = Some(nodelist);
    draw_options.arrows = Some(false);
    draw_options.vmin = Some(vmin);
    draw_options.vmax = Some(vmax);
    draw_options.node_color = NodeColor::Values(values);
    draw_options.cmap = cmap.clone();
    draw_options.edge_color = (255, 255, 255);
    draw_options.labels = Some(labels);
    draw_options.with_labels = false;
    draw_options.apply(options.overrides.clone());

    draw_network(fig.axes_mut(), network, &draw_options)?;

    if options.colorbar {
        fig.add_colorbar(cmap, Normalize::new(vmin, vmax));
    }

    let ax = fig.axes_mut();
    ax.spines_mut().left = true;
    ax.spines_mut().bottom = true;
    ax.set_xticks(unit_ticks(0.1));
    ax.autoscale(true);
    ax.set_xlabel("Forward Committor", AXIS_LABEL_SIZE);
    ax.set_ylabel("Fitness", AXIS_LABEL_SIZE);
    ax.set_aspect_equal(true);
    Ok(())
}
