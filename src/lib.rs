//! Plots for genotype-phenotype network analyses: timescale and eigenvalue
//! spectra, and cluster drawings laid out by forward committor and fitness.
//!
//! Figures are built in data coordinates and saved as SVG or as a raster
//! image depending on the output file extension.

pub mod colormap;
pub mod draw;
pub mod error;
pub mod figure;
pub mod layout;
pub mod network;
pub mod paths;
pub mod plots;
pub mod raster;
pub mod scene;
pub mod svg;

pub use colormap::{Colormap, Normalize};
pub use draw::{draw_network, DrawOptions, DrawOverrides, NodeColor};
pub use error::{Result, VizError};
pub use figure::{Axes, Figure};
pub use layout::{cluster_positions, ClusterLayout, Point, Positions};
pub use network::{load_network, load_spectrum, AttrValue, Clusters, Network};
pub use plots::{
    color_bounds, draw_clusters, draw_clusters_into, plot_clusters, plot_eigenvalues,
    plot_timescales, ClusterPlotOptions, DrawClustersOptions, SpectrumOptions,
};
