use clap::{Args, Parser, Subcommand};
use log::{debug, error, info};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use gpviz::colormap::parse_color;
use gpviz::figure::Figure;
use gpviz::{
    draw_clusters, load_network, load_spectrum, plot_clusters, plot_eigenvalues,
    plot_timescales, ClusterPlotOptions, DrawClustersOptions, DrawOverrides, Result,
    SpectrumOptions,
};

#[derive(Parser)]
#[command(name = "gpviz")]
#[command(about = "Plot spectra and clusters of a genotype-phenotype network.", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    // Threading
    /// Number of threads to use for parallel operations.
    #[arg(short = 't', long = "threads", value_name = "N", global = true)]
    threads: Option<usize>,

    // Logging
    /// Verbosity level (0 = error, 1 = info, 2 = debug).
    #[arg(short = 'v', long = "verbose", value_name = "N", default_value_t = 1, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Bar chart of the leading timescales.
    Timescales(SpectrumArgs),
    /// Bar chart of the leading eigenvalues.
    Eigenvalues(SpectrumArgs),
    /// Network on committor/fitness axes, clusters spread by hop distance.
    Clusters(ClustersArgs),
    /// Clusters colored by a node attribute.
    DrawClusters(DrawClustersArgs),
}

#[derive(Args)]
struct SpectrumArgs {
    /// Load the values, one per line, from this FILE.
    #[arg(short = 'i', long = "input", value_name = "FILE")]
    input: PathBuf,

    /// Write the plot to this FILE (PNG or SVG based on extension).
    #[arg(short = 'o', long = "out", value_name = "FILE")]
    out: PathBuf,

    /// Plot only the first N values (negative drops from the end).
    #[arg(short = 'n', value_name = "N", allow_hyphen_values = true)]
    n: Option<i64>,

    /// Bar color, by name or #rrggbb.
    #[arg(long = "color", value_name = "COLOR", default_value = "orange")]
    color: String,

    /// Figure width in inches.
    #[arg(long = "width", value_name = "IN", default_value_t = 6.4)]
    width: f64,

    /// Figure height in inches.
    #[arg(long = "height", value_name = "IN", default_value_t = 4.8)]
    height: f64,
}

#[derive(Args)]
struct ClustersArgs {
    /// Load the network and its clusters from this FILE.
    #[arg(short = 'i', long = "input", value_name = "FILE")]
    input: PathBuf,

    /// Write the plot to this FILE (PNG or SVG based on extension).
    #[arg(short = 'o', long = "out", value_name = "FILE")]
    out: PathBuf,

    /// Multiplies the horizontal spread of nodes within a cluster.
    #[arg(long = "scale", value_name = "FLOAT", default_value_t = 1.0)]
    scale: f64,

    /// Figure width in inches.
    #[arg(long = "width", value_name = "IN", default_value_t = 10.0)]
    width: f64,

    /// Figure height in inches.
    #[arg(long = "height", value_name = "IN", default_value_t = 10.0)]
    height: f64,
}

#[derive(Args)]
struct DrawClustersArgs {
    /// Load the network and its clusters from this FILE.
    #[arg(short = 'i', long = "input", value_name = "FILE")]
    input: PathBuf,

    /// Write the plot to this FILE (PNG or SVG based on extension).
    #[arg(short = 'o', long = "out", value_name = "FILE")]
    out: PathBuf,

    /// Numeric node attribute used for color and fitness.
    #[arg(long = "attribute", value_name = "NAME", default_value = "phenotypes")]
    attribute: String,

    /// Node attribute used as label text.
    #[arg(long = "labels", value_name = "NAME", default_value = "binary")]
    labels: String,

    /// Lower bound of the color scale.
    #[arg(long = "vmin", value_name = "FLOAT", allow_hyphen_values = true)]
    vmin: Option<f64>,

    /// Upper bound of the color scale.
    #[arg(long = "vmax", value_name = "FLOAT", allow_hyphen_values = true)]
    vmax: Option<f64>,

    /// Colormap name; a `_r` suffix reverses it.
    #[arg(long = "cmap", value_name = "NAME", default_value = "YlOrRd")]
    cmap: String,

    /// Use only the [0.05, 0.95] range of the colormap.
    #[arg(long = "cmap-truncate")]
    cmap_truncate: bool,

    /// Draw a colorbar next to the plot.
    #[arg(long = "colorbar")]
    colorbar: bool,

    /// Multiplies the horizontal spread of nodes within a cluster.
    #[arg(long = "cluster-scale", value_name = "FLOAT", default_value_t = 1.0)]
    cluster_scale: f64,

    /// Draw only the node ids listed in FILE, one per line.
    #[arg(long = "nodes", value_name = "FILE")]
    nodes: Option<PathBuf>,

    /// Show node labels.
    #[arg(long = "with-labels")]
    with_labels: bool,

    /// Edge color, by name or #rrggbb.
    #[arg(long = "edge-color", value_name = "COLOR")]
    edge_color: Option<String>,

    /// Figure width in inches.
    #[arg(long = "width", value_name = "IN", default_value_t = 10.0)]
    width: f64,

    /// Figure height in inches.
    #[arg(long = "height", value_name = "IN", default_value_t = 10.0)]
    height: f64,
}

/// Non-empty trimmed lines of FILE
fn load_node_ids(path: &Path) -> Result<Vec<String>> {
    let reader = BufReader::new(File::open(path)?);
    let mut ids = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if !line.is_empty() && !line.starts_with('#') {
            ids.push(line.to_string());
        }
    }
    Ok(ids)
}

fn spectrum(args: &SpectrumArgs, eigenvalues: bool) -> Result<Figure> {
    let values = load_spectrum(&args.input)?;
    let options = SpectrumOptions {
        figsize: (args.width, args.height),
        n: args.n,
        color: args.color.clone(),
    };
    if eigenvalues {
        plot_eigenvalues(&values, &options)
    } else {
        plot_timescales(&values, &options)
    }
}

fn clusters(args: &ClustersArgs) -> Result<Figure> {
    let (network, clusters) = load_network(&args.input)?;
    let options = ClusterPlotOptions {
        scale: args.scale,
        figsize: (args.width, args.height),
        ..ClusterPlotOptions::default()
    };
    plot_clusters(&network, &clusters, &options)
}

fn colored_clusters(args: &DrawClustersArgs) -> Result<Figure> {
    let (network, clusters) = load_network(&args.input)?;
    let nodelist = match &args.nodes {
        Some(path) => load_node_ids(path)?,
        None => Vec::new(),
    };
    debug!("Drawing {} listed nodes", nodelist.len());

    let mut overrides = DrawOverrides::default();
    if args.with_labels {
        overrides.with_labels = Some(true);
    }
    if let Some(color) = &args.edge_color {
        overrides.edge_color = Some(parse_color(color)?);
    }

    let options = DrawClustersOptions {
        figsize: (args.width, args.height),
        cluster_scale: args.cluster_scale,
        nodelist,
        attribute: args.attribute.clone(),
        vmin: args.vmin,
        vmax: args.vmax,
        cmap: args.cmap.clone(),
        cmap_truncate: args.cmap_truncate,
        colorbar: args.colorbar,
        labels: args.labels.clone(),
        overrides,
    };
    draw_clusters(&network, &clusters, &options)
}

fn run(cli: &Cli) -> Result<()> {
    let (fig, out) = match &cli.command {
        Command::Timescales(args) => (spectrum(args, false)?, &args.out),
        Command::Eigenvalues(args) => (spectrum(args, true)?, &args.out),
        Command::Clusters(args) => (clusters(args)?, &args.out),
        Command::DrawClusters(args) => (colored_clusters(args)?, &args.out),
    };
    fig.save(out)
}

fn main() {
    let cli = Cli::parse();

    // Initialize logger based on verbosity
    env_logger::Builder::new()
        .filter_level(match cli.verbose {
            0 => log::LevelFilter::Error,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        })
        .init();

    if let Some(threads) = cli.threads {
        if let Err(e) = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
        {
            error!("Could not configure {} threads: {}", threads, e);
            std::process::exit(1);
        }
    }

    info!("Starting visualization...");

    if let Err(e) = run(&cli) {
        error!("{}", e);
        std::process::exit(1);
    }

    info!("Done.");
}
