//! Error type shared by the loaders, layout, and renderers.

use thiserror::Error;

/// Errors that can occur while loading inputs, laying out, or drawing.
#[derive(Debug, Error)]
pub enum VizError {
    /// Reading an input or writing an SVG failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Encoding a raster image failed
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Malformed record in an input file
    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    /// A node id that is not part of the network
    #[error("Node {0:?} is not in the network")]
    UnknownNode(String),

    /// A node lacks a required attribute
    #[error("Node {node:?} has no attribute {attribute:?}")]
    MissingAttribute { node: String, attribute: String },

    /// A node attribute is text where a number is needed
    #[error("Attribute {attribute:?} of node {node:?} is not numeric")]
    NonNumericAttribute { node: String, attribute: String },

    /// No values to derive color bounds from
    #[error("No values for attribute {0:?} to derive color bounds from")]
    EmptyAttribute(String),

    /// A drawn node has no entry in the position mapping
    #[error("No position for node {0:?}")]
    MissingPosition(String),

    /// Per-node values do not line up with the node list
    #[error("Expected {expected} values, found {found}")]
    ShapeMismatch { expected: usize, found: usize },

    /// Colormap name not known
    #[error("Unknown colormap {0:?}")]
    UnknownColormap(String),

    /// Color string not understood
    #[error("Unknown color {0:?}")]
    UnknownColor(String),

    /// A node listed in more than one cluster
    #[error("Node {0:?} appears in more than one cluster")]
    DuplicateClusterMember(String),
}

pub type Result<T> = std::result::Result<T, VizError>;
