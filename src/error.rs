//! Error types for configuration loading and rendering

use thiserror::Error;

/// Result type alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading a [`SealConfig`](crate::SealConfig) or rendering it
#[derive(Error, Debug)]
pub enum Error {
    /// A colour string was not of the form `#RGB` or `#RRGGBB`
    #[error("Invalid colour '{0}': expected #RGB or #RRGGBB")]
    InvalidColor(String),

    /// A configuration value breaks one of the configuration's invariants
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The raster surface wasn't sized to the seal before rendering
    #[error("Surface is {width}x{height} but the seal needs {expected}x{expected}")]
    SurfaceSize { expected: u32, width: u32, height: u32 },

    /// The JSON form of a configuration couldn't be parsed or produced
    #[error("Configuration JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
