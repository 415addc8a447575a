//! Renders circular official seals (stamps) from a declarative [`SealConfig`].
//!
//! A seal is laid out once by the [`layout`] engine, and then drawn by one of two backends:
//! - [`render_seal`] draws onto any canvas-like raster [`Surface`]
//! - [`render_seal_document`] produces a standalone SVG document
//!
//! Both backends draw from the same [`layout::SealLayout`], so a character on the raster surface
//! sits in exactly the same place as the corresponding character in the SVG document.

use vector2d::Vector2D;

mod config;
mod error;
pub mod layout;
pub mod raster;
pub mod svg;
pub mod utils;

pub use config::{color_to_hex, parse_hex_color, CenterMark, Effect, SealConfig};
pub use error::{Error, Result};
pub use raster::{render_seal, RecordingSurface, Surface};
pub use svg::render_seal_document;

/// Type alias for 2D floating point vectors (in the geometric sense, unlike [`Vec`])
pub type V2 = Vector2D<f32>;
