//! # Landclass Colormap
//!
//! Display colors for land-cover labels and classification rendering.
//!
//! Label colors come exclusively from the [`LabelRegistry`](landclass_core::LabelRegistry),
//! so every consumer shows the same palette. The main entry point is
//! [`classification_overlay`], which blends the label colors over the
//! source photograph.
//!
//! ## Usage
//!
//! ```ignore
//! use landclass_colormap::classification_overlay;
//!
//! let overlay = classification_overlay(&image, &labels, &config.labels, 0.5);
//! ```

mod palette;
mod render;

pub use palette::{LabelPalette, Rgb};
pub use render::{blend, classification_overlay, classification_to_rgba, colorize};
