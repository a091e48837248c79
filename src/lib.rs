//! Grayscale conversion for uncompressed 24-bit BMP files.
//!
//! The headers are carried through untouched; only the pixel rows are rewritten.

pub mod bmp;
pub mod common;
pub mod error;
pub mod grayscale;
pub mod pipeline;

pub use common::{BgrImage, Pixel};
pub use error::{BmpError, HeaderKind};
pub use pipeline::run;
