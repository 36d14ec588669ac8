//! # lux-pipeline
//!
//! Interface to the external color-management library consumed by
//! `lux-view`.
//!
//! The viewer core never performs pixel-level color math itself; it asks
//! a [`Pipeline`] implementation to decode files, convert between color
//! volumes, compute image diffs, and classify sRGB highlights. This crate
//! defines that seam:
//!
//! - [`ImageData`] - decoded RGBA16 pixels plus attached [`Profile`]
//! - [`Profile`], [`Primaries`], [`Curve`] - color volume descriptions
//! - [`TonemapParams`], [`ConvertRequest`] - conversion requests
//! - [`DiffResult`], [`HighlightResult`] - derived-image results
//! - [`Pipeline`] - the trait a real color library implements
//!
//! The [`testing`] module ships an in-memory [`testing::FakePipeline`]
//! so the viewer core can be exercised without any real decoder.
//!
//! # Usage
//!
//! ```rust
//! use lux_pipeline::{Profile, Primaries};
//!
//! let hdr = Profile::stock(Primaries::Bt2020, lux_pipeline::CurveKind::Pq, 10000);
//! assert!(hdr.describe().contains("PQ"));
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod diff;
pub mod error;
pub mod highlight;
pub mod image;
pub mod pipeline;
pub mod profile;
pub mod testing;
pub mod tonemap;

pub use diff::DiffResult;
pub use error::{PipelineError, Result};
pub use highlight::{HighlightPixel, HighlightResult, HighlightStats};
pub use image::{Decoded, ImageData, PixelInfo};
pub use pipeline::Pipeline;
pub use profile::{hlg_peak_luminance, Curve, CurveKind, Primaries, Profile};
pub use tonemap::{ConvertRequest, TonemapMode, TonemapParams};
