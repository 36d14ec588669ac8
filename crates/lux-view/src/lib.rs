//! # lux-view
//!
//! Platform-independent presentation core for an HDR/SDR image
//! inspection tool.
//!
//! A host window owns a [`Viewer`] and drives it with plain callbacks:
//! platform changes ([`Viewer::set_platform_size`],
//! [`Viewer::set_hdr_active`]), mouse events, load requests, and one
//! [`Viewer::render`] call per frame. The render call returns a
//! [`Frame`]: an ordered list of [`Blit`] commands for the host's
//! renderer plus the control hit areas active until the next frame.
//!
//! The pieces:
//!
//! - [`loader`] - deferred-load sequencing (slow decodes never run on
//!   the frame that requested them)
//! - [`viewer`] - state, the color-preparation policy, and interaction
//! - [`position`] - fit, pan, and anchor-preserving zoom
//! - [`control`] - sliders with typed values and per-frame hit areas
//! - [`render`] - blit-list construction, text layout, info pane
//!
//! Everything is single-threaded: the viewer mutates only inside host
//! callbacks on the host's thread, and pixel work is delegated to a
//! [`lux_pipeline::Pipeline`] implementation.
//!
//! # Example
//!
//! ```rust
//! use lux_pipeline::{testing::FakePipeline, ImageData, Profile};
//! use lux_view::Viewer;
//!
//! let pipeline = FakePipeline::new();
//! pipeline.add_image("/shot.png", ImageData::solid(8, 8, 8, Profile::sdr(80), [0; 4]));
//!
//! let mut viewer = Viewer::new(pipeline);
//! viewer.set_platform_size(1280.0, 720.0);
//! viewer.set_file_list(vec!["/shot.png".into()]);
//! viewer.load_image(0);
//!
//! // The load is announced for a couple of frames, then performed.
//! while viewer.prepared_image().is_none() {
//!     let _frame = viewer.render();
//! }
//! assert!(viewer.take_dirty());
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod blit;
pub mod control;
pub mod error;
pub mod glyph;
pub mod loader;
pub mod overlay;
pub mod position;
pub mod render;
pub mod transfer;
pub mod viewer;

pub use blit::{Blit, BlitKind, Color, RectF};
pub use control::{ActiveControl, ControlFlags, Slider, SliderId, SliderValue};
pub use error::DiffFailure;
pub use loader::{LoadRequest, LoadSequencer, SequencerStep, LOAD_ANNOUNCE_FRAMES};
pub use overlay::{Overlay, OVERLAY_DURATION, OVERLAY_FADE};
pub use position::{ViewTransform, MAX_SCALE, MIN_SCALE, SCALE_TIERS};
pub use render::Frame;
pub use viewer::{DiffIntensity, PlatformState, Selection, Viewer};
