#![forbid(unsafe_code)]

//! Ambient motion layer for the Aura site background.
//!
//! A field of soft translucent particles (and, optionally, a blurred base
//! gradient and pointer-parallax blobs) drawn onto a viewport-sized surface
//! behind page content.
//!
//! Design goals:
//! - **Host-driven**: the embedding environment owns the surface, the frame
//!   callback mechanism and the clock. This crate never blocks, never spawns
//!   threads and never reads wall-clock time.
//! - **Deterministic**: given the same seed, viewport and timestamps the
//!   particle field evolves identically. [`headless::HeadlessHost`] makes
//!   every behavior testable without a browser.
//! - **Never fatal**: initialization failures fall back to a static
//!   background color and a single error notification.
//!
//! # Lifecycle
//!
//! ```
//! use aura_motion::config::MotionConfig;
//! use aura_motion::geometry::Viewport;
//! use aura_motion::headless::HeadlessHost;
//! use aura_motion::layer::AmbientMotionLayer;
//! use core::time::Duration;
//!
//! let host = HeadlessHost::new(Viewport::new(800.0, 600.0));
//! let mut layer = AmbientMotionLayer::new(host);
//! layer.initialize(MotionConfig::default().with_seed(7)).unwrap();
//! layer.start();
//!
//! let handle = layer.pending_frame().unwrap();
//! layer.on_frame(handle, Duration::from_millis(16));
//! layer.stop();
//! assert!(layer.pending_frame().is_none());
//! ```

pub mod blob;
pub mod color;
pub mod config;
pub mod debounce;
pub mod error;
pub mod geometry;
pub mod gradient;
pub mod headless;
pub mod host;
pub mod layer;
pub mod logging;
pub mod pacing;
pub mod particle;
pub mod stage;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, error, info, trace, warn};

pub use config::MotionConfig;
pub use error::LayerError;
pub use host::{DrawSurface, FrameHandle, LayerEvent, MotionHost};
pub use layer::{AmbientMotionLayer, LayerState};
pub use stage::MotionStage;
