#![forbid(unsafe_code)]

//! WASM frontend for the Aura motion layer.
//!
//! Exposes `AuraBackground` to JavaScript:
//!
//! ```js
//! const aura = new AuraBackground({ particleCount: 60, pointerParallax: true, gradient: {}, blobs: {} });
//! window.addEventListener("auraBackgroundError", (e) => console.warn(e.detail.error));
//! aura.stop();
//! aura.reinitialize({ colorPalette: ["#D7BFA5", "#FEF9F6"] });
//! aura.destroy();
//! ```
//!
//! The browser host lives in `host`; option parsing, event payloads and
//! frame bookkeeping are in [`options`] and [`frames`] so they can be tested
//! natively.

pub mod frames;
pub mod options;

#[cfg(target_arch = "wasm32")]
mod host;
#[cfg(target_arch = "wasm32")]
mod logging;
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::AuraBackground;

#[cfg(not(target_arch = "wasm32"))]
use aura_motion::{MotionConfig, error::ConfigError};

/// Native builds compile this crate as a stub so `cargo check --workspace` stays
/// green on non-wasm targets. It validates options the same way the browser
/// build does but never draws.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct AuraBackground {
    config: MotionConfig,
}

#[cfg(not(target_arch = "wasm32"))]
impl AuraBackground {
    pub fn new(options_json: Option<&str>) -> Result<Self, ConfigError> {
        let config = options::parse_options(options_json, || aura_motion::layer::DEFAULT_SEED)?;
        tracing::debug!(particles = config.particle_count, "native stub configured");
        Ok(Self { config })
    }

    pub fn is_running(&self) -> bool {
        false
    }

    pub fn particle_count(&self) -> usize {
        self.config.particle_count
    }

    pub fn config(&self) -> &MotionConfig {
        &self.config
    }
}
