#![forbid(unsafe_code)]

//! Options object and event payloads exchanged with the page.
//!
//! Everything here is plain data so it builds and tests on native targets;
//! the wasm bindings only move strings across the JS boundary.

use core::time::Duration;

use aura_motion::MotionConfig;
use aura_motion::error::ConfigError;
use aura_motion::host::LayerEvent;
use serde_json::json;

/// Parse the constructor options.
///
/// `None`, an empty string and the JSON literals `null` / `undefined` mean
/// "all defaults". When the options carry no `seed`, `seed` is called for
/// one so that each page load gets its own field.
pub fn parse_options(json: Option<&str>, seed: impl FnOnce() -> u64) -> Result<MotionConfig, ConfigError> {
    let config = match json.map(str::trim) {
        None | Some("" | "null" | "undefined") => MotionConfig::default(),
        Some(text) => MotionConfig::from_json(text)?,
    };
    Ok(match config.seed {
        Some(_) => config,
        None => config.with_seed(seed()),
    })
}

/// Map a uniform `[0, 1)` sample (`Math.random()`) onto a seed.
pub fn seed_from_unit(sample: f64) -> u64 {
    if sample.is_finite() && sample > 0.0 {
        (sample.min(1.0) * u64::MAX as f64) as u64
    } else {
        0
    }
}

/// `detail` object of the DOM event for `event`, as JSON.
pub fn event_detail_json(event: &LayerEvent) -> String {
    let detail = match event {
        LayerEvent::Ready { success } => json!({ "success": success }),
        LayerEvent::Error { reason } => json!({
            "success": false,
            "error": reason.to_string(),
            "kind": reason.kind(),
        }),
    };
    detail.to_string()
}

/// Convert a DOM high-resolution timestamp (milliseconds) to a duration.
pub fn timestamp(millis: f64) -> Duration {
    if millis.is_finite() && millis > 0.0 {
        Duration::from_secs_f64(millis / 1000.0)
    } else {
        Duration::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aura_motion::LayerError;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_options_use_defaults_with_fresh_seed() {
        for json in [None, Some(""), Some("null"), Some(" undefined ")] {
            let config = parse_options(json, || 42).unwrap();
            assert_eq!(config.seed, Some(42));
            assert_eq!(config.particle_count, 40);
        }
    }

    #[test]
    fn explicit_seed_wins() {
        let config = parse_options(Some(r#"{"seed": 5, "particleCount": 8}"#), || 42).unwrap();
        assert_eq!(config.seed, Some(5));
        assert_eq!(config.particle_count, 8);
    }

    #[test]
    fn malformed_options_are_rejected() {
        assert!(parse_options(Some("{particleCount: 3"), || 0).is_err());
    }

    #[test]
    fn seed_from_unit_is_total() {
        assert_eq!(seed_from_unit(f64::NAN), 0);
        assert_eq!(seed_from_unit(-1.0), 0);
        assert!(seed_from_unit(0.5) > 0);
        assert_eq!(seed_from_unit(2.0), u64::MAX);
    }

    #[test]
    fn event_details_match_dom_contract() {
        assert_eq!(
            event_detail_json(&LayerEvent::Ready { success: true }),
            r#"{"success":true}"#
        );
        let detail: serde_json::Value = serde_json::from_str(&event_detail_json(&LayerEvent::Error {
            reason: LayerError::ContextAcquisitionFailure("2d context unavailable"),
        }))
        .unwrap();
        assert_eq!(detail["success"], false);
        assert_eq!(detail["kind"], "context_acquisition_failure");
        assert_eq!(detail["error"], "drawing context unavailable: 2d context unavailable");
    }

    #[test]
    fn timestamps_clamp_to_zero() {
        assert_eq!(timestamp(16.0), Duration::from_millis(16));
        assert_eq!(timestamp(-3.0), Duration::ZERO);
        assert_eq!(timestamp(f64::INFINITY), Duration::ZERO);
    }
}
