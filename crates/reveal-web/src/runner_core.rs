#![forbid(unsafe_code)]

//! Platform-independent runner core wrapping [`PageHandle`].
//!
//! This module contains the logic shared between the wasm-bindgen exports
//! and the native test harness. No JS/WASM types here.

use core::time::Duration;

use reveal_runtime::{
    Components, DomPatch, ElementId, ElementRole, ElementSpec, PageConfig, PageHandle,
    PatchRecorder, StepResult,
};
use tracing::warn;

/// Platform-independent page runner.
///
/// Lifecycle: `new` → `add_element`* → `init` → (`push_visibility`* →
/// `step` → `take_patches`)* → `dispose`.
pub struct RunnerCore {
    config: PageConfig,
    /// Elements registered before `init`.
    elements: Vec<ElementSpec>,
    page: Option<PageHandle>,
    patches: PatchRecorder,
    /// Config diagnostics, human-readable.
    config_errors: Vec<String>,
}

impl RunnerCore {
    /// Create a runner. `config_json` uses the env keys without the
    /// `REVEAL_` prefix, lowercased. Invalid or malformed overrides keep
    /// their defaults and are reported by [`config_errors`](Self::config_errors).
    pub fn new(config_json: Option<&str>) -> Self {
        let mut config_errors = Vec::new();
        let config = match config_json.map(PageConfig::from_json) {
            None => PageConfig::default(),
            Some(Ok(parsed)) => {
                config_errors.extend(parsed.errors.iter().map(ToString::to_string));
                parsed.config
            }
            Some(Err(err)) => {
                config_errors.push(err.to_string());
                PageConfig::default()
            }
        };
        for err in &config_errors {
            warn!(error = %err, "ignoring config override");
        }
        Self {
            config,
            elements: Vec::new(),
            page: None,
            patches: PatchRecorder::new(),
            config_errors,
        }
    }

    /// Register an element before `init`.
    ///
    /// Returns `false` after `init`, for an unknown role, or for id 0
    /// (reserved for the page root).
    pub fn add_element(&mut self, id: u32, role: &str, label: &str) -> bool {
        if self.page.is_some() || id == ElementId::ROOT.0 {
            return false;
        }
        let Some(role) = ElementRole::parse(role) else {
            return false;
        };
        self.elements.push(ElementSpec {
            id: ElementId(id),
            role,
            label: label.to_owned(),
        });
        true
    }

    /// Wire up the components in the `components` bit set. Call exactly once.
    ///
    /// Returns `false` if already initialized or the config fails validation.
    pub fn init(&mut self, components: u8) -> bool {
        if self.page.is_some() {
            return false;
        }
        let components = Components::from_bits_truncate(components);
        let elements = std::mem::take(&mut self.elements);
        match PageHandle::initialize(self.config.clone(), components, elements) {
            Ok(page) => {
                self.page = Some(page);
                true
            }
            Err(errors) => {
                for err in errors {
                    warn!(error = %err, "page config rejected");
                    self.config_errors.push(err.to_string());
                }
                false
            }
        }
    }

    /// Parse a JSON-encoded visibility batch and queue it for the next step.
    pub fn push_visibility(&mut self, json: &str) -> bool {
        match self.page.as_mut() {
            Some(page) => page.push_encoded_visibility(json),
            None => false,
        }
    }

    /// Advance the page to host time `now_ms` (e.g. `performance.now()`).
    pub fn step(&mut self, now_ms: f64) -> StepResult {
        match self.page.as_mut() {
            Some(page) => page.step(ms_to_duration(now_ms), &mut self.patches),
            None => StepResult::default(),
        }
    }

    /// Drain the patches recorded since the last call.
    pub fn take_patches(&mut self) -> Vec<DomPatch> {
        self.patches.drain()
    }

    /// Cancel counters and drop watches. Idempotent.
    pub fn dispose(&mut self) {
        if let Some(page) = self.page.as_mut() {
            page.dispose();
        }
    }

    /// Whether `init` succeeded and the page has not been disposed.
    pub fn is_running(&self) -> bool {
        self.page.as_ref().is_some_and(|page| !page.is_disposed())
    }

    /// Steps completed so far.
    pub fn frame_idx(&self) -> u64 {
        self.page.as_ref().map_or(0, PageHandle::frame_idx)
    }

    pub fn config_errors(&self) -> &[String] {
        &self.config_errors
    }
}

/// Host timestamps are clamped to non-negative finite milliseconds.
fn ms_to_duration(ms: f64) -> Duration {
    if ms.is_finite() && ms > 0.0 {
        Duration::try_from_secs_f64(ms / 1000.0).unwrap_or(Duration::MAX)
    } else {
        Duration::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ms_conversion_clamps() {
        assert_eq!(ms_to_duration(16.0), Duration::from_millis(16));
        assert_eq!(ms_to_duration(-5.0), Duration::ZERO);
        assert_eq!(ms_to_duration(f64::NAN), Duration::ZERO);
        assert_eq!(ms_to_duration(f64::INFINITY), Duration::ZERO);
    }
}
