#![forbid(unsafe_code)]

//! `wasm-bindgen` exports for [`RevealPage`].
//!
//! This module wraps [`super::runner_core::RunnerCore`] with JS-friendly types.
//! Only compiled on `wasm32` targets.

use js_sys::{Array, Object, Reflect};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use super::runner_core::RunnerCore;

fn console_error(msg: &str) {
    let global = js_sys::global();
    let Ok(console) = Reflect::get(&global, &"console".into()) else {
        return;
    };
    let Ok(error) = Reflect::get(&console, &"error".into()) else {
        return;
    };
    let Ok(error_fn) = error.dyn_into::<js_sys::Function>() else {
        return;
    };
    let _ = error_fn.call1(&console, &JsValue::from_str(msg));
}

fn install_panic_hook() {
    use std::sync::Once;

    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        std::panic::set_hook(Box::new(|info| {
            let msg = if let Some(loc) = info.location() {
                format!(
                    "panic at {}:{}:{}: {info}",
                    loc.file(),
                    loc.line(),
                    loc.column()
                )
            } else {
                format!("panic: {info}")
            };
            console_error(&msg);
        }));
    });
}

/// Scroll reveals and metric counters for one page.
///
/// Host-driven: JavaScript registers elements, forwards
/// `IntersectionObserver` entries, calls `step` from `requestAnimationFrame`,
/// and applies the returned patches to the DOM.
#[wasm_bindgen]
pub struct RevealPage {
    inner: RunnerCore,
}

#[wasm_bindgen(start)]
pub fn wasm_start() {
    install_panic_hook();
}

#[wasm_bindgen]
impl RevealPage {
    /// Create a page with optional JSON config overrides.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Self {
        install_panic_hook();
        Self {
            inner: RunnerCore::new(config_json.as_deref()),
        }
    }

    /// Register an element (`role` is `reveal` or `counter`) before `init`.
    #[wasm_bindgen(js_name = addElement)]
    pub fn add_element(&mut self, id: u32, role: &str, label: &str) -> bool {
        self.inner.add_element(id, role, label)
    }

    /// Wire up components: bit 0 reveal, bit 1 counters, bit 2 loaded marker.
    pub fn init(&mut self, components: u8) -> bool {
        self.inner.init(components)
    }

    /// Queue a JSON visibility batch. Returns `true` if accepted.
    #[wasm_bindgen(js_name = pushVisibility)]
    pub fn push_visibility(&mut self, json: &str) -> bool {
        self.inner.push_visibility(json)
    }

    /// Advance to `now_ms`.
    /// Returns `{ batches_processed, activated, counters_started,
    /// frames_emitted, active_jobs, loaded, disposed }`.
    pub fn step(&mut self, now_ms: f64) -> JsValue {
        let result = self.inner.step(now_ms);
        let obj = Object::new();
        let _ = Reflect::set(
            &obj,
            &"batches_processed".into(),
            &result.batches_processed.into(),
        );
        let _ = Reflect::set(&obj, &"activated".into(), &result.activated.into());
        let _ = Reflect::set(
            &obj,
            &"counters_started".into(),
            &result.counters_started.into(),
        );
        let _ = Reflect::set(&obj, &"frames_emitted".into(), &result.frames_emitted.into());
        let _ = Reflect::set(&obj, &"active_jobs".into(), &result.active_jobs.into());
        let _ = Reflect::set(&obj, &"loaded".into(), &result.loaded.into());
        let _ = Reflect::set(&obj, &"disposed".into(), &result.disposed.into());
        obj.into()
    }

    /// Drain DOM patches. Returns `Array<{ op, id, value }>` where `op` is
    /// `text`, `add`, or `remove` and id 0 is the page root.
    #[wasm_bindgen(js_name = takePatches)]
    pub fn take_patches(&mut self) -> Array {
        let arr = Array::new();
        for patch in self.inner.take_patches() {
            let obj = Object::new();
            let _ = Reflect::set(&obj, &"op".into(), &patch.op().into());
            let _ = Reflect::set(&obj, &"id".into(), &patch.element().0.into());
            let _ = Reflect::set(&obj, &"value".into(), &patch.value().into());
            arr.push(&obj);
        }
        arr
    }

    /// Config diagnostics. Returns `Array<string>`.
    #[wasm_bindgen(js_name = configErrors)]
    pub fn config_errors(&self) -> Array {
        self.inner
            .config_errors()
            .iter()
            .map(|err| JsValue::from_str(err))
            .collect()
    }

    /// Steps completed so far.
    #[wasm_bindgen(js_name = frameIdx)]
    pub fn frame_idx(&self) -> u64 {
        self.inner.frame_idx()
    }

    #[wasm_bindgen(js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.inner.is_running()
    }

    /// Cancel counters and stop watching. Safe to call more than once.
    pub fn dispose(&mut self) {
        self.inner.dispose();
    }
}
