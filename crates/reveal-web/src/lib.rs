#![forbid(unsafe_code)]

//! WASM bindings for the Reveal page runtime.
//!
//! This crate provides [`RevealPage`], a `wasm-bindgen`-exported struct that
//! wraps `reveal_runtime::PageHandle` and exposes it to JavaScript for
//! host-driven execution. The host owns the `IntersectionObserver` and the
//! animation loop; the runtime only decides what to change.

#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::RevealPage;

// Runner core is used by the wasm module and by native tests.
#[cfg(any(target_arch = "wasm32", test))]
mod runner_core;
