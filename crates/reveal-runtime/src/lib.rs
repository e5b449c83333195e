#![forbid(unsafe_code)]

//! Page runtime for scroll reveals and metric counters.
//!
//! # Role in the workspace
//! `reveal-runtime` wires the pure state machines from `reveal-core` to a
//! host: it owns the per-page watch sets, the counter job registry, the
//! loaded marker, and the [`DisplaySink`] seam through which every visible
//! effect flows.
//!
//! # Primary responsibilities
//! - **PageHandle**: step-based runner driven by host timestamps.
//! - **CounterAnimator**: live counter jobs, one per element.
//! - **PageConfig**: env- and JSON-overridable settings with diagnostics.
//! - **Signal decoding**: JSON visibility batches (`host-json` feature).
//!
//! # How it fits in the system
//! The wasm host (`reveal-web`) forwards `IntersectionObserver` entries into
//! a [`PageHandle`] and applies the recorded patches to the DOM. Native tests
//! drive the same handle with a [`PatchRecorder`].

pub mod animator;
pub mod config;
pub mod page;
#[cfg(feature = "host-json")]
pub mod signal;
pub mod sink;

pub use animator::{CounterAnimator, CounterDefaults, JobId, TickSummary};
pub use config::{ConfigError, PageConfig, PageConfigParse};
pub use page::{Components, ElementRole, ElementSpec, PageHandle, SignalSource, StepResult};
#[cfg(feature = "host-json")]
pub use signal::{SignalParseError, VisibilityBatch, parse_encoded_signal};
pub use sink::{DisplaySink, DomPatch, ElementId, PatchRecorder};

pub use reveal_core::{Easing, ObserverOptions, RootMargin, VisibilityEntry, WatchState};
