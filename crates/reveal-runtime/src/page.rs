#![forbid(unsafe_code)]

//! Step-based page runner.
//!
//! [`PageHandle`] drives reveals, counters, and the loaded marker without
//! timers, threads, or a global ready event. The host creates it with
//! [`PageHandle::initialize`], forwards visibility signals with
//! [`push_visibility`](PageHandle::push_visibility), and calls
//! [`step`](PageHandle::step) from its animation loop:
//!
//! ```text
//! animation frame
//!   → push_visibility(batch)   // IntersectionObserver entries
//!   → step(now, sink)          // activate, start counters, tick counters
//!   → apply sink patches       // text + class mutations
//! page teardown
//!   → dispose()                // cancel counters, drop pending watches
//! ```
//!
//! Deterministic replay: all inputs carry host timestamps, so feeding the
//! same batches at the same times produces identical patches.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use bitflags::bitflags;
use reveal_core::{VisibilityActivator, VisibilityEntry};
use tracing::{debug, info, trace};

use crate::animator::{CounterAnimator, JobId};
use crate::config::{ConfigError, PageConfig};
use crate::sink::{DisplaySink, ElementId};

bitflags! {
    /// Components wired up by [`PageHandle::initialize`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Components: u8 {
        /// One-shot reveal class on fade-in / slide-in elements.
        const REVEAL = 1 << 0;
        /// Counter animation on metric labels once visible.
        const COUNTERS = 1 << 1;
        /// Loaded marker class on the page root after a delay.
        const LOADED_MARKER = 1 << 2;
    }
}

impl Default for Components {
    fn default() -> Self {
        Self::all()
    }
}

/// What the runner does with an element once it becomes visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementRole {
    /// Add the reveal class.
    Reveal,
    /// Animate the element's label from the start value to its number.
    Counter,
}

impl ElementRole {
    /// Parse a host role name (`reveal`, `counter`).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "reveal" | "fade-in" | "slide-in-left" | "slide-in-right" => Some(Self::Reveal),
            "counter" | "metric-value" => Some(Self::Counter),
            _ => None,
        }
    }
}

/// A display element registered at initialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementSpec {
    pub id: ElementId,
    pub role: ElementRole,
    /// Text content at load time (the counter label for counters).
    pub label: String,
}

impl ElementSpec {
    #[must_use]
    pub fn reveal(id: impl Into<ElementId>) -> Self {
        Self {
            id: id.into(),
            role: ElementRole::Reveal,
            label: String::new(),
        }
    }

    #[must_use]
    pub fn counter(id: impl Into<ElementId>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: ElementRole::Counter,
            label: label.into(),
        }
    }
}

/// Whether a visibility signal source backs the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignalSource {
    #[default]
    Available,
    /// The host has no intersection observer; reveals and counters stay
    /// pending forever.
    Unavailable,
}

/// Outcome of a single [`PageHandle::step`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepResult {
    /// Visibility batches drained in this step.
    pub batches_processed: u32,
    /// Elements that transitioned to activated.
    pub activated: u32,
    /// Counter jobs started.
    pub counters_started: u32,
    /// Counter text updates written.
    pub frames_emitted: u32,
    /// Counter jobs still live after this step.
    pub active_jobs: u32,
    /// Whether the loaded marker was applied in this step.
    pub loaded: bool,
    /// Whether the page has been disposed.
    pub disposed: bool,
}

/// A running page. Dropping it is equivalent to [`dispose`](Self::dispose).
#[derive(Debug)]
pub struct PageHandle {
    config: PageConfig,
    components: Components,
    reveals: VisibilityActivator<ElementId>,
    counters: VisibilityActivator<ElementId>,
    labels: HashMap<ElementId, String>,
    animator: CounterAnimator,
    counter_jobs: HashMap<ElementId, JobId>,
    batches: VecDeque<Vec<VisibilityEntry<ElementId>>>,
    started_at: Option<Duration>,
    loaded_applied: bool,
    disposed: bool,
    frame_idx: u64,
}

impl PageHandle {
    /// Wire up `components` for `elements` with a working signal source.
    ///
    /// Fails with every config violation if `config` does not validate.
    pub fn initialize(
        config: PageConfig,
        components: Components,
        elements: impl IntoIterator<Item = ElementSpec>,
    ) -> Result<Self, Vec<ConfigError>> {
        Self::initialize_with(config, components, elements, SignalSource::Available)
    }

    /// Like [`initialize`](Self::initialize) with an explicit signal source.
    pub fn initialize_with(
        config: PageConfig,
        components: Components,
        elements: impl IntoIterator<Item = ElementSpec>,
        source: SignalSource,
    ) -> Result<Self, Vec<ConfigError>> {
        config.validate()?;

        let (mut reveals, mut counters) = match source {
            SignalSource::Available => (
                VisibilityActivator::new(config.reveal),
                VisibilityActivator::new(config.counters),
            ),
            SignalSource::Unavailable => (
                VisibilityActivator::inert(config.reveal),
                VisibilityActivator::inert(config.counters),
            ),
        };

        let mut labels = HashMap::new();
        for element in elements {
            match element.role {
                ElementRole::Reveal if components.contains(Components::REVEAL) => {
                    reveals.watch(element.id);
                }
                ElementRole::Counter if components.contains(Components::COUNTERS) => {
                    counters.watch(element.id);
                    labels.insert(element.id, element.label);
                }
                role => trace!(element = %element.id, ?role, "component disabled; element ignored"),
            }
        }

        info!(
            reveals = reveals.pending_count(),
            counters = counters.pending_count(),
            ?components,
            config = %config.summary_short(),
            "page initialized"
        );

        Ok(Self {
            config,
            components,
            reveals,
            counters,
            labels,
            animator: CounterAnimator::new(),
            counter_jobs: HashMap::new(),
            batches: VecDeque::new(),
            started_at: None,
            loaded_applied: false,
            disposed: false,
            frame_idx: 0,
        })
    }

    // -- Signal delivery ----------------------------------------------------

    /// Buffer a visibility batch for the next `step`. Ignored after dispose.
    pub fn push_visibility(&mut self, batch: impl IntoIterator<Item = VisibilityEntry<ElementId>>) {
        if self.disposed {
            return;
        }
        self.batches.push_back(batch.into_iter().collect());
    }

    /// Decode a host-encoded message and buffer it if it is a visibility
    /// batch. Returns `true` if a batch was accepted.
    #[cfg(feature = "host-json")]
    pub fn push_encoded_visibility(&mut self, json: &str) -> bool {
        match crate::signal::parse_encoded_signal(json) {
            Ok(Some(batch)) if !self.disposed => {
                self.push_visibility(batch);
                true
            }
            Ok(_) => false,
            Err(err) => {
                debug!(%err, "rejected encoded visibility signal");
                false
            }
        }
    }

    // -- Step ---------------------------------------------------------------

    /// Process buffered signals, apply the loaded marker when due, and tick
    /// every live counter once.
    ///
    /// `now` is the monotonic host timestamp (e.g. `performance.now()` as a
    /// `Duration`). The first call fixes the page start time.
    pub fn step<S: DisplaySink + ?Sized>(&mut self, now: Duration, sink: &mut S) -> StepResult {
        if self.disposed {
            return StepResult {
                disposed: true,
                ..StepResult::default()
            };
        }

        let mut result = StepResult::default();
        let started_at = *self.started_at.get_or_insert(now);

        while let Some(batch) = self.batches.pop_front() {
            self.process_batch(&batch, sink, &mut result);
            result.batches_processed += 1;
        }

        if self.components.contains(Components::LOADED_MARKER)
            && !self.loaded_applied
            && now.saturating_sub(started_at) >= self.config.loaded_delay
        {
            sink.add_class(ElementId::ROOT, &self.config.loaded_class);
            self.loaded_applied = true;
            result.loaded = true;
            debug!(class = %self.config.loaded_class, "loaded marker applied");
        }

        let tick = self.animator.tick(now, sink);
        result.frames_emitted = u32::try_from(tick.frames_emitted).unwrap_or(u32::MAX);
        if tick.finished > 0 {
            self.counter_jobs.retain(|_, id| self.animator.is_active(*id));
        }
        result.active_jobs = u32::try_from(self.animator.active_count()).unwrap_or(u32::MAX);

        self.frame_idx += 1;
        result
    }

    fn process_batch<S: DisplaySink + ?Sized>(
        &mut self,
        batch: &[VisibilityEntry<ElementId>],
        sink: &mut S,
        result: &mut StepResult,
    ) {
        let reveal_class = self.config.reveal_class.as_str();
        self.reveals.observe_batch_with(batch.iter().copied(), |element| {
            sink.add_class(element, reveal_class);
            result.activated += 1;
        });

        for element in self.counters.observe_batch(batch.iter().copied()) {
            result.activated += 1;
            let Some(label) = self.labels.remove(&element) else {
                continue;
            };
            let defaults = self.config.counter_defaults();
            if let Some(job) = self.animator.animate_label(element, &label, defaults) {
                self.counter_jobs.insert(element, job);
                result.counters_started += 1;
            }
        }
    }

    // -- Teardown -----------------------------------------------------------

    /// Cancel a single element's counter. Idempotent.
    pub fn cancel_counter(&mut self, element: ElementId) -> bool {
        match self.counter_jobs.remove(&element) {
            Some(job) => self.animator.cancel(job),
            None => false,
        }
    }

    /// Cancel every counter and drop every pending watch. Idempotent;
    /// subsequent steps do nothing.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        let cancelled = self.animator.cancel_all();
        let reveals = self.reveals.clear();
        let counters = self.counters.clear();
        self.counter_jobs.clear();
        self.labels.clear();
        self.batches.clear();
        info!(
            cancelled_counters = cancelled,
            dropped_watches = reveals + counters,
            "page disposed"
        );
    }

    // -- Accessors ----------------------------------------------------------

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    #[must_use]
    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    #[must_use]
    pub fn components(&self) -> Components {
        self.components
    }

    /// Reveal activator (state queries).
    #[must_use]
    pub fn reveals(&self) -> &VisibilityActivator<ElementId> {
        &self.reveals
    }

    /// Counter activator (state queries).
    #[must_use]
    pub fn counters(&self) -> &VisibilityActivator<ElementId> {
        &self.counters
    }

    /// Live counter jobs.
    #[must_use]
    pub fn active_counters(&self) -> usize {
        self.animator.active_count()
    }

    /// Number of completed steps.
    #[must_use]
    pub fn frame_idx(&self) -> u64 {
        self.frame_idx
    }
}

impl Drop for PageHandle {
    fn drop(&mut self) {
        self.dispose();
    }
}
