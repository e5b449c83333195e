#![forbid(unsafe_code)]

//! Counter animator: a registry of in-flight counter jobs.
//!
//! Each job owns one display element's text for its lifetime. The host calls
//! [`CounterAnimator::tick`] once per animation frame; every live job samples
//! its value and writes one text update to the sink. Jobs leave the registry
//! when they emit their terminal frame or are cancelled.
//!
//! # Invariants
//!
//! 1. At most one live job per element.
//! 2. A job emits exactly one text per tick until its terminal frame, then
//!    nothing.
//! 3. `cancel` is idempotent and never emits.
//! 4. Jobs tick in id order, but no caller may rely on one job finishing
//!    before another starts.

use std::collections::BTreeMap;
use std::time::Duration;

use reveal_core::{CounterJob, CounterLabel, CounterSpec, Easing};
use tracing::{debug, trace};

use crate::sink::{DisplaySink, ElementId};

/// Handle for a started counter job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(u64);

impl JobId {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Start value, duration, and curve applied to counters started from labels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CounterDefaults {
    pub start: f64,
    pub duration: Duration,
    pub easing: Easing,
}

impl Default for CounterDefaults {
    fn default() -> Self {
        Self {
            start: 0.0,
            duration: Duration::from_millis(1500),
            easing: Easing::EaseOutQuart,
        }
    }
}

/// Outcome of one [`CounterAnimator::tick`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    /// Text updates written to the sink.
    pub frames_emitted: usize,
    /// Jobs that emitted their terminal frame.
    pub finished: usize,
}

#[derive(Debug)]
struct ActiveJob {
    element: ElementId,
    job: CounterJob,
}

/// Registry of live counter jobs.
#[derive(Debug, Default)]
pub struct CounterAnimator {
    jobs: BTreeMap<JobId, ActiveJob>,
    next_id: u64,
}

impl CounterAnimator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a counter on `element`.
    ///
    /// Returns `None` if the element already has a live counter.
    pub fn animate(
        &mut self,
        element: ElementId,
        spec: CounterSpec,
        label: CounterLabel,
    ) -> Option<JobId> {
        if self.is_element_busy(element) {
            debug!(%element, "counter already running on element; start refused");
            return None;
        }
        let id = JobId(self.next_id);
        self.next_id += 1;
        debug!(
            job = id.0,
            %element,
            start = spec.start(),
            target = spec.target(),
            duration_ms = u64::try_from(spec.duration().as_millis()).unwrap_or(u64::MAX),
            "counter started"
        );
        self.jobs.insert(
            id,
            ActiveJob {
                element,
                job: CounterJob::new(spec, label),
            },
        );
        Some(id)
    }

    /// Parse `label` and start a counter toward its value.
    ///
    /// Labels without a numeric value are skipped silently (`None`).
    pub fn animate_label(
        &mut self,
        element: ElementId,
        label: &str,
        defaults: CounterDefaults,
    ) -> Option<JobId> {
        let Some(parsed) = CounterLabel::parse(label) else {
            trace!(%element, label, "label has no numeric value; counter skipped");
            return None;
        };
        let spec = CounterSpec::new(defaults.start, parsed.target(), defaults.duration)
            .with_easing(defaults.easing);
        self.animate(element, spec, parsed)
    }

    /// Advance every live job to host time `now`, writing one text per job.
    pub fn tick<S: DisplaySink + ?Sized>(&mut self, now: Duration, sink: &mut S) -> TickSummary {
        let mut summary = TickSummary::default();
        let mut done = Vec::new();

        for (&id, active) in &mut self.jobs {
            let Some(frame) = active.job.tick(now) else {
                done.push(id);
                continue;
            };
            sink.set_text(active.element, &frame.text);
            summary.frames_emitted += 1;
            if frame.finished {
                debug!(job = id.0, element = %active.element, text = %frame.text, "counter finished");
                summary.finished += 1;
                done.push(id);
            }
        }

        for id in done {
            self.jobs.remove(&id);
        }
        summary
    }

    /// Stop a job before completion. Idempotent; returns `true` only when a
    /// live job was stopped.
    pub fn cancel(&mut self, id: JobId) -> bool {
        match self.jobs.remove(&id) {
            Some(mut active) => {
                let cancelled = active.job.cancel();
                if cancelled {
                    debug!(job = id.0, element = %active.element, "counter cancelled");
                }
                cancelled
            }
            None => false,
        }
    }

    /// Cancel every live job (page teardown). Returns how many were stopped.
    pub fn cancel_all(&mut self) -> usize {
        let ids: Vec<JobId> = self.jobs.keys().copied().collect();
        ids.into_iter().filter(|&id| self.cancel(id)).count()
    }

    #[must_use]
    pub fn is_active(&self, id: JobId) -> bool {
        self.jobs.contains_key(&id)
    }

    /// Whether `element` has a live counter.
    #[must_use]
    pub fn is_element_busy(&self, element: ElementId) -> bool {
        self.jobs.values().any(|active| active.element == element)
    }

    #[must_use]
    pub fn active_count(&self) -> usize {
        self.jobs.len()
    }
}
