#![forbid(unsafe_code)]

//! One-shot visibility activation.
//!
//! [`VisibilityActivator`] keeps a watch set of element handles. Each
//! visibility signal batch moves every sufficiently visible watched element
//! from [`WatchState::Pending`] to [`WatchState::Activated`] and drops it from
//! the watch set.
//!
//! # Invariants
//!
//! 1. `Pending → Activated` is the only transition, and it happens at most
//!    once per element.
//! 2. An activated element is no longer watched; later signals for it are
//!    ignored.
//! 3. Elements in one batch are handled independently. The result does not
//!    depend on entry order.
//! 4. An inert activator (no signal source) accepts watches and never
//!    activates.
//!
//! # Failure Modes
//!
//! | Condition | Behavior |
//! |-----------|----------|
//! | Element never visible | Stays `Pending` indefinitely |
//! | Signal source unavailable | Activator is inert, watches never fire |
//! | Signal for unknown element | Ignored |

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use tracing::{debug, trace};

use crate::error::RevealError;
use crate::geometry::{self, Rect};
use crate::margin::RootMargin;

/// Per-element activation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    /// Watched, not yet visible.
    Pending,
    /// Became visible once; no longer watched.
    Activated,
}

/// Observer configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObserverOptions {
    /// Fraction of the element's area that must be visible, in `[0, 1]`.
    pub threshold: f64,
    /// Adjustment to the effective viewport edges.
    pub root_margin: RootMargin,
}

impl Default for ObserverOptions {
    fn default() -> Self {
        Self {
            threshold: 0.0,
            root_margin: RootMargin::ZERO,
        }
    }
}

impl ObserverOptions {
    /// Options with the given threshold and no margin.
    ///
    /// # Panics
    ///
    /// Panics if `threshold` is outside `[0, 1]`.
    #[must_use]
    pub fn with_threshold(threshold: f64) -> Self {
        let opts = Self {
            threshold,
            ..Self::default()
        };
        if let Err(err) = opts.validate() {
            panic!("{err}");
        }
        opts
    }

    /// Replace the root margin.
    #[must_use]
    pub fn root_margin(mut self, margin: RootMargin) -> Self {
        self.root_margin = margin;
        self
    }

    /// Check the threshold domain.
    pub fn validate(&self) -> Result<(), RevealError> {
        if (0.0..=1.0).contains(&self.threshold) {
            Ok(())
        } else {
            Err(RevealError::PreconditionViolation(
                "visibility threshold must be within [0, 1]",
            ))
        }
    }
}

/// One entry of a visibility signal batch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibilityEntry<K> {
    pub element: K,
    /// Whether the signal source reports the element as intersecting.
    pub is_intersecting: bool,
    /// Visible fraction, when the source reports one.
    pub ratio: Option<f64>,
}

impl<K> VisibilityEntry<K> {
    /// An intersecting entry without ratio information.
    #[must_use]
    pub const fn visible(element: K) -> Self {
        Self {
            element,
            is_intersecting: true,
            ratio: None,
        }
    }

    /// A non-intersecting entry.
    #[must_use]
    pub const fn hidden(element: K) -> Self {
        Self {
            element,
            is_intersecting: false,
            ratio: None,
        }
    }

    /// Attach a visible fraction.
    #[must_use]
    pub const fn with_ratio(mut self, ratio: f64) -> Self {
        self.ratio = Some(ratio);
        self
    }
}

/// Watch set with one-shot `pending → activated` transitions.
#[derive(Debug, Clone)]
pub struct VisibilityActivator<K> {
    options: ObserverOptions,
    signal_available: bool,
    pending: HashSet<K>,
    activated: HashSet<K>,
}

impl<K: Copy + Eq + Hash + std::fmt::Debug> VisibilityActivator<K> {
    /// Create an activator backed by a working signal source.
    ///
    /// # Panics
    ///
    /// Panics if `options.threshold` is outside `[0, 1]`.
    #[must_use]
    pub fn new(options: ObserverOptions) -> Self {
        if let Err(err) = options.validate() {
            panic!("{err}");
        }
        Self {
            options,
            signal_available: true,
            pending: HashSet::new(),
            activated: HashSet::new(),
        }
    }

    /// Create an activator whose signal source is unavailable.
    ///
    /// Watching is accepted but nothing ever activates.
    #[must_use]
    pub fn inert(options: ObserverOptions) -> Self {
        debug!("visibility signal source unavailable; watches are inert");
        Self {
            signal_available: false,
            ..Self::new(options)
        }
    }

    #[must_use]
    pub fn options(&self) -> &ObserverOptions {
        &self.options
    }

    /// Whether a signal source backs this activator.
    #[must_use]
    pub fn has_signal_source(&self) -> bool {
        self.signal_available
    }

    /// Report [`RevealError::MissingSignalSource`] for inert activators.
    pub fn require_signal_source(&self) -> Result<(), RevealError> {
        if self.signal_available {
            Ok(())
        } else {
            Err(RevealError::MissingSignalSource)
        }
    }

    /// Register `element` for one-shot activation.
    ///
    /// Returns `false` if the element is already watched or was already
    /// activated.
    pub fn watch(&mut self, element: K) -> bool {
        if self.activated.contains(&element) {
            return false;
        }
        self.pending.insert(element)
    }

    /// Stop watching `element` without activating it. Idempotent.
    pub fn unwatch(&mut self, element: K) -> bool {
        self.pending.remove(&element)
    }

    /// Current state, or `None` for elements never watched (or unwatched
    /// before activation).
    #[must_use]
    pub fn state(&self, element: K) -> Option<WatchState> {
        if self.activated.contains(&element) {
            Some(WatchState::Activated)
        } else if self.pending.contains(&element) {
            Some(WatchState::Pending)
        } else {
            None
        }
    }

    #[must_use]
    pub fn is_watching(&self, element: K) -> bool {
        self.pending.contains(&element)
    }

    /// Number of elements still pending.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Number of elements activated so far.
    #[must_use]
    pub fn activated_count(&self) -> usize {
        self.activated.len()
    }

    /// Deliver a single visibility signal. Returns `true` if the element
    /// transitioned to `Activated`.
    pub fn on_visible(&mut self, element: K) -> bool {
        self.activate(element)
    }

    /// Deliver a signal batch and return the newly activated elements in
    /// batch order.
    pub fn observe_batch<I>(&mut self, entries: I) -> Vec<K>
    where
        I: IntoIterator<Item = VisibilityEntry<K>>,
    {
        let mut activated = Vec::new();
        self.observe_batch_with(entries, |element| activated.push(element));
        activated
    }

    /// Deliver a signal batch, calling `on_activate` once per newly
    /// activated element.
    pub fn observe_batch_with<I, F>(&mut self, entries: I, mut on_activate: F)
    where
        I: IntoIterator<Item = VisibilityEntry<K>>,
        F: FnMut(K),
    {
        if !self.signal_available {
            return;
        }
        for entry in entries {
            if !self.entry_qualifies(&entry) {
                continue;
            }
            if self.activate(entry.element) {
                on_activate(entry.element);
            }
        }
    }

    /// Evaluate element rectangles against `viewport` and activate the ones
    /// that meet the threshold inside the margin-adjusted root.
    pub fn observe_geometry<I>(&mut self, viewport: &Rect, rects: I) -> Vec<K>
    where
        I: IntoIterator<Item = (K, Rect)>,
    {
        let options = self.options;
        let entries = rects
            .into_iter()
            .filter(|(element, _)| self.pending.contains(element))
            .map(|(element, rect)| {
                let hit = geometry::intersection(&rect, viewport, &options.root_margin);
                VisibilityEntry {
                    element,
                    is_intersecting: hit.meets(options.threshold),
                    ratio: Some(hit.ratio),
                }
            })
            .collect::<Vec<_>>();
        self.observe_batch(entries)
    }

    /// Drop every pending watch (teardown). Returns how many were dropped.
    pub fn clear(&mut self) -> usize {
        let dropped = self.pending.len();
        self.pending.clear();
        dropped
    }

    fn entry_qualifies(&self, entry: &VisibilityEntry<K>) -> bool {
        if !entry.is_intersecting {
            return false;
        }
        match entry.ratio {
            Some(ratio) => self.options.threshold <= 0.0 || ratio >= self.options.threshold,
            None => true,
        }
    }

    fn activate(&mut self, element: K) -> bool {
        if !self.signal_available || !self.pending.remove(&element) {
            return false;
        }
        self.activated.insert(element);
        trace!(?element, threshold = self.options.threshold, "element activated");
        true
    }

    /// `element → state` map over everything pending or activated.
    #[must_use]
    pub fn snapshot(&self) -> HashMap<K, WatchState> {
        self.pending
            .iter()
            .map(|&k| (k, WatchState::Pending))
            .chain(self.activated.iter().map(|&k| (k, WatchState::Activated)))
            .collect()
    }
}
