#![forbid(unsafe_code)]

//! Core: easing curves, counter labels, and one-shot visibility activation.
//!
//! # Role in Reveal
//! `reveal-core` is the pure layer. It owns the numeric interpolation behind
//! metric counters and the `pending → activated` state machine behind
//! scroll-triggered reveals. Nothing here touches a display surface or a
//! clock; callers hand in timestamps and visibility signals and receive text
//! and activation lists back.
//!
//! # Primary responsibilities
//! - **Easing**: normalized ease curves ([`easing::Easing`]).
//! - **Counter**: label parsing, per-frame sampling, and display formatting
//!   ([`counter::CounterLabel`], [`counter::CounterJob`]).
//! - **Visibility**: one-shot activation over a watch set
//!   ([`visibility::VisibilityActivator`]).
//! - **Geometry**: viewport intersection for hosts without a native observer
//!   ([`geometry::intersection`], [`margin::RootMargin`]).
//!
//! # How it fits in the system
//! The runtime (`reveal-runtime`) composes these pieces into a host-driven
//! page runner and forwards the produced text and class mutations to a
//! display sink.

pub mod counter;
pub mod easing;
pub mod error;
pub mod geometry;
pub mod margin;
pub mod visibility;

pub use counter::{CounterFrame, CounterJob, CounterLabel, CounterSpec, DisplayStyle, JobState};
pub use easing::Easing;
pub use error::RevealError;
pub use geometry::{Intersection, Rect};
pub use margin::{MarginLength, RootMargin, RootMarginParseError};
pub use visibility::{ObserverOptions, VisibilityActivator, VisibilityEntry, WatchState};
