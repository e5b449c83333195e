#![forbid(unsafe_code)]

//! Eased numeric counters for metric labels.
//!
//! A metric label such as `"95%"`, `"<10"`, or `"~2.5"` is split into a
//! numeric target and a verbatim decoration ([`CounterLabel`]). A
//! [`CounterJob`] then samples the value once per frame tick, from a start
//! value up to the target, and renders each sample back into label text.
//!
//! # Frame model
//!
//! ```text
//! first tick      → started_at = now, progress 0
//! every tick      → progress = min((now - started_at) / duration, 1)
//!                   value    = start + (target - start) * ease(progress)
//! progress == 1   → value == target, job Finished, no further frames
//! ```
//!
//! The numeric core ([`CounterSpec::value_at`], [`CounterLabel::format`]) is
//! pure; the job only adds the start timestamp and the terminal state.
//!
//! # Formatting
//!
//! | Label contains       | Rendering                                   |
//! |----------------------|---------------------------------------------|
//! | `%`                  | nearest integer (halves round up) + decoration |
//! | decoration `<`, `~`  | decoration + one decimal place              |
//! | anything else        | one decimal place, decoration dropped       |

use core::fmt;
use std::time::Duration;

use crate::easing::Easing;
use crate::error::RevealError;

/// Symbols that mark a label as decorated.
const DECORATION_MARKERS: [char; 3] = ['%', '<', '~'];

/// How a sampled value is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayStyle {
    /// Integer value followed by the decoration (`"95%"`).
    Percent,
    /// Decoration followed by a one-decimal value (`"<10.0"`).
    Prefixed,
    /// One-decimal value without any symbol (`"12.5"`).
    Plain,
}

/// A parsed metric label: numeric target plus verbatim decoration.
#[derive(Debug, Clone, PartialEq)]
pub struct CounterLabel {
    target: f64,
    decoration: String,
    style: DisplayStyle,
}

impl CounterLabel {
    /// Parse a label. Returns `None` when the label has no numeric substring.
    ///
    /// The first run of ASCII digits, optionally followed by a decimal point
    /// and more digits, becomes the target. When the label carries `%`, `<`,
    /// or `~`, everything else in the label is kept as the decoration.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        let (start, end) = find_number(label)?;
        let target: f64 = label[start..end].parse().ok()?;
        if !target.is_finite() {
            return None;
        }

        let decorated = label.contains(DECORATION_MARKERS);
        let decoration = if decorated {
            let mut rest = String::with_capacity(label.len() - (end - start));
            rest.push_str(&label[..start]);
            rest.push_str(&label[end..]);
            rest
        } else {
            String::new()
        };

        let style = if label.contains('%') {
            DisplayStyle::Percent
        } else {
            style_for(&decoration)
        };

        Some(Self {
            target,
            decoration,
            style,
        })
    }

    /// Like [`CounterLabel::parse`], reporting the malformed label as an error.
    pub fn try_parse(label: &str) -> Result<Self, RevealError> {
        Self::parse(label).ok_or_else(|| RevealError::MalformedInput {
            label: label.to_owned(),
        })
    }

    /// Build a label from an explicit target and decoration.
    ///
    /// # Panics
    ///
    /// Panics if `target` is negative or not finite.
    #[must_use]
    pub fn from_parts(target: f64, decoration: impl Into<String>) -> Self {
        assert!(
            target.is_finite() && target >= 0.0,
            "counter target must be a non-negative finite number"
        );
        let decoration = decoration.into();
        let style = style_for(&decoration);
        Self {
            target,
            decoration,
            style,
        }
    }

    /// Numeric target parsed from the label.
    #[must_use]
    pub fn target(&self) -> f64 {
        self.target
    }

    /// Verbatim non-numeric part of the label (empty when undecorated).
    #[must_use]
    pub fn decoration(&self) -> &str {
        &self.decoration
    }

    /// Rendering rule derived from the label.
    #[must_use]
    pub fn style(&self) -> DisplayStyle {
        self.style
    }

    /// Render `value` the way this label displays numbers.
    #[must_use]
    pub fn format(&self, value: f64) -> String {
        match self.style {
            DisplayStyle::Percent => format!("{:.0}{}", round_half_up(value), self.decoration),
            DisplayStyle::Prefixed => format!("{}{}", self.decoration, to_fixed_1(value)),
            DisplayStyle::Plain => to_fixed_1(value),
        }
    }
}

impl fmt::Display for CounterLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(self.target))
    }
}

fn style_for(decoration: &str) -> DisplayStyle {
    if decoration.contains('%') {
        DisplayStyle::Percent
    } else if decoration == "<" || decoration == "~" {
        DisplayStyle::Prefixed
    } else {
        DisplayStyle::Plain
    }
}

/// Byte range of the first `\d+(\.\d+)?` match.
fn find_number(label: &str) -> Option<(usize, usize)> {
    let bytes = label.as_bytes();
    let start = bytes.iter().position(u8::is_ascii_digit)?;
    let mut end = start;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end + 1 < bytes.len() && bytes[end] == b'.' && bytes[end + 1].is_ascii_digit() {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
    }
    Some((start, end))
}

/// Nearest integer with halves rounding toward positive infinity.
fn round_half_up(value: f64) -> f64 {
    let floor = value.floor();
    let rounded = if value - floor >= 0.5 { floor + 1.0 } else { floor };
    // Normalize -0 so it never renders as "-0".
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// One decimal place, with exact ties rounding away from zero.
///
/// `{:.1}` breaks exact ties to even (`2.25` → `2.2`). Only values on a
/// quarter boundary can be exact ties at one decimal, and `value * 10` is
/// exact for those.
fn to_fixed_1(value: f64) -> String {
    let scaled = value * 10.0;
    if scaled.fract().abs() == 0.5 && (value * 4.0).fract() == 0.0 {
        let tenths = scaled.abs().ceil().copysign(value);
        format!("{:.1}", tenths / 10.0)
    } else {
        format!("{value:.1}")
    }
}

/// Interpolation parameters for one counter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CounterSpec {
    start: f64,
    target: f64,
    duration: Duration,
    easing: Easing,
}

impl CounterSpec {
    /// Create a spec with the default quartic ease-out.
    ///
    /// # Panics
    ///
    /// Panics if `duration` is zero, `start` is not finite, or `target` is
    /// negative or not finite.
    #[must_use]
    pub fn new(start: f64, target: f64, duration: Duration) -> Self {
        match Self::try_new(start, target, duration) {
            Ok(spec) => spec,
            Err(err) => panic!("{err}"),
        }
    }

    /// Validating constructor.
    pub fn try_new(start: f64, target: f64, duration: Duration) -> Result<Self, RevealError> {
        if duration.is_zero() {
            return Err(RevealError::PreconditionViolation(
                "counter duration must be positive",
            ));
        }
        if !start.is_finite() {
            return Err(RevealError::PreconditionViolation(
                "counter start must be finite",
            ));
        }
        if !target.is_finite() || target < 0.0 {
            return Err(RevealError::PreconditionViolation(
                "counter target must be a non-negative finite number",
            ));
        }
        Ok(Self {
            start,
            target,
            duration,
            easing: Easing::default(),
        })
    }

    /// Use a different easing curve.
    #[must_use]
    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    #[must_use]
    pub fn start(&self) -> f64 {
        self.start
    }

    #[must_use]
    pub fn target(&self) -> f64 {
        self.target
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    #[must_use]
    pub fn easing(&self) -> Easing {
        self.easing
    }

    /// Fraction of the duration covered by `elapsed`, clamped to `[0, 1]`.
    #[must_use]
    pub fn progress(&self, elapsed: Duration) -> f64 {
        if elapsed >= self.duration {
            return 1.0;
        }
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }

    /// Interpolated value at a given progress fraction.
    #[must_use]
    pub fn value_for_progress(&self, progress: f64) -> f64 {
        if progress >= 1.0 {
            return self.target;
        }
        let value = self.start + (self.target - self.start) * self.easing.apply(progress);
        // Rounding must not carry an intermediate frame past the target.
        if self.target >= self.start {
            value.min(self.target)
        } else {
            value.max(self.target)
        }
    }

    /// Interpolated value after `elapsed` time.
    #[must_use]
    pub fn value_at(&self, elapsed: Duration) -> f64 {
        self.value_for_progress(self.progress(elapsed))
    }
}

/// One rendered counter sample.
#[derive(Debug, Clone, PartialEq)]
pub struct CounterFrame {
    /// Clamped progress in `[0, 1]`.
    pub progress: f64,
    /// Interpolated numeric value.
    pub value: f64,
    /// Display text for the sink.
    pub text: String,
    /// Whether this was the terminal frame.
    pub finished: bool,
}

/// Lifecycle of a [`CounterJob`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    /// Created, no frame sampled yet.
    Scheduled,
    /// At least one frame sampled, target not reached.
    Running,
    /// Terminal frame emitted.
    Finished,
    /// Stopped before completion.
    Cancelled,
}

impl JobState {
    /// Whether no further frames will be produced.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Finished | Self::Cancelled)
    }
}

/// A counter animation in flight.
#[derive(Debug, Clone)]
pub struct CounterJob {
    spec: CounterSpec,
    label: CounterLabel,
    started_at: Option<Duration>,
    last_progress: f64,
    frames: u32,
    state: JobState,
}

impl CounterJob {
    /// Create a job that renders through `label`.
    #[must_use]
    pub fn new(spec: CounterSpec, label: CounterLabel) -> Self {
        Self {
            spec,
            label,
            started_at: None,
            last_progress: 0.0,
            frames: 0,
            state: JobState::Scheduled,
        }
    }

    /// Parse `label` and build a job counting from `start` to its target.
    /// Returns `None` for labels without a numeric value.
    #[must_use]
    pub fn for_label(label: &str, start: f64, duration: Duration, easing: Easing) -> Option<Self> {
        let parsed = CounterLabel::parse(label)?;
        let spec = CounterSpec::new(start, parsed.target(), duration).with_easing(easing);
        Some(Self::new(spec, parsed))
    }

    /// Sample the job at host timestamp `now`.
    ///
    /// The first call fixes the start time. Returns `None` once the job is
    /// finished or cancelled. Progress never decreases, even if the host
    /// clock steps backwards.
    pub fn tick(&mut self, now: Duration) -> Option<CounterFrame> {
        if self.state.is_terminal() {
            return None;
        }
        let started_at = *self.started_at.get_or_insert(now);
        self.state = JobState::Running;

        let elapsed = now.saturating_sub(started_at);
        let progress = self.spec.progress(elapsed).max(self.last_progress);
        self.last_progress = progress;

        let value = self.spec.value_for_progress(progress);
        let finished = progress >= 1.0;
        if finished {
            self.state = JobState::Finished;
        }
        self.frames += 1;

        Some(CounterFrame {
            progress,
            value,
            text: self.label.format(value),
            finished,
        })
    }

    /// Stop the job. Returns `true` if it was still live.
    pub fn cancel(&mut self) -> bool {
        if self.state.is_terminal() {
            return false;
        }
        self.state = JobState::Cancelled;
        true
    }

    #[must_use]
    pub fn state(&self) -> JobState {
        self.state
    }

    #[must_use]
    pub fn spec(&self) -> &CounterSpec {
        &self.spec
    }

    #[must_use]
    pub fn label(&self) -> &CounterLabel {
        &self.label
    }

    /// Number of frames produced so far.
    #[must_use]
    pub fn frames_emitted(&self) -> u32 {
        self.frames
    }
}

/// Run `spec` over a sequence of frame timestamps, writing each rendered
/// frame into `sink`. Stops at the terminal frame and returns the final job
/// state (`Running` if the clock ran out first).
pub fn animate<I, F>(spec: CounterSpec, label: &CounterLabel, frames: I, mut sink: F) -> JobState
where
    I: IntoIterator<Item = Duration>,
    F: FnMut(&str),
{
    let mut job = CounterJob::new(spec, label.clone());
    for now in frames {
        match job.tick(now) {
            Some(frame) => sink(&frame.text),
            None => break,
        }
        if job.state().is_terminal() {
            break;
        }
    }
    job.state()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn parse_percent_label() {
        let label = CounterLabel::parse("95%").unwrap();
        assert_eq!(label.target(), 95.0);
        assert_eq!(label.decoration(), "%");
        assert_eq!(label.style(), DisplayStyle::Percent);
    }

    #[test]
    fn parse_prefixed_labels() {
        let lt = CounterLabel::parse("<10").unwrap();
        assert_eq!(lt.target(), 10.0);
        assert_eq!(lt.decoration(), "<");
        assert_eq!(lt.style(), DisplayStyle::Prefixed);

        let approx = CounterLabel::parse("~2.5").unwrap();
        assert_eq!(approx.target(), 2.5);
        assert_eq!(approx.style(), DisplayStyle::Prefixed);
    }

    #[test]
    fn parse_plain_label_drops_unit() {
        let label = CounterLabel::parse("12ms").unwrap();
        assert_eq!(label.target(), 12.0);
        assert_eq!(label.decoration(), "");
        assert_eq!(label.style(), DisplayStyle::Plain);
        assert_eq!(label.format(12.0), "12.0");
    }

    #[test]
    fn parse_keeps_only_first_number() {
        let label = CounterLabel::parse("~3.5 of 10").unwrap();
        assert_eq!(label.target(), 3.5);
        assert_eq!(label.decoration(), "~ of 10");
        // Decoration is not exactly "<" or "~", so it renders plain.
        assert_eq!(label.style(), DisplayStyle::Plain);
    }

    #[test]
    fn trailing_point_is_not_part_of_number() {
        let label = CounterLabel::parse("<7.").unwrap();
        assert_eq!(label.target(), 7.0);
        assert_eq!(label.decoration(), "<.");
    }

    #[test]
    fn label_without_digits_is_malformed() {
        assert!(CounterLabel::parse("N/A").is_none());
        assert!(CounterLabel::parse("").is_none());
        assert_eq!(
            CounterLabel::try_parse("—%"),
            Err(RevealError::MalformedInput {
                label: "—%".to_owned()
            })
        );
    }

    #[test]
    fn percent_in_decoration_text_rounds() {
        let label = CounterLabel::parse("up 40 %").unwrap();
        assert_eq!(label.style(), DisplayStyle::Percent);
        assert_eq!(label.format(39.5), "40up  %");
    }

    #[test]
    fn percent_rounding_halves_up() {
        let label = CounterLabel::from_parts(100.0, "%");
        assert_eq!(label.format(0.0), "0%");
        assert_eq!(label.format(2.5), "3%");
        assert_eq!(label.format(2.49), "2%");
        assert_eq!(label.format(-0.2), "0%");
        assert_eq!(label.format(0.499_999_999_999_999_94), "0%");
        assert_eq!(label.format(-2.5), "-2%");
    }

    #[test]
    fn one_decimal_ties_round_away_from_zero() {
        let approx = CounterLabel::parse("~2.25").unwrap();
        assert_eq!(approx.format(2.25), "~2.3");
        let lt = CounterLabel::parse("<0.25").unwrap();
        assert_eq!(lt.format(0.25), "<0.3");
        assert_eq!(lt.format(0.75), "<0.8");
        let plain = CounterLabel::parse("2.25").unwrap();
        assert_eq!(plain.to_string(), "2.3");
        assert_eq!(plain.format(-0.25), "-0.3");
        // Not exact ties: nearest decimal wins.
        assert_eq!(plain.format(2.35), "2.4");
        assert_eq!(plain.format(2.24), "2.2");
        assert_eq!(plain.format(1e6), "1000000.0");
    }

    #[test]
    fn display_shows_target() {
        assert_eq!(CounterLabel::parse("<1.5").unwrap().to_string(), "<1.5");
        assert_eq!(CounterLabel::parse("95%").unwrap().to_string(), "95%");
    }

    #[test]
    fn spec_rejects_bad_arguments() {
        assert!(CounterSpec::try_new(0.0, 1.0, Duration::ZERO).is_err());
        assert!(CounterSpec::try_new(f64::NAN, 1.0, ms(10)).is_err());
        assert!(CounterSpec::try_new(0.0, -1.0, ms(10)).is_err());
        assert!(CounterSpec::try_new(0.0, f64::INFINITY, ms(10)).is_err());
        assert!(CounterSpec::try_new(0.0, 1.0, ms(10)).is_ok());
    }

    #[test]
    #[should_panic(expected = "counter duration must be positive")]
    fn zero_duration_panics() {
        let _ = CounterSpec::new(0.0, 1.0, Duration::ZERO);
    }

    #[test]
    fn progress_is_clamped() {
        let spec = CounterSpec::new(0.0, 10.0, ms(1000));
        assert_eq!(spec.progress(ms(0)), 0.0);
        assert_eq!(spec.progress(ms(500)), 0.5);
        assert_eq!(spec.progress(ms(1000)), 1.0);
        assert_eq!(spec.progress(ms(5000)), 1.0);
    }

    #[test]
    fn value_hits_target_exactly_at_end() {
        let spec = CounterSpec::new(0.3, 7.7, ms(1500));
        assert_eq!(spec.value_at(ms(1500)), 7.7);
        assert_eq!(spec.value_at(ms(0)), 0.3);
    }

    #[test]
    fn percent_counter_scenario() {
        let label = CounterLabel::parse("95%").unwrap();
        let spec = CounterSpec::new(0.0, label.target(), ms(1500));
        let mut job = CounterJob::new(spec, label);

        let first = job.tick(ms(10_000)).unwrap();
        assert_eq!(first.text, "0%");
        assert!(!first.finished);

        let mid = job.tick(ms(10_750)).unwrap();
        assert!(mid.value > 0.0 && mid.value < 95.0);
        assert!(mid.text.ends_with('%'));

        let last = job.tick(ms(11_500)).unwrap();
        assert_eq!(last.text, "95%");
        assert!(last.finished);
        assert_eq!(job.state(), JobState::Finished);

        assert!(job.tick(ms(11_516)).is_none());
        assert_eq!(job.frames_emitted(), 3);
    }

    #[test]
    fn prefixed_counter_final_frame() {
        let job = CounterJob::for_label("<10", 0.0, ms(1500), Easing::EaseOutQuart).unwrap();
        let mut texts = Vec::new();
        let state = animate(
            *job.spec(),
            job.label(),
            (0..=100).map(|i| ms(i * 16)),
            |t| texts.push(t.to_owned()),
        );
        assert_eq!(state, JobState::Finished);
        assert_eq!(texts.first().map(String::as_str), Some("<0.0"));
        assert_eq!(texts.last().map(String::as_str), Some("<10.0"));
        assert!(texts.iter().all(|t| t.starts_with('<')));
    }

    #[test]
    fn animate_reports_running_when_clock_runs_out() {
        let label = CounterLabel::parse("42%").unwrap();
        let spec = CounterSpec::new(0.0, 42.0, ms(1000));
        let mut count = 0;
        let state = animate(spec, &label, [ms(0), ms(100)], |_| count += 1);
        assert_eq!(state, JobState::Running);
        assert_eq!(count, 2);
    }

    #[test]
    fn clock_step_back_keeps_progress() {
        let label = CounterLabel::parse("50").unwrap();
        let spec = CounterSpec::new(0.0, 50.0, ms(1000)).with_easing(Easing::Linear);
        let mut job = CounterJob::new(spec, label);
        job.tick(ms(100)).unwrap();
        let a = job.tick(ms(600)).unwrap();
        let b = job.tick(ms(400)).unwrap();
        assert_eq!(a.progress, 0.5);
        assert_eq!(b.progress, 0.5);
        assert_eq!(b.text, "25.0");
    }

    #[test]
    fn cancel_is_idempotent() {
        let mut job = CounterJob::for_label("3", 0.0, ms(100), Easing::Linear).unwrap();
        job.tick(ms(0));
        assert!(job.cancel());
        assert!(!job.cancel());
        assert_eq!(job.state(), JobState::Cancelled);
        assert!(job.tick(ms(50)).is_none());
    }

    #[test]
    fn cancel_after_finish_is_noop() {
        let mut job = CounterJob::for_label("3", 0.0, ms(100), Easing::Linear).unwrap();
        job.tick(ms(0));
        job.tick(ms(100));
        assert!(!job.cancel());
        assert_eq!(job.state(), JobState::Finished);
    }
}
