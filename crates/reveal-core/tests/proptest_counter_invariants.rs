//! Property-based invariant tests for counters and visibility activation.
//!
//! **Counter:**
//! 1. Emitted values never decrease when `target >= start`.
//! 2. The terminal frame renders the target under the label's rounding rule.
//! 3. No frame is sampled with progress above 1.
//! 4. Decorations survive every frame (`%` suffix, `<`/`~` prefix).
//! 5. Any label containing a digit yields a job; labels without digits never do.
//!
//! **Visibility:**
//! 6. Each watched element activates at most once across arbitrary batches.
//! 7. The activated set does not depend on entry order within a batch.

use std::collections::HashSet;
use std::time::Duration;

use proptest::prelude::*;
use reveal_core::counter::animate;
use reveal_core::{
    CounterJob, CounterLabel, CounterSpec, Easing, JobState, ObserverOptions, VisibilityActivator,
    VisibilityEntry,
};

// ── Strategies ────────────────────────────────────────────────────────────

fn easing_strategy() -> impl Strategy<Value = Easing> {
    prop_oneof![
        Just(Easing::Linear),
        Just(Easing::EaseOutQuad),
        Just(Easing::EaseOutCubic),
        Just(Easing::EaseOutQuart),
        Just(Easing::EaseOutQuint),
        Just(Easing::EaseInOutQuart),
        Just(Easing::EaseOutExpo),
    ]
}

/// Sorted frame timestamps (ms) starting at 0.
fn frame_times_strategy() -> impl Strategy<Value = Vec<u64>> {
    proptest::collection::vec(0u64..=40, 1..=200).prop_map(|gaps| {
        let mut t = 0;
        let mut out = vec![0];
        for gap in gaps {
            t += gap;
            out.push(t);
        }
        out
    })
}

fn decorated_label_strategy() -> impl Strategy<Value = String> {
    (0u32..=10_000, 0u32..=9, prop_oneof![Just("%"), Just("<"), Just("~")]).prop_map(
        |(whole, frac, symbol)| match symbol {
            "%" => format!("{whole}%"),
            _ => format!("{symbol}{whole}.{frac}"),
        },
    )
}

// ── Counter ───────────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn values_are_monotone(
        start in 0.0f64..=500.0,
        delta in 0.0f64..=10_000.0,
        duration_ms in 1u64..=5_000,
        easing in easing_strategy(),
        times in frame_times_strategy(),
    ) {
        let target = start + delta;
        let spec = CounterSpec::new(start, target, Duration::from_millis(duration_ms))
            .with_easing(easing);
        let mut job = CounterJob::new(spec, CounterLabel::from_parts(target, ""));
        let mut prev = f64::NEG_INFINITY;
        for t in times {
            let Some(frame) = job.tick(Duration::from_millis(t)) else { break };
            prop_assert!(frame.value >= prev, "value decreased: {} < {}", frame.value, prev);
            prop_assert!(frame.progress <= 1.0);
            prop_assert!(frame.value <= target);
            prev = frame.value;
        }
    }

    #[test]
    fn terminal_frame_renders_target(
        label in decorated_label_strategy(),
        duration_ms in 1u64..=3_000,
    ) {
        let parsed = CounterLabel::parse(&label).expect("label has digits");
        let spec = CounterSpec::new(0.0, parsed.target(), Duration::from_millis(duration_ms));
        let mut last = None;
        let state = animate(
            spec,
            &parsed,
            (0..).map(|i| Duration::from_millis(i * 16)),
            |text| last = Some(text.to_owned()),
        );
        prop_assert_eq!(state, JobState::Finished);
        prop_assert_eq!(last, Some(parsed.format(parsed.target())));
    }

    #[test]
    fn decorations_survive_every_frame(
        label in decorated_label_strategy(),
        times in frame_times_strategy(),
    ) {
        let job = CounterJob::for_label(
            &label,
            0.0,
            Duration::from_millis(1500),
            Easing::EaseOutQuart,
        )
        .expect("label has digits");
        let mut texts = Vec::new();
        animate(
            *job.spec(),
            job.label(),
            times.into_iter().map(Duration::from_millis),
            |text| texts.push(text.to_owned()),
        );
        for text in &texts {
            if label.ends_with('%') {
                prop_assert!(text.ends_with('%'), "{text}");
            } else {
                let symbol = label.chars().next().unwrap();
                prop_assert!(text.starts_with(symbol), "{text}");
            }
        }
    }

    #[test]
    fn digit_presence_decides_parsing(label in "\\PC{0,24}") {
        let has_digit = label.bytes().any(|b| b.is_ascii_digit());
        prop_assert_eq!(CounterLabel::parse(&label).is_some(), has_digit);
    }
}

// ── Visibility ────────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn activation_happens_at_most_once(
        watched in proptest::collection::hash_set(0u32..64, 0..32),
        batches in proptest::collection::vec(
            proptest::collection::vec((0u32..64, any::<bool>()), 0..16),
            0..12,
        ),
    ) {
        let mut act = VisibilityActivator::new(ObserverOptions::with_threshold(0.1));
        for &id in &watched {
            act.watch(id);
        }
        let mut seen = HashSet::new();
        for batch in batches {
            let entries = batch.into_iter().map(|(id, visible)| {
                if visible { VisibilityEntry::visible(id) } else { VisibilityEntry::hidden(id) }
            });
            for id in act.observe_batch(entries) {
                prop_assert!(watched.contains(&id));
                prop_assert!(seen.insert(id), "element {id} activated twice");
            }
        }
        prop_assert_eq!(act.activated_count(), seen.len());
        prop_assert_eq!(act.pending_count(), watched.len() - seen.len());
    }

    #[test]
    fn batch_order_does_not_matter(
        ids in proptest::collection::vec(0u32..32, 0..24),
        watched in proptest::collection::hash_set(0u32..32, 0..16),
    ) {
        let run = |order: &[u32]| {
            let mut act = VisibilityActivator::new(ObserverOptions::default());
            for &id in &watched {
                act.watch(id);
            }
            let mut out = act.observe_batch(order.iter().copied().map(VisibilityEntry::visible));
            out.sort_unstable();
            out
        };
        let forward = run(&ids);
        let mut reversed = ids.clone();
        reversed.reverse();
        prop_assert_eq!(forward, run(&reversed));
    }
}
