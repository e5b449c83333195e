//! Property-based invariant tests for the page runner.
//!
//! 1. Each reveal element receives the reveal class at most once, whatever
//!    the batch sequence.
//! 2. Each counter element starts at most once and its last text, once the
//!    duration has elapsed, renders the label's value.
//! 3. After `dispose`, no step writes anything.

use std::collections::HashMap;
use std::time::Duration;

use proptest::prelude::*;
use reveal_runtime::{
    Components, DomPatch, ElementId, ElementSpec, PageConfig, PageHandle, PatchRecorder,
    VisibilityEntry,
};

const REVEALS: u32 = 6;
const COUNTERS: u32 = 4;

fn elements() -> Vec<ElementSpec> {
    let reveals = (1..=REVEALS).map(ElementSpec::reveal);
    let counters = (0..COUNTERS).map(|i| ElementSpec::counter(100 + i, format!("{}%", 10 * (i + 1))));
    reveals.chain(counters).collect()
}

fn entry_strategy() -> impl Strategy<Value = VisibilityEntry<ElementId>> {
    let ids = prop_oneof![1..=REVEALS, 100..100 + COUNTERS];
    (ids, any::<bool>(), proptest::option::of(0.0f64..=1.0)).prop_map(|(id, visible, ratio)| {
        VisibilityEntry {
            element: ElementId(id),
            is_intersecting: visible,
            ratio,
        }
    })
}

fn batches_strategy() -> impl Strategy<Value = Vec<Vec<VisibilityEntry<ElementId>>>> {
    proptest::collection::vec(proptest::collection::vec(entry_strategy(), 0..8), 0..24)
}

proptest! {
    #[test]
    fn reveal_class_added_at_most_once(batches in batches_strategy()) {
        let mut page = PageHandle::initialize(PageConfig::default(), Components::REVEAL, elements())
            .expect("default config is valid");
        let mut rec = PatchRecorder::new();

        for (i, batch) in batches.into_iter().enumerate() {
            page.push_visibility(batch);
            page.step(Duration::from_millis(16 * i as u64), &mut rec);
        }

        let mut counts: HashMap<ElementId, usize> = HashMap::new();
        for patch in rec.patches() {
            let is_add = matches!(patch, DomPatch::AddClass { .. });
            prop_assert!(is_add, "unexpected patch {:?}", patch);
            *counts.entry(patch.element()).or_default() += 1;
        }
        prop_assert!(counts.values().all(|&n| n == 1));
        prop_assert_eq!(counts.len(), page.reveals().activated_count());
    }

    #[test]
    fn counters_start_once_and_finish_on_label(batches in batches_strategy()) {
        let mut page = PageHandle::initialize(PageConfig::default(), Components::COUNTERS, elements())
            .expect("default config is valid");
        let mut rec = PatchRecorder::new();
        let mut started = 0;

        let mut now = Duration::ZERO;
        for batch in batches {
            page.push_visibility(batch);
            started += page.step(now, &mut rec).counters_started;
            now += Duration::from_millis(16);
        }
        // Let every started counter run out.
        page.step(now + Duration::from_millis(1500), &mut rec);

        prop_assert!(started <= COUNTERS);
        prop_assert_eq!(page.active_counters(), 0);
        for i in 0..COUNTERS {
            let texts = rec.texts_for(ElementId(100 + i));
            if let Some(last) = texts.last() {
                let expected = format!("{}%", 10 * (i + 1));
                prop_assert_eq!(*last, expected.as_str());
                prop_assert_eq!(texts[0], "0%");
            }
        }
    }

    #[test]
    fn disposed_page_writes_nothing(batches in batches_strategy(), split in 0usize..24) {
        let mut page = PageHandle::initialize(PageConfig::default(), Components::all(), elements())
            .expect("default config is valid");
        let mut rec = PatchRecorder::new();

        let mut batches = batches.into_iter();
        for (i, batch) in batches.by_ref().take(split).enumerate() {
            page.push_visibility(batch);
            page.step(Duration::from_millis(100 * i as u64), &mut rec);
        }
        page.dispose();
        rec.drain();

        for batch in batches {
            page.push_visibility(batch);
            prop_assert!(page.step(Duration::from_secs(10), &mut rec).disposed);
        }
        prop_assert!(rec.is_empty());
    }
}
