#![forbid(unsafe_code)]

//! Display sinks: where counter text and class mutations go.
//!
//! The runtime never touches a document directly. Every visible effect is a
//! call on a [`DisplaySink`]; the wasm host forwards them to the DOM, tests
//! record them with [`PatchRecorder`].

use core::fmt;

/// Opaque handle to a display element owned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u32);

impl ElementId {
    /// The page root (the element that receives the loaded marker).
    pub const ROOT: Self = Self(0);
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u32> for ElementId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// Receiver for display side effects.
pub trait DisplaySink {
    /// Replace the element's text content.
    fn set_text(&mut self, element: ElementId, text: &str);

    /// Add a style class to the element.
    fn add_class(&mut self, element: ElementId, class: &str);

    /// Remove a style class from the element.
    fn remove_class(&mut self, element: ElementId, class: &str);
}

impl<S: DisplaySink + ?Sized> DisplaySink for &mut S {
    fn set_text(&mut self, element: ElementId, text: &str) {
        (**self).set_text(element, text);
    }

    fn add_class(&mut self, element: ElementId, class: &str) {
        (**self).add_class(element, class);
    }

    fn remove_class(&mut self, element: ElementId, class: &str) {
        (**self).remove_class(element, class);
    }
}

/// One recorded display mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomPatch {
    SetText { element: ElementId, text: String },
    AddClass { element: ElementId, class: String },
    RemoveClass { element: ElementId, class: String },
}

impl DomPatch {
    /// Target element.
    #[must_use]
    pub fn element(&self) -> ElementId {
        match self {
            Self::SetText { element, .. }
            | Self::AddClass { element, .. }
            | Self::RemoveClass { element, .. } => *element,
        }
    }

    /// Short operation name used by the wasm host (`text`, `add`, `remove`).
    #[must_use]
    pub fn op(&self) -> &'static str {
        match self {
            Self::SetText { .. } => "text",
            Self::AddClass { .. } => "add",
            Self::RemoveClass { .. } => "remove",
        }
    }

    /// Text or class name carried by the patch.
    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Self::SetText { text, .. } => text,
            Self::AddClass { class, .. } | Self::RemoveClass { class, .. } => class,
        }
    }
}

/// Sink that records patches in call order.
#[derive(Debug, Clone, Default)]
pub struct PatchRecorder {
    patches: Vec<DomPatch>,
}

impl PatchRecorder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Patches recorded since the last drain.
    #[must_use]
    pub fn patches(&self) -> &[DomPatch] {
        &self.patches
    }

    /// Take every recorded patch, leaving the recorder empty.
    pub fn drain(&mut self) -> Vec<DomPatch> {
        std::mem::take(&mut self.patches)
    }

    /// Texts written to `element`, in order.
    #[must_use]
    pub fn texts_for(&self, element: ElementId) -> Vec<&str> {
        self.patches
            .iter()
            .filter_map(|patch| match patch {
                DomPatch::SetText { element: e, text } if *e == element => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }
}

impl DisplaySink for PatchRecorder {
    fn set_text(&mut self, element: ElementId, text: &str) {
        self.patches.push(DomPatch::SetText {
            element,
            text: text.to_owned(),
        });
    }

    fn add_class(&mut self, element: ElementId, class: &str) {
        self.patches.push(DomPatch::AddClass {
            element,
            class: class.to_owned(),
        });
    }

    fn remove_class(&mut self, element: ElementId, class: &str) {
        self.patches.push(DomPatch::RemoveClass {
            element,
            class: class.to_owned(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn recorder_keeps_call_order() {
        let mut rec = PatchRecorder::new();
        rec.add_class(ElementId(1), "animate-in");
        rec.set_text(ElementId(2), "0%");
        rec.remove_class(ElementId(1), "animate-in");
        assert_eq!(
            rec.patches(),
            &[
                DomPatch::AddClass {
                    element: ElementId(1),
                    class: "animate-in".into()
                },
                DomPatch::SetText {
                    element: ElementId(2),
                    text: "0%".into()
                },
                DomPatch::RemoveClass {
                    element: ElementId(1),
                    class: "animate-in".into()
                },
            ]
        );
    }

    #[test]
    fn drain_empties_recorder() {
        let mut rec = PatchRecorder::new();
        rec.set_text(ElementId(3), "1.0");
        let drained = rec.drain();
        assert_eq!(drained.len(), 1);
        assert!(rec.is_empty());
    }

    #[test]
    fn texts_for_filters_by_element() {
        let mut rec = PatchRecorder::new();
        rec.set_text(ElementId(1), "a");
        rec.set_text(ElementId(2), "b");
        rec.add_class(ElementId(1), "x");
        rec.set_text(ElementId(1), "c");
        assert_eq!(rec.texts_for(ElementId(1)), vec!["a", "c"]);
    }

    #[test]
    fn patch_accessors() {
        let patch = DomPatch::AddClass {
            element: ElementId(9),
            class: "loaded".into(),
        };
        assert_eq!(patch.element(), ElementId(9));
        assert_eq!(patch.op(), "add");
        assert_eq!(patch.value(), "loaded");
        assert_eq!(ElementId(9).to_string(), "#9");
    }

    #[test]
    fn mut_ref_forwards() {
        fn write_into<S: DisplaySink>(mut sink: S) {
            sink.set_text(ElementId(1), "x");
        }

        let mut rec = PatchRecorder::new();
        write_into(&mut rec);
        assert_eq!(rec.texts_for(ElementId(1)), vec!["x"]);
    }
}
