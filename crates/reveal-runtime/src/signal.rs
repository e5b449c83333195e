#![forbid(unsafe_code)]

//! JSON decoding of host-encoded visibility batches.
//!
//! The browser host collects `IntersectionObserver` entries and forwards them
//! as one JSON message per callback:
//!
//! ```text
//! {"kind":"visibility","entries":[{"id":3,"visible":true,"ratio":0.62}]}
//! ```
//!
//! [`parse_encoded_signal`] turns that into a batch of
//! [`VisibilityEntry<ElementId>`]. Messages of any other `kind` return
//! `Ok(None)` so hosts can share one channel for several message types.

use reveal_core::VisibilityEntry;
use serde::Deserialize;

use crate::sink::ElementId;

/// Errors from parsing an encoded signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalParseError {
    /// Malformed JSON.
    Json(String),
    /// Missing required field.
    MissingField(&'static str),
    /// Ratio outside `[0, 1]` or not a number.
    InvalidRatio(String),
}

impl core::fmt::Display for SignalParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Json(msg) => write!(f, "JSON parse error: {msg}"),
            Self::MissingField(field) => write!(f, "missing required field: {field}"),
            Self::InvalidRatio(value) => write!(f, "invalid intersection ratio: {value}"),
        }
    }
}

impl std::error::Error for SignalParseError {}

/// A decoded visibility batch.
pub type VisibilityBatch = Vec<VisibilityEntry<ElementId>>;

#[derive(Debug, Deserialize)]
struct RawSignal {
    kind: String,
    #[serde(default)]
    entries: Option<Vec<RawEntry>>,
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    #[serde(default)]
    id: Option<u32>,
    #[serde(default, alias = "isIntersecting")]
    visible: Option<bool>,
    #[serde(default, alias = "intersectionRatio")]
    ratio: Option<f64>,
}

/// Parse one host message.
///
/// Returns `Ok(None)` for non-visibility kinds and `Err` for malformed JSON,
/// a visibility message without `entries`, or an entry without `id`. An
/// entry without `visible` is treated as visible when its ratio is positive.
pub fn parse_encoded_signal(json: &str) -> Result<Option<VisibilityBatch>, SignalParseError> {
    let raw: RawSignal =
        serde_json::from_str(json).map_err(|e| SignalParseError::Json(e.to_string()))?;

    if raw.kind != "visibility" {
        return Ok(None);
    }

    let entries = raw.entries.ok_or(SignalParseError::MissingField("entries"))?;
    entries
        .into_iter()
        .map(parse_entry)
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

fn parse_entry(raw: RawEntry) -> Result<VisibilityEntry<ElementId>, SignalParseError> {
    let id = raw.id.ok_or(SignalParseError::MissingField("id"))?;
    if let Some(ratio) = raw.ratio
        && !(0.0..=1.0).contains(&ratio)
    {
        return Err(SignalParseError::InvalidRatio(ratio.to_string()));
    }
    let visible = raw
        .visible
        .unwrap_or_else(|| raw.ratio.is_some_and(|r| r > 0.0));
    Ok(VisibilityEntry {
        element: ElementId(id),
        is_intersecting: visible,
        ratio: raw.ratio,
    })
}
