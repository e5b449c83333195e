#![forbid(unsafe_code)]

//! Easing curves over normalized progress.
//!
//! Every curve maps `[0, 1]` onto `[0, 1]` with `f(0) == 0` and `f(1) == 1`.
//! Inputs outside the unit interval are clamped first, so a late frame can
//! never overshoot its target.

use core::fmt;

/// Animation easing function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    /// Constant speed.
    Linear,
    /// Quadratic ease-out.
    EaseOutQuad,
    /// Cubic ease-out.
    EaseOutCubic,
    /// Quartic ease-out: fast initial change, slow approach to the target.
    #[default]
    EaseOutQuart,
    /// Quintic ease-out.
    EaseOutQuint,
    /// Quartic ease-in-out.
    EaseInOutQuart,
    /// Exponential ease-out.
    EaseOutExpo,
}

impl Easing {
    /// Apply the curve to normalized time `t`.
    #[must_use]
    pub fn apply(self, t: f64) -> f64 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match self {
            Self::Linear => t,
            Self::EaseOutQuad => 1.0 - (1.0 - t).powi(2),
            Self::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            Self::EaseOutQuart => 1.0 - (1.0 - t).powi(4),
            Self::EaseOutQuint => 1.0 - (1.0 - t).powi(5),
            Self::EaseInOutQuart => {
                if t < 0.5 {
                    8.0 * t.powi(4)
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(4) / 2.0
                }
            }
            Self::EaseOutExpo => {
                if t == 1.0 {
                    1.0
                } else {
                    1.0 - 2.0_f64.powf(-10.0 * t)
                }
            }
        }
    }

    /// Parse a curve name (`linear`, `ease-out-quart`, ...). Underscores and
    /// case are accepted.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "linear" => Some(Self::Linear),
            "ease-out-quad" => Some(Self::EaseOutQuad),
            "ease-out-cubic" => Some(Self::EaseOutCubic),
            "ease-out-quart" | "ease-out" => Some(Self::EaseOutQuart),
            "ease-out-quint" => Some(Self::EaseOutQuint),
            "ease-in-out-quart" => Some(Self::EaseInOutQuart),
            "ease-out-expo" => Some(Self::EaseOutExpo),
            _ => None,
        }
    }

    /// Canonical curve name, accepted by [`Easing::parse`].
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::EaseOutQuad => "ease-out-quad",
            Self::EaseOutCubic => "ease-out-cubic",
            Self::EaseOutQuart => "ease-out-quart",
            Self::EaseOutQuint => "ease-out-quint",
            Self::EaseInOutQuart => "ease-in-out-quart",
            Self::EaseOutExpo => "ease-out-expo",
        }
    }
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
