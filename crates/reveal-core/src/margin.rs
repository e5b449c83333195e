#![forbid(unsafe_code)]

//! Root margins: signed adjustments to the effective viewport edges.
//!
//! Margins use CSS shorthand (`"10px"`, `"0px 20%"`, `"0px 0px -50px 0px"`).
//! Positive values grow the viewport outward, negative values shrink it, so
//! `-50px` at the bottom means an element must rise 50 pixels above the fold
//! before it counts as visible. Percentages resolve against the viewport
//! height for top/bottom and its width for left/right.

use core::fmt;

/// One margin side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MarginLength {
    /// Absolute pixels.
    Px(f64),
    /// Percent of the viewport extent along the same axis.
    Percent(f64),
}

impl MarginLength {
    /// Resolve to pixels against an axis extent.
    #[must_use]
    pub fn resolve(self, extent: f64) -> f64 {
        match self {
            Self::Px(px) => px,
            Self::Percent(pct) => extent * pct / 100.0,
        }
    }

    fn parse(token: &str) -> Result<Self, RootMarginParseError> {
        let (number, unit) = if let Some(n) = token.strip_suffix("px") {
            (n, Unit::Px)
        } else if let Some(n) = token.strip_suffix('%') {
            (n, Unit::Percent)
        } else if token == "0" {
            (token, Unit::Px)
        } else {
            return Err(RootMarginParseError::MissingUnit(token.to_owned()));
        };
        let value: f64 = number
            .parse()
            .map_err(|_| RootMarginParseError::InvalidNumber(token.to_owned()))?;
        if !value.is_finite() {
            return Err(RootMarginParseError::InvalidNumber(token.to_owned()));
        }
        Ok(match unit {
            Unit::Px => Self::Px(value),
            Unit::Percent => Self::Percent(value),
        })
    }
}

enum Unit {
    Px,
    Percent,
}

impl fmt::Display for MarginLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Px(v) => write!(f, "{v}px"),
            Self::Percent(v) => write!(f, "{v}%"),
        }
    }
}

/// Errors from [`RootMargin::parse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RootMarginParseError {
    /// No tokens.
    Empty,
    /// More than four tokens.
    TooManyValues(usize),
    /// Token without a `px` or `%` suffix.
    MissingUnit(String),
    /// Token whose numeric part does not parse.
    InvalidNumber(String),
}

impl fmt::Display for RootMarginParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "root margin is empty"),
            Self::TooManyValues(n) => write!(f, "root margin takes 1 to 4 values, got {n}"),
            Self::MissingUnit(tok) => write!(f, "root margin value needs px or %: {tok}"),
            Self::InvalidNumber(tok) => write!(f, "invalid root margin number: {tok}"),
        }
    }
}

impl std::error::Error for RootMarginParseError {}

/// Margins for the four viewport edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootMargin {
    pub top: MarginLength,
    pub right: MarginLength,
    pub bottom: MarginLength,
    pub left: MarginLength,
}

impl Default for RootMargin {
    fn default() -> Self {
        Self::ZERO
    }
}

impl RootMargin {
    /// No adjustment.
    pub const ZERO: Self = Self::uniform(MarginLength::Px(0.0));

    /// Same length on every side.
    #[must_use]
    pub const fn uniform(len: MarginLength) -> Self {
        Self {
            top: len,
            right: len,
            bottom: len,
            left: len,
        }
    }

    /// Pixel margins in top/right/bottom/left order.
    #[must_use]
    pub const fn px(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top: MarginLength::Px(top),
            right: MarginLength::Px(right),
            bottom: MarginLength::Px(bottom),
            left: MarginLength::Px(left),
        }
    }

    /// Parse CSS margin shorthand (1 to 4 whitespace-separated values).
    pub fn parse(value: &str) -> Result<Self, RootMarginParseError> {
        let tokens = value
            .split_whitespace()
            .map(MarginLength::parse)
            .collect::<Result<Vec<_>, _>>()?;
        match tokens.as_slice() {
            [] => Err(RootMarginParseError::Empty),
            [all] => Ok(Self::uniform(*all)),
            [vertical, horizontal] => Ok(Self {
                top: *vertical,
                right: *horizontal,
                bottom: *vertical,
                left: *horizontal,
            }),
            [top, horizontal, bottom] => Ok(Self {
                top: *top,
                right: *horizontal,
                bottom: *bottom,
                left: *horizontal,
            }),
            [top, right, bottom, left] => Ok(Self {
                top: *top,
                right: *right,
                bottom: *bottom,
                left: *left,
            }),
            more => Err(RootMarginParseError::TooManyValues(more.len())),
        }
    }
}

impl fmt::Display for RootMargin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.top, self.right, self.bottom, self.left)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_four_values() {
        let m = RootMargin::parse("0px 0px -50px 0px").unwrap();
        assert_eq!(m, RootMargin::px(0.0, 0.0, -50.0, 0.0));
    }

    #[test]
    fn parse_shorthand_expansion() {
        assert_eq!(
            RootMargin::parse("10px").unwrap(),
            RootMargin::px(10.0, 10.0, 10.0, 10.0)
        );
        assert_eq!(
            RootMargin::parse("1px 2px").unwrap(),
            RootMargin::px(1.0, 2.0, 1.0, 2.0)
        );
        assert_eq!(
            RootMargin::parse("1px 2px 3px").unwrap(),
            RootMargin::px(1.0, 2.0, 3.0, 2.0)
        );
    }

    #[test]
    fn parse_percent_and_bare_zero() {
        let m = RootMargin::parse("  0 -10% ").unwrap();
        assert_eq!(m.top, MarginLength::Px(0.0));
        assert_eq!(m.right, MarginLength::Percent(-10.0));
    }

    #[test]
    fn parse_errors() {
        assert_eq!(RootMargin::parse("   "), Err(RootMarginParseError::Empty));
        assert_eq!(
            RootMargin::parse("1px 1px 1px 1px 1px"),
            Err(RootMarginParseError::TooManyValues(5))
        );
        assert_eq!(
            RootMargin::parse("10"),
            Err(RootMarginParseError::MissingUnit("10".into()))
        );
        assert_eq!(
            RootMargin::parse("abcpx"),
            Err(RootMarginParseError::InvalidNumber("abcpx".into()))
        );
    }

    #[test]
    fn resolve_percent() {
        assert_eq!(MarginLength::Percent(10.0).resolve(800.0), 80.0);
        assert_eq!(MarginLength::Px(-50.0).resolve(800.0), -50.0);
    }

    #[test]
    fn display_roundtrips() {
        let m = RootMargin::parse("0px 5% -50px 0px").unwrap();
        assert_eq!(RootMargin::parse(&m.to_string()).unwrap(), m);
    }
}
