//! Recurring daily peak-pricing windows
//!
//! A window is anchored at an absolute epoch second and repeats every day.
//! Membership is decided purely from the elapsed time since the anchor,
//! folded into a single day.

use crate::error::{AmpswitchError, Result};
use serde::{Deserialize, Serialize};

/// Seconds in one day; every window recurs with this period
pub const DAY_SECS: i64 = 86_400;

/// Fold a difference of two epochs into one day.
///
/// Widened so extreme anchors cannot overflow; the result is always in
/// `0..DAY_SECS`.
#[allow(clippy::cast_possible_truncation)]
const fn fold_into_day(later: i64, earlier: i64) -> i64 {
    (later as i128 - earlier as i128).rem_euclid(DAY_SECS as i128) as i64
}

/// A daily recurring interval, anchored at `start`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// First instant of the window, epoch seconds
    pub start: i64,
    /// First instant after the window, epoch seconds
    pub end: i64,
}

impl TimeWindow {
    /// Build a window, rejecting empty, inverted and day-or-longer spans.
    pub fn new(start: i64, end: i64) -> Result<Self> {
        let window = Self { start, end };
        window.validate("window")?;
        Ok(window)
    }

    /// Window length folded into one day.
    ///
    /// A zero result means no instant ever matches.
    pub const fn duration(&self) -> i64 {
        fold_into_day(self.end, self.start)
    }

    /// Seconds since the most recent occurrence of `start`
    pub const fn elapsed(&self, t: i64) -> i64 {
        fold_into_day(t, self.start)
    }

    /// Whether `t` falls inside this window
    pub const fn contains(&self, t: i64) -> bool {
        self.elapsed(t) < self.duration()
    }

    /// Check the raw span so a bad window is reported instead of collapsing
    /// silently under the daily modulo.
    pub fn validate(&self, field: &str) -> Result<()> {
        let Some(span) = self.end.checked_sub(self.start) else {
            return Err(AmpswitchError::validation(
                field,
                format!("span from {} to {} is out of range", self.start, self.end),
            ));
        };
        if span <= 0 {
            return Err(AmpswitchError::validation(
                field,
                format!("end ({}) must be after start ({})", self.end, self.start),
            ));
        }
        if span >= DAY_SECS {
            return Err(AmpswitchError::validation(
                field,
                format!("span of {}s must be shorter than one day", span),
            ));
        }
        Ok(())
    }
}

/// True if `t` lies inside any of the given windows
pub fn is_peak(t: i64, windows: &[TimeWindow]) -> bool {
    windows.iter().any(|w| w.contains(t))
}
