//! Battery charge bands derived from the four threshold switches.
//!
//! The predicates are combined exactly as the installed threshold hardware
//! was calibrated. They are deliberately not collapsed into a single charge
//! percentage: `is_high` ignores bit 0 and `is_low` is not the negation of
//! either of the others.

use serde::{Deserialize, Serialize};

/// Snapshot of the four charge-level threshold bits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeBits {
    pub b0: bool,
    pub b1: bool,
    pub b2: bool,
    pub b3: bool,
}

impl ChargeBits {
    pub const fn new(b0: bool, b1: bool, b2: bool, b3: bool) -> Self {
        Self { b0, b1, b2, b3 }
    }

    /// Every threshold tripped
    pub const fn is_full(&self) -> bool {
        self.b0 && self.b1 && self.b2 && self.b3
    }

    /// Roughly 93% and above
    pub const fn is_high(&self) -> bool {
        self.b1 && self.b2 && self.b3
    }

    /// Roughly below 80%
    pub const fn is_low(&self) -> bool {
        (!self.b0 && !self.b1) || !self.b2
    }

    /// Enough charge to carry the house through a peak window, given
    /// whether solar or wind is currently charging.
    pub const fn sufficient_for_peak(&self, renewable: bool) -> bool {
        self.b3 || (renewable && self.b0 && self.b1 && self.b2)
    }
}

impl From<[bool; 4]> for ChargeBits {
    fn from(bits: [bool; 4]) -> Self {
        let [b0, b1, b2, b3] = bits;
        Self { b0, b1, b2, b3 }
    }
}

impl std::fmt::Display for ChargeBits {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{}{}{}",
            u8::from(self.b3),
            u8::from(self.b2),
            u8::from(self.b1),
            u8::from(self.b0)
        )
    }
}
