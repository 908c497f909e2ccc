use serde::{Deserialize, Serialize};

use crate::battery::ChargeBits;

/// Which supply currently feeds the house
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerSource {
    /// Grid
    Ac,
    /// Battery bank
    Dc,
}

impl PowerSource {
    pub const fn flipped(self) -> Self {
        match self {
            Self::Ac => Self::Dc,
            Self::Dc => Self::Ac,
        }
    }

    /// Notification announcing a switch to this source
    pub const fn notification(self) -> Notification {
        match self {
            Self::Ac => Notification::SourceAc,
            Self::Dc => Notification::SourceDc,
        }
    }
}

/// Whether automatic rules may change the source
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerMode {
    #[default]
    Auto,
    Manual,
}

/// Symbolic messages for the presentation collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Notification {
    SourceAc,
    SourceDc,
    LostAc,
    ManualEnter,
    AutoEnter,
    Selling,
}

/// Level signals sampled alongside the charge bits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
    pub ac_avail: bool,
    pub solar: bool,
    pub wind: bool,
}

impl Availability {
    /// Solar or wind is charging the bank
    pub const fn renewable(&self) -> bool {
        self.solar || self.wind
    }
}

/// Fresh hardware readings for one evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickInputs {
    /// Wall-clock epoch seconds
    pub now: i64,
    pub bits: ChargeBits,
    pub availability: Availability,
}

/// Asynchronous hardware edges
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HardwareEvent {
    /// `ac_avail` fell from available to unavailable
    PowerLoss,
    /// Manual switch pressed
    ModeToggle,
}

/// Everything the state machine reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlInput {
    Tick(TickInputs),
    Event(HardwareEvent),
}

impl From<HardwareEvent> for ControlInput {
    fn from(event: HardwareEvent) -> Self {
        Self::Event(event)
    }
}

/// The three relay lines driven after every input
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayCommand {
    pub ac_on: bool,
    pub dc_on: bool,
    pub export_on: bool,
}

/// Controller state as seen on the relay lines plus the mode flag.
///
/// Relays are kept as two flags rather than a [`PowerSource`] so that a
/// corrupted "both off" observation can be represented and healed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerState {
    pub ac_on: bool,
    pub dc_on: bool,
    pub export_on: bool,
    pub mode: PowerMode,
}

impl ControllerState {
    /// Boot state: grid if it is available, battery otherwise, automatic mode
    pub const fn boot(ac_avail: bool) -> Self {
        Self::on(if ac_avail {
            PowerSource::Ac
        } else {
            PowerSource::Dc
        })
    }

    /// Automatic mode on the given source, not exporting
    pub const fn on(source: PowerSource) -> Self {
        Self {
            ac_on: matches!(source, PowerSource::Ac),
            dc_on: matches!(source, PowerSource::Dc),
            export_on: false,
            mode: PowerMode::Auto,
        }
    }

    pub const fn with_mode(mut self, mode: PowerMode) -> Self {
        self.mode = mode;
        self
    }

    /// Active source, or `None` when the relay pair is not exactly one-hot
    pub const fn source(&self) -> Option<PowerSource> {
        match (self.ac_on, self.dc_on) {
            (true, false) => Some(PowerSource::Ac),
            (false, true) => Some(PowerSource::Dc),
            _ => None,
        }
    }

    pub(crate) const fn set_source(&mut self, source: PowerSource) {
        self.ac_on = matches!(source, PowerSource::Ac);
        self.dc_on = matches!(source, PowerSource::Dc);
    }

    pub const fn relay_command(&self) -> RelayCommand {
        RelayCommand {
            ac_on: self.ac_on,
            dc_on: self.dc_on,
            export_on: self.export_on,
        }
    }
}
