//! Power source state machine
//!
//! The controller owns the relay flags and the mode. Every input, whether a
//! periodic tick or a hardware edge, goes through [`transition`], a pure
//! function of the previous state and the input. [`PowerSourceController`]
//! wraps it with the configured peak windows and logging.

mod types;

pub use types::{
    Availability, ControlInput, ControllerState, HardwareEvent, Notification, PowerMode,
    PowerSource, RelayCommand, TickInputs,
};

use crate::export::export_decision;
use crate::logging::{StructuredLogger, get_logger};
use crate::peak::{TimeWindow, is_peak};

/// Apply one input to `state`.
///
/// Returns the new state and the notifications to present, in order.
pub fn transition(
    state: ControllerState,
    input: &ControlInput,
    windows: &[TimeWindow],
) -> (ControllerState, Vec<Notification>) {
    match input {
        ControlInput::Tick(inputs) => tick(state, inputs, windows),
        ControlInput::Event(HardwareEvent::PowerLoss) => power_loss(state),
        ControlInput::Event(HardwareEvent::ModeToggle) => mode_toggle(state),
    }
}

fn tick(
    mut state: ControllerState,
    inputs: &TickInputs,
    windows: &[TimeWindow],
) -> (ControllerState, Vec<Notification>) {
    let mut notes = Vec::new();

    // Self-heal: the house must never be left without a source
    if !state.ac_on && !state.dc_on {
        state.set_source(PowerSource::Ac);
        notes.push(Notification::SourceAc);
    }
    // Both relays closed: grid wins
    if state.ac_on && state.dc_on {
        state.dc_on = false;
    }
    let current = if state.ac_on {
        PowerSource::Ac
    } else {
        PowerSource::Dc
    };

    let bits = &inputs.bits;
    let ac_avail = inputs.availability.ac_avail;
    let renewable = inputs.availability.renewable();
    let peak = is_peak(inputs.now, windows);

    if state.mode == PowerMode::Auto {
        let next = match current {
            PowerSource::Ac => {
                let use_battery = bits.is_full() || (peak && bits.sufficient_for_peak(renewable));
                if use_battery { PowerSource::Dc } else { PowerSource::Ac }
            }
            PowerSource::Dc => {
                let depleted = ac_avail && !bits.b3 && !(renewable && bits.is_high());
                let cheap_grid = ac_avail && !peak && bits.is_low();
                if depleted || cheap_grid {
                    PowerSource::Ac
                } else {
                    PowerSource::Dc
                }
            }
        };
        if next != current {
            state.set_source(next);
            notes.push(next.notification());
        }
    }

    let source = if state.ac_on {
        PowerSource::Ac
    } else {
        PowerSource::Dc
    };
    let export = export_decision(source, ac_avail, renewable, bits.is_high());
    if export && !state.export_on {
        notes.push(Notification::Selling);
    }
    state.export_on = export;

    (state, notes)
}

fn power_loss(mut state: ControllerState) -> (ControllerState, Vec<Notification>) {
    state.set_source(PowerSource::Dc);
    // Nothing to sell into a dead grid
    state.export_on = false;
    (state, vec![Notification::LostAc, Notification::SourceDc])
}

fn mode_toggle(mut state: ControllerState) -> (ControllerState, Vec<Notification>) {
    match state.mode {
        PowerMode::Auto => {
            let target = if state.dc_on {
                PowerSource::Ac
            } else {
                PowerSource::Dc
            };
            state.set_source(target);
            state.export_on = false;
            state.mode = PowerMode::Manual;
            (state, vec![target.notification(), Notification::ManualEnter])
        }
        PowerMode::Manual => {
            state.mode = PowerMode::Auto;
            (state, vec![Notification::AutoEnter])
        }
    }
}

/// Owner of the process-wide source and mode
pub struct PowerSourceController {
    state: ControllerState,
    windows: Vec<TimeWindow>,
    logger: StructuredLogger,
}

impl PowerSourceController {
    /// Boot the controller from the grid availability level
    pub fn new(windows: Vec<TimeWindow>, ac_avail: bool) -> Self {
        Self::with_state(windows, ControllerState::boot(ac_avail))
    }

    /// Start from an explicit state
    pub fn with_state(windows: Vec<TimeWindow>, state: ControllerState) -> Self {
        let logger = get_logger("controller");
        logger.info(&format!(
            "Controller starting on {:?} in {:?} mode",
            state.source(),
            state.mode
        ));
        Self {
            state,
            windows,
            logger,
        }
    }

    pub const fn state(&self) -> ControllerState {
        self.state
    }

    pub fn windows(&self) -> &[TimeWindow] {
        &self.windows
    }

    /// Whether `now` falls in one of the configured peak windows
    pub fn is_peak(&self, now: i64) -> bool {
        is_peak(now, &self.windows)
    }

    /// Apply an input and return the notifications it produced
    pub fn handle(&mut self, input: &ControlInput) -> Vec<Notification> {
        let before = self.state;
        let (after, notes) = transition(before, input, &self.windows);
        self.state = after;

        if let ControlInput::Event(event) = input {
            self.logger.info(&format!("Hardware event: {:?}", event));
        }
        if before.source() != after.source() {
            self.logger.info(&format!(
                "Power source {:?} -> {:?}",
                before.source(),
                after.source()
            ));
        }
        if before.mode != after.mode {
            self.logger
                .info(&format!("Mode {:?} -> {:?}", before.mode, after.mode));
        }
        if before.export_on != after.export_on {
            self.logger.info(if after.export_on {
                "Export to grid enabled"
            } else {
                "Export to grid disabled"
            });
        }
        notes
    }
}
