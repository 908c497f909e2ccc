use std::sync::{Arc, Mutex, RwLock};

use super::InputSensing;
use crate::battery::ChargeBits;
use crate::config::SensorsConfig;
use crate::controller::Availability;
use crate::dispatcher::EventSender;
use crate::error::{AmpswitchError, Result};
use crate::logging::{LogContext, StructuredLogger, get_logger_with_context};

#[derive(Debug, Default)]
struct Levels {
    bits: ChargeBits,
    availability: Availability,
    failing_reads: u32,
}

/// In-memory stand-in for the sensing board.
///
/// Clones share the same levels. With an [`EventSender`] attached, a falling
/// grid level raises a power-loss event and the manual switch raises a
/// mode-toggle event, mirroring the edge interrupts on the real board.
#[derive(Clone)]
pub struct SimulatedInputs {
    levels: Arc<RwLock<Levels>>,
    events: Arc<Mutex<Option<EventSender>>>,
    logger: StructuredLogger,
}

impl SimulatedInputs {
    pub fn new(bits: ChargeBits, availability: Availability) -> Self {
        Self {
            levels: Arc::new(RwLock::new(Levels {
                bits,
                availability,
                failing_reads: 0,
            })),
            events: Arc::new(Mutex::new(None)),
            logger: get_logger_with_context(
                LogContext::new("sensing").with_field("adapter", "simulated".to_string()),
            ),
        }
    }

    pub fn from_config(config: &SensorsConfig) -> Self {
        Self::new(config.charge_bits(), config.availability())
    }

    /// Route edge events into the dispatcher
    pub fn attach(&self, sender: EventSender) {
        if let Ok(mut slot) = self.events.lock() {
            *slot = Some(sender);
        }
    }

    pub fn set_charge_bits(&self, bits: ChargeBits) {
        if let Ok(mut levels) = self.levels.write() {
            levels.bits = bits;
        }
    }

    pub fn set_solar(&self, on: bool) {
        if let Ok(mut levels) = self.levels.write() {
            levels.availability.solar = on;
        }
    }

    pub fn set_wind(&self, on: bool) {
        if let Ok(mut levels) = self.levels.write() {
            levels.availability.wind = on;
        }
    }

    /// Change the grid level; a true-to-false change is a power-loss edge
    pub fn set_ac_available(&self, available: bool) {
        let was = match self.levels.write() {
            Ok(mut levels) => {
                let was = levels.availability.ac_avail;
                levels.availability.ac_avail = available;
                was
            }
            Err(_) => return,
        };
        if was && !available {
            self.logger.info("Grid level fell");
            self.fire(|sender| sender.power_lost());
        }
    }

    /// Press the manual switch (rising edge)
    pub fn press_manual_switch(&self) {
        self.logger.info("Manual switch pressed");
        self.fire(|sender| sender.mode_toggled());
    }

    /// Make the next `count` reads fail
    pub fn fail_next_reads(&self, count: u32) {
        if let Ok(mut levels) = self.levels.write() {
            levels.failing_reads = count;
        }
    }

    fn fire(&self, send: impl FnOnce(&EventSender) -> Result<()>) {
        let Ok(slot) = self.events.lock() else {
            return;
        };
        match slot.as_ref() {
            Some(sender) => {
                if let Err(e) = send(sender) {
                    self.logger.warn(&format!("Dropped edge event: {}", e));
                }
            }
            None => self.logger.debug("No dispatcher attached; edge ignored"),
        }
    }

    fn take_failure(&self) -> Result<()> {
        let mut levels = self
            .levels
            .write()
            .map_err(|_| AmpswitchError::sensor("sensor state poisoned"))?;
        if levels.failing_reads > 0 {
            levels.failing_reads -= 1;
            return Err(AmpswitchError::sensor("simulated read failure"));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl InputSensing for SimulatedInputs {
    async fn read_charge_bits(&self) -> Result<ChargeBits> {
        self.take_failure()?;
        self.levels
            .read()
            .map(|levels| levels.bits)
            .map_err(|_| AmpswitchError::sensor("sensor state poisoned"))
    }

    async fn read_availability(&self) -> Result<Availability> {
        self.take_failure()?;
        self.levels
            .read()
            .map(|levels| levels.availability)
            .map_err(|_| AmpswitchError::sensor("sensor state poisoned"))
    }
}
