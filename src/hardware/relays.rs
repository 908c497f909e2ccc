use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use super::RelayActuator;
use crate::controller::RelayCommand;
use crate::error::{AmpswitchError, Result};
use crate::logging::{StructuredLogger, get_logger};

/// Commands retained by [`LoggingRelays`]; older ones are dropped
pub const RELAY_HISTORY_LIMIT: usize = 32;

/// Actuator that logs every relay command and keeps the most recent ones.
///
/// Clones share the recorded history.
#[derive(Clone)]
pub struct LoggingRelays {
    history: Arc<Mutex<VecDeque<RelayCommand>>>,
    logger: StructuredLogger,
}

impl LoggingRelays {
    pub fn new() -> Self {
        Self {
            history: Arc::new(Mutex::new(VecDeque::with_capacity(RELAY_HISTORY_LIMIT))),
            logger: get_logger("relays"),
        }
    }

    /// Most recently applied command
    pub fn last(&self) -> Option<RelayCommand> {
        self.history.lock().ok().and_then(|h| h.back().copied())
    }

    /// Recent commands, oldest first, at most [`RELAY_HISTORY_LIMIT`]
    pub fn history(&self) -> Vec<RelayCommand> {
        self.history
            .lock()
            .map(|h| h.iter().copied().collect())
            .unwrap_or_default()
    }
}

impl Default for LoggingRelays {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl RelayActuator for LoggingRelays {
    async fn apply(&self, command: RelayCommand) -> Result<()> {
        self.logger.debug(&format!(
            "ac_on={} dc_on={} export_on={}",
            u8::from(command.ac_on),
            u8::from(command.dc_on),
            u8::from(command.export_on)
        ));
        let mut history = self
            .history
            .lock()
            .map_err(|_| AmpswitchError::actuator("relay history poisoned"))?;
        if history.len() == RELAY_HISTORY_LIMIT {
            history.pop_front();
        }
        history.push_back(command);
        Ok(())
    }
}
