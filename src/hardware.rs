//! Hardware collaborator interfaces
//!
//! The controller never touches pins directly. Sensing and actuation go
//! through these traits; the board integration implements them, and the
//! simulated adapters here stand in for it in tests and on a workstation.

mod relays;
mod sim;

pub use relays::{LoggingRelays, RELAY_HISTORY_LIMIT};
pub use sim::SimulatedInputs;

use crate::battery::ChargeBits;
use crate::controller::{Availability, RelayCommand};
use crate::error::Result;

/// Level inputs sampled at the start of every tick
#[async_trait::async_trait]
pub trait InputSensing: Send + Sync {
    /// The four charge threshold bits
    async fn read_charge_bits(&self) -> Result<ChargeBits>;

    /// Grid, solar and wind levels
    async fn read_availability(&self) -> Result<Availability>;
}

/// Relay outputs driven after every tick and event
#[async_trait::async_trait]
pub trait RelayActuator: Send + Sync {
    async fn apply(&self, command: RelayCommand) -> Result<()>;
}
