//! Event dispatch and the periodic evaluation loop
//!
//! One task owns the [`PowerSourceController`]. Hardware edges arrive on an
//! unbounded queue through cloneable [`EventSender`]s, ticks come from a
//! timer, and both are consumed by the same `select!` loop, so the state
//! transition never runs concurrently with itself. Senders never block,
//! which keeps edge handlers on the board side short.

mod snapshot;

pub use snapshot::{ControllerSnapshot, format_epoch};

use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::time::{Duration, MissedTickBehavior, interval};

use crate::battery::ChargeBits;
use crate::clock::Clock;
use crate::config::{Config, DisplayConfig};
use crate::controller::{
    Availability, ControlInput, HardwareEvent, Notification, PowerSourceController, TickInputs,
};
use crate::error::{AmpswitchError, Result};
use crate::hardware::{InputSensing, RelayActuator};
use crate::logging::{StructuredLogger, get_logger};
use crate::presentation::{DisplayDirective, Presenter};

/// Handle for raising hardware events from interrupt-like contexts
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::UnboundedSender<HardwareEvent>,
}

impl EventSender {
    pub fn send(&self, event: HardwareEvent) -> Result<()> {
        self.tx
            .send(event)
            .map_err(|_| AmpswitchError::channel("dispatcher is no longer running"))
    }

    /// Grid level fell
    pub fn power_lost(&self) -> Result<()> {
        self.send(HardwareEvent::PowerLoss)
    }

    /// Manual switch pressed
    pub fn mode_toggled(&self) -> Result<()> {
        self.send(HardwareEvent::ModeToggle)
    }
}

/// Stops [`EventDispatcher::run`]
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    tx: mpsc::UnboundedSender<()>,
}

impl ShutdownHandle {
    pub fn request(&self) {
        self.tx.send(()).ok();
    }
}

/// Drives the controller from ticks and hardware events
pub struct EventDispatcher {
    controller: PowerSourceController,
    sensing: Box<dyn InputSensing>,
    relays: Box<dyn RelayActuator>,
    presenter: Box<dyn Presenter>,
    clock: Arc<dyn Clock>,
    display: DisplayConfig,
    tick_interval: Duration,

    events_tx: mpsc::UnboundedSender<HardwareEvent>,
    events_rx: mpsc::UnboundedReceiver<HardwareEvent>,
    shutdown_tx: mpsc::UnboundedSender<()>,
    shutdown_rx: mpsc::UnboundedReceiver<()>,
    snapshot_tx: watch::Sender<ControllerSnapshot>,

    ticks: u64,
    events: u64,
    last_tick_epoch: Option<i64>,
    in_peak: bool,
    logger: StructuredLogger,
}

impl EventDispatcher {
    /// Boot: pick the initial source from the grid level and drive the relays.
    ///
    /// The configuration is validated first; an invalid one is rejected
    /// before any hardware is touched.
    pub async fn new(
        config: &Config,
        sensing: Box<dyn InputSensing>,
        relays: Box<dyn RelayActuator>,
        presenter: Box<dyn Presenter>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;
        let logger = get_logger("dispatcher");

        let availability = sensing.read_availability().await.unwrap_or_else(|e| {
            logger.warn(&format!(
                "Availability read failed at boot, assuming grid down: {}",
                e
            ));
            Availability::default()
        });
        let controller =
            PowerSourceController::new(config.peak_windows.windows(), availability.ac_avail);

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = mpsc::unbounded_channel();
        let state = controller.state();
        let (snapshot_tx, _) = watch::channel(ControllerSnapshot {
            clock_time: None,
            source: state.source(),
            mode: state.mode,
            ac_relay: state.ac_on,
            dc_relay: state.dc_on,
            export: state.export_on,
            last_tick_epoch: None,
            in_peak: false,
            ticks: 0,
            events: 0,
        });

        relays.apply(state.relay_command()).await?;

        Ok(Self {
            controller,
            sensing,
            relays,
            presenter,
            clock,
            display: config.display,
            tick_interval: Duration::from_secs(config.tick_interval_secs),
            events_tx,
            events_rx,
            shutdown_tx,
            shutdown_rx,
            snapshot_tx,
            ticks: 0,
            events: 0,
            last_tick_epoch: None,
            in_peak: false,
            logger,
        })
    }

    pub fn event_sender(&self) -> EventSender {
        EventSender {
            tx: self.events_tx.clone(),
        }
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            tx: self.shutdown_tx.clone(),
        }
    }

    pub const fn controller(&self) -> &PowerSourceController {
        &self.controller
    }

    /// Evaluate once with freshly sampled inputs
    pub async fn run_tick(&mut self) -> Result<Vec<Notification>> {
        let now = self.clock.now_epoch();
        let (bits, availability) = self.sample().await;
        let notes = self.controller.handle(&ControlInput::Tick(TickInputs {
            now,
            bits,
            availability,
        }));

        self.ticks = self.ticks.saturating_add(1);
        self.last_tick_epoch = Some(now);
        self.in_peak = self.controller.is_peak(now);
        self.logger.debug(&format!(
            "Tick #{} at {} bits={} ac={} solar={} wind={} peak={}",
            self.ticks,
            format_epoch(now),
            bits,
            availability.ac_avail,
            availability.solar,
            availability.wind,
            self.in_peak
        ));

        self.publish(&notes, true).await?;
        Ok(notes)
    }

    /// Apply one hardware event immediately
    pub async fn handle_event(&mut self, event: HardwareEvent) -> Result<Vec<Notification>> {
        let notes = self.controller.handle(&event.into());
        self.events = self.events.saturating_add(1);
        self.publish(&notes, false).await?;
        Ok(notes)
    }

    /// Process every event already queued, returning how many were handled
    pub async fn drain_events(&mut self) -> Result<usize> {
        let mut handled = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_event(event).await?;
            handled += 1;
        }
        Ok(handled)
    }

    /// Run until shutdown is requested.
    ///
    /// The first tick fires immediately. Queued events are served before a
    /// due tick, and a failing tick or event is logged without stopping the
    /// loop.
    pub async fn run(&mut self) -> Result<()> {
        self.logger.info(&format!(
            "Starting evaluation loop, tick every {}s",
            self.tick_interval.as_secs()
        ));

        let mut ticker = interval(self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = self.shutdown_rx.recv() => {
                    self.logger.info("Shutdown signal received");
                    break;
                }
                Some(event) = self.events_rx.recv() => {
                    if let Err(e) = self.handle_event(event).await {
                        self.logger.error(&format!("Event {:?} failed: {}", event, e));
                    }
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.run_tick().await {
                        self.logger.error(&format!("Tick failed: {}", e));
                    }
                }
            }
        }

        self.logger.info("Evaluation loop stopped");
        Ok(())
    }

    /// Sample every input; a failed read counts as "not present"
    async fn sample(&self) -> (ChargeBits, Availability) {
        let bits = self.sensing.read_charge_bits().await.unwrap_or_else(|e| {
            self.logger
                .warn(&format!("Charge bit read failed, treating as empty: {}", e));
            ChargeBits::default()
        });
        let availability = self.sensing.read_availability().await.unwrap_or_else(|e| {
            self.logger.warn(&format!(
                "Availability read failed, treating as unavailable: {}",
                e
            ));
            Availability::default()
        });
        (bits, availability)
    }

    /// Drive relays, present notifications and publish a snapshot
    async fn publish(&self, notes: &[Notification], from_tick: bool) -> Result<()> {
        let applied = self
            .relays
            .apply(self.controller.state().relay_command())
            .await;

        for &notification in notes {
            // An automatic switch to battery scrolls slower
            let speed_ms = if from_tick && notification == Notification::SourceDc {
                self.display.auto_switch_speed_ms
            } else {
                self.display.speed_ms
            };
            let directive = DisplayDirective {
                notification,
                repeat: self.display.repeat,
                speed_ms,
            };
            if let Err(e) = self.presenter.present(directive).await {
                self.logger
                    .warn(&format!("Display of {:?} failed: {}", notification, e));
            }
        }

        self.publish_snapshot();
        applied
    }
}
