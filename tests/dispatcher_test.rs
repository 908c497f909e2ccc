use std::sync::Arc;

use ampswitch::battery::ChargeBits;
use ampswitch::clock::FixedClock;
use ampswitch::config::Config;
use ampswitch::controller::{Availability, Notification, PowerMode, PowerSource, RelayCommand};
use ampswitch::dispatcher::EventDispatcher;
use ampswitch::hardware::{LoggingRelays, RELAY_HISTORY_LIMIT, SimulatedInputs};
use ampswitch::presentation::RecordingPresenter;

const BOOT: i64 = 1_607_205_300;
const IN_PEAK: i64 = 1_607_209_200;
const OFF_PEAK: i64 = 1_607_230_800;

struct Rig {
    dispatcher: EventDispatcher,
    sensing: SimulatedInputs,
    relays: LoggingRelays,
    presenter: RecordingPresenter,
    clock: Arc<FixedClock>,
}

async fn rig(bits: ChargeBits, availability: Availability) -> Rig {
    let config = Config::default();
    let sensing = SimulatedInputs::new(bits, availability);
    let relays = LoggingRelays::new();
    let presenter = RecordingPresenter::new();
    let clock = Arc::new(FixedClock::new(BOOT));
    let dispatcher = EventDispatcher::new(
        &config,
        Box::new(sensing.clone()),
        Box::new(relays.clone()),
        Box::new(presenter.clone()),
        clock.clone(),
    )
    .await
    .unwrap();
    sensing.attach(dispatcher.event_sender());
    Rig {
        dispatcher,
        sensing,
        relays,
        presenter,
        clock,
    }
}

fn grid_only() -> Availability {
    Availability {
        ac_avail: true,
        solar: false,
        wind: false,
    }
}

#[tokio::test]
async fn boot_drives_relays_from_grid_level() {
    let r = rig(ChargeBits::default(), grid_only()).await;
    assert_eq!(
        r.relays.last(),
        Some(RelayCommand {
            ac_on: true,
            dc_on: false,
            export_on: false
        })
    );

    let r = rig(ChargeBits::default(), Availability::default()).await;
    assert_eq!(
        r.dispatcher.controller().state().source(),
        Some(PowerSource::Dc)
    );
}

#[tokio::test]
async fn boot_with_failed_read_assumes_grid_down() {
    let sensing = SimulatedInputs::new(ChargeBits::default(), grid_only());
    sensing.fail_next_reads(1);
    let dispatcher = EventDispatcher::new(
        &Config::default(),
        Box::new(sensing),
        Box::new(LoggingRelays::new()),
        Box::new(RecordingPresenter::new()),
        Arc::new(FixedClock::new(BOOT)),
    )
    .await
    .unwrap();
    assert_eq!(
        dispatcher.controller().state().source(),
        Some(PowerSource::Dc)
    );
}

#[tokio::test]
async fn peak_tick_switches_to_battery_with_slow_scroll() {
    let mut r = rig(ChargeBits::new(false, false, false, true), grid_only()).await;

    // 16:55, not yet peak
    assert!(r.dispatcher.run_tick().await.unwrap().is_empty());

    r.clock.set(IN_PEAK);
    let notes = r.dispatcher.run_tick().await.unwrap();
    assert_eq!(notes, vec![Notification::SourceDc]);

    let shown = r.presenter.directives();
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].speed_ms, 400);
    assert_eq!(shown[0].repeat, 1);
    assert_eq!(
        r.relays.last(),
        Some(RelayCommand {
            ac_on: false,
            dc_on: true,
            export_on: false
        })
    );

    let snapshot = r.dispatcher.subscribe_snapshot().borrow().clone();
    assert_eq!(snapshot.source, Some(PowerSource::Dc));
    assert!(snapshot.in_peak);
    assert_eq!(snapshot.ticks, 2);
    assert_eq!(snapshot.last_tick_epoch, Some(IN_PEAK));
}

#[tokio::test]
async fn power_loss_edge_is_queued_and_handled() {
    let mut r = rig(ChargeBits::default(), grid_only()).await;
    r.sensing.set_ac_available(false);
    // a level that stays low is not a second edge
    r.sensing.set_ac_available(false);

    assert_eq!(r.dispatcher.drain_events().await.unwrap(), 1);
    assert_eq!(
        r.presenter.notifications(),
        vec![Notification::LostAc, Notification::SourceDc]
    );
    assert!(r.presenter.directives().iter().all(|d| d.speed_ms == 300));
    assert_eq!(
        r.dispatcher.controller().state().source(),
        Some(PowerSource::Dc)
    );
}

#[tokio::test]
async fn grid_returning_is_not_an_event() {
    let mut r = rig(ChargeBits::default(), Availability::default()).await;
    r.sensing.set_ac_available(true);
    assert_eq!(r.dispatcher.drain_events().await.unwrap(), 0);
}

#[tokio::test]
async fn manual_switch_round_trip() {
    let mut r = rig(ChargeBits::default(), grid_only()).await;

    r.sensing.press_manual_switch();
    r.dispatcher.drain_events().await.unwrap();
    assert_eq!(
        r.presenter.notifications(),
        vec![Notification::SourceDc, Notification::ManualEnter]
    );
    let state = r.dispatcher.controller().state();
    assert_eq!(state.source(), Some(PowerSource::Dc));
    assert_eq!(state.mode, PowerMode::Manual);

    // Empty bank off-peak: manual mode holds the battery
    r.clock.set(OFF_PEAK);
    assert!(r.dispatcher.run_tick().await.unwrap().is_empty());

    r.presenter.clear();
    r.sensing.press_manual_switch();
    r.dispatcher.drain_events().await.unwrap();
    assert_eq!(r.presenter.notifications(), vec![Notification::AutoEnter]);
    assert_eq!(
        r.dispatcher.controller().state().source(),
        Some(PowerSource::Dc)
    );

    // Automatic rules resume on the next tick
    let notes = r.dispatcher.run_tick().await.unwrap();
    assert_eq!(notes, vec![Notification::SourceAc]);
}

#[tokio::test]
async fn selling_on_battery_with_surplus() {
    let mut r = rig(
        ChargeBits::new(false, true, true, true),
        Availability::default(),
    )
    .await;
    r.sensing.set_ac_available(true);
    r.sensing.set_solar(true);
    r.clock.set(OFF_PEAK);

    let notes = r.dispatcher.run_tick().await.unwrap();
    assert_eq!(notes, vec![Notification::Selling]);
    assert_eq!(
        r.relays.last(),
        Some(RelayCommand {
            ac_on: false,
            dc_on: true,
            export_on: true
        })
    );

    // still selling: no repeat banner
    assert!(r.dispatcher.run_tick().await.unwrap().is_empty());

    // wind alone keeps it going, nothing renewable stops it
    r.sensing.set_solar(false);
    r.sensing.set_wind(true);
    r.dispatcher.run_tick().await.unwrap();
    assert_eq!(r.relays.last().map(|c| c.export_on), Some(true));
    r.sensing.set_wind(false);
    r.dispatcher.run_tick().await.unwrap();
    assert_eq!(r.relays.last().map(|c| c.export_on), Some(false));
}

#[tokio::test]
async fn failed_reads_fall_back_to_unavailable() {
    let mut r = rig(ChargeBits::new(true, true, true, true), grid_only()).await;
    r.clock.set(OFF_PEAK);
    // both reads of this tick fail: empty bank, no grid
    r.sensing.fail_next_reads(2);
    assert!(r.dispatcher.run_tick().await.unwrap().is_empty());
    assert_eq!(
        r.dispatcher.controller().state().source(),
        Some(PowerSource::Ac)
    );

    // next tick reads the full bank again
    assert_eq!(
        r.dispatcher.run_tick().await.unwrap(),
        vec![Notification::SourceDc]
    );
}

#[tokio::test]
async fn run_loop_serves_events_and_stops_on_shutdown() {
    let mut r = rig(ChargeBits::default(), grid_only()).await;
    let shutdown = r.dispatcher.shutdown_handle();
    let mut snapshots = r.dispatcher.subscribe_snapshot();
    let sensing = r.sensing.clone();

    let task = tokio::spawn(async move {
        r.dispatcher.run().await.unwrap();
        r.presenter.notifications()
    });

    // first tick fires immediately
    snapshots.changed().await.unwrap();
    sensing.set_ac_available(false);
    loop {
        snapshots.changed().await.unwrap();
        if snapshots.borrow().events == 1 {
            break;
        }
    }
    assert_eq!(snapshots.borrow().source, Some(PowerSource::Dc));

    shutdown.request();
    let shown = task.await.unwrap();
    assert_eq!(shown, vec![Notification::LostAc, Notification::SourceDc]);
}

#[tokio::test]
async fn invalid_config_is_rejected_before_boot() {
    let mut config = Config::default();
    config.tick_interval_secs = 0;
    let relays = LoggingRelays::new();
    let result = EventDispatcher::new(
        &config,
        Box::new(SimulatedInputs::new(ChargeBits::default(), grid_only())),
        Box::new(relays.clone()),
        Box::new(RecordingPresenter::new()),
        Arc::new(FixedClock::new(BOOT)),
    )
    .await;

    let msg = result.err().map(|e| e.to_string()).unwrap_or_default();
    assert!(msg.contains("tick_interval_secs"));
    assert_eq!(relays.last(), None);
}

#[tokio::test]
async fn long_running_ticks_keep_relay_history_bounded() {
    let mut r = rig(ChargeBits::default(), grid_only()).await;
    for _ in 0..10_000 {
        r.clock.advance(300);
        r.dispatcher.run_tick().await.unwrap();
    }
    assert_eq!(r.relays.history().len(), RELAY_HISTORY_LIMIT);
    assert!(r.relays.last().is_some());
}
