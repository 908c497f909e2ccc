use ampswitch::battery::ChargeBits;
use ampswitch::config::SensorsConfig;
use ampswitch::controller::{Availability, RelayCommand};
use ampswitch::hardware::{
    InputSensing, LoggingRelays, RELAY_HISTORY_LIMIT, RelayActuator, SimulatedInputs,
};

#[tokio::test]
async fn reads_reflect_latest_levels() {
    let sensing = SimulatedInputs::from_config(&SensorsConfig::default());
    assert_eq!(
        sensing.read_availability().await.unwrap(),
        Availability {
            ac_avail: true,
            solar: false,
            wind: false
        }
    );

    let shared = sensing.clone();
    shared.set_charge_bits(ChargeBits::new(true, true, true, false));
    shared.set_wind(true);
    assert_eq!(
        sensing.read_charge_bits().await.unwrap(),
        ChargeBits::new(true, true, true, false)
    );
    assert!(sensing.read_availability().await.unwrap().renewable());
}

#[tokio::test]
async fn injected_failures_are_consumed() {
    let sensing = SimulatedInputs::new(ChargeBits::default(), Availability::default());
    sensing.fail_next_reads(1);
    assert!(sensing.read_charge_bits().await.is_err());
    assert!(sensing.read_charge_bits().await.is_ok());
}

#[test]
fn edges_without_dispatcher_are_ignored() {
    let sensing = SimulatedInputs::from_config(&SensorsConfig::default());
    sensing.set_ac_available(false);
    sensing.press_manual_switch();
}

#[tokio::test]
async fn logging_relays_keep_history() {
    let relays = LoggingRelays::new();
    assert_eq!(relays.last(), None);
    let on_grid = RelayCommand {
        ac_on: true,
        dc_on: false,
        export_on: false,
    };
    let selling = RelayCommand {
        ac_on: false,
        dc_on: true,
        export_on: true,
    };
    relays.apply(on_grid).await.unwrap();
    relays.clone().apply(selling).await.unwrap();
    assert_eq!(relays.history(), vec![on_grid, selling]);
    assert_eq!(relays.last(), Some(selling));
}

#[tokio::test]
async fn logging_relays_history_is_bounded() {
    let relays = LoggingRelays::new();
    for i in 0..10_000 {
        let on_grid = i % 2 == 0;
        relays
            .apply(RelayCommand {
                ac_on: on_grid,
                dc_on: !on_grid,
                export_on: false,
            })
            .await
            .unwrap();
    }
    let history = relays.history();
    assert_eq!(history.len(), RELAY_HISTORY_LIMIT);
    // The final command (i = 9999) switched to battery
    assert_eq!(relays.last().map(|c| c.dc_on), Some(true));
    assert_eq!(history.last().copied(), relays.last());
}
