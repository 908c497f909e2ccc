use ampswitch::clock::BootClock;
use ampswitch::config::Config;
use ampswitch::dispatcher::EventDispatcher;
use ampswitch::hardware::{LoggingRelays, SimulatedInputs};
use ampswitch::presentation::BannerPresenter;
use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::var_os("AMPSWITCH_CONFIG").map(PathBuf::from);
    let config = Config::load_from(config_path).map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        e
    })?;
    config.validate()?;

    ampswitch::logging::init_logging(&config.logging)?;
    info!("Ampswitch {} starting up", env!("APP_VERSION"));

    let sensing = SimulatedInputs::from_config(&config.sensors);
    let mut dispatcher = EventDispatcher::new(
        &config,
        Box::new(sensing.clone()),
        Box::new(LoggingRelays::new()),
        Box::new(BannerPresenter::new()),
        Arc::new(BootClock::new(config.boot_epoch)),
    )
    .await
    .map_err(|e| anyhow::anyhow!("Failed to start dispatcher: {}", e))?;
    sensing.attach(dispatcher.event_sender());

    let shutdown = dispatcher.shutdown_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            shutdown.request();
        }
    });

    match dispatcher.run().await {
        Ok(()) => {
            info!("Controller shutdown complete");
            Ok(())
        }
        Err(e) => {
            error!("Controller failed with error: {}", e);
            Err(anyhow::anyhow!("Controller error: {}", e))
        }
    }
}
