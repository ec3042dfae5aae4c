//! Sense HAT joystick daemon
//!
//! Wires the subsystem together: board profile -> I2C bus -> joystick
//! engine -> event log. One watcher thread waits on the interrupt line,
//! this thread drives the engine, one invocation at a time.

use anyhow::{Context, Result};
use sensehat_bus::I2cBus;
use sensehat_joystick::{
    BoardConfig, ChannelSink, HandlerOutcome, IrqWatcher, JoystickEngine, JoystickEvent,
    DEVICE_NAME, DEVICE_PHYS,
};
use std::path::Path;
use std::sync::mpsc::channel;
use tracing::{debug, info, warn};

fn main() -> Result<()> {
    setup_logging();

    info!("{DEVICE_NAME} daemon starting ({DEVICE_PHYS})");

    // Board profile: explicit path argument, or the standard location with
    // compiled-in defaults as fallback
    let config = match std::env::args().nth(1) {
        Some(path) => BoardConfig::load(Path::new(&path))
            .with_context(|| format!("Failed to load board profile {path}"))?,
        None => BoardConfig::load_default().context("Failed to load board profile")?,
    };
    debug!("Board profile: {config:?}");

    let bus = I2cBus::open(&config.i2c_bus, config.i2c_address)
        .context("Failed to open the board bus")?;

    let (event_tx, event_rx) = channel();
    let mut engine = JoystickEngine::new(bus, config.joystick_register, ChannelSink::new(event_tx));

    let mut irq = IrqWatcher::new(config.irq_gpio);
    irq.start().context("Failed to arm the interrupt line")?;

    info!(
        "Armed: register {:#04x}, interrupt on GPIO {}",
        config.joystick_register, config.irq_gpio
    );

    // Single consumer loop serializes handle_interrupt per engine instance
    while let Some(_interrupt) = irq.recv() {
        if engine.handle_interrupt() == HandlerOutcome::NotHandled {
            warn!("Interrupt not handled, keeping last known state");
        }

        for event in event_rx.try_iter() {
            match event {
                JoystickEvent::Key { button, pressed } => {
                    info!(
                        "{} {}",
                        button.name(),
                        if pressed { "pressed" } else { "released" }
                    );
                }
                JoystickEvent::Sync => debug!("sync"),
            }
        }
    }

    info!("Interrupt watcher closed, shutting down");
    irq.stop();
    Ok(())
}

/// Setup logging to console
fn setup_logging() {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_ansi(false))
        .init();
}
