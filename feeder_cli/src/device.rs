//! Device assembly and the two run modes.
//!
//! The seams are wired per build flavor: simulated devices by default, real
//! Raspberry Pi GPIO/SPI devices with `--features hardware` on Linux.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use eyre::{Result, WrapErr};
use feeder_config::Config;
use feeder_core::FeederBuilder;
use feeder_core::cycle::{FeedKind, FeedRequest};
use feeder_traits::MonotonicClock;

use crate::calendar::LocalCalendar;
use crate::gateway::ConsoleGateway;
use crate::store::FileScheduleStore;

#[cfg(all(feature = "hardware", target_os = "linux"))]
type Core = feeder_core::FeederCore<
    feeder_hardware::gpio::GpioButton,
    feeder_hardware::gpio::Mcp3008Light,
    feeder_hardware::gpio::CoilStepper,
    ConsoleGateway,
>;

#[cfg(not(all(feature = "hardware", target_os = "linux")))]
type Core = feeder_core::FeederCore<
    feeder_hardware::SimulatedButton,
    feeder_hardware::SimulatedLightSensor,
    feeder_hardware::SimulatedMotor,
    ConsoleGateway,
>;

#[cfg(all(feature = "hardware", target_os = "linux"))]
fn build_core(cfg: &Config) -> Result<Core> {
    use feeder_hardware::gpio::{CoilStepper, GpioButton, GpioIndicator, Mcp3008Light};

    tracing::info!("GPIO hardware backend");
    let button = GpioButton::new(cfg.pins.button).wrap_err("opening button pin")?;
    let light = Mcp3008Light::new(cfg.pins.light_channel).wrap_err("opening light sensor SPI")?;
    let motor = CoilStepper::new(
        cfg.pins.motor_in1,
        cfg.pins.motor_in2,
        cfg.pins.motor_in3,
        cfg.pins.motor_in4,
    )
    .wrap_err("opening motor pins")?;
    let light_led = GpioIndicator::new(cfg.pins.light_led).wrap_err("opening light LED pin")?;
    let power_led = GpioIndicator::new(cfg.pins.power_led).wrap_err("opening power LED pin")?;

    FeederBuilder::new(button, light, motor, ConsoleGateway::new())
        .config(cfg)
        .light_led(Box::new(light_led))
        .power_led(Box::new(power_led))
        .store(Box::new(FileScheduleStore::new(&cfg.schedule.path)))
        .calendar(Box::new(LocalCalendar))
        .clock(Arc::new(MonotonicClock::new()))
        .build()
}

#[cfg(not(all(feature = "hardware", target_os = "linux")))]
fn build_core(cfg: &Config) -> Result<Core> {
    use feeder_hardware::{
        SimulatedButton, SimulatedIndicator, SimulatedLightSensor, SimulatedMotor,
    };

    tracing::info!("simulated hardware backend");
    FeederBuilder::new(
        SimulatedButton::new(),
        SimulatedLightSensor::new(1100),
        SimulatedMotor::new(),
        ConsoleGateway::new(),
    )
    .config(cfg)
    .light_led(Box::new(SimulatedIndicator::new("light")))
    .power_led(Box::new(SimulatedIndicator::new("power")))
    .store(Box::new(FileScheduleStore::new(&cfg.schedule.path)))
    .calendar(Box::new(LocalCalendar))
    .clock(Arc::new(MonotonicClock::new()))
    .build()
}

fn shutdown_flag() -> Result<Arc<AtomicBool>> {
    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&shutdown);
    ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))
        .wrap_err("installing Ctrl-C handler")?;
    Ok(shutdown)
}

/// Run the controller until Ctrl-C.
pub fn run(cfg: &Config) -> Result<()> {
    let shutdown = shutdown_flag()?;
    let mut core = build_core(cfg)?;
    core.run(&shutdown)
}

/// One feed cycle end to end: dispense, verify, report, exit.
pub fn feed_once(cfg: &Config, amount: u32) -> Result<()> {
    eyre::ensure!(amount >= 1, "amount must be >= 1");
    let shutdown = shutdown_flag()?;
    let mut core = build_core(cfg)?;
    core.start()?;
    core.submit(FeedRequest {
        amount,
        kind: FeedKind::Manual,
    })?;
    while !core.is_idle() && !shutdown.load(Ordering::Relaxed) {
        core.tick();
        std::thread::sleep(Duration::from_millis(1));
    }
    Ok(())
}
