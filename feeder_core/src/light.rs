//! Drop verification: a threshold gate over the hopper-outlet light sensor.
//!
//! Falling feed shadows the sensor, so "blocked" means the reading fell
//! below the calibrated threshold. The gate is stateless; the inspection
//! duty owns the counting.

use crate::error::Result;
use crate::hw_error::map_hw_error;
use eyre::WrapErr;
use feeder_traits::LightSensor;

pub struct LightGate<L> {
    sensor: L,
    threshold: u16,
}

impl<L: LightSensor> LightGate<L> {
    pub fn new(sensor: L, cfg: feeder_config::LightCfg) -> Self {
        Self {
            sensor,
            threshold: cfg.blocked_threshold,
        }
    }

    /// One raw ADC sample.
    pub fn sample(&mut self) -> Result<u16> {
        self.sensor
            .read()
            .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
            .wrap_err("reading light sensor")
    }

    /// Pure classification of an intensity reading.
    #[inline]
    pub fn is_blocked(&self, intensity: u16) -> bool {
        intensity < self.threshold
    }
}
