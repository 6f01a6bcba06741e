//! Builder for `FeederCore`. All fields are validated on `build()`.

use std::sync::Arc;
use std::time::Instant;

use feeder_config::{ButtonCfg, Config, GatewayCfg, InspectionCfg, LightCfg, MotorCfg};
use feeder_traits::clock::{Clock, MonotonicClock};
use feeder_traits::{Button, Indicator, LightSensor, Motor};

use crate::button::DebouncedButton;
use crate::controller::FeederCore;
use crate::duty::{Budget, DutyBoard, DutyId};
use crate::error::{BuildError, Result};
use crate::light::LightGate;
use crate::mocks::NullIndicator;
use crate::motor::AugerDrive;
use crate::report::Gateway;
use crate::schedule::{Calendar, SchedulePlan, ScheduleStore};

pub struct FeederBuilder<B, L, M, G> {
    button: B,
    light: L,
    motor: M,
    gateway: G,
    light_led: Option<Box<dyn Indicator>>,
    power_led: Option<Box<dyn Indicator>>,
    store: Option<Box<dyn ScheduleStore>>,
    calendar: Option<Box<dyn Calendar>>,
    clock: Option<Arc<dyn Clock + Send + Sync>>,
    device_id: Option<String>,
    button_cfg: ButtonCfg,
    light_cfg: LightCfg,
    motor_cfg: MotorCfg,
    inspection_cfg: InspectionCfg,
    gateway_cfg: GatewayCfg,
    schedule_poll_ms: u64,
}

impl<B: Button, L: LightSensor, M: Motor, G: Gateway> FeederBuilder<B, L, M, G> {
    /// Start building from the four live seams. Everything else has a
    /// default or is supplied fluently.
    pub fn new(button: B, light: L, motor: M, gateway: G) -> Self {
        Self {
            button,
            light,
            motor,
            gateway,
            light_led: None,
            power_led: None,
            store: None,
            calendar: None,
            clock: None,
            device_id: None,
            button_cfg: ButtonCfg::default(),
            light_cfg: LightCfg::default(),
            motor_cfg: MotorCfg::default(),
            inspection_cfg: InspectionCfg::default(),
            gateway_cfg: GatewayCfg::default(),
            schedule_poll_ms: 1000,
        }
    }

    /// Take every tunable from a validated `Config` in one call.
    pub fn config(mut self, cfg: &Config) -> Self {
        self.device_id = Some(cfg.device.id.clone());
        self.button_cfg = cfg.button;
        self.light_cfg = cfg.light;
        self.motor_cfg = cfg.motor;
        self.inspection_cfg = cfg.inspection;
        self.gateway_cfg = cfg.gateway.clone();
        self.schedule_poll_ms = cfg.schedule.poll_interval_ms;
        self
    }

    pub fn device_id(mut self, id: impl Into<String>) -> Self {
        self.device_id = Some(id.into());
        self
    }

    pub fn light_led(mut self, led: Box<dyn Indicator>) -> Self {
        self.light_led = Some(led);
        self
    }

    pub fn power_led(mut self, led: Box<dyn Indicator>) -> Self {
        self.power_led = Some(led);
        self
    }

    pub fn store(mut self, store: Box<dyn ScheduleStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn calendar(mut self, calendar: Box<dyn Calendar>) -> Self {
        self.calendar = Some(calendar);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn build(self) -> Result<FeederCore<B, L, M, G>> {
        let device_id = self
            .device_id
            .ok_or_else(|| eyre::Report::new(BuildError::MissingDeviceId))?;
        let store = self
            .store
            .ok_or_else(|| eyre::Report::new(BuildError::MissingStore))?;
        let calendar = self
            .calendar
            .ok_or_else(|| eyre::Report::new(BuildError::MissingCalendar))?;
        if self.inspection_cfg.iterations == 0 {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "inspection.iterations must be >= 1",
            )));
        }
        if self.motor_cfg.steps_per_rev == 0 || self.motor_cfg.rpm == 0 {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "motor.steps_per_rev and motor.rpm must be >= 1",
            )));
        }
        if self.button_cfg.long_press_min_ms <= self.button_cfg.press_min_ms {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "button.long_press_min_ms must be > button.press_min_ms",
            )));
        }

        let clock = self
            .clock
            .unwrap_or_else(|| Arc::new(MonotonicClock::new()));
        let epoch = clock.now();

        // Registration order is the scheduler's fixed priority order.
        let mut duties = DutyBoard::new();
        duties.register(DutyId::Button, 0, Budget::Forever, true);
        duties.register(DutyId::Motor, 0, Budget::Forever, true);
        duties.register(
            DutyId::Gateway,
            self.gateway_cfg.service_interval_ms,
            Budget::Forever,
            true,
        );
        duties.register(DutyId::Schedule, self.schedule_poll_ms, Budget::Forever, true);
        duties.register(
            DutyId::Inspect,
            self.inspection_cfg.interval_ms,
            Budget::Finite(self.inspection_cfg.iterations),
            false,
        );
        duties.register(DutyId::Report, 0, Budget::Finite(1), false);

        Ok(FeederCore {
            button: DebouncedButton::new(self.button, self.button_cfg),
            light: LightGate::new(self.light, self.light_cfg),
            auger: AugerDrive::new(self.motor, self.motor_cfg),
            gateway: self.gateway,
            light_led: self.light_led.unwrap_or_else(|| Box::new(NullIndicator)),
            power_led: self.power_led.unwrap_or_else(|| Box::new(NullIndicator)),
            store,
            calendar,
            clock,
            epoch,
            duties,
            plan: SchedulePlan::new(),
            cycle: None,
            reset_pending: false,
            device_id,
            topics: self.gateway_cfg,
            inspection: self.inspection_cfg,
        })
    }
}
