#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the feeder controller.
//!
//! `Config` and sub-structs are deserialized from TOML and validated.
//! Section defaults mirror the shipped device: 100 ms / 3000 ms press
//! thresholds, light threshold 1034, 2048 steps per revolution at 12 rpm,
//! and a 200 x 10 ms inspection window.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct DeviceCfg {
    /// Identifier carried in every outbound report.
    pub id: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Pins {
    pub button: u8,
    /// MCP3008 channel for the light sensor (hardware builds).
    pub light_channel: u8,
    pub light_led: u8,
    pub power_led: u8,
    pub motor_in1: u8,
    pub motor_in2: u8,
    pub motor_in3: u8,
    pub motor_in4: u8,
}

impl Default for Pins {
    fn default() -> Self {
        Self {
            button: 14,
            light_channel: 0,
            light_led: 12,
            power_led: 2,
            motor_in1: 13,
            motor_in2: 4,
            motor_in3: 15,
            motor_in4: 5,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct ButtonCfg {
    /// Presses shorter than this are bounce noise (ms).
    pub press_min_ms: u64,
    /// Presses at least this long request a factory reset (ms).
    pub long_press_min_ms: u64,
}

impl Default for ButtonCfg {
    fn default() -> Self {
        Self {
            press_min_ms: 100,
            long_press_min_ms: 3000,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct LightCfg {
    /// Readings strictly below this count as "beam blocked" (feed passing).
    /// Calibrated above the 10-bit ADC ceiling to absorb sensor headroom.
    pub blocked_threshold: u16,
}

impl Default for LightCfg {
    fn default() -> Self {
        Self {
            blocked_threshold: 1034,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct MotorCfg {
    /// Full steps per output-shaft revolution (28BYJ-48 geared: 2048).
    pub steps_per_rev: u32,
    /// Commanded speed; one revolution dispenses one unit of feed.
    pub rpm: u32,
}

impl Default for MotorCfg {
    fn default() -> Self {
        Self {
            steps_per_rev: 2048,
            rpm: 12,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct InspectionCfg {
    /// Interval between light samples while a cycle is active (ms).
    pub interval_ms: u64,
    /// Number of samples per verification window.
    pub iterations: u32,
}

impl Default for InspectionCfg {
    fn default() -> Self {
        Self {
            interval_ms: 10,
            iterations: 200,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GatewayCfg {
    /// How often the message bus is serviced (ms); 0 = every tick.
    pub service_interval_ms: u64,
    pub commands_topic: String,
    pub results_topic: String,
    pub errors_topic: String,
}

impl Default for GatewayCfg {
    fn default() -> Self {
        Self {
            service_interval_ms: 0,
            commands_topic: "feeding-times".to_owned(),
            results_topic: "feeding-res".to_owned(),
            errors_topic: "error-occur".to_owned(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ScheduleCfg {
    /// Where the persisted feeding plan lives.
    pub path: String,
    /// How often the plan is re-evaluated against the wall clock (ms).
    pub poll_interval_ms: u64,
}

impl Default for ScheduleCfg {
    fn default() -> Self {
        Self {
            path: "conf.json".to_owned(),
            poll_interval_ms: 1000,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub device: DeviceCfg,
    #[serde(default)]
    pub pins: Pins,
    #[serde(default)]
    pub button: ButtonCfg,
    #[serde(default)]
    pub light: LightCfg,
    #[serde(default)]
    pub motor: MotorCfg,
    #[serde(default)]
    pub inspection: InspectionCfg,
    #[serde(default)]
    pub gateway: GatewayCfg,
    #[serde(default)]
    pub schedule: ScheduleCfg,
    #[serde(default)]
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Device
        if self.device.id.trim().is_empty() {
            eyre::bail!("device.id must not be empty");
        }

        // Button
        if self.button.press_min_ms == 0 {
            eyre::bail!("button.press_min_ms must be >= 1");
        }
        if self.button.long_press_min_ms <= self.button.press_min_ms {
            eyre::bail!("button.long_press_min_ms must be > button.press_min_ms");
        }
        if self.button.long_press_min_ms > 60_000 {
            eyre::bail!("button.long_press_min_ms is unreasonably large (>60s)");
        }

        // Motor
        if self.motor.steps_per_rev == 0 {
            eyre::bail!("motor.steps_per_rev must be > 0");
        }
        if self.motor.rpm == 0 {
            eyre::bail!("motor.rpm must be > 0");
        }
        if self.motor.rpm > 60 {
            eyre::bail!("motor.rpm is unreasonably fast for a geared feed auger (>60)");
        }

        // Inspection window
        if self.inspection.interval_ms == 0 {
            eyre::bail!("inspection.interval_ms must be >= 1");
        }
        if self.inspection.iterations == 0 {
            eyre::bail!("inspection.iterations must be >= 1");
        }

        // Gateway topics
        if self.gateway.commands_topic.is_empty() {
            eyre::bail!("gateway.commands_topic must not be empty");
        }
        if self.gateway.results_topic.is_empty() {
            eyre::bail!("gateway.results_topic must not be empty");
        }
        if self.gateway.errors_topic.is_empty() {
            eyre::bail!("gateway.errors_topic must not be empty");
        }

        // Schedule
        if self.schedule.path.is_empty() {
            eyre::bail!("schedule.path must not be empty");
        }
        if self.schedule.poll_interval_ms == 0 {
            eyre::bail!("schedule.poll_interval_ms must be >= 1");
        }
        if self.schedule.poll_interval_ms > 60_000 {
            eyre::bail!("schedule.poll_interval_ms must not exceed one minute");
        }

        Ok(())
    }
}
