pub mod clock;

pub use clock::{Clock, ManualClock, MonotonicClock};

/// Sampled level of a digital input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

/// Rotation direction for the feed auger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Clockwise,
    CounterClockwise,
}

/// Digital input carrying the feed button (idle high, pressed low).
pub trait Button {
    fn read(&mut self) -> Result<Level, Box<dyn std::error::Error + Send + Sync>>;
}

/// Analog light sensor under the hopper outlet. Readings are raw ADC counts.
pub trait LightSensor {
    fn read(&mut self) -> Result<u16, Box<dyn std::error::Error + Send + Sync>>;
}

/// Digital output driving a status LED.
pub trait Indicator {
    fn set(&mut self, on: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Stepper motor seam. `step` advances the rotor by exactly one micro-step;
/// pacing is the caller's responsibility. `release` de-energizes the coils.
pub trait Motor {
    fn step(&mut self, direction: Direction)
    -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
    fn release(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
