//! Seam implementations for the feeder: always-available simulated devices,
//! plus Raspberry Pi GPIO/SPI devices behind the `hardware` feature.

pub mod error;

#[cfg(all(feature = "hardware", target_os = "linux"))]
pub mod gpio;

use feeder_traits::{Button, Direction, Indicator, Level, LightSensor, Motor};
use std::cell::Cell;
use std::rc::Rc;

/// Simulated feed button. The shared handle lets a test or demo script
/// press and release the button between controller ticks.
pub struct SimulatedButton {
    level: Rc<Cell<Level>>,
}

impl SimulatedButton {
    pub fn new() -> Self {
        SimulatedButton {
            level: Rc::new(Cell::new(Level::High)),
        }
    }

    /// Handle for driving the line level externally (idle high, pressed low).
    pub fn line(&self) -> Rc<Cell<Level>> {
        Rc::clone(&self.level)
    }
}

impl Default for SimulatedButton {
    fn default() -> Self {
        Self::new()
    }
}

impl Button for SimulatedButton {
    fn read(&mut self) -> Result<Level, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.level.get())
    }
}

/// Simulated light sensor. Defaults to an unblocked ambient reading; drop a
/// pellet by setting the shared value below the configured threshold.
pub struct SimulatedLightSensor {
    value: Rc<Cell<u16>>,
}

impl SimulatedLightSensor {
    pub fn new(ambient: u16) -> Self {
        SimulatedLightSensor {
            value: Rc::new(Cell::new(ambient)),
        }
    }

    pub fn reading(&self) -> Rc<Cell<u16>> {
        Rc::clone(&self.value)
    }
}

impl Default for SimulatedLightSensor {
    fn default() -> Self {
        Self::new(1100)
    }
}

impl LightSensor for SimulatedLightSensor {
    fn read(&mut self) -> Result<u16, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.value.get())
    }
}

/// Simulated status LED.
pub struct SimulatedIndicator {
    on: Rc<Cell<bool>>,
    label: &'static str,
}

impl SimulatedIndicator {
    pub fn new(label: &'static str) -> Self {
        SimulatedIndicator {
            on: Rc::new(Cell::new(false)),
            label,
        }
    }

    pub fn state(&self) -> Rc<Cell<bool>> {
        Rc::clone(&self.on)
    }
}

impl Indicator for SimulatedIndicator {
    fn set(&mut self, on: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.on.set(on);
        tracing::trace!(led = self.label, on, "indicator set (simulated)");
        Ok(())
    }
}

/// Simulated stepper. Counts steps so tests and demos can verify motion.
pub struct SimulatedMotor {
    steps: Rc<Cell<u64>>,
}

impl SimulatedMotor {
    pub fn new() -> Self {
        SimulatedMotor {
            steps: Rc::new(Cell::new(0)),
        }
    }

    pub fn steps_taken(&self) -> Rc<Cell<u64>> {
        Rc::clone(&self.steps)
    }
}

impl Default for SimulatedMotor {
    fn default() -> Self {
        Self::new()
    }
}

impl Motor for SimulatedMotor {
    fn step(
        &mut self,
        _direction: Direction,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.steps.set(self.steps.get() + 1);
        Ok(())
    }

    fn release(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        tracing::trace!(
            steps = self.steps.get(),
            "motor coils released (simulated)"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulated_button_follows_its_line() {
        let mut button = SimulatedButton::new();
        let line = button.line();
        assert_eq!(button.read().unwrap(), Level::High);
        line.set(Level::Low);
        assert_eq!(button.read().unwrap(), Level::Low);
    }

    #[test]
    fn simulated_motor_counts_steps() {
        let mut motor = SimulatedMotor::new();
        let steps = motor.steps_taken();
        for _ in 0..5 {
            motor.step(Direction::Clockwise).unwrap();
        }
        motor.release().unwrap();
        assert_eq!(steps.get(), 5);
    }
}
