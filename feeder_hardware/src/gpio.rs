//! Raspberry Pi devices: GPIO button and LEDs, ULN2003-driven 4-coil
//! stepper, and an MCP3008 SPI ADC for the light sensor.

use crate::error::HwError;
use feeder_traits::{Button, Direction, Indicator, Level, LightSensor, Motor};
use rppal::gpio::{Gpio, InputPin, OutputPin};
use rppal::spi::{Bus, Mode, SlaveSelect, Spi};

/// Full-step coil energize sequence for a unipolar 4-coil stepper.
const COIL_SEQUENCE: [[bool; 4]; 4] = [
    [true, true, false, false],
    [false, true, true, false],
    [false, false, true, true],
    [true, false, false, true],
];

pub struct GpioButton {
    pin: InputPin,
}

impl GpioButton {
    pub fn new(pin: u8) -> Result<Self, HwError> {
        let gpio = Gpio::new().map_err(|e| HwError::Gpio(e.to_string()))?;
        let pin = gpio
            .get(pin)
            .map_err(|e| HwError::Gpio(e.to_string()))?
            .into_input_pullup();
        Ok(Self { pin })
    }
}

impl Button for GpioButton {
    fn read(&mut self) -> Result<Level, Box<dyn std::error::Error + Send + Sync>> {
        Ok(if self.pin.is_low() {
            Level::Low
        } else {
            Level::High
        })
    }
}

pub struct GpioIndicator {
    pin: OutputPin,
}

impl GpioIndicator {
    pub fn new(pin: u8) -> Result<Self, HwError> {
        let gpio = Gpio::new().map_err(|e| HwError::Gpio(e.to_string()))?;
        let pin = gpio
            .get(pin)
            .map_err(|e| HwError::Gpio(e.to_string()))?
            .into_output_low();
        Ok(Self { pin })
    }
}

impl Indicator for GpioIndicator {
    fn set(&mut self, on: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if on {
            self.pin.set_high();
        } else {
            self.pin.set_low();
        }
        Ok(())
    }
}

/// 4-coil stepper on IN1..IN4. Each `step` advances one entry in the coil
/// sequence; pacing comes from the caller.
pub struct CoilStepper {
    coils: [OutputPin; 4],
    phase: usize,
}

impl CoilStepper {
    pub fn new(in1: u8, in2: u8, in3: u8, in4: u8) -> Result<Self, HwError> {
        let gpio = Gpio::new().map_err(|e| HwError::Gpio(e.to_string()))?;
        let mut pin = |n: u8| -> Result<OutputPin, HwError> {
            Ok(gpio
                .get(n)
                .map_err(|e| HwError::Gpio(e.to_string()))?
                .into_output_low())
        };
        Ok(Self {
            coils: [pin(in1)?, pin(in2)?, pin(in3)?, pin(in4)?],
            phase: 0,
        })
    }

    fn apply_phase(&mut self) {
        let pattern = COIL_SEQUENCE[self.phase];
        for (coil, energize) in self.coils.iter_mut().zip(pattern) {
            if energize {
                coil.set_high();
            } else {
                coil.set_low();
            }
        }
    }
}

impl Motor for CoilStepper {
    fn step(
        &mut self,
        direction: Direction,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.phase = match direction {
            Direction::Clockwise => (self.phase + 1) % COIL_SEQUENCE.len(),
            Direction::CounterClockwise => {
                (self.phase + COIL_SEQUENCE.len() - 1) % COIL_SEQUENCE.len()
            }
        };
        self.apply_phase();
        Ok(())
    }

    fn release(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        for coil in &mut self.coils {
            coil.set_low();
        }
        Ok(())
    }
}

/// Light sensor behind an MCP3008 10-bit ADC on SPI0.
pub struct Mcp3008Light {
    spi: Spi,
    channel: u8,
}

impl Mcp3008Light {
    pub fn new(channel: u8) -> Result<Self, HwError> {
        if channel > 7 {
            return Err(HwError::Spi(format!("mcp3008 channel {channel} out of range")));
        }
        let spi = Spi::new(Bus::Spi0, SlaveSelect::Ss0, 1_350_000, Mode::Mode0)
            .map_err(|e| HwError::Spi(e.to_string()))?;
        Ok(Self { spi, channel })
    }
}

impl LightSensor for Mcp3008Light {
    fn read(&mut self) -> Result<u16, Box<dyn std::error::Error + Send + Sync>> {
        // Single-ended conversion: start bit, then SGL+channel in the high nibble.
        let tx = [0x01, (0x08 | self.channel) << 4, 0x00];
        let mut rx = [0u8; 3];
        self.spi
            .transfer(&mut rx, &tx)
            .map_err(|e| HwError::Spi(e.to_string()))?;
        let raw = (u16::from(rx[1] & 0x03) << 8) | u16::from(rx[2]);
        tracing::trace!(raw, channel = self.channel, "mcp3008 sample");
        Ok(raw)
    }
}
