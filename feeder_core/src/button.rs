//! Debounced intent classifier for the physical feed button.
//!
//! The line idles high; a press pulls it low. Classification happens on the
//! release edge from the held duration. Everything below `press_min_ms` is
//! bounce noise.

use crate::error::Result;
use crate::hw_error::map_hw_error;
use eyre::WrapErr;
use feeder_traits::{Button, Level};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressKind {
    Short,
    Long,
}

/// Ephemeral classification of one completed button activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PressEvent {
    pub kind: PressKind,
    pub duration_ms: u64,
}

pub struct DebouncedButton<B> {
    input: B,
    level: Level,
    pressed_at_ms: Option<u64>,
    press_min_ms: u64,
    long_press_min_ms: u64,
}

impl<B: Button> DebouncedButton<B> {
    pub fn new(input: B, cfg: feeder_config::ButtonCfg) -> Self {
        // Start from Low with no recorded press: the first observed
        // transition can never classify as a press, whether the line boots
        // idle-high or mid-press.
        Self {
            input,
            level: Level::Low,
            pressed_at_ms: None,
            press_min_ms: cfg.press_min_ms,
            long_press_min_ms: cfg.long_press_min_ms,
        }
    }

    /// Sample the line once and classify a completed press, if any.
    ///
    /// `now_ms` must come from a monotonic clock. No event is emitted for a
    /// release that was never preceded by an observed press.
    pub fn poll(&mut self, now_ms: u64) -> Result<Option<PressEvent>> {
        let level = self
            .input
            .read()
            .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
            .wrap_err("reading button")?;
        if level == self.level {
            return Ok(None);
        }
        self.level = level;

        Ok(match level {
            Level::Low => {
                self.pressed_at_ms = Some(now_ms);
                None
            }
            Level::High => {
                let Some(pressed_at) = self.pressed_at_ms.take() else {
                    return Ok(None);
                };
                let held = now_ms.saturating_sub(pressed_at);
                if held < self.press_min_ms {
                    None
                } else if held < self.long_press_min_ms {
                    Some(PressEvent {
                        kind: PressKind::Short,
                        duration_ms: held,
                    })
                } else {
                    Some(PressEvent {
                        kind: PressKind::Long,
                        duration_ms: held,
                    })
                }
            }
        })
    }
}
