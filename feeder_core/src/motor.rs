//! Non-blocking auger drive.
//!
//! `start_move` commands a step count; `tick` advances at most one
//! micro-step per call when the pacing interval has elapsed, so the caller
//! can interleave it with other duties. Missed ticks are caught up one step
//! at a time, keeping the average step rate at the commanded rpm.

use crate::error::Result;
use crate::hw_error::map_hw_error;
use crate::util::step_interval_us;
use eyre::WrapErr;
use feeder_traits::{Direction, Motor};

pub struct AugerDrive<M> {
    motor: M,
    steps_per_rev: u32,
    step_interval_us: u64,
    steps_remaining: u32,
    direction: Direction,
    next_step_due_us: u64,
}

impl<M: Motor> AugerDrive<M> {
    pub fn new(motor: M, cfg: feeder_config::MotorCfg) -> Self {
        Self {
            motor,
            steps_per_rev: cfg.steps_per_rev,
            step_interval_us: step_interval_us(cfg.rpm, cfg.steps_per_rev),
            steps_remaining: 0,
            direction: Direction::Clockwise,
            next_step_due_us: 0,
        }
    }

    /// Steps per output-shaft revolution (one revolution = one feed unit).
    pub fn steps_per_rev(&self) -> u32 {
        self.steps_per_rev
    }

    /// Command a move. The first step fires on the next `tick`.
    pub fn start_move(&mut self, steps: u32, direction: Direction, now_us: u64) {
        self.steps_remaining = steps;
        self.direction = direction;
        self.next_step_due_us = now_us;
    }

    pub fn is_moving(&self) -> bool {
        self.steps_remaining > 0
    }

    pub fn steps_remaining(&self) -> u32 {
        self.steps_remaining
    }

    /// Advance the motor by at most one micro-step. Must be called
    /// frequently; never blocks.
    pub fn tick(&mut self, now_us: u64) -> Result<()> {
        if self.steps_remaining == 0 {
            return Ok(());
        }
        if now_us < self.next_step_due_us {
            return Ok(());
        }
        self.motor
            .step(self.direction)
            .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
            .wrap_err("motor step")?;
        self.steps_remaining -= 1;
        self.next_step_due_us = self.next_step_due_us.saturating_add(self.step_interval_us);
        if self.steps_remaining == 0 {
            self.release().wrap_err("releasing after move")?;
        }
        Ok(())
    }

    /// Abandon any remaining move and de-energize the coils.
    pub fn halt(&mut self) -> Result<()> {
        self.steps_remaining = 0;
        self.release()
    }

    fn release(&mut self) -> Result<()> {
        self.motor
            .release()
            .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
            .wrap_err("motor release")
    }
}
