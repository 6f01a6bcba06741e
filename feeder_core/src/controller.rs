//! The unified feeding cycle controller (`FeederCore`).
//!
//! One `tick()` drains the due duties in priority order: button polling,
//! motor pacing, gateway servicing, schedule evaluation, inspection
//! sampling, and completion reporting. Every duty body is O(1) and
//! non-blocking; faults are local to the triggering request and never stop
//! the run loop.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use feeder_config::{GatewayCfg, InspectionCfg};
use feeder_traits::clock::Clock;
use feeder_traits::{Button, Direction, Indicator, LightSensor, Motor};

use crate::button::{DebouncedButton, PressKind};
use crate::command::{self, Command};
use crate::cycle::{FeedCycle, FeedKind, FeedRequest};
use crate::duty::{Budget, DutyBoard, DutyId};
use crate::error::{FeederError, Result};
use crate::light::LightGate;
use crate::motor::AugerDrive;
use crate::report::{ErrorReport, Gateway, Report, ResetAck};
use crate::schedule::{Calendar, SchedulePlan, ScheduleStore};

pub struct FeederCore<B: Button, L: LightSensor, M: Motor, G: Gateway> {
    pub(crate) button: DebouncedButton<B>,
    pub(crate) light: LightGate<L>,
    pub(crate) auger: AugerDrive<M>,
    pub(crate) gateway: G,
    pub(crate) light_led: Box<dyn Indicator>,
    pub(crate) power_led: Box<dyn Indicator>,
    pub(crate) store: Box<dyn ScheduleStore>,
    pub(crate) calendar: Box<dyn Calendar>,
    pub(crate) clock: Arc<dyn Clock + Send + Sync>,
    pub(crate) epoch: Instant,
    pub(crate) duties: DutyBoard,
    pub(crate) plan: SchedulePlan,
    pub(crate) cycle: Option<FeedCycle>,
    pub(crate) reset_pending: bool,
    pub(crate) device_id: String,
    pub(crate) topics: GatewayCfg,
    pub(crate) inspection: InspectionCfg,
}

impl<B: Button, L: LightSensor, M: Motor, G: Gateway> core::fmt::Debug for FeederCore<B, L, M, G> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FeederCore")
            .field("device_id", &self.device_id)
            .field("cycle", &self.cycle)
            .field("reset_pending", &self.reset_pending)
            .finish()
    }
}

impl<B: Button, L: LightSensor, M: Motor, G: Gateway> FeederCore<B, L, M, G> {
    /// One-time startup: power LED on, persisted plan loaded. An absent or
    /// unreadable store is not fatal; the device starts with an empty plan.
    pub fn start(&mut self) -> Result<()> {
        self.power_led
            .set(true)
            .map_err(|e| eyre::Report::new(crate::hw_error::map_hw_error(&*e)))?;
        match self.store.load() {
            Ok(entries) => {
                tracing::info!(entries = entries.len(), "feeding plan loaded");
                self.plan.replace(entries);
            }
            Err(e) => {
                tracing::warn!(error = %e, "schedule load failed, starting with empty plan");
            }
        }
        Ok(())
    }

    /// One scheduler pass. Duty faults are logged and contained; the
    /// controller must stay responsive to the button even when networking
    /// or storage is degraded.
    pub fn tick(&mut self) {
        let now_ms = self.clock.ms_since(self.epoch);
        for id in self.duties.take_due(now_ms) {
            if let Err(e) = self.run_duty(id, now_ms) {
                tracing::warn!(duty = ?id, error = %e, "duty failed");
            }
        }
    }

    /// Run until `shutdown` is raised, then halt the motor.
    pub fn run(&mut self, shutdown: &AtomicBool) -> Result<()> {
        self.start()?;
        while !shutdown.load(Ordering::Relaxed) {
            self.tick();
            self.clock.sleep(Duration::from_millis(1));
        }
        tracing::info!("controller loop stopped");
        if let Err(e) = self.auger.halt() {
            tracing::warn!(error = %e, "motor halt on shutdown failed");
        }
        let _ = self.light_led.set(false);
        let _ = self.power_led.set(false);
        Ok(())
    }

    /// Accept a feed request, or reject it if a cycle is in flight.
    ///
    /// "In flight" includes an auger still draining a long move after its
    /// verification window closed; two moves never interleave. Rejections
    /// are surfaced on the error topic and returned as `FeederError::Busy`.
    pub fn submit(&mut self, request: FeedRequest) -> Result<()> {
        if self.cycle.is_some() || self.auger.is_moving() {
            self.publish_error("feeder busy, request rejected");
            return Err(eyre::Report::new(FeederError::Busy));
        }
        let steps = request.amount.saturating_mul(self.auger.steps_per_rev());
        let now_us = self.clock.us_since(self.epoch);
        self.auger.start_move(steps, Direction::Clockwise, now_us);
        if let Err(e) = self.light_led.set(true) {
            tracing::warn!(error = %e, "light LED on failed");
        }
        self.cycle = Some(FeedCycle::new(request, self.inspection.iterations));
        // Inspection starts the same tick as the move; feed can drop as
        // soon as the auger turns.
        self.duties
            .arm(DutyId::Inspect, Budget::Finite(self.inspection.iterations));
        tracing::info!(
            amount = request.amount,
            steps,
            kind = ?request.kind,
            "feed cycle started"
        );
        Ok(())
    }

    /// True when no cycle is active and the motor is stationary.
    pub fn is_idle(&self) -> bool {
        self.cycle.is_none() && !self.auger.is_moving()
    }

    pub fn active_cycle(&self) -> Option<&FeedCycle> {
        self.cycle.as_ref()
    }

    pub fn plan(&self) -> &SchedulePlan {
        &self.plan
    }

    // ── Duty bodies ──────────────────────────────────────────────────────

    fn run_duty(&mut self, id: DutyId, now_ms: u64) -> Result<()> {
        match id {
            DutyId::Button => self.service_button(now_ms),
            DutyId::Motor => self.service_motor(),
            DutyId::Gateway => self.service_gateway(),
            DutyId::Schedule => self.service_schedule(),
            DutyId::Inspect => self.service_inspection(),
            DutyId::Report => self.finish_cycle(),
        }
    }

    fn service_button(&mut self, now_ms: u64) -> Result<()> {
        let Some(event) = self.button.poll(now_ms)? else {
            return Ok(());
        };
        match event.kind {
            PressKind::Short => {
                tracing::info!(held_ms = event.duration_ms, "short press");
                self.submit(FeedRequest {
                    amount: 1,
                    kind: FeedKind::Manual,
                })
            }
            PressKind::Long => {
                tracing::info!(held_ms = event.duration_ms, "long press");
                self.request_reset();
                Ok(())
            }
        }
    }

    fn service_motor(&mut self) -> Result<()> {
        let now_us = self.clock.us_since(self.epoch);
        self.auger.tick(now_us)?;
        if !self.auger.is_moving()
            && let Some(cycle) = self.cycle.as_mut()
        {
            cycle.motor_idle();
        }
        Ok(())
    }

    /// Upper bound on payloads handled per duty pass. A flooded inbound
    /// queue drains across ticks instead of starving the other duties.
    const MAX_PAYLOADS_PER_PASS: usize = 8;

    fn service_gateway(&mut self) -> Result<()> {
        for _ in 0..Self::MAX_PAYLOADS_PER_PASS {
            let payload = self
                .gateway
                .poll()
                .map_err(|e| eyre::Report::new(FeederError::Gateway(e.to_string())))?;
            let Some(payload) = payload else {
                return Ok(());
            };
            self.handle_payload(&payload);
        }
        Ok(())
    }

    /// Each payload is an independent request; one bad payload neither
    /// crashes the loop nor blocks the next one.
    fn handle_payload(&mut self, payload: &[u8]) {
        match command::parse(payload) {
            Ok(Command::Feed { count }) => {
                let _ = self.submit(FeedRequest {
                    amount: count,
                    kind: FeedKind::Manual,
                });
            }
            Ok(Command::Plan(entries)) => {
                tracing::info!(entries = entries.len(), "feeding plan replaced");
                if let Err(e) = self.store.save(&entries) {
                    let err = FeederError::Storage(e.to_string());
                    tracing::warn!(error = %err, "persisting feeding plan failed");
                    self.publish_error(&err.to_string());
                }
                self.plan.replace(entries);
            }
            Err(e) => {
                tracing::warn!(error = %e, "rejecting command payload");
                self.publish_error(&e.to_string());
            }
        }
    }

    fn service_schedule(&mut self) -> Result<()> {
        let minute = self.calendar.minute_of_day();
        if let Some(count) = self.plan.due(minute) {
            tracing::info!(minute, count, "scheduled feed due");
            self.submit(FeedRequest {
                amount: count,
                kind: FeedKind::Scheduled,
            })?;
        }
        Ok(())
    }

    fn service_inspection(&mut self) -> Result<()> {
        let Some(cycle) = self.cycle.as_mut() else {
            // Invariant: the inspect duty is only armed alongside a cycle.
            self.duties.disarm(DutyId::Inspect);
            return Ok(());
        };
        let blocked = match self.light.sample() {
            Ok(intensity) => self.light.is_blocked(intensity),
            Err(e) => {
                // A failed or out-of-range read never inflates the counter.
                tracing::debug!(error = %e, "light sample failed, counted as clear");
                false
            }
        };
        cycle.record_sample(blocked);
        if cycle.window_closed() {
            self.duties.arm(DutyId::Report, Budget::Finite(1));
        }
        Ok(())
    }

    fn finish_cycle(&mut self) -> Result<()> {
        let Some(cycle) = self.cycle.take() else {
            return Ok(());
        };
        if let Err(e) = self.light_led.set(false) {
            tracing::warn!(error = %e, "light LED off failed");
        }
        let report = Report {
            id: &self.device_id,
            kind: cycle.kind(),
            amount: cycle.detected_drops(),
        };
        tracing::info!(
            amount = report.amount,
            requested = cycle.requested(),
            kind = ?cycle.kind(),
            "feed cycle complete"
        );
        Self::publish_json(&mut self.gateway, &self.topics.results_topic, &report)?;
        if self.reset_pending {
            self.reset_pending = false;
            self.perform_reset();
        }
        Ok(())
    }

    // ── Reset ────────────────────────────────────────────────────────────

    /// A long press always requests a reset; with a cycle in flight the
    /// reset is deferred until the completion report rather than tearing
    /// down a move mid-revolution.
    fn request_reset(&mut self) {
        if self.cycle.is_some() {
            tracing::info!("factory reset deferred until active cycle completes");
            self.reset_pending = true;
            return;
        }
        self.perform_reset();
    }

    fn perform_reset(&mut self) {
        tracing::info!("factory reset: clearing feeding plan");
        self.plan.clear();
        if let Err(e) = self.store.save(&[]) {
            let err = FeederError::Storage(e.to_string());
            tracing::warn!(error = %err, "clearing persisted plan failed");
            self.publish_error(&err.to_string());
        }
        let ack = ResetAck::new(&self.device_id);
        if let Err(e) = Self::publish_json(&mut self.gateway, &self.topics.results_topic, &ack) {
            tracing::warn!(error = %e, "reset ack publish failed");
        }
    }

    // ── Outbound helpers ─────────────────────────────────────────────────

    fn publish_json<T: serde::Serialize>(gateway: &mut G, topic: &str, value: &T) -> Result<()> {
        let payload = serde_json::to_vec(value)
            .map_err(|e| eyre::Report::new(FeederError::Gateway(format!("encode: {e}"))))?;
        gateway
            .publish(topic, &payload)
            .map_err(|e| eyre::Report::new(FeederError::Gateway(e.to_string())))
    }

    fn publish_error(&mut self, message: &str) {
        let report = ErrorReport {
            id: &self.device_id,
            message,
        };
        if let Err(e) = Self::publish_json(&mut self.gateway, &self.topics.errors_topic, &report) {
            tracing::warn!(error = %e, "error report publish failed");
        }
    }
}
