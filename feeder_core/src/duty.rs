//! Cooperative duty scheduling.
//!
//! A `DutyBoard` is an ordered collection of duty descriptors. Each run-loop
//! tick drains the due duties in registration (priority) order; finite
//! budgets count down and exhausted duties disable themselves. Arming and
//! disarming only ever happens between duty invocations, so no locking is
//! needed: there is exactly one logical thread of control.

/// Identity of every duty the controller knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DutyId {
    /// Poll the button and dispatch press intents. Every tick.
    Button,
    /// Pace the auger motor. Every tick.
    Motor,
    /// Service the message bus. Configurable interval.
    Gateway,
    /// Re-evaluate the feeding plan against the wall clock.
    Schedule,
    /// Sample the light gate during an active cycle. Finite budget.
    Inspect,
    /// Emit the completion report. One-shot.
    Report,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Budget {
    Forever,
    Finite(u32),
}

#[derive(Debug)]
struct Duty {
    id: DutyId,
    interval_ms: u64,
    budget: Budget,
    remaining: u32,
    enabled: bool,
    last_run_ms: Option<u64>,
}

#[derive(Debug, Default)]
pub struct DutyBoard {
    duties: Vec<Duty>,
}

impl DutyBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a duty. Registration order is priority order.
    pub fn register(&mut self, id: DutyId, interval_ms: u64, budget: Budget, enabled: bool) {
        debug_assert!(
            !self.duties.iter().any(|d| d.id == id),
            "duty registered twice: {id:?}"
        );
        let remaining = match budget {
            Budget::Forever => 0,
            Budget::Finite(n) => n,
        };
        self.duties.push(Duty {
            id,
            interval_ms,
            budget,
            remaining,
            enabled,
            last_run_ms: None,
        });
    }

    /// Re-arm a registered duty with a fresh budget; it becomes due
    /// immediately.
    pub fn arm(&mut self, id: DutyId, budget: Budget) {
        if let Some(duty) = self.duties.iter_mut().find(|d| d.id == id) {
            duty.budget = budget;
            duty.remaining = match budget {
                Budget::Forever => 0,
                Budget::Finite(n) => n,
            };
            duty.enabled = true;
            duty.last_run_ms = None;
        }
    }

    pub fn disarm(&mut self, id: DutyId) {
        if let Some(duty) = self.duties.iter_mut().find(|d| d.id == id) {
            duty.enabled = false;
        }
    }

    pub fn is_enabled(&self, id: DutyId) -> bool {
        self.duties
            .iter()
            .find(|d| d.id == id)
            .is_some_and(|d| d.enabled)
    }

    /// True once a finite duty has spent its whole budget.
    pub fn is_exhausted(&self, id: DutyId) -> bool {
        self.duties
            .iter()
            .find(|d| d.id == id)
            .is_some_and(|d| matches!(d.budget, Budget::Finite(_)) && d.remaining == 0)
    }

    /// Collect the due duties in priority order, consuming one budget unit
    /// from each. Exhausted duties disable themselves.
    pub fn take_due(&mut self, now_ms: u64) -> Vec<DutyId> {
        let mut due = Vec::new();
        for duty in &mut self.duties {
            if !duty.enabled {
                continue;
            }
            let ready = match duty.last_run_ms {
                None => true,
                Some(last) => now_ms.saturating_sub(last) >= duty.interval_ms,
            };
            if !ready {
                continue;
            }
            duty.last_run_ms = Some(now_ms);
            if let Budget::Finite(_) = duty.budget {
                duty.remaining = duty.remaining.saturating_sub(1);
                if duty.remaining == 0 {
                    duty.enabled = false;
                }
            }
            due.push(duty.id);
        }
        due
    }
}
