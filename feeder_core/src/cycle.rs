//! The feed cycle record: one end-to-end dispense-and-verify operation.
//!
//! Owned exclusively by the controller as `Option<FeedCycle>` (`None` is
//! Idle). Dispensing and inspecting deliberately overlap: light sampling
//! starts the same tick the motor does, because feed can drop as soon as
//! the auger turns.

use serde::Serialize;

/// What initiated a feed, carried through to the outbound report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedKind {
    Manual,
    Scheduled,
}

/// A request for one feed cycle of `amount` revolutions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedRequest {
    pub amount: u32,
    pub kind: FeedKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePhase {
    /// Motor still executing its commanded move (inspection already running).
    Dispensing,
    /// Motor done; verification window still open.
    Inspecting,
    /// Verification window closed; completion report pending.
    Reporting,
}

#[derive(Debug)]
pub struct FeedCycle {
    kind: FeedKind,
    requested: u32,
    detected_drops: u32,
    inspections_done: u32,
    inspections_total: u32,
    phase: CyclePhase,
}

impl FeedCycle {
    pub fn new(request: FeedRequest, inspections_total: u32) -> Self {
        Self {
            kind: request.kind,
            requested: request.amount,
            detected_drops: 0,
            inspections_done: 0,
            inspections_total,
            phase: CyclePhase::Dispensing,
        }
    }

    pub fn kind(&self) -> FeedKind {
        self.kind
    }

    pub fn requested(&self) -> u32 {
        self.requested
    }

    pub fn detected_drops(&self) -> u32 {
        self.detected_drops
    }

    pub fn phase(&self) -> CyclePhase {
        self.phase
    }

    /// The motor finished its commanded move.
    pub fn motor_idle(&mut self) {
        if self.phase == CyclePhase::Dispensing {
            self.phase = CyclePhase::Inspecting;
        }
    }

    /// Record one inspection sample. On the final sample the cycle moves to
    /// `Reporting` regardless of motor state.
    pub fn record_sample(&mut self, blocked: bool) {
        if self.inspections_done >= self.inspections_total {
            return;
        }
        self.inspections_done += 1;
        if blocked {
            self.detected_drops += 1;
        }
        if self.inspections_done == self.inspections_total {
            self.phase = CyclePhase::Reporting;
        }
    }

    pub fn window_closed(&self) -> bool {
        self.phase == CyclePhase::Reporting
    }
}
