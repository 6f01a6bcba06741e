//! End-to-end controller scenarios driven tick by tick on a manual clock.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use feeder_core::cycle::{FeedKind, FeedRequest};
use feeder_core::error::FeederError;
use feeder_core::mocks::{
    CountingMotor, MemoryGateway, MemoryStore, ScriptedLight, SharedButton, SharedCalendar,
};
use feeder_core::schedule::{FeedTime, ScheduleEntry};
use feeder_core::{FeederBuilder, FeederCore};
use feeder_traits::clock::ManualClock;
use feeder_traits::Level;
use serde_json::{json, Value};

const STEPS_PER_REV: u64 = 2048;

struct Rig {
    core: FeederCore<SharedButton, ScriptedLight, CountingMotor, MemoryGateway>,
    clock: ManualClock,
    line: Rc<Cell<Level>>,
    steps: Rc<Cell<u64>>,
    bus: MemoryGateway,
    entries: Rc<RefCell<Vec<ScheduleEntry>>>,
    minute: Rc<Cell<u16>>,
}

impl Rig {
    fn new(light_script: &[u16]) -> Self {
        Self::with_store(light_script, MemoryStore::new())
    }

    fn with_store(light_script: &[u16], store: MemoryStore) -> Self {
        let button = SharedButton::new();
        let line = button.line();
        let motor = CountingMotor::new();
        let steps = motor.steps_taken();
        let gateway = MemoryGateway::new();
        let bus = gateway.clone();
        let entries = store.entries();
        let calendar = SharedCalendar::at(12 * 60);
        let minute = calendar.handle();
        let clock = ManualClock::new();
        let core = FeederBuilder::new(
            button,
            ScriptedLight::new(light_script, 1100),
            motor,
            gateway,
        )
        .device_id("01A03")
        .store(Box::new(store))
        .calendar(Box::new(calendar))
        .clock(Arc::new(clock.clone()))
        .build()
        .expect("controller builds");
        Self {
            core,
            clock,
            line,
            steps,
            bus,
            entries,
            minute,
        }
    }

    /// One tick per simulated millisecond.
    fn run_ms(&mut self, ms: u64) {
        for _ in 0..ms {
            self.core.tick();
            self.clock.advance(Duration::from_millis(1));
        }
    }

    /// Hold the button low for `ms`, then release. The leading tick
    /// establishes the idle-high baseline.
    fn press_for(&mut self, ms: u64) {
        self.run_ms(1);
        self.line.set(Level::Low);
        self.run_ms(ms);
        self.line.set(Level::High);
        self.run_ms(1);
    }

    fn published(&self) -> Vec<(String, Value)> {
        self.bus
            .published()
            .borrow()
            .iter()
            .map(|(topic, payload)| {
                (
                    topic.clone(),
                    serde_json::from_slice(payload).expect("published payloads are JSON"),
                )
            })
            .collect()
    }

    fn published_on(&self, topic: &str) -> Vec<Value> {
        self.published()
            .into_iter()
            .filter(|(t, _)| t == topic)
            .map(|(_, v)| v)
            .collect()
    }
}

#[test]
fn short_press_runs_a_full_cycle_and_reports() {
    let mut rig = Rig::new(&[]);
    rig.press_for(500);
    assert!(!rig.core.is_idle(), "release starts a cycle");

    // Verification window (2 s) closes well before the move (~5 s) drains.
    rig.run_ms(7000);
    assert!(rig.core.is_idle());
    assert_eq!(rig.steps.get(), STEPS_PER_REV);
    assert_eq!(
        rig.published_on("feeding-res"),
        vec![json!({"id": "01A03", "type": "manual", "amount": 0})]
    );
    assert!(rig.published_on("error-occur").is_empty());
}

#[test]
fn sub_debounce_tap_feeds_nothing() {
    let mut rig = Rig::new(&[]);
    rig.press_for(50);
    rig.run_ms(200);
    assert!(rig.core.is_idle());
    assert_eq!(rig.steps.get(), 0);
    assert!(rig.published().is_empty());
}

#[test]
fn detected_drops_become_the_reported_amount() {
    // First 30 samples see the beam blocked, the rest see ambient light.
    let script = vec![500u16; 30];
    let mut rig = Rig::new(&script);
    rig.core
        .submit(FeedRequest {
            amount: 1,
            kind: FeedKind::Manual,
        })
        .expect("idle controller accepts");
    rig.run_ms(2100);
    assert_eq!(
        rig.published_on("feeding-res"),
        vec![json!({"id": "01A03", "type": "manual", "amount": 30})]
    );
}

#[test]
fn busy_controller_rejects_and_reports() {
    let mut rig = Rig::new(&[]);
    rig.core
        .submit(FeedRequest {
            amount: 1,
            kind: FeedKind::Manual,
        })
        .expect("first request accepted");
    let err = rig
        .core
        .submit(FeedRequest {
            amount: 2,
            kind: FeedKind::Manual,
        })
        .expect_err("second request rejected");
    assert!(matches!(
        err.downcast_ref::<FeederError>(),
        Some(FeederError::Busy)
    ));
    assert_eq!(
        rig.published_on("error-occur"),
        vec![json!({"id": "01A03", "message": "feeder busy, request rejected"})]
    );
    // The active cycle is untouched by the rejection.
    assert_eq!(rig.core.active_cycle().expect("cycle").requested(), 1);

    // A remote feed while busy is rejected the same way.
    rig.bus.push_command(br#"{"count": 2}"#.as_slice());
    rig.run_ms(2);
    assert_eq!(rig.published_on("error-occur").len(), 2);
    assert_eq!(rig.core.active_cycle().expect("cycle").requested(), 1);
}

#[test]
fn draining_auger_stays_busy_after_the_report() {
    let mut rig = Rig::new(&[]);
    rig.core
        .submit(FeedRequest {
            amount: 1,
            kind: FeedKind::Manual,
        })
        .expect("idle controller accepts");

    // The 2 s verification window closes and reports while the ~5 s move
    // is still draining.
    rig.run_ms(2100);
    assert_eq!(rig.published_on("feeding-res").len(), 1);
    assert!(rig.core.active_cycle().is_none(), "cycle reported and closed");
    assert!(!rig.core.is_idle(), "auger still draining");

    let err = rig
        .core
        .submit(FeedRequest {
            amount: 1,
            kind: FeedKind::Manual,
        })
        .expect_err("rejected while the auger drains");
    assert!(matches!(
        err.downcast_ref::<FeederError>(),
        Some(FeederError::Busy)
    ));

    // Once the move drains the controller accepts again.
    rig.run_ms(5000);
    assert!(rig.core.is_idle());
    rig.core
        .submit(FeedRequest {
            amount: 1,
            kind: FeedKind::Manual,
        })
        .expect("idle again after the drain");
}

#[test]
fn remote_feed_command_starts_a_cycle() {
    let mut rig = Rig::new(&[]);
    rig.bus.push_command(br#"{"count": 2}"#.as_slice());
    rig.run_ms(2);
    let cycle = rig.core.active_cycle().expect("cycle started");
    assert_eq!(cycle.requested(), 2);
    assert_eq!(cycle.kind(), FeedKind::Manual);
}

#[test]
fn malformed_payload_is_reported_and_ignored() {
    let mut rig = Rig::new(&[]);
    rig.bus.push_command(b"definitely not json".as_slice());
    rig.bus.push_command(br#"{"count": 0}"#.as_slice());
    rig.run_ms(2);
    assert!(rig.core.is_idle());
    assert_eq!(rig.steps.get(), 0);
    assert_eq!(rig.published_on("error-occur").len(), 2);
}

#[test]
fn payload_flood_drains_across_ticks() {
    let mut rig = Rig::new(&[]);
    for _ in 0..10 {
        rig.bus.push_command(b"not json".as_slice());
    }
    rig.run_ms(1);
    assert_eq!(
        rig.published_on("error-occur").len(),
        8,
        "one gateway pass handles a bounded batch"
    );
    rig.run_ms(1);
    assert_eq!(rig.published_on("error-occur").len(), 10);
}

#[test]
fn failed_plan_persist_is_reported_as_a_storage_error() {
    let mut rig = Rig::with_store(&[], MemoryStore::failing_save());
    rig.bus
        .push_command(br#"[{"time":"08:30","count":1}]"#.as_slice());
    rig.run_ms(2);
    assert_eq!(
        rig.published_on("error-occur"),
        vec![json!({
            "id": "01A03",
            "message": "storage error: simulated storage failure"
        })]
    );
    // The in-memory plan is still replaced; only persistence failed.
    assert!(!rig.core.plan().is_empty());
}

#[test]
fn plan_command_persists_and_fires_coalesced() {
    let mut rig = Rig::new(&[]);
    rig.bus.push_command(
        br#"[{"time":"08:30","count":1},{"time":"08:30","count":2}]"#.as_slice(),
    );
    rig.run_ms(2);
    assert_eq!(rig.entries.borrow().len(), 2, "plan persisted");

    rig.minute.set(8 * 60 + 30);
    rig.run_ms(1100);
    let cycle = rig.core.active_cycle().expect("scheduled cycle");
    assert_eq!(cycle.kind(), FeedKind::Scheduled);
    assert_eq!(cycle.requested(), 3, "same-minute entries coalesce");

    // The minute fires once; no second cycle while the wall clock sits on it.
    rig.run_ms(3000);
    let results = rig.published_on("feeding-res");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["type"], "scheduled");
}

#[test]
fn long_press_clears_the_persisted_plan() {
    let entry = ScheduleEntry {
        time: FeedTime::new(8, 30).expect("valid time"),
        count: 1,
    };
    let mut rig = Rig::with_store(&[], MemoryStore::with_entries(vec![entry]));
    rig.core.start().expect("start");
    assert!(!rig.core.plan().is_empty());

    rig.press_for(3500);
    assert!(rig.core.plan().is_empty());
    assert!(rig.entries.borrow().is_empty(), "store cleared");
    assert_eq!(
        rig.published_on("feeding-res"),
        vec![json!({"id": "01A03", "type": "reset"})]
    );
}

#[test]
fn reset_during_a_cycle_waits_for_the_report() {
    // Stretch the verification window to 10 s so a 3.5 s hold ends inside it.
    let cfg = feeder_config::load_toml(
        r#"
        [device]
        id = "01A03"

        [inspection]
        interval_ms = 10
        iterations = 1000
        "#,
    )
    .expect("config parses");
    let store = MemoryStore::with_entries(vec![ScheduleEntry {
        time: FeedTime::new(8, 30).expect("valid time"),
        count: 1,
    }]);
    let entries = store.entries();
    let button = SharedButton::new();
    let line = button.line();
    let gateway = MemoryGateway::new();
    let bus = gateway.clone();
    let clock = ManualClock::new();
    let mut core = FeederBuilder::new(
        button,
        ScriptedLight::new(&[], 1100),
        CountingMotor::new(),
        gateway,
    )
    .config(&cfg)
    .store(Box::new(store))
    .calendar(Box::new(SharedCalendar::at(12 * 60)))
    .clock(Arc::new(clock.clone()))
    .build()
    .expect("controller builds");
    core.start().expect("start");

    let run_ms = |core: &mut FeederCore<_, _, _, _>, ms: u64| {
        for _ in 0..ms {
            core.tick();
            clock.advance(Duration::from_millis(1));
        }
    };

    run_ms(&mut core, 1);
    core.submit(FeedRequest {
        amount: 1,
        kind: FeedKind::Manual,
    })
    .expect("accepted");
    line.set(Level::Low);
    run_ms(&mut core, 3500);
    line.set(Level::High);
    run_ms(&mut core, 1);

    // Cycle still running: the reset is pending, nothing cleared yet.
    assert!(core.active_cycle().is_some());
    assert!(!entries.borrow().is_empty());
    assert!(bus.published().borrow().is_empty());

    // Let the window close; report first, then the deferred reset.
    run_ms(&mut core, 8000);
    assert!(core.active_cycle().is_none());
    assert!(entries.borrow().is_empty());
    let results: Vec<Value> = bus
        .published()
        .borrow()
        .iter()
        .filter(|(t, _)| t == "feeding-res")
        .map(|(_, p)| serde_json::from_slice(p).expect("json"))
        .collect();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["type"], "manual");
    assert_eq!(results[1], json!({"id": "01A03", "type": "reset"}));
}

#[test]
fn back_to_back_cycles_both_report() {
    let mut rig = Rig::new(&[]);
    for _ in 0..2 {
        rig.core
            .submit(FeedRequest {
                amount: 1,
                kind: FeedKind::Manual,
            })
            .expect("idle controller accepts");
        rig.run_ms(7000);
        assert!(rig.core.is_idle());
    }
    assert_eq!(rig.steps.get(), 2 * STEPS_PER_REV);
    assert_eq!(rig.published_on("feeding-res").len(), 2);
}

#[test]
fn unreadable_store_starts_with_an_empty_plan() {
    let mut rig = Rig::with_store(&[], MemoryStore::failing_load());
    rig.core.start().expect("storage faults are not fatal");
    assert!(rig.core.plan().is_empty());

    // The device is still fully operational.
    rig.press_for(500);
    assert!(rig.core.active_cycle().is_some());
}
