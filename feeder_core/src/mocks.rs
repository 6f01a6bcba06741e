//! Test doubles for every seam the controller touches. Compiled into the
//! crate so unit tests and the `tests/` suites share one set of doubles.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use feeder_traits::{Button, Direction, Indicator, Level, LightSensor, Motor};

use crate::report::Gateway;
use crate::schedule::{Calendar, ScheduleEntry, ScheduleStore};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Button that replays a fixed level script, then holds the last level
/// (idle high when the script is empty).
pub struct ScriptedButton {
    script: VecDeque<Level>,
    last: Level,
}

impl ScriptedButton {
    pub fn new(script: &[Level]) -> Self {
        Self {
            script: script.iter().copied().collect(),
            last: Level::High,
        }
    }
}

impl Button for ScriptedButton {
    fn read(&mut self) -> Result<Level, BoxError> {
        if let Some(level) = self.script.pop_front() {
            self.last = level;
        }
        Ok(self.last)
    }
}

/// Button whose line is flipped from the outside through a shared handle.
pub struct SharedButton {
    line: Rc<Cell<Level>>,
}

impl SharedButton {
    pub fn new() -> Self {
        Self {
            line: Rc::new(Cell::new(Level::High)),
        }
    }

    /// Handle for the test to drive the line with.
    pub fn line(&self) -> Rc<Cell<Level>> {
        Rc::clone(&self.line)
    }
}

impl Default for SharedButton {
    fn default() -> Self {
        Self::new()
    }
}

impl Button for SharedButton {
    fn read(&mut self) -> Result<Level, BoxError> {
        Ok(self.line.get())
    }
}

/// Light sensor that replays scripted readings, then a fixed default.
pub struct ScriptedLight {
    script: VecDeque<u16>,
    default: u16,
}

impl ScriptedLight {
    pub fn new(script: &[u16], default: u16) -> Self {
        Self {
            script: script.iter().copied().collect(),
            default,
        }
    }
}

impl LightSensor for ScriptedLight {
    fn read(&mut self) -> Result<u16, BoxError> {
        Ok(self.script.pop_front().unwrap_or(self.default))
    }
}

/// Light sensor driven from the outside through a shared handle.
pub struct SharedLight {
    reading: Rc<Cell<u16>>,
}

impl SharedLight {
    pub fn new(initial: u16) -> Self {
        Self {
            reading: Rc::new(Cell::new(initial)),
        }
    }

    pub fn reading(&self) -> Rc<Cell<u16>> {
        Rc::clone(&self.reading)
    }
}

impl LightSensor for SharedLight {
    fn read(&mut self) -> Result<u16, BoxError> {
        Ok(self.reading.get())
    }
}

/// Motor that counts steps and exposes the counter through a shared handle.
pub struct CountingMotor {
    steps: Rc<Cell<u64>>,
    released: Rc<Cell<bool>>,
}

impl CountingMotor {
    pub fn new() -> Self {
        Self {
            steps: Rc::new(Cell::new(0)),
            released: Rc::new(Cell::new(true)),
        }
    }

    pub fn steps_taken(&self) -> Rc<Cell<u64>> {
        Rc::clone(&self.steps)
    }

    /// True once `release()` has de-energized the coils.
    pub fn released(&self) -> Rc<Cell<bool>> {
        Rc::clone(&self.released)
    }
}

impl Default for CountingMotor {
    fn default() -> Self {
        Self::new()
    }
}

impl Motor for CountingMotor {
    fn step(&mut self, _direction: Direction) -> Result<(), BoxError> {
        self.steps.set(self.steps.get() + 1);
        self.released.set(false);
        Ok(())
    }

    fn release(&mut self) -> Result<(), BoxError> {
        self.released.set(true);
        Ok(())
    }
}

/// Indicator that swallows writes. Default for unwired LEDs.
pub struct NullIndicator;

impl Indicator for NullIndicator {
    fn set(&mut self, _on: bool) -> Result<(), BoxError> {
        Ok(())
    }
}

/// Indicator whose state is observable through a shared handle.
pub struct SharedIndicator {
    on: Rc<Cell<bool>>,
}

impl SharedIndicator {
    pub fn new() -> Self {
        Self {
            on: Rc::new(Cell::new(false)),
        }
    }

    pub fn state(&self) -> Rc<Cell<bool>> {
        Rc::clone(&self.on)
    }
}

impl Default for SharedIndicator {
    fn default() -> Self {
        Self::new()
    }
}

impl Indicator for SharedIndicator {
    fn set(&mut self, on: bool) -> Result<(), BoxError> {
        self.on.set(on);
        Ok(())
    }
}

/// In-memory message bus: inbound payloads are queued by the test, outbound
/// publishes are recorded as `(topic, payload)` pairs. Clones share both
/// queues, so a test can keep a handle after the controller takes ownership.
#[derive(Clone)]
pub struct MemoryGateway {
    inbound: Rc<RefCell<VecDeque<Vec<u8>>>>,
    published: Rc<RefCell<Vec<(String, Vec<u8>)>>>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self {
            inbound: Rc::new(RefCell::new(VecDeque::new())),
            published: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn push_command(&self, payload: impl Into<Vec<u8>>) {
        self.inbound.borrow_mut().push_back(payload.into());
    }

    pub fn published(&self) -> Rc<RefCell<Vec<(String, Vec<u8>)>>> {
        Rc::clone(&self.published)
    }
}

impl Default for MemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl Gateway for MemoryGateway {
    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), BoxError> {
        self.published
            .borrow_mut()
            .push((topic.to_owned(), payload.to_vec()));
        Ok(())
    }

    fn poll(&mut self) -> Result<Option<Vec<u8>>, BoxError> {
        Ok(self.inbound.borrow_mut().pop_front())
    }
}

/// In-memory plan store with optional injected load/save failures.
pub struct MemoryStore {
    entries: Rc<RefCell<Vec<ScheduleEntry>>>,
    fail_load: bool,
    fail_save: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            entries: Rc::new(RefCell::new(Vec::new())),
            fail_load: false,
            fail_save: false,
        }
    }

    pub fn with_entries(entries: Vec<ScheduleEntry>) -> Self {
        Self {
            entries: Rc::new(RefCell::new(entries)),
            fail_load: false,
            fail_save: false,
        }
    }

    pub fn failing_load() -> Self {
        Self {
            entries: Rc::new(RefCell::new(Vec::new())),
            fail_load: true,
            fail_save: false,
        }
    }

    pub fn failing_save() -> Self {
        Self {
            entries: Rc::new(RefCell::new(Vec::new())),
            fail_load: false,
            fail_save: true,
        }
    }

    /// Handle for asserting what the controller persisted.
    pub fn entries(&self) -> Rc<RefCell<Vec<ScheduleEntry>>> {
        Rc::clone(&self.entries)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ScheduleStore for MemoryStore {
    fn load(&mut self) -> Result<Vec<ScheduleEntry>, BoxError> {
        if self.fail_load {
            return Err("simulated storage failure".into());
        }
        Ok(self.entries.borrow().clone())
    }

    fn save(&mut self, entries: &[ScheduleEntry]) -> Result<(), BoxError> {
        if self.fail_save {
            return Err("simulated storage failure".into());
        }
        *self.entries.borrow_mut() = entries.to_vec();
        Ok(())
    }
}

/// Wall clock pinned to one minute of day, adjustable through a handle.
pub struct SharedCalendar {
    minute: Rc<Cell<u16>>,
}

impl SharedCalendar {
    pub fn at(minute: u16) -> Self {
        Self {
            minute: Rc::new(Cell::new(minute)),
        }
    }

    pub fn handle(&self) -> Rc<Cell<u16>> {
        Rc::clone(&self.minute)
    }
}

impl Calendar for SharedCalendar {
    fn minute_of_day(&self) -> u16 {
        self.minute.get()
    }
}
