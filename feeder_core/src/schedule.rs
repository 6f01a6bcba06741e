//! The persisted feeding plan and its minute-resolution evaluation.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Wall-clock time of day, wire form `"HH:MM"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedTime {
    hour: u8,
    minute: u8,
}

impl FeedTime {
    pub fn new(hour: u8, minute: u8) -> Option<Self> {
        if hour > 23 || minute > 59 {
            return None;
        }
        Some(Self { hour, minute })
    }

    pub fn minute_of_day(&self) -> u16 {
        u16::from(self.hour) * 60 + u16::from(self.minute)
    }
}

impl fmt::Display for FeedTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for FeedTime {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (h, m) = s
            .split_once(':')
            .ok_or_else(|| format!("expected HH:MM, got {s:?}"))?;
        let hour: u8 = h.parse().map_err(|_| format!("bad hour in {s:?}"))?;
        let minute: u8 = m.parse().map_err(|_| format!("bad minute in {s:?}"))?;
        Self::new(hour, minute).ok_or_else(|| format!("time out of range: {s:?}"))
    }
}

impl Serialize for FeedTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FeedTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

/// One entry of the feeding plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub time: FeedTime,
    pub count: u32,
}

/// Minute-of-day source. Kept behind a seam so tests and simulations can
/// pin the wall clock.
pub trait Calendar {
    fn minute_of_day(&self) -> u16;
}

/// Persistence seam for the feeding plan. `load` yields an empty plan when
/// nothing was ever stored; that is not an error.
pub trait ScheduleStore {
    fn load(&mut self) -> Result<Vec<ScheduleEntry>, Box<dyn std::error::Error + Send + Sync>>;
    fn save(
        &mut self,
        entries: &[ScheduleEntry],
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// The in-memory plan plus once-per-minute firing state.
///
/// Entries are kept in delivery order and are not deduplicated; every entry
/// matching the current minute contributes to a single coalesced request.
#[derive(Debug, Default)]
pub struct SchedulePlan {
    entries: Vec<ScheduleEntry>,
    last_minute: Option<u16>,
}

impl SchedulePlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&mut self, entries: Vec<ScheduleEntry>) {
        self.entries = entries;
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Evaluate the plan for the given minute. Each minute is evaluated at
    /// most once; the summed count of all matching entries is returned.
    pub fn due(&mut self, minute_of_day: u16) -> Option<u32> {
        if self.last_minute == Some(minute_of_day) {
            return None;
        }
        self.last_minute = Some(minute_of_day);
        let total: u32 = self
            .entries
            .iter()
            .filter(|e| e.time.minute_of_day() == minute_of_day)
            .map(|e| e.count)
            .sum();
        (total > 0).then_some(total)
    }
}
