//! Local wall clock as minute-of-day.

use chrono::{Local, Timelike};
use feeder_core::schedule::Calendar;

pub struct LocalCalendar;

impl Calendar for LocalCalendar {
    fn minute_of_day(&self) -> u16 {
        let now = Local::now();
        (now.hour() * 60 + now.minute()) as u16
    }
}
