//! Common time/period helpers for feeder_core.

/// Number of microseconds in one second.
pub const MICROS_PER_SEC: u64 = 1_000_000;
/// Number of seconds in one minute.
pub const SECS_PER_MIN: u64 = 60;

/// Interval between motor micro-steps in microseconds for a commanded rpm.
/// - Clamps both inputs to at least 1 to avoid division by zero.
/// - Ensures the result is at least 1 microsecond.
#[inline]
pub fn step_interval_us(rpm: u32, steps_per_rev: u32) -> u64 {
    let steps_per_min = u64::from(rpm.max(1)) * u64::from(steps_per_rev.max(1));
    (SECS_PER_MIN * MICROS_PER_SEC / steps_per_min).max(1)
}

#[cfg(test)]
mod tests {
    use super::step_interval_us;

    #[test]
    fn shipped_motor_paces_at_about_2441_us() {
        // 12 rpm x 2048 steps/rev = 24576 steps/min
        assert_eq!(step_interval_us(12, 2048), 2441);
    }

    #[test]
    fn degenerate_inputs_are_clamped() {
        assert_eq!(step_interval_us(0, 0), 60_000_000);
        assert!(step_interval_us(u32::MAX, u32::MAX) >= 1);
    }
}
