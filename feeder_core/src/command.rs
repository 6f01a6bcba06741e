//! Inbound remote command payloads.
//!
//! The wire payload is either a single feed request object or a whole
//! feeding plan to persist:
//!
//! ```json
//! {"count": 2}
//! [{"time": "08:30", "count": 1}, {"time": "18:00", "count": 2}]
//! ```

use crate::error::FeederError;
use crate::schedule::ScheduleEntry;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Command {
    /// Dispense `count` feed units now.
    Feed { count: u32 },
    /// Replace the persisted feeding plan wholesale.
    Plan(Vec<ScheduleEntry>),
}

/// Parse and validate one command payload. Never panics; malformed input
/// is reported, not acted on.
pub fn parse(payload: &[u8]) -> Result<Command, FeederError> {
    let command: Command =
        serde_json::from_slice(payload).map_err(|e| FeederError::Command(e.to_string()))?;
    match &command {
        Command::Feed { count } => {
            if *count == 0 {
                return Err(FeederError::Command("feed count must be >= 1".to_owned()));
            }
        }
        Command::Plan(entries) => {
            if entries.iter().any(|e| e.count == 0) {
                return Err(FeederError::Command(
                    "schedule entry count must be >= 1".to_owned(),
                ));
            }
        }
    }
    Ok(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_feed_command() {
        assert_eq!(parse(br#"{"count": 3}"#).unwrap(), Command::Feed { count: 3 });
    }

    #[test]
    fn parses_plan_command() {
        let cmd = parse(br#"[{"time":"08:30","count":1}]"#).unwrap();
        match cmd {
            Command::Plan(entries) => {
                assert_eq!(entries.len(), 1);
                assert_eq!(entries[0].count, 1);
            }
            other => panic!("expected plan, got {other:?}"),
        }
    }

    #[test]
    fn rejects_zero_counts() {
        assert!(parse(br#"{"count": 0}"#).is_err());
        assert!(parse(br#"[{"time":"08:30","count":0}]"#).is_err());
    }

    #[test]
    fn rejects_garbage_without_panicking() {
        for payload in [
            &b""[..],
            b"{",
            b"null",
            b"42",
            br#""feed""#,
            br#"{"count": -1}"#,
            br#"{"count": "two"}"#,
            br#"[{"time":"25:00","count":1}]"#,
            &[0xff, 0xfe, 0x00],
        ] {
            assert!(parse(payload).is_err(), "accepted {payload:?}");
        }
    }
}
