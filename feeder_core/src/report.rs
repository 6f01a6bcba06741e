//! Outbound messages and the gateway seam.

use crate::cycle::FeedKind;
use serde::Serialize;

/// Completion report for one feed cycle. `amount` is the number of verified
/// drops, which may legitimately be zero.
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub id: &'a str,
    #[serde(rename = "type")]
    pub kind: FeedKind,
    pub amount: u32,
}

/// Recoverable-fault notification for the error topic.
#[derive(Debug, Serialize)]
pub struct ErrorReport<'a> {
    pub id: &'a str,
    pub message: &'a str,
}

/// Acknowledgment published after a factory reset.
#[derive(Debug, Serialize)]
pub struct ResetAck<'a> {
    pub id: &'a str,
    #[serde(rename = "type")]
    pub kind: &'a str,
}

impl<'a> ResetAck<'a> {
    pub fn new(id: &'a str) -> Self {
        Self { id, kind: "reset" }
    }
}

/// Messaging seam. `publish` hands a serialized payload to the transport;
/// `poll` services the bus and yields at most one pending inbound command
/// payload per call. Neither may block past its slice.
pub trait Gateway {
    fn publish(
        &mut self,
        topic: &str,
        payload: &[u8],
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    fn poll(&mut self) -> Result<Option<Vec<u8>>, Box<dyn std::error::Error + Send + Sync>>;
}
