//! Console transport: commands in on stdin, reports out on stdout.
//!
//! Stands in for the device's message bridge during bench runs. One JSON
//! payload per stdin line; outbound reports are printed as
//! `[topic] payload` lines.

use std::io::BufRead;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use feeder_core::report::Gateway;

pub struct ConsoleGateway {
    rx: Receiver<Vec<u8>>,
}

impl ConsoleGateway {
    /// Spawns the stdin reader. The thread parks on stdin and dies with the
    /// process; the controller only ever sees `try_recv`.
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        thread::Builder::new()
            .name("stdin-commands".into())
            .spawn(move || {
                let stdin = std::io::stdin();
                for line in stdin.lock().lines() {
                    let Ok(line) = line else { break };
                    if line.trim().is_empty() {
                        continue;
                    }
                    if tx.send(line.into_bytes()).is_err() {
                        break;
                    }
                }
            })
            .ok();
        Self { rx }
    }
}

impl Default for ConsoleGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl Gateway for ConsoleGateway {
    fn publish(
        &mut self,
        topic: &str,
        payload: &[u8],
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        println!("[{topic}] {}", String::from_utf8_lossy(payload));
        Ok(())
    }

    fn poll(&mut self) -> Result<Option<Vec<u8>>, Box<dyn std::error::Error + Send + Sync>> {
        match self.rx.try_recv() {
            Ok(payload) => Ok(Some(payload)),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => Ok(None),
        }
    }
}
