//! JSON-file persistence for the feeding plan.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use feeder_core::schedule::{ScheduleEntry, ScheduleStore};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub struct FileScheduleStore {
    path: PathBuf,
}

impl FileScheduleStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ScheduleStore for FileScheduleStore {
    /// A file that was never written is an empty plan, not an error.
    fn load(&mut self) -> Result<Vec<ScheduleEntry>, BoxError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn save(&mut self, entries: &[ScheduleEntry]) -> Result<(), BoxError> {
        let bytes = serde_json::to_vec(entries)?;
        write_atomic(&self.path, &bytes)?;
        Ok(())
    }
}

/// Write-then-rename so a power cut mid-save never truncates the plan.
fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let tmp = path.with_extension("new");
    {
        let mut f = fs::File::create(&tmp)?;
        f.write_all(bytes)?;
        f.sync_all()?;
    }
    fs::rename(tmp, path)
}
