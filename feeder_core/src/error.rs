use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum FeederError {
    #[error("hardware error: {0}")]
    Hardware(String),
    #[error("hardware fault: {0}")]
    HardwareFault(String),
    #[error("malformed command: {0}")]
    Command(String),
    #[error("feeder busy, request rejected")]
    Busy,
    #[error("gateway error: {0}")]
    Gateway(String),
    #[error("storage error: {0}")]
    Storage(String),
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing device id")]
    MissingDeviceId,
    #[error("missing schedule store")]
    MissingStore,
    #[error("missing calendar")]
    MissingCalendar,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
