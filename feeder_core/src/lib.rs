#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Hardware-agnostic feeding cycle controller.
//!
//! All hardware interactions go through the `feeder_traits` seams; network
//! messaging and persistence go through the `Gateway` and `ScheduleStore`
//! traits. The controller itself is single-threaded and cooperative: a
//! `DutyBoard` of periodic duties is drained once per `tick()`, and no duty
//! body blocks.
//!
//! ## Architecture
//!
//! - **Intent classification**: debounced short/long press (`button` module)
//! - **Drop verification**: threshold gate over an analog read (`light`)
//! - **Actuation**: non-blocking, paced stepper moves (`motor`)
//! - **Scheduling**: ordered duties with intervals and budgets (`duty`)
//! - **Feed cycle**: dispense-and-verify state machine (`cycle`, `controller`)
//! - **Remote plane**: command parsing and outbound reports (`command`, `report`)

pub mod builder;
pub mod button;
pub mod command;
pub mod controller;
pub mod cycle;
pub mod duty;
pub mod error;
pub mod hw_error;
pub mod light;
pub mod mocks;
pub mod motor;
pub mod report;
pub mod schedule;
pub mod util;

pub use builder::FeederBuilder;
pub use button::{DebouncedButton, PressEvent, PressKind};
pub use command::Command;
pub use controller::FeederCore;
pub use cycle::{CyclePhase, FeedCycle, FeedKind, FeedRequest};
pub use duty::{Budget, DutyBoard, DutyId};
pub use error::{FeederError, Result};
pub use light::LightGate;
pub use motor::AugerDrive;
pub use report::{ErrorReport, Gateway, Report, ResetAck};
pub use schedule::{Calendar, FeedTime, ScheduleEntry, SchedulePlan, ScheduleStore};
