//! # Zmanim Notify Core Library
//!
//! This library provides the scheduling logic behind the `zmanim` service:
//! it takes a day's named halachic times from a time service, turns them
//! into reminder and exact triggers, keeps per-label state files current,
//! and stays quiet during the weekly Sabbath window.
//!
//! ## Architecture
//!
//! - **Time points**: an immutable per-day set keyed by the closed
//!   [`ZmanLabel`] enumeration
//! - **Plan / Tracker**: pure functions from the day's set to triggers and
//!   derived state (next up, last passed, relevance)
//! - **Sabbath / Halachic**: weekly suppression interval and proportional
//!   hour index
//! - **Scheduler**: a tokio actor that owns all state; timers only send it
//!   messages
//! - **Storage**: TOML configuration and file-backed state records
//! - **Integrations**: time source, notification and state sink traits
//!
//! ## Key Components
//!
//! - [`Scheduler`]: actor driving refreshes and fires
//! - [`Orchestrator`]: the scheduling decisions, testable without timers
//! - [`Config`] / [`Settings`]: on-disk and validated configuration
//! - [`FileStateStore`]: state files readable by other processes

pub mod error;
pub mod events;
pub mod halachic;
pub mod integrations;
pub mod label;
pub mod plan;
pub mod sabbath;
pub mod scheduler;
pub mod storage;
pub mod time_points;
pub mod tracker;

pub use error::{ClockError, ConfigError, CoreError, DeliveryError, SourceError};
pub use events::Event;
pub use halachic::{hour_index, HourRecord};
pub use integrations::{Location, Notification, NotificationSink, StateSink, TimeSource};
pub use label::ZmanLabel;
pub use plan::{build_plan, build_triggers, OffsetTable, Trigger, TriggerKind};
pub use sabbath::{SabbathInterval, SabbathWindow};
pub use scheduler::{Orchestrator, Scheduler, SchedulerHandle};
pub use storage::{Config, FileStateStore, Settings, StateSnapshot};
pub use time_points::{NamedTime, RawTimes, TimePointSet};
pub use tracker::{DerivedState, Marker, NextUp, RelevanceGroups};
