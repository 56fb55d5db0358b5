//! Alert ledger, highlight selection, and path request orchestration.
//!
//! [`Tracker`] is the single entry point the interactive thread drives: intel reports
//! come in through [`Tracker::add_alert`], hover/zoom interactions through the highlight
//! calls, and two periodic ticks ([`Tracker::advance_animations`] and
//! [`Tracker::pump_path_queue`]) keep animations and path lookups moving. The renderer
//! reads the bounded [`HighlightSummary`] and jump counts from the path cache.

#![forbid(unsafe_code)]

pub mod animation;
pub mod config;
pub mod highlight;
pub mod ledger;
pub mod tracker;
pub mod trigger;

pub use animation::{Animation, AnimationState, MarkerAnimation, Rgba};
pub use config::TrackerConfig;
pub use highlight::{HighlightSelector, HighlightSummary, EMPTY_SLOT, SUMMARY_SLOTS};
pub use ledger::{AlertLedger, AlertOutcome, LocationStat, HOME_MARKER_CAPACITY};
pub use tracker::{TickReport, Tracker};
pub use trigger::{LowerBound, RangeAnchor, RangeTrigger, TriggerCheck, UpperBound};

pub use starmap_nav::{LocationId, LocationRecord, PathKey, PathResult};

use thiserror::Error;

/// Errors raised while applying configuration to a loaded map.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("No location graph loaded")]
    GraphNotLoaded,

    #[error("Unknown system in configuration: {0}")]
    UnknownSystem(String),

    #[error("Invalid range trigger '{name}': {reason}")]
    InvalidTrigger { name: String, reason: String },
}

pub type Result<T> = std::result::Result<T, ConfigError>;
