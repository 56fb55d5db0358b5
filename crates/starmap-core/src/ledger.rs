//! Alert bookkeeping: the bounded "red" and "green" collections plus report statistics.

use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::animation::{Animation, MarkerAnimation};
use crate::LocationId;

/// Capacity of the green (home-relative) collection.
pub const HOME_MARKER_CAPACITY: usize = 10;

pub const DEFAULT_MAX_ALERTS: usize = 15;
pub const DEFAULT_MAX_ALERT_AGE_MINUTES: u32 = 15;

/// Report statistics for one location.
///
/// Created on the first alert and never removed; eviction from the red collection
/// only sets `expired`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationStat {
    pub system_id: LocationId,
    pub last_report: DateTime<Utc>,
    pub report_count: u32,
    pub expired: bool,
}

impl LocationStat {
    fn new(system_id: LocationId, now: DateTime<Utc>) -> Self {
        Self {
            system_id,
            last_report: now,
            report_count: 1,
            expired: false,
        }
    }

    fn record_report(&mut self, now: DateTime<Utc>) {
        self.last_report = now;
        self.report_count = self.report_count.saturating_add(1);
        self.expired = false;
    }

    /// Time since the last report, clamped at zero.
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        (now - self.last_report).max(Duration::zero())
    }
}

/// What [`AlertLedger::add_alert`] changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertOutcome {
    /// The location was not alerting before this report.
    pub started: bool,
    /// Locations pushed out of the red collection by the capacity limit.
    pub evicted: Vec<LocationId>,
}

#[derive(Debug)]
pub struct AlertLedger {
    /// Locations with a running alert animation, oldest first.
    alerting: Vec<LocationId>,
    animations: HashMap<LocationId, MarkerAnimation>,
    red: VecDeque<LocationId>,
    green: VecDeque<LocationId>,
    stats: HashMap<LocationId, LocationStat>,
    max_alerts: usize,
    max_alert_age_minutes: u32,
}

impl Default for AlertLedger {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ALERTS, DEFAULT_MAX_ALERT_AGE_MINUTES)
    }
}

impl AlertLedger {
    pub fn new(max_alerts: usize, max_alert_age_minutes: u32) -> Self {
        Self {
            alerting: Vec::new(),
            animations: HashMap::new(),
            red: VecDeque::new(),
            green: VecDeque::with_capacity(HOME_MARKER_CAPACITY),
            stats: HashMap::new(),
            max_alerts: max_alerts.max(1),
            max_alert_age_minutes,
        }
    }

    /// Record an intel report for `id`.
    ///
    /// Starts the alert animation if the location was quiet, refreshes its statistics,
    /// and moves it to the most-recent end of the red collection. Capacity overflow
    /// evicts from the front and flags the evicted stats as expired.
    pub fn add_alert(&mut self, id: LocationId, now: DateTime<Utc>) -> AlertOutcome {
        let mut outcome = AlertOutcome::default();

        if !self.is_alerting(id) {
            self.alerting.push(id);
            self.animations.insert(id, MarkerAnimation::alert());
            outcome.started = true;
        }

        self.stats
            .entry(id)
            .and_modify(|stat| stat.record_report(now))
            .or_insert_with(|| LocationStat::new(id, now));

        self.red.retain(|&existing| existing != id);
        self.red.push_back(id);
        outcome.evicted = self.enforce_capacity();

        outcome
    }

    /// Drop every red entry whose last report is older than the configured age.
    ///
    /// Disabled when the maximum age is zero. Returns the removed locations.
    pub fn remove_expired_alerts(&mut self, now: DateTime<Utc>) -> Vec<LocationId> {
        if self.max_alert_age_minutes == 0 {
            return Vec::new();
        }

        let cutoff = now - Duration::minutes(i64::from(self.max_alert_age_minutes));
        let stats = &mut self.stats;
        let mut removed = Vec::new();

        self.red.retain(|id| {
            let Some(stat) = stats.get_mut(id) else {
                return true;
            };
            if stat.expired || stat.last_report >= cutoff {
                return true;
            }
            stat.expired = true;
            removed.push(*id);
            false
        });

        if !removed.is_empty() {
            tracing::debug!(count = removed.len(), "Expired alerts by age");
        }
        removed
    }

    /// Advance every alert animation by one tick; finished alerts stop alerting.
    ///
    /// The red collection is not affected; it is drained only by the two eviction
    /// policies.
    pub fn advance_tick(&mut self) -> Vec<LocationId> {
        let animations = &mut self.animations;
        let mut finished = Vec::new();

        self.alerting.retain(|id| {
            let done = animations
                .get_mut(id)
                .map(|anim| anim.advance_tick())
                .unwrap_or(true);
            if done {
                animations.remove(id);
                finished.push(*id);
            }
            !done
        });

        finished
    }

    pub fn add_home_marker(&mut self, id: LocationId) {
        self.green.push_back(id);
        while self.green.len() > HOME_MARKER_CAPACITY {
            self.green.pop_front();
        }
    }

    pub fn clear_home_markers(&mut self) {
        self.green.clear();
    }

    /// Change the red capacity (minimum 1), evicting immediately if it shrank.
    pub fn set_max_alerts(&mut self, max_alerts: usize) -> Vec<LocationId> {
        self.max_alerts = max_alerts.max(1);
        self.enforce_capacity()
    }

    /// Maximum alert age in minutes; `0` disables age eviction.
    pub fn set_max_alert_age(&mut self, minutes: u32) {
        self.max_alert_age_minutes = minutes;
    }

    pub fn max_alerts(&self) -> usize {
        self.max_alerts
    }

    pub fn max_alert_age(&self) -> u32 {
        self.max_alert_age_minutes
    }

    pub fn get_stats(&self, id: LocationId) -> Option<&LocationStat> {
        self.stats.get(&id)
    }

    pub fn is_alerting(&self, id: LocationId) -> bool {
        self.animations.contains_key(&id)
    }

    pub fn alerting(&self) -> &[LocationId] {
        &self.alerting
    }

    pub fn animation(&self, id: LocationId) -> Option<&MarkerAnimation> {
        self.animations.get(&id)
    }

    /// Red collection, oldest report first.
    pub fn red(&self) -> impl ExactSizeIterator<Item = LocationId> + '_ {
        self.red.iter().copied()
    }

    /// Green collection, oldest marker first.
    pub fn green(&self) -> impl ExactSizeIterator<Item = LocationId> + '_ {
        self.green.iter().copied()
    }

    fn enforce_capacity(&mut self) -> Vec<LocationId> {
        let mut evicted = Vec::new();
        while self.red.len() > self.max_alerts {
            let Some(id) = self.red.pop_front() else {
                break;
            };
            if let Some(stat) = self.stats.get_mut(&id) {
                stat.expired = true;
            }
            evicted.push(id);
        }
        evicted
    }
}
