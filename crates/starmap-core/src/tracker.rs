//! Interactive-thread facade over the graph, path pipeline, ledger, and highlights.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use starmap_nav::{
    LocationGraph, LocationRecord, PathKey, PathRequestPipeline, PathResult, PathSearch,
};

use crate::config::TrackerConfig;
use crate::highlight::{HighlightSelector, HighlightSummary};
use crate::ledger::{AlertLedger, AlertOutcome, LocationStat};
use crate::trigger::{RangeAnchor, RangeTrigger, TriggerCheck};
use crate::{ConfigError, LocationId, Result};

/// What one animation tick changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub finished_alerts: Vec<LocationId>,
    pub finished_highlights: Vec<LocationId>,
    /// Anything is still animating after this tick.
    pub active: bool,
}

struct LoadedMap {
    graph: Arc<LocationGraph>,
    paths: PathRequestPipeline,
}

/// Owns all alert, highlight, and path state for one loaded map.
///
/// Everything here runs on the interactive thread; only path searches are handed to
/// the pipeline's worker.
pub struct Tracker {
    map: Option<LoadedMap>,
    ledger: AlertLedger,
    highlights: HighlightSelector,
    home: Option<LocationId>,
    character: Option<LocationId>,
}

impl Default for Tracker {
    fn default() -> Self {
        Self::new(&TrackerConfig::default())
    }
}

impl Tracker {
    pub fn new(config: &TrackerConfig) -> Self {
        Self {
            map: None,
            ledger: AlertLedger::new(config.max_alerts, config.max_alert_age_minutes),
            highlights: HighlightSelector::new(),
            home: None,
            character: None,
        }
    }

    /// Load (or reload) the location graph. Returns `false` if nothing could be loaded.
    ///
    /// A reload discards the path cache, queued requests, alerts, and highlights along
    /// with the old graph. Home and character locations survive only if the new graph
    /// still contains them.
    pub fn load_graph(&mut self, records: Vec<LocationRecord>) -> bool {
        match LocationGraph::from_records(records) {
            Ok(graph) => {
                let graph = Arc::new(graph);
                tracing::info!(locations = graph.len(), "Map loaded");
                self.map = Some(LoadedMap {
                    paths: PathRequestPipeline::new(Arc::clone(&graph)),
                    graph,
                });
                self.reset_map_state();
                true
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to load map");
                false
            }
        }
    }

    /// Apply name-based settings (home, ignored systems) and validate triggers.
    ///
    /// `ignore_systems` replaces the blocked set; locations blocked by an earlier call
    /// but missing from this list become searchable again.
    pub fn apply_config(&mut self, config: &TrackerConfig) -> Result<()> {
        let graph = self.graph().cloned().ok_or(ConfigError::GraphNotLoaded)?;
        let resolve = |name: &str| {
            graph
                .find_by_name(name)
                .ok_or_else(|| ConfigError::UnknownSystem(name.to_string()))
        };

        let ignored = config
            .ignore_systems
            .iter()
            .map(|name| resolve(name.as_str()))
            .collect::<Result<Vec<_>>>()?;
        let home = config.home_system.as_deref().map(&resolve).transpose()?;

        for trigger in &config.triggers {
            trigger.validate()?;
            if let RangeAnchor::System { name } = &trigger.anchor {
                resolve(name.as_str())?;
            }
        }

        self.ledger.set_max_alerts(config.max_alerts);
        self.ledger.set_max_alert_age(config.max_alert_age_minutes);
        graph.clear_blocked();
        for id in ignored {
            graph.set_blocked(id, true);
        }
        match home {
            Some(id) => self.set_home(id),
            None => self.clear_home(),
        }
        Ok(())
    }

    fn reset_map_state(&mut self) {
        self.ledger = AlertLedger::new(self.ledger.max_alerts(), self.ledger.max_alert_age());
        self.highlights = HighlightSelector::new();

        let home = self.home.take().filter(|&id| self.knows(id));
        let character = self.character.take().filter(|&id| self.knows(id));
        if let Some(id) = character {
            self.set_character_location(id);
        }
        if let Some(id) = home {
            self.set_home(id);
        }
    }

    pub fn graph(&self) -> Option<&Arc<LocationGraph>> {
        self.map.as_ref().map(|map| &map.graph)
    }

    pub fn ledger(&self) -> &AlertLedger {
        &self.ledger
    }

    pub fn highlights(&self) -> &HighlightSelector {
        &self.highlights
    }

    pub fn home(&self) -> Option<LocationId> {
        self.home
    }

    pub fn character_location(&self) -> Option<LocationId> {
        self.character
    }

    fn knows(&self, id: LocationId) -> bool {
        self.graph().is_some_and(|graph| graph.contains(id))
    }

    fn request(&mut self, origin: LocationId, destination: LocationId) {
        if let Some(map) = self.map.as_mut() {
            map.paths.enqueue_if_uncached(origin, destination);
        }
    }

    // -- pathfinding -----------------------------------------------------------------

    /// Synchronous search on the calling thread. `None` for unknown ids or no map.
    pub fn find_path(&self, origin: LocationId, destination: LocationId) -> Option<PathResult> {
        if !self.knows(origin) || !self.knows(destination) {
            return None;
        }
        let graph = Arc::clone(self.graph()?);
        Some(PathSearch::new(graph).find_path(origin, destination))
    }

    /// Cached result, or queue the query and return `None`.
    pub fn find_or_enqueue(
        &mut self,
        origin: LocationId,
        destination: LocationId,
    ) -> Option<&PathResult> {
        if !self.knows(origin) || !self.knows(destination) {
            return None;
        }
        let map = self.map.as_mut()?;
        let key = PathKey::new(origin, destination);
        if map.paths.is_cached(&key) {
            return map.paths.get_cached(&key);
        }
        map.paths.enqueue_if_uncached(origin, destination);
        None
    }

    pub fn is_cached(&self, key: &PathKey) -> bool {
        self.map
            .as_ref()
            .is_some_and(|map| map.paths.is_cached(key))
    }

    pub fn get_cached(&self, key: &PathKey) -> Option<&PathResult> {
        self.map.as_ref()?.paths.get_cached(key)
    }

    /// Jump count of a cached, reachable route.
    pub fn jumps_between(&self, origin: LocationId, destination: LocationId) -> Option<u32> {
        self.get_cached(&PathKey::new(origin, destination))
            .filter(|path| !path.is_unreachable())
            .map(|path| path.total_jumps)
    }

    /// Consumers must defer cache-dependent work while this is `true`.
    pub fn is_processing_paths(&self) -> bool {
        self.map
            .as_ref()
            .is_some_and(|map| map.paths.is_processing_paths())
    }

    /// Pathfinding tick.
    pub fn pump_path_queue(&mut self) {
        if let Some(map) = self.map.as_mut() {
            map.paths.pump_once();
        }
    }

    /// Resolve every queued request, blocking on the worker.
    pub fn drain_path_queue(&mut self) {
        if let Some(map) = self.map.as_mut() {
            map.paths.drain_blocking();
        }
    }

    pub fn set_blocked(&self, id: LocationId, blocked: bool) {
        if let Some(graph) = self.graph() {
            graph.set_blocked(id, blocked);
        }
    }

    // -- alerts ----------------------------------------------------------------------

    pub fn add_alert(&mut self, id: LocationId) -> AlertOutcome {
        self.add_alert_at(id, Utc::now())
    }

    /// Record an intel report for `id` at `now`.
    ///
    /// A newly alerting location clears all highlights and queues the route from home.
    pub fn add_alert_at(&mut self, id: LocationId, now: DateTime<Utc>) -> AlertOutcome {
        if !self.knows(id) {
            tracing::warn!(%id, "Ignoring alert for unknown location");
            return AlertOutcome::default();
        }

        let outcome = self.ledger.add_alert(id, now);
        if outcome.started {
            self.highlights.clear();
            if let Some(home) = self.home {
                self.request(home, id);
            }
        }
        if !outcome.evicted.is_empty() {
            tracing::debug!(evicted = ?outcome.evicted, "Alert capacity reached");
        }
        self.highlights.mark_stale();
        outcome
    }

    pub fn remove_expired_alerts(&mut self) -> Vec<LocationId> {
        self.remove_expired_alerts_at(Utc::now())
    }

    pub fn remove_expired_alerts_at(&mut self, now: DateTime<Utc>) -> Vec<LocationId> {
        self.ledger.remove_expired_alerts(now)
    }

    pub fn get_stats(&self, id: LocationId) -> Option<&LocationStat> {
        self.ledger.get_stats(id)
    }

    pub fn set_max_alerts(&mut self, max_alerts: usize) -> Vec<LocationId> {
        self.ledger.set_max_alerts(max_alerts)
    }

    pub fn set_max_alert_age(&mut self, minutes: u32) {
        self.ledger.set_max_alert_age(minutes);
    }

    // -- highlights ------------------------------------------------------------------

    pub fn add_highlight(&mut self, id: LocationId, flash: bool) -> bool {
        if !self.knows(id) {
            return false;
        }
        let alerting = self.ledger.is_alerting(id);
        self.highlights.add_highlight(id, flash, alerting)
    }

    pub fn remove_highlight(&mut self, id: LocationId) -> bool {
        self.highlights.remove_highlight(id)
    }

    /// Hovered locations are highlighted; the previous hover fades unless pinned.
    pub fn set_hover(&mut self, id: Option<LocationId>) {
        let id = id.filter(|&id| self.knows(id));
        let alerting = id.is_some_and(|id| self.ledger.is_alerting(id));
        self.highlights.set_hover(id, alerting);
    }

    pub fn pin(&mut self, id: LocationId) -> bool {
        if !self.knows(id) {
            return false;
        }
        let alerting = self.ledger.is_alerting(id);
        self.highlights.pin(id, alerting)
    }

    pub fn unpin(&mut self, id: LocationId) -> bool {
        self.highlights.unpin(id)
    }

    pub fn rebuild_summary_if_stale(&mut self) -> &HighlightSummary {
        self.highlights.rebuild_if_stale(&self.ledger)
    }

    /// Animation tick: ages alert and highlight markers and drops finished ones.
    pub fn advance_animations(&mut self) -> TickReport {
        let finished_alerts = self.ledger.advance_tick();
        let finished_highlights = self.highlights.advance_tick();
        self.highlights.restore_pinned(&self.ledger);
        if !self.ledger.alerting().is_empty() || !finished_alerts.is_empty() {
            self.highlights.mark_stale();
        }

        TickReport {
            active: !self.ledger.alerting().is_empty() || !self.highlights.highlighted().is_empty(),
            finished_alerts,
            finished_highlights,
        }
    }

    // -- anchors ---------------------------------------------------------------------

    /// Make `id` the home system, re-seeding the green collection and queueing routes
    /// from home to every red entry and from the tracked character to home.
    pub fn set_home(&mut self, id: LocationId) {
        if !self.knows(id) {
            tracing::warn!(%id, "Ignoring unknown home system");
            return;
        }
        self.clear_home();
        self.home = Some(id);
        self.ledger.add_home_marker(id);

        let red: Vec<LocationId> = self.ledger.red().collect();
        for target in red {
            self.request(id, target);
        }
        if let Some(character) = self.character {
            self.request(character, id);
        }
        tracing::info!(home = %id, "Home system set");
    }

    pub fn clear_home(&mut self) {
        self.home = None;
        self.ledger.clear_home_markers();
    }

    /// Track the character at `id`, queueing routes from it to every red entry and home.
    pub fn set_character_location(&mut self, id: LocationId) {
        if !self.knows(id) {
            tracing::warn!(%id, "Ignoring unknown character location");
            return;
        }
        self.character = Some(id);

        let red: Vec<LocationId> = self.ledger.red().collect();
        for target in red {
            self.request(id, target);
        }
        if let Some(home) = self.home {
            self.request(id, home);
        }
    }

    pub fn clear_character_location(&mut self) {
        self.character = None;
    }

    // -- triggers --------------------------------------------------------------------

    /// Check `trigger` against intel reported at `target`.
    ///
    /// `characters` maps tracked character names to their current locations. Routes the
    /// trigger needs but the cache lacks are queued and reported as
    /// [`TriggerCheck::Pending`].
    pub fn evaluate_trigger(
        &mut self,
        trigger: &RangeTrigger,
        target: LocationId,
        characters: &BTreeMap<String, LocationId>,
    ) -> TriggerCheck {
        if !trigger.enabled {
            return TriggerCheck::NotFired;
        }

        let anchors: Vec<LocationId> = match &trigger.anchor {
            RangeAnchor::Home => self.home.into_iter().collect(),
            RangeAnchor::System { name } => self
                .graph()
                .and_then(|graph| graph.find_by_name(name))
                .into_iter()
                .collect(),
            RangeAnchor::Character { name } => characters.get(name).copied().into_iter().collect(),
            RangeAnchor::AnyCharacter => characters
                .values()
                .copied()
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect(),
        };
        if anchors.is_empty() {
            return TriggerCheck::Unresolved;
        }

        let mut pending = false;
        for from in anchors {
            // Same system: zero jumps, no route lookup needed.
            if from == target {
                if trigger.matches(0) {
                    return TriggerCheck::Fired { from, jumps: 0 };
                }
                continue;
            }
            let key = PathKey::new(from, target);
            match self.get_cached(&key) {
                Some(path) if path.is_unreachable() => {}
                Some(path) => {
                    if trigger.matches(path.total_jumps) {
                        return TriggerCheck::Fired {
                            from,
                            jumps: path.total_jumps,
                        };
                    }
                }
                None => {
                    self.request(from, target);
                    pending = true;
                }
            }
        }

        if pending {
            TriggerCheck::Pending
        } else {
            TriggerCheck::NotFired
        }
    }
}
