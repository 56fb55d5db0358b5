//! Transient hover/pin emphasis and the bounded marker summary handed to the renderer.

use std::collections::{BTreeSet, HashMap};

use crate::animation::{Animation, MarkerAnimation, Rgba};
use crate::ledger::AlertLedger;
use crate::LocationId;

/// Number of marker slots the renderer uploads per frame.
pub const SUMMARY_SLOTS: usize = 10;

/// Id written into unused summary slots.
pub const EMPTY_SLOT: i32 = -1;

/// Fixed-size marker arrays, laid out the way the shader uniforms expect them.
#[derive(Debug, Clone, PartialEq)]
pub struct HighlightSummary {
    pub ids: [i32; SUMMARY_SLOTS],
    pub sizes: [f32; SUMMARY_SLOTS],
    pub colors: [Rgba; SUMMARY_SLOTS],
}

impl Default for HighlightSummary {
    fn default() -> Self {
        Self {
            ids: [EMPTY_SLOT; SUMMARY_SLOTS],
            sizes: [0.0; SUMMARY_SLOTS],
            colors: [Rgba::WHITE; SUMMARY_SLOTS],
        }
    }
}

impl HighlightSummary {
    /// Occupied slots in order.
    pub fn entries(&self) -> impl Iterator<Item = (LocationId, f32, Rgba)> + '_ {
        (0..SUMMARY_SLOTS)
            .take_while(|&i| self.ids[i] != EMPTY_SLOT)
            .map(|i| (LocationId(self.ids[i] as u32), self.sizes[i], self.colors[i]))
    }

    pub fn len(&self) -> usize {
        self.entries().count()
    }

    pub fn is_empty(&self) -> bool {
        self.ids[0] == EMPTY_SLOT
    }

    fn push(&mut self, slot: usize, id: LocationId, anim: Option<&MarkerAnimation>) {
        self.ids[slot] = id.0 as i32;
        self.sizes[slot] = anim.map(|a| a.draw_size()).unwrap_or(0.0);
        self.colors[slot] = anim.map(|a| a.draw_color()).unwrap_or(Rgba::WHITE);
    }
}

#[derive(Debug, Default)]
pub struct HighlightSelector {
    /// Highlighted locations in insertion order.
    highlighted: Vec<LocationId>,
    animations: HashMap<LocationId, MarkerAnimation>,
    hover: Option<LocationId>,
    pinned: BTreeSet<LocationId>,
    summary: HighlightSummary,
    stale: bool,
}

impl HighlightSelector {
    pub fn new() -> Self {
        Self {
            stale: true,
            ..Self::default()
        }
    }

    /// Start highlighting `id`. Alerting locations cannot be highlighted.
    pub fn add_highlight(&mut self, id: LocationId, flash: bool, alerting: bool) -> bool {
        if alerting || self.animations.contains_key(&id) {
            return false;
        }
        self.highlighted.push(id);
        self.animations.insert(id, MarkerAnimation::highlight(flash));
        self.stale = true;
        true
    }

    /// Let the highlight fade out; it is removed once the fade completes. Pinned
    /// locations keep their highlight until unpinned.
    pub fn remove_highlight(&mut self, id: LocationId) -> bool {
        if self.pinned.contains(&id) {
            return false;
        }
        let Some(anim) = self.animations.get_mut(&id) else {
            return false;
        };
        anim.start_shrinking();
        self.stale = true;
        true
    }

    /// Drop every unpinned highlight immediately (an alert takes visual precedence).
    pub fn clear(&mut self) {
        let pinned = &self.pinned;
        let animations = &mut self.animations;
        let before = self.highlighted.len();

        self.highlighted.retain(|id| {
            let keep = pinned.contains(id);
            if !keep {
                animations.remove(id);
            }
            keep
        });

        if self.highlighted.len() != before {
            self.stale = true;
        }
    }

    /// Highlight `id` and keep it at full size, reviving a fading or flashing marker.
    fn show(&mut self, id: LocationId, alerting: bool) -> bool {
        if alerting {
            return false;
        }
        match self.animations.get_mut(&id) {
            Some(anim) => anim.hold(),
            None => {
                self.highlighted.push(id);
                self.animations.insert(id, MarkerAnimation::highlight(false));
            }
        }
        self.stale = true;
        true
    }

    pub fn advance_tick(&mut self) -> Vec<LocationId> {
        let animations = &mut self.animations;
        let mut finished = Vec::new();

        self.highlighted.retain(|id| {
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

        if !self.highlighted.is_empty() || !finished.is_empty() {
            self.stale = true;
        }
        finished
    }

    pub fn is_highlighted(&self, id: LocationId) -> bool {
        self.animations.contains_key(&id)
    }

    pub fn highlighted(&self) -> &[LocationId] {
        &self.highlighted
    }

    pub fn animation(&self, id: LocationId) -> Option<&MarkerAnimation> {
        self.animations.get(&id)
    }

    /// Move the hover to `id`. The previous location fades unless pinned; the new one
    /// is highlighted unless `alerting`.
    pub fn set_hover(&mut self, id: Option<LocationId>, alerting: bool) {
        if self.hover == id {
            return;
        }
        if let Some(previous) = self.hover.take() {
            self.remove_highlight(previous);
        }
        self.hover = id;
        if let Some(id) = id {
            self.show(id, alerting);
        }
    }

    pub fn hover(&self) -> Option<LocationId> {
        self.hover
    }

    /// Keep `id` highlighted until unpinned. Returns `false` if it was already pinned.
    pub fn pin(&mut self, id: LocationId, alerting: bool) -> bool {
        let added = self.pinned.insert(id);
        self.show(id, alerting);
        added
    }

    /// Release a pin; the highlight fades unless the location is still hovered.
    pub fn unpin(&mut self, id: LocationId) -> bool {
        if !self.pinned.remove(&id) {
            return false;
        }
        if self.hover != Some(id) {
            self.remove_highlight(id);
        }
        true
    }

    /// Re-highlight pinned locations that lost their marker (for example while they
    /// were alerting).
    pub fn restore_pinned(&mut self, ledger: &AlertLedger) {
        let missing: Vec<LocationId> = self
            .pinned
            .iter()
            .copied()
            .filter(|&id| !self.animations.contains_key(&id) && !ledger.is_alerting(id))
            .collect();
        for id in missing {
            self.show(id, false);
        }
    }

    pub fn is_pinned(&self, id: LocationId) -> bool {
        self.pinned.contains(&id)
    }

    pub fn pinned(&self) -> impl Iterator<Item = LocationId> + '_ {
        self.pinned.iter().copied()
    }

    pub fn mark_stale(&mut self) {
        self.stale = true;
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Rebuild the marker summary if anything changed since the last build.
    pub fn rebuild_if_stale(&mut self, ledger: &AlertLedger) -> &HighlightSummary {
        if self.stale {
            self.summary = self.build_summary(ledger);
            self.stale = false;
        }
        &self.summary
    }

    /// Pick at most [`SUMMARY_SLOTS`] locations to emphasize.
    ///
    /// The most recent alerting locations come first (relative order kept), then
    /// highlighted locations that are not alerting, in insertion order. Remaining slots
    /// hold [`EMPTY_SLOT`].
    pub fn build_summary(&self, ledger: &AlertLedger) -> HighlightSummary {
        let mut summary = HighlightSummary::default();
        let alerting = ledger.alerting();
        let skip = alerting.len().saturating_sub(SUMMARY_SLOTS);

        let mut slot = 0;
        for &id in &alerting[skip..] {
            summary.push(slot, id, ledger.animation(id));
            slot += 1;
        }

        for &id in &self.highlighted {
            if slot == SUMMARY_SLOTS {
                break;
            }
            if ledger.is_alerting(id) {
                continue;
            }
            summary.push(slot, id, self.animations.get(&id));
            slot += 1;
        }

        summary
    }
}
