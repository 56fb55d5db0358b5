//! Per-location marker animations.
//!
//! Each alerting or highlighted location owns a small tick-count state machine. The
//! owning collection calls [`Animation::advance_tick`] once per animation tick and drops
//! the location when it reports `true`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba(pub [f32; 4]);

impl Rgba {
    pub const WHITE: Self = Self([1.0, 1.0, 1.0, 1.0]);
    pub const ALERT: Self = Self([1.0, 0.15, 0.1, 1.0]);
    pub const HIGHLIGHT: Self = Self([1.0, 0.85, 0.25, 1.0]);
    pub const FLASH: Self = Self([0.35, 0.8, 1.0, 1.0]);
}

pub trait Animation {
    /// Advance one tick. Returns `true` once the animation has finished and the
    /// location can be cleared.
    fn advance_tick(&mut self) -> bool;

    fn draw_size(&self) -> f32;

    fn draw_color(&self) -> Rgba;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationState {
    Growing,
    /// Full size. Alerts leave after a fixed hold; highlights stay until released.
    Holding,
    Flashing,
    Shrinking,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MarkerKind {
    Alert,
    Highlight { flash: bool },
}

pub const GROW_TICKS: u32 = 8;
pub const SHRINK_TICKS: u32 = 8;
pub const ALERT_HOLD_TICKS: u32 = 90;
pub const FLASH_TICKS: u32 = 48;
const FLASH_PERIOD: u32 = 6;

const ALERT_PEAK_SIZE: f32 = 24.0;
const HIGHLIGHT_PEAK_SIZE: f32 = 16.0;

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerAnimation {
    kind: MarkerKind,
    state: AnimationState,
    tick: u32,
    size: f32,
}

impl MarkerAnimation {
    pub fn alert() -> Self {
        Self::start(MarkerKind::Alert)
    }

    /// A `flash` highlight pulses for a while and then fades on its own; a plain one
    /// holds until [`start_shrinking`](Self::start_shrinking) is called.
    pub fn highlight(flash: bool) -> Self {
        Self::start(MarkerKind::Highlight { flash })
    }

    fn start(kind: MarkerKind) -> Self {
        Self {
            kind,
            state: AnimationState::Growing,
            tick: 0,
            size: 0.0,
        }
    }

    pub fn state(&self) -> AnimationState {
        self.state
    }

    pub fn is_alert(&self) -> bool {
        self.kind == MarkerKind::Alert
    }

    /// Fade out from the current size instead of disappearing abruptly.
    pub fn start_shrinking(&mut self) {
        if matches!(self.state, AnimationState::Shrinking | AnimationState::Finished) {
            return;
        }
        let remaining = (self.size / self.peak()).clamp(0.0, 1.0);
        self.tick = ((1.0 - remaining) * SHRINK_TICKS as f32) as u32;
        self.state = AnimationState::Shrinking;
    }

    /// Turn a highlight into a plain one that grows back from its current size and
    /// holds. Cancels a pending fade or flash. No effect on alerts.
    pub fn hold(&mut self) {
        if self.kind == MarkerKind::Alert {
            return;
        }
        if self.kind == (MarkerKind::Highlight { flash: false })
            && matches!(self.state, AnimationState::Growing | AnimationState::Holding)
        {
            return;
        }
        self.kind = MarkerKind::Highlight { flash: false };
        let reached = (self.size / self.peak()).clamp(0.0, 1.0);
        self.tick = (reached * GROW_TICKS as f32) as u32;
        self.state = AnimationState::Growing;
    }

    fn peak(&self) -> f32 {
        match self.kind {
            MarkerKind::Alert => ALERT_PEAK_SIZE,
            MarkerKind::Highlight { .. } => HIGHLIGHT_PEAK_SIZE,
        }
    }

    fn enter(&mut self, state: AnimationState) {
        self.state = state;
        self.tick = 0;
    }
}

impl Animation for MarkerAnimation {
    fn advance_tick(&mut self) -> bool {
        let peak = self.peak();
        match self.state {
            AnimationState::Growing => {
                self.tick += 1;
                self.size = peak * (self.tick as f32 / GROW_TICKS as f32).min(1.0);
                if self.tick >= GROW_TICKS {
                    let next = match self.kind {
                        MarkerKind::Highlight { flash: true } => AnimationState::Flashing,
                        _ => AnimationState::Holding,
                    };
                    self.enter(next);
                }
                false
            }
            AnimationState::Holding => {
                if self.kind == MarkerKind::Alert {
                    self.tick += 1;
                    if self.tick >= ALERT_HOLD_TICKS {
                        self.enter(AnimationState::Shrinking);
                    }
                }
                false
            }
            AnimationState::Flashing => {
                self.tick += 1;
                if self.tick >= FLASH_TICKS {
                    self.enter(AnimationState::Shrinking);
                }
                false
            }
            AnimationState::Shrinking => {
                self.tick += 1;
                let left = 1.0 - (self.tick as f32 / SHRINK_TICKS as f32).min(1.0);
                self.size = peak * left;
                if self.tick >= SHRINK_TICKS {
                    self.size = 0.0;
                    self.enter(AnimationState::Finished);
                    return true;
                }
                false
            }
            AnimationState::Finished => true,
        }
    }

    fn draw_size(&self) -> f32 {
        self.size
    }

    fn draw_color(&self) -> Rgba {
        match (self.kind, self.state) {
            (MarkerKind::Alert, _) => Rgba::ALERT,
            (MarkerKind::Highlight { .. }, AnimationState::Flashing) => {
                if (self.tick / FLASH_PERIOD) % 2 == 0 {
                    Rgba::FLASH
                } else {
                    Rgba::HIGHLIGHT
                }
            }
            (MarkerKind::Highlight { .. }, _) => Rgba::HIGHLIGHT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_until_done(anim: &mut MarkerAnimation, limit: u32) -> Option<u32> {
        (1..=limit).find(|_| anim.advance_tick())
    }

    #[test]
    fn hold_revives_a_fading_highlight() {
        let mut anim = MarkerAnimation::highlight(true);
        for _ in 0..GROW_TICKS {
            anim.advance_tick();
        }
        anim.start_shrinking();
        anim.advance_tick();
        let faded = anim.draw_size();
        assert!(faded < HIGHLIGHT_PEAK_SIZE);

        anim.hold();
        assert_eq!(anim.state(), AnimationState::Growing);
        assert!(run_until_done(&mut anim, 500).is_none(), "held highlight never finishes");
        assert_eq!(anim.state(), AnimationState::Holding);
        assert_eq!(anim.draw_size(), HIGHLIGHT_PEAK_SIZE);
    }

    #[test]
    fn hold_leaves_alerts_alone() {
        let mut anim = MarkerAnimation::alert();
        anim.hold();
        assert!(run_until_done(&mut anim, 1_000).is_some());
    }

    #[test]
    fn alert_grows_holds_and_expires() {
        let mut anim = MarkerAnimation::alert();
        for _ in 0..GROW_TICKS {
            assert!(!anim.advance_tick());
        }
        assert_eq!(anim.state(), AnimationState::Holding);
        assert_eq!(anim.draw_size(), ALERT_PEAK_SIZE);

        let done = run_until_done(&mut anim, 1_000).expect("alert finishes");
        assert_eq!(done, ALERT_HOLD_TICKS + SHRINK_TICKS);
        assert_eq!(anim.draw_size(), 0.0);
        assert!(anim.advance_tick());
    }

    #[test]
    fn plain_highlight_holds_until_released() {
        let mut anim = MarkerAnimation::highlight(false);
        assert_eq!(run_until_done(&mut anim, 500), None);
        assert_eq!(anim.state(), AnimationState::Holding);

        anim.start_shrinking();
        assert_eq!(run_until_done(&mut anim, 100), Some(SHRINK_TICKS));
    }

    #[test]
    fn flash_highlight_fades_on_its_own() {
        let mut anim = MarkerAnimation::highlight(true);
        let done = run_until_done(&mut anim, 1_000).expect("flash finishes");
        assert_eq!(done, GROW_TICKS + FLASH_TICKS + SHRINK_TICKS);
    }

    #[test]
    fn shrinking_mid_growth_keeps_current_size() {
        let mut anim = MarkerAnimation::highlight(false);
        anim.advance_tick();
        anim.advance_tick();
        let before = anim.draw_size();

        anim.start_shrinking();
        anim.advance_tick();
        assert!(anim.draw_size() < before);
        assert!(run_until_done(&mut anim, SHRINK_TICKS).is_some());
    }
}
