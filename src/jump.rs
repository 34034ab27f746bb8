// "Jump to place": center the map on a marker, then open its popup once
use std::time::{Duration, Instant};

use crate::dataset::PlaceId;

/// Wait after an animation-end signal before trying to open the popup.
pub const SETTLE_DELAY: Duration = Duration::from_millis(200);
/// Last attempt if no animation-end signal shows up.
pub const FALLBACK_DELAY: Duration = Duration::from_millis(500);

/// The part of the map widget the jump needs.
pub trait MapSurface {
    fn set_view(&mut self, lat: f64, lng: f64, zoom: f64);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationEnd {
    Move,
    Zoom,
}

impl AnimationEnd {
    fn slot(self) -> usize {
        match self {
            AnimationEnd::Move => 0,
            AnimationEnd::Zoom => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpPhase {
    Pending,
    Opened,
    Abandoned,
}

#[derive(Debug, Clone)]
pub struct Jump {
    target: PlaceId,
    phase: JumpPhase,
    attempts: Vec<Instant>,
    fallback_at: Instant,
    fallback_fired: bool,
    // each signal is only listened to once per jump
    signals_seen: [bool; 2],
}

impl Jump {
    pub fn start(target: PlaceId, now: Instant) -> Self {
        Self {
            target,
            phase: JumpPhase::Pending,
            attempts: Vec::new(),
            fallback_at: now + FALLBACK_DELAY,
            fallback_fired: false,
            signals_seen: [false; 2],
        }
    }

    pub fn target(&self) -> &PlaceId {
        &self.target
    }

    pub fn phase(&self) -> JumpPhase {
        self.phase
    }

    pub fn on_animation_end(&mut self, signal: AnimationEnd, now: Instant) {
        if self.phase != JumpPhase::Pending {
            return;
        }
        let seen = &mut self.signals_seen[signal.slot()];
        if !*seen {
            *seen = true;
            self.attempts.push(now + SETTLE_DELAY);
        }
    }

    /// Runs the attempts that are due. `on_map` reports whether the target
    /// marker is currently attached. Returns the target at most once, on the
    /// transition to `Opened`.
    pub fn poll(&mut self, now: Instant, on_map: impl Fn(&PlaceId) -> bool) -> Option<PlaceId> {
        if self.phase != JumpPhase::Pending {
            return None;
        }

        let before = self.attempts.len();
        self.attempts.retain(|at| *at > now);
        let mut due = before - self.attempts.len();
        if !self.fallback_fired && self.fallback_at <= now {
            self.fallback_fired = true;
            due += 1;
        }

        if due > 0 && on_map(&self.target) {
            self.phase = JumpPhase::Opened;
            return Some(self.target.clone());
        }
        if self.fallback_fired && self.attempts.is_empty() {
            log::debug!("jump to '{}' abandoned, marker never reached the map", self.target);
            self.phase = JumpPhase::Abandoned;
        }
        None
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        if self.phase != JumpPhase::Pending {
            return None;
        }
        let fallback = (!self.fallback_fired).then_some(self.fallback_at);
        self.attempts.iter().copied().chain(fallback).min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id() -> PlaceId {
        PlaceId::from("marly")
    }

    #[test]
    fn test_opens_once_after_move_end() {
        let t0 = Instant::now();
        let mut jump = Jump::start(id(), t0);
        jump.on_animation_end(AnimationEnd::Move, t0);
        jump.on_animation_end(AnimationEnd::Zoom, t0 + Duration::from_millis(10));

        assert_eq!(jump.poll(t0 + Duration::from_millis(100), |_| true), None);
        assert_eq!(jump.poll(t0 + Duration::from_millis(200), |_| true), Some(id()));
        assert_eq!(jump.phase(), JumpPhase::Opened);
        // zoom attempt and fallback are now no-ops
        assert_eq!(jump.poll(t0 + Duration::from_millis(600), |_| true), None);
        assert_eq!(jump.next_deadline(), None);
    }

    #[test]
    fn test_fallback_without_signals() {
        let t0 = Instant::now();
        let mut jump = Jump::start(id(), t0);
        assert_eq!(jump.next_deadline(), Some(t0 + FALLBACK_DELAY));
        assert_eq!(jump.poll(t0 + Duration::from_millis(499), |_| true), None);
        assert_eq!(jump.poll(t0 + FALLBACK_DELAY, |_| true), Some(id()));
    }

    #[test]
    fn test_detached_marker_retries_then_abandons() {
        let t0 = Instant::now();
        let mut jump = Jump::start(id(), t0);
        jump.on_animation_end(AnimationEnd::Move, t0);
        jump.on_animation_end(AnimationEnd::Move, t0 + Duration::from_millis(50));

        assert_eq!(jump.poll(t0 + Duration::from_millis(250), |_| false), None);
        assert_eq!(jump.phase(), JumpPhase::Pending);
        jump.on_animation_end(AnimationEnd::Zoom, t0 + Duration::from_millis(400));
        assert_eq!(jump.poll(t0 + Duration::from_millis(500), |_| false), None);
        // zoom attempt still scheduled at 600ms
        assert_eq!(jump.phase(), JumpPhase::Pending);
        assert_eq!(jump.poll(t0 + Duration::from_millis(600), |_| false), None);
        assert_eq!(jump.phase(), JumpPhase::Abandoned);
    }

    #[test]
    fn test_signal_counted_once() {
        let t0 = Instant::now();
        let mut jump = Jump::start(id(), t0);
        jump.on_animation_end(AnimationEnd::Move, t0);
        jump.on_animation_end(AnimationEnd::Move, t0);
        assert_eq!(jump.attempts.len(), 1);
    }
}
