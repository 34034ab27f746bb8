// Timeline position, playback loop and display mode
use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::dates::format_timeline_date;
use crate::visibility::TimelineFilter;

pub const DEFAULT_BASE_INTERVAL: Duration = Duration::from_millis(1200);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Speed {
    #[default]
    X1,
    X5,
    X10,
}

impl Speed {
    pub const ALL: [Speed; 3] = [Speed::X1, Speed::X5, Speed::X10];

    pub fn factor(self) -> u32 {
        match self {
            Speed::X1 => 1,
            Speed::X5 => 5,
            Speed::X10 => 10,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Speed::X1 => "x1",
            Speed::X5 => "x5",
            Speed::X10 => "x10",
        }
    }
}

impl TryFrom<u32> for Speed {
    type Error = String;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Speed::ALL
            .into_iter()
            .find(|s| s.factor() == value)
            .ok_or_else(|| format!("Invalid speed {}. Use 1, 5 or 10.", value))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Playback {
    Stopped,
    Playing { last_advance: Instant },
}

pub struct TimelineController {
    dates: Vec<Date>,
    index: usize,
    enabled: bool,
    history: bool,
    speed: Speed,
    playback: Playback,
    base_interval: Duration,
}

impl TimelineController {
    pub fn new(dates: Vec<Date>, base_interval: Duration) -> Self {
        Self {
            dates,
            index: 0,
            enabled: false,
            history: false,
            speed: Speed::X1,
            playback: Playback::Stopped,
            base_interval,
        }
    }

    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn last_index(&self) -> usize {
        self.dates.len().saturating_sub(1)
    }

    pub fn current(&self) -> Option<Date> {
        self.dates.get(self.index).copied()
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn history(&self) -> bool {
        self.history
    }

    pub fn speed(&self) -> Speed {
        self.speed
    }

    pub fn is_playing(&self) -> bool {
        matches!(self.playback, Playback::Playing { .. })
    }

    pub fn interval(&self) -> Duration {
        self.base_interval / self.speed.factor()
    }

    /// Filter for the visibility engine, present only while the timeline is on.
    pub fn filter(&self) -> Option<TimelineFilter> {
        if !self.enabled {
            return None;
        }
        self.current().map(|current| TimelineFilter { current, history: self.history })
    }

    pub fn label(&self) -> String {
        self.current().map(format_timeline_date).unwrap_or_default()
    }

    /// Labels of the first and last date, for the slider scale.
    pub fn bounds_labels(&self) -> Option<(String, String)> {
        let first = self.dates.first()?;
        let last = self.dates.last()?;
        Some((format_timeline_date(*first), format_timeline_date(*last)))
    }

    /// Clamps into range. Returns false when there is no date to select.
    pub fn set_index(&mut self, index: usize) -> bool {
        if self.dates.is_empty() {
            return false;
        }
        self.index = index.min(self.last_index());
        true
    }

    /// Slider input: playback stops before the position moves.
    pub fn scrub(&mut self, index: usize) -> bool {
        self.pause();
        self.set_index(index)
    }

    /// Starts playback, rewinding first when sitting on the last date.
    /// Returns true if the position moved.
    pub fn play(&mut self, now: Instant) -> bool {
        if self.dates.is_empty() || self.is_playing() {
            return false;
        }
        let rewound = self.index >= self.last_index() && self.index != 0;
        if self.index >= self.last_index() {
            self.index = 0;
        }
        self.start(now);
        rewound
    }

    fn start(&mut self, now: Instant) {
        if self.is_playing() || self.dates.is_empty() {
            return;
        }
        log::debug!("timeline playing every {:?}", self.interval());
        self.playback = Playback::Playing { last_advance: now };
    }

    pub fn pause(&mut self) {
        self.playback = Playback::Stopped;
    }

    pub fn toggle_play(&mut self, now: Instant) -> bool {
        if self.is_playing() {
            self.pause();
            false
        } else {
            self.play(now)
        }
    }

    /// A running loop restarts at the new rate without losing its position.
    pub fn set_speed(&mut self, speed: Speed, now: Instant) {
        let was_playing = self.is_playing();
        if was_playing {
            self.pause();
        }
        self.speed = speed;
        if was_playing {
            self.start(now);
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.pause();
        }
    }

    pub fn set_history(&mut self, history: bool) {
        self.history = history;
    }

    /// Advances one date when the interval has elapsed. Reaching past the
    /// last date stops playback. Returns true if the position moved.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Playback::Playing { last_advance } = self.playback else {
            return false;
        };
        if now.saturating_duration_since(last_advance) < self.interval() {
            return false;
        }
        if self.index >= self.last_index() {
            self.pause();
            return false;
        }
        self.index += 1;
        self.playback = Playback::Playing { last_advance: now };
        true
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        match self.playback {
            Playback::Playing { last_advance } => Some(last_advance + self.interval()),
            Playback::Stopped => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::civil::date;

    fn three_days() -> TimelineController {
        let dates = vec![date(1786, 1, 1), date(1786, 1, 2), date(1786, 1, 10)];
        let mut tl = TimelineController::new(dates, DEFAULT_BASE_INTERVAL);
        tl.set_enabled(true);
        tl
    }

    #[test]
    fn test_set_index_clamps() {
        let mut tl = three_days();
        assert!(tl.set_index(99));
        assert_eq!(tl.index(), 2);
        assert_eq!(tl.label(), "10 janvier 1786");
        assert!(tl.set_index(0));
        assert_eq!(tl.current(), Some(date(1786, 1, 1)));
    }

    #[test]
    fn test_empty_timeline_is_noop() {
        let mut tl = TimelineController::new(Vec::new(), DEFAULT_BASE_INTERVAL);
        tl.set_enabled(true);
        assert!(!tl.set_index(3));
        assert!(!tl.play(Instant::now()));
        assert!(!tl.is_playing());
        assert_eq!(tl.filter(), None);
        assert_eq!(tl.label(), "");
        assert_eq!(tl.bounds_labels(), None);
    }

    #[test]
    fn test_play_ticks_to_end_then_stops() {
        let mut tl = three_days();
        let t0 = Instant::now();
        tl.play(t0);
        assert!(tl.is_playing());

        assert!(!tl.tick(t0 + Duration::from_millis(100)));
        assert!(tl.tick(t0 + Duration::from_millis(1200)));
        assert_eq!(tl.index(), 1);
        assert!(tl.tick(t0 + Duration::from_millis(2400)));
        assert_eq!(tl.index(), 2);
        assert!(!tl.tick(t0 + Duration::from_millis(3600)));
        assert!(!tl.is_playing());
        assert_eq!(tl.index(), 2);
    }

    #[test]
    fn test_play_from_end_rewinds() {
        let mut tl = three_days();
        tl.set_index(2);
        assert!(tl.play(Instant::now()));
        assert_eq!(tl.index(), 0);
    }

    #[test]
    fn test_play_twice_keeps_single_loop() {
        let mut tl = three_days();
        let t0 = Instant::now();
        tl.play(t0);
        assert!(!tl.play(t0 + Duration::from_millis(500)));
        assert_eq!(tl.playback, Playback::Playing { last_advance: t0 });
    }

    #[test]
    fn test_speed_change_keeps_position() {
        let mut tl = three_days();
        let t0 = Instant::now();
        tl.play(t0);
        tl.tick(t0 + Duration::from_millis(1200));

        let t1 = t0 + Duration::from_millis(1300);
        tl.set_speed(Speed::X10, t1);
        assert!(tl.is_playing());
        assert_eq!(tl.index(), 1);
        assert_eq!(tl.interval(), Duration::from_millis(120));
        assert_eq!(tl.next_deadline(), Some(t1 + Duration::from_millis(120)));

        tl.pause();
        tl.set_speed(Speed::X5, t1);
        assert!(!tl.is_playing());
        assert_eq!(tl.speed(), Speed::X5);
    }

    #[test]
    fn test_speed_change_on_last_date_does_not_rewind() {
        let mut tl = three_days();
        let t0 = Instant::now();
        tl.play(t0);
        tl.set_index(2);
        tl.set_speed(Speed::X5, t0);
        assert_eq!(tl.index(), 2);
    }

    #[test]
    fn test_disable_stops_but_keeps_index() {
        let mut tl = three_days();
        tl.set_index(1);
        tl.play(Instant::now());
        tl.set_enabled(false);
        assert!(!tl.is_playing());
        assert_eq!(tl.index(), 1);
        assert_eq!(tl.filter(), None);
    }

    #[test]
    fn test_scrub_pauses() {
        let mut tl = three_days();
        tl.play(Instant::now());
        tl.scrub(2);
        assert!(!tl.is_playing());
        assert_eq!(tl.index(), 2);
    }

    #[test]
    fn test_speed_from_factor() {
        assert_eq!(Speed::try_from(5), Ok(Speed::X5));
        assert!(Speed::try_from(2).is_err());
    }
}
