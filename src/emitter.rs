//! Spawn triggers. Each one turns an outside signal into a whole number of
//! particles; the engine does the spawning.

use std::collections::HashSet;

use crate::config::ScrollConfig;

/// Converts scroll travel into particles, carrying the fractional remainder
/// between events so the long-run rate does not depend on event granularity.
#[derive(Clone, Debug)]
pub struct ScrollEmitter {
    config: ScrollConfig,
    last_scroll: f32,
    budget: f32,
}

impl ScrollEmitter {
    pub fn new(config: ScrollConfig, initial_scroll: f32) -> Self {
        Self { config, last_scroll: initial_scroll, budget: 0.0 }
    }

    /// Feed the new scroll offset; returns how many particles to spawn now.
    pub fn accumulate(&mut self, scroll_y: f32) -> usize {
        let delta = (scroll_y - self.last_scroll).abs();
        self.last_scroll = scroll_y;

        let baseline = if scroll_y > self.config.threshold {
            self.config.baseline_scrolled
        } else {
            self.config.baseline_top
        };
        self.budget += delta * self.config.rate + baseline;

        let whole = self.budget.floor();
        if whole < 1.0 {
            return 0;
        }
        self.budget -= whole;
        whole as usize
    }

    pub fn budget(&self) -> f32 {
        self.budget
    }
}

/// Periodic burst schedule driven by frame time. Cancelling is permanent.
#[derive(Clone, Debug)]
pub struct BurstTimer {
    interval_ms: f32,
    elapsed_ms: f32,
    cancelled: bool,
}

impl BurstTimer {
    pub fn new(interval_ms: f32) -> Self {
        Self { interval_ms: interval_ms.max(1.0), elapsed_ms: 0.0, cancelled: false }
    }

    /// Returns the number of intervals that completed during `dt_ms`.
    pub fn advance(&mut self, dt_ms: f32) -> u32 {
        if self.cancelled || dt_ms <= 0.0 {
            return 0;
        }
        self.elapsed_ms += dt_ms;
        let fired = (self.elapsed_ms / self.interval_ms).floor();
        self.elapsed_ms -= fired * self.interval_ms;
        fired as u32
    }

    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

/// One-shot visibility triggers, one per watched section.
#[derive(Clone, Debug)]
pub struct SectionWatcher {
    threshold: f32,
    watched: HashSet<String>,
}

impl SectionWatcher {
    pub fn new(threshold: f32) -> Self {
        Self { threshold, watched: HashSet::new() }
    }

    pub fn watch(&mut self, id: impl Into<String>) {
        self.watched.insert(id.into());
    }

    /// True exactly once: the first time `id` is at least `threshold` visible.
    /// The section is then no longer watched.
    pub fn notify(&mut self, id: &str, visible_fraction: f32) -> bool {
        if visible_fraction < self.threshold {
            return false;
        }
        self.watched.remove(id)
    }

    pub fn is_watching(&self, id: &str) -> bool {
        self.watched.contains(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scroll_config() -> ScrollConfig {
        ScrollConfig { rate: 0.035, baseline_top: 0.0, baseline_scrolled: 0.0, threshold: 120.0 }
    }

    #[test]
    fn scroll_budget_carries_fraction() {
        let mut emitter = ScrollEmitter::new(scroll_config(), 0.0);
        // 20px * 0.035 = 0.7, nothing yet
        assert_eq!(emitter.accumulate(20.0), 0);
        // another 20px brings it to 1.4
        assert_eq!(emitter.accumulate(40.0), 1);
        assert!((emitter.budget() - 0.4).abs() < 1e-4);
    }

    #[test]
    fn scroll_direction_does_not_matter() {
        let mut emitter = ScrollEmitter::new(scroll_config(), 1000.0);
        assert_eq!(emitter.accumulate(0.0), 35);
    }

    #[test]
    fn many_small_scrolls_match_one_large() {
        let mut small = ScrollEmitter::new(scroll_config(), 0.0);
        let mut total = 0;
        let mut y = 0.0;
        for _ in 0..500 {
            y += 7.0;
            total += small.accumulate(y);
        }
        let mut large = ScrollEmitter::new(scroll_config(), 0.0);
        let once = large.accumulate(3500.0);
        assert!((total as i64 - once as i64).abs() <= 1, "{total} vs {once}");
    }

    #[test]
    fn baseline_rises_past_threshold() {
        let config = ScrollConfig { rate: 0.0, baseline_top: 0.1, baseline_scrolled: 0.5, threshold: 120.0 };
        let mut emitter = ScrollEmitter::new(config, 0.0);
        let near_top: usize = (0..10).map(|i| emitter.accumulate(i as f32)).sum();
        let mut emitter = ScrollEmitter::new(
            ScrollConfig { rate: 0.0, baseline_top: 0.1, baseline_scrolled: 0.5, threshold: 120.0 },
            500.0,
        );
        let scrolled: usize = (0..10).map(|i| emitter.accumulate(500.0 + i as f32)).sum();
        assert!(scrolled > near_top);
    }

    #[test]
    fn burst_timer_fires_per_interval() {
        let mut timer = BurstTimer::new(1000.0);
        assert_eq!(timer.advance(600.0), 0);
        assert_eq!(timer.advance(600.0), 1);
        assert_eq!(timer.advance(2500.0), 2);
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let mut timer = BurstTimer::new(100.0);
        timer.cancel();
        assert!(timer.is_cancelled());
        assert_eq!(timer.advance(10_000.0), 0);
    }

    #[test]
    fn section_fires_once() {
        let mut watcher = SectionWatcher::new(0.35);
        watcher.watch("about");
        assert!(!watcher.notify("about", 0.2));
        assert!(watcher.notify("about", 0.5));
        assert!(!watcher.notify("about", 0.0));
        assert!(!watcher.notify("about", 0.9));
        assert!(!watcher.is_watching("about"));
    }

    #[test]
    fn unknown_sections_are_ignored() {
        let mut watcher = SectionWatcher::new(0.35);
        assert!(!watcher.notify("contact", 1.0));
    }
}
