//! Score, level and combo tracking

use crate::timer::Countdown;

/// Session score totals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    /// Current score
    pub points: u64,
    /// Current level; recomputed from total lines
    pub level: u32,
    /// Total lines cleared
    pub lines: u32,
}

impl Score {
    pub fn new() -> Self {
        Self {
            points: 0,
            level: 1,
            lines: 0,
        }
    }

    /// Record a batch of cleared lines and recompute the level
    pub fn add_clear(&mut self, lines: u32, points: u64) {
        self.points += points;
        self.lines += lines;
        self.level = self.lines / 10 + 1;
    }
}

impl Default for Score {
    fn default() -> Self {
        Self::new()
    }
}

/// What a clearing lock did to the combo chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComboAdvance {
    Started,
    Continued,
}

/// The rolling combo chain
///
/// Every clearing lock restarts the window; chains extend while the window
/// is still running and lapse losslessly when it runs out. The damage
/// multiplier a clear enjoys is the one earned *before* that clear, so the
/// first clear of a chain is unboosted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Combo {
    count: u32,
    window: Countdown,
    window_ticks: u32,
    step: f64,
}

impl Combo {
    pub fn new(window_ticks: u32, step: f64) -> Self {
        Self {
            count: 0,
            window: Countdown::new(),
            window_ticks,
            step,
        }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    /// Damage multiplier derived from the chain length: 1 + step * count
    pub fn multiplier(&self) -> f64 {
        1.0 + self.step * f64::from(self.count)
    }

    /// Whether the continuation window is still open
    pub fn is_running(&self) -> bool {
        self.window.is_running()
    }

    pub fn window_remaining(&self) -> u32 {
        self.window.remaining()
    }

    /// Register a clearing lock: extend a running chain or start a new one,
    /// and reopen the window either way
    pub fn register_clear(&mut self) -> ComboAdvance {
        let advance = if self.window.is_running() {
            self.count += 1;
            ComboAdvance::Continued
        } else {
            self.count = 1;
            ComboAdvance::Started
        };
        self.window.start(self.window_ticks);
        advance
    }

    /// Advance the window one tick; returns true when a chain just lapsed
    pub fn tick(&mut self) -> bool {
        if self.window.advance() && self.count > 0 {
            self.count = 0;
            return true;
        }
        false
    }

    /// A non-clearing lock with no window open drops any leftover count
    pub fn settle_idle(&mut self) {
        if !self.window.is_running() {
            self.count = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_recomputed_from_lines() {
        let mut score = Score::new();
        assert_eq!(score.level, 1);
        score.add_clear(9, 900);
        assert_eq!(score.level, 1);
        score.add_clear(1, 100);
        assert_eq!(score.level, 2);
        score.add_clear(25, 2500);
        assert_eq!(score.lines, 35);
        assert_eq!(score.level, 4);
    }

    #[test]
    fn test_first_clear_is_unboosted() {
        let mut combo = Combo::new(240, 0.1);
        assert_eq!(combo.multiplier(), 1.0);
        assert_eq!(combo.register_clear(), ComboAdvance::Started);
        // The state multiplier now reflects the chain of one
        assert_eq!(combo.count(), 1);
        assert!((combo.multiplier() - 1.1).abs() < 1e-9);
    }

    #[test]
    fn test_chain_within_window() {
        let mut combo = Combo::new(240, 0.1);
        combo.register_clear();
        for _ in 0..239 {
            assert!(!combo.tick());
        }
        assert_eq!(combo.register_clear(), ComboAdvance::Continued);
        assert_eq!(combo.count(), 2);
        assert!((combo.multiplier() - 1.2).abs() < 1e-9);
    }

    #[test]
    fn test_lapse_resets_chain() {
        let mut combo = Combo::new(240, 0.1);
        combo.register_clear();
        let mut lapsed = false;
        for _ in 0..240 {
            lapsed |= combo.tick();
        }
        assert!(lapsed);
        assert_eq!(combo.count(), 0);
        assert_eq!(combo.multiplier(), 1.0);
        // The next clearing lock starts a fresh chain
        assert_eq!(combo.register_clear(), ComboAdvance::Started);
        assert_eq!(combo.count(), 1);
    }

    #[test]
    fn test_settle_idle_only_without_window() {
        let mut combo = Combo::new(240, 0.1);
        combo.register_clear();
        combo.settle_idle();
        // Window still open: chain survives a non-clearing lock
        assert_eq!(combo.count(), 1);
        for _ in 0..240 {
            combo.tick();
        }
        combo.settle_idle();
        assert_eq!(combo.count(), 0);
    }
}
