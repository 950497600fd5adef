//! Gameplay tuning
//!
//! Every tunable number in the core lives here as a named field so tests
//! can shrink windows and periods instead of ticking through real-time
//! values. `GameConfig::default()` is the shipping balance.

/// How fast pieces fall, in ticks per row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GravityCurve {
    /// Period at level 1
    pub base_period: u32,
    /// Ticks removed per level above 1
    pub per_level: u32,
    /// Fastest normal period
    pub min_period: u32,
    /// Ticks removed while the boss speed surge is active
    pub surge_cut: u32,
    /// Fastest period under a speed surge
    pub surge_min: u32,
}

impl GravityCurve {
    /// Gravity period for a level, with the boss speed surge applied
    pub fn period(&self, level: u32, surging: bool) -> u32 {
        let level_cut = self.per_level.saturating_mul(level.saturating_sub(1));
        let period = self.base_period.saturating_sub(level_cut).max(self.min_period);
        if surging {
            period.saturating_sub(self.surge_cut).max(self.surge_min)
        } else {
            period
        }
    }
}

/// Periods, durations and rates for the boss abilities, in ticks
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AbilityTuning {
    /// Hide-next meter fill per tick (meter runs 0-100)
    pub meter_fill_rate: f64,
    pub meter_max: f64,
    /// Flat meter loss per line-clear event
    pub meter_clear_penalty: f64,
    /// How long the next-piece preview stays hidden once the meter fires
    pub hide_duration: u32,
    pub heal_period: u32,
    pub speed_period: u32,
    pub speed_duration: u32,
    pub immune_period: u32,
    pub immune_duration: u32,
    /// Speed/immune duration on the final boss
    pub final_ability_duration: u32,
    /// Fraction of a cooldown period knocked off per line-clear event
    pub clear_reduction: f64,
    /// Fraction of each gauge the final boss's booster refills
    pub booster_refill: f64,
    /// Clear-reduction effectiveness while the final boss is resisting
    pub resisted_effectiveness: f64,
}

/// Per-boss capability record
///
/// Keyed by encounter index; branching on capabilities instead of on the
/// index keeps the update logic uniform across bosses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BossProfile {
    /// Health pool; None means unbounded (the terminal encounter)
    pub max_health: Option<u32>,
    /// Health removed per heal cycle; unused by the final boss
    pub heal_amount: u32,
    pub can_heal: bool,
    pub can_speed: bool,
    pub can_immune: bool,
    /// Final boss: heal becomes a booster and ability durations extend
    pub is_final: bool,
}

/// All gameplay tuning for one session
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    /// Visible playfield rows (width is fixed at 10)
    pub board_height: usize,
    pub gravity: GravityCurve,
    /// Ticks before an unextended combo lapses
    pub combo_window: u32,
    /// Multiplier gained per combo step
    pub combo_step: f64,
    /// Points for clearing 1-4 rows at once, before the level multiplier
    pub clear_scores: [u64; 4],
    /// Boss progress dealt for clearing 1-4 rows, before the combo multiplier
    pub clear_damage: [u32; 4],
    /// Ticks a defeated-boss transition lasts
    pub transition_ticks: u32,
    pub abilities: AbilityTuning,
    /// Escalating encounter schedule; the last entry is fought indefinitely
    pub bosses: Vec<BossProfile>,
    /// Health moved per debug adjustment command
    pub debug_health_step: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            board_height: 25,
            gravity: GravityCurve {
                base_period: 35,
                per_level: 3,
                min_period: 5,
                surge_cut: 15,
                surge_min: 2,
            },
            combo_window: 240,
            combo_step: 0.1,
            clear_scores: [100, 300, 500, 800],
            clear_damage: [10, 25, 40, 60],
            transition_ticks: 180,
            abilities: AbilityTuning {
                meter_fill_rate: 0.08,
                meter_max: 100.0,
                meter_clear_penalty: 20.0,
                hide_duration: 300,
                heal_period: 1800,
                speed_period: 1800,
                speed_duration: 600,
                immune_period: 1500,
                immune_duration: 480,
                final_ability_duration: 900,
                clear_reduction: 0.20,
                booster_refill: 0.20,
                resisted_effectiveness: 0.5,
            },
            // The dip at index 3 is intentional difficulty pacing
            bosses: vec![
                BossProfile {
                    max_health: Some(500),
                    heal_amount: 0,
                    can_heal: false,
                    can_speed: false,
                    can_immune: false,
                    is_final: false,
                },
                BossProfile {
                    max_health: Some(600),
                    heal_amount: 20,
                    can_heal: true,
                    can_speed: false,
                    can_immune: false,
                    is_final: false,
                },
                BossProfile {
                    max_health: Some(700),
                    heal_amount: 30,
                    can_heal: true,
                    can_speed: true,
                    can_immune: false,
                    is_final: false,
                },
                BossProfile {
                    max_health: Some(350),
                    heal_amount: 40,
                    can_heal: true,
                    can_speed: true,
                    can_immune: true,
                    is_final: false,
                },
                BossProfile {
                    max_health: None,
                    heal_amount: 0,
                    can_heal: true,
                    can_speed: true,
                    can_immune: true,
                    is_final: true,
                },
            ],
            debug_health_step: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gravity_curve() {
        let gravity = GameConfig::default().gravity;
        assert_eq!(gravity.period(1, false), 35);
        assert_eq!(gravity.period(2, false), 32);
        // Floors at the minimum period from level 11 on
        assert_eq!(gravity.period(11, false), 5);
        assert_eq!(gravity.period(30, false), 5);
        // Speed surge cuts 15 ticks, floored at 2
        assert_eq!(gravity.period(1, true), 20);
        assert_eq!(gravity.period(11, true), 2);
    }

    #[test]
    fn test_boss_schedule_shape() {
        let config = GameConfig::default();
        assert_eq!(config.bosses.len(), 5);
        let pools: Vec<_> = config.bosses.iter().map(|b| b.max_health).collect();
        assert_eq!(
            pools,
            vec![Some(500), Some(600), Some(700), Some(350), None]
        );
        assert!(config.bosses[4].is_final);
        // Abilities unlock cumulatively down the schedule
        assert!(!config.bosses[0].can_heal);
        assert!(config.bosses[1].can_heal && !config.bosses[1].can_speed);
        assert!(config.bosses[2].can_speed && !config.bosses[2].can_immune);
        assert!(config.bosses[3].can_immune);
    }
}
