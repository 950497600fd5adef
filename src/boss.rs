//! Boss encounter state machine
//!
//! A session fights a fixed schedule of bosses. Line clears push the
//! current boss's progress pool toward its maximum; filling the pool
//! defeats the boss and, after a short transition window, brings on the
//! next one. Each boss runs a set of independently cycling abilities
//! drawn from its capability profile; the final boss's pool is unbounded
//! and the encounter is open-ended.

use crate::config::{AbilityTuning, BossProfile, GameConfig};
use crate::event::GameEvent;
use crate::timer::{Cooldown, Countdown, Meter};

/// Snapshot of one ability's cycle for the renderer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AbilityGauge {
    pub active: bool,
    /// Cooldown progress while inactive, duration progress while active
    pub fraction: f64,
    /// Ticks until the next state change
    pub remaining: u32,
}

/// The boss progression state machine
#[derive(Debug, Clone)]
pub struct BossEncounter {
    profiles: Vec<BossProfile>,
    tuning: AbilityTuning,
    transition_ticks: u32,

    index: usize,
    health: u32,
    alive: bool,
    transition: Countdown,

    /// Hide-next-piece one-shot meter and its active window
    meter: Meter,
    hide_active: Countdown,

    heal: Cooldown,
    speed: Cooldown,
    speed_active: Countdown,
    immune: Cooldown,
    immune_active: Countdown,
}

impl BossEncounter {
    pub fn new(config: &GameConfig) -> Self {
        let tuning = config.abilities;
        Self {
            profiles: config.bosses.clone(),
            tuning,
            transition_ticks: config.transition_ticks,
            index: 0,
            health: 0,
            alive: true,
            transition: Countdown::new(),
            meter: Meter::new(tuning.meter_max, tuning.meter_fill_rate),
            hide_active: Countdown::new(),
            heal: Cooldown::new(tuning.heal_period),
            speed: Cooldown::new(tuning.speed_period),
            speed_active: Countdown::new(),
            immune: Cooldown::new(tuning.immune_period),
            immune_active: Countdown::new(),
        }
    }

    fn profile(&self) -> &BossProfile {
        &self.profiles[self.index]
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn health(&self) -> u32 {
        self.health
    }

    /// None for the unbounded final encounter
    pub fn max_health(&self) -> Option<u32> {
        self.profile().max_health
    }

    pub fn is_final(&self) -> bool {
        self.profile().is_final
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition.is_running()
    }

    pub fn transition_remaining(&self) -> u32 {
        self.transition.remaining()
    }

    pub fn can_heal(&self) -> bool {
        self.profile().can_heal
    }

    pub fn can_speed(&self) -> bool {
        self.profile().can_speed
    }

    pub fn can_immune(&self) -> bool {
        self.profile().can_immune
    }

    /// Whether the next-piece preview is currently concealed
    pub fn hide_next_active(&self) -> bool {
        self.alive && self.hide_active.is_running()
    }

    /// Whether gravity is currently boosted by the speed ability
    pub fn speed_surge_active(&self) -> bool {
        self.speed_active.is_running()
    }

    pub fn immune_ability_active(&self) -> bool {
        self.immune_active.is_running()
    }

    /// Hide-next meter fill in [0, 1]
    pub fn meter_fraction(&self) -> f64 {
        self.meter.fraction()
    }

    pub fn hide_remaining(&self) -> u32 {
        self.hide_active.remaining()
    }

    pub fn heal_gauge(&self) -> AbilityGauge {
        AbilityGauge {
            active: false,
            fraction: self.heal.fraction(),
            remaining: self.heal.remaining(),
        }
    }

    pub fn speed_gauge(&self) -> AbilityGauge {
        self.cycle_gauge(&self.speed, &self.speed_active, self.speed_duration())
    }

    pub fn immune_gauge(&self) -> AbilityGauge {
        self.cycle_gauge(&self.immune, &self.immune_active, self.immune_duration())
    }

    fn cycle_gauge(&self, cooldown: &Cooldown, active: &Countdown, duration: u32) -> AbilityGauge {
        if active.is_running() {
            AbilityGauge {
                active: true,
                fraction: f64::from(active.remaining()) / f64::from(duration.max(1)),
                remaining: active.remaining(),
            }
        } else {
            AbilityGauge {
                active: false,
                fraction: cooldown.fraction(),
                remaining: cooldown.remaining(),
            }
        }
    }

    fn speed_duration(&self) -> u32 {
        if self.is_final() {
            self.tuning.final_ability_duration
        } else {
            self.tuning.speed_duration
        }
    }

    fn immune_duration(&self) -> u32 {
        if self.is_final() {
            self.tuning.final_ability_duration
        } else {
            self.tuning.immune_duration
        }
    }

    /// Advance the encounter one tick
    ///
    /// During a transition only the transition window advances; ability
    /// progression is frozen while piece control continues outside.
    pub fn tick(&mut self, events: &mut Vec<GameEvent>) {
        if !self.alive {
            return;
        }

        if self.transition.is_running() {
            if self.transition.advance() {
                self.advance_boss(events);
            }
            return;
        }

        // Hide-next meter runs for every boss
        if self.meter.advance() {
            self.meter.reset();
            self.hide_active.start(self.tuning.hide_duration);
            events.push(GameEvent::NextPieceHidden);
            tracing::debug!(boss = self.index, "hide-next ability fired");
        }
        self.hide_active.advance();

        if self.profile().can_heal && self.heal.advance() {
            self.heal.reset();
            if self.profile().is_final {
                self.fire_booster(events);
            } else {
                let amount = self.health.min(self.profile().heal_amount);
                self.health -= amount;
                events.push(GameEvent::BossHealed { amount });
            }
        }

        if self.profile().can_speed {
            if self.speed_active.is_running() {
                if self.speed_active.advance() {
                    self.speed.reset();
                    events.push(GameEvent::SpeedSurgeEnded);
                }
            } else if self.speed.advance() {
                self.speed_active.start(self.speed_duration());
                events.push(GameEvent::SpeedSurgeStarted);
            }
        }

        if self.profile().can_immune {
            if self.immune_active.is_running() {
                if self.immune_active.advance() {
                    self.immune.reset();
                }
            } else if self.immune.advance() {
                self.immune_active.start(self.immune_duration());
            }
        }
    }

    /// The final boss's repurposed heal: refill a share of every other gauge
    fn fire_booster(&mut self, events: &mut Vec<GameEvent>) {
        let refill = self.tuning.booster_refill;
        self.meter.boost(self.tuning.meter_max * refill);
        if !self.speed_active.is_running() {
            let ticks = (f64::from(self.speed.period()) * refill).round() as u32;
            self.speed.boost(ticks);
        }
        if !self.immune_active.is_running() {
            let ticks = (f64::from(self.immune.period()) * refill).round() as u32;
            self.immune.boost(ticks);
        }
        events.push(GameEvent::BossBoosted);
    }

    /// Apply progress damage from a clear batch
    ///
    /// Fully negated (zero effect) while an unlocked immune ability is
    /// active; returns whether the damage landed.
    pub fn apply_damage(&mut self, amount: u32) -> bool {
        if self.profile().can_immune && self.immune_active.is_running() {
            return false;
        }
        self.health += amount;
        if let Some(max) = self.profile().max_health {
            self.health = self.health.min(max);
        }
        true
    }

    /// A line-clear event sets every ability cycle back from its next
    /// trigger, so clearing fast keeps the boss's specials at bay
    ///
    /// Half as effective while the final boss's resistance is up.
    pub fn on_clear_event(&mut self) {
        let effectiveness = if self.profile().is_final && self.immune_active.is_running() {
            self.tuning.resisted_effectiveness
        } else {
            1.0
        };
        let clear_reduction = self.tuning.clear_reduction;
        let reduction = move |period: u32| -> u32 {
            (f64::from(period) * clear_reduction * effectiveness).round() as u32
        };

        self.meter
            .drain(self.tuning.meter_clear_penalty * effectiveness);
        if self.profile().can_heal {
            self.heal.reduce(reduction(self.heal.period()));
        }
        if self.profile().can_speed && !self.speed_active.is_running() {
            self.speed.reduce(reduction(self.speed.period()));
        }
        if self.profile().can_immune && !self.immune_active.is_running() {
            self.immune.reduce(reduction(self.immune.period()));
        }
    }

    /// Whether the pool is full and a transition should begin
    pub fn ready_to_transition(&self) -> bool {
        if !self.alive || self.transition.is_running() {
            return false;
        }
        match self.profile().max_health {
            Some(max) => self.health >= max,
            None => false,
        }
    }

    /// Start the defeated-boss window
    pub fn begin_transition(&mut self, events: &mut Vec<GameEvent>) {
        tracing::info!(boss = self.index, "boss defeated");
        self.transition.start(self.transition_ticks);
        events.push(GameEvent::BossDefeated { index: self.index });
    }

    fn advance_boss(&mut self, events: &mut Vec<GameEvent>) {
        if self.index + 1 >= self.profiles.len() {
            // Only reachable with a schedule whose last entry is bounded
            self.alive = false;
            self.hide_active.stop();
            tracing::info!("all bosses defeated");
            return;
        }
        self.index += 1;
        self.health = 0;
        events.push(GameEvent::BossAppeared { index: self.index });
        tracing::info!(boss = self.index, "boss appeared");
    }

    /// Debug health adjustment (keyboard '+'/'-'); no-op on the final boss
    pub fn debug_adjust(&mut self, delta: i32, step: u32) {
        if self.profile().is_final || self.transition.is_running() {
            return;
        }
        if delta > 0 {
            self.health += step;
            if let Some(max) = self.profile().max_health {
                self.health = self.health.min(max);
            }
        } else {
            self.health = self.health.saturating_sub(step);
        }
        tracing::debug!(health = self.health, "debug boss health adjust");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Config with short ability periods so tests stay fast
    fn test_config() -> GameConfig {
        let mut config = GameConfig::default();
        config.transition_ticks = 10;
        config.abilities.heal_period = 20;
        config.abilities.speed_period = 30;
        config.abilities.speed_duration = 8;
        config.abilities.immune_period = 25;
        config.abilities.immune_duration = 6;
        config.abilities.final_ability_duration = 12;
        // Shorter than the 10-tick meter period so hide expires between fires
        config.abilities.hide_duration = 5;
        config.abilities.meter_fill_rate = 10.0;
        config
    }

    fn tick_n(boss: &mut BossEncounter, n: u32) -> Vec<GameEvent> {
        let mut events = Vec::new();
        for _ in 0..n {
            boss.tick(&mut events);
        }
        events
    }

    /// Drive the encounter to a later boss through normal transitions
    fn advance_to(boss: &mut BossEncounter, index: usize) {
        while boss.index() < index {
            let max = boss.max_health().expect("schedule ended early");
            boss.apply_damage(max);
            let mut events = Vec::new();
            boss.begin_transition(&mut events);
            tick_n(boss, boss.transition_remaining());
        }
        assert_eq!(boss.index(), index);
    }

    #[test]
    fn test_transition_at_exact_max() {
        let config = test_config();
        let mut boss = BossEncounter::new(&config);
        assert!(boss.apply_damage(500));
        assert!(boss.ready_to_transition());

        let mut events = Vec::new();
        boss.begin_transition(&mut events);
        assert_eq!(events, vec![GameEvent::BossDefeated { index: 0 }]);
        assert!(boss.is_transitioning());

        let events = tick_n(&mut boss, 10);
        assert!(events.contains(&GameEvent::BossAppeared { index: 1 }));
        assert_eq!(boss.index(), 1);
        assert_eq!(boss.health(), 0);
        assert_eq!(boss.max_health(), Some(600));
        assert!(!boss.is_transitioning());
    }

    #[test]
    fn test_damage_clamps_at_max() {
        let config = test_config();
        let mut boss = BossEncounter::new(&config);
        assert!(boss.apply_damage(100_000));
        assert_eq!(boss.health(), 500);
    }

    #[test]
    fn test_abilities_frozen_during_transition() {
        let config = test_config();
        let mut boss = BossEncounter::new(&config);
        boss.apply_damage(500);
        let mut events = Vec::new();
        boss.begin_transition(&mut events);
        // Meter fills 10/tick in the test config; frozen, it never fires
        let events = tick_n(&mut boss, 9);
        assert!(!events.iter().any(|e| *e == GameEvent::NextPieceHidden));
        assert!((boss.meter_fraction() - 0.0).abs() < 1e-9);
    }

    #[test]
    fn test_meter_fires_and_resets() {
        let config = test_config();
        let mut boss = BossEncounter::new(&config);
        let events = tick_n(&mut boss, 10);
        assert!(events.contains(&GameEvent::NextPieceHidden));
        assert!(boss.hide_next_active());
        // Meter reset after firing
        assert!(boss.meter_fraction() < 1.0);
        // Hide window runs out before the meter fills again
        tick_n(&mut boss, 5);
        assert!(!boss.hide_next_active());
    }

    #[test]
    fn test_heal_shrinks_pool() {
        let config = test_config();
        let mut boss = BossEncounter::new(&config);
        advance_to(&mut boss, 1);
        boss.apply_damage(100);
        let events = tick_n(&mut boss, 20);
        assert!(events.contains(&GameEvent::BossHealed { amount: 20 }));
        assert_eq!(boss.health(), 80);
    }

    #[test]
    fn test_heal_floors_at_zero() {
        let config = test_config();
        let mut boss = BossEncounter::new(&config);
        advance_to(&mut boss, 1);
        boss.apply_damage(5);
        let events = tick_n(&mut boss, 20);
        assert!(events.contains(&GameEvent::BossHealed { amount: 5 }));
        assert_eq!(boss.health(), 0);
    }

    #[test]
    fn test_speed_surge_cycle() {
        let config = test_config();
        let mut boss = BossEncounter::new(&config);
        advance_to(&mut boss, 2);
        let events = tick_n(&mut boss, 30);
        assert!(events.contains(&GameEvent::SpeedSurgeStarted));
        assert!(boss.speed_surge_active());
        let events = tick_n(&mut boss, 8);
        assert!(events.contains(&GameEvent::SpeedSurgeEnded));
        assert!(!boss.speed_surge_active());
    }

    #[test]
    fn test_immune_negates_damage_entirely() {
        let config = test_config();
        let mut boss = BossEncounter::new(&config);
        advance_to(&mut boss, 3);
        // Run the immune cooldown out
        tick_n(&mut boss, 25);
        assert!(boss.immune_ability_active());
        let before = boss.health();
        assert!(!boss.apply_damage(60));
        assert_eq!(boss.health(), before);
        // After the window closes damage lands again
        tick_n(&mut boss, 6);
        assert!(!boss.immune_ability_active());
        assert!(boss.apply_damage(60));
        assert_eq!(boss.health(), before + 60);
    }

    #[test]
    fn test_final_boss_resistance_blocks_damage() {
        let config = test_config();
        let mut boss = BossEncounter::new(&config);
        advance_to(&mut boss, 4);
        boss.apply_damage(100);
        // Run the immune cooldown out on the final boss
        tick_n(&mut boss, 25);
        assert!(boss.immune_ability_active());
        assert!(!boss.apply_damage(60));
        assert_eq!(boss.health(), 100);
        // Clear-event reductions are halved while resisting
        let heal_before = boss.heal_gauge().remaining;
        boss.on_clear_event();
        // 20% of the 20-tick heal period at 50% effectiveness = 2 ticks
        assert_eq!(boss.heal_gauge().remaining, heal_before + 2);
    }

    #[test]
    fn test_final_boss_never_transitions() {
        let config = test_config();
        let mut boss = BossEncounter::new(&config);
        advance_to(&mut boss, 4);
        assert!(boss.is_final());
        assert_eq!(boss.max_health(), None);
        boss.apply_damage(1_000_000);
        assert!(!boss.ready_to_transition());
        assert!(boss.is_alive());
    }

    #[test]
    fn test_final_boss_booster_refills_gauges() {
        let config = test_config();
        let mut boss = BossEncounter::new(&config);
        advance_to(&mut boss, 4);
        // Drain everything, then let one heal period elapse
        boss.on_clear_event();
        let speed_before = boss.speed_gauge().remaining;
        let events = tick_n(&mut boss, 20);
        assert!(events.contains(&GameEvent::BossBoosted));
        // Cooldowns moved forward by 20% of their period on top of ticking
        assert!(boss.speed_gauge().remaining < speed_before.saturating_sub(19));
    }

    #[test]
    fn test_clear_event_hastens_cooldowns() {
        let config = test_config();
        let mut boss = BossEncounter::new(&config);
        advance_to(&mut boss, 1);
        tick_n(&mut boss, 10);
        let before = boss.heal_gauge().remaining;
        boss.on_clear_event();
        // 20% of the 20-tick period = 4 ticks further from firing
        assert_eq!(boss.heal_gauge().remaining, before + 4);
    }

    #[test]
    fn test_debug_adjust_clamps_and_skips_final() {
        let config = test_config();
        let mut boss = BossEncounter::new(&config);
        boss.debug_adjust(-1, 10);
        assert_eq!(boss.health(), 0);
        boss.debug_adjust(1, 10);
        assert_eq!(boss.health(), 10);
        advance_to(&mut boss, 4);
        let before = boss.health();
        boss.debug_adjust(1, 10);
        assert_eq!(boss.health(), before);
    }
}
