//! Core game session: composition, fixed-tick update, command API
//!
//! The external driver owns the clock: it calls `tick()` once per fixed
//! time step and forwards player input through `handle_command()`. All
//! state transitions are synchronous and complete within the call that
//! triggers them; the renderer reads the resulting state afterwards and
//! drains the accumulated events.

use crate::bag::Bag;
use crate::board::{Board, LockOutcome};
use crate::boss::BossEncounter;
use crate::config::GameConfig;
use crate::event::GameEvent;
use crate::piece::ActivePiece;
use crate::score::{Combo, ComboAdvance, Score};
use crate::tetromino::TetrominoType;

/// Player commands accepted by the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    MoveLeft,
    MoveRight,
    Rotate,
    SoftDrop,
    HardDrop,
    /// Toggle pause
    Pause,
    Restart,
    /// Debug: push the boss pool toward full
    DebugBossHealthUp,
    /// Debug: pull the boss pool back
    DebugBossHealthDown,
}

/// One running game
pub struct Game {
    config: GameConfig,
    pub board: Board,
    pub current: ActivePiece,
    next: TetrominoType,
    bag: Bag,
    pub score: Score,
    combo: Combo,
    pub boss: BossEncounter,
    /// Ticks since the last gravity step
    gravity_ticks: u32,
    paused: bool,
    game_over: bool,
    events: Vec<GameEvent>,
}

impl Game {
    /// Create a new game with a random bag seed
    pub fn new(config: GameConfig) -> Self {
        Self::with_seed(config, rand::random())
    }

    /// Create a new game with a fixed bag seed (for reproducible tests)
    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        let mut bag = Bag::with_seed(seed);
        let current = ActivePiece::spawn(bag.draw());
        let next = bag.draw();
        let board = Board::new(config.board_height);
        let boss = BossEncounter::new(&config);
        let combo = Combo::new(config.combo_window, config.combo_step);
        let mut events = Vec::new();
        events.push(GameEvent::BossAppeared { index: 0 });

        Self {
            config,
            board,
            current,
            next,
            bag,
            score: Score::new(),
            combo,
            boss,
            gravity_ticks: 0,
            paused: false,
            game_over: false,
            events,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// The upcoming piece kind (the renderer checks the boss's hide flag
    /// before showing it)
    pub fn next_kind(&self) -> TetrominoType {
        self.next
    }

    pub fn combo(&self) -> &Combo {
        &self.combo
    }

    /// Where the active piece would land under a hard drop
    pub fn ghost_row(&self) -> i32 {
        self.current.landing_row(&self.board)
    }

    /// Take the events accumulated since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Advance the session one fixed time step
    ///
    /// Pause suspends gravity, the combo window and boss progression;
    /// game over stops the session entirely until a restart.
    pub fn tick(&mut self) {
        if self.game_over || self.paused {
            return;
        }

        self.boss.tick(&mut self.events);

        if self.combo.tick() {
            self.events.push(GameEvent::ComboEnded);
        }

        self.gravity_ticks += 1;
        let period = self
            .config
            .gravity
            .period(self.score.level, self.boss.speed_surge_active());
        if self.gravity_ticks >= period {
            self.gravity_ticks = 0;
            if !self.current.step_down(&self.board) {
                self.lock_current();
            }
        }
    }

    /// Process a player command; returns whether it had any effect
    ///
    /// Invalid moves (blocked shifts/rotations) are silently rejected.
    /// Only `Restart` is accepted after game over, and only
    /// `Pause`/`Restart` while paused.
    pub fn handle_command(&mut self, cmd: Command) -> bool {
        if self.game_over {
            return match cmd {
                Command::Restart => {
                    self.restart();
                    true
                }
                _ => false,
            };
        }
        if self.paused {
            return match cmd {
                Command::Pause => {
                    self.paused = false;
                    true
                }
                Command::Restart => {
                    self.restart();
                    true
                }
                _ => false,
            };
        }

        match cmd {
            Command::MoveLeft => self.shift(-1),
            Command::MoveRight => self.shift(1),
            Command::Rotate => {
                let rotated = self.current.rotate(&self.board);
                if rotated {
                    self.events.push(GameEvent::PieceRotated);
                }
                rotated
            }
            Command::SoftDrop => {
                if self.current.step_down(&self.board) {
                    // Manual drop restarts the gravity interval
                    self.gravity_ticks = 0;
                } else {
                    self.lock_current();
                }
                true
            }
            Command::HardDrop => {
                let distance = self.current.hard_drop(&self.board);
                self.events.push(GameEvent::HardDropped { distance });
                self.lock_current();
                true
            }
            Command::Pause => {
                self.paused = true;
                true
            }
            Command::Restart => {
                self.restart();
                true
            }
            Command::DebugBossHealthUp => {
                self.boss.debug_adjust(1, self.config.debug_health_step);
                if self.boss.ready_to_transition() {
                    self.boss.begin_transition(&mut self.events);
                }
                true
            }
            Command::DebugBossHealthDown => {
                self.boss.debug_adjust(-1, self.config.debug_health_step);
                true
            }
        }
    }

    /// Throw away the whole session and start fresh with a new bag
    pub fn restart(&mut self) {
        tracing::info!("session restart");
        *self = Game::with_seed(self.config.clone(), rand::random());
    }

    fn shift(&mut self, dx: i32) -> bool {
        let moved = self.current.shift(&self.board, dx);
        if moved {
            self.events.push(GameEvent::PieceMoved);
        }
        moved
    }

    /// Commit the active piece and run the clear pipeline
    fn lock_current(&mut self) {
        let outcome = self.board.lock(
            &self.current.matrix,
            self.current.row,
            self.current.col,
            self.current.kind,
        );
        if outcome == LockOutcome::AboveVisible {
            // The piece never fully entered the visible board
            tracing::info!(score = self.score.points, "game over");
            self.game_over = true;
            self.events.push(GameEvent::GameOver);
            return;
        }

        self.events.push(GameEvent::PieceLocked);
        self.resolve_clears();
        self.spawn_next();
    }

    /// Resolve full rows into score, combo and boss progress
    ///
    /// Structured as a fixed-point loop: all qualifying rows are found
    /// before any removal, so today the loop body runs at most once, but
    /// future multi-pass rules slot in without restructuring.
    fn resolve_clears(&mut self) {
        let mut total_lines = 0u32;
        let mut total_points = 0u64;

        loop {
            let rows = self.board.find_full_rows();
            if rows.is_empty() {
                if total_lines == 0 {
                    self.combo.settle_idle();
                }
                break;
            }

            let batch = rows.len().min(4);
            let points = self.config.clear_scores[batch - 1] * u64::from(self.score.level);
            let base_damage = self.config.clear_damage[batch - 1];
            // The multiplier earned by the chain so far; this batch's
            // clear extends the chain for the next one
            let damage = (f64::from(base_damage) * self.combo.multiplier()).floor() as u32;

            match self.combo.register_clear() {
                ComboAdvance::Started => self.events.push(GameEvent::ComboStarted {
                    count: self.combo.count(),
                }),
                ComboAdvance::Continued => self.events.push(GameEvent::ComboContinued {
                    count: self.combo.count(),
                }),
            }

            if self.boss.is_alive() {
                self.boss.on_clear_event();
                if self.boss.apply_damage(damage) {
                    self.events.push(GameEvent::BossDamaged { amount: damage });
                }
            }

            let per_row_points = (points / batch as u64).max(1);
            self.events.push(GameEvent::LinesCleared {
                rows: rows.clone(),
                per_row_points,
            });

            self.board.clear_rows(&rows);
            total_lines += batch as u32;
            total_points += points;
        }

        if total_lines > 0 {
            self.score.add_clear(total_lines, total_points);
            if self.boss.ready_to_transition() {
                self.boss.begin_transition(&mut self.events);
            }
        }
    }

    fn spawn_next(&mut self) {
        self.current = ActivePiece::spawn(self.next);
        self.next = self.bag.draw();
        self.gravity_ticks = 0;
    }
}
