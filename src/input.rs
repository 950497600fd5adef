//! Input handling with DAS (Delayed Auto Shift) and ARR (Auto Repeat Rate)
//!
//! Uses a polling-based approach that doesn't rely on key release events,
//! which are unreliable on Linux terminals. Translates key events into
//! session commands; the session itself decides what is legal (paused,
//! game over), so nothing here inspects game state beyond the bindings.

use crate::game::Command;
use crate::settings::Settings;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::{Duration, Instant};

/// Time after which we consider a key "released" if no repeat received
const KEY_TIMEOUT: Duration = Duration::from_millis(100);

/// Delayed Auto Shift: hold time before repeats begin
const DAS: Duration = Duration::from_millis(170);
/// Auto Repeat Rate: interval between repeats once DAS elapsed
const ARR: Duration = Duration::from_millis(50);

/// Input handler with DAS/ARR support
pub struct InputHandler {
    /// Last press time for repeating keys (for DAS)
    left_state: Option<KeyPressState>,
    right_state: Option<KeyPressState>,
    down_state: Option<KeyPressState>,
    /// Key bindings
    bindings: KeyBindings,
    /// Set when the quit binding fires; read by the driver loop
    quit_requested: bool,
}

#[derive(Debug, Clone)]
struct KeyPressState {
    first_press: Instant,
    last_seen: Instant,
    das_triggered: bool,
    last_arr: Option<Instant>,
}

/// Key bindings configuration - supports multiple keys per command
#[derive(Debug, Clone)]
pub struct KeyBindings {
    pub move_left: Vec<KeyCode>,
    pub move_right: Vec<KeyCode>,
    pub rotate: Vec<KeyCode>,
    pub soft_drop: Vec<KeyCode>,
    pub hard_drop: Vec<KeyCode>,
    pub pause: Vec<KeyCode>,
    pub restart: Vec<KeyCode>,
    pub quit: Vec<KeyCode>,
}

impl KeyBindings {
    /// Parse a key string into KeyCode
    fn parse_key(s: &str) -> KeyCode {
        match s.to_lowercase().as_str() {
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "space" => KeyCode::Char(' '),
            "enter" => KeyCode::Enter,
            "tab" => KeyCode::Tab,
            "esc" | "escape" => KeyCode::Esc,
            s if s.len() == 1 => KeyCode::Char(s.chars().next().unwrap()),
            _ => KeyCode::Char(' '), // fallback
        }
    }

    /// Parse a list of key strings into KeyCodes
    fn parse_keys(keys: &[String]) -> Vec<KeyCode> {
        keys.iter().map(|s| Self::parse_key(s)).collect()
    }

    /// Create keybindings from settings
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            move_left: Self::parse_keys(&settings.keys.move_left),
            move_right: Self::parse_keys(&settings.keys.move_right),
            rotate: Self::parse_keys(&settings.keys.rotate),
            soft_drop: Self::parse_keys(&settings.keys.soft_drop),
            hard_drop: Self::parse_keys(&settings.keys.hard_drop),
            pause: Self::parse_keys(&settings.keys.pause),
            restart: Self::parse_keys(&settings.keys.restart),
            quit: Self::parse_keys(&settings.keys.quit),
        }
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            move_left: vec![KeyCode::Left],
            move_right: vec![KeyCode::Right],
            rotate: vec![KeyCode::Up, KeyCode::Char('x')],
            soft_drop: vec![KeyCode::Down],
            hard_drop: vec![KeyCode::Char(' ')],
            pause: vec![KeyCode::Char('p'), KeyCode::Esc],
            restart: vec![KeyCode::Char('r')],
            quit: vec![KeyCode::Char('q')],
        }
    }
}

impl InputHandler {
    pub fn new() -> Self {
        Self {
            left_state: None,
            right_state: None,
            down_state: None,
            bindings: KeyBindings::default(),
            quit_requested: false,
        }
    }

    /// Create input handler from settings
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            bindings: KeyBindings::from_settings(settings),
            ..Self::new()
        }
    }

    /// Whether the quit binding has fired
    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    /// Handle a key press event - returns immediate commands
    pub fn key_down(&mut self, key: KeyEvent) -> Vec<Command> {
        let mut commands = Vec::new();
        let now = Instant::now();

        // Handle Ctrl+C for quit
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.quit_requested = true;
            return commands;
        }

        let code = normalize_key(key.code);

        // Handle movement keys with DAS/ARR tracking
        if self.bindings.move_left.contains(&code) {
            if self.left_state.is_none() {
                // New press - immediate command
                commands.push(Command::MoveLeft);
                self.left_state = Some(KeyPressState::pressed(now));
            } else if let Some(state) = &mut self.left_state {
                state.last_seen = now;
            }
            // Cancel opposite direction
            self.right_state = None;
        } else if self.bindings.move_right.contains(&code) {
            if self.right_state.is_none() {
                commands.push(Command::MoveRight);
                self.right_state = Some(KeyPressState::pressed(now));
            } else if let Some(state) = &mut self.right_state {
                state.last_seen = now;
            }
            // Cancel opposite direction
            self.left_state = None;
        } else if self.bindings.soft_drop.contains(&code) {
            if self.down_state.is_none() {
                commands.push(Command::SoftDrop);
                self.down_state = Some(KeyPressState::pressed(now));
            } else if let Some(state) = &mut self.down_state {
                state.last_seen = now;
            }
        } else if self.bindings.rotate.contains(&code) {
            commands.push(Command::Rotate);
        } else if self.bindings.hard_drop.contains(&code) {
            commands.push(Command::HardDrop);
        } else if self.bindings.pause.contains(&code) {
            commands.push(Command::Pause);
        } else if self.bindings.restart.contains(&code) {
            commands.push(Command::Restart);
        } else if self.bindings.quit.contains(&code) {
            self.quit_requested = true;
        } else if code == KeyCode::Char('+') || code == KeyCode::Char('=') {
            // Debug boss health adjustment, as in the original build
            commands.push(Command::DebugBossHealthUp);
        } else if code == KeyCode::Char('-') {
            commands.push(Command::DebugBossHealthDown);
        }

        commands
    }

    /// Handle a key release event (may not be called on Linux)
    pub fn key_up(&mut self, key: KeyEvent) {
        let code = normalize_key(key.code);

        if self.bindings.move_left.contains(&code) {
            self.left_state = None;
        } else if self.bindings.move_right.contains(&code) {
            self.right_state = None;
        } else if self.bindings.soft_drop.contains(&code) {
            self.down_state = None;
        }
    }

    /// Update held keys and return repeat commands (call every frame)
    pub fn update(&mut self) -> Vec<Command> {
        let mut commands = Vec::new();
        let now = Instant::now();

        // Check for timed-out keys (no recent key event = released)
        for state in [
            &mut self.left_state,
            &mut self.right_state,
            &mut self.down_state,
        ] {
            if let Some(s) = state {
                if now.duration_since(s.last_seen) > KEY_TIMEOUT {
                    *state = None;
                }
            }
        }

        // Process DAS/ARR for each held direction
        if let Some(state) = &mut self.left_state {
            if process_das_arr(state, now) {
                commands.push(Command::MoveLeft);
            }
        }
        if let Some(state) = &mut self.right_state {
            if process_das_arr(state, now) {
                commands.push(Command::MoveRight);
            }
        }
        if let Some(state) = &mut self.down_state {
            if process_das_arr(state, now) {
                commands.push(Command::SoftDrop);
            }
        }

        commands
    }

    /// Clear all held keys (useful for pause/resume)
    pub fn clear(&mut self) {
        self.left_state = None;
        self.right_state = None;
        self.down_state = None;
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyPressState {
    fn pressed(now: Instant) -> Self {
        Self {
            first_press: now,
            last_seen: now,
            das_triggered: false,
            last_arr: None,
        }
    }
}

/// Process DAS/ARR logic for a key state, returns true if should trigger
fn process_das_arr(state: &mut KeyPressState, now: Instant) -> bool {
    let held_duration = now.duration_since(state.first_press);

    if held_duration >= DAS {
        if !state.das_triggered {
            // First trigger after DAS
            state.das_triggered = true;
            state.last_arr = Some(now);
            return true;
        } else if let Some(last) = state.last_arr {
            // Subsequent ARR triggers
            if now.duration_since(last) >= ARR {
                state.last_arr = Some(now);
                return true;
            }
        }
    }

    false
}

/// Normalize key codes for consistent handling
fn normalize_key(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEvent;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_default_bindings_map_to_commands() {
        let mut input = InputHandler::new();
        assert_eq!(input.key_down(press(KeyCode::Left)), vec![Command::MoveLeft]);
        input.clear();
        assert_eq!(
            input.key_down(press(KeyCode::Right)),
            vec![Command::MoveRight]
        );
        assert_eq!(input.key_down(press(KeyCode::Up)), vec![Command::Rotate]);
        assert_eq!(
            input.key_down(press(KeyCode::Char(' '))),
            vec![Command::HardDrop]
        );
        assert_eq!(
            input.key_down(press(KeyCode::Char('p'))),
            vec![Command::Pause]
        );
        assert_eq!(
            input.key_down(press(KeyCode::Char('r'))),
            vec![Command::Restart]
        );
    }

    #[test]
    fn test_debug_keys() {
        let mut input = InputHandler::new();
        assert_eq!(
            input.key_down(press(KeyCode::Char('+'))),
            vec![Command::DebugBossHealthUp]
        );
        assert_eq!(
            input.key_down(press(KeyCode::Char('-'))),
            vec![Command::DebugBossHealthDown]
        );
    }

    #[test]
    fn test_repeat_press_does_not_double_fire() {
        let mut input = InputHandler::new();
        assert_eq!(input.key_down(press(KeyCode::Left)), vec![Command::MoveLeft]);
        // Terminal auto-repeat of the same key: DAS owns it now
        assert!(input.key_down(press(KeyCode::Left)).is_empty());
    }

    #[test]
    fn test_quit_sets_flag_instead_of_command() {
        let mut input = InputHandler::new();
        assert!(input.key_down(press(KeyCode::Char('q'))).is_empty());
        assert!(input.quit_requested());
    }

    #[test]
    fn test_uppercase_keys_normalized() {
        let mut input = InputHandler::new();
        assert_eq!(
            input.key_down(press(KeyCode::Char('R'))),
            vec![Command::Restart]
        );
    }
}
