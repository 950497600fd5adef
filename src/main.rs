//! BOSSTRIS - falling blocks with a boss-battle meta-layer
//!
//! The terminal owns the clock: the core session is advanced one fixed
//! tick at a time and never touches wall-clock state itself, so a game is
//! fully replayable from the bag seed and the command stream.

mod audio;
mod bag;
mod board;
mod boss;
mod config;
mod event;
mod game;
mod input;
mod piece;
mod score;
mod settings;
mod tetromino;
mod timer;
mod ui;

use audio::{AudioManager, Sfx};
use config::GameConfig;
use crossterm::{
    event::{Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use event::GameEvent;
use game::Game;
use input::InputHandler;
use ratatui::{backend::CrosstermBackend, Terminal};
use settings::Settings;
use std::{
    io::{self, stdout},
    time::{Duration, Instant},
};

/// Fixed update rate for the core session
const TICK_RATE: u64 = 60;
const TICK_DURATION: Duration = Duration::from_micros(1_000_000 / TICK_RATE);

/// Application state
enum AppState {
    Title,
    Playing(Box<Game>, InputHandler),
}

fn main() -> io::Result<()> {
    // Per-session log file under the system temp dir
    let session_id: u32 = rand::random();
    let log_dir = std::env::temp_dir().join("bosstris");
    let _ = std::fs::create_dir_all(&log_dir);
    let log_file = format!("{:08x}.log", session_id);

    let file_appender = tracing_appender::rolling::never(&log_dir, &log_file);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("bosstris=debug".parse().unwrap()),
        )
        .with_ansi(false)
        .init();

    tracing::info!(
        "BOSSTRIS starting up, session={:08x}, log={}",
        session_id,
        log_dir.join(&log_file).display()
    );

    // Load settings
    let mut settings = Settings::load();

    // Initialize audio (optional - game works without audio)
    let mut audio = AudioManager::new();
    if let Some(ref mut a) = audio {
        a.set_bgm_volume(settings.audio.bgm_volume as f32 / 100.0);
        a.set_sfx_volume(settings.audio.sfx_volume as f32 / 100.0);
    }

    // Setup terminal
    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Run app and capture result
    let result = run_app(&mut terminal, &mut settings, &mut audio);

    // Restore terminal
    disable_raw_mode()?;
    execute!(stdout(), LeaveAlternateScreen)?;

    // Save settings (including any new high scores)
    if let Err(e) = settings.save() {
        eprintln!("Warning: Could not save settings: {}", e);
    }

    // Print final message
    match &result {
        Ok(Some(game)) => {
            println!("\nThanks for playing BOSSTRIS!");
            println!("Final Score: {}", game.score.points);
            println!(
                "Level: {} | Lines: {} | Reached boss {}",
                game.score.level,
                game.score.lines,
                game.boss.index() + 1
            );
        }
        Ok(None) => {
            println!("\nThanks for playing BOSSTRIS!");
        }
        Err(_) => {}
    }

    result.map(|_| ())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    settings: &mut Settings,
    audio: &mut Option<AudioManager>,
) -> io::Result<Option<Box<Game>>> {
    let mut state = AppState::Title;
    let mut last_tick = Instant::now();
    let mut score_recorded = false;

    loop {
        // Render
        terminal.draw(|frame| match &state {
            AppState::Title => ui::render_title(frame, settings),
            AppState::Playing(game, _) => ui::render_game(frame, game, settings),
        })?;

        // Handle input
        if crossterm::event::poll(TICK_DURATION)? {
            let term_event = crossterm::event::read()?;

            if let Event::Key(key) = term_event {
                if key.kind != KeyEventKind::Press {
                    if let AppState::Playing(_, input) = &mut state {
                        if key.kind == KeyEventKind::Release {
                            input.key_up(key);
                        }
                    }
                    continue;
                }

                match &mut state {
                    AppState::Title => match key.code {
                        KeyCode::Enter => {
                            let game = Box::new(Game::new(GameConfig::default()));
                            let input = InputHandler::from_settings(settings);
                            if let Some(audio) = audio {
                                audio.play_bgm();
                            }
                            score_recorded = false;
                            last_tick = Instant::now();
                            state = AppState::Playing(game, input);
                        }
                        KeyCode::Char('q') | KeyCode::Esc => {
                            return Ok(None);
                        }
                        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                            return Ok(None);
                        }
                        _ => {}
                    },
                    AppState::Playing(game, input) => {
                        for command in input.key_down(key) {
                            game.handle_command(command);
                        }
                        if input.quit_requested() {
                            record_score(game, settings, &mut score_recorded);
                            if let Some(audio) = audio {
                                audio.stop_bgm();
                            }
                            return Ok(Some(std::mem::replace(
                                game,
                                Box::new(Game::new(GameConfig::default())),
                            )));
                        }
                    }
                }
            }
        }

        if let AppState::Playing(game, input) = &mut state {
            // Process held keys for DAS/ARR
            for command in input.update() {
                game.handle_command(command);
            }

            // Advance the core at the fixed tick rate; after a long stall
            // (terminal suspend) drop the backlog instead of fast-forwarding
            if last_tick.elapsed() > Duration::from_millis(250) {
                last_tick = Instant::now();
                game.tick();
            }
            while last_tick.elapsed() >= TICK_DURATION {
                game.tick();
                last_tick += TICK_DURATION;
            }

            // Map core events onto audio cues and bookkeeping
            for event in game.drain_events() {
                if let Some(audio) = audio {
                    if let Some(sfx) = Sfx::for_event(&event) {
                        audio.play_sfx(sfx);
                    }
                }
                if event == GameEvent::GameOver {
                    record_score(game, settings, &mut score_recorded);
                }
                if let GameEvent::BossAppeared { index } = event {
                    // A restart re-announces boss 0; arm score recording
                    if index == 0 {
                        score_recorded = false;
                    }
                }
            }

            // BGM follows the pause flag
            if let Some(audio) = audio {
                if game.is_paused() {
                    input.clear();
                    audio.pause_bgm();
                } else if !game.is_game_over() {
                    audio.resume_bgm();
                }
            }
        }
    }
}

/// Save the finished game into the high score table once
fn record_score(game: &Game, settings: &mut Settings, recorded: &mut bool) {
    if *recorded || game.score.points == 0 {
        return;
    }
    settings.add_high_score(
        game.score.points,
        game.score.lines,
        game.score.level,
        game.boss.index() + 1,
    );
    *recorded = true;
}
