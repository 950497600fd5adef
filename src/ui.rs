//! Terminal UI rendering with ratatui
//!
//! Three-panel layout: boss encounter on the left, playfield in the
//! middle, next piece and score on the right. Everything here is a pure
//! read of the session snapshot; effects are triggered off drained events
//! by the driver.

use crate::board::{Cell, BOARD_WIDTH};
use crate::boss::AbilityGauge;
use crate::game::Game;
use crate::settings::Settings;
use crate::tetromino::ShapeMatrix;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

const EMPTY: &str = "  ";

/// Boss panel (24) + board (10*2 + 2 borders) + info (20)
const GAME_WIDTH: u16 = 24 + 22 + 20;
/// Number of rows to show above the visible board (spawn area)
const VISIBLE_BUFFER: usize = 2;

const TICKS_PER_SECOND: u32 = 60;

/// Render the title screen
pub fn render_title(frame: &mut Frame, settings: &Settings) {
    let area = frame.area();
    let menu_area = center_rect(area, 46, 14);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));
    let inner = block.inner(menu_area);
    frame.render_widget(block, menu_area);

    let mut lines = vec![
        Line::raw(""),
        Line::styled("B O S S T R I S", Style::default().fg(Color::Cyan).bold()),
        Line::styled("falling blocks vs. five bosses", Style::default().fg(Color::Gray)),
        Line::raw(""),
        Line::styled(
            "Clear lines to fill the boss meter.",
            Style::default().fg(Color::White),
        ),
        Line::styled(
            "Chain clears for combo damage.",
            Style::default().fg(Color::White),
        ),
        Line::raw(""),
    ];
    if let Some(best) = settings.best_score() {
        lines.push(Line::styled(
            format!("Best: {}", best),
            Style::default().fg(Color::Yellow),
        ));
        lines.push(Line::raw(""));
    }
    lines.push(Line::styled(
        "Enter Start   q Quit",
        Style::default().fg(Color::DarkGray),
    ));

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(paragraph, inner);
}

/// Render the entire game UI
pub fn render_game(frame: &mut Frame, game: &Game, settings: &Settings) {
    let area = frame.area();
    let height = game.board.height() as u16 + VISIBLE_BUFFER as u16 + 2;
    let game_area = center_rect(area, GAME_WIDTH, height);

    // Boss | board | next + stats
    let main_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(24),
            Constraint::Length(22),
            Constraint::Length(20),
        ])
        .split(game_area);

    render_boss_panel(frame, main_layout[0], game);
    render_board(frame, main_layout[1], game, settings);

    let right_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(8), Constraint::Min(10)])
        .split(main_layout[2]);

    render_next(frame, right_layout[0], game, settings);
    render_stats(frame, right_layout[1], game);

    // Overlays
    if game.is_game_over() {
        render_overlay(frame, area, "GAME OVER", "Press R to play again");
    } else if game.is_paused() {
        render_overlay(frame, area, "PAUSED", "Press P to resume");
    }
}

/// Center a rect within another rect
fn center_rect(area: Rect, width: u16, height: u16) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

/// Render the boss encounter panel
fn render_boss_panel(frame: &mut Frame, area: Rect, game: &Game) {
    let boss = &game.boss;
    let title = if boss.is_final() {
        " FINAL BOSS ".to_string()
    } else {
        format!(" BOSS {} ", boss.index() + 1)
    };
    let block = Block::default()
        .title(title)
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let bar_width = inner.width.saturating_sub(2) as usize;
    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::raw(""));

    // Progress pool; the final boss has no bottom
    match boss.max_health() {
        Some(max) => {
            lines.push(Line::from(Span::styled(
                "PROGRESS",
                Style::default().fg(Color::Gray),
            )));
            lines.push(bar_line(
                f64::from(boss.health()) / f64::from(max.max(1)),
                bar_width,
                Color::Green,
            ));
            lines.push(Line::from(Span::styled(
                format!("{}/{}", boss.health(), max),
                Style::default().fg(Color::White),
            )));
        }
        None => {
            lines.push(Line::from(Span::styled(
                "PROGRESS",
                Style::default().fg(Color::Gray),
            )));
            lines.push(bar_line(1.0, bar_width, Color::Red));
            lines.push(Line::from(Span::styled(
                "NULL",
                Style::default().fg(Color::Red).bold(),
            )));
        }
    }
    lines.push(Line::raw(""));

    if boss.is_transitioning() {
        lines.push(Line::styled(
            "BOSS DEFEATED!",
            Style::default().fg(Color::Yellow).bold(),
        ));
        let seconds = boss.transition_remaining().div_ceil(TICKS_PER_SECOND);
        lines.push(Line::styled(
            format!("next in {}s", seconds),
            Style::default().fg(Color::Gray),
        ));
    } else if boss.is_alive() {
        // Hide-next meter ticks up for every boss
        lines.push(Line::from(Span::styled(
            "HIDE NEXT",
            Style::default().fg(Color::Gray),
        )));
        lines.push(bar_line(boss.meter_fraction(), bar_width, Color::Blue));
        if boss.hide_next_active() {
            let seconds = boss.hide_remaining().div_ceil(TICKS_PER_SECOND);
            lines.push(Line::styled(
                format!("hidden {}s", seconds),
                Style::default().fg(Color::Blue).bold(),
            ));
        } else {
            lines.push(Line::raw(""));
        }
        lines.push(Line::raw(""));

        if boss.can_heal() {
            let label = if boss.is_final() { "BOOST" } else { "HEAL" };
            let color = if boss.is_final() {
                Color::Magenta
            } else {
                Color::Red
            };
            push_gauge(&mut lines, label, boss.heal_gauge(), bar_width, color);
        }
        if boss.can_speed() {
            push_gauge(
                &mut lines,
                "SPEED",
                boss.speed_gauge(),
                bar_width,
                Color::Rgb(255, 165, 0),
            );
        }
        if boss.can_immune() {
            let label = if boss.is_final() { "RESIST" } else { "IMMUNE" };
            push_gauge(
                &mut lines,
                label,
                boss.immune_gauge(),
                bar_width,
                Color::Magenta,
            );
        }
    } else {
        lines.push(Line::styled(
            "NO MORE ATTACKS!",
            Style::default().fg(Color::Green).bold(),
        ));
    }

    let paragraph = Paragraph::new(lines);
    frame.render_widget(paragraph, inner);
}

/// Push one ability gauge: label (with active marker) plus its bar
fn push_gauge(
    lines: &mut Vec<Line<'_>>,
    label: &str,
    gauge: AbilityGauge,
    width: usize,
    color: Color,
) {
    let seconds = gauge.remaining.div_ceil(TICKS_PER_SECOND);
    let (text, style) = if gauge.active {
        (
            format!("{} {}s", label, seconds),
            Style::default().fg(color).bold(),
        )
    } else {
        (
            format!("{} in {}s", label, seconds),
            Style::default().fg(Color::Gray),
        )
    };
    lines.push(Line::from(Span::styled(text, style)));
    lines.push(bar_line(gauge.fraction, width, color));
}

/// A horizontal meter made of block characters
fn bar_line(fraction: f64, width: usize, color: Color) -> Line<'static> {
    let filled = ((fraction.clamp(0.0, 1.0)) * width as f64).round() as usize;
    let filled = filled.min(width);
    Line::from(vec![
        Span::styled("█".repeat(filled), Style::default().fg(color)),
        Span::styled("░".repeat(width - filled), Style::default().fg(Color::DarkGray)),
    ])
}

/// Render the playfield
fn render_board(frame: &mut Frame, area: Rect, game: &Game, settings: &Settings) {
    let (block_char, ghost_char) = settings.visual.block_chars();
    let show_ghost = settings.visual.show_ghost;

    let block = Block::default()
        .title(" BOSSTRIS ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let piece_color = game.current.kind.color();
    let ghost_row = if show_ghost { Some(game.ghost_row()) } else { None };

    let mut lines: Vec<Line> = Vec::new();
    // Buffer rows first, then the visible board, top to bottom
    for row in -(VISIBLE_BUFFER as i32)..game.board.height() as i32 {
        let mut spans = Vec::new();
        for col in 0..BOARD_WIDTH as i32 {
            let on_piece = game.current.cells().any(|cell| cell == (row, col));
            let on_ghost = !on_piece
                && row >= 0
                && ghost_row.is_some_and(|ghost| {
                    shape_covers(&game.current.matrix, ghost, game.current.col, row, col)
                });

            let (text, style) = if on_piece {
                (block_char, Style::default().fg(piece_color))
            } else if on_ghost {
                (ghost_char, Style::default().fg(piece_color).dim())
            } else {
                match game.board.get(row, col) {
                    Some(Cell::Filled(kind)) => (block_char, Style::default().fg(kind.color())),
                    _ => (EMPTY, Style::default()),
                }
            };
            spans.push(Span::styled(text, style));
        }
        lines.push(Line::from(spans));
    }

    let paragraph = Paragraph::new(lines);
    frame.render_widget(paragraph, inner);
}

/// Whether a shape anchored at (row, col) covers the given board cell
fn shape_covers(matrix: &ShapeMatrix, row: i32, col: i32, cell_row: i32, cell_col: i32) -> bool {
    matrix
        .filled()
        .any(|(r, c)| (row + r as i32, col + c as i32) == (cell_row, cell_col))
}

/// Render the next piece preview box
fn render_next(frame: &mut Frame, area: Rect, game: &Game, settings: &Settings) {
    let (block_char, _) = settings.visual.block_chars();
    let block = Block::default()
        .title(" NEXT ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    if game.boss.hide_next_active() {
        // The boss is concealing the preview
        let lines = vec![
            Line::raw(""),
            Line::raw(""),
            Line::styled("?", Style::default().fg(Color::White).bold()),
        ];
        let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
        frame.render_widget(paragraph, inner);
        return;
    }

    let kind = game.next_kind();
    let matrix = kind.matrix();
    let color = kind.color();

    let mut lines: Vec<Line> = vec![Line::raw("")];
    for r in 0..matrix.size() {
        let mut spans = Vec::new();
        for c in 0..matrix.size() {
            if matrix.is_set(r, c) {
                spans.push(Span::styled(block_char, Style::default().fg(color)));
            } else {
                spans.push(Span::raw(EMPTY));
            }
        }
        lines.push(Line::from(spans));
    }

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(paragraph, inner);
}

/// Render the score/combo/lines panel
fn render_stats(frame: &mut Frame, area: Rect, game: &Game) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines = Vec::new();
    lines.push(Line::from(Span::styled("SCORE", Style::default().fg(Color::Gray))));
    lines.push(Line::from(Span::styled(
        format!("{}", game.score.points),
        Style::default().fg(Color::Yellow).bold(),
    )));
    lines.push(Line::raw(""));
    lines.push(Line::from(Span::styled("LEVEL", Style::default().fg(Color::Gray))));
    lines.push(Line::from(Span::styled(
        format!("{}", game.score.level),
        Style::default().fg(Color::Cyan),
    )));
    lines.push(Line::raw(""));
    lines.push(Line::from(Span::styled("LINES", Style::default().fg(Color::Gray))));
    lines.push(Line::from(Span::styled(
        format!("{}", game.score.lines),
        Style::default().fg(Color::Green),
    )));

    // Combo chain with its continuation window
    let combo = game.combo();
    if combo.count() > 0 {
        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled(
            format!("COMBO x{}", combo.count()),
            Style::default().fg(Color::Magenta).bold(),
        )));
        let window = game.config().combo_window.max(1);
        let fraction = f64::from(combo.window_remaining()) / f64::from(window);
        let color = if combo.window_remaining() < TICKS_PER_SECOND {
            Color::Red
        } else {
            Color::Magenta
        };
        lines.push(bar_line(fraction, inner.width.saturating_sub(2) as usize, color));
    }

    let paragraph = Paragraph::new(lines);
    frame.render_widget(paragraph, inner);
}

/// Render a centered text overlay
fn render_overlay(frame: &mut Frame, area: Rect, title: &str, subtitle: &str) {
    let overlay_area = center_rect(area, (subtitle.len() as u16 + 6).max(20), 5);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));
    let inner = block.inner(overlay_area);
    frame.render_widget(ratatui::widgets::Clear, overlay_area);
    frame.render_widget(block, overlay_area);

    let lines = vec![
        Line::styled(title.to_string(), Style::default().fg(Color::Yellow).bold()),
        Line::raw(""),
        Line::styled(subtitle.to_string(), Style::default().fg(Color::White)),
    ];
    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(paragraph, inner);
}
