//! Layout and drawing: menu, board, sidebar, won and lost screens.

use crate::block::{Block as Tile, BlockColor, BlockKind};
use crate::game::{CommitOutcome, Game, Status};
use crate::grid::Position;
use crate::level::LEVELS;
use crate::theme::Theme;
use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, Paragraph, Widget};

/// Terminal columns per grid cell.
pub const CELL_WIDTH: u16 = 5;
/// Terminal rows per grid cell.
pub const CELL_HEIGHT: u16 = 2;
/// Spacing around and between cells, in terminal cells (both axes).
pub const GAP: u16 = 1;

const SIDEBAR_WIDTH: u16 = 28;

/// Seconds left below which the clock turns red.
const LOW_TIME: u32 = 30;

/// Board size in terminal cells, border included.
fn board_outer_size(size: usize) -> (u16, u16) {
    let n = size as u16;
    (
        GAP + n * (CELL_WIDTH + GAP) + 2,
        GAP + n * (CELL_HEIGHT + GAP) + 2,
    )
}

/// Board (outer) and sidebar rects, centred in `area`.
fn game_layout(area: Rect, size: usize) -> (Rect, Rect) {
    let (bw, bh) = board_outer_size(size);
    let total_w = bw + SIDEBAR_WIDTH;
    let x = area.x + area.width.saturating_sub(total_w) / 2;
    let y = area.y + area.height.saturating_sub(bh) / 2;
    (
        Rect::new(x, y, bw, bh),
        Rect::new(x + bw, y, SIDEBAR_WIDTH, bh),
    )
}

fn fits(area: Rect, size: usize) -> bool {
    let (bw, bh) = board_outer_size(size);
    bw + SIDEBAR_WIDTH <= area.width && bh <= area.height
}

/// Board interior (inside the border) for a `size` grid drawn in `area`.
/// Mouse coordinates are mapped against this rect. `None` when the board
/// is not drawn because the terminal is too small.
pub fn board_rect(area: Rect, size: usize) -> Option<Rect> {
    if !fits(area, size) {
        return None;
    }
    let (outer, _) = game_layout(area, size);
    Some(Block::default().borders(Borders::ALL).inner(outer))
}

/// Top-left terminal cell of grid cell `pos`.
fn cell_origin(board: Rect, pos: Position) -> (u16, u16) {
    (
        board.x + GAP + pos.col as u16 * (CELL_WIDTH + GAP),
        board.y + GAP + pos.row as u16 * (CELL_HEIGHT + GAP),
    )
}

pub fn draw(
    frame: &mut Frame,
    game: &Game,
    theme: &Theme,
    cursor: Position,
    menu_level: u32,
    last_clear: Option<&CommitOutcome>,
    stone_penalty: usize,
) {
    let area = frame.area();
    match game.state.status {
        Status::Menu => draw_menu(frame, theme, menu_level, area),
        Status::Playing => {
            if fits(area, game.grid.size()) {
                draw_game(frame, game, theme, cursor, last_clear, stone_penalty, area);
            } else {
                draw_too_small(frame, theme, area);
            }
        }
        Status::Won | Status::Lost => draw_level_over(frame, game, theme, area),
    }
}

fn draw_too_small(frame: &mut Frame, theme: &Theme, area: Rect) {
    Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            " Terminal too small for this board ",
            Style::default().fg(theme.title),
        )),
    ])
    .alignment(Alignment::Center)
    .render(area, frame.buffer_mut());
}

fn draw_menu(frame: &mut Frame, theme: &Theme, selected: u32, area: Rect) {
    let highlight = Style::default()
        .fg(Color::Black)
        .bg(theme.title)
        .add_modifier(Modifier::BOLD);
    let normal = Style::default().fg(theme.main_fg);

    let title: Line = "CHAINBREAK"
        .chars()
        .enumerate()
        .map(|(i, ch)| {
            Span::styled(
                ch.to_string(),
                Style::default()
                    .fg(theme.hues[i % theme.hues.len()])
                    .add_modifier(Modifier::BOLD),
            )
        })
        .collect::<Vec<_>>()
        .into();

    let mut lines = vec![
        Line::from(""),
        title,
        Line::from(Span::styled(
            "link blocks · trigger chains · clear the board",
            Style::default().fg(theme.inactive_fg),
        )),
        Line::from(""),
        Line::from(Span::styled(" ─ LEVEL ─ ", Style::default().fg(theme.div_line))),
    ];
    for (i, config) in LEVELS.iter().enumerate() {
        let n = i as u32 + 1;
        let label = format!(
            " Level {}   {}x{}   {:>2}k ",
            n,
            config.size,
            config.size,
            config.target_score / 1000
        );
        let style = if n == selected { highlight } else { normal };
        lines.push(Line::from(Span::styled(label, style)));
    }
    lines.extend([
        Line::from(""),
        Line::from(Span::styled(
            " ↑/↓ choose    Enter start    Q quit ",
            Style::default().fg(theme.main_fg),
        )),
    ]);

    let height = (lines.len() as u16 + 2).min(area.height);
    let width = 52.min(area.width);
    let popup = Rect::new(
        area.x + area.width.saturating_sub(width) / 2,
        area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    );
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line).bg(theme.bg)),
        )
        .render(popup, frame.buffer_mut());
}

fn draw_level_over(frame: &mut Frame, game: &Game, theme: &Theme, area: Rect) {
    let state = &game.state;
    let won = state.status == Status::Won;
    let (title, title_style, keys) = if won {
        (
            format!(" Level {} complete! ", state.level),
            Style::default().fg(Color::Black).bg(Color::Green),
            " Enter next level    M menu    Q quit ",
        )
    } else {
        (
            " Time's up! ".to_string(),
            Style::default().fg(Color::White).bg(Color::Red),
            " R retry    M menu    Q quit ",
        )
    };
    let fg = Style::default().fg(theme.main_fg);
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(title, title_style)),
        Line::from(""),
        Line::from(Span::styled(format!(" Score: {} ", state.score), fg)),
        Line::from(Span::styled(format!(" Target: {} ", state.target_score), fg)),
        Line::from(""),
        Line::from(Span::styled(keys, fg)),
        Line::from(""),
    ];
    let width = 44.min(area.width);
    let height = (lines.len() as u16 + 2).min(area.height);
    let popup = Rect::new(
        area.x + area.width.saturating_sub(width) / 2,
        area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    );
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
                .title(Span::styled(" Chainbreak ", Style::default().fg(theme.title))),
        )
        .render(popup, frame.buffer_mut());
}

fn draw_game(
    frame: &mut Frame,
    game: &Game,
    theme: &Theme,
    cursor: Position,
    last_clear: Option<&CommitOutcome>,
    stone_penalty: usize,
    area: Rect,
) {
    let (board_outer, sidebar) = game_layout(area, game.grid.size());
    let border = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .title(Span::styled(
            format!(" Lv.{} ", game.state.level),
            Style::default().fg(theme.title),
        ));
    let board = border.inner(board_outer);
    border.render(board_outer, frame.buffer_mut());
    draw_board(frame.buffer_mut(), game, theme, board, cursor);
    draw_sidebar(frame, game, theme, sidebar, last_clear, stone_penalty);
}

fn draw_board(buf: &mut Buffer, game: &Game, theme: &Theme, board: Rect, cursor: Position) {
    for y in board.y..board.y + board.height {
        for x in board.x..board.x + board.width {
            if let Some(cell) = buf.cell_mut((x, y)) {
                cell.set_char(' ').set_style(Style::default().bg(theme.bg));
            }
        }
    }

    let path = game.path();
    let chain_color = game.chain_color();
    for (pos, tile) in game.grid.cells() {
        let order = path.iter().position(|&p| p == pos);
        // Cells that cannot extend the current chain are dimmed.
        let dimmed = !path.is_empty()
            && order.is_none()
            && (!tile.is_selectable()
                || !(tile.is_rainbow() || chain_color.is_none_or(|c| c == tile.color)));
        draw_tile(buf, theme, board, pos, tile, order, dimmed);
    }

    let (x, y) = cell_origin(board, cursor);
    let style = Style::default()
        .fg(theme.title)
        .bg(theme.bg)
        .add_modifier(Modifier::BOLD);
    for (bx, ch) in [(x.saturating_sub(1), '['), (x + CELL_WIDTH, ']')] {
        if let Some(cell) = buf.cell_mut((bx, y)) {
            cell.set_char(ch).set_style(style);
        }
    }
}

/// Short label shown on the top row of a tile.
fn tile_label(tile: &Tile) -> String {
    match tile.kind {
        BlockKind::Normal => String::new(),
        BlockKind::Bomb => "B".to_string(),
        BlockKind::Shield => "S".to_string(),
        BlockKind::Multiply => "x3".to_string(),
        BlockKind::Timer => tile.countdown.map(|c| c.to_string()).unwrap_or_default(),
    }
}

fn draw_tile(
    buf: &mut Buffer,
    theme: &Theme,
    board: Rect,
    pos: Position,
    tile: &Tile,
    order: Option<usize>,
    dimmed: bool,
) {
    let (x0, y0) = cell_origin(board, pos);
    let fill = |i: u16| match tile.color {
        BlockColor::Rainbow => theme.hues[(i as usize + pos.col) % theme.hues.len()],
        c => theme.block_color(c),
    };

    let mut fg = Style::default().fg(Color::Black).add_modifier(Modifier::BOLD);
    if order.is_some() {
        fg = fg.fg(Color::White).add_modifier(Modifier::REVERSED);
    }

    let top = tile_label(tile);
    let bottom = match order {
        Some(i) => (i + 1).to_string(),
        None if tile.is_stone() => "▓".repeat(CELL_WIDTH as usize),
        None if tile.locked => "▒".repeat(CELL_WIDTH as usize),
        None if tile.shift_counter.is_some() => "~".to_string(),
        None => String::new(),
    };

    for (dy, text) in [top, bottom].iter().enumerate().take(CELL_HEIGHT as usize) {
        let chars: Vec<char> = text.chars().collect();
        let pad = (CELL_WIDTH as usize).saturating_sub(chars.len()) / 2;
        for dx in 0..CELL_WIDTH {
            let Some(cell) = buf.cell_mut((x0 + dx, y0 + dy as u16)) else {
                continue;
            };
            let ch = (dx as usize)
                .checked_sub(pad)
                .and_then(|i| chars.get(i))
                .copied()
                .unwrap_or(' ');
            let style = if dimmed {
                Style::default().fg(fill(dx)).bg(theme.bg)
            } else {
                fg.bg(fill(dx))
            };
            let ch = if dimmed && ch == ' ' { '░' } else { ch };
            cell.set_char(ch).set_style(style);
        }
    }
}

fn format_time(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// Floating-text style summary of the last commit, e.g. `+250  +15s  x3`.
fn clear_summary(outcome: &CommitOutcome) -> String {
    let mut parts = vec![format!("+{}", outcome.points)];
    if outcome.time_bonus > 0 {
        parts.push(format!("+{}s", outcome.time_bonus));
    }
    if outcome.multiplier_granted {
        parts.push("x3".to_string());
    }
    parts.join("  ")
}

fn draw_sidebar(
    frame: &mut Frame,
    game: &Game,
    theme: &Theme,
    area: Rect,
    last_clear: Option<&CommitOutcome>,
    stone_penalty: usize,
) {
    let state = &game.state;
    let label = Style::default().fg(theme.title);
    let fg = Style::default().fg(theme.main_fg);

    let outer = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg));
    let inner = outer.inner(area);
    outer.render(area, frame.buffer_mut());

    let time_style = if state.time_left < LOW_TIME {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    } else {
        fg
    };
    let mut lines = vec![
        Line::from(vec![
            Span::styled("Score  ", label),
            Span::styled(format!("{} / {}", state.score, state.target_score), fg),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("Time   ", label),
            Span::styled(format_time(state.time_left), time_style),
        ]),
    ];
    if state.active_multiplier > 1 {
        lines.push(Line::from(vec![
            Span::styled("Bonus  ", label),
            Span::styled(
                format!("x{}", state.active_multiplier),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
        ]));
    }
    if !game.path().is_empty() {
        let color = game.chain_color().map_or("any", BlockColor::name);
        lines.push(Line::from(vec![
            Span::styled("Chain  ", label),
            Span::styled(format!("{} {}", game.path().len(), color), fg),
        ]));
    }
    if let Some(outcome) = last_clear {
        lines.push(Line::from(vec![
            Span::styled("Last   ", label),
            Span::styled(clear_summary(outcome), Style::default().fg(Color::Yellow)),
        ]));
        lines.push(Line::from(vec![
            Span::styled("       ", label),
            Span::styled(format!("{} blocks", outcome.removed.len()), fg),
        ]));
    }
    if stone_penalty > 0 {
        lines.push(Line::from(Span::styled(
            format!("{stone_penalty} to stone! -500 -10s"),
            Style::default().fg(Color::Red),
        )));
    }
    lines.extend([
        Line::from(""),
        Line::from(Span::styled("* any colour  B row", Style::default().fg(theme.inactive_fg))),
        Line::from(Span::styled("S +15s  x3 bonus", Style::default().fg(theme.inactive_fg))),
        Line::from(Span::styled("▒ locked  ▓ stone", Style::default().fg(theme.inactive_fg))),
        Line::from(""),
        Line::from(Span::styled("Esc drop  R retry  M menu", Style::default().fg(theme.inactive_fg))),
    ]);
    Paragraph::new(lines).render(inner, frame.buffer_mut());

    // Progress gauge on the line under the score.
    if inner.height > 1 {
        let ratio = if state.target_score > 0 {
            (f64::from(state.score) / f64::from(state.target_score)).min(1.0)
        } else {
            0.0
        };
        Gauge::default()
            .ratio(ratio)
            .label("")
            .gauge_style(Style::default().fg(theme.hues[1]).bg(theme.bg))
            .render(
                Rect::new(inner.x, inner.y + 1, inner.width, 1),
                frame.buffer_mut(),
            );
    }
}
