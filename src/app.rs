//! App: terminal init, main loop, one-second tick, key and mouse handling.

use crate::game::{CommitOutcome, Game, Status};
use crate::input::{Action, Cursor, cell_at, key_to_action};
use crate::level::{self, LEVELS};
use crate::theme::Theme;
use crate::{Args, GameConfig};
use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};
use ratatui::DefaultTerminal;
use ratatui::layout::Rect;
use std::time::{Duration, Instant};

/// Game clock resolution.
const TICK: Duration = Duration::from_secs(1);
/// Redraw at most this often while idle.
const FRAME: Duration = Duration::from_millis(33);

pub struct App {
    theme: Theme,
    game: Game,
    cursor: Cursor,
    /// Level highlighted on the menu.
    menu_level: u32,
    last_tick: Instant,
    /// Shown in the sidebar until the next commit or level start.
    last_clear: Option<CommitOutcome>,
    /// Timer blocks that turned to stone on the last penalised tick.
    stone_penalty: usize,
    /// Left button held on the board.
    dragging: bool,
}

impl App {
    pub fn new(args: &Args, config: &GameConfig, theme: Theme) -> Result<Self> {
        // Reject a bad --level before touching the terminal.
        level::lookup(args.level)?;
        let mut app = Self {
            theme,
            game: Game::new(config),
            cursor: Cursor::default(),
            menu_level: args.level,
            last_tick: Instant::now(),
            last_clear: None,
            stone_penalty: 0,
            dragging: false,
        };
        if args.no_menu {
            app.start_level(args.level)?;
        }
        Ok(app)
    }

    /// Every path into a fresh board goes through here so the clock and
    /// the sidebar notices start clean.
    fn on_level_started(&mut self) {
        self.last_tick = Instant::now();
        self.last_clear = None;
        self.stone_penalty = 0;
        self.dragging = false;
        self.cursor.clamp(self.game.state.grid_size);
    }

    fn start_level(&mut self, level: u32) -> Result<()> {
        self.game.start_level(level)?;
        self.on_level_started();
        Ok(())
    }

    fn restart(&mut self) -> Result<()> {
        self.game.restart()?;
        self.on_level_started();
        Ok(())
    }

    fn next_level(&mut self) -> Result<()> {
        self.game.next_level()?;
        self.on_level_started();
        Ok(())
    }

    fn to_menu(&mut self) {
        self.menu_level = self.game.state.level;
        self.dragging = false;
        self.game.to_menu();
    }

    fn record_commit(&mut self, outcome: Option<CommitOutcome>) {
        if let Some(outcome) = outcome {
            self.cursor.pos = outcome.anchor;
            self.stone_penalty = 0;
            self.last_clear = Some(outcome);
        }
    }

    /// Returns `true` when the app should exit.
    fn handle_action(&mut self, action: Action) -> Result<bool> {
        if action == Action::Quit {
            return Ok(true);
        }
        match self.game.state.status {
            Status::Menu => {
                let count = LEVELS.len() as u32;
                match action {
                    Action::Up | Action::Left => {
                        self.menu_level = if self.menu_level <= 1 { count } else { self.menu_level - 1 };
                    }
                    Action::Down | Action::Right => {
                        self.menu_level = if self.menu_level >= count { 1 } else { self.menu_level + 1 };
                    }
                    Action::Select => self.start_level(self.menu_level)?,
                    _ => {}
                }
            }
            Status::Playing => match action {
                Action::Up | Action::Down | Action::Left | Action::Right => {
                    if let Some(pos) = self.cursor.step(action, self.game.grid.size()) {
                        self.game.pointer_enter(pos);
                    }
                }
                Action::Select => {
                    if self.game.path().is_empty() {
                        self.game.pointer_down(self.cursor.pos);
                    } else {
                        let outcome = self.game.pointer_up();
                        self.record_commit(outcome);
                    }
                }
                Action::Cancel => self.game.cancel(),
                Action::Restart => self.restart()?,
                Action::Menu => self.to_menu(),
                Action::Quit | Action::None => {}
            },
            Status::Won => match action {
                Action::Select => self.next_level()?,
                Action::Restart => self.restart()?,
                Action::Menu => self.to_menu(),
                _ => {}
            },
            Status::Lost => match action {
                Action::Select | Action::Restart => self.restart()?,
                Action::Menu => self.to_menu(),
                _ => {}
            },
        }
        Ok(false)
    }

    /// `board` is `None` while the board is not on screen.
    fn handle_mouse(&mut self, mouse: MouseEvent, board: Option<Rect>) {
        if self.game.state.status != Status::Playing {
            return;
        }
        let Some(board) = board else {
            return;
        };
        let cell = cell_at(board, self.game.grid.size(), mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(pos) = cell {
                    self.cursor.pos = pos;
                    self.game.pointer_down(pos);
                    self.dragging = true;
                }
            }
            MouseEventKind::Drag(MouseButton::Left) if self.dragging => {
                // Only react when the pointer crosses into a new cell.
                if let Some(pos) = cell.filter(|&p| p != self.cursor.pos) {
                    self.cursor.pos = pos;
                    self.game.pointer_enter(pos);
                }
            }
            MouseEventKind::Up(MouseButton::Left) if self.dragging => {
                self.dragging = false;
                let outcome = self.game.pointer_up();
                self.record_commit(outcome);
            }
            _ => {}
        }
    }

    fn tick(&mut self) {
        // Catch up if the loop stalled; each second still counts once.
        while self.game.state.status == Status::Playing && self.last_tick.elapsed() >= TICK {
            self.last_tick += TICK;
            let outcome = self.game.tick();
            if outcome.penalty_applied {
                self.stone_penalty = outcome.expired;
            }
        }
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            event::{DisableMouseCapture, EnableMouseCapture},
            execute,
            terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
        };

        enable_raw_mode().context("enabling raw mode")?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
            .context("entering alternate screen")?;
        let mut terminal =
            ratatui::DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))
                .context("creating terminal")?;

        let result = self.run_loop(&mut terminal);

        // Restore
        execute!(std::io::stdout(), DisableMouseCapture, LeaveAlternateScreen)?;
        disable_raw_mode()?;

        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        loop {
            terminal.draw(|f| {
                crate::ui::draw(
                    f,
                    &self.game,
                    &self.theme,
                    self.cursor.pos,
                    self.menu_level,
                    self.last_clear.as_ref(),
                    self.stone_penalty,
                )
            })?;

            let (cols, rows) = crossterm::terminal::size().unwrap_or((80, 24));
            let board = crate::ui::board_rect(Rect::new(0, 0, cols, rows), self.game.grid.size());

            let timeout = if self.game.state.status == Status::Playing {
                (self.last_tick + TICK)
                    .saturating_duration_since(Instant::now())
                    .min(FRAME)
            } else {
                FRAME
            };

            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    match event::read()? {
                        Event::Key(key) if key.kind == KeyEventKind::Press => {
                            if self.handle_action(key_to_action(key))? {
                                return Ok(());
                            }
                        }
                        Event::Mouse(mouse) => self.handle_mouse(mouse, board),
                        _ => {}
                    }
                }
            }

            self.tick();
        }
    }
}
