//! Game state: level lifecycle, chain selection, commit (score + collapse), timer tick.

use crate::block::{BlockColor, BlockFactory, BlockId, BlockKind};
use crate::grid::{Grid, Position};
use crate::level::{self, CHAIN_BONUS_THRESHOLD, LevelConfig, LevelError};
use crate::scoring::calculate_score;
use log::{debug, info};
use std::collections::HashSet;

/// Seconds added when a chain contains a shield block.
const SHIELD_TIME_BONUS: u32 = 15;

/// Active multiplier armed by a multiply block for the next chain.
const MULTIPLY_NEXT: u32 = 3;

/// Score and time lost on a tick where at least one timer block expires.
const EXPIRY_SCORE_PENALTY: u32 = 500;
const EXPIRY_TIME_PENALTY: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Menu,
    Playing,
    Won,
    Lost,
}

/// Scoreboard for the current level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    pub status: Status,
    pub score: u32,
    pub target_score: u32,
    /// Seconds left.
    pub time_left: u32,
    pub level: u32,
    pub grid_size: usize,
    /// Multiplier applied to the next chain (1 or 3).
    pub active_multiplier: u32,
}

impl GameState {
    fn menu(level: u32) -> Self {
        Self {
            status: Status::Menu,
            score: 0,
            target_score: 0,
            time_left: 0,
            level,
            grid_size: 0,
            active_multiplier: 1,
        }
    }
}

/// What a committed chain did; the UI turns this into floating text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitOutcome {
    pub points: u32,
    pub removed: Vec<BlockId>,
    pub time_bonus: u32,
    pub multiplier_granted: bool,
    /// Last cell of the chain.
    pub anchor: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickOutcome {
    /// Timer blocks that turned to stone this tick.
    pub expired: usize,
    pub penalty_applied: bool,
}

/// Owns the board, the scoreboard and the in-progress chain.
#[derive(Debug)]
pub struct Game {
    pub state: GameState,
    pub grid: Grid,
    path: Vec<Position>,
    config: &'static LevelConfig,
    factory: BlockFactory,
    /// Overrides every level's time limit when set.
    time_limit: Option<u32>,
}

impl Game {
    /// New game sitting in the menu at level 1.
    pub fn new(config: &crate::GameConfig) -> Self {
        let level_config = &level::LEVELS[0];
        Self {
            state: GameState::menu(1),
            grid: Grid::default(),
            path: Vec::new(),
            config: level_config,
            factory: BlockFactory::new(config.seed),
            time_limit: config.time_limit,
        }
    }

    pub fn path(&self) -> &[Position] {
        &self.path
    }

    /// Start (or restart) `level` with a fresh board and scoreboard.
    pub fn start_level(&mut self, level: u32) -> Result<(), LevelError> {
        let config = level::lookup(level)?;
        self.config = config;
        self.grid = Grid::generate(config.size, config, &mut self.factory);
        self.path.clear();
        self.state = GameState {
            status: Status::Playing,
            score: 0,
            target_score: config.target_score,
            time_left: self.time_limit.unwrap_or_else(|| config.time_limit()),
            level,
            grid_size: config.size,
            active_multiplier: 1,
        };
        info!(
            "level {} started: {}x{} grid, target {}, {}s",
            level, config.size, config.size, config.target_score, self.state.time_left
        );
        Ok(())
    }

    /// Advance to the next level, wrapping to 1 after the last.
    pub fn next_level(&mut self) -> Result<(), LevelError> {
        self.start_level(level::next(self.state.level))
    }

    pub fn restart(&mut self) -> Result<(), LevelError> {
        self.start_level(self.state.level)
    }

    pub fn to_menu(&mut self) {
        self.path.clear();
        self.state = GameState::menu(self.state.level);
    }

    fn playing(&self) -> bool {
        self.state.status == Status::Playing
    }

    /// Colour of the first non-rainbow block in the chain; `None` if empty or all rainbow.
    pub fn chain_color(&self) -> Option<BlockColor> {
        self.path
            .iter()
            .filter_map(|&p| self.grid.get(p))
            .map(|b| b.color)
            .find(|&c| c != BlockColor::Rainbow)
    }

    /// Begin a chain at `pos`. Locked and stone blocks cannot start one.
    pub fn pointer_down(&mut self, pos: Position) {
        if !self.playing() {
            return;
        }
        if self.grid.get(pos).is_some_and(|b| b.is_selectable()) {
            self.path = vec![pos];
        }
    }

    /// Extend, or backtrack, the chain as the pointer enters `pos`.
    pub fn pointer_enter(&mut self, pos: Position) {
        if !self.playing() {
            return;
        }
        let Some(&last) = self.path.last() else {
            return;
        };
        let Some(block) = self.grid.get(pos) else {
            return;
        };
        if !block.is_selectable() {
            return;
        }

        if self.path.len() > 1 && self.path[self.path.len() - 2] == pos {
            self.path.pop();
            return;
        }
        if !last.is_adjacent(pos) || self.path.contains(&pos) {
            return;
        }

        let matches = block.is_rainbow() || self.chain_color().is_none_or(|c| c == block.color);
        if matches {
            self.path.push(pos);
        }
    }

    /// Release: commit a chain of two or more, otherwise just drop it.
    pub fn pointer_up(&mut self) -> Option<CommitOutcome> {
        if !self.playing() || self.path.len() < 2 {
            self.path.clear();
            return None;
        }
        Some(self.commit())
    }

    /// Abandon the chain without committing.
    pub fn cancel(&mut self) {
        self.path.clear();
    }

    fn commit(&mut self) -> CommitOutcome {
        let chain_color = self.chain_color();
        let path = std::mem::take(&mut self.path);

        let mut remove: HashSet<BlockId> = HashSet::new();
        let mut removed: Vec<BlockId> = Vec::new();
        let mut add = |id: BlockId| {
            if remove.insert(id) {
                removed.push(id);
            }
        };

        let mut shield = false;
        let mut multiply = false;
        let mut bomb_rows = Vec::new();
        for &pos in &path {
            let Some(block) = self.grid.get(pos) else {
                continue;
            };
            add(block.id);
            match block.kind {
                BlockKind::Bomb => bomb_rows.push(pos.row),
                BlockKind::Shield => shield = true,
                BlockKind::Multiply => multiply = true,
                BlockKind::Normal | BlockKind::Timer => {}
            }
        }

        if path.len() >= CHAIN_BONUS_THRESHOLD {
            if let Some(color) = chain_color {
                for (_, b) in self.grid.cells() {
                    if b.color == color && !b.locked && !b.is_stone() {
                        add(b.id);
                    }
                }
            }
        }
        for row in bomb_rows {
            for b in self.grid.row(row) {
                add(b.id);
            }
        }

        let points = calculate_score(path.len(), removed.len(), self.state.active_multiplier, multiply);
        self.state.score = self.state.score.saturating_add(points);

        // Neighbours of cleared blocks lose their lock before gravity moves anything.
        let unlock: Vec<Position> = removed
            .iter()
            .filter_map(|&id| self.grid.position_of(id))
            .flat_map(|pos| self.grid.neighbours(pos))
            .collect();
        for pos in unlock {
            if let Some(b) = self.grid.get_mut(pos) {
                b.locked = false;
            }
        }

        self.grid = self.grid.collapse(&remove, self.config, &mut self.factory);

        let time_bonus = if shield { SHIELD_TIME_BONUS } else { 0 };
        self.state.time_left = self.state.time_left.saturating_add(time_bonus);
        self.state.active_multiplier = if multiply { MULTIPLY_NEXT } else { 1 };

        debug!(
            "chain of {} ({:?}) cleared {} blocks for {} points",
            path.len(),
            chain_color,
            removed.len(),
            points
        );
        if self.state.score >= self.state.target_score {
            self.state.status = Status::Won;
            info!("level {} won with {} points", self.state.level, self.state.score);
        }

        CommitOutcome {
            points,
            removed,
            time_bonus,
            multiplier_granted: multiply,
            anchor: path[path.len() - 1],
        }
    }

    /// One-second tick: game clock and timer blocks.
    pub fn tick(&mut self) -> TickOutcome {
        if !self.playing() {
            return TickOutcome::default();
        }
        if self.state.time_left <= 1 {
            self.state.time_left = 0;
            self.state.status = Status::Lost;
            info!("level {} lost: out of time at {} points", self.state.level, self.state.score);
        } else {
            self.state.time_left -= 1;
        }

        let mut expired = 0;
        for block in self.grid.blocks_mut() {
            if block.kind != BlockKind::Timer || block.is_stone() {
                continue;
            }
            match block.countdown {
                Some(n) if n > 1 => block.countdown = Some(n - 1),
                Some(_) => {
                    block.petrify();
                    expired += 1;
                }
                None => {}
            }
        }

        let penalty_applied = expired > 0;
        if penalty_applied {
            self.state.score = self.state.score.saturating_sub(EXPIRY_SCORE_PENALTY);
            self.state.time_left = self.state.time_left.saturating_sub(EXPIRY_TIME_PENALTY);
            info!("{expired} timer block(s) turned to stone");
        }
        TickOutcome {
            expired,
            penalty_applied,
        }
    }

    #[cfg(test)]
    fn with_grid(level: u32, grid: Grid) -> Self {
        let mut game = Self::new(&crate::GameConfig::default());
        game.start_level(level).unwrap();
        game.state.grid_size = grid.size();
        game.grid = grid;
        game
    }
}
