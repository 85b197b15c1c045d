//! Key bindings (normal and vim-style) and mouse-to-cell mapping.

use crate::grid::Position;
use crate::ui::{CELL_HEIGHT, CELL_WIDTH, GAP};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::layout::Rect;

/// Action from a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Up,
    Down,
    Left,
    Right,
    /// Start a chain at the cursor, or commit the chain in progress.
    Select,
    /// Drop the chain in progress.
    Cancel,
    Restart,
    Menu,
    Quit,
    None,
}

/// Map key event to game action. Supports both normal (arrows, enter) and vim (hjkl).
pub fn key_to_action(key: KeyEvent) -> Action {
    let KeyEvent { code, modifiers, .. } = key;
    if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
        return Action::Quit;
    }
    let no_mod = modifiers.is_empty() || modifiers == KeyModifiers::SHIFT;
    if !no_mod {
        return Action::None;
    }
    match code {
        KeyCode::Char('q') => Action::Quit,
        KeyCode::Esc => Action::Cancel,
        KeyCode::Up | KeyCode::Char('k') => Action::Up,
        KeyCode::Down | KeyCode::Char('j') => Action::Down,
        KeyCode::Left | KeyCode::Char('h') => Action::Left,
        KeyCode::Right | KeyCode::Char('l') => Action::Right,
        KeyCode::Enter | KeyCode::Char(' ') => Action::Select,
        KeyCode::Char('r' | 'R') => Action::Restart,
        KeyCode::Char('m' | 'M') => Action::Menu,
        _ => Action::None,
    }
}

/// Grid cell under terminal coordinate (`x`, `y`) for a board drawn at `board`
/// (inner area, gap included). Gaps between cells and anything outside the grid map to `None`.
pub fn cell_at(board: Rect, size: usize, x: u16, y: u16) -> Option<Position> {
    let dx = x.checked_sub(board.x)?.checked_sub(GAP)?;
    let dy = y.checked_sub(board.y)?.checked_sub(GAP)?;
    let (stride_x, stride_y) = (CELL_WIDTH + GAP, CELL_HEIGHT + GAP);
    let (col, row) = ((dx / stride_x) as usize, (dy / stride_y) as usize);
    if col >= size || row >= size {
        return None;
    }
    let inside = dx % stride_x < CELL_WIDTH && dy % stride_y < CELL_HEIGHT;
    inside.then_some(Position::new(row, col))
}

/// Keyboard cursor clamped to the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pub pos: Position,
}

impl Cursor {
    /// Move one cell; returns the new position when it actually moved.
    pub fn step(&mut self, action: Action, size: usize) -> Option<Position> {
        let Position { row, col } = self.pos;
        let last = size.saturating_sub(1);
        let next = match action {
            Action::Up => Position::new(row.saturating_sub(1), col),
            Action::Down => Position::new((row + 1).min(last), col),
            Action::Left => Position::new(row, col.saturating_sub(1)),
            Action::Right => Position::new(row, (col + 1).min(last)),
            _ => return None,
        };
        (next != self.pos).then(|| {
            self.pos = next;
            next
        })
    }

    pub fn clamp(&mut self, size: usize) {
        let last = size.saturating_sub(1);
        self.pos = Position::new(self.pos.row.min(last), self.pos.col.min(last));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_key_bindings() {
        let none = KeyModifiers::NONE;
        assert_eq!(key_to_action(key(KeyCode::Char('h'), none)), Action::Left);
        assert_eq!(key_to_action(key(KeyCode::Up, none)), Action::Up);
        assert_eq!(key_to_action(key(KeyCode::Char(' '), none)), Action::Select);
        assert_eq!(key_to_action(key(KeyCode::Esc, none)), Action::Cancel);
        assert_eq!(key_to_action(key(KeyCode::Char('R'), KeyModifiers::SHIFT)), Action::Restart);
        assert_eq!(key_to_action(key(KeyCode::Char('c'), KeyModifiers::CONTROL)), Action::Quit);
        assert_eq!(key_to_action(key(KeyCode::Char('h'), KeyModifiers::ALT)), Action::None);
    }

    #[test]
    fn test_cell_at_interior_and_gaps() {
        let board = Rect::new(10, 5, 100, 100);
        let x0 = board.x + GAP;
        let y0 = board.y + GAP;
        assert_eq!(cell_at(board, 5, x0, y0), Some(Position::new(0, 0)));
        assert_eq!(
            cell_at(board, 5, x0 + CELL_WIDTH - 1, y0 + CELL_HEIGHT - 1),
            Some(Position::new(0, 0))
        );
        // Gap right of the first cell.
        assert_eq!(cell_at(board, 5, x0 + CELL_WIDTH, y0), None);
        let x2 = x0 + 2 * (CELL_WIDTH + GAP);
        let y1 = y0 + CELL_HEIGHT + GAP;
        assert_eq!(cell_at(board, 5, x2, y1), Some(Position::new(1, 2)));
    }

    #[test]
    fn test_cell_at_outside() {
        let board = Rect::new(10, 5, 100, 100);
        assert_eq!(cell_at(board, 5, 0, 0), None);
        assert_eq!(cell_at(board, 5, board.x, board.y), None);
        let beyond = board.x + GAP + 5 * (CELL_WIDTH + GAP);
        assert_eq!(cell_at(board, 5, beyond, board.y + GAP), None);
    }

    #[test]
    fn test_cursor_clamps() {
        let mut cursor = Cursor::default();
        assert_eq!(cursor.step(Action::Up, 5), None);
        assert_eq!(cursor.step(Action::Right, 5), Some(Position::new(0, 1)));
        cursor.pos = Position::new(4, 4);
        assert_eq!(cursor.step(Action::Down, 5), None);
        cursor.pos = Position::new(6, 6);
        cursor.clamp(5);
        assert_eq!(cursor.pos, Position::new(4, 4));
    }
}
