//! Square block grid: building, adjacency, and collapse with refill.

use crate::block::{Block, BlockFactory, BlockId};
use crate::level::LevelConfig;
use std::collections::HashSet;

/// Grid coordinate. Row 0 is the top.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Orthogonal neighbours only; identical and diagonal positions are not adjacent.
    pub fn is_adjacent(self, other: Self) -> bool {
        let dr = self.row.abs_diff(other.row);
        let dc = self.col.abs_diff(other.col);
        (dr == 1 && dc == 0) || (dr == 0 && dc == 1)
    }
}

/// Square grid of blocks. `rows[r][c]`, rows[0] is the top.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grid {
    rows: Vec<Vec<Block>>,
}

impl Grid {
    /// Fill a `size`×`size` grid in row-major order.
    pub fn generate(size: usize, config: &LevelConfig, factory: &mut BlockFactory) -> Self {
        let rows = (0..size)
            .map(|_| (0..size).map(|_| factory.generate(config)).collect())
            .collect();
        Self { rows }
    }

    /// Wrap prepared rows. Returns `None` unless the rows form a square.
    pub fn from_rows(rows: Vec<Vec<Block>>) -> Option<Self> {
        let size = rows.len();
        rows.iter().all(|r| r.len() == size).then_some(Self { rows })
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn get(&self, pos: Position) -> Option<&Block> {
        self.rows.get(pos.row).and_then(|row| row.get(pos.col))
    }

    #[inline]
    pub fn get_mut(&mut self, pos: Position) -> Option<&mut Block> {
        self.rows.get_mut(pos.row).and_then(|row| row.get_mut(pos.col))
    }

    pub fn row(&self, row: usize) -> &[Block] {
        self.rows.get(row).map_or(&[], Vec::as_slice)
    }

    /// All cells with their positions, row-major.
    pub fn cells(&self) -> impl Iterator<Item = (Position, &Block)> {
        self.rows.iter().enumerate().flat_map(|(r, row)| {
            row.iter()
                .enumerate()
                .map(move |(c, block)| (Position::new(r, c), block))
        })
    }

    pub fn blocks_mut(&mut self) -> impl Iterator<Item = &mut Block> {
        self.rows.iter_mut().flatten()
    }

    pub fn position_of(&self, id: BlockId) -> Option<Position> {
        self.cells().find(|(_, b)| b.id == id).map(|(pos, _)| pos)
    }

    /// In-bounds 4-neighbours of `pos`.
    pub fn neighbours(&self, pos: Position) -> impl Iterator<Item = Position> + use<> {
        let size = self.size();
        let up = pos.row.checked_sub(1).map(|r| Position::new(r, pos.col));
        let down = (pos.row + 1 < size).then(|| Position::new(pos.row + 1, pos.col));
        let left = pos.col.checked_sub(1).map(|c| Position::new(pos.row, c));
        let right = (pos.col + 1 < size).then(|| Position::new(pos.row, pos.col + 1));
        [up, down, left, right].into_iter().flatten()
    }

    /// Drop surviving blocks to the bottom of each column and refill the top with
    /// fresh blocks. Survivors keep their relative order. `self` is left untouched.
    pub fn collapse(
        &self,
        remove: &HashSet<BlockId>,
        config: &LevelConfig,
        factory: &mut BlockFactory,
    ) -> Self {
        let size = self.size();
        let mut columns: Vec<Vec<Block>> = Vec::with_capacity(size);
        for c in 0..size {
            let kept: Vec<Block> = self
                .rows
                .iter()
                .map(|row| &row[c])
                .filter(|b| !remove.contains(&b.id))
                .cloned()
                .collect();
            let missing = size - kept.len();
            let mut column: Vec<Block> = (0..missing).map(|_| factory.generate(config)).collect();
            column.extend(kept);
            columns.push(column);
        }

        let rows = (0..size)
            .map(|r| columns.iter().map(|col| col[r].clone()).collect())
            .collect();
        Self { rows }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{BlockColor, BlockKind};
    use crate::level::LEVELS;

    fn column(grid: &Grid, c: usize) -> Vec<BlockId> {
        (0..grid.size())
            .map(|r| grid.get(Position::new(r, c)).unwrap().id)
            .collect()
    }

    #[test]
    fn test_adjacency() {
        let p = Position::new(2, 2);
        for q in [
            Position::new(1, 2),
            Position::new(3, 2),
            Position::new(2, 1),
            Position::new(2, 3),
        ] {
            assert!(p.is_adjacent(q));
            assert!(q.is_adjacent(p));
        }
        for q in [
            Position::new(2, 2),
            Position::new(1, 1),
            Position::new(3, 3),
            Position::new(0, 2),
            Position::new(2, 4),
        ] {
            assert!(!p.is_adjacent(q));
        }
    }

    #[test]
    fn test_adjacency_exhaustive() {
        for r1 in 0..4 {
            for c1 in 0..4 {
                for r2 in 0..4 {
                    for c2 in 0..4 {
                        let a = Position::new(r1, c1);
                        let b = Position::new(r2, c2);
                        let expected = r1.abs_diff(r2) + c1.abs_diff(c2) == 1;
                        assert_eq!(a.is_adjacent(b), expected);
                    }
                }
            }
        }
    }

    #[test]
    fn test_generate_is_square() {
        let mut factory = BlockFactory::new(1);
        let grid = Grid::generate(6, &LEVELS[2], &mut factory);
        assert_eq!(grid.size(), 6);
        assert_eq!(grid.cells().count(), 36);
    }

    #[test]
    fn test_from_rows_rejects_ragged() {
        let b = Block::new(BlockId(0), BlockColor::Red, BlockKind::Normal);
        assert!(Grid::from_rows(vec![vec![b.clone(), b.clone()], vec![b]]).is_none());
    }

    #[test]
    fn test_neighbours_at_corner() {
        let mut factory = BlockFactory::new(1);
        let grid = Grid::generate(3, &LEVELS[0], &mut factory);
        let n: Vec<_> = grid.neighbours(Position::new(0, 0)).collect();
        assert_eq!(n, [Position::new(1, 0), Position::new(0, 1)]);
        assert_eq!(grid.neighbours(Position::new(1, 1)).count(), 4);
    }

    #[test]
    fn test_collapse_nothing_removed() {
        let mut factory = BlockFactory::new(2);
        let grid = Grid::generate(5, &LEVELS[0], &mut factory);
        let next = grid.collapse(&HashSet::new(), &LEVELS[0], &mut factory);
        assert_eq!(next, grid);
    }

    #[test]
    fn test_collapse_keeps_order_and_refills_top() {
        let mut factory = BlockFactory::new(3);
        let grid = Grid::generate(5, &LEVELS[0], &mut factory);
        let before = column(&grid, 1);
        let before_other = column(&grid, 3);
        // Remove rows 1 and 3 of column 1.
        let remove: HashSet<_> = [before[1], before[3]].into_iter().collect();

        let next = grid.collapse(&remove, &LEVELS[0], &mut factory);
        assert_eq!(next.size(), 5);
        let after = column(&next, 1);
        assert_eq!(&after[2..], &[before[0], before[2], before[4]]);
        for id in &after[..2] {
            assert!(!before.contains(id));
        }
        assert_eq!(column(&next, 3), before_other);
        // Input grid is untouched.
        assert_eq!(column(&grid, 1), before);
    }

    #[test]
    fn test_collapse_full_column() {
        let mut factory = BlockFactory::new(4);
        let grid = Grid::generate(4, &LEVELS[0], &mut factory);
        let before = column(&grid, 0);
        let remove: HashSet<_> = before.iter().copied().collect();
        let next = grid.collapse(&remove, &LEVELS[0], &mut factory);
        let after = column(&next, 0);
        assert!(after.iter().all(|id| !before.contains(id)));
        assert_eq!(next.cells().count(), 16);
    }

    #[test]
    fn test_position_of() {
        let mut factory = BlockFactory::new(5);
        let grid = Grid::generate(4, &LEVELS[0], &mut factory);
        let pos = Position::new(2, 3);
        let id = grid.get(pos).unwrap().id;
        assert_eq!(grid.position_of(id), Some(pos));
        assert_eq!(grid.position_of(BlockId(9999)), None);
    }
}
