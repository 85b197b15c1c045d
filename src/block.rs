//! Blocks and the weighted random block factory.

use crate::level::LevelConfig;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Shift counter given to freshly generated shifting blocks.
const SHIFT_COUNTER: u8 = 3;

/// Timer blocks start with a countdown in `COUNTDOWN_MIN..COUNTDOWN_MAX` seconds.
const COUNTDOWN_MIN: u8 = 10;
const COUNTDOWN_MAX: u8 = 20;

/// Block colours. The first five are the playable hues; `Rainbow` is a wildcard and
/// `Stone` is what an expired timer block turns into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockColor {
    Red,
    Blue,
    Yellow,
    Purple,
    Green,
    Rainbow,
    Stone,
}

impl BlockColor {
    pub const HUES: [Self; 5] = [Self::Red, Self::Blue, Self::Yellow, Self::Purple, Self::Green];

    /// Index 0..5 into the theme's hue palette; `None` for rainbow and stone.
    pub fn hue_index(self) -> Option<usize> {
        Self::HUES.iter().position(|&c| c == self)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Blue => "blue",
            Self::Yellow => "yellow",
            Self::Purple => "purple",
            Self::Green => "green",
            Self::Rainbow => "rainbow",
            Self::Stone => "stone",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockKind {
    #[default]
    Normal,
    /// Clears its whole row when part of a committed chain.
    Bomb,
    /// Grants bonus time.
    Shield,
    /// Triples the chain score and arms the x3 multiplier for the next chain.
    Multiply,
    /// Counts down each second; turns to stone at zero.
    Timer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub id: BlockId,
    pub color: BlockColor,
    pub kind: BlockKind,
    pub locked: bool,
    /// Colour-shift marker. Carried and displayed, but no rule consumes it.
    pub shifting: bool,
    pub shift_counter: Option<u8>,
    /// Seconds left; only set on live timer blocks.
    pub countdown: Option<u8>,
}

impl Block {
    /// Plain unlocked block, mostly for building fixed boards.
    pub fn new(id: BlockId, color: BlockColor, kind: BlockKind) -> Self {
        Self {
            id,
            color,
            kind,
            locked: false,
            shifting: false,
            shift_counter: None,
            countdown: None,
        }
    }

    pub fn is_stone(&self) -> bool {
        self.color == BlockColor::Stone
    }

    pub fn is_rainbow(&self) -> bool {
        self.color == BlockColor::Rainbow
    }

    /// Locked and stone blocks can never join a chain.
    pub fn is_selectable(&self) -> bool {
        !self.locked && !self.is_stone()
    }

    /// Turn an expired timer block into locked stone.
    pub fn petrify(&mut self) {
        self.color = BlockColor::Stone;
        self.kind = BlockKind::Normal;
        self.locked = true;
        self.countdown = None;
    }
}

/// Generates blocks for a level. Owns the RNG and hands out unique ids.
#[derive(Debug, Clone)]
pub struct BlockFactory {
    rng: StdRng,
    next_id: u64,
}

impl BlockFactory {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            next_id: 0,
        }
    }

    pub fn next_id(&mut self) -> BlockId {
        let id = BlockId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Draw one block. The draw order is colour, type, lock, shift.
    pub fn generate(&mut self, config: &LevelConfig) -> Block {
        let color = if self.chance(config.rainbow_chance) || config.colors.is_empty() {
            BlockColor::Rainbow
        } else {
            config.colors[self.rng.random_range(0..config.colors.len())]
        };
        let rainbow = color == BlockColor::Rainbow;

        let mut kind = BlockKind::Normal;
        let mut countdown = None;
        if !rainbow && self.chance(config.special_chance) {
            let roll: f64 = self.rng.random();
            kind = if roll < 0.30 {
                BlockKind::Bomb
            } else if roll < 0.60 {
                BlockKind::Shield
            } else {
                BlockKind::Multiply
            };
        } else if !rainbow && self.chance(config.timer_chance) {
            kind = BlockKind::Timer;
            countdown = Some(self.rng.random_range(COUNTDOWN_MIN..COUNTDOWN_MAX));
        }

        // The lock roll is always drawn so the RNG stream does not depend on type.
        let locked = self.chance(config.locked_chance) && kind != BlockKind::Timer && !rainbow;
        let shifting = self.chance(config.changing_chance);

        Block {
            id: self.next_id(),
            color,
            kind,
            locked,
            shifting,
            shift_counter: shifting.then_some(SHIFT_COUNTER),
            countdown,
        }
    }

    fn chance(&mut self, p: f64) -> bool {
        self.rng.random::<f64>() < p
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::{LEVELS, LevelConfig};

    fn everything_config() -> LevelConfig {
        LevelConfig {
            size: 6,
            target_score: 1000,
            colors: &BlockColor::HUES,
            special_chance: 0.3,
            locked_chance: 1.0,
            changing_chance: 0.5,
            timer_chance: 0.6,
            rainbow_chance: 0.3,
            time_limit: None,
        }
    }

    #[test]
    fn test_never_locked_timer_or_rainbow() {
        let mut factory = BlockFactory::new(7);
        let config = everything_config();
        let mut saw_timer = false;
        let mut saw_rainbow = false;
        for _ in 0..2000 {
            let b = factory.generate(&config);
            if b.kind == BlockKind::Timer {
                saw_timer = true;
                assert!(!b.locked);
            }
            if b.is_rainbow() {
                saw_rainbow = true;
                assert!(!b.locked);
            }
        }
        assert!(saw_timer && saw_rainbow);
    }

    #[test]
    fn test_rainbow_is_always_normal() {
        let mut factory = BlockFactory::new(11);
        let config = everything_config();
        for _ in 0..2000 {
            let b = factory.generate(&config);
            if b.is_rainbow() {
                assert_eq!(b.kind, BlockKind::Normal);
                assert_eq!(b.countdown, None);
            }
        }
    }

    #[test]
    fn test_countdown_only_on_timers_and_in_range() {
        let mut factory = BlockFactory::new(3);
        let config = everything_config();
        for _ in 0..2000 {
            let b = factory.generate(&config);
            match b.kind {
                BlockKind::Timer => {
                    let c = b.countdown.unwrap();
                    assert!((COUNTDOWN_MIN..COUNTDOWN_MAX).contains(&c));
                }
                _ => assert_eq!(b.countdown, None),
            }
        }
    }

    #[test]
    fn test_colors_come_from_palette() {
        let mut factory = BlockFactory::new(5);
        let config = &LEVELS[0];
        for _ in 0..500 {
            let b = factory.generate(config);
            assert!(config.colors.contains(&b.color));
            assert!(!b.locked);
            assert_ne!(b.kind, BlockKind::Timer);
        }
    }

    #[test]
    fn test_shift_counter_follows_flag() {
        let mut factory = BlockFactory::new(9);
        let config = everything_config();
        for _ in 0..500 {
            let b = factory.generate(&config);
            assert_eq!(b.shift_counter.is_some(), b.shifting);
        }
    }

    #[test]
    fn test_ids_are_unique() {
        let mut factory = BlockFactory::new(1);
        let config = &LEVELS[0];
        let mut ids: Vec<_> = (0..100).map(|_| factory.generate(config).id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 100);
    }

    #[test]
    fn test_petrify() {
        let mut b = Block::new(BlockId(0), BlockColor::Red, BlockKind::Timer);
        b.countdown = Some(1);
        b.petrify();
        assert!(b.is_stone() && b.locked && !b.is_selectable());
        assert_eq!(b.kind, BlockKind::Normal);
        assert_eq!(b.countdown, None);
    }
}
