//! Level table and per-level generation settings.

use crate::block::BlockColor;
use thiserror::Error;

/// Time limit in seconds for levels without their own.
pub const MAX_TIME: u32 = 180;

/// Chains at least this long also wipe every block of the chain colour.
pub const CHAIN_BONUS_THRESHOLD: usize = 5;

/// Generation and goal settings for one level. Probabilities are independent draws in [0, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct LevelConfig {
    pub size: usize,
    pub target_score: u32,
    pub colors: &'static [BlockColor],
    pub special_chance: f64,
    pub locked_chance: f64,
    pub changing_chance: f64,
    pub timer_chance: f64,
    pub rainbow_chance: f64,
    pub time_limit: Option<u32>,
}

#[derive(Debug, Error, PartialEq)]
pub enum LevelError {
    #[error("no level {0}")]
    Unknown(u32),
    #[error("level {0}: grid size must be at least 1")]
    EmptyGrid(u32),
    #[error("level {0}: colour palette is empty")]
    NoColors(u32),
    #[error("level {level}: {name} = {value} is not a probability")]
    BadChance {
        level: u32,
        name: &'static str,
        value: f64,
    },
}

const THREE: &[BlockColor] = &[BlockColor::Red, BlockColor::Blue, BlockColor::Yellow];
const FOUR: &[BlockColor] = &[
    BlockColor::Red,
    BlockColor::Blue,
    BlockColor::Yellow,
    BlockColor::Green,
];
const FIVE: &[BlockColor] = &[
    BlockColor::Red,
    BlockColor::Blue,
    BlockColor::Yellow,
    BlockColor::Green,
    BlockColor::Purple,
];

/// Built-in levels; level `n` is `LEVELS[n - 1]`.
pub static LEVELS: [LevelConfig; 6] = [
    LevelConfig {
        size: 5,
        target_score: 2000,
        colors: THREE,
        special_chance: 0.05,
        locked_chance: 0.0,
        changing_chance: 0.0,
        timer_chance: 0.0,
        rainbow_chance: 0.0,
        time_limit: None,
    },
    LevelConfig {
        size: 5,
        target_score: 5000,
        colors: FOUR,
        special_chance: 0.08,
        locked_chance: 0.05,
        changing_chance: 0.0,
        timer_chance: 0.0,
        rainbow_chance: 0.02,
        time_limit: None,
    },
    LevelConfig {
        size: 6,
        target_score: 12000,
        colors: FIVE,
        special_chance: 0.1,
        locked_chance: 0.1,
        changing_chance: 0.0,
        timer_chance: 0.05,
        rainbow_chance: 0.03,
        time_limit: None,
    },
    LevelConfig {
        size: 6,
        target_score: 20000,
        colors: FIVE,
        special_chance: 0.12,
        locked_chance: 0.15,
        changing_chance: 0.0,
        timer_chance: 0.1,
        rainbow_chance: 0.04,
        time_limit: Some(240),
    },
    LevelConfig {
        size: 7,
        target_score: 35000,
        colors: FIVE,
        special_chance: 0.15,
        locked_chance: 0.2,
        changing_chance: 0.05,
        timer_chance: 0.15,
        rainbow_chance: 0.05,
        time_limit: Some(300),
    },
    // Chaos: lots of timers, little time.
    LevelConfig {
        size: 7,
        target_score: 50000,
        colors: FIVE,
        special_chance: 0.2,
        locked_chance: 0.1,
        changing_chance: 0.1,
        timer_chance: 0.2,
        rainbow_chance: 0.08,
        time_limit: Some(180),
    },
];

/// Look up and validate level `n` (1-based).
pub fn lookup(level: u32) -> Result<&'static LevelConfig, LevelError> {
    let config = (level as usize)
        .checked_sub(1)
        .and_then(|i| LEVELS.get(i))
        .ok_or(LevelError::Unknown(level))?;
    config.validate(level)?;
    Ok(config)
}

/// Level that follows `level`; wraps to 1 after the last.
pub fn next(level: u32) -> u32 {
    if (level as usize) < LEVELS.len() { level + 1 } else { 1 }
}

impl LevelConfig {
    pub fn validate(&self, level: u32) -> Result<(), LevelError> {
        if self.size == 0 {
            return Err(LevelError::EmptyGrid(level));
        }
        if self.colors.is_empty() {
            return Err(LevelError::NoColors(level));
        }
        let chances = [
            ("special_chance", self.special_chance),
            ("locked_chance", self.locked_chance),
            ("changing_chance", self.changing_chance),
            ("timer_chance", self.timer_chance),
            ("rainbow_chance", self.rainbow_chance),
        ];
        for (name, value) in chances {
            if !(0.0..=1.0).contains(&value) {
                return Err(LevelError::BadChance { level, name, value });
            }
        }
        Ok(())
    }

    /// Starting time in seconds: the level's own limit or `MAX_TIME`.
    pub fn time_limit(&self) -> u32 {
        self.time_limit.unwrap_or(MAX_TIME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_levels_valid() {
        for n in 1..=LEVELS.len() as u32 {
            assert!(lookup(n).is_ok(), "level {n}");
        }
    }

    #[test]
    fn test_unknown_levels() {
        assert_eq!(lookup(0), Err(LevelError::Unknown(0)));
        assert_eq!(lookup(7), Err(LevelError::Unknown(7)));
    }

    #[test]
    fn test_next_wraps() {
        assert_eq!(next(1), 2);
        assert_eq!(next(5), 6);
        assert_eq!(next(6), 1);
    }

    #[test]
    fn test_time_limit_default() {
        assert_eq!(LEVELS[0].time_limit(), MAX_TIME);
        assert_eq!(LEVELS[4].time_limit(), 300);
    }

    #[test]
    fn test_validate_rejects_bad_chance() {
        let mut config = LEVELS[0].clone();
        config.locked_chance = 1.5;
        assert!(matches!(
            config.validate(1),
            Err(LevelError::BadChance { name: "locked_chance", .. })
        ));
        config.locked_chance = 0.0;
        config.colors = &[];
        assert_eq!(config.validate(1), Err(LevelError::NoColors(1)));
    }
}
