//! Chain scoring.

/// Points per cleared block before multipliers.
const POINTS_PER_BLOCK: u32 = 10;

/// Factor applied when the chain contains a multiply block.
const MULTIPLY_BONUS: u32 = 3;

/// Step multiplier for the length of the selected chain.
pub fn chain_multiplier(chain_len: usize) -> u32 {
    match chain_len {
        10.. => 10,
        5.. => 5,
        3.. => 2,
        _ => 1,
    }
}

/// Points for a committed chain. `cleared` counts every removed block, including
/// colour-wipe and bomb extras, so it may exceed `chain_len`.
pub fn calculate_score(
    chain_len: usize,
    cleared: usize,
    active_multiplier: u32,
    multiply_bonus: bool,
) -> u32 {
    let bonus = if multiply_bonus { MULTIPLY_BONUS } else { 1 };
    u32::try_from(cleared)
        .unwrap_or(u32::MAX)
        .saturating_mul(POINTS_PER_BLOCK)
        .saturating_mul(chain_multiplier(chain_len))
        .saturating_mul(active_multiplier)
        .saturating_mul(bonus)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_values() {
        assert_eq!(calculate_score(1, 10, 1, false), 100);
        assert_eq!(calculate_score(5, 5, 1, false), 250);
        assert_eq!(calculate_score(5, 5, 2, true), 1500);
    }

    #[test]
    fn test_chain_steps() {
        let steps: Vec<u32> = (0..12).map(chain_multiplier).collect();
        assert_eq!(steps, [1, 1, 1, 2, 2, 5, 5, 5, 5, 5, 10, 10]);
    }

    #[test]
    fn test_monotonic() {
        for len in 0..15 {
            for cleared in 0..30 {
                for mult in 1..4 {
                    for bonus in [false, true] {
                        let s = calculate_score(len, cleared, mult, bonus);
                        assert!(calculate_score(len + 1, cleared, mult, bonus) >= s);
                        assert!(calculate_score(len, cleared + 1, mult, bonus) >= s);
                        assert!(calculate_score(len, cleared, mult + 1, bonus) >= s);
                        assert!(calculate_score(len, cleared, mult, true) >= s);
                    }
                }
            }
        }
    }

    #[test]
    fn test_saturates() {
        assert_eq!(calculate_score(10, usize::MAX, 3, true), u32::MAX);
    }
}
