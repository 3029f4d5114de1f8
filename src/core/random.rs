//! Random generation for the `random` command.
//!
//! Generators take the RNG as a parameter so the bot can use the thread RNG while tests
//! use a seeded one.

use crate::errors::{Error, Result};
use rand::Rng;

/// Lower bound when `random number` is called without `min`.
pub const DEFAULT_MIN: i64 = 1;
/// Upper bound when `random number` is called without `max`.
pub const DEFAULT_MAX: i64 = 100;
/// Sides when `random dice` is called without `sides`.
pub const DEFAULT_SIDES: u32 = 6;
/// Fewest sides a die may have.
pub const MIN_SIDES: u32 = 2;

const D6_FACES: [&str; 6] = ["⚀", "⚁", "⚂", "⚃", "⚄", "⚅"];

/// Uniform integer in `min..=max`. Requires `min < max`.
pub fn random_number<R: Rng + ?Sized>(rng: &mut R, min: i64, max: i64) -> Result<i64> {
    if min >= max {
        return Err(Error::validation(
            "The minimum value must be less than the maximum value.",
        ));
    }
    Ok(rng.random_range(min..=max))
}

/// Result of a coin flip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoinSide {
    /// Heads
    Heads,
    /// Tails
    Tails,
}

impl CoinSide {
    /// Display name.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Heads => "Heads",
            Self::Tails => "Tails",
        }
    }

    /// Emoji shown next to the result.
    #[must_use]
    pub const fn emoji(self) -> &'static str {
        match self {
            Self::Heads => "🪙",
            Self::Tails => "💿",
        }
    }
}

/// Fair coin flip.
pub fn flip_coin<R: Rng + ?Sized>(rng: &mut R) -> CoinSide {
    if rng.random_bool(0.5) {
        CoinSide::Heads
    } else {
        CoinSide::Tails
    }
}

/// Rolls a die with `sides` faces, returning a value in `1..=sides`.
pub fn roll_dice<R: Rng + ?Sized>(rng: &mut R, sides: u32) -> Result<u32> {
    if sides < MIN_SIDES {
        return Err(Error::validation(format!(
            "A die needs at least {MIN_SIDES} sides."
        )));
    }
    Ok(rng.random_range(1..=sides))
}

/// Face glyph for a roll; standard d6 rolls get their unicode face.
#[must_use]
pub fn die_face(sides: u32, value: u32) -> &'static str {
    if sides == 6 {
        value
            .checked_sub(1)
            .and_then(|index| D6_FACES.get(index as usize))
            .copied()
            .unwrap_or("🎲")
    } else {
        "🎲"
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn test_random_number_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for (min, max) in [(1, 100), (-5, 5), (0, 1), (i64::MAX - 1, i64::MAX)] {
            for _ in 0..200 {
                let value = random_number(&mut rng, min, max).unwrap();
                assert!((min..=max).contains(&value), "{value} outside {min}..={max}");
            }
        }
    }

    #[test]
    fn test_random_number_hits_both_bounds() {
        let mut rng = StdRng::seed_from_u64(11);
        let values: Vec<i64> = (0..500)
            .map(|_| random_number(&mut rng, 1, 3).unwrap())
            .collect();
        assert!(values.contains(&1));
        assert!(values.contains(&3));
    }

    #[test]
    fn test_random_number_rejects_equal_or_inverted_bounds() {
        let mut rng = StdRng::seed_from_u64(1);
        for (min, max) in [(5, 5), (10, 1)] {
            let err = random_number(&mut rng, min, max).unwrap_err();
            assert!(matches!(err, Error::Validation { .. }));
            assert_eq!(
                err.user_message(),
                "The minimum value must be less than the maximum value."
            );
        }
    }

    #[test]
    fn test_roll_dice_range() {
        let mut rng = StdRng::seed_from_u64(3);
        for sides in [2, 6, 20, 100] {
            for _ in 0..200 {
                let value = roll_dice(&mut rng, sides).unwrap();
                assert!((1..=sides).contains(&value));
            }
        }
    }

    #[test]
    fn test_roll_dice_rejects_too_few_sides() {
        let mut rng = StdRng::seed_from_u64(3);
        assert!(roll_dice(&mut rng, 1).is_err());
        assert!(roll_dice(&mut rng, 0).is_err());
    }

    #[test]
    fn test_flip_coin_produces_both_sides() {
        let mut rng = StdRng::seed_from_u64(5);
        let flips: Vec<CoinSide> = (0..100).map(|_| flip_coin(&mut rng)).collect();
        assert!(flips.contains(&CoinSide::Heads));
        assert!(flips.contains(&CoinSide::Tails));
    }

    #[test]
    fn test_die_face() {
        assert_eq!(die_face(6, 1), "⚀");
        assert_eq!(die_face(6, 6), "⚅");
        assert_eq!(die_face(20, 6), "🎲");
        assert_eq!(die_face(6, 0), "🎲");
    }
}
