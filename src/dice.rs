//! Dice rolls and the roll probability model.
//!
//! A roll is an ordered pair of die values. Besides the rules queries used by
//! move generation (take-out targets, value splits), this module provides the
//! probability of reaching a combined value, including values reachable only
//! through a chain of doubles. Those probabilities are precomputed once into a
//! 36-entry table.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::constants::{DIE_FACES, PROBABILITY_MAX_DEPTH, PROBABILITY_TABLE_SIZE, TAKE_OUT_VALUES};
use crate::error::{Error, Result};

/// A pair of die values, each in `1..=6`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct DiceRoll {
    die1: u8,
    die2: u8,
}

impl DiceRoll {
    /// Every ordered roll.
    pub const ALL: [DiceRoll; 36] = all_rolls();

    /// Every unordered roll (`a <= b`).
    pub const ALL_NO_DUPL: [DiceRoll; 21] = unordered_rolls();

    /// Rolls that cover every distinct take-out when no marble is on the board.
    pub const ALL_START_NO_REPT: [DiceRoll; 6] = [
        DiceRoll::from_parts(1, 1),
        DiceRoll::from_parts(1, 2),
        DiceRoll::from_parts(1, 3),
        DiceRoll::from_parts(1, 4),
        DiceRoll::from_parts(1, 5),
        DiceRoll::from_parts(1, 6),
    ];

    /// The unordered rolls summing to seven.
    pub const SEVEN: [DiceRoll; 3] = [
        DiceRoll::from_parts(1, 6),
        DiceRoll::from_parts(2, 5),
        DiceRoll::from_parts(3, 4),
    ];

    pub fn new(die1: u8, die2: u8) -> Result<DiceRoll> {
        if !(1..=DIE_FACES).contains(&die1) || !(1..=DIE_FACES).contains(&die2) {
            return Err(Error::InvalidDice(format!("{die1}+{die2}")));
        }
        Ok(DiceRoll::from_parts(die1, die2))
    }

    const fn from_parts(die1: u8, die2: u8) -> DiceRoll {
        DiceRoll { die1, die2 }
    }

    /// Roll both dice.
    pub fn random(rng: &mut fastrand::Rng) -> DiceRoll {
        DiceRoll::from_parts(rng.u8(1..=DIE_FACES), rng.u8(1..=DIE_FACES))
    }

    #[inline]
    pub const fn die1(self) -> u8 {
        self.die1
    }

    #[inline]
    pub const fn die2(self) -> u8 {
        self.die2
    }

    #[inline]
    pub const fn sum(self) -> usize {
        self.die1 as usize + self.die2 as usize
    }

    #[inline]
    pub const fn is_doubles(self) -> bool {
        self.die1 == self.die2
    }

    /// Offsets a taken-out marble may land on.
    ///
    /// The die showing a 1 or a 6 lifts the marble onto the start square and
    /// the other die carries it forward. When both dice qualify, both landing
    /// offsets are offered.
    pub fn take_out_targets(self) -> Vec<usize> {
        self.exit_partners()
    }

    /// Values an on-board marble may advance while another marble is placed
    /// directly on the start square.
    pub fn take_out_combinations(self) -> Vec<usize> {
        self.exit_partners()
    }

    fn exit_partners(self) -> Vec<usize> {
        let first = TAKE_OUT_VALUES.contains(&self.die1);
        let second = TAKE_OUT_VALUES.contains(&self.die2);
        match (first, second) {
            (true, true) => vec![self.die1 as usize, self.die2 as usize],
            (true, false) => vec![self.die2 as usize],
            (false, true) => vec![self.die1 as usize],
            (false, false) => Vec::new(),
        }
    }

    /// Value assignments for moving `count` marbles.
    ///
    /// One marble gets the sum. Two marbles get one die each, in both orders
    /// (a single order for doubles).
    pub fn piece_values(self, count: usize) -> Result<Vec<Vec<usize>>> {
        let (a, b) = (self.die1 as usize, self.die2 as usize);
        match count {
            1 => Ok(vec![vec![a + b]]),
            2 if self.is_doubles() => Ok(vec![vec![a, b]]),
            2 => Ok(vec![vec![a, b], vec![b, a]]),
            n => Err(Error::InvalidPieceCount(n)),
        }
    }

    /// Distinct values usable from this roll: each die and the sum.
    pub fn values(self) -> Vec<usize> {
        let (a, b) = (self.die1 as usize, self.die2 as usize);
        if self.is_doubles() {
            vec![a, a + b]
        } else {
            vec![a, b, a + b]
        }
    }

    /// Remainder of the sum after spending `die_value`.
    pub fn subtract(self, die_value: usize) -> isize {
        self.sum() as isize - die_value as isize
    }

    /// Probability of rolling this roll's combined value.
    pub fn probability(self) -> f64 {
        probability_quick(self.sum())
    }

    /// Distance of the sum from seven, plus one. Seven ranks 1.
    pub fn probability_rank(self) -> f64 {
        (7 - self.sum() as i32).abs() as f64 + 1.0
    }

    /// Weight applied to evaluations reached through this roll.
    pub fn eval_weight(self) -> f64 {
        1.0 / self.probability_rank()
    }
}

impl fmt::Display for DiceRoll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{}", self.die1, self.die2)
    }
}

impl FromStr for DiceRoll {
    type Err = Error;

    fn from_str(s: &str) -> Result<DiceRoll> {
        let invalid = || Error::InvalidDice(s.to_string());
        let (a, b) = s.trim().split_once('+').ok_or_else(invalid)?;
        let die1 = a.trim().parse::<u8>().map_err(|_| invalid())?;
        let die2 = b.trim().parse::<u8>().map_err(|_| invalid())?;
        DiceRoll::new(die1, die2).map_err(|_| invalid())
    }
}

const fn all_rolls() -> [DiceRoll; 36] {
    let mut rolls = [DiceRoll::from_parts(1, 1); 36];
    let mut i = 0;
    while i < 36 {
        rolls[i] = DiceRoll::from_parts((i / 6) as u8 + 1, (i % 6) as u8 + 1);
        i += 1;
    }
    rolls
}

const fn unordered_rolls() -> [DiceRoll; 21] {
    let mut rolls = [DiceRoll::from_parts(1, 1); 21];
    let mut n = 0;
    let mut a = 1;
    while a <= DIE_FACES {
        let mut b = a;
        while b <= DIE_FACES {
            rolls[n] = DiceRoll::from_parts(a, b);
            n += 1;
            b += 1;
        }
        a += 1;
    }
    rolls
}

// =============================================================================
// Probability model
// =============================================================================

/// Number of ordered die pairs summing to `value`.
pub fn combinations(value: i32) -> u32 {
    (1..=DIE_FACES as i32)
        .filter(|&a| (1..=DIE_FACES as i32).contains(&(value - a)))
        .count() as u32
}

/// Probability of reaching exactly `number` in one turn, where each doubles
/// grants another roll. Chains deeper than two doubles are treated as impossible.
pub fn probability(number: i32, depth: u32) -> f64 {
    if number <= 12 {
        combinations(number) as f64 / 36.0
    } else if depth < PROBABILITY_MAX_DEPTH && number < PROBABILITY_TABLE_SIZE as i32 {
        let doubles = (6.0f64 / 36.0).powi(depth as i32 + 1);
        (2..=12)
            .step_by(2)
            .map(|i| doubles * probability(number - i, depth + 1))
            .sum()
    } else {
        0.0
    }
}

static PROBABILITIES: OnceLock<[f64; PROBABILITY_TABLE_SIZE]> = OnceLock::new();

fn make_probabilities() -> [f64; PROBABILITY_TABLE_SIZE] {
    let mut table = [0.0; PROBABILITY_TABLE_SIZE];
    for (n, p) in table.iter_mut().enumerate() {
        *p = probability(n as i32, 0);
    }
    table
}

/// Table lookup of [`probability`] at depth 0. Zero outside the table.
#[inline]
pub fn probability_quick(number: usize) -> f64 {
    PROBABILITIES
        .get_or_init(make_probabilities)
        .get(number)
        .copied()
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roll(a: u8, b: u8) -> DiceRoll {
        DiceRoll::new(a, b).unwrap()
    }

    #[test]
    fn test_new_validates() {
        assert!(DiceRoll::new(0, 3).is_err());
        assert!(DiceRoll::new(3, 7).is_err());
        assert!(DiceRoll::new(6, 6).is_ok());
    }

    #[test]
    fn test_parse_and_display() {
        let r: DiceRoll = "2+5".parse().unwrap();
        assert_eq!(r, roll(2, 5));
        assert_eq!(r.to_string(), "2+5");
        assert!("25".parse::<DiceRoll>().is_err());
        assert!("2+9".parse::<DiceRoll>().is_err());
        assert!("a+1".parse::<DiceRoll>().is_err());
    }

    #[test]
    fn test_take_out_targets() {
        assert_eq!(roll(1, 6).take_out_targets(), vec![1, 6]);
        assert_eq!(roll(6, 6).take_out_targets(), vec![6, 6]);
        assert_eq!(roll(1, 4).take_out_targets(), vec![4]);
        assert_eq!(roll(3, 6).take_out_targets(), vec![3]);
        assert!(roll(2, 5).take_out_targets().is_empty());
        assert_eq!(roll(4, 1).take_out_combinations(), vec![4]);
    }

    #[test]
    fn test_piece_values() {
        assert_eq!(roll(2, 5).piece_values(1).unwrap(), vec![vec![7]]);
        assert_eq!(roll(2, 5).piece_values(2).unwrap(), vec![vec![2, 5], vec![5, 2]]);
        assert_eq!(roll(3, 3).piece_values(2).unwrap(), vec![vec![3, 3]]);
        assert_eq!(roll(2, 5).piece_values(0), Err(Error::InvalidPieceCount(0)));
        assert_eq!(roll(2, 5).piece_values(3), Err(Error::InvalidPieceCount(3)));
    }

    #[test]
    fn test_values_and_subtract() {
        assert_eq!(roll(2, 5).values(), vec![2, 5, 7]);
        assert_eq!(roll(4, 4).values(), vec![4, 8]);
        assert_eq!(roll(2, 5).subtract(5), 2);
        assert_eq!(roll(2, 5).subtract(9), -2);
    }

    #[test]
    fn test_rank_and_weight() {
        assert_eq!(roll(3, 4).probability_rank(), 1.0);
        assert_eq!(roll(1, 1).probability_rank(), 6.0);
        assert_eq!(roll(6, 6).probability_rank(), 6.0);
        assert!((roll(1, 1).eval_weight() - 1.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_combinations() {
        let total: u32 = (2..=12).map(combinations).sum();
        assert_eq!(total, 36);
        assert_eq!(combinations(7), 6);
        assert_eq!(combinations(1), 0);
        assert_eq!(combinations(-3), 0);
        assert_eq!(combinations(13), 0);
    }

    #[test]
    fn test_probability_table_values() {
        let close = |a: f64, b: f64| (a - b).abs() < 1e-9;
        assert_eq!(probability_quick(0), 0.0);
        assert!(close(probability_quick(2), 1.0 / 36.0));
        assert!(close(probability_quick(7), 6.0 / 36.0));
        assert!(close(probability_quick(13), 0.0833333333333333));
        assert!(close(probability_quick(15), 0.0856481481481481));
        assert!(close(probability_quick(18), 0.0693158436213992));
        assert!(close(probability_quick(35), 0.000257201646090535));
        assert_eq!(probability_quick(36), 0.0);
    }

    #[test]
    fn test_roll_sets() {
        assert_eq!(DiceRoll::ALL.len(), 36);
        assert_eq!(DiceRoll::ALL[7], roll(2, 2));
        assert_eq!(DiceRoll::ALL_NO_DUPL[6], roll(2, 2));
        assert_eq!(DiceRoll::ALL_NO_DUPL[20], roll(6, 6));
        assert!(DiceRoll::ALL_NO_DUPL.iter().all(|r| r.die1() <= r.die2()));
        assert!(DiceRoll::SEVEN.iter().all(|r| r.sum() == 7));
    }

    #[test]
    fn test_random_roll_in_range() {
        let mut rng = fastrand::Rng::with_seed(7);
        for _ in 0..200 {
            let r = DiceRoll::random(&mut rng);
            assert!((1..=6).contains(&r.die1()) && (1..=6).contains(&r.die2()));
        }
    }
}
