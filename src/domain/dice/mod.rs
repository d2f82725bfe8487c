//! Dice - expression parsing, evaluation and the critical-hit transform

mod crit;
mod expression;
mod roll;

pub use crit::{crit_roll, merge_crit_faces};
pub use expression::{DiceExpression, MAX_DICE_PER_TERM};
pub use roll::{DieModifier, DieResult, DieTerm, Operator, Roll, RollTerm, MAX_EXPLOSIONS};

/// Source of die faces
///
/// Implementations must return a value in `1..=faces`.
pub trait DiceRoller: Send + Sync {
    fn roll_die(&self, faces: u32) -> u32;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiceError {
    #[error("Empty dice expression")]
    Empty,
    #[error("Invalid dice expression: {expression}")]
    Parse { expression: String },
    #[error("Invalid die term {term}: {reason}")]
    InvalidDie { term: String, reason: String },
    #[error("Flat value {value} exceeds {max}")]
    ConstantTooLarge { value: i64, max: i64 },
}
