//! Critical-hit transform
//!
//! A critical hit rolls twice as many dice but keeps the same count. Rather than
//! re-rolling, the already-displayed faces are carried over and merged with a
//! fresh set, so a critical result never contradicts the normal one.

use super::roll::{DieModifier, DieResult, DieTerm, Roll, RollTerm};
use super::DiceRoller;

/// Derive the critical roll for an evaluated normal roll.
///
/// Every die term keeps its original faces, gains an equal number of fresh ones
/// (rolled with the same modifiers) and keeps the original kept-count across the
/// merged pool. Flat values and operators pass through unchanged.
///
/// Only keep-highest pools are merged. A term that keeps its lowest dice would
/// get worse with more dice, so it is carried over exactly as rolled.
pub fn crit_roll(normal: &Roll, roller: &dyn DiceRoller) -> Roll {
    let terms = normal
        .terms()
        .iter()
        .map(|term| match term {
            RollTerm::Die(die) => RollTerm::Die(crit_term(die, roller)),
            other => other.clone(),
        })
        .collect();
    Roll::from_terms(terms)
}

fn crit_term(die: &DieTerm, roller: &dyn DiceRoller) -> DieTerm {
    let keeps_lowest = die
        .modifiers
        .iter()
        .any(|m| matches!(m, DieModifier::KeepLowest(_)));
    if keeps_lowest {
        return die.clone();
    }

    let mut fresh = DieTerm::new(die.number, die.faces, die.modifiers.clone());
    fresh.evaluate(roller);

    let keep = die.keep_highest().unwrap_or(die.number);
    let mut modifiers = die.modifiers.clone();
    if die.keep_highest().is_none() {
        modifiers.push(DieModifier::KeepHighest(die.number));
    }

    DieTerm {
        number: die.number * 2,
        faces: die.faces,
        modifiers,
        results: merge_crit_faces(&die.results, &fresh.results, keep as usize),
    }
}

/// Merge original and fresh faces, keeping the highest `keep` of the active ones.
///
/// Faces already discarded in either set stay discarded. The partition depends
/// only on the merged faces: active faces sorted ascending, the lowest
/// `active - keep` discarded.
pub fn merge_crit_faces(
    original: &[DieResult],
    fresh: &[DieResult],
    keep: usize,
) -> Vec<DieResult> {
    let mut merged: Vec<DieResult> = original.iter().chain(fresh.iter()).copied().collect();

    let mut active: Vec<usize> = (0..merged.len()).filter(|&i| merged[i].active).collect();
    active.sort_by_key(|&i| merged[i].result);

    let discard = active.len().saturating_sub(keep);
    for (rank, &i) in active.iter().enumerate() {
        if rank < discard {
            merged[i].discard();
        } else {
            merged[i].keep();
        }
    }
    merged
}
