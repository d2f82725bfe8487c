//! Roll terms and their evaluation

use serde::{Deserialize, Serialize};

use super::expression::DiceExpression;
use super::DiceRoller;

/// Upper bound on extra dice added by explosions for a single term
pub const MAX_EXPLOSIONS: usize = 100;

/// Modifiers a die term may carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum DieModifier {
    KeepHighest(u32),
    KeepLowest(u32),
    /// Explode on the given face, or on the maximum face when `None`
    Explode(Option<u32>),
}

impl std::fmt::Display for DieModifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::KeepHighest(n) => write!(f, "kh{}", n),
            Self::KeepLowest(n) => write!(f, "kl{}", n),
            Self::Explode(None) => f.write_str("x"),
            Self::Explode(Some(face)) => write!(f, "x{}", face),
        }
    }
}

/// A single rolled face
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DieResult {
    pub result: u32,
    pub active: bool,
    pub discarded: bool,
    /// This face triggered an explosion
    pub exploded: bool,
}

impl DieResult {
    pub fn new(result: u32) -> Self {
        Self {
            result,
            active: true,
            discarded: false,
            exploded: false,
        }
    }

    pub fn discard(&mut self) {
        self.active = false;
        self.discarded = true;
    }

    pub fn keep(&mut self) {
        self.active = true;
        self.discarded = false;
    }
}

/// `NdF` with modifiers, plus its rolled faces once evaluated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DieTerm {
    pub number: u32,
    pub faces: u32,
    #[serde(default)]
    pub modifiers: Vec<DieModifier>,
    #[serde(default)]
    pub results: Vec<DieResult>,
}

impl DieTerm {
    pub fn new(number: u32, faces: u32, modifiers: Vec<DieModifier>) -> Self {
        Self {
            number,
            faces,
            modifiers,
            results: Vec::new(),
        }
    }

    pub fn formula(&self) -> String {
        let modifiers: String = self.modifiers.iter().map(|m| m.to_string()).collect();
        format!("{}d{}{}", self.number, self.faces, modifiers)
    }

    /// The explicit keep-highest count, if any
    pub fn keep_highest(&self) -> Option<u32> {
        self.modifiers.iter().find_map(|m| match m {
            DieModifier::KeepHighest(n) => Some(*n),
            _ => None,
        })
    }

    /// Roll this term's dice from scratch, replacing any previous results
    pub fn evaluate(&mut self, roller: &dyn DiceRoller) {
        self.results = (0..self.number)
            .map(|_| DieResult::new(roller.roll_die(self.faces)))
            .collect();

        let explode_on = self.modifiers.iter().find_map(|m| match m {
            DieModifier::Explode(face) => Some(face.unwrap_or(self.faces)),
            _ => None,
        });
        if let Some(threshold) = explode_on {
            self.explode(threshold, roller);
        }

        let keeps: Vec<DieModifier> = self
            .modifiers
            .iter()
            .copied()
            .filter(|m| !matches!(m, DieModifier::Explode(_)))
            .collect();
        for modifier in keeps {
            match modifier {
                DieModifier::KeepHighest(n) => keep_active(&mut self.results, n as usize, true),
                DieModifier::KeepLowest(n) => keep_active(&mut self.results, n as usize, false),
                DieModifier::Explode(_) => {}
            }
        }
    }

    fn explode(&mut self, threshold: u32, roller: &dyn DiceRoller) {
        let mut added = 0;
        let mut i = 0;
        while i < self.results.len() && added < MAX_EXPLOSIONS {
            if self.results[i].result == threshold {
                self.results[i].exploded = true;
                self.results.push(DieResult::new(roller.roll_die(self.faces)));
                added += 1;
            }
            i += 1;
        }
    }

    pub fn total(&self) -> i64 {
        self.results
            .iter()
            .filter(|r| r.active)
            .map(|r| i64::from(r.result))
            .sum()
    }

    pub fn exploded_count(&self) -> usize {
        self.results.iter().filter(|r| r.exploded).count()
    }
}

/// Keep `keep` active faces (highest or lowest), discarding the rest of the active ones
fn keep_active(results: &mut [DieResult], keep: usize, highest: bool) {
    let mut active: Vec<usize> = (0..results.len()).filter(|&i| results[i].active).collect();
    if active.len() <= keep {
        return;
    }
    active.sort_by_key(|&i| results[i].result);
    if !highest {
        active.reverse();
    }
    let discard = active.len() - keep;
    for &i in &active[..discard] {
        results[i].discard();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Add,
    Subtract,
}

impl Operator {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
        }
    }
}

/// One term of a roll
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "class", content = "term", rename_all = "snake_case")]
pub enum RollTerm {
    Die(DieTerm),
    Numeric(i64),
    Operator(Operator),
}

impl RollTerm {
    fn formula(&self) -> String {
        match self {
            Self::Die(die) => die.formula(),
            Self::Numeric(n) => n.to_string(),
            Self::Operator(op) => op.symbol().to_string(),
        }
    }
}

pub(crate) fn formula_of(terms: &[RollTerm]) -> String {
    terms
        .iter()
        .map(RollTerm::formula)
        .collect::<Vec<_>>()
        .join(" ")
}

fn total_of(terms: &[RollTerm]) -> i64 {
    let mut total: i64 = 0;
    let mut sign = 1;
    for term in terms {
        match term {
            RollTerm::Operator(Operator::Add) => sign = 1,
            RollTerm::Operator(Operator::Subtract) => sign = -1,
            RollTerm::Die(die) => {
                total = total.saturating_add(sign * die.total());
                sign = 1;
            }
            RollTerm::Numeric(n) => {
                total = total.saturating_add(sign * n);
                sign = 1;
            }
        }
    }
    total
}

/// An evaluated dice roll. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roll {
    formula: String,
    terms: Vec<RollTerm>,
    total: i64,
}

impl Roll {
    /// Evaluate every die term of an expression
    pub fn evaluate(expression: &DiceExpression, roller: &dyn DiceRoller) -> Self {
        let terms = expression
            .terms()
            .iter()
            .cloned()
            .map(|term| match term {
                RollTerm::Die(mut die) => {
                    die.evaluate(roller);
                    RollTerm::Die(die)
                }
                other => other,
            })
            .collect();
        Self::from_terms(terms)
    }

    /// Build a roll from already-evaluated terms
    pub fn from_terms(terms: Vec<RollTerm>) -> Self {
        Self {
            formula: formula_of(&terms),
            total: total_of(&terms),
            terms,
        }
    }

    pub fn formula(&self) -> &str {
        &self.formula
    }

    pub fn terms(&self) -> &[RollTerm] {
        &self.terms
    }

    pub fn total(&self) -> i64 {
        self.total
    }

    pub fn dice(&self) -> impl Iterator<Item = &DieTerm> {
        self.terms.iter().filter_map(|t| match t {
            RollTerm::Die(die) => Some(die),
            _ => None,
        })
    }

    /// Number of faces across all dice that triggered an explosion
    pub fn exploded_count(&self) -> usize {
        self.dice().map(DieTerm::exploded_count).sum()
    }

    /// Human-readable breakdown, one line per die term.
    ///
    /// Discarded faces are wrapped in parentheses, exploding faces carry a `!`.
    pub fn tooltip(&self) -> String {
        let mut lines: Vec<String> = self
            .dice()
            .map(|die| {
                let faces: Vec<String> = die
                    .results
                    .iter()
                    .map(|r| {
                        let face = if r.exploded {
                            format!("{}!", r.result)
                        } else {
                            r.result.to_string()
                        };
                        if r.discarded {
                            format!("({})", face)
                        } else {
                            face
                        }
                    })
                    .collect();
                format!("{}: [{}] = {}", die.formula(), faces.join(", "), die.total())
            })
            .collect();
        lines.push(format!("{} = {}", self.formula, self.total));
        lines.join("\n")
    }
}
