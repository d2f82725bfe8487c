//! Dice expression parsing
//!
//! Supports the subset of dice notation used by weapon profiles:
//! `NdF` terms with `khN`/`klN`/`x`/`xN` modifiers, integer constants and `+`/`-`.
//! Whitespace between terms is ignored and `dF` is shorthand for `1dF`.

use nom::{
    branch::alt,
    bytes::complete::tag_no_case,
    character::complete::{char, digit1, space0},
    combinator::{all_consuming, map, map_res, opt, value},
    multi::many0,
    sequence::{delimited, pair, preceded, tuple},
    IResult,
};

use super::roll::{DieModifier, DieTerm, Operator, RollTerm};
use super::DiceError;

/// Upper bound on the dice a single term may request
pub const MAX_DICE_PER_TERM: u32 = 1000;

/// Upper bound on a flat value inside an expression
pub const MAX_CONSTANT: i64 = 1_000_000;

/// A parsed, unevaluated dice expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiceExpression {
    terms: Vec<RollTerm>,
}

impl DiceExpression {
    pub fn parse(input: &str) -> Result<Self, DiceError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(DiceError::Empty);
        }

        let (_, terms) = expression(trimmed).map_err(|_| DiceError::Parse {
            expression: trimmed.to_string(),
        })?;

        for term in &terms {
            if let RollTerm::Numeric(n) = term {
                if *n > MAX_CONSTANT {
                    return Err(DiceError::ConstantTooLarge {
                        value: *n,
                        max: MAX_CONSTANT,
                    });
                }
            }
            if let RollTerm::Die(die) = term {
                if die.faces == 0 {
                    return Err(DiceError::InvalidDie {
                        term: die.formula(),
                        reason: "dice need at least one face".to_string(),
                    });
                }
                if die.number > MAX_DICE_PER_TERM {
                    return Err(DiceError::InvalidDie {
                        term: die.formula(),
                        reason: format!("at most {} dice per term", MAX_DICE_PER_TERM),
                    });
                }
            }
        }

        Ok(Self { terms })
    }

    pub fn terms(&self) -> &[RollTerm] {
        &self.terms
    }

    pub fn formula(&self) -> String {
        super::roll::formula_of(&self.terms)
    }

    /// Rewrite every die term so it explodes and keeps only its original die count.
    ///
    /// `explode_face` of `None` explodes on each die's maximum face.
    pub fn with_overkill(mut self, explode_face: Option<u32>) -> Self {
        for term in &mut self.terms {
            if let RollTerm::Die(die) = term {
                let mut modifiers = vec![
                    DieModifier::Explode(explode_face),
                    DieModifier::KeepHighest(die.number),
                ];
                modifiers.append(&mut die.modifiers);
                die.modifiers = modifiers;
            }
        }
        self
    }
}

impl std::str::FromStr for DiceExpression {
    type Err = DiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for DiceExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.formula())
    }
}

fn expression(input: &str) -> IResult<&str, Vec<RollTerm>> {
    map(
        all_consuming(tuple((
            opt(operator),
            operand,
            many0(pair(operator, operand)),
        ))),
        |(leading, first, rest)| {
            let mut terms = Vec::with_capacity(1 + rest.len() * 2);
            if let Some(op) = leading {
                terms.push(RollTerm::Operator(op));
            }
            terms.push(first);
            for (op, term) in rest {
                terms.push(RollTerm::Operator(op));
                terms.push(term);
            }
            terms
        },
    )(input)
}

fn operator(input: &str) -> IResult<&str, Operator> {
    delimited(
        space0,
        alt((
            value(Operator::Add, char('+')),
            value(Operator::Subtract, char('-')),
        )),
        space0,
    )(input)
}

fn operand(input: &str) -> IResult<&str, RollTerm> {
    delimited(
        space0,
        alt((
            map(die_term, RollTerm::Die),
            map(map_res(digit1, str::parse::<i64>), RollTerm::Numeric),
        )),
        space0,
    )(input)
}

fn die_term(input: &str) -> IResult<&str, DieTerm> {
    map(
        tuple((opt(count), tag_no_case("d"), count, many0(modifier))),
        |(number, _, faces, modifiers)| DieTerm::new(number.unwrap_or(1), faces, modifiers),
    )(input)
}

fn modifier(input: &str) -> IResult<&str, DieModifier> {
    alt((
        map(preceded(tag_no_case("kh"), opt(count)), |n| {
            DieModifier::KeepHighest(n.unwrap_or(1))
        }),
        map(preceded(tag_no_case("kl"), opt(count)), |n| {
            DieModifier::KeepLowest(n.unwrap_or(1))
        }),
        map(preceded(tag_no_case("x"), opt(count)), DieModifier::Explode),
    ))(input)
}

fn count(input: &str) -> IResult<&str, u32> {
    map_res(digit1, str::parse::<u32>)(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_die() {
        let expr = DiceExpression::parse("2d6").unwrap();
        assert_eq!(expr.terms().len(), 1);
        match &expr.terms()[0] {
            RollTerm::Die(die) => {
                assert_eq!(die.number, 2);
                assert_eq!(die.faces, 6);
                assert!(die.modifiers.is_empty());
            }
            other => panic!("Expected die term, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_compound_expression() {
        let expr = DiceExpression::parse(" 1d6 + 2d3kh1 - 2 ").unwrap();
        assert_eq!(expr.terms().len(), 5);
        assert_eq!(expr.formula(), "1d6 + 2d3kh1 - 2");
        assert!(matches!(expr.terms()[3], RollTerm::Operator(Operator::Subtract)));
        assert!(matches!(expr.terms()[4], RollTerm::Numeric(2)));
    }

    #[test]
    fn test_parse_shorthand_and_modifiers() {
        let expr = DiceExpression::parse("d20x").unwrap();
        match &expr.terms()[0] {
            RollTerm::Die(die) => {
                assert_eq!(die.number, 1);
                assert_eq!(die.modifiers, vec![DieModifier::Explode(None)]);
            }
            other => panic!("Expected die term, got {:?}", other),
        }

        let expr = DiceExpression::parse("3D6x1kh2").unwrap();
        match &expr.terms()[0] {
            RollTerm::Die(die) => assert_eq!(
                die.modifiers,
                vec![DieModifier::Explode(Some(1)), DieModifier::KeepHighest(2)]
            ),
            other => panic!("Expected die term, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_flat_value() {
        let expr = DiceExpression::parse("4").unwrap();
        assert_eq!(expr.terms(), &[RollTerm::Numeric(4)]);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(DiceExpression::parse(""), Err(DiceError::Empty)));
        assert!(matches!(
            DiceExpression::parse("2d"),
            Err(DiceError::Parse { .. })
        ));
        assert!(matches!(
            DiceExpression::parse("1d6 +"),
            Err(DiceError::Parse { .. })
        ));
        assert!(matches!(
            DiceExpression::parse("2d0"),
            Err(DiceError::InvalidDie { .. })
        ));
    }

    #[test]
    fn test_parse_bounds_flat_values() {
        assert!(DiceExpression::parse("1d6 + 1000000").is_ok());
        assert_eq!(
            DiceExpression::parse("9223372036854775807+1"),
            Err(DiceError::ConstantTooLarge {
                value: i64::MAX,
                max: MAX_CONSTANT,
            })
        );
        assert!(matches!(
            DiceExpression::parse("99999999999999999999"),
            Err(DiceError::Parse { .. })
        ));
    }

    #[test]
    fn test_overkill_rewrite_keeps_original_count() {
        let expr = DiceExpression::parse("2d6+1").unwrap().with_overkill(None);
        assert_eq!(expr.formula(), "2d6xkh2 + 1");

        let expr = DiceExpression::parse("1d6kh1").unwrap().with_overkill(Some(1));
        assert_eq!(expr.formula(), "1d6x1kh1kh1");
    }
}
