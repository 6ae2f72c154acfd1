//! Chemical formula parsing.
//!
//! Accepts element symbols with optional decimal amounts and nested groups in
//! `()`, `[]` or `{}` with an optional multiplier, e.g. `LiBH4`,
//! `Mg(BH4)2`, `La0.8Ce0.2Ni5`. Whitespace is ignored.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::elements;

/// Deepest bracket nesting accepted.
const MAX_DEPTH: usize = 16;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompositionError {
    #[error("empty formula")]
    Empty,

    #[error("unknown element {0:?}")]
    UnknownElement(String),

    #[error("unexpected character {0:?} at position {1}")]
    UnexpectedChar(char, usize),

    #[error("unbalanced brackets")]
    Unbalanced,

    #[error("invalid amount {0:?}")]
    InvalidAmount(String),

    #[error("brackets nested deeper than {0}")]
    TooDeep(usize),

    #[error("total amount is zero")]
    ZeroAmount,
}

/// Element symbol -> amount, as written in the formula (not normalised).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Composition {
    amounts: BTreeMap<&'static str, f64>,
}

impl Composition {
    pub fn parse(formula: &str) -> Result<Self, CompositionError> {
        let chars: Vec<char> = formula.chars().filter(|c| !c.is_whitespace()).collect();
        if chars.is_empty() {
            return Err(CompositionError::Empty);
        }

        let mut parser = Parser { chars, pos: 0 };
        let mut amounts = parser.group(None, 0)?;
        amounts.retain(|_, amt| *amt > 0.0);

        if amounts.is_empty() {
            return Err(CompositionError::ZeroAmount);
        }
        Ok(Self { amounts })
    }

    pub fn amount(&self, symbol: &str) -> f64 {
        self.amounts.get(symbol).copied().unwrap_or(0.0)
    }

    pub fn num_atoms(&self) -> f64 {
        self.amounts.values().sum()
    }

    /// Mole fraction of each element; fractions sum to 1.
    pub fn fractions(&self) -> BTreeMap<&'static str, f64> {
        let total = self.num_atoms();
        self.amounts
            .iter()
            .map(|(el, amt)| (*el, amt / total))
            .collect()
    }
}

impl fmt::Display for Composition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (el, amt)) in self.amounts.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}{}", el, amt)?;
        }
        Ok(())
    }
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    /// Parse until `close` (or end of input at top level).
    fn group(
        &mut self,
        close: Option<char>,
        depth: usize,
    ) -> Result<BTreeMap<&'static str, f64>, CompositionError> {
        if depth > MAX_DEPTH {
            return Err(CompositionError::TooDeep(MAX_DEPTH));
        }

        let mut amounts: BTreeMap<&'static str, f64> = BTreeMap::new();
        let mut saw_term = false;

        loop {
            let Some(c) = self.peek() else {
                if close.is_some() {
                    return Err(CompositionError::Unbalanced);
                }
                break;
            };

            if Some(c) == close {
                self.pos += 1;
                break;
            }

            match c {
                '(' | '[' | '{' => {
                    self.pos += 1;
                    let inner = self.group(Some(closing(c)), depth + 1)?;
                    let mult = self.amount()?.unwrap_or(1.0);
                    for (el, amt) in inner {
                        *amounts.entry(el).or_insert(0.0) += amt * mult;
                    }
                }
                ')' | ']' | '}' => return Err(CompositionError::Unbalanced),
                c if c.is_ascii_uppercase() => {
                    let symbol = self.symbol();
                    let el = elements::lookup(&symbol)
                        .ok_or(CompositionError::UnknownElement(symbol))?;
                    let amt = self.amount()?.unwrap_or(1.0);
                    *amounts.entry(el).or_insert(0.0) += amt;
                }
                other => return Err(CompositionError::UnexpectedChar(other, self.pos)),
            }
            saw_term = true;
        }

        if !saw_term {
            return Err(CompositionError::Empty);
        }
        Ok(amounts)
    }

    /// Uppercase letter followed by any run of lowercase letters.
    fn symbol(&mut self) -> String {
        let start = self.pos;
        self.pos += 1;
        while matches!(self.peek(), Some(c) if c.is_ascii_lowercase()) {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn amount(&mut self) -> Result<Option<f64>, CompositionError> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit() || c == '.') {
            self.pos += 1;
        }
        if start == self.pos {
            return Ok(None);
        }
        let raw: String = self.chars[start..self.pos].iter().collect();
        raw.parse::<f64>()
            .map(Some)
            .map_err(|_| CompositionError::InvalidAmount(raw))
    }
}

fn closing(open: char) -> char {
    match open {
        '(' => ')',
        '[' => ']',
        _ => '}',
    }
}
