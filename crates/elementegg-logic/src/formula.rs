//! Chemical formula parsing.
//!
//! Compounds carry their formula as display text (`"H2O"`, `"Ca(OH)2"`,
//! `"CuSO4·5H2O"`). The catalog parses it once at load time into a
//! [`Formula`] holding two per-element tallies:
//!
//! - **atoms**: stoichiometric atom count (`Ca(OH)2` → Ca 1, O 2, H 2)
//! - **mentions**: how many times the symbol token is written
//!   (`Ca(OH)2` → Ca 1, O 1, H 1)
//!
//! The lab uses mentions to decide whether a bench covers a compound, so
//! `C6H12O6` needs one of each element rather than twenty-four atoms.
//!
//! ```
//! use elementegg_logic::formula::Formula;
//!
//! let f: Formula = "Ca(OH)2".parse().unwrap();
//! assert_eq!(f.atoms("H"), 2);
//! assert_eq!(f.mentions("H"), 1);
//! ```

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced while parsing a formula string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormulaError {
    #[error("formula is empty")]
    Empty,
    #[error("unexpected character '{ch}' at position {pos}")]
    UnexpectedChar { ch: char, pos: usize },
    #[error("unbalanced group at position {pos}")]
    UnbalancedGroup { pos: usize },
    #[error("zero count at position {pos}")]
    ZeroCount { pos: usize },
}

/// Parsed per-element composition of a compound formula.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Formula {
    atoms: BTreeMap<String, u32>,
    mentions: BTreeMap<String, u32>,
}

impl Formula {
    /// Parse a formula string.
    pub fn parse(text: &str) -> Result<Self, FormulaError> {
        let chars: Vec<char> = text.chars().filter(|c| !c.is_whitespace()).collect();
        if chars.is_empty() {
            return Err(FormulaError::Empty);
        }
        let mut parser = Parser {
            chars: &chars,
            pos: 0,
            formula: Formula::default(),
        };
        parser.parse_formula()?;
        if parser.formula.atoms.is_empty() {
            return Err(FormulaError::Empty);
        }
        Ok(parser.formula)
    }

    /// Stoichiometric atom count for `symbol` (0 if absent).
    pub fn atoms(&self, symbol: &str) -> u32 {
        self.atoms.get(symbol).copied().unwrap_or(0)
    }

    /// Number of times `symbol` is written in the formula (0 if absent).
    pub fn mentions(&self, symbol: &str) -> u32 {
        self.mentions.get(symbol).copied().unwrap_or(0)
    }

    /// Distinct element symbols, sorted.
    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.atoms.keys().map(String::as_str)
    }

    pub fn total_atoms(&self) -> u32 {
        self.atoms.values().sum()
    }
}

impl FromStr for Formula {
    type Err = FormulaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Formula::parse(s)
    }
}

struct Parser<'a> {
    chars: &'a [char],
    pos: usize,
    formula: Formula,
}

impl Parser<'_> {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    /// formula := part (separator part)* charge?
    fn parse_formula(&mut self) -> Result<(), FormulaError> {
        loop {
            let coefficient = self.parse_count()?.unwrap_or(1);
            let part = self.parse_sequence(None)?;
            self.merge(part, coefficient);

            match self.peek() {
                Some('·') | Some('.') | Some('*') => self.pos += 1,
                Some('+') | Some('-') | Some('⁺') | Some('⁻') => {
                    // Ionic charge suffix; only digits may follow.
                    self.pos += 1;
                    self.parse_count()?;
                    return self.expect_end();
                }
                None => return Ok(()),
                Some(ch) => return Err(FormulaError::UnexpectedChar { ch, pos: self.pos }),
            }
        }
    }

    fn expect_end(&self) -> Result<(), FormulaError> {
        match self.peek() {
            None => Ok(()),
            Some(ch) => Err(FormulaError::UnexpectedChar { ch, pos: self.pos }),
        }
    }

    /// Parses element tokens and groups until a separator, charge,
    /// closing bracket or end of input.
    fn parse_sequence(&mut self, close: Option<char>) -> Result<Vec<Term>, FormulaError> {
        let mut terms = Vec::new();
        while let Some(ch) = self.peek() {
            if ch.is_ascii_uppercase() {
                let symbol = self.parse_symbol();
                let count = self.parse_count()?.unwrap_or(1);
                terms.push(Term {
                    symbol,
                    atoms: count,
                    mentions: 1,
                });
            } else if ch == '(' || ch == '[' {
                let open_pos = self.pos;
                let closing = if ch == '(' { ')' } else { ']' };
                self.pos += 1;
                let inner = self.parse_sequence(Some(closing))?;
                if self.peek() != Some(closing) {
                    return Err(FormulaError::UnbalancedGroup { pos: open_pos });
                }
                self.pos += 1;
                let multiplier = self.parse_count()?.unwrap_or(1);
                terms.extend(inner.into_iter().map(|t| Term {
                    atoms: t.atoms.saturating_mul(multiplier),
                    ..t
                }));
            } else if Some(ch) == close {
                break;
            } else if ch == ')' || ch == ']' {
                return Err(FormulaError::UnbalancedGroup { pos: self.pos });
            } else {
                break;
            }
        }
        Ok(terms)
    }

    fn parse_symbol(&mut self) -> String {
        let mut symbol = String::new();
        if let Some(first) = self.peek() {
            symbol.push(first);
            self.pos += 1;
        }
        while let Some(ch) = self.peek() {
            if ch.is_ascii_lowercase() {
                symbol.push(ch);
                self.pos += 1;
            } else {
                break;
            }
        }
        symbol
    }

    /// Reads an optional count written in ASCII or subscript digits.
    fn parse_count(&mut self) -> Result<Option<u32>, FormulaError> {
        let start = self.pos;
        let mut value: u32 = 0;
        while let Some(digit) = self.peek().and_then(digit_value) {
            value = value.saturating_mul(10).saturating_add(digit);
            self.pos += 1;
        }
        if self.pos == start {
            return Ok(None);
        }
        if value == 0 {
            return Err(FormulaError::ZeroCount { pos: start });
        }
        Ok(Some(value))
    }

    fn merge(&mut self, terms: Vec<Term>, coefficient: u32) {
        for term in terms {
            let atoms = self.formula.atoms.entry(term.symbol.clone()).or_insert(0);
            *atoms = atoms.saturating_add(term.atoms.saturating_mul(coefficient));
            let mentions = self.formula.mentions.entry(term.symbol).or_insert(0);
            *mentions = mentions.saturating_add(term.mentions);
        }
    }
}

struct Term {
    symbol: String,
    atoms: u32,
    mentions: u32,
}

fn digit_value(ch: char) -> Option<u32> {
    match ch {
        '0'..='9' => ch.to_digit(10),
        '₀'..='₉' => Some(ch as u32 - '₀' as u32),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_water() {
        let f = Formula::parse("H2O").unwrap();
        assert_eq!(f.atoms("H"), 2);
        assert_eq!(f.atoms("O"), 1);
        assert_eq!(f.mentions("H"), 1);
        assert_eq!(f.mentions("O"), 1);
        assert_eq!(f.total_atoms(), 3);
    }

    #[test]
    fn test_two_letter_symbols_do_not_alias() {
        // Substring counting would see a "C" inside "Cl".
        let f = Formula::parse("NaCl").unwrap();
        assert_eq!(f.mentions("C"), 0);
        assert_eq!(f.mentions("Cl"), 1);
        assert_eq!(f.mentions("Na"), 1);
    }

    #[test]
    fn test_repeated_mentions() {
        let f = Formula::parse("CH3COOH").unwrap();
        assert_eq!(f.mentions("C"), 2);
        assert_eq!(f.mentions("O"), 2);
        assert_eq!(f.mentions("H"), 2);
        assert_eq!(f.atoms("H"), 4);
        assert_eq!(f.atoms("C"), 2);
    }

    #[test]
    fn test_groups_multiply_atoms_not_mentions() {
        let f = Formula::parse("Ca(OH)2").unwrap();
        assert_eq!(f.atoms("Ca"), 1);
        assert_eq!(f.atoms("O"), 2);
        assert_eq!(f.atoms("H"), 2);
        assert_eq!(f.mentions("O"), 1);
    }

    #[test]
    fn test_nested_and_bracket_groups() {
        let f = Formula::parse("K4[Fe(CN)6]").unwrap();
        assert_eq!(f.atoms("K"), 4);
        assert_eq!(f.atoms("Fe"), 1);
        assert_eq!(f.atoms("C"), 6);
        assert_eq!(f.atoms("N"), 6);
    }

    #[test]
    fn test_hydrate_coefficient() {
        let f = Formula::parse("CuSO4·5H2O").unwrap();
        assert_eq!(f.atoms("O"), 9);
        assert_eq!(f.atoms("H"), 10);
        assert_eq!(f.mentions("O"), 2);
    }

    #[test]
    fn test_subscript_digits() {
        let f = Formula::parse("H₂O").unwrap();
        assert_eq!(f.atoms("H"), 2);
    }

    #[test]
    fn test_charge_suffix_ignored() {
        let f = Formula::parse("NH4+").unwrap();
        assert_eq!(f.atoms("H"), 4);
        assert_eq!(f.atoms("N"), 1);
    }

    #[test]
    fn test_errors() {
        assert_eq!(Formula::parse(""), Err(FormulaError::Empty));
        assert_eq!(Formula::parse("   "), Err(FormulaError::Empty));
        assert!(matches!(
            Formula::parse("Ca(OH2"),
            Err(FormulaError::UnbalancedGroup { .. })
        ));
        assert!(matches!(
            Formula::parse("H2O)"),
            Err(FormulaError::UnbalancedGroup { .. })
        ));
        assert!(matches!(
            Formula::parse("H0"),
            Err(FormulaError::ZeroCount { .. })
        ));
        assert!(matches!(
            Formula::parse("h2o"),
            Err(FormulaError::UnexpectedChar { ch: 'h', .. })
        ));
    }

    #[test]
    fn test_zero_charge_rejected() {
        assert!(matches!(
            Formula::parse("SO4-0"),
            Err(FormulaError::ZeroCount { .. })
        ));
        assert!(Formula::parse("SO4-2").is_ok());
    }

    #[test]
    fn test_huge_counts_saturate() {
        let f = Formula::parse("(H99999)99999").unwrap();
        assert_eq!(f.atoms("H"), u32::MAX);
        let f = Formula::parse("99999(H99999)").unwrap();
        assert_eq!(f.atoms("H"), u32::MAX);
        assert_eq!(f.mentions("H"), 1);
    }

    #[test]
    fn test_symbols_sorted() {
        let f: Formula = "NaHCO3".parse().unwrap();
        let symbols: Vec<&str> = f.symbols().collect();
        assert_eq!(symbols, vec!["C", "H", "Na", "O"]);
    }
}
