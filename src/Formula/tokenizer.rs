//! # Formula tokenizer
//!
//! Turns a formula string into the multiset of atoms it describes plus the subscript
//! annotations needed to render it again.
//!
//! Steps:
//! 1. whitespace is removed and a leading coefficient (`3H2O`, `0.5O2`) is split off;
//! 2. bracket groups are resolved into per-position multipliers;
//! 3. the string is walked left to right: bracket characters get a subscript record,
//!    element symbols are matched longest-first and repeated `count * multiplier` times,
//!    anything else is an `UnknownSymbol` error.
//!
//! ```rust
//! use ChemBalance::Formula::tokenizer::tokenize;
//!
//! let parsed = tokenize("Mg(OH)2").unwrap();
//! assert_eq!(parsed.tokens.len(), 5);
//! ```
use crate::Formula::element::Element;
use crate::Formula::element_data::PeriodicTable;
use crate::Formula::lexicon::{DigitRun, is_left_delimiter, is_right_delimiter, match_element};
use crate::Formula::multipliers::{multipliers_per_position, resolve_groups};
use crate::errors::{ChemError, ChemResult};
use crate::settings::with_config;
use log::debug;
use malachite::Rational;
use malachite::num::basic::traits::{One, Zero};
use regex::Regex;
use std::sync::LazyLock;

static COEFFICIENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+(?:\.\d*)?|\.\d+)").expect("valid coefficient regex"));

/// Annotation of one element symbol or bracket in a formula string: the symbol occupies
/// `[element_index, start_index)` and its digits, if any, `[start_index, end_index)`.
#[derive(Debug, Clone)]
pub struct Subscript {
    pub element_index: usize,
    pub start_index: usize,
    pub end_index: usize,
    pub element_str: String,
    /// parsed digits, 1 when absent
    pub size: u64,
    /// `None` when no digits were written
    pub subs: Option<u64>,
}

impl Subscript {
    /// Reads the digits following the symbol `chars[element_index..start_index]`.
    /// Returns `None` when the digits overflow u64.
    pub fn new(chars: &[char], element_index: usize, start_index: usize) -> Option<Self> {
        let run = DigitRun::read(chars, start_index)?;
        Some(Self {
            element_index,
            start_index,
            end_index: run.end,
            element_str: chars[element_index..start_index].iter().collect(),
            size: run.size(),
            subs: run.value,
        })
    }

    /// Subscript of an opening bracket, which never carries digits
    pub fn trivial(chars: &[char], index: usize) -> Self {
        Self {
            element_index: index,
            start_index: index + 1,
            end_index: index + 1,
            element_str: chars[index].to_string(),
            size: 1,
            subs: None,
        }
    }
}

impl PartialEq for Subscript {
    fn eq(&self, other: &Self) -> bool {
        self.element_str == other.element_str
            && self.subs == other.subs
            && self.element_index == other.element_index
    }
}

impl Eq for Subscript {}

/// Defensive caps on formula input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormulaLimits {
    pub max_formula_length: usize,
    pub max_bracket_depth: usize,
    pub max_atoms: usize,
}

impl FormulaLimits {
    /// Limits from the global configuration
    pub fn from_config() -> Self {
        with_config(|cfg| Self {
            max_formula_length: cfg.max_formula_length,
            max_bracket_depth: cfg.max_bracket_depth,
            max_atoms: cfg.max_atoms,
        })
    }
}

impl Default for FormulaLimits {
    fn default() -> Self {
        Self {
            max_formula_length: 256,
            max_bracket_depth: 32,
            max_atoms: 100_000,
        }
    }
}

/// Result of tokenizing one formula
#[derive(Debug, Clone)]
pub struct TokenizedFormula {
    /// formula text without whitespace and without the leading coefficient
    pub formula: String,
    pub coefficient: Rational,
    /// one entry per atom
    pub tokens: Vec<Element>,
    pub subscripts: Vec<Subscript>,
}

/// Removes whitespace anywhere in the text.
pub fn strip_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

fn parse_coefficient(literal: &str) -> ChemResult<Rational> {
    let invalid = || ChemError::InvalidCoefficient(literal.to_string());
    let value = match literal.split_once('.') {
        None => Rational::from(literal.parse::<u64>().map_err(|_| invalid())?),
        Some((whole, fraction)) => {
            let digits = format!("{}{}", whole, fraction);
            let numerator = if digits.is_empty() {
                0
            } else {
                digits.parse::<u64>().map_err(|_| invalid())?
            };
            let denominator = 10u64
                .checked_pow(fraction.len() as u32)
                .ok_or_else(invalid)?;
            Rational::from(numerator) / Rational::from(denominator)
        }
    };
    if value == Rational::ZERO {
        return Err(invalid());
    }
    Ok(value)
}

/// Splits a leading unsigned integer or decimal coefficient off a formula.
/// Whitespace is removed first; a formula without a coefficient gets 1.
pub fn split_coefficient(text: &str) -> ChemResult<(Rational, String)> {
    let text = strip_whitespace(text);
    match COEFFICIENT_RE.find(&text) {
        Some(m) => {
            let coefficient = parse_coefficient(m.as_str())?;
            Ok((coefficient, text[m.end()..].to_string()))
        }
        None => Ok((Rational::ONE, text)),
    }
}

/// Tokenizes with the process-wide periodic table and configured limits.
pub fn tokenize(text: &str) -> ChemResult<TokenizedFormula> {
    tokenize_with(text, PeriodicTable::global(), &FormulaLimits::from_config())
}

/// Tokenizes against an explicit periodic table and set of limits.
pub fn tokenize_with(
    text: &str,
    table: &PeriodicTable,
    limits: &FormulaLimits,
) -> ChemResult<TokenizedFormula> {
    let (coefficient, formula) = split_coefficient(text)?;
    let chars: Vec<char> = formula.chars().collect();
    if chars.is_empty() {
        return Err(ChemError::EmptyFormula(text.to_string()));
    }
    if chars.len() > limits.max_formula_length {
        return Err(ChemError::FormulaTooLong {
            formula,
            length: chars.len(),
            limit: limits.max_formula_length,
        });
    }
    let groups = resolve_groups(&formula, limits.max_bracket_depth)?;
    let multipliers = multipliers_per_position(&groups, chars.len());
    let too_many_atoms = || ChemError::TooManyAtoms {
        formula: formula.clone(),
        limit: limits.max_atoms,
    };

    let mut tokens: Vec<Element> = Vec::new();
    let mut subscripts = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if is_left_delimiter(c) {
            subscripts.push(Subscript::trivial(&chars, i));
            i += 1;
            continue;
        }
        if is_right_delimiter(c) {
            // the group multiplier digits are kept for rendering
            let sub = Subscript::new(&chars, i, i + 1).ok_or_else(too_many_atoms)?;
            i = sub.end_index;
            subscripts.push(sub);
            continue;
        }
        let Some(record) = match_element(table, &chars, i) else {
            let symbol: String = std::iter::once(c)
                .chain(chars[i + 1..].iter().take_while(|c| c.is_ascii_lowercase()).copied())
                .collect();
            return Err(ChemError::UnknownSymbol {
                symbol,
                formula: formula.clone(),
                position: i,
            });
        };
        let symbol_len = record.symbol.chars().count();
        let sub = Subscript::new(&chars, i, i + symbol_len).ok_or_else(too_many_atoms)?;
        let count = sub
            .size
            .checked_mul(multipliers[i])
            .ok_or_else(too_many_atoms)?;
        if count as u128 + tokens.len() as u128 > limits.max_atoms as u128 {
            return Err(too_many_atoms());
        }
        debug!(
            "'{}' at {}: {} x {} (subscript {}, multiplier {})",
            formula, i, record.symbol, count, sub.size, multipliers[i]
        );
        let element = Element::from(record);
        tokens.extend(std::iter::repeat_n(element, count as usize));
        i = sub.end_index;
        subscripts.push(sub);
    }
    if tokens.is_empty() {
        return Err(ChemError::EmptyFormula(text.to_string()));
    }
    Ok(TokenizedFormula {
        formula,
        coefficient,
        tokens,
        subscripts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn counts(text: &str) -> BTreeMap<String, usize> {
        let parsed = tokenize_with(text, &PeriodicTable::builtin(), &FormulaLimits::default())
            .unwrap();
        let mut counts = BTreeMap::new();
        for token in parsed.tokens {
            *counts.entry(token.symbol).or_insert(0) += 1;
        }
        counts
    }

    fn expected(pairs: &[(&str, usize)]) -> BTreeMap<String, usize> {
        pairs.iter().map(|&(s, n)| (s.to_string(), n)).collect()
    }

    #[test]
    fn test_simple_formulas() {
        assert_eq!(counts("H2O"), expected(&[("H", 2), ("O", 1)]));
        assert_eq!(counts("C6H8O6"), expected(&[("C", 6), ("H", 8), ("O", 6)]));
        assert_eq!(counts("C5H6OOH"), expected(&[("C", 5), ("H", 7), ("O", 2)]));
        assert_eq!(counts("NaCl"), expected(&[("Na", 1), ("Cl", 1)]));
    }

    #[test]
    fn test_bracket_groups() {
        assert_eq!(counts("Mg(OH)2"), expected(&[("Mg", 1), ("O", 2), ("H", 2)]));
        assert_eq!(counts("Na(NO3)2"), expected(&[("Na", 1), ("N", 2), ("O", 6)]));
        assert_eq!(
            counts("K4[Fe(CN)6]"),
            expected(&[("K", 4), ("Fe", 1), ("C", 6), ("N", 6)])
        );
        assert_eq!(
            counts("K4[Fe(CN)6]3"),
            expected(&[("K", 4), ("Fe", 3), ("C", 18), ("N", 18)])
        );
        assert_eq!(
            counts("Al2(SO4)3"),
            expected(&[("Al", 2), ("S", 3), ("O", 12)])
        );
        assert_eq!(
            counts("{Cu(NH3)4}SO4"),
            expected(&[("Cu", 1), ("N", 4), ("H", 12), ("S", 1), ("O", 4)])
        );
    }

    #[test]
    fn test_siblings_after_nested_group() {
        assert_eq!(
            counts("Ca3[Fe(CN)6]2(OH)3"),
            expected(&[("Ca", 3), ("Fe", 2), ("C", 12), ("N", 12), ("O", 3), ("H", 3)])
        );
    }

    #[test]
    fn test_whitespace_ignored() {
        assert_eq!(counts(" Mg ( O H ) 2 "), counts("Mg(OH)2"));
    }

    #[test]
    fn test_coefficient() {
        let (coefficient, rest) = split_coefficient("3H2O").unwrap();
        assert_eq!(coefficient, Rational::from(3u32));
        assert_eq!(rest, "H2O");
        let (coefficient, rest) = split_coefficient("0.5 O2").unwrap();
        assert_eq!(coefficient, Rational::from(1u32) / Rational::from(2u32));
        assert_eq!(rest, "O2");
        let (coefficient, rest) = split_coefficient("CO2").unwrap();
        assert_eq!(coefficient, Rational::ONE);
        assert_eq!(rest, "CO2");
        assert!(matches!(
            split_coefficient("0H2"),
            Err(ChemError::InvalidCoefficient(_))
        ));
    }

    #[test]
    fn test_subscripts() {
        let parsed =
            tokenize_with("Mg(OH)2", &PeriodicTable::builtin(), &FormulaLimits::default())
                .unwrap();
        let strs: Vec<&str> = parsed
            .subscripts
            .iter()
            .map(|s| s.element_str.as_str())
            .collect();
        assert_eq!(strs, vec!["Mg", "(", "O", "H", ")"]);
        let closing = &parsed.subscripts[4];
        assert_eq!((closing.element_index, closing.subs), (5, Some(2)));
        assert_eq!(parsed.subscripts[0].subs, None);
        assert_eq!(parsed.subscripts[0].size, 1);
    }

    #[test]
    fn test_unknown_symbol() {
        let err = tokenize_with("H2Xq", &PeriodicTable::builtin(), &FormulaLimits::default())
            .unwrap_err();
        match err {
            ChemError::UnknownSymbol {
                symbol, position, ..
            } => {
                assert_eq!(symbol, "Xq");
                assert_eq!(position, 2);
            }
            other => panic!("unexpected error {:?}", other),
        }
        assert!(matches!(
            tokenize_with("H2O!", &PeriodicTable::builtin(), &FormulaLimits::default()),
            Err(ChemError::UnknownSymbol { position: 3, .. })
        ));
    }

    #[test]
    fn test_limits() {
        let limits = FormulaLimits {
            max_formula_length: 5,
            max_bracket_depth: 32,
            max_atoms: 10,
        };
        let table = PeriodicTable::builtin();
        assert!(matches!(
            tokenize_with("C6H12O6", &table, &limits),
            Err(ChemError::FormulaTooLong { length: 7, .. })
        ));
        assert!(matches!(
            tokenize_with("C20", &table, &limits),
            Err(ChemError::TooManyAtoms { limit: 10, .. })
        ));
        assert!(matches!(
            tokenize_with("", &table, &limits),
            Err(ChemError::EmptyFormula(_))
        ));
        assert!(matches!(
            tokenize_with("Na(OH", &table, &FormulaLimits::default()),
            Err(ChemError::MismatchedDelimiters { .. })
        ));
    }
}
