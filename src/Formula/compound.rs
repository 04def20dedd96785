//! # Compound
//!
//! A parsed chemical formula: the atoms it contains, derived quantities (molar mass,
//! valence electrons, total electrons) and the coefficient it carries inside an equation.
//!
//! Two compounds are equal when they contain the same atoms in the same amounts; the
//! text they were written with and their coefficients do not matter, so `H2O == OH2`.
//!
//! ```rust
//! use ChemBalance::Formula::compound::Compound;
//!
//! let water = Compound::new("H2O").unwrap();
//! assert_eq!(water.count_symbol("H"), 2);
//! assert_eq!(water, Compound::new("OH2").unwrap());
//! ```
use crate::Formula::element::Element;
use crate::Formula::element_data::PeriodicTable;
use crate::Formula::tokenizer::{
    FormulaLimits, Subscript, TokenizedFormula, tokenize, tokenize_with,
};
use crate::errors::{ChemError, ChemResult};
use malachite::Rational;
use malachite::num::basic::traits::One;
use prettytable::{Table, row};
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

#[derive(Debug, Clone)]
pub struct Compound {
    /// formula text without whitespace and leading coefficient
    pub comp_str: String,
    /// one entry per atom, in formula order
    pub tokens: Vec<Element>,
    pub elements: BTreeMap<Element, u64>,
    pub subscripts: Vec<Subscript>,
    pub molar_mass: f64,
    pub valence_electrons: u64,
    pub electrons: u64,
    /// set by a leading numeral or by balancing
    pub coefficient: Rational,
}

impl Compound {
    /// Parses a formula with the process-wide element table and limits.
    pub fn new(text: &str) -> ChemResult<Self> {
        Ok(Self::from_tokenized(tokenize(text)?))
    }

    /// Parses a formula against an explicit element table and limits.
    pub fn with_table(text: &str, table: &PeriodicTable, limits: &FormulaLimits) -> ChemResult<Self> {
        Ok(Self::from_tokenized(tokenize_with(text, table, limits)?))
    }

    fn from_tokenized(parsed: TokenizedFormula) -> Self {
        Self::from_tokens(
            parsed.formula,
            parsed.tokens,
            parsed.subscripts,
            parsed.coefficient,
        )
    }

    /// Builds a compound from already tokenized atoms.
    pub fn from_tokens(
        comp_str: String,
        tokens: Vec<Element>,
        subscripts: Vec<Subscript>,
        coefficient: Rational,
    ) -> Self {
        let mut elements: BTreeMap<Element, u64> = BTreeMap::new();
        for token in tokens.iter() {
            *elements.entry(token.clone()).or_insert(0) += 1;
        }
        let molar_mass = elements
            .iter()
            .map(|(el, &n)| el.molar_mass * n as f64)
            .sum();
        let valence_electrons = elements
            .iter()
            .map(|(el, &n)| el.valence_electrons as u64 * n)
            .sum();
        let electrons = elements
            .iter()
            .map(|(el, &n)| el.atomic_number as u64 * n)
            .sum();
        Self {
            comp_str,
            tokens,
            elements,
            subscripts,
            molar_mass,
            valence_electrons,
            electrons,
            coefficient,
        }
    }

    /// A compound of a single atom
    pub fn from_element(element: &Element) -> Self {
        let chars: Vec<char> = element.symbol.chars().collect();
        let subscripts = Subscript::new(&chars, 0, chars.len())
            .into_iter()
            .collect();
        Self::from_tokens(
            element.symbol.clone(),
            vec![element.clone()],
            subscripts,
            Rational::ONE,
        )
    }

    /// Number of atoms of `element`, 0 when absent
    pub fn count(&self, element: &Element) -> u64 {
        self.elements.get(element).copied().unwrap_or(0)
    }

    pub fn count_symbol(&self, symbol: &str) -> u64 {
        self.elements
            .iter()
            .find(|(el, _)| el.symbol == symbol)
            .map(|(_, &n)| n)
            .unwrap_or(0)
    }

    /// Total number of atoms
    pub fn atom_count(&self) -> u64 {
        self.elements.values().sum()
    }

    pub fn contains(&self, element: &Element) -> bool {
        self.elements.contains_key(element)
    }

    /// Explicit digits written after the symbol or bracket ending at `index` of `comp_str`.
    pub fn subscript(&self, index: usize) -> ChemResult<Option<u64>> {
        let mut found = self
            .subscripts
            .iter()
            .filter(|s| s.subs.is_some() && s.start_index == index + 1);
        let first = found.next();
        if found.next().is_some() {
            return Err(ChemError::AmbiguousSubscript {
                formula: self.comp_str.clone(),
                position: index,
            });
        }
        Ok(first.and_then(|s| s.subs))
    }

    /// LaTeX form of the formula, `Mg(OH)2` becomes
    /// `\text{M}\text{g}\text{(}\text{O}\text{H}\text{)}_{2}`.
    pub fn latexify(&self) -> ChemResult<String> {
        let mut latex = String::new();
        for (i, c) in self.comp_str.chars().enumerate() {
            if c.is_ascii_digit() || c.is_whitespace() {
                continue;
            }
            match c {
                '{' => latex.push_str("\\text{\\{}"),
                '}' => latex.push_str("\\text{\\}}"),
                _ => latex.push_str(&format!("\\text{{{}}}", c)),
            }
            if let Some(n) = self.subscript(i)? {
                latex.push_str(&format!("_{{{}}}", n));
            }
        }
        Ok(latex)
    }

    /// Compound made of the atoms of both, e.g. `CO` + `O` gives `COO`.
    pub fn concat(&self, other: &Compound) -> ChemResult<Compound> {
        Compound::new(&format!("{}{}", self.comp_str, other.comp_str))
    }

    /// `n` units of the compound, parsed as `[comp_str]n`.
    pub fn repeat(&self, n: u64) -> ChemResult<Compound> {
        if n == 0 {
            return Err(ChemError::InvalidCoefficient(n.to_string()));
        }
        Compound::new(&format!("[{}]{}", self.comp_str, n))
    }

    /// Mass fraction of each element
    pub fn mass_fractions(&self) -> Vec<(Element, f64)> {
        self.elements
            .iter()
            .map(|(el, &n)| (el.clone(), el.molar_mass * n as f64 / self.molar_mass))
            .collect()
    }

    /// Element, count, mass and mass fraction of every element.
    pub fn pretty_table(&self) -> Table {
        let mut table = Table::new();
        table.add_row(row!["Element", "Count", "Mass, g/mol", "Mass fraction"]);
        for (el, fraction) in self.mass_fractions() {
            let n = self.count(&el);
            table.add_row(row![
                &el.symbol,
                n,
                format!("{:.4}", el.molar_mass * n as f64),
                format!("{:.4}", fraction)
            ]);
        }
        table.add_row(row!["Total", self.atom_count(), format!("{:.4}", self.molar_mass), "1.0000"]);
        table
    }

    pub fn pretty_print(&self) {
        println!("\n{}", self.comp_str);
        self.pretty_table().printstd();
        println!(
            "valence electrons: {}, electrons: {}",
            self.valence_electrons, self.electrons
        );
    }
}

impl PartialEq for Compound {
    fn eq(&self, other: &Self) -> bool {
        self.elements == other.elements
    }
}

impl Eq for Compound {}

impl Hash for Compound {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.elements.hash(state);
    }
}

impl fmt::Display for Compound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.comp_str)
    }
}
