//! # Equation
//!
//! Reactants and products of a chemical reaction, their coefficients and an optional
//! reaction enthalpy.
//!
//! An equation goes through the states
//! - `Constructed`: coefficients as written (1 unless a term carries a leading number);
//! - `Balanced`: coefficients are the smallest positive integers conserving every element;
//! - `Extended`: compounds and enthalpy replaced by a Hess's-law composition.
//!
//! ```rust
//! use ChemBalance::Reactions::equation::Equation;
//!
//! let mut eq = Equation::parse("Fe + O2 = Fe2O3").unwrap();
//! eq.balance().unwrap();
//! assert_eq!(eq.integer_coefficients(), Some(vec![4, 3, 2]));
//! assert_eq!(eq.to_string(), "4(Fe) + 3(O2) → 2(Fe2O3)");
//! ```
use crate::Formula::compound::Compound;
use crate::Formula::element::Element;
use crate::Reactions::balancer::solve_coefficients;
use crate::Reactions::compound_counter::CompoundCounter;
use crate::Reactions::hess_law::{HessLaw, HessSolution};
use crate::Reactions::stoichiometry::StoichiometryMatrix;
use crate::errors::{ChemError, ChemResult};
use crate::settings::with_config;
use log::{info, warn};
use malachite::Rational;
use malachite::num::basic::traits::{One, Zero};
use std::collections::BTreeMap;
use std::fmt;

/// Separators between the two sides, searched in this order.
pub const SEPARATORS: [&str; 4] = ["->", "=>", "→", "="];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EquationState {
    Constructed,
    Balanced,
    Extended,
}

#[derive(Debug, Clone)]
pub struct Equation {
    pub reactants: Vec<Compound>,
    pub products: Vec<Compound>,
    /// reaction enthalpy, when known
    pub h_rxn: Option<f64>,
    state: EquationState,
}

fn parse_side(side: &str, line: &str) -> ChemResult<Vec<Compound>> {
    side.split('+')
        .map(|term| {
            if term.trim().is_empty() {
                Err(ChemError::InvalidEquation(format!(
                    "empty term in '{}'",
                    line
                )))
            } else {
                Compound::new(term)
            }
        })
        .collect()
}

impl Equation {
    pub fn new(reactants: Vec<Compound>, products: Vec<Compound>) -> ChemResult<Self> {
        if reactants.is_empty() || products.is_empty() {
            return Err(ChemError::InvalidEquation(
                "both sides need at least one compound".to_string(),
            ));
        }
        Ok(Self {
            reactants,
            products,
            h_rxn: None,
            state: EquationState::Constructed,
        })
    }

    /// Parses `A + B -> C + D`. Accepted separators are `->`, `=>`, `→` and `=`; the first
    /// one found must occur exactly once.
    pub fn parse(line: &str) -> ChemResult<Self> {
        let Some(&separator) = SEPARATORS.iter().find(|s| line.contains(**s)) else {
            return Err(ChemError::InvalidEquation(format!(
                "no separator in '{}'",
                line
            )));
        };
        let sides: Vec<&str> = line.split(separator).collect();
        let [left, right] = sides.as_slice() else {
            return Err(ChemError::InvalidEquation(format!(
                "'{}' appears {} times in '{}'",
                separator,
                sides.len() - 1,
                line
            )));
        };
        Self::new(parse_side(left, line)?, parse_side(right, line)?)
    }

    pub fn with_enthalpy(mut self, h_rxn: f64) -> Self {
        self.h_rxn = Some(h_rxn);
        self
    }

    pub fn state(&self) -> EquationState {
        self.state
    }

    /// All compounds, reactants first
    pub fn compounds(&self) -> impl Iterator<Item = &Compound> {
        self.reactants.iter().chain(self.products.iter())
    }

    /// Coefficients in reactant-then-product order
    pub fn coefficients(&self) -> Vec<Rational> {
        self.compounds().map(|c| c.coefficient.clone()).collect()
    }

    /// Coefficients as integers, `None` if any is fractional
    pub fn integer_coefficients(&self) -> Option<Vec<u64>> {
        self.compounds()
            .map(|c| u64::try_from(&c.coefficient).ok())
            .collect()
    }

    pub fn total_left(&self) -> BTreeMap<Element, Rational> {
        self.reactants.iter().cloned().collect::<CompoundCounter>().element_totals()
    }

    pub fn total_right(&self) -> BTreeMap<Element, Rational> {
        self.products.iter().cloned().collect::<CompoundCounter>().element_totals()
    }

    pub fn count_left(&self, element: &Element) -> Rational {
        self.total_left()
            .remove(element)
            .unwrap_or(Rational::ZERO)
    }

    pub fn count_right(&self, element: &Element) -> Rational {
        self.total_right()
            .remove(element)
            .unwrap_or(Rational::ZERO)
    }

    /// Every element has as many atoms on the left as on the right.
    pub fn is_balanced(&self) -> bool {
        self.total_left() == self.total_right()
    }

    pub fn stoichiometry(&self) -> ChemResult<StoichiometryMatrix> {
        StoichiometryMatrix::new(&self.reactants, &self.products)
    }

    /// Sets the smallest positive integer coefficients. An already balanced equation is
    /// left as it is. On failure the previous coefficients are kept.
    pub fn balance(&mut self) -> ChemResult<()> {
        if self.is_balanced() {
            if self.state == EquationState::Constructed {
                self.state = EquationState::Balanced;
            }
            return Ok(());
        }
        let coefficients = self
            .stoichiometry()
            .and_then(|m| solve_coefficients(&m))
            .inspect_err(|e| warn!("{} was not balanced: {}", self, e))?;
        for (compound, n) in self
            .reactants
            .iter_mut()
            .chain(self.products.iter_mut())
            .zip(coefficients)
        {
            compound.coefficient = Rational::from(n);
        }
        self.state = EquationState::Balanced;
        info!("balanced: {}", self);
        Ok(())
    }

    fn render_term(compound: &Compound, use_latex: bool) -> ChemResult<String> {
        let formula = if use_latex {
            compound.latexify()?
        } else {
            compound.comp_str.clone()
        };
        if compound.coefficient == Rational::ONE {
            Ok(formula)
        } else {
            Ok(format!("{}({})", compound.coefficient, formula))
        }
    }

    fn render_side(compounds: &[Compound], use_latex: bool) -> ChemResult<String> {
        let terms = compounds
            .iter()
            .map(|c| Self::render_term(c, use_latex))
            .collect::<ChemResult<Vec<String>>>()?;
        Ok(terms.join(" + "))
    }

    /// Text form with coefficients; LaTeX form uses `\text{}` formulas and `\rightarrow`.
    pub fn render(&self, use_latex: bool) -> ChemResult<String> {
        let arrow = if use_latex { " \\rightarrow " } else { " → " };
        Ok(format!(
            "{}{}{}",
            Self::render_side(&self.reactants, use_latex)?,
            arrow,
            Self::render_side(&self.products, use_latex)?
        ))
    }

    /// The reverse reaction: sides swapped, enthalpy negated.
    pub fn reversed(&self) -> Equation {
        Equation {
            reactants: self.products.clone(),
            products: self.reactants.clone(),
            h_rxn: self.h_rxn.map(|h| -h),
            state: self.state,
        }
    }

    /// Replaces this equation by `desired`, with the enthalpy composed from this equation
    /// and `intermediates` by Hess's law. This equation must have a known enthalpy, and the
    /// composition must fit within the configured residual tolerance.
    pub fn extend(
        &mut self,
        intermediates: Vec<(Equation, f64)>,
        desired: Equation,
    ) -> ChemResult<HessSolution> {
        let Some(h_rxn) = self.h_rxn else {
            return Err(ChemError::InvalidEquation(format!(
                "{} has no reaction enthalpy",
                self
            )));
        };
        let hess = HessLaw::new((self.clone(), h_rxn), intermediates, desired)?;
        let solution = hess.solve()?;
        let tolerance = with_config(|cfg| cfg.hess_residual_tolerance);
        if !solution.is_consistent(tolerance) {
            return Err(ChemError::InconsistentHessSystem {
                residual: solution.residual,
                tolerance,
            });
        }
        self.reactants = hess.desired.reactants;
        self.products = hess.desired.products;
        self.h_rxn = Some(solution.enthalpy);
        self.state = EquationState::Extended;
        Ok(solution)
    }
}

impl fmt::Display for Equation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self.render(false).map_err(|_| fmt::Error)?;
        write!(f, "{}", text)
    }
}
