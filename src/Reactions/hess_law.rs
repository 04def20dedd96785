//! # Hess's law
//!
//! Writes a desired reaction as a linear combination of reactions with known enthalpies.
//!
//! Every distinct compound (by composition) of all equations gives one row, every known
//! equation one column; an entry is the signed coefficient of the compound in that
//! equation (reactants positive, products negative). The desired equation gives the right
//! hand side `b`. The multipliers `x` solve `A x ≈ b` in the least-squares sense (SVD),
//! and the composite enthalpy is `sum(x_i * dH_i)`.
//!
//! Least squares always returns something, so the residual `|A x - b|` is reported along
//! with the result: a nonzero residual means the desired reaction cannot be composed from
//! the given ones.
use crate::Formula::compound::Compound;
use crate::Reactions::equation::Equation;
use crate::errors::{ChemError, ChemResult};
use log::{debug, info, warn};
use malachite::Rational;
use malachite::num::conversion::traits::RoundingFrom;
use malachite::rounding_modes::RoundingMode;
use nalgebra::{DMatrix, DVector};

const SVD_EPS: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq)]
pub struct HessSolution {
    /// one per known equation, initial equation first
    pub multipliers: Vec<f64>,
    pub enthalpy: f64,
    /// Euclidean norm of `A x - b`
    pub residual: f64,
}

impl HessSolution {
    pub fn is_consistent(&self, tolerance: f64) -> bool {
        self.residual <= tolerance
    }
}

#[derive(Debug, Clone)]
pub struct HessLaw {
    /// known equations with their enthalpies, initial equation first
    pub equations: Vec<(Equation, f64)>,
    pub desired: Equation,
    /// row labels of the linear system
    pub compounds: Vec<Compound>,
}

fn to_f64(x: &Rational) -> f64 {
    f64::rounding_from(x, RoundingMode::Nearest).0
}

impl HessLaw {
    /// Balances every equation and collects the distinct compounds in order of first
    /// appearance.
    pub fn new(
        initial: (Equation, f64),
        intermediates: Vec<(Equation, f64)>,
        mut desired: Equation,
    ) -> ChemResult<Self> {
        let mut equations = Vec::with_capacity(intermediates.len() + 1);
        for (mut equation, enthalpy) in std::iter::once(initial).chain(intermediates) {
            equation.balance()?;
            equations.push((equation, enthalpy));
        }
        desired.balance()?;

        let mut compounds: Vec<Compound> = Vec::new();
        let all = equations
            .iter()
            .map(|(eq, _)| eq)
            .chain(std::iter::once(&desired));
        for equation in all {
            for compound in equation.reactants.iter().chain(equation.products.iter()) {
                if !compounds.contains(compound) {
                    compounds.push(compound.clone());
                }
            }
        }
        debug!(
            "Hess's law system: {} compounds, {} equations",
            compounds.len(),
            equations.len()
        );
        Ok(Self {
            equations,
            desired,
            compounds,
        })
    }

    /// Net signed coefficient of `compound` in `equation`
    fn signed_coefficient(equation: &Equation, compound: &Compound) -> f64 {
        let left: f64 = equation
            .reactants
            .iter()
            .filter(|c| *c == compound)
            .map(|c| to_f64(&c.coefficient))
            .sum();
        let right: f64 = equation
            .products
            .iter()
            .filter(|c| *c == compound)
            .map(|c| to_f64(&c.coefficient))
            .sum();
        left - right
    }

    /// The system `A x = b`
    pub fn system(&self) -> (DMatrix<f64>, DVector<f64>) {
        let a = DMatrix::from_fn(self.compounds.len(), self.equations.len(), |i, j| {
            Self::signed_coefficient(&self.equations[j].0, &self.compounds[i])
        });
        let b = DVector::from_fn(self.compounds.len(), |i, _| {
            Self::signed_coefficient(&self.desired, &self.compounds[i])
        });
        (a, b)
    }

    pub fn solve(&self) -> ChemResult<HessSolution> {
        let (a, b) = self.system();
        let svd = a.clone().svd(true, true);
        let x = svd
            .solve(&b, SVD_EPS)
            .map_err(|e| ChemError::UnsolvableEquation(e.to_string()))?;
        let residual = (&a * &x - &b).norm();
        let enthalpy = self
            .equations
            .iter()
            .zip(x.iter())
            .map(|((_, h), m)| h * m)
            .sum();
        let multipliers: Vec<f64> = x.iter().copied().collect();
        if residual > SVD_EPS.sqrt() {
            warn!(
                "desired reaction {} is not a combination of the given ones, residual {:e}",
                self.desired, residual
            );
        } else {
            info!(
                "{} composed with multipliers {:?}, dH = {}",
                self.desired, multipliers, enthalpy
            );
        }
        Ok(HessSolution {
            multipliers,
            enthalpy,
            residual,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn equation(text: &str) -> Equation {
        Equation::parse(text).unwrap()
    }

    #[test]
    fn test_nitrogen_oxides() {
        let hess = HessLaw::new(
            (equation("N2 + O2 -> NO"), 180.6),
            vec![(equation("N2 + O2 -> NO2"), 66.4)],
            equation("NO + O2 -> NO2"),
        )
        .unwrap();
        assert_eq!(hess.compounds.len(), 4);
        let (a, b) = hess.system();
        assert_eq!(a.shape(), (4, 2));
        assert_eq!(b.len(), 4);

        let solution = hess.solve().unwrap();
        assert_relative_eq!(solution.multipliers[0], -1.0, epsilon = 1e-9);
        assert_relative_eq!(solution.multipliers[1], 1.0, epsilon = 1e-9);
        assert_relative_eq!(solution.enthalpy, -114.2, epsilon = 1e-9);
        assert!(solution.is_consistent(1e-6));
    }

    #[test]
    fn test_missing_intermediate_is_inconsistent() {
        let hess = HessLaw::new(
            (equation("N2 + O2 -> NO"), 180.6),
            vec![],
            equation("NO + O2 -> NO2"),
        )
        .unwrap();
        let solution = hess.solve().unwrap();
        assert!(solution.residual > 1e-3);
        assert!(!solution.is_consistent(1e-6));
    }

    #[test]
    fn test_unbalanceable_input() {
        assert!(
            HessLaw::new(
                (equation("H2 -> O2"), 1.0),
                vec![],
                equation("H2 + O2 -> H2O"),
            )
            .is_err()
        );
    }
}
