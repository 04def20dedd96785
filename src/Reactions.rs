/// Stoichiometry matrix of an equation: rows are elements, columns are compounds with
/// product columns negated.
pub mod stoichiometry;
/// Exact rational solver for the smallest positive integer coefficients.
pub mod balancer;
/// Reactant/product model: parsing, balancing, rendering, element totals, reversal and
/// Hess's-law extension.
/// # Examples
/// ```
/// use ChemBalance::Reactions::equation::Equation;
/// let mut eq = Equation::parse("C3H8 + O2 -> CO2 + H2O").unwrap();
/// eq.balance().unwrap();
/// assert_eq!(eq.integer_coefficients(), Some(vec![1, 5, 3, 4]));
/// ```
pub mod equation;
/// Compounds keyed by composition with summed coefficients.
pub mod compound_counter;
/// Enthalpy of a reaction composed from reactions with known enthalpies.
pub mod hess_law;
