//! Stoichiometry matrix of an equation: one row per element found among the reactants,
//! one column per compound (reactants first, then products), entries are atom counts with
//! product columns negated. A balanced set of coefficients `x` satisfies `M x = 0`.
use crate::Formula::compound::Compound;
use crate::Formula::element::Element;
use crate::errors::{ChemError, ChemResult};
use nalgebra::DMatrix;
use prettytable::{Cell, Row, Table};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq)]
pub struct StoichiometryMatrix {
    /// row labels
    pub elements: Vec<Element>,
    /// column labels, reactants first
    pub compounds: Vec<String>,
    pub n_reactants: usize,
    pub matrix: DMatrix<i64>,
}

impl StoichiometryMatrix {
    /// Builds the matrix. An element present only among the products makes the equation
    /// unbalanceable and is reported as `UnsolvableEquation`.
    pub fn new(reactants: &[Compound], products: &[Compound]) -> ChemResult<Self> {
        let left: BTreeSet<&Element> = reactants.iter().flat_map(|c| c.elements.keys()).collect();
        let right: BTreeSet<&Element> = products.iter().flat_map(|c| c.elements.keys()).collect();
        if let Some(missing) = right.difference(&left).next() {
            return Err(ChemError::UnsolvableEquation(format!(
                "element {} appears only among the products",
                missing
            )));
        }
        let elements: Vec<Element> = left.into_iter().cloned().collect();
        let n_reactants = reactants.len();
        let compounds: Vec<&Compound> = reactants.iter().chain(products.iter()).collect();

        let mut matrix = DMatrix::<i64>::zeros(elements.len(), compounds.len());
        for (j, compound) in compounds.iter().enumerate() {
            let sign = if j < n_reactants { 1 } else { -1 };
            for (i, element) in elements.iter().enumerate() {
                let count = i64::try_from(compound.count(element)).map_err(|_| {
                    ChemError::UnsolvableEquation(format!(
                        "atom count of {} in {} does not fit the matrix",
                        element, compound
                    ))
                })?;
                matrix[(i, j)] = sign * count;
            }
        }
        Ok(Self {
            elements,
            compounds: compounds.iter().map(|c| c.comp_str.clone()).collect(),
            n_reactants,
            matrix,
        })
    }

    pub fn nrows(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.matrix.ncols()
    }

    pub fn pretty_table(&self) -> Table {
        let mut table = Table::new();
        let mut header = vec![Cell::new("Element")];
        header.extend(self.compounds.iter().map(|c| Cell::new(c)));
        table.add_row(Row::new(header));
        for (i, element) in self.elements.iter().enumerate() {
            let mut cells = vec![Cell::new(&element.symbol)];
            cells.extend(
                self.matrix
                    .row(i)
                    .iter()
                    .map(|v| Cell::new(&v.to_string())),
            );
            table.add_row(Row::new(cells));
        }
        table
    }

    pub fn pretty_print(&self) {
        self.pretty_table().printstd();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Formula::element_data::PeriodicTable;
    use crate::Formula::tokenizer::FormulaLimits;

    fn compounds(formulas: &[&str]) -> Vec<Compound> {
        let table = PeriodicTable::builtin();
        formulas
            .iter()
            .map(|f| Compound::with_table(f, &table, &FormulaLimits::default()).unwrap())
            .collect()
    }

    #[test]
    fn test_matrix_layout() {
        let m = StoichiometryMatrix::new(&compounds(&["Fe", "O2"]), &compounds(&["Fe2O3"])).unwrap();
        let symbols: Vec<&str> = m.elements.iter().map(|e| e.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["Fe", "O"]);
        assert_eq!(m.n_reactants, 2);
        assert_eq!(
            m.matrix,
            DMatrix::from_row_slice(2, 3, &[1, 0, -2, 0, 2, -3])
        );
        // header + two elements
        assert_eq!(m.pretty_table().len(), 3);
    }

    #[test]
    fn test_product_only_element() {
        let err = StoichiometryMatrix::new(&compounds(&["H2"]), &compounds(&["O2"])).unwrap_err();
        assert!(matches!(err, ChemError::UnsolvableEquation(_)));
    }
}
