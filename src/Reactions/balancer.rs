//! # Coefficient solver
//!
//! Finds the smallest positive integer vector `x` with `M x = 0` for a stoichiometry
//! matrix `M`. All arithmetic is exact (`malachite::Rational`):
//!
//! 1. `M` is brought to reduced row echelon form by Gauss-Jordan elimination with
//!    partial pivoting;
//! 2. the null space must be one-dimensional: exactly one column without a pivot;
//! 3. that free coefficient is fixed to 1 and the pivot coefficients are read off;
//! 4. a solution containing a zero, or entries of both signs, describes no real reaction
//!    and is rejected; an all-negative solution is negated;
//! 5. all entries are multiplied by the LCM of their denominators and divided by the GCD
//!    of the resulting integers.
use crate::Reactions::stoichiometry::StoichiometryMatrix;
use crate::errors::{ChemError, ChemResult};
use log::{debug, info};
use malachite::num::arithmetic::traits::{Abs, Gcd, Lcm};
use malachite::num::basic::traits::{One, Zero};
use malachite::{Natural, Rational};
use nalgebra::DMatrix;

/// Matrix in reduced row echelon form together with its pivot columns.
#[derive(Debug, Clone, PartialEq)]
pub struct RowEchelon {
    pub rows: Vec<Vec<Rational>>,
    pub pivots: Vec<usize>,
    pub ncols: usize,
}

impl RowEchelon {
    pub fn rank(&self) -> usize {
        self.pivots.len()
    }

    /// Columns without a pivot
    pub fn free_columns(&self) -> Vec<usize> {
        (0..self.ncols).filter(|c| !self.pivots.contains(c)).collect()
    }
}

/// Gauss-Jordan elimination over the rationals.
pub fn reduced_row_echelon(matrix: &DMatrix<i64>) -> RowEchelon {
    let (m, n) = matrix.shape();
    let mut rows: Vec<Vec<Rational>> = (0..m)
        .map(|i| (0..n).map(|j| Rational::from(matrix[(i, j)])).collect())
        .collect();
    let mut pivots = Vec::new();
    let mut row = 0;
    for col in 0..n {
        if row >= m {
            break;
        }
        // largest magnitude pivot keeps the intermediate fractions small
        let Some(i_max) = (row..m)
            .filter(|&i| rows[i][col] != Rational::ZERO)
            .max_by(|&a, &b| (&rows[a][col]).abs().cmp(&(&rows[b][col]).abs()))
        else {
            continue;
        };
        rows.swap(row, i_max);
        let pivot = rows[row][col].clone();
        for x in rows[row].iter_mut() {
            *x /= &pivot;
        }
        for i in 0..m {
            if i == row || rows[i][col] == Rational::ZERO {
                continue;
            }
            let factor = rows[i][col].clone();
            for j in col..n {
                let amount = &factor * &rows[row][j];
                rows[i][j] -= amount;
            }
        }
        pivots.push(col);
        row += 1;
    }
    RowEchelon {
        rows,
        pivots,
        ncols: n,
    }
}

/// The null space vector of `matrix` with its free coefficient set to 1.
/// Fails unless the null space is exactly one-dimensional.
pub fn null_space_vector(matrix: &DMatrix<i64>) -> ChemResult<Vec<Rational>> {
    let echelon = reduced_row_echelon(matrix);
    let free = echelon.free_columns();
    debug!(
        "rank {} of {}x{} matrix, free columns {:?}",
        echelon.rank(),
        matrix.nrows(),
        matrix.ncols(),
        free
    );
    let free_col = match free.as_slice() {
        [col] => *col,
        [] => {
            return Err(ChemError::UnsolvableEquation(
                "only the trivial solution exists".to_string(),
            ));
        }
        _ => {
            return Err(ChemError::UnsolvableEquation(format!(
                "solution space has {} dimensions, the equation mixes independent reactions",
                free.len()
            )));
        }
    };
    let mut solution = vec![Rational::ZERO; echelon.ncols];
    solution[free_col] = Rational::ONE;
    for (r, &pivot_col) in echelon.pivots.iter().enumerate() {
        solution[pivot_col] = -&echelon.rows[r][free_col];
    }
    Ok(solution)
}

/// Rejects zero and mixed-sign solutions, flips an all-negative one.
pub fn normalize_sign(solution: Vec<Rational>) -> ChemResult<Vec<Rational>> {
    if let Some(i) = solution.iter().position(|x| *x == Rational::ZERO) {
        return Err(ChemError::UnsolvableEquation(format!(
            "compound {} would get a zero coefficient",
            i + 1
        )));
    }
    let negative = solution.iter().filter(|x| **x < Rational::ZERO).count();
    if negative == solution.len() {
        Ok(solution.into_iter().map(|x| -x).collect())
    } else if negative == 0 {
        Ok(solution)
    } else {
        Err(ChemError::UnsolvableEquation(
            "coefficients of both signs, some compound is on the wrong side".to_string(),
        ))
    }
}

fn divide_by_gcd(integers: Vec<Rational>) -> Vec<Rational> {
    let gcd = integers
        .iter()
        .fold(Natural::ZERO, |acc, x| acc.gcd(x.numerator_ref()));
    if gcd <= Natural::ONE {
        return integers;
    }
    let gcd = Rational::from(&gcd);
    integers.into_iter().map(|x| x / &gcd).collect()
}

/// Scales a positive rational vector to the smallest integer vector with the same ratios,
/// using the LCM of all denominators at once.
pub fn clear_denominators(solution: &[Rational]) -> ChemResult<Vec<u64>> {
    let mut lcm = Natural::ONE;
    for x in solution.iter() {
        lcm = lcm.lcm(x.denominator_ref());
    }
    let lcm = Rational::from(&lcm);
    let integers = divide_by_gcd(solution.iter().map(|x| x * &lcm).collect());
    integers
        .iter()
        .map(|x| {
            u64::try_from(x).map_err(|_| {
                ChemError::UnsolvableEquation(format!("coefficient {} is out of range", x))
            })
        })
        .collect()
}

/// Multiplies by one denominator at a time until every entry is integral.
#[cfg(test)]
pub(crate) fn clear_denominators_iteratively(solution: &[Rational]) -> ChemResult<Vec<u64>> {
    let mut values: Vec<Rational> = solution.to_vec();
    while let Some(denominator) = values
        .iter()
        .map(|x| x.denominator_ref().clone())
        .find(|d| *d != Natural::ONE)
    {
        let factor = Rational::from(&denominator);
        values = values.into_iter().map(|x| x * &factor).collect();
    }
    divide_by_gcd(values)
        .iter()
        .map(|x| {
            u64::try_from(x).map_err(|_| {
                ChemError::UnsolvableEquation(format!("coefficient {} is out of range", x))
            })
        })
        .collect()
}

/// Smallest positive integer coefficients balancing `stoichiometry`, reactants first.
pub fn solve_coefficients(stoichiometry: &StoichiometryMatrix) -> ChemResult<Vec<u64>> {
    if stoichiometry.ncols() < 2 {
        return Err(ChemError::UnsolvableEquation(
            "an equation needs at least two compounds".to_string(),
        ));
    }
    let solution = normalize_sign(null_space_vector(&stoichiometry.matrix)?)?;
    let coefficients = clear_denominators(&solution)?;
    info!(
        "balanced {:?} with coefficients {:?}",
        stoichiometry.compounds, coefficients
    );
    Ok(coefficients)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn rational(s: &str) -> Rational {
        Rational::from_str(s).unwrap()
    }

    #[test]
    fn test_rref_and_null_space() {
        // Fe + O2 = Fe2O3
        let m = DMatrix::from_row_slice(2, 3, &[1i64, 0, -2, 0, 2, -3]);
        let echelon = reduced_row_echelon(&m);
        assert_eq!(echelon.pivots, vec![0, 1]);
        assert_eq!(echelon.free_columns(), vec![2]);
        let x = null_space_vector(&m).unwrap();
        assert_eq!(x, vec![rational("2"), rational("3/2"), rational("1")]);
        assert_eq!(clear_denominators(&x).unwrap(), vec![4, 3, 2]);
    }

    #[test]
    fn test_trivial_and_multidimensional_null_space() {
        // H2O = H2: oxygen forces the water coefficient to zero
        let m = DMatrix::from_row_slice(2, 2, &[2i64, -2, 1, 0]);
        assert_eq!(reduced_row_echelon(&m).rank(), 2);
        assert!(matches!(
            null_space_vector(&m),
            Err(ChemError::UnsolvableEquation(_))
        ));
        let m = DMatrix::from_row_slice(1, 3, &[1i64, 1, -1]);
        assert!(matches!(
            null_space_vector(&m),
            Err(ChemError::UnsolvableEquation(_))
        ));
    }

    #[test]
    fn test_sign_normalization() {
        let x = vec![rational("-1"), rational("-2")];
        assert_eq!(normalize_sign(x).unwrap(), vec![rational("1"), rational("2")]);
        assert!(normalize_sign(vec![rational("1"), rational("-2")]).is_err());
        assert!(normalize_sign(vec![rational("1"), rational("0")]).is_err());
    }

    #[test]
    fn test_clearing_strategies_agree() {
        let cases = [
            vec!["1/2", "1/3", "1"],
            vec!["2", "3/2", "1"],
            vec!["5/6", "7/4", "1", "1/9"],
            vec!["4", "6", "2"],
        ];
        for case in cases {
            let x: Vec<Rational> = case.iter().map(|s| rational(s)).collect();
            assert_eq!(
                clear_denominators(&x).unwrap(),
                clear_denominators_iteratively(&x).unwrap(),
                "{:?}",
                case
            );
        }
        let x: Vec<Rational> = ["4", "6", "2"].iter().map(|s| rational(s)).collect();
        assert_eq!(clear_denominators(&x).unwrap(), vec![2, 3, 1]);
    }
}
