//! # ChemBalance
//!
//! Chemical formula parsing and exact balancing of chemical equations.
//!
//! - `Formula`: formula strings with nested bracket groups into atom counts, molar mass
//!   and electron counts
//! - `Reactions`: equations, stoichiometry matrices, the exact rational balancer and
//!   Hess's-law composition of reaction enthalpies
//! - `settings`: JSON configuration (element data source, input limits, log level)
//! - `Utils`: logging
//! - `cli`: interactive terminal menu
//!
//! ```rust
//! use ChemBalance::Reactions::equation::Equation;
//!
//! let mut eq = Equation::parse("KMnO4 + HCl = KCl + MnCl2 + H2O + Cl2").unwrap();
//! eq.balance().unwrap();
//! assert_eq!(eq.integer_coefficients(), Some(vec![2, 16, 2, 2, 8, 5]));
//! ```
#![allow(non_snake_case)]
#[allow(non_snake_case)]
pub mod Formula;
#[allow(non_snake_case)]
pub mod Reactions;
#[allow(non_snake_case)]
pub mod Utils;
pub mod cli;
pub mod errors;
pub mod settings;

pub use errors::{ChemError, ChemResult};
