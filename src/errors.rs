//! # Errors
//!
//! One error type for the whole crate. Parse errors carry the offending formula and the
//! character position so that a caller can point at the exact place in user input.
//! `UnsolvableEquation` is the only "soft" error: the equation it was raised for keeps
//! its previous coefficients.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChemError {
    #[error("Mismatched delimiters in '{formula}' at position {position}")]
    MismatchedDelimiters { formula: String, position: usize },
    #[error("Unknown symbol '{symbol}' in '{formula}' at position {position}")]
    UnknownSymbol {
        symbol: String,
        formula: String,
        position: usize,
    },
    #[error("More than one subscript claims position {position} of '{formula}'")]
    AmbiguousSubscript { formula: String, position: usize },
    #[error("Equation cannot be balanced: {0}")]
    UnsolvableEquation(String),
    #[error("Invalid equation: {0}")]
    InvalidEquation(String),
    #[error("Invalid coefficient '{0}'")]
    InvalidCoefficient(String),
    #[error("No elements in formula '{0}'")]
    EmptyFormula(String),
    #[error("Formula '{formula}' has {length} characters, limit is {limit}")]
    FormulaTooLong {
        formula: String,
        length: usize,
        limit: usize,
    },
    #[error("Brackets in '{formula}' are nested {depth} deep, limit is {limit}")]
    NestingTooDeep {
        formula: String,
        depth: usize,
        limit: usize,
    },
    #[error("Formula '{formula}' expands to more than {limit} atoms")]
    TooManyAtoms { formula: String, limit: usize },
    #[error("Hess's law system is inconsistent: residual {residual:e} exceeds tolerance {tolerance:e}")]
    InconsistentHessSystem { residual: f64, tolerance: f64 },
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Element data error: {0}")]
    ElementData(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ChemResult<T> = Result<T, ChemError>;

impl ChemError {
    /// true for errors produced while reading a formula string
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            ChemError::MismatchedDelimiters { .. }
                | ChemError::UnknownSymbol { .. }
                | ChemError::InvalidCoefficient(_)
                | ChemError::EmptyFormula(_)
                | ChemError::InvalidEquation(_)
                | ChemError::FormulaTooLong { .. }
                | ChemError::NestingTooDeep { .. }
                | ChemError::TooManyAtoms { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_position() {
        let err = ChemError::MismatchedDelimiters {
            formula: "Na(OH".to_string(),
            position: 2,
        };
        assert_eq!(
            err.to_string(),
            "Mismatched delimiters in 'Na(OH' at position 2"
        );
        assert!(err.is_parse_error());
        let err = ChemError::UnsolvableEquation("no null space".to_string());
        assert!(!err.is_parse_error());
    }
}
