use crate::Formula::element_data::ElementRecord;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A chemical element as it appears in a parsed formula. Identity is the symbol alone,
/// the looked-up data travels along for mass and electron sums.
#[derive(Debug, Clone)]
pub struct Element {
    pub symbol: String,
    pub atomic_number: u32,
    pub molar_mass: f64,
    pub valence_electrons: u32,
}

impl Element {
    pub fn from_record(record: &ElementRecord) -> Self {
        Self {
            symbol: record.symbol.clone(),
            atomic_number: record.atomic_number,
            molar_mass: record.molar_mass,
            valence_electrons: record.valence(),
        }
    }
}

impl From<&ElementRecord> for Element {
    fn from(record: &ElementRecord) -> Self {
        Self::from_record(record)
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        self.symbol == other.symbol
    }
}

impl Eq for Element {}

impl Hash for Element {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.symbol.hash(state);
    }
}

impl PartialOrd for Element {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Element {
    fn cmp(&self, other: &Self) -> Ordering {
        self.symbol.cmp(&other.symbol)
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Formula::element_data::PeriodicTable;
    use std::collections::HashSet;

    #[test]
    fn test_identity_is_symbol() {
        let table = PeriodicTable::builtin();
        let oxygen = Element::from(table.record("O").unwrap());
        let mut heavy = oxygen.clone();
        heavy.molar_mass = 18.0;
        assert_eq!(oxygen, heavy);
        let set: HashSet<Element> = [oxygen.clone(), heavy].into_iter().collect();
        assert_eq!(set.len(), 1);
        let carbon = Element::from(table.record("C").unwrap());
        assert!(carbon < oxygen);
        assert_eq!(oxygen.to_string(), "O");
        assert_eq!(oxygen.valence_electrons, 6);
    }
}
