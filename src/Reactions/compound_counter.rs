//! Collection of compounds keyed by composition. Adding a compound that is already present
//! (same atoms, whatever its text) adds its coefficient to the stored one.
use crate::Formula::compound::Compound;
use crate::Formula::element::Element;
use malachite::Rational;
use malachite::num::basic::traits::Zero;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
pub struct CompoundCounter {
    compounds: Vec<Compound>,
}

impl CompoundCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, compound: Compound) {
        match self.compounds.iter_mut().find(|c| **c == compound) {
            Some(existing) => existing.coefficient += compound.coefficient,
            None => self.compounds.push(compound),
        }
    }

    pub fn len(&self) -> usize {
        self.compounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.compounds.is_empty()
    }

    pub fn get(&self, compound: &Compound) -> Option<&Compound> {
        self.compounds.iter().find(|c| *c == compound)
    }

    /// Accumulated coefficient, zero when absent
    pub fn coefficient_of(&self, compound: &Compound) -> Rational {
        self.get(compound)
            .map(|c| c.coefficient.clone())
            .unwrap_or(Rational::ZERO)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Compound> {
        self.compounds.iter()
    }

    /// Atoms of every element, each compound scaled by its coefficient.
    pub fn element_totals(&self) -> BTreeMap<Element, Rational> {
        let mut totals: BTreeMap<Element, Rational> = BTreeMap::new();
        for compound in self.compounds.iter() {
            for (element, &n) in compound.elements.iter() {
                *totals.entry(element.clone()).or_insert(Rational::ZERO) +=
                    &compound.coefficient * Rational::from(n);
            }
        }
        totals
    }

    pub fn merge(&mut self, other: &CompoundCounter) {
        for compound in other.iter() {
            self.add(compound.clone());
        }
    }

    /// True when both collections hold the same atoms in total.
    pub fn is_equal(&self, other: &CompoundCounter) -> bool {
        self.element_totals() == other.element_totals()
    }
}

impl FromIterator<Compound> for CompoundCounter {
    fn from_iter<I: IntoIterator<Item = Compound>>(iter: I) -> Self {
        let mut counter = CompoundCounter::new();
        for compound in iter {
            counter.add(compound);
        }
        counter
    }
}
