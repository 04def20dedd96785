//! Element reference data: symbols, atomic numbers, standard atomic weights and valence
//! electron counts. The built-in table covers all 118 elements; a JSON file can replace it.
//!
//! # Examples
//! ```
//! use ChemBalance::Formula::element_data::PeriodicTable;
//! let table = PeriodicTable::builtin();
//! assert_eq!(table.atomic_number("Fe"), Some(26));
//! assert_eq!(table.valence_electrons("O"), Some(6));
//! ```
use crate::errors::{ChemError, ChemResult};
use crate::settings::with_config;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

// Define a struct to hold element data
struct ElementEntry {
    symbol: &'static str,
    atomic_mass: f64,
}

// Atomic number = position in the list + 1
const ELEMENTS: &[ElementEntry] = &[
    ElementEntry { symbol: "H", atomic_mass: 1.008 },
    ElementEntry { symbol: "He", atomic_mass: 4.0026 },
    ElementEntry { symbol: "Li", atomic_mass: 6.94 },
    ElementEntry { symbol: "Be", atomic_mass: 9.0122 },
    ElementEntry { symbol: "B", atomic_mass: 10.81 },
    ElementEntry { symbol: "C", atomic_mass: 12.011 },
    ElementEntry { symbol: "N", atomic_mass: 14.007 },
    ElementEntry { symbol: "O", atomic_mass: 15.999 },
    ElementEntry { symbol: "F", atomic_mass: 18.998 },
    ElementEntry { symbol: "Ne", atomic_mass: 20.18 },
    ElementEntry { symbol: "Na", atomic_mass: 22.99 },
    ElementEntry { symbol: "Mg", atomic_mass: 24.305 },
    ElementEntry { symbol: "Al", atomic_mass: 26.982 },
    ElementEntry { symbol: "Si", atomic_mass: 28.085 },
    ElementEntry { symbol: "P", atomic_mass: 30.974 },
    ElementEntry { symbol: "S", atomic_mass: 32.06 },
    ElementEntry { symbol: "Cl", atomic_mass: 35.45 },
    ElementEntry { symbol: "Ar", atomic_mass: 39.948 },
    ElementEntry { symbol: "K", atomic_mass: 39.098 },
    ElementEntry { symbol: "Ca", atomic_mass: 40.078 },
    ElementEntry { symbol: "Sc", atomic_mass: 44.956 },
    ElementEntry { symbol: "Ti", atomic_mass: 47.867 },
    ElementEntry { symbol: "V", atomic_mass: 50.942 },
    ElementEntry { symbol: "Cr", atomic_mass: 51.996 },
    ElementEntry { symbol: "Mn", atomic_mass: 54.938 },
    ElementEntry { symbol: "Fe", atomic_mass: 55.845 },
    ElementEntry { symbol: "Co", atomic_mass: 58.933 },
    ElementEntry { symbol: "Ni", atomic_mass: 58.693 },
    ElementEntry { symbol: "Cu", atomic_mass: 63.546 },
    ElementEntry { symbol: "Zn", atomic_mass: 65.38 },
    ElementEntry { symbol: "Ga", atomic_mass: 69.723 },
    ElementEntry { symbol: "Ge", atomic_mass: 72.63 },
    ElementEntry { symbol: "As", atomic_mass: 74.922 },
    ElementEntry { symbol: "Se", atomic_mass: 78.971 },
    ElementEntry { symbol: "Br", atomic_mass: 79.904 },
    ElementEntry { symbol: "Kr", atomic_mass: 83.798 },
    ElementEntry { symbol: "Rb", atomic_mass: 85.468 },
    ElementEntry { symbol: "Sr", atomic_mass: 87.62 },
    ElementEntry { symbol: "Y", atomic_mass: 88.906 },
    ElementEntry { symbol: "Zr", atomic_mass: 91.224 },
    ElementEntry { symbol: "Nb", atomic_mass: 92.906 },
    ElementEntry { symbol: "Mo", atomic_mass: 95.95 },
    ElementEntry { symbol: "Tc", atomic_mass: 98.0 },
    ElementEntry { symbol: "Ru", atomic_mass: 101.07 },
    ElementEntry { symbol: "Rh", atomic_mass: 102.91 },
    ElementEntry { symbol: "Pd", atomic_mass: 106.42 },
    ElementEntry { symbol: "Ag", atomic_mass: 107.87 },
    ElementEntry { symbol: "Cd", atomic_mass: 112.41 },
    ElementEntry { symbol: "In", atomic_mass: 114.82 },
    ElementEntry { symbol: "Sn", atomic_mass: 118.71 },
    ElementEntry { symbol: "Sb", atomic_mass: 121.76 },
    ElementEntry { symbol: "Te", atomic_mass: 127.6 },
    ElementEntry { symbol: "I", atomic_mass: 126.9 },
    ElementEntry { symbol: "Xe", atomic_mass: 131.29 },
    ElementEntry { symbol: "Cs", atomic_mass: 132.91 },
    ElementEntry { symbol: "Ba", atomic_mass: 137.33 },
    ElementEntry { symbol: "La", atomic_mass: 138.91 },
    ElementEntry { symbol: "Ce", atomic_mass: 140.12 },
    ElementEntry { symbol: "Pr", atomic_mass: 140.91 },
    ElementEntry { symbol: "Nd", atomic_mass: 144.24 },
    ElementEntry { symbol: "Pm", atomic_mass: 145.0 },
    ElementEntry { symbol: "Sm", atomic_mass: 150.36 },
    ElementEntry { symbol: "Eu", atomic_mass: 151.96 },
    ElementEntry { symbol: "Gd", atomic_mass: 157.25 },
    ElementEntry { symbol: "Tb", atomic_mass: 158.93 },
    ElementEntry { symbol: "Dy", atomic_mass: 162.5 },
    ElementEntry { symbol: "Ho", atomic_mass: 164.93 },
    ElementEntry { symbol: "Er", atomic_mass: 167.26 },
    ElementEntry { symbol: "Tm", atomic_mass: 168.93 },
    ElementEntry { symbol: "Yb", atomic_mass: 173.05 },
    ElementEntry { symbol: "Lu", atomic_mass: 174.97 },
    ElementEntry { symbol: "Hf", atomic_mass: 178.49 },
    ElementEntry { symbol: "Ta", atomic_mass: 180.95 },
    ElementEntry { symbol: "W", atomic_mass: 183.84 },
    ElementEntry { symbol: "Re", atomic_mass: 186.21 },
    ElementEntry { symbol: "Os", atomic_mass: 190.23 },
    ElementEntry { symbol: "Ir", atomic_mass: 192.22 },
    ElementEntry { symbol: "Pt", atomic_mass: 195.08 },
    ElementEntry { symbol: "Au", atomic_mass: 196.97 },
    ElementEntry { symbol: "Hg", atomic_mass: 200.59 },
    ElementEntry { symbol: "Tl", atomic_mass: 204.38 },
    ElementEntry { symbol: "Pb", atomic_mass: 207.2 },
    ElementEntry { symbol: "Bi", atomic_mass: 208.98 },
    ElementEntry { symbol: "Po", atomic_mass: 209.0 },
    ElementEntry { symbol: "At", atomic_mass: 210.0 },
    ElementEntry { symbol: "Rn", atomic_mass: 222.0 },
    ElementEntry { symbol: "Fr", atomic_mass: 223.0 },
    ElementEntry { symbol: "Ra", atomic_mass: 226.0 },
    ElementEntry { symbol: "Ac", atomic_mass: 227.0 },
    ElementEntry { symbol: "Th", atomic_mass: 232.04 },
    ElementEntry { symbol: "Pa", atomic_mass: 231.04 },
    ElementEntry { symbol: "U", atomic_mass: 238.03 },
    ElementEntry { symbol: "Np", atomic_mass: 237.0 },
    ElementEntry { symbol: "Pu", atomic_mass: 244.0 },
    ElementEntry { symbol: "Am", atomic_mass: 243.0 },
    ElementEntry { symbol: "Cm", atomic_mass: 247.0 },
    ElementEntry { symbol: "Bk", atomic_mass: 247.0 },
    ElementEntry { symbol: "Cf", atomic_mass: 251.0 },
    ElementEntry { symbol: "Es", atomic_mass: 252.0 },
    ElementEntry { symbol: "Fm", atomic_mass: 257.0 },
    ElementEntry { symbol: "Md", atomic_mass: 258.0 },
    ElementEntry { symbol: "No", atomic_mass: 259.0 },
    ElementEntry { symbol: "Lr", atomic_mass: 266.0 },
    ElementEntry { symbol: "Rf", atomic_mass: 267.0 },
    ElementEntry { symbol: "Db", atomic_mass: 268.0 },
    ElementEntry { symbol: "Sg", atomic_mass: 269.0 },
    ElementEntry { symbol: "Bh", atomic_mass: 270.0 },
    ElementEntry { symbol: "Hs", atomic_mass: 269.0 },
    ElementEntry { symbol: "Mt", atomic_mass: 278.0 },
    ElementEntry { symbol: "Ds", atomic_mass: 281.0 },
    ElementEntry { symbol: "Rg", atomic_mass: 282.0 },
    ElementEntry { symbol: "Cn", atomic_mass: 285.0 },
    ElementEntry { symbol: "Nh", atomic_mass: 286.0 },
    ElementEntry { symbol: "Fl", atomic_mass: 289.0 },
    ElementEntry { symbol: "Mc", atomic_mass: 290.0 },
    ElementEntry { symbol: "Lv", atomic_mass: 293.0 },
    ElementEntry { symbol: "Ts", atomic_mass: 294.0 },
    ElementEntry { symbol: "Og", atomic_mass: 294.0 },
];

/// Subshells in Madelung filling order as (n, l)
const MADELUNG_ORDER: [(u32, u32); 19] = [
    (1, 0),
    (2, 0),
    (2, 1),
    (3, 0),
    (3, 1),
    (4, 0),
    (3, 2),
    (4, 1),
    (5, 0),
    (4, 2),
    (5, 1),
    (6, 0),
    (4, 3),
    (5, 2),
    (6, 1),
    (7, 0),
    (5, 3),
    (6, 2),
    (7, 1),
];

/// Valence electrons from the ground-state configuration built by Madelung filling:
/// every electron from the last occupied s subshell onward, except those sitting in
/// completely filled d and f subshells. Transition-metal exceptions (Cr, Cu, ...) are
/// not modelled.
pub fn valence_from_atomic_number(atomic_number: u32) -> u32 {
    let mut left = atomic_number;
    let mut filled: Vec<(u32, u32)> = Vec::new(); // (l, electrons)
    for &(_n, l) in MADELUNG_ORDER.iter() {
        if left == 0 {
            break;
        }
        let capacity = 4 * l + 2;
        let electrons = left.min(capacity);
        filled.push((l, electrons));
        left -= electrons;
    }
    let last_s = filled.iter().rposition(|&(l, _)| l == 0).unwrap_or(0);
    filled[last_s..]
        .iter()
        .filter(|&&(l, electrons)| !(l >= 2 && electrons == 4 * l + 2))
        .map(|&(_, electrons)| electrons)
        .sum()
}

/// One element of the periodic table as seen by the formula parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementRecord {
    pub symbol: String,
    pub atomic_number: u32,
    pub molar_mass: f64,
    /// derived from the atomic number when missing in JSON
    #[serde(default)]
    pub valence_electrons: Option<u32>,
}

impl ElementRecord {
    pub fn valence(&self) -> u32 {
        self.valence_electrons
            .unwrap_or_else(|| valence_from_atomic_number(self.atomic_number))
    }
}

/// Read-only element data provider with longest-first symbol lookup.
#[derive(Debug, Clone)]
pub struct PeriodicTable {
    records: Vec<ElementRecord>,
    index: HashMap<String, usize>,
    max_symbol_len: usize,
}

impl PeriodicTable {
    /// The built-in table of 118 elements
    pub fn builtin() -> Self {
        let records = ELEMENTS
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let atomic_number = i as u32 + 1;
                ElementRecord {
                    symbol: entry.symbol.to_string(),
                    atomic_number,
                    molar_mass: entry.atomic_mass,
                    valence_electrons: Some(valence_from_atomic_number(atomic_number)),
                }
            })
            .collect();
        // the built-in list is well formed, validation cannot fail
        Self::index_records(records)
    }

    /// Builds a table from records, rejecting malformed or duplicated symbols.
    pub fn from_records(records: Vec<ElementRecord>) -> ChemResult<Self> {
        if records.is_empty() {
            return Err(ChemError::ElementData("no element records".to_string()));
        }
        let mut seen = HashSet::new();
        for record in records.iter() {
            let mut chars = record.symbol.chars();
            let well_formed = match chars.next() {
                Some(first) => {
                    first.is_ascii_uppercase() && chars.all(|c| c.is_ascii_lowercase())
                }
                None => false,
            };
            if !well_formed {
                return Err(ChemError::ElementData(format!(
                    "malformed element symbol '{}'",
                    record.symbol
                )));
            }
            if !(record.molar_mass.is_finite() && record.molar_mass > 0.0) {
                return Err(ChemError::ElementData(format!(
                    "molar mass of '{}' must be positive, got {}",
                    record.symbol, record.molar_mass
                )));
            }
            if record.atomic_number == 0 {
                return Err(ChemError::ElementData(format!(
                    "atomic number of '{}' must be positive",
                    record.symbol
                )));
            }
            if !seen.insert(record.symbol.clone()) {
                return Err(ChemError::ElementData(format!(
                    "duplicated element symbol '{}'",
                    record.symbol
                )));
            }
        }
        Ok(Self::index_records(records))
    }

    fn index_records(records: Vec<ElementRecord>) -> Self {
        let index = records
            .iter()
            .enumerate()
            .map(|(i, r)| (r.symbol.clone(), i))
            .collect();
        let max_symbol_len = records.iter().map(|r| r.symbol.len()).max().unwrap_or(0);
        Self {
            records,
            index,
            max_symbol_len,
        }
    }

    /// Loads a JSON array of `ElementRecord`
    /// ```json
    /// [ { "symbol": "H", "atomic_number": 1, "molar_mass": 1.008 }, ... ]
    /// ```
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ChemResult<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let records: Vec<ElementRecord> = serde_json::from_str(&content)?;
        let table = Self::from_records(records)?;
        info!(
            "loaded {} elements from '{}'",
            table.len(),
            path.as_ref().display()
        );
        Ok(table)
    }

    /// Process-wide table, initialised once from the configured file or the built-in data.
    pub fn global() -> &'static PeriodicTable {
        static GLOBAL_TABLE: OnceLock<PeriodicTable> = OnceLock::new();
        GLOBAL_TABLE.get_or_init(|| {
            let path = with_config(|cfg| cfg.element_data.clone());
            match path {
                Some(path) => match PeriodicTable::from_json_file(&path) {
                    Ok(table) => table,
                    Err(e) => {
                        warn!(
                            "element data '{}' could not be loaded ({}), using built-in table",
                            path, e
                        );
                        PeriodicTable::builtin()
                    }
                },
                None => PeriodicTable::builtin(),
            }
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn max_symbol_len(&self) -> usize {
        self.max_symbol_len
    }

    pub fn record(&self, symbol: &str) -> Option<&ElementRecord> {
        self.index.get(symbol).map(|&i| &self.records[i])
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.index.contains_key(symbol)
    }

    pub fn molar_mass(&self, symbol: &str) -> Option<f64> {
        self.record(symbol).map(|r| r.molar_mass)
    }

    pub fn valence_electrons(&self, symbol: &str) -> Option<u32> {
        self.record(symbol).map(|r| r.valence())
    }

    pub fn atomic_number(&self, symbol: &str) -> Option<u32> {
        self.record(symbol).map(|r| r.atomic_number)
    }

    pub fn records(&self) -> &[ElementRecord] {
        &self.records
    }

    /// Longest symbol of the table starting at character `index` of `text`.
    pub fn match_symbol(&self, text: &str, index: usize) -> Option<&ElementRecord> {
        let chars: Vec<char> = text.chars().collect();
        crate::Formula::lexicon::match_element(self, &chars, index)
    }
}

impl Default for PeriodicTable {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_builtin_table() {
        let table = PeriodicTable::builtin();
        assert_eq!(table.len(), 118);
        assert_eq!(table.max_symbol_len(), 2);
        assert_eq!(table.atomic_number("H"), Some(1));
        assert_eq!(table.atomic_number("Og"), Some(118));
        assert_relative_eq!(table.molar_mass("O").unwrap(), 15.999, epsilon = 1e-9);
        assert!(table.record("Xx").is_none());
        // case sensitive
        assert!(table.record("CO").is_none());
        assert_eq!(table.match_symbol("CoCl2", 0).unwrap().symbol, "Co");
        assert_eq!(table.match_symbol("CoCl2", 2).unwrap().symbol, "Cl");
    }

    #[test]
    fn test_valence_electrons() {
        let cases = [
            (1, 1),   // H
            (2, 2),   // He
            (6, 4),   // C
            (8, 6),   // O
            (10, 8),  // Ne
            (11, 1),  // Na
            (17, 7),  // Cl
            (26, 8),  // Fe: 4s2 3d6
            (30, 2),  // Zn: full 3d ignored
            (35, 7),  // Br
            (57, 3),  // La: 6s2 4f1
            (82, 4),  // Pb
        ];
        for (z, expected) in cases {
            assert_eq!(valence_from_atomic_number(z), expected, "Z = {}", z);
        }
    }

    #[test]
    fn test_from_json_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{ "symbol": "H", "atomic_number": 1, "molar_mass": 1.0 }},
                {{ "symbol": "O", "atomic_number": 8, "molar_mass": 16.0, "valence_electrons": 2 }}
            ]"#
        )
        .unwrap();
        let table = PeriodicTable::from_json_file(file.path()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.valence_electrons("H"), Some(1));
        // explicit value wins over the derived one
        assert_eq!(table.valence_electrons("O"), Some(2));
        assert_relative_eq!(table.molar_mass("O").unwrap(), 16.0);
    }

    #[test]
    fn test_rejects_bad_records() {
        let bad_symbol = vec![ElementRecord {
            symbol: "h".to_string(),
            atomic_number: 1,
            molar_mass: 1.0,
            valence_electrons: None,
        }];
        assert!(PeriodicTable::from_records(bad_symbol).is_err());

        let duplicated = vec![
            ElementRecord {
                symbol: "H".to_string(),
                atomic_number: 1,
                molar_mass: 1.0,
                valence_electrons: None,
            },
            ElementRecord {
                symbol: "H".to_string(),
                atomic_number: 1,
                molar_mass: 1.0,
                valence_electrons: None,
            },
        ];
        assert!(matches!(
            PeriodicTable::from_records(duplicated),
            Err(ChemError::ElementData(_))
        ));
        assert!(PeriodicTable::from_records(vec![]).is_err());
    }
}
