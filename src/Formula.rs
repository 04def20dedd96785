//! # Formula
//!
//! Everything between a formula string and a `Compound`:
//!
//! - `element_data`: built-in periodic table, JSON-loadable element records and the
//!   valence electron rule
//! - `element`: the `Element` value type, identified by its symbol
//! - `lexicon`: bracket pairs, digit runs, longest-first symbol matching
//! - `multipliers`: resolution of nested bracket groups into per-position multipliers
//! - `tokenizer`: leading coefficient, atom multiset and subscript annotations
//! - `compound`: counts, molar mass, electrons, LaTeX and composition
pub mod compound;
pub mod element;
pub mod element_data;
pub mod lexicon;
pub mod multipliers;
pub mod tokenizer;
