//! Navigation Menu Synthesis
//!
//! Classified content → category-grouped menu tree → navigation store.

pub mod synthesizer;

pub use synthesizer::{ChildLookup, MenuStore, MenuSynthesizer, MenuTree, NoChildren};
