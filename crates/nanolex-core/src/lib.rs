#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core data structures shared by the nanolex crates.
//!
//! - `Interner` / `Symbol`: rule-name interning
//! - `Colors`: ANSI palette for parse traces

mod colors;
mod interner;

#[cfg(test)]
mod colors_tests;

pub use colors::Colors;
pub use interner::{Interner, Symbol};
