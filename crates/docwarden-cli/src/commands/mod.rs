//! Command implementations.

mod check;
mod rules;

pub use check::{CheckCommand, CheckReport};
pub use rules::{RulesCommand, RulesReport};
