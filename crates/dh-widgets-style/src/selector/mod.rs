//! CSS selector types, parsing and matching.
//!
//! Selectors here exist to decide which element a delegated event belongs
//! to. They are never used to compute styles.

mod matcher;
mod parser;
mod types;

pub use matcher::{ElementMatchContext, SelectorMatcher, SiblingInfo};
pub use parser::parse_selector_list;
pub use types::*;
