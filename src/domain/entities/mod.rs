//! Domain Entities
//!
//! - `MacroStore` - ordered macro definitions and their resolved values
//! - `UnresolvedMacros` - macros that never got a value, for the end-of-run report

mod macro_store;
mod unresolved;

pub use macro_store::{
    is_sentinel, sentinel, MacroDefinition, MacroStore, MacroValues, ValueStack,
};
pub use unresolved::{UnresolvedMacro, UnresolvedMacros};
