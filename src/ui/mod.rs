//! Terminal presentation for the `wadf` binary

pub mod error;
pub mod json;
pub mod terminal;
pub mod text;
pub mod theme;
pub mod views;
