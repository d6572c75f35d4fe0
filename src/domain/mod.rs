//! Domain Layer
//!
//! The macro language and deployment rules, without process or network
//! access of its own.
//!
//! ## Structure
//!
//! - `entities/` - Macro store and the unresolved-macro record
//! - `value_objects/` - Revisions, VC info, dependencies, macro references
//! - `services/` - Macro resolution and the text transformations of each step
//! - `ports/` - Interface definitions for infrastructure

pub mod entities;
pub mod ports;
pub mod services;
pub mod value_objects;
