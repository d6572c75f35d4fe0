//! Common test utilities for wadf integration, scenario and CLI tests.
//!
//! This module provides:
//! - `TestEnv`: isolated master config, home and deployment root in temp dirs
//! - `FakeRunner`: a `CommandRunner` answering commands from a script
//! - `ScriptedPrompter`: canned answers for `%%` prompts

#![allow(dead_code)]

pub mod env;
pub mod fakes;

pub use env::*;
pub use fakes::*;
