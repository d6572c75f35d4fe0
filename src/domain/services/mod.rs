//! Domain Services
//!
//! Stateless (or run-scoped) logic that operates on domain values:
//! macro resolution, and the text transformations behind each deployment
//! step (crontab fragments, hosts file, vhost config, dependency tags).

pub mod crontab;
pub mod dependency_tags;
pub mod entity_enumeration;
pub mod fallback;
pub mod hosts_file;
pub mod macro_engine;
pub mod macro_resolver;
pub mod version_sort;
pub mod vhost_config;

pub use fallback::{FallbackMatch, FallbackTable, OverlayStack};
pub use macro_engine::MacroEngine;
pub use macro_resolver::{extract_references, MacroResolver, INPUT_PREFIX, REQUIRED_PREFIX};
