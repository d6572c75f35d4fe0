//! Configuration module for wadf
//!
//! Macro definitions are layered, later layers winning:
//! 1. Internal macros (`hostname`, `cwd`, `user`, `home`) and `appref`
//! 2. Master config (`/etc/wadf/wadf.conf`, `WADF_MASTER_CONFIG`, `--master-config`)
//! 3. User config (`~/.wadf/config`)
//! 4. Application config (`local_config`)
//! 5. Instance file (`<deploy_path>/.wadf-instance`)
//! 6. Command-line overrides (`-D name=value`)
//!
//! Each config file contributes its `globals` section, then the section
//! named by the active profile.

mod loader;
#[cfg(test)]
mod tests;
mod types;

pub use loader::{internal_macros, read_config_file, ConfigLoader};
pub use types::{LoaderOptions, DEFAULT_MASTER_CONFIG, MASTER_CONFIG_ENV};
