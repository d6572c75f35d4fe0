//! Configuration file formats
//!
//! - `ini` - the INI dialect of master, user and application config files
//! - `instance_file` - the `.wadf-instance` file kept in each deployment

pub mod ini;
pub mod instance_file;

pub use ini::{IniFile, GLOBALS_SECTION};
pub use instance_file::{InstanceFile, INSTANCE_FILE_NAME};
