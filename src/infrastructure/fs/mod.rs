//! File System Helpers
//!
//! - `home` - home directory lookup with test isolation
//! - `walk` - file listings that skip VC metadata

mod home;
mod walk;

pub use home::{user_config_path, wadf_home_dir, WADF_TEST_HOME_VAR};
pub use walk::{remove_dir_quietly, walk_files};
