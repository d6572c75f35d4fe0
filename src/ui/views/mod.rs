pub mod deploy;
pub mod query;
