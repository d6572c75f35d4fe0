//! Deploy steps
//!
//! Each module adds the methods for one concern to `DeployUseCase`.

pub(crate) mod checkout;
pub(crate) mod database;
pub(crate) mod dependencies;
pub(crate) mod dns;
pub(crate) mod hooks;
pub(crate) mod input;
pub(crate) mod scheduled_jobs;
pub(crate) mod templates;
pub(crate) mod vhost;
