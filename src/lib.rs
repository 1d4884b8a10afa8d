pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::cli::CliConfig;

pub use crate::config::ClientConfig;
pub use crate::core::client::WayWeDoClient;
pub use crate::domain::model::{
    Invitation, NewUser, ProcedureFilter, TaskInstanceFilter, UserFilter, UserUpdate,
};
pub use crate::utils::error::{Result, WwdError};
