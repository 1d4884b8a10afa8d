pub mod client;
pub mod query;

pub use crate::domain::ports::ConfigProvider;
pub use crate::utils::error::Result;
pub use client::WayWeDoClient;
pub use query::{QueryParams, ToQuery};
