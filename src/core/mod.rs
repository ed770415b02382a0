pub mod config;
pub mod error;

pub use config::{config, set_config, ResolverConfig};
pub use error::{PopologyError, Result};
