pub mod cleaner;
#[cfg(feature = "kube")]
pub mod cluster;
pub mod config;
pub mod domain;
pub mod openstack;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use cleaner::{CleanupEngine, LoadBalancerCleaner};
pub use config::settings::CleanerSettings;
pub use utils::error::{CleanerError, Result};
