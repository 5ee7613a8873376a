// Declare the modules to re-export
#[cfg(feature = "configs")]
pub mod configs;
#[cfg(feature = "loggers")]
pub mod loggers;
#[cfg(feature = "retrieve")]
pub mod retrieve;
#[cfg(feature = "sysapi")]
pub mod sysapi;
#[cfg(feature = "utils")]
pub mod utils;

// Re-export the working set
#[cfg(feature = "loggers")]
pub use loggers::loggerlocal::*;
#[cfg(feature = "loggers")]
pub use loggers::logrecord::*;
#[cfg(feature = "retrieve")]
pub use retrieve::transport::*;
#[cfg(feature = "sysapi")]
pub use sysapi::collector::Collector;
#[cfg(feature = "sysapi")]
pub use sysapi::config::{CollectorConfig, ConfigError};
#[cfg(feature = "sysapi")]
pub use sysapi::model::{AuthMode, Outcome, SystemInfo};
#[cfg(feature = "sysapi")]
pub use sysapi::recovery::{CollectError, RecoveryContext};
#[cfg(feature = "utils")]
pub use utils::misc::sys_info::*;
#[cfg(feature = "utils")]
pub use utils::misc::utils::*;
