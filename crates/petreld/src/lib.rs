//! Petrel daemon library.
//!
//! Watches the cluster warning feed and forwards novel warning events to a
//! chat webhook, suppressing repeats of the most recent notification.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod feed;
pub mod listener;
pub mod watch;

pub use config::DaemonConfig;
pub use error::{DaemonError, DaemonResult};
pub use watch::Watcher;
