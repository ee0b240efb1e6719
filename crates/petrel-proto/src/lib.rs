//! # petrel-proto
//!
//! Event model and wire protocol for the Petrel warning-event feed.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod events;
pub mod frames;

pub use error::ProtoError;
pub use events::{EventSeverity, EventSubject, WarningEvent};
pub use frames::FeedFrame;
