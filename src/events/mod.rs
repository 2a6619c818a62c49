//! # Events Module
//!
//! Progress reporting through event channels.
//!
//! The pipeline and the action executor emit events while they work;
//! the CLI subscribes on a separate thread to drive its progress bar.
//! Running without a subscriber is always valid - events are dropped.

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use types::*;
