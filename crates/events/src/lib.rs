//! Change notification for live-update fan-out.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`PlatformEvent`]: the event envelope subscribers receive.
//! - [`ChangeNotifier`]: the fire-and-forget hook the coordinator calls after
//!   every committed mutation.

pub mod bus;
pub mod notifier;

pub use bus::{EventBus, PlatformEvent};
pub use notifier::{Change, ChangeNotifier};
