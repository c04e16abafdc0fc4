//! Notification delivery
//!
//! The checker only depends on the [`Notifier`] trait; [`TelegramNotifier`]
//! is the production implementation.

mod telegram;
mod traits;

pub use telegram::TelegramNotifier;
pub use traits::{Notifier, NotifyError, NotifyResult};
