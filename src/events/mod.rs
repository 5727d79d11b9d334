//! # Events Module
//!
//! Notification channel between the engine and whatever presents it.
//!
//! ## Design
//! The engine emits events through channels, so any UI (CLI, GUI) can
//! subscribe without the engine knowing about it. Property changes carry
//! the old and new value, which is enough for a view to enable or disable
//! conflicting actions while a run holds the lock.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//! let comparer = ImageComparer::with_settings(ComparerSettings::default(), sender);
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         if let Event::Property(change) = event {
//!             println!("{} -> {}", change.name, change.new_value);
//!         }
//!     }
//! });
//! ```

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use types::*;
