//! Reminder store and local notification scheduling engine.
//!
//! The UI layer owns a [`ReminderStore`], mutates it through the CRUD
//! operations, and renders whatever the query surface returns; the store
//! persists its state through a [`BlobStore`] and keeps notification
//! triggers in sync through an injected [`NotificationService`].

pub mod config;
pub mod error;
pub mod notify;
pub mod reminder;
pub mod scheduler;
pub mod storage;
pub mod store;

pub use error::{Error, Result};
pub use notify::{LogNotifier, MemoryNotifier, NotificationContent, NotificationService};
pub use reminder::{Recurrence, Reminder};
pub use scheduler::{compute_trigger, ScheduleDecision, Scheduler, TriggerRule};
pub use storage::{BlobStore, FileStore, MemoryStore};
pub use store::{ReminderStore, StoreEvent};
