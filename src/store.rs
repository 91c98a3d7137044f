use crate::config;
use crate::error::Result;
use crate::notify::NotificationService;
use crate::reminder::Reminder;
use crate::scheduler::Scheduler;
use crate::storage::BlobStore;
use chrono::NaiveDate;
use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{debug, warn};
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use uuid::Uuid;

/// Change notification delivered to subscribers after a mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    Added(Uuid),
    Updated(Uuid),
    Deleted(Vec<Uuid>),
    Completed(Uuid),
    Uncompleted(Uuid),
}

/// Authoritative in-memory reminder collection plus the completion set.
///
/// Display order is insertion order. Completion is membership in a separate
/// id set, not a field on the record. Both collections are persisted in full
/// as independent blobs after every mutation; a reminder's notification
/// trigger is recomputed whenever the reminder or its completion state
/// changes.
///
/// Mutators never fail on parsing or scheduling problems. A returned `Err`
/// means a blob write failed after the in-memory change was already applied,
/// and is useful only as a diagnostic.
pub struct ReminderStore {
    reminders: Vec<Reminder>,
    completed: HashSet<Uuid>,
    blobs: Box<dyn BlobStore>,
    scheduler: Scheduler,
    subscribers: Vec<Sender<StoreEvent>>,
}

fn load_blob<T: DeserializeOwned + Default>(blobs: &dyn BlobStore, key: &str) -> T {
    match blobs.load(key) {
        Ok(Some(bytes)) => match serde_json::from_slice(&bytes) {
            Ok(value) => value,
            Err(e) => {
                warn!("discarding unreadable {key} blob: {e}");
                T::default()
            }
        },
        Ok(None) => T::default(),
        Err(e) => {
            warn!("failed to read {key} blob: {e}");
            T::default()
        }
    }
}

impl ReminderStore {
    /// Load both blobs from `blobs`. Unreadable or undecodable blobs degrade
    /// to the empty collection; opening never fails.
    pub fn open(blobs: Box<dyn BlobStore>, service: Box<dyn NotificationService>) -> Self {
        let reminders: Vec<Reminder> = load_blob(blobs.as_ref(), config::REMINDERS_KEY);
        let completed: HashSet<Uuid> = load_blob(blobs.as_ref(), config::COMPLETED_KEY);
        debug!(
            "loaded {} reminders, {} completed",
            reminders.len(),
            completed.len()
        );

        Self {
            reminders,
            completed,
            blobs,
            scheduler: Scheduler::new(service),
            subscribers: Vec::new(),
        }
    }

    /// Append a reminder, persist, and schedule its notification.
    pub fn add(&mut self, reminder: Reminder) -> Result<Uuid> {
        let id = reminder.id;
        self.reminders.push(reminder);
        let persisted = self.persist_reminders();

        if let Some(reminder) = self.reminders.last() {
            self.scheduler.sync(reminder, self.completed.contains(&id));
        }

        self.emit(StoreEvent::Added(id));
        persisted.map(|_| id)
    }

    /// Replace the reminder with the same id in place, preserving its
    /// position. Unknown ids are silently ignored.
    pub fn update(&mut self, reminder: Reminder) -> Result<()> {
        let id = reminder.id;
        let Some(idx) = self.reminders.iter().position(|r| r.id == id) else {
            debug!("update for unknown reminder {id} ignored");
            return Ok(());
        };

        self.reminders[idx] = reminder;
        let persisted = self.persist_reminders();
        self.scheduler
            .sync(&self.reminders[idx], self.completed.contains(&id));

        self.emit(StoreEvent::Updated(id));
        persisted
    }

    /// Delete a batch of reminders by id. Each target's trigger is cancelled
    /// and its id dropped from the completion set (a no-op removal when it
    /// was never completed). Both blobs are persisted once after the batch.
    pub fn delete(&mut self, ids: &[Uuid]) -> Result<()> {
        let mut removed = Vec::new();
        for &id in ids {
            let Some(idx) = self.reminders.iter().position(|r| r.id == id) else {
                continue;
            };
            self.reminders.remove(idx);
            self.scheduler.cancel(id);
            self.completed.remove(&id);
            removed.push(id);
        }

        if removed.is_empty() {
            return Ok(());
        }

        let persisted = self.persist_reminders();
        let persisted_completed = self.persist_completed();

        self.emit(StoreEvent::Deleted(removed));
        persisted.and(persisted_completed)
    }

    /// Flip completion state. Completing cancels the trigger; uncompleting
    /// reschedules it iff the due time is still in the future. Only the
    /// completion blob is persisted. Returns the new state; unknown ids are
    /// a no-op returning the current membership.
    pub fn toggle_completion(&mut self, id: Uuid) -> Result<bool> {
        let Some(idx) = self.reminders.iter().position(|r| r.id == id) else {
            debug!("completion toggle for unknown reminder {id} ignored");
            return Ok(self.completed.contains(&id));
        };

        let now_completed = if self.completed.remove(&id) {
            false
        } else {
            self.completed.insert(id);
            true
        };

        self.scheduler.sync(&self.reminders[idx], now_completed);
        let persisted = self.persist_completed();

        self.emit(if now_completed {
            StoreEvent::Completed(id)
        } else {
            StoreEvent::Uncompleted(id)
        });
        persisted.map(|_| now_completed)
    }

    pub fn is_completed(&self, id: Uuid) -> bool {
        self.completed.contains(&id)
    }

    /// Subscribe to change events. Receivers that have been dropped are
    /// pruned on the next emit.
    pub fn subscribe(&mut self) -> Receiver<StoreEvent> {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }

    pub fn reminders(&self) -> &[Reminder] {
        &self.reminders
    }

    pub fn completed_ids(&self) -> &HashSet<Uuid> {
        &self.completed
    }

    /// Not-completed reminders in insertion order.
    pub fn active(&self) -> Vec<&Reminder> {
        self.reminders
            .iter()
            .filter(|r| !self.completed.contains(&r.id))
            .collect()
    }

    /// Active reminders whose title contains `text`, case-insensitively.
    /// Empty text matches everything.
    pub fn search(&self, text: &str) -> Vec<&Reminder> {
        let needle = text.to_lowercase();
        self.reminders
            .iter()
            .filter(|r| !self.completed.contains(&r.id))
            .filter(|r| r.title.to_lowercase().contains(&needle))
            .collect()
    }

    /// Active reminders due on the given day. Malformed due dates never match.
    pub fn due_on(&self, date: NaiveDate) -> Vec<&Reminder> {
        self.reminders
            .iter()
            .filter(|r| !self.completed.contains(&r.id))
            .filter(|r| r.due_date_time().map(|due| due.date()) == Some(date))
            .collect()
    }

    /// Active reminders with a recurrence pattern.
    pub fn recurring(&self) -> Vec<&Reminder> {
        self.reminders
            .iter()
            .filter(|r| !self.completed.contains(&r.id))
            .filter(|r| r.recurrence.is_some())
            .collect()
    }

    /// Reminders currently marked done, in insertion order.
    pub fn completed_reminders(&self) -> Vec<&Reminder> {
        self.reminders
            .iter()
            .filter(|r| self.completed.contains(&r.id))
            .collect()
    }

    fn persist_reminders(&self) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(&self.reminders)?;
        self.blobs.save(config::REMINDERS_KEY, &bytes)
    }

    fn persist_completed(&self) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(&self.completed)?;
        self.blobs.save(config::COMPLETED_KEY, &bytes)
    }

    fn emit(&mut self, event: StoreEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}
