use crate::config;
use crate::error::{Error, Result};
use crate::reminder::Reminder;
use crate::scheduler::TriggerRule;
use log::debug;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Payload handed to the notification service when a trigger fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationContent {
    pub title: String,
    pub body: String,
    pub sound: String,
}

impl NotificationContent {
    /// Body falls back to "Reminder for <title>" when the reminder has no note.
    pub fn for_reminder(reminder: &Reminder) -> Self {
        Self {
            title: reminder.title.clone(),
            body: reminder
                .note
                .clone()
                .unwrap_or_else(|| format!("Reminder for {}", reminder.title)),
            sound: config::DEFAULT_SOUND.to_string(),
        }
    }
}

/// External notification service collaborator.
///
/// `schedule` is best-effort: the caller logs a returned error and moves on.
/// `cancel` is idempotent and safe to call for identifiers that were never
/// scheduled.
pub trait NotificationService {
    fn schedule(&self, id: &str, content: &NotificationContent, rule: &TriggerRule) -> Result<()>;
    fn cancel(&self, id: &str);
}

/// Headless default: accepts every request and only logs it.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl NotificationService for LogNotifier {
    fn schedule(&self, id: &str, content: &NotificationContent, rule: &TriggerRule) -> Result<()> {
        debug!("schedule {id}: {:?} ({:?})", content.title, rule);
        Ok(())
    }

    fn cancel(&self, id: &str) {
        debug!("cancel {id}");
    }
}

#[derive(Default)]
struct MemoryNotifierInner {
    scheduled: HashMap<String, (NotificationContent, TriggerRule)>,
    cancels: Vec<String>,
    fail_next: Option<String>,
}

/// Recording fake for tests. Cloning shares state, so a handle kept by the
/// test observes calls made through the store under test.
#[derive(Clone, Default)]
pub struct MemoryNotifier {
    inner: Rc<RefCell<MemoryNotifierInner>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `schedule` call fail with the given message.
    pub fn fail_next(&self, msg: impl Into<String>) {
        self.inner.borrow_mut().fail_next = Some(msg.into());
    }

    pub fn is_scheduled(&self, id: &str) -> bool {
        self.inner.borrow().scheduled.contains_key(id)
    }

    pub fn scheduled_rule(&self, id: &str) -> Option<TriggerRule> {
        self.inner
            .borrow()
            .scheduled
            .get(id)
            .map(|(_, rule)| rule.clone())
    }

    pub fn scheduled_content(&self, id: &str) -> Option<NotificationContent> {
        self.inner
            .borrow()
            .scheduled
            .get(id)
            .map(|(content, _)| content.clone())
    }

    pub fn scheduled_count(&self) -> usize {
        self.inner.borrow().scheduled.len()
    }

    /// Number of times `cancel` was called for `id`.
    pub fn cancel_count(&self, id: &str) -> usize {
        self.inner
            .borrow()
            .cancels
            .iter()
            .filter(|c| c.as_str() == id)
            .count()
    }
}

impl NotificationService for MemoryNotifier {
    fn schedule(&self, id: &str, content: &NotificationContent, rule: &TriggerRule) -> Result<()> {
        let mut inner = self.inner.borrow_mut();
        if let Some(msg) = inner.fail_next.take() {
            return Err(Error::notify(msg));
        }
        inner
            .scheduled
            .insert(id.to_string(), (content.clone(), rule.clone()));
        Ok(())
    }

    fn cancel(&self, id: &str) {
        let mut inner = self.inner.borrow_mut();
        inner.scheduled.remove(id);
        inner.cancels.push(id.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_uses_note_as_body() {
        let mut reminder = Reminder::new("Pay rent", "2025-01-01 09:00:00");
        reminder.note = Some("transfer before noon".to_string());

        let content = NotificationContent::for_reminder(&reminder);
        assert_eq!(content.title, "Pay rent");
        assert_eq!(content.body, "transfer before noon");
        assert_eq!(content.sound, "default");
    }

    #[test]
    fn test_content_body_defaults_without_note() {
        let reminder = Reminder::new("Pay rent", "2025-01-01 09:00:00");
        let content = NotificationContent::for_reminder(&reminder);
        assert_eq!(content.body, "Reminder for Pay rent");
    }

    #[test]
    fn test_memory_notifier_records_and_cancels() {
        let notifier = MemoryNotifier::new();
        let reminder = Reminder::new("Pay rent", "2025-01-01 09:00:00");
        let content = NotificationContent::for_reminder(&reminder);
        let rule = TriggerRule::Daily { hour: 9, minute: 0 };

        notifier.schedule("abc", &content, &rule).unwrap();
        assert!(notifier.is_scheduled("abc"));
        assert_eq!(notifier.scheduled_rule("abc"), Some(rule));

        notifier.cancel("abc");
        notifier.cancel("abc"); // idempotent, unknown ids allowed
        assert!(!notifier.is_scheduled("abc"));
        assert_eq!(notifier.cancel_count("abc"), 2);
    }

    #[test]
    fn test_memory_notifier_injected_failure() {
        let notifier = MemoryNotifier::new();
        let reminder = Reminder::new("Pay rent", "2025-01-01 09:00:00");
        let content = NotificationContent::for_reminder(&reminder);
        let rule = TriggerRule::Daily { hour: 9, minute: 0 };

        notifier.fail_next("permission denied");
        assert!(notifier.schedule("abc", &content, &rule).is_err());
        // Failure is consumed; the next call succeeds.
        assert!(notifier.schedule("abc", &content, &rule).is_ok());
    }
}
