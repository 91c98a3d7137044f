use crate::notify::{NotificationContent, NotificationService};
use crate::reminder::{Recurrence, Reminder};
use chrono::{Datelike, Local, NaiveDateTime, Timelike, Weekday};
use log::warn;
use uuid::Uuid;

/// Calendar-component trigger handed to the notification service.
///
/// `Once` fires at the exact instant (seconds dropped) and does not repeat;
/// the other variants repeat whenever the listed components match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerRule {
    Once {
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
    },
    Daily {
        hour: u32,
        minute: u32,
    },
    Weekly {
        weekday: Weekday,
        hour: u32,
        minute: u32,
    },
    Monthly {
        day: u32,
        hour: u32,
        minute: u32,
    },
}

/// Outcome of trigger computation for one reminder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleDecision {
    /// Remove any stale trigger and register nothing.
    CancelOnly,
    /// Remove any stale trigger, then register this rule.
    Schedule(TriggerRule),
}

fn is_weekday(weekday: Weekday) -> bool {
    matches!(
        weekday,
        Weekday::Mon | Weekday::Tue | Weekday::Wed | Weekday::Thu | Weekday::Fri
    )
}

/// Compute the scheduling decision for a reminder.
///
/// Never schedules when the reminder is completed, its due string is
/// malformed, or the parsed anchor is not strictly in the future. The
/// recurrence pattern keeps only the anchor's own components: `Weekdays` and
/// `Weekends` therefore fire on the single weekday of the anchor, and an
/// anchor outside the class yields no rule at all.
pub fn compute_trigger(
    reminder: &Reminder,
    completed: bool,
    now: NaiveDateTime,
) -> ScheduleDecision {
    if completed {
        return ScheduleDecision::CancelOnly;
    }

    let due = match reminder.due_date_time() {
        Some(due) => due,
        None => return ScheduleDecision::CancelOnly,
    };

    if due <= now {
        return ScheduleDecision::CancelOnly;
    }

    let (hour, minute) = (due.hour(), due.minute());
    let rule = match reminder.recurrence {
        None => Some(TriggerRule::Once {
            year: due.year(),
            month: due.month(),
            day: due.day(),
            hour,
            minute,
        }),
        Some(Recurrence::Daily) => Some(TriggerRule::Daily { hour, minute }),
        Some(Recurrence::Weekdays) => is_weekday(due.weekday()).then(|| TriggerRule::Weekly {
            weekday: due.weekday(),
            hour,
            minute,
        }),
        Some(Recurrence::Weekends) => (!is_weekday(due.weekday())).then(|| TriggerRule::Weekly {
            weekday: due.weekday(),
            hour,
            minute,
        }),
        Some(Recurrence::Weekly) => Some(TriggerRule::Weekly {
            weekday: due.weekday(),
            hour,
            minute,
        }),
        Some(Recurrence::Monthly) => Some(TriggerRule::Monthly {
            day: due.day(),
            hour,
            minute,
        }),
    };

    match rule {
        Some(rule) => ScheduleDecision::Schedule(rule),
        None => ScheduleDecision::CancelOnly,
    }
}

/// Applies scheduling decisions against the injected notification service.
pub struct Scheduler {
    service: Box<dyn NotificationService>,
}

impl Scheduler {
    pub fn new(service: Box<dyn NotificationService>) -> Self {
        Self { service }
    }

    /// Recompute and apply the trigger for one reminder.
    pub fn sync(&self, reminder: &Reminder, completed: bool) {
        self.sync_at(reminder, completed, Local::now().naive_local());
    }

    pub(crate) fn sync_at(&self, reminder: &Reminder, completed: bool, now: NaiveDateTime) {
        let decision = compute_trigger(reminder, completed, now);
        let id = reminder.id.to_string();

        // Stale triggers are removed even when nothing new gets scheduled.
        self.service.cancel(&id);

        if let ScheduleDecision::Schedule(rule) = decision {
            let content = NotificationContent::for_reminder(reminder);
            if let Err(e) = self.service.schedule(&id, &content, &rule) {
                warn!("failed to schedule notification for {id}: {e}");
            }
        }
    }

    pub fn cancel(&self, id: Uuid) {
        self.service.cancel(&id.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::MemoryNotifier;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn reminder(due_at: &str, recurrence: Option<Recurrence>) -> Reminder {
        let mut r = Reminder::new("Pay rent", due_at);
        r.recurrence = recurrence;
        r
    }

    #[test]
    fn test_one_shot_future_schedules_exact_instant() {
        let r = reminder("2025-01-01 09:00:00", None);
        let decision = compute_trigger(&r, false, at(2024, 12, 31, 9, 0));
        assert_eq!(
            decision,
            ScheduleDecision::Schedule(TriggerRule::Once {
                year: 2025,
                month: 1,
                day: 1,
                hour: 9,
                minute: 0,
            })
        );
    }

    #[test]
    fn test_past_due_cancels() {
        let r = reminder("2025-01-01 09:00:00", None);
        let decision = compute_trigger(&r, false, at(2025, 1, 2, 9, 0));
        assert_eq!(decision, ScheduleDecision::CancelOnly);
    }

    #[test]
    fn test_due_equal_to_now_cancels() {
        let r = reminder("2025-01-01 09:00:00", None);
        let decision = compute_trigger(&r, false, at(2025, 1, 1, 9, 0));
        assert_eq!(decision, ScheduleDecision::CancelOnly);
    }

    #[test]
    fn test_completed_cancels_even_when_future() {
        let r = reminder("2025-01-01 09:00:00", None);
        let decision = compute_trigger(&r, true, at(2024, 12, 31, 9, 0));
        assert_eq!(decision, ScheduleDecision::CancelOnly);
    }

    #[test]
    fn test_malformed_due_cancels() {
        let r = reminder("soonish", None);
        let decision = compute_trigger(&r, false, at(2024, 12, 31, 9, 0));
        assert_eq!(decision, ScheduleDecision::CancelOnly);
    }

    #[test]
    fn test_daily_keeps_time_of_day_only() {
        // Anchor date is irrelevant for the repeating rule.
        let r = reminder("2025-07-15 08:30:00", Some(Recurrence::Daily));
        let decision = compute_trigger(&r, false, at(2025, 1, 1, 0, 0));
        assert_eq!(
            decision,
            ScheduleDecision::Schedule(TriggerRule::Daily { hour: 8, minute: 30 })
        );
    }

    #[test]
    fn test_weekly_matches_anchor_weekday() {
        // 2025-01-01 is a Wednesday.
        let r = reminder("2025-01-01 09:00:00", Some(Recurrence::Weekly));
        let decision = compute_trigger(&r, false, at(2024, 12, 31, 9, 0));
        assert_eq!(
            decision,
            ScheduleDecision::Schedule(TriggerRule::Weekly {
                weekday: Weekday::Wed,
                hour: 9,
                minute: 0,
            })
        );
    }

    #[test]
    fn test_monthly_matches_anchor_day() {
        let r = reminder("2025-01-15 18:45:00", Some(Recurrence::Monthly));
        let decision = compute_trigger(&r, false, at(2025, 1, 1, 0, 0));
        assert_eq!(
            decision,
            ScheduleDecision::Schedule(TriggerRule::Monthly {
                day: 15,
                hour: 18,
                minute: 45,
            })
        );
    }

    #[test]
    fn test_weekdays_narrows_to_anchor_weekday() {
        // 2025-01-06 is a Monday: the rule fires Mondays only, not Mon-Fri.
        let r = reminder("2025-01-06 07:00:00", Some(Recurrence::Weekdays));
        let decision = compute_trigger(&r, false, at(2025, 1, 1, 0, 0));
        assert_eq!(
            decision,
            ScheduleDecision::Schedule(TriggerRule::Weekly {
                weekday: Weekday::Mon,
                hour: 7,
                minute: 0,
            })
        );
    }

    #[test]
    fn test_weekdays_anchor_on_weekend_yields_nothing() {
        // 2025-01-04 is a Saturday: no rule even though the anchor is future.
        let r = reminder("2025-01-04 07:00:00", Some(Recurrence::Weekdays));
        let decision = compute_trigger(&r, false, at(2025, 1, 1, 0, 0));
        assert_eq!(decision, ScheduleDecision::CancelOnly);
    }

    #[test]
    fn test_weekends_anchor_on_weekday_yields_nothing() {
        // 2025-01-01 is a Wednesday.
        let r = reminder("2025-01-01 10:00:00", Some(Recurrence::Weekends));
        let decision = compute_trigger(&r, false, at(2024, 12, 31, 0, 0));
        assert_eq!(decision, ScheduleDecision::CancelOnly);
    }

    #[test]
    fn test_weekends_anchor_on_sunday() {
        // 2025-01-05 is a Sunday.
        let r = reminder("2025-01-05 10:00:00", Some(Recurrence::Weekends));
        let decision = compute_trigger(&r, false, at(2025, 1, 1, 0, 0));
        assert_eq!(
            decision,
            ScheduleDecision::Schedule(TriggerRule::Weekly {
                weekday: Weekday::Sun,
                hour: 10,
                minute: 0,
            })
        );
    }

    #[test]
    fn test_sync_cancels_before_scheduling() {
        let notifier = MemoryNotifier::new();
        let scheduler = Scheduler::new(Box::new(notifier.clone()));
        let r = reminder("2025-01-01 09:00:00", None);
        let id = r.id.to_string();

        scheduler.sync_at(&r, false, at(2024, 12, 31, 9, 0));
        assert!(notifier.is_scheduled(&id));
        assert_eq!(notifier.cancel_count(&id), 1);

        // Completing removes the trigger and schedules nothing new.
        scheduler.sync_at(&r, true, at(2024, 12, 31, 9, 0));
        assert!(!notifier.is_scheduled(&id));
        assert_eq!(notifier.cancel_count(&id), 2);
    }

    #[test]
    fn test_sync_swallows_service_failure() {
        let notifier = MemoryNotifier::new();
        let scheduler = Scheduler::new(Box::new(notifier.clone()));
        let r = reminder("2025-01-01 09:00:00", None);

        notifier.fail_next("permission denied");
        scheduler.sync_at(&r, false, at(2024, 12, 31, 9, 0));
        assert!(!notifier.is_scheduled(&r.id.to_string()));
    }
}
