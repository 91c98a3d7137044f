/// Application configuration constants
///
/// Centralized configuration for the reminders engine.

/// Storage format for due dates: local wall-clock time, no timezone offset
pub const DUE_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Blob key for the ordered reminder collection
pub const REMINDERS_KEY: &str = "Reminders";

/// Blob key for the completed-reminder id set
pub const COMPLETED_KEY: &str = "CompletedReminders";

/// Subdirectory of the platform data dir used by the default file store
pub const APP_DIR_NAME: &str = "Remindly";

/// Category assigned to reminders created without one
pub const DEFAULT_CATEGORY: &str = "General";

/// Category labels offered by the UI (the model accepts any string)
pub const CATEGORIES: [&str; 6] = [
    "General",
    "Work",
    "Personal",
    "Health",
    "Shopping",
    "Finance",
];

/// Sound name attached to scheduled notification content
pub const DEFAULT_SOUND: &str = "default";
