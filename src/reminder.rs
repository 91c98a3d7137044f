use crate::config;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Repetition pattern applied to a reminder's notification trigger.
///
/// Serialized as its bare label ("Daily", "Weekly", ...), the form the UI
/// exchanges and the persisted blobs carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recurrence {
    Daily,
    Weekdays,
    Weekends,
    Weekly,
    Monthly,
}

impl Recurrence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Recurrence::Daily => "Daily",
            Recurrence::Weekdays => "Weekdays",
            Recurrence::Weekends => "Weekends",
            Recurrence::Weekly => "Weekly",
            Recurrence::Monthly => "Monthly",
        }
    }
}

impl fmt::Display for Recurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Recurrence {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Daily" => Ok(Recurrence::Daily),
            "Weekdays" => Ok(Recurrence::Weekdays),
            "Weekends" => Ok(Recurrence::Weekends),
            "Weekly" => Ok(Recurrence::Weekly),
            "Monthly" => Ok(Recurrence::Monthly),
            _ => Err(()),
        }
    }
}

fn default_category() -> String {
    config::DEFAULT_CATEGORY.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: Uuid,
    pub title: String,
    /// Due date-time in `config::DUE_DATE_FORMAT`, local wall clock.
    /// Malformed values are kept as-is and treated as "no trigger computable".
    pub due_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "image_blob")]
    pub image_data: Option<Vec<u8>>,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<Recurrence>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Reminder {
    pub fn new(title: impl Into<String>, due_at: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            due_at: due_at.into(),
            image_data: None,
            category: default_category(),
            recurrence: None,
            note: None,
        }
    }

    /// Parse `due_at`; `None` when the string is malformed.
    pub fn due_date_time(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.due_at, config::DUE_DATE_FORMAT).ok()
    }

    pub fn is_due(&self, now: NaiveDateTime) -> bool {
        match self.due_date_time() {
            Some(due) => due <= now,
            None => false,
        }
    }
}

/// Optional image blobs are stored as base64 strings inside the JSON blob.
mod image_blob {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        data: &Option<Vec<u8>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match data {
            Some(bytes) => serializer.serialize_str(&STANDARD.encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Vec<u8>>, D::Error> {
        let encoded: Option<String> = Option::deserialize(deserializer)?;
        match encoded {
            Some(s) => STANDARD
                .decode(s.as_bytes())
                .map(Some)
                .map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}
