use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Shown in place of a timestamp the server sent but we could not read.
pub const INVALID_DATE: &str = "Invalid Date";

/// A saved journal entry as the server returns it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct JournalEntry {
    #[serde(default)]
    pub id: Option<i64>,
    pub text: String,
    /// `None` when the server's value is missing or unreadable; the entry
    /// is still shown.
    #[serde(default, deserialize_with = "deserialize_created_date")]
    pub created_date: Option<DateTime<Utc>>,
}

impl JournalEntry {
    pub fn local_date(&self) -> String {
        match self.created_date {
            Some(date) => date
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
            None => INVALID_DATE.to_string(),
        }
    }
}

/// Body of a create request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewEntry {
    pub text: String,
}

impl NewEntry {
    pub fn new(text: impl Into<String>) -> Self {
        NewEntry { text: text.into() }
    }
}

/// What the server answers after storing an entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Reply {
    pub llm_response: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// Accepts RFC 3339, the offset-less ISO form the server writes for its
/// UTC column, and bare ISO dates (midnight).
// Offset-less values are read as UTC because the server stores UTC.
pub fn parse_created_date(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date.and_time(chrono::NaiveTime::MIN).and_utc());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .map(|naive| naive.and_utc())
}

fn deserialize_created_date<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = serde_json::Value::deserialize(deserializer)?;
    let Some(text) = raw.as_str() else {
        if !raw.is_null() {
            tracing::warn!(value = %raw, "created_date is not a string");
        }
        return Ok(None);
    };
    match parse_created_date(text) {
        Ok(date) => Ok(Some(date)),
        Err(err) => {
            tracing::warn!(value = text, error = %err, "unreadable created_date");
            Ok(None)
        }
    }
}
