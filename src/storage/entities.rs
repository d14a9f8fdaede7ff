use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One finished focus interval. Created only when a session ends and never modified afterwards.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub id: String,
    #[serde(with = "iso_millis")]
    pub start_time: DateTime<Utc>,
    #[serde(with = "iso_millis")]
    pub end_time: DateTime<Utc>,
    /// Active seconds, paused time excluded.
    pub duration: u64,
    /// `false` when the session was skipped before the countdown ran out.
    pub is_completed: bool,
}

impl SessionRecord {
    pub fn csv_row(&self) -> String {
        format!(
            "{},{},{},{},{}",
            self.id,
            iso_millis::format(&self.start_time),
            iso_millis::format(&self.end_time),
            self.duration,
            self.is_completed
        )
    }
}

/// Timestamps are stored as `2018-07-04T09:00:00.000Z`, which is what the history has always
/// used.
mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{self, de::Error, Deserialize, Deserializer, Serializer};

    pub fn format(time: &DateTime<Utc>) -> String {
        time.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn serialize<S>(time: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format(time))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&s)
            .map(|v| v.with_timezone(&Utc))
            .map_err(D::Error::custom)
    }
}

/// Session ids are the start moment in unix milliseconds.
pub fn session_id(start_time: DateTime<Utc>) -> String {
    start_time.timestamp_millis().to_string()
}
