use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A team iteration (sprint).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Iteration {
    pub name: String,
    #[serde(default, with = "provider_date")]
    pub start: Option<DateTime<Utc>>,
    #[serde(default, with = "provider_date")]
    pub end: Option<DateTime<Utc>>,
}

/// A saved query the user can run instead of a team/sprint selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryItem {
    pub uuid: String,
    /// Folder path and title, e.g. `Shared Queries/Open Bugs`.
    pub path: String,
    #[serde(default)]
    pub wiql: Option<String>,
}

/// Iteration dates travel as `2021-02-26T00:00:00.000+0000`; RFC 3339 is accepted too.
pub(crate) mod provider_date {
    use chrono::{DateTime, FixedOffset, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%z";

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(date) => serializer.serialize_str(&date.format(FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let Some(raw) = Option::<String>::deserialize(deserializer)? else {
            return Ok(None);
        };
        parse(&raw)
            .map(Some)
            .map_err(|e| serde::de::Error::custom(format!("invalid date '{}': {}", raw, e)))
    }

    pub fn parse(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
        DateTime::<FixedOffset>::parse_from_str(raw, FORMAT)
            .or_else(|_| DateTime::parse_from_rfc3339(raw))
            .map(|dt| dt.with_timezone(&Utc))
    }
}
