use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// Raised when a label coming off the wire is not one of the known variants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub const ALL: [Sentiment; 3] = [Sentiment::Positive, Sentiment::Negative, Sentiment::Neutral];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sentiment {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "positive" => Ok(Sentiment::Positive),
            "negative" => Ok(Sentiment::Negative),
            "neutral" => Ok(Sentiment::Neutral),
            _ => Err(UnknownVariant {
                kind: "sentiment",
                value: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for Sentiment {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(try_from = "String")]
pub enum Platform {
    Reddit,
    News,
}

impl Platform {
    pub const ALL: [Platform; 2] = [Platform::Reddit, Platform::News];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Reddit => "Reddit",
            Platform::News => "News",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reddit" => Ok(Platform::Reddit),
            "news" => Ok(Platform::News),
            _ => Err(UnknownVariant {
                kind: "platform",
                value: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for Platform {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Wire format for timestamps.
///
/// Accepts RFC 3339 as well as the naive ISO date-times the backend emits
/// (taken as UTC). Always writes `YYYY-MM-DDTHH:MM:SS.mmmZ`.
pub mod timestamp {
    use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn format(ts: &DateTime<Utc>) -> String {
        ts.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        let raw = raw.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
            .ok()
            .map(|naive| naive.and_utc())
    }

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{raw}'")))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MentionRecord")]
pub struct Mention {
    pub id: i64,
    pub text: String,
    pub platform: Platform,
    pub url: String,
    pub sentiment: Sentiment,
    #[serde(default)]
    pub sentiment_score: Option<f64>,
    #[serde(serialize_with = "timestamp::serialize")]
    pub created_at: DateTime<Utc>,
    /// `created_at` exactly as the backend sent it. `None` for locally
    /// generated mentions.
    #[serde(skip_serializing)]
    pub created_at_raw: Option<String>,
}

impl Mention {
    /// Score used for display, sorting and export. Missing scores count as 0.
    pub fn score(&self) -> f64 {
        self.sentiment_score.unwrap_or(0.0)
    }

    pub fn created_at_iso(&self) -> String {
        timestamp::format(&self.created_at)
    }

    /// The timestamp as received, without timezone normalization. Falls
    /// back to the rendered UTC form when there is no wire value.
    pub fn created_at_literal(&self) -> Cow<'_, str> {
        match &self.created_at_raw {
            Some(raw) => Cow::Borrowed(raw.as_str()),
            None => Cow::Owned(self.created_at_iso()),
        }
    }
}

#[derive(Deserialize)]
struct MentionRecord {
    id: i64,
    text: String,
    platform: Platform,
    url: String,
    sentiment: Sentiment,
    #[serde(default)]
    sentiment_score: Option<f64>,
    created_at: String,
}

impl TryFrom<MentionRecord> for Mention {
    type Error = String;

    fn try_from(record: MentionRecord) -> Result<Self, Self::Error> {
        let created_at = timestamp::parse(&record.created_at)
            .ok_or_else(|| format!("invalid timestamp '{}'", record.created_at))?;
        Ok(Self {
            id: record.id,
            text: record.text,
            platform: record.platform,
            url: record.url,
            sentiment: record.sentiment,
            sentiment_score: record.sentiment_score,
            created_at,
            created_at_raw: Some(record.created_at),
        })
    }
}

/// One day of mention volume. `positive + negative + neutral == count`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub count: u32,
    pub positive: u32,
    pub negative: u32,
    pub neutral: u32,
}

impl TrendPoint {
    pub fn is_balanced(&self) -> bool {
        self.positive + self.negative + self.neutral == self.count
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub id: i64,
    pub message: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyword {
    pub id: i64,
    pub keyword: String,
    pub platform: String,
    pub sentiment: Sentiment,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Stats {
    pub total_mentions: u64,
    pub positive_count: u64,
    pub negative_count: u64,
    pub neutral_count: u64,
    pub positive_percentage: f64,
    pub negative_percentage: f64,
    pub neutral_percentage: f64,
    #[serde(default)]
    pub recent_alerts: Vec<Alert>,
}

impl Stats {
    /// Aggregates sentiment counts the way `/api/stats` reports them:
    /// whole-number percentages, newest five alerts.
    pub fn from_parts(mentions: &[Mention], alerts: &[Alert]) -> Self {
        let count = |s: Sentiment| mentions.iter().filter(|m| m.sentiment == s).count() as u64;
        let total = mentions.len() as u64;
        let positive = count(Sentiment::Positive);
        let negative = count(Sentiment::Negative);
        let neutral = count(Sentiment::Neutral);

        let mut recent_alerts = alerts.to_vec();
        recent_alerts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        recent_alerts.truncate(5);

        Self {
            total_mentions: total,
            positive_count: positive,
            negative_count: negative,
            neutral_count: neutral,
            positive_percentage: percentage(positive, total),
            negative_percentage: percentage(negative, total),
            neutral_percentage: percentage(neutral, total),
            recent_alerts,
        }
    }
}

fn percentage(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        (part as f64 / total as f64 * 100.0).round()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Pagination {
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
    pub pages: u64,
}

impl Pagination {
    pub fn new(total: u64, limit: u64, offset: u64) -> Self {
        let pages = if limit == 0 { 0 } else { total.div_ceil(limit) };
        Self {
            total,
            limit,
            offset,
            pages,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub pagination: Pagination,
}
