pub mod backend;
pub mod mock;

use crate::error::ApiResult;
use crate::model::{Mention, Page, Sentiment, Stats, TrendPoint};
use async_trait::async_trait;
use std::fmt;

/// Where a piece of dashboard data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataOrigin {
    Live,
    /// Generated sample data, shown when the backend is unreachable.
    Demo,
}

impl fmt::Display for DataOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataOrigin::Live => f.write_str("live"),
            DataOrigin::Demo => f.write_str("demo"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FeedMessage {
    pub origin: DataOrigin,
    pub data: FeedData,
}

#[derive(Debug, Clone)]
pub enum FeedData {
    Stats(Stats),
    Mentions(Page<Mention>),
    Trends(Vec<TrendPoint>),
    Loading,
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MentionsQuery {
    pub sentiment: Option<Sentiment>,
    pub limit: u32,
    pub offset: u32,
}

impl Default for MentionsQuery {
    fn default() -> Self {
        Self {
            sentiment: None,
            limit: 20,
            offset: 0,
        }
    }
}

/// Read side of the dashboard. Implemented by the HTTP client and by the
/// in-process mock source so the loader does not care which one it talks to.
#[async_trait]
pub trait DashboardSource: Send + Sync {
    fn origin(&self) -> DataOrigin;

    async fn stats(&self) -> ApiResult<Stats>;

    async fn mentions(&self, query: &MentionsQuery) -> ApiResult<Page<Mention>>;

    async fn trends(&self) -> ApiResult<Vec<TrendPoint>>;

    /// Asks the source to replace its sample data. Returns whether it did.
    async fn regenerate(&self) -> ApiResult<bool>;
}
