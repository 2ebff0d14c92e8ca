use crate::error::ApiError;
use crate::feeds::{DashboardSource, DataOrigin, FeedData, FeedMessage, MentionsQuery};
use crate::model::{Mention, Page, Stats, TrendPoint};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(30);
pub const INITIAL_MENTIONS_LIMIT: u32 = 20;

#[derive(Debug, Clone)]
pub struct DashboardState {
    pub origin: DataOrigin,
    pub stats: Stats,
    pub mentions: Page<Mention>,
    pub trends: Vec<TrendPoint>,
}

impl DashboardState {
    /// Folds a refresh update into the state.
    pub fn apply(&mut self, message: FeedMessage) {
        match message.data {
            FeedData::Stats(stats) => self.stats = stats,
            FeedData::Mentions(page) => self.mentions = page,
            FeedData::Trends(trends) => self.trends = trends,
            FeedData::Loading | FeedData::Error(_) => {}
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Failed to load data. Please try again.")]
    Failed(#[source] ApiError),
}

/// Loads the dashboard from a primary source, with an optional fallback used
/// once the primary has failed twice.
pub struct Dashboard {
    primary: Arc<dyn DashboardSource>,
    fallback: Option<Arc<dyn DashboardSource>>,
}

impl Dashboard {
    pub fn new(primary: Arc<dyn DashboardSource>) -> Self {
        Self {
            primary,
            fallback: None,
        }
    }

    pub fn with_fallback(mut self, fallback: Arc<dyn DashboardSource>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// The source that served the most recent successful load should also
    /// serve refreshes; callers pick it from `DashboardState::origin`.
    pub fn source_for(&self, origin: DataOrigin) -> Arc<dyn DashboardSource> {
        match (&self.fallback, origin) {
            (Some(fallback), DataOrigin::Demo) if self.primary.origin() != DataOrigin::Demo => {
                Arc::clone(fallback)
            }
            _ => Arc::clone(&self.primary),
        }
    }

    pub async fn load(&self) -> Result<DashboardState, LoadError> {
        let first_error = match fetch_all(self.primary.as_ref()).await {
            Ok(state) => return Ok(state),
            Err(e) => e,
        };
        tracing::error!(error = %first_error, "failed to load dashboard data, retrying once");

        let retry_error = match fetch_all(self.primary.as_ref()).await {
            Ok(state) => return Ok(state),
            Err(e) => e,
        };
        tracing::error!(error = %retry_error, "retry failed");

        match &self.fallback {
            Some(fallback) => {
                tracing::warn!("backend unreachable, using sample data");
                fetch_all(fallback.as_ref()).await.map_err(LoadError::Failed)
            }
            None => Err(LoadError::Failed(retry_error)),
        }
    }

    /// One mentions page from the primary source, or from the fallback when
    /// the primary fails. No retry.
    pub async fn mentions(
        &self,
        query: &MentionsQuery,
    ) -> Result<(DataOrigin, Page<Mention>), ApiError> {
        match self.primary.mentions(query).await {
            Ok(page) => Ok((self.primary.origin(), page)),
            Err(e) => match &self.fallback {
                Some(fallback) => {
                    tracing::warn!(error = %e, "backend unreachable, using sample data");
                    let page = fallback.mentions(query).await?;
                    Ok((fallback.origin(), page))
                }
                None => Err(e),
            },
        }
    }
}

/// Issues the three initial requests together. Succeeds only if all three do.
pub async fn fetch_all(source: &dyn DashboardSource) -> Result<DashboardState, ApiError> {
    let query = MentionsQuery {
        sentiment: None,
        limit: INITIAL_MENTIONS_LIMIT,
        offset: 0,
    };
    let (stats, mentions, trends) =
        futures::try_join!(source.stats(), source.mentions(&query), source.trends())?;

    Ok(DashboardState {
        origin: source.origin(),
        stats,
        mentions,
        trends,
    })
}

/// Re-fetches stats every `period` and publishes them on `tx`.
///
/// The first fetch happens one full period after the call. Failures are
/// logged and skipped. The task ends once the receiver is gone.
pub fn spawn_refresh(
    source: Arc<dyn DashboardSource>,
    period: Duration,
    tx: mpsc::Sender<FeedMessage>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if tx.is_closed() {
                break;
            }

            match source.stats().await {
                Ok(stats) => {
                    let message = FeedMessage {
                        origin: source.origin(),
                        data: FeedData::Stats(stats),
                    };
                    if tx.send(message).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "auto-refresh failed");
                }
            }
        }
        tracing::debug!("refresh task stopped");
    })
}
