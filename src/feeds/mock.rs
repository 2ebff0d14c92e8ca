use super::{DashboardSource, DataOrigin, MentionsQuery};
use crate::error::ApiResult;
use crate::mock::{Dataset, DatasetStore};
use crate::model::{Mention, Page, Pagination, Stats, TrendPoint};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Serves the dashboard from a [`DatasetStore`] instead of the network.
///
/// Answers the same questions the backend does: mentions newest first with
/// the optional sentiment filter and limit/offset window, stats aggregated
/// from the current snapshot.
#[derive(Clone)]
pub struct MockSource {
    store: Arc<Mutex<DatasetStore>>,
}

impl MockSource {
    pub fn new(store: DatasetStore) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
        }
    }

    pub async fn snapshot(&self) -> Dataset {
        self.store.lock().await.current().clone()
    }
}

#[async_trait]
impl DashboardSource for MockSource {
    fn origin(&self) -> DataOrigin {
        DataOrigin::Demo
    }

    async fn stats(&self) -> ApiResult<Stats> {
        let store = self.store.lock().await;
        let snapshot = store.current();
        Ok(Stats::from_parts(&snapshot.mentions, &snapshot.alerts))
    }

    async fn mentions(&self, query: &MentionsQuery) -> ApiResult<Page<Mention>> {
        let store = self.store.lock().await;
        let mut matching: Vec<&Mention> = store
            .current()
            .mentions
            .iter()
            .filter(|m| query.sentiment.map_or(true, |s| m.sentiment == s))
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matching.len() as u64;
        let data = matching
            .into_iter()
            .skip(query.offset as usize)
            .take(query.limit as usize)
            .cloned()
            .collect();

        Ok(Page {
            data,
            pagination: Pagination::new(total, query.limit as u64, query.offset as u64),
        })
    }

    async fn trends(&self) -> ApiResult<Vec<TrendPoint>> {
        Ok(self.store.lock().await.current().trends.clone())
    }

    async fn regenerate(&self) -> ApiResult<bool> {
        self.store.lock().await.regenerate();
        Ok(true)
    }
}
