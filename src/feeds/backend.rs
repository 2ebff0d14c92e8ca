use super::{DashboardSource, DataOrigin, MentionsQuery};
use crate::error::{ApiError, ApiResult};
use crate::forms::{NewKeyword, NewMention};
use crate::model::{Keyword, Mention, Page, Platform, Sentiment, Stats, TrendPoint};
use crate::query::{SortField, SortOrder};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "http://localhost:8000/api";

/// Parameters of `/mentions/search`. Absent filters are left off the query.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchParams {
    pub q: Option<String>,
    pub sentiment: Option<Sentiment>,
    pub platform: Option<Platform>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub limit: u32,
    pub offset: u32,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            q: None,
            sentiment: None,
            platform: None,
            start_date: None,
            end_date: None,
            limit: 50,
            offset: 0,
            sort_by: SortField::CreatedAt,
            sort_order: SortOrder::Desc,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    success: bool,
}

pub struct BackendClient {
    base_url: String,
    client: reqwest::Client,
}

impl BackendClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("mentionwatch/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "failed to build HTTP client, using defaults without timeout");
                reqwest::Client::new()
            });

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str, params: &[(&str, String)]) -> String {
        let mut url = format!("{}{}", self.base_url, path);
        for (i, (key, value)) in params.iter().enumerate() {
            url.push(if i == 0 { '?' } else { '&' });
            url.push_str(key);
            url.push('=');
            url.push_str(&urlencoding::encode(value));
        }
        url
    }

    async fn send(
        &self,
        operation: &'static str,
        request: reqwest::RequestBuilder,
    ) -> ApiResult<reqwest::Response> {
        let response = request
            .send()
            .await
            .map_err(|source| ApiError::Transport { operation, source })?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(operation, %status, "backend returned an error status");
            return Err(ApiError::Status { operation, status });
        }
        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(
        operation: &'static str,
        response: reqwest::Response,
    ) -> ApiResult<T> {
        let body = response
            .text()
            .await
            .map_err(|source| ApiError::Transport { operation, source })?;
        serde_json::from_str(&body).map_err(|e| ApiError::Decode {
            operation,
            message: e.to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        path: &str,
        params: &[(&str, String)],
    ) -> ApiResult<T> {
        let request = self.client.get(self.url(path, params));
        let response = self.send(operation, request).await?;
        Self::decode(operation, response).await
    }

    /// Like `get_json` for list endpoints, but a row that does not decode is
    /// logged and dropped instead of failing the whole page.
    async fn get_page<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        path: &str,
        params: &[(&str, String)],
    ) -> ApiResult<Page<T>> {
        let raw: Page<serde_json::Value> = self.get_json(operation, path, params).await?;
        Ok(keep_decodable(operation, raw))
    }

    /// True when `/health` answers with a 2xx. Never errors.
    pub async fn health(&self) -> bool {
        match self.send("health", self.client.get(self.url("/health", &[]))).await {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!(error = %e, "health check failed");
                false
            }
        }
    }

    pub async fn fetch_stats(&self) -> ApiResult<Stats> {
        self.get_json("fetch stats", "/stats", &[]).await
    }

    pub async fn fetch_mentions(&self, query: &MentionsQuery) -> ApiResult<Page<Mention>> {
        let mut params = Vec::new();
        if let Some(sentiment) = query.sentiment {
            params.push(("sentiment", sentiment.to_string()));
        }
        params.push(("limit", query.limit.to_string()));
        params.push(("offset", query.offset.to_string()));
        self.get_page("fetch mentions", "/mentions", &params).await
    }

    pub async fn fetch_trends(&self) -> ApiResult<Vec<TrendPoint>> {
        self.get_json("fetch trends", "/trends", &[]).await
    }

    pub async fn fetch_keywords(&self, limit: u32, offset: u32) -> ApiResult<Page<Keyword>> {
        let params = [("limit", limit.to_string()), ("offset", offset.to_string())];
        self.get_page("fetch keywords", "/keywords", &params).await
    }

    pub async fn add_keyword(&self, keyword: &NewKeyword) -> ApiResult<Keyword> {
        keyword.validate()?;
        let request = self.client.post(self.url("/keywords", &[])).json(keyword);
        let response = self.send("add keyword", request).await?;
        Self::decode("add keyword", response).await
    }

    pub async fn delete_keyword(&self, keyword_id: i64) -> ApiResult<()> {
        let request = self
            .client
            .delete(self.url(&format!("/keywords/{}", keyword_id), &[]));
        self.send("delete keyword", request).await?;
        Ok(())
    }

    pub async fn add_mention(&self, mention: &NewMention) -> ApiResult<Mention> {
        mention.validate()?;
        let request = self.client.post(self.url("/mentions/add", &[])).json(mention);
        let response = self.send("add mention", request).await?;
        Self::decode("add mention", response).await
    }

    pub async fn search_mentions(&self, search: &SearchParams) -> ApiResult<Page<Mention>> {
        let mut params = Vec::new();
        if let Some(q) = search.q.as_deref().filter(|q| !q.is_empty()) {
            params.push(("q", q.to_string()));
        }
        if let Some(sentiment) = search.sentiment {
            params.push(("sentiment", sentiment.to_string()));
        }
        if let Some(platform) = search.platform {
            params.push(("platform", platform.to_string()));
        }
        if let Some(start) = &search.start_date {
            params.push(("startDate", start.clone()));
        }
        if let Some(end) = &search.end_date {
            params.push(("endDate", end.clone()));
        }
        params.push(("limit", search.limit.to_string()));
        params.push(("offset", search.offset.to_string()));
        params.push(("sortBy", search.sort_by.api_name().to_string()));
        params.push(("sortOrder", search.sort_order.as_str().to_string()));
        self.get_page("search mentions", "/mentions/search", &params)
            .await
    }

    pub async fn generate_mock(&self) -> ApiResult<bool> {
        let request = self.client.post(self.url("/generate-mock", &[]));
        let response = self.send("generate mock data", request).await?;
        let body: GenerateResponse = Self::decode("generate mock data", response).await?;
        Ok(body.success)
    }
}

/// Decodes each row on its own, skipping the ones with unknown labels or
/// malformed fields. Pagination is kept as the backend reported it.
pub fn keep_decodable<T: DeserializeOwned>(operation: &str, page: Page<serde_json::Value>) -> Page<T> {
    let data = page
        .data
        .into_iter()
        .filter_map(|row| match serde_json::from_value(row) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::warn!(operation, error = %e, "skipping undecodable row");
                None
            }
        })
        .collect();

    Page {
        data,
        pagination: page.pagination,
    }
}

#[async_trait]
impl DashboardSource for BackendClient {
    fn origin(&self) -> DataOrigin {
        DataOrigin::Live
    }

    async fn stats(&self) -> ApiResult<Stats> {
        self.fetch_stats().await
    }

    async fn mentions(&self, query: &MentionsQuery) -> ApiResult<Page<Mention>> {
        self.fetch_mentions(query).await
    }

    async fn trends(&self) -> ApiResult<Vec<TrendPoint>> {
        self.fetch_trends().await
    }

    async fn regenerate(&self) -> ApiResult<bool> {
        self.generate_mock().await
    }
}
