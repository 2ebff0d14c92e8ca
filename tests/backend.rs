use std::sync::Arc;
use std::time::Duration;

use mentionwatch::feeds::backend::{BackendClient, SearchParams};
use mentionwatch::feeds::{DashboardSource, DataOrigin, MentionsQuery};
use mentionwatch::forms::{NewKeyword, NewMention};
use mentionwatch::mock::DatasetStore;
use mentionwatch::model::{Platform, Sentiment};
use mentionwatch::query::{SortField, SortOrder};
use mentionwatch::{ApiError, Dashboard, MockSource, ValidationError};
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn client(server: &MockServer) -> BackendClient {
    BackendClient::new(&format!("{}/api", server.uri()), Duration::from_secs(5))
}

fn mention_json(id: i64, sentiment: &str) -> serde_json::Value {
    json!({
        "id": id,
        "text": "Just tried the new feature and it's amazing!",
        "platform": "Reddit",
        "url": format!("https://reddit.com/r/example/comments/{id}"),
        "sentiment": sentiment,
        "sentiment_score": 0.8,
        "created_at": "2024-06-01T12:00:00"
    })
}

#[tokio::test]
async fn test_fetch_mentions_sends_filters_and_window() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/mentions"))
        .and(query_param("sentiment", "negative"))
        .and(query_param("limit", "20"))
        .and(query_param("offset", "40"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [mention_json(41, "NEGATIVE")],
            "pagination": {"total": 41, "limit": 20, "offset": 40, "pages": 3}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let page = client(&server)
        .await
        .fetch_mentions(&MentionsQuery {
            sentiment: Some(Sentiment::Negative),
            limit: 20,
            offset: 40,
        })
        .await
        .unwrap();

    assert_eq!(page.data.len(), 1);
    assert_eq!(page.data[0].sentiment, Sentiment::Negative);
    assert_eq!(page.data[0].created_at_iso(), "2024-06-01T12:00:00.000Z");
    assert_eq!(page.pagination.pages, 3);
}

#[tokio::test]
async fn test_search_encodes_every_parameter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/mentions/search"))
        .and(query_param("q", "acme & co"))
        .and(query_param("platform", "News"))
        .and(query_param("startDate", "2024-06-01"))
        .and(query_param("limit", "50"))
        .and(query_param("offset", "0"))
        .and(query_param("sortBy", "sentiment_score"))
        .and(query_param("sortOrder", "asc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(1)
        .mount(&server)
        .await;

    let page = client(&server)
        .await
        .search_mentions(&SearchParams {
            q: Some("acme & co".to_string()),
            platform: Some(Platform::News),
            start_date: Some("2024-06-01".to_string()),
            sort_by: SortField::Score,
            sort_order: SortOrder::Asc,
            ..SearchParams::default()
        })
        .await
        .unwrap();

    assert!(page.data.is_empty());
    assert_eq!(page.pagination.total, 0);
}

#[tokio::test]
async fn test_error_status_is_reported_with_operation() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/stats"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;

    let err = client(&server).await.fetch_stats().await.unwrap_err();
    assert!(matches!(err, ApiError::Status { .. }));
    assert_eq!(err.operation(), "fetch stats");
    assert_eq!(err.status().map(|s| s.as_u16()), Some(500));
}

#[tokio::test]
async fn test_unparseable_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/trends"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let err = client(&server).await.fetch_trends().await.unwrap_err();
    assert!(matches!(err, ApiError::Decode { operation: "fetch trends", .. }));
}

#[tokio::test]
async fn test_add_keyword_posts_default_platform() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/keywords"))
        .and(body_json(json!({
            "keyword": "acme",
            "platform": "all",
            "sentiment": "negative"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 7,
            "keyword": "acme",
            "platform": "all",
            "sentiment": "negative",
            "is_active": true,
            "created_at": "2024-06-01T12:00:00Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let form = NewKeyword::new("  acme ", Sentiment::Negative).unwrap();
    let keyword = client(&server).await.add_keyword(&form).await.unwrap();
    assert_eq!(keyword.id, 7);
    assert!(keyword.is_active);
}

#[tokio::test]
async fn test_invalid_submissions_never_reach_the_network() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let client = client(&server).await;

    let keyword = NewKeyword {
        keyword: "   ".to_string(),
        platform: "all".to_string(),
        sentiment: Sentiment::Positive,
    };
    let err = client.add_keyword(&keyword).await.unwrap_err();
    assert!(matches!(err, ApiError::Validation(ValidationError::EmptyKeyword)));

    let mention = NewMention {
        text: "Great support team".to_string(),
        platform: Platform::Reddit,
        sentiment: Sentiment::Positive,
        score: Some(1.5),
        url: None,
    };
    let err = client.add_mention(&mention).await.unwrap_err();
    assert!(matches!(
        err,
        ApiError::Validation(ValidationError::ScoreOutOfRange(_))
    ));
}

#[tokio::test]
async fn test_delete_keyword_uses_id_in_path() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/keywords/12"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/keywords/99"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = client(&server).await;
    client.delete_keyword(12).await.unwrap();
    let err = client.delete_keyword(99).await.unwrap_err();
    assert_eq!(err.status().map(|s| s.as_u16()), Some(404));
}

#[tokio::test]
async fn test_generate_mock_reports_success_flag() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate-mock"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .mount(&server)
        .await;

    assert!(client(&server).await.generate_mock().await.unwrap());
}

#[tokio::test]
async fn test_health_is_false_on_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    assert!(!client(&server).await.health().await);
}

#[tokio::test]
async fn test_load_retries_once_then_falls_back_to_demo() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/stats"))
        .respond_with(ResponseTemplate::new(502))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/trends"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/mentions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .mount(&server)
        .await;

    let backend: Arc<dyn DashboardSource> = Arc::new(client(&server).await);
    let fallback: Arc<dyn DashboardSource> =
        Arc::new(MockSource::new(DatasetStore::new(Some(11))));
    let state = Dashboard::new(backend)
        .with_fallback(fallback)
        .load()
        .await
        .unwrap();

    assert_eq!(state.origin, DataOrigin::Demo);
    assert_eq!(state.stats.total_mentions, 50);
    assert_eq!(state.trends.len(), 7);
}

#[tokio::test]
async fn test_unknown_platform_keeps_dashboard_live() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total_mentions": 2,
            "positive_count": 1,
            "negative_count": 1,
            "neutral_count": 0,
            "positive_percentage": 50.0,
            "negative_percentage": 50.0,
            "neutral_percentage": 0.0,
            "recent_alerts": []
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/trends"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    let mut unknown = mention_json(1, "positive");
    unknown["platform"] = json!("hackernews");
    Mock::given(method("GET"))
        .and(path("/api/mentions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [unknown, mention_json(2, "negative")],
            "pagination": {"total": 2, "limit": 20, "offset": 0, "pages": 1}
        })))
        .mount(&server)
        .await;

    let backend: Arc<dyn DashboardSource> = Arc::new(client(&server).await);
    let fallback: Arc<dyn DashboardSource> =
        Arc::new(MockSource::new(DatasetStore::new(Some(11))));
    let state = Dashboard::new(backend)
        .with_fallback(fallback)
        .load()
        .await
        .unwrap();

    assert_eq!(state.origin, DataOrigin::Live);
    assert_eq!(state.mentions.data.len(), 1);
    assert_eq!(state.mentions.data[0].id, 2);
    assert_eq!(state.stats.total_mentions, 2);
}

#[tokio::test]
async fn test_configured_timeout_is_applied() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/stats"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let client = BackendClient::new(&format!("{}/api", server.uri()), Duration::from_millis(100));
    let err = client.fetch_stats().await.unwrap_err();
    assert!(matches!(err, ApiError::Transport { operation: "fetch stats", .. }));
}
