//! End-to-end client tests against a stubbed GraphQL endpoint.

use std::time::Duration;

use anyhow::Result;
use leetlens_client::{Error, LeetClient, ProblemFilters, Query, RateLimitConfig, category};
use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

const TOKEN: &str = "test-session";

/// Limits small enough for real-time tests.
fn fast_limits() -> RateLimitConfig {
    RateLimitConfig::new()
        .with_max_requests(10)
        .with_window(Duration::from_secs(30))
        .with_min_spacing(Duration::from_millis(5))
}

fn client_for(server: &MockServer) -> LeetClient {
    LeetClient::builder()
        .base_url(server.uri())
        .session_token(TOKEN)
        .user_agent("leetlens-test")
        .timeout(Duration::from_secs(5))
        .rate_limit(fast_limits())
        .build()
        .unwrap()
}

fn graphql_ok(body: Value) -> Mock {
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
}

fn no_cookie(req: &Request) -> bool {
    !req.headers.contains_key("cookie")
}

#[tokio::test]
async fn test_fetch_miss_writes_through_to_cache() -> Result<()> {
    let server = MockServer::start().await;
    graphql_ok(json!({"data": {"x": 1}}))
        .expect(1)
        .mount(&server)
        .await;
    let client = client_for(&server);

    let result = client
        .fetch(&Query::new("custom", "{ x }"), "k1", category::PROFILE)
        .await?;

    assert_eq!(result.data, json!({"x": 1}));
    assert!(!result.cached);
    assert!(!result.has_errors());
    assert_eq!(client.cache().get("k1"), Some(json!({"x": 1})));
    assert_eq!(client.sessions().open_sessions(), 0);
    Ok(())
}

#[tokio::test]
async fn test_repeated_fetch_is_served_from_cache() -> Result<()> {
    let server = MockServer::start().await;
    graphql_ok(json!({"data": {"x": 1}}))
        .expect(1)
        .mount(&server)
        .await;
    let client = client_for(&server);
    let query = Query::new("custom", "{ x }");

    let first = client.fetch(&query, "k1", category::PROFILE).await?;
    let second = client.fetch(&query, "k1", category::PROFILE).await?;

    assert!(!first.cached);
    assert!(second.cached);
    assert_eq!(first.data, second.data);
    assert_eq!(client.rate_limiter().in_window().await, 1);
    Ok(())
}

#[tokio::test]
async fn test_empty_cache_key_bypasses_cache() -> Result<()> {
    let server = MockServer::start().await;
    graphql_ok(json!({"data": {"x": 1}}))
        .expect(2)
        .mount(&server)
        .await;
    let client = client_for(&server);
    let query = Query::new("custom", "{ x }");

    client.fetch(&query, "", category::DEFAULT).await?;
    let again = client.fetch(&query, "", category::DEFAULT).await?;

    assert!(!again.cached);
    assert!(client.cache().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_server_error_is_raised_and_not_cached() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "down"})))
        .expect(1)
        .mount(&server)
        .await;
    let client = client_for(&server);

    let err = client
        .fetch(&Query::new("custom", "{ x }"), "k1", category::PROFILE)
        .await
        .unwrap_err();

    match &err {
        Error::Status { status, body } => {
            assert_eq!(*status, 500);
            assert_eq!(body["error"], "down");
        }
        other => panic!("expected status error, got {:?}", other),
    }
    assert!(err.is_transport());
    assert!(err.is_server_error());
    assert!(!client.cache().contains("k1"));
    assert_eq!(client.sessions().open_sessions(), 0);
}

#[tokio::test]
async fn test_non_json_error_body_kept_as_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .mount(&server)
        .await;
    let client = client_for(&server);

    let err = client
        .fetch(&Query::new("custom", "{ x }"), "k1", category::PROFILE)
        .await
        .unwrap_err();

    assert!(err.is_rate_limited());
    match err {
        Error::Status { body, .. } => assert_eq!(body, json!("slow down")),
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_partial_errors_returned_but_not_cached() -> Result<()> {
    let server = MockServer::start().await;
    graphql_ok(json!({
        "data": {"matchedUser": {"username": "alice"}, "userContestRanking": null},
        "errors": [{"message": "contest ranking unavailable", "path": ["userContestRanking"]}]
    }))
    .expect(2)
    .mount(&server)
    .await;
    let client = client_for(&server);
    let query = Query::user_complete_data("alice");

    let result = client.fetch(&query, "k1", category::PROFILE).await?;
    assert_eq!(result.data["matchedUser"]["username"], "alice");
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].message, "contest ranking unavailable");
    assert!(!client.cache().contains("k1"));

    // Not cached, so the next call goes back to the network
    let again = client.fetch(&query, "k1", category::PROFILE).await?;
    assert!(!again.cached);
    Ok(())
}

#[tokio::test]
async fn test_irregular_errors_do_not_drop_data() -> Result<()> {
    let server = MockServer::start().await;
    graphql_ok(json!({"data": {"x": 1}, "errors": ["rate limited"]}))
        .expect(1)
        .mount(&server)
        .await;
    let client = client_for(&server);

    let result = client
        .fetch(&Query::new("custom", "{ x }"), "k1", category::PROFILE)
        .await?;

    assert_eq!(result.data, json!({"x": 1}));
    assert_eq!(result.errors[0].message, "rate limited");
    assert!(!client.cache().contains("k1"));
    Ok(())
}

#[tokio::test]
async fn test_empty_body_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    let client = client_for(&server);

    let err = client
        .fetch(&Query::new("custom", "{ x }"), "k1", category::PROFILE)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::EmptyResponse(_)));
    assert!(!client.cache().contains("k1"));
}

#[tokio::test]
async fn test_request_carries_compatibility_headers() -> Result<()> {
    let server = MockServer::start().await;
    graphql_ok(json!({"data": {"matchedUser": null}}))
        .mount(&server)
        .await;
    let client = client_for(&server);

    client
        .fetch(&Query::skill_stats("alice"), "k1", category::PROFILE)
        .await?;

    let requests = server.received_requests().await.unwrap_or_default();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    let header_value = |name: &str| {
        request
            .headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    let origin = server.uri();
    assert_eq!(header_value("content-type").as_deref(), Some("application/json"));
    assert_eq!(header_value("accept").as_deref(), Some("*/*"));
    assert_eq!(header_value("origin"), Some(origin.clone()));
    assert_eq!(header_value("referer"), Some(format!("{}/alice/", origin)));
    assert_eq!(header_value("user-agent").as_deref(), Some("leetlens-test"));
    assert_eq!(
        header_value("cookie"),
        Some(format!("LEETCODE_SESSION={}", TOKEN))
    );

    let body: Value = serde_json::from_slice(&request.body)?;
    assert_eq!(body["operationName"], "skillStats");
    assert_eq!(body["variables"], json!({"username": "alice"}));
    assert!(body["query"].as_str().unwrap_or_default().contains("skillStats"));
    Ok(())
}

#[tokio::test]
async fn test_referer_stays_on_site_for_odd_usernames() -> Result<()> {
    let server = MockServer::start().await;
    graphql_ok(json!({"data": {"matchedUser": null}}))
        .mount(&server)
        .await;
    let client = client_for(&server);

    client
        .fetch(&Query::skill_stats("x?y#z"), "", category::PROFILE)
        .await?;
    client
        .fetch(&Query::skill_stats("//elsewhere.example"), "", category::PROFILE)
        .await?;

    let requests = server.received_requests().await.unwrap_or_default();
    let referers: Vec<String> = requests
        .iter()
        .filter_map(|r| r.headers.get("referer"))
        .filter_map(|v| v.to_str().ok())
        .map(str::to_string)
        .collect();
    let origin = server.uri();
    assert_eq!(
        referers,
        vec![
            format!("{}/x%3Fy%23z/", origin),
            format!("{}/%2F%2Felsewhere.example/", origin),
        ]
    );
    // One admission per request actually sent
    assert_eq!(client.rate_limiter().in_window().await, 2);
    Ok(())
}

#[tokio::test]
async fn test_token_bootstrapped_once_from_landing_page() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "LEETCODE_SESSION=booted; Path=/; HttpOnly"),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(header("cookie", "LEETCODE_SESSION=booted"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"ok": true}})))
        .expect(2)
        .mount(&server)
        .await;

    let client = LeetClient::builder()
        .base_url(server.uri())
        .rate_limit(fast_limits())
        .build()?;

    client
        .fetch(&Query::new("a", "{ a }"), "a", category::DEFAULT)
        .await?;
    client
        .fetch(&Query::new("b", "{ b }"), "b", category::DEFAULT)
        .await?;

    assert!(client.sessions().has_token().await);
    Ok(())
}

#[tokio::test]
async fn test_failed_bootstrap_surfaces_auth_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {}})))
        .expect(0)
        .mount(&server)
        .await;

    let client = LeetClient::builder()
        .base_url(server.uri())
        .rate_limit(fast_limits())
        .build()
        .unwrap();

    let err = client
        .fetch(&Query::new("a", "{ a }"), "a", category::DEFAULT)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::AuthUnavailable(_)));
    assert!(err.is_auth_error());
    assert_eq!(client.sessions().open_sessions(), 0);
}

#[tokio::test]
async fn test_anonymous_fallback_sends_without_cookie() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(no_cookie)
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"x": 1}})))
        .expect(1)
        .mount(&server)
        .await;

    let client = LeetClient::builder()
        .base_url(server.uri())
        .allow_anonymous(true)
        .rate_limit(fast_limits())
        .build()?;

    let result = client
        .fetch(&Query::new("a", "{ a }"), "a", category::DEFAULT)
        .await?;
    assert_eq!(result.data, json!({"x": 1}));
    Ok(())
}

#[tokio::test]
async fn test_scope_shares_one_session() -> Result<()> {
    let server = MockServer::start().await;
    graphql_ok(json!({"data": {"x": 1}})).mount(&server).await;
    let client = client_for(&server);

    let scope = client.scope().await?;
    for key in ["a", "b", "c"] {
        client
            .fetch(&Query::new("custom", "{ x }"), key, category::DEFAULT)
            .await?;
    }
    assert_eq!(client.sessions().total_opened(), 1);
    assert_eq!(client.sessions().open_sessions(), 1);

    scope.close();
    assert_eq!(client.sessions().open_sessions(), 0);

    // Outside the scope each call opens its own session
    client
        .fetch(&Query::new("custom", "{ x }"), "d", category::DEFAULT)
        .await?;
    assert_eq!(client.sessions().total_opened(), 2);
    assert_eq!(client.sessions().open_sessions(), 0);
    Ok(())
}

#[tokio::test]
async fn test_cancelled_fetch_leaves_no_trace() -> Result<()> {
    let server = MockServer::start().await;
    graphql_ok(json!({"data": {"x": 1}}))
        .expect(1)
        .mount(&server)
        .await;

    let client = LeetClient::builder()
        .base_url(server.uri())
        .session_token(TOKEN)
        .rate_limit(
            RateLimitConfig::new()
                .with_max_requests(1)
                .with_window(Duration::from_secs(60))
                .with_min_spacing(Duration::from_millis(5)),
        )
        .build()?;
    let query = Query::new("custom", "{ x }");

    client.fetch(&query, "a", category::DEFAULT).await?;

    // The window is full: the second call waits and is abandoned
    let abandoned = tokio::time::timeout(
        Duration::from_millis(200),
        client.fetch(&query, "b", category::DEFAULT),
    )
    .await;
    assert!(abandoned.is_err());

    assert_eq!(client.rate_limiter().in_window().await, 1);
    assert_eq!(client.sessions().open_sessions(), 0);
    assert!(!client.cache().contains("b"));
    Ok(())
}

#[tokio::test]
async fn test_concurrent_fetches_respect_spacing() -> Result<()> {
    let server = MockServer::start().await;
    graphql_ok(json!({"data": {"x": 1}}))
        .expect(6)
        .mount(&server)
        .await;
    let client = client_for(&server);

    let scope = client.scope().await?;
    let calls = (0..6).map(|i| {
        let client = client.clone();
        async move {
            client
                .fetch(&Query::new("custom", "{ x }"), &format!("k{}", i), category::DEFAULT)
                .await
        }
    });
    let results = futures::future::join_all(calls).await;
    scope.close();

    assert!(results.iter().all(|r| r.is_ok()));
    assert_eq!(client.cache().len(), 6);
    assert_eq!(client.sessions().total_opened(), 1);

    let admitted = client.rate_limiter().timestamps().await;
    assert_eq!(admitted.len(), 6);
    for pair in admitted.windows(2) {
        assert!(pair[1].duration_since(pair[0]) >= Duration::from_millis(5));
    }
    Ok(())
}

#[tokio::test]
async fn test_users_api_keys_and_categories() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_partial_json(json!({"operationName": "getUserContestRanking"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"data": {"userContestRanking": {"rating": 1850.5}}})),
        )
        .expect(1)
        .mount(&server)
        .await;
    let client = client_for(&server);

    let data = client.users().contest_ranking("alice").await?;
    assert_eq!(data["userContestRanking"]["rating"], 1850.5);

    // Second read is a cache hit under the query-name key
    client.users().contest_ranking("alice").await?;
    assert!(client.cache().contains("contest_ranking:alice"));
    Ok(())
}

#[tokio::test]
async fn test_problems_api_sends_filters() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_partial_json(json!({
            "operationName": "problemsetQuestionList",
            "variables": {"limit": 5, "filters": {"difficulty": "EASY"}}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"problemsetQuestionList": {"total": 1, "questions": [{"titleSlug": "two-sum"}]}}
        })))
        .expect(1)
        .mount(&server)
        .await;
    let client = client_for(&server);

    let filters = ProblemFilters {
        difficulty: Some("EASY".to_string()),
        ..Default::default()
    };
    let data = client.problems().list("", 5, &filters).await?;
    assert_eq!(data["problemsetQuestionList"]["total"], 1);

    let requests = server.received_requests().await.unwrap_or_default();
    assert_eq!(
        requests[0]
            .headers
            .get("referer")
            .and_then(|v| v.to_str().ok()),
        Some(format!("{}/", server.uri()).as_str())
    );
    Ok(())
}
