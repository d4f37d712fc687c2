//! End-to-end discussion resolution against mocked HN and Reddit APIs.
//!
//! Each test starts its own mock server; the resolver is pointed at it
//! through the same base URLs the config file would set.

use discussion_repl::discussion::{DiscussionResolver, HnClient, RedditClient, ResolveError};
use discussion_repl::net::HttpClient;
use pretty_assertions::assert_eq;
use std::time::Duration;
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn resolver(server: &MockServer) -> DiscussionResolver {
    let http = HttpClient::new("test", Duration::from_secs(5)).unwrap();
    let base = server.uri();
    let hn = HnClient::new(
        http.clone(),
        Url::parse(&format!("{base}/v0/item")).unwrap(),
        Url::parse(&format!("{base}/api/v1/search")).unwrap(),
    );
    let reddit = RedditClient::new(http, Url::parse(&format!("{base}/reddit")).unwrap());
    DiscussionResolver::new(hn, reddit)
}

async fn mount_search(server: &MockServer, url: &str, hits: &str) {
    Mock::given(method("GET"))
        .and(path("/api/v1/search"))
        .and(query_param("query", url))
        .and(query_param("numericFilters", "num_comments>0"))
        .and(query_param("restrictSearchableAttributes", "url"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(r#"{{"hits": {hits}}}"#)))
        .expect(1)
        .mount(server)
        .await;
}

fn lines(resolution: &discussion_repl::discussion::Resolution) -> Vec<String> {
    resolution.threads.iter().map(ToString::to_string).collect()
}

// ============================================================================
// General search
// ============================================================================

#[tokio::test]
async fn test_plain_url_is_searched_and_ranked() {
    let server = MockServer::start().await;
    mount_search(
        &server,
        "http://example.com/a",
        r#"[
            {"objectID": "1", "points": 1, "created_at_i": 0},
            {"objectID": "2", "points": 10, "created_at_i": 1379565972}
        ]"#,
    )
    .await;

    let resolution = resolver(&server).resolve("http://example.com/a").await.unwrap();

    assert_eq!(resolution.canonical_url, None);
    assert_eq!(
        lines(&resolution),
        vec![
            "https://news.ycombinator.com/item?id=2 | 10 points | 2013-09-19T04:46:12Z",
            "https://news.ycombinator.com/item?id=1 | 1 point | 1970-01-01T00:00:00Z",
        ]
    );
}

#[tokio::test]
async fn test_search_failure_is_transient() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let err = resolver(&server).resolve("http://example.com/a").await.unwrap_err();
    assert!(err.is_transient());
}

// ============================================================================
// Hacker News item pages
// ============================================================================

#[tokio::test]
async fn test_hn_item_resolves_article_and_excludes_itself() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v0/item/123.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"id": 123, "url": "http://example.com/a"}"#),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_search(
        &server,
        "http://example.com/a",
        r#"[
            {"objectID": "123", "points": 99, "created_at_i": 0},
            {"objectID": "456", "points": 4, "created_at_i": 0}
        ]"#,
    )
    .await;

    let resolution = resolver(&server)
        .resolve("https://news.ycombinator.com/item?id=123")
        .await
        .unwrap();

    assert_eq!(resolution.canonical_url.as_deref(), Some("http://example.com/a"));
    assert_eq!(
        lines(&resolution),
        vec!["https://news.ycombinator.com/item?id=456 | 4 points | 1970-01-01T00:00:00Z"]
    );
}

#[tokio::test]
async fn test_hn_item_without_url_skips_search() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v0/item/77.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"id": 77, "title": "Ask HN"}"#))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"hits": []}"#))
        .expect(0)
        .mount(&server)
        .await;

    let resolution = resolver(&server)
        .resolve("https://news.ycombinator.com/item?id=77")
        .await
        .unwrap();

    assert_eq!(resolution.canonical_url, None);
    assert!(resolution.threads.is_empty());
}

#[tokio::test]
async fn test_hn_url_without_id_is_fatal() {
    let server = MockServer::start().await;

    let err = resolver(&server)
        .resolve("https://news.ycombinator.com/news")
        .await
        .unwrap_err();

    assert!(matches!(err, ResolveError::MissingItemId(_)));
    assert!(!err.is_transient());
}

#[tokio::test]
async fn test_hn_url_with_non_numeric_id_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .expect(0)
        .mount(&server)
        .await;

    let err = resolver(&server)
        .resolve("https://news.ycombinator.com/item?id=../../x")
        .await
        .unwrap_err();

    assert!(matches!(err, ResolveError::MissingItemId(_)));
}

#[tokio::test]
async fn test_hackerweb_page_behaves_like_hn_item() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v0/item/10179571.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"url": "http://example.com/b"}"#))
        .expect(1)
        .mount(&server)
        .await;
    mount_search(&server, "http://example.com/b", "[]").await;

    let resolution = resolver(&server)
        .resolve("https://hackerweb.app/#/item/10179571")
        .await
        .unwrap();

    assert_eq!(resolution.canonical_url.as_deref(), Some("http://example.com/b"));
}

// ============================================================================
// Reddit submissions
// ============================================================================

#[tokio::test]
async fn test_reddit_submission_resolves_article() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/reddit/by_id/t3_fcnkwq.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"kind": "Listing", "data": {"children": [{"kind": "t3", "data": {"url": "http://example.com/c"}}]}}"#,
        ))
        .expect(1)
        .mount(&server)
        .await;
    mount_search(
        &server,
        "http://example.com/c",
        r#"[{"objectID": "8", "points": 3, "created_at_i": 0}]"#,
    )
    .await;

    let resolution = resolver(&server)
        .resolve("https://www.reddit.com/r/programming/comments/fcnkwq/some_title/")
        .await
        .unwrap();

    assert_eq!(resolution.canonical_url.as_deref(), Some("http://example.com/c"));
    assert_eq!(resolution.threads.len(), 1);
    assert_eq!(resolution.threads[0].id, "8");
}
