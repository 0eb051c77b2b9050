//! HTTP retrieval behavior against a mock server.

use unifeed::{FeedParser, FetchError, Fetcher, ParseError};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const VALID_SITEMAP: &str = r#"<?xml version="1.0"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
    <url><loc>http://example.com/1</loc></url>
</urlset>"#;

const VALID_RSS: &str = r#"<?xml version="1.0"?>
<rss version="2.0"><channel>
    <title>Remote</title>
    <item><title>a</title><link>http://example.com/a</link></item>
</channel></rss>"#;

fn fetcher() -> Fetcher {
    Fetcher::new(FeedParser::new()).unwrap()
}

#[tokio::test]
async fn test_fetch_and_parse_sitemap() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(VALID_SITEMAP)
                .insert_header("Content-Type", "application/xml"),
        )
        .mount(&mock_server)
        .await;

    let feed = fetcher()
        .fetch(&format!("{}/sitemap.xml", mock_server.uri()))
        .await
        .unwrap();

    assert_eq!(feed.version, "0.9");
    assert_eq!(feed.items[0].link, "http://example.com/1");
}

#[tokio::test]
async fn test_fetch_and_parse_rss() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(VALID_RSS))
        .mount(&mock_server)
        .await;

    let feed = fetcher()
        .fetch(&format!("{}/feed", mock_server.uri()))
        .await
        .unwrap();

    assert_eq!(feed.title.as_deref(), Some("Remote"));
}

#[tokio::test]
async fn test_http_error_carries_status_and_text() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let err = fetcher()
        .fetch(&format!("{}/missing", mock_server.uri()))
        .await
        .unwrap_err();

    match err {
        FetchError::Http { status, text } => {
            assert_eq!(status, 404);
            assert_eq!(text, "Not Found");
        }
        other => panic!("expected Http error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_server_error_is_fatal_without_retry() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1) // exactly one request: no retry machinery in the core
        .mount(&mock_server)
        .await;

    let err = fetcher()
        .fetch(&format!("{}/feed", mock_server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Http { status: 503, .. }));
}

#[tokio::test]
async fn test_redirect_is_followed() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(
            ResponseTemplate::new(301).insert_header("Location", "/new"),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(ResponseTemplate::new(200).set_body_string(VALID_SITEMAP))
        .mount(&mock_server)
        .await;

    let feed = fetcher()
        .fetch(&format!("{}/old", mock_server.uri()))
        .await
        .unwrap();
    assert_eq!(feed.items.len(), 1);
}

#[tokio::test]
async fn test_undetectable_body_is_a_parse_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not a feed</html>"))
        .mount(&mock_server)
        .await;

    let err = fetcher()
        .fetch(&format!("{}/page", mock_server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        FetchError::Parse(ParseError::UnknownFeedType)
    ));
}
