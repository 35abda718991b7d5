use super::*;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_http_loader_fetches_document() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<title>Home</title>"))
        .mount(&server)
        .await;

    let loader = HttpLoader::new("SiteProbe-Test", Duration::from_secs(5)).unwrap();
    let url = Url::parse(&server.uri()).unwrap();
    let page = loader.load(&url).await.unwrap();
    assert_eq!(page.html, "<title>Home</title>");
    assert_eq!(page.url.path(), "/");
}

#[tokio::test]
async fn test_http_loader_keeps_error_pages() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("<h1>Not Found</h1>"))
        .mount(&server)
        .await;

    let loader = HttpLoader::new("SiteProbe-Test", Duration::from_secs(5)).unwrap();
    let url = Url::parse(&format!("{}/missing", server.uri())).unwrap();
    let page = loader.load(&url).await.unwrap();
    assert!(page.html.contains("Not Found"));
}

#[tokio::test]
async fn test_http_loader_follows_redirects() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(
            ResponseTemplate::new(301).insert_header("location", format!("{}/new", server.uri())),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(ResponseTemplate::new(200).set_body_string("moved"))
        .mount(&server)
        .await;

    let loader = HttpLoader::new("SiteProbe-Test", Duration::from_secs(5)).unwrap();
    let url = Url::parse(&format!("{}/old", server.uri())).unwrap();
    let page = loader.load(&url).await.unwrap();
    assert_eq!(page.url.path(), "/new");
    assert_eq!(page.html, "moved");
}

#[tokio::test]
async fn test_http_loader_connection_failure() {
    let loader = HttpLoader::new("SiteProbe-Test", Duration::from_secs(1)).unwrap();
    let url = Url::parse("http://127.0.0.1:1/").unwrap();
    let err = loader.load(&url).await.unwrap_err();
    assert!(matches!(err, HostError::Load { .. }));
}

#[tokio::test]
async fn test_static_pages_lookup_is_normalized() {
    let pages = StaticPages::new().with_page("https://example.com", "<p>hi</p>");
    assert_eq!(pages.len(), 1);

    let url = Url::parse("https://example.com/").unwrap();
    let page = pages.load(&url).await.unwrap();
    assert_eq!(page.html, "<p>hi</p>");
}

#[tokio::test]
async fn test_static_pages_unknown_url() {
    let pages = StaticPages::new();
    assert!(pages.is_empty());
    let url = Url::parse("https://nowhere.test/").unwrap();
    let err = pages.load(&url).await.unwrap_err();
    assert!(err.to_string().contains("nowhere.test"));
}
