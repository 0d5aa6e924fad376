//! Proxy pool refresh tests against a mock proxy list source

use rating_harvest::config::Config;
use rating_harvest::crawler::{build_http_client, run_with_config};
use rating_harvest::proxy::{ProxyCriteria, ProxyPool};
use rating_harvest::{HarvestError, ProxyError};
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PROXY_LIST: &str = "\
Proxy list updated at Mon, 21 Oct 19 06:51:02 +0300
Mirror: spys.one/en/
IP address:Port Country-Anonymity(Noa/Anm/Hia)-SSL_support(S)-Google_passed(+)

1.2.3.4:8080 KR1-S+
89.187.177.106:80 US-H-S +
10.0.0.1:3128 DE-N -
10.0.0.2:3128 FR-A-S -

Free proxy list
";

async fn mount_proxy_list(server: &MockServer, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/proxy.txt"))
        .respond_with(template)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_refresh_loads_entries() {
    let mock_server = MockServer::start().await;
    mount_proxy_list(&mock_server, ResponseTemplate::new(200).set_body_string(PROXY_LIST)).await;

    let client = build_http_client(Duration::from_secs(5)).unwrap();
    let mut pool = ProxyPool::new(format!("{}/proxy.txt", mock_server.uri()));

    let count = pool.refresh(&client).await.expect("refresh succeeds");
    assert_eq!(count, 4);
    assert_eq!(pool.eligible_count(ProxyCriteria::default()), 2);

    for _ in 0..50 {
        let addr = pool.select(ProxyCriteria::default()).unwrap();
        assert!(addr == "1.2.3.4:8080" || addr == "89.187.177.106:80");
    }
}

#[tokio::test]
async fn test_refresh_replaces_pool() {
    let mock_server = MockServer::start().await;
    mount_proxy_list(
        &mock_server,
        ResponseTemplate::new(200).set_body_string("5.5.5.5:80 JP-H-S +\n"),
    )
    .await;

    let client = build_http_client(Duration::from_secs(5)).unwrap();
    let mut pool = ProxyPool::new(format!("{}/proxy.txt", mock_server.uri()));
    pool.replace_from_list(PROXY_LIST).unwrap();
    assert_eq!(pool.len(), 4);

    pool.refresh(&client).await.unwrap();
    assert_eq!(pool.len(), 1);
    assert_eq!(pool.entries()[0].addr, "5.5.5.5:80");
}

#[tokio::test]
async fn test_refresh_non_200_fails() {
    let mock_server = MockServer::start().await;
    mount_proxy_list(&mock_server, ResponseTemplate::new(500)).await;

    let client = build_http_client(Duration::from_secs(5)).unwrap();
    let mut pool = ProxyPool::new(format!("{}/proxy.txt", mock_server.uri()));

    let result = pool.refresh(&client).await;
    assert!(matches!(
        result,
        Err(ProxyError::SourceUnavailable { status: 500 })
    ));
    assert!(pool.is_empty());
}

#[tokio::test]
async fn test_refresh_without_entries_fails() {
    let mock_server = MockServer::start().await;
    mount_proxy_list(
        &mock_server,
        ResponseTemplate::new(200).set_body_string("no proxies today\n"),
    )
    .await;

    let client = build_http_client(Duration::from_secs(5)).unwrap();
    let mut pool = ProxyPool::new(format!("{}/proxy.txt", mock_server.uri()));

    assert!(matches!(
        pool.refresh(&client).await,
        Err(ProxyError::Empty)
    ));
}

#[tokio::test]
async fn test_run_aborts_when_refresh_fails() {
    let mock_server = MockServer::start().await;
    mount_proxy_list(&mock_server, ResponseTemplate::new(404)).await;

    let output_dir = TempDir::new().unwrap();
    let mut config = Config::default();
    config.proxy.source_url = format!("{}/proxy.txt", mock_server.uri());
    config.crawler.throttle_max_secs = 0;
    config.output.directory = output_dir.path().to_string_lossy().into_owned();

    let result = run_with_config("https://movie.daum.net/moviedb/main?movieId=1", &config).await;
    assert!(matches!(
        result,
        Err(HarvestError::Proxy(ProxyError::SourceUnavailable { status: 404 }))
    ));
}

#[tokio::test]
async fn test_run_aborts_without_eligible_proxy() {
    let mock_server = MockServer::start().await;
    mount_proxy_list(
        &mock_server,
        ResponseTemplate::new(200).set_body_string("10.0.0.1:3128 DE-N -\n"),
    )
    .await;

    let output_dir = TempDir::new().unwrap();
    let mut config = Config::default();
    config.proxy.source_url = format!("{}/proxy.txt", mock_server.uri());
    config.output.directory = output_dir.path().to_string_lossy().into_owned();

    let result = run_with_config("https://movie.daum.net/moviedb/main?movieId=1", &config).await;
    assert!(matches!(
        result,
        Err(HarvestError::Proxy(ProxyError::NoEligibleProxy { pool_size: 1 }))
    ));
}
