//! End-to-end crawl tests against a mock movie site

use rating_harvest::config::Config;
use rating_harvest::crawler::{run_with_config, Engine, EngineSettings};
use rating_harvest::output::{MetadataRecord, OutputSink, RatingRecord};
use rating_harvest::proxy::ProxyPool;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MOVIE_MAIN: &str = include_str!("../fixtures/movie_main.html");

/// Creates a proxy-less, non-throttled test configuration rooted at the mock server
fn create_test_config(origin: &str, output_dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.proxy.enabled = false;
    config.crawler.throttle_max_secs = 0;
    config.crawler.request_timeout_secs = 5;
    config.site.origin = origin.to_string();
    config.output.directory = output_dir.path().to_string_lossy().into_owned();
    config
}

fn create_engine(config: &Config) -> Engine {
    let settings = EngineSettings::from_config(config).expect("valid settings");
    let sink = OutputSink::new(&config.output.directory, config.output.flush_threshold);
    Engine::new(settings, ProxyPool::from_entries(vec![]), sink).expect("engine builds")
}

async fn mount_movie_main(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/moviedb/main"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(MOVIE_MAIN)
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

fn expected_ratings() -> Vec<RatingRecord> {
    [
        ("ckh5SQ==", 0),
        ("Q0s1Yk0=", 9),
        ("OHVFYTQ=", 10),
        ("NGsxa0M=", 10),
        ("NHJ5aHM=", 10),
    ]
    .into_iter()
    .map(|(user, rating)| RatingRecord::new(user, "128635", rating))
    .collect()
}

fn expected_metadata() -> MetadataRecord {
    MetadataRecord {
        movie_id: "128635".to_string(),
        title: "우리집 (2019)".to_string(),
        genre: "드라마/가족".to_string(),
        country: "한국".to_string(),
        running_time: 92,
    }
}

#[tokio::test]
async fn test_single_round_on_item_page() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_movie_main(&mock_server).await;

    let output_dir = TempDir::new().unwrap();
    let config = create_test_config(&base_url, &output_dir);
    let mut engine = create_engine(&config);

    let seed = format!("{}/moviedb/main?movieId=128635", base_url);
    engine.seed(seed.clone());

    let report = engine.run_round().await.expect("round succeeds");
    assert_eq!(report.fetched, 1);
    assert_eq!(report.succeeded, 1);
    assert_eq!(report.failed, 0);

    assert_eq!(engine.sink().pending_metadata(), &[expected_metadata()]);
    assert_eq!(engine.sink().pending_ratings(), expected_ratings().as_slice());

    // 5 < 100: nothing reached the disk yet.
    assert!(!engine.sink().ratings_path().exists());
    assert!(!engine.sink().metadata_path().exists());

    assert!(engine.frontier().is_visited(&seed));
    let pending: Vec<&str> = engine.frontier().pending().collect();
    assert!(!pending.contains(&seed.as_str()));
    assert!(pending
        .iter()
        .any(|link| link.contains("personId=271829")));
    assert!(pending
        .iter()
        .any(|link| link.contains("personId=518464")));
    assert!(pending
        .iter()
        .any(|link| link.contains("productionId=1012")));
    assert!(!pending.iter().any(|link| link.contains("reservation")));
    assert!(pending.iter().all(|link| link.starts_with(&base_url)));
}

#[tokio::test]
async fn test_failed_fetch_is_requeued() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/moviedb/main"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let output_dir = TempDir::new().unwrap();
    let config = create_test_config(&base_url, &output_dir);
    let mut engine = create_engine(&config);

    let seed = format!("{}/moviedb/main?movieId=128635", base_url);
    engine.seed(seed.clone());

    let report = engine.run_round().await.expect("round succeeds");
    assert_eq!(report.failed, 1);

    assert_eq!(engine.frontier().pending().collect::<Vec<_>>(), vec![seed.as_str()]);
    assert!(!engine.frontier().is_visited(&seed));
    assert_eq!(engine.stats().requeued, 1);
    assert!(engine.sink().pending_ratings().is_empty());
}

#[tokio::test]
async fn test_flush_fires_at_threshold() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_movie_main(&mock_server).await;

    let output_dir = TempDir::new().unwrap();
    let mut config = create_test_config(&base_url, &output_dir);
    config.output.flush_threshold = 5;
    let mut engine = create_engine(&config);
    engine.seed(format!("{}/moviedb/main?movieId=128635", base_url));

    engine.run_round().await.expect("round succeeds");

    assert!(engine.sink().pending_ratings().is_empty());
    assert!(engine.sink().pending_metadata().is_empty());

    let ratings = std::fs::read_to_string(engine.sink().ratings_path()).unwrap();
    assert_eq!(
        ratings,
        "ckh5SQ==,128635,0\nQ0s1Yk0=,128635,9\nOHVFYTQ=,128635,10\nNGsxa0M=,128635,10\nNHJ5aHM=,128635,10\n"
    );
    assert_eq!(engine.stats().flushes, 1);
}

#[tokio::test]
async fn test_no_flush_below_threshold() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_movie_main(&mock_server).await;

    let output_dir = TempDir::new().unwrap();
    let mut config = create_test_config(&base_url, &output_dir);
    config.output.flush_threshold = 6;
    let mut engine = create_engine(&config);
    engine.seed(format!("{}/moviedb/main?movieId=128635", base_url));

    engine.run_round().await.expect("round succeeds");

    assert_eq!(engine.sink().pending_ratings().len(), 5);
    assert!(!engine.sink().ratings_path().exists());
    assert_eq!(engine.stats().flushes, 0);
}

#[tokio::test]
async fn test_user_rating_page() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/moviedb/other/moviePoint"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><body>
            <div class="rate_info"><a class="tit_subject" name="127878" href="/moviedb/main?movieId=127878">A</a><em class="emph_rate">10</em></div>
            <div class="rate_info"><a class="tit_subject" name="78539" href="/moviedb/main?movieId=78539">B</a><em class="emph_rate">10</em></div>
            <div class="rate_info"><a class="tit_subject" name="42238" href="/moviedb/main?movieId=42238">C</a><em class="emph_rate">1</em></div>
            <div class="rate_info"><a class="tit_subject" name="70404" href="/moviedb/main?movieId=70404">D</a><em class="emph_rate">9</em></div>
            </body></html>"#,
        ))
        .mount(&mock_server)
        .await;

    let output_dir = TempDir::new().unwrap();
    let config = create_test_config(&base_url, &output_dir);
    let mut engine = create_engine(&config);
    engine.seed(format!("{}/moviedb/other/moviePoint?uid=OEhrRm4=", base_url));

    engine.run_round().await.expect("round succeeds");

    let expected: Vec<RatingRecord> = [("127878", 10), ("78539", 10), ("42238", 1), ("70404", 9)]
        .into_iter()
        .map(|(item, rating)| RatingRecord::new("OEhrRm4=", item, rating))
        .collect();
    assert_eq!(engine.sink().pending_ratings(), expected.as_slice());
    assert!(engine.sink().pending_metadata().is_empty());
    assert_eq!(engine.frontier().len(), 4);
}

#[tokio::test]
async fn test_full_run_drains_frontier_and_writes_csv() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    // Every other page answers 404 and is dropped after one retry.
    mount_movie_main(&mock_server).await;

    let output_dir = TempDir::new().unwrap();
    let mut config = create_test_config(&base_url, &output_dir);
    config.crawler.max_retries = 1;

    let seed = format!("{}/moviedb/main?movieId=128635", base_url);
    let stats = run_with_config(&seed, &config).await.expect("crawl completes");

    assert_eq!(stats.pages_visited, 1);
    assert_eq!(stats.dropped, 9);
    assert_eq!(stats.requeued, 9);
    assert_eq!(stats.ratings_written, 5);
    assert_eq!(stats.metadata_written, 1);

    let metadata = std::fs::read_to_string(output_dir.path().join("metadata.csv")).unwrap();
    assert_eq!(metadata, "128635,\"우리집 (2019)\",\"드라마/가족\",\"한국\",92\n");

    let ratings = std::fs::read_to_string(output_dir.path().join("ratings.csv")).unwrap();
    assert_eq!(ratings.lines().count(), 5);
    assert!(ratings.starts_with("ckh5SQ==,128635,0\n"));
}

#[tokio::test]
async fn test_invalid_seed_is_rejected() {
    let output_dir = TempDir::new().unwrap();
    let config = create_test_config("https://movie.daum.net", &output_dir);
    let result = run_with_config("not a url", &config).await;
    assert!(result.is_err());
}
