use async_trait::async_trait;
use persona_core::{AppConfig, Platform, ScrapeStatus, ScrapingConfig};
use persona_scraper::{
    EvidenceBundle, HttpTransport, ProfileRequest, Result, ScrapeError, ScrapeOrchestrator,
    TransportResponse,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

/// What the mock API does for one username.
#[derive(Clone)]
enum Route {
    Respond(u16, &'static str),
    Delay(Duration, &'static str),
    Panic,
}

/// Mock aggregation API keyed by the `username` query parameter.
#[derive(Default)]
struct MockApi {
    routes: HashMap<String, Route>,
    requests: Mutex<Vec<String>>,
}

impl MockApi {
    fn route(mut self, username: &str, route: Route) -> Self {
        self.routes.insert(username.to_string(), route);
        self
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().expect("lock requests").clone()
    }

    fn calls_for(&self, username: &str) -> usize {
        self.requests()
            .iter()
            .filter(|url| url.ends_with(&format!("username={username}")))
            .count()
    }
}

#[async_trait]
impl HttpTransport for MockApi {
    async fn get(&self, request: &ProfileRequest) -> Result<TransportResponse> {
        self.requests
            .lock()
            .expect("lock requests")
            .push(request.url.to_string());

        let username = request
            .url
            .query_pairs()
            .find(|(k, _)| k == "username")
            .map(|(_, v)| v.into_owned())
            .unwrap_or_default();

        match self.routes.get(&username).cloned() {
            Some(Route::Respond(status, body)) => Ok(TransportResponse {
                status,
                body: body.to_string(),
            }),
            Some(Route::Delay(delay, body)) => {
                tokio::time::sleep(delay).await;
                Ok(TransportResponse {
                    status: 200,
                    body: body.to_string(),
                })
            }
            Some(Route::Panic) => panic!("mock transport blew up for {username}"),
            None => Ok(TransportResponse {
                status: 404,
                body: String::new(),
            }),
        }
    }
}

fn scraping_config() -> ScrapingConfig {
    ScrapingConfig {
        api_key: Some("integration-key".to_string()),
        ..ScrapingConfig::default()
    }
}

fn orchestrator(api: &Arc<MockApi>) -> ScrapeOrchestrator {
    ScrapeOrchestrator::new(scraping_config(), api.clone()).expect("create orchestrator")
}

fn inputs(pairs: &[(Platform, &str)]) -> BTreeMap<Platform, String> {
    pairs
        .iter()
        .map(|(platform, handle)| (*platform, (*handle).to_string()))
        .collect()
}

#[tokio::test(start_paused = true)]
async fn test_scenario_sanitizes_skips_and_orders_evidence() {
    let api = Arc::new(
        MockApi::default()
            .route(
                "jane_doe",
                Route::Respond(200, r#"{"biography": "Photographer in Lisbon"}"#),
            )
            .route(
                "jane.doe",
                Route::Respond(200, r#"{"user": {"signature": "Dance videos"}}"#),
            ),
    );

    let report = orchestrator(&api)
        .scrape_all(&inputs(&[
            (Platform::Instagram, "https://instagram.com/jane_doe"),
            (Platform::Twitter, ""),
            (Platform::Tiktok, "@jane.doe"),
        ]))
        .await;

    let mut requested = api.requests();
    requested.sort();
    assert_eq!(
        requested,
        vec![
            "https://api.scrapecreators.com/v1/instagram/profile?username=jane_doe",
            "https://api.scrapecreators.com/v1/tiktok/profile?username=jane.doe",
        ]
    );

    assert_eq!(report.results.len(), 3);
    assert_eq!(
        report.get(Platform::Twitter).map(|r| r.status),
        Some(ScrapeStatus::Skipped)
    );
    assert_eq!(
        report.evidence,
        "[Instagram @jane_doe]\nPhotographer in Lisbon\n\n[TikTok @jane.doe]\nDance videos"
    );
    assert_eq!(report.count(ScrapeStatus::Success), 2);
}

#[tokio::test(start_paused = true)]
async fn test_not_found_is_requested_once() {
    let api = Arc::new(MockApi::default().route("ghost", Route::Respond(404, "")));

    let report = orchestrator(&api)
        .scrape_all(&inputs(&[(Platform::Snapchat, "ghost")]))
        .await;

    let result = report.get(Platform::Snapchat).expect("snapchat result");
    assert_eq!(result.status, ScrapeStatus::Error);
    assert_eq!(result.error.as_deref(), Some("404 Profile not found"));
    assert_eq!(result.http_status, Some(404));
    assert_eq!(api.calls_for("ghost"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_server_errors_use_whole_budget() {
    let api = Arc::new(MockApi::default().route("flaky", Route::Respond(500, "oops")));

    let started = Instant::now();
    let report = orchestrator(&api)
        .scrape_all(&inputs(&[(Platform::Instagram, "flaky")]))
        .await;

    let result = report.get(Platform::Instagram).expect("instagram result");
    assert_eq!(result.status, ScrapeStatus::Error);
    assert_eq!(result.error.as_deref(), Some("API error (500)"));
    assert_eq!(api.calls_for("flaky"), 3);
    assert!(started.elapsed() >= Duration::from_secs(3));
    assert!(report.evidence.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_blank_handles_make_no_requests() {
    let api = Arc::new(MockApi::default());

    let report = orchestrator(&api)
        .scrape_all(&inputs(&[
            (Platform::Instagram, ""),
            (Platform::Twitter, "   "),
            (Platform::Tiktok, "@"),
        ]))
        .await;

    assert!(api.requests().is_empty());
    assert_eq!(report.count(ScrapeStatus::Skipped), 3);
    assert!(report.results.values().all(|r| r.chars == 0));
    assert!(report.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_chars_only_on_success() {
    let api = Arc::new(
        MockApi::default()
            .route("talker", Route::Respond(200, r#"{"bio": "Coffee, code"}"#))
            .route("quiet", Route::Respond(200, r#"{"bio": "   ", "followers": 3}"#))
            .route("broken", Route::Respond(200, "not json")),
    );

    let report = orchestrator(&api)
        .scrape_all(&inputs(&[
            (Platform::Instagram, "talker"),
            (Platform::Twitter, "quiet"),
            (Platform::Tiktok, "broken"),
        ]))
        .await;

    for result in report.results.values() {
        match result.status {
            ScrapeStatus::Success => {
                assert!(result.chars > 0);
                assert_eq!(result.chars, result.text.chars().count());
            }
            _ => {
                assert_eq!(result.chars, 0);
                assert!(result.text.is_empty());
            }
        }
    }

    assert_eq!(
        report.get(Platform::Twitter).map(|r| r.status),
        Some(ScrapeStatus::NoContent)
    );
    assert_eq!(
        report.get(Platform::Tiktok).map(|r| r.status),
        Some(ScrapeStatus::Error)
    );
    assert_eq!(report.evidence, "[Instagram @talker]\nCoffee, code");
}

#[tokio::test(start_paused = true)]
async fn test_one_platform_failing_does_not_affect_others() {
    let api = Arc::new(
        MockApi::default()
            .route("boom", Route::Panic)
            .route("fine", Route::Respond(200, r#"{"description": "Still here"}"#)),
    );

    let report = orchestrator(&api)
        .scrape_all(&inputs(&[
            (Platform::Instagram, "boom"),
            (Platform::Twitter, "fine"),
        ]))
        .await;

    let failed = report.get(Platform::Instagram).expect("instagram result");
    assert_eq!(failed.status, ScrapeStatus::Error);
    assert!(failed.error.is_some());

    let ok = report.get(Platform::Twitter).expect("twitter result");
    assert_eq!(ok.status, ScrapeStatus::Success);
    assert_eq!(ok.text, "Still here");
}

#[tokio::test(start_paused = true)]
async fn test_platforms_are_scraped_concurrently() {
    let api = Arc::new(
        MockApi::default()
            .route("a", Route::Delay(Duration::from_secs(5), r#"{"bio": "a"}"#))
            .route("b", Route::Delay(Duration::from_secs(5), r#"{"bio": "b"}"#))
            .route("c", Route::Delay(Duration::from_secs(5), r#"{"bio": "c"}"#)),
    );

    let started = Instant::now();
    let report = orchestrator(&api)
        .scrape_all(&inputs(&[
            (Platform::Instagram, "a"),
            (Platform::Twitter, "b"),
            (Platform::Snapchat, "c"),
        ]))
        .await;

    assert_eq!(report.count(ScrapeStatus::Success), 3);
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_secs(5) && elapsed < Duration::from_secs(10));
}

#[tokio::test(start_paused = true)]
async fn test_progress_stream_ends_with_terminal_states() {
    let api = Arc::new(MockApi::default().route("jane", Route::Respond(200, r#"{"bio": "hi"}"#)));
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let orchestrator = orchestrator(&api).with_progress(tx);

    orchestrator
        .scrape_all(&inputs(&[
            (Platform::Instagram, "jane"),
            (Platform::Facebook, "jane"),
            (Platform::Twitter, ""),
        ]))
        .await;
    drop(orchestrator);

    let mut last = BTreeMap::new();
    let mut loading = Vec::new();
    while let Some(update) = rx.recv().await {
        if update.status == ScrapeStatus::Loading {
            loading.push(update.platform);
        }
        last.insert(update.platform, update.status);
    }

    assert_eq!(loading, vec![Platform::Instagram]);
    assert!(last.values().all(|status| status.is_terminal()));
    assert_eq!(last.get(&Platform::Facebook), Some(&ScrapeStatus::Error));
}

#[tokio::test(start_paused = true)]
async fn test_empty_report_needs_other_evidence() {
    let api = Arc::new(MockApi::default());
    let report = orchestrator(&api)
        .scrape_all(&inputs(&[(Platform::Instagram, "nobody")]))
        .await;

    let bundle = EvidenceBundle::from_report(&report);
    assert!(!bundle.has_evidence());
    assert!(bundle.with_notes("Met at a conference").has_evidence());
}

#[test]
fn test_missing_key_refuses_to_build() {
    let api = Arc::new(MockApi::default());
    let result = ScrapeOrchestrator::new(ScrapingConfig::default(), api);
    assert!(matches!(result, Err(ScrapeError::MissingApiKey)));
}

#[tokio::test]
#[ignore = "Requires network access and PERSONA_SCRAPE_API_KEY"]
async fn test_live_harness() {
    let config = AppConfig::load_with_env().expect("load config");
    let orchestrator = ScrapeOrchestrator::from_config(&config.scraping).expect("build orchestrator");

    let report = orchestrator
        .scrape_all(&inputs(&[
            (Platform::Instagram, "instagram"),
            (Platform::Twitter, "twitter"),
            (Platform::Tiktok, "tiktok"),
            (Platform::Snapchat, "snapchat"),
        ]))
        .await;

    for result in report.results.values() {
        println!(
            "{:<12} {:<10} {:>6} chars {}",
            result.platform,
            result.status,
            result.chars,
            result.error.as_deref().unwrap_or("")
        );
    }
}
