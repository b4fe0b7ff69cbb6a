//! Integration tests for the Sahayak translation service
//!
//! These tests run the HTTP server on an ephemeral port and drive it with the
//! crate's own clients: the `HttpBatchTranslator`, the debounced `Translator`
//! on top of it, and the OpenAI capability behind the server.
//!
//! NOTE: PostgreSQL profile store tests live in src/profile.rs and are
//! ignored unless a database is available.

use async_trait::async_trait;
use sahayak::error::TranslateError;
use sahayak::i18n::Language;
use sahayak::openai::{OpenAiBatchTranslator, OpenAiClient};
use sahayak::profile::InMemoryProfileStore;
use sahayak::retry::RetryConfig;
use sahayak::server::{router, AppState, API_KEY_HEADER};
use sahayak::translation::{
    BatchTranslator, FlushOutcome, HttpBatchTranslator, Translator, TranslatorOptions,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

const TEST_API_KEY: &str = "test-service-key";

// ==================== Test Helpers ====================

/// Deterministic backend: "[code] text"
#[derive(Default)]
struct EchoTranslator {
    calls: AtomicUsize,
    fail: AtomicBool,
}

#[async_trait]
impl BatchTranslator for EchoTranslator {
    async fn translate_batch(
        &self,
        texts: &[String],
        target: Language,
    ) -> Result<Vec<String>, TranslateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(TranslateError::Api {
                status: 503,
                body: "model overloaded".to_string(),
            });
        }
        Ok(texts
            .iter()
            .map(|t| format!("[{}] {}", target.code(), t))
            .collect())
    }
}

/// Running server; shuts down on drop.
struct TestServer {
    base_url: String,
    shutdown: Option<oneshot::Sender<()>>,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

async fn spawn_server(state: AppState) -> TestServer {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Failed to read local addr");
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        let _ = axum::serve(listener, router(state))
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            })
            .await;
    });

    TestServer {
        base_url: format!("http://{}", addr),
        shutdown: Some(shutdown_tx),
    }
}

fn create_state(backend: Arc<dyn BatchTranslator>, api_key: Option<&str>) -> AppState {
    AppState::new(
        backend,
        Arc::new(InMemoryProfileStore::new()),
        api_key.map(str::to_string),
        5,
    )
}

async fn spawn_echo_server(api_key: Option<&str>) -> (TestServer, Arc<EchoTranslator>, AppState) {
    let backend = Arc::new(EchoTranslator::default());
    let state = create_state(backend.clone(), api_key);
    let server = spawn_server(state.clone()).await;
    (server, backend, state)
}

fn texts(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn authed(request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
    request.header(API_KEY_HEADER, TEST_API_KEY)
}

// ==================== Health & Auth ====================

#[tokio::test]
async fn test_health_is_open_without_api_key() {
    let (server, _, _) = spawn_echo_server(Some(TEST_API_KEY)).await;

    let response = reqwest::get(format!("{}/health", server.base_url))
        .await
        .expect("Request failed");

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_api_requires_key_when_configured() {
    let (server, backend, _) = spawn_echo_server(Some(TEST_API_KEY)).await;
    let client = reqwest::Client::new();
    let url = format!("{}/api/translate", server.base_url);
    let body = serde_json::json!({ "texts": ["Save"], "targetLanguage": "hi" });

    let missing = client.post(&url).json(&body).send().await.unwrap();
    assert_eq!(missing.status(), 401);

    let wrong = client
        .post(&url)
        .header(API_KEY_HEADER, "wrong-service-key")
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(wrong.status(), 401);

    let ok = authed(client.post(&url)).json(&body).send().await.unwrap();
    assert_eq!(ok.status(), 200);

    assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_api_is_open_without_configured_key() {
    let (server, _, _) = spawn_echo_server(None).await;

    let response = reqwest::get(format!("{}/api/languages", server.base_url))
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
}

// ==================== Languages ====================

#[tokio::test]
async fn test_languages_lists_enabled_languages() {
    let (server, _, _) = spawn_echo_server(None).await;

    let languages: Vec<serde_json::Value> =
        reqwest::get(format!("{}/api/languages", server.base_url))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

    assert_eq!(languages[0]["code"], "en");
    assert_eq!(languages[0]["is_canonical"], true);
    assert!(languages.iter().any(|l| l["code"] == "hi"));
    assert!(languages.iter().any(|l| l["code"] == "mr"));
    assert!(languages.iter().all(|l| l["enabled"] == true));
}

// ==================== Batch Translation ====================

#[tokio::test]
async fn test_http_translator_round_trip() {
    let (server, _, _) = spawn_echo_server(Some(TEST_API_KEY)).await;
    let translator = HttpBatchTranslator::new(
        &server.base_url,
        Some(TEST_API_KEY.to_string()),
        Duration::from_secs(5),
    )
    .unwrap();

    let translations = translator
        .translate_batch(&texts(&["Stories", "Quizzes"]), Language::HINDI)
        .await
        .expect("Should translate");

    assert_eq!(translations, vec!["[hi] Stories", "[hi] Quizzes"]);
}

#[tokio::test]
async fn test_translate_rejects_unknown_language() {
    let (server, backend, _) = spawn_echo_server(None).await;

    let response = reqwest::Client::new()
        .post(format!("{}/api/translate", server.base_url))
        .json(&serde_json::json!({ "texts": ["Save"], "targetLanguage": "xx" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("xx"));
    assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_translate_rejects_oversized_batch() {
    let (server, backend, _) = spawn_echo_server(None).await;
    let too_many: Vec<String> = (0..6).map(|i| format!("String {}", i)).collect();

    let response = reqwest::Client::new()
        .post(format!("{}/api/translate", server.base_url))
        .json(&serde_json::json!({ "texts": too_many, "targetLanguage": "hi" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_translate_empty_batch_skips_backend() {
    let (server, backend, _) = spawn_echo_server(None).await;
    let translator =
        HttpBatchTranslator::new(&server.base_url, None, Duration::from_secs(5)).unwrap();

    let translations = translator
        .translate_batch(&[], Language::HINDI)
        .await
        .unwrap();

    assert!(translations.is_empty());
    assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_upstream_failure_is_bad_gateway() {
    let (server, backend, state) = spawn_echo_server(None).await;
    backend.fail.store(true, Ordering::SeqCst);

    let translator =
        HttpBatchTranslator::new(&server.base_url, None, Duration::from_secs(5)).unwrap();
    let err = translator
        .translate_batch(&texts(&["Save"]), Language::HINDI)
        .await
        .unwrap_err();

    match err {
        TranslateError::Api { status, .. } => assert_eq!(status, 502),
        other => panic!("Expected Api error, got {:?}", other),
    }
    assert_eq!(state.metrics.batch_failures(), 1);
}

#[tokio::test]
async fn test_concurrent_requests_update_metrics() {
    let (server, backend, _) = spawn_echo_server(None).await;
    let translator = Arc::new(
        HttpBatchTranslator::new(&server.base_url, None, Duration::from_secs(5)).unwrap(),
    );

    let requests = (0..8).map(|i| {
        let translator = Arc::clone(&translator);
        let target = if i % 2 == 0 {
            Language::HINDI
        } else {
            Language::MARATHI
        };
        async move {
            translator
                .translate_batch(&texts(&["Worksheets", "Visual Aids"]), target)
                .await
        }
    });
    let results = futures::future::join_all(requests).await;
    assert!(results.iter().all(|r| r.is_ok()));
    assert_eq!(backend.calls.load(Ordering::SeqCst), 8);

    let report: serde_json::Value = reqwest::get(format!("{}/api/metrics", server.base_url))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(report["batches_sent"], 8);
    assert_eq!(report["batch_failures"], 0);
    assert_eq!(report["strings_translated"], 16);
    assert_eq!(report["batch_success_rate"], 100.0);
}

// ==================== Profiles ====================

#[tokio::test]
async fn test_profile_language_round_trip() {
    let (server, _, _) = spawn_echo_server(Some(TEST_API_KEY)).await;
    let client = reqwest::Client::new();
    let profile_url = format!("{}/api/profile/teacher-42", server.base_url);

    let missing = authed(client.get(&profile_url)).send().await.unwrap();
    assert_eq!(missing.status(), 404);

    let saved = authed(client.put(format!("{}/language", profile_url)))
        .json(&serde_json::json!({ "language": " MR " }))
        .send()
        .await
        .unwrap();
    assert_eq!(saved.status(), 200);
    let saved: serde_json::Value = saved.json().await.unwrap();
    assert_eq!(saved["language"], "mr");

    let loaded: serde_json::Value = authed(client.get(&profile_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(loaded["language"], "mr");
}

#[tokio::test]
async fn test_profile_rejects_unknown_language() {
    let (server, _, _) = spawn_echo_server(None).await;
    let client = reqwest::Client::new();

    let response = client
        .put(format!("{}/api/profile/teacher-42/language", server.base_url))
        .json(&serde_json::json!({ "language": "klingon" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    let profile = client
        .get(format!("{}/api/profile/teacher-42", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(profile.status(), 404);
}

// ==================== Translator End-to-End ====================

async fn wait_for_version(translator: &Translator) {
    let mut updates = translator.subscribe();
    tokio::time::timeout(Duration::from_secs(5), updates.changed())
        .await
        .expect("Timed out waiting for translations")
        .expect("Translator dropped");
}

#[tokio::test]
async fn test_translator_fills_cache_through_server() {
    let (server, backend, _) = spawn_echo_server(Some(TEST_API_KEY)).await;
    let http = HttpBatchTranslator::new(
        &server.base_url,
        Some(TEST_API_KEY.to_string()),
        Duration::from_secs(5),
    )
    .unwrap();
    let translator = Translator::new(
        Arc::new(http),
        TranslatorOptions::new()
            .with_debounce(Duration::from_millis(20))
            .with_batch_timeout(Duration::from_secs(5))
            .with_language(Language::HINDI),
    );

    let mut updates = translator.subscribe();

    // First render shows the original text and queues the strings
    assert_eq!(translator.t("Dashboard"), "Dashboard");
    assert_eq!(
        translator.t_with("Welcome back, {{name}}", &[("name", &"Anjali")]),
        "Welcome back, Anjali"
    );
    assert_eq!(translator.pending_len(), 2);

    tokio::time::timeout(Duration::from_secs(5), updates.changed())
        .await
        .expect("Timed out waiting for translations")
        .expect("Translator dropped");

    assert_eq!(translator.t("Dashboard"), "[hi] Dashboard");
    assert_eq!(
        translator.t_with("Welcome back, {{name}}", &[("name", &"Anjali")]),
        "[hi] Welcome back, Anjali"
    );
    assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    assert_eq!(translator.pending_len(), 0);
}

#[tokio::test]
async fn test_translator_switch_keeps_buckets_separate() {
    let (server, backend, _) = spawn_echo_server(None).await;
    let http = HttpBatchTranslator::new(&server.base_url, None, Duration::from_secs(5)).unwrap();
    let translator = Translator::new(
        Arc::new(http),
        TranslatorOptions::new()
            .with_debounce(Duration::from_millis(20))
            .with_language(Language::HINDI),
    );

    translator.t("Stories");
    wait_for_version(&translator).await;
    assert_eq!(translator.t("Stories"), "[hi] Stories");

    let snapshot = translator.set_language(Language::MARATHI);
    assert!(snapshot.is_empty());
    assert_eq!(translator.t("Stories"), "Stories");
    wait_for_version(&translator).await;
    assert_eq!(translator.t("Stories"), "[mr] Stories");

    // Switching back serves the earlier bucket without another call
    let snapshot = translator.set_language(Language::HINDI);
    assert_eq!(snapshot.get("Stories").map(String::as_str), Some("[hi] Stories"));
    assert_eq!(translator.t("Stories"), "[hi] Stories");
    assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_translator_keeps_original_text_when_server_fails() {
    let (server, backend, _) = spawn_echo_server(None).await;
    backend.fail.store(true, Ordering::SeqCst);
    let http = HttpBatchTranslator::new(&server.base_url, None, Duration::from_secs(5)).unwrap();
    let translator = Translator::new(
        Arc::new(http),
        TranslatorOptions::new()
            .with_debounce(Duration::from_secs(60))
            .with_language(Language::HINDI),
    );

    translator.t("Quizzes");
    let outcome = translator.flush().await;

    assert!(matches!(
        outcome,
        FlushOutcome::Failed { .. }
    ));
    assert_eq!(translator.t("Quizzes"), "Quizzes");
    assert_eq!(translator.metrics().batch_failures(), 1);
    assert!(!translator.is_in_flight());
}

// ==================== OpenAI Chain ====================

#[tokio::test]
async fn test_openai_backed_server_end_to_end() {
    let openai = MockServer::start().await;
    let content = serde_json::json!({ "translations": ["डैशबोर्ड"] }).to_string();

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [
                { "message": { "role": "assistant", "content": content } }
            ]
        })))
        .expect(1)
        .mount(&openai)
        .await;

    let client = OpenAiClient::new(
        reqwest::Client::new(),
        "test-openai-key",
        "gpt-4o-mini",
        &format!("{}/v1/chat/completions", openai.uri()),
    )
    .with_retry(RetryConfig::once());
    let backend = Arc::new(OpenAiBatchTranslator::new(client, 5));
    let server = spawn_server(create_state(backend, Some(TEST_API_KEY))).await;

    let http = HttpBatchTranslator::new(
        &server.base_url,
        Some(TEST_API_KEY.to_string()),
        Duration::from_secs(5),
    )
    .unwrap();
    let translator = Translator::new(
        Arc::new(http),
        TranslatorOptions::new()
            .with_debounce(Duration::from_millis(60_000))
            .with_language(Language::HINDI),
    );

    translator.t("Dashboard");
    let outcome = translator.flush().await;

    assert!(matches!(
        outcome,
        FlushOutcome::Translated { count: 1, .. }
    ));
    assert_eq!(translator.t("Dashboard"), "डैशबोर्ड");
}
