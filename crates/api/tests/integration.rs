//! Integration tests for the API layer.
//!
//! These tests spin up a real HTTP server on a random port so that
//! `ConnectInfo<SocketAddr>` is populated correctly by axum.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use triage_api::{create_router, AppState, RateLimitConfig, RateLimiter};
use triage_common::{Result, TriageError};
use triage_core::TriageService;
use triage_knowledge::{KnowledgeEntry, KnowledgeIndex};
use triage_provider::{MockAnalyzer, ProviderGateway, RetryConfig, TicketAnalyzer};

fn sample_corpus() -> Vec<KnowledgeEntry> {
    vec![
        KnowledgeEntry {
            id: "kb-001".into(),
            title: "VPN error 800 on connect".into(),
            category: "Network".into(),
            symptoms: vec!["VPN disconnects".into(), "error 800".into()],
            recommended_action: "Verify the tunnel endpoint address.".into(),
        },
        KnowledgeEntry {
            id: "kb-002".into(),
            title: "Duplicate billing charge".into(),
            category: "Billing".into(),
            symptoms: vec!["charged twice".into()],
            recommended_action: "Refund the duplicate charge.".into(),
        },
    ]
}

fn fast_retry() -> RetryConfig {
    RetryConfig {
        attempts: 2,
        base_delay_ms: 5,
        backoff_factor: 2.0,
    }
}

fn mock_service(corpus: Vec<KnowledgeEntry>) -> TriageService {
    let gateway = ProviderGateway::new(
        Arc::new(MockAnalyzer::new()),
        Duration::from_secs(1),
        fast_retry(),
    );
    TriageService::new(gateway, Arc::new(KnowledgeIndex::new(corpus)), 3)
}

/// Spin up a test server and return the base URL.
async fn start_server(state: AppState) -> String {
    let router = create_router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    format!("http://{}", addr)
}

async fn start_default_server() -> String {
    let state = AppState::from_parts(
        mock_service(sample_corpus()),
        RateLimiter::new(RateLimitConfig::default()),
    );
    start_server(state).await
}

/// Helper to POST JSON and return (status, body, retry_after header).
async fn post_json(base: &str, path: &str, json: &str) -> (u16, String, Option<String>) {
    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{}{}", base, path))
        .header("content-type", "application/json")
        .body(json.to_string())
        .send()
        .await
        .unwrap();
    let status = resp.status().as_u16();
    let retry_after = resp
        .headers()
        .get("retry-after")
        .map(|v| v.to_str().unwrap().to_string());
    let body = resp.text().await.unwrap();
    (status, body, retry_after)
}

// ============================================================================
// Health endpoint
// ============================================================================

#[tokio::test]
async fn health_endpoint_reports_provider() {
    let base = start_default_server().await;
    let resp = reqwest::get(format!("{}/health", base)).await.unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["provider"], "mock");
}

// ============================================================================
// Triage endpoint
// ============================================================================

#[tokio::test]
async fn vpn_ticket_is_triaged_as_known_network_issue() {
    let base = start_default_server().await;
    let (status, body, _) = post_json(
        &base,
        "/api/v1/triage",
        r#"{"text": "I keep getting VPN error 800 when connecting"}"#,
    )
    .await;

    assert_eq!(status, 200);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["analysis"]["category"], "Network");
    assert_eq!(json["known_issue"], true);
    let titles: Vec<&str> = json["similar_issues"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["title"].as_str().unwrap())
        .collect();
    assert!(titles.iter().any(|t| t.contains("VPN")));
}

#[tokio::test]
async fn unknown_ticket_escalates() {
    let state = AppState::from_parts(
        mock_service(Vec::new()),
        RateLimiter::new(RateLimitConfig::default()),
    );
    let base = start_server(state).await;

    let (status, body, _) = post_json(&base, "/api/v1/triage", r#"{"text": "zzz"}"#).await;

    assert_eq!(status, 200);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["known_issue"], false);
    assert_eq!(
        json["suggested_action"],
        "Ask customer for more logs or escalate to engineering."
    );
}

#[tokio::test]
async fn blank_ticket_is_rejected_with_400() {
    let base = start_default_server().await;
    let (status, body, _) = post_json(&base, "/api/v1/triage", r#"{"text": "   "}"#).await;
    assert_eq!(status, 400);
    assert!(body.contains("EMPTY_TICKET"));
}

// ============================================================================
// Provider failure mapping
// ============================================================================

struct BrokenAnalyzer;

#[async_trait]
impl TicketAnalyzer for BrokenAnalyzer {
    async fn analyze(&self, _text: &str) -> Result<serde_json::Value> {
        Err(TriageError::Transport("backend unreachable".into()))
    }
    fn name(&self) -> &str {
        "broken"
    }
}

#[tokio::test]
async fn provider_failure_maps_to_502_without_detail() {
    let gateway = ProviderGateway::new(
        Arc::new(BrokenAnalyzer),
        Duration::from_secs(1),
        fast_retry(),
    );
    let service = TriageService::new(gateway, Arc::new(KnowledgeIndex::new(Vec::new())), 3);
    let state = AppState::from_parts(service, RateLimiter::new(RateLimitConfig::default()));
    let base = start_server(state).await;

    let (status, body, _) = post_json(&base, "/api/v1/triage", r#"{"text": "help"}"#).await;

    assert_eq!(status, 502);
    assert!(body.contains("PROVIDER_ERROR"));
    // Internal failure detail must not leak to the caller.
    assert!(!body.contains("backend unreachable"));
}

// ============================================================================
// Rate limiting
// ============================================================================

#[tokio::test]
async fn twenty_first_request_in_window_is_denied() {
    let base = start_default_server().await;

    for _ in 0..20 {
        let (status, _, _) = post_json(&base, "/api/v1/triage", r#"{"text": "vpn"}"#).await;
        assert_eq!(status, 200);
    }

    let (status, body, retry_after) =
        post_json(&base, "/api/v1/triage", r#"{"text": "vpn"}"#).await;
    assert_eq!(status, 429);
    assert!(body.contains("Rate limit exceeded"));

    let retry_after: u64 = retry_after.expect("Retry-After header").parse().unwrap();
    assert!(retry_after > 0 && retry_after <= 60);
}

#[tokio::test]
async fn health_is_exempt_from_rate_limiting() {
    let state = AppState::from_parts(
        mock_service(sample_corpus()),
        RateLimiter::new(RateLimitConfig {
            max_requests: 1,
            window: Duration::from_secs(60),
        }),
    );
    let base = start_server(state).await;

    let (status, _, _) = post_json(&base, "/api/v1/triage", r#"{"text": "vpn"}"#).await;
    assert_eq!(status, 200);
    let (status, _, _) = post_json(&base, "/api/v1/triage", r#"{"text": "vpn"}"#).await;
    assert_eq!(status, 429);

    // Health still answers.
    let resp = reqwest::get(format!("{}/health", base)).await.unwrap();
    assert_eq!(resp.status().as_u16(), 200);
}
