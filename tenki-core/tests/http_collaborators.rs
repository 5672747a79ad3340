//! Page source and hosted gateway against local stand-in servers.

use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{Arc, Mutex},
};

use axum::{
    Json, Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    routing::get,
};
use serde_json::{Value, json};
use tenki_core::{
    FetchError, GatewayConfig, GatewayError, HttpPageSource, NewReading, ReadingGateway,
    SourceConfig, SupabaseGateway,
};

const PAGE: &str = include_str!("fixtures/observation.html");

async fn serve(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

fn source_config(addr: SocketAddr, path: &str) -> SourceConfig {
    SourceConfig { url: format!("http://{addr}{path}"), ..SourceConfig::default() }
}

#[tokio::test]
async fn page_source_returns_body_and_sends_browser_headers() {
    let router = Router::new().route(
        "/tenki",
        get(|headers: HeaderMap| async move {
            let ua = headers.get("user-agent").and_then(|v| v.to_str().ok()).unwrap_or("");
            let lang = headers.get("accept-language").and_then(|v| v.to_str().ok()).unwrap_or("");
            if ua.starts_with("Mozilla/5.0") && lang.starts_with("ja") {
                (StatusCode::OK, PAGE)
            } else {
                (StatusCode::FORBIDDEN, "bots not welcome")
            }
        }),
    );
    let addr = serve(router).await;

    let source = HttpPageSource::new(&source_config(addr, "/tenki")).unwrap();
    let body = tenki_core::PageSource::fetch_page(&source).await.unwrap();

    assert!(body.contains("observedValue"));
    assert!(body.contains("気温"));
}

#[tokio::test]
async fn page_source_reports_non_success_status() {
    let router = Router::new()
        .route("/tenki", get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "maintenance") }));
    let addr = serve(router).await;

    let source = HttpPageSource::new(&source_config(addr, "/tenki")).unwrap();
    let err = tenki_core::PageSource::fetch_page(&source).await.unwrap_err();

    match err {
        FetchError::Status { status, body } => {
            assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
            assert_eq!(body, "maintenance");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[derive(Clone, Default)]
struct FakeRest {
    rows: Arc<Mutex<Vec<Value>>>,
}

fn authorised(headers: &HeaderMap) -> bool {
    headers.get("apikey").and_then(|v| v.to_str().ok()) == Some("anon")
        && headers.get("authorization").and_then(|v| v.to_str().ok()) == Some("Bearer anon")
}

async fn rest_insert(
    State(rest): State<FakeRest>,
    headers: HeaderMap,
    Json(mut row): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if !authorised(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "message": "Invalid API key" })));
    }
    if headers.get("prefer").and_then(|v| v.to_str().ok()) != Some("return=representation") {
        return (StatusCode::CREATED, Json(json!([])));
    }

    let mut rows = rest.rows.lock().unwrap();
    let id = rows.len() as i64 + 1;
    row["id"] = json!(id);
    if row.get("created_at").is_none() {
        row["created_at"] = json!(format!("2026-01-12T22:{:02}:00.123456+00:00", 30 + id));
    }
    rows.push(row.clone());

    (StatusCode::CREATED, Json(json!([row])))
}

async fn rest_select(
    State(rest): State<FakeRest>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    if !authorised(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "message": "Invalid API key" })));
    }
    assert_eq!(params.get("select").map(String::as_str), Some("*"));
    assert_eq!(params.get("order").map(String::as_str), Some("created_at.desc"));

    let mut rows = rest.rows.lock().unwrap().clone();
    rows.reverse();
    (StatusCode::OK, Json(Value::Array(rows)))
}

async fn fake_supabase() -> (SocketAddr, FakeRest) {
    let rest = FakeRest::default();
    let router = Router::new()
        .route("/rest/v1/readings", get(rest_select).post(rest_insert))
        .with_state(rest.clone());
    (serve(router).await, rest)
}

fn gateway_config(addr: SocketAddr, key: &str) -> GatewayConfig {
    GatewayConfig {
        url: format!("http://{addr}/"),
        key: key.into(),
        ..GatewayConfig::default()
    }
}

#[tokio::test]
async fn gateway_roundtrips_exact_text() {
    let (addr, rest) = fake_supabase().await;
    let gw = SupabaseGateway::new(&gateway_config(addr, "anon")).unwrap();

    let stored = gw.insert(&NewReading::new("1.6", "2.3", "0.0")).await.unwrap();
    assert_eq!(stored.id, 1);
    assert_eq!(rest.rows.lock().unwrap().len(), 1);

    let rows = gw.select_all().await.unwrap();
    assert_eq!(rows, vec![stored]);
    assert_eq!(rows[0].temperature, "1.6");
    assert_eq!(rows[0].wind, "2.3");
    assert_eq!(rows[0].precipitation, "0.0");
}

#[tokio::test]
async fn gateway_returns_rows_newest_first() {
    let (addr, _rest) = fake_supabase().await;
    let gw = SupabaseGateway::new(&gateway_config(addr, "anon")).unwrap();

    gw.insert(&NewReading::new("1.0", "1.0", "0")).await.unwrap();
    gw.insert(&NewReading::new("2.0", "2.0", "0")).await.unwrap();

    let ids: Vec<i64> = gw.select_all().await.unwrap().iter().map(|r| r.id).collect();
    assert_eq!(ids, [2, 1]);
}

#[tokio::test]
async fn gateway_surfaces_auth_failures() {
    let (addr, rest) = fake_supabase().await;
    let gw = SupabaseGateway::new(&gateway_config(addr, "wrong")).unwrap();

    let err = gw.select_all().await.unwrap_err();
    assert!(matches!(err, GatewayError::Status { status, .. } if status == StatusCode::UNAUTHORIZED));

    let err = gw.insert(&NewReading::new("1.6", "2.3", "0.0")).await.unwrap_err();
    assert!(err.to_string().contains("Invalid API key"));
    assert!(rest.rows.lock().unwrap().is_empty());
}

#[tokio::test]
async fn gateway_reports_unreachable_host() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let gw = SupabaseGateway::new(&gateway_config(addr, "anon")).unwrap();
    let err = gw.select_all().await.unwrap_err();

    assert!(matches!(err, GatewayError::Request(_)));
}
