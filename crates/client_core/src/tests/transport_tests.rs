use super::*;
use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Router,
};
use shared::error::DiscoveryErrorKind;
use tokio::{net::TcpListener, sync::Mutex};

const CAPABILITIES: &str = r#"<WMS_Capabilities version="1.3.0"><Capability><Layer><Layer><Name>ws1:roads</Name></Layer></Layer></Capability></WMS_Capabilities>"#;

#[derive(Clone, Default)]
struct ServerState {
    last_query: Arc<Mutex<Option<HashMap<String, String>>>>,
}

async fn handle_capabilities(
    State(state): State<ServerState>,
    Query(query): Query<HashMap<String, String>>,
) -> (StatusCode, &'static str) {
    *state.last_query.lock().await = Some(query);
    (StatusCode::OK, CAPABILITIES)
}

async fn handle_failure() -> (StatusCode, &'static str) {
    (StatusCode::INTERNAL_SERVER_ERROR, "boom")
}

async fn handle_slow() -> (StatusCode, &'static str) {
    tokio::time::sleep(Duration::from_secs(5)).await;
    (StatusCode::OK, CAPABILITIES)
}

async fn spawn_wms_server() -> anyhow::Result<(String, ServerState)> {
    let state = ServerState::default();
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let app = Router::new()
        .route("/geoserver/wms", get(handle_capabilities))
        .route("/broken/wms", get(handle_failure))
        .route("/slow/wms", get(handle_slow))
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}"), state))
}

fn source() -> HttpCapabilitiesSource {
    HttpCapabilitiesSource::new(Duration::from_secs(5)).expect("client")
}

#[tokio::test]
async fn fetches_capabilities_with_wms_query() {
    let (base, state) = spawn_wms_server().await.expect("server");
    let server_url = ServerUrl::parse(&format!("{base}/geoserver/")).expect("url");

    let body = source()
        .fetch_capabilities(&server_url)
        .await
        .expect("fetch");

    assert_eq!(body, CAPABILITIES);
    let query = state.last_query.lock().await.clone().expect("query recorded");
    assert_eq!(query.get("service").map(String::as_str), Some("WMS"));
    assert_eq!(query.get("version").map(String::as_str), Some("1.3.0"));
    assert_eq!(query.get("request").map(String::as_str), Some("GetCapabilities"));
}

#[tokio::test]
async fn non_success_status_is_connection_error() {
    let (base, _) = spawn_wms_server().await.expect("server");
    let server_url = ServerUrl::parse(&format!("{base}/broken")).expect("url");

    let err = source()
        .fetch_capabilities(&server_url)
        .await
        .expect_err("500 must fail");

    assert_eq!(err.kind(), DiscoveryErrorKind::Connection);
    assert!(err.message().contains("500"), "{err}");
}

#[tokio::test]
async fn missing_endpoint_is_connection_error() {
    let (base, _) = spawn_wms_server().await.expect("server");
    let server_url = ServerUrl::parse(&format!("{base}/nowhere")).expect("url");

    let err = source()
        .fetch_capabilities(&server_url)
        .await
        .expect_err("404 must fail");

    assert_eq!(err.kind(), DiscoveryErrorKind::Connection);
    assert!(err.message().contains("404"), "{err}");
}

#[tokio::test]
async fn unreachable_server_is_connection_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    let server_url = ServerUrl::parse(&format!("http://{addr}")).expect("url");

    let err = source()
        .fetch_capabilities(&server_url)
        .await
        .expect_err("refused");

    assert_eq!(err.kind(), DiscoveryErrorKind::Connection);
}

#[tokio::test]
async fn slow_server_times_out_as_connection_error() {
    let (base, _) = spawn_wms_server().await.expect("server");
    let server_url = ServerUrl::parse(&format!("{base}/slow")).expect("url");
    let source = HttpCapabilitiesSource::new(Duration::from_millis(200)).expect("client");

    let err = source
        .fetch_capabilities(&server_url)
        .await
        .expect_err("timeout");

    assert_eq!(err.kind(), DiscoveryErrorKind::Connection);
}
