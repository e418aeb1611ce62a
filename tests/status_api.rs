mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use pgo_status::config::VERSION;
use pgo_status::k8s::resource::ResourceKind;
use pgo_status::server::router;
use pgo_status::status::envelope::{STATUS_REPORT_ERROR, VERSION_MISMATCH_ERROR};
use pgo_status::status::{ResponseCode, StatusResponse};

use common::{FakeGateway, populated_gateway, test_app};

async fn get(app: axum::Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, body.to_vec())
}

async fn get_status(app: axum::Router, uri: &str) -> StatusResponse {
    let (status, body) = get(app, uri).await;
    assert_eq!(status, StatusCode::OK);
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn status_returns_full_report() {
    let app = test_app(populated_gateway(), vec![]);
    let response = get_status(router(app.state), "/status?namespace=pgo").await;

    assert_eq!(response.status.code, ResponseCode::Ok);
    let report = response.result;
    assert!(report.operator_start_time.starts_with("2024-05-01T10:00:00"));
    assert_eq!(report.num_databases, 2);
    assert_eq!(report.num_claims, 2);
    assert_eq!(report.num_backups, 1);
    assert_eq!(report.volume_cap, "8Gi");
    assert_eq!(report.db_tags["crunchy-postgres:13"], 2);
    assert_eq!(report.not_ready, vec!["rhino"]);
    assert_eq!(report.nodes[0].name, "worker-1");
    assert_eq!(report.nodes[0].status, "Ready");
    assert_eq!(report.labels[0].key, "vendor=crunchydata");
    assert_eq!(report.labels[0].value, 2);
}

#[tokio::test]
async fn status_wire_format_uses_api_field_names() {
    let app = test_app(populated_gateway(), vec![]);
    let (_, body) = get(router(app.state), "/status?namespace=pgo").await;
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json["Status"]["Code"], "ok");
    assert_eq!(json["Result"]["VolumeCap"], "8Gi");
    assert_eq!(json["Result"]["NumDatabases"], 2);
    assert!(json["Result"]["DbTags"].is_object());
    assert!(json["Result"]["Labels"][0]["Key"].is_string());
}

#[tokio::test]
async fn failing_kind_still_answers_ok() {
    let gateway = populated_gateway().failing(ResourceKind::PersistentVolumeClaim);
    let app = test_app(gateway, vec![]);
    let response = get_status(router(app.state), "/status?namespace=pgo").await;

    assert_eq!(response.status.code, ResponseCode::Ok);
    assert_eq!(response.result.num_claims, 0);
    assert_eq!(response.result.volume_cap, "error");
    assert_eq!(response.result.num_databases, 2);
}

#[tokio::test]
async fn version_mismatch_skips_queries() {
    let app = test_app(populated_gateway(), vec![]);
    let gateway = app.gateway.clone();
    let response = get_status(router(app.state), "/status?namespace=pgo&version=0.0.1-old").await;

    assert_eq!(response.status.code, ResponseCode::Error);
    assert_eq!(response.status.msg, VERSION_MISMATCH_ERROR);
    assert_eq!(response.result.num_databases, 0);
    assert_eq!(gateway.call_count(), 0);
}

#[tokio::test]
async fn matching_version_is_accepted() {
    let app = test_app(populated_gateway(), vec![]);
    let uri = format!("/status?namespace=pgo&version={}", VERSION);
    let response = get_status(router(app.state), &uri).await;
    assert_eq!(response.status.code, ResponseCode::Ok);
}

#[tokio::test]
async fn missing_namespace_is_an_error_envelope() {
    let app = test_app(populated_gateway(), vec![]);
    let response = get_status(router(app.state), "/status").await;

    assert_eq!(response.status.code, ResponseCode::Error);
    assert_eq!(response.status.msg, STATUS_REPORT_ERROR);
}

#[tokio::test]
async fn undecodable_query_is_an_error_envelope() {
    let app = test_app(populated_gateway(), vec![]);
    let gateway = app.gateway.clone();
    let router = router(app.state);

    let response = get_status(router.clone(), "/status?namespace=pgo&namespace=demo").await;
    assert_eq!(response.status.code, ResponseCode::Error);
    assert_eq!(response.status.msg, STATUS_REPORT_ERROR);
    assert_eq!(response.result.num_databases, 0);
    assert_eq!(gateway.call_count(), 0);

    let (_, body) = get(router, "/metrics").await;
    let text = String::from_utf8(body).unwrap();
    assert!(text.contains("pgo_status_requests_total{code=\"error\"} 1"));
}

#[tokio::test]
async fn unwatched_namespace_is_an_error_envelope() {
    let app = test_app(FakeGateway::default(), vec!["pgo".to_string()]);
    let gateway = app.gateway.clone();
    let response = get_status(router(app.state), "/status?namespace=kube-system").await;

    assert_eq!(response.status.code, ResponseCode::Error);
    assert_eq!(response.status.msg, STATUS_REPORT_ERROR);
    assert!(!response.status.msg.contains("kube-system"));
    assert_eq!(gateway.call_count(), 0);
}

#[tokio::test]
async fn shutdown_token_cancels_composition() {
    let app = test_app(populated_gateway(), vec![]);
    app.state.cancel.cancel();
    let response = get_status(router(app.state), "/status?namespace=pgo").await;

    assert_eq!(response.status.code, ResponseCode::Ok);
    assert_eq!(response.result.operator_start_time, "error");
    assert_eq!(response.result.volume_cap, "error");
    assert_eq!(response.result.num_databases, 0);
}

#[tokio::test]
async fn health_endpoints() {
    let app = test_app(FakeGateway::default(), vec![]);
    let health = app.state.health.clone();
    let router = router(app.state);

    let (status, _) = get(router.clone(), "/healthz").await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = get(router.clone(), "/readyz").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    health.set_ready(true);
    let (status, _) = get(router, "/readyz").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn metrics_count_responses_and_failures() {
    let gateway = populated_gateway().failing(ResourceKind::Node);
    let app = test_app(gateway, vec![]);
    let router = router(app.state);

    get_status(router.clone(), "/status?namespace=pgo").await;
    get_status(router.clone(), "/status").await;

    let (status, body) = get(router, "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    let text = String::from_utf8(body).unwrap();
    assert!(text.contains("pgo_status_requests_total{code=\"ok\"} 1"));
    assert!(text.contains("pgo_status_requests_total{code=\"error\"} 1"));
    assert!(text.contains("pgo_status_extractor_failures_total{extractor=\"nodes\"} 1"));
}
