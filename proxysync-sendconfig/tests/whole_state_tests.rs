use pretty_assertions::assert_eq;
use proxysync_sendconfig::mock::MockConfigService;
use proxysync_sendconfig::{
    DefaultContentConverter, ReloadError, SendConfigError, UpdateCause, UpdateProtocol,
    UpdateStrategy, WholeStateStrategy,
};
use proxysync_types::{Content, DeclarativeTarget, ResourceError, Route, Service};
use serde_json::Value;
use std::sync::Arc;

fn strategy(service: &Arc<MockConfigService>) -> WholeStateStrategy {
    WholeStateStrategy::new(service.clone(), Arc::new(DefaultContentConverter))
}

fn sample_content() -> Content {
    Content {
        services: vec![Service {
            name: "svc1".into(),
            host: Some("example.internal".into()),
            tags: vec!["t1".into()],
            ..Default::default()
        }],
        routes: vec![Route {
            name: "r1".into(),
            service: Some("svc1".into()),
            paths: vec!["/".into()],
            ..Default::default()
        }],
        ..Default::default()
    }
}

// ── Success ─────────────────────────────────────────────────────

#[tokio::test]
async fn accepted_reload_succeeds() {
    let service = Arc::new(MockConfigService::accepting());
    let target = DeclarativeTarget::new(sample_content()).unwrap();

    strategy(&service).update(&target).await.unwrap();

    assert_eq!(service.payloads().len(), 1);
    assert_eq!(service.flags(), vec![(true, true)]);
}

#[tokio::test]
async fn payload_is_versioned_declarative_config() {
    let service = Arc::new(MockConfigService::accepting());
    let target = DeclarativeTarget::new(sample_content()).unwrap();

    strategy(&service).update(&target).await.unwrap();

    let payload: Value = serde_json::from_slice(&service.payloads()[0]).unwrap();
    assert_eq!(payload["_format_version"], "3.0");
    assert_eq!(payload["services"][0]["name"], "svc1");
    assert_eq!(payload["routes"][0]["name"], "r1");
    assert!(payload.get("plugins").is_none());
}

#[tokio::test]
async fn same_target_yields_identical_payloads() {
    let service = Arc::new(MockConfigService::accepting());
    let strategy = strategy(&service);
    let target = DeclarativeTarget::new(sample_content()).unwrap();

    strategy.update(&target).await.unwrap();
    strategy.update(&target).await.unwrap();

    let payloads = service.payloads();
    assert_eq!(payloads.len(), 2);
    assert_eq!(payloads[0], payloads[1]);
}

// ── Rejection ───────────────────────────────────────────────────

#[tokio::test]
async fn rejection_reports_flattened_entity_errors() {
    let body = br#"{"flattened_errors":[{"entity_name":"svc1","entity_tags":["t1"],"errors":[{"field":"host","message":"required"}]}]}"#;
    let service = Arc::new(MockConfigService::rejecting(ReloadError::rejected(
        400,
        body.to_vec(),
    )));
    let target = DeclarativeTarget::with_hash(Content::default(), "abc123");

    let err = strategy(&service).update(&target).await.unwrap_err();

    assert_eq!(
        err.resource_errors(),
        &[ResourceError::new("svc1", "")
            .with_tag("t1")
            .with_problem("host", "required")]
    );
    assert_eq!(err.raw_error_body(), Some(&body[..]));
    let SendConfigError::Update(update) = &err else {
        panic!("expected update error, got {err:?}");
    };
    assert!(matches!(update.cause(), UpdateCause::Reload(r) if r.status == Some(400)));
}

#[tokio::test]
async fn unparseable_body_is_reported_with_raw_body() {
    let body = b"<html>502 Bad Gateway</html>";
    let service = Arc::new(MockConfigService::rejecting(ReloadError::rejected(
        502,
        body.to_vec(),
    )));
    let target = DeclarativeTarget::new(Content::default()).unwrap();

    let err = strategy(&service).update(&target).await.unwrap_err();

    assert!(err.resource_errors().is_empty());
    assert_eq!(err.raw_error_body(), Some(&body[..]));
    assert!(err.to_string().contains("failed to parse config error: HTTP status 502"));
}

#[tokio::test]
async fn transport_failure_skips_body_parsing() {
    let service = Arc::new(MockConfigService::rejecting(ReloadError::transport(
        "connection refused",
    )));
    let target = DeclarativeTarget::new(Content::default()).unwrap();

    let err = strategy(&service).update(&target).await.unwrap_err();

    assert!(err.resource_errors().is_empty());
    assert_eq!(err.raw_error_body(), None);
    assert!(!err.is_conflict());
    assert!(!err.to_string().contains("failed to parse"));
    let SendConfigError::Update(update) = &err else {
        panic!("expected update error, got {err:?}");
    };
    assert!(matches!(update.cause(), UpdateCause::Reload(r) if r.message == "connection refused"));
}

// ── Metadata ────────────────────────────────────────────────────

#[test]
fn reports_whole_state_protocol() {
    let service = Arc::new(MockConfigService::accepting());
    let strategy = strategy(&service);
    assert_eq!(strategy.metrics_protocol(), UpdateProtocol::WholeState);
    assert_eq!(strategy.metrics_protocol().to_string(), "whole-state");
    assert_eq!(strategy.kind(), "WholeState");
}
