use pretty_assertions::assert_eq;
use proxysync_admin::{AdminClient, AdminConfig, AdminError};
use proxysync_sendconfig::{
    ConfigService, DefaultContentConverter, FetchOptions, StateFetcher, UpdateStrategy,
    WholeStateStrategy,
};
use proxysync_types::{
    Content, DeclarativeTarget, Entity, EntityKind, ProxyVersion, Service, TaggedEntity,
};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> AdminClient {
    AdminClient::new(AdminConfig::for_url(server.uri())).unwrap()
}

fn page(data: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"data": data, "next": null}))
}

async fn mount_empty(server: &MockServer, paths: &[&str]) {
    for p in paths {
        Mock::given(method("GET"))
            .and(path(*p))
            .respond_with(page(json!([])))
            .mount(server)
            .await;
    }
}

// ── Config ──────────────────────────────────────────────────────

#[test]
fn admin_config_default() {
    let cfg = AdminConfig::default();
    assert_eq!(cfg.base_url, "http://localhost:8001");
    assert_eq!(cfg.timeout_secs, 30);
    assert_eq!(cfg.token_header, "Kong-Admin-Token");
    assert!(cfg.token.is_none());
    assert_eq!(cfg.page_size, 1000);
}

#[test]
fn admin_config_partial_json_uses_defaults() {
    let cfg: AdminConfig = serde_json::from_str(r#"{"base_url": "http://kong:8001"}"#).unwrap();
    assert_eq!(cfg.base_url, "http://kong:8001");
    assert_eq!(cfg.page_size, 1000);
}

#[test]
fn empty_base_url_is_rejected() {
    let err = AdminClient::new(AdminConfig::for_url("")).unwrap_err();
    assert!(matches!(err, AdminError::Config(_)));
}

#[test]
fn invalid_token_header_is_rejected() {
    let cfg = AdminConfig {
        token_header: "bad header".into(),
        token: Some("secret".into()),
        ..Default::default()
    };
    assert!(matches!(AdminClient::new(cfg), Err(AdminError::Config(_))));
}

#[test]
fn trailing_slash_is_trimmed() {
    let client = AdminClient::new(AdminConfig::for_url("http://kong:8001/")).unwrap();
    assert_eq!(client.base_root_url(), "http://kong:8001");
    assert_eq!(StateFetcher::base_root_url(&client), "http://kong:8001");
}

// ── Version ─────────────────────────────────────────────────────

#[tokio::test]
async fn reads_version_from_root() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"version": "3.4.1.0-enterprise-edition"})),
        )
        .mount(&server)
        .await;

    let version = client(&server).version().await.unwrap();
    assert_eq!(version, ProxyVersion::new(3, 4, 1));
}

#[tokio::test]
async fn version_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
        .mount(&server)
        .await;

    let err = client(&server).version().await.unwrap_err();
    assert_eq!(err.status(), Some(401));
}

// ── Reload ──────────────────────────────────────────────────────

#[tokio::test]
async fn reload_posts_config_with_flags() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/config"))
        .and(query_param("check_hash", "1"))
        .and(query_param("flatten_errors", "1"))
        .and(body_json(json!({"_format_version": "3.0"})))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    client(&server)
        .reload_declarative_raw_config(br#"{"_format_version":"3.0"}"#.to_vec(), true, true)
        .await
        .unwrap();
}

#[tokio::test]
async fn reload_sends_admin_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/config"))
        .and(header("Kong-Admin-Token", "s3cret"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let cfg = AdminConfig {
        token: Some("s3cret".into()),
        ..AdminConfig::for_url(server.uri())
    };
    AdminClient::new(cfg)
        .unwrap()
        .reload(b"{}".to_vec(), true, true)
        .await
        .unwrap();
}

#[tokio::test]
async fn reload_rejection_keeps_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/config"))
        .respond_with(ResponseTemplate::new(400).set_body_string(r#"{"code":14}"#))
        .mount(&server)
        .await;

    let err = client(&server).reload(b"{}".to_vec(), true, true).await.unwrap_err();
    assert_eq!(err.status, Some(400));
    assert_eq!(err.body, br#"{"code":14}"#.to_vec());
}

#[tokio::test]
async fn reload_transport_failure_has_no_status() {
    let client = AdminClient::new(AdminConfig {
        timeout_secs: 2,
        ..AdminConfig::for_url("http://127.0.0.1:1")
    })
    .unwrap();

    let err = client.reload(b"{}".to_vec(), true, true).await.unwrap_err();
    assert_eq!(err.status, None);
    assert!(err.body.is_empty());
}

#[tokio::test]
async fn whole_state_push_reports_entity_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/config"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "code": 14,
            "message": "declarative config is invalid",
            "flattened_errors": [{
                "entity_name": "svc1",
                "entity_type": "service",
                "entity_tags": ["origin-name:web", "origin-namespace:default"],
                "errors": [{"field": "host", "message": "required field missing"}]
            }]
        })))
        .mount(&server)
        .await;

    let strategy = WholeStateStrategy::new(
        Arc::new(client(&server)),
        Arc::new(DefaultContentConverter),
    );
    let target = DeclarativeTarget::new(Content {
        services: vec![Service {
            name: "svc1".into(),
            ..Default::default()
        }],
        ..Default::default()
    })
    .unwrap();

    let err = strategy.update(&target).await.unwrap_err();
    let errors = err.resource_errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, "service");
    assert_eq!(errors[0].problems["host"], "required field missing");
    let origin = errors[0].origin().unwrap();
    assert_eq!(origin.name, "web");
    assert_eq!(origin.namespace.as_deref(), Some("default"));
}

// ── Live state ──────────────────────────────────────────────────

#[tokio::test]
async fn fetch_state_follows_pages_and_resolves_references() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/services"))
        .and(query_param("size", "1000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "s-1", "name": "svc1", "host": "a.internal", "tags": null}],
            "next": "/services/page2"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/services/page2"))
        .respond_with(page(json!([{"id": "s-2", "name": "svc2", "tags": ["t"]}])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/routes"))
        .respond_with(page(json!([
            {"id": "r-1", "name": "r1", "service": {"id": "s-2"}, "paths": ["/"], "hosts": null}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/upstreams"))
        .respond_with(page(json!([{"id": "u-1", "name": "up1"}])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/upstreams/u-1/targets"))
        .respond_with(page(json!([
            {"id": "t-1", "upstream": {"id": "u-1"}, "target": "10.0.0.1:80", "weight": 100}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/consumers"))
        .respond_with(page(json!([{"id": "c-1", "username": "alice"}])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/plugins"))
        .respond_with(page(json!([
            {"id": "p-1", "name": "key-auth", "consumer": {"id": "c-1"}, "route": null,
             "config": {"key_names": ["apikey"], "anonymous": null}}
        ])))
        .mount(&server)
        .await;

    let state = client(&server)
        .fetch_state(&FetchOptions::default())
        .await
        .unwrap();

    assert_eq!(state.len(), 7);
    assert_eq!(state.of_kind(EntityKind::Service).count(), 2);

    let Some(Entity::Route(route)) = state.of_kind(EntityKind::Route).next() else {
        panic!("expected a route");
    };
    assert_eq!(route.service.as_deref(), Some("svc2"));
    assert!(route.hosts.is_empty());

    let Some(Entity::Target(target)) = state.of_kind(EntityKind::Target).next() else {
        panic!("expected a target");
    };
    assert_eq!(target.upstream, "up1");
    assert_eq!(target.weight, Some(100));

    let Some(Entity::Plugin(plugin)) = state.of_kind(EntityKind::Plugin).next() else {
        panic!("expected a plugin");
    };
    assert_eq!(plugin.consumer.as_deref(), Some("alice"));
    assert!(plugin.route.is_none());
}

#[tokio::test]
async fn fetch_state_filters_tags_and_skips_consumers() {
    let server = MockServer::start().await;
    for p in ["/services", "/routes", "/upstreams", "/plugins"] {
        Mock::given(method("GET"))
            .and(path(p))
            .and(query_param("tags", "managed,team-a"))
            .respond_with(page(json!([])))
            .expect(1)
            .mount(&server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/consumers"))
        .respond_with(page(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let options = FetchOptions {
        select_tags: vec!["managed".into(), "team-a".into()],
        skip_consumers: true,
    };
    let state = client(&server).fetch_state(&options).await.unwrap();
    assert!(state.is_empty());
}

#[tokio::test]
async fn fetch_state_error_names_path() {
    let server = MockServer::start().await;
    mount_empty(&server, &["/services"]).await;
    Mock::given(method("GET"))
        .and(path("/routes"))
        .respond_with(ResponseTemplate::new(500).set_body_string("database unavailable"))
        .mount(&server)
        .await;

    let err = client(&server)
        .fetch_state(&FetchOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert!(err.to_string().contains("/routes"));
}

#[tokio::test]
async fn malformed_record_is_reported_with_kind() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/services"))
        .respond_with(page(json!([{"id": "s-1", "name": "svc1", "port": "eighty"}])))
        .mount(&server)
        .await;

    let err = client(&server)
        .fetch_state(&FetchOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AdminError::Record { kind: "service", .. }));
}

#[tokio::test]
async fn state_fetcher_boxes_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/services"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let client = client(&server);
    let fetcher: &dyn StateFetcher = &client;
    let err = fetcher
        .fetch_state(&FetchOptions::default())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("403"));
}

#[tokio::test]
async fn fetch_state_accepts_unnamed_entities() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/services"))
        .respond_with(page(json!([
            {"id": "s-1", "name": null, "host": "example.com", "port": 80, "tags": null}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/routes"))
        .respond_with(page(json!([
            {"id": "r-1", "name": null, "service": {"id": "s-1"}, "paths": ["/"]}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/consumers"))
        .respond_with(page(json!([{"id": "c-1", "username": null, "custom_id": "ext-42"}])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/plugins"))
        .respond_with(page(json!([
            {"id": "p-1", "name": "key-auth", "consumer": {"id": "c-1"}}
        ])))
        .mount(&server)
        .await;
    mount_empty(&server, &["/upstreams"]).await;

    let state = client(&server)
        .fetch_state(&FetchOptions::default())
        .await
        .unwrap();
    assert_eq!(state.len(), 4);

    let names: Vec<_> = state
        .entities
        .iter()
        .filter_map(|e| e.as_tagged())
        .map(|e| e.name().to_string())
        .collect();
    assert_eq!(names, vec!["s-1", "r-1", "key-auth", "ext-42"]);

    let Some(Entity::Route(route)) = state.of_kind(EntityKind::Route).next() else {
        panic!("expected a route");
    };
    assert_eq!(route.service.as_deref(), Some("s-1"));

    let Some(Entity::Plugin(plugin)) = state.of_kind(EntityKind::Plugin).next() else {
        panic!("expected a plugin");
    };
    assert_eq!(plugin.consumer.as_deref(), Some("c-1"));
}
