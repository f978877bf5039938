//! HTTP facade tests against an in-process mock backend.

use std::sync::{Arc, Mutex};

use axum::extract::{Path, RawQuery, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};

use odoo_panel::api::{GitHubBackend, PanelClient};
use odoo_panel::dashboard::fetch_frame;
use odoo_panel::errors::PanelError;
use odoo_panel::github::{ConnectStep, GitHubWorkflow};
use odoo_panel::session::Session;
use panel_common::{InstanceAction, LogQuery, NewProductionInstance, PanelUser};

const TOKEN: &str = "tok-123";

#[derive(Default)]
struct Recorded {
    queries: Vec<String>,
    bodies: Vec<Value>,
    paths: Vec<String>,
}

type Shared = Arc<Mutex<Recorded>>;

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {}", TOKEN))
        .unwrap_or(false)
}

async fn login(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["password"] == "secret" {
        (
            StatusCode::OK,
            Json(json!({
                "access_token": TOKEN,
                "refresh_token": "r",
                "user": {"id": 1, "username": body["username"], "role": "admin"}
            })),
        )
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Invalid credentials"})),
        )
    }
}

async fn instances(headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"msg": "Missing token"})));
    }
    (
        StatusCode::OK,
        Json(json!({"instances": [
            {"name": "panel4", "type": "production", "database": "panel4", "domain": "panel4.softrigx.com"},
            {"name": "dev-ana-panel4", "type": "development", "database": "dev-ana-panel4"},
            {"name": "legacy", "type": "staging"}
        ]})),
    )
}

async fn create_instance(State(rec): State<Shared>, Json(body): Json<Value>) -> Json<Value> {
    rec.lock().unwrap().bodies.push(body);
    Json(json!({"success": true, "message": "Instance queued"}))
}

async fn instance_action(
    State(rec): State<Shared>,
    Path((name, action)): Path<(String, String)>,
) -> Json<Value> {
    rec.lock().unwrap().paths.push(format!("{}/{}", name, action));
    Json(json!({"success": true}))
}

async fn logs(State(rec): State<Shared>, RawQuery(query): RawQuery) -> Json<Value> {
    rec.lock().unwrap().queries.push(query.unwrap_or_default());
    Json(json!({
        "logs": [{
            "id": 9, "action": "update_db", "instance_name": "panel4",
            "status": "success", "username": "ana",
            "timestamp": "2025-03-01T10:15:00.123456"
        }],
        "count": 1
    }))
}

async fn log_stats() -> Json<Value> {
    Json(json!({
        "total": 3, "success": 2, "errors": 1,
        "by_type": [{"action": "restart", "count": 3}]
    }))
}

async fn github_config(Path(instance): Path<String>) -> (StatusCode, Json<Value>) {
    if instance == "linked" {
        (
            StatusCode::OK,
            Json(json!({"success": true, "config": {
                "instance_name": "linked", "repo_owner": "acme",
                "repo_name": "erp-addons", "repo_branch": "linked"
            }})),
        )
    } else if instance == "fresh" {
        (
            StatusCode::OK,
            Json(json!({"success": false, "error": "GitHub not configured for this instance"})),
        )
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(json!({"success": false, "error": "Not configured"})),
        )
    }
}

async fn create_github_config(State(rec): State<Shared>, Json(body): Json<Value>) -> Json<Value> {
    rec.lock().unwrap().bodies.push(body);
    Json(json!({"success": true}))
}

async fn verify(Json(body): Json<Value>) -> Json<Value> {
    if body["token"] == "ghp_valid" {
        Json(json!({"success": true, "username": "octo", "name": "Octo Cat"}))
    } else {
        Json(json!({"success": false, "error": "Bad credentials"}))
    }
}

async fn ok() -> Json<Value> {
    Json(json!({"success": true}))
}

async fn status() -> Json<Value> {
    Json(json!({
        "success": true, "has_changes": true,
        "changes": [{"file": "sale_report/models.py", "status": "M"}]
    }))
}

async fn commit_rejected() -> Json<Value> {
    Json(json!({"success": false, "error": "nothing to commit, working tree clean"}))
}

async fn push_broken() -> (StatusCode, Json<Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"error": "remote rejected"})),
    )
}

async fn metrics_current() -> Json<Value> {
    Json(json!({
        "cpu": {"percent": 12.5, "count": 4, "count_logical": 8},
        "memory": {"percent": 40.0, "total_gb": 16.0, "used_gb": 6.4},
        "disk": [{"mountpoint": "/", "percent": 55.0}],
        "network": {},
        "system": {"hostname": "srv1", "uptime_formatted": "3d 4h"}
    }))
}

async fn metrics_history(RawQuery(query): RawQuery) -> Json<Value> {
    assert_eq!(query.as_deref(), Some("minutes=60"));
    Json(json!({"metrics": [{"cpu_percent": 10.0, "ram_percent": 30.0}], "count": 1}))
}

async fn backup_info() -> Json<Value> {
    Json(json!({
        "production_url": "https://prod.example.com",
        "manager_path": "/web/database/manager",
        "full_url": "https://prod.example.com/web/database/manager"
    }))
}

async fn backup_manager() -> &'static str {
    "<html><body>Backups</body></html>"
}

fn router(rec: Shared) -> Router {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/instances", get(instances))
        .route("/api/instances/production", post(create_instance))
        .route("/api/instances/{name}/{action}", post(instance_action))
        .route("/api/logs", get(logs))
        .route("/api/logs/stats", get(log_stats))
        .route("/api/metrics/current", get(metrics_current))
        .route("/api/metrics/history", get(metrics_history))
        .route("/api/backup/info", get(backup_info))
        .route("/api/backup/manager", get(backup_manager))
        .route("/api/github/config", post(create_github_config))
        .route("/api/github/config/{instance}", get(github_config))
        .route("/api/github/verify", post(verify))
        .route("/api/github/init/{instance}", post(ok))
        .route("/api/github/status/{instance}", get(status))
        .route("/api/github/commit/{instance}", post(commit_rejected))
        .route("/api/github/push/{instance}", post(push_broken))
        .route("/api/github/pull/{instance}", post(ok))
        .with_state(rec)
}

async fn spawn_backend() -> (String, Shared) {
    let rec: Shared = Arc::default();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = router(rec.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}", addr), rec)
}

fn authed(base_url: &str) -> PanelClient {
    let user = PanelUser {
        id: 1,
        username: "ana".to_string(),
        role: "admin".to_string(),
    };
    PanelClient::new(base_url, None)
        .unwrap()
        .with_session(Session::new(base_url, TOKEN, user))
}

// ── auth ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn login_returns_session() {
    let (url, _) = spawn_backend().await;
    let client = PanelClient::new(&url, None).unwrap();
    let session = client.login("ana", "secret").await.unwrap();
    assert_eq!(session.access_token, TOKEN);
    assert_eq!(session.user.username, "ana");
    assert!(session.user.is_admin());
    assert!(session.matches(&url));
}

#[tokio::test]
async fn login_wrong_password_is_remote_not_unauthorized() {
    let (url, _) = spawn_backend().await;
    let client = PanelClient::new(&url, None).unwrap();
    match client.login("ana", "nope").await.unwrap_err() {
        PanelError::Remote { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message.as_deref(), Some("Invalid credentials"));
        }
        other => panic!("Expected Remote, got {other:?}"),
    }
}

#[tokio::test]
async fn login_blank_fields_never_hit_network() {
    let client = PanelClient::new("http://127.0.0.1:9", None).unwrap();
    assert!(matches!(
        client.login(" ", "x").await,
        Err(PanelError::Validation(_))
    ));
}

// ── instances ────────────────────────────────────────────────────────

#[tokio::test]
async fn list_instances_requires_bearer_token() {
    let (url, _) = spawn_backend().await;
    let anonymous = PanelClient::new(&url, None).unwrap();
    assert!(anonymous.list_instances().await.unwrap_err().is_unauthorized());

    let instances = authed(&url).list_instances().await.unwrap();
    assert_eq!(instances.len(), 3);
    let grouped = panel_common::apply_all_filters(&instances, "panel4", "ANA");
    assert!(grouped.production.is_empty());
    assert_eq!(grouped.development.len(), 1);
}

#[tokio::test]
async fn create_instance_sends_sanitized_payload() {
    let (url, rec) = spawn_backend().await;
    let ack = authed(&url)
        .create_production_instance(&NewProductionInstance::new("Cliente #1!"))
        .await
        .unwrap();
    assert_eq!(ack.message.as_deref(), Some("Instance queued"));

    let body = rec.lock().unwrap().bodies[0].clone();
    assert_eq!(
        body,
        json!({"name": "cliente1", "version": "19", "edition": "enterprise", "ssl_method": "letsencrypt"})
    );
}

#[tokio::test]
async fn create_instance_rejects_empty_name() {
    let (url, rec) = spawn_backend().await;
    let err = authed(&url)
        .create_production_instance(&NewProductionInstance::new("###"))
        .await
        .unwrap_err();
    assert!(matches!(err, PanelError::Validation(_)));
    assert!(rec.lock().unwrap().bodies.is_empty());
}

#[tokio::test]
async fn instance_action_uses_registry_identifier() {
    let (url, rec) = spawn_backend().await;
    authed(&url)
        .run_instance_action("panel4", InstanceAction::SyncFilestore)
        .await
        .unwrap();
    assert_eq!(rec.lock().unwrap().paths, vec!["panel4/sync-filestore"]);
}

// ── logs ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn blank_log_filters_are_not_sent() {
    let (url, rec) = spawn_backend().await;
    let query = LogQuery::default()
        .with_instance("  ")
        .with_action("restart")
        .with_hours(6);
    let entries = authed(&url).action_logs(&query).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].action_label(), "update db");
    assert!(entries[0].timestamp.is_some());

    assert_eq!(rec.lock().unwrap().queries, vec!["action=restart&hours=6"]);
}

#[tokio::test]
async fn log_stats_success_rate() {
    let (url, _) = spawn_backend().await;
    let stats = authed(&url).log_stats(24).await.unwrap();
    assert_eq!(stats.success_rate(), 67);
    assert_eq!(stats.by_type[0].action, "restart");
}

// ── metrics & backup ─────────────────────────────────────────────────

#[tokio::test]
async fn dashboard_frame_fetches_both_endpoints() {
    let (url, _) = spawn_backend().await;
    let frame = fetch_frame(&authed(&url), 60).await.unwrap();
    assert_eq!(frame.current.system.hostname, "srv1");
    assert_eq!(frame.current.primary_disk().unwrap().percent, 55.0);
    assert_eq!(frame.history.average_cpu(), Some(10.0));
}

#[tokio::test]
async fn backup_endpoints() {
    let (url, _) = spawn_backend().await;
    let client = authed(&url);
    let info = client.backup_info().await.unwrap();
    assert!(info.full_url.ends_with("/web/database/manager"));
    let html = client.backup_manager_html().await.unwrap();
    assert!(html.contains("Backups"));
}

// ── github ───────────────────────────────────────────────────────────

#[tokio::test]
async fn missing_github_config_is_none() {
    let (url, _) = spawn_backend().await;
    let client = authed(&url);
    assert!(client.get_config("cliente1").await.unwrap().is_none());
    assert!(client.get_config("fresh").await.unwrap().is_none());
    let link = client.get_config("linked").await.unwrap().unwrap();
    assert_eq!(link.repo().to_string(), "acme/erp-addons");
}

#[tokio::test]
async fn success_false_maps_to_remote_with_message() {
    let (url, _) = spawn_backend().await;
    let err = authed(&url).commit("linked", "msg").await.unwrap_err();
    assert_eq!(
        err.user_message("Failed to create commit"),
        "nothing to commit, working tree clean"
    );
}

#[tokio::test]
async fn server_error_maps_to_remote_with_status() {
    let (url, _) = spawn_backend().await;
    match authed(&url).push("linked").await.unwrap_err() {
        PanelError::Remote { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message.as_deref(), Some("remote rejected"));
        }
        other => panic!("Expected Remote, got {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_backend_is_transport() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);
    let err = authed(&url).status("linked").await.unwrap_err();
    assert!(matches!(err, PanelError::Transport(_)));
}

#[tokio::test]
async fn workflow_connects_against_http_backend() {
    let (url, rec) = spawn_backend().await;
    let mut wf = GitHubWorkflow::new(authed(&url)).with_success_grace(std::time::Duration::ZERO);

    wf.open("cliente1").await.unwrap();
    assert_eq!(wf.step(), &ConnectStep::Input);

    wf.set_token("ghp_valid");
    wf.set_repo_url("https://github.com/acme/erp-addons.git");
    wf.submit().await.unwrap();
    assert!(matches!(wf.step(), ConnectStep::Success { .. }));

    let body = rec.lock().unwrap().bodies[0].clone();
    assert_eq!(body["repo_branch"], "cliente1");
    assert_eq!(body["repo_name"], "erp-addons");
    assert_eq!(
        body["local_path"],
        "/home/go/apps/develop/odoo-enterprise/cliente1/custom_addons"
    );

    wf.complete(|_| {}).await.unwrap();
    assert_eq!(wf.step(), &ConnectStep::Input);
}

#[tokio::test]
async fn workflow_rejected_token_lands_in_error() {
    let (url, _) = spawn_backend().await;
    let mut wf = GitHubWorkflow::new(authed(&url));
    wf.open("cliente1").await.unwrap();
    wf.set_token("ghp_revoked");
    wf.set_repo_url("github.com/acme/erp-addons");
    wf.submit().await.unwrap();
    assert_eq!(
        wf.step(),
        &ConnectStep::Error {
            message: "Bad credentials".to_string()
        }
    );
}

#[tokio::test]
async fn workflow_git_actions_on_linked_instance() {
    let (url, _) = spawn_backend().await;
    let mut wf = GitHubWorkflow::new(authed(&url));
    wf.open("linked").await.unwrap();

    let panel = wf.git_panel().unwrap();
    assert!(panel.status.as_ref().unwrap().has_changes);

    wf.pull().await.unwrap();
    assert!(matches!(
        wf.git_panel().unwrap().feedback,
        Some(odoo_panel::github::Feedback::Success(_))
    ));

    wf.set_commit_message("Update report");
    wf.commit().await.unwrap();
    let panel = wf.git_panel().unwrap();
    assert_eq!(panel.commit_message, "Update report");
    assert_eq!(
        panel.feedback,
        Some(odoo_panel::github::Feedback::Error(
            "nothing to commit, working tree clean".to_string()
        ))
    );
}
