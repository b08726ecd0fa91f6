use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

/// Credentials the mock accepts.
pub const USERNAME: &str = "admin";
pub const PASSWORD: &str = "twelve!12";

/// API versions the mock recognizes in the `api/{version}/` prefix.
pub const SUPPORTED_VERSIONS: &[&str] = &["1.1", "1.2", "1.3"];

const SESSION_COOKIE: &str = "mojolicious";

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cdn {
    pub id: i64,
    pub name: String,
    pub domain_name: String,
    #[serde(default)]
    pub dnssec_enabled: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCdn {
    pub name: String,
    pub domain_name: String,
    #[serde(default)]
    pub dnssec_enabled: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCdn {
    pub name: Option<String>,
    pub domain_name: Option<String>,
    pub dnssec_enabled: Option<bool>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryServiceServer {
    pub delivery_service: i64,
    pub server: i64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignServers {
    pub ds_id: i64,
    pub servers: Vec<i64>,
}

#[derive(Deserialize)]
pub struct LoginBody {
    pub u: String,
    pub p: String,
}

#[derive(Deserialize)]
pub struct PageQuery {
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

#[derive(Default)]
pub struct MockState {
    pub cdns: HashMap<i64, Cdn>,
    pub next_cdn_id: i64,
    pub assignments: Vec<DeliveryServiceServer>,
    pub sessions: HashSet<String>,
}

pub type Db = Arc<RwLock<MockState>>;

pub fn app() -> Router {
    app_with_state(Db::default())
}

pub fn app_with_state(db: Db) -> Router {
    Router::new()
        .route("/api/{version}/user/login", post(login))
        .route("/api/{version}/cdns", get(list_cdns).post(create_cdn))
        .route(
            "/api/{version}/cdns/{id}",
            get(get_cdn).put(update_cdn).delete(delete_cdn),
        )
        .route(
            "/api/{version}/deliveryserviceserver",
            get(list_assignments).post(assign_servers),
        )
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// `{"alerts":[{"level":..,"text":..}]}` — the envelope Traffic Ops uses for
/// every status report.
fn alerts(level: &str, text: &str) -> Json<Value> {
    Json(json!({"alerts": [{"level": level, "text": text}]}))
}

/// Successful payloads are wrapped in a `"response"` key.
fn wrap<T: Serialize>(value: T) -> Json<Value> {
    Json(json!({ "response": value }))
}

fn known_version(version: &str) -> bool {
    SUPPORTED_VERSIONS.contains(&version)
}

fn session_token(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE).then(|| value.to_string())
    })
}

/// Reject unknown versions and missing/unknown session cookies.
async fn authorize(db: &Db, version: &str, headers: &HeaderMap) -> Result<(), Response> {
    if !known_version(version) {
        return Err((
            StatusCode::NOT_FOUND,
            alerts("error", "unknown API version"),
        )
            .into_response());
    }
    let token = session_token(headers);
    let authorized = match token {
        Some(token) => db.read().await.sessions.contains(&token),
        None => false,
    };
    if authorized {
        Ok(())
    } else {
        Err((
            StatusCode::UNAUTHORIZED,
            alerts("error", "Unauthorized, please log in."),
        )
            .into_response())
    }
}

async fn login(
    State(db): State<Db>,
    Path(version): Path<String>,
    Json(body): Json<LoginBody>,
) -> Response {
    if !known_version(&version) {
        return (StatusCode::NOT_FOUND, alerts("error", "unknown API version")).into_response();
    }
    if body.u != USERNAME || body.p != PASSWORD {
        return (
            StatusCode::UNAUTHORIZED,
            alerts("error", "Invalid username or password."),
        )
            .into_response();
    }
    let token = Uuid::new_v4().to_string();
    db.write().await.sessions.insert(token.clone());
    (
        StatusCode::OK,
        [(
            header::SET_COOKIE,
            format!("{SESSION_COOKIE}={token}; Path=/"),
        )],
        alerts("success", "Successfully logged in."),
    )
        .into_response()
}

async fn list_cdns(
    State(db): State<Db>,
    Path(version): Path<String>,
    headers: HeaderMap,
) -> Response {
    if let Err(denied) = authorize(&db, &version, &headers).await {
        return denied;
    }
    let state = db.read().await;
    let mut cdns: Vec<Cdn> = state.cdns.values().cloned().collect();
    cdns.sort_by_key(|cdn| cdn.id);
    wrap(cdns).into_response()
}

async fn create_cdn(
    State(db): State<Db>,
    Path(version): Path<String>,
    headers: HeaderMap,
    Json(input): Json<CreateCdn>,
) -> Response {
    if let Err(denied) = authorize(&db, &version, &headers).await {
        return denied;
    }
    let mut state = db.write().await;
    state.next_cdn_id += 1;
    let cdn = Cdn {
        id: state.next_cdn_id,
        name: input.name,
        domain_name: input.domain_name,
        dnssec_enabled: input.dnssec_enabled,
    };
    state.cdns.insert(cdn.id, cdn.clone());
    (StatusCode::OK, wrap(cdn)).into_response()
}

async fn get_cdn(
    State(db): State<Db>,
    Path((version, id)): Path<(String, i64)>,
    headers: HeaderMap,
) -> Response {
    if let Err(denied) = authorize(&db, &version, &headers).await {
        return denied;
    }
    let state = db.read().await;
    match state.cdns.get(&id) {
        // By-id lookups answer with a one-element list, like Traffic Ops.
        Some(cdn) => wrap(vec![cdn.clone()]).into_response(),
        None => (StatusCode::NOT_FOUND, alerts("error", "not found")).into_response(),
    }
}

async fn update_cdn(
    State(db): State<Db>,
    Path((version, id)): Path<(String, i64)>,
    headers: HeaderMap,
    Json(input): Json<UpdateCdn>,
) -> Response {
    if let Err(denied) = authorize(&db, &version, &headers).await {
        return denied;
    }
    let mut state = db.write().await;
    let Some(cdn) = state.cdns.get_mut(&id) else {
        return (StatusCode::NOT_FOUND, alerts("error", "not found")).into_response();
    };
    if let Some(name) = input.name {
        cdn.name = name;
    }
    if let Some(domain_name) = input.domain_name {
        cdn.domain_name = domain_name;
    }
    if let Some(dnssec_enabled) = input.dnssec_enabled {
        cdn.dnssec_enabled = dnssec_enabled;
    }
    let cdn = cdn.clone();
    wrap(cdn).into_response()
}

async fn delete_cdn(
    State(db): State<Db>,
    Path((version, id)): Path<(String, i64)>,
    headers: HeaderMap,
) -> Response {
    if let Err(denied) = authorize(&db, &version, &headers).await {
        return denied;
    }
    let mut state = db.write().await;
    match state.cdns.remove(&id) {
        Some(_) => (StatusCode::OK, alerts("success", "cdn was deleted.")).into_response(),
        None => (StatusCode::NOT_FOUND, alerts("error", "not found")).into_response(),
    }
}

async fn list_assignments(
    State(db): State<Db>,
    Path(version): Path<String>,
    headers: HeaderMap,
    Query(paging): Query<PageQuery>,
) -> Response {
    if let Err(denied) = authorize(&db, &version, &headers).await {
        return denied;
    }
    let state = db.read().await;
    let limit = paging.limit.unwrap_or(state.assignments.len().max(1));
    let page = paging.page.unwrap_or(1).max(1);
    let start = (page - 1) * limit;
    let slice: Vec<DeliveryServiceServer> = state
        .assignments
        .iter()
        .skip(start)
        .take(limit)
        .cloned()
        .collect();
    wrap(slice).into_response()
}

async fn assign_servers(
    State(db): State<Db>,
    Path(version): Path<String>,
    headers: HeaderMap,
    Json(input): Json<AssignServers>,
) -> Response {
    if let Err(denied) = authorize(&db, &version, &headers).await {
        return denied;
    }
    let mut state = db.write().await;
    for server in &input.servers {
        state.assignments.push(DeliveryServiceServer {
            delivery_service: input.ds_id,
            server: *server,
        });
    }
    (
        StatusCode::OK,
        alerts("success", "server assignments complete"),
    )
        .into_response()
}
