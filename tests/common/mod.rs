//! In-process mock of the ticket API, served by axum on a background
//! tokio runtime.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, mpsc};
use std::thread::{self, JoinHandle};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use axum::Json;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde_json::{Value, json};

use ticketdesk::app::App;
use ticketdesk::model::ClientConfig;
use ticketdesk::session::Credentials;
use ticketdesk::store::SharedStore;

const SECRET: &[u8] = b"mock-ticket-api";

pub const ALICE: u64 = 1;
pub const BOB: u64 = 2;
pub const ROOT: u64 = 9;
pub const API_VERSION: &str = "1.4.2";

#[derive(Clone, Debug)]
pub struct StoredTicket {
    pub owner: u64,
    pub public: bool,
    pub created: f64,
    /// Upload order is kept.
    pub files: Vec<(String, Vec<u8>)>,
}

pub struct MockState {
    pub users: BTreeMap<u64, Value>,
    pub codes: HashMap<String, u64>,
    pub tickets: BTreeMap<String, StoredTicket>,
    /// Status DELETE answers with; only 204 actually deletes.
    pub delete_status: StatusCode,
    /// When set, `PUT /oauth` answers with this status instead of a token.
    pub refresh_status: Option<StatusCode>,
    /// Canned error answers keyed by endpoint name (`version`, `list`,
    /// `modify`, `download`), sent once the caller is authenticated.
    pub failures: HashMap<&'static str, (StatusCode, Value)>,
    /// `Authorization` header of every request, in arrival order.
    pub seen_auth: Vec<Option<String>>,
    seq: u64,
}

impl MockState {
    fn new() -> Self {
        let mut users = BTreeMap::new();
        for (id, name, admin) in [(ALICE, "alice", false), (BOB, "bob", false), (ROOT, "root", true)] {
            users.insert(
                id,
                json!({
                    "id": id,
                    "username": name,
                    "global_name": null,
                    "avatar": null,
                    "is_admin": admin,
                    "display_name": name.to_uppercase(),
                    "display_avatar": format!("https://cdn.example/{name}.png"),
                }),
            );
        }
        let codes = [("alice-code", ALICE), ("root-code", ROOT)]
            .into_iter()
            .map(|(c, id)| (c.to_string(), id))
            .collect();
        Self {
            users,
            codes,
            tickets: BTreeMap::new(),
            delete_status: StatusCode::NO_CONTENT,
            refresh_status: None,
            failures: HashMap::new(),
            seen_auth: Vec::new(),
            seq: 0,
        }
    }

    fn next_ticket_id(&mut self) -> String {
        self.seq += 1;
        let now = time::OffsetDateTime::now_utc();
        format!(
            "{:04}-{:02}-{:02}T{:02}_{:02}_{:02}.{:06}H{:040x}",
            now.year(),
            u8::from(now.month()),
            now.day(),
            now.hour(),
            now.minute(),
            now.second(),
            self.seq,
            self.seq * 0x9e37_79b9
        )
    }

    /// Adds a ticket directly, bypassing the API.
    pub fn seed_ticket(&mut self, owner: u64, public: bool, files: &[(&str, &str)]) -> String {
        let id = self.next_ticket_id();
        self.tickets.insert(
            id.clone(),
            StoredTicket {
                owner,
                public,
                created: 1_700_000_000.0 + self.seq as f64,
                files: files
                    .iter()
                    .map(|(n, b)| (n.to_string(), b.as_bytes().to_vec()))
                    .collect(),
            },
        );
        id
    }
}

type Shared = Arc<Mutex<MockState>>;

pub struct MockApi {
    pub base_url: String,
    state: Shared,
    shutdown: Option<tokio::sync::oneshot::Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl Drop for MockApi {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

impl MockApi {
    pub fn state(&self) -> MutexGuard<'_, MockState> {
        lock(&self.state)
    }

    pub fn config(&self) -> ClientConfig {
        let mut cfg = ClientConfig::new(&self.base_url);
        cfg.request_timeout_secs = Some(10);
        cfg.oauth_url = Some("https://auth.example/authorize".to_string());
        cfg
    }

    pub fn token_for(&self, user: u64) -> String {
        let profile = self.state().users.get(&user).cloned().unwrap_or(Value::Null);
        mint_token(&profile)
    }

    /// Shell with `user`'s token already stored.
    pub fn app_for(&self, user: u64) -> Result<App> {
        let store = SharedStore::in_memory();
        let app = App::with_store(self.config(), store)?;
        app.context()
            .session()
            .sign_in(&Credentials::bearer(self.token_for(user)))?;
        Ok(app)
    }
}

fn lock(state: &Shared) -> MutexGuard<'_, MockState> {
    state.lock().unwrap_or_else(|p| p.into_inner())
}

fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

static MINTED: AtomicU64 = AtomicU64::new(0);

/// Signs `profile` as token claims. Every call yields a distinct token.
pub fn mint_token(profile: &Value) -> String {
    let mut claims = profile.clone();
    if let Some(map) = claims.as_object_mut() {
        map.insert("exp".to_string(), json!(now() + 3600));
        map.insert("iat".to_string(), json!(now()));
        map.insert("jti".to_string(), json!(MINTED.fetch_add(1, Ordering::Relaxed)));
    }
    encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET)).unwrap_or_default()
}

pub fn spawn_mock_api() -> Result<MockApi> {
    let state: Shared = Arc::new(Mutex::new(MockState::new()));
    let (addr_tx, addr_rx) = mpsc::channel::<std::io::Result<SocketAddr>>();
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    let app = router(state.clone());
    let thread = thread::spawn(move || {
        let rt = match tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
        {
            Ok(rt) => rt,
            Err(err) => {
                let _ = addr_tx.send(Err(err));
                return;
            }
        };
        rt.block_on(async move {
            let listener = match tokio::net::TcpListener::bind("127.0.0.1:0").await {
                Ok(l) => l,
                Err(err) => {
                    let _ = addr_tx.send(Err(err));
                    return;
                }
            };
            let _ = addr_tx.send(listener.local_addr());
            let _ = axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await;
        });
    });

    let addr = addr_rx
        .recv()
        .context("mock api thread exited")?
        .context("bind mock api")?;
    Ok(MockApi {
        base_url: format!("http://{}", addr),
        state,
        shutdown: Some(shutdown_tx),
        thread: Some(thread),
    })
}

fn router(state: Shared) -> Router {
    Router::new()
        .route("/version", get(version))
        .route("/oauth", axum::routing::post(oauth_exchange).put(oauth_refresh))
        .route(
            "/ticket",
            axum::routing::post(upload).put(modify).delete(remove),
        )
        .route("/ticket/:user", get(list))
        .route("/ticket/:user/:ticket", get(ticket_info))
        .route("/ticket/:user/:ticket/file", get(ticket_file))
        .route("/ticket/:user/:ticket/download", get(download))
        .route("/user/:id", get(user_profile))
        .with_state(state)
}

fn detail(status: StatusCode, detail: &str) -> Response {
    (status, Json(json!({ "detail": detail }))).into_response()
}

/// Validates the bearer token like the real server and returns the claims.
fn caller(state: &Shared, headers: &HeaderMap) -> Result<Value, Response> {
    let auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    lock(state).seen_auth.push(auth.clone());

    let Some(token) = auth.as_deref().and_then(|a| a.strip_prefix("Bearer ")) else {
        return Err(detail(StatusCode::FORBIDDEN, "Not authenticated"));
    };
    decode::<Value>(token, &DecodingKey::from_secret(SECRET), &Validation::default())
        .map(|data| data.claims)
        .map_err(|_| detail(StatusCode::FORBIDDEN, "Invalid authentication credentials"))
}

fn forced(state: &Shared, endpoint: &str) -> Option<Response> {
    lock(state)
        .failures
        .get(endpoint)
        .map(|(status, body)| (*status, Json(body.clone())).into_response())
}

fn claim_id(claims: &Value) -> u64 {
    claims.get("id").and_then(Value::as_u64).unwrap_or(0)
}

fn claim_admin(claims: &Value) -> bool {
    claims.get("is_admin").and_then(Value::as_bool).unwrap_or(false)
}

fn target_user(raw: &str, claims: &Value) -> Option<u64> {
    if raw == "@me" {
        Some(claim_id(claims))
    } else {
        raw.parse().ok()
    }
}

fn ticket_json(id: &str, t: &StoredTicket) -> Value {
    json!({
        "ticket_id": id,
        "author_id": t.owner,
        "create_utc_timestamp": t.created,
        "files": t.files.iter().map(|(n, _)| n.clone()).collect::<Vec<_>>(),
        "public": t.public,
    })
}

async fn version(State(state): State<Shared>) -> Response {
    if let Some(resp) = forced(&state, "version") {
        return resp;
    }
    Json(API_VERSION).into_response()
}

async fn oauth_exchange(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let code = body.get("code").and_then(Value::as_str).unwrap_or_default();
    let guard = lock(&state);
    let Some(profile) = guard.codes.get(code).and_then(|id| guard.users.get(id)) else {
        return detail(StatusCode::BAD_REQUEST, "Invalid code");
    };
    Json(json!({ "access_token": mint_token(profile), "token_type": "Bearer" })).into_response()
}

async fn oauth_refresh(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let claims = match caller(&state, &headers) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let guard = lock(&state);
    if let Some(status) = guard.refresh_status {
        return detail(status, "Refresh refused");
    }
    let profile = guard.users.get(&claim_id(&claims)).cloned().unwrap_or(claims);
    Json(json!({ "access_token": mint_token(&profile), "token_type": "Bearer" })).into_response()
}

async fn list(State(state): State<Shared>, headers: HeaderMap, Path(user): Path<String>) -> Response {
    let claims = match caller(&state, &headers) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    if let Some(resp) = forced(&state, "list") {
        return resp;
    }
    let Some(user) = target_user(&user, &claims) else {
        return detail(StatusCode::UNPROCESSABLE_ENTITY, "Invalid user id");
    };
    if user != claim_id(&claims) && !claim_admin(&claims) {
        return detail(StatusCode::FORBIDDEN, "Permission denied");
    }
    let ids: Vec<String> = lock(&state)
        .tickets
        .iter()
        .filter(|(_, t)| t.owner == user)
        .map(|(id, _)| id.clone())
        .collect();
    Json(ids).into_response()
}

async fn upload(State(state): State<Shared>, headers: HeaderMap, mut multipart: Multipart) -> Response {
    let claims = match caller(&state, &headers) {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    let mut files = Vec::new();
    let mut public = false;
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(_) => return detail(StatusCode::BAD_REQUEST, "Malformed form"),
        };
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("files") => {
                let name = field.file_name().unwrap_or_default().replace('\\', "/");
                match field.bytes().await {
                    Ok(bytes) => files.push((name, bytes.to_vec())),
                    Err(_) => return detail(StatusCode::BAD_REQUEST, "Malformed form"),
                }
            }
            Some("public") => {
                public = matches!(field.text().await.as_deref(), Ok("true"));
            }
            _ => {}
        }
    }
    if files.is_empty() {
        return detail(StatusCode::BAD_REQUEST, "Can't create empty ticket");
    }

    let mut guard = lock(&state);
    let id = guard.next_ticket_id();
    let created = 1_700_000_000.0 + guard.seq as f64;
    guard.tickets.insert(
        id.clone(),
        StoredTicket {
            owner: claim_id(&claims),
            public,
            created,
            files,
        },
    );
    (StatusCode::CREATED, Json(id)).into_response()
}

async fn modify(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> Response {
    let claims = match caller(&state, &headers) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    if let Some(resp) = forced(&state, "modify") {
        return resp;
    }
    let id = query.get("ticket_id").cloned().unwrap_or_default();
    let mut guard = lock(&state);
    let Some(ticket) = guard
        .tickets
        .get_mut(&id)
        .filter(|t| t.owner == claim_id(&claims))
    else {
        return detail(StatusCode::NOT_FOUND, "Ticket not found");
    };
    if let Some(public) = body.get("public").and_then(Value::as_bool) {
        ticket.public = public;
    }
    Json(ticket_json(&id, ticket)).into_response()
}

async fn remove(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let claims = match caller(&state, &headers) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let id = query.get("ticket_id").cloned().unwrap_or_default();
    let mut guard = lock(&state);
    let owned = guard
        .tickets
        .get(&id)
        .is_some_and(|t| t.owner == claim_id(&claims));
    if !owned {
        return detail(StatusCode::NOT_FOUND, "Ticket not found");
    }
    let status = guard.delete_status;
    if status == StatusCode::NO_CONTENT {
        guard.tickets.remove(&id);
        return StatusCode::NO_CONTENT.into_response();
    }
    (status, Json(json!({}))).into_response()
}

/// Looks a ticket up under `user` and applies the read permission rule.
fn readable(state: &Shared, claims: &Value, user: &str, id: &str) -> Result<StoredTicket, Response> {
    let Some(user) = target_user(user, claims) else {
        return Err(detail(StatusCode::UNPROCESSABLE_ENTITY, "Invalid user id"));
    };
    let guard = lock(state);
    let Some(ticket) = guard.tickets.get(id).filter(|t| t.owner == user) else {
        return Err(detail(StatusCode::NOT_FOUND, "Config data not found"));
    };
    if user != claim_id(claims) && !claim_admin(claims) && !ticket.public {
        return Err(detail(StatusCode::FORBIDDEN, "Permission denied"));
    }
    Ok(ticket.clone())
}

async fn ticket_info(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path((user, id)): Path<(String, String)>,
) -> Response {
    let claims = match caller(&state, &headers) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    match readable(&state, &claims, &user, &id) {
        Ok(ticket) => Json(ticket_json(&id, &ticket)).into_response(),
        Err(resp) => resp,
    }
}

async fn ticket_file(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path((user, id)): Path<(String, String)>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let claims = match caller(&state, &headers) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let ticket = match readable(&state, &claims, &user, &id) {
        Ok(t) => t,
        Err(resp) => return resp,
    };
    let wanted = query.get("filename").cloned().unwrap_or_default();
    let Some((_, bytes)) = ticket.files.iter().find(|(n, _)| *n == wanted) else {
        return detail(StatusCode::NOT_FOUND, "File not found");
    };
    match String::from_utf8(bytes.clone()) {
        Ok(text) => Json(text).into_response(),
        Err(_) => detail(StatusCode::BAD_REQUEST, "File is not text file"),
    }
}

async fn download(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path((user, id)): Path<(String, String)>,
) -> Response {
    let claims = match caller(&state, &headers) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    if let Some(resp) = forced(&state, "download") {
        return resp;
    }
    match readable(&state, &claims, &user, &id) {
        Ok(ticket) => {
            let mut body = b"PK".to_vec();
            for (name, bytes) in &ticket.files {
                body.extend_from_slice(name.as_bytes());
                body.extend_from_slice(bytes);
            }
            ([(header::CONTENT_TYPE, "application/zip")], body).into_response()
        }
        Err(resp) => resp,
    }
}

async fn user_profile(State(state): State<Shared>, headers: HeaderMap, Path(id): Path<u64>) -> Response {
    if let Err(resp) = caller(&state, &headers) {
        return resp;
    }
    match lock(&state).users.get(&id) {
        Some(profile) => Json(profile.clone()).into_response(),
        None => detail(StatusCode::NOT_FOUND, "User not found"),
    }
}
