//! In-process provisioning server for integration tests
//!
//! Serves the subset of the `/api` surface the harness talks to, backed by
//! in-memory tables. Every request is recorded as `"METHOD path"` so tests
//! can assert call order.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use parking_lot::Mutex;
use provisioning_e2e::{ApiClient, HarnessConfig};
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

type Shared = Arc<Mutex<MockState>>;

struct TemplateRow {
    name: String,
    snippet: bool,
    template_kind_id: Option<u64>,
}

struct CombinationRow {
    template_id: u64,
    hostgroup_id: u64,
    environment_id: u64,
}

struct MockState {
    next_id: u64,
    environments: BTreeMap<u64, String>,
    hostgroups: BTreeMap<u64, String>,
    template_kinds: Vec<(u64, String)>,
    templates: BTreeMap<u64, TemplateRow>,
    combinations: BTreeMap<u64, CombinationRow>,
    requests: Vec<String>,
    failing_creates: HashSet<String>,
    failing_deletes: HashSet<String>,
    ignore_embedded_combinations: bool,
    keep_combinations_on_delete: bool,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            next_id: 100,
            environments: BTreeMap::new(),
            hostgroups: BTreeMap::new(),
            template_kinds: vec![(1, "provision".to_string()), (2, "PXELinux".to_string())],
            templates: BTreeMap::new(),
            combinations: BTreeMap::new(),
            requests: Vec::new(),
            failing_creates: HashSet::new(),
            failing_deletes: HashSet::new(),
            ignore_embedded_combinations: false,
            keep_combinations_on_delete: false,
        }
    }
}

impl MockState {
    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn record(&mut self, method: &str, path: String) {
        self.requests.push(format!("{} {}", method, path));
    }

    fn combination_json(&self, id: u64, row: &CombinationRow) -> Value {
        json!({
            "id": id,
            "provisioning_template_id": row.template_id,
            "provisioning_template_name": self.templates.get(&row.template_id).map(|t| t.name.clone()),
            "hostgroup_id": row.hostgroup_id,
            "hostgroup_name": self.hostgroups.get(&row.hostgroup_id),
            "environment_id": row.environment_id,
            "environment_name": self.environments.get(&row.environment_id),
        })
    }

    fn combinations_of(&self, template_id: u64) -> Vec<Value> {
        self.combinations
            .iter()
            .filter(|(_, row)| row.template_id == template_id)
            .map(|(id, row)| self.combination_json(*id, row))
            .collect()
    }

    fn template_json(&self, id: u64, row: &TemplateRow) -> Value {
        json!({
            "id": id,
            "name": row.name,
            "snippet": row.snippet,
            "template_kind_id": row.template_kind_id,
            "locked": false,
            "template_combinations": self.combinations_of(id),
        })
    }
}

fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"message": "Resource not found"})),
    )
        .into_response()
}

fn unprocessable(message: &str) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({"error": {"message": message}})),
    )
        .into_response()
}

fn payload_u64(value: &Value, key: &str) -> Option<u64> {
    value.get(key).and_then(Value::as_u64)
}

fn create_named(state: &Shared, collection: &str, key: &str, body: &Value) -> Response {
    let mut state = state.lock();
    state.record("POST", collection.to_string());
    if state.failing_creates.contains(collection) {
        return unprocessable("creation rejected");
    }
    let Some(name) = body[key]["name"].as_str().map(str::to_string) else {
        return unprocessable("name can't be blank");
    };

    let id = state.allocate_id();
    match collection {
        "environments" => state.environments.insert(id, name.clone()),
        _ => state.hostgroups.insert(id, name.clone()),
    };
    (StatusCode::CREATED, Json(json!({"id": id, "name": name}))).into_response()
}

fn delete_named(state: &Shared, collection: &str, id: u64) -> Response {
    let mut state = state.lock();
    state.record("DELETE", format!("{}/{}", collection, id));
    if state.failing_deletes.contains(collection) {
        return unprocessable("deletion rejected");
    }
    let removed = match collection {
        "environments" => state.environments.remove(&id),
        _ => state.hostgroups.remove(&id),
    };
    match removed {
        Some(name) => Json(json!({"id": id, "name": name})).into_response(),
        None => not_found(),
    }
}

async fn create_environment(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    create_named(&state, "environments", "environment", &body)
}

async fn delete_environment(State(state): State<Shared>, Path(id): Path<u64>) -> Response {
    delete_named(&state, "environments", id)
}

async fn create_hostgroup(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    create_named(&state, "hostgroups", "hostgroup", &body)
}

async fn delete_hostgroup(State(state): State<Shared>, Path(id): Path<u64>) -> Response {
    delete_named(&state, "hostgroups", id)
}

async fn list_template_kinds(State(state): State<Shared>) -> Response {
    let mut state = state.lock();
    state.record("GET", "template_kinds".to_string());
    let results: Vec<Value> = state
        .template_kinds
        .iter()
        .map(|(id, name)| json!({"id": id, "name": name}))
        .collect();
    Json(json!({
        "total": results.len(),
        "subtotal": results.len(),
        "page": 1,
        "per_page": 20,
        "results": results,
    }))
    .into_response()
}

async fn create_template(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut state = state.lock();
    state.record("POST", "provisioning_templates".to_string());
    if state.failing_creates.contains("provisioning_templates") {
        return unprocessable("creation rejected");
    }
    let draft = &body["provisioning_template"];
    let Some(name) = draft["name"].as_str().map(str::to_string) else {
        return unprocessable("name can't be blank");
    };

    let id = state.allocate_id();
    state.templates.insert(
        id,
        TemplateRow {
            name,
            snippet: draft["snippet"].as_bool().unwrap_or(false),
            template_kind_id: payload_u64(draft, "template_kind_id"),
        },
    );

    if !state.ignore_embedded_combinations {
        let attributes = draft["template_combinations_attributes"]
            .as_array()
            .cloned()
            .unwrap_or_default();
        for attrs in attributes {
            let (Some(hostgroup_id), Some(environment_id)) = (
                payload_u64(&attrs, "hostgroup_id"),
                payload_u64(&attrs, "environment_id"),
            ) else {
                continue;
            };
            let combination_id = state.allocate_id();
            state.combinations.insert(
                combination_id,
                CombinationRow {
                    template_id: id,
                    hostgroup_id,
                    environment_id,
                },
            );
        }
    }

    let row = &state.templates[&id];
    (StatusCode::CREATED, Json(state.template_json(id, row))).into_response()
}

async fn get_template(State(state): State<Shared>, Path(id): Path<u64>) -> Response {
    let mut state = state.lock();
    state.record("GET", format!("provisioning_templates/{}", id));
    match state.templates.get(&id) {
        Some(row) => Json(state.template_json(id, row)).into_response(),
        None => not_found(),
    }
}

async fn delete_template(State(state): State<Shared>, Path(id): Path<u64>) -> Response {
    let mut state = state.lock();
    state.record("DELETE", format!("provisioning_templates/{}", id));
    match state.templates.remove(&id) {
        Some(row) => {
            state.combinations.retain(|_, c| c.template_id != id);
            Json(json!({"id": id, "name": row.name})).into_response()
        }
        None => not_found(),
    }
}

async fn list_template_combinations(State(state): State<Shared>, Path(id): Path<u64>) -> Response {
    let mut state = state.lock();
    state.record("GET", format!("provisioning_templates/{}/template_combinations", id));
    if !state.templates.contains_key(&id) {
        return not_found();
    }
    let results = state.combinations_of(id);
    Json(json!({"total": results.len(), "subtotal": results.len(), "results": results}))
        .into_response()
}

async fn create_template_combination(
    State(state): State<Shared>,
    Path(id): Path<u64>,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock();
    state.record("POST", format!("provisioning_templates/{}/template_combinations", id));
    if !state.templates.contains_key(&id) {
        return not_found();
    }
    let draft = &body["template_combination"];
    let (Some(hostgroup_id), Some(environment_id)) = (
        payload_u64(draft, "hostgroup_id"),
        payload_u64(draft, "environment_id"),
    ) else {
        return unprocessable("hostgroup_id and environment_id are required");
    };

    let combination_id = state.allocate_id();
    let row = CombinationRow {
        template_id: id,
        hostgroup_id,
        environment_id,
    };
    let body = state.combination_json(combination_id, &row);
    state.combinations.insert(combination_id, row);
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn get_template_combination(State(state): State<Shared>, Path(id): Path<u64>) -> Response {
    let mut state = state.lock();
    state.record("GET", format!("template_combinations/{}", id));
    match state.combinations.get(&id) {
        Some(row) => Json(state.combination_json(id, row)).into_response(),
        None => not_found(),
    }
}

async fn delete_template_combination(
    State(state): State<Shared>,
    Path(id): Path<u64>,
) -> Response {
    let mut state = state.lock();
    state.record("DELETE", format!("template_combinations/{}", id));
    if state.failing_deletes.contains("template_combinations") {
        return unprocessable("deletion rejected");
    }
    if state.keep_combinations_on_delete {
        return match state.combinations.get(&id) {
            Some(row) => Json(state.combination_json(id, row)).into_response(),
            None => not_found(),
        };
    }
    match state.combinations.remove(&id) {
        Some(row) => {
            let body = state.combination_json(id, &row);
            Json(body).into_response()
        }
        None => not_found(),
    }
}

async fn status() -> Json<Value> {
    Json(json!({"result": "ok", "status": 200, "version": "3.9.0", "api_version": 2}))
}

fn build_router(state: Shared) -> Router {
    Router::new()
        .route("/api/status", get(status))
        .route("/api/environments", post(create_environment))
        .route(
            "/api/environments/:id",
            axum::routing::delete(delete_environment),
        )
        .route("/api/hostgroups", post(create_hostgroup))
        .route("/api/hostgroups/:id", axum::routing::delete(delete_hostgroup))
        .route("/api/template_kinds", get(list_template_kinds))
        .route("/api/provisioning_templates", post(create_template))
        .route(
            "/api/provisioning_templates/:id",
            get(get_template).delete(delete_template),
        )
        .route(
            "/api/provisioning_templates/:id/template_combinations",
            get(list_template_combinations).post(create_template_combination),
        )
        .route(
            "/api/template_combinations/:id",
            get(get_template_combination).delete(delete_template_combination),
        )
        .with_state(state)
}

/// Handle to a running mock server; the server stops when this is dropped.
pub struct MockServer {
    pub base_url: String,
    state: Shared,
    handle: JoinHandle<()>,
}

impl MockServer {
    pub async fn start() -> Self {
        let state: Shared = Arc::new(Mutex::new(MockState::default()));
        let router = build_router(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock server");
        let addr = listener.local_addr().expect("Mock server has no address");
        let handle = tokio::spawn(async move {
            axum::serve(listener, router)
                .await
                .expect("Mock server stopped unexpectedly");
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
            handle,
        }
    }

    pub fn config(&self) -> HarnessConfig {
        HarnessConfig::with_base_url(self.base_url.clone())
    }

    pub fn client(&self) -> ApiClient {
        ApiClient::new(&self.config()).expect("Failed to create API client")
    }

    /// Make `POST <collection>` answer 422
    pub fn fail_creates(&self, collection: &str) {
        self.state.lock().failing_creates.insert(collection.to_string());
    }

    /// Make `DELETE <collection>/<id>` answer 422
    pub fn fail_deletes(&self, collection: &str) {
        self.state.lock().failing_deletes.insert(collection.to_string());
    }

    /// Create templates without their embedded combinations
    pub fn ignore_embedded_combinations(&self) {
        self.state.lock().ignore_embedded_combinations = true;
    }

    /// Answer combination deletes with success but keep the row
    pub fn keep_combinations_on_delete(&self) {
        self.state.lock().keep_combinations_on_delete = true;
    }

    pub fn clear_template_kinds(&self) {
        self.state.lock().template_kinds.clear();
    }

    pub fn requests(&self) -> Vec<String> {
        self.state.lock().requests.clone()
    }

    /// Recorded requests with the given method, in order
    pub fn requests_with(&self, method: &str) -> Vec<String> {
        let prefix = format!("{} ", method);
        self.requests()
            .into_iter()
            .filter(|r| r.starts_with(&prefix))
            .collect()
    }

    pub fn environment_count(&self) -> usize {
        self.state.lock().environments.len()
    }

    pub fn hostgroup_count(&self) -> usize {
        self.state.lock().hostgroups.len()
    }

    pub fn template_count(&self) -> usize {
        self.state.lock().templates.len()
    }

    pub fn combination_count(&self) -> usize {
        self.state.lock().combinations.len()
    }

    pub fn template_kind_of(&self, template_id: u64) -> Option<u64> {
        self.state
            .lock()
            .templates
            .get(&template_id)
            .and_then(|t| t.template_kind_id)
    }

    /// True when nothing created through the API is left behind
    pub fn is_empty(&self) -> bool {
        let state = self.state.lock();
        state.environments.is_empty()
            && state.hostgroups.is_empty()
            && state.templates.is_empty()
            && state.combinations.is_empty()
    }

    /// Remove a combination behind the harness's back
    pub fn drop_combination(&self, id: u64) {
        self.state.lock().combinations.remove(&id);
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
