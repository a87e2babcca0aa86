//! Fake record store
//!
//! A real HTTP server on an ephemeral local port that serves the record store
//! endpoints from memory. Responses can be overridden, scripted to fail a
//! number of times, or delayed, and every request path is counted.

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use serde_json::{json, Value};

#[derive(Clone)]
struct Canned {
    status: StatusCode,
    body: String,
}

#[derive(Default)]
struct StoreState {
    routes: HashMap<String, Canned>,
    selections: HashMap<i64, Vec<i64>>,
    selection_pages: HashMap<i64, Vec<Vec<i64>>>,
    base_url: String,
    scripted_failures: Mutex<HashMap<String, VecDeque<StatusCode>>>,
    delays: HashMap<String, Duration>,
    required_token: Option<String>,
    hits: Mutex<HashMap<String, usize>>,
}

/// Builder for a fake record store
#[derive(Default)]
pub struct FakeRecordStore {
    state: StoreState,
}

impl FakeRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_json(mut self, path: String, body: Value) -> Self {
        self.state.routes.insert(
            path,
            Canned {
                status: StatusCode::OK,
                body: body.to_string(),
            },
        );
        self
    }

    /// Serve `GET /policies/{id}`; decimals are given as the store renders them
    pub fn with_policy(self, id: i64, base_premium: &str) -> Self {
        self.with_json(
            format!("/policies/{}", id),
            json!({ "id": id, "name": format!("Policy {}", id), "base_premium": base_premium }),
        )
    }

    pub fn with_customer(
        self,
        id: i64,
        age: i64,
        smoker: bool,
        has_illness: bool,
        region: &str,
    ) -> Self {
        self.with_json(
            format!("/customers/{}", id),
            json!({
                "id": id,
                "name": format!("Customer {}", id),
                "age": age,
                "smoker": smoker,
                "has_illness": has_illness,
                "region": region,
            }),
        )
    }

    pub fn with_region(self, name: &str, multiplier: &str) -> Self {
        self.with_json(
            format!("/regions/{}", urlencoding::encode(name)),
            json!({ "name": name, "multiplier": multiplier }),
        )
    }

    pub fn with_coverage(self, id: i64, cost: &str) -> Self {
        self.with_json(
            format!("/coverages/{}", id),
            json!({ "id": id, "name": format!("Coverage {}", id), "cost": cost }),
        )
    }

    /// Add a selection to `GET /customers/{customer_id}/coverages/`
    pub fn with_selection(mut self, customer_id: i64, coverage_id: i64) -> Self {
        self.state
            .selections
            .entry(customer_id)
            .or_default()
            .push(coverage_id);
        self
    }

    /// Serve the customer's selections as a paginated envelope, one page per
    /// slice, linked through absolute `next` URLs (`?page=2`, `?page=3`, ...)
    pub fn with_selection_pages(mut self, customer_id: i64, pages: &[&[i64]]) -> Self {
        self.state
            .selection_pages
            .insert(customer_id, pages.iter().map(|page| page.to_vec()).collect());
        self
    }

    /// Answer `path` (optionally with `?query`) with a fixed status and raw body
    pub fn with_response(mut self, path: &str, status: u16, body: &str) -> Self {
        self.state.routes.insert(
            path.to_string(),
            Canned {
                status: StatusCode::from_u16(status).unwrap(),
                body: body.to_string(),
            },
        );
        self
    }

    /// Answer the next `times` requests for `path` with `status`
    pub fn fail_next(self, path: &str, status: u16, times: usize) -> Self {
        {
            let mut failures = self.state.scripted_failures.lock().unwrap();
            let queue = failures.entry(path.to_string()).or_default();
            for _ in 0..times {
                queue.push_back(StatusCode::from_u16(status).unwrap());
            }
        }
        self
    }

    /// Wait `delay` before answering requests for `path`
    pub fn with_delay(mut self, path: &str, delay: Duration) -> Self {
        self.state.delays.insert(path.to_string(), delay);
        self
    }

    /// Reject requests that do not carry `Authorization: Bearer <token>`
    pub fn require_token(mut self, token: &str) -> Self {
        self.state.required_token = Some(token.to_string());
        self
    }

    /// Start serving on 127.0.0.1 with an ephemeral port
    pub async fn spawn(mut self) -> RunningRecordStore {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        self.state.base_url = format!("http://{}", addr);

        let state = Arc::new(self.state);
        let app = Router::new().fallback(serve).with_state(state.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        RunningRecordStore { addr, state }
    }
}

/// Handle to a fake record store that is accepting requests
pub struct RunningRecordStore {
    addr: SocketAddr,
    state: Arc<StoreState>,
}

impl RunningRecordStore {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Number of requests received for `path` (as sent, percent-encoded)
    pub fn hits(&self, path: &str) -> usize {
        self.state
            .hits
            .lock()
            .unwrap()
            .get(path)
            .copied()
            .unwrap_or(0)
    }
}

async fn serve(State(state): State<Arc<StoreState>>, headers: HeaderMap, uri: Uri) -> Response {
    let path = uri.path().to_string();
    *state.hits.lock().unwrap().entry(path.clone()).or_insert(0) += 1;

    if let Some(delay) = state.delays.get(&path) {
        tokio::time::sleep(*delay).await;
    }

    if let Some(token) = &state.required_token {
        let expected = format!("Bearer {}", token);
        let presented = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());
        if presented != Some(expected.as_str()) {
            return canned(
                StatusCode::UNAUTHORIZED,
                r#"{"detail": "Authentication credentials were not provided."}"#.to_string(),
            );
        }
    }

    let scripted = state
        .scripted_failures
        .lock()
        .unwrap()
        .get_mut(&path)
        .and_then(|queue| queue.pop_front());
    if let Some(status) = scripted {
        return canned(status, json!({ "detail": "Scripted failure." }).to_string());
    }

    let with_query = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or(path.as_str());
    if let Some(route) = state
        .routes
        .get(with_query)
        .or_else(|| state.routes.get(&path))
    {
        return canned(route.status, route.body.clone());
    }

    let paged = selection_listing(&path)
        .and_then(|customer_id| Some((customer_id, state.selection_pages.get(&customer_id)?)));
    if let Some((customer_id, pages)) = paged {
        let number = requested_page(&uri);
        let Some(ids) = pages.get(number - 1) else {
            return canned(
                StatusCode::NOT_FOUND,
                json!({ "detail": "Invalid page." }).to_string(),
            );
        };
        let next = (number < pages.len()).then(|| format!("{}{}?page={}", state.base_url, path, number + 1));
        let results: Vec<Value> = ids
            .iter()
            .map(|id| json!({ "customer_id": customer_id, "coverage_id": id }))
            .collect();
        let count: usize = pages.iter().map(Vec::len).sum();
        return canned(
            StatusCode::OK,
            json!({ "count": count, "next": next, "results": results }).to_string(),
        );
    }

    if let Some(customer_id) = selection_listing(&path) {
        let listing: Vec<Value> = state
            .selections
            .get(&customer_id)
            .map(|ids| {
                ids.iter()
                    .map(|id| json!({ "customer_id": customer_id, "coverage_id": id }))
                    .collect()
            })
            .unwrap_or_default();
        return canned(StatusCode::OK, Value::from(listing).to_string());
    }

    canned(
        StatusCode::NOT_FOUND,
        json!({ "detail": "Not found." }).to_string(),
    )
}

/// Customer ID of a `/customers/{id}/coverages/` path
fn selection_listing(path: &str) -> Option<i64> {
    path.strip_prefix("/customers/")?
        .strip_suffix("/coverages/")?
        .parse()
        .ok()
}

/// 1-based `page` query parameter, defaulting to the first page
fn requested_page(uri: &Uri) -> usize {
    uri.query()
        .and_then(|q| q.split('&').find_map(|pair| pair.strip_prefix("page=")))
        .and_then(|n| n.parse().ok())
        .filter(|n| *n >= 1)
        .unwrap_or(1)
}

fn canned(status: StatusCode, body: String) -> Response {
    (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}
