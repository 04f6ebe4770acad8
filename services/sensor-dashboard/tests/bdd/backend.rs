//! In-process stand-in for the sensor backend API
//!
//! Serves the sensor endpoints from memory and records every request so
//! scenarios can assert on what the store sent.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use serde_json::{json, Value};
use tokio::task::JoinHandle;

/// A request as the backend saw it
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: HashMap<String, String>,
    pub body: Option<Value>,
}

impl RecordedRequest {
    pub fn summary(&self) -> String {
        format!("{} {}", self.method, self.path)
    }
}

#[derive(Debug, Default)]
pub struct BackendData {
    pub sensors: Vec<Value>,
    pub realtime: HashMap<String, Value>,
    pub history: Vec<Value>,
    pub failing: bool,
    pub next_id: u32,
    pub requests: Vec<RecordedRequest>,
}

type Shared = Arc<Mutex<BackendData>>;

#[derive(Debug)]
pub struct StubBackend {
    pub base_url: String,
    pub data: Shared,
    handle: JoinHandle<()>,
}

impl StubBackend {
    pub async fn start() -> Self {
        let data: Shared = Arc::new(Mutex::new(BackendData::default()));
        let router = Router::new()
            .fallback(handle_request)
            .with_state(Arc::clone(&data));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, router).await.ok();
        });

        Self {
            base_url: format!("http://{}", addr),
            data,
            handle,
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.data.lock().unwrap().requests.clone()
    }
}

impl Drop for StubBackend {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn parse_query(uri: &Uri) -> HashMap<String, String> {
    uri.query()
        .unwrap_or_default()
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
            (k.to_string(), v.to_string())
        })
        .collect()
}

async fn handle_request(
    State(data): State<Shared>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> Response {
    let body: Option<Value> = serde_json::from_slice(&body).ok();
    let mut data = data.lock().unwrap();
    data.requests.push(RecordedRequest {
        method: method.to_string(),
        path: uri.path().to_string(),
        query: parse_query(&uri),
        body: body.clone(),
    });

    if data.failing {
        return (StatusCode::INTERNAL_SERVER_ERROR, "backend failure").into_response();
    }

    let segments: Vec<&str> = uri.path().trim_matches('/').split('/').collect();
    let reply = match (method, segments.as_slice()) {
        (Method::GET, ["api", "sensors"]) => json!({ "data": data.sensors }),
        (Method::POST, ["api", "sensors"]) => {
            data.next_id += 1;
            let mut sensor = body.unwrap_or_else(|| json!({}));
            sensor["id"] = json!(format!("N{}", data.next_id));
            data.sensors.push(sensor.clone());
            json!({ "data": sensor })
        }
        (Method::PUT, ["api", "sensors", id]) => {
            let sensor = body.unwrap_or_else(|| json!({}));
            for existing in data.sensors.iter_mut().filter(|s| s["id"] == *id) {
                *existing = sensor.clone();
            }
            json!({ "data": sensor })
        }
        (Method::DELETE, ["api", "sensors", id]) => {
            data.sensors.retain(|s| s["id"] != *id);
            return StatusCode::NO_CONTENT.into_response();
        }
        (Method::GET, ["api", "sensors", id, "realtime"]) => {
            json!({ "data": { "data": data.realtime.get(*id).cloned() } })
        }
        (Method::GET, ["api", "data", "history"]) => {
            json!({ "data": { "data": data.history } })
        }
        (Method::PUT, ["api", "map", "sensors", id, "location"]) => {
            let location = body.unwrap_or_else(|| json!({}));
            for existing in data.sensors.iter_mut().filter(|s| s["id"] == *id) {
                existing["latitude"] = location["latitude"].clone();
                existing["longitude"] = location["longitude"].clone();
            }
            json!({ "data": null })
        }
        _ => return StatusCode::NOT_FOUND.into_response(),
    };

    axum::Json(reply).into_response()
}
