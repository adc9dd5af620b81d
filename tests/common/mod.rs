//! Axum server standing in for the GDC API in integration tests

#![allow(dead_code)]

use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode, Uri},
    response::Response,
    Router,
};
use bytes::Bytes;
use std::sync::{Arc, Mutex};
use tcga_fetch::cli::Config;
use tcga_fetch::{GdcClient, TcgaLoader};

/// How a route produces its body
#[derive(Debug, Clone)]
pub enum Payload {
    Full(Vec<u8>),
    /// Streams the bytes, then aborts the connection mid-body
    Truncated(Vec<u8>),
}

/// One canned response, matched by path and an optional raw-query substring
#[derive(Debug, Clone)]
pub struct Route {
    pub path: String,
    pub query_contains: Option<String>,
    pub status: u16,
    pub content_type: String,
    pub payload: Payload,
}

impl Route {
    pub fn json(path: &str, body: serde_json::Value) -> Self {
        Self {
            path: path.to_string(),
            query_contains: None,
            status: 200,
            content_type: "application/json".to_string(),
            payload: Payload::Full(body.to_string().into_bytes()),
        }
    }

    pub fn text(path: &str, content_type: &str, body: &str) -> Self {
        Self {
            path: path.to_string(),
            query_contains: None,
            status: 200,
            content_type: content_type.to_string(),
            payload: Payload::Full(body.as_bytes().to_vec()),
        }
    }

    /// Sends the start of `body` and then drops the connection
    pub fn truncated(path: &str, body: &str) -> Self {
        Self {
            payload: Payload::Truncated(body.as_bytes().to_vec()),
            ..Self::text(path, "text/plain", "")
        }
    }

    pub fn status(path: &str, status: u16) -> Self {
        Self {
            path: path.to_string(),
            query_contains: None,
            status,
            content_type: "text/plain".to_string(),
            payload: Payload::Full(b"unavailable".to_vec()),
        }
    }

    pub fn when_query(mut self, needle: &str) -> Self {
        self.query_contains = Some(needle.to_string());
        self
    }

    fn matches(&self, uri: &Uri) -> bool {
        uri.path() == self.path
            && self
                .query_contains
                .as_deref()
                .map(|needle| uri.query().unwrap_or("").contains(needle))
                .unwrap_or(true)
    }

    fn respond(&self) -> Response {
        let body = match &self.payload {
            Payload::Full(bytes) => Body::from(bytes.clone()),
            Payload::Truncated(bytes) => {
                let chunks: Vec<std::result::Result<Bytes, std::io::Error>> = vec![
                    Ok(Bytes::from(bytes.clone())),
                    Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "cut off")),
                ];
                Body::from_stream(futures_util::stream::iter(chunks))
            }
        };

        Response::builder()
            .status(StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR))
            .header(header::CONTENT_TYPE, self.content_type.as_str())
            .body(body)
            .unwrap()
    }
}

/// Wrap hits in the GDC search envelope
pub fn hits(items: serde_json::Value) -> serde_json::Value {
    serde_json::json!({ "data": { "hits": items, "pagination": {} }, "warnings": {} })
}

struct MockState {
    routes: Vec<Route>,
    requests: Mutex<Vec<String>>,
}

async fn dispatch(State(state): State<Arc<MockState>>, uri: Uri) -> Response {
    state.requests.lock().unwrap().push(uri.to_string());

    match state.routes.iter().find(|r| r.matches(&uri)) {
        Some(route) => route.respond(),
        None => Response::builder()
            .status(StatusCode::NOT_FOUND)
            .header(header::CONTENT_TYPE, "text/plain")
            .body(Body::from("not found"))
            .unwrap(),
    }
}

pub struct MockGdc {
    pub base_url: String,
    state: Arc<MockState>,
}

impl MockGdc {
    pub async fn start(routes: Vec<Route>) -> Self {
        let state = Arc::new(MockState {
            routes,
            requests: Mutex::new(Vec::new()),
        });
        let app = Router::new().fallback(dispatch).with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    /// Request targets (path and query) received so far
    pub fn requests(&self) -> Vec<String> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn count(&self, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|t| t.split('?').next() == Some(path))
            .count()
    }

    /// Config pointing at this server with fast retries
    pub fn config(&self, data_dir: &std::path::Path) -> Config {
        let mut config = Config::default();
        config.gdc.base_url = self.base_url.clone();
        config.retry.base_delay_ms = 1;
        config.paths.data_dir = data_dir.to_string_lossy().into_owned();
        config.pam50.mirrors = vec![
            format!("{}/mirror/html", self.base_url),
            format!("{}/mirror/data", self.base_url),
        ];
        config
    }

    pub fn loader(&self, data_dir: &std::path::Path) -> TcgaLoader {
        let config = self.config(data_dir);
        let client = GdcClient::from_config(&config).unwrap();
        TcgaLoader::with_client(&config, client).unwrap()
    }
}
