//! In-process stub of the upstream APIs for adapter tests.

use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::Router;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use url::Url;

/// A request seen by the stub.
#[derive(Debug, Clone)]
pub struct Captured {
    pub method: Method,
    pub path: String,
    pub query: String,
    pub headers: HeaderMap,
    pub body: String,
}

impl Captured {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn query_pairs(&self) -> Vec<(String, String)> {
        url::form_urlencoded::parse(self.query.as_bytes())
            .into_owned()
            .collect()
    }

    pub fn query_param(&self, name: &str) -> Option<String> {
        self.query_pairs()
            .into_iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }

    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

#[derive(Clone)]
struct Route {
    path: String,
    status: StatusCode,
    body: String,
}

/// Serves canned responses keyed by request path.
pub struct StubServer {
    pub base_url: Url,
    captured: Arc<Mutex<Vec<Captured>>>,
}

impl StubServer {
    /// Start a server answering each path with a JSON body and status.
    ///
    /// Routes match on exact path; the first route for a path wins, except
    /// that repeated routes for the same path are served in order.
    pub async fn start(routes: Vec<(&str, StatusCode, Value)>) -> Self {
        let routes: Vec<Route> = routes
            .into_iter()
            .map(|(path, status, body)| Route {
                path: path.to_string(),
                status,
                body: body.to_string(),
            })
            .collect();
        let routes = Arc::new(Mutex::new(routes));
        let captured = Arc::new(Mutex::new(Vec::new()));

        let app = {
            let captured = captured.clone();
            Router::new().fallback(
                move |method: Method, uri: Uri, headers: HeaderMap, body: String| {
                    let captured = captured.clone();
                    let routes = routes.clone();
                    async move {
                        let path = uri.path().to_string();
                        captured.lock().unwrap().push(Captured {
                            method,
                            path: path.clone(),
                            query: uri.query().unwrap_or_default().to_string(),
                            headers,
                            body,
                        });

                        let mut routes = routes.lock().unwrap();
                        let matching: Vec<usize> = routes
                            .iter()
                            .enumerate()
                            .filter(|(_, r)| r.path == path)
                            .map(|(i, _)| i)
                            .collect();

                        let route = match matching.as_slice() {
                            [] => None,
                            [only] => Some(routes[*only].clone()),
                            [first, ..] => Some(routes.remove(*first)),
                        };

                        match route {
                            Some(r) => (r.status, [(header::CONTENT_TYPE, "application/json")], r.body),
                            None => (
                                StatusCode::NOT_FOUND,
                                [(header::CONTENT_TYPE, "application/json")],
                                r#"{"error":"no stub route"}"#.to_string(),
                            ),
                        }
                    }
                },
            )
        };

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: Url::parse(&format!("http://{}", addr)).unwrap(),
            captured,
        }
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<Captured> {
        self.captured.lock().unwrap().clone()
    }
}

/// HTTP client for tests.
pub fn client() -> reqwest::Client {
    crate::http::create_http_client(std::time::Duration::from_secs(10)).unwrap()
}
