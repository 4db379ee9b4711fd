//! An in-process stand-in for a registry, for tests.
//!
//! Responses are keyed by path and query (`/v2/_catalog?n=100`), falling
//! back to the bare path. Unknown paths answer `404 Not Found`. A disconnected
//! mock fails every request with a connection error.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use http::{HeaderMap, StatusCode, Uri, response};
use parking_lot::Mutex;

/// A canned response
#[derive(Debug, Clone)]
pub struct MockResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl MockResponse {
    /// Create a canned response
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }
}

/// A request seen by the [MockService]
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// Request URI
    pub uri: Uri,
    /// Request headers
    pub headers: HeaderMap,
}

/// A tower service answering registry requests from canned responses
#[derive(Debug, Default, Clone)]
pub struct MockService {
    responses: Arc<Mutex<HashMap<String, MockResponse>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    disconnected: Arc<Mutex<bool>>,
}

impl MockService {
    /// Create an empty mock registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a response for a path (and optional query)
    pub fn add(&self, path: &str, status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) {
        self.responses
            .lock()
            .insert(path.to_owned(), MockResponse::new(status, headers, body));
    }

    /// Register a `200 OK` JSON response
    pub fn json(&self, path: &str, body: impl Into<Bytes>) {
        let mut headers = HeaderMap::new();
        headers.insert(
            http::header::CONTENT_TYPE,
            http::HeaderValue::from_static("application/json"),
        );
        self.add(path, StatusCode::OK, headers, body);
    }

    /// Fail every following request as if the registry could not be reached
    pub fn disconnect(&self) {
        *self.disconnected.lock() = true;
    }

    /// Requests received so far, oldest first
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    fn lookup(&self, uri: &Uri) -> Option<MockResponse> {
        let responses = self.responses.lock();
        uri.path_and_query()
            .and_then(|pq| responses.get(pq.as_str()))
            .or_else(|| responses.get(uri.path()))
            .cloned()
    }
}

impl tower::Service<http::Request<hyperdriver::Body>> for MockService {
    type Response = http::Response<hyperdriver::Body>;
    type Error = hyperdriver::client::Error;
    type Future = std::future::Ready<Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &mut self,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        std::task::Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: http::Request<hyperdriver::Body>) -> Self::Future {
        self.requests.lock().push(RecordedRequest {
            uri: req.uri().clone(),
            headers: req.headers().clone(),
        });

        if *self.disconnected.lock() {
            let host = req.uri().host().unwrap_or_default().to_owned();
            return std::future::ready(Err(hyperdriver::client::Error::Connection(
                format!("{host} refused the connection").into(),
            )));
        }

        let response = self.lookup(req.uri()).unwrap_or_else(|| {
            MockResponse::new(
                StatusCode::NOT_FOUND,
                HeaderMap::new(),
                format!("no mock response for {}", req.uri().path()),
            )
        });

        let mut builder = response::Builder::new()
            .status(response.status)
            .version(http::Version::HTTP_11);

        for (key, value) in response.headers.iter() {
            builder = builder.header(key, value);
        }

        let response = builder
            .body(hyperdriver::Body::from(response.body))
            .expect("canned response is valid");

        std::future::ready(Ok(response))
    }
}
