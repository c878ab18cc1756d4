//! The request/response pair a denied request hands to a script.
//!
//! # Responsibilities
//! - Snapshot the parts of the request a script may read
//! - Buffer the status, headers and body a script writes
//! - Register the request-bound script functions on an engine
//!
//! # Design Decisions
//! - The snapshot is owned, so a script never borrows from the live request
//! - The sink is buffered; it becomes the HTTP response only on success

use axum::{
    body::Body,
    http::{header::HeaderName, HeaderMap, HeaderValue, Method, Request, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use rhai::{Engine, EvalAltResult, INT};
use std::sync::{Arc, Mutex};

/// Read-only view of the request being denied.
#[derive(Debug, Clone)]
pub struct RequestInfo {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
}

impl RequestInfo {
    /// Capture method, URI and headers from a live request.
    pub fn from_request<B>(req: &Request<B>) -> Self {
        Self {
            method: req.method().clone(),
            uri: req.uri().clone(),
            headers: req.headers().clone(),
        }
    }

    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// Header value as text; empty when missing or not valid UTF-8.
    pub fn header(&self, name: &str) -> String {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    }
}

#[derive(Debug)]
struct BufferedResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: String,
}

/// Shared buffer the script writes its response into.
#[derive(Debug, Clone)]
pub struct ResponseSink {
    inner: Arc<Mutex<BufferedResponse>>,
}

impl ResponseSink {
    /// Empty sink. Status starts at 403 since it answers a denied request.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(BufferedResponse {
                status: StatusCode::FORBIDDEN,
                headers: HeaderMap::new(),
                body: String::new(),
            })),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BufferedResponse> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set_status(&self, code: u16) -> Result<(), String> {
        let status =
            StatusCode::from_u16(code).map_err(|_| format!("invalid status code {}", code))?;
        self.lock().status = status;
        Ok(())
    }

    pub fn set_header(&self, name: &str, value: &str) -> Result<(), String> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| format!("invalid header name '{}'", name))?;
        let value = HeaderValue::from_str(value)
            .map_err(|_| format!("invalid value for header '{}'", name))?;
        self.lock().headers.insert(name, value);
        Ok(())
    }

    pub fn write(&self, text: &str) {
        self.lock().body.push_str(text);
    }

    pub fn write_line(&self, text: &str) {
        let mut buffered = self.lock();
        buffered.body.push_str(text);
        buffered.body.push('\n');
    }

    pub fn status(&self) -> StatusCode {
        self.lock().status
    }

    pub fn body(&self) -> String {
        self.lock().body.clone()
    }

    /// Drain the buffer into an HTTP response.
    pub fn take_response(&self) -> Response {
        let mut buffered = self.lock();
        let body = std::mem::take(&mut buffered.body);
        let headers = std::mem::take(&mut buffered.headers);
        let mut response = (buffered.status, Body::from(body)).into_response();
        response.headers_mut().extend(headers);
        response
    }
}

impl Default for ResponseSink {
    fn default() -> Self {
        Self::new()
    }
}

/// One denied HTTP exchange: the request snapshot and its response sink.
#[derive(Debug, Clone)]
pub struct Exchange {
    request: Arc<RequestInfo>,
    sink: ResponseSink,
}

impl Exchange {
    pub fn new(request: RequestInfo) -> Self {
        Self {
            request: Arc::new(request),
            sink: ResponseSink::new(),
        }
    }

    pub fn request(&self) -> &RequestInfo {
        &self.request
    }

    pub fn sink(&self) -> &ResponseSink {
        &self.sink
    }

    /// Bind `print`, `Status`, `SetHeader`, `Method`, `UrlPath` and `Header`
    /// on `engine` to this exchange.
    pub(crate) fn register(&self, engine: &mut Engine) {
        let sink = self.sink.clone();
        engine.on_print(move |text| sink.write_line(text));

        let sink = self.sink.clone();
        engine.register_fn(
            "Status",
            move |code: INT| -> Result<(), Box<EvalAltResult>> {
                let code = u16::try_from(code).map_err(|_| format!("invalid status code {}", code))?;
                sink.set_status(code).map_err(Into::into)
            },
        );

        let sink = self.sink.clone();
        engine.register_fn(
            "SetHeader",
            move |name: &str, value: &str| -> Result<(), Box<EvalAltResult>> {
                sink.set_header(name, value).map_err(Into::into)
            },
        );

        let request = self.request.clone();
        engine.register_fn("Method", move || request.method.to_string());

        let request = self.request.clone();
        engine.register_fn("UrlPath", move || request.path().to_string());

        let request = self.request.clone();
        engine.register_fn("Header", move |name: &str| request.header(name));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(path: &str) -> RequestInfo {
        let req = Request::builder()
            .method("POST")
            .uri(path)
            .header("X-Token", "abc")
            .body(Body::empty())
            .unwrap();
        RequestInfo::from_request(&req)
    }

    #[test]
    fn test_request_snapshot() {
        let info = request("/data/file?x=1");
        assert_eq!(info.path(), "/data/file");
        assert_eq!(info.header("x-token"), "abc");
        assert_eq!(info.header("missing"), "");
    }

    #[test]
    fn test_script_writes_response() {
        let exchange = Exchange::new(request("/secret"));
        let mut engine = Engine::new();
        exchange.register(&mut engine);

        engine
            .run(r#"Status(401); SetHeader("X-Reason", "login"); print(Method() + " " + UrlPath());"#)
            .unwrap();

        let response = exchange.sink().take_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()["x-reason"], "login");
        assert_eq!(exchange.sink().body(), "");
    }

    #[test]
    fn test_body_is_buffered_until_taken() {
        let exchange = Exchange::new(request("/secret"));
        let mut engine = Engine::new();
        exchange.register(&mut engine);

        engine.run(r#"print("one"); print("two");"#).unwrap();
        assert_eq!(exchange.sink().body(), "one\ntwo\n");
        assert_eq!(exchange.sink().status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_invalid_status_is_script_error() {
        let exchange = Exchange::new(request("/secret"));
        let mut engine = Engine::new();
        exchange.register(&mut engine);

        assert!(engine.run("Status(42)").is_err());
        assert!(engine.run("Status(-1)").is_err());
        assert!(engine.run(r#"SetHeader("bad header", "x")"#).is_err());
    }
}
