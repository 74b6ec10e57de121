//! HTTP client wrapper with auth injection, deadlines, and error normalisation.
//!
//! # Design
//! - The wire is behind [`HttpTransport`] so the client logic stays DOM-free; the browser
//!   shell plugs in a fetch-backed transport.
//! - Every request gets `Content-Type: application/json`. Requests to the API origin (relative
//!   URLs, or absolute URLs matching the base URL's origin) also get an `Authorization: Bearer`
//!   header when a token is stored. Per-call headers win by case-insensitive name.
//! - Deadlines race the transport future against the transport's timer.
//! - A 401 from the API origin evicts the stored token before the error is surfaced. A 401
//!   from any other host is an ordinary status error and leaves the token alone.
//! - Error bodies are read field by field, so one malformed field never hides the others.
//! - All failures collapse into [`ApiError`]; [`ApiErrorKind`] tells them apart.
//! - No retries; callers decide.

use crate::core::config::AppConfig;
use crate::core::storage::{AUTH_TOKEN_KEY, KeyValueStore};
use futures_util::future::{Abortable, Either, LocalBoxFuture, select};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;
use thiserror::Error;

pub use futures_util::future::{AbortHandle, AbortRegistration};

/// HTTP verbs supported by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `PATCH`
    Patch,
    /// `DELETE`
    Delete,
}

impl HttpMethod {
    /// Upper-case method token.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Fully resolved outgoing request handed to the transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpRequest {
    /// Request method.
    pub method: HttpMethod,
    /// Absolute or origin-relative URL including the query string.
    pub url: String,
    /// Header pairs in insertion order.
    pub headers: Vec<(String, String)>,
    /// Serialized JSON body.
    pub body: Option<String>,
}

impl HttpRequest {
    /// Case-insensitive header lookup.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Raw response returned by the transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Reason phrase, possibly empty.
    pub status_text: String,
    /// Response body as text.
    pub body: String,
}

impl HttpResponse {
    /// Whether the status is in the 2xx range.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Failures reported by a transport before any HTTP status is available.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Connection, DNS, CORS, or other transport failure.
    #[error("{0}")]
    Network(String),
    /// The underlying request was aborted.
    #[error("request aborted")]
    Aborted,
}

/// Pluggable wire layer.
pub trait HttpTransport {
    /// Perform the request. Dropping the future should cancel the request.
    fn send(&self, request: HttpRequest) -> LocalBoxFuture<'static, Result<HttpResponse, TransportError>>;

    /// Resolve after `duration`; used to enforce request deadlines.
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()>;
}

/// Per-call overrides.
#[derive(Debug, Default)]
pub struct RequestOptions {
    /// Extra headers; replace defaults with the same name.
    pub headers: Vec<(String, String)>,
    /// Deadline override.
    pub timeout: Option<Duration>,
    /// Query parameters appended to the URL.
    pub query: Vec<(String, String)>,
    /// Cancellation hook; abort through the paired [`AbortHandle`].
    pub abort: Option<AbortRegistration>,
}

impl RequestOptions {
    /// Options with no overrides.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Override the deadline.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Append a query parameter.
    #[must_use]
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Attach a cancellation registration.
    #[must_use]
    pub fn abortable(mut self, registration: AbortRegistration) -> Self {
        self.abort = Some(registration);
        self
    }
}

/// Failure category of an [`ApiError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ApiErrorKind {
    /// Transport-level failure; no response was received.
    Network,
    /// The deadline elapsed before a response arrived.
    Timeout,
    /// Non-2xx response other than 401.
    HttpStatus,
    /// 401 response from the API origin; the stored token has been cleared.
    AuthExpired,
    /// The caller (or browser) cancelled the request.
    Aborted,
    /// A 2xx body could not be decoded into the requested type.
    Decode,
    /// The request body could not be serialized.
    Encode,
}

impl ApiErrorKind {
    /// Code used when the server does not supply one.
    #[must_use]
    pub const fn default_code(self, status: Option<u16>) -> &'static str {
        match self {
            Self::Network => "ERR_NETWORK",
            Self::Timeout => "ECONNABORTED",
            Self::Aborted => "ERR_CANCELED",
            Self::Decode => "ERR_BAD_RESPONSE_BODY",
            Self::Encode => "ERR_BAD_REQUEST_BODY",
            Self::AuthExpired | Self::HttpStatus => match status {
                Some(code) if code >= 500 => "ERR_BAD_RESPONSE",
                _ => "ERR_BAD_REQUEST",
            },
        }
    }
}

/// Normalised failure surfaced to pages.
#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize)]
#[error("{message}")]
pub struct ApiError {
    /// Failure category.
    #[serde(skip)]
    pub kind: ApiErrorKind,
    /// HTTP status, when a response was received.
    #[serde(skip)]
    pub status: Option<u16>,
    /// Human readable message.
    pub message: String,
    /// Machine readable code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Field-level validation messages from the server.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, Vec<String>>>,
}

impl ApiError {
    fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            status: None,
            message: message.into(),
            code: Some(kind.default_code(None).to_string()),
            errors: None,
        }
    }

    /// Transport failure.
    #[must_use]
    pub fn network(detail: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Network, detail)
    }

    /// Deadline exceeded.
    #[must_use]
    pub fn timeout(after: Duration) -> Self {
        Self::new(
            ApiErrorKind::Timeout,
            format!("timeout of {}ms exceeded", after.as_millis()),
        )
    }

    /// Cancelled request.
    #[must_use]
    pub fn aborted() -> Self {
        Self::new(ApiErrorKind::Aborted, "request aborted")
    }

    fn decode(err: &serde_json::Error) -> Self {
        Self::new(ApiErrorKind::Decode, format!("invalid response body: {err}"))
    }

    fn encode(err: &serde_json::Error) -> Self {
        Self::new(ApiErrorKind::Encode, format!("invalid request body: {err}"))
    }

    fn from_transport(err: TransportError) -> Self {
        match err {
            TransportError::Network(detail) => Self::network(detail),
            TransportError::Aborted => Self::aborted(),
        }
    }

    /// Build a status error from a non-2xx response, keeping the server's message, code,
    /// and field errors when the body carries them.
    #[must_use]
    pub fn from_response(kind: ApiErrorKind, response: &HttpResponse) -> Self {
        let status = response.status;
        let body = serde_json::from_str::<Value>(&response.body).ok();
        let text = |name: &str| {
            body.as_ref()
                .and_then(|body| body.get(name))
                .and_then(Value::as_str)
                .map(str::to_string)
        };
        let message = text("message").or_else(|| text("error"));
        let code = text("code");
        let errors = body
            .as_ref()
            .and_then(|body| body.get("errors"))
            .and_then(field_errors);
        Self {
            kind,
            status: Some(status),
            message: message
                .unwrap_or_else(|| format!("Request failed with status code {status}")),
            code: Some(code.unwrap_or_else(|| kind.default_code(Some(status)).to_string())),
            errors,
        }
    }

    /// Whether the failure came from a cancellation the caller can ignore.
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        self.kind == ApiErrorKind::Aborted
    }

    /// Whether the caller must re-authenticate.
    #[must_use]
    pub fn is_auth_expired(&self) -> bool {
        self.kind == ApiErrorKind::AuthExpired
    }
}

/// Field errors as `{field: [messages]}`; a bare string counts as one message and entries of
/// any other shape are skipped.
fn field_errors(value: &Value) -> Option<BTreeMap<String, Vec<String>>> {
    let errors = value
        .as_object()?
        .iter()
        .filter_map(|(field, messages)| {
            let messages = match messages {
                Value::String(message) => vec![message.clone()],
                Value::Array(items) => items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect(),
                _ => return None,
            };
            Some((field.clone(), messages))
        })
        .collect::<BTreeMap<_, _>>();
    (!errors.is_empty()).then_some(errors)
}

/// Thin decorator over an [`HttpTransport`].
pub struct HttpClient {
    base_url: String,
    timeout: Duration,
    transport: Rc<dyn HttpTransport>,
    storage: Rc<dyn KeyValueStore>,
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("HttpClient")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl HttpClient {
    /// Create a client using the configured base URL and timeout.
    #[must_use]
    pub fn new(
        config: &AppConfig,
        transport: Rc<dyn HttpTransport>,
        storage: Rc<dyn KeyValueStore>,
    ) -> Self {
        Self {
            base_url: config.api_base_url.clone(),
            timeout: config.request_timeout,
            transport,
            storage,
        }
    }

    /// Base URL relative paths are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Default deadline.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// `GET` and decode the body.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] for transport, timeout, cancellation, status, or decode failures.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        self.request::<T, ()>(HttpMethod::Get, path, None, options)
            .await
    }

    /// `POST` an optional JSON body and decode the response.
    ///
    /// # Errors
    ///
    /// See [`HttpClient::get`]; additionally fails with [`ApiErrorKind::Encode`].
    pub async fn post<T, B>(
        &self,
        path: &str,
        body: Option<&B>,
        options: RequestOptions,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(HttpMethod::Post, path, body, options).await
    }

    /// `PUT` an optional JSON body and decode the response.
    ///
    /// # Errors
    ///
    /// See [`HttpClient::post`].
    pub async fn put<T, B>(
        &self,
        path: &str,
        body: Option<&B>,
        options: RequestOptions,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(HttpMethod::Put, path, body, options).await
    }

    /// `PATCH` an optional JSON body and decode the response.
    ///
    /// # Errors
    ///
    /// See [`HttpClient::post`].
    pub async fn patch<T, B>(
        &self,
        path: &str,
        body: Option<&B>,
        options: RequestOptions,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(HttpMethod::Patch, path, body, options).await
    }

    /// `DELETE` and decode the body.
    ///
    /// # Errors
    ///
    /// See [`HttpClient::get`].
    pub async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        self.request::<T, ()>(HttpMethod::Delete, path, None, options)
            .await
    }

    /// Issue a request with any method.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] describing the failure.
    pub async fn request<T, B>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&B>,
        options: RequestOptions,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = body
            .map(serde_json::to_string)
            .transpose()
            .map_err(|err| ApiError::encode(&err))?;
        let RequestOptions {
            headers,
            timeout,
            query,
            abort,
        } = options;
        let request = self.build_request(method, path, body, &headers, &query);
        let url = request.url.clone();
        let first_party = self.is_first_party(&url);
        let timeout = timeout.unwrap_or(self.timeout);
        tracing::debug!(%method, %url, "sending request");

        let exchange = select(self.transport.send(request), self.transport.sleep(timeout));
        let outcome = match abort {
            Some(registration) => Abortable::new(exchange, registration).await.ok(),
            None => Some(exchange.await),
        };
        let result = match outcome {
            None => Err(ApiError::aborted()),
            Some(Either::Left((sent, _))) => sent.map_err(ApiError::from_transport),
            Some(Either::Right(((), _))) => Err(ApiError::timeout(timeout)),
        };
        let decoded = result.and_then(|response| self.handle_response(response, first_party));
        if let Err(err) = &decoded {
            if err.is_aborted() {
                tracing::debug!(%method, %url, "request aborted");
            } else {
                tracing::warn!(
                    %method,
                    %url,
                    kind = ?err.kind,
                    status = err.status,
                    code = err.code.as_deref(),
                    "request failed"
                );
            }
        }
        decoded
    }

    /// Resolve the URL and headers for a request.
    #[must_use]
    pub fn build_request(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<String>,
        overrides: &[(String, String)],
        query: &[(String, String)],
    ) -> HttpRequest {
        let url = append_query(join_url(&self.base_url, path), query);
        let mut headers = vec![("Content-Type".to_string(), "application/json".to_string())];
        if self.is_first_party(&url)
            && let Some(token) = self
                .storage
                .get(AUTH_TOKEN_KEY)
                .filter(|token| !token.trim().is_empty())
        {
            headers.push(("Authorization".to_string(), format!("Bearer {token}")));
        }
        for (name, value) in overrides {
            headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(name));
            headers.push((name.clone(), value.clone()));
        }
        HttpRequest {
            method,
            url,
            headers,
            body,
        }
    }

    /// Whether `url` targets the API origin: relative URLs always do, absolute URLs only when
    /// the base URL is absolute and shares their scheme and authority.
    #[must_use]
    pub fn is_first_party(&self, url: &str) -> bool {
        match origin(url) {
            None => !url.starts_with("//"),
            Some(target) => {
                origin(&self.base_url).is_some_and(|base| base.eq_ignore_ascii_case(target))
            }
        }
    }

    fn handle_response<T: DeserializeOwned>(
        &self,
        response: HttpResponse,
        first_party: bool,
    ) -> Result<T, ApiError> {
        if response.is_success() {
            let body = response.body.trim();
            let body = if body.is_empty() { "null" } else { body };
            return serde_json::from_str(body).map_err(|err| ApiError::decode(&err));
        }
        if response.status == 401 && first_party {
            self.storage.remove(AUTH_TOKEN_KEY);
            tracing::info!("cleared bearer token after 401 response");
            return Err(ApiError::from_response(ApiErrorKind::AuthExpired, &response));
        }
        Err(ApiError::from_response(ApiErrorKind::HttpStatus, &response))
    }
}

/// Join a base URL and a path; absolute `http(s)` paths are returned untouched.
#[must_use]
pub fn join_url(base: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") || base.is_empty() {
        return path.to_string();
    }
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        return base.to_string();
    }
    format!("{}/{}", base.trim_end_matches('/'), path)
}

/// `scheme://authority` of an absolute `http(s)` URL.
fn origin(url: &str) -> Option<&str> {
    let scheme_len = ["http://", "https://"]
        .into_iter()
        .find(|scheme| {
            url.get(..scheme.len())
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
        })?
        .len();
    let end = url[scheme_len..]
        .find(['/', '?', '#'])
        .map_or(url.len(), |offset| scheme_len + offset);
    Some(&url[..end])
}

fn append_query(url: String, query: &[(String, String)]) -> String {
    if query.is_empty() {
        return url;
    }
    let encoded = query
        .iter()
        .map(|(key, value)| format!("{}={}", urlencoding::encode(key), urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&");
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}{encoded}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::storage::MemoryStorage;
    use futures_util::future::{pending, ready};
    use serde::Deserialize;
    use serde_json::json;
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;
    use std::error::Error;

    enum Script {
        Respond(u16, &'static str),
        Fail(TransportError),
        Hang,
    }

    #[derive(Default)]
    struct ScriptedTransport {
        script: RefCell<VecDeque<Script>>,
        sent: RefCell<Vec<HttpRequest>>,
        timer_fires: Cell<bool>,
    }

    impl ScriptedTransport {
        fn with(script: Script) -> Rc<Self> {
            let transport = Self::default();
            if matches!(script, Script::Hang) {
                transport.timer_fires.set(true);
            }
            transport.script.borrow_mut().push_back(script);
            Rc::new(transport)
        }

        fn last_request(&self) -> Option<HttpRequest> {
            self.sent.borrow().last().cloned()
        }
    }

    impl HttpTransport for ScriptedTransport {
        fn send(
            &self,
            request: HttpRequest,
        ) -> LocalBoxFuture<'static, Result<HttpResponse, TransportError>> {
            self.sent.borrow_mut().push(request);
            match self.script.borrow_mut().pop_front() {
                Some(Script::Respond(status, body)) => Box::pin(ready(Ok(HttpResponse {
                    status,
                    status_text: String::new(),
                    body: body.to_string(),
                }))),
                Some(Script::Fail(err)) => Box::pin(ready(Err(err))),
                Some(Script::Hang) | None => Box::pin(pending()),
            }
        }

        fn sleep(&self, _duration: Duration) -> LocalBoxFuture<'static, ()> {
            if self.timer_fires.get() {
                Box::pin(ready(()))
            } else {
                Box::pin(pending())
            }
        }
    }

    fn client(transport: &Rc<ScriptedTransport>, storage: &Rc<MemoryStorage>) -> HttpClient {
        let config = AppConfig::default();
        HttpClient::new(&config, transport.clone(), storage.clone())
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Task {
        id: u32,
        title: String,
    }

    #[tokio::test]
    async fn get_decodes_body_and_sets_defaults() -> Result<(), Box<dyn Error>> {
        let transport = ScriptedTransport::with(Script::Respond(200, r#"{"id":1,"title":"Write docs"}"#));
        let storage = Rc::new(MemoryStorage::new());
        let task: Task = client(&transport, &storage)
            .get("/tasks/1", RequestOptions::new())
            .await?;
        assert_eq!(
            task,
            Task {
                id: 1,
                title: "Write docs".to_string()
            }
        );
        let sent = transport.last_request().ok_or("no request recorded")?;
        assert_eq!(sent.method, HttpMethod::Get);
        assert_eq!(sent.url, "/api/tasks/1");
        assert_eq!(sent.header("content-type"), Some("application/json"));
        assert_eq!(sent.header("Authorization"), None);
        assert_eq!(sent.body, None);
        Ok(())
    }

    #[tokio::test]
    async fn bearer_token_is_attached_when_stored() -> Result<(), Box<dyn Error>> {
        let transport = ScriptedTransport::with(Script::Respond(200, "[]"));
        let storage = Rc::new(MemoryStorage::with_entries([(AUTH_TOKEN_KEY, "tok-123")]));
        let _: Vec<Task> = client(&transport, &storage)
            .get("tasks", RequestOptions::new())
            .await?;
        let sent = transport.last_request().ok_or("no request recorded")?;
        assert_eq!(sent.header("authorization"), Some("Bearer tok-123"));
        Ok(())
    }

    #[tokio::test]
    async fn per_call_headers_and_query_are_applied() -> Result<(), Box<dyn Error>> {
        let transport = ScriptedTransport::with(Script::Respond(200, "null"));
        let storage = Rc::new(MemoryStorage::new());
        let options = RequestOptions::new()
            .header("content-type", "text/plain")
            .header("X-Trace", "abc")
            .query("q", "a b&c")
            .query("page", "2");
        client(&transport, &storage)
            .get::<()>("/search", options)
            .await?;
        let sent = transport.last_request().ok_or("no request recorded")?;
        assert_eq!(sent.url, "/api/search?q=a%20b%26c&page=2");
        assert_eq!(sent.header("Content-Type"), Some("text/plain"));
        assert_eq!(
            sent.headers
                .iter()
                .filter(|(name, _)| name.eq_ignore_ascii_case("content-type"))
                .count(),
            1
        );
        assert_eq!(sent.header("x-trace"), Some("abc"));
        Ok(())
    }

    #[tokio::test]
    async fn post_serializes_body() -> Result<(), Box<dyn Error>> {
        let transport = ScriptedTransport::with(Script::Respond(201, r#"{"id":7,"title":"New"}"#));
        let storage = Rc::new(MemoryStorage::new());
        let body = json!({"title": "New"});
        let created: Task = client(&transport, &storage)
            .post("/tasks", Some(&body), RequestOptions::new())
            .await?;
        assert_eq!(created.id, 7);
        let sent = transport.last_request().ok_or("no request recorded")?;
        assert_eq!(sent.method, HttpMethod::Post);
        assert_eq!(sent.body.as_deref(), Some(r#"{"title":"New"}"#));
        Ok(())
    }

    #[tokio::test]
    async fn empty_success_body_decodes_as_unit() -> Result<(), Box<dyn Error>> {
        let transport = ScriptedTransport::with(Script::Respond(204, ""));
        let storage = Rc::new(MemoryStorage::new());
        client(&transport, &storage)
            .delete::<()>("/tasks/7", RequestOptions::new())
            .await?;
        assert_eq!(
            transport.last_request().map(|req| req.method),
            Some(HttpMethod::Delete)
        );
        Ok(())
    }

    #[tokio::test]
    async fn unauthorized_clears_token_and_reports_auth_expired() {
        let transport = ScriptedTransport::with(Script::Respond(401, r#"{"message":"Token expired"}"#));
        let storage = Rc::new(MemoryStorage::with_entries([(AUTH_TOKEN_KEY, "stale")]));
        let err = client(&transport, &storage)
            .get::<Task>("/me", RequestOptions::new())
            .await
            .err();
        let err = err.as_ref();
        assert_eq!(err.map(|err| err.kind), Some(ApiErrorKind::AuthExpired));
        assert_eq!(err.and_then(|err| err.status), Some(401));
        assert_eq!(err.map(|err| err.message.as_str()), Some("Token expired"));
        assert!(err.is_some_and(ApiError::is_auth_expired));
        assert_eq!(storage.get(AUTH_TOKEN_KEY), None);
    }

    #[tokio::test]
    async fn status_errors_keep_server_details() {
        let transport = ScriptedTransport::with(Script::Respond(
            422,
            r#"{"message":"Invalid task","code":"VALIDATION","errors":{"title":["is required"]}}"#,
        ));
        let storage = Rc::new(MemoryStorage::with_entries([(AUTH_TOKEN_KEY, "keep")]));
        let err = client(&transport, &storage)
            .put::<Task, _>("/tasks/1", Some(&json!({})), RequestOptions::new())
            .await
            .err();
        let expected = ApiError {
            kind: ApiErrorKind::HttpStatus,
            status: Some(422),
            message: "Invalid task".to_string(),
            code: Some("VALIDATION".to_string()),
            errors: Some(BTreeMap::from([(
                "title".to_string(),
                vec!["is required".to_string()],
            )])),
        };
        assert_eq!(err, Some(expected));
        assert_eq!(storage.get(AUTH_TOKEN_KEY).as_deref(), Some("keep"));
    }

    #[tokio::test]
    async fn malformed_field_errors_keep_message_and_code() {
        let transport = ScriptedTransport::with(Script::Respond(
            422,
            r#"{"message":"Invalid task","code":"VALIDATION","errors":{"title":"is required","tags":7}}"#,
        ));
        let storage = Rc::new(MemoryStorage::new());
        let err = client(&transport, &storage)
            .post::<Task, _>("/tasks", Some(&json!({})), RequestOptions::new())
            .await
            .err();
        assert_eq!(err.as_ref().map(|err| err.message.as_str()), Some("Invalid task"));
        assert_eq!(
            err.as_ref().and_then(|err| err.code.as_deref()),
            Some("VALIDATION")
        );
        assert_eq!(
            err.and_then(|err| err.errors),
            Some(BTreeMap::from([(
                "title".to_string(),
                vec!["is required".to_string()],
            )]))
        );
    }

    #[tokio::test]
    async fn wrong_typed_code_does_not_hide_message() {
        let transport = ScriptedTransport::with(Script::Respond(
            400,
            r#"{"error":"Bad filter","code":42}"#,
        ));
        let storage = Rc::new(MemoryStorage::new());
        let err = client(&transport, &storage)
            .get::<Task>("/tasks", RequestOptions::new())
            .await
            .err();
        assert_eq!(err.as_ref().map(|err| err.message.as_str()), Some("Bad filter"));
        assert_eq!(
            err.and_then(|err| err.code).as_deref(),
            Some("ERR_BAD_REQUEST")
        );
    }

    #[tokio::test]
    async fn foreign_origin_gets_no_token_and_its_401_keeps_it() -> Result<(), Box<dyn Error>> {
        let transport = ScriptedTransport::with(Script::Respond(401, r#"{"message":"nope"}"#));
        let storage = Rc::new(MemoryStorage::with_entries([(AUTH_TOKEN_KEY, "app-secret")]));
        let err = client(&transport, &storage)
            .get::<Task>("https://third.example.net/me", RequestOptions::new())
            .await
            .err();
        let sent = transport.last_request().ok_or("no request recorded")?;
        assert_eq!(sent.header("Authorization"), None);
        assert_eq!(err.as_ref().map(|err| err.kind), Some(ApiErrorKind::HttpStatus));
        assert_eq!(err.and_then(|err| err.status), Some(401));
        assert_eq!(storage.get(AUTH_TOKEN_KEY).as_deref(), Some("app-secret"));
        Ok(())
    }

    #[tokio::test]
    async fn absolute_url_on_api_origin_is_authenticated() -> Result<(), Box<dyn Error>> {
        let transport = ScriptedTransport::with(Script::Respond(401, "{}"));
        let storage = Rc::new(MemoryStorage::with_entries([(AUTH_TOKEN_KEY, "tok-9")]));
        let config = AppConfig {
            api_base_url: "https://API.example.com/v1".to_string(),
            ..AppConfig::default()
        };
        let client = HttpClient::new(&config, transport.clone(), storage.clone());
        let err = client
            .get::<Task>("https://api.example.com/v2/me", RequestOptions::new())
            .await
            .err();
        let sent = transport.last_request().ok_or("no request recorded")?;
        assert_eq!(sent.header("authorization"), Some("Bearer tok-9"));
        assert!(err.as_ref().is_some_and(ApiError::is_auth_expired));
        assert_eq!(storage.get(AUTH_TOKEN_KEY), None);
        Ok(())
    }

    #[test]
    fn first_party_detection_compares_origins() {
        let storage: Rc<dyn KeyValueStore> = Rc::new(MemoryStorage::new());
        let transport = ScriptedTransport::with(Script::Hang);
        let relative = HttpClient::new(&AppConfig::default(), transport.clone(), storage.clone());
        assert!(relative.is_first_party("/api/tasks"));
        assert!(!relative.is_first_party("https://randomuser.me/api/"));
        assert!(!relative.is_first_party("//cdn.example.com/x"));

        let config = AppConfig {
            api_base_url: "https://api.example.com:8443/v1".to_string(),
            ..AppConfig::default()
        };
        let absolute = HttpClient::new(&config, transport, storage);
        assert!(absolute.is_first_party("https://api.example.com:8443/other?x=1"));
        assert!(!absolute.is_first_party("https://api.example.com/v1"));
        assert!(!absolute.is_first_party("http://api.example.com:8443/v1"));
        assert!(!absolute.is_first_party("https://api.example.com:8443.evil.net/v1"));
    }

    #[tokio::test]
    async fn opaque_server_errors_get_default_message() {
        let transport = ScriptedTransport::with(Script::Respond(503, "<html>down</html>"));
        let storage = Rc::new(MemoryStorage::new());
        let err = client(&transport, &storage)
            .get::<Task>("/tasks", RequestOptions::new())
            .await
            .err();
        assert_eq!(
            err.as_ref().map(ToString::to_string).as_deref(),
            Some("Request failed with status code 503")
        );
        assert_eq!(
            err.and_then(|err| err.code).as_deref(),
            Some("ERR_BAD_RESPONSE")
        );
    }

    #[tokio::test]
    async fn deadline_surfaces_timeout_not_network() {
        let transport = ScriptedTransport::with(Script::Hang);
        let storage = Rc::new(MemoryStorage::new());
        let err = client(&transport, &storage)
            .get::<Task>("/slow", RequestOptions::new())
            .await
            .err();
        assert_eq!(err.as_ref().map(|err| err.kind), Some(ApiErrorKind::Timeout));
        assert_eq!(
            err.as_ref().map(|err| err.message.as_str()),
            Some("timeout of 10000ms exceeded")
        );
        assert_eq!(err.and_then(|err| err.code).as_deref(), Some("ECONNABORTED"));
    }

    #[tokio::test]
    async fn per_call_timeout_override_is_reported() {
        let transport = ScriptedTransport::with(Script::Hang);
        let storage = Rc::new(MemoryStorage::new());
        let err = client(&transport, &storage)
            .get::<Task>(
                "/slow",
                RequestOptions::new().timeout(Duration::from_millis(250)),
            )
            .await
            .err();
        assert_eq!(
            err.map(|err| err.message),
            Some("timeout of 250ms exceeded".to_string())
        );
    }

    #[tokio::test]
    async fn transport_failures_are_network_errors_without_retry() {
        let transport = ScriptedTransport::with(Script::Fail(TransportError::Network(
            "Failed to fetch".to_string(),
        )));
        let storage = Rc::new(MemoryStorage::new());
        let err = client(&transport, &storage)
            .get::<Task>("/tasks", RequestOptions::new())
            .await
            .err();
        assert_eq!(err.as_ref().map(|err| err.kind), Some(ApiErrorKind::Network));
        assert_eq!(err.and_then(|err| err.status), None);
        assert_eq!(transport.sent.borrow().len(), 1);
    }

    #[tokio::test]
    async fn caller_abort_is_distinct() {
        let transport = ScriptedTransport::with(Script::Respond(200, "[]"));
        let storage = Rc::new(MemoryStorage::new());
        let (handle, registration) = AbortHandle::new_pair();
        handle.abort();
        let err = client(&transport, &storage)
            .get::<Vec<Task>>("/tasks", RequestOptions::new().abortable(registration))
            .await
            .err();
        assert!(err.as_ref().is_some_and(ApiError::is_aborted));
        assert_eq!(err.and_then(|err| err.code).as_deref(), Some("ERR_CANCELED"));
    }

    #[tokio::test]
    async fn transport_abort_maps_to_aborted() {
        let transport = ScriptedTransport::with(Script::Fail(TransportError::Aborted));
        let storage = Rc::new(MemoryStorage::new());
        let err = client(&transport, &storage)
            .get::<Task>("/tasks", RequestOptions::new())
            .await
            .err();
        assert_eq!(err.map(|err| err.kind), Some(ApiErrorKind::Aborted));
    }

    #[tokio::test]
    async fn undecodable_success_body_is_decode_error() {
        let transport = ScriptedTransport::with(Script::Respond(200, r#"{"id":"one"}"#));
        let storage = Rc::new(MemoryStorage::new());
        let err = client(&transport, &storage)
            .patch::<Task, _>("/tasks/1", None::<&()>, RequestOptions::new())
            .await
            .err();
        assert_eq!(err.map(|err| err.kind), Some(ApiErrorKind::Decode));
    }

    #[test]
    fn join_url_handles_slashes_and_absolute_urls() {
        assert_eq!(join_url("/api", "/users"), "/api/users");
        assert_eq!(join_url("/api/", "users"), "/api/users");
        assert_eq!(join_url("/api", ""), "/api");
        assert_eq!(join_url("", "/users"), "/users");
        assert_eq!(
            join_url("/api", "https://randomuser.me/api/"),
            "https://randomuser.me/api/"
        );
    }

    #[test]
    fn api_error_serializes_normalised_shape() -> Result<(), serde_json::Error> {
        let err = ApiError::timeout(Duration::from_secs(1));
        assert_eq!(
            serde_json::to_value(&err)?,
            json!({"message": "timeout of 1000ms exceeded", "code": "ECONNABORTED"})
        );
        Ok(())
    }
}
