//! Fetch-backed [`HttpTransport`].
//!
//! # Design
//! - Each request owns an `AbortController`; dropping the request future (deadline hit or
//!   caller abort) aborts the underlying fetch.
//! - Timers use `gloo-timers` so deadlines run on the browser event loop.

use crate::core::http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, TransportError};
use futures_util::future::LocalBoxFuture;
use gloo_net::http::{Method, Request};
use gloo_timers::future::TimeoutFuture;
use std::time::Duration;
use web_sys::AbortController;

/// Transport used by the browser build.
pub(crate) struct FetchTransport;

struct AbortOnDrop(Option<AbortController>);

impl AbortOnDrop {
    fn disarm(&mut self) {
        self.0 = None;
    }
}

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        if let Some(controller) = self.0.take() {
            controller.abort();
        }
    }
}

const fn fetch_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
    }
}

fn map_error(err: gloo_net::Error) -> TransportError {
    match err {
        gloo_net::Error::JsError(js) if js.name == "AbortError" => TransportError::Aborted,
        other => TransportError::Network(other.to_string()),
    }
}

impl HttpTransport for FetchTransport {
    fn send(
        &self,
        request: HttpRequest,
    ) -> LocalBoxFuture<'static, Result<HttpResponse, TransportError>> {
        Box::pin(async move {
            let controller = AbortController::new()
                .map_err(|err| TransportError::Network(format!("{err:?}")))?;
            let signal = controller.signal();
            let mut guard = AbortOnDrop(Some(controller));

            let mut builder = Request::new(&request.url)
                .method(fetch_method(request.method))
                .abort_signal(Some(&signal));
            for (name, value) in &request.headers {
                builder = builder.header(name, value);
            }
            if let Some(body) = request.body {
                builder = builder.body(body);
            }

            let response = builder.send().await.map_err(map_error)?;
            let status = response.status();
            let status_text = response.status_text();
            let body = response.text().await.map_err(map_error)?;
            guard.disarm();
            Ok(HttpResponse {
                status,
                status_text,
                body,
            })
        })
    }

    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
        let millis = u32::try_from(duration.as_millis()).unwrap_or(u32::MAX);
        Box::pin(TimeoutFuture::new(millis))
    }
}
