//! Request forwarding to the current target.
//!
//! Bodies are buffered through the `Bytes` extractor, so a body over
//! [`MAX_BODY_BYTES`] is rejected with 413 before any upstream is contacted.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::header::{self, HeaderMap, HeaderName};
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};

use crate::state::ProxyState;

/// Largest request body buffered for forwarding.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Body sent when the target cannot be reached.
pub const FORWARD_ERROR_BODY: &str = "Internal server error";

/// Forward the request to whichever slot is the target right now.
///
/// Upstream failures become a plain-text 500; nothing is retried.
pub async fn forward(
    State(state): State<Arc<ProxyState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let slot = state.target.current();
    let base = state.upstreams.url(slot);
    match forward_to(&state.client, base, method, &uri, headers, body).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(target_slot = %slot, error = %format!("{e:#}"), "proxy error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "text/plain")],
                FORWARD_ERROR_BODY,
            )
                .into_response()
        }
    }
}

async fn forward_to(
    client: &reqwest::Client,
    base: &str,
    method: Method,
    uri: &Uri,
    mut headers: HeaderMap,
    body: Bytes,
) -> Result<Response> {
    let path = uri
        .path_and_query()
        .map_or("/", axum::http::uri::PathAndQuery::as_str);
    let url = format!("{base}{path}");

    strip_hop_by_hop(&mut headers);
    headers.remove(header::HOST);

    let upstream = client
        .request(method, &url)
        .headers(headers)
        .body(body)
        .send()
        .await
        .with_context(|| format!("forwarding to {url}"))?;

    let status = upstream.status();
    let mut response_headers = upstream.headers().clone();
    let bytes = upstream.bytes().await.context("reading upstream body")?;

    strip_hop_by_hop(&mut response_headers);
    response_headers.remove(header::CONTENT_LENGTH);

    let mut response = Response::new(Body::from(bytes));
    *response.status_mut() = status;
    *response.headers_mut() = response_headers;
    Ok(response)
}

/// Drop connection-scoped headers that must not cross a proxy.
fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let hop_by_hop: [HeaderName; 7] = [
        header::CONNECTION,
        header::PROXY_AUTHENTICATE,
        header::PROXY_AUTHORIZATION,
        header::TE,
        header::TRAILER,
        header::TRANSFER_ENCODING,
        header::UPGRADE,
    ];
    for name in hop_by_hop {
        headers.remove(name);
    }
    headers.remove("keep-alive");
}
