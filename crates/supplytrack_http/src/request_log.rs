use axum::body::Body;
use axum::extract::MatchedPath;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use log::info;
use std::time::Instant;

/// Logs one metadata-only record per routed request.
pub(crate) async fn log_requests(request: Request<Body>, next: Next) -> Response {
    let started_at = Instant::now();
    let method = request.method().clone();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path().to_string(), |path| path.as_str().to_string());

    let response = next.run(request).await;

    info!(
        "event=http_request module=http method={} route={} status_code={} duration_ms={}",
        method,
        route,
        response.status().as_u16(),
        started_at.elapsed().as_millis()
    );
    response
}
