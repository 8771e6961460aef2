use std::net::SocketAddr;

use axum::{
    body::{Body, to_bytes},
    extract::ConnectInfo,
    http::Request,
    middleware::Next,
    response::Response,
};

/// 错误响应体最多读取的字节数
const ERROR_BODY_LIMIT: usize = 1024;

pub async fn log_access(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let remote = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.to_string())
        .unwrap_or_else(|| "unknown".into());

    let response = next.run(req).await;
    let status = response.status();

    if !status.is_server_error() {
        tracing::info!("{} {} accessed by {} -> {}", method, path, remote, status);
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match to_bytes(body, ERROR_BODY_LIMIT).await {
        Ok(b) => b,
        Err(e) => {
            tracing::error!("Failed to read error response body for {}: {}", path, e);
            return Response::from_parts(parts, Body::empty());
        }
    };
    tracing::error!(
        "{} {} accessed by {} -> {}, body: {}",
        method,
        path,
        remote,
        parts.status,
        String::from_utf8_lossy(&bytes)
    );

    // body 已被读出，重新构建响应
    parts.headers.remove(axum::http::header::CONTENT_LENGTH);
    Response::from_parts(parts, Body::from(bytes))
}
