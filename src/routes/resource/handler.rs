use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
};

use crate::{AppState, error::AppError};

pub const INFO: &str = concat!("Crisp API caching service v", env!("CARGO_PKG_VERSION"));

// 最新一次抓取的原始响应体
pub async fn latest_payload(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let item = state
        .store
        .get()
        .await
        .inspect_err(|e| tracing::warn!("GET /: {}", e))?;

    Ok((
        [(header::CONTENT_TYPE, "application/json")],
        item.payload.clone(),
    ))
}

pub async fn info() -> &'static str {
    INFO
}

// 最新一次抓取结果，包含时间戳和 base64 编码的响应体
pub async fn latest_item(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let item = state
        .store
        .get()
        .await
        .inspect_err(|e| tracing::warn!("GET /cache.json: {}", e))?;
    let body = item
        .to_json()
        .inspect_err(|e| tracing::error!("GET /cache.json: {}", e))?;

    Ok(([(header::CONTENT_TYPE, "application/json")], body))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    use crate::{
        AppState,
        cache::{CacheStore, Item},
        routes,
    };

    async fn call(state: AppState, uri: &str) -> (StatusCode, Option<String>, Vec<u8>) {
        let response = routes::router()
            .with_state(state)
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get("content-type")
            .map(|v| v.to_str().unwrap().to_string());
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, content_type, body.to_vec())
    }

    fn state() -> AppState {
        AppState::new(Arc::new(CacheStore::default()))
    }

    #[tokio::test]
    async fn root_on_empty_store_is_not_found() {
        let (status, _, body) = call(state(), "/").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["code"], 404);
        assert_eq!(json["error_message"], "empty storage");
    }

    #[tokio::test]
    async fn root_returns_latest_payload_as_json() {
        let state = state();
        state.store.add(Item::now("old")).await;
        state.store.add(Item::now(r#"{"answer":42}"#)).await;

        let (status, content_type, body) = call(state, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some("application/json"));
        assert_eq!(body, br#"{"answer":42}"#);
    }

    #[tokio::test]
    async fn info_always_succeeds() {
        let (status, _, body) = call(state(), "/info").await;
        assert_eq!(status, StatusCode::OK);
        assert!(String::from_utf8(body).unwrap().starts_with("Crisp API caching service v"));
    }

    #[tokio::test]
    async fn cache_json_and_alias_return_wire_item() {
        let state = state();
        let item = Item::now(vec![0u8, 1, 2, 255]);
        state.store.add(item.clone()).await;

        for uri in ["/cache.json", "/latest.json"] {
            let (status, content_type, body) = call(state.clone(), uri).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(content_type.as_deref(), Some("application/json"));
            assert_eq!(Item::from_json(&body).unwrap(), item);
        }
    }

    #[tokio::test]
    async fn cache_json_on_empty_store_is_not_found() {
        let (status, _, _) = call(state(), "/cache.json").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    /// 把日志写进内存，便于断言
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn empty_store_errors_are_logged_with_endpoint() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        for uri in ["/", "/cache.json", "/latest.json"] {
            let (status, _, _) = call(state(), uri).await;
            assert_eq!(status, StatusCode::NOT_FOUND);
        }

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("GET /: empty storage"), "{}", output);
        assert_eq!(output.matches("GET /cache.json: empty storage").count(), 2, "{}", output);
    }
}
