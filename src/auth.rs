use crate::dao::KeyValueStore;
use crate::state::AppState;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::IntoResponse;
use sha3::{Digest, Sha3_256};

const API_KEY_HEADER: &str = "x-api-key";

pub fn digest_api_key(api_key: &[u8]) -> String {
    let mut hasher = Sha3_256::new();
    hasher.update(api_key);
    format!("{:x}", hasher.finalize())
}

pub async fn auth<S: KeyValueStore>(
    State(state): State<AppState<S>>,
    request: Request,
    next: Next,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let api_key_bytes = request
        .headers()
        .get(API_KEY_HEADER)
        .map(|value| value.to_str().unwrap_or_default())
        .ok_or_else(|| {
            tracing::warn!("Missing api key on {}", request.uri());
            (StatusCode::UNAUTHORIZED, "Unauthorized".into())
        })?
        .as_bytes();

    if state.api_key_digest != digest_api_key(api_key_bytes) {
        tracing::warn!("Invalid api key on {}", request.uri());
        return Err((StatusCode::UNAUTHORIZED, "Unauthorized".into()));
    }
    Ok(next.run(request).await)
}
