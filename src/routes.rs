use crate::dao::{KeyValueStore, ACTIVATED_KEY, URL_KEY};
use crate::model::{activated_value, PromoRecord, PromoSpecification, PromoState};
use crate::page;
use crate::state::AppState;
use crate::utils::{internal_error, parse_url, with_timeout};
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use std::time::Duration;
use tower::ServiceExt;
use tower_http::services::ServeDir;

const ASSET_PATH_PREFIX: &str = "/img/";
const DEFAULT_TIMEOUT: u64 = 300;

/// Asset requests go to the asset directory untouched, everything else gets the promo page.
pub async fn dispatch<S: KeyValueStore>(
    State(state): State<AppState<S>>,
    request: Request,
) -> Response {
    if request.uri().path().starts_with(ASSET_PATH_PREFIX) {
        return serve_asset(state.assets, request).await;
    }
    match promo_page(&state.store).await {
        Ok(html) => html.into_response(),
        Err(err) => err.into_response(),
    }
}

async fn serve_asset(assets: ServeDir, request: Request) -> Response {
    tracing::debug!("Forwarding asset request {}", request.uri());
    assets
        .oneshot(request)
        .await
        .unwrap_or_else(|never| match never {})
        .into_response()
}

async fn promo_page<S: KeyValueStore>(store: &S) -> Result<Html<String>, (StatusCode, String)> {
    let record = load_record(store).await;
    tracing::debug!(
        "Rendering promo page (url present: {}, activated: {})",
        record.url.is_some(),
        record.activated
    );
    page::render(&record).map(Html).map_err(internal_error)
}

pub async fn update_promo<S: KeyValueStore>(
    State(state): State<AppState<S>>,
    Json(promo_specification): Json<PromoSpecification>,
) -> Result<Json<PromoState>, (StatusCode, String)> {
    let url = promo_specification
        .url
        .as_deref()
        .map(parse_url)
        .transpose()?;
    let mut entries = Vec::with_capacity(2);
    if let Some(url) = &url {
        entries.push((URL_KEY, url.as_str()));
    }
    if let Some(activated) = promo_specification.activated {
        entries.push((ACTIVATED_KEY, activated_value(activated)));
    }
    if !entries.is_empty() {
        with_timeout(DEFAULT_TIMEOUT, state.store.put_all(&entries))
            .await?
            .map_err(internal_error)?;
    }
    let record = fetch_record(&state.store).await?;
    tracing::info!("Promo updated (activated: {})", record.activated);
    Ok(Json(PromoState::from(&record)))
}

/// Reads both entries, failing on any store error or timeout.
async fn fetch_record<S: KeyValueStore>(store: &S) -> Result<PromoRecord, (StatusCode, String)> {
    let url = with_timeout(DEFAULT_TIMEOUT, store.get(URL_KEY))
        .await?
        .map_err(internal_error)?;
    let activated = with_timeout(DEFAULT_TIMEOUT, store.get(ACTIVATED_KEY))
        .await?
        .map_err(internal_error)?;
    Ok(PromoRecord::from_entries(url, activated.as_deref()))
}

/// Reads both entries fresh. Failures are logged and read as absent.
async fn load_record<S: KeyValueStore>(store: &S) -> PromoRecord {
    let url = read_entry(store, URL_KEY).await;
    let activated = read_entry(store, ACTIVATED_KEY).await;
    PromoRecord::from_entries(url, activated.as_deref())
}

async fn read_entry<S: KeyValueStore>(store: &S, key: &str) -> Option<String> {
    let read_timeout = Duration::from_millis(DEFAULT_TIMEOUT);
    match tokio::time::timeout(read_timeout, store.get(key)).await {
        Err(elapsed) => {
            tracing::error!("Reading {} timeout: {:?}", key, elapsed);
            None
        }
        Ok(Err(err)) => {
            tracing::error!("Reading {} failed: {}", key, err);
            None
        }
        Ok(Ok(value)) => value,
    }
}
