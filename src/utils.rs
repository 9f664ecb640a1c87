use axum::http::StatusCode;
use std::env;
use std::error::Error;
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;
use url::Url;

pub fn internal_error<E>(err: E) -> (StatusCode, String)
where
    E: Error,
{
    tracing::error!("{}", err);
    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
}

pub async fn with_timeout<F: Future>(
    duration_in_mills: u64,
    task: F,
) -> Result<<F as Future>::Output, (StatusCode, String)> {
    timeout(Duration::from_millis(duration_in_mills), task)
        .await
        .map_err(internal_error)
}

pub fn get_env(name: &str) -> String {
    env::var(name).unwrap_or_else(|_| panic!("Environment variable {} is required", name))
}

pub fn get_env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

pub fn parse_url(text: &str) -> Result<String, (StatusCode, String)> {
    Url::parse(text)
        .map(|url| url.to_string())
        .map_err(|_| (StatusCode::BAD_REQUEST, "Malformed url".into()))
}
