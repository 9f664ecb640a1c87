use crate::dao::KeyValueStore;
use std::path::Path;
use tower_http::services::ServeDir;

#[derive(Clone)]
pub struct AppState<S> {
    pub store: S,
    pub assets: ServeDir,
    pub api_key_digest: String,
}

impl<S: KeyValueStore> AppState<S> {
    pub fn new(store: S, assets_dir: impl AsRef<Path>, api_key_digest: String) -> Self {
        Self {
            store,
            assets: ServeDir::new(assets_dir),
            api_key_digest,
        }
    }
}
