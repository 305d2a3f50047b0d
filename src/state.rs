use crate::api::ApiClient;
use crate::session::SessionStore;

#[derive(Clone)]
pub struct AppState {
    pub api: ApiClient,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(api: ApiClient, sessions: SessionStore) -> Self {
        Self { api, sessions }
    }
}
