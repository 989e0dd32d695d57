use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    /// Parent domain every claimed agent name is created under.
    pub ens_base_domain: Arc<str>,
}

impl AppState {
    pub fn new(ens_base_domain: &str) -> Self {
        AppState {
            ens_base_domain: Arc::from(ens_base_domain),
        }
    }
}
