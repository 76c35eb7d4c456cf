use std::sync::Arc;

use crate::auth::AuthGate;
use crate::config::Config;
use crate::session::SessionStore;
use crate::Storage;

pub struct State {
    pub storage: Storage,
    pub auth: AuthGate,
    pub sessions: SessionStore,
}

impl State {
    pub fn new(config: &Config, storage: Storage) -> Arc<Self> {
        Arc::new(Self {
            storage,
            auth: AuthGate::new(&config.admin_password, &config.session_secret),
            sessions: SessionStore::new(&config.session_secret),
        })
    }
}
