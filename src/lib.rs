#![doc = "The `taskforge_client` library crate."]
#![doc = ""]
#![doc = "Client side of TaskForge: the persisted session, the HTTP gateway that"]
#![doc = "attaches the session token to every request, the auth and task services,"]
#![doc = "the session-state broadcaster and the route guard. The `taskforge` binary"]
#![doc = "(`main.rs`) is a command-line front end built on top of it."]

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod session;
pub mod storage;

pub use crate::api::ApiClient;
pub use crate::config::Config;
pub use crate::error::{AppError, RemoteError, RemotePayload};
pub use crate::session::{AuthContext, SessionState, SessionStore};

use std::sync::Arc;

/// Everything a front end needs, wired around one session store.
pub struct Client {
    pub auth: AuthContext,
    pub tasks: services::TaskService,
}

impl Client {
    /// Wires the client over `storage` and hydrates the session from it.
    pub fn new(config: &Config, storage: Arc<dyn storage::SessionStorage>) -> error::Result<Self> {
        let session = SessionStore::new(storage);
        let api = ApiClient::from_config(config, session.clone())?;
        let auth = AuthContext::new(services::AuthService::new(api.clone(), session));
        Ok(Self {
            auth,
            tasks: services::TaskService::new(api),
        })
    }

    /// Same as [`Client::new`] with the session persisted in `config.session_file`.
    pub fn open(config: &Config) -> error::Result<Self> {
        let storage = storage::FileStorage::open(&config.session_file);
        Self::new(config, Arc::new(storage))
    }
}
