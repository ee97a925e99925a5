use crate::error::Result;
use crate::models::User;
use crate::storage::SessionStorage;
use log::warn;
use std::sync::Arc;

/// Storage key holding the raw bearer token.
pub const TOKEN_KEY: &str = "token";
/// Storage key holding the JSON-serialized user profile.
pub const USER_KEY: &str = "user";

/// The persisted half of the session: the bearer token and the cached user
/// profile, kept together in durable storage.
///
/// Reads never fail. Anything that cannot be read back (a storage error, a
/// profile that no longer parses) is reported as absent.
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn SessionStorage>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self { storage }
    }

    /// Writes token and user in a single storage write.
    pub(crate) fn save(&self, token: &str, user: &User) -> Result<()> {
        let user_json = serde_json::to_string(user)?;
        self.storage
            .set_many(&[(TOKEN_KEY, token.to_string()), (USER_KEY, user_json)])
    }

    /// Removes both keys. Clearing an empty store is a no-op.
    pub(crate) fn clear(&self) -> Result<()> {
        self.storage.remove_many(&[TOKEN_KEY, USER_KEY])
    }

    pub fn read_token(&self) -> Option<String> {
        match self.storage.get(TOKEN_KEY) {
            Ok(token) => token,
            Err(e) => {
                warn!("Failed to read session token: {}", e);
                None
            }
        }
    }

    pub fn read_user(&self) -> Option<User> {
        let raw = match self.storage.get(USER_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!("Failed to read cached user: {}", e);
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!("Ignoring malformed cached user: {}", e);
                None
            }
        }
    }
}
