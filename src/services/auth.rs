use crate::api::ApiClient;
use crate::error::{AppError, Result};
use crate::models::{AuthResponse, LoginRequest, RegisterRequest, User};
use crate::session::SessionStore;
use log::{error, info, warn};
use serde::Deserialize;
use validator::Validate;

/// Wire shape of a register/login answer. Both fields are checked before
/// anything is persisted.
#[derive(Debug, Deserialize)]
struct AuthPayload {
    token: Option<String>,
    user: Option<User>,
}

/// Register, login and logout against the API, keeping the persisted session
/// in step with the outcome.
#[derive(Clone)]
pub struct AuthService {
    api: ApiClient,
    session: SessionStore,
}

impl AuthService {
    pub fn new(api: ApiClient, session: SessionStore) -> Self {
        Self { api, session }
    }

    /// Creates an account and starts a session for it.
    ///
    /// Empty fields fail with `AppError::Validation` before any request is
    /// sent. On success the token and user are persisted before returning.
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse> {
        request.validate()?;
        let payload: AuthPayload = self.api.post("/api/register", request).await?;
        let response = self.persist(payload, "register")?;
        info!("Registered user {} ({})", response.user.id, response.user.email);
        Ok(response)
    }

    /// Signs in with email and password. Same contract as [`register`](Self::register).
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse> {
        request.validate()?;
        let payload: AuthPayload = self.api.post("/api/login", request).await?;
        let response = self.persist(payload, "login")?;
        info!("Logged in as user {} ({})", response.user.id, response.user.email);
        Ok(response)
    }

    /// Forgets the persisted session. Local only; there is no server session
    /// to end. Storage failures are logged and otherwise ignored.
    pub fn logout(&self) {
        if let Err(e) = self.session.clear() {
            warn!("Failed to clear persisted session: {}", e);
        }
    }

    /// The cached profile of the signed-in user. Never touches the network.
    pub fn current_user(&self) -> Option<User> {
        self.session.read_user()
    }

    /// True when a token is persisted. The server may still reject it.
    pub fn is_authenticated(&self) -> bool {
        self.session.read_token().is_some()
    }

    fn persist(&self, payload: AuthPayload, operation: &str) -> Result<AuthResponse> {
        let (token, user) = match (payload.token, payload.user) {
            (Some(token), Some(user)) if !token.is_empty() => (token, user),
            (token, _) => {
                let missing = if token.as_deref().map_or(true, str::is_empty) {
                    "token"
                } else {
                    "user"
                };
                error!("{} response is missing the {}", operation, missing);
                return Err(AppError::InvalidResponse(format!(
                    "{} response did not include a token and user",
                    operation
                )));
            }
        };

        self.session.save(&token, &user)?;
        Ok(AuthResponse { token, user })
    }
}
