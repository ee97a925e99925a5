//! Process-wide session state and the transitions that change it.
//!
//! An [`AuthContext`] owns the one [`SessionState`] of a running client and
//! publishes every change on a `tokio::sync::watch` channel. Views and the
//! route guard either take a snapshot with [`AuthContext::state`] or hold a
//! receiver from [`AuthContext::subscribe`].
//!
//! The session starts `hydrating`, becomes `authenticated` when a cached
//! profile is found and `anonymous` otherwise. Login and register move it to
//! `authenticated`; logout moves it to `anonymous`.
//!
//! `loading` is raised while hydrating and while a login or register call is
//! in flight. Concurrent calls are last-writer-wins: whichever resolves last
//! decides the final state, and a login that resolves after a logout signs
//! the user back in.

use crate::error::Result;
use crate::models::{LoginRequest, RegisterRequest, User};
use crate::services::AuthService;
use log::{debug, info};
use tokio::sync::watch;

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Hydrating,
    Authenticated,
    Anonymous,
}

/// Snapshot of the session as seen by views.
///
/// `is_authenticated()` is derived from `user`, so the two can never disagree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    user: Option<User>,
    loading: bool,
    hydrated: bool,
}

impl SessionState {
    pub fn hydrating() -> Self {
        Self {
            user: None,
            loading: true,
            hydrated: false,
        }
    }

    pub fn anonymous() -> Self {
        Self {
            user: None,
            loading: false,
            hydrated: true,
        }
    }

    pub fn authenticated(user: User) -> Self {
        Self {
            user: Some(user),
            loading: false,
            hydrated: true,
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn phase(&self) -> SessionPhase {
        if !self.hydrated {
            SessionPhase::Hydrating
        } else if self.user.is_some() {
            SessionPhase::Authenticated
        } else {
            SessionPhase::Anonymous
        }
    }

    fn with_loading(&self, loading: bool) -> Self {
        Self {
            loading,
            ..self.clone()
        }
    }
}

/// The session-state broadcaster.
pub struct AuthContext {
    service: AuthService,
    state: watch::Sender<SessionState>,
}

impl AuthContext {
    /// Creates the context and hydrates it from the persisted session.
    pub fn new(service: AuthService) -> Self {
        let context = Self::hydrating(service);
        context.hydrate();
        context
    }

    /// Creates the context in the `hydrating` state without reading storage,
    /// so subscribers can attach before [`hydrate`](Self::hydrate) runs.
    pub fn hydrating(service: AuthService) -> Self {
        let (state, _) = watch::channel(SessionState::hydrating());
        Self { service, state }
    }

    /// Rebuilds the in-memory session from the cached user profile.
    /// Local read only; the token is not checked with the server.
    pub fn hydrate(&self) {
        match self.service.current_user() {
            Some(user) => {
                debug!("Hydrated session for user {}", user.id);
                self.set_authenticated(user);
            }
            None => {
                debug!("No persisted session found");
                self.set_anonymous();
            }
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn service(&self) -> &AuthService {
        &self.service
    }

    /// Signs in. On failure the previous user is kept and the error is
    /// returned unchanged for display.
    pub async fn login(&self, email: &str, password: &str) -> Result<User> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.set_loading(true);
        let outcome = self.service.login(&request).await;
        self.finish(outcome.map(|response| response.user))
    }

    /// Creates an account and signs in as it. Same contract as [`login`](Self::login).
    pub async fn register(&self, email: &str, password: &str, name: &str) -> Result<User> {
        let request = RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
            name: name.to_string(),
        };
        self.set_loading(true);
        let outcome = self.service.register(&request).await;
        self.finish(outcome.map(|response| response.user))
    }

    /// Ends the session locally. Never fails.
    pub fn logout(&self) {
        self.service.logout();
        self.set_anonymous();
    }

    fn finish(&self, outcome: Result<User>) -> Result<User> {
        match outcome {
            Ok(user) => {
                self.set_authenticated(user.clone());
                Ok(user)
            }
            Err(e) => {
                self.set_loading(false);
                Err(e)
            }
        }
    }

    pub(crate) fn set_authenticated(&self, user: User) {
        info!("Session authenticated as user {}", user.id);
        self.state.send_replace(SessionState::authenticated(user));
    }

    pub(crate) fn set_anonymous(&self) {
        info!("Session is anonymous");
        self.state.send_replace(SessionState::anonymous());
    }

    fn set_loading(&self, loading: bool) {
        self.state.send_modify(|state| *state = state.with_loading(loading));
    }
}
