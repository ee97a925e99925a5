use super::{Route, LOGIN_PATH, NOT_FOUND_PATH};
use crate::session::SessionState;
use log::debug;

/// What the guard allows for a protected route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// The session is still resolving: show a neutral placeholder and do not
    /// navigate anywhere yet.
    Placeholder,
    /// Not signed in. `replace` means the current history entry is replaced,
    /// so going back does not land on the protected route again.
    Redirect { to: String, replace: bool },
    Allow,
}

/// The outcome of navigating to a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Render(Route),
    Placeholder,
    Redirect { to: String, replace: bool },
}

/// Client-side gate in front of protected routes.
///
/// This only decides what is shown. The server still authorizes every
/// request on its own.
pub struct RouteGuard;

impl RouteGuard {
    pub fn check(state: &SessionState) -> GuardDecision {
        if state.is_loading() {
            GuardDecision::Placeholder
        } else if !state.is_authenticated() {
            GuardDecision::Redirect {
                to: LOGIN_PATH.to_string(),
                replace: true,
            }
        } else {
            GuardDecision::Allow
        }
    }

    /// Resolves `path` and applies [`check`](Self::check) when the route is
    /// protected. Unknown paths go to the not-found page.
    pub fn navigate(path: &str, state: &SessionState) -> Navigation {
        let route = match Route::parse(path) {
            Some(route) => route,
            None => {
                debug!("No route for {}, redirecting to {}", path, NOT_FOUND_PATH);
                return Navigation::Redirect {
                    to: NOT_FOUND_PATH.to_string(),
                    replace: true,
                };
            }
        };

        if !route.is_protected() {
            return Navigation::Render(route);
        }

        match Self::check(state) {
            GuardDecision::Allow => Navigation::Render(route),
            GuardDecision::Placeholder => Navigation::Placeholder,
            GuardDecision::Redirect { to, replace } => {
                debug!("{} requires a session, redirecting to {}", route, to);
                Navigation::Redirect { to, replace }
            }
        }
    }
}
