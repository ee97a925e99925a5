pub mod guard;

pub use guard::{GuardDecision, Navigation, RouteGuard};

use std::fmt;

pub const LOGIN_PATH: &str = "/login";
pub const NOT_FOUND_PATH: &str = "/404";

/// Every screen of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    Register,
    NotFound,
    Tasks,
    NewTask,
    TaskDetail(i32),
    EditTask(i32),
    Profile,
}

impl Route {
    /// Resolves a path such as `/tasks/12/edit`. Query strings, fragments and
    /// a trailing slash are ignored. `None` for paths with no screen.
    pub fn parse(path: &str) -> Option<Route> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Some(Route::Home),
            ["login"] => Some(Route::Login),
            ["register"] => Some(Route::Register),
            ["404"] => Some(Route::NotFound),
            ["profile"] => Some(Route::Profile),
            ["tasks"] => Some(Route::Tasks),
            ["tasks", "new"] => Some(Route::NewTask),
            ["tasks", id] => parse_id(id).map(Route::TaskDetail),
            ["tasks", id, "edit"] => parse_id(id).map(Route::EditTask),
            _ => None,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Login => LOGIN_PATH.to_string(),
            Route::Register => "/register".to_string(),
            Route::NotFound => NOT_FOUND_PATH.to_string(),
            Route::Tasks => "/tasks".to_string(),
            Route::NewTask => "/tasks/new".to_string(),
            Route::TaskDetail(id) => format!("/tasks/{}", id),
            Route::EditTask(id) => format!("/tasks/{}/edit", id),
            Route::Profile => "/profile".to_string(),
        }
    }

    /// Whether the route may only be shown to a signed-in user.
    pub fn is_protected(&self) -> bool {
        matches!(
            self,
            Route::Tasks
                | Route::NewTask
                | Route::TaskDetail(_)
                | Route::EditTask(_)
                | Route::Profile
        )
    }
}

fn parse_id(segment: &str) -> Option<i32> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.path())
    }
}
