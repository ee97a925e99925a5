pub mod context;
pub mod store;

pub use context::{AuthContext, SessionPhase, SessionState};
pub use store::SessionStore;
