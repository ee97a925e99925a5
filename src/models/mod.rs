pub mod task;
pub mod user;

pub use task::{Task, TaskInput, TaskStatus};
pub use user::{AuthResponse, LoginRequest, RegisterRequest, User};
