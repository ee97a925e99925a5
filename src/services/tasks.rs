use crate::api::ApiClient;
use crate::error::{AppError, Result};
use crate::models::{Task, TaskInput};
use log::debug;
use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize)]
struct TaskListEnvelope {
    #[serde(default)]
    tasks: Option<Vec<Task>>,
}

#[derive(Debug, Deserialize)]
struct TaskEnvelope {
    #[serde(default)]
    task: Option<Task>,
}

impl TaskEnvelope {
    fn into_task(self, operation: &str) -> Result<Task> {
        self.task.ok_or_else(|| {
            AppError::InvalidResponse(format!("{} response did not include a task", operation))
        })
    }
}

/// CRUD over the signed-in user's tasks. Every call goes through the shared
/// [`ApiClient`] and so carries the session token.
#[derive(Clone)]
pub struct TaskService {
    api: ApiClient,
}

impl TaskService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// `GET /tasks`. A response without a task list counts as empty.
    pub async fn list(&self) -> Result<Vec<Task>> {
        let envelope: TaskListEnvelope = self.api.get("/tasks").await?;
        let tasks = envelope.tasks.unwrap_or_default();
        debug!("Fetched {} tasks", tasks.len());
        Ok(tasks)
    }

    pub async fn get(&self, id: i32) -> Result<Task> {
        let envelope: TaskEnvelope = self.api.get(&format!("/tasks/{}", id)).await?;
        envelope.into_task("get task")
    }

    pub async fn create(&self, input: &TaskInput) -> Result<Task> {
        input.validate()?;
        let envelope: TaskEnvelope = self.api.post("/tasks", input).await?;
        envelope.into_task("create task")
    }

    pub async fn update(&self, id: i32, input: &TaskInput) -> Result<Task> {
        input.validate()?;
        let envelope: TaskEnvelope = self.api.put(&format!("/tasks/{}", id), input).await?;
        envelope.into_task("update task")
    }

    pub async fn delete(&self, id: i32) -> Result<()> {
        self.api.delete(&format!("/tasks/{}", id)).await
    }
}
