//! In-process stand-in for the TaskForge API, served by actix-web on a random
//! local port. It mints JWTs on register/login, checks them on the task
//! routes, and records every `Authorization` header it sees.

#![allow(dead_code)]

use actix_web::dev::ServerHandle;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::net::TcpListener;
use std::path::PathBuf;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use taskforge_client::models::{Task, TaskInput, User};
use taskforge_client::storage::{MemoryStorage, SessionStorage};
use taskforge_client::{Client, Config};

const JWT_SECRET: &str = "mock-backend-secret";

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: i32,
    exp: usize,
}

/// A canned failure for the login endpoint.
#[derive(Clone)]
pub enum Failure {
    Json(u16, Value),
    Text(u16, String),
}

struct Account {
    user: User,
    password: String,
}

#[derive(Default)]
pub struct MockApi {
    accounts: Mutex<Vec<Account>>,
    tasks: Mutex<Vec<Task>>,
    next_user_id: AtomicI32,
    next_task_id: AtomicI32,
    login_delay: Mutex<Duration>,
    login_failure: Mutex<Option<Failure>>,
    authorization: Mutex<Vec<Option<String>>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self {
            next_user_id: AtomicI32::new(1),
            next_task_id: AtomicI32::new(1),
            ..Default::default()
        }
    }

    /// Adds an account. Ids are handed out in insertion order starting at 1.
    pub fn with_user(self, email: &str, password: &str, name: &str) -> Self {
        self.create_account(email, password, name);
        self
    }

    pub fn set_login_delay(&self, delay: Duration) {
        *self.login_delay.lock().unwrap() = delay;
    }

    pub fn fail_login_with(&self, failure: Failure) {
        *self.login_failure.lock().unwrap() = Some(failure);
    }

    /// `Authorization` headers received on task routes, oldest first.
    pub fn authorization_headers(&self) -> Vec<Option<String>> {
        self.authorization.lock().unwrap().clone()
    }

    fn create_account(&self, email: &str, password: &str, name: &str) -> User {
        let now = Utc::now();
        let user = User {
            id: self.next_user_id.fetch_add(1, Ordering::SeqCst),
            email: email.to_string(),
            name: name.to_string(),
            created_at: Some(now),
            updated_at: Some(now),
        };
        self.accounts.lock().unwrap().push(Account {
            user: user.clone(),
            password: password.to_string(),
        });
        user
    }

    fn authenticate(&self, req: &HttpRequest) -> Result<i32, HttpResponse> {
        let header = req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .map(str::to_string);
        self.authorization.lock().unwrap().push(header.clone());

        let token = match header.as_deref().and_then(|h| h.strip_prefix("Bearer ")) {
            Some(token) => token.to_string(),
            None => {
                return Err(HttpResponse::Unauthorized().json(json!({"error": "Missing token"})))
            }
        };
        decode::<Claims>(
            &token,
            &DecodingKey::from_secret(JWT_SECRET.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims.sub)
        .map_err(|_| HttpResponse::Unauthorized().json(json!({"error": "Invalid token"})))
    }
}

fn issue_token(user_id: i32) -> String {
    let exp = (Utc::now() + chrono::Duration::hours(24)).timestamp() as usize;
    encode(
        &Header::default(),
        &Claims { sub: user_id, exp },
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("token encoding")
}

#[derive(Deserialize)]
struct Credentials {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    name: String,
}

async fn register(api: web::Data<MockApi>, body: web::Json<Credentials>) -> HttpResponse {
    if body.email.is_empty() || body.password.is_empty() || body.name.is_empty() {
        return HttpResponse::BadRequest()
            .json(json!({"error": "Email, password, and name are required"}));
    }
    let exists = api
        .accounts
        .lock()
        .unwrap()
        .iter()
        .any(|a| a.user.email == body.email);
    if exists {
        return HttpResponse::Conflict()
            .json(json!({"error": "User with this email already exists"}));
    }

    let user = api.create_account(&body.email, &body.password, &body.name);
    HttpResponse::Created().json(json!({"token": issue_token(user.id), "user": user}))
}

async fn login(api: web::Data<MockApi>, body: web::Json<Credentials>) -> HttpResponse {
    let delay = *api.login_delay.lock().unwrap();
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    let failure = api.login_failure.lock().unwrap().clone();
    match failure {
        Some(Failure::Json(status, body)) => {
            return HttpResponse::build(status_code(status)).json(body)
        }
        Some(Failure::Text(status, body)) => {
            return HttpResponse::build(status_code(status))
                .content_type("text/plain")
                .body(body)
        }
        None => {}
    }

    let user = api
        .accounts
        .lock()
        .unwrap()
        .iter()
        .find(|a| a.user.email == body.email && a.password == body.password)
        .map(|a| a.user.clone());
    match user {
        Some(user) => {
            HttpResponse::Ok().json(json!({"token": issue_token(user.id), "user": user}))
        }
        None => HttpResponse::Unauthorized().json(json!({"error": "Invalid email or password"})),
    }
}

fn status_code(status: u16) -> actix_web::http::StatusCode {
    actix_web::http::StatusCode::from_u16(status).expect("valid status code")
}

fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(json!({"error": "Task not found"}))
}

async fn list_tasks(api: web::Data<MockApi>, req: HttpRequest) -> HttpResponse {
    let user_id = match api.authenticate(&req) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let tasks: Vec<Task> = api
        .tasks
        .lock()
        .unwrap()
        .iter()
        .filter(|t| t.user_id == user_id)
        .cloned()
        .collect();
    HttpResponse::Ok().json(json!({ "tasks": tasks }))
}

async fn get_task(api: web::Data<MockApi>, req: HttpRequest, path: web::Path<i32>) -> HttpResponse {
    let user_id = match api.authenticate(&req) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let id = path.into_inner();
    let task = api
        .tasks
        .lock()
        .unwrap()
        .iter()
        .find(|t| t.id == id && t.user_id == user_id)
        .cloned();
    match task {
        Some(task) => HttpResponse::Ok().json(json!({ "task": task })),
        None => not_found(),
    }
}

async fn create_task(
    api: web::Data<MockApi>,
    req: HttpRequest,
    body: web::Json<TaskInput>,
) -> HttpResponse {
    let user_id = match api.authenticate(&req) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    if body.title.is_empty() {
        return HttpResponse::BadRequest().json(json!({"error": "Title is required"}));
    }
    let input = body.into_inner();
    let now = Utc::now();
    let task = Task {
        id: api.next_task_id.fetch_add(1, Ordering::SeqCst),
        title: input.title,
        description: input.description,
        status: input.status,
        due_date: input.due_date,
        user_id,
        created_at: now,
        updated_at: now,
    };
    api.tasks.lock().unwrap().push(task.clone());
    HttpResponse::Created().json(json!({ "task": task }))
}

async fn update_task(
    api: web::Data<MockApi>,
    req: HttpRequest,
    path: web::Path<i32>,
    body: web::Json<TaskInput>,
) -> HttpResponse {
    let user_id = match api.authenticate(&req) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let id = path.into_inner();
    let input = body.into_inner();
    let mut tasks = api.tasks.lock().unwrap();
    match tasks.iter_mut().find(|t| t.id == id && t.user_id == user_id) {
        Some(task) => {
            task.title = input.title;
            task.description = input.description;
            task.status = input.status;
            task.due_date = input.due_date;
            task.updated_at = Utc::now();
            HttpResponse::Ok().json(json!({ "task": task }))
        }
        None => not_found(),
    }
}

async fn delete_task(
    api: web::Data<MockApi>,
    req: HttpRequest,
    path: web::Path<i32>,
) -> HttpResponse {
    let user_id = match api.authenticate(&req) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let id = path.into_inner();
    let mut tasks = api.tasks.lock().unwrap();
    let before = tasks.len();
    tasks.retain(|t| !(t.id == id && t.user_id == user_id));
    if tasks.len() == before {
        return not_found();
    }
    HttpResponse::NoContent().finish()
}

fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/register", web::post().to(register))
        .route("/api/login", web::post().to(login))
        .service(
            web::scope("/tasks")
                .route("", web::get().to(list_tasks))
                .route("", web::post().to(create_task))
                .route("/{id}", web::get().to(get_task))
                .route("/{id}", web::put().to(update_task))
                .route("/{id}", web::delete().to(delete_task)),
        );
}

pub struct TestServer {
    pub url: String,
    pub api: web::Data<MockApi>,
    handle: ServerHandle,
}

impl TestServer {
    /// Serves `api` on a random port. Must run inside an actix system
    /// (`#[actix_rt::test]`).
    pub fn start(api: MockApi) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();

        let api = web::Data::new(api);
        let app_api = api.clone();
        let server = HttpServer::new(move || {
            App::new()
                .app_data(app_api.clone())
                .wrap(Logger::default())
                .configure(config)
        })
        .workers(1)
        .listen(listener)
        .expect("Failed to listen on test port")
        .run();
        let handle = server.handle();
        actix_rt::spawn(server);

        Self {
            url: format!("http://127.0.0.1:{}", port),
            api,
            handle,
        }
    }

    pub fn config(&self) -> Config {
        Config {
            api_url: self.url.clone(),
            session_file: PathBuf::from("unused-session.json"),
            request_timeout: Some(Duration::from_secs(10)),
        }
    }

    /// A client over fresh in-memory storage.
    pub fn client(&self) -> Client {
        self.client_with(Arc::new(MemoryStorage::new()))
    }

    pub fn client_with(&self, storage: Arc<dyn SessionStorage>) -> Client {
        Client::new(&self.config(), storage).expect("client")
    }

    pub async fn stop(self) {
        self.handle.stop(true).await;
    }
}

/// A session file path unique to one test.
pub fn temp_session_file() -> PathBuf {
    std::env::temp_dir()
        .join(format!("taskforge-client-{}", uuid::Uuid::new_v4()))
        .join("session.json")
}
