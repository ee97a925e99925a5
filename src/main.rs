use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use taskforge_client::error::Result;
use taskforge_client::models::{Task, TaskInput, TaskStatus};
use taskforge_client::routes::{Navigation, Route, RouteGuard};
use taskforge_client::{Client, Config};

#[derive(Parser, Debug)]
#[command(name = "taskforge", about = "Manage your TaskForge tasks from the terminal")]
struct Cli {
    /// Base URL of the TaskForge API (overrides API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Where the session is stored (overrides SESSION_FILE)
    #[arg(long, global = true)]
    session_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an account and sign in
    Register {
        #[arg(long)]
        email: String,
        #[arg(long, env = "TASKFORGE_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        name: String,
    },
    /// Sign in
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "TASKFORGE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Work with your tasks
    #[command(subcommand)]
    Tasks(TaskCommand),
}

#[derive(Subcommand, Debug)]
enum TaskCommand {
    /// List your tasks
    List,
    /// Show one task
    Show { id: i32 },
    /// Create a task
    Create(TaskFields),
    /// Change fields of a task; unspecified fields keep their value
    Update {
        id: i32,
        #[command(flatten)]
        fields: TaskFields,
    },
    /// Delete a task
    Delete { id: i32 },
}

#[derive(Args, Debug)]
struct TaskFields {
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    description: Option<String>,
    /// pending, in-progress or completed
    #[arg(long)]
    status: Option<TaskStatus>,
    /// RFC 3339 timestamp, e.g. 2024-05-01T17:00:00Z
    #[arg(long, value_parser = parse_due_date)]
    due: Option<DateTime<Utc>>,
}

impl TaskFields {
    fn apply(self, mut input: TaskInput) -> TaskInput {
        if let Some(title) = self.title {
            input.title = title;
        }
        if let Some(description) = self.description {
            input.description = description;
        }
        if let Some(status) = self.status {
            input.status = status;
        }
        if self.due.is_some() {
            input.due_date = self.due;
        }
        input
    }
}

fn parse_due_date(raw: &str) -> std::result::Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw)
        .map(|date| date.with_timezone(&Utc))
        .map_err(|e| format!("invalid date '{}': {}", raw, e))
}

/// Applies the route guard to `route`. False means the command must not run.
fn enter(client: &Client, route: Route) -> bool {
    match RouteGuard::navigate(&route.path(), &client.auth.state()) {
        Navigation::Render(_) => true,
        Navigation::Placeholder => {
            eprintln!("Session is still loading, try again.");
            false
        }
        Navigation::Redirect { to, .. } => {
            eprintln!("You are not signed in ({}). Run `taskforge login` first.", to);
            false
        }
    }
}

fn print_task(task: &Task) {
    println!("#{} {} [{}]", task.id, task.title, task.status);
    if !task.description.is_empty() {
        println!("    {}", task.description);
    }
    if let Some(due) = task.due_date {
        println!("    due {}", due.to_rfc3339());
    }
}

async fn run(client: &Client, command: Command) -> Result<bool> {
    match command {
        Command::Register {
            email,
            password,
            name,
        } => {
            let user = client.auth.register(&email, &password, &name).await?;
            println!("Welcome, {}! You are signed in as {}.", user.name, user.email);
        }
        Command::Login { email, password } => {
            let user = client.auth.login(&email, &password).await?;
            println!("Signed in as {} ({}).", user.name, user.email);
        }
        Command::Logout => {
            client.auth.logout();
            println!("Signed out.");
        }
        Command::Whoami => {
            if !enter(client, Route::Profile) {
                return Ok(false);
            }
            if let Some(user) = client.auth.state().user() {
                println!("{} <{}> (id {})", user.name, user.email, user.id);
                if let Some(created_at) = user.created_at {
                    println!("Member since {}", created_at.format("%Y-%m-%d"));
                }
            }
        }
        Command::Tasks(command) => return run_tasks(client, command).await,
    }
    Ok(true)
}

async fn run_tasks(client: &Client, command: TaskCommand) -> Result<bool> {
    let route = match &command {
        TaskCommand::List | TaskCommand::Delete { .. } => Route::Tasks,
        TaskCommand::Show { id } => Route::TaskDetail(*id),
        TaskCommand::Create(_) => Route::NewTask,
        TaskCommand::Update { id, .. } => Route::EditTask(*id),
    };
    if !enter(client, route) {
        return Ok(false);
    }

    match command {
        TaskCommand::List => {
            let tasks = client.tasks.list().await?;
            if tasks.is_empty() {
                println!("No tasks yet.");
            }
            for task in &tasks {
                print_task(task);
            }
        }
        TaskCommand::Show { id } => print_task(&client.tasks.get(id).await?),
        TaskCommand::Create(fields) => {
            let input = fields.apply(TaskInput {
                title: String::new(),
                description: String::new(),
                status: TaskStatus::default(),
                due_date: None,
            });
            let task = client.tasks.create(&input).await?;
            println!("Created task #{}.", task.id);
        }
        TaskCommand::Update { id, fields } => {
            let current = client.tasks.get(id).await?;
            let task = client.tasks.update(id, &fields.apply(current.to_input())).await?;
            print_task(&task);
        }
        TaskCommand::Delete { id } => {
            client.tasks.delete(id).await?;
            println!("Deleted task #{}.", id);
        }
    }
    Ok(true)
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::from_env()?;
    if let Some(api_url) = &cli.api_url {
        config = config.with_api_url(api_url);
    }
    if let Some(session_file) = &cli.session_file {
        config = config.with_session_file(session_file.clone());
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    env_logger::init();
    let cli = Cli::parse();

    let outcome = match load_config(&cli).and_then(|config| {
        log::debug!("Using API at {}", config.api_url);
        Client::open(&config)
    }) {
        Ok(client) => run(&client, cli.command).await,
        Err(e) => Err(e),
    };

    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {}", e.user_message());
            ExitCode::FAILURE
        }
    }
}
