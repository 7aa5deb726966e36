//! Mission CLI - Command line interface for the Mission Control server.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use mission_client::{
    spawn_activity, spawn_board, BoardCommand, BoardController, BoardEvent, BoardSnapshot,
    DropOutcome, DropTarget, HttpClient, TaskApi, ACTIVITY_POLL_INTERVAL, BOARD_POLL_INTERVAL,
};
use mission_core::{
    AgentActivity, Assignee, AssigneeFilter, CalendarEvent, CalendarPatch, CalendarQuery,
    EventId, EventType, NewCalendarEvent, NewTask, Recurrence, ReviewDecision, ReviewDraft,
    Task, TaskId, TaskPatch, TaskStatus,
};

type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Mission CLI - Task board and calendar management tool
#[derive(Parser)]
#[command(name = "mission")]
#[command(about = "CLI for the Mission Control server", long_about = None)]
struct Cli {
    /// Server base URL
    #[arg(short, long, env = "MISSION_ENDPOINT", default_value = "http://127.0.0.1:3000")]
    endpoint: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List tasks
    List {
        /// Only show tasks for this assignee (all, human, agent)
        #[arg(short, long, default_value = "all")]
        assignee: AssigneeFilter,
    },

    /// Create a new task
    Add {
        /// Task title
        title: String,

        /// Longer description
        #[arg(short, long)]
        description: Option<String>,

        /// Initial column
        #[arg(short, long, default_value = "backlog")]
        status: TaskStatus,

        /// Who works on it
        #[arg(short, long, default_value = "human")]
        assignee: Assignee,
    },

    /// Edit a task's fields
    Edit {
        /// Task ID
        id: String,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(short, long, conflicts_with = "clear_description")]
        description: Option<String>,

        /// Remove the description
        #[arg(long)]
        clear_description: bool,

        #[arg(short, long)]
        assignee: Option<Assignee>,
    },

    /// Move a task from backlog to in progress
    Start {
        /// Task ID
        id: String,
    },

    /// Send a task to review
    Submit {
        /// Task ID
        id: String,
    },

    /// Approve a task in review
    Approve {
        /// Task ID
        id: String,
    },

    /// Send a task in review back with feedback
    Reject {
        /// Task ID
        id: String,

        /// Feedback for the assignee
        #[arg(short, long)]
        notes: Option<String>,
    },

    /// Move a task to another column, like dragging it on the board
    Move {
        /// Task ID
        id: String,

        /// Target column
        status: TaskStatus,
    },

    /// Delete a task
    Delete {
        /// Task ID
        id: String,
    },

    /// Show the board and keep it updated until Ctrl-C
    Watch {
        /// Only show tasks for this assignee (all, human, agent)
        #[arg(short, long, default_value = "all")]
        assignee: AssigneeFilter,
    },

    /// Manage calendar events
    #[command(subcommand)]
    Calendar(CalendarCommands),
}

#[derive(Subcommand)]
enum CalendarCommands {
    /// List events
    List {
        /// Month prefix, e.g. 2024-03
        #[arg(short, long)]
        month: Option<String>,

        /// First day of a range, inclusive
        #[arg(long, requires = "end")]
        start: Option<String>,

        /// Last day of a range, inclusive
        #[arg(long, requires = "start")]
        end: Option<String>,
    },

    /// Create an event
    Add {
        /// Event title
        title: String,

        /// ISO date, e.g. 2024-03-15
        date: String,

        #[arg(short, long)]
        description: Option<String>,

        /// Start time, e.g. 09:00
        #[arg(long)]
        time: Option<String>,

        #[arg(long)]
        end_time: Option<String>,

        /// Event type (cron, task, reminder)
        #[arg(
            short = 'k',
            long = "type",
            default_value = "task",
            value_parser = parse_wire::<EventType>
        )]
        kind: EventType,

        #[arg(short, long)]
        assignee: Option<Assignee>,

        /// Recurrence (daily, weekly, monthly)
        #[arg(short, long, value_parser = parse_wire::<Recurrence>)]
        recurring: Option<Recurrence>,
    },

    /// Update an event
    Update {
        /// Event ID
        id: String,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(long)]
        date: Option<String>,

        #[arg(long)]
        time: Option<String>,

        #[arg(short, long)]
        description: Option<String>,
    },

    /// Delete an event
    Delete {
        /// Event ID
        id: String,
    },
}

#[tokio::main]
async fn main() -> CliResult {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    debug!(endpoint = %cli.endpoint, "Using server");
    let client = Arc::new(HttpClient::new(&cli.endpoint));

    match cli.command {
        Commands::List { assignee } => list_tasks(&client, assignee).await?,
        Commands::Add {
            title,
            description,
            status,
            assignee,
        } => {
            let mut input = NewTask::new(title)
                .with_status(status)
                .with_assignee(assignee);
            input.description = description;
            let task = BoardController::new(client).create_task(input).await?;
            println!("Task created:");
            print_task(&task);
        }
        Commands::Edit {
            id,
            title,
            description,
            clear_description,
            assignee,
        } => {
            let patch = TaskPatch {
                title,
                description: if clear_description {
                    Some(None)
                } else {
                    description.map(Some)
                },
                assignee,
                ..TaskPatch::default()
            };
            if patch.is_empty() {
                return Err("nothing to change".into());
            }
            let task = BoardController::new(client)
                .edit_task(&TaskId::new(id), patch)
                .await?;
            println!("Task updated:");
            print_task(&task);
        }
        Commands::Start { id } => {
            let task = BoardController::new(client)
                .start_task(&TaskId::new(id))
                .await?;
            println!("Task started:");
            print_task(&task);
        }
        Commands::Submit { id } => {
            let task = BoardController::new(client)
                .submit_for_review(&TaskId::new(id))
                .await?;
            println!("Task submitted for review:");
            print_task(&task);
        }
        Commands::Approve { id } => {
            let mut draft = ReviewDraft::new(TaskId::new(id));
            draft.select(ReviewDecision::Approve);
            let task = BoardController::new(client).review(draft).await?;
            println!("Task approved:");
            print_task(&task);
        }
        Commands::Reject { id, notes } => {
            let mut draft = ReviewDraft::new(TaskId::new(id));
            draft.select(ReviewDecision::Reject);
            if let Some(notes) = notes {
                draft.set_feedback(notes);
            }
            let task = BoardController::new(client).review(draft).await?;
            println!("Task sent back:");
            print_task(&task);
        }
        Commands::Move { id, status } => move_task(client, TaskId::new(id), status).await?,
        Commands::Delete { id } => {
            BoardController::new(client)
                .delete_task(&TaskId::new(id.clone()))
                .await?;
            println!("Task deleted: {id}");
        }
        Commands::Watch { assignee } => watch(client, assignee).await?,
        Commands::Calendar(command) => calendar(&client, command).await?,
    }

    Ok(())
}

async fn list_tasks(client: &HttpClient, filter: AssigneeFilter) -> CliResult {
    let tasks: Vec<Task> = client
        .list_tasks()
        .await?
        .into_iter()
        .filter(|t| filter.matches(t))
        .collect();

    println!("Tasks ({}):", tasks.len());
    println!(
        "{:<36}  {:<12}  {:<8}  {:<19}  {}",
        "ID", "STATUS", "ASSIGNEE", "UPDATED", "TITLE"
    );
    println!("{}", "-".repeat(100));

    for task in tasks {
        println!(
            "{:<36}  {:<12}  {:<8}  {:<19}  {}",
            task.id,
            task.status,
            task.assignee,
            format_timestamp(task.updated_at),
            task.title
        );
    }

    Ok(())
}

async fn move_task(client: Arc<HttpClient>, id: TaskId, status: TaskStatus) -> CliResult {
    let mut board = BoardController::new(client);
    board.refresh().await?;
    let Some(current) = board.tasks().iter().find(|t| t.id == id).map(|t| t.status) else {
        return Err(format!("task not found: {id}").into());
    };
    if skips_workflow(current, status) {
        eprintln!(
            "warning: {} -> {} skips the usual workflow",
            current.label(),
            status.label()
        );
    }

    match board.drop_task(&id, Some(DropTarget::Column(status))).await {
        DropOutcome::StatusChanged {
            from,
            to,
            persisted: true,
        } => println!("Task {id} moved: {from} -> {to}"),
        DropOutcome::StatusChanged { .. } => {
            return Err(format!("failed to move task {id}").into());
        }
        _ => println!("Task {id} is already in {status}"),
    }

    Ok(())
}

async fn watch(client: Arc<HttpClient>, filter: AssigneeFilter) -> CliResult {
    let (board, mut board_rx) = spawn_board(client.clone(), BOARD_POLL_INTERVAL);
    let (activity, mut activity_rx) = spawn_activity(client, ACTIVITY_POLL_INTERVAL);
    board.send(BoardCommand::SetFilter(filter)).await?;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,

            Some(event) = board_rx.recv() => match event {
                BoardEvent::TasksUpdated(snapshot) => print_board(&snapshot),
                BoardEvent::Error(message) => eprintln!("error: {message}"),
                BoardEvent::Dropped(_) => {}
            },

            Some(summary) = activity_rx.recv() => print_activity(&summary),
        }
    }

    activity.stop().await;
    board.stop().await?;
    Ok(())
}

async fn calendar(client: &HttpClient, command: CalendarCommands) -> CliResult {
    match command {
        CalendarCommands::List { month, start, end } => {
            let query = CalendarQuery { month, start, end };
            let events = client.list_events(&query).await?;

            println!("Events ({}):", events.len());
            println!(
                "{:<36}  {:<10}  {:<5}  {:<8}  {}",
                "ID", "DATE", "TIME", "TYPE", "TITLE"
            );
            println!("{}", "-".repeat(90));

            for event in events {
                println!(
                    "{:<36}  {:<10}  {:<5}  {:<8}  {}",
                    event.id,
                    event.date,
                    event.time.as_deref().unwrap_or("-"),
                    wire_name(&event.kind),
                    event.title
                );
            }
        }
        CalendarCommands::Add {
            title,
            date,
            description,
            time,
            end_time,
            kind,
            assignee,
            recurring,
        } => {
            let input = NewCalendarEvent {
                description,
                time,
                end_time,
                kind,
                assignee,
                recurring,
                ..NewCalendarEvent::new(title, date)
            };
            let event = client.create_event(&input).await?;
            println!("Event created:");
            print_event(&event);
        }
        CalendarCommands::Update {
            id,
            title,
            date,
            time,
            description,
        } => {
            let patch = CalendarPatch {
                title,
                date,
                time: time.map(Some),
                description: description.map(Some),
                ..CalendarPatch::default()
            };
            let event = client.update_event(&EventId::new(id), &patch).await?;
            println!("Event updated:");
            print_event(&event);
        }
        CalendarCommands::Delete { id } => {
            client.delete_event(&EventId::new(id.clone())).await?;
            println!("Event deleted: {id}");
        }
    }

    Ok(())
}

fn print_task(task: &Task) {
    println!("  ID:         {}", task.id);
    println!("  Title:      {}", task.title);
    println!("  Status:     {}", task.status.label());
    println!("  Assignee:   {}", task.assignee);
    if let Some(description) = &task.description {
        println!("  Details:    {description}");
    }
    if let Some(notes) = &task.review_notes {
        println!("  Feedback:   {notes}");
    }
    println!("  Created:    {}", format_timestamp(task.created_at));
    println!("  Updated:    {}", format_timestamp(task.updated_at));
}

fn print_event(event: &CalendarEvent) {
    println!("  ID:         {}", event.id);
    println!("  Title:      {}", event.title);
    println!("  Date:       {}", event.date);
    if let Some(time) = &event.time {
        match &event.end_time {
            Some(end) => println!("  Time:       {time} - {end}"),
            None => println!("  Time:       {time}"),
        }
    }
    println!("  Type:       {}", wire_name(&event.kind));
    if let Some(recurring) = &event.recurring {
        println!("  Repeats:    {}", wire_name(recurring));
    }
}

fn print_board(snapshot: &BoardSnapshot) {
    println!(
        "\n=== Board ({} tasks, filter: {}) ===",
        snapshot.visible().len(),
        snapshot.filter
    );
    for status in TaskStatus::ALL {
        let column = snapshot.column(status);
        println!("{} ({})", status.label(), column.len());
        for task in column {
            let notes = task
                .review_notes
                .as_deref()
                .map(|n| format!("  [{n}]"))
                .unwrap_or_default();
            println!("  - {} ({}){}", task.title, task.assignee, notes);
        }
    }
}

fn print_activity(activity: &AgentActivity) {
    let titles = |tasks: &[Task]| {
        tasks
            .iter()
            .map(|t| t.title.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };
    println!(
        "Agent: {} open | working on: {} | awaiting review: {}",
        activity.open_count(),
        titles(&activity.in_progress),
        titles(activity.awaiting_review())
    );
}

/// True for a move that is not one of the usual workflow steps.
fn skips_workflow(from: TaskStatus, to: TaskStatus) -> bool {
    from != to && !from.workflow_next().contains(&to)
}

/// Parse a value the way it is spelled on the wire.
fn parse_wire<T: DeserializeOwned>(s: &str) -> Result<T, String> {
    serde_json::from_value(serde_json::Value::String(s.to_string()))
        .map_err(|_| format!("invalid value '{s}'"))
}

/// Wire spelling of a unit enum.
fn wire_name<T: serde::Serialize>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(s)) => s,
        _ => String::new(),
    }
}

fn format_timestamp(ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(ms)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}
