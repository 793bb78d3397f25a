//! Command-line front end for the Djalil OS core.
//!
//! # Responsibility
//! - Drive core services from a terminal against the configured database.
//! - Print either a short human summary or JSON (`--json`).
//!
//! # Invariants
//! - Storage, logging and settings locations come from `DJALIL_*` env vars.
//! - Without `--owner` every data command is a no-op.

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use djalil_core::db::open_db;
use djalil_core::notify::{
    check_project_deadlines, check_protocol_tasks, dispatch, Notification,
    NotificationSettingsPatch, Notifier, Permission, SettingsStore,
};
use djalil_core::window::noon_of;
use djalil_core::{
    init_logging_from, CoreConfig, DashboardService, Frequency, GoalService, JournalService,
    ProfileService, Recurrence, ServiceResult, Session, SqliteGoalRepository,
    SqliteJournalRepository, SqliteProfileRepository, SqliteStatRepository, SqliteTaskRepository,
    StatKind, StatService, Task, TaskService, WindowMode,
};
use rusqlite::Connection;
use serde::Serialize;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "djalil")]
#[command(about = "Djalil OS - tasks, goals, journal and cashflow", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Owner id; data commands do nothing without it
    #[arg(short, long, global = true, env = "DJALIL_OWNER")]
    owner: Option<String>,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Check core linkage
    Ping,

    /// Task management commands
    #[command(subcommand)]
    Task(TaskCommands),

    /// Goal management commands
    #[command(subcommand)]
    Goal(GoalCommands),

    /// Journal commands
    #[command(subcommand)]
    Journal(JournalCommands),

    /// Cashflow commands
    #[command(subcommand)]
    Stat(StatCommands),

    /// Show xp, level and rank
    Profile,

    /// Show today's dashboard
    Dashboard,

    /// Notification commands
    #[command(subcommand)]
    Notify(NotifyCommands),
}

#[derive(Subcommand)]
enum TaskCommands {
    /// Add a task on a day (default today)
    Add {
        title: String,

        /// once | daily | custom
        #[arg(short, long, default_value = "once")]
        frequency: String,

        /// Weekdays for `custom`, 0 = Sunday (comma-separated)
        #[arg(short = 'D', long, value_delimiter = ',')]
        days: Vec<u8>,

        /// Day as YYYY-MM-DD
        #[arg(short, long)]
        day: Option<NaiveDate>,
    },

    /// List tasks for a day, or for a window around now
    List {
        /// Day as YYYY-MM-DD (default today)
        #[arg(short, long, conflicts_with = "window")]
        day: Option<NaiveDate>,

        /// day | week | month
        #[arg(short, long)]
        window: Option<String>,
    },

    /// Mark a task completed
    Done { task_id: Uuid },

    /// Mark a task not completed
    Undo { task_id: Uuid },

    /// Delete a task
    Delete { task_id: Uuid },

    /// Days of the current month that hold tasks
    Calendar,
}

#[derive(Subcommand)]
enum GoalCommands {
    /// Add a goal
    Add {
        title: String,

        #[arg(short, long)]
        target: i64,

        /// Deadline as YYYY-MM-DD
        #[arg(short, long)]
        deadline: Option<NaiveDate>,
    },

    /// Set a goal's current progress
    Progress { goal_id: Uuid, current: i64 },

    /// List goals, newest first
    List,

    /// Delete a goal
    Delete { goal_id: Uuid },
}

#[derive(Subcommand)]
enum JournalCommands {
    /// Write an entry
    Add { content: String },

    /// List entries, newest first
    List,

    /// Delete an entry
    Delete { entry_id: Uuid },
}

#[derive(Subcommand)]
enum StatCommands {
    /// Record income or expense
    Add {
        amount: f64,

        /// income | expense
        kind: String,
    },

    /// Totals for the window around now
    Summary {
        /// day | week | month
        #[arg(short, long, default_value = "month")]
        window: String,
    },
}

#[derive(Subcommand)]
enum NotifyCommands {
    /// Run the reminder and deadline checks once and print what is due
    Check,

    /// Show or change notification settings
    Settings {
        #[arg(long)]
        enabled: Option<bool>,

        #[arg(long)]
        protocol_reminders: Option<bool>,

        #[arg(long)]
        project_deadlines: Option<bool>,

        /// HH:MM
        #[arg(long)]
        reminder_time: Option<String>,
    },
}

/// Prints notifications to stdout; a terminal is always permitted.
struct StdoutNotifier;

impl Notifier for StdoutNotifier {
    fn permission(&self) -> Permission {
        Permission::Granted
    }

    fn request_permission(&mut self) -> bool {
        true
    }

    fn send(&self, notification: &Notification) {
        println!("[{}] {}: {}", notification.tag, notification.title, notification.body);
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = CoreConfig::from_env();
    if let Err(err) = init_logging_from(&config) {
        eprintln!("warning: logging disabled: {err}");
    }
    let session = Session::from_raw(cli.owner.as_deref());

    match cli.command {
        Commands::Ping => {
            println!("djalil_core ping={}", djalil_core::ping());
            println!("djalil_core version={}", djalil_core::core_version());
            Ok(())
        }
        Commands::Task(command) => run_task(&open(&config)?, &session, command, cli.json),
        Commands::Goal(command) => run_goal(&open(&config)?, &session, command, cli.json),
        Commands::Journal(command) => run_journal(&open(&config)?, &session, command, cli.json),
        Commands::Stat(command) => run_stat(&open(&config)?, &session, command, cli.json),
        Commands::Profile => {
            let conn = open(&config)?;
            let view = ProfileService::new(SqliteProfileRepository::new(&conn)).profile(&session)?;
            match view {
                Some(view) if !cli.json => println!(
                    "{} | level {} | {} xp ({:.0}% to {})",
                    view.profile.rank, view.profile.level, view.profile.xp, view.xp_progress,
                    view.xp_for_next_level
                ),
                view => print_json(&view)?,
            }
            Ok(())
        }
        Commands::Dashboard => {
            let conn = open(&config)?;
            let snapshot = DashboardService::new(
                SqliteTaskRepository::new(&conn),
                SqliteGoalRepository::new(&conn),
                SqliteProfileRepository::new(&conn),
            )
            .build_dashboard(&session, &Local::now())?;
            match snapshot {
                Some(snapshot) if !cli.json => {
                    println!(
                        "{} | level {} | {} xp",
                        snapshot.profile.profile.rank,
                        snapshot.profile.profile.level,
                        snapshot.profile.profile.xp
                    );
                    println!("protocol {}%", snapshot.protocol_score);
                    print_tasks(&snapshot.protocol);
                    println!("tactical {}%", snapshot.tactical_score);
                    print_tasks(&snapshot.tactical);
                    for card in &snapshot.goals {
                        println!(
                            "goal {} {}/{} ({:.0}%)",
                            card.goal.title, card.goal.current, card.goal.target, card.progress
                        );
                    }
                }
                snapshot => print_json(&snapshot)?,
            }
            Ok(())
        }
        Commands::Notify(command) => run_notify(&config, &session, command, cli.json),
    }
}

fn run_task(conn: &Connection, session: &Session, command: TaskCommands, json: bool) -> Result<()> {
    let service = TaskService::new(SqliteTaskRepository::new(conn));
    match command {
        TaskCommands::Add {
            title,
            frequency,
            days,
            day,
        } => {
            let frequency = Frequency::parse(frequency.trim())
                .with_context(|| format!("unknown frequency `{frequency}`"))?;
            let recurrence = Recurrence::from_parts(frequency, Some(days))?;
            let day = day.unwrap_or_else(|| Local::now().date_naive());
            let task = service.add_task(session, &title, recurrence, day, &Local)?;
            report_created(task.as_ref().map(|task| task.id), json)
        }
        TaskCommands::List { day, window } => {
            let now = Local::now();
            let tasks = match window {
                Some(mode) => service.list_window(session, parse_window(&mode)?, &now)?,
                None => service.list_tasks(session, day, &now)?,
            };
            if json {
                print_json(&tasks)
            } else {
                print_tasks(&tasks);
                Ok(())
            }
        }
        TaskCommands::Done { task_id } => toggle(&service, session, task_id, true, json),
        TaskCommands::Undo { task_id } => toggle(&service, session, task_id, false, json),
        TaskCommands::Delete { task_id } => {
            report_deleted(session, task_id, |id| service.delete(session, id))
        }
        TaskCommands::Calendar => {
            let days = service.task_days_in_month(session, &Local::now())?;
            if json {
                print_json(&days)
            } else {
                let days: Vec<String> = days.iter().map(u32::to_string).collect();
                println!("{}", days.join(" "));
                Ok(())
            }
        }
    }
}

fn toggle(
    service: &TaskService<SqliteTaskRepository<'_>>,
    session: &Session,
    task_id: Uuid,
    completed: bool,
    json: bool,
) -> Result<()> {
    let Some(change) = service.toggle(session, task_id, completed)? else {
        println!("no owner; nothing changed");
        return Ok(());
    };
    match change.xp {
        Some(xp) if json => print_json(&xp),
        Some(xp) => {
            println!(
                "{} -> {} xp, level {} ({})",
                change.task.title, xp.after.xp, xp.after.level, xp.after.rank
            );
            if xp.leveled_up {
                println!("level up!");
            }
            Ok(())
        }
        None => {
            println!("{} unchanged", change.task.title);
            Ok(())
        }
    }
}

fn run_goal(conn: &Connection, session: &Session, command: GoalCommands, json: bool) -> Result<()> {
    let service = GoalService::new(SqliteGoalRepository::new(conn));
    match command {
        GoalCommands::Add {
            title,
            target,
            deadline,
        } => {
            let deadline = deadline.map(|day| noon_of(day, &Local).timestamp_millis());
            let goal = service.add_goal(session, &title, target, deadline)?;
            report_created(goal.as_ref().map(|goal| goal.id), json)
        }
        GoalCommands::Progress { goal_id, current } => {
            match service.update_progress(session, goal_id, current)? {
                Some(goal) if json => print_json(&goal)?,
                Some(goal) => println!(
                    "{} {}/{} ({:.0}%)",
                    goal.title,
                    goal.current,
                    goal.target,
                    goal.display_progress()
                ),
                None => println!("no owner; nothing changed"),
            }
            Ok(())
        }
        GoalCommands::List => {
            let goals = service.list_goals(session)?;
            if json {
                return print_json(&goals);
            }
            for goal in &goals {
                let done = if goal.is_complete() { "x" } else { " " };
                println!(
                    "[{done}] {} {} {}/{}",
                    goal.id, goal.title, goal.current, goal.target
                );
            }
            Ok(())
        }
        GoalCommands::Delete { goal_id } => {
            report_deleted(session, goal_id, |id| service.delete(session, id))
        }
    }
}

fn run_journal(
    conn: &Connection,
    session: &Session,
    command: JournalCommands,
    json: bool,
) -> Result<()> {
    let service = JournalService::new(SqliteJournalRepository::new(conn));
    match command {
        JournalCommands::Add { content } => {
            let entry = service.add_entry(session, &content)?;
            report_created(entry.as_ref().map(|entry| entry.id), json)
        }
        JournalCommands::List => {
            let entries = service.list_entries(session)?;
            if json {
                return print_json(&entries);
            }
            for entry in &entries {
                println!("{} {}", entry.id, entry.preview());
            }
            Ok(())
        }
        JournalCommands::Delete { entry_id } => {
            report_deleted(session, entry_id, |id| service.delete(session, id))
        }
    }
}

fn run_stat(conn: &Connection, session: &Session, command: StatCommands, json: bool) -> Result<()> {
    let service = StatService::new(SqliteStatRepository::new(conn));
    match command {
        StatCommands::Add { amount, kind } => {
            let Some(kind) = StatKind::parse(kind.trim()) else {
                bail!("unknown stat kind `{kind}`; expected income or expense");
            };
            let stat = service.record(session, amount, kind)?;
            report_created(stat.as_ref().map(|stat| stat.id), json)
        }
        StatCommands::Summary { window } => {
            let mode = parse_window(&window)?;
            let summary = service.summary(session, mode, &Local::now())?;
            if json {
                return print_json(&summary);
            }
            println!(
                "{mode}: income {:.2} | expense {:.2} | net {:.2}",
                summary.income, summary.expense, summary.net
            );
            Ok(())
        }
    }
}

fn run_notify(
    config: &CoreConfig,
    session: &Session,
    command: NotifyCommands,
    json: bool,
) -> Result<()> {
    let store = SettingsStore::new(config.settings_path.clone());
    match command {
        NotifyCommands::Check => {
            let settings = store.load();
            let conn = open(config)?;
            let now = Local::now();
            let tasks = TaskService::new(SqliteTaskRepository::new(&conn))
                .list_tasks(session, None, &now)?;
            let goals = GoalService::new(SqliteGoalRepository::new(&conn)).list_goals(session)?;

            let mut due = check_protocol_tasks(&settings, &tasks, &now);
            due.extend(check_project_deadlines(&settings, &goals, &now));
            if json {
                return print_json(&due);
            }
            let sent = dispatch(&StdoutNotifier, &settings, &due);
            if sent == 0 {
                println!("nothing due");
            }
            Ok(())
        }
        NotifyCommands::Settings {
            enabled,
            protocol_reminders,
            project_deadlines,
            reminder_time,
        } => {
            let patch = NotificationSettingsPatch {
                enabled,
                protocol_reminders,
                project_deadlines,
                reminder_time,
            };
            let settings = if patch == NotificationSettingsPatch::default() {
                store.load()
            } else {
                store.update(&patch)?
            };
            print_json(&settings)
        }
    }
}

fn open(config: &CoreConfig) -> Result<Connection> {
    open_db(&config.db_path)
        .with_context(|| format!("failed to open database {}", config.db_path.display()))
}

fn parse_window(value: &str) -> Result<WindowMode> {
    WindowMode::parse(value.trim())
        .with_context(|| format!("unknown window `{value}`; expected day, week or month"))
}

fn report_created(id: Option<Uuid>, json: bool) -> Result<()> {
    match id {
        Some(id) if json => print_json(&serde_json::json!({ "id": id })),
        Some(id) => {
            println!("created {id}");
            Ok(())
        }
        None => {
            println!("no owner; nothing created");
            Ok(())
        }
    }
}

fn report_deleted(
    session: &Session,
    id: Uuid,
    delete: impl FnOnce(Uuid) -> ServiceResult<()>,
) -> Result<()> {
    if !session.is_signed_in() {
        println!("no owner; nothing changed");
        return Ok(());
    }
    delete(id)?;
    println!("deleted {id}");
    Ok(())
}

fn print_tasks(tasks: &[Task]) {
    for task in tasks {
        let done = if task.completed { "x" } else { " " };
        println!(
            "[{done}] {} {} ({}, {})",
            task.id,
            task.title,
            task.kind(),
            task.recurrence.frequency()
        );
    }
}

fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::report_deleted;
    use djalil_core::{OwnerId, Session};
    use std::cell::Cell;
    use uuid::Uuid;

    #[test]
    fn delete_without_owner_never_reaches_the_service() {
        let called = Cell::new(false);
        report_deleted(&Session::anonymous(), Uuid::new_v4(), |_| {
            called.set(true);
            Ok(())
        })
        .unwrap();
        assert!(!called.get());
    }

    #[test]
    fn delete_with_owner_forwards_the_id() {
        let id = Uuid::new_v4();
        let seen = Cell::new(None);
        let session = Session::signed_in(OwnerId::parse("owner-a").unwrap());
        report_deleted(&session, id, |target| {
            seen.set(Some(target));
            Ok(())
        })
        .unwrap();
        assert_eq!(seen.get(), Some(id));
    }
}
