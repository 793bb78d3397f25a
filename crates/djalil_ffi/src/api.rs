//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level functions to Dart via FRB.
//! - Translate core records into flat response envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Failures are reported as `ok = false` plus a message; core error types
//!   never cross the boundary.
//! - A missing or blank `owner_id` is a no-op, never an error.
//! - Calendar days are `YYYY-MM-DD` in the device's local timezone.

use chrono::{Local, NaiveDate};
use djalil_core::db::open_db;
use djalil_core::notify::{NotificationSettings, NotificationSettingsPatch, SettingsStore};
use djalil_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    CoreConfig, DashboardService, Frequency, Goal, GoalService, JournalEntry, JournalService,
    Profile, ProfileService, ProfileView, Recurrence, Session, SqliteGoalRepository,
    SqliteJournalRepository, SqliteProfileRepository, SqliteStatRepository,
    SqliteTaskRepository, StatKind, StatService, Task, TaskService, WindowMode,
};
use log::warn;
use rusqlite::Connection;
use std::sync::OnceLock;
use uuid::Uuid;

const DAY_FORMAT: &str = "%Y-%m-%d";
const NO_OWNER_MESSAGE: &str = "Skipped: no signed-in owner.";
static CONFIG: OnceLock<CoreConfig> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    pub ok: bool,
    /// Created or affected record id.
    pub id: Option<String>,
    pub message: String,
}

impl ActionResponse {
    fn success(message: impl Into<String>, id: Option<String>) -> Self {
        Self {
            ok: true,
            id,
            message: message.into(),
        }
    }

    fn skipped() -> Self {
        Self::success(NO_OWNER_MESSAGE, None)
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            id: None,
            message: message.into(),
        }
    }
}

/// Flat task projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskItem {
    pub id: String,
    pub title: String,
    /// `protocol|tactical`.
    pub task_type: String,
    /// `once|daily|custom`.
    pub frequency: String,
    /// Weekday indexes, 0 = Sunday. Empty unless `custom`.
    pub custom_days: Vec<u8>,
    pub completed: bool,
    pub date_epoch_ms: i64,
}

impl From<&Task> for TaskItem {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.to_string(),
            title: task.title.clone(),
            task_type: task.kind().as_str().to_string(),
            frequency: task.recurrence.frequency().as_str().to_string(),
            custom_days: task
                .recurrence
                .custom_days()
                .map(|days| days.to_vec())
                .unwrap_or_default(),
            completed: task.completed,
            date_epoch_ms: task.date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskListResponse {
    pub ok: bool,
    pub items: Vec<TaskItem>,
    pub protocol_score: u8,
    pub tactical_score: u8,
    pub message: String,
}

/// Toggle outcome with the post-toggle profile.
///
/// Profile fields are `None` only when no profile was read: failures and
/// calls without a signed-in owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleResponse {
    pub ok: bool,
    /// False when the task already had the requested state.
    pub changed: bool,
    pub xp: Option<i64>,
    pub level: Option<u8>,
    pub rank: Option<String>,
    pub leveled_up: bool,
    pub message: String,
}

impl ToggleResponse {
    fn with_profile(
        profile: &Profile,
        changed: bool,
        leveled_up: bool,
        message: impl Into<String>,
    ) -> Self {
        Self {
            ok: true,
            changed,
            xp: Some(profile.xp),
            level: Some(profile.level),
            rank: Some(profile.rank.label().to_string()),
            leveled_up,
            message: message.into(),
        }
    }

    fn without_profile(ok: bool, message: impl Into<String>) -> Self {
        Self {
            ok,
            changed: false,
            xp: None,
            level: None,
            rank: None,
            leveled_up: false,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self::without_profile(false, message)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GoalItem {
    pub id: String,
    pub title: String,
    pub target: i64,
    pub current: i64,
    pub deadline_epoch_ms: Option<i64>,
    /// Clamped to `[0, 100]`.
    pub progress: f64,
    pub complete: bool,
}

impl From<&Goal> for GoalItem {
    fn from(goal: &Goal) -> Self {
        Self {
            id: goal.id.to_string(),
            title: goal.title.clone(),
            target: goal.target,
            current: goal.current,
            deadline_epoch_ms: goal.deadline,
            progress: goal.display_progress(),
            complete: goal.is_complete(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GoalListResponse {
    pub ok: bool,
    pub items: Vec<GoalItem>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalItem {
    pub id: String,
    pub content: String,
    pub preview: String,
    pub created_at_epoch_ms: i64,
}

impl From<&JournalEntry> for JournalItem {
    fn from(entry: &JournalEntry) -> Self {
        Self {
            id: entry.id.to_string(),
            content: entry.content.clone(),
            preview: entry.preview(),
            created_at_epoch_ms: entry.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalListResponse {
    pub ok: bool,
    pub items: Vec<JournalItem>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CashflowResponse {
    pub ok: bool,
    pub income: f64,
    pub expense: f64,
    pub net: f64,
    pub message: String,
}

/// Profile envelope; value fields are `None` when no profile was read.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileResponse {
    pub ok: bool,
    pub xp: Option<i64>,
    pub level: Option<u8>,
    pub rank: Option<String>,
    pub xp_for_next_level: Option<i64>,
    pub xp_progress: Option<f64>,
    pub message: String,
}

impl ProfileResponse {
    fn from_view(view: &ProfileView, message: impl Into<String>) -> Self {
        Self {
            ok: true,
            xp: Some(view.profile.xp),
            level: Some(view.profile.level),
            rank: Some(view.profile.rank.label().to_string()),
            xp_for_next_level: Some(view.xp_for_next_level),
            xp_progress: Some(view.xp_progress),
            message: message.into(),
        }
    }

    fn empty(ok: bool, message: impl Into<String>) -> Self {
        Self {
            ok,
            xp: None,
            level: None,
            rank: None,
            xp_for_next_level: None,
            xp_progress: None,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardResponse {
    pub ok: bool,
    pub profile: ProfileResponse,
    pub protocol: Vec<TaskItem>,
    pub tactical: Vec<TaskItem>,
    pub protocol_score: u8,
    pub tactical_score: u8,
    pub goals: Vec<GoalItem>,
    pub message: String,
}

impl DashboardResponse {
    fn empty(ok: bool, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            ok,
            profile: ProfileResponse::empty(ok, message.clone()),
            protocol: Vec::new(),
            tactical: Vec::new(),
            protocol_score: 0,
            tactical_score: 0,
            goals: Vec::new(),
            message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationSettingsResponse {
    pub ok: bool,
    pub enabled: bool,
    pub protocol_reminders: bool,
    pub project_deadlines: bool,
    pub reminder_time: String,
    pub message: String,
}

impl NotificationSettingsResponse {
    fn from_settings(settings: NotificationSettings, ok: bool, message: impl Into<String>) -> Self {
        Self {
            ok,
            enabled: settings.enabled,
            protocol_reminders: settings.protocol_reminders,
            project_deadlines: settings.project_deadlines,
            reminder_time: settings.reminder_time,
            message: message.into(),
        }
    }
}

/// Adds a task on a local calendar day (`YYYY-MM-DD`), stored at noon.
///
/// `frequency` is `once|daily|custom`; `custom_days` uses 0 = Sunday and is
/// required only for `custom`.
#[flutter_rust_bridge::frb(sync)]
pub fn task_add(
    owner_id: Option<String>,
    title: String,
    frequency: String,
    custom_days: Vec<u8>,
    day: String,
) -> ActionResponse {
    let session = session_of(owner_id);
    let day = match parse_day(&day) {
        Ok(day) => day,
        Err(message) => return ActionResponse::failure(message),
    };
    let recurrence = match parse_recurrence(&frequency, custom_days) {
        Ok(recurrence) => recurrence,
        Err(message) => return ActionResponse::failure(message),
    };

    let result = with_conn(|conn| {
        TaskService::new(SqliteTaskRepository::new(conn))
            .add_task(&session, &title, recurrence, day, &Local)
            .map_err(|err| err.to_string())
    });
    match result {
        Ok(Some(task)) => ActionResponse::success("Task created.", Some(task.id.to_string())),
        Ok(None) => ActionResponse::skipped(),
        Err(err) => ActionResponse::failure(format!("task_add failed: {err}")),
    }
}

/// Lists one local day's tasks (today when `day` is `None`) with scores.
#[flutter_rust_bridge::frb(sync)]
pub fn task_list(owner_id: Option<String>, day: Option<String>) -> TaskListResponse {
    let failure = |message: String| TaskListResponse {
        ok: false,
        items: Vec::new(),
        protocol_score: 0,
        tactical_score: 0,
        message,
    };
    let session = session_of(owner_id);
    let day = match day.as_deref().map(parse_day).transpose() {
        Ok(day) => day,
        Err(message) => return failure(message),
    };

    let result = with_conn(|conn| {
        TaskService::new(SqliteTaskRepository::new(conn))
            .list_tasks(&session, day, &Local::now())
            .map_err(|err| err.to_string())
    });
    match result {
        Ok(tasks) => TaskListResponse {
            ok: true,
            protocol_score: djalil_core::protocol_score(&tasks),
            tactical_score: djalil_core::tactical_score(&tasks),
            message: format!("Found {} task(s).", tasks.len()),
            items: tasks.iter().map(TaskItem::from).collect(),
        },
        Err(err) => failure(format!("task_list failed: {err}")),
    }
}

/// Sets a task's completion and applies the xp reward atomically.
#[flutter_rust_bridge::frb(sync)]
pub fn task_toggle(owner_id: Option<String>, task_id: String, completed: bool) -> ToggleResponse {
    let session = session_of(owner_id);
    let id = match parse_id(&task_id) {
        Ok(id) => id,
        Err(message) => return ToggleResponse::failure(message),
    };

    let result = with_conn(|conn| {
        let Some(change) = TaskService::new(SqliteTaskRepository::new(conn))
            .toggle(&session, id, completed)
            .map_err(|err| err.to_string())?
        else {
            return Ok(None);
        };
        match change.xp {
            Some(xp) => Ok(Some(ToggleResponse::with_profile(
                &xp.after,
                true,
                xp.leveled_up,
                "Task updated.",
            ))),
            // Unchanged toggle: report the stored profile as-is.
            None => ProfileService::new(SqliteProfileRepository::new(conn))
                .profile(&session)
                .map_err(|err| err.to_string())
                .map(|view| {
                    view.map(|view| {
                        ToggleResponse::with_profile(
                            &view.profile,
                            false,
                            false,
                            "Task already in requested state.",
                        )
                    })
                }),
        }
    });
    match result {
        Ok(Some(response)) => response,
        Ok(None) => ToggleResponse::without_profile(true, NO_OWNER_MESSAGE),
        Err(err) => ToggleResponse::failure(format!("task_toggle failed: {err}")),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn task_delete(owner_id: Option<String>, task_id: String) -> ActionResponse {
    let session = session_of(owner_id);
    let id = match parse_id(&task_id) {
        Ok(id) => id,
        Err(message) => return ActionResponse::failure(message),
    };
    if !session.is_signed_in() {
        return ActionResponse::skipped();
    }

    match with_conn(|conn| {
        TaskService::new(SqliteTaskRepository::new(conn))
            .delete(&session, id)
            .map_err(|err| err.to_string())
    }) {
        Ok(()) => ActionResponse::success("Task deleted.", Some(task_id)),
        Err(err) => ActionResponse::failure(format!("task_delete failed: {err}")),
    }
}

/// Day-of-month numbers in the current local month that hold tasks.
#[flutter_rust_bridge::frb(sync)]
pub fn task_days_in_month(owner_id: Option<String>) -> Vec<u32> {
    let session = session_of(owner_id);
    with_conn(|conn| {
        TaskService::new(SqliteTaskRepository::new(conn))
            .task_days_in_month(&session, &Local::now())
            .map_err(|err| err.to_string())
    })
    .map(|days| days.into_iter().collect())
    .unwrap_or_else(|err| {
        warn!("event=ffi_call module=ffi status=error call=task_days_in_month error={err}");
        Vec::new()
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn goal_add(
    owner_id: Option<String>,
    title: String,
    target: i64,
    deadline_epoch_ms: Option<i64>,
) -> ActionResponse {
    let session = session_of(owner_id);
    match with_conn(|conn| {
        GoalService::new(SqliteGoalRepository::new(conn))
            .add_goal(&session, &title, target, deadline_epoch_ms)
            .map_err(|err| err.to_string())
    }) {
        Ok(Some(goal)) => ActionResponse::success("Goal created.", Some(goal.id.to_string())),
        Ok(None) => ActionResponse::skipped(),
        Err(err) => ActionResponse::failure(format!("goal_add failed: {err}")),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn goal_update_progress(
    owner_id: Option<String>,
    goal_id: String,
    current: i64,
) -> ActionResponse {
    let session = session_of(owner_id);
    let id = match parse_id(&goal_id) {
        Ok(id) => id,
        Err(message) => return ActionResponse::failure(message),
    };
    match with_conn(|conn| {
        GoalService::new(SqliteGoalRepository::new(conn))
            .update_progress(&session, id, current)
            .map_err(|err| err.to_string())
    }) {
        Ok(Some(goal)) => ActionResponse::success(
            if goal.is_complete() {
                "Goal complete."
            } else {
                "Goal updated."
            },
            Some(goal_id),
        ),
        Ok(None) => ActionResponse::skipped(),
        Err(err) => ActionResponse::failure(format!("goal_update_progress failed: {err}")),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn goal_list(owner_id: Option<String>) -> GoalListResponse {
    let session = session_of(owner_id);
    match with_conn(|conn| {
        GoalService::new(SqliteGoalRepository::new(conn))
            .list_goals(&session)
            .map_err(|err| err.to_string())
    }) {
        Ok(goals) => GoalListResponse {
            ok: true,
            message: format!("Found {} goal(s).", goals.len()),
            items: goals.iter().map(GoalItem::from).collect(),
        },
        Err(err) => GoalListResponse {
            ok: false,
            items: Vec::new(),
            message: format!("goal_list failed: {err}"),
        },
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn goal_delete(owner_id: Option<String>, goal_id: String) -> ActionResponse {
    let session = session_of(owner_id);
    let id = match parse_id(&goal_id) {
        Ok(id) => id,
        Err(message) => return ActionResponse::failure(message),
    };
    if !session.is_signed_in() {
        return ActionResponse::skipped();
    }
    match with_conn(|conn| {
        GoalService::new(SqliteGoalRepository::new(conn))
            .delete(&session, id)
            .map_err(|err| err.to_string())
    }) {
        Ok(()) => ActionResponse::success("Goal deleted.", Some(goal_id)),
        Err(err) => ActionResponse::failure(format!("goal_delete failed: {err}")),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn journal_add(owner_id: Option<String>, content: String) -> ActionResponse {
    let session = session_of(owner_id);
    match with_conn(|conn| {
        JournalService::new(SqliteJournalRepository::new(conn))
            .add_entry(&session, &content)
            .map_err(|err| err.to_string())
    }) {
        Ok(Some(entry)) => ActionResponse::success("Entry saved.", Some(entry.id.to_string())),
        Ok(None) => ActionResponse::skipped(),
        Err(err) => ActionResponse::failure(format!("journal_add failed: {err}")),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn journal_list(owner_id: Option<String>) -> JournalListResponse {
    let session = session_of(owner_id);
    match with_conn(|conn| {
        JournalService::new(SqliteJournalRepository::new(conn))
            .list_entries(&session)
            .map_err(|err| err.to_string())
    }) {
        Ok(entries) => JournalListResponse {
            ok: true,
            message: format!("Found {} entry(ies).", entries.len()),
            items: entries.iter().map(JournalItem::from).collect(),
        },
        Err(err) => JournalListResponse {
            ok: false,
            items: Vec::new(),
            message: format!("journal_list failed: {err}"),
        },
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn journal_delete(owner_id: Option<String>, entry_id: String) -> ActionResponse {
    let session = session_of(owner_id);
    let id = match parse_id(&entry_id) {
        Ok(id) => id,
        Err(message) => return ActionResponse::failure(message),
    };
    if !session.is_signed_in() {
        return ActionResponse::skipped();
    }
    match with_conn(|conn| {
        JournalService::new(SqliteJournalRepository::new(conn))
            .delete(&session, id)
            .map_err(|err| err.to_string())
    }) {
        Ok(()) => ActionResponse::success("Entry deleted.", Some(entry_id)),
        Err(err) => ActionResponse::failure(format!("journal_delete failed: {err}")),
    }
}

/// Records income or expense (`kind` = `income|expense`) in major units.
#[flutter_rust_bridge::frb(sync)]
pub fn stat_record(owner_id: Option<String>, amount: f64, kind: String) -> ActionResponse {
    let session = session_of(owner_id);
    let Some(kind) = StatKind::parse(kind.trim()) else {
        return ActionResponse::failure(format!("unknown stat kind `{kind}`"));
    };
    match with_conn(|conn| {
        StatService::new(SqliteStatRepository::new(conn))
            .record(&session, amount, kind)
            .map_err(|err| err.to_string())
    }) {
        Ok(Some(stat)) => ActionResponse::success("Recorded.", Some(stat.id.to_string())),
        Ok(None) => ActionResponse::skipped(),
        Err(err) => ActionResponse::failure(format!("stat_record failed: {err}")),
    }
}

/// Cashflow totals for the `day|week|month` window around now.
#[flutter_rust_bridge::frb(sync)]
pub fn stat_summary(owner_id: Option<String>, mode: String) -> CashflowResponse {
    let failure = |message: String| CashflowResponse {
        ok: false,
        income: 0.0,
        expense: 0.0,
        net: 0.0,
        message,
    };
    let session = session_of(owner_id);
    let Some(mode) = WindowMode::parse(&mode) else {
        return failure(format!("unknown window mode `{mode}`"));
    };
    match with_conn(|conn| {
        StatService::new(SqliteStatRepository::new(conn))
            .summary(&session, mode, &Local::now())
            .map_err(|err| err.to_string())
    }) {
        Ok(summary) => CashflowResponse {
            ok: true,
            income: summary.income,
            expense: summary.expense,
            net: summary.net,
            message: format!("Cashflow for current {mode}."),
        },
        Err(err) => failure(format!("stat_summary failed: {err}")),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn profile_get(owner_id: Option<String>) -> ProfileResponse {
    let session = session_of(owner_id);
    match with_conn(|conn| {
        ProfileService::new(SqliteProfileRepository::new(conn))
            .profile(&session)
            .map_err(|err| err.to_string())
    }) {
        Ok(Some(view)) => ProfileResponse::from_view(&view, "Profile loaded."),
        Ok(None) => ProfileResponse::empty(true, NO_OWNER_MESSAGE),
        Err(err) => ProfileResponse::empty(false, format!("profile_get failed: {err}")),
    }
}

/// Today's dashboard snapshot.
#[flutter_rust_bridge::frb(sync)]
pub fn dashboard(owner_id: Option<String>) -> DashboardResponse {
    let session = session_of(owner_id);
    match with_conn(|conn| {
        DashboardService::new(
            SqliteTaskRepository::new(conn),
            SqliteGoalRepository::new(conn),
            SqliteProfileRepository::new(conn),
        )
        .build_dashboard(&session, &Local::now())
        .map_err(|err| err.to_string())
    }) {
        Ok(Some(snapshot)) => DashboardResponse {
            ok: true,
            profile: ProfileResponse::from_view(&snapshot.profile, "Profile loaded."),
            protocol: snapshot.protocol.iter().map(TaskItem::from).collect(),
            tactical: snapshot.tactical.iter().map(TaskItem::from).collect(),
            protocol_score: snapshot.protocol_score,
            tactical_score: snapshot.tactical_score,
            goals: snapshot
                .goals
                .iter()
                .map(|card| GoalItem::from(&card.goal))
                .collect(),
            message: "Dashboard ready.".to_string(),
        },
        Ok(None) => DashboardResponse::empty(true, NO_OWNER_MESSAGE),
        Err(err) => DashboardResponse::empty(false, format!("dashboard failed: {err}")),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn notification_settings_get() -> NotificationSettingsResponse {
    let store = SettingsStore::new(config().settings_path.clone());
    NotificationSettingsResponse::from_settings(store.load(), true, "Settings loaded.")
}

/// Applies a partial settings update; `None` keeps the stored value.
#[flutter_rust_bridge::frb(sync)]
pub fn notification_settings_update(
    enabled: Option<bool>,
    protocol_reminders: Option<bool>,
    project_deadlines: Option<bool>,
    reminder_time: Option<String>,
) -> NotificationSettingsResponse {
    let store = SettingsStore::new(config().settings_path.clone());
    let patch = NotificationSettingsPatch {
        enabled,
        protocol_reminders,
        project_deadlines,
        reminder_time,
    };
    match store.update(&patch) {
        Ok(settings) => {
            NotificationSettingsResponse::from_settings(settings, true, "Settings saved.")
        }
        Err(err) => NotificationSettingsResponse::from_settings(
            store.load(),
            false,
            format!("notification_settings_update failed: {err}"),
        ),
    }
}

fn config() -> &'static CoreConfig {
    CONFIG.get_or_init(CoreConfig::from_env)
}

fn session_of(owner_id: Option<String>) -> Session {
    Session::from_raw(owner_id.as_deref())
}

fn parse_day(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), DAY_FORMAT)
        .map_err(|_| format!("invalid day `{value}`; expected YYYY-MM-DD"))
}

fn parse_id(value: &str) -> Result<Uuid, String> {
    Uuid::parse_str(value.trim()).map_err(|_| format!("invalid id `{value}`"))
}

fn parse_recurrence(frequency: &str, custom_days: Vec<u8>) -> Result<Recurrence, String> {
    let frequency = Frequency::parse(frequency.trim())
        .ok_or_else(|| format!("unknown frequency `{frequency}`"))?;
    Recurrence::from_parts(frequency, Some(custom_days)).map_err(|err| err.to_string())
}

fn with_conn<T>(f: impl FnOnce(&Connection) -> Result<T, String>) -> Result<T, String> {
    let conn = open_db(&config().db_path).map_err(|err| format!("DB open failed: {err}"))?;
    f(&conn)
}
