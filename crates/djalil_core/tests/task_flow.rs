use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone};
use djalil_core::db::open_db_in_memory;
use djalil_core::{
    OwnerId, ProfileRepository, Rank, Recurrence, RepoError, ServiceError, Session,
    SqliteProfileRepository, SqliteTaskRepository, TaskListQuery, TaskRepository, TaskService,
    TaskType, WeekdaySet, WindowMode,
};
use rusqlite::Connection;
use uuid::Uuid;

fn paris() -> FixedOffset {
    FixedOffset::east_opt(2 * 3600).unwrap()
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
}

fn at(d: u32, hour: u32) -> DateTime<FixedOffset> {
    paris().with_ymd_and_hms(2026, 10, d, hour, 0, 0).single().unwrap()
}

fn session(owner: &str) -> Session {
    Session::signed_in(OwnerId::parse(owner).unwrap())
}

fn service(conn: &Connection) -> TaskService<SqliteTaskRepository<'_>> {
    TaskService::new(SqliteTaskRepository::new(conn))
}

#[test]
fn add_task_stores_noon_of_selected_day() {
    let conn = open_db_in_memory().unwrap();
    let tasks = service(&conn);
    let me = session("owner-a");

    let task = tasks
        .add_task(&me, "  Sport  ", Recurrence::Daily, day(14), &paris())
        .unwrap()
        .unwrap();

    assert_eq!(task.title, "Sport");
    assert_eq!(task.kind(), TaskType::Protocol);
    assert_eq!(task.date, at(14, 12).timestamp_millis());
    assert!(!task.completed);
}

#[test]
fn list_tasks_returns_only_the_requested_day_in_date_order() {
    let conn = open_db_in_memory().unwrap();
    let tasks = service(&conn);
    let me = session("owner-a");

    let late = tasks
        .add_task_at(&me, "late", Recurrence::Once, at(14, 22).timestamp_millis())
        .unwrap()
        .unwrap();
    let early = tasks
        .add_task_at(&me, "early", Recurrence::Once, at(14, 0).timestamp_millis())
        .unwrap()
        .unwrap();
    tasks
        .add_task(&me, "tomorrow", Recurrence::Once, day(15), &paris())
        .unwrap();

    let listed = tasks.list_tasks(&me, Some(day(14)), &at(20, 9)).unwrap();
    let ids: Vec<Uuid> = listed.iter().map(|task| task.id).collect();
    assert_eq!(ids, vec![early.id, late.id]);

    let today = tasks.list_tasks(&me, None, &at(15, 9)).unwrap();
    assert_eq!(today.len(), 1);
    assert_eq!(today[0].title, "tomorrow");
}

#[test]
fn toggle_keeps_identity_and_couples_xp() {
    let conn = open_db_in_memory().unwrap();
    let tasks = service(&conn);
    let me = session("owner-a");
    let task = tasks
        .add_task(&me, "Sport", Recurrence::Daily, day(14), &paris())
        .unwrap()
        .unwrap();

    let done = tasks.toggle(&me, task.id, true).unwrap().unwrap();
    assert!(done.task.completed);
    assert_eq!(done.task.id, task.id);
    assert_eq!(done.task.date, task.date);
    let xp = done.xp.expect("state changed so xp moves");
    assert_eq!(xp.before.xp, 0);
    assert_eq!(xp.after.xp, 50);
    assert!(!xp.leveled_up);

    let reloaded = tasks.get_task(&me, task.id).unwrap().unwrap();
    assert!(reloaded.completed);
    assert_eq!(reloaded.date, task.date);

    let undone = tasks.toggle(&me, task.id, false).unwrap().unwrap();
    assert_eq!(undone.xp.unwrap().after.xp, 0);
}

#[test]
fn toggling_to_current_state_changes_nothing() {
    let conn = open_db_in_memory().unwrap();
    let tasks = service(&conn);
    let profiles = SqliteProfileRepository::new(&conn);
    let me = session("owner-a");
    let owner = me.owner().unwrap().clone();
    let task = tasks
        .add_task(&me, "Read", Recurrence::Once, day(14), &paris())
        .unwrap()
        .unwrap();

    tasks.toggle(&me, task.id, true).unwrap();
    let repeat = tasks.toggle(&me, task.id, true).unwrap().unwrap();
    assert!(repeat.xp.is_none());
    assert_eq!(profiles.ensure_profile(&owner).unwrap().xp, 50);

    let first_undo = tasks.toggle(&me, task.id, false).unwrap().unwrap();
    assert!(first_undo.xp.is_some());
    let second_undo = tasks.toggle(&me, task.id, false).unwrap().unwrap();
    assert!(second_undo.xp.is_none());
    assert_eq!(profiles.ensure_profile(&owner).unwrap().xp, 0);
}

#[test]
fn completing_at_980_xp_levels_up_and_undo_restores() {
    let conn = open_db_in_memory().unwrap();
    let tasks = service(&conn);
    let profiles = SqliteProfileRepository::new(&conn);
    let me = session("owner-a");
    let owner = me.owner().unwrap().clone();
    profiles.apply_xp(&owner, 980).unwrap();

    let task = tasks
        .add_task(&me, "Push", Recurrence::Once, day(14), &paris())
        .unwrap()
        .unwrap();
    let done = tasks.toggle(&me, task.id, true).unwrap().unwrap();
    let xp = done.xp.unwrap();
    assert_eq!(xp.after.xp, 1030);
    assert_eq!(xp.after.level, 2);
    assert_eq!(xp.after.rank, Rank::Eclaireur);
    assert!(xp.leveled_up);

    let undone = tasks.toggle(&me, task.id, false).unwrap().unwrap();
    let xp = undone.xp.unwrap();
    assert_eq!(xp.after.xp, 980);
    assert_eq!(xp.after.level, 1);
    assert_eq!(xp.after.rank, Rank::Recrue);
    assert!(!xp.leveled_up);
}

#[test]
fn failed_toggle_leaves_xp_untouched() {
    let conn = open_db_in_memory().unwrap();
    let tasks = service(&conn);
    let profiles = SqliteProfileRepository::new(&conn);
    let me = session("owner-a");

    let err = tasks.toggle(&me, Uuid::new_v4(), true).unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
    assert_eq!(
        profiles.get_profile(me.owner().unwrap()).unwrap(),
        None,
        "rolled back transaction must not leave a profile behind"
    );
}

#[test]
fn deleting_a_task_removes_it_from_its_day() {
    let conn = open_db_in_memory().unwrap();
    let tasks = service(&conn);
    let me = session("owner-a");
    let keep = tasks
        .add_task(&me, "keep", Recurrence::Once, day(14), &paris())
        .unwrap()
        .unwrap();
    let dropped = tasks
        .add_task(&me, "drop", Recurrence::Once, day(14), &paris())
        .unwrap()
        .unwrap();

    tasks.delete(&me, dropped.id).unwrap();

    let listed = tasks.list_tasks(&me, Some(day(14)), &at(14, 9)).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, keep.id);
    assert!(matches!(
        tasks.delete(&me, dropped.id).unwrap_err(),
        ServiceError::NotFound(id) if id == dropped.id
    ));
}

#[test]
fn owners_never_see_each_other() {
    let conn = open_db_in_memory().unwrap();
    let tasks = service(&conn);
    let alice = session("alice");
    let bob = session("bob");
    let task = tasks
        .add_task(&alice, "private", Recurrence::Once, day(14), &paris())
        .unwrap()
        .unwrap();

    assert!(tasks.list_tasks(&bob, Some(day(14)), &at(14, 9)).unwrap().is_empty());
    assert!(tasks.get_task(&bob, task.id).unwrap().is_none());
    assert!(matches!(
        tasks.toggle(&bob, task.id, true).unwrap_err(),
        ServiceError::NotFound(_)
    ));
    assert!(matches!(
        tasks.delete(&bob, task.id).unwrap_err(),
        ServiceError::NotFound(_)
    ));
}

#[test]
fn anonymous_session_is_a_no_op() {
    let conn = open_db_in_memory().unwrap();
    let tasks = service(&conn);
    let nobody = Session::anonymous();

    assert!(tasks
        .add_task(&nobody, "ghost", Recurrence::Once, day(14), &paris())
        .unwrap()
        .is_none());
    assert!(tasks.list_tasks(&nobody, None, &at(14, 9)).unwrap().is_empty());
    assert!(tasks.toggle(&nobody, Uuid::new_v4(), true).unwrap().is_none());
    tasks.delete(&nobody, Uuid::new_v4()).unwrap();

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM tasks;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn custom_recurrence_round_trips_through_storage() {
    let conn = open_db_in_memory().unwrap();
    let tasks = service(&conn);
    let me = session("owner-a");
    let days = WeekdaySet::new([1, 3, 5]).unwrap();

    let created = tasks
        .add_task(&me, "Gym", Recurrence::Custom(days.clone()), day(14), &paris())
        .unwrap()
        .unwrap();
    let stored_days: String = conn
        .query_row(
            "SELECT custom_days FROM tasks WHERE id = ?1;",
            [created.id.to_string()],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(stored_days, "[1,3,5]");

    let loaded = tasks.get_task(&me, created.id).unwrap().unwrap();
    assert_eq!(loaded.recurrence, Recurrence::Custom(days));
    assert_eq!(loaded.kind(), TaskType::Protocol);
}

#[test]
fn blank_title_is_rejected_as_invalid_input() {
    let conn = open_db_in_memory().unwrap();
    let tasks = service(&conn);
    let err = tasks
        .add_task(&session("owner-a"), "   ", Recurrence::Once, day(14), &paris())
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(_)));
}

#[test]
fn malformed_custom_days_fail_closed() {
    let conn = open_db_in_memory().unwrap();
    let tasks = service(&conn);
    let me = session("owner-a");
    let task = tasks
        .add_task(
            &me,
            "Gym",
            Recurrence::Custom(WeekdaySet::new([2]).unwrap()),
            day(14),
            &paris(),
        )
        .unwrap()
        .unwrap();

    for corrupt in ["[9]", "[]", "mon,wed", "null"] {
        conn.execute(
            "UPDATE tasks SET custom_days = ?1 WHERE id = ?2;",
            [corrupt, task.id.to_string().as_str()],
        )
        .unwrap();
        let err = SqliteTaskRepository::new(&conn)
            .get_task(me.owner().unwrap(), task.id)
            .unwrap_err();
        assert!(
            matches!(err, RepoError::InvalidData(_)),
            "`{corrupt}` should be rejected"
        );
    }
}

#[test]
fn type_frequency_mismatch_fails_closed() {
    let conn = open_db_in_memory().unwrap();
    let tasks = service(&conn);
    let me = session("owner-a");
    let task = tasks
        .add_task(&me, "Call", Recurrence::Once, day(14), &paris())
        .unwrap()
        .unwrap();
    conn.execute(
        "UPDATE tasks SET type = 'protocol' WHERE id = ?1;",
        [task.id.to_string()],
    )
    .unwrap();

    let err = tasks
        .list_tasks(&me, Some(day(14)), &at(14, 9))
        .unwrap_err();
    assert!(matches!(err, ServiceError::Repo(RepoError::InvalidData(_))));
}

#[test]
fn window_listing_and_calendar_markers() {
    let conn = open_db_in_memory().unwrap();
    let tasks = service(&conn);
    let me = session("owner-a");
    for d in [1, 14, 14, 31] {
        tasks
            .add_task(&me, "t", Recurrence::Once, day(d), &paris())
            .unwrap();
    }
    tasks
        .add_task(
            &me,
            "next month",
            Recurrence::Once,
            NaiveDate::from_ymd_opt(2026, 11, 1).unwrap(),
            &paris(),
        )
        .unwrap();

    let week = tasks.list_window(&me, WindowMode::Week, &at(14, 9)).unwrap();
    assert_eq!(week.len(), 2);

    let marked = tasks.task_days_in_month(&me, &at(14, 9)).unwrap();
    assert_eq!(marked.into_iter().collect::<Vec<_>>(), vec![1, 14, 31]);
}

#[test]
fn repository_kind_filter_splits_protocol_and_tactical() {
    let conn = open_db_in_memory().unwrap();
    let tasks = service(&conn);
    let me = session("owner-a");
    tasks
        .add_task(&me, "daily", Recurrence::Daily, day(14), &paris())
        .unwrap();
    tasks
        .add_task(&me, "once", Recurrence::Once, day(14), &paris())
        .unwrap();

    let repo = SqliteTaskRepository::new(&conn);
    let protocol = repo
        .list_tasks(
            me.owner().unwrap(),
            &TaskListQuery {
                window: None,
                kind: Some(TaskType::Protocol),
            },
        )
        .unwrap();
    assert_eq!(protocol.len(), 1);
    assert_eq!(protocol[0].title, "daily");
}
