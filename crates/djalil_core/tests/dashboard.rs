use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone};
use djalil_core::db::open_db_in_memory;
use djalil_core::notify::{check_project_deadlines, check_protocol_tasks, NotificationSettings};
use djalil_core::{
    DashboardService, GoalService, OwnerId, Recurrence, Session, SqliteGoalRepository,
    SqliteProfileRepository, SqliteTaskRepository, TaskService, WeekdaySet,
};
use rusqlite::Connection;

fn tz() -> FixedOffset {
    FixedOffset::east_opt(3600).unwrap()
}

fn at(day: u32, hour: u32) -> DateTime<FixedOffset> {
    tz().with_ymd_and_hms(2026, 10, day, hour, 0, 0).single().unwrap()
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 14).unwrap()
}

fn dashboard(
    conn: &Connection,
) -> DashboardService<
    SqliteTaskRepository<'_>,
    SqliteGoalRepository<'_>,
    SqliteProfileRepository<'_>,
> {
    DashboardService::new(
        SqliteTaskRepository::new(conn),
        SqliteGoalRepository::new(conn),
        SqliteProfileRepository::new(conn),
    )
}

#[test]
fn dashboard_composes_scores_profile_and_goals() {
    let conn = open_db_in_memory().unwrap();
    let tasks = TaskService::new(SqliteTaskRepository::new(&conn));
    let goals = GoalService::new(SqliteGoalRepository::new(&conn));
    let me = Session::signed_in(OwnerId::parse("owner-a").unwrap());

    let sport = tasks
        .add_task(&me, "Sport", Recurrence::Daily, today(), &tz())
        .unwrap()
        .unwrap();
    tasks
        .add_task(
            &me,
            "Read",
            Recurrence::Custom(WeekdaySet::new([3]).unwrap()),
            today(),
            &tz(),
        )
        .unwrap();
    tasks
        .add_task(&me, "Read again", Recurrence::Daily, today(), &tz())
        .unwrap();
    tasks
        .add_task(&me, "Call bank", Recurrence::Once, today(), &tz())
        .unwrap();
    tasks.toggle(&me, sport.id, true).unwrap();

    let goal = goals.add_goal(&me, "Save", 4, None).unwrap().unwrap();
    goals.update_progress(&me, goal.id, 6).unwrap();

    let snapshot = dashboard(&conn)
        .build_dashboard(&me, &at(14, 18))
        .unwrap()
        .unwrap();

    assert_eq!(snapshot.protocol.len(), 3);
    assert_eq!(snapshot.tactical.len(), 1);
    assert_eq!(snapshot.protocol_score, 33);
    assert_eq!(snapshot.tactical_score, 0);
    assert_eq!(snapshot.profile.profile.xp, 50);
    assert_eq!(snapshot.profile.xp_for_next_level, 1000);
    assert_eq!(snapshot.profile.xp_progress, 5.0);
    assert_eq!(snapshot.goals.len(), 1);
    assert_eq!(snapshot.goals[0].progress, 100.0);
    assert!(snapshot.goals[0].complete);
    assert_eq!(snapshot.goals[0].goal.current, 6);

    let json = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(json["protocol_score"], 33);
    assert_eq!(json["tactical"][0]["recurrence"]["frequency"], "once");
    assert_eq!(json["tactical"][0]["type"], "tactical");
    assert_eq!(json["protocol"][0]["type"], "protocol");
    assert_eq!(json["goals"][0]["complete"], true);
}

#[test]
fn empty_day_scores_zero_and_anonymous_gets_nothing() {
    let conn = open_db_in_memory().unwrap();
    let me = Session::signed_in(OwnerId::parse("owner-a").unwrap());

    let snapshot = dashboard(&conn)
        .build_dashboard(&me, &at(14, 9))
        .unwrap()
        .unwrap();
    assert_eq!(snapshot.protocol_score, 0);
    assert!(snapshot.protocol.is_empty());
    assert_eq!(snapshot.profile.profile.level, 1);

    assert!(dashboard(&conn)
        .build_dashboard(&Session::anonymous(), &at(14, 9))
        .unwrap()
        .is_none());
}

#[test]
fn one_shot_checks_run_over_stored_records() {
    let conn = open_db_in_memory().unwrap();
    let tasks = TaskService::new(SqliteTaskRepository::new(&conn));
    let goals = GoalService::new(SqliteGoalRepository::new(&conn));
    let me = Session::signed_in(OwnerId::parse("owner-a").unwrap());

    tasks
        .add_task(&me, "Sport", Recurrence::Daily, today(), &tz())
        .unwrap();
    goals
        .add_goal(&me, "Launch", 1, Some(at(15, 12).timestamp_millis()))
        .unwrap();

    let settings = NotificationSettings::default();
    let now = at(14, 21);
    let todays = tasks.list_tasks(&me, None, &now).unwrap();
    let reminders = check_protocol_tasks(&settings, &todays, &now);
    assert_eq!(reminders.len(), 1);

    let alerts = check_project_deadlines(&settings, &goals.list_goals(&me).unwrap(), &now);
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].body, "Échéance demain !");
    assert!(alerts[0].require_interaction);
}
