use chrono::{FixedOffset, NaiveDate};
use djalil_core::db::open_db_in_memory;
use djalil_core::{
    ChangeHub, ChangeKind, Collection, GoalService, OwnerId, Recurrence, Session,
    SqliteGoalRepository, SqliteTaskRepository, TaskService,
};

fn owner(value: &str) -> OwnerId {
    OwnerId::parse(value).unwrap()
}

#[test]
fn task_writes_reach_subscribers_after_commit() {
    let conn = open_db_in_memory().unwrap();
    let hub = ChangeHub::new();
    let tasks = TaskService::with_hub(SqliteTaskRepository::new(&conn), hub.clone());
    let me = Session::signed_in(owner("owner-a"));
    let feed = hub.subscribe(owner("owner-a"), Some(Collection::Tasks));
    let profile_feed = hub.subscribe(owner("owner-a"), Some(Collection::Profile));

    let task = tasks
        .add_task(
            &me,
            "Sport",
            Recurrence::Daily,
            NaiveDate::from_ymd_opt(2026, 10, 14).unwrap(),
            &FixedOffset::east_opt(0).unwrap(),
        )
        .unwrap()
        .unwrap();
    tasks.toggle(&me, task.id, true).unwrap();
    tasks.toggle(&me, task.id, true).unwrap();
    tasks.delete(&me, task.id).unwrap();

    let kinds: Vec<ChangeKind> = feed.drain().into_iter().map(|change| change.kind).collect();
    assert_eq!(
        kinds,
        vec![ChangeKind::Created, ChangeKind::Updated, ChangeKind::Deleted],
        "a no-op toggle publishes nothing"
    );
    assert_eq!(profile_feed.drain().len(), 1);
}

#[test]
fn other_owners_and_failed_writes_publish_nothing() {
    let conn = open_db_in_memory().unwrap();
    let hub = ChangeHub::new();
    let goals = GoalService::with_hub(SqliteGoalRepository::new(&conn), hub.clone());
    let watcher = hub.subscribe(owner("owner-b"), None);
    let mine = hub.subscribe(owner("owner-a"), None);

    let me = Session::signed_in(owner("owner-a"));
    goals.add_goal(&me, "Ship", 3, None).unwrap();
    assert!(goals.add_goal(&me, "Broken", 0, None).is_err());

    assert!(watcher.try_next().is_none());
    let changes = mine.drain();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].collection, Collection::Goals);
}

#[test]
fn dropped_subscription_stops_receiving() {
    let conn = open_db_in_memory().unwrap();
    let hub = ChangeHub::new();
    let goals = GoalService::with_hub(SqliteGoalRepository::new(&conn), hub.clone());
    let me = Session::signed_in(owner("owner-a"));

    let feed = hub.subscribe(owner("owner-a"), Some(Collection::Goals));
    goals.add_goal(&me, "One", 1, None).unwrap();
    assert_eq!(feed.drain().len(), 1);
    drop(feed);

    assert_eq!(hub.subscriber_count(), 0);
    goals.add_goal(&me, "Two", 1, None).unwrap();
}
