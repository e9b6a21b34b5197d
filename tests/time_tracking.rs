use chrono::{DateTime, Duration, Local, NaiveDate, NaiveTime};
use daybook::domain::{Task, TaskStatus};
use daybook::error::EngineError;
use daybook::store::FileStore;
use daybook::{MemoryStore, TimeTracker};
use uuid::Uuid;

fn nine_am() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).unwrap()
}

fn add_pending(
    tracker: &mut TimeTracker<MemoryStore>,
    title: &str,
    date: NaiveDate,
) -> Uuid {
    let task = Task::new(title, "开发", date, nine_am());
    let id = task.id;
    tracker.add_task(task).unwrap();
    id
}

fn stored(tracker: &TimeTracker<MemoryStore>, date: NaiveDate, id: Uuid) -> Task {
    tracker
        .tasks_for(date)
        .unwrap()
        .into_iter()
        .find(|t| t.id == id)
        .unwrap()
}

#[test]
fn two_task_scenario_accumulates_exact_seconds() {
    let t0: DateTime<Local> = Local::now();
    let today = t0.date_naive();
    let mut tracker = TimeTracker::new(MemoryStore::new());

    let a = add_pending(&mut tracker, "接口联调", today);
    let b = add_pending(&mut tracker, "写周报", today);

    tracker.start_task_at(today, a, t0).unwrap();
    // Ten simulated seconds later the second start demotes the first
    tracker.start_task_at(today, b, t0 + Duration::seconds(10)).unwrap();

    let task_a = stored(&tracker, today, a);
    assert_eq!(task_a.status, TaskStatus::Paused);
    assert_eq!(task_a.time_segments.len(), 1);
    assert_eq!(task_a.time_segments[0].duration_seconds, Some(10));
    assert_eq!(task_a.elapsed_seconds, 10);
    assert!(task_a.started_at.is_none());

    let task_b = stored(&tracker, today, b);
    assert_eq!(task_b.status, TaskStatus::InProgress);
    assert_eq!(task_b.started_at, Some(t0 + Duration::seconds(10)));

    tracker
        .complete_task_at(today, b, t0 + Duration::seconds(15))
        .unwrap();
    let task_b = stored(&tracker, today, b);
    assert_eq!(task_b.status, TaskStatus::Completed);
    assert_eq!(task_b.elapsed_seconds, 5);
    assert_eq!(task_b.duration.as_deref(), Some("5秒"));
}

#[test]
fn pause_resume_matches_uninterrupted_total() {
    let t0: DateTime<Local> = Local::now();
    let today = t0.date_naive();
    let mut tracker = TimeTracker::new(MemoryStore::new());

    // Interrupted: 40 seconds, a 20 second break, then 60 more
    let a = add_pending(&mut tracker, "分段工作", today);
    tracker.start_task_at(today, a, t0).unwrap();
    tracker.pause_task_at(today, a, t0 + Duration::seconds(40)).unwrap();
    tracker.start_task_at(today, a, t0 + Duration::seconds(60)).unwrap();
    tracker
        .complete_task_at(today, a, t0 + Duration::seconds(120))
        .unwrap();

    // Uninterrupted: one 100 second stretch
    let b = add_pending(&mut tracker, "连续工作", today);
    tracker.start_task_at(today, b, t0 + Duration::seconds(200)).unwrap();
    tracker
        .complete_task_at(today, b, t0 + Duration::seconds(300))
        .unwrap();

    let task_a = stored(&tracker, today, a);
    let task_b = stored(&tracker, today, b);
    assert_eq!(task_a.time_segments.len(), 2);
    assert_eq!(task_a.elapsed_seconds, 100);
    assert_eq!(task_b.elapsed_seconds, 100);
    assert_eq!(task_a.duration, task_b.duration);
    assert_eq!(task_a.duration.as_deref(), Some("1分40秒"));
}

#[test]
fn overnight_manual_times_roll_to_next_day() {
    let now: DateTime<Local> = Local::now();
    let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let mut tracker = TimeTracker::new(MemoryStore::new());

    let task = Task::new("夜班值守", "工作", date, NaiveTime::from_hms_opt(23, 30, 0).unwrap());
    let id = task.id;
    tracker.add_task(task).unwrap();
    tracker
        .edit_task_times_at(
            date,
            id,
            NaiveTime::from_hms_opt(23, 30, 0).unwrap(),
            NaiveTime::from_hms_opt(0, 15, 0),
            now,
        )
        .unwrap();
    tracker.complete_task_at(date, id, now).unwrap();

    let task = tracker
        .tasks_for(date)
        .unwrap()
        .into_iter()
        .find(|t| t.id == id)
        .unwrap();
    assert_eq!(task.elapsed_seconds, 2700);
    assert_eq!(task.duration.as_deref(), Some("45分"));
    assert_eq!(task.status, TaskStatus::Completed);
}

#[test]
fn one_running_task_across_all_dates() {
    let t0: DateTime<Local> = Local::now();
    let today = t0.date_naive();
    let yesterday = today - Duration::days(1);
    let mut tracker = TimeTracker::new(MemoryStore::new());

    let left_running = add_pending(&mut tracker, "昨天忘了停", yesterday);
    tracker
        .start_task_at(yesterday, left_running, t0 - Duration::days(1))
        .unwrap();

    let fresh = add_pending(&mut tracker, "今天的任务", today);
    tracker.start_task_at(today, fresh, t0).unwrap();

    let old = stored(&tracker, yesterday, left_running);
    assert_eq!(old.status, TaskStatus::Paused);
    assert_eq!(old.time_segments.len(), 1);
    assert_eq!(old.elapsed_seconds, 86400);

    let (running_date, running) = tracker.running_task(today).unwrap().unwrap();
    assert_eq!(running_date, today);
    assert_eq!(running.id, fresh);
}

#[test]
fn finished_task_rejects_restart_and_keeps_runner() {
    let t0: DateTime<Local> = Local::now();
    let today = t0.date_naive();
    let mut tracker = TimeTracker::new(MemoryStore::new());

    let done = add_pending(&mut tracker, "已经完成", today);
    tracker.start_task_at(today, done, t0).unwrap();
    tracker.complete_task_at(today, done, t0 + Duration::seconds(30)).unwrap();

    let runner = add_pending(&mut tracker, "正在进行", today);
    tracker.start_task_at(today, runner, t0 + Duration::seconds(60)).unwrap();

    let err = tracker
        .start_task_at(today, done, t0 + Duration::seconds(90))
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::InvalidTransition {
            from: TaskStatus::Completed,
            action: "start"
        }
    ));

    // The failed restart did not demote the running task
    let (_, running) = tracker.running_task(today).unwrap().unwrap();
    assert_eq!(running.id, runner);
    assert_eq!(running.status, TaskStatus::InProgress);
}

#[test]
fn tracking_survives_reopen() {
    let t0: DateTime<Local> = Local::now();
    let today = t0.date_naive();
    let dir = tempfile::tempdir().unwrap();

    let first_id;
    {
        let store = FileStore::open(dir.path()).unwrap();
        let mut tracker = TimeTracker::new(store);
        let task = Task::new("跨会话任务", "开发", today, nine_am());
        first_id = task.id;
        tracker.add_task(task).unwrap();
        tracker.start_task_at(today, first_id, t0).unwrap();
        tracker.pause_task_at(today, first_id, t0 + Duration::seconds(25)).unwrap();
    }

    let store = FileStore::open(dir.path()).unwrap();
    let mut tracker = TimeTracker::new(store);
    let task = tracker
        .tasks_for(today)
        .unwrap()
        .into_iter()
        .find(|t| t.id == first_id)
        .unwrap();
    assert_eq!(task.status, TaskStatus::Paused);
    assert_eq!(task.elapsed_seconds, 25);

    tracker.start_task_at(today, first_id, t0 + Duration::seconds(100)).unwrap();
    tracker
        .complete_task_at(today, first_id, t0 + Duration::seconds(175))
        .unwrap();
    let task = tracker
        .tasks_for(today)
        .unwrap()
        .into_iter()
        .find(|t| t.id == first_id)
        .unwrap();
    assert_eq!(task.elapsed_seconds, 100);
    assert_eq!(task.duration.as_deref(), Some("1分40秒"));
}
