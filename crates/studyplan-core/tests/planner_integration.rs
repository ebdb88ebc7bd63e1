//! Integration tests for the dataset -> plan -> history workflow.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use studyplan_core::scheduler::LaneKind;
use studyplan_core::{
    Course, Dataset, PlanHistory, PlanSnapshot, QuestionAttempt, StudyPlanner, StudyUnit, Task,
    TaskType,
};

fn now() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2026-03-01T09:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

fn task(id: &str, title: &str, task_type: TaskType, minutes: u32) -> Task {
    let mut t = Task::new(title, task_type, minutes);
    t.id = id.to_string();
    t
}

fn attempt(id: &str, unit_id: &str, correct: bool) -> QuestionAttempt {
    QuestionAttempt {
        id: id.to_string(),
        unit_id: unit_id.to_string(),
        correct,
        attempted_at: now() - Duration::days(1),
        remediated: false,
    }
}

fn semester() -> Dataset {
    let mut ds = Dataset::default();
    ds.courses.push(Course {
        id: "calc".into(),
        name: "Calculus".into(),
        exam_date: Some(now() + Duration::days(20)),
        target_score: None,
    });
    ds.units.push(StudyUnit::new("limits", "calc", 1, "Limits"));
    ds.units.push(StudyUnit::new("series", "calc", 2, "Series"));

    ds.tasks.push(
        task("hw1", "Homework 1", TaskType::AssignmentWork, 60)
            .with_course("calc")
            .with_due(now() + Duration::days(2)),
    );
    ds.tasks.push(
        task("hw2", "Homework 2", TaskType::AssignmentWork, 90)
            .with_course("calc")
            .with_due(now() + Duration::days(5)),
    );
    let mut done = task("hw0", "Homework 0", TaskType::AssignmentWork, 20).with_course("calc");
    done.completed = true;
    ds.tasks.push(done);
    ds.tasks.push(task("series-notes", "Series notes", TaskType::ExamBuild, 25).with_unit("series"));
    ds.tasks.push(task("limits-notes", "Limits notes", TaskType::ExamBuild, 30).with_unit("limits"));
    ds.tasks.push(task("quiz", "Timed quiz", TaskType::TimedPractice, 10).with_unit("series"));

    ds.attempts = vec![
        attempt("a1", "limits", false),
        attempt("a2", "limits", false),
        attempt("a3", "limits", false),
        attempt("a4", "series", true),
        attempt("a5", "series", true),
    ];
    ds
}

fn ids(tasks: &[studyplan_core::ScoredTask]) -> Vec<&str> {
    tasks.iter().map(|s| s.task.id.as_str()).collect()
}

#[test]
fn test_full_planning_workflow() {
    let planner = StudyPlanner::default();
    let ds = semester();

    let outcome = planner.build_plan(&ds, None, now());
    let plan = &outcome.plan;

    // 60 fits the 78-minute budget; adding 90 would pass 93.6.
    assert_eq!(ids(&plan.due_soon.tasks), vec!["hw1"]);
    // The weakest unit goes first; the second note set would pass 36.
    assert_eq!(ids(&plan.exam_build.tasks), vec!["limits-notes"]);
    assert_eq!(ids(&plan.timed_practice.tasks), vec!["quiz"]);
    assert_eq!(plan.total_minutes, 100);
    assert_eq!(plan.target_minutes(), 120);
    assert!(outcome.diagnostics.is_clean());

    for lane in plan.lanes() {
        assert!(lane.tasks.iter().all(|s| s.task.id != "hw0"));
    }
}

#[test]
fn test_scores_reflect_unit_weakness() {
    let planner = StudyPlanner::default();
    let scored = planner.score(&semester(), now());

    assert_eq!(scored.len(), 5);
    assert!(scored.windows(2).all(|w| w[0].total >= w[1].total));

    let limits = scored.iter().find(|s| s.task.id == "limits-notes").unwrap();
    let series = scored.iter().find(|s| s.task.id == "series-notes").unwrap();
    assert_eq!(limits.weakness_bonus, 50.0);
    assert_eq!(series.weakness_bonus, 15.0);
    // Exam in 20 days: 50 + 30 * (1 - 20/30)
    assert_eq!(limits.importance, 60.0);
}

#[test]
fn test_plan_history_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let planner = StudyPlanner::default();
    let mut ds = semester();

    let plan = planner.build_plan(&ds, None, now()).plan;
    let snapshot = PlanSnapshot::from_plan(&plan);

    let history = PlanHistory::open_at(&dir.path().join("history.db")).unwrap();
    history.record(&snapshot).unwrap();

    let day = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
    let record = history.latest_for_day(day).unwrap().unwrap();
    assert_eq!(record.id, snapshot.id);
    assert_eq!(record.task_count, 3);

    // The homework was deleted after planning.
    ds.tasks.retain(|t| t.id != "hw1");
    let restored = record.snapshot.restore(&ds.tasks);
    let due_soon = restored
        .lanes
        .iter()
        .find(|l| l.lane == LaneKind::DueSoon)
        .unwrap();
    assert!(due_soon.tasks.is_empty());
    assert_eq!(due_soon.missing_task_ids, vec!["hw1".to_string()]);
    assert_eq!(restored.total_minutes, 100);
}

#[test]
fn test_remediation_feeds_next_plan() {
    let planner = StudyPlanner::default();
    let mut ds = semester();

    let created = planner.apply_remediation(&mut ds, now());
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].title, "Review: Limits");
    assert_eq!(created[0].task_type, TaskType::ExamBuild);

    let scored = planner.score(&ds, now());
    assert!(scored.iter().any(|s| s.task.id == created[0].id));
}

#[test]
fn test_dataset_file_drives_readiness() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dataset.json");
    semester().save(&path).unwrap();

    let ds = Dataset::load(&path).unwrap();
    let report = StudyPlanner::default().readiness_report(&ds, now());
    assert_eq!(report.len(), 1);

    let score = report[0].result.as_ref().unwrap();
    // series reaches mastery 60, limits stays at 0
    assert_eq!(score.coverage, 50);
    // 2 of 5 attempts correct
    assert_eq!(score.accuracy, 40);
    assert_eq!(score.recency, 0);
    assert!(score.total <= 100);
}
