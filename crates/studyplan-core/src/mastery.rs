//! Unit mastery aggregation.
//!
//! Mastery (0-100) blends two signals for a study unit:
//!
//! ```text
//! completion = completed tasks / linked tasks      * 100
//! accuracy   = correct attempts / linked attempts  * 100
//! mastery    = round(completion * 0.4 + accuracy * 0.6)
//! ```
//!
//! When only one signal exists it is used as-is, without the 40/60 split.
//! When neither exists mastery is 0.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::course::{QuestionAttempt, StudyUnit};
use crate::task::Task;

const COMPLETION_WEIGHT: f64 = 0.4;
const ACCURACY_WEIGHT: f64 = 0.6;

/// Anything that carries a completion state.
pub trait CompletionRecord {
    fn is_completed(&self) -> bool;
}

/// Anything that carries a correctness outcome.
pub trait CorrectnessRecord {
    fn is_correct(&self) -> bool;
}

impl CompletionRecord for Task {
    fn is_completed(&self) -> bool {
        self.completed
    }
}

impl CorrectnessRecord for QuestionAttempt {
    fn is_correct(&self) -> bool {
        self.correct
    }
}

impl<T: CompletionRecord + ?Sized> CompletionRecord for &T {
    fn is_completed(&self) -> bool {
        (**self).is_completed()
    }
}

impl<T: CorrectnessRecord + ?Sized> CorrectnessRecord for &T {
    fn is_correct(&self) -> bool {
        (**self).is_correct()
    }
}

/// Percentage of completed tasks, 0 when there are none.
pub fn completion_rate<T: CompletionRecord>(tasks: &[T]) -> f64 {
    if tasks.is_empty() {
        return 0.0;
    }
    let done = tasks.iter().filter(|t| t.is_completed()).count();
    done as f64 / tasks.len() as f64 * 100.0
}

/// Percentage of correct attempts, 0 when there are none.
pub fn question_accuracy<A: CorrectnessRecord>(attempts: &[A]) -> f64 {
    if attempts.is_empty() {
        return 0.0;
    }
    let correct = attempts.iter().filter(|a| a.is_correct()).count();
    correct as f64 / attempts.len() as f64 * 100.0
}

/// Compute mastery for one unit from its linked tasks and attempts.
///
/// Pure: the same inputs always give the same score.
pub fn compute_unit_mastery<T, A>(tasks: &[T], attempts: &[A]) -> u8
where
    T: CompletionRecord,
    A: CorrectnessRecord,
{
    let raw = match (tasks.is_empty(), attempts.is_empty()) {
        (true, true) => 0.0,
        (false, true) => completion_rate(tasks),
        (true, false) => question_accuracy(attempts),
        (false, false) => {
            completion_rate(tasks) * COMPLETION_WEIGHT + question_accuracy(attempts) * ACCURACY_WEIGHT
        }
    };
    raw.round().clamp(0.0, 100.0) as u8
}

/// Recompute a unit's mastery and mark it as studied at `now`.
///
/// Returns the new mastery score.
pub fn update_unit_mastery<T, A>(
    unit: &mut StudyUnit,
    tasks: &[T],
    attempts: &[A],
    now: DateTime<Utc>,
) -> u8
where
    T: CompletionRecord,
    A: CorrectnessRecord,
{
    unit.mastery = compute_unit_mastery(tasks, attempts);
    unit.last_studied_at = Some(now);
    tracing::debug!(unit_id = %unit.id, mastery = unit.mastery, "unit mastery updated");
    unit.mastery
}

/// Recompute mastery for every unit without touching last-studied stamps.
///
/// Tasks and attempts are matched to units by `unit_id`; records pointing at
/// unknown units are ignored.
pub fn recompute_all(units: &[StudyUnit], tasks: &[Task], attempts: &[QuestionAttempt]) -> Vec<StudyUnit> {
    let mut tasks_by_unit: HashMap<&str, Vec<&Task>> = HashMap::new();
    for task in tasks {
        if let Some(unit_id) = task.unit_id.as_deref() {
            tasks_by_unit.entry(unit_id).or_default().push(task);
        }
    }

    let mut attempts_by_unit: HashMap<&str, Vec<&QuestionAttempt>> = HashMap::new();
    for attempt in attempts {
        attempts_by_unit
            .entry(attempt.unit_id.as_str())
            .or_default()
            .push(attempt);
    }

    units
        .iter()
        .map(|unit| {
            let unit_tasks = tasks_by_unit.get(unit.id.as_str()).map(Vec::as_slice).unwrap_or(&[]);
            let unit_attempts = attempts_by_unit
                .get(unit.id.as_str())
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            StudyUnit {
                mastery: compute_unit_mastery(unit_tasks, unit_attempts),
                ..unit.clone()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskType;
    use proptest::prelude::*;

    fn task(completed: bool) -> Task {
        let mut t = Task::new("t", TaskType::ExamBuild, 30).with_unit("u1");
        t.completed = completed;
        t
    }

    fn attempt(correct: bool) -> QuestionAttempt {
        QuestionAttempt {
            id: uuid::Uuid::new_v4().to_string(),
            unit_id: "u1".to_string(),
            correct,
            attempted_at: Utc::now(),
            remediated: false,
        }
    }

    #[test]
    fn empty_inputs_give_zero() {
        let tasks: Vec<Task> = Vec::new();
        let attempts: Vec<QuestionAttempt> = Vec::new();
        assert_eq!(compute_unit_mastery(&tasks, &attempts), 0);
    }

    #[test]
    fn tasks_only_uses_completion_rate_unscaled() {
        let tasks = vec![task(true), task(true), task(true), task(false)];
        let attempts: Vec<QuestionAttempt> = Vec::new();
        assert_eq!(compute_unit_mastery(&tasks, &attempts), 75);
    }

    #[test]
    fn attempts_only_uses_accuracy_unscaled() {
        let tasks: Vec<Task> = Vec::new();
        let attempts = vec![attempt(true), attempt(false)];
        assert_eq!(compute_unit_mastery(&tasks, &attempts), 50);
    }

    #[test]
    fn both_signals_are_blended_40_60() {
        // completion 50, accuracy 100 -> 20 + 60 = 80
        let tasks = vec![task(true), task(false)];
        let attempts = vec![attempt(true), attempt(true)];
        assert_eq!(compute_unit_mastery(&tasks, &attempts), 80);
    }

    #[test]
    fn blended_score_is_rounded() {
        // completion 100/3 = 33.33, accuracy 0 -> 13.33 -> 13
        let tasks = vec![task(true), task(false), task(false)];
        let attempts = vec![attempt(false)];
        assert_eq!(compute_unit_mastery(&tasks, &attempts), 13);
    }

    #[test]
    fn works_with_borrowed_records() {
        let owned = vec![task(true)];
        let borrowed: Vec<&Task> = owned.iter().collect();
        let attempts: Vec<&QuestionAttempt> = Vec::new();
        assert_eq!(compute_unit_mastery(&borrowed, &attempts), 100);
    }

    #[test]
    fn update_stamps_last_studied() {
        let mut unit = StudyUnit::new("u1", "c1", 1, "Limits");
        let now = Utc::now();
        let score = update_unit_mastery(&mut unit, &[task(true)], &[attempt(false)], now);
        assert_eq!(score, 40);
        assert_eq!(unit.mastery, 40);
        assert_eq!(unit.last_studied_at, Some(now));
    }

    #[test]
    fn recompute_all_groups_by_unit_and_keeps_timestamps() {
        let mut u1 = StudyUnit::new("u1", "c1", 1, "Limits");
        u1.mastery = 99;
        let u2 = StudyUnit::new("u2", "c1", 2, "Derivatives");
        let tasks = vec![task(true), task(false)];
        let attempts = vec![attempt(true)];

        let updated = recompute_all(&[u1.clone(), u2], &tasks, &attempts);
        assert_eq!(updated[0].mastery, 80);
        assert_eq!(updated[0].last_studied_at, u1.last_studied_at);
        assert_eq!(updated[1].mastery, 0);
    }

    proptest! {
        #[test]
        fn mastery_stays_in_range_and_is_idempotent(
            done in proptest::collection::vec(any::<bool>(), 0..20),
            correct in proptest::collection::vec(any::<bool>(), 0..20),
        ) {
            let tasks: Vec<Task> = done.iter().map(|&d| task(d)).collect();
            let attempts: Vec<QuestionAttempt> = correct.iter().map(|&c| attempt(c)).collect();
            let first = compute_unit_mastery(&tasks, &attempts);
            let second = compute_unit_mastery(&tasks, &attempts);
            prop_assert!(first <= 100);
            prop_assert_eq!(first, second);
            if tasks.is_empty() && attempts.is_empty() {
                prop_assert_eq!(first, 0);
            }
        }
    }
}
