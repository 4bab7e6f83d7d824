//! Urgency scoring for the to-do order.
//!
//! The score combines three terms:
//!
//! - `5 * priority` where Low=1, Medium=2, High=3
//! - `10 * (1 - h / (t + h + 0.1))`, the share of the remaining time the
//!   task itself would consume
//! - `100 / (h + 0.1)`, inverse proximity to the deadline
//!
//! with `h` the hours until the deadline and `t` the hours needed. Overdue
//! tasks (negative `h`) are scored by the same expression without clamping,
//! so they can come out very large or negative.

use chrono::NaiveDateTime;

use crate::entities::Task;

const PRIORITY_WEIGHT: f64 = 5.0;
const TIME_RATIO_WEIGHT: f64 = 10.0;
const PROXIMITY_WEIGHT: f64 = 100.0;
const EPSILON: f64 = 0.1;

/// Hours from `now` until the task's deadline; negative when overdue.
pub fn hours_until_deadline(task: &Task, now: NaiveDateTime) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let millis = (task.deadline - now).num_milliseconds() as f64;
    millis / 3_600_000.0
}

/// Urgency score of `task` at `now`. Higher means do it sooner.
pub fn score(task: &Task, now: NaiveDateTime) -> f64 {
    let until = hours_until_deadline(task, now);
    let needed = task.time_needed.as_hours();

    PRIORITY_WEIGHT * task.priority.weight()
        + TIME_RATIO_WEIGHT * (1.0 - until / (needed + until + EPSILON))
        + PROXIMITY_WEIGHT / (until + EPSILON)
}

/// Tasks paired with their score, highest score first.
///
/// The sort is stable: equal scores keep their input order.
pub fn scored(tasks: Vec<Task>, now: NaiveDateTime) -> Vec<(Task, f64)> {
    let mut scored: Vec<(Task, f64)> = tasks
        .into_iter()
        .map(|task| {
            let s = score(&task, now);
            (task, s)
        })
        .collect();
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    scored
}

/// Tasks ordered by descending score.
pub fn rank(tasks: Vec<Task>, now: NaiveDateTime) -> Vec<Task> {
    scored(tasks, now).into_iter().map(|(task, _)| task).collect()
}
