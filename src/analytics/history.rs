//! Day-by-day history: flat set rows → days → exercises

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::Serialize;

use super::{format_number, round1, weight_label};
use crate::exercises::Category;
use crate::models::LogRow;

/// Everything done on one exercise during one calendar day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayExerciseSummary {
    pub exercise_id: i64,
    pub name: String,
    pub category: Category,
    pub photo_path: Option<String>,
    pub total_sets: usize,
    pub total_reps: i64,
    /// Heaviest set, already rendered (`"Bodyweight"` or `"60 kg"`)
    pub max_weight: String,
    pub avg_weight: f64,
    /// `"1×10(60kg), 2×8(60kg)"`, ascending by set number
    pub sets_detail: String,
    pub last_set_time: DateTime<Utc>,
}

/// One calendar day of training
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub exercises: Vec<DayExerciseSummary>,
    pub total_sets: usize,
    pub total_reps: i64,
}

/// Group one user's rows by calendar day (in `offset`) and exercise.
///
/// Days come newest first. Inside a day exercises are ordered by their last
/// set, newest first; equal times keep the order in which the exercise first
/// appeared in `rows`.
pub fn group_by_day(rows: &[LogRow], offset: FixedOffset) -> Vec<DaySummary> {
    let mut days: BTreeMap<NaiveDate, Vec<Vec<&LogRow>>> = BTreeMap::new();

    for row in rows {
        let date = row.date.with_timezone(&offset).date_naive();
        let groups = days.entry(date).or_default();
        match groups.iter_mut().find(|g| g[0].exercise_id == row.exercise_id) {
            Some(group) => group.push(row),
            None => groups.push(vec![row]),
        }
    }

    days.into_iter()
        .rev()
        .map(|(date, groups)| {
            let mut exercises: Vec<_> = groups.into_iter().map(summarize_exercise).collect();
            exercises.sort_by(|a, b| b.last_set_time.cmp(&a.last_set_time));

            let total_sets = exercises.iter().map(|e| e.total_sets).sum();
            let total_reps = exercises.iter().map(|e| e.total_reps).sum();
            DaySummary { date, exercises, total_sets, total_reps }
        })
        .collect()
}

/// Keep the newest `limit` days. Days are never cut in half.
pub fn take_days(mut days: Vec<DaySummary>, limit: Option<usize>) -> Vec<DaySummary> {
    if let Some(limit) = limit {
        days.truncate(limit);
    }
    days
}

// `sets` is never empty: a group is created with its first row.
fn summarize_exercise(mut sets: Vec<&LogRow>) -> DayExerciseSummary {
    let first = sets[0];
    let total_sets = sets.len();
    let total_reps = sets.iter().map(|r| i64::from(r.reps)).sum();
    let max_weight = sets.iter().map(|r| r.weight).fold(0.0, f64::max);
    let avg_weight = round1(sets.iter().map(|r| r.weight).sum::<f64>() / total_sets as f64);
    let last_set_time = sets.iter().map(|r| r.date).max().unwrap_or(first.date);

    sets.sort_by_key(|r| (r.set_number, r.date));
    let sets_detail = sets
        .iter()
        .map(|r| format!("{}×{}({}kg)", r.set_number, r.reps, format_number(r.weight)))
        .collect::<Vec<_>>()
        .join(", ");

    DayExerciseSummary {
        exercise_id: first.exercise_id,
        name: first.exercise_name.clone(),
        category: first.category,
        photo_path: first.photo_path.clone(),
        total_sets,
        total_reps,
        max_weight: weight_label(max_weight),
        avg_weight,
        sets_detail,
        last_set_time,
    }
}
