//! Per-exercise totals and overall numbers for one user

use std::collections::{HashMap, HashSet};

use chrono::FixedOffset;
use serde::Serialize;

use super::{round1, weight_label};
use crate::exercises::Category;
use crate::models::LogRow;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExerciseStats {
    pub exercise_id: i64,
    pub name: String,
    pub category: Category,
    pub total_sets: usize,
    pub total_reps: i64,
    pub max_weight: f64,
    pub max_weight_label: String,
    pub max_reps: i32,
    pub avg_weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserStats {
    /// Distinct calendar days with at least one set
    pub total_workouts: usize,
    pub unique_exercises: usize,
    pub total_sets: usize,
    pub total_reps: i64,
    /// Most sets first, then by name
    pub exercises: Vec<ExerciseStats>,
}

#[derive(Default)]
struct Accumulator {
    sets: usize,
    reps: i64,
    max_weight: f64,
    max_reps: i32,
    weight_sum: f64,
}

pub fn compute_stats(rows: &[LogRow], offset: FixedOffset) -> UserStats {
    let mut per_exercise: HashMap<i64, (&LogRow, Accumulator)> = HashMap::new();
    let mut days = HashSet::new();

    for row in rows {
        days.insert(row.date.with_timezone(&offset).date_naive());

        let (_, acc) = per_exercise
            .entry(row.exercise_id)
            .or_insert_with(|| (row, Accumulator::default()));
        acc.sets += 1;
        acc.reps += i64::from(row.reps);
        acc.max_weight = acc.max_weight.max(row.weight);
        acc.max_reps = acc.max_reps.max(row.reps);
        acc.weight_sum += row.weight;
    }

    let mut exercises: Vec<ExerciseStats> = per_exercise
        .into_values()
        .map(|(first, acc)| ExerciseStats {
            exercise_id: first.exercise_id,
            name: first.exercise_name.clone(),
            category: first.category,
            total_sets: acc.sets,
            total_reps: acc.reps,
            max_weight: acc.max_weight,
            max_weight_label: weight_label(acc.max_weight),
            max_reps: acc.max_reps,
            avg_weight: round1(acc.weight_sum / acc.sets as f64),
        })
        .collect();
    exercises.sort_by(|a, b| {
        b.total_sets
            .cmp(&a.total_sets)
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.exercise_id.cmp(&b.exercise_id))
    });

    UserStats {
        total_workouts: days.len(),
        unique_exercises: exercises.len(),
        total_sets: rows.len(),
        total_reps: rows.iter().map(|r| i64::from(r.reps)).sum(),
        exercises,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn row(exercise_id: i64, name: &str, weight: f64, reps: i32, date: DateTime<Utc>) -> LogRow {
        LogRow {
            id: 0,
            user_id: 1,
            exercise_id,
            exercise_name: name.to_string(),
            category: Category::Legs,
            photo_path: None,
            set_number: 1,
            weight,
            reps,
            date,
        }
    }

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_empty_stats() {
        let stats = compute_stats(&[], utc());
        assert_eq!(stats.total_workouts, 0);
        assert_eq!(stats.unique_exercises, 0);
        assert_eq!(stats.total_sets, 0);
        assert_eq!(stats.total_reps, 0);
        assert!(stats.exercises.is_empty());
    }

    #[test]
    fn test_per_exercise_totals() {
        let rows = vec![
            row(1, "Squat", 100.0, 5, day(1)),
            row(1, "Squat", 110.0, 3, day(1)),
            row(1, "Squat", 90.0, 8, day(2)),
            row(2, "Lunge", 0.0, 12, day(2)),
        ];
        let stats = compute_stats(&rows, utc());

        assert_eq!(stats.total_workouts, 2);
        assert_eq!(stats.unique_exercises, 2);
        assert_eq!(stats.total_sets, 4);
        assert_eq!(stats.total_reps, 28);

        let squat = &stats.exercises[0];
        assert_eq!(squat.name, "Squat");
        assert_eq!(squat.total_sets, 3);
        assert_eq!(squat.total_reps, 16);
        assert_eq!(squat.max_weight, 110.0);
        assert_eq!(squat.max_weight_label, "110 kg");
        assert_eq!(squat.max_reps, 8);
        assert_eq!(squat.avg_weight, 100.0);

        let lunge = &stats.exercises[1];
        assert_eq!(lunge.max_weight_label, "Bodyweight");
        assert_eq!(lunge.avg_weight, 0.0);
    }

    #[test]
    fn test_order_by_sets_then_name() {
        let rows = vec![
            row(1, "Squat", 100.0, 5, day(1)),
            row(2, "Deadlift", 140.0, 5, day(1)),
            row(3, "Row", 60.0, 10, day(1)),
            row(3, "Row", 60.0, 10, day(1)),
        ];
        let stats = compute_stats(&rows, utc());
        let names: Vec<_> = stats.exercises.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Row", "Deadlift", "Squat"]);
    }
}
