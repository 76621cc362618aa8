//! Analytics module - history grouping and per-exercise statistics
//!
//! Both passes are pure functions over rows already joined with their
//! exercise, so the REST API, the bot and the CLI render the same numbers.

pub mod history;
pub mod stats;

pub use history::{DayExerciseSummary, DaySummary, group_by_day, take_days};
pub use stats::{ExerciseStats, UserStats, compute_stats};

/// Shown instead of a number when no external load was used
pub const BODYWEIGHT_LABEL: &str = "Bodyweight";

/// Shortest decimal form: `60`, `62.5`
pub fn format_number(weight: f64) -> String {
    format!("{}", weight)
}

/// `"Bodyweight"` for the zero sentinel, `"<number> kg"` otherwise
pub fn weight_label(weight: f64) -> String {
    if weight == 0.0 {
        BODYWEIGHT_LABEL.to_string()
    } else {
        format!("{} kg", format_number(weight))
    }
}

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
