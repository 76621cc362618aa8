//! Message texts. Pure functions so they can be tested without Telegram.

use crate::analytics::{DaySummary, UserStats, format_number};
use crate::exercises::Category;
use crate::models::Exercise;

pub const MENU_TEXT: &str = "🏋️ Главное меню Фитнес-Трекера:";

pub const HELP_TEXT: &str = "ℹ️ Помощь по Фитнес-Трекеру\n\n\
    🚀 Открыть трекер - выбирай упражнения, записывай подходы, добавляй свои упражнения\n\
    /exercises - каталог упражнений со ссылками на тренировку\n\
    /history - последние тренировки по дням\n\
    /stats - статистика по упражнениям\n\
    /app - открыть трекер\n\n\
    Вес 0 означает упражнение со своим весом.";

pub const NEED_START_TEXT: &str = "Сначала нажми /start, чтобы зарегистрироваться.";

pub const UNKNOWN_TEXT: &str = "Не понимаю 🤔 Открой трекер или посмотри /help";

/// Telegram rejects longer messages. Counted in UTF-16 code units.
pub const MESSAGE_LIMIT: usize = 4096;

/// Marks a message that was cut to fit
const MORE_LINE: &str = "\n…";

/// Longest set breakdown shown for one exercise, in chars
const DETAIL_LIMIT: usize = 300;

fn message_len(s: &str) -> usize {
    s.encode_utf16().count()
}

fn shorten(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// Message assembled from whole chunks. Once a chunk does not fit, it and
/// everything after it are replaced by a single "…" line.
struct MessageText {
    text: String,
    len: usize,
    full: bool,
}

impl MessageText {
    fn new(head: &str) -> Self {
        let mut message = Self { text: String::new(), len: 0, full: false };
        message.push(head);
        message
    }

    fn push(&mut self, chunk: &str) {
        if self.full {
            return;
        }
        let len = message_len(chunk);
        if self.len + len + message_len(MORE_LINE) > MESSAGE_LIMIT {
            self.text.push_str(MORE_LINE);
            self.full = true;
            return;
        }
        self.text.push_str(chunk);
        self.len += len;
    }

    fn finish(self) -> String {
        self.text
    }
}

pub fn welcome(first_name: &str) -> String {
    format!(
        "🏋️ Добро пожаловать в Фитнес-Трекер, {}!\n\n\
        Я помогу вести учет тренировок:\n\n\
        📝 Записывать подходы и веса\n\
        📊 Показывать историю тренировок\n\
        📈 Вести статистику по упражнениям\n\n\
        Выбери действие:",
        first_name
    )
}

/// Catalog grouped by category, categories in their fixed order
pub fn format_exercises(exercises: &[Exercise]) -> String {
    if exercises.is_empty() {
        return "Каталог упражнений пуст.".to_string();
    }

    let mut text = MessageText::new("📋 Упражнения:\n");
    for category in Category::all() {
        let in_category: Vec<&Exercise> =
            exercises.iter().filter(|e| e.category == *category).collect();
        if in_category.is_empty() {
            continue;
        }
        text.push(&format!("\n{} {}\n", category.emoji(), category.name_ru()));
        for exercise in in_category {
            let mark = if exercise.is_custom { " ✏️" } else { "" };
            text.push(&format!("• {}{}\n", exercise.name, mark));
        }
    }
    text.push("\nНажми на упражнение ниже, чтобы начать тренировку.");
    text.finish()
}

/// Newest days first; whatever does not fit in one message is dropped.
pub fn format_history(days: &[DaySummary]) -> String {
    if days.is_empty() {
        return "У тебя пока нет записей о тренировках. Начни с новой тренировки! 💪".to_string();
    }

    let mut text = MessageText::new("📊 Твоя история тренировок:\n");
    for day in days {
        text.push(&format!(
            "\n📅 {} - {} подх., {} повт.\n",
            day.date.format("%d.%m.%Y"),
            day.total_sets,
            day.total_reps
        ));
        for exercise in &day.exercises {
            text.push(&format!(
                "💪 {}: {} подх., макс. {}\n   {}\n",
                exercise.name,
                exercise.total_sets,
                exercise.max_weight,
                shorten(&exercise.sets_detail, DETAIL_LIMIT)
            ));
        }
    }
    text.finish()
}

/// Grand totals plus the `top` exercises with the most sets
pub fn format_stats(stats: &UserStats, top: usize) -> String {
    if stats.total_sets == 0 {
        return "У тебя пока нет данных для статистики. Начни тренироваться! 💪".to_string();
    }

    let mut text = MessageText::new(&format!(
        "📈 Твоя статистика:\n\n\
        Тренировок: {}\n\
        Упражнений: {}\n\
        Подходов: {}\n\
        Повторений: {}\n",
        stats.total_workouts, stats.unique_exercises, stats.total_sets, stats.total_reps
    ));

    text.push("\n🏆 Топ упражнений:\n");
    for exercise in stats.exercises.iter().take(top) {
        let mut block = format!(
            "\n💪 {}:\n  • Подходов: {}\n  • Повторений: {}\n  • Макс. повторений: {}\n",
            exercise.name, exercise.total_sets, exercise.total_reps, exercise.max_reps
        );
        if exercise.max_weight > 0.0 {
            block.push_str(&format!(
                "  • Макс. вес: {} кг\n  • Средний вес: {} кг\n",
                format_number(exercise.max_weight),
                format_number(exercise.avg_weight)
            ));
        } else {
            block.push_str("  • Свой вес\n");
        }
        text.push(&block);
    }
    text.finish()
}
