//! Exercise categories and the built-in catalog - база упражнений

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TrackerError;

/// Fixed set of muscle-area categories an exercise belongs to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[serde(alias = "грудь")]
    Chest,      // Грудь
    #[serde(alias = "ноги")]
    Legs,       // Ноги
    #[serde(alias = "спина")]
    Back,       // Спина
    #[serde(alias = "плечи")]
    Shoulders,  // Плечи
    #[serde(alias = "руки")]
    Arms,       // Руки
    #[serde(alias = "пресс")]
    Abs,        // Пресс
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Chest => "chest",
            Category::Legs => "legs",
            Category::Back => "back",
            Category::Shoulders => "shoulders",
            Category::Arms => "arms",
            Category::Abs => "abs",
        }
    }

    pub fn name_ru(&self) -> &'static str {
        match self {
            Category::Chest => "грудь",
            Category::Legs => "ноги",
            Category::Back => "спина",
            Category::Shoulders => "плечи",
            Category::Arms => "руки",
            Category::Abs => "пресс",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Category::Chest => "💪",
            Category::Legs => "🦵",
            Category::Back => "🔙",
            Category::Shoulders => "🤸",
            Category::Arms => "💪",
            Category::Abs => "🎯",
        }
    }

    /// All categories in display order
    pub fn all() -> &'static [Category] {
        &[
            Category::Chest,
            Category::Legs,
            Category::Back,
            Category::Shoulders,
            Category::Arms,
            Category::Abs,
        ]
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Category {
    type Err = TrackerError;

    /// Accepts the English id or the Russian label, any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        Category::all()
            .iter()
            .copied()
            .find(|c| c.as_str() == needle || c.name_ru() == needle)
            .ok_or_else(|| TrackerError::validation(format!("unknown category '{}'", s.trim())))
    }
}

/// Row of the built-in catalog, inserted once into an empty store
#[derive(Debug, Clone)]
pub struct SeedExercise {
    pub name: &'static str,
    pub category: Category,
}

/// Базовые упражнения
pub const SEED_EXERCISES: &[SeedExercise] = &[
    SeedExercise { name: "Жим лежа", category: Category::Chest },
    SeedExercise { name: "Приседания со штангой", category: Category::Legs },
    SeedExercise { name: "Становая тяга", category: Category::Back },
    SeedExercise { name: "Подтягивания", category: Category::Back },
    SeedExercise { name: "Армейский жим", category: Category::Shoulders },
    SeedExercise { name: "Бицепс со штангой", category: Category::Arms },
    SeedExercise { name: "Трицепс на блоке", category: Category::Arms },
    SeedExercise { name: "Сгибания ног в тренажере", category: Category::Legs },
    SeedExercise { name: "Гиперэкстензия", category: Category::Back },
    SeedExercise { name: "Скручивания", category: Category::Abs },
];

pub fn get_seed_exercises() -> &'static [SeedExercise] {
    SEED_EXERCISES
}
