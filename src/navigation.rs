//! Deep links into the web app
//!
//! The front-end opens the screen named in the query string, so a chat
//! message can send the user straight to a workout for a given exercise.

use url::Url;

/// Screen of the web app, with whatever it needs to open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Main,
    Exercises,
    Workout { exercise_id: i64 },
    AddExercise,
    History,
    Stats,
}

impl Screen {
    pub fn name(&self) -> &'static str {
        match self {
            Screen::Main => "main",
            Screen::Exercises => "exercises",
            Screen::Workout { .. } => "workout",
            Screen::AddExercise => "add-exercise",
            Screen::History => "history",
            Screen::Stats => "stats",
        }
    }
}

/// Base address of the web app plus link construction
#[derive(Debug, Clone)]
pub struct WebAppLinks {
    base: Url,
}

impl WebAppLinks {
    pub fn new(base: Url) -> Self {
        Self { base }
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn url(&self, screen: Screen) -> Url {
        let mut url = self.base.clone();
        {
            let mut query = url.query_pairs_mut();
            query.clear();
            query.append_pair("screen", screen.name());
            if let Screen::Workout { exercise_id } = screen {
                query.append_pair("exercise_id", &exercise_id.to_string());
            }
        }
        url
    }
}
