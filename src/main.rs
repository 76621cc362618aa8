//! fitlog - strength training tracker
//!
//! Runs the REST API for the web app, the Telegram bot, or both, and offers
//! a few commands for working with the log from the terminal.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::FixedOffset;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use fitlog::analytics::{compute_stats, format_number, group_by_day, take_days, weight_label};
use fitlog::config::{
    ApiConfig, BotConfig, DEFAULT_BIND_ADDRESS, DEFAULT_DB_PATH, DEFAULT_HISTORY_DAYS,
    DEFAULT_UTC_OFFSET, parse_utc_offset,
};
use fitlog::db::Database;
use fitlog::models::{Exercise, NewExercise, NewUser, User};
use fitlog::session::{PendingSet, WorkoutSession};

#[derive(Parser)]
#[command(name = "fitlog")]
#[command(author, version, about = "Strength training tracker: web app API and Telegram bot")]
struct Cli {
    /// SQLite database file
    #[arg(long, env = "FITLOG_DB", default_value = DEFAULT_DB_PATH, global = true)]
    db: String,

    /// Offset used to split sets into calendar days (e.g. +03:00)
    #[arg(long, env = "UTC_OFFSET", default_value = DEFAULT_UTC_OFFSET, value_parser = parse_utc_offset, global = true)]
    utc_offset: FixedOffset,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ApiArgs {
    /// Address the REST API listens on
    #[arg(long, env = "BIND_ADDRESS", default_value = DEFAULT_BIND_ADDRESS)]
    bind: SocketAddr,

    /// Built web front-end to serve next to the API
    #[arg(long, env = "STATIC_DIR")]
    static_dir: Option<PathBuf>,
}

#[derive(Args)]
struct BotArgs {
    /// Telegram bot token (or set TELOXIDE_TOKEN env var)
    #[arg(short, long, env = "TELOXIDE_TOKEN")]
    token: String,

    /// Public address of the web app opened from the bot
    #[arg(long, env = "WEBAPP_URL")]
    webapp_url: String,
}

#[derive(Args)]
struct UserArgs {
    /// Telegram id of the user whose log is used
    #[arg(long, env = "FITLOG_TELEGRAM_ID")]
    telegram_id: i64,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the REST API
    Serve {
        #[command(flatten)]
        api: ApiArgs,
    },

    /// Start Telegram bot
    Bot {
        #[command(flatten)]
        bot: BotArgs,
    },

    /// Start the API and the bot in one process
    Run {
        #[command(flatten)]
        api: ApiArgs,
        #[command(flatten)]
        bot: BotArgs,
    },

    /// List the exercise catalog
    Exercises,

    /// Add a custom exercise to the catalog
    AddExercise {
        /// Exercise name
        name: String,

        /// Category: chest, legs, back, shoulders, arms, abs
        #[arg(short, long)]
        category: String,

        /// Optional photo reference
        #[arg(long)]
        photo: Option<String>,
    },

    /// Log a workout: every --set is committed in order as sets 1..n
    Log {
        /// Exercise id or exact name
        exercise: String,

        /// WEIGHTxREPS, 0 for bodyweight (e.g. --set 60x10 --set 62.5x8)
        #[arg(short, long = "set", required = true)]
        sets: Vec<PendingSet>,

        #[command(flatten)]
        user: UserArgs,
    },

    /// List logged sets, newest first
    List {
        /// Number of records to show
        #[arg(short, long, default_value = "10")]
        limit: usize,

        #[command(flatten)]
        user: UserArgs,
    },

    /// Show training history grouped by day
    History {
        /// Number of days to show
        #[arg(short, long, default_value_t = DEFAULT_HISTORY_DAYS)]
        days: usize,

        #[command(flatten)]
        user: UserArgs,
    },

    /// Show training statistics
    Stats {
        #[command(flatten)]
        user: UserArgs,
    },
}

impl ApiArgs {
    fn into_config(self, utc_offset: FixedOffset) -> ApiConfig {
        ApiConfig { bind_address: self.bind, static_dir: self.static_dir, utc_offset }
    }
}

impl BotArgs {
    fn into_config(self, utc_offset: FixedOffset) -> Result<BotConfig> {
        Ok(BotConfig::new(&self.token, &self.webapp_url, utc_offset)?)
    }
}

fn find_exercise(db: &Database, key: &str) -> Result<Exercise> {
    if let Ok(id) = key.parse::<i64>() {
        return Ok(db.get_exercise(id)?);
    }
    db.find_exercise_by_name(key.trim())?
        .with_context(|| format!("Unknown exercise '{}'. See `fitlog exercises`", key))
}

fn find_user(db: &Database, user: &UserArgs) -> Result<User> {
    db.get_user_by_telegram_id(user.telegram_id)
        .with_context(|| format!("No user with telegram id {}. Start the bot or log a set first", user.telegram_id))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let offset = cli.utc_offset;
    let db = Database::open(&cli.db)?;

    match cli.command {
        Commands::Serve { api } => {
            fitlog::api::serve(db.into_shared(), api.into_config(offset)).await?;
        }

        Commands::Bot { bot } => {
            let config = bot.into_config(offset)?;
            println!("Starting Telegram bot...");
            println!("База данных: {}", cli.db);
            fitlog::bot::run_bot(config, db.into_shared()).await?;
        }

        Commands::Run { api, bot } => {
            let bot_config = bot.into_config(offset)?;
            let shared = db.into_shared();
            tokio::try_join!(
                fitlog::api::serve(shared.clone(), api.into_config(offset)),
                fitlog::bot::run_bot(bot_config, shared),
            )?;
        }

        Commands::Exercises => {
            println!("{:>4} | {:30} | {:10} | custom", "id", "name", "category");
            println!("{:-<60}", "");
            for e in db.list_exercises()? {
                println!(
                    "{:>4} | {:30} | {:10} | {}",
                    e.id,
                    e.name,
                    e.category,
                    if e.is_custom { "yes" } else { "-" }
                );
            }
        }

        Commands::AddExercise { name, category, photo } => {
            let exercise = db.create_exercise(&NewExercise { name, category, photo_path: photo })?;
            println!("Added: {} [{}] (id: {})", exercise.name, exercise.category, exercise.id);
        }

        Commands::Log { exercise, sets, user } => {
            let exercise = find_exercise(&db, &exercise)?;
            let user = db.get_or_create_user(&NewUser {
                telegram_id: user.telegram_id,
                username: None,
                first_name: None,
            })?;

            let mut session = WorkoutSession::new(user.id, exercise.id);
            for PendingSet { weight, reps } in sets {
                session.add_set(weight, reps)?;
            }

            match session.finish(&db) {
                Ok(stored) => {
                    for s in &stored {
                        println!("Logged: {} #{} - {} x {} (id: {})", exercise.name, s.set_number, weight_label(s.weight), s.reps, s.id);
                    }
                }
                Err(e) => {
                    for s in &e.committed {
                        println!("Kept: {} #{} - {} x {}", exercise.name, s.set_number, weight_label(s.weight), s.reps);
                    }
                    return Err(e.into());
                }
            }
        }

        Commands::List { limit, user } => {
            let user = find_user(&db, &user)?;
            let rows = db.get_user_logs(user.id, Some(limit))?;
            println!("Recent sets:");
            println!("{:-<60}", "");
            for r in rows {
                println!(
                    "{} | {:25} | #{} | {} x {}",
                    r.date.with_timezone(&offset).format("%Y-%m-%d %H:%M"),
                    r.exercise_name,
                    r.set_number,
                    weight_label(r.weight),
                    r.reps
                );
            }
        }

        Commands::History { days, user } => {
            let user = find_user(&db, &user)?;
            let rows = db.get_user_logs(user.id, None)?;
            for day in take_days(group_by_day(&rows, offset), Some(days)) {
                println!("{} - {} sets, {} reps", day.date, day.total_sets, day.total_reps);
                for e in &day.exercises {
                    println!("  {:25} max {:12} avg {:>6} | {}", e.name, e.max_weight, e.avg_weight, e.sets_detail);
                }
            }
        }

        Commands::Stats { user } => {
            let user = find_user(&db, &user)?;
            let stats = compute_stats(&db.get_user_logs(user.id, None)?, offset);

            println!("Training Statistics");
            println!("{:-<40}", "");
            println!("Workouts: {}", stats.total_workouts);
            println!("Exercises: {}", stats.unique_exercises);
            println!("Sets: {}, reps: {}", stats.total_sets, stats.total_reps);
            println!();
            for e in &stats.exercises {
                println!(
                    "{:25} {:>3} sets {:>4} reps | max {} | max reps {} | avg {}",
                    e.name,
                    e.total_sets,
                    e.total_reps,
                    e.max_weight_label,
                    e.max_reps,
                    format_number(e.avg_weight)
                );
            }
        }
    }

    Ok(())
}
