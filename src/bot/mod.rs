//! Telegram bot module - entry point to the web app plus read-only history and stats
//!
//! Sets are written from the web app; the bot registers users, hands out
//! web-app buttons and renders the same summaries the API serves.

pub mod text;

use teloxide::{
    prelude::*,
    types::{InlineKeyboardButton, InlineKeyboardMarkup, WebAppInfo},
    utils::command::BotCommands,
};
use tracing::{error, info};

use crate::analytics::{compute_stats, group_by_day, take_days};
use crate::config::{BOT_HISTORY_DAYS, BOT_TOP_EXERCISES, BotConfig};
use crate::db::SharedDb;
use crate::error::TrackerError;
use crate::models::{Exercise, NewUser};
use crate::navigation::{Screen, WebAppLinks};

type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Команды бота:")]
pub enum Command {
    #[command(description = "Начать работу")]
    Start,
    #[command(description = "Показать помощь")]
    Help,
    #[command(description = "Открыть трекер")]
    App,
    #[command(description = "Каталог упражнений")]
    Exercises,
    #[command(description = "История тренировок")]
    History,
    #[command(description = "Статистика")]
    Stats,
}

/// Inline menu buttons that answer with a callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuAction {
    History,
    Stats,
    Help,
    Menu,
}

impl MenuAction {
    fn data(&self) -> &'static str {
        match self {
            MenuAction::History => "history",
            MenuAction::Stats => "stats",
            MenuAction::Help => "help",
            MenuAction::Menu => "menu",
        }
    }

    fn parse(data: &str) -> Option<Self> {
        match data {
            "history" => Some(MenuAction::History),
            "stats" => Some(MenuAction::Stats),
            "help" => Some(MenuAction::Help),
            "menu" => Some(MenuAction::Menu),
            _ => None,
        }
    }
}

fn web_app_button(label: &str, links: &WebAppLinks, screen: Screen) -> InlineKeyboardButton {
    InlineKeyboardButton::web_app(label, WebAppInfo { url: links.url(screen) })
}

fn callback_button(label: &str, action: MenuAction) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(label, action.data())
}

fn main_menu_keyboard(links: &WebAppLinks) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![web_app_button("🚀 Открыть Фитнес-Трекер", links, Screen::Main)],
        vec![callback_button("📊 История тренировок", MenuAction::History)],
        vec![callback_button("📈 Моя статистика", MenuAction::Stats)],
        vec![callback_button("ℹ️ Помощь", MenuAction::Help)],
    ])
}

fn back_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![callback_button("🔙 Назад", MenuAction::Menu)]])
}

/// One workout deep link per exercise, two per row
fn exercises_keyboard(exercises: &[Exercise], links: &WebAppLinks) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = exercises
        .chunks(2)
        .map(|chunk| {
            chunk
                .iter()
                .map(|ex| {
                    let label = format!("{} {}", ex.category.emoji(), ex.name);
                    web_app_button(&label, links, Screen::Workout { exercise_id: ex.id })
                })
                .collect()
        })
        .collect();
    rows.push(vec![web_app_button("➕ Добавить упражнение", links, Screen::AddExercise)]);
    InlineKeyboardMarkup::new(rows)
}

/// Start the Telegram bot on an already opened store
pub async fn run_bot(config: BotConfig, db: SharedDb) -> anyhow::Result<()> {
    let bot = Bot::new(config.token.clone());
    info!("Web app URL: {}", config.links.base());

    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        error!("Failed to register bot commands: {}", e);
    }

    let handler = dptree::entry()
        .branch(
            Update::filter_message()
                .filter_command::<Command>()
                .endpoint(handle_command),
        )
        .branch(
            Update::filter_message()
                .endpoint(handle_message),
        )
        .branch(
            Update::filter_callback_query()
                .endpoint(handle_callback),
        );

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![db, config])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

/// Grouped history of the last few days, or a hint for unregistered users
async fn history_text(db: &SharedDb, telegram_id: i64, config: &BotConfig) -> Result<String, TrackerError> {
    let rows = {
        let db = db.lock().await;
        let user = match db.get_user_by_telegram_id(telegram_id) {
            Ok(user) => user,
            Err(TrackerError::NotFound(_)) => return Ok(text::NEED_START_TEXT.to_string()),
            Err(e) => return Err(e),
        };
        db.get_user_logs(user.id, None)?
    };
    let days = take_days(group_by_day(&rows, config.utc_offset), Some(BOT_HISTORY_DAYS));
    Ok(text::format_history(&days))
}

async fn stats_text(db: &SharedDb, telegram_id: i64, config: &BotConfig) -> Result<String, TrackerError> {
    let rows = {
        let db = db.lock().await;
        let user = match db.get_user_by_telegram_id(telegram_id) {
            Ok(user) => user,
            Err(TrackerError::NotFound(_)) => return Ok(text::NEED_START_TEXT.to_string()),
            Err(e) => return Err(e),
        };
        db.get_user_logs(user.id, None)?
    };
    let stats = compute_stats(&rows, config.utc_offset);
    Ok(text::format_stats(&stats, BOT_TOP_EXERCISES))
}

async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    db: SharedDb,
    config: BotConfig,
) -> HandlerResult {
    let Some(from) = msg.from.clone() else {
        return Ok(());
    };
    let telegram_id = from.id.0 as i64;

    match cmd {
        Command::Start => {
            let user = {
                let db = db.lock().await;
                db.get_or_create_user(&NewUser {
                    telegram_id,
                    username: from.username.clone(),
                    first_name: Some(from.first_name.clone()),
                })?
            };
            info!("User {} (telegram {}) started the bot", user.id, telegram_id);

            bot.send_message(msg.chat.id, text::welcome(&from.first_name))
                .reply_markup(main_menu_keyboard(&config.links))
                .await?;
        }

        Command::Help => {
            let text = format!("{}\n\n{}", text::HELP_TEXT, Command::descriptions());
            bot.send_message(msg.chat.id, text).await?;
        }

        Command::App => {
            bot.send_message(msg.chat.id, text::MENU_TEXT)
                .reply_markup(main_menu_keyboard(&config.links))
                .await?;
        }

        Command::Exercises => {
            let exercises = db.lock().await.list_exercises()?;
            bot.send_message(msg.chat.id, text::format_exercises(&exercises))
                .reply_markup(exercises_keyboard(&exercises, &config.links))
                .await?;
        }

        Command::History => {
            let text = history_text(&db, telegram_id, &config).await?;
            bot.send_message(msg.chat.id, text).await?;
        }

        Command::Stats => {
            let text = stats_text(&db, telegram_id, &config).await?;
            bot.send_message(msg.chat.id, text).await?;
        }
    }

    Ok(())
}

async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    db: SharedDb,
    config: BotConfig,
) -> HandlerResult {
    bot.answer_callback_query(q.id.clone()).await?;

    let (Some(action), Some(msg)) = (q.data.as_deref().and_then(MenuAction::parse), q.message.as_ref()) else {
        return Ok(());
    };
    let telegram_id = q.from.id.0 as i64;

    let (text, keyboard) = match action {
        MenuAction::History => (history_text(&db, telegram_id, &config).await?, back_keyboard()),
        MenuAction::Stats => (stats_text(&db, telegram_id, &config).await?, back_keyboard()),
        MenuAction::Help => (text::HELP_TEXT.to_string(), back_keyboard()),
        MenuAction::Menu => (text::MENU_TEXT.to_string(), main_menu_keyboard(&config.links)),
    };

    bot.edit_message_text(msg.chat().id, msg.id(), text)
        .reply_markup(keyboard)
        .await?;
    Ok(())
}

async fn handle_message(bot: Bot, msg: Message, config: BotConfig) -> HandlerResult {
    bot.send_message(msg.chat.id, text::UNKNOWN_TEXT)
        .reply_markup(main_menu_keyboard(&config.links))
        .await?;
    Ok(())
}
