//! fitlog - strength training tracker with a REST API for the web app
//! and a Telegram bot

pub mod analytics;
pub mod api;
pub mod bot;
pub mod config;
pub mod db;
pub mod error;
pub mod exercises;
pub mod models;
pub mod navigation;
pub mod session;

pub use db::{Database, SharedDb};
pub use error::{TrackerError, TrackerResult};
