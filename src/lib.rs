//! A Revolt bot that keeps a list of meme URLs and posts each one to a
//! channel at most once.

pub mod common;
pub mod config;
pub mod error;
pub mod plugins;
pub mod store;
pub mod transport;

pub use config::BotConfig;
pub use plugins::{Bot, Services};
