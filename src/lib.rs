pub mod config;
pub mod context;
pub mod domain;
pub mod error;
pub mod exec;
pub mod files;
pub mod forge;
pub mod git;
pub mod gradle;
pub mod job;
pub mod retry;
pub mod ui;

pub use error::{BotError, Result};
