//! Console output for the CI runner.
//!
//! Separates concerns:
//! - `formatter` - Pure rendering of workflow commands
//! - This module - Subscriber setup and log groups

use std::future::Future;

use console::style;
use tracing_subscriber::EnvFilter;

pub mod formatter;

pub use formatter::{end_group, escape_data, render_event, start_group, WorkflowCommandFormat};

const SEPARATOR: &str = "------------------------------------------------";

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence. Otherwise the bot logs at `debug` when
/// `debug` is set (the runner's `RUNNER_DEBUG`) and at `info` otherwise.
/// Safe to call more than once; only the first call takes effect.
pub fn init_logging(debug: bool) {
    let level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,sweekt_bot={}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .event_format(WorkflowCommandFormat)
        .with_writer(std::io::stdout)
        .try_init()
        .ok();
}

struct GroupGuard;

impl Drop for GroupGuard {
    fn drop(&mut self) {
        println!("{}", end_group());
        println!("{}", style(SEPARATOR).yellow().bright());
    }
}

/// Wrap a future in a collapsible log group.
///
/// Returns the future's output. The group is closed on every exit path.
pub async fn group<F: Future>(name: &str, action: F) -> F::Output {
    println!("{}", style(SEPARATOR).yellow().bright());
    println!("{}", start_group(name));
    let _guard = GroupGuard;
    action.await
}
