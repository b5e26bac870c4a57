//! Pure formatting of GitHub Actions workflow commands.
//!
//! Log events are rendered as `::debug::`, `::warning::` and `::error::`
//! lines so the runner can annotate them; info events stay plain text.

use std::fmt::{self, Write as _};

use console::style;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

/// Escape command data so it survives the runner's line protocol.
pub fn escape_data(data: &str) -> String {
    data.replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Format a workflow command such as `::warning::message`.
pub fn workflow_command(command: &str, message: &str) -> String {
    format!("::{}::{}", command, escape_data(message))
}

/// Render a log message for the given level.
pub fn render_event(level: &Level, message: &str) -> String {
    match *level {
        Level::ERROR => workflow_command("error", message),
        Level::WARN => workflow_command("warning", message),
        Level::INFO => style(message).green().bright().to_string(),
        _ => workflow_command("debug", message),
    }
}

/// Opening line of a collapsible log group.
pub fn start_group(name: &str) -> String {
    workflow_command("group", name)
}

/// Closing line of a collapsible log group.
pub fn end_group() -> String {
    "::endgroup::".to_string()
}

/// `tracing-subscriber` event format producing workflow commands
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkflowCommandFormat;

impl<S, N> FormatEvent<S, N> for WorkflowCommandFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let mut message = String::new();
        ctx.format_fields(Writer::new(&mut message), event)?;
        writeln!(writer, "{}", render_event(event.metadata().level(), &message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_data() {
        assert_eq!(escape_data("100%"), "100%25");
        assert_eq!(escape_data("a\r\nb"), "a%0D%0Ab");
        assert_eq!(escape_data("plain"), "plain");
    }

    #[test]
    fn test_escape_percent_first() {
        // A literal "%0A" must not be confused with an escaped newline.
        assert_eq!(escape_data("%0A\n"), "%250A%0A");
    }

    #[test]
    fn test_render_levels() {
        assert_eq!(render_event(&Level::ERROR, "boom"), "::error::boom");
        assert_eq!(render_event(&Level::WARN, "careful"), "::warning::careful");
        assert_eq!(render_event(&Level::DEBUG, "detail"), "::debug::detail");
        assert_eq!(render_event(&Level::TRACE, "noise"), "::debug::noise");
        assert!(render_event(&Level::INFO, "hello").contains("hello"));
    }

    #[test]
    fn test_multiline_error_stays_on_one_line() {
        let line = render_event(&Level::ERROR, "first\nsecond");
        assert_eq!(line, "::error::first%0Asecond");
        assert!(!line.contains('\n'));
    }

    #[test]
    fn test_group_lines() {
        assert_eq!(start_group("clean\nproject"), "::group::clean%0Aproject");
        assert_eq!(end_group(), "::endgroup::");
    }
}
