use std::fmt;
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::{format::Writer, FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

/// Wraps each field in brackets.
///
/// Console: `[TIME] [LEVEL] [SPAN]: MESSAGE`
/// File:    `[DATE TIME] [LEVEL] [SPAN] [TARGET: FILE:LINE]: MESSAGE`
#[derive(Debug, Clone, Copy)]
pub struct BracketedFormatter {
    /// Include the full date and the source location
    pub detailed: bool,
}

impl BracketedFormatter {
    pub fn console() -> Self {
        Self { detailed: false }
    }

    pub fn file() -> Self {
        Self { detailed: true }
    }

    fn timestamp_format(&self) -> &'static str {
        if self.detailed {
            "%Y-%m-%dT%H:%M:%S%.6f"
        } else {
            "%H:%M:%S%.3f"
        }
    }
}

impl<S, N> FormatEvent<S, N> for BracketedFormatter
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
        let metadata = event.metadata();

        let now = chrono::Local::now();
        write!(writer, "[{}] [{:5}] ", now.format(self.timestamp_format()), metadata.level())?;

        // Innermost span, else the last segment of the target module path
        let scope_name = ctx
            .event_scope()
            .and_then(|scope| scope.from_root().last().map(|span| span.name()))
            .unwrap_or_else(|| metadata.target().rsplit("::").next().unwrap_or("unknown"));
        write!(writer, "[{}]", scope_name)?;

        if self.detailed {
            match (metadata.file(), metadata.line()) {
                (Some(file), Some(line)) => {
                    write!(writer, " [{}: {}:{}]", metadata.target(), file, line)?
                }
                _ => write!(writer, " [{}]", metadata.target())?,
            }
        }
        write!(writer, ": ")?;

        ctx.field_format().format_fields(writer.by_ref(), event)?;

        writeln!(writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_format_by_mode() {
        assert_eq!(BracketedFormatter::console().timestamp_format(), "%H:%M:%S%.3f");
        assert!(BracketedFormatter::file().timestamp_format().starts_with("%Y-%m-%d"));
    }
}
