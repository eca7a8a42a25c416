//! Console event format: optional timestamp, level tag, hierarchy prefix.

pub mod filters;
pub mod levels;
pub mod styling;

use chrono::Local;
use console::style;
use std::fmt::{self as std_fmt, Debug};
use tracing::Level;
use tracing_subscriber::fmt::{format::Writer, FmtContext, FormatEvent, FormatFields};

use filters::should_show_message;
use levels::classify;
use styling::{format_level, prefix, style_message};

pub struct CleanFormatter {
    show_timestamps: bool,
    use_color: bool,
}

impl CleanFormatter {
    pub fn new(show_timestamps: bool, use_color: bool) -> Self {
        Self {
            show_timestamps,
            use_color,
        }
    }

    fn format_message(&self, message: &str, level: &Level) -> String {
        let message_level = classify(message);
        let level_tag = format_level(level, self.use_color);
        let body = style_message(message, message_level, self.use_color);

        if level_tag.is_empty() {
            format!("{} {}", prefix(message_level), body)
        } else {
            format!("{} {} {}", prefix(message_level), level_tag, body)
        }
    }

    fn timestamp(&self) -> Option<String> {
        if !self.show_timestamps {
            return None;
        }

        let now = Local::now().format("%H:%M:%S").to_string();
        Some(if self.use_color {
            style(now).dim().to_string()
        } else {
            now
        })
    }
}

impl<S, N> FormatEvent<S, N> for CleanFormatter
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std_fmt::Result {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        if !should_show_message(&visitor.message) {
            return Ok(());
        }

        let line = self.format_message(&visitor.message, event.metadata().level());
        match self.timestamp() {
            Some(timestamp) => writeln!(writer, "[{}] {}", timestamp, line),
            None => writeln!(writer, "{}", line),
        }
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
}

impl tracing::field::Visit for MessageVisitor {
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        }
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value).trim_matches('"').to_string();
        }
    }
}
