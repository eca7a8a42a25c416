use console::style;
use tracing::Level;

use super::levels::MessageLevel;

/// INFO is left unlabelled; every other level gets a fixed-width tag.
pub fn format_level(level: &Level, use_color: bool) -> String {
    let label = match *level {
        Level::ERROR => "ERROR",
        Level::WARN => "WARN ",
        Level::INFO => return String::new(),
        Level::DEBUG => "DEBUG",
        Level::TRACE => "TRACE",
    };

    if !use_color {
        return label.to_string();
    }

    match *level {
        Level::ERROR => style(label).red().bold().to_string(),
        Level::WARN => style(label).yellow().to_string(),
        Level::DEBUG => style(label).blue().to_string(),
        _ => style(label).magenta().to_string(),
    }
}

pub fn prefix(level: MessageLevel) -> &'static str {
    match level {
        MessageLevel::Root => "▶",
        MessageLevel::Stage => "●",
        MessageLevel::Step | MessageLevel::Detail => " ",
    }
}

pub fn style_message(message: &str, level: MessageLevel, use_color: bool) -> String {
    if !use_color {
        return message.to_string();
    }

    match level {
        MessageLevel::Root => style(message).bold().cyan().to_string(),
        MessageLevel::Stage => style(message).bold().green().to_string(),
        MessageLevel::Step => message.to_string(),
        MessageLevel::Detail => style(message).dim().to_string(),
    }
}
