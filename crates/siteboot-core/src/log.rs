use crate::message::Message;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};

///
/// Level
///

#[derive(
    Clone, Copy, Debug, Default, Deserialize, Display, Eq, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Debug, // least severe
    #[default]
    Info,
    Ok,
    Warn,
    Error, // most severe
}

///
/// Topic
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
#[remain::sorted]
pub enum Topic {
    Config,
    Configuration,
    Database,
    Full,
    Root,
    Sequencer,
    Site,
}

///
/// Logger
///
/// Receives every message the sequencer and its phases emit.
///

pub trait Logger {
    fn emit(&self, level: Level, topic: Topic, message: &Message);
}

/// Emit a templated message through an explicit logger.
///
/// `log!(logger, Topic::Root, Info, "Initialized root at !root", "!root" => path)`
#[macro_export]
macro_rules! log {
    ($logger:expr, $topic:expr, $level:ident, $template:expr $(, $key:expr => $val:expr)* $(,)?) => {{
        let message = $crate::message::Message::new($template) $(.with($key, $val))*;
        $crate::log::Logger::emit(&*$logger, $crate::log::Level::$level, $topic, &message);
    }};
}

///
/// ConsoleLogger
///
/// Writes `LEVEL|  topic  | message` lines to stderr.
///

#[derive(Clone, Copy, Debug)]
pub struct ConsoleLogger {
    min_level: Level,
    color: bool,
}

impl ConsoleLogger {
    #[must_use]
    pub const fn new(min_level: Level) -> Self {
        Self {
            min_level,
            color: true,
        }
    }

    #[must_use]
    pub const fn without_color(mut self) -> Self {
        self.color = false;
        self
    }

    #[must_use]
    pub fn format_line(&self, level: Level, topic: Topic, message: &Message) -> String {
        let (color, reset) = match level {
            _ if !self.color => ("", ""),
            Level::Ok => ("\x1b[32m", "\x1b[0m"),
            Level::Info => ("\x1b[34m", "\x1b[0m"),
            Level::Warn => ("\x1b[33m", "\x1b[0m"),
            Level::Error => ("\x1b[31m", "\x1b[0m"),
            Level::Debug => ("", ""),
        };

        let label = format!("{color}{:^5}{reset}", level.to_string().to_uppercase());
        let topic = format!("{:^13}", topic.to_string().to_lowercase());

        format!("{label}|{topic}| {message}")
    }
}

impl Default for ConsoleLogger {
    fn default() -> Self {
        Self::new(Level::Info)
    }
}

impl Logger for ConsoleLogger {
    fn emit(&self, level: Level, topic: Topic, message: &Message) {
        if level < self.min_level {
            return;
        }

        let line = self.format_line(level, topic, message);
        let _ = writeln!(io::stderr().lock(), "{line}");
    }
}

///
/// TESTS
///
