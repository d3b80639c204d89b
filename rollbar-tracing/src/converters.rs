use std::error::Error;

use rollbar_core::{Exception, LogEvent, LogLevel, Properties};
use serde_json::Value;
use tracing_core::field::{Field, Visit};

use crate::FATAL_FIELD;

/// Converts a [`tracing_core::Level`] to a [`LogLevel`].
pub fn convert_tracing_level(level: &tracing_core::Level) -> LogLevel {
    match level {
        &tracing_core::Level::TRACE => LogLevel::Trace,
        &tracing_core::Level::DEBUG => LogLevel::Debug,
        &tracing_core::Level::INFO => LogLevel::Info,
        &tracing_core::Level::WARN => LogLevel::Warning,
        &tracing_core::Level::ERROR => LogLevel::Error,
    }
}

/// Creates a [`LogEvent`] from a given [`tracing_core::Event`].
///
/// The `message` field becomes the message template and the first error
/// field becomes the exception. A `rollbar.fatal = true` field raises the
/// level to [`LogLevel::Fatal`]. All other fields are kept as properties.
pub fn log_event_from_event(event: &tracing_core::Event) -> LogEvent {
    let mut recorder = FieldRecorder::default();
    event.record(&mut recorder);

    let level = if recorder.fatal {
        LogLevel::Fatal
    } else {
        convert_tracing_level(event.metadata().level())
    };

    LogEvent {
        level,
        message_template: recorder.message.unwrap_or_default(),
        exception: recorder.exception,
        properties: recorder.properties,
    }
}

/// Records all fields of a [`tracing_core::Event`].
#[derive(Default)]
struct FieldRecorder {
    message: Option<String>,
    exception: Option<Exception>,
    fatal: bool,
    properties: Properties,
}

impl FieldRecorder {
    fn record<T: Into<Value>>(&mut self, field: &Field, value: T) {
        self.properties.insert(field.name().to_owned(), value.into());
    }
}

impl Visit for FieldRecorder {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{:?}", value));
        } else {
            self.record(field, format!("{:?}", value));
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_owned());
        } else {
            self.record(field, value);
        }
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        if field.name() == FATAL_FIELD {
            self.fatal = value;
        } else {
            self.record(field, value);
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.record(field, value);
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.record(field, value);
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.record(field, value);
    }

    fn record_error(&mut self, field: &Field, value: &(dyn Error + 'static)) {
        if self.exception.is_none() {
            self.exception = Some(Exception::from_error(value));
        } else {
            self.record(field, value.to_string());
        }
    }
}
