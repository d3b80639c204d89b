use std::collections::BTreeMap;

use serde_json::Value;

use crate::{Exception, LogLevel};

/// Named properties attached to a [`LogEvent`].
pub type Properties = BTreeMap<String, Value>;

/// One structured record emitted by the logging pipeline.
#[derive(Clone, Debug, PartialEq)]
pub struct LogEvent {
    /// Severity of the event.
    pub level: LogLevel,
    /// Message template, rendered by a [`MessageFormatter`](crate::MessageFormatter).
    pub message_template: String,
    /// Error attached to the event.
    pub exception: Option<Exception>,
    /// Named properties. An empty map means the event carries none.
    pub properties: Properties,
}

impl LogEvent {
    /// Creates an event without exception and properties.
    pub fn new<M: Into<String>>(level: LogLevel, message_template: M) -> Self {
        LogEvent {
            level,
            message_template: message_template.into(),
            exception: None,
            properties: Properties::new(),
        }
    }

    /// Attaches an exception.
    #[must_use]
    pub fn with_exception(mut self, exception: Exception) -> Self {
        self.exception = Some(exception);
        self
    }

    /// Adds a property, replacing any previous value under the same name.
    #[must_use]
    pub fn with_property<K, V>(mut self, name: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.properties.insert(name.into(), value.into());
        self
    }
}

/// Renders a property value the way it is sent to Rollbar.
///
/// Strings are used as is, without the surrounding quotes a JSON rendering
/// would add. Everything else is rendered as JSON.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
