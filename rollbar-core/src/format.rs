use crate::event::{render_value, Properties};
use crate::LogEvent;

/// Renders the message of a [`LogEvent`].
///
/// Any `Fn(&LogEvent) -> String` closure can be used as a formatter.
pub trait MessageFormatter: Send + Sync {
    /// Produces the final message. An empty string is a valid result.
    fn format(&self, event: &LogEvent) -> String;
}

impl<F> MessageFormatter for F
where
    F: Fn(&LogEvent) -> String + Send + Sync,
{
    fn format(&self, event: &LogEvent) -> String {
        self(event)
    }
}

/// The default formatter.
///
/// Replaces `{name}` placeholders with the matching property. A leading `@`
/// or `$` and anything after `:` or `,` inside the braces are ignored when
/// looking up the property. Placeholders without a matching property are
/// kept verbatim and `{{` / `}}` render as literal braces.
///
/// # Examples
///
/// ```
/// use rollbar_core::{LogEvent, LogLevel, MessageFormatter, TemplateFormatter};
///
/// let event = LogEvent::new(LogLevel::Warning, "disk at {pct}%").with_property("pct", 91);
/// assert_eq!(TemplateFormatter.format(&event), "disk at 91%");
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct TemplateFormatter;

impl MessageFormatter for TemplateFormatter {
    fn format(&self, event: &LogEvent) -> String {
        render_template(&event.message_template, &event.properties)
    }
}

/// Renders a message template against a set of properties.
pub fn render_template(template: &str, properties: &Properties) -> String {
    let mut rv = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(idx) = rest.find(|c: char| c == '{' || c == '}') {
        rv.push_str(&rest[..idx]);
        let tail = &rest[idx..];

        if tail.starts_with("{{") || tail.starts_with("}}") {
            rv.push_str(&tail[..1]);
            rest = &tail[2..];
            continue;
        }
        if tail.starts_with('}') {
            rv.push('}');
            rest = &tail[1..];
            continue;
        }

        match tail.find('}') {
            Some(end) => {
                let token = &tail[..=end];
                match properties.get(property_name(&tail[1..end])) {
                    Some(value) => rv.push_str(&render_value(value)),
                    None => rv.push_str(token),
                }
                rest = &tail[end + 1..];
            }
            None => {
                rv.push_str(tail);
                rest = "";
            }
        }
    }
    rv.push_str(rest);
    rv
}

fn property_name(token: &str) -> &str {
    let token = token.trim_start_matches(|c: char| c == '@' || c == '$');
    token
        .split(|c: char| c == ':' || c == ',')
        .next()
        .unwrap_or(token)
        .trim()
}
