use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::event::render_value;
use crate::utils::server_name;
use crate::{
    convert_log_level, Body, Client, ClientConfig, ClientFactory, Custom, DeliveryMode, Error,
    ErrorLevel, LogEvent, MessageFormatter, Server, SinkOptions, TemplateFormatter,
};

/// Property under which the rendered message travels next to an exception.
pub const MESSAGE_KEY: &str = "message";

/// Resolved delivery mode of a [`RollbarSink`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Delivery {
    /// Blocking sends with the given timeout.
    Blocking(Duration),
    /// Fire-and-forget sends.
    Async,
}

/// Converts log events into Rollbar items and hands them to a [`Client`].
///
/// The sink holds no mutable state: every call to [`emit`](Self::emit)
/// builds its own properties, so a sink can be shared freely between threads.
pub struct RollbarSink {
    client: Arc<dyn Client>,
    formatter: Arc<dyn MessageFormatter>,
    delivery: Delivery,
    debug: bool,
}

impl RollbarSink {
    /// Creates a sink and the client it sends through.
    ///
    /// Fails with [`Error::MissingAccessToken`] if the access token is blank,
    /// in which case the factory is not invoked.
    pub fn new<F: ClientFactory>(options: SinkOptions, factory: F) -> Result<RollbarSink, Error> {
        if options.access_token.trim().is_empty() {
            return Err(Error::MissingAccessToken);
        }

        let delivery = match options.delivery {
            DeliveryMode::Blocking => Delivery::Blocking(options.resolved_timeout()),
            DeliveryMode::Async => Delivery::Async,
        };

        let config = client_config(&options);
        rollbar_debug!(
            options.debug,
            "creating client for environment {:?} on host {:?}",
            config.environment,
            config.server.host
        );
        let client = factory.create_client(&config);

        Ok(RollbarSink {
            client,
            formatter: match options.formatter {
                Some(formatter) => formatter,
                None => Arc::new(TemplateFormatter),
            },
            delivery,
            debug: options.debug,
        })
    }

    /// The resolved delivery mode.
    pub fn delivery(&self) -> Delivery {
        self.delivery
    }

    /// Forwards one event to the client.
    ///
    /// Events without exception and with an empty rendered message are not
    /// sent. Errors raised by the client are returned as is.
    pub fn emit(&self, event: &LogEvent) -> Result<(), Error> {
        let level = convert_log_level(event.level);
        let message = self.formatter.format(event);
        let mut custom = custom_from_properties(event);

        let body = match event.exception {
            None => {
                if message.is_empty() {
                    rollbar_debug!(self.debug, "dropping {} event with empty message", level);
                    return Ok(());
                }
                Body::Message(message)
            }
            Some(ref exception) => {
                if !message.is_empty() {
                    insert_message(custom.get_or_insert_with(Custom::new), message);
                }
                Body::Exception(exception.clone())
            }
        };

        self.send(level, body, custom)
    }

    fn send(&self, level: ErrorLevel, body: Body, custom: Option<Custom>) -> Result<(), Error> {
        let result = match self.delivery {
            Delivery::Blocking(timeout) => self.client.log_blocking(level, body, custom, timeout),
            Delivery::Async => self.client.log(level, body, custom),
        };
        if let Err(ref err) = result {
            rollbar_debug!(self.debug, "client failed to record {} item: {}", level, err);
        }
        result
    }
}

impl fmt::Debug for RollbarSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RollbarSink")
            .field("delivery", &self.delivery)
            .field("debug", &self.debug)
            .finish()
    }
}

fn client_config(options: &SinkOptions) -> ClientConfig {
    let server = Server {
        host: options
            .host
            .as_ref()
            .map(|host| host.to_string())
            .or_else(server_name),
        code_version: options.code_version.as_ref().map(|v| v.to_string()),
    };

    ClientConfig {
        access_token: options.access_token.to_string(),
        environment: options
            .environment
            .clone()
            .filter(|env| !env.trim().is_empty()),
        proxy_address: options.proxy_address.clone(),
        scrub_fields: Some(options.scrub_fields.clone()).filter(|fields| !fields.is_empty()),
        transform: options.transform.clone(),
        server,
    }
}

fn custom_from_properties(event: &LogEvent) -> Option<Custom> {
    if event.properties.is_empty() {
        return None;
    }
    Some(
        event
            .properties
            .iter()
            .map(|(key, value)| (key.clone(), render_value(value)))
            .collect(),
    )
}

fn insert_message(custom: &mut Custom, message: String) {
    let key = if custom.contains_key(MESSAGE_KEY) {
        Uuid::new_v4().to_string()
    } else {
        MESSAGE_KEY.to_owned()
    };
    custom.insert(key, message);
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use rstest::rstest;
    use serde_json::json;

    use super::*;
    use crate::test::TestClient;
    use crate::{Exception, LogLevel, DEFAULT_TIMEOUT};

    fn sink(options: SinkOptions) -> (RollbarSink, Arc<TestClient>) {
        let client = TestClient::new();
        let sink = RollbarSink::new(options, client.clone()).unwrap();
        (sink, client)
    }

    fn crash() -> Exception {
        Exception::new("NullReferenceException", "Object reference not set")
    }

    #[rstest]
    #[case(LogLevel::Trace, ErrorLevel::Debug)]
    #[case(LogLevel::Debug, ErrorLevel::Debug)]
    #[case(LogLevel::Info, ErrorLevel::Info)]
    #[case(LogLevel::Warning, ErrorLevel::Warning)]
    #[case(LogLevel::Error, ErrorLevel::Error)]
    #[case(LogLevel::Fatal, ErrorLevel::Critical)]
    fn emit_selects_remote_level(#[case] level: LogLevel, #[case] expected: ErrorLevel) {
        let (sink, client) = sink(SinkOptions::new("abc123"));
        sink.emit(&LogEvent::new(level, "hello")).unwrap();

        let calls = client.fetch_and_clear_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].level, expected);
    }

    #[test]
    fn message_without_exception() {
        let (sink, client) = sink(SinkOptions::new("abc123"));
        sink.emit(&LogEvent::new(LogLevel::Error, "it broke")).unwrap();

        let calls = client.fetch_and_clear_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].body, Body::Message("it broke".into()));
        assert_eq!(calls[0].custom, None);
    }

    #[test]
    fn empty_message_without_exception_is_suppressed() {
        let (sink, client) = sink(SinkOptions::new("abc123"));
        sink.emit(&LogEvent::new(LogLevel::Error, "")).unwrap();
        sink.emit(&LogEvent::new(LogLevel::Error, "").with_property("k", 1))
            .unwrap();

        let formatter = |_: &LogEvent| String::new();
        let (blank_sink, blank_client) = self::sink(SinkOptions::new("abc123").formatter(formatter));
        blank_sink
            .emit(&LogEvent::new(LogLevel::Fatal, "not rendered"))
            .unwrap();

        assert!(client.fetch_and_clear_calls().is_empty());
        assert!(blank_client.fetch_and_clear_calls().is_empty());
    }

    #[test]
    fn exception_is_sent_even_with_empty_message() {
        let (sink, client) = sink(SinkOptions::new("abc123"));
        sink.emit(&LogEvent::new(LogLevel::Error, "").with_exception(crash()))
            .unwrap();

        let calls = client.fetch_and_clear_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].body, Body::Exception(crash()));
        assert_eq!(calls[0].custom, None);
    }

    #[test]
    fn exception_message_goes_into_properties() {
        let (sink, client) = sink(SinkOptions::new("abc123"));
        let event = LogEvent::new(LogLevel::Error, "failed for {user}")
            .with_property("user", "alice")
            .with_exception(crash());
        sink.emit(&event).unwrap();

        let calls = client.fetch_and_clear_calls();
        let custom = calls[0].custom.as_ref().unwrap();
        assert_eq!(custom.len(), 2);
        assert_eq!(custom["message"], "failed for alice");
        assert_eq!(custom["user"], "alice");
    }

    #[test]
    fn colliding_message_property_is_kept() {
        let (sink, client) = sink(SinkOptions::new("abc123"));
        let event = LogEvent::new(LogLevel::Error, "rendered")
            .with_property("message", "user supplied")
            .with_exception(crash());
        sink.emit(&event).unwrap();

        let calls = client.fetch_and_clear_calls();
        let custom = calls[0].custom.as_ref().unwrap();
        assert_eq!(custom.len(), 2);
        assert_eq!(custom["message"], "user supplied");
        let (key, value) = custom
            .iter()
            .find(|(key, _)| key.as_str() != "message")
            .unwrap();
        assert!(Uuid::parse_str(key).is_ok());
        assert_eq!(value, "rendered");
    }

    #[test]
    fn no_properties_means_no_mapping() {
        let (sink, client) = sink(SinkOptions::new("abc123"));
        sink.emit(&LogEvent::new(LogLevel::Info, "plain")).unwrap();
        sink.emit(&LogEvent::new(LogLevel::Info, "with").with_property("k", json!(null)))
            .unwrap();

        let calls = client.fetch_and_clear_calls();
        assert_eq!(calls[0].custom, None);
        let custom = calls[1].custom.as_ref().unwrap();
        assert_eq!(custom["k"], "null");
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("\t\n")]
    fn blank_token_fails_before_client_is_created(#[case] token: &'static str) {
        let created = Arc::new(AtomicUsize::new(0));
        let counter = created.clone();
        let factory = move |_: &ClientConfig| -> Arc<dyn Client> {
            counter.fetch_add(1, Ordering::SeqCst);
            TestClient::new()
        };

        let result = RollbarSink::new(SinkOptions::new(token), factory);
        assert!(matches!(result, Err(Error::MissingAccessToken)));
        assert_eq!(created.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn default_timeout_is_normalized() {
        let (sink, client) = sink(SinkOptions::new("abc123"));
        assert_eq!(sink.delivery(), Delivery::Blocking(DEFAULT_TIMEOUT));
        assert_eq!(DEFAULT_TIMEOUT, Duration::from_secs(30));

        sink.emit(&LogEvent::new(LogLevel::Info, "hi")).unwrap();
        assert_eq!(client.fetch_and_clear_calls()[0].timeout, Some(DEFAULT_TIMEOUT));
    }

    #[test]
    fn zero_timeout_is_normalized() {
        let (sink, client) = sink(SinkOptions::new("abc123").blocking_delivery(Duration::default()));
        assert_eq!(sink.delivery(), Delivery::Blocking(DEFAULT_TIMEOUT));

        sink.emit(&LogEvent::new(LogLevel::Info, "hi")).unwrap();
        assert_eq!(client.fetch_and_clear_calls()[0].timeout, Some(DEFAULT_TIMEOUT));
    }

    #[test]
    fn async_delivery_does_not_block() {
        let (sink, client) = sink(SinkOptions {
            timeout: Some(Duration::from_secs(1)),
            ..SinkOptions::new("abc123").async_delivery()
        });
        assert_eq!(sink.delivery(), Delivery::Async);

        sink.emit(&LogEvent::new(LogLevel::Info, "hi")).unwrap();
        let calls = client.fetch_and_clear_calls();
        assert!(!calls[0].is_blocking());
    }

    #[test]
    fn client_errors_propagate() {
        let client = TestClient::failing("service unavailable");
        let sink = RollbarSink::new(SinkOptions::new("abc123"), client).unwrap();

        let err = sink
            .emit(&LogEvent::new(LogLevel::Error, "boom"))
            .unwrap_err();
        assert!(err.is_delivery());
        assert_eq!(
            std::error::Error::source(&err).unwrap().to_string(),
            "service unavailable"
        );
    }

    #[test]
    fn client_config_reflects_options() {
        let seen = Arc::new(Mutex::new(None));
        let slot = seen.clone();
        let factory = move |config: &ClientConfig| -> Arc<dyn Client> {
            *slot.lock().unwrap() = Some(config.clone());
            TestClient::new()
        };

        let options = SinkOptions {
            environment: Some(" ".into()),
            host: Some("web-1".into()),
            code_version: Some("1.2.3".into()),
            ..SinkOptions::new("abc123").proxy_address("http://proxy:3128")
        };
        RollbarSink::new(options, factory).unwrap();

        let config = seen.lock().unwrap().take().unwrap();
        assert_eq!(config.access_token, "abc123");
        assert_eq!(config.environment, None);
        assert_eq!(config.scrub_fields, None);
        assert_eq!(config.proxy_address.as_deref(), Some("http://proxy:3128"));
        assert_eq!(
            config.server,
            Server {
                host: Some("web-1".into()),
                code_version: Some("1.2.3".into()),
            }
        );
    }

    #[test]
    fn client_config_defaults() {
        let seen = Arc::new(Mutex::new(None));
        let slot = seen.clone();
        let factory = move |config: &ClientConfig| -> Arc<dyn Client> {
            *slot.lock().unwrap() = Some(config.clone());
            TestClient::new()
        };
        RollbarSink::new(SinkOptions::new("abc123").scrub_field("password"), factory).unwrap();

        let config = seen.lock().unwrap().take().unwrap();
        assert_eq!(config.environment.as_deref(), Some("production"));
        assert_eq!(config.scrub_fields, Some(vec![Cow::Borrowed("password")]));
        assert_eq!(config.server.host, server_name());
    }

    #[test]
    fn warning_scenario() {
        let (sink, client) = sink(SinkOptions::new("abc123"));
        let event = LogEvent::new(LogLevel::Warning, "disk at {pct}%").with_property("pct", 91);
        sink.emit(&event).unwrap();

        let calls = client.fetch_and_clear_calls();
        assert_eq!(calls.len(), 1);
        let call = &calls[0];
        assert_eq!(call.level, ErrorLevel::Warning);
        assert_eq!(call.body, Body::Message("disk at 91%".into()));
        assert_eq!(call.timeout, Some(Duration::from_secs(30)));
        let mut expected = Custom::new();
        expected.insert("pct".into(), "91".into());
        assert_eq!(call.custom, Some(expected));
    }

    #[test]
    fn fatal_scenario() {
        let (sink, client) = sink(SinkOptions::new("abc123"));
        sink.emit(&LogEvent::new(LogLevel::Fatal, "crash").with_exception(crash()))
            .unwrap();

        let calls = client.fetch_and_clear_calls();
        assert_eq!(calls.len(), 1);
        let call = &calls[0];
        assert_eq!(call.level, ErrorLevel::Critical);
        assert_eq!(call.body, Body::Exception(crash()));
        let mut expected = Custom::new();
        expected.insert("message".into(), "crash".into());
        assert_eq!(call.custom, Some(expected));
    }
}
