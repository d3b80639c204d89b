use std::borrow::Cow;
use std::env;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::{MessageFormatter, Transform};

/// The environment reported when none is configured.
pub const DEFAULT_ENVIRONMENT: &str = "production";

/// How long a blocking send may take when no timeout is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Selects how items are handed to the client.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DeliveryMode {
    /// Every send blocks the logging thread until the client confirms it or
    /// the timeout elapsed.
    #[default]
    Blocking,
    /// Sends return immediately and the client delivers in the background.
    Async,
}

/// Configuration settings for a [`RollbarSink`](crate::RollbarSink).
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// let options = rollbar_core::SinkOptions {
///     environment: Some("staging".into()),
///     timeout: Some(Duration::from_secs(5)),
///     ..rollbar_core::SinkOptions::new("abc123")
/// };
/// assert_eq!(options.resolved_timeout(), Duration::from_secs(5));
/// ```
#[derive(Clone)]
pub struct SinkOptions {
    /// The project access token. Must not be blank.
    pub access_token: Cow<'static, str>,
    /// The environment sent with items. (defaults to `"production"`)
    pub environment: Option<Cow<'static, str>>,
    /// Renders event messages. (defaults to [`TemplateFormatter`](crate::TemplateFormatter))
    pub formatter: Option<Arc<dyn MessageFormatter>>,
    /// Callback the client applies to each payload before sending.
    pub transform: Option<Transform>,
    /// An optional outbound proxy.
    pub proxy_address: Option<Cow<'static, str>>,
    /// Property names the client redacts before sending.
    pub scrub_fields: Vec<Cow<'static, str>>,
    /// Blocking or asynchronous delivery. (defaults to blocking)
    pub delivery: DeliveryMode,
    /// Upper bound for blocking sends. Ignored for asynchronous delivery.
    /// (defaults to 30 seconds)
    pub timeout: Option<Duration>,
    /// Version of the running code, see [`code_version!`](crate::code_version).
    pub code_version: Option<Cow<'static, str>>,
    /// Overrides the host name reported in the server context.
    pub host: Option<Cow<'static, str>>,
    /// Enables debug mode.
    ///
    /// In debug mode diagnostics are printed to stderr.
    pub debug: bool,
}

impl SinkOptions {
    /// Creates options with the given access token and defaults otherwise.
    pub fn new<T: Into<Cow<'static, str>>>(access_token: T) -> Self {
        SinkOptions {
            access_token: access_token.into(),
            ..Default::default()
        }
    }

    /// Creates options from the process environment.
    ///
    /// Reads `ROLLBAR_ACCESS_TOKEN`, `ROLLBAR_ENVIRONMENT`,
    /// `ROLLBAR_CODE_VERSION` and `HTTPS_PROXY` / `https_proxy`.
    pub fn from_env() -> Self {
        Self::default().apply_env()
    }

    /// Fills unset values from the process environment.
    #[must_use]
    pub fn apply_env(mut self) -> Self {
        if self.access_token.trim().is_empty() {
            if let Ok(token) = env::var("ROLLBAR_ACCESS_TOKEN") {
                self.access_token = Cow::Owned(token);
            }
        }
        if let Ok(environment) = env::var("ROLLBAR_ENVIRONMENT") {
            if self.environment.as_deref() == Some(DEFAULT_ENVIRONMENT) || self.environment.is_none()
            {
                self.environment = Some(Cow::Owned(environment));
            }
        }
        if self.code_version.is_none() {
            self.code_version = env::var("ROLLBAR_CODE_VERSION").ok().map(Cow::Owned);
        }
        if self.proxy_address.is_none() {
            self.proxy_address = env::var("HTTPS_PROXY")
                .ok()
                .map(Cow::Owned)
                .or_else(|| env::var("https_proxy").ok().map(Cow::Owned));
        }
        self
    }

    /// Sets the environment.
    #[must_use]
    pub fn environment<E: Into<Cow<'static, str>>>(mut self, environment: E) -> Self {
        self.environment = Some(environment.into());
        self
    }

    /// Sets the message formatter.
    #[must_use]
    pub fn formatter<F: MessageFormatter + 'static>(mut self, formatter: F) -> Self {
        self.formatter = Some(Arc::new(formatter));
        self
    }

    /// Sets the payload transform callback.
    #[must_use]
    pub fn transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(&mut crate::Payload) + Send + Sync + 'static,
    {
        self.transform = Some(Arc::new(transform));
        self
    }

    /// Sets the outbound proxy.
    #[must_use]
    pub fn proxy_address<P: Into<Cow<'static, str>>>(mut self, proxy_address: P) -> Self {
        self.proxy_address = Some(proxy_address.into());
        self
    }

    /// Adds a property name the client should redact.
    #[must_use]
    pub fn scrub_field<S: Into<Cow<'static, str>>>(mut self, field: S) -> Self {
        self.scrub_fields.push(field.into());
        self
    }

    /// Switches to asynchronous delivery.
    #[must_use]
    pub fn async_delivery(mut self) -> Self {
        self.delivery = DeliveryMode::Async;
        self
    }

    /// Switches to blocking delivery with the given timeout.
    #[must_use]
    pub fn blocking_delivery(mut self, timeout: Duration) -> Self {
        self.delivery = DeliveryMode::Blocking;
        self.timeout = Some(timeout);
        self
    }

    /// The timeout blocking sends use.
    ///
    /// A missing or zero timeout falls back to [`DEFAULT_TIMEOUT`].
    pub fn resolved_timeout(&self) -> Duration {
        self.timeout
            .filter(|timeout| !timeout.is_zero())
            .unwrap_or(DEFAULT_TIMEOUT)
    }
}

impl Default for SinkOptions {
    fn default() -> SinkOptions {
        SinkOptions {
            access_token: Cow::Borrowed(""),
            environment: Some(Cow::Borrowed(DEFAULT_ENVIRONMENT)),
            formatter: None,
            transform: None,
            proxy_address: None,
            scrub_fields: Vec::new(),
            delivery: DeliveryMode::default(),
            timeout: None,
            code_version: None,
            host: None,
            debug: false,
        }
    }
}

impl fmt::Debug for SinkOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        #[derive(Debug)]
        struct FormatterFn;
        #[derive(Debug)]
        struct TransformFn;
        f.debug_struct("SinkOptions")
            .field("access_token", &"[redacted]")
            .field("environment", &self.environment)
            .field("formatter", &self.formatter.as_ref().map(|_| FormatterFn))
            .field("transform", &self.transform.as_ref().map(|_| TransformFn))
            .field("proxy_address", &self.proxy_address)
            .field("scrub_fields", &self.scrub_fields)
            .field("delivery", &self.delivery)
            .field("timeout", &self.timeout)
            .field("code_version", &self.code_version)
            .field("host", &self.host)
            .field("debug", &self.debug)
            .finish()
    }
}

impl From<&'static str> for SinkOptions {
    fn from(access_token: &'static str) -> Self {
        SinkOptions::new(access_token)
    }
}

impl From<String> for SinkOptions {
    fn from(access_token: String) -> Self {
        SinkOptions::new(access_token)
    }
}
