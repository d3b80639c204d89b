use rollbar_core::{ClientFactory, Error, LogLevel, RollbarSink, SinkOptions};
use tracing_core::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer, Layered, SubscriberExt};

use crate::converters::{convert_tracing_level, log_event_from_event};
use crate::FATAL_FIELD;

/// Events below this level are not forwarded unless configured otherwise.
pub const DEFAULT_MINIMUM_LEVEL: LogLevel = LogLevel::Error;

type ErrorHandler = Box<dyn Fn(&Error) + Send + Sync>;

/// The default error handler.
///
/// Prints the failure to stderr. The subscriber cannot be used here, it is
/// the one that is currently dispatching the failed event.
pub fn default_error_handler(err: &Error) {
    match std::error::Error::source(err) {
        Some(source) => eprintln!("[rollbar] failed to emit event: {}: {}", err, source),
        None => eprintln!("[rollbar] failed to emit event: {}", err),
    }
}

/// Provides a tracing layer that forwards events to Rollbar.
pub struct RollbarLayer {
    sink: RollbarSink,
    minimum_level: LogLevel,
    error_handler: ErrorHandler,
}

impl RollbarLayer {
    /// Creates a layer around an existing sink.
    pub fn new(sink: RollbarSink) -> Self {
        RollbarLayer {
            sink,
            minimum_level: DEFAULT_MINIMUM_LEVEL,
            error_handler: Box::new(default_error_handler),
        }
    }

    /// Sets the minimum level an event needs to be forwarded.
    #[must_use]
    pub fn minimum_level(mut self, level: LogLevel) -> Self {
        self.minimum_level = level;
        self
    }

    /// Sets the function that receives errors raised while emitting.
    ///
    /// By default they are printed to stderr.
    #[must_use]
    pub fn error_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Error) + Send + Sync + 'static,
    {
        self.error_handler = Box::new(handler);
        self
    }

    /// The sink events are emitted to.
    pub fn sink(&self) -> &RollbarSink {
        &self.sink
    }
}

impl<S> Layer<S> for RollbarLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        // Only events carrying the fatal field can end up above their level.
        if convert_tracing_level(metadata.level()) < self.minimum_level
            && metadata.fields().field(FATAL_FIELD).is_none()
        {
            return;
        }

        let log_event = log_event_from_event(event);
        if log_event.level < self.minimum_level {
            return;
        }
        if let Err(err) = self.sink.emit(&log_event) {
            (self.error_handler)(&err);
        }
    }
}

/// Creates a Rollbar layer forwarding events at `Error` and above.
///
/// Fails if the access token in `options` is blank.
///
/// # Examples
///
/// ```
/// use rollbar_core::test::TestClient;
/// use rollbar_core::SinkOptions;
/// use tracing_subscriber::prelude::*;
///
/// let client = TestClient::new();
/// let layer = rollbar_tracing::layer(SinkOptions::new("abc123"), client.clone()).unwrap();
/// let subscriber = tracing_subscriber::registry().with(layer);
///
/// tracing::subscriber::with_default(subscriber, || {
///     tracing::error!("Generates an item");
///     tracing::info!("Below the minimum level");
/// });
/// assert_eq!(client.fetch_and_clear_calls().len(), 1);
/// ```
pub fn layer<F: ClientFactory>(options: SinkOptions, client: F) -> Result<RollbarLayer, Error> {
    RollbarSink::new(options, client).map(RollbarLayer::new)
}

/// Registers a Rollbar layer on a subscriber.
pub trait RollbarSubscriberExt: Subscriber + Sized {
    /// Wraps `self` with a Rollbar layer that forwards events at
    /// `minimum_level` and above.
    ///
    /// Returns the layered subscriber so that more layers can be added, or
    /// an error if the access token in `options` is blank.
    ///
    /// # Examples
    ///
    /// ```
    /// use rollbar_core::test::TestClient;
    /// use rollbar_core::{LogLevel, SinkOptions};
    /// use rollbar_tracing::RollbarSubscriberExt;
    ///
    /// let client = TestClient::new();
    /// let subscriber = tracing_subscriber::registry()
    ///     .with_rollbar(SinkOptions::new("abc123"), LogLevel::Warning, client.clone())
    ///     .unwrap();
    ///
    /// tracing::subscriber::with_default(subscriber, || {
    ///     tracing::warn!(pct = 91, "disk at {{pct}}%");
    /// });
    /// let calls = client.fetch_and_clear_calls();
    /// assert_eq!(calls[0].body.message(), Some("disk at 91%"));
    /// ```
    fn with_rollbar<F: ClientFactory>(
        self,
        options: SinkOptions,
        minimum_level: LogLevel,
        client: F,
    ) -> Result<Layered<RollbarLayer, Self>, Error> {
        let layer = layer(options, client)?.minimum_level(minimum_level);
        Ok(self.with(layer))
    }
}

impl<S: Subscriber> RollbarSubscriberExt for S {}
