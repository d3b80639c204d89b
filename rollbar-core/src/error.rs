use std::time::Duration;

use thiserror::Error;

/// Boxed error raised by a [`Client`](crate::Client) implementation.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised while setting up the sink or forwarding an event.
#[derive(Debug, Error)]
pub enum Error {
    /// Raised at construction if the access token is empty or whitespace.
    #[error("value cannot be null or empty: access_token")]
    MissingAccessToken,
    /// Raised if a numeric log level is outside of the known levels.
    #[error("log level {0} is out of range")]
    LevelOutOfRange(u8),
    /// Raised if a log level name is not recognized.
    #[error("unknown log level {0:?}")]
    UnknownLevel(String),
    /// Raised by a blocking client that did not finish within the timeout.
    #[error("delivery did not complete within {0:?}")]
    Timeout(Duration),
    /// Raised by the client when sending failed.
    #[error("delivery failed")]
    Delivery(#[source] BoxError),
}

impl Error {
    /// Wraps a client side failure.
    pub fn delivery<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        Error::Delivery(err.into())
    }

    /// Returns `true` for errors that come from the client while sending.
    pub fn is_delivery(&self) -> bool {
        matches!(self, Error::Timeout(_) | Error::Delivery(_))
    }
}
