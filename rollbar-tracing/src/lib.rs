//! Support for forwarding `tracing` events to Rollbar.
//!
//! The [`RollbarLayer`] converts every event into a
//! [`LogEvent`](rollbar_core::LogEvent) and emits it through a
//! [`RollbarSink`](rollbar_core::RollbarSink). By default only events at
//! `ERROR` and above are forwarded.
//!
//! # Configuration
//!
//! Register the layer on a subscriber with [`RollbarSubscriberExt::with_rollbar`]
//! or build it with [`layer`] and add it like any other layer:
//!
//! ```
//! use rollbar_core::test::TestClient;
//! use rollbar_core::SinkOptions;
//! use tracing_subscriber::prelude::*;
//!
//! let client = TestClient::new();
//! let rollbar_layer = rollbar_tracing::layer(SinkOptions::new("abc123"), client)
//!     .unwrap()
//!     .minimum_level(rollbar_core::LogLevel::Warning);
//!
//! let _guard = tracing_subscriber::registry()
//!     .with(tracing_subscriber::fmt::layer())
//!     .with(rollbar_layer)
//!     .set_default();
//! ```
//!
//! # Fields
//!
//! The `message` of an event is used as message template. Placeholders like
//! `{pct}` are filled in from the other fields, so use `{{pct}}` in the
//! format string to keep the braces. All other fields are sent as custom
//! properties.
//!
//! To track [error structs](std::error::Error), assign a reference to an
//! error trait object to a field. The first such field becomes the exception
//! of the item.
//!
//! ```
//! use std::error::Error;
//! use std::io;
//!
//! let custom_error = io::Error::new(io::ErrorKind::Other, "oh no");
//! tracing::error!(error = &custom_error as &dyn Error, "my operation failed");
//! ```
//!
//! `tracing` has no fatal level. Set the `rollbar.fatal` field to `true` to
//! report an event as critical:
//!
//! ```
//! tracing::error!(rollbar.fatal = true, "cannot continue");
//! ```
//!
//! # Errors
//!
//! Failures of the client cannot travel back through the `tracing` macros.
//! They are handed to the layer's error handler, which prints them to stderr
//! unless replaced with [`RollbarLayer::error_handler`].

#![warn(missing_docs)]

mod converters;
mod layer;

pub use converters::*;
pub use layer::*;

/// Field that, set to `true`, reports an event at fatal level.
pub const FATAL_FIELD: &str = "rollbar.fatal";
