//! This crate provides the core of the Rollbar log sink.
//!
//! It turns structured log events into Rollbar items and hands them to a
//! [`Client`]. Transport, batching, retries and scrubbing are the job of the
//! client; this crate only shapes the data.
//!
//! Regular users who wish to forward `tracing` events should use the
//! `rollbar-tracing` crate, which registers a [`RollbarSink`] as a layer.
//!
//! # Core Concepts
//!
//! - [`LogEvent`]: one record from the logging pipeline, with a [`LogLevel`],
//!   a message template, an optional [`Exception`] and named properties.
//! - [`RollbarSink`]: maps the level to an [`ErrorLevel`], renders the
//!   message through a [`MessageFormatter`] and calls the client.
//! - [`Client`] and [`ClientFactory`]: the seam to the remote client. The
//!   factory receives a [`ClientConfig`] once, when the sink is built.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use rollbar_core::{
//!     Body, Client, Custom, Error, ErrorLevel, LogEvent, LogLevel, RollbarSink, SinkOptions,
//! };
//!
//! struct PrintClient;
//!
//! impl Client for PrintClient {
//!     fn log(&self, level: ErrorLevel, body: Body, _: Option<Custom>) -> Result<(), Error> {
//!         println!("{}: {:?}", level, body);
//!         Ok(())
//!     }
//!
//!     fn log_blocking(
//!         &self,
//!         level: ErrorLevel,
//!         body: Body,
//!         custom: Option<Custom>,
//!         _: Duration,
//!     ) -> Result<(), Error> {
//!         self.log(level, body, custom)
//!     }
//! }
//!
//! let sink = RollbarSink::new(SinkOptions::new("abc123"), Arc::new(PrintClient)).unwrap();
//! let event = LogEvent::new(LogLevel::Warning, "disk at {pct}%").with_property("pct", 91);
//! sink.emit(&event).unwrap();
//! ```
//!
//! # Features
//!
//! - `test`: Enables the [`test`] module with a recording [`Client`].

#![warn(missing_docs)]

#[macro_use]
mod macros;

mod client;
mod error;
mod event;
mod exception;
mod format;
mod level;
mod options;
mod payload;
mod sink;
mod utils;

pub use crate::client::{Client, ClientConfig, ClientFactory, Transform, SCRUBBED};
pub use crate::error::{BoxError, Error};
pub use crate::event::{render_value, LogEvent, Properties};
pub use crate::exception::Exception;
pub use crate::format::{render_template, MessageFormatter, TemplateFormatter};
pub use crate::level::{convert_log_level, ErrorLevel, LogLevel};
pub use crate::options::{DeliveryMode, SinkOptions, DEFAULT_ENVIRONMENT, DEFAULT_TIMEOUT};
pub use crate::payload::{Body, Custom, Payload, Server};
pub use crate::sink::{Delivery, RollbarSink, MESSAGE_KEY};
pub use crate::utils::server_name;

#[doc(hidden)]
pub use serde_json::Value;
