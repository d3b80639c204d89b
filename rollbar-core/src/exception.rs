use std::error::Error;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::utils::parse_type_from_debug;

/// An error attached to a log event.
///
/// The `source` chain of the original error is kept as nested exceptions,
/// outermost first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exception {
    /// Type name of the error.
    pub class: String,
    /// Human readable description of the error.
    pub message: String,
    /// The error that caused this one, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Box<Exception>>,
}

impl Exception {
    /// Creates an exception with the given class and message.
    pub fn new<C, M>(class: C, message: M) -> Self
    where
        C: Into<String>,
        M: Into<String>,
    {
        Exception {
            class: class.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Builds an exception from a [`std::error::Error`], including its sources.
    ///
    /// # Examples
    ///
    /// ```
    /// let err = "NaN".parse::<u32>().unwrap_err();
    /// let exception = rollbar_core::Exception::from_error(&err);
    /// assert_eq!(exception.class, "ParseIntError");
    /// assert_eq!(exception.message, "invalid digit found in string");
    /// ```
    pub fn from_error<E: Error + ?Sized>(err: &E) -> Self {
        Exception {
            class: parse_type_from_debug(err),
            message: err.to_string(),
            source: err.source().map(|source| Box::new(Exception::from_error(source))),
        }
    }

    /// Iterates over this exception and all of its sources.
    pub fn chain(&self) -> impl Iterator<Item = &Exception> {
        std::iter::successors(Some(self), |exc| exc.source.as_deref())
    }
}

impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.class, self.message)
    }
}
