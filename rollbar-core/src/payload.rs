use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{ErrorLevel, Exception};

/// Flat string properties sent along with an item.
pub type Custom = BTreeMap<String, String>;

/// The main content of an item: either a message or an exception.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Body {
    /// A plain message.
    Message(String),
    /// An error, sent as a trace.
    #[serde(rename = "trace")]
    Exception(Exception),
}

impl Body {
    /// Returns the message, if this is a message body.
    pub fn message(&self) -> Option<&str> {
        match self {
            Body::Message(msg) => Some(msg),
            Body::Exception(_) => None,
        }
    }

    /// Returns the exception, if this is an exception body.
    pub fn exception(&self) -> Option<&Exception> {
        match self {
            Body::Message(_) => None,
            Body::Exception(exc) => Some(exc),
        }
    }
}

/// Information about the process that reports items.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    /// Host name of the machine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    /// Version of the running code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_version: Option<String>,
}

/// A fully assembled item as a client sends it.
///
/// Clients build these through [`ClientConfig::payload`](crate::ClientConfig::payload)
/// and hand them to the transform callback right before sending.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    /// Target environment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    /// Severity tag.
    pub level: ErrorLevel,
    /// Message or exception.
    pub body: Body,
    /// Custom properties.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom: Option<Custom>,
    /// Server context.
    pub server: Server,
}
