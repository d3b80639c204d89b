use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::payload::{Body, Custom, Payload, Server};
use crate::{Error, ErrorLevel};

/// Callback applied by the client to every payload right before sending.
pub type Transform = Arc<dyn Fn(&mut Payload) + Send + Sync>;

/// Value that replaces scrubbed properties.
pub const SCRUBBED: &str = "***";

/// The remote client the sink forwards items to.
///
/// Implementations own transport, queuing, retries, proxy handling and
/// scrubbing. They are shared between threads and must be safe to call
/// concurrently.
pub trait Client: Send + Sync + 'static {
    /// Records an item and returns without waiting for delivery.
    fn log(&self, level: ErrorLevel, body: Body, custom: Option<Custom>) -> Result<(), Error>;

    /// Records an item and blocks until it was delivered or `timeout` elapsed.
    fn log_blocking(
        &self,
        level: ErrorLevel,
        body: Body,
        custom: Option<Custom>,
        timeout: Duration,
    ) -> Result<(), Error>;
}

/// Creates the [`Client`] a sink sends through.
///
/// This is typically a closure taking the [`ClientConfig`] and returning an
/// `Arc<dyn Client>`, or an already built `Arc<C>` that ignores the config.
pub trait ClientFactory: Send + Sync {
    /// Builds a client for the given configuration.
    fn create_client(&self, config: &ClientConfig) -> Arc<dyn Client>;
}

impl<F> ClientFactory for F
where
    F: Fn(&ClientConfig) -> Arc<dyn Client> + Send + Sync,
{
    fn create_client(&self, config: &ClientConfig) -> Arc<dyn Client> {
        self(config)
    }
}

impl<C: Client> ClientFactory for Arc<C> {
    fn create_client(&self, config: &ClientConfig) -> Arc<dyn Client> {
        let _ = config;
        self.clone()
    }
}

/// Configuration handed to the [`ClientFactory`] when a sink is built.
#[derive(Clone)]
pub struct ClientConfig {
    /// The project access token.
    pub access_token: String,
    /// Target environment. Only set if one was configured.
    pub environment: Option<Cow<'static, str>>,
    /// Outbound proxy.
    pub proxy_address: Option<Cow<'static, str>>,
    /// Property names to redact. Only set if the list is non-empty.
    pub scrub_fields: Option<Vec<Cow<'static, str>>>,
    /// Callback applied to each payload before sending.
    pub transform: Option<Transform>,
    /// Server context attached to every payload.
    pub server: Server,
}

impl ClientConfig {
    /// Assembles the payload for one item.
    ///
    /// Adds environment and server context, replaces the values of scrubbed
    /// properties with [`SCRUBBED`] and finally runs the transform callback.
    pub fn payload(&self, level: ErrorLevel, body: Body, custom: Option<Custom>) -> Payload {
        let mut custom = custom;
        if let (Some(custom), Some(fields)) = (custom.as_mut(), self.scrub_fields.as_ref()) {
            for (key, value) in custom.iter_mut() {
                if fields.iter().any(|field| field.eq_ignore_ascii_case(key)) {
                    *value = SCRUBBED.to_owned();
                }
            }
        }

        let mut payload = Payload {
            environment: self.environment.as_ref().map(|env| env.to_string()),
            level,
            body,
            custom,
            server: self.server.clone(),
        };
        if let Some(ref transform) = self.transform {
            transform(&mut payload);
        }
        payload
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        #[derive(Debug)]
        struct TransformFn;
        f.debug_struct("ClientConfig")
            .field("access_token", &"[redacted]")
            .field("environment", &self.environment)
            .field("proxy_address", &self.proxy_address)
            .field("scrub_fields", &self.scrub_fields)
            .field("transform", &self.transform.as_ref().map(|_| TransformFn))
            .field("server", &self.server)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ClientConfig {
        ClientConfig {
            access_token: "abc123".into(),
            environment: Some("staging".into()),
            proxy_address: None,
            scrub_fields: Some(vec!["password".into()]),
            transform: Some(Arc::new(|payload: &mut Payload| {
                payload
                    .custom
                    .get_or_insert_with(Custom::new)
                    .insert("k".into(), "Additional info".into());
            })),
            server: Server {
                host: Some("web-1".into()),
                code_version: Some("1.2.3".into()),
            },
        }
    }

    #[test]
    fn payload_applies_scrubbing_then_transform() {
        let mut custom = Custom::new();
        custom.insert("Password".into(), "hunter2".into());
        custom.insert("user".into(), "alice".into());

        let payload = config().payload(ErrorLevel::Error, Body::Message("login".into()), Some(custom));
        let custom = payload.custom.unwrap();
        assert_eq!(custom["Password"], SCRUBBED);
        assert_eq!(custom["user"], "alice");
        assert_eq!(custom["k"], "Additional info");
        assert_eq!(payload.environment.as_deref(), Some("staging"));
        assert_eq!(payload.server.code_version.as_deref(), Some("1.2.3"));
    }

    #[test]
    fn payload_keeps_missing_custom_without_transform() {
        let config = ClientConfig {
            transform: None,
            ..config()
        };
        let payload = config.payload(ErrorLevel::Info, Body::Message("hi".into()), None);
        assert!(payload.custom.is_none());
    }

    #[test]
    fn debug_hides_token() {
        let dbg = format!("{:?}", config());
        assert!(!dbg.contains("abc123"));
        assert!(dbg.contains("staging"));
    }
}
