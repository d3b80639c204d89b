use std::error::Error;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use rollbar_core::{Body, Client, ClientConfig, Custom, ErrorLevel, LogLevel, SinkOptions};
use rollbar_tracing::RollbarSubscriberExt;
use tracing_subscriber::prelude::*;

/// Prints the payloads it would send.
struct PrintClient {
    config: ClientConfig,
}

impl Client for PrintClient {
    fn log(
        &self,
        level: ErrorLevel,
        body: Body,
        custom: Option<Custom>,
    ) -> Result<(), rollbar_core::Error> {
        let payload = self.config.payload(level, body, custom);
        let json = serde_json::to_string_pretty(&payload).map_err(rollbar_core::Error::delivery)?;
        println!("{}", json);
        Ok(())
    }

    fn log_blocking(
        &self,
        level: ErrorLevel,
        body: Body,
        custom: Option<Custom>,
        _timeout: Duration,
    ) -> Result<(), rollbar_core::Error> {
        self.log(level, body, custom)
    }
}

fn main() {
    let options = SinkOptions {
        code_version: rollbar_core::code_version!(),
        debug: true,
        ..SinkOptions::from_env()
    };
    let options = if options.access_token.trim().is_empty() {
        SinkOptions {
            access_token: "demo-token".into(),
            ..options
        }
    } else {
        options
    }
    .scrub_field("password")
    .transform(|payload| {
        payload
            .custom
            .get_or_insert_with(Custom::new)
            .insert("k".into(), "Additional info".into());
    });

    let client = |config: &ClientConfig| -> Arc<dyn Client> {
        Arc::new(PrintClient {
            config: config.clone(),
        })
    };

    tracing_subscriber::registry()
        .with_rollbar(options, LogLevel::Warning, client)
        .expect("valid access token")
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Not forwarded");
    tracing::warn!(pct = 91, "disk at {{pct}}%");

    let err = io::Error::new(io::ErrorKind::Other, "oh no");
    tracing::error!(
        error = &err as &dyn Error,
        user = "alice",
        password = "hunter2",
        "Upload failed for {{user}}"
    );
    tracing::error!(rollbar.fatal = true, "Cannot continue");
}
