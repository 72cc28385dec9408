// src/notify.rs

//! Success pings.
//!
//! When a run succeeds cleanly and the job has a `notify.url`, the URL gets
//! one plain GET. `:runtime:` anywhere in the URL is replaced with the run's
//! duration first, so monitoring endpoints can record it.
//!
//! The ping is not retried and has no timeout of its own. Its failure is
//! returned to the caller as a [`NotifyError`].

use reqwest::Url;
use thiserror::Error;
use tracing::debug;

/// Placeholder substituted with the formatted runtime.
pub const RUNTIME_TOKEN: &str = ":runtime:";

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("`{url}` is not a valid notify URL: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("could not start HTTP runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error("request to {url} failed: {source}")]
    Request { url: String, source: reqwest::Error },

    #[error("{url} responded with HTTP {status}")]
    Status { url: String, status: u16 },
}

impl NotifyError {
    pub fn kind(&self) -> &'static str {
        match self {
            NotifyError::InvalidUrl { .. } => "InvalidUrl",
            NotifyError::Runtime(_) => "RuntimeError",
            NotifyError::Request { .. } => "RequestError",
            NotifyError::Status { .. } => "HttpStatusError",
        }
    }
}

/// Replace every `:runtime:` in `template`.
pub fn substitute_runtime(template: &str, runtime: &str) -> String {
    template.replace(RUNTIME_TOKEN, runtime)
}

/// Absolute `http`/`https` URL with a host.
pub fn is_valid_notify_url(url: &str) -> bool {
    Url::parse(url)
        .map(|parsed| matches!(parsed.scheme(), "http" | "https") && parsed.has_host())
        .unwrap_or(false)
}

/// Something that can ping a URL.
///
/// Production uses [`HttpNotifier`]; tests can record pings instead.
pub trait Notifier {
    fn ping(&mut self, url: &str) -> Result<(), NotifyError>;
}

/// Issues the ping with `reqwest` on a current-thread Tokio runtime.
///
/// The runtime lives only for the one request, so no worker threads are
/// started.
#[derive(Debug, Default)]
pub struct HttpNotifier;

impl HttpNotifier {
    pub fn new() -> Self {
        Self
    }
}

impl Notifier for HttpNotifier {
    fn ping(&mut self, url: &str) -> Result<(), NotifyError> {
        let target = Url::parse(url).map_err(|e| NotifyError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(NotifyError::Runtime)?;

        let request_error = |source: reqwest::Error| NotifyError::Request {
            url: url.to_string(),
            source,
        };

        let status = runtime.block_on(async {
            let client = reqwest::Client::builder().build().map_err(request_error)?;
            let response = client.get(target).send().await.map_err(request_error)?;
            Ok::<_, NotifyError>(response.status())
        })?;

        debug!(url, status = status.as_u16(), "notify ping answered");

        if !status.is_success() {
            return Err(NotifyError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(())
    }
}
