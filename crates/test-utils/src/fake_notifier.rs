use monitored_cron::notify::{Notifier, NotifyError};

/// A notifier that:
/// - records which URLs were "pinged"
/// - optionally answers every ping with an HTTP error status.
#[derive(Debug, Default)]
pub struct FakeNotifier {
    pinged: Vec<String>,
    fail_with_status: Option<u16>,
}

impl FakeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every ping fails as if the endpoint answered `status`.
    pub fn failing(status: u16) -> Self {
        Self {
            pinged: Vec::new(),
            fail_with_status: Some(status),
        }
    }

    pub fn pinged(&self) -> &[String] {
        &self.pinged
    }
}

impl Notifier for FakeNotifier {
    fn ping(&mut self, url: &str) -> Result<(), NotifyError> {
        self.pinged.push(url.to_string());

        match self.fail_with_status {
            Some(status) => Err(NotifyError::Status {
                url: url.to_string(),
                status,
            }),
            None => Ok(()),
        }
    }
}
