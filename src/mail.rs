use async_trait::async_trait;
use tracing::info;

/// Outbound e-mail used by the password reset flow.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_otp(&self, to: &str, otp: &str) -> anyhow::Result<()>;
    async fn send_password_changed(&self, to: &str) -> anyhow::Result<()>;
}

/// Mailer that hands messages to the log pipeline instead of an SMTP relay.
#[derive(Debug, Clone)]
pub struct LogMailer {
    sender: String,
}

impl LogMailer {
    pub fn new(sender: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
        }
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send_otp(&self, to: &str, otp: &str) -> anyhow::Result<()> {
        info!(from = %self.sender, %to, %otp, "password reset OTP issued");
        Ok(())
    }

    async fn send_password_changed(&self, to: &str) -> anyhow::Result<()> {
        info!(from = %self.sender, %to, "password changed notice");
        Ok(())
    }
}

#[cfg(test)]
pub use recording::RecordingMailer;
