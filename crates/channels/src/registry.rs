//! Channel registry — picks the delivery channel named in the config.

use std::sync::Arc;

use minion_config::DeliveryConfig;
use minion_core::channel::Channel;
use minion_core::error::ChannelError;
use tracing::info;

use crate::email::EmailChannel;
use crate::file::FileChannel;
use crate::stdout::StdoutChannel;
use crate::webhook::WebhookChannel;

/// Names accepted in `delivery.channel`.
pub const CHANNEL_NAMES: &[&str] = &["stdout", "file", "webhook", "email"];

/// Build the configured delivery channel.
pub fn build_channel(config: &DeliveryConfig) -> Result<Arc<dyn Channel>, ChannelError> {
    let channel: Arc<dyn Channel> = match config.channel.as_str() {
        "stdout" => Arc::new(StdoutChannel::new()),
        "file" => Arc::new(FileChannel::new(&config.output_dir)),
        "webhook" => {
            let url = config.webhook_url.as_deref().ok_or_else(|| {
                ChannelError::NotConfigured("delivery.webhook_url is not set".into())
            })?;
            Arc::new(WebhookChannel::new(url)?)
        }
        "email" => Arc::new(EmailChannel::new(&config.email)?),
        other => {
            return Err(ChannelError::NotConfigured(format!(
                "unknown delivery channel '{other}' (expected one of {})",
                CHANNEL_NAMES.join(", ")
            )));
        }
    };

    info!(channel = channel.name(), "Delivery channel ready");
    Ok(channel)
}
