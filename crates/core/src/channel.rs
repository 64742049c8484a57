//! Channel trait — where a finished digest goes.
//!
//! A Channel takes the ordered Sections of a run (wrapped in a [`Digest`])
//! and delivers them: printed, written to disk, or pushed to a remote
//! endpoint. Rendering to text/HTML is the channel's business; the agent
//! layer makes no assumption about the destination format.

use async_trait::async_trait;
use crate::digest::Digest;
use crate::error::ChannelError;

#[async_trait]
pub trait Channel: Send + Sync {
    /// Human-readable channel name (e.g., "stdout", "file", "webhook").
    fn name(&self) -> &str;

    /// Deliver the digest. A failure here is fatal to the run.
    async fn deliver(&self, digest: &Digest) -> std::result::Result<(), ChannelError>;

    /// Health check — is the destination reachable/writable?
    async fn health_check(&self) -> std::result::Result<bool, ChannelError> {
        Ok(true)
    }
}
