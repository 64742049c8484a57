//! Stdout channel — prints the plain-text digest.
//!
//! This is the simplest channel and the default. `minion run --dry-run`
//! always uses it.

use async_trait::async_trait;
use minion_core::channel::Channel;
use minion_core::digest::Digest;
use minion_core::error::ChannelError;

use crate::render::render_text;

pub struct StdoutChannel;

impl StdoutChannel {
    pub fn new() -> Self {
        Self
    }
}

impl Default for StdoutChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Channel for StdoutChannel {
    fn name(&self) -> &str {
        "stdout"
    }

    async fn deliver(&self, digest: &Digest) -> Result<(), ChannelError> {
        println!("{}", render_text(digest));
        Ok(())
    }
}
