//! File channel — writes `digest-YYYY-MM-DD.html` and `.txt`.
//!
//! The output directory is created on first delivery. A second delivery on
//! the same date overwrites that day's files.

use async_trait::async_trait;
use minion_core::channel::Channel;
use minion_core::digest::Digest;
use minion_core::error::ChannelError;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::render::{render_html, render_text};

pub struct FileChannel {
    output_dir: PathBuf,
}

impl FileChannel {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Path of the digest file for `digest` with the given extension.
    pub fn path_for(&self, digest: &Digest, extension: &str) -> PathBuf {
        self.output_dir
            .join(format!("digest-{}.{extension}", digest.date.format("%Y-%m-%d")))
    }

    fn write(&self, path: &Path, content: &str) -> Result<(), ChannelError> {
        std::fs::write(path, content).map_err(|e| ChannelError::DeliveryFailed {
            channel: "file".into(),
            reason: format!("{}: {e}", path.display()),
        })
    }
}

#[async_trait]
impl Channel for FileChannel {
    fn name(&self) -> &str {
        "file"
    }

    async fn deliver(&self, digest: &Digest) -> Result<(), ChannelError> {
        std::fs::create_dir_all(&self.output_dir).map_err(|e| ChannelError::DeliveryFailed {
            channel: "file".into(),
            reason: format!("cannot create {}: {e}", self.output_dir.display()),
        })?;

        let html = self.path_for(digest, "html");
        let text = self.path_for(digest, "txt");
        self.write(&html, &render_html(digest))?;
        self.write(&text, &render_text(digest))?;

        info!(html = %html.display(), text = %text.display(), "Digest written");
        Ok(())
    }

    async fn health_check(&self) -> Result<bool, ChannelError> {
        Ok(!self.output_dir.exists() || self.output_dir.is_dir())
    }
}
