//! Digest rendering and delivery channels for Minion.
//!
//! A channel receives the finished [`Digest`](minion_core::Digest) and puts
//! it somewhere. Delivery is the last step of a run and the only step whose
//! failure aborts it.
//!
//! Available channels:
//! - **Stdout** — plain-text digest on the terminal
//! - **File** — `digest-YYYY-MM-DD.html` and `.txt` in an output directory
//! - **Webhook** — JSON POST with subject, text, HTML and raw sections
//! - **Email** — multipart text/HTML message over SMTP with STARTTLS
//! - **Registry** — builds the configured channel

pub mod email;
pub mod file;
pub mod registry;
pub mod render;
pub mod stdout;
pub mod webhook;

pub use email::EmailChannel;
pub use file::FileChannel;
pub use registry::build_channel;
pub use render::{render_html, render_text};
pub use stdout::StdoutChannel;
pub use webhook::WebhookChannel;
