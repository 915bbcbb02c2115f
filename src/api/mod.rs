//! Remote endpoints: the metadata server and the webhook channel.

pub mod client;
pub mod webhook;

pub use client::ApiClient;
pub use webhook::{WebhookClient, webhook_id};
