//! Notification sinks and the fire-and-forget dispatcher
//!
//! The controller never awaits a notification. `Notifier::dispatch` detaches
//! the delivery and every failure ends in a log line. Detached deliveries are
//! remembered so a shutting-down process can `flush` them.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::core::config::{NotifierConfig, ENV_API_KEY, ENV_RECIPIENT};
use crate::types::{NotifyError, Response};
use crate::EMAIL_REQUEST_TIMEOUT_SECS;

/// Best-effort outbound message for a response
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Deliver one notification
    async fn notify(&self, response: Response) -> Result<(), NotifyError>;
}

/// Email relay request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailRequest {
    pub to: String,
    pub subject: String,
    pub message: String,
}

impl EmailRequest {
    /// Request announcing `response` to `to`
    pub fn for_response(to: impl Into<String>, response: Response) -> Self {
        Self {
            to: to.into(),
            subject: response.subject(),
            message: response.message().to_string(),
        }
    }

    fn html(&self) -> String {
        format!(
            "<div style=\"font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;\">\
             <h2 style=\"color: #ec4899;\">Valentine's Proposal Response</h2>\
             <p style=\"font-size: 16px; line-height: 1.6; color: #333;\">{}</p>\
             <hr style=\"border: none; border-top: 1px solid #eee; margin: 20px 0;\">\
             <p style=\"font-size: 12px; color: #999;\">Sent from Valentine's Proposal App</p>\
             </div>",
            escape_html(&self.message)
        )
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[derive(Debug, Deserialize)]
struct ProviderReply {
    id: Option<String>,
    message: Option<String>,
}

/// Sink posting to a Resend-compatible transactional email API
#[derive(Debug, Clone)]
pub struct EmailSink {
    client: reqwest::Client,
    config: NotifierConfig,
}

impl EmailSink {
    pub fn new(config: NotifierConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(EMAIL_REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|e| {
                warn!("email client builder failed, using defaults: {}", e);
                reqwest::Client::new()
            });
        Self { client, config }
    }

    pub fn config(&self) -> &NotifierConfig {
        &self.config
    }

    /// Send one email, returning the provider's message id
    pub async fn send(&self, request: &EmailRequest, tag: Option<&str>) -> Result<String, NotifyError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(NotifyError::missing(ENV_API_KEY))?;

        let mut body = json!({
            "from": self.config.from,
            "to": request.to,
            "subject": request.subject,
            "html": request.html(),
        });
        if let Some(tag) = tag {
            body["tags"] = json!([{ "name": "response", "value": tag }]);
        }

        let reply = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = reply.status();
        let parsed: ProviderReply = reply.json().await.unwrap_or(ProviderReply {
            id: None,
            message: None,
        });

        if !status.is_success() {
            return Err(NotifyError::Provider {
                status: status.as_u16(),
                message: parsed
                    .message
                    .unwrap_or_else(|| "no error message".to_string()),
            });
        }

        Ok(parsed.id.unwrap_or_default())
    }
}

#[async_trait]
impl NotificationSink for EmailSink {
    fn name(&self) -> &'static str {
        "email"
    }

    async fn notify(&self, response: Response) -> Result<(), NotifyError> {
        let recipient = self
            .config
            .recipient
            .as_deref()
            .ok_or(NotifyError::missing(ENV_RECIPIENT))?;

        let request = EmailRequest::for_response(recipient, response);
        let id = self.send(&request, Some(response.label())).await?;
        info!(email_id = %id, response = %response, "notification email accepted");
        Ok(())
    }
}

/// Sink that only logs; used for dry runs
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

#[async_trait]
impl NotificationSink for LogSink {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn notify(&self, response: Response) -> Result<(), NotifyError> {
        info!(response = %response, message = response.message(), "dry run: notification not sent");
        Ok(())
    }
}

/// Deliver and swallow the outcome
pub async fn deliver(sink: &dyn NotificationSink, response: Response) {
    match sink.notify(response).await {
        Ok(()) => info!(sink = sink.name(), response = %response, "notification delivered"),
        Err(e) if e.is_configuration() => {
            warn!(sink = sink.name(), response = %response, "notification skipped: {}", e)
        }
        Err(e) => error!(sink = sink.name(), response = %response, "notification failed: {}", e),
    }
}

/// Detaches deliveries so callers never wait on them
#[derive(Clone)]
pub struct Notifier {
    sink: Arc<dyn NotificationSink>,
    pending: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("sink", &self.sink.name())
            .field("pending", &self.pending_count())
            .finish()
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(Arc::new(LogSink))
    }
}

impl Notifier {
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            sink,
            pending: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Email sink from config, or the log sink when `dry_run`
    pub fn from_config(config: NotifierConfig, dry_run: bool) -> Self {
        if dry_run {
            return Self::default();
        }
        if !config.is_complete() {
            warn!("email notifications not fully configured; responses will only be logged as skipped");
        }
        Self::new(Arc::new(EmailSink::new(config)))
    }

    pub fn sink_name(&self) -> &'static str {
        self.sink.name()
    }

    /// Fire and forget. Outside a tokio runtime the delivery gets its own thread.
    pub fn dispatch(&self, response: Response) {
        let sink = Arc::clone(&self.sink);
        info!(sink = sink.name(), response = %response, "dispatching notification");
        let task = async move { deliver(sink.as_ref(), response).await };

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let join = handle.spawn(task);
                let mut pending = self.lock_pending();
                pending.retain(|h| !h.is_finished());
                pending.push(join);
            }
            Err(_) => {
                std::thread::spawn(move || {
                    match tokio::runtime::Builder::new_current_thread().enable_all().build() {
                        Ok(runtime) => runtime.block_on(task),
                        Err(e) => error!("notification runtime failed to start: {}", e),
                    }
                });
            }
        }
    }

    /// Deliveries spawned on a runtime that have not finished yet
    pub fn pending_count(&self) -> usize {
        self.lock_pending().iter().filter(|h| !h.is_finished()).count()
    }

    /// Wait up to `limit` for outstanding deliveries; returns how many were
    /// still running when the limit passed
    pub async fn flush(&self, limit: Duration) -> usize {
        let handles: Vec<_> = self.lock_pending().drain(..).collect();
        let deadline = tokio::time::Instant::now() + limit;

        let mut unfinished = 0;
        for handle in handles {
            match tokio::time::timeout_at(deadline, handle).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => error!("notification task aborted: {}", e),
                Err(_) => unfinished += 1,
            }
        }
        if unfinished > 0 {
            warn!(unfinished, "gave up waiting for notification deliveries");
        }
        unfinished
    }

    fn lock_pending(&self) -> MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
