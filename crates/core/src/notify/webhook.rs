//! Webhook notification sink (Discord-compatible embed payload).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::history::RunStatus;
use crate::settings::SettingsStore;
use crate::transport::build_client;

use super::{NotificationSink, NotifyError, SyncReport};

const SUCCESS_COLOR: u32 = 0x48bb78;
const ERROR_COLOR: u32 = 0xe53e3e;

/// Timeout for webhook delivery.
const DELIVERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Posts run reports to the operator-configured webhook.
///
/// The webhook URL and the enabled flag are read per delivery, so operator
/// changes apply to the next run.
pub struct WebhookNotifier {
    settings: Arc<dyn SettingsStore>,
}

impl WebhookNotifier {
    pub fn new(settings: Arc<dyn SettingsStore>) -> Self {
        Self { settings }
    }
}

/// Build the embed payload for a report.
fn build_payload(report: &SyncReport) -> Value {
    let success = report.status == RunStatus::Completed;
    let (title, color) = if success {
        ("Synchronization completed", SUCCESS_COLOR)
    } else {
        ("Synchronization failed", ERROR_COLOR)
    };

    let mut fields = vec![
        json!({
            "name": "Added",
            "value": format!(
                "Films: **{}**\nDocumentaries: **{}**",
                report.films_added, report.documentaries_added
            ),
            "inline": true,
        }),
        json!({
            "name": "Totals",
            "value": format!(
                "Films: **{}**\nDocumentaries: **{}**",
                report.total_films, report.total_documentaries
            ),
            "inline": true,
        }),
        json!({
            "name": "Run",
            "value": format!(
                "Matched: **{}**\nFailed: **{}**\nDuration: {}s",
                report.matched, report.failed, report.duration_secs
            ),
            "inline": true,
        }),
    ];

    if let Some(ref message) = report.error_message {
        fields.push(json!({
            "name": "Error",
            "value": message,
            "inline": false,
        }));
    }

    if let Some(ref url) = report.manifest_url {
        fields.push(json!({
            "name": "Install",
            "value": url,
            "inline": false,
        }));
    }

    let mut embeds = vec![json!({
        "title": title,
        "color": color,
        "fields": fields,
    })];

    // Enhanced notifications: one extra embed per kind listing the newest
    // additions, with the first poster as thumbnail.
    for (name, entries) in [
        ("New films", &report.recent_films),
        ("New documentaries", &report.recent_documentaries),
    ] {
        if entries.is_empty() {
            continue;
        }
        let lines: Vec<String> = entries
            .iter()
            .map(|e| match e.year {
                Some(ref year) => format!("• {} ({})", e.title, year),
                None => format!("• {}", e.title),
            })
            .collect();
        let mut embed = json!({
            "title": name,
            "color": SUCCESS_COLOR,
            "description": lines.join("\n"),
        });
        if let Some(poster) = entries.iter().find_map(|e| e.poster_url.clone()) {
            embed["thumbnail"] = json!({ "url": poster });
        }
        embeds.push(embed);
    }

    json!({ "embeds": embeds })
}

#[async_trait]
impl NotificationSink for WebhookNotifier {
    async fn notify(&self, report: &SyncReport) -> Result<(), NotifyError> {
        let settings = self
            .settings
            .load()
            .map_err(|e| NotifyError::Settings(e.to_string()))?;

        if !settings.notifications_enabled || settings.webhook_url.trim().is_empty() {
            debug!("Notifications disabled or webhook not configured, skipping");
            return Ok(());
        }

        let client = build_client(&settings.proxy, DELIVERY_TIMEOUT)
            .map_err(|e| NotifyError::Request(e.to_string()))?;

        let payload = build_payload(report);
        let response = client
            .post(settings.webhook_url.trim())
            .json(&payload)
            .send()
            .await
            .map_err(|e| NotifyError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Status(status.as_u16()));
        }

        debug!("Notification delivered");
        Ok(())
    }
}
