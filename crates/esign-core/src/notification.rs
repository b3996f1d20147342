use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Normalized status-change notification handed to the workflow engine.
///
/// The ingestion endpoint translates the provider wire payload into this
/// shape; the engine never sees provider formats.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusNotification {
    /// Backend-assigned envelope identifier.
    pub envelope_id: String,
    /// Envelope-level status as reported by the provider. Kept for
    /// observability only — the engine derives envelope status from the
    /// signer set and never trusts this field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub envelope_status: Option<String>,
    /// Envelope-level completion/decline timestamp, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_datetime: Option<DateTime<Utc>>,
    /// Per-recipient entries, in payload arrival order.
    #[serde(default)]
    pub recipients: Vec<RecipientUpdate>,
}

/// One recipient status entry within a notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipientUpdate {
    /// Opaque recipient identifier, echoed back from envelope creation.
    pub recipient_id: String,
    /// Raw provider status string ("Sent", "Delivered", "Signed", ...).
    pub status: String,
    /// Timestamp the provider attached to this status.
    pub status_datetime: DateTime<Utc>,
    /// Free-text detail, populated for decline events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}
