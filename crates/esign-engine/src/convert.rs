use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

use esign_core::notification::{RecipientUpdate, StatusNotification};

/// Provider-shaped notification payload, as POSTed to the ingestion
/// endpoint. The field names and casing belong to the provider; this is
/// the only place in the system that knows them.
///
/// Provider timestamps carry no offset and are taken as UTC.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProviderPayload {
    pub envelope_id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub created: Option<NaiveDateTime>,
    #[serde(default)]
    pub sent: Option<NaiveDateTime>,
    #[serde(default)]
    pub delivered: Option<NaiveDateTime>,
    #[serde(default)]
    pub completed: Option<NaiveDateTime>,
    #[serde(default)]
    pub declined: Option<NaiveDateTime>,
    #[serde(default)]
    pub recipient_statuses: Vec<ProviderRecipientStatus>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProviderRecipientStatus {
    /// Opaque identifier this system supplied at envelope creation and
    /// the provider echoes back. Some providers serialize it as a
    /// number.
    #[serde(default, deserialize_with = "string_or_number")]
    pub client_user_id: Option<String>,
    pub status: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub sent: Option<NaiveDateTime>,
    #[serde(default)]
    pub delivered: Option<NaiveDateTime>,
    #[serde(default)]
    pub signed: Option<NaiveDateTime>,
    #[serde(default)]
    pub declined: Option<NaiveDateTime>,
    #[serde(default)]
    pub decline_reason: Option<String>,
}

impl ProviderRecipientStatus {
    /// The timestamp the provider attached to the reported status.
    fn status_datetime(&self) -> Option<NaiveDateTime> {
        match self.status.as_str() {
            "Sent" => self.sent,
            "Delivered" => self.delivered,
            "Signed" | "Completed" => self.signed,
            "Declined" => self.declined,
            _ => None,
        }
    }
}

impl ProviderPayload {
    /// Translate the wire payload into the engine's input shape.
    ///
    /// Entries without a `ClientUserId` keep an empty identifier: they
    /// can never match a local signer, so the engine records them as
    /// skipped recipients instead of losing them silently. Recipient
    /// entries missing the timestamp for their status fall back to the
    /// envelope-level event time, then to the receive time.
    pub fn into_notification(self) -> StatusNotification {
        let received_at = Utc::now();
        let event_datetime = self.completed.or(self.declined).map(as_utc);

        let recipients = self
            .recipient_statuses
            .iter()
            .map(|entry| RecipientUpdate {
                recipient_id: entry.client_user_id.clone().unwrap_or_default(),
                status: entry.status.clone(),
                status_datetime: entry
                    .status_datetime()
                    .map(as_utc)
                    .or(event_datetime)
                    .unwrap_or(received_at),
                detail: entry.decline_reason.clone(),
            })
            .collect();

        StatusNotification {
            envelope_id: self.envelope_id,
            envelope_status: self.status,
            event_datetime,
            recipients,
        }
    }
}

fn as_utc(naive: NaiveDateTime) -> DateTime<Utc> {
    DateTime::from_naive_utc_and_offset(naive, Utc)
}

fn string_or_number<'de, D: Deserializer<'de>>(de: D) -> Result<Option<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(i64),
    }

    Ok(Option::<Raw>::deserialize(de)?.map(|raw| match raw {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    }))
}
