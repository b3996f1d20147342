use chrono::Utc;
use serde::Serialize;

use esign_core::notification::StatusNotification;
use esign_core::status::Status;
use esign_core::types::Signature;

use crate::derive::derive_signature_status;

/// What a notification did to an envelope, for acknowledgement logging.
#[derive(Debug, Clone, Serialize)]
pub struct NotificationOutcome {
    pub envelope_id: String,
    pub applied: Vec<AppliedUpdate>,
    /// Recipient identifiers in the payload with no matching signer.
    pub skipped_recipients: Vec<String>,
    /// Status strings outside the known vocabulary, per recipient.
    pub unrecognized_statuses: Vec<UnrecognizedStatus>,
    /// Envelope status after derivation.
    pub signature_status: Status,
}

#[derive(Debug, Clone, Serialize)]
pub struct AppliedUpdate {
    pub recipient_id: String,
    pub status: Status,
}

#[derive(Debug, Clone, Serialize)]
pub struct UnrecognizedStatus {
    pub recipient_id: String,
    pub status: String,
}

/// Apply one notification to one envelope.
///
/// Per recipient entry, in arrival order:
/// 1. Resolve the signer by opaque recipient identifier; unmatched
///    entries are recorded and skipped — the payload may reference
///    recipients outside this system's concern.
/// 2. Map the provider status string; unmapped values are recorded and
///    do not abort the remaining entries.
/// 3. Overwrite the signer's status and status timestamp
///    unconditionally — arrival order is truth order, there is no
///    later-timestamp-wins guard, which makes duplicate delivery
///    idempotent by construction.
/// 4. A decline entry overwrites the signer's detail with the carried
///    reason, or clears it when the reason is absent (last-write-wins
///    per field, not merge). Other statuses leave the detail untouched.
///
/// Afterwards the envelope status is recomputed from the signer set;
/// the payload's envelope-level status is ignored.
pub fn apply_notification(
    signature: &mut Signature,
    notification: &StatusNotification,
) -> NotificationOutcome {
    let mut applied = Vec::new();
    let mut skipped = Vec::new();
    let mut unrecognized = Vec::new();

    for entry in &notification.recipients {
        let Some(signer) = signature.signer_mut(&entry.recipient_id) else {
            tracing::warn!(
                envelope_id = %notification.envelope_id,
                recipient_id = %entry.recipient_id,
                "notification references an unknown recipient, skipping"
            );
            skipped.push(entry.recipient_id.clone());
            continue;
        };

        let Some(status) = Status::from_provider(&entry.status) else {
            tracing::warn!(
                envelope_id = %notification.envelope_id,
                recipient_id = %entry.recipient_id,
                status = %entry.status,
                "unrecognized recipient status, skipping"
            );
            unrecognized.push(UnrecognizedStatus {
                recipient_id: entry.recipient_id.clone(),
                status: entry.status.clone(),
            });
            continue;
        };

        signer.status = status;
        signer.status_datetime = entry.status_datetime;
        if status == Status::Declined {
            signer.status_details = entry.detail.clone().unwrap_or_default();
        }
        applied.push(AppliedUpdate {
            recipient_id: entry.recipient_id.clone(),
            status,
        });
    }

    if let Some(derived) = derive_signature_status(&signature.signers) {
        if derived != signature.status {
            signature.status = derived;
            signature.status_datetime = notification.event_datetime.unwrap_or_else(Utc::now);
        }
    }

    NotificationOutcome {
        envelope_id: notification.envelope_id.clone(),
        applied,
        skipped_recipients: skipped,
        unrecognized_statuses: unrecognized,
        signature_status: signature.status,
    }
}
