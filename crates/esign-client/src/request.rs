use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::{json, Value};

use esign_core::types::Signer;

/// Everything needed to build one envelope-creation request.
///
/// Either `document` (raw bytes, encoded into the request) or
/// `template_id` (provider workflow selector) drives the request shape;
/// when both are present the template wins.
pub struct EnvelopeRequest<'a> {
    pub title: &'a str,
    pub document: Option<&'a [u8]>,
    pub template_id: Option<&'a str>,
    pub signers: &'a [Signer],
    pub callback_url: Option<&'a str>,
}

/// Build the provider request body.
///
/// Recipients are emitted in the order given, each carrying its signing
/// order verbatim as the provider routing order: equal orders sign in
/// parallel, ascending distinct orders sign serially.
pub fn envelope_body(req: &EnvelopeRequest<'_>) -> Value {
    let mut body = if let Some(template_id) = req.template_id {
        json!({
            "status": "sent",
            "emailSubject": req.title,
            "templateId": template_id,
            "templateRoles": recipient_entries(req.signers),
        })
    } else {
        json!({
            "status": "sent",
            "emailSubject": req.title,
            "documents": [{
                "documentId": "1",
                "name": req.title,
                "documentBase64": BASE64.encode(req.document.unwrap_or_default()),
            }],
            "recipients": {"signers": recipient_entries(req.signers)},
        })
    };

    if let Some(url) = req.callback_url {
        body["eventNotification"] = event_notification(url);
    }
    body
}

fn recipient_entries(signers: &[Signer]) -> Vec<Value> {
    signers
        .iter()
        .enumerate()
        .map(|(i, signer)| {
            json!({
                "recipientId": (i + 1).to_string(),
                "clientUserId": signer.id.to_string(),
                "email": signer.email,
                "name": signer.full_name,
                "roleName": format!("signer-{}", i + 1),
                "routingOrder": signer.signing_order.to_string(),
            })
        })
        .collect()
}

fn event_notification(callback_url: &str) -> Value {
    json!({
        "url": callback_url,
        "loggingEnabled": "true",
        "envelopeEvents": [
            {"envelopeEventStatusCode": "Sent"},
            {"envelopeEventStatusCode": "Delivered"},
            {"envelopeEventStatusCode": "Completed"},
            {"envelopeEventStatusCode": "Declined"},
        ],
        "recipientEvents": [
            {"recipientEventStatusCode": "Sent"},
            {"recipientEventStatusCode": "Delivered"},
            {"recipientEventStatusCode": "Completed"},
            {"recipientEventStatusCode": "Declined"},
        ],
    })
}
