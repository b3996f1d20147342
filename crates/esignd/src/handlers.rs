use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Redirect;
use axum::Json;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Deserialize;
use serde_json::{json, Value};

use esign_client::{BackendClient, EnvelopeRequest};
use esign_core::config::ProviderConfig;
use esign_core::errors::WorkflowError;
use esign_core::types::{Signature, SignatureType};
use esign_engine::convert::ProviderPayload;

use crate::error::ApiError;
use crate::state::AppState;

/// Fixed acknowledgement for every structurally valid notification.
/// Non-success replies would trigger provider retry storms, so workflow
/// level inconsistencies are absorbed here and only logged.
const ACK: &str = "OK";

pub async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

/// Inbound provider notification.
///
/// Parse failure is the only case that returns a non-success response
/// (the `Json` extractor rejects with 4xx). Everything that parses is
/// acknowledged with the fixed body, including notifications for
/// envelopes this system does not know.
pub async fn ingest_notification(
    State(state): State<AppState>,
    Json(payload): Json<ProviderPayload>,
) -> Result<&'static str, ApiError> {
    let notification = payload.into_notification();

    match state.store.ingest(&notification) {
        Ok(_) => Ok(ACK),
        Err(WorkflowError::UnknownEnvelope(id)) => {
            tracing::warn!(envelope_id = %id, "notification for unknown envelope, acknowledged");
            Ok(ACK)
        }
        Err(other) => Err(other.into()),
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateSignatureRequest {
    pub title: String,
    /// Base64-encoded document; required unless `template_id` is given.
    #[serde(default)]
    pub document_base64: Option<String>,
    /// Opaque caller-side document reference, persisted as-is.
    #[serde(default)]
    pub document_name: Option<String>,
    /// Provider template/workflow selector.
    #[serde(default)]
    pub template_id: Option<String>,
    #[serde(default)]
    pub callback_url: Option<String>,
    pub signers: Vec<SignerRequest>,
    /// Per-request provider settings, layered over the process
    /// configuration (request wins field-wise).
    #[serde(default)]
    pub settings: Option<ProviderConfig>,
}

#[derive(Debug, Deserialize)]
pub struct SignerRequest {
    pub email: String,
    pub full_name: String,
    /// Defaults to the signer's position (serial routing).
    #[serde(default)]
    pub signing_order: Option<u32>,
}

/// Create one envelope: resolve configuration, call the provider, and
/// persist the Signature with the backend-assigned identifier.
pub async fn create_signature(
    State(state): State<AppState>,
    Json(req): Json<CreateSignatureRequest>,
) -> Result<(StatusCode, Json<Signature>), ApiError> {
    if req.signers.is_empty() {
        return Err(ApiError::BadRequest("at least one signer is required".into()));
    }
    if req.template_id.is_none() && req.document_base64.is_none() {
        return Err(ApiError::BadRequest(
            "either document_base64 or template_id is required".into(),
        ));
    }

    let document = match &req.document_base64 {
        Some(encoded) => Some(
            BASE64
                .decode(encoded)
                .map_err(|e| ApiError::BadRequest(format!("invalid document_base64: {e}")))?,
        ),
        None => None,
    };

    let signature_type = match &req.template_id {
        Some(code) => SignatureType::template_based(code.clone()),
        None => SignatureType::document_based(),
    };
    let mut signature = Signature::new(req.title.clone(), signature_type);
    signature.document_name = req.document_name.clone();
    for (i, signer) in req.signers.iter().enumerate() {
        let order = signer.signing_order.unwrap_or(i as u32 + 1);
        if order == 0 {
            return Err(ApiError::BadRequest("signing_order must be positive".into()));
        }
        signature.add_signer(signer.email.clone(), signer.full_name.clone(), order);
    }

    let request_layer = req.settings.clone().unwrap_or_default();
    let resolved = ProviderConfig::resolve(&[&request_layer, &state.config]);
    let client = BackendClient::new(resolved)?;

    let backend_id = client
        .create_envelope(&EnvelopeRequest {
            title: &req.title,
            document: document.as_deref(),
            template_id: req.template_id.as_deref(),
            signers: &signature.signers,
            callback_url: req.callback_url.as_deref(),
        })
        .await?;

    signature.assign_backend_id(backend_id);
    state
        .store
        .insert(&signature)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    tracing::info!(
        envelope_id = %signature.signature_backend_id,
        signers = signature.signers.len(),
        "envelope created"
    );
    Ok((StatusCode::CREATED, Json(signature)))
}

pub async fn get_signature(
    State(state): State<AppState>,
    Path(envelope_id): Path<String>,
) -> Result<Json<Signature>, ApiError> {
    let signature = state
        .store
        .get(&envelope_id)?
        .ok_or_else(|| ApiError::NotFound(format!("envelope {envelope_id}")))?;
    Ok(Json(signature))
}

#[derive(Debug, Deserialize)]
pub struct SignUrlQuery {
    /// Where the provider sends the signer back afterwards.
    pub return_url: String,
}

/// Redirect a signer to the provider's signing session.
pub async fn sign_url(
    State(state): State<AppState>,
    Path((envelope_id, recipient_id)): Path<(String, String)>,
    Query(query): Query<SignUrlQuery>,
) -> Result<Redirect, ApiError> {
    let signature = state
        .store
        .get(&envelope_id)?
        .ok_or_else(|| ApiError::NotFound(format!("envelope {envelope_id}")))?;
    let signer = signature
        .signer(&recipient_id)
        .ok_or_else(|| ApiError::NotFound(format!("recipient {recipient_id}")))?;

    let client = BackendClient::new(state.config.clone())?;
    let url = client
        .recipient_view_url(
            &envelope_id,
            &recipient_id,
            &signer.email,
            &signer.full_name,
            &query.return_url,
        )
        .await?;
    Ok(Redirect::temporary(&url))
}
