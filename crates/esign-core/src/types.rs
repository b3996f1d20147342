use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::status::Status;

/// Classifies a signature workflow variant.
///
/// The backend code selects which provider template/workflow to use.
/// Immutable after creation; created via configuration, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureType {
    pub id: Uuid,
    /// Provider template/workflow selector, when template-based.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend_code: Option<String>,
}

impl SignatureType {
    pub fn document_based() -> Self {
        Self {
            id: Uuid::new_v4(),
            backend_code: None,
        }
    }

    pub fn template_based(backend_code: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            backend_code: Some(backend_code.into()),
        }
    }
}

/// One document-signing transaction (an envelope).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signature {
    pub id: Uuid,
    pub document_title: String,
    /// Opaque caller-supplied document reference; the document itself is
    /// not stored here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_name: Option<String>,
    /// Backend-assigned envelope identifier. Empty until the creation
    /// call succeeds, non-empty and immutable afterwards.
    #[serde(default)]
    pub signature_backend_id: String,
    pub status: Status,
    pub status_datetime: DateTime<Utc>,
    pub signature_type: SignatureType,
    pub signers: Vec<Signer>,
}

impl Signature {
    pub fn new(document_title: impl Into<String>, signature_type: SignatureType) -> Self {
        Self {
            id: Uuid::new_v4(),
            document_title: document_title.into(),
            document_name: None,
            signature_backend_id: String::new(),
            status: Status::Draft,
            status_datetime: Utc::now(),
            signature_type,
            signers: Vec::new(),
        }
    }

    /// Record the backend-assigned envelope identifier.
    ///
    /// The identifier is write-once: recording a second, different value
    /// is a caller bug.
    pub fn assign_backend_id(&mut self, backend_id: impl Into<String>) {
        let backend_id = backend_id.into();
        assert!(
            self.signature_backend_id.is_empty() || self.signature_backend_id == backend_id,
            "signature_backend_id is immutable once set"
        );
        self.signature_backend_id = backend_id;
    }

    pub fn add_signer(
        &mut self,
        email: impl Into<String>,
        full_name: impl Into<String>,
        signing_order: u32,
    ) {
        self.signers.push(Signer {
            id: Uuid::new_v4(),
            email: email.into(),
            full_name: full_name.into(),
            signing_order,
            status: Status::Draft,
            status_datetime: Utc::now(),
            status_details: String::new(),
        });
    }

    /// Find a signer by its opaque recipient identifier.
    ///
    /// Matching is keyed on the identifier echoed back by the provider,
    /// never on email, to tolerate email reuse and typos.
    pub fn signer_mut(&mut self, recipient_id: &str) -> Option<&mut Signer> {
        self.signers
            .iter_mut()
            .find(|s| s.id.to_string() == recipient_id)
    }

    pub fn signer(&self, recipient_id: &str) -> Option<&Signer> {
        self.signers.iter().find(|s| s.id.to_string() == recipient_id)
    }
}

/// One recipient within an envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signer {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    /// Positive routing order: equal orders sign in parallel, ascending
    /// distinct orders sign serially.
    pub signing_order: u32,
    pub status: Status,
    pub status_datetime: DateTime<Utc>,
    /// Free-text detail for the current status (decline reason).
    #[serde(default)]
    pub status_details: String,
}
