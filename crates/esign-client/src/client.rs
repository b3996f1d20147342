use serde::Deserialize;
use serde_json::json;

use esign_core::config::ProviderConfig;
use esign_core::errors::ConfigError;

use crate::request::{envelope_body, EnvelopeRequest};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("provider configuration incomplete: {0}")]
    Config(#[from] ConfigError),
    #[error("signature backend unavailable: {0}")]
    Unavailable(String),
    #[error("signature backend rejected the request ({status}): {body}")]
    Rejected { status: u16, body: String },
    #[error("cannot decode provider response: {0}")]
    Decode(String),
}

/// Thin façade over the provider's envelope API.
///
/// Owns the outbound timeout; never retries — timeout and connection
/// failures surface as [`ClientError::Unavailable`] and the retry
/// decision belongs to the caller.
#[derive(Debug)]
pub struct BackendClient {
    config: ProviderConfig,
    http: reqwest::Client,
}

impl BackendClient {
    /// Validate the resolved configuration and build the HTTP client.
    ///
    /// All provider-auth fields must be populated here, and the timeout
    /// must be usable; a field left unset by every configuration layer
    /// or set to an unusable value is a [`ClientError::Config`].
    pub fn new(config: ProviderConfig) -> Result<Self, ClientError> {
        config.root_url()?;
        config.username()?;
        config.password()?;
        config.integrator_key()?;
        config.account_id()?;
        let timeout = config.timeout_duration()?;

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Unavailable(e.to_string()))?;

        Ok(Self { config, http })
    }

    /// Create and send one envelope; returns the backend-assigned
    /// envelope identifier, which the caller must persist verbatim.
    pub async fn create_envelope(&self, req: &EnvelopeRequest<'_>) -> Result<String, ClientError> {
        let url = self.endpoint("envelopes")?;
        let body = envelope_body(req);

        tracing::debug!(url = %url, signers = req.signers.len(), "creating envelope");
        let response = self
            .http
            .post(&url)
            .header("X-DocuSign-Authentication", self.auth_header()?)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let created: EnvelopeCreated = decode(response).await?;
        Ok(created.envelope_id)
    }

    /// Fetch a one-shot signing URL for a recipient of an existing
    /// envelope, to redirect the signer to the provider.
    pub async fn recipient_view_url(
        &self,
        envelope_id: &str,
        recipient_id: &str,
        email: &str,
        user_name: &str,
        return_url: &str,
    ) -> Result<String, ClientError> {
        let url = self.endpoint(&format!("envelopes/{envelope_id}/views/recipient"))?;
        let body = json!({
            "authenticationMethod": "none",
            "clientUserId": recipient_id,
            "email": email,
            "userName": user_name,
            "returnUrl": return_url,
        });

        let response = self
            .http
            .post(&url)
            .header("X-DocuSign-Authentication", self.auth_header()?)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let view: RecipientView = decode(response).await?;
        Ok(view.url)
    }

    fn endpoint(&self, path: &str) -> Result<String, ClientError> {
        let root = self.config.root_url()?.trim_end_matches('/').to_string();
        let account_id = self.config.account_id()?;
        Ok(format!("{root}/accounts/{account_id}/{path}"))
    }

    fn auth_header(&self) -> Result<String, ClientError> {
        Ok(json!({
            "Username": self.config.username()?,
            "Password": self.config.password()?,
            "IntegratorKey": self.config.integrator_key()?,
        })
        .to_string())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EnvelopeCreated {
    envelope_id: String,
}

#[derive(Debug, Deserialize)]
struct RecipientView {
    url: String,
}

fn transport_error(err: reqwest::Error) -> ClientError {
    // Timeout and connection failures are the caller-retryable class;
    // everything else transport-level is reported the same way since no
    // response was obtained.
    ClientError::Unavailable(err.to_string())
}

async fn decode<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ClientError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ClientError::Rejected {
            status: status.as_u16(),
            body,
        });
    }
    response
        .json()
        .await
        .map_err(|e| ClientError::Decode(e.to_string()))
}
