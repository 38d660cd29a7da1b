use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::client::{ApiClient, ApiError, segment};

/// Answer of the list-envelope-documents call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeDocumentsResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub envelope_id: Option<String>,
    #[serde(default)]
    pub envelope_documents: Vec<EnvelopeDocument>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeDocument {
    pub document_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `GET /v2.1/accounts/{accountId}/envelopes/{envelopeId}/documents`
pub async fn list_documents(
    client: &ApiClient,
    account_id: &str,
    envelope_id: &str,
) -> Result<EnvelopeDocumentsResult, ApiError> {
    let path = format!(
        "/v2.1/accounts/{}/envelopes/{}/documents",
        segment(account_id),
        segment(envelope_id)
    );
    client.get_json(&path, &[]).await
}
