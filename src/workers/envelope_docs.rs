use crate::api::esign::{self, EnvelopeDocumentsResult};
use crate::api::{ApiClient, ApiError};

#[derive(Debug, Clone)]
pub struct EnvelopeDocsArgs {
    pub access_token: String,
    /// eSignature REST base, e.g. `https://demo.docusign.net/restapi`.
    pub base_path: String,
    pub account_id: String,
    pub envelope_id: String,
}

/// List the documents of one envelope.
pub async fn get_documents(args: EnvelopeDocsArgs) -> Result<EnvelopeDocumentsResult, ApiError> {
    let client = ApiClient::new(&args.base_path, &args.access_token);
    esign::list_documents(&client, &args.account_id, &args.envelope_id).await
}
