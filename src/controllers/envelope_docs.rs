use async_trait::async_trait;

use super::{Example, ExampleContext, ExampleError, FormInput};
use crate::api::ApiError;
use crate::api::esign::EnvelopeDocumentsResult;
use crate::manifest::ApiType;
use crate::render::Prerequisite;
use crate::session::{DocumentItem, EnvelopeDocuments, SessionContext};
use crate::workers::envelope_docs::{EnvelopeDocsArgs, get_documents};

/// eSignature example 6: list an envelope's documents.
pub struct EnvelopeDocsExample;

#[async_trait]
impl Example for EnvelopeDocsExample {
    fn eg(&self) -> &'static str {
        "eg006"
    }

    fn number(&self) -> u32 {
        6
    }

    fn api(&self) -> ApiType {
        ApiType::ESignature
    }

    fn source_file(&self) -> &'static str {
        "envelope_docs.rs"
    }

    fn prerequisite(&self, session: &SessionContext) -> Option<Prerequisite> {
        Some(Prerequisite {
            satisfied: session.envelope_id().is_some(),
            hint: "Problem: please first create an envelope. \
                   The envelope's documents are listed by this example.",
        })
    }

    async fn run(
        &self,
        ctx: &mut ExampleContext<'_>,
        _form: &FormInput,
    ) -> Result<String, ExampleError> {
        let envelope_id = ctx
            .session
            .envelope_id()
            .map(str::to_string)
            .ok_or(ApiError::Missing("envelope"))?;

        let args = EnvelopeDocsArgs {
            access_token: ctx.access_token()?,
            base_path: ctx.base_path(self.api())?,
            account_id: ctx.account_id()?,
            envelope_id: envelope_id.clone(),
        };
        let results = get_documents(args).await?;

        // Saved so a later example can download one of the documents.
        ctx.session
            .set_envelope_documents(project_documents(&envelope_id, &results));

        Ok(serde_json::to_string(&results)?)
    }
}

/// Standard pseudo-documents every envelope can be downloaded as.
fn standard_documents() -> [DocumentItem; 3] {
    [
        ("Combined", "content", "combined"),
        ("Zip archive", "zip", "archive"),
        ("PDF Portfolio", "portfolio", "portfolio"),
    ]
    .map(|(name, doc_type, document_id)| DocumentItem {
        document_id: document_id.to_string(),
        name: name.to_string(),
        doc_type: doc_type.to_string(),
    })
}

/// The session-side document list: standard entries first, then the
/// envelope's own, with the certificate given a readable name.
pub fn project_documents(envelope_id: &str, results: &EnvelopeDocumentsResult) -> EnvelopeDocuments {
    let envelope_docs = results.envelope_documents.iter().map(|doc| DocumentItem {
        document_id: doc.document_id.clone(),
        name: if doc.document_id == "certificate" {
            "Certificate of completion".to_string()
        } else {
            doc.name.clone().unwrap_or_default()
        },
        doc_type: doc.doc_type.clone().unwrap_or_default(),
    });

    EnvelopeDocuments {
        envelope_id: envelope_id.to_string(),
        documents: standard_documents().into_iter().chain(envelope_docs).collect(),
    }
}
