use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::auth::oauth::urlencoded;

/// Structured error payload returned by the platform on failed calls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(rename = "errorCode", alias = "error_code", alias = "error", default)]
    pub error_code: Option<String>,
    #[serde(alias = "error_description", default)]
    pub message: Option<String>,
}

/// Why an API call failed.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The platform answered with a non-success status.
    #[error("API request failed with status {status}")]
    Response {
        status: u16,
        body: Option<ErrorBody>,
    },
    /// The request never got a usable answer.
    #[error("API request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// Something the call needs is not available yet.
    #[error("no {0} available")]
    Missing(&'static str),
}

impl ApiError {
    /// The structured response body, when the platform sent one.
    pub fn body(&self) -> Option<&ErrorBody> {
        match self {
            ApiError::Response { body, .. } => body.as_ref(),
            _ => None,
        }
    }

    pub fn error_code(&self) -> Option<&str> {
        self.body().and_then(|b| b.error_code.as_deref())
    }

    pub fn error_message(&self) -> Option<&str> {
        self.body().and_then(|b| b.message.as_deref())
    }
}

/// One client per worker invocation. Carries the base path and bearer header.
pub struct ApiClient {
    http: reqwest::Client,
    base_path: String,
    authorization: String,
}

impl ApiClient {
    pub fn new(base_path: &str, access_token: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_path: base_path.trim_end_matches('/').to_string(),
            authorization: format!("Bearer {access_token}"),
        }
    }

    /// GET `path` with the given query pairs and decode the JSON answer.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let url = self.url(path, query);
        debug!(%url, "GET");
        let req = self.http.get(url);
        self.send(req).await
    }

    /// POST a JSON body to `path` and decode the JSON answer.
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path, &[]);
        debug!(%url, "POST");
        let req = self.http.post(url).json(body);
        self.send(req).await
    }

    fn url(&self, path: &str, query: &[(&str, &str)]) -> String {
        let mut url = format!("{}{}", self.base_path, path);
        if !query.is_empty() {
            let qs = query
                .iter()
                .map(|(k, v)| format!("{}={}", k, urlencoded(v)))
                .collect::<Vec<_>>()
                .join("&");
            url.push('?');
            url.push_str(&qs);
        }
        url
    }

    async fn send<T: DeserializeOwned>(&self, req: reqwest::RequestBuilder) -> Result<T, ApiError> {
        let resp = req
            .header("authorization", &self.authorization)
            .header("accept", "application/json")
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            let body = serde_json::from_str::<ErrorBody>(&text).ok();
            debug!(status = status.as_u16(), ?body, "API error response");
            return Err(ApiError::Response {
                status: status.as_u16(),
                body,
            });
        }

        Ok(resp.json().await?)
    }
}

/// Percent-encode one path segment.
pub(crate) fn segment(s: &str) -> String {
    urlencoded(s)
}
