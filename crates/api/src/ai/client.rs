//! HTTP client for the AI product-content endpoint.
//!
//! Requests are sent as JSON when only image URLs are involved, and as
//! `multipart/form-data` (an `inputs` JSON part plus one `images` part per
//! file) when binary images are attached. A response is only accepted when
//! every content field is present.

use std::time::Duration;

use atelier_core::ai_content::{
    AiInputs, GeneratedContent, IncompleteContent, RawGeneratedContent, RequestEncoding,
};
use reqwest::multipart::{Form, Part};

/// A binary image attached to a generation request.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Errors from the AI content client.
#[derive(Debug, thiserror::Error)]
pub enum AiClientError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("AI content request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service returned a non-2xx status code.
    #[error("AI content service error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The inputs could not be encoded.
    #[error("Failed to encode generation inputs: {0}")]
    Encode(#[from] serde_json::Error),

    /// The response was missing one or more content fields.
    #[error(transparent)]
    Incomplete(#[from] IncompleteContent),
}

/// HTTP client for the content generation endpoint.
#[derive(Debug, Clone)]
pub struct AiContentClient {
    client: reqwest::Client,
    endpoint: String,
}

impl AiContentClient {
    /// Create a client for `endpoint` with a per-request timeout.
    pub fn new(endpoint: String, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }

    /// Generate product content from `inputs` and any attached images.
    pub async fn generate(
        &self,
        inputs: &AiInputs,
        uploads: Vec<ImageUpload>,
    ) -> Result<GeneratedContent, AiClientError> {
        let request = self.client.post(&self.endpoint);
        let request = match RequestEncoding::for_uploads(uploads.len()) {
            RequestEncoding::Json => request.json(inputs),
            RequestEncoding::Multipart => request.multipart(Self::build_form(inputs, uploads)?),
        };

        let response = request.send().await?;
        let raw: RawGeneratedContent = Self::parse_response(response).await?;
        Ok(GeneratedContent::try_from(raw)?)
    }

    // ---- private helpers ----

    fn build_form(inputs: &AiInputs, uploads: Vec<ImageUpload>) -> Result<Form, AiClientError> {
        let mut form = Form::new().text("inputs", serde_json::to_string(inputs)?);
        for upload in uploads {
            let mut part = Part::bytes(upload.bytes).file_name(upload.filename);
            if let Some(content_type) = upload.content_type {
                part = part.mime_str(&content_type)?;
            }
            form = form.part("images", part);
        }
        Ok(form)
    }

    /// Ensure the response has a success status code.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, AiClientError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(AiClientError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, AiClientError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}
