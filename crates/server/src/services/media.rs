//! Cloudinary client for image upload and transformation.
//!
//! Product, category, hero, and logo images are posted here as signed
//! uploads. A width-limit transformation is applied server-side by the CDN
//! so oversized camera uploads never reach the storefront.

use reqwest::multipart;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::config::CloudinaryConfig;

/// Incoming transformation applied to every upload.
const UPLOAD_TRANSFORMATION: &str = "c_limit,w_1600,q_auto";

/// Outbound request timeout. Uploads carry image bytes, so this is longer
/// than the gateway timeout.
const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(60);

/// Errors that can occur when uploading to the CDN.
#[derive(Debug, Error)]
pub enum MediaError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Upload succeeded but the response had no URL.
    #[error("upload response missing secure_url")]
    MissingUrl,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
}

/// Cloudinary API client.
#[derive(Clone)]
pub struct MediaClient {
    client: reqwest::Client,
    cloud_name: String,
    api_key: String,
    api_secret: SecretString,
}

impl MediaClient {
    /// Create a new media client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &CloudinaryConfig) -> Result<Self, MediaError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            cloud_name: config.cloud_name.clone(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
        })
    }

    /// Upload image bytes into `folder`, returning the CDN URL.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the API rejects the upload.
    pub async fn upload_image(
        &self,
        bytes: Vec<u8>,
        file_name: &str,
        folder: &str,
    ) -> Result<String, MediaError> {
        let timestamp = chrono::Utc::now().timestamp().to_string();

        // Signed params, excluding file/api_key per the upload API contract.
        let params = [
            ("folder".to_owned(), folder.to_owned()),
            ("timestamp".to_owned(), timestamp.clone()),
            ("transformation".to_owned(), UPLOAD_TRANSFORMATION.to_owned()),
        ];
        let signature = sign_params(&params, self.api_secret.expose_secret());

        let form = multipart::Form::new()
            .part(
                "file",
                multipart::Part::bytes(bytes).file_name(file_name.to_owned()),
            )
            .text("folder", folder.to_owned())
            .text("timestamp", timestamp)
            .text("transformation", UPLOAD_TRANSFORMATION)
            .text("api_key", self.api_key.clone())
            .text("signature_algorithm", "sha256")
            .text("signature", signature);

        let url = format!(
            "https://api.cloudinary.com/v1_1/{}/image/upload",
            self.cloud_name
        );
        let response = self.client.post(url).multipart(form).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(MediaError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: UploadResponse = response.json().await?;
        body.secure_url.ok_or(MediaError::MissingUrl)
    }
}

/// Compute the Cloudinary request signature: SHA-256 over the
/// alphabetically-sorted `key=value` pairs joined by `&`, with the API
/// secret appended.
fn sign_params(params: &[(String, String)], api_secret: &str) -> String {
    let mut sorted: Vec<&(String, String)> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));

    let message: String = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(message.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_params_sorts_keys() {
        let unsorted = [
            ("timestamp".to_owned(), "1700000000".to_owned()),
            ("folder".to_owned(), "products".to_owned()),
        ];
        let sorted = [
            ("folder".to_owned(), "products".to_owned()),
            ("timestamp".to_owned(), "1700000000".to_owned()),
        ];
        assert_eq!(sign_params(&unsorted, "secret"), sign_params(&sorted, "secret"));
    }

    #[test]
    fn test_sign_params_depends_on_secret() {
        let params = [("folder".to_owned(), "products".to_owned())];
        assert_ne!(sign_params(&params, "secret-a"), sign_params(&params, "secret-b"));
    }
}
