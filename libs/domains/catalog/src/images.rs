//! Image store adapter.
//!
//! Product images are uploaded to Cloudinary over its HTTP upload API with
//! signed requests. The [`ImageStore`] trait keeps the service layer unaware
//! of the provider so tests can swap in a mock.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{CatalogError, CatalogResult};

const IMAGE_FORMAT: &str = "webp";
const IMAGE_QUALITY: &str = "auto:good";

/// Credentials and addressing for a Cloudinary account.
#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

impl CloudinaryConfig {
    pub fn new(
        cloud_name: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Self {
        Self {
            cloud_name: cloud_name.into(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        }
    }

    fn upload_url(&self) -> String {
        format!(
            "https://api.cloudinary.com/v1_1/{}/image/upload",
            self.cloud_name
        )
    }
}

/// Stores a product image and returns its public URL.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Uploads one image. `index` is the position of the file in the
    /// submitted form and determines the stored image name.
    async fn upload(&self, data: Bytes, product_id: Uuid, index: usize) -> CatalogResult<String>;
}

pub struct CloudinaryImageStore {
    config: CloudinaryConfig,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

impl CloudinaryImageStore {
    pub fn new(config: CloudinaryConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn folder(product_id: Uuid) -> String {
        format!("bazar-app/products/{product_id}")
    }

    fn public_id(index: usize) -> String {
        format!("img-{index}")
    }

    /// Signs the request parameters the way Cloudinary expects: sort the
    /// `key=value` pairs, join with `&`, append the API secret, hash.
    fn sign(&self, params: &[(&str, &str)]) -> String {
        let mut pairs: Vec<String> = params.iter().map(|(k, v)| format!("{k}={v}")).collect();
        pairs.sort();
        let payload = format!("{}{}", pairs.join("&"), self.config.api_secret);
        let digest = Sha256::digest(payload.as_bytes());
        digest.iter().map(|b| format!("{b:02x}")).collect()
    }
}

#[async_trait]
impl ImageStore for CloudinaryImageStore {
    #[instrument(skip(self, data), fields(bytes = data.len()))]
    async fn upload(&self, data: Bytes, product_id: Uuid, index: usize) -> CatalogResult<String> {
        let timestamp = Utc::now().timestamp().to_string();
        let folder = Self::folder(product_id);
        let public_id = Self::public_id(index);

        let signature = self.sign(&[
            ("folder", folder.as_str()),
            ("format", IMAGE_FORMAT),
            ("public_id", public_id.as_str()),
            ("quality", IMAGE_QUALITY),
            ("timestamp", timestamp.as_str()),
        ]);

        let file = reqwest::multipart::Part::bytes(data.to_vec()).file_name(public_id.clone());
        let form = reqwest::multipart::Form::new()
            .part("file", file)
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp)
            .text("signature", signature)
            .text("signature_algorithm", "sha256")
            .text("folder", folder)
            .text("public_id", public_id)
            .text("format", IMAGE_FORMAT)
            .text("quality", IMAGE_QUALITY);

        let response = self
            .client
            .post(self.config.upload_url())
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::ImageStore(format!(
                "upload failed with {status}: {body}"
            )));
        }

        let uploaded: UploadResponse = response.json().await?;
        tracing::info!(product_id = %product_id, index, "Image uploaded");
        Ok(uploaded.secure_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> CloudinaryImageStore {
        CloudinaryImageStore::new(CloudinaryConfig::new("demo-cloud", "key123", "secret456"))
    }

    #[test]
    fn upload_url_targets_the_cloud() {
        let store = store();
        assert_eq!(
            store.config.upload_url(),
            "https://api.cloudinary.com/v1_1/demo-cloud/image/upload"
        );
    }

    #[test]
    fn folder_and_public_id_follow_naming_scheme() {
        let id = Uuid::now_v7();
        assert_eq!(
            CloudinaryImageStore::folder(id),
            format!("bazar-app/products/{id}")
        );
        assert_eq!(CloudinaryImageStore::public_id(0), "img-0");
        assert_eq!(CloudinaryImageStore::public_id(4), "img-4");
    }

    #[test]
    fn signature_is_order_independent() {
        let store = store();
        let forward = store.sign(&[("folder", "a"), ("timestamp", "123")]);
        let reversed = store.sign(&[("timestamp", "123"), ("folder", "a")]);
        assert_eq!(forward, reversed);
    }

    #[test]
    fn signature_is_sha256_hex() {
        let store = store();
        let signature = store.sign(&[("folder", "a"), ("timestamp", "123")]);
        assert_eq!(signature.len(), 64);
        assert!(signature.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn signature_depends_on_secret() {
        let a = store().sign(&[("timestamp", "123")]);
        let other =
            CloudinaryImageStore::new(CloudinaryConfig::new("demo-cloud", "key123", "different"));
        let b = other.sign(&[("timestamp", "123")]);
        assert_ne!(a, b);
    }
}
