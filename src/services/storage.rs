use crate::config::StorageConfig;
use anyhow::{anyhow, Result};
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use std::time::Duration;
use uuid::Uuid;

/// One entry of a bucket listing. The storage API returns more metadata,
/// only the name matters for existence checks.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageObject {
    pub name: String,
}

/// Client for the object store's REST API: list-by-name, upload, delete,
/// and public URL construction. Every request carries a bounded timeout.
#[derive(Debug, Clone)]
pub struct StorageClient {
    client: Client,
    base_url: String,
    bucket: String,
    service_key: String,
}

impl StorageClient {
    pub fn new(config: &StorageConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent("qbank-rs/0.1")
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            bucket: config.bucket.clone(),
            service_key: config.service_key.clone(),
        })
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        if self.service_key.is_empty() {
            builder
        } else {
            builder
                .bearer_auth(&self.service_key)
                .header("apikey", &self.service_key)
        }
    }

    /// Prefix under which stored objects are publicly reachable. File
    /// references starting with this prefix are treated as store-backed.
    pub fn public_prefix(&self) -> String {
        format!("{}/object/public/{}/", self.base_url, self.bucket)
    }

    pub fn public_url(&self, object_name: &str) -> String {
        format!(
            "{}{}",
            self.public_prefix(),
            urlencoding::encode(object_name)
        )
    }

    /// List bucket entries whose name matches the search term.
    pub async fn list(&self, search: &str) -> Result<Vec<StorageObject>> {
        let url = format!("{}/object/list/{}", self.base_url, self.bucket);
        let response = self
            .authed(self.client.post(&url))
            .json(&serde_json::json!({
                "prefix": "",
                "limit": 100,
                "search": search,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "storage list failed with status {}",
                response.status()
            ));
        }

        Ok(response.json().await?)
    }

    pub async fn upload(
        &self,
        object_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<()> {
        let url = format!(
            "{}/object/{}/{}",
            self.base_url,
            self.bucket,
            urlencoding::encode(object_name)
        );
        let response = self
            .authed(self.client.post(&url))
            .header("content-type", content_type)
            .body(bytes)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "storage upload failed with status {}",
                response.status()
            ));
        }

        Ok(())
    }

    pub async fn delete(&self, object_name: &str) -> Result<()> {
        let url = format!(
            "{}/object/{}/{}",
            self.base_url,
            self.bucket,
            urlencoding::encode(object_name)
        );
        let response = self.authed(self.client.delete(&url)).send().await?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "storage delete failed with status {}",
                response.status()
            ));
        }

        Ok(())
    }
}

/// Keep filenames to a conservative character set before they become
/// object keys.
pub fn sanitize_file_name(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    let trimmed = sanitized.trim_matches(|c| c == '.' || c == '_');
    if trimmed.is_empty() {
        "paper.pdf".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Object keys get a UUID prefix so re-uploads of the same filename never
/// collide or silently overwrite.
pub fn unique_object_name(original: &str) -> String {
    format!("{}_{}", Uuid::new_v4(), sanitize_file_name(original))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_keeps_safe_characters() {
        assert_eq!(sanitize_file_name("mid1-2023.pdf"), "mid1-2023.pdf");
        assert_eq!(
            sanitize_file_name("Data Structures (2023).pdf"),
            "Data_Structures__2023_.pdf"
        );
    }

    #[test]
    fn test_sanitize_strips_path_tricks() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "etc_passwd");
        assert_eq!(sanitize_file_name("..."), "paper.pdf");
        assert_eq!(sanitize_file_name(""), "paper.pdf");
    }

    #[test]
    fn test_unique_object_names_differ() {
        let a = unique_object_name("exam.pdf");
        let b = unique_object_name("exam.pdf");
        assert_ne!(a, b);
        assert!(a.ends_with("_exam.pdf"));
    }
}
