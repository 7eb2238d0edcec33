use super::ObjectStore;
use crate::config::{Credentials, Datacentre};
use crate::{Error, Result};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{BucketCannedAcl, ObjectCannedAcl};
use aws_sdk_s3::{config::Region, Client as S3Client};
use tracing::{info, warn};

const PURGE_API_BASE: &str = "https://api.digitalocean.com/v2/cdn/endpoints";

/// CDN purge API access; without it edge purges are skipped.
#[derive(Debug, Clone)]
pub struct PurgeConfig {
    pub token: String,
    pub endpoint_id: String,
}

pub struct StoreClient {
    client: S3Client,
    http: reqwest::Client,
    container: String,
    region: &'static str,
    purge: Option<PurgeConfig>,
}

impl StoreClient {
    pub async fn new(
        credentials: &Credentials,
        datacentre: Datacentre,
        container: String,
        purge: Option<PurgeConfig>,
    ) -> Result<Self> {
        let provider = aws_sdk_s3::config::Credentials::new(
            credentials.username.clone(),
            credentials.api_key.clone(),
            None,
            None,
            "site-asset-uploader",
        );

        // Custom config for DigitalOcean Spaces; the real routing happens
        // through the endpoint URL, not the region name.
        let config = aws_config::defaults(BehaviorVersion::latest())
            .credentials_provider(provider)
            .region(Region::new("us-east-1"))
            .endpoint_url(datacentre.endpoint())
            .load()
            .await;

        Ok(Self {
            client: S3Client::new(&config),
            http: reqwest::Client::new(),
            container,
            region: datacentre.region(),
            purge,
        })
    }
}

#[async_trait]
impl ObjectStore for StoreClient {
    async fn container_exists(&self) -> Result<bool> {
        match self
            .client
            .head_bucket()
            .bucket(&self.container)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_not_found() {
                    Ok(false)
                } else {
                    Err(Error::Upload(format!(
                        "Failed to check container {}: {}",
                        self.container, service_err
                    )))
                }
            }
        }
    }

    async fn create_container(&self) -> Result<()> {
        self.client
            .create_bucket()
            .bucket(&self.container)
            .send()
            .await
            .map_err(|e| {
                Error::Upload(format!(
                    "Failed to create container {}: {}",
                    self.container, e
                ))
            })?;
        info!("Created container {}", self.container);
        Ok(())
    }

    async fn make_container_public(&self) -> Result<()> {
        self.client
            .put_bucket_acl()
            .bucket(&self.container)
            .acl(BucketCannedAcl::PublicRead)
            .send()
            .await
            .map_err(|e| {
                Error::Upload(format!(
                    "Failed to make container {} public: {}",
                    self.container, e
                ))
            })?;
        Ok(())
    }

    async fn delivery_url(&self) -> Result<String> {
        Ok(format!(
            "https://{}.{}.cdn.digitaloceanspaces.com",
            self.container, self.region
        ))
    }

    async fn object_exists(&self, key: &str) -> Result<bool> {
        match self
            .client
            .head_object()
            .bucket(&self.container)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_not_found() {
                    Ok(false)
                } else {
                    Err(Error::Upload(format!(
                        "Failed to check object {}: {}",
                        key, service_err
                    )))
                }
            }
        }
    }

    async fn put_object(&self, key: &str, data: &[u8], content_type: &str) -> Result<()> {
        self.client
            .put_object()
            .bucket(&self.container)
            .key(key)
            .body(ByteStream::from(data.to_vec()))
            .content_type(content_type)
            .acl(ObjectCannedAcl::PublicRead)
            .send()
            .await
            .map_err(|e| Error::Upload(format!("Failed to upload {}: {}", key, e)))?;
        Ok(())
    }

    async fn purge_object(&self, key: &str) -> Result<()> {
        let Some(purge) = &self.purge else {
            warn!(
                "No purge credentials configured, skipping edge purge of {}",
                key
            );
            return Ok(());
        };

        let url = format!("{}/{}/cache", PURGE_API_BASE, purge.endpoint_id);
        let response = self
            .http
            .delete(&url)
            .bearer_auth(&purge.token)
            .json(&serde_json::json!({ "files": [key] }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Upload(format!(
                "Edge purge of {} failed with status {}",
                key,
                response.status()
            )));
        }
        info!("Purged {} from the edge cache", key);
        Ok(())
    }

    async fn list_objects(&self, prefix: &str) -> Result<Vec<String>> {
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(&self.container)
            .prefix(prefix)
            .into_paginator()
            .send();

        let mut keys = Vec::new();
        while let Some(page) = pages.next().await {
            let page =
                page.map_err(|e| Error::Upload(format!("Failed to list objects: {}", e)))?;
            for object in page.contents() {
                if let Some(key) = object.key() {
                    keys.push(key.to_string());
                }
            }
        }
        Ok(keys)
    }

    async fn delete_object(&self, key: &str) -> Result<()> {
        self.client
            .delete_object()
            .bucket(&self.container)
            .key(key)
            .send()
            .await
            .map_err(|e| Error::Upload(format!("Failed to delete {}: {}", key, e)))?;
        Ok(())
    }
}
