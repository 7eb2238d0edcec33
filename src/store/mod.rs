//! Object store integration
//!
//! Abstracts the remote container the uploader writes to. The real client
//! talks to S3-compatible storage (DigitalOcean Spaces); the mock keeps
//! everything in memory for tests and dry runs.

pub mod client;
pub mod mock;

pub use client::StoreClient;
pub use mock::MockStoreClient;

use crate::Result;
use async_trait::async_trait;

/// Remote container operations the uploader needs.
///
/// Any object-storage-with-CDN service exposing these nine operations
/// satisfies the contract. Implementations hold the container name; keys are
/// container-relative object names.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn container_exists(&self) -> Result<bool>;
    async fn create_container(&self) -> Result<()>;
    /// Publish the container through the delivery network.
    async fn make_container_public(&self) -> Result<()>;
    /// Public base URL the container is served from, without trailing slash.
    async fn delivery_url(&self) -> Result<String>;
    async fn object_exists(&self, key: &str) -> Result<bool>;
    async fn put_object(&self, key: &str, data: &[u8], content_type: &str) -> Result<()>;
    /// Invalidate edge caches for an object. Best effort.
    async fn purge_object(&self, key: &str) -> Result<()>;
    async fn list_objects(&self, prefix: &str) -> Result<Vec<String>>;
    async fn delete_object(&self, key: &str) -> Result<()>;
}
