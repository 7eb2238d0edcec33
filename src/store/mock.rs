use super::ObjectStore;
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Per-operation call counters, for asserting exactly how often the
/// uploader touched the store.
#[derive(Debug, Default, Clone)]
pub struct StoreCallCounts {
    pub exists_checks: usize,
    pub uploads: usize,
    pub purges: usize,
    pub lists: usize,
    pub deletes: usize,
    pub container_creates: usize,
}

#[derive(Clone)]
pub struct MockStoreClient {
    objects: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    container_exists: Arc<Mutex<bool>>,
    container_public: Arc<Mutex<bool>>,
    delivery_url: String,
    counts: Arc<Mutex<StoreCallCounts>>,
    fail_uploads: Arc<Mutex<bool>>,
}

impl MockStoreClient {
    pub fn new() -> Self {
        Self {
            objects: Arc::new(Mutex::new(HashMap::new())),
            container_exists: Arc::new(Mutex::new(false)),
            container_public: Arc::new(Mutex::new(false)),
            delivery_url: "https://mock-store.example.com".to_string(),
            counts: Arc::new(Mutex::new(StoreCallCounts::default())),
            fail_uploads: Arc::new(Mutex::new(false)),
        }
    }

    pub fn with_delivery_url(mut self, url: impl Into<String>) -> Self {
        self.delivery_url = url.into();
        self
    }

    pub fn with_container(self) -> Self {
        *self.container_exists.lock().unwrap() = true;
        self
    }

    pub fn with_object(self, key: impl Into<String>, content: Vec<u8>) -> Self {
        self.objects.lock().unwrap().insert(key.into(), content);
        self
    }

    pub fn with_upload_failure(self, fail: bool) -> Self {
        *self.fail_uploads.lock().unwrap() = fail;
        self
    }

    pub fn set_upload_failure(&self, fail: bool) {
        *self.fail_uploads.lock().unwrap() = fail;
    }

    pub fn call_counts(&self) -> StoreCallCounts {
        self.counts.lock().unwrap().clone()
    }

    pub fn is_container_public(&self) -> bool {
        *self.container_public.lock().unwrap()
    }

    pub fn object_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.lock().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn object_content(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.lock().unwrap().get(key).cloned()
    }
}

impl Default for MockStoreClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObjectStore for MockStoreClient {
    async fn container_exists(&self) -> Result<bool> {
        Ok(*self.container_exists.lock().unwrap())
    }

    async fn create_container(&self) -> Result<()> {
        self.counts.lock().unwrap().container_creates += 1;
        *self.container_exists.lock().unwrap() = true;
        Ok(())
    }

    async fn make_container_public(&self) -> Result<()> {
        *self.container_public.lock().unwrap() = true;
        Ok(())
    }

    async fn delivery_url(&self) -> Result<String> {
        Ok(self.delivery_url.clone())
    }

    async fn object_exists(&self, key: &str) -> Result<bool> {
        self.counts.lock().unwrap().exists_checks += 1;
        Ok(self.objects.lock().unwrap().contains_key(key))
    }

    async fn put_object(&self, key: &str, data: &[u8], _content_type: &str) -> Result<()> {
        if *self.fail_uploads.lock().unwrap() {
            return Err(Error::Upload(format!("Mock upload failure for {}", key)));
        }
        self.counts.lock().unwrap().uploads += 1;
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), data.to_vec());
        Ok(())
    }

    async fn purge_object(&self, _key: &str) -> Result<()> {
        self.counts.lock().unwrap().purges += 1;
        Ok(())
    }

    async fn list_objects(&self, prefix: &str) -> Result<Vec<String>> {
        self.counts.lock().unwrap().lists += 1;
        let mut keys: Vec<String> = self
            .objects
            .lock()
            .unwrap()
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect();
        keys.sort();
        Ok(keys)
    }

    async fn delete_object(&self, key: &str) -> Result<()> {
        self.counts.lock().unwrap().deletes += 1;
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_store_upload_and_exists() {
        let store = MockStoreClient::new();

        assert!(!store.object_exists("a.css").await.unwrap());
        store.put_object("a.css", b"body{}", "text/css").await.unwrap();
        assert!(store.object_exists("a.css").await.unwrap());

        let counts = store.call_counts();
        assert_eq!(counts.uploads, 1);
        assert_eq!(counts.exists_checks, 2);
        assert_eq!(store.object_content("a.css").unwrap(), b"body{}".to_vec());
    }

    #[tokio::test]
    async fn test_mock_store_container_lifecycle() {
        let store = MockStoreClient::new();

        assert!(!store.container_exists().await.unwrap());
        store.create_container().await.unwrap();
        store.make_container_public().await.unwrap();
        assert!(store.container_exists().await.unwrap());
        assert!(store.is_container_public());
        assert_eq!(store.call_counts().container_creates, 1);
    }

    #[tokio::test]
    async fn test_mock_store_list_respects_prefix() {
        let store = MockStoreClient::new()
            .with_object("www/a.css", b"a".to_vec())
            .with_object("www/b.js", b"b".to_vec())
            .with_object("other/c.png", b"c".to_vec());

        let listed = store.list_objects("www/").await.unwrap();
        assert_eq!(listed, vec!["www/a.css".to_string(), "www/b.js".to_string()]);
    }

    #[tokio::test]
    async fn test_mock_store_delete() {
        let store = MockStoreClient::new().with_object("stale.png", b"x".to_vec());

        store.delete_object("stale.png").await.unwrap();
        assert!(store.object_keys().is_empty());
        assert_eq!(store.call_counts().deletes, 1);
    }

    #[tokio::test]
    async fn test_mock_store_upload_failure() {
        let store = MockStoreClient::new().with_upload_failure(true);

        let err = store.put_object("a.css", b"x", "text/css").await.unwrap_err();
        assert!(matches!(err, Error::Upload(_)));
        assert_eq!(store.call_counts().uploads, 0);

        store.set_upload_failure(false);
        store.put_object("a.css", b"x", "text/css").await.unwrap();
        assert_eq!(store.call_counts().uploads, 1);
    }
}
