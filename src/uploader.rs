//! Content-addressed upload core
//!
//! One `Uploader` lives for one build run. It resolves absolute-style asset
//! references to public delivery URLs, uploading each distinct piece of
//! content at most once. The in-memory cache holds every resolved URL under
//! two keys, the local path and the derived object name, so a second file
//! with identical bytes resolves without re-hashing checks against the store.

use crate::config::Config;
use crate::manifest::Manifest;
use crate::store::ObjectStore;
use crate::{mime, naming, Error, Result};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, info};

/// Resolves asset references against a remote object store.
///
/// Constructed in either the disabled state (references pass through
/// unchanged) or the ready state (container ensured, delivery URL prefix
/// established). `resolve` takes `&mut self`: resolution is sequential by
/// contract, and the exclusive borrow keeps the check-then-upload sequence
/// free of races by construction.
pub struct Uploader {
    inner: Option<Ready>,
}

struct Ready {
    store: Box<dyn ObjectStore>,
    base_path: PathBuf,
    url_prefix: String,
    upload_prefix: String,
    force_upload: bool,
    cache: HashMap<String, String>,
    manifest: Option<Manifest>,
}

impl Uploader {
    /// Build an uploader for one run.
    ///
    /// With `enabled: false` this returns a disabled uploader and never
    /// touches the store. Otherwise the container is created and published
    /// if absent, and the URL prefix is fixed to the configured cname or the
    /// container's delivery URL plus a trailing slash.
    pub async fn new(
        config: &Config,
        store: Box<dyn ObjectStore>,
        base_path: impl Into<PathBuf>,
    ) -> Result<Self> {
        if !config.enabled {
            info!("Uploading disabled, asset references pass through unchanged");
            return Ok(Self { inner: None });
        }
        config.validate()?;

        if !store.container_exists().await? {
            store.create_container().await?;
            store.make_container_public().await?;
        }

        let url_prefix = match &config.cname {
            Some(cname) => cname.clone(),
            None => format!("{}/", store.delivery_url().await?),
        };
        info!("Delivery URL prefix: {}", url_prefix);

        Ok(Self {
            inner: Some(Ready {
                store,
                base_path: base_path.into(),
                url_prefix,
                upload_prefix: config.upload_prefix.clone(),
                force_upload: config.force_upload,
                cache: HashMap::new(),
                manifest: None,
            }),
        })
    }

    /// Attach a cross-run manifest. No effect on a disabled uploader.
    pub fn with_manifest(mut self, manifest: Manifest) -> Self {
        if let Some(ready) = &mut self.inner {
            ready.manifest = Some(manifest);
        }
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    pub fn manifest(&self) -> Option<&Manifest> {
        self.inner.as_ref().and_then(|ready| ready.manifest.as_ref())
    }

    /// Resolve one asset reference to its public URL.
    ///
    /// References must begin with `/`, resolved against the base path. The
    /// first resolution of a distinct (path, content) pair hashes the file
    /// and uploads it unless identical content is already present; repeats
    /// are served from the cache without any store interaction. A failed
    /// upload writes nothing to the cache, so a retry starts over from
    /// hashing.
    pub async fn resolve(&mut self, reference: &str) -> Result<String> {
        match &mut self.inner {
            None => Ok(reference.to_string()),
            Some(ready) => ready.resolve(reference).await,
        }
    }

    /// Delete remote objects under the upload prefix that were not resolved
    /// in this run. Best effort; only safe after a full, exhaustive site
    /// render in the same run, since the cache is the only record of what is
    /// still referenced. Deleted objects are also dropped from the manifest
    /// so a later run cannot treat them as still present remotely. Returns
    /// the number of objects deleted.
    pub async fn delete_unused(&mut self) -> Result<usize> {
        match &mut self.inner {
            None => Ok(0),
            Some(ready) => ready.delete_unused().await,
        }
    }
}

impl Ready {
    async fn resolve(&mut self, reference: &str) -> Result<String> {
        let Some(relative) = reference.strip_prefix('/') else {
            return Err(Error::Validation(format!(
                "Asset references must begin with /, got: {}",
                reference
            )));
        };

        let local = self.base_path.join(relative);
        let local_key = local.to_string_lossy().into_owned();

        if let Some(url) = self.cache.get(&local_key) {
            debug!("Cache hit for {}", reference);
            return Ok(url.clone());
        }

        if !local.is_file() {
            return Err(Error::NotFound(local.display().to_string()));
        }

        let digest = naming::hash_file(&local)?;
        let object_name = naming::object_name(&self.upload_prefix, &digest, &local);

        // Same bytes already resolved through a different local path.
        if let Some(url) = self.cache.get(&object_name).cloned() {
            debug!("Content of {} already resolved as {}", reference, object_name);
            self.cache.insert(local_key, url.clone());
            return Ok(url);
        }

        let known_remote = self
            .manifest
            .as_ref()
            .is_some_and(|m| m.contains(&object_name));

        if self.force_upload
            || (!known_remote && !self.store.object_exists(&object_name).await?)
        {
            info!("Uploading {} as {}", reference, object_name);
            let data = std::fs::read(&local)?;
            self.store
                .put_object(&object_name, &data, mime::content_type_for(&local))
                .await?;
        }

        if self.force_upload {
            self.store.purge_object(&object_name).await?;
        }

        if let Some(manifest) = &mut self.manifest {
            manifest.record(object_name.clone());
        }

        let url = format!("{}{}", self.url_prefix, object_name);
        self.cache.insert(local_key, url.clone());
        self.cache.insert(object_name, url.clone());
        Ok(url)
    }

    async fn delete_unused(&mut self) -> Result<usize> {
        let remote = self.store.list_objects(&self.upload_prefix).await?;
        let mut deleted = 0;
        for key in remote {
            let url = format!("{}{}", self.url_prefix, key);
            if !self.cache.values().any(|cached| cached == &url) {
                info!("Deleting unused object {}", key);
                self.store.delete_object(&key).await?;
                if let Some(manifest) = &mut self.manifest {
                    manifest.remove(&key);
                }
                deleted += 1;
            }
        }
        Ok(deleted)
    }
}
