//! Application glue wiring configuration, store client, and uploader.

use crate::config::Config;
use crate::manifest::Manifest;
use crate::store::client::PurgeConfig;
use crate::store::{MockStoreClient, ObjectStore, StoreClient};
use crate::uploader::Uploader;
use crate::Result;
use std::path::PathBuf;
use tracing::{debug, info};

/// Resolves a build's asset references through one [`Uploader`] instance.
pub struct App {
    uploader: Uploader,
    manifest_path: Option<PathBuf>,
}

impl App {
    /// Construct the app for one build run.
    ///
    /// `dry_run` swaps the real store client for the in-memory mock so a
    /// build can be exercised without credentials or network access.
    pub async fn new(config: Config, base_path: PathBuf, dry_run: bool) -> Result<Self> {
        let store: Box<dyn ObjectStore> = if dry_run {
            info!("Dry run enabled — resolving against an in-memory store");
            Box::new(MockStoreClient::new())
        } else if config.enabled {
            let credentials = config.resolve_credentials()?;
            let purge = match (&config.purge_token, &config.purge_endpoint_id) {
                (Some(token), Some(endpoint_id)) => Some(PurgeConfig {
                    token: token.clone(),
                    endpoint_id: endpoint_id.clone(),
                }),
                _ => None,
            };
            Box::new(
                StoreClient::new(
                    &credentials,
                    config.datacentre,
                    config.container.clone(),
                    purge,
                )
                .await?,
            )
        } else {
            // Never touched; a disabled uploader ignores its store.
            Box::new(MockStoreClient::new())
        };

        let manifest_path = config.manifest.clone();
        let mut uploader = Uploader::new(&config, store, base_path).await?;
        if let Some(path) = &manifest_path {
            uploader = uploader.with_manifest(Manifest::load(path));
        }

        Ok(Self {
            uploader,
            manifest_path,
        })
    }

    /// Build an app around an existing uploader, for tests and harnesses.
    pub fn with_uploader(uploader: Uploader) -> Self {
        Self {
            uploader,
            manifest_path: None,
        }
    }

    /// Resolve references in order, returning one URL per reference.
    ///
    /// `delete_unused` additionally removes remote objects not referenced in
    /// this run; only pass it after an exhaustive render.
    pub async fn run(&mut self, references: &[String], delete_unused: bool) -> Result<Vec<String>> {
        let mut urls = Vec::with_capacity(references.len());
        for reference in references {
            let url = self.uploader.resolve(reference).await?;
            debug!("{} -> {}", reference, url);
            urls.push(url);
        }
        info!("Resolved {} asset references", urls.len());

        if delete_unused {
            let deleted = self.uploader.delete_unused().await?;
            info!("Deleted {} unused remote objects", deleted);
        }

        if let Some(path) = &self.manifest_path {
            if let Some(manifest) = self.uploader.manifest() {
                manifest.save(path)?;
                debug!("Saved manifest to {}", path.display());
            }
        }

        Ok(urls)
    }
}

#[cfg(test)]
mod tests {
    use super::App;
    use crate::config::Config;
    use crate::store::MockStoreClient;
    use crate::uploader::Uploader;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn enabled_config() -> Config {
        Config {
            enabled: true,
            container: "static".to_string(),
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn test_run_resolves_references_in_order() {
        let site = tempfile::tempdir().unwrap();
        fs::write(site.path().join("a.css"), b"a").unwrap();
        fs::write(site.path().join("b.js"), b"b").unwrap();

        let store = MockStoreClient::new().with_container();
        let uploader = Uploader::new(&enabled_config(), Box::new(store.clone()), site.path())
            .await
            .unwrap();
        let mut app = App::with_uploader(uploader);

        let urls = app
            .run(&["/a.css".to_string(), "/b.js".to_string()], false)
            .await
            .unwrap();

        assert_eq!(urls.len(), 2);
        assert!(urls[0].ends_with(".css"));
        assert!(urls[1].ends_with(".js"));
        assert_eq!(store.call_counts().uploads, 2);
    }

    #[tokio::test]
    async fn test_run_with_delete_unused_cleans_stale_objects() {
        let site = tempfile::tempdir().unwrap();
        fs::write(site.path().join("a.css"), b"a").unwrap();

        let store = MockStoreClient::new()
            .with_container()
            .with_object("stale.png", b"old".to_vec());
        let uploader = Uploader::new(&enabled_config(), Box::new(store.clone()), site.path())
            .await
            .unwrap();
        let mut app = App::with_uploader(uploader);

        app.run(&["/a.css".to_string()], true).await.unwrap();

        assert_eq!(store.object_keys().len(), 1);
        assert!(store.object_keys()[0].ends_with(".css"));
    }

    #[tokio::test]
    async fn test_dry_run_app_needs_no_credentials() {
        let site = tempfile::tempdir().unwrap();
        fs::write(site.path().join("a.css"), b"a").unwrap();

        let mut app = App::new(enabled_config(), site.path().to_path_buf(), true)
            .await
            .unwrap();
        let urls = app.run(&["/a.css".to_string()], false).await.unwrap();

        assert_eq!(urls.len(), 1);
        assert!(urls[0].starts_with("https://mock-store.example.com/"));
    }

    #[tokio::test]
    async fn test_disabled_app_passes_references_through() {
        let mut app = App::new(Config::default(), "/tmp".into(), false)
            .await
            .unwrap();

        let urls = app.run(&["/i/logo.png".to_string()], false).await.unwrap();
        assert_eq!(urls, vec!["/i/logo.png".to_string()]);
    }
}
