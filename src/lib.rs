//! Content-addressed uploader for static site assets
//!
//! Uploads site assets (CSS, JS, images, fonts) to an S3-compatible object
//! store, naming each object by the SHA-256 hash of its contents, and returns
//! the public CDN URL to substitute into rendered output. Identical bytes
//! upload once; re-renders are idempotent.

pub mod app;
pub mod config;
pub mod error;
pub mod manifest;
pub mod mime;
pub mod naming;
pub mod store;
pub mod uploader;

pub use error::{Error, Result};
