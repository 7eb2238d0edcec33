//! Content-type lookup for uploaded assets
//!
//! Static sites ship a small, predictable set of asset types; anything
//! outside the table is uploaded as an opaque binary.

use std::path::Path;

pub fn content_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.to_string_lossy().as_ref() {
        "css" => "text/css",
        "js" | "mjs" => "application/javascript",
        "json" => "application/json",
        "html" | "htm" => "text/html",
        "xml" => "application/xml",
        "txt" => "text/plain",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "ico" => "image/x-icon",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "otf" => "font/otf",
        "eot" => "application/vnd.ms-fontobject",
        "pdf" => "application/pdf",
        other => {
            if !other.is_empty() {
                tracing::debug!(
                    "No content type mapping for extension '{}', using application/octet-stream",
                    other
                );
            }
            "application/octet-stream"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_common_asset_types() {
        assert_eq!(content_type_for(&PathBuf::from("style.css")), "text/css");
        assert_eq!(
            content_type_for(&PathBuf::from("app.js")),
            "application/javascript"
        );
        assert_eq!(content_type_for(&PathBuf::from("logo.png")), "image/png");
        assert_eq!(content_type_for(&PathBuf::from("font.woff2")), "font/woff2");
    }

    #[test]
    fn test_extension_case_is_ignored() {
        assert_eq!(content_type_for(&PathBuf::from("PHOTO.JPG")), "image/jpeg");
    }

    #[test]
    fn test_unknown_extension_falls_back() {
        assert_eq!(
            content_type_for(&PathBuf::from("archive.xyz")),
            "application/octet-stream"
        );
    }

    #[test]
    fn test_no_extension_falls_back() {
        assert_eq!(
            content_type_for(&PathBuf::from("CNAME")),
            "application/octet-stream"
        );
    }
}
