//! Thumbnail downloads to content-addressed files.
//!
//! Each image is stored as `<sha256(img_url)>.<format>`, so fetching the same
//! image again rewrites the same file instead of adding a new one.

use crate::error::Result;
use crate::models::Article;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use std::path::PathBuf;
use tokio::fs;
use tracing::{info, instrument};

/// Used when neither the response header nor the bytes identify the format.
const FALLBACK_EXTENSION: &str = "png";

#[derive(Debug, Clone)]
pub struct ImageDownloader {
    client: Client,
    images_dir: PathBuf,
}

impl ImageDownloader {
    pub fn new(client: Client, images_dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            images_dir: images_dir.into(),
        }
    }

    /// Download the article's image. `Ok(None)` when the article has none.
    ///
    /// Non-2xx responses are returned as errors; the caller decides whether
    /// that aborts anything.
    #[instrument(level = "info", skip_all, fields(img_url = article.img_url().unwrap_or_default()))]
    pub async fn download(&self, article: &Article) -> Result<Option<PathBuf>> {
        let (Some(img_url), Some(image_hash)) = (article.img_url(), article.image_hash()) else {
            return Ok(None);
        };

        info!("Download image");
        let response = self.client.get(img_url).send().await?.error_for_status()?;
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let bytes = response.bytes().await?;

        let extension = image_extension(content_type.as_deref(), &bytes);
        let path = self.images_dir.join(format!("{image_hash}.{extension}"));

        fs::create_dir_all(&self.images_dir).await?;
        fs::write(&path, &bytes).await?;
        info!(path = %path.display(), bytes = bytes.len(), "Create image file");

        Ok(Some(path))
    }
}

/// File extension for a downloaded image: the `Content-Type` when it names
/// an image, else the magic bytes, else `png`.
pub fn image_extension(content_type: Option<&str>, bytes: &[u8]) -> &'static str {
    content_type
        .and_then(extension_from_mime)
        .or_else(|| sniff_extension(bytes))
        .unwrap_or(FALLBACK_EXTENSION)
}

fn extension_from_mime(content_type: &str) -> Option<&'static str> {
    let mime = content_type.split(';').next()?.trim().to_ascii_lowercase();
    match mime.as_str() {
        "image/jpeg" | "image/jpg" | "image/pjpeg" => Some("jpeg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        "image/avif" => Some("avif"),
        "image/bmp" => Some("bmp"),
        "image/svg+xml" => Some("svg"),
        _ => None,
    }
}

fn sniff_extension(bytes: &[u8]) -> Option<&'static str> {
    match bytes {
        [0xFF, 0xD8, 0xFF, ..] => Some("jpeg"),
        [0x89, b'P', b'N', b'G', ..] => Some("png"),
        [b'G', b'I', b'F', b'8', ..] => Some("gif"),
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some("webp"),
        [b'B', b'M', ..] => Some("bmp"),
        _ => None,
    }
}
