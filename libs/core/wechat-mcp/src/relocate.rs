//! Image relocation: moving embedded images onto the WeChat media store.
//!
//! The HTML parser is only used to FIND image references in document order;
//! rewriting swaps the `src` attribute value by plain substitution so every
//! byte outside the touched attributes stays as rendered.

use crate::client::WeChatApi;
use crate::error::{Error, Result};
use crate::types::{AccessToken, UploadResult};
use futures::future::join_all;
use scraper::{Html, Selector};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Host of the WeChat media CDN; images already served from here are left
/// untouched.
pub const PLATFORM_CDN_HOST: &str = "mmbiz.qpic.cn";

/// Host-to-container path prefix substitution for local image references.
#[derive(Debug, Clone)]
pub struct PathMapping {
    pub host_prefix: String,
    pub container_prefix: String,
}

/// Outcome of relocating the images of one rendered article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelocatedHtml {
    pub html: String,
    /// Identifier of the first image in document order: its uploaded media
    /// id, or its existing URL when already CDN-hosted. Used as the fallback
    /// cover. `None` when the article embeds no images.
    pub first_media_id: Option<String>,
}

pub struct ImageRelocator {
    api: Arc<dyn WeChatApi>,
    path_mapping: Option<PathMapping>,
}

impl ImageRelocator {
    pub fn new(api: Arc<dyn WeChatApi>, path_mapping: Option<PathMapping>) -> Self {
        Self { api, path_mapping }
    }

    /// Upload every non-CDN image and rewrite its `src` to the stored URL.
    ///
    /// Uploads of distinct sources run concurrently and are all settled
    /// before this returns; a single failure discards the whole result.
    pub async fn relocate(&self, html: &str, token: &AccessToken) -> Result<RelocatedHtml> {
        // Fast path: skip DOM parsing entirely for image-free articles.
        if !html.contains("<img") {
            return Ok(RelocatedHtml {
                html: html.to_string(),
                first_media_id: None,
            });
        }

        let sources = collect_image_sources(html);
        if sources.is_empty() {
            return Ok(RelocatedHtml {
                html: html.to_string(),
                first_media_id: None,
            });
        }
        debug!("relocating {} image reference(s)", sources.len());

        let mut pending: Vec<String> = Vec::new();
        for src in &sources {
            if !is_platform_hosted(src) && !pending.contains(src) {
                pending.push(src.clone());
            }
        }

        let uploads = pending.iter().map(|src| self.upload_source(src, token));
        let results = join_all(uploads).await;

        let mut uploaded: HashMap<String, UploadResult> = HashMap::new();
        for (src, result) in pending.iter().zip(results) {
            uploaded.insert(src.clone(), result?);
        }

        let first_media_id = sources.first().and_then(|src| {
            if is_platform_hosted(src) {
                Some(src.clone())
            } else {
                uploaded.get(src).map(|upload| upload.media_id.clone())
            }
        });

        let mut rewritten = html.to_string();
        for (src, upload) in &uploaded {
            rewritten = rewrite_src(&rewritten, src, &upload.url);
        }

        Ok(RelocatedHtml {
            html: rewritten,
            first_media_id,
        })
    }

    async fn upload_source(&self, src: &str, token: &AccessToken) -> Result<UploadResult> {
        let (bytes, filename) = self.resolve_source(src).await?;
        self.api.upload_material(bytes, &filename, token).await
    }

    /// Resolve an image reference to its bytes and an upload filename.
    ///
    /// Remote URLs are downloaded; local references go through the
    /// host-to-container prefix substitution before the file is read.
    pub async fn resolve_source(&self, reference: &str) -> Result<(Vec<u8>, String)> {
        if reference.starts_with("http://") || reference.starts_with("https://") {
            let bytes = self.api.fetch_image(reference).await?;
            Ok((bytes, filename_from(reference)))
        } else {
            let path = self.map_host_path(reference);
            let bytes = tokio::fs::read(&path).await.map_err(|source| Error::Io {
                path: path.clone(),
                source,
            })?;
            Ok((bytes, filename_from(&path)))
        }
    }

    fn map_host_path(&self, reference: &str) -> String {
        match &self.path_mapping {
            Some(mapping) if reference.starts_with(&mapping.host_prefix) => format!(
                "{}{}",
                mapping.container_prefix,
                &reference[mapping.host_prefix.len()..]
            ),
            _ => reference.to_string(),
        }
    }
}

fn is_platform_hosted(src: &str) -> bool {
    src.contains(PLATFORM_CDN_HOST)
}

/// All `<img>` `src` values in document order, duplicates included.
fn collect_image_sources(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("img") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("src"))
        .map(str::to_string)
        .collect()
}

/// Derive an upload filename from the last path segment of a reference,
/// appending `.jpg` when the segment carries no extension.
fn filename_from(reference: &str) -> String {
    let trimmed = reference.split('?').next().unwrap_or(reference);
    let trimmed = trimmed.split('#').next().unwrap_or(trimmed);
    let segment = trimmed.rsplit('/').next().unwrap_or(trimmed);
    let segment = if segment.is_empty() { "image" } else { segment };

    if Path::new(segment).extension().is_some() {
        segment.to_string()
    } else {
        format!("{segment}.jpg")
    }
}

/// Swap one `src` attribute value, preserving the surrounding quote style.
fn rewrite_src(html: &str, from: &str, to: &str) -> String {
    html.replace(&format!("src=\"{from}\""), &format!("src=\"{to}\""))
        .replace(&format!("src='{from}'"), &format!("src='{to}'"))
}
