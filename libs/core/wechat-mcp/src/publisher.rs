//! Draft publishing orchestration.

use crate::client::WeChatApi;
use crate::error::{Error, Result};
use crate::relocate::{ImageRelocator, PathMapping, RelocatedHtml};
use crate::types::{AccessToken, DraftArticle};
use core_config::wechat::WeChatConfig;
use std::sync::Arc;
use tracing::{debug, info};

/// Fixed filename every cover image is uploaded under.
const COVER_FILENAME: &str = "cover.jpg";

/// Orchestrates the publishing pipeline: token, image relocation, cover
/// resolution and the draft-creation call. Every step is a blocking remote
/// call; nothing is retried.
pub struct DraftPublisher {
    api: Arc<dyn WeChatApi>,
    relocator: ImageRelocator,
    config: WeChatConfig,
}

impl DraftPublisher {
    pub fn new(api: Arc<dyn WeChatApi>, config: WeChatConfig) -> Self {
        let path_mapping = config
            .path_mapping()
            .map(|(host_prefix, container_prefix)| PathMapping {
                host_prefix,
                container_prefix,
            });

        Self {
            relocator: ImageRelocator::new(Arc::clone(&api), path_mapping),
            api,
            config,
        }
    }

    /// Publish one article to the draft box, returning the draft media id.
    ///
    /// `app_id` / `app_secret` override the configured defaults when given.
    /// The cover precedence is: explicit `cover` reference, then the first
    /// embedded image; with neither the publish fails with
    /// [`Error::MissingCover`].
    pub async fn publish_to_draft(
        &self,
        title: &str,
        html: &str,
        cover: Option<&str>,
        app_id: Option<&str>,
        app_secret: Option<&str>,
    ) -> Result<String> {
        let (app_id, app_secret) = self.resolve_credentials(app_id, app_secret)?;

        info!("publishing draft: {title}");
        let token = self.api.fetch_access_token(&app_id, &app_secret).await?;

        let RelocatedHtml {
            html: content,
            first_media_id,
        } = self.relocator.relocate(html, &token).await?;
        debug!(
            "image relocation done, fallback cover id: {:?}",
            first_media_id
        );

        let thumb_media_id = match cover.map(str::trim).filter(|c| !c.is_empty()) {
            Some(cover) => self.upload_cover(cover, &token).await?,
            None => match first_media_id {
                // A CDN-hosted first image is still a URL, not a material id;
                // it has to go through the cover upload as well.
                Some(id) if id.starts_with("http://") || id.starts_with("https://") => {
                    self.upload_cover(&id, &token).await?
                }
                Some(id) => id,
                None => return Err(Error::MissingCover),
            },
        };

        let article = DraftArticle::new(title, content, thumb_media_id);
        let media_id = self.api.create_draft(article, &token).await?;

        info!("draft created: {media_id}");
        Ok(media_id)
    }

    /// Call-supplied credentials override process-level defaults; empty
    /// strings count as absent.
    fn resolve_credentials(
        &self,
        app_id: Option<&str>,
        app_secret: Option<&str>,
    ) -> Result<(String, String)> {
        let app_id = app_id
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .or_else(|| self.config.app_id.clone());
        let app_secret = app_secret
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .or_else(|| self.config.app_secret.clone());

        match (app_id, app_secret) {
            (Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty() => Ok((id, secret)),
            _ => Err(Error::Credential),
        }
    }

    async fn upload_cover(&self, reference: &str, token: &AccessToken) -> Result<String> {
        debug!("uploading cover image from {reference}");
        let (bytes, _) = self.relocator.resolve_source(reference).await?;
        let upload = self.api.upload_material(bytes, COVER_FILENAME, token).await?;
        Ok(upload.media_id)
    }
}
