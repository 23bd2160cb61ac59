//! WeChat Official Account API client.
//!
//! The remote surface sits behind the [`WeChatApi`] trait so the pipeline
//! can be exercised against a mock; [`HttpWeChatApi`] is the reqwest
//! implementation used in production.

use crate::error::{Error, Result};
use crate::types::{AccessToken, DraftArticle, UploadResult};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Production WeChat API endpoint.
pub const DEFAULT_API_BASE: &str = "https://api.weixin.qq.com";

/// Remote operations the publishing pipeline depends on.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WeChatApi: Send + Sync {
    /// Exchange app credentials for a short-lived access token.
    async fn fetch_access_token(&self, app_id: &str, app_secret: &str) -> Result<AccessToken>;

    /// Upload one image as permanent material; the returned URL always uses
    /// secure transport.
    async fn upload_material(
        &self,
        data: Vec<u8>,
        filename: &str,
        token: &AccessToken,
    ) -> Result<UploadResult>;

    /// Create a draft holding a single article; returns its media id.
    async fn create_draft(&self, article: DraftArticle, token: &AccessToken) -> Result<String>;

    /// Download the bytes of a remotely hosted image.
    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>>;
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    errcode: Option<i64>,
    errmsg: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MaterialResponse {
    media_id: Option<String>,
    url: Option<String>,
    errcode: Option<i64>,
    errmsg: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DraftResponse {
    media_id: Option<String>,
    errcode: Option<i64>,
    errmsg: Option<String>,
}

fn remote_error(code: i64, message: Option<String>) -> Error {
    Error::RemoteApi {
        code,
        message: message.unwrap_or_else(|| "unknown error".to_string()),
    }
}

/// reqwest-backed [`WeChatApi`] implementation.
#[derive(Debug, Clone)]
pub struct HttpWeChatApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpWeChatApi {
    /// Client against the production endpoint.
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_API_BASE)
    }

    /// Client against a custom endpoint (tests, proxies).
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Pick a content type from the file extension; WeChat only accepts images
/// here, so anything unrecognized is sent as JPEG.
fn content_type_for(filename: &str) -> &'static str {
    match filename.rsplit('.').next().map(str::to_ascii_lowercase) {
        Some(ext) if ext == "png" => "image/png",
        Some(ext) if ext == "gif" => "image/gif",
        Some(ext) if ext == "webp" => "image/webp",
        _ => "image/jpeg",
    }
}

#[async_trait]
impl WeChatApi for HttpWeChatApi {
    async fn fetch_access_token(&self, app_id: &str, app_secret: &str) -> Result<AccessToken> {
        debug!("fetching access token for app {app_id}");

        let response = self
            .client
            .get(self.endpoint("/cgi-bin/token"))
            .query(&[
                ("grant_type", "client_credential"),
                ("appid", app_id),
                ("secret", app_secret),
            ])
            .send()
            .await?;

        let payload: TokenResponse = response.error_for_status()?.json().await?;

        if let Some(token) = payload.access_token {
            return Ok(AccessToken::new(token));
        }
        match payload.errcode {
            Some(code) => Err(remote_error(code, payload.errmsg)),
            None => Err(Error::UnexpectedResponse {
                context: "token exchange".to_string(),
            }),
        }
    }

    async fn upload_material(
        &self,
        data: Vec<u8>,
        filename: &str,
        token: &AccessToken,
    ) -> Result<UploadResult> {
        debug!("uploading material {filename} ({} bytes)", data.len());

        let part = reqwest::multipart::Part::bytes(data)
            .file_name(filename.to_string())
            .mime_str(content_type_for(filename))?;
        let form = reqwest::multipart::Form::new().part("media", part);

        let response = self
            .client
            .post(self.endpoint("/cgi-bin/material/add_material"))
            .query(&[("access_token", token.secret()), ("type", "image")])
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Upload {
                status: status.as_u16(),
                body,
            });
        }

        let payload: MaterialResponse = response.json().await?;
        if let Some(code) = payload.errcode.filter(|&code| code != 0) {
            return Err(remote_error(code, payload.errmsg));
        }
        match (payload.media_id, payload.url) {
            (Some(media_id), Some(url)) => Ok(UploadResult::new(media_id, url)),
            _ => Err(Error::UnexpectedResponse {
                context: "material upload".to_string(),
            }),
        }
    }

    async fn create_draft(&self, article: DraftArticle, token: &AccessToken) -> Result<String> {
        debug!("creating draft: {}", article.title);

        let response = self
            .client
            .post(self.endpoint("/cgi-bin/draft/add"))
            .query(&[("access_token", token.secret())])
            .json(&serde_json::json!({ "articles": [article] }))
            .send()
            .await?;

        let payload: DraftResponse = response.error_for_status()?.json().await?;
        if let Some(code) = payload.errcode.filter(|&code| code != 0) {
            return Err(remote_error(code, payload.errmsg));
        }
        payload.media_id.ok_or_else(|| Error::UnexpectedResponse {
            context: "draft creation".to_string(),
        })
    }

    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>> {
        debug!("downloading image {url}");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::ImageFetch {
                url: url.to_string(),
                reason: format!("status {status}"),
            });
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(Error::ImageFetch {
                url: url.to_string(),
                reason: "empty body".to_string(),
            });
        }
        Ok(bytes.to_vec())
    }
}
